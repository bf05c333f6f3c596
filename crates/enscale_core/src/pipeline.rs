//! Template run pipeline.
//!
//! A run goes through pre-run hooks, emission and post-run hooks, strictly in
//! that order. Hooks only run when the matching run option is set. Emission
//! either prints the document (`expand`) or submits it as a stack.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use enscale_runner::{CommandOutput, CommandRunner};
use enscale_template::Template;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{CoreError, CoreResult};
use crate::submit::StackSubmission;

/// Future returned by a hook.
pub type HookFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Deferred action run before or after emission.
pub type Hook = Box<dyn FnOnce() -> HookFuture + Send>;

/// Pipeline state.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Pipeline has not started
    #[default]
    Pending,
    /// Pipeline is running
    Running,
    /// Every stage completed
    Completed,
    /// A stage failed; later stages were skipped
    Failed,
}

/// Kind of stage.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    PreRun,
    Emit,
    PostRun,
}

/// Outcome of a stage.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    Completed,
    Failed(String),
    Skipped,
}

/// One stage of a run.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub kind: StageKind,
    pub name: String,
    pub outcome: StageOutcome,
    pub duration_ms: u64,
}

/// What emission produced.
#[derive(Debug, Clone)]
pub enum Emission {
    /// Pretty-printed document
    Expanded(String),
    /// Result of the submission command
    Submitted(CommandOutput),
}

/// Report of one pipeline execution.
#[derive(Debug)]
pub struct ExecutionReport {
    pub state: PipelineState,
    pub stages: Vec<StageReport>,
    pub emission: Option<Emission>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Error that failed the run
    pub error: Option<CoreError>,
}

impl ExecutionReport {
    fn new() -> Self {
        Self {
            state: PipelineState::Running,
            stages: Vec::new(),
            emission: None,
            started_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }

    /// Stages with the given outcome.
    pub fn stages_with(&self, outcome: &StageOutcome) -> Vec<&StageReport> {
        self.stages.iter().filter(|s| &s.outcome == outcome).collect()
    }

    /// The report, or the error that failed the run.
    pub fn into_result(mut self) -> CoreResult<Self> {
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(self),
        }
    }
}

struct NamedHook {
    name: String,
    hook: Hook,
}

/// Pipeline running one template.
pub struct Pipeline {
    runner: Arc<dyn CommandRunner>,
    pre_run: Vec<NamedHook>,
    post_run: Vec<NamedHook>,
    state: PipelineState,
}

impl Pipeline {
    /// Create a pipeline submitting through `runner`.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            pre_run: Vec::new(),
            post_run: Vec::new(),
            state: PipelineState::Pending,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Register a hook to run before emission.
    pub fn pre_run<F, Fut>(&mut self, name: impl Into<String>, hook: F) -> &mut Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.pre_run.push(NamedHook {
            name: name.into(),
            hook: Box::new(move || -> HookFuture { Box::pin(hook()) }),
        });
        self
    }

    /// Register a hook to run after emission.
    pub fn post_run<F, Fut>(&mut self, name: impl Into<String>, hook: F) -> &mut Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.post_run.push(NamedHook {
            name: name.into(),
            hook: Box::new(move || -> HookFuture { Box::pin(hook()) }),
        });
        self
    }

    /// Execute the run for `template`.
    ///
    /// The first failing stage fails the run; the remaining stages are
    /// reported as skipped. Hooks are consumed, so a pipeline runs once.
    pub async fn exec(&mut self, template: &Template) -> ExecutionReport {
        let mut report = ExecutionReport::new();
        if self.state != PipelineState::Pending {
            report.state = PipelineState::Failed;
            report.error = Some(CoreError::InvalidState(format!(
                "pipeline already {:?}",
                self.state
            )));
            return report;
        }
        self.state = PipelineState::Running;

        let options = template.options();
        let pre_run = if options.pre_run { std::mem::take(&mut self.pre_run) } else { Vec::new() };
        let post_run = if options.post_run { std::mem::take(&mut self.post_run) } else { Vec::new() };
        info!(
            "Running {} pre-run hook(s), emit ({}), {} post-run hook(s)",
            pre_run.len(),
            if options.expand { "expand" } else { "submit" },
            post_run.len()
        );

        run_hooks(StageKind::PreRun, pre_run, &mut report).await;

        if report.error.is_none() {
            let start = Instant::now();
            match emit(self.runner.clone(), template).await {
                Ok(emission) => {
                    report.emission = Some(emission);
                    report.stages.push(stage(StageKind::Emit, "emit", StageOutcome::Completed, start));
                }
                Err(e) => {
                    error!("Emit failed: {}", e);
                    report
                        .stages
                        .push(stage(StageKind::Emit, "emit", StageOutcome::Failed(e.to_string()), start));
                    report.error = Some(e);
                }
            }
        } else {
            report.stages.push(skipped(StageKind::Emit, "emit"));
        }

        run_hooks(StageKind::PostRun, post_run, &mut report).await;

        self.state = if report.error.is_some() {
            PipelineState::Failed
        } else {
            PipelineState::Completed
        };
        report.state = self.state;
        report.completed_at = Some(Utc::now());
        info!("Pipeline finished: {:?}", report.state);
        report
    }
}

async fn run_hooks(kind: StageKind, hooks: Vec<NamedHook>, report: &mut ExecutionReport) {
    for NamedHook { name, hook } in hooks {
        if report.error.is_some() {
            report.stages.push(skipped(kind, &name));
            continue;
        }

        info!("Running {:?} hook {}", kind, name);
        let start = Instant::now();
        match hook().await {
            Ok(()) => report.stages.push(stage(kind, &name, StageOutcome::Completed, start)),
            Err(e) => {
                let message = format!("{:#}", e);
                error!("Hook {} failed: {}", name, message);
                report
                    .stages
                    .push(stage(kind, &name, StageOutcome::Failed(message.clone()), start));
                report.error = Some(CoreError::HookFailed { stage: name, message });
            }
        }
    }
}

async fn emit(runner: Arc<dyn CommandRunner>, template: &Template) -> CoreResult<Emission> {
    if template.options().expand {
        let json = template.to_json_pretty()?;
        println!("{}", json);
        Ok(Emission::Expanded(json))
    } else {
        let output = StackSubmission::new(runner).submit(template).await?;
        Ok(Emission::Submitted(output))
    }
}

fn stage(kind: StageKind, name: &str, outcome: StageOutcome, start: Instant) -> StageReport {
    StageReport {
        kind,
        name: name.to_string(),
        outcome,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

fn skipped(kind: StageKind, name: &str) -> StageReport {
    StageReport {
        kind,
        name: name.to_string(),
        outcome: StageOutcome::Skipped,
        duration_ms: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enscale_runner::{MockResponse, MockRunner};
    use enscale_template::StackOptions;
    use parking_lot::Mutex;

    fn recorder() -> Arc<Mutex<Vec<String>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn record(log: &Arc<Mutex<Vec<String>>>, entry: &str) -> impl FnOnce() -> HookFuture {
        let log = log.clone();
        let entry = entry.to_string();
        move || -> HookFuture {
            Box::pin(async move {
                log.lock().push(entry);
                Ok::<(), anyhow::Error>(())
            })
        }
    }

    fn template(options: StackOptions) -> Template {
        Template::new(options).unwrap()
    }

    #[tokio::test]
    async fn test_hooks_skipped_without_flags() {
        let log = recorder();
        let mut pipeline = Pipeline::new(Arc::new(MockRunner::new()));
        pipeline.pre_run("pre", record(&log, "pre"));
        pipeline.post_run("post", record(&log, "post"));

        let report = pipeline.exec(&template(StackOptions::new().expand())).await;

        assert_eq!(report.state, PipelineState::Completed);
        assert!(log.lock().is_empty());
        assert_eq!(report.stages.len(), 1);
        assert!(matches!(report.emission, Some(Emission::Expanded(_))));
    }

    #[tokio::test]
    async fn test_hooks_run_in_registration_order() {
        let log = recorder();
        let mut pipeline = Pipeline::new(Arc::new(MockRunner::new()));
        pipeline
            .pre_run("first", record(&log, "pre-1"))
            .pre_run("second", record(&log, "pre-2"))
            .post_run("third", record(&log, "post-1"));

        let options = StackOptions::new().expand().with_hooks(true, true);
        let report = pipeline.exec(&template(options)).await.into_result().unwrap();

        assert_eq!(*log.lock(), vec!["pre-1", "pre-2", "post-1"]);
        let kinds: Vec<StageKind> = report.stages.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StageKind::PreRun, StageKind::PreRun, StageKind::Emit, StageKind::PostRun]
        );
    }

    #[tokio::test]
    async fn test_failing_hook_aborts_the_rest() {
        let log = recorder();
        let runner = MockRunner::new();
        let mut pipeline = Pipeline::new(Arc::new(runner.clone()));
        pipeline
            .pre_run("boom", || async { Err::<(), _>(anyhow::anyhow!("vpc stack missing")) })
            .pre_run("after", record(&log, "after"))
            .post_run("post", record(&log, "post"));

        let options = StackOptions::new().with_hooks(true, true);
        let report = pipeline.exec(&template(options)).await;

        assert_eq!(report.state, PipelineState::Failed);
        assert_eq!(pipeline.state(), PipelineState::Failed);
        assert!(log.lock().is_empty());
        assert_eq!(runner.call_count(), 0);
        assert_eq!(report.stages_with(&StageOutcome::Skipped).len(), 3);
        assert!(matches!(report.into_result(), Err(CoreError::HookFailed { .. })));
    }

    #[tokio::test]
    async fn test_submit_then_post_run() {
        let log = recorder();
        let runner = MockRunner::new().add_response(MockResponse::success(r#"{"StackId": "arn"}"#));
        let mut pipeline = Pipeline::new(Arc::new(runner.clone()));
        pipeline.post_run("post", record(&log, "post"));

        let options = StackOptions::new()
            .with_stack_name("web")
            .with_region("us-east-1")
            .create()
            .with_hooks(false, true);
        let report = pipeline.exec(&template(options)).await.into_result().unwrap();

        assert!(matches!(report.emission, Some(Emission::Submitted(_))));
        assert_eq!(runner.last_call().unwrap()[2], "create-stack");
        assert_eq!(*log.lock(), vec!["post"]);
    }

    #[tokio::test]
    async fn test_pipeline_runs_once() {
        let mut pipeline = Pipeline::new(Arc::new(MockRunner::new()));
        let options = StackOptions::new().expand();
        pipeline.exec(&template(options.clone())).await;

        let report = pipeline.exec(&template(options)).await;
        assert!(matches!(report.error, Some(CoreError::InvalidState(_))));
    }
}
