//! Process-based command runner.
//!
//! Spawns the command as a child process and drains stdout and stderr on
//! two independent threads while the calling thread waits for the child.
//! Lines keep their order within a stream; ordering across the two streams
//! is not guaranteed.

use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info};

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{format_command, CommandOutput, CommandRunner, CommandStatus};

/// Log output from a running command.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: chrono::DateTime<Utc>,
    pub stream: LogStream,
    pub message: String,
}

/// Log stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Log handler callback type.
///
/// Called from the reader threads, so it must be safe to call concurrently.
pub type LogHandler = Arc<dyn Fn(LogLine) + Send + Sync>;

/// Process runner options.
#[derive(Debug, Clone)]
pub struct ProcessRunnerOptions {
    /// Mirror child output onto our own stdout/stderr
    pub tee: bool,
    /// CI mode (prefix mirrored lines with timestamp and stream)
    pub ci_mode: bool,
    /// Timeout in seconds (0 = wait forever)
    pub timeout_seconds: u64,
}

impl Default for ProcessRunnerOptions {
    fn default() -> Self {
        Self {
            tee: true,
            ci_mode: std::env::var("CI").is_ok(),
            timeout_seconds: 0,
        }
    }
}

impl ProcessRunnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture output without mirroring it.
    pub fn quiet(mut self) -> Self {
        self.tee = false;
        self
    }

    pub fn ci_mode(mut self) -> Self {
        self.ci_mode = true;
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// Runner that executes commands as child processes.
#[derive(Clone)]
pub struct ProcessRunner {
    options: ProcessRunnerOptions,
    log_handler: Option<LogHandler>,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new(ProcessRunnerOptions::default())
    }
}

impl ProcessRunner {
    /// Create a new process runner.
    pub fn new(options: ProcessRunnerOptions) -> Self {
        Self {
            options,
            log_handler: None,
        }
    }

    /// Set a log handler for streaming lines.
    pub fn with_log_handler(mut self, handler: LogHandler) -> Self {
        self.log_handler = Some(handler);
        self
    }

    pub fn options(&self) -> &ProcessRunnerOptions {
        &self.options
    }

    /// Execute a command, blocking the current thread until it exits.
    pub fn run_blocking(&self, command: &[String]) -> RunnerResult<CommandOutput> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| RunnerError::InvalidCommand("argument list cannot be empty".to_string()))?;

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let command_line = format_command(command);
        debug!("Executing: {}", command_line);

        let started_at = Utc::now();
        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                error!("Executable not found: {}", program);
                eprintln!("{}", e);
                eprintln!("{}", command_line);
                return Ok(CommandOutput::not_found(command));
            }
            Err(e) => {
                return Err(RunnerError::SpawnFailed {
                    command: command_line,
                    source: e,
                })
            }
        };

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stderr was not captured".to_string()))?;

        let stdout_handle = self.drain(stdout, LogStream::Stdout);
        let stderr_handle = self.drain(stderr, LogStream::Stderr);

        let status = self.wait(&mut child)?;

        let stdout_output = stdout_handle.join().unwrap_or_default();
        let stderr_output = stderr_handle.join().unwrap_or_default();

        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        let status = match status.code() {
            Some(code) => CommandStatus::Exited(code),
            None => CommandStatus::Terminated,
        };
        info!("{} finished with {:?} in {}ms", program, status, duration_ms);

        Ok(CommandOutput {
            command: command.to_vec(),
            status,
            stdout: stdout_output,
            stderr: stderr_output,
            started_at,
            finished_at,
            duration_ms,
        })
    }

    /// Spawn a reader thread that forwards each line of `stream`.
    fn drain<R>(&self, stream: R, origin: LogStream) -> JoinHandle<String>
    where
        R: Read + Send + 'static,
    {
        let tee = self.options.tee;
        let ci_mode = self.options.ci_mode;
        let log_handler = self.log_handler.clone();

        std::thread::spawn(move || {
            let mut reader = BufReader::new(stream);
            let mut output = String::new();
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        debug!("Stopped reading {}: {}", origin, e);
                        break;
                    }
                }
                if buf.ends_with(b"\n") {
                    buf.pop();
                    if buf.ends_with(b"\r") {
                        buf.pop();
                    }
                }
                // Invalid UTF-8 is replaced so the pipe keeps draining.
                let line = String::from_utf8_lossy(&buf).into_owned();
                output.push_str(&line);
                output.push('\n');

                let log_line = LogLine {
                    timestamp: Utc::now(),
                    stream: origin,
                    message: line,
                };
                if tee {
                    mirror(&log_line, ci_mode);
                }
                if let Some(handler) = &log_handler {
                    handler(log_line);
                }
            }
            output
        })
    }

    /// Wait for the child, honoring the configured timeout.
    fn wait(&self, child: &mut Child) -> RunnerResult<ExitStatus> {
        if self.options.timeout_seconds == 0 {
            return child.wait().map_err(|e| {
                RunnerError::ExecutionFailed(format!("Failed to wait for process: {}", e))
            });
        }

        let timeout = Duration::from_secs(self.options.timeout_seconds);
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) => {
                    if start.elapsed() > timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(RunnerError::Timeout(self.options.timeout_seconds));
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                Err(e) => {
                    return Err(RunnerError::ExecutionFailed(format!(
                        "Failed to wait for process: {}",
                        e
                    )));
                }
            }
        }
    }
}

fn mirror(line: &LogLine, ci_mode: bool) {
    if ci_mode {
        println!(
            "[{}] [{}] {}",
            line.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            line.stream,
            line.message
        );
        return;
    }
    match line.stream {
        LogStream::Stdout => println!("{}", line.message),
        LogStream::Stderr => eprintln!("{}", line.message),
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &[String]) -> RunnerResult<CommandOutput> {
        let runner = self.clone();
        let command = command.to_vec();
        tokio::task::spawn_blocking(move || runner.run_blocking(&command))
            .await
            .map_err(|e| RunnerError::ExecutionFailed(format!("Runner task failed: {}", e)))?
    }
}
