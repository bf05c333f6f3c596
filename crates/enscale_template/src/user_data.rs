//! Instance user data loaded from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::TemplateResult;
use crate::intrinsic::base64;

/// Directory user data scripts are read from by default.
pub const DEFAULT_USER_DATA_DIR: &str = "user-data";

/// Loads per-application user data scripts.
#[derive(Debug, Clone)]
pub struct UserDataLoader {
    dir: PathBuf,
}

impl Default for UserDataLoader {
    fn default() -> Self {
        Self::new(DEFAULT_USER_DATA_DIR)
    }
}

impl UserDataLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Raw contents of `<dir>/<app_name>`.
    pub fn read(&self, app_name: &str) -> TemplateResult<String> {
        let path = self.dir.join(app_name);
        debug!("Reading user data from {}", path.display());
        Ok(fs::read_to_string(path)?)
    }

    /// Contents of `<dir>/<app_name>` wrapped in `Fn::Base64`.
    pub fn load(&self, app_name: &str) -> TemplateResult<Value> {
        Ok(base64(self.read(app_name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_load_wraps_in_base64() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("web"), "#!/bin/sh\necho hi\n").unwrap();

        let loader = UserDataLoader::new(temp.path());
        assert_eq!(
            loader.load("web").unwrap(),
            json!({"Fn::Base64": "#!/bin/sh\necho hi\n"})
        );
    }

    #[test]
    fn test_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let loader = UserDataLoader::new(temp.path());
        assert!(loader.load("missing").is_err());
    }

    #[test]
    fn test_default_dir() {
        assert_eq!(UserDataLoader::default().dir(), Path::new("user-data"));
    }
}
