use crate::config::{CLOUDSDK_CONFIG_ENV_VAR, GCLOUD_CONFIG_DIR, WELL_KNOWN_FILE_NAME};
use std::collections::HashMap;
use std::path::PathBuf;

/// Read-only view of the process environment used during resolution
///
/// Passed explicitly into the resolver so lookups can be exercised without
/// touching real process state.
pub trait Environment: Send + Sync {
    /// Value of an environment variable; empty values count as unset
    fn var(&self, key: &str) -> Option<String>;

    fn home_dir(&self) -> Option<PathBuf>;

    fn is_windows(&self) -> bool {
        cfg!(windows)
    }
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// Fixed environment, mostly for tests and sandboxed callers
#[derive(Debug, Clone, Default)]
pub struct StaticEnvironment {
    vars: HashMap<String, String>,
    home: Option<PathBuf>,
    windows: bool,
}

impl StaticEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn windows(mut self, windows: bool) -> Self {
        self.windows = windows;
        self
    }
}

impl Environment for StaticEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.is_empty()).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn is_windows(&self) -> bool {
        self.windows
    }
}

/// Location of the gcloud application-default credentials file
///
/// `CLOUDSDK_CONFIG` wins when set; otherwise `%APPDATA%\gcloud` on Windows
/// and `~/.config/gcloud` elsewhere. `None` when no base directory is known.
pub fn well_known_credentials_path(env: &dyn Environment) -> Option<PathBuf> {
    let config_dir = if let Some(dir) = env.var(CLOUDSDK_CONFIG_ENV_VAR) {
        PathBuf::from(dir)
    } else if env.is_windows() {
        PathBuf::from(env.var("APPDATA")?).join(GCLOUD_CONFIG_DIR)
    } else {
        env.home_dir()?.join(".config").join(GCLOUD_CONFIG_DIR)
    };

    Some(config_dir.join(WELL_KNOWN_FILE_NAME))
}
