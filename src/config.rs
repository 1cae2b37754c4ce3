use crate::error::{AuthError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a credential file
pub const CREDENTIALS_ENV_VAR: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Environment variable overriding the gcloud configuration directory
pub const CLOUDSDK_CONFIG_ENV_VAR: &str = "CLOUDSDK_CONFIG";

/// File name written by `gcloud auth application-default login`
pub const WELL_KNOWN_FILE_NAME: &str = "application_default_credentials.json";

pub const GCLOUD_CONFIG_DIR: &str = "gcloud";

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Expected value of the `type` field for refresh-token credentials
pub const AUTHORIZED_USER_TYPE: &str = "authorized_user";

const CONFIG_FILE_NAME: &str = "gcp_credentials";
const ENV_PREFIX: &str = "GCP_CREDENTIALS";

/// Settings for the bundled HTTP transport and token endpoint
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("gcp-user-credentials/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            token_uri: default_token_uri(),
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Load settings from an optional `gcp_credentials.*` file in the
    /// working directory, overridden by `GCP_CREDENTIALS__*` variables.
    pub fn load() -> Result<Self> {
        Self::build(config::File::with_name(CONFIG_FILE_NAME).required(false), None)
    }

    /// Load settings from a specific file, still honouring env overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::build(config::File::from(path).required(true), None)
    }

    /// `env_vars` replaces the process environment as the override source
    fn build<S>(file: S, env_vars: Option<config::Map<String, String>>) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env_vars),
            )
            .build()
            .map_err(|e| AuthError::Configuration(format!("Failed to load client config: {}", e)))?;

        let cfg: ClientConfig = settings
            .try_deserialize()
            .map_err(|e| AuthError::Configuration(format!("Invalid client config: {}", e)))?;
        cfg.validate()?;

        tracing::debug!(
            token_uri = %cfg.token_uri,
            timeout_seconds = cfg.timeout_seconds,
            "Loaded client config"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.token_uri).map_err(|e| {
            AuthError::Configuration(format!("Invalid token_uri '{}': {}", self.token_uri, e))
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(AuthError::Configuration(format!(
                "token_uri must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(AuthError::Configuration(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
