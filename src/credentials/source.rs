use crate::config::CREDENTIALS_ENV_VAR;
use crate::credentials::env::{well_known_credentials_path, Environment};
use crate::error::{AuthError, Result};
use serde_json::Value;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

/// Where the caller says the credential JSON lives
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Already-decoded JSON document
    Json(Value),
    /// Raw JSON bytes, e.g. drained from a stream
    Bytes(Vec<u8>),
    /// Path to a JSON file; a missing file is a hard error
    File(PathBuf),
}

impl CredentialSource {
    /// Drain a reader into a [`CredentialSource::Bytes`]
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).map_err(|e| {
            AuthError::InvalidArgument(format!("Failed to read credential stream: {}", e))
        })?;
        Ok(Self::Bytes(buf))
    }

    /// Produce the credential JSON this source points at
    pub fn load(self) -> Result<Value> {
        match self {
            Self::Json(value) => Ok(value),
            Self::Bytes(bytes) => parse_explicit(&bytes),
            Self::File(path) => {
                let bytes = std::fs::read(&path)
                    .map_err(|source| AuthError::FileAccess { path: path.clone(), source })?;
                tracing::debug!(path = %path.display(), "Loaded credentials from file");
                parse_explicit(&bytes)
            }
        }
    }
}

impl From<Value> for CredentialSource {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<PathBuf> for CredentialSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}

impl From<&Path> for CredentialSource {
    fn from(path: &Path) -> Self {
        Self::File(path.to_path_buf())
    }
}

/// Outcome of a soft lookup step in the fallback chain
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    /// Nothing configured at this step; not an error
    NotConfigured,
}

impl<T> Lookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotConfigured => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotConfigured => Lookup::NotConfigured,
        }
    }
}

/// Credential JSON from the file named by `GOOGLE_APPLICATION_CREDENTIALS`
///
/// Unset variable → `NotConfigured`. A set variable pointing at a missing or
/// malformed file is a configuration error.
pub fn json_from_env(env: &dyn Environment) -> Result<Lookup<Value>> {
    let Some(path) = env.var(CREDENTIALS_ENV_VAR) else {
        tracing::debug!(var = CREDENTIALS_ENV_VAR, "Credential env var not set");
        return Ok(Lookup::NotConfigured);
    };

    let path = PathBuf::from(path);
    if !file_exists(&path)? {
        return Err(AuthError::Configuration(format!(
            "Unable to read the credential file specified by {}: file {} does not exist",
            CREDENTIALS_ENV_VAR,
            path.display()
        )));
    }

    read_configured_file(&path).map(Lookup::Found)
}

/// Credential JSON from the gcloud well-known file, if one exists
pub fn json_from_well_known_file(env: &dyn Environment) -> Result<Lookup<Value>> {
    let Some(path) = well_known_credentials_path(env) else {
        tracing::debug!("No home directory, skipping well-known credentials file");
        return Ok(Lookup::NotConfigured);
    };

    if !file_exists(&path)? {
        tracing::debug!(path = %path.display(), "Well-known credentials file not present");
        return Ok(Lookup::NotConfigured);
    }

    read_configured_file(&path).map(Lookup::Found)
}

/// Full precedence chain: explicit source, then env var, then well-known file
pub fn resolve_json(
    explicit: Option<CredentialSource>,
    env: &dyn Environment,
) -> Result<Lookup<Value>> {
    if let Some(source) = explicit {
        return source.load().map(Lookup::Found);
    }

    if let Lookup::Found(json) = json_from_env(env)? {
        return Ok(Lookup::Found(json));
    }

    json_from_well_known_file(env)
}

/// `Ok(false)` only when nothing is at `path`; any other stat failure
/// (permissions, a file used as a directory) is a configuration error
fn file_exists(path: &Path) -> Result<bool> {
    match std::fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(AuthError::Configuration(format!(
            "Unable to access credential file {}: {}",
            path.display(),
            e
        ))),
    }
}

fn parse_explicit(bytes: &[u8]) -> Result<Value> {
    serde_json::from_slice(bytes)
        .map_err(|e| AuthError::InvalidArgument(format!("invalid json for auth config: {}", e)))
}

fn read_configured_file(path: &Path) -> Result<Value> {
    let bytes = std::fs::read(path).map_err(|e| {
        AuthError::Configuration(format!(
            "Failed to read credential file {}: {}",
            path.display(),
            e
        ))
    })?;
    let json = serde_json::from_slice(&bytes).map_err(|e| {
        AuthError::Configuration(format!(
            "Failed to parse credential file {}: {}",
            path.display(),
            e
        ))
    })?;
    tracing::debug!(path = %path.display(), "Loaded credentials from file");
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::env::StaticEnvironment;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_explicit_json_is_returned_unchanged() {
        let doc = json!({"client_id": "a"});
        let loaded = CredentialSource::from(doc.clone()).load().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_reader_source() {
        let source = CredentialSource::from_reader(&br#"{"client_id":"a"}"#[..]).unwrap();
        assert_eq!(source.load().unwrap(), json!({"client_id": "a"}));
    }

    #[test]
    fn test_malformed_bytes_are_invalid_argument() {
        let err = CredentialSource::Bytes(b"{nope".to_vec()).load().unwrap_err();
        assert!(matches!(err, AuthError::InvalidArgument(_)));
    }

    #[test]
    fn test_missing_named_file_is_file_access_error() {
        let dir = TempDir::new().unwrap();
        let err = CredentialSource::File(dir.path().join("missing.json"))
            .load()
            .unwrap_err();
        assert!(matches!(err, AuthError::FileAccess { .. }));
    }

    #[test]
    fn test_env_unset_is_not_configured() {
        let env = StaticEnvironment::new();
        assert_eq!(json_from_env(&env).unwrap(), Lookup::NotConfigured);
    }

    #[test]
    fn test_env_pointing_at_missing_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let env = StaticEnvironment::new().with_var(
            CREDENTIALS_ENV_VAR,
            dir.path().join("missing.json").to_string_lossy(),
        );
        assert!(matches!(json_from_env(&env), Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_env_pointing_at_malformed_file_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.json", "not json");
        let env = StaticEnvironment::new().with_var(CREDENTIALS_ENV_VAR, path.to_string_lossy());
        assert!(matches!(json_from_env(&env), Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_well_known_absent_is_not_configured() {
        let dir = TempDir::new().unwrap();
        let env = StaticEnvironment::new().with_home(dir.path());
        assert_eq!(json_from_well_known_file(&env).unwrap(), Lookup::NotConfigured);
    }

    #[test]
    fn test_well_known_malformed_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, ".config/gcloud/application_default_credentials.json", "{");
        let env = StaticEnvironment::new().with_home(dir.path());
        assert!(matches!(
            json_from_well_known_file(&env),
            Err(AuthError::Configuration(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_well_known_unreachable_path_is_configuration_error() {
        // CLOUDSDK_CONFIG names a regular file, so the lookup fails with
        // ENOTDIR instead of NotFound
        let dir = TempDir::new().unwrap();
        let not_a_dir = write(&dir, "gcloud", "plain file");
        let env = StaticEnvironment::new()
            .with_home(dir.path())
            .with_var("CLOUDSDK_CONFIG", not_a_dir.to_string_lossy());
        assert!(matches!(
            json_from_well_known_file(&env),
            Err(AuthError::Configuration(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_env_unreachable_path_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let not_a_dir = write(&dir, "creds", "plain file");
        let env = StaticEnvironment::new().with_var(
            CREDENTIALS_ENV_VAR,
            not_a_dir.join("creds.json").to_string_lossy(),
        );
        let err = json_from_env(&env).unwrap_err();
        assert!(matches!(err, AuthError::Configuration(ref m) if m.contains("Unable to access")));
    }

    #[test]
    fn test_env_pointing_at_directory_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let env = StaticEnvironment::new().with_var(CREDENTIALS_ENV_VAR, dir.path().to_string_lossy());
        assert!(matches!(json_from_env(&env), Err(AuthError::Configuration(_))));
    }

    #[test]
    fn test_resolve_prefers_env_over_well_known() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            ".config/gcloud/application_default_credentials.json",
            r#"{"from": "well-known"}"#,
        );
        let env_file = write(&dir, "env.json", r#"{"from": "env"}"#);
        let env = StaticEnvironment::new()
            .with_home(dir.path())
            .with_var(CREDENTIALS_ENV_VAR, env_file.to_string_lossy());

        let json = resolve_json(None, &env).unwrap().into_option().unwrap();
        assert_eq!(json, json!({"from": "env"}));
    }

    #[test]
    fn test_resolve_explicit_source_never_falls_through() {
        let dir = TempDir::new().unwrap();
        write(
            &dir,
            ".config/gcloud/application_default_credentials.json",
            r#"{"from": "well-known"}"#,
        );
        let env = StaticEnvironment::new().with_home(dir.path());

        let err = resolve_json(Some(CredentialSource::File(dir.path().join("nope.json"))), &env)
            .unwrap_err();
        assert!(matches!(err, AuthError::FileAccess { .. }));
    }

    #[test]
    fn test_resolve_nothing_configured() {
        let dir = TempDir::new().unwrap();
        let env = StaticEnvironment::new().with_home(dir.path());
        assert!(!resolve_json(None, &env).unwrap().is_found());
    }
}
