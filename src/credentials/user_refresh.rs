use crate::config::{ClientConfig, AUTHORIZED_USER_TYPE, DEFAULT_TOKEN_URI};
use crate::credentials::env::Environment;
use crate::credentials::scope::Scope;
use crate::credentials::source::{
    json_from_env, json_from_well_known_file, resolve_json, CredentialSource, Lookup,
};
use crate::error::{AuthError, Result};
use crate::http::HttpClient;
use crate::logging::Redacted;
use crate::oauth::{OAuth2, TokenResponse};
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// Header carrying the billing/quota project for user credentials
pub const QUOTA_PROJECT_HEADER: &str = "x-goog-user-project";

/// Validated `authorized_user` credential material
///
/// Only obtainable through [`CredentialConfig::from_json`].
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialConfig {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    credential_type: Option<String>,
    quota_project_id: Option<String>,
}

impl CredentialConfig {
    /// Check a decoded credential document
    ///
    /// `client_secret`, `refresh_token` and `client_id` must be non-empty
    /// strings, checked in that order. `type` is informational.
    pub fn from_json(json: &Value) -> Result<Self> {
        let obj = json.as_object().ok_or_else(|| {
            AuthError::InvalidArgument("credential json must be an object".to_string())
        })?;

        let client_secret = required_field(obj, "client_secret")?;
        let refresh_token = required_field(obj, "refresh_token")?;
        let client_id = required_field(obj, "client_id")?;

        let credential_type = obj.get("type").and_then(Value::as_str).map(str::to_string);
        if let Some(ref t) = credential_type {
            if t != AUTHORIZED_USER_TYPE {
                tracing::warn!(
                    credential_type = %t,
                    expected = AUTHORIZED_USER_TYPE,
                    "Credential file type is not authorized_user; treating it as user credentials"
                );
            }
        }

        let quota_project_id = obj
            .get("quota_project_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            client_id,
            client_secret,
            refresh_token,
            credential_type,
            quota_project_id,
        })
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// The `type` field as written in the file, if any
    pub fn credential_type(&self) -> Option<&str> {
        self.credential_type.as_deref()
    }

    pub fn quota_project_id(&self) -> Option<&str> {
        self.quota_project_id.as_deref()
    }
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &Redacted::new(&self.client_secret))
            .field("refresh_token", &Redacted::new(&self.refresh_token))
            .field("credential_type", &self.credential_type)
            .field("quota_project_id", &self.quota_project_id)
            .finish()
    }
}

fn required_field(obj: &Map<String, Value>, key: &str) -> Result<String> {
    match obj.get(key).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(AuthError::InvalidArgument(format!(
            "json key is missing the {} field",
            key
        ))),
    }
}

/// Credentials for an end user who already granted consent, refreshed
/// through the OAuth2 refresh-token grant
///
/// Immutable once built; cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct UserRefreshCredentials {
    auth: OAuth2,
    quota_project: Option<String>,
}

impl UserRefreshCredentials {
    /// Build from an explicit JSON document, byte buffer or file path
    ///
    /// The scope is validated before the source is read.
    pub fn new(scope: impl Into<Scope>, source: impl Into<CredentialSource>) -> Result<Self> {
        let scopes = scope.into().normalize()?;
        let json = source.into().load()?;
        Self::from_validated(scopes, &json)
    }

    /// Credentials from the file named by `GOOGLE_APPLICATION_CREDENTIALS`
    pub fn from_env(scope: impl Into<Scope>, env: &dyn Environment) -> Result<Lookup<Self>> {
        let scopes = scope.into().normalize()?;
        match json_from_env(env)? {
            Lookup::Found(json) => Self::from_validated(scopes, &json).map(Lookup::Found),
            Lookup::NotConfigured => Ok(Lookup::NotConfigured),
        }
    }

    /// Credentials from the gcloud application-default file
    pub fn from_well_known_file(
        scope: impl Into<Scope>,
        env: &dyn Environment,
    ) -> Result<Lookup<Self>> {
        let scopes = scope.into().normalize()?;
        match json_from_well_known_file(env)? {
            Lookup::Found(json) => Self::from_validated(scopes, &json).map(Lookup::Found),
            Lookup::NotConfigured => Ok(Lookup::NotConfigured),
        }
    }

    /// Walk the full chain: explicit source, env var, well-known file
    pub fn resolve(
        scope: impl Into<Scope>,
        explicit: Option<CredentialSource>,
        env: &dyn Environment,
    ) -> Result<Lookup<Self>> {
        let scopes = scope.into().normalize()?;
        match resolve_json(explicit, env)? {
            Lookup::Found(json) => Self::from_validated(scopes, &json).map(Lookup::Found),
            Lookup::NotConfigured => Ok(Lookup::NotConfigured),
        }
    }

    fn from_validated(scopes: Vec<String>, json: &Value) -> Result<Self> {
        let config = CredentialConfig::from_json(json)?;
        let token_uri = Url::parse(DEFAULT_TOKEN_URI)
            .map_err(|e| AuthError::Configuration(format!("Invalid token URI: {}", e)))?;

        tracing::debug!(
            client_id = %config.client_id,
            scopes = scopes.len(),
            "Loaded user refresh credentials"
        );

        Ok(Self {
            auth: OAuth2::new(
                config.client_id,
                config.client_secret,
                config.refresh_token,
                scopes,
                token_uri,
            ),
            quota_project: config.quota_project_id,
        })
    }

    /// Send refresh requests to a different token endpoint
    pub fn with_token_uri(self, token_uri: &str) -> Result<Self> {
        let url = Url::parse(token_uri).map_err(|e| {
            AuthError::InvalidArgument(format!("Invalid token URI '{}': {}", token_uri, e))
        })?;
        Ok(Self {
            auth: self.auth.with_token_uri(url),
            quota_project: self.quota_project,
        })
    }

    /// Apply loaded client settings (currently the token endpoint)
    pub fn with_config(self, config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        self.with_token_uri(&config.token_uri)
    }

    pub fn token_uri(&self) -> &str {
        self.auth.token_uri().as_str()
    }

    pub fn client_id(&self) -> &str {
        self.auth.client_id()
    }

    pub fn scopes(&self) -> &[String] {
        self.auth.scopes()
    }

    pub fn quota_project(&self) -> Option<&str> {
        self.quota_project.as_deref()
    }

    /// `<client_id>:<scope key>`, stable for equal client id and scopes
    pub fn cache_key(&self) -> String {
        format!("{}:{}", self.auth.client_id(), self.auth.scope_cache_key())
    }

    /// Exchange the refresh token for a fresh access token
    ///
    /// 4xx → [`AuthError::ClientAuth`], 5xx → [`AuthError::ServerAuth`],
    /// undecodable 2xx body → [`AuthError::Protocol`]. Nothing is retried
    /// or cached here.
    pub async fn fetch_auth_token(&self, http: &dyn HttpClient) -> Result<TokenResponse> {
        let request = self.auth.build_refresh_request();
        tracing::debug!(
            client_id = %self.auth.client_id(),
            token_uri = %self.auth.token_uri(),
            "Refreshing user access token"
        );

        let response = http.send(request).await?;
        let status = response.status;

        if status.is_success() {
            let token = self.auth.parse_token_response(&response)?;
            tracing::debug!(
                client_id = %self.auth.client_id(),
                expires_in = ?token.expires_in(),
                "User access token refreshed"
            );
            return Ok(token);
        }

        let body = response.body_text();
        if status.is_client_error() {
            Err(AuthError::ClientAuth { status, body })
        } else if status.is_server_error() {
            Err(AuthError::ServerAuth { status, body })
        } else {
            Err(AuthError::Protocol(format!(
                "Unexpected status {} from token endpoint",
                status
            )))
        }
    }

    /// Fetch a token and return the request headers that authorize an API
    /// call with it
    pub async fn authorization_metadata(
        &self,
        http: &dyn HttpClient,
    ) -> Result<Vec<(String, String)>> {
        let token = self.fetch_auth_token(http).await?;
        let access_token = token.access_token().ok_or_else(|| {
            AuthError::Protocol("Token response has no access_token".to_string())
        })?;

        let mut headers = vec![(
            "authorization".to_string(),
            format!("Bearer {}", access_token),
        )];
        if let Some(ref project) = self.quota_project {
            headers.push((QUOTA_PROJECT_HEADER.to_string(), project.clone()));
        }
        Ok(headers)
    }
}
