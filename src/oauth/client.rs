use crate::error::{AuthError, Result};
use crate::http::{HttpRequest, HttpResponse};
use crate::logging::Redacted;
use crate::oauth::types::TokenResponse;
use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;
use url::Url;

/// OAuth2 client state configured for the refresh-token grant
///
/// Builds the token request and decodes the endpoint's reply; it does not
/// perform I/O itself.
#[derive(Clone)]
pub struct OAuth2 {
    client_id: String,
    client_secret: String,
    refresh_token: String,
    scopes: Vec<String>,
    token_uri: Url,
}

impl OAuth2 {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
        scopes: Vec<String>,
        token_uri: Url,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            refresh_token: refresh_token.into(),
            scopes,
            token_uri,
        }
    }

    /// Same state, different token endpoint
    pub fn with_token_uri(mut self, token_uri: Url) -> Self {
        self.token_uri = token_uri;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn token_uri(&self) -> &Url {
        &self.token_uri
    }

    /// Cache key derived from the scope set alone (order-sensitive)
    pub fn scope_cache_key(&self) -> String {
        self.scopes.join(":")
    }

    /// Form-encoded POST exchanging the refresh token for an access token
    pub fn build_refresh_request(&self) -> HttpRequest {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", &self.client_secret)
            .append_pair("refresh_token", &self.refresh_token)
            .finish();

        HttpRequest {
            method: Method::POST,
            url: self.token_uri.clone(),
            headers: vec![
                (
                    "content-type".to_string(),
                    "application/x-www-form-urlencoded".to_string(),
                ),
                ("cache-control".to_string(), "no-store".to_string()),
                ("accept".to_string(), "application/json".to_string()),
            ],
            body: body.into_bytes(),
        }
    }

    /// Decode a successful token endpoint body
    ///
    /// Form-encoded replies (`application/x-www-form-urlencoded` or
    /// `text/plain`) are decoded as key/value pairs and must carry a
    /// non-empty `access_token`; everything else must be a JSON object.
    pub fn parse_token_response(&self, response: &HttpResponse) -> Result<TokenResponse> {
        if is_form_encoded(response.header("content-type")) {
            let fields: Map<String, Value> = url::form_urlencoded::parse(&response.body)
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect();
            let token = TokenResponse::new(fields);
            if token.access_token().map_or(true, str::is_empty) {
                return Err(AuthError::Protocol(
                    "Form-encoded token response has no access_token".to_string(),
                ));
            }
            return Ok(token);
        }

        match serde_json::from_slice::<Value>(&response.body) {
            Ok(Value::Object(fields)) => Ok(TokenResponse::new(fields)),
            Ok(other) => Err(AuthError::Protocol(format!(
                "Token response is not a JSON object: {}",
                json_kind(&other)
            ))),
            Err(e) => Err(AuthError::Protocol(format!(
                "Failed to parse token response: {}",
                e
            ))),
        }
    }
}

impl fmt::Debug for OAuth2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth2")
            .field("client_id", &self.client_id)
            .field("client_secret", &Redacted::new(&self.client_secret))
            .field("refresh_token", &Redacted::new(&self.refresh_token))
            .field("scopes", &self.scopes)
            .field("token_uri", &self.token_uri.as_str())
            .finish()
    }
}

fn is_form_encoded(content_type: Option<&str>) -> bool {
    let Some(content_type) = content_type else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/x-www-form-urlencoded" || mime == "text/plain"
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
