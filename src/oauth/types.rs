use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Token payload returned by the token endpoint
///
/// The decoded object is kept as-is; accessors only read well-known fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenResponse(Map<String, Value>);

impl TokenResponse {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Access token for API calls
    pub fn access_token(&self) -> Option<&str> {
        self.str_field("access_token")
    }

    /// Lifetime in seconds, accepting both numeric and string encodings
    pub fn expires_in(&self) -> Option<i64> {
        match self.0.get("expires_in")? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Token type (usually "Bearer")
    pub fn token_type(&self) -> Option<&str> {
        self.str_field("token_type")
    }

    pub fn id_token(&self) -> Option<&str> {
        self.str_field("id_token")
    }

    pub fn scope(&self) -> Option<&str> {
        self.str_field("scope")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

impl From<TokenResponse> for Value {
    fn from(token: TokenResponse) -> Self {
        Value::Object(token.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(value: Value) -> TokenResponse {
        match value {
            Value::Object(map) => TokenResponse::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_accessors() {
        let t = token(json!({
            "access_token": "ya29.abc",
            "expires_in": 3599,
            "token_type": "Bearer",
            "scope": "scope/1 scope/2",
            "id_token": "eyJ..."
        }));
        assert_eq!(t.access_token(), Some("ya29.abc"));
        assert_eq!(t.expires_in(), Some(3599));
        assert_eq!(t.token_type(), Some("Bearer"));
        assert_eq!(t.scope(), Some("scope/1 scope/2"));
        assert_eq!(t.id_token(), Some("eyJ..."));
    }

    #[test]
    fn test_expires_in_as_string() {
        // Form-encoded responses carry every value as a string
        let t = token(json!({"expires_in": "3600"}));
        assert_eq!(t.expires_in(), Some(3600));
        let t = token(json!({"expires_in": true}));
        assert_eq!(t.expires_in(), None);
    }

    #[test]
    fn test_unknown_fields_are_preserved() {
        let original = json!({"access_token": "a", "custom": {"nested": [1, 2]}});
        let t = token(original.clone());
        assert_eq!(t.get("custom"), Some(&json!({"nested": [1, 2]})));
        assert_eq!(Value::from(t), original);
    }
}
