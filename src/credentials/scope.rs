use crate::error::{AuthError, Result};
use serde_json::Value;

/// OAuth scopes as supplied by the caller: one space-delimited string or
/// an ordered list of individual scopes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    Single(String),
    List(Vec<String>),
}

impl Scope {
    /// Validate and flatten into the ordered scope list sent on the wire
    pub fn normalize(&self) -> Result<Vec<String>> {
        match self {
            Self::Single(s) => Ok(s.split_whitespace().map(str::to_string).collect()),
            Self::List(items) => {
                for item in items {
                    if item.is_empty() {
                        return Err(AuthError::InvalidArgument(
                            "scope values must not be empty".to_string(),
                        ));
                    }
                    if item.chars().any(char::is_whitespace) {
                        return Err(AuthError::InvalidArgument(format!(
                            "array scope values should not contain spaces: '{}'",
                            item
                        )));
                    }
                }
                Ok(items.clone())
            }
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        Self::Single(s.to_string())
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        Self::Single(s)
    }
}

impl From<Vec<String>> for Scope {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<&[&str]> for Scope {
    fn from(items: &[&str]) -> Self {
        Self::List(items.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Scope {
    fn from(items: [&str; N]) -> Self {
        Self::List(items.iter().map(|s| s.to_string()).collect())
    }
}

/// Loosely-typed scope input, e.g. read from a JSON settings document.
/// Anything other than a string or an array of strings is rejected.
impl TryFrom<Value> for Scope {
    type Error = AuthError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(Self::Single(s)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s),
                    other => Err(AuthError::InvalidArgument(format!(
                        "scope must be a string or array of strings, found array element {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self::List),
            other => Err(AuthError::InvalidArgument(format!(
                "scope must be a string or array of strings, found {}",
                other
            ))),
        }
    }
}
