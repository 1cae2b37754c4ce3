//! OAuth2 user credentials refreshed through the refresh-token grant.
//!
//! Credential JSON is located from an explicit source, the
//! `GOOGLE_APPLICATION_CREDENTIALS` file or the gcloud well-known file, then
//! exchanged for access tokens over an injected [`http::HttpClient`].

pub mod config;
pub mod credentials;
pub mod error;
pub mod http;
pub mod logging;
pub mod oauth;

pub use credentials::{CredentialConfig, CredentialSource, Lookup, Scope, UserRefreshCredentials};
pub use error::{AuthError, Result};
pub use http::{HttpClient, ReqwestHttpClient};
pub use logging::init_tracing;
pub use oauth::TokenResponse;
