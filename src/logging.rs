//! Log-safe rendering of credential material.
//!
//! Client secrets, refresh tokens and access tokens never reach a log line
//! unmasked; wrap them in [`Redacted`] before formatting.

use std::fmt;
use tracing_subscriber::{fmt as tracing_fmt, prelude::*, EnvFilter};

/// Masked view of a secret
///
/// Only the first 4 characters are shown, the rest become `***`.
///
/// # Example
/// ```
/// use gcp_user_credentials::logging::Redacted;
///
/// let token = "1//0gLongRefreshTokenValue";
/// assert_eq!(format!("{}", Redacted::new(token)), "1//0***");
/// ```
#[derive(Clone, Copy)]
pub struct Redacted<'a> {
    inner: &'a str,
}

impl<'a> Redacted<'a> {
    pub fn new(secret: &'a str) -> Self {
        Self { inner: secret }
    }
}

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const VISIBLE: usize = 4;
        // Short secrets are masked entirely
        if self.inner.chars().count() <= VISIBLE * 2 {
            return write!(f, "***");
        }
        let prefix: String = self.inner.chars().take(VISIBLE).collect();
        write!(f, "{}***", prefix)
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self)
    }
}

/// Initialize tracing/logging for binaries embedding this crate
///
/// Honours `RUST_LOG`, defaulting to `info`. Calling it a second time is
/// a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_fmt::layer().with_target(true))
        .try_init();
}
