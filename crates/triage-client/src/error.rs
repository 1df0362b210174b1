use thiserror::Error;

/// Errors raised while constructing a gateway. Request-time problems are
/// reported as [`triage_core::Failure`] instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}
