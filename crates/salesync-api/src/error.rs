use thiserror::Error;

/// Errors constructing the API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The underlying `reqwest::Client` could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

/// Why a token refresh failed.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint answered with a non-2xx status.
    #[error("token request rejected with HTTP {status}")]
    Rejected { status: u16 },

    /// A 2xx response whose body has no usable `access_token`.
    #[error("token response could not be parsed: {reason}")]
    ParseFailure { reason: String },

    /// Network, TLS or timeout failure before a response arrived.
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
