//! HTTP client for the remote document API.
//!
//! Wraps `reqwest` with base-URL handling and the two endpoints the agent
//! uses: `token` (see [`crate::token`]) and `palacete/Internos/` (see
//! [`crate::submit`]).

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ApiError;

const TOKEN_PATH: &str = "token";
const DOCUMENTS_PATH: &str = "palacete/Internos/";

/// Client for the remote document API.
///
/// Every request carries the timeouts given at construction; nothing is
/// retried here.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`ApiError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute `http`/`https` URL.
    pub fn new(base_url: &str, timeout: Duration, connect_timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .user_agent(concat!("salesync/", env!("CARGO_PKG_VERSION")))
            .build()?;

        // Exactly one trailing slash so joins append to the path instead of
        // replacing its last segment.
        let normalised = format!("{}/", base_url.trim().trim_end_matches('/'));
        let parsed = Url::parse(&normalised).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub(crate) fn token_url(&self) -> Url {
        self.endpoint(TOKEN_PATH)
    }

    pub(crate) fn documents_url(&self) -> Url {
        self.endpoint(DOCUMENTS_PATH)
    }

    fn endpoint(&self, path: &str) -> Url {
        // Joining a relative path onto a validated http(s) base cannot fail.
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }
}
