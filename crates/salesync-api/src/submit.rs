//! Document submission against `POST {base}/palacete/Internos/`.

use reqwest::header::CONTENT_TYPE;
use salesync_core::Document;

use crate::client::ApiClient;

/// Outcome of submitting one document. Never an error: the caller records it
/// and moves on to the next document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitResult {
    /// 2xx response.
    Accepted { status: u16 },
    /// The API answered with a non-2xx status.
    HttpFailure { status: u16 },
    /// No response: connect error, timeout, or the payload could not be encoded.
    TransportFailure { cause: String },
}

impl SubmitResult {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

impl ApiClient {
    /// Posts one document as indented JSON with `Authorization: Bearer <token>`.
    ///
    /// The outgoing payload and the raw response body are logged whatever the
    /// outcome.
    pub async fn submit_document(&self, document: &Document, token: &str) -> SubmitResult {
        let payload = match serde_json::to_string_pretty(document) {
            Ok(payload) => payload,
            Err(e) => {
                return SubmitResult::TransportFailure {
                    cause: format!("failed to encode document: {e}"),
                }
            }
        };

        tracing::info!(
            doc_type = %document.doc_type,
            date = %document.date,
            lines = document.lines.len(),
            payload = %payload,
            "submit: sending document"
        );

        let response = match self
            .client
            .post(self.documents_url())
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    doc_type = %document.doc_type,
                    date = %document.date,
                    error = %e,
                    "submit: request failed"
                );
                return SubmitResult::TransportFailure {
                    cause: e.to_string(),
                };
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable response body: {e}>"));

        if status.is_success() {
            tracing::info!(
                doc_type = %document.doc_type,
                date = %document.date,
                status = status.as_u16(),
                response = %body,
                "submit: document accepted"
            );
            SubmitResult::Accepted {
                status: status.as_u16(),
            }
        } else {
            tracing::warn!(
                doc_type = %document.doc_type,
                date = %document.date,
                status = status.as_u16(),
                response = %body,
                "submit: document rejected"
            );
            SubmitResult::HttpFailure {
                status: status.as_u16(),
            }
        }
    }
}
