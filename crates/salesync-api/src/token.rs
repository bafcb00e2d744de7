//! Bearer token exchange against `POST {base}/token`.

use salesync_core::Credentials;
use serde::Deserialize;

use crate::client::ApiClient;
use crate::error::AuthError;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl ApiClient {
    /// Exchanges the credential bundle for a fresh bearer token.
    ///
    /// The bundle is sent form-encoded. Persisting the returned token is the
    /// caller's job.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Rejected`] on a non-2xx status.
    /// - [`AuthError::ParseFailure`] if the body has no non-empty `access_token`.
    /// - [`AuthError::Transport`] on network failure or timeout.
    pub async fn refresh_token(&self, credentials: &Credentials) -> Result<String, AuthError> {
        let url = self.token_url();
        let form = [
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("company", credentials.company.as_str()),
            ("instance", credentials.instance.as_str()),
            ("grant_type", credentials.grant_type.as_str()),
            ("line", credentials.line.as_str()),
        ];

        tracing::info!(url = %url, user = %credentials.username, "auth: requesting token");
        let response = self.client.post(url).form(&form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        parse_token(&body)
    }
}

fn parse_token(body: &str) -> Result<String, AuthError> {
    let parsed: TokenResponse =
        serde_json::from_str(body).map_err(|e| AuthError::ParseFailure {
            reason: e.to_string(),
        })?;
    if parsed.access_token.trim().is_empty() {
        return Err(AuthError::ParseFailure {
            reason: "access_token is empty".to_string(),
        });
    }
    Ok(parsed.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_token_reads_access_token() {
        let token = parse_token(r#"{"access_token":"abc","token_type":"bearer","expires_in":3600}"#)
            .unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn parse_token_rejects_missing_field() {
        let err = parse_token(r#"{"token":"abc"}"#).unwrap_err();
        assert!(matches!(err, AuthError::ParseFailure { .. }));
    }

    #[test]
    fn parse_token_rejects_empty_token() {
        let err = parse_token(r#"{"access_token":""}"#).unwrap_err();
        assert!(matches!(err, AuthError::ParseFailure { .. }));
    }

    #[test]
    fn parse_token_rejects_non_json() {
        let err = parse_token("<html>gateway</html>").unwrap_err();
        assert!(matches!(err, AuthError::ParseFailure { .. }));
    }
}
