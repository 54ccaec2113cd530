//! OAuth2 client-credentials token exchange.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{SentinelHubError, SentinelHubResult};

/// Token endpoint response. Only the fields this client uses.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Exchange client credentials for a bearer token.
#[instrument(skip(client, client_secret))]
pub async fn fetch_token(
    client: &Client,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> SentinelHubResult<String> {
    let response = client
        .post(token_url)
        .form(&[
            ("grant_type", "client_credentials"),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SentinelHubError::Auth(format!(
            "token endpoint returned {}: {}",
            status.as_u16(),
            truncate(&body)
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| SentinelHubError::Auth(format!("malformed token response: {}", e)))?;

    if token.access_token.is_empty() {
        return Err(SentinelHubError::Auth("empty access token".to_string()));
    }

    debug!(expires_in = ?token.expires_in, "Obtained access token");
    Ok(token.access_token)
}

/// Keep remote error bodies short in logs.
pub(crate) fn truncate(body: &str) -> &str {
    const MAX: usize = 512;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_response_deserializes() {
        let token: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"Bearer","expires_in":3599}"#,
        )
        .unwrap();
        assert_eq!(token.access_token, "abc");
        assert_eq!(token.expires_in, Some(3599));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "é".repeat(400);
        let short = truncate(&body);
        assert!(short.len() <= 512);
        assert!(short.chars().all(|c| c == 'é'));
        assert_eq!(truncate("short"), "short");
    }
}
