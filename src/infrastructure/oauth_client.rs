// GitHub OAuth token endpoint client
use crate::application::auth_service::{OAuthError, OAuthExchange};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TOKEN_EXCHANGE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct GithubOAuthClient {
    token_url: String,
    credentials: Option<(String, String)>,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl GithubOAuthClient {
    /// `credentials` is `(client_id, client_secret)`; `None` means OAuth is
    /// not configured and every exchange fails with `NotConfigured`.
    pub fn new(token_url: String, credentials: Option<(String, String)>) -> Self {
        Self {
            token_url,
            credentials,
            http: reqwest::Client::new(),
        }
    }
}

fn interpret(response: TokenResponse) -> Result<String, OAuthError> {
    if let Some(error) = response.error {
        return Err(OAuthError::Rejected(
            response.error_description.unwrap_or(error),
        ));
    }

    response
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| OAuthError::Malformed("response carried no access_token".to_string()))
}

#[async_trait]
impl OAuthExchange for GithubOAuthClient {
    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
        let (client_id, client_secret) =
            self.credentials.as_ref().ok_or(OAuthError::NotConfigured)?;

        let response = self
            .http
            .post(&self.token_url)
            .timeout(TOKEN_EXCHANGE_TIMEOUT)
            .header("Accept", "application/json")
            .json(&TokenRequest {
                client_id: client_id.as_str(),
                client_secret: client_secret.as_str(),
                code,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "token exchange request failed");
                OAuthError::Unreachable(e.to_string())
            })?;

        let body = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::Malformed(e.to_string()))?;

        interpret(body)
    }
}
