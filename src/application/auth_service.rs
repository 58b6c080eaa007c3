// Authentication use case - exchange an OAuth authorization code for an access token
use async_trait::async_trait;
use std::sync::Arc;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OAuthError {
    #[error("Missing code parameter")]
    MissingCode,
    #[error("GitHub OAuth is not configured on the server")]
    NotConfigured,
    #[error("Could not reach GitHub: {0}")]
    Unreachable(String),
    #[error("Unexpected response from GitHub: {0}")]
    Malformed(String),
    /// Upstream refused the code; carries its description.
    #[error("{0}")]
    Rejected(String),
}

/// Port for the upstream token endpoint.
#[async_trait]
pub trait OAuthExchange: Send + Sync {
    async fn exchange_code(&self, code: &str) -> Result<String, OAuthError>;
}

#[derive(Clone)]
pub struct AuthService {
    exchange: Arc<dyn OAuthExchange>,
}

impl AuthService {
    pub fn new(exchange: Arc<dyn OAuthExchange>) -> Self {
        Self { exchange }
    }

    pub async fn login(&self, code: Option<&str>) -> Result<String, OAuthError> {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or(OAuthError::MissingCode)?;

        let token = self.exchange.exchange_code(code).await?;
        tracing::info!("exchanged authorization code for access token");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticExchange;

    #[async_trait]
    impl OAuthExchange for StaticExchange {
        async fn exchange_code(&self, code: &str) -> Result<String, OAuthError> {
            match code {
                "good" => Ok("gho_token".to_string()),
                _ => Err(OAuthError::Rejected(
                    "The code passed is incorrect or expired.".to_string(),
                )),
            }
        }
    }

    #[tokio::test]
    async fn test_login_requires_code() {
        let service = AuthService::new(Arc::new(StaticExchange));
        assert_eq!(service.login(None).await, Err(OAuthError::MissingCode));
        assert_eq!(service.login(Some("  ")).await, Err(OAuthError::MissingCode));
    }

    #[tokio::test]
    async fn test_login_passes_through_exchange_result() {
        let service = AuthService::new(Arc::new(StaticExchange));
        assert_eq!(service.login(Some("good")).await.unwrap(), "gho_token");
        assert!(matches!(
            service.login(Some("stale")).await,
            Err(OAuthError::Rejected(_))
        ));
    }
}
