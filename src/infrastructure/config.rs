use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub github: GithubSettings,
    #[serde(default)]
    pub summarizer: SummarizerSettings,
    #[serde(default)]
    pub identity: IdentitySettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    #[serde(default = "default_database_url")]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubSettings {
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    #[serde(default = "default_oauth_token_url")]
    pub oauth_token_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            api_base: default_github_api_base(),
            oauth_token_url: default_oauth_token_url(),
            client_id: None,
            client_secret: None,
        }
    }
}

impl GithubSettings {
    /// Client credentials, only when both are present and non-empty.
    pub fn oauth_credentials(&self) -> Option<(String, String)> {
        let id = self.client_id.as_deref().filter(|s| !s.is_empty())?;
        let secret = self.client_secret.as_deref().filter(|s| !s.is_empty())?;
        Some((id.to_string(), secret.to_string()))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummarizerSettings {
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_summarizer_api_base")]
    pub api_base: String,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            api_base: default_summarizer_api_base(),
        }
    }
}

impl SummarizerSettings {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct IdentitySettings {
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://dashboards.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_oauth_token_url() -> String {
    "https://github.com/login/oauth/access_token".to_string()
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_summarizer_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_cache_ttl_secs() -> u64 {
    300
}

/// Load `config/app.toml` (optional) overlaid with `APP_*` environment
/// variables, e.g. `APP_GITHUB__CLIENT_ID`.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/app").required(false))
        .add_source(config::Environment::with_prefix("APP").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_from_empty_source() {
        let config = parse("");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.summarizer.model, "gpt-4.1-mini");
        assert_eq!(config.identity.cache_ttl_secs, 300);
        assert!(config.summarizer.api_key().is_none());
        assert!(config.github.oauth_credentials().is_none());
    }

    #[test]
    fn test_sections_override_defaults() {
        let config = parse(
            r#"
            [server]
            port = 9000

            [github]
            client_id = "id"
            client_secret = "secret"

            [summarizer]
            api_key = "sk-test"
            model = "gpt-4o"
            "#,
        );
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(
            config.github.oauth_credentials(),
            Some(("id".to_string(), "secret".to_string()))
        );
        assert_eq!(config.summarizer.api_key(), Some("sk-test"));
        assert_eq!(config.summarizer.model, "gpt-4o");
    }

    #[test]
    fn test_blank_secrets_count_as_missing() {
        let config = parse(
            r#"
            [github]
            client_id = "id"
            client_secret = ""

            [summarizer]
            api_key = ""
            "#,
        );
        assert!(config.github.oauth_credentials().is_none());
        assert!(config.summarizer.api_key().is_none());
    }

    #[test]
    fn test_stale_credentials_section_is_ignored() {
        let config = parse(
            r#"
            [credentials]
            encryption_key = "left over"

            [identity]
            cache_ttl_secs = 60
            "#,
        );
        assert_eq!(config.identity.cache_ttl_secs, 60);
    }
}
