use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub reddit: RedditConfig,
    pub frontend: FrontendConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub user_agent: String,
    /// Origin for the authorize and token endpoints.
    pub auth_origin: String,
    /// Origin for authenticated API calls (identity, listings).
    pub api_origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontendConfig {
    pub origin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Timeout applied to every upstream request, in seconds.
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long a pending OAuth state stays consumable.
    pub state_ttl_secs: i64,
    /// Interval for sweeping consumed/expired entries. 0 disables the sweeper.
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            reddit: RedditConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: String::new(),
                user_agent: "reddit-stats-api/0.1".to_string(),
                auth_origin: "https://www.reddit.com".to_string(),
                api_origin: "https://oauth.reddit.com".to_string(),
            },
            frontend: FrontendConfig {
                origin: String::new(),
            },
            http: HttpConfig { timeout_secs: 10 },
            session: SessionConfig {
                state_ttl_secs: 600,
                sweep_interval_secs: 300,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if Path::new("config.yaml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("REDDIT_STATS")
                .prefix_separator("_")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut builder =
            ConfigBuilder::builder().add_source(config::Config::try_from(&Config::default())?);

        if path.as_ref().exists() {
            builder = builder.add_source(File::from(path.as_ref()));
        }

        builder = builder.add_source(
            Environment::with_prefix("REDDIT_STATS")
                .prefix_separator("_")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }

    /// Startup validation: the OAuth client credentials, redirect URI, and
    /// frontend origin have no usable defaults and must be supplied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();

        if self.reddit.client_id.is_empty() {
            missing.push("reddit.client_id");
        }
        if self.reddit.client_secret.is_empty() {
            missing.push("reddit.client_secret");
        }
        if self.reddit.redirect_uri.is_empty() {
            missing.push("reddit.redirect_uri");
        }
        if self.frontend.origin.is_empty() {
            missing.push("frontend.origin");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(format!(
                "missing required configuration: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.reddit.auth_origin, "https://www.reddit.com");
        assert_eq!(config.reddit.api_origin, "https://oauth.reddit.com");
        assert_eq!(config.http.timeout_secs, 10);
        assert_eq!(config.session.state_ttl_secs, 600);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_validate_rejects_missing_credentials() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("reddit.client_id"));
        assert!(message.contains("frontend.origin"));
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let mut config = Config::default();
        config.reddit.client_id = "id".to_string();
        config.reddit.client_secret = "secret".to_string();
        config.reddit.redirect_uri = "http://localhost:8000/auth/callback".to_string();
        config.frontend.origin = "http://localhost:3000".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_yaml_file() {
        let yaml_content = r#"
server:
  host: "127.0.0.1"
  port: 4000
reddit:
  client_id: "file-id"
  client_secret: "file-secret"
  redirect_uri: "http://localhost:4000/auth/callback"
frontend:
  origin: "http://localhost:5173"
logging:
  level: "warn"
"#;

        let mut temp_file = NamedTempFile::with_suffix(".yaml").unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.reddit.client_id, "file-id");
        assert_eq!(config.frontend.origin, "http://localhost:5173");
        assert_eq!(config.logging.level, "warn");
        // Untouched sections keep their defaults.
        assert_eq!(config.session.state_ttl_secs, 600);
    }

    #[test]
    fn test_config_load_nonexistent_file() {
        let config = Config::load_from_file("nonexistent.yaml").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
    }
}
