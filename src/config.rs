use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL, required by the server (see [`AppConfig::database_url`])
    #[serde(default)]
    pub postgres_url: Option<String>,
    pub auth: AuthConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: i64,
}

fn default_token_ttl() -> i64 {
    60
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Retries after a lock timeout, deadlock or serialization failure
    pub max_conflict_retries: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_conflict_retries: crate::ledger::DEFAULT_MAX_RETRIES,
        }
    }
}

impl AppConfig {
    /// Read `config/<env>.yaml`, then apply `DATABASE_URL` / `JWT_SECRET`
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::parse(&content)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Connection URL the server must start with
    ///
    /// Items, users and transactions all live in PostgreSQL; there is no
    /// runtime fallback store.
    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.postgres_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .context("postgres_url is not configured (set it in the config file or DATABASE_URL)")
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(content).context("Failed to parse config yaml")
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("DATABASE_URL").filter(|v| !v.is_empty()) {
            self.postgres_url = Some(url);
        }
        if let Some(secret) = var("JWT_SECRET").filter(|v| !v.is_empty()) {
            self.auth.jwt_secret = secret;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEV: &str = r#"
log_level: info
log_dir: ./logs
log_file: market_ledger.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8080
auth:
  jwt_secret: dev-secret
"#;

    #[test]
    fn test_parse_applies_defaults() {
        let config = AppConfig::parse(DEV).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert!(config.postgres_url.is_none());
        assert_eq!(config.auth.token_ttl_minutes, 60);
        assert_eq!(config.ledger.max_conflict_retries, 3);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::parse(DEV).unwrap();
        config.apply_env_overrides(|key| match key {
            "DATABASE_URL" => Some("postgresql://localhost/market".to_string()),
            "JWT_SECRET" => Some(String::new()),
            _ => None,
        });
        assert_eq!(
            config.postgres_url.as_deref(),
            Some("postgresql://localhost/market")
        );
        // empty values are ignored
        assert_eq!(config.auth.jwt_secret, "dev-secret");
    }

    #[test]
    fn test_database_url_is_required() {
        let mut config = AppConfig::parse(DEV).unwrap();
        let err = config.database_url().unwrap_err();
        assert!(err.to_string().contains("postgres_url is not configured"));

        config.postgres_url = Some(String::new());
        assert!(config.database_url().is_err());

        config.apply_env_overrides(|key| {
            (key == "DATABASE_URL").then(|| "postgresql://localhost/market".to_string())
        });
        assert_eq!(config.database_url().unwrap(), "postgresql://localhost/market");
    }

    #[test]
    fn test_missing_auth_section_is_rejected() {
        let yaml = DEV.replace("auth:\n  jwt_secret: dev-secret\n", "");
        assert!(AppConfig::parse(&yaml).is_err());
    }
}
