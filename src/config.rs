use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub identity: IdentityConfig,
    pub teacher: TeacherConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Tokens are issued by the external identity provider and only verified here.
#[derive(Debug, Deserialize, Clone)]
pub struct IdentityConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TeacherConfig {
    pub emails: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_owned()
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (PENSUM__DATABASE__URL, DATABASE_URL, JWT_SECRET)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("database.url", "sqlite:pensum.db")?
            .set_default("database.max_connections", 5)?
            .set_default("identity.issuer", "pensum-identity")?
            .set_default("identity.audience", "pensum")?
            .set_default("teacher.emails", vec!["teacher@pensum.localhost"])?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_owned());

        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("PENSUM")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("teacher.emails")
                .try_parsing(true),
        );

        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }
        if let Ok(jwt_secret) = env::var("JWT_SECRET") {
            builder = builder.set_override("identity.secret", jwt_secret)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.identity.secret.len() < 32 {
            return Err("identity secret must be at least 32 characters long".to_owned());
        }
        if self.database.max_connections < 1 {
            return Err("database max_connections must be at least 1".to_owned());
        }
        if self.server.port == 0 {
            return Err("server port must be greater than 0".to_owned());
        }
        if self.teacher.emails.iter().all(|email| email.trim().is_empty()) {
            return Err("at least one teacher email is required".to_owned());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_owned(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:test.db".to_owned(),
                max_connections: 5,
            },
            identity: IdentityConfig {
                secret: "test_secret_key_minimum_32_characters_long".to_owned(),
                issuer: "pensum-identity".to_owned(),
                audience: "pensum".to_owned(),
            },
            teacher: TeacherConfig {
                emails: vec!["teacher@pensum.localhost".to_owned()],
            },
            log: LogConfig::default(),
        }
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validation_short_secret() {
        let mut config = config();
        config.identity.secret = "short".to_owned();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_port() {
        let mut config = config();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_zero_connections() {
        let mut config = config();
        config.database.max_connections = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_without_teacher() {
        let mut config = config();
        config.teacher.emails = vec![];
        assert!(config.validate().is_err());

        config.teacher.emails = vec!["  ".to_owned()];
        assert!(config.validate().is_err());
    }
}
