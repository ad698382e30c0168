use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file read from the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "sql.yml";
/// Bot token file read from the working directory.
pub const DEFAULT_TOKEN_PATH: &str = "token";

const REDACTED_PASSWORD: &str = "********";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0}")]
    Message(String),
}

impl ConfigError {
    fn configuration(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(rename = "dbuser")]
    pub user: String,
    #[serde(rename = "dbpassword")]
    pub password: String,
    #[serde(rename = "dbname")]
    pub name: String,
    #[serde(rename = "dbdriver")]
    pub driver: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub protocol: String,
    pub ip: String,
    pub port: u16,
}

/// Store backend selected by the `dbdriver` config key, in the style of the
/// provider keys elsewhere in the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreDriverKind {
    Sqlite,
}

impl StoreDriverKind {
    pub const fn as_key(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
        }
    }

    pub fn from_key(driver_key: &str) -> Option<Self> {
        match driver_key {
            "sqlite" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

impl SqlConfig {
    /// Loads and validates the configuration file. Absence or a parse
    /// failure is fatal at startup.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|err| {
            ConfigError::configuration(format!(
                "failed to read config file '{}': {err}",
                path.display()
            ))
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|err| {
            ConfigError::configuration(format!(
                "failed to parse config file '{}': {err}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.name.trim().is_empty() {
            return Err(ConfigError::configuration(
                "database dbname cannot be empty",
            ));
        }
        if self.database.driver.trim().is_empty() {
            return Err(ConfigError::configuration(
                "database dbdriver cannot be empty",
            ));
        }
        Ok(())
    }

    pub fn store_driver(&self) -> Result<StoreDriverKind, ConfigError> {
        StoreDriverKind::from_key(self.database.driver.as_str()).ok_or_else(|| {
            ConfigError::configuration(format!(
                "unknown database driver '{}'; expected one of: sqlite",
                self.database.driver
            ))
        })
    }

    /// Data source name in the `user:password@protocol(ip:port)/name`
    /// format. Only ever rendered for the redacted debug log.
    pub fn dsn(&self) -> String {
        self.render_dsn(self.database.password.as_str())
    }

    /// DSN with the password masked; credentials never reach the log sink.
    pub fn redacted_dsn(&self) -> String {
        self.render_dsn(REDACTED_PASSWORD)
    }

    fn render_dsn(&self, password: &str) -> String {
        format!(
            "{}:{}@{}({}:{})/{}",
            self.database.user,
            password,
            self.server.protocol,
            self.server.ip,
            self.server.port,
            self.database.name,
        )
    }
}

/// Reads the bot token file; its contents are handed to the gateway
/// verbatim.
pub fn read_token(path: impl AsRef<Path>) -> Result<String, ConfigError> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|err| {
        ConfigError::configuration(format!(
            "failed to read token file '{}': {err}",
            path.display()
        ))
    })
}
