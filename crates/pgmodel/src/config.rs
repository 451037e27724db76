//! Connection settings.

use crate::error::{OrmError, OrmResult};
use serde::Deserialize;
use tokio_postgres::config::Host;

/// Database connection settings.
///
/// Deserializable from any serde source; missing keys fall back to
/// [`DbConfig::default`].
///
/// ```ignore
/// let config = DbConfig::new().host("db").name("shop").pool_size(8);
/// let db = Db::connect(&config).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// Maximum number of pooled connections.
    pub pool_size: usize,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: String::new(),
            name: "postgres".to_string(),
            pool_size: 16,
        }
    }
}

impl DbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `postgres://` URL or a `key=value` connection string.
    ///
    /// Settings absent from the string keep their defaults.
    pub fn from_url(url: &str) -> OrmResult<Self> {
        let parsed: tokio_postgres::Config = url
            .parse()
            .map_err(|e: tokio_postgres::Error| OrmError::Connection(e.to_string()))?;

        let mut config = Self::default();
        if let Some(Host::Tcp(host)) = parsed.get_hosts().first() {
            config.host = host.clone();
        }
        if let Some(port) = parsed.get_ports().first() {
            config.port = *port;
        }
        if let Some(user) = parsed.get_user() {
            config.user = user.to_string();
        }
        if let Some(password) = parsed.get_password() {
            config.password = String::from_utf8_lossy(password).into_owned();
        }
        if let Some(name) = parsed.get_dbname() {
            config.name = name.to_string();
        }
        Ok(config)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size;
        self
    }

    /// Driver-level configuration for these settings.
    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut pg = tokio_postgres::Config::new();
        pg.host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(&self.name);
        if !self.password.is_empty() {
            pg.password(&self.password);
        }
        pg
    }
}
