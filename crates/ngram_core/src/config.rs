//! Connection settings and the `ngram_db_*` environment contract.
//!
//! # Responsibility
//! - Read connection parameters from process environment.
//! - Keep credentials out of debug and log output.
//!
//! # Invariants
//! - `database_name` is always present.
//! - The password is never rendered by `Debug` or `Display`.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub const ENV_HOST: &str = "ngram_db_host";
pub const ENV_PORT: &str = "ngram_db_port";
pub const ENV_USERNAME: &str = "ngram_db_username";
pub const ENV_PASSWORD: &str = "ngram_db_password";
pub const ENV_DATABASE_NAME: &str = "ngram_db_databaseName";

/// Database name that selects a private in-memory database.
pub const IN_MEMORY_DATABASE: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidPort { value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVar(name) => write!(f, "environment variable `{name}` is not set"),
            Self::InvalidPort { value } => {
                write!(f, "`{ENV_PORT}` must be a port number, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

/// Parameters needed to reach an n-gram database.
///
/// With the embedded SQLite backend `database_name` is the database file
/// path; host, port and username are carried as connection metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub database_name: String,
}

impl DbSettings {
    /// Settings for a database addressed by name only.
    pub fn for_database(database_name: impl Into<String>) -> Self {
        Self {
            host: None,
            port: None,
            username: None,
            password: None,
            database_name: database_name.into(),
        }
    }

    /// Reads settings from the `ngram_db_*` environment variables.
    ///
    /// # Errors
    /// - `ngram_db_databaseName` is unset or blank.
    /// - `ngram_db_port` is set but not a valid port number.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`DbSettings::from_env`] with an injected variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let database_name =
            read(ENV_DATABASE_NAME).ok_or(ConfigError::MissingVar(ENV_DATABASE_NAME))?;
        let port = match read(ENV_PORT) {
            Some(value) => Some(
                value
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort { value })?,
            ),
            None => None,
        };

        Ok(Self {
            host: read(ENV_HOST),
            port,
            username: read(ENV_USERNAME),
            password: lookup(ENV_PASSWORD),
            database_name,
        })
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_name == IN_MEMORY_DATABASE
    }
}

impl Debug for DbSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database_name", &self.database_name)
            .finish()
    }
}

impl Display for DbSettings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(user) = &self.username {
            write!(f, "{user}@")?;
        }
        write!(f, "{}", self.host.as_deref().unwrap_or("localhost"))?;
        if let Some(port) = self.port {
            write!(f, ":{port}")?;
        }
        write!(f, "/{}", self.database_name)
    }
}
