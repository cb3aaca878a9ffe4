//! # Store Configuration
//!
//! Environment-driven settings for the promotion store.
//!
//! ## Environment Variables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Variable                      Default        Meaning                   │
//! │  ────────────────────────────  ─────────────  ───────────────────────── │
//! │  COMANDA_DB_PATH               comanda.db     SQLite file               │
//! │  COMANDA_DB_MAX_CONNECTIONS    5              Pool size                 │
//! │  COMANDA_RUN_MIGRATIONS        true           Migrate on connect        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use crate::pool::DbConfig;

pub const DB_PATH_VAR: &str = "COMANDA_DB_PATH";
pub const MAX_CONNECTIONS_VAR: &str = "COMANDA_DB_MAX_CONNECTIONS";
pub const RUN_MIGRATIONS_VAR: &str = "COMANDA_RUN_MIGRATIONS";

/// A configuration value that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: String, value: String },
}

/// Where the promotion store lives and how to connect to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            database_path: PathBuf::from("comanda.db"),
            max_connections: 5,
            run_migrations: true,
        }
    }
}

impl StoreConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads the configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = StoreConfig::default();

        if let Some(path) = lookup(DB_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            debug!(path = %path, "Overriding database path from environment");
            config.database_path = PathBuf::from(path.trim());
        }

        if let Some(raw) = lookup(MAX_CONNECTIONS_VAR) {
            config.max_connections = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid(MAX_CONNECTIONS_VAR, &raw))?;
        }

        if let Some(raw) = lookup(RUN_MIGRATIONS_VAR) {
            config.run_migrations =
                parse_bool(&raw).ok_or_else(|| invalid(RUN_MIGRATIONS_VAR, &raw))?;
        }

        Ok(config)
    }

    /// Pool settings for [`crate::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .run_migrations(self.run_migrations)
    }
}

fn invalid(var: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var: var.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = StoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.database_path, PathBuf::from("comanda.db"));
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup_from(&[
            (DB_PATH_VAR, "/data/orders.db"),
            (MAX_CONNECTIONS_VAR, " 12 "),
            (RUN_MIGRATIONS_VAR, "off"),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/data/orders.db"));
        assert_eq!(config.max_connections, 12);
        assert!(!config.run_migrations);

        let db = config.db_config();
        assert_eq!(db.max_connections, 12);
        assert!(!db.run_migrations);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = StoreConfig::from_lookup(lookup_from(&[(MAX_CONNECTIONS_VAR, "lots")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                var: MAX_CONNECTIONS_VAR.to_string(),
                value: "lots".to_string(),
            }
        );

        assert!(StoreConfig::from_lookup(lookup_from(&[(MAX_CONNECTIONS_VAR, "0")])).is_err());
        assert!(StoreConfig::from_lookup(lookup_from(&[(RUN_MIGRATIONS_VAR, "maybe")])).is_err());
    }
}
