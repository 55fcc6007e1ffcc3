//! Engine configuration (§2a "Configuration"). Deliberately small: this
//! engine has one structural knob (`btree_order`) and one optional
//! persistence target, following the same `Default` + fluent-builder +
//! `validate()` shape the rest of this codebase uses for its configuration
//! types.

use std::path::PathBuf;

use crate::error::SqlResult;

/// Log levels exposed to the CLI's `-v`/`RUST_LOG` wiring (§2a). Ordered
/// from quietest to loudest so `-v` can take the `max` against the
/// configured level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" => Some(LogLevel::Error),
            "warn" => Some(LogLevel::Warn),
            "info" => Some(LogLevel::Info),
            "debug" => Some(LogLevel::Debug),
            "trace" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    pub fn as_tracing_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Fan-out of every B+ tree node (§4.1). Must be at least 3.
    pub btree_order: usize,
    /// Where the engine persists its catalog. `None` means in-memory only.
    pub file_path: Option<PathBuf>,
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            btree_order: 4,
            file_path: None,
            log_level: LogLevel::Info,
        }
    }
}

impl Config {
    pub fn validate(&self) -> SqlResult<()> {
        if self.btree_order < 3 {
            return Err(crate::error::SqlError::invalid_argument(
                "btree_order must be at least 3",
            ));
        }
        Ok(())
    }

    /// Applies `SQL_ENGINE_BTREE_ORDER` / `SQL_ENGINE_LOG_LEVEL` overrides
    /// when present and well-formed, leaving the field untouched otherwise.
    pub fn apply_environment_overrides(&mut self) {
        if let Ok(order) = std::env::var("SQL_ENGINE_BTREE_ORDER") {
            if let Ok(order) = order.parse::<usize>() {
                self.btree_order = order;
            }
        }
        if let Ok(level) = std::env::var("SQL_ENGINE_LOG_LEVEL") {
            if let Some(level) = LogLevel::from_str(&level) {
                self.log_level = level;
            }
        }
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Fluent builder mirroring this codebase's existing configuration style.
#[derive(Debug)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
        }
    }

    pub fn btree_order(mut self, order: usize) -> Self {
        self.config.btree_order = order;
        self
    }

    pub fn file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.file_path = Some(path.into());
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.log_level = level;
        self
    }

    pub fn build(self) -> SqlResult<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn low_btree_order_fails_validation() {
        let config = Config {
            btree_order: 2,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn builder_produces_a_working_config() {
        let config = Config::builder().btree_order(5).build().unwrap();
        assert_eq!(config.btree_order, 5);
    }

    #[test]
    fn builder_rejects_invalid_order() {
        assert!(Config::builder().btree_order(1).build().is_err());
    }
}
