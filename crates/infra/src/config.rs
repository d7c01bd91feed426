//! Ledger configuration.
//!
//! Loaded hierarchically:
//! 1. Defaults in code
//! 2. An optional file (`config/storeledger.toml` by default)
//! 3. Environment overrides with the `STORELEDGER` prefix and `__` separator,
//!    e.g. `STORELEDGER__IDS__STRATEGY=counter`

use config::{ConfigError, Environment, File};
use serde::Deserialize;

use crate::sequence::IdStrategy;

pub const DEFAULT_CONFIG_PATH: &str = "config/storeledger";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LedgerConfig {
    pub store: StoreConfig,
    pub ids: IdConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Records requested per scan page.
    pub scan_page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdConfig {
    pub strategy: IdStrategy,
}

/// Log filter for the embedding process; pass it to
/// `storeledger_observability::init_with_filter` at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter directive.
    pub filter: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                scan_page_size: 100,
            },
            ids: IdConfig {
                strategy: IdStrategy::Scan,
            },
            log: LogConfig {
                filter: "info".to_string(),
            },
        }
    }
}

impl LedgerConfig {
    /// Load from the default file location and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// Load from `path` (extension optional; the file may be absent) and the
    /// environment.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config: Self = config::Config::builder()
            .set_default("store.scan_page_size", defaults.store.scan_page_size as u64)?
            .set_default("ids.strategy", "scan")?
            .set_default("log.filter", defaults.log.filter)?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("STORELEDGER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.scan_page_size == 0 {
            return Err(ConfigError::Message(
                "store.scan_page_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(name: &str, body: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("{name}-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let loaded = LedgerConfig::load_from("/nonexistent/storeledger").unwrap();
        assert_eq!(loaded.store.scan_page_size, 100);
        assert_eq!(loaded.log.filter, "info");
    }

    #[test]
    fn file_overrides_defaults() {
        let path = write_config(
            "storeledger-file",
            "[store]\nscan_page_size = 25\n\n[ids]\nstrategy = \"counter\"\n",
        );
        let loaded = LedgerConfig::load_from(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.store.scan_page_size, 25);
        assert_eq!(loaded.ids.strategy, IdStrategy::Counter);
        assert_eq!(loaded.log.filter, "info");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let path = write_config("storeledger-zero", "[store]\nscan_page_size = 0\n");
        assert!(LedgerConfig::load_from(path.to_str().unwrap()).is_err());
        std::fs::remove_file(path).ok();
    }
}
