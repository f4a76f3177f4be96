//! # Back Office Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HARBOR_DB_PATH=/var/lib/harbor/harbor.db                           │
//! │     HARBOR_DEFAULT_SETTLEMENT=customer_credit                          │
//! │                                                                         │
//! │  2. TOML Config File, first of:                                        │
//! │     --config <PATH>                                                    │
//! │     $HARBOR_CONFIG                                                     │
//! │     ~/.config/backoffice/backoffice.toml (Linux)                       │
//! │     ~/Library/Application Support/com.harbor.backoffice/... (macOS)    │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     harbor.db, cash settlement, queue of 256                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "harbor.db"
//!
//! [accounting.map]
//! sales_returns = "4100"
//! sales_tax_payable = "2200"
//! refunds_payable = "2050"
//!
//! [accounting.returns]
//! default_settlement = "customer_credit"
//!
//! [worker]
//! queue_capacity = 256
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use harbor_core::accounting::{AccountMap, SettlementPolicy};
use harbor_core::validation::validate_account_map;

use crate::error::{BackofficeError, BackofficeResult};

pub const ENV_CONFIG_PATH: &str = "HARBOR_CONFIG";
pub const ENV_DB_PATH: &str = "HARBOR_DB_PATH";
pub const ENV_DEFAULT_SETTLEMENT: &str = "HARBOR_DEFAULT_SETTLEMENT";

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("harbor.db")
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnsSettings {
    /// `customer_credit` turns refunds into store credit; anything else
    /// leaves settlement to the till.
    #[serde(default)]
    pub default_settlement: SettlementPolicy,
}

/// The `[accounting]` section, handed to the settlement service as a value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingConfig {
    #[serde(default = "default_account_map")]
    pub map: AccountMap,

    #[serde(default)]
    pub returns: ReturnsSettings,
}

fn default_account_map() -> AccountMap {
    AccountMap::new()
        .with("sales_returns", "4100")
        .with("sales_tax_payable", "2200")
        .with("refunds_payable", "2050")
}

impl Default for AccountingConfig {
    fn default() -> Self {
        AccountingConfig {
            map: default_account_map(),
            returns: ReturnsSettings::default(),
        }
    }
}

impl AccountingConfig {
    pub fn settlement_policy(&self) -> &SettlementPolicy {
        &self.returns.default_settlement
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Bound of the settlement event channel.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for WorkerSettings {
    fn default() -> Self {
        WorkerSettings {
            queue_capacity: default_queue_capacity(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackofficeConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub accounting: AccountingConfig,

    #[serde(default)]
    pub worker: WorkerSettings,
}

impl BackofficeConfig {
    /// Loads defaults, then the config file, then environment overrides,
    /// then validates.
    ///
    /// An explicitly named file (argument or `HARBOR_CONFIG`) must exist.
    /// The platform default path is optional.
    pub fn load(explicit_path: Option<PathBuf>) -> BackofficeResult<Self> {
        let explicit = explicit_path.or_else(|| std::env::var_os(ENV_CONFIG_PATH).map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                info!(?path, "Loading back office config from file");
                Self::from_file(&path)?
            }
            None => match Self::default_config_path() {
                Some(path) if path.exists() => {
                    info!(?path, "Loading back office config from file");
                    Self::from_file(&path)?
                }
                other => {
                    debug!(path = ?other, "Config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> BackofficeResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> BackofficeResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `HARBOR_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(policy) = lookup(ENV_DEFAULT_SETTLEMENT) {
            debug!(policy = %policy, "Overriding default settlement from environment");
            self.accounting.returns.default_settlement = SettlementPolicy::from(policy);
        }
    }

    pub fn validate(&self) -> BackofficeResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(BackofficeError::InvalidConfig(
                "database.path must not be empty".into(),
            ));
        }

        validate_account_map(&self.accounting.map)
            .map_err(|e| BackofficeError::InvalidConfig(format!("accounting.map: {e}")))?;

        if self.worker.queue_capacity == 0 {
            return Err(BackofficeError::InvalidConfig(
                "worker.queue_capacity must be greater than 0".into(),
            ));
        }

        if let SettlementPolicy::Unrecognized(raw) = &self.accounting.returns.default_settlement {
            warn!(
                value = %raw,
                "Unrecognized accounting.returns.default_settlement; returns will not be credited"
            );
        }

        Ok(())
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "harbor", "backoffice")
            .map(|dirs| dirs.config_dir().join("backoffice.toml"))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
