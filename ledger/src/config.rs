//! Wallet-manager configuration with TOML file support.

use crate::error::LedgerError;
use crate::hooks::ExceptionList;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tally_transactions::TransactionId;
use tally_types::Milestones;
use tally_utils::LogFormat;

/// Configuration for a [`WalletManager`](crate::WalletManager).
///
/// Loaded from a TOML file via [`LedgerConfig::from_toml_file`] or built
/// programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Network epoch as Unix seconds; stake timestamps count from here.
    #[serde(default)]
    pub epoch_unix_secs: u64,

    /// Half-width of the stake halving window around the redeemable time.
    #[serde(default = "default_halving_window_secs")]
    pub halving_window_secs: u64,

    /// Delay between stake creation and its power-up.
    #[serde(default)]
    pub power_up_delay_secs: u64,

    #[serde(default)]
    pub log_format: LogFormat,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Transaction ids applied without validation.
    #[serde(default)]
    pub exceptions: Vec<TransactionId>,

    #[serde(default)]
    pub milestones: Milestones,
}

fn default_halving_window_secs() -> u64 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LedgerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| LedgerError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    pub fn exception_list(&self) -> ExceptionList {
        ExceptionList::new(self.exceptions.iter().cloned())
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            epoch_unix_secs: 0,
            halving_window_secs: default_halving_window_secs(),
            power_up_delay_secs: 0,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            exceptions: Vec::new(),
            milestones: Milestones::default(),
        }
    }
}
