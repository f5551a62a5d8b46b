//! Runtime configuration
//!
//! Loaded once at startup from a JSON file, with environment overrides for
//! the deploy-time values (contract address).

use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{MINT_ELIGIBILITY_THRESHOLD, MINT_PRICE_WEI, MINT_SERVICE_FLOOR};
use crate::sim::ClockMode;
use crate::tuning::Tuning;

/// Settings file path override
pub const SETTINGS_PATH_ENV: &str = "FLAPPY_SETTINGS";
/// Contract address override
pub const CONTRACT_ADDRESS_ENV: &str = "FLAPPY_NFT_CONTRACT_ADDRESS";

/// Errors loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning: {0}")]
    InvalidTuning(String),

    #[error("invalid clock: {0}")]
    InvalidClock(String),

    #[error("invalid contract address {value:?}: {reason}")]
    InvalidAddress { value: String, reason: String },
}

/// Minting thresholds and contract details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MintSettings {
    /// Deployed mint contract; unset means minting is unavailable
    pub contract_address: Option<Address>,
    /// Mint price in wei
    pub mint_price_wei: u128,
    /// Client-side score that offers minting
    pub eligibility_threshold: u32,
    /// Service-side minimum score
    pub service_floor: u32,
}

impl Default for MintSettings {
    fn default() -> Self {
        Self {
            contract_address: None,
            mint_price_wei: MINT_PRICE_WEI,
            eligibility_threshold: MINT_ELIGIBILITY_THRESHOLD,
            service_floor: MINT_SERVICE_FLOOR,
        }
    }
}

/// Everything configurable at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tuning: Tuning,
    pub mint: MintSettings,
    pub clock: ClockMode,
    /// Gap seed; unset means seed from the clock
    pub seed: Option<u64>,
    /// Where the host keeps its leaderboard; unset means in-memory only
    pub high_scores_path: Option<PathBuf>,
}

impl Settings {
    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.tuning.validate().map_err(SettingsError::InvalidTuning)?;
        settings.clock.validate().map_err(SettingsError::InvalidClock)?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Apply environment overrides through `lookup`
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), SettingsError> {
        if let Some(value) = lookup(CONTRACT_ADDRESS_ENV).filter(|v| !v.trim().is_empty()) {
            let address = value.trim().parse::<Address>().map_err(|e| SettingsError::InvalidAddress {
                value: value.clone(),
                reason: e.to_string(),
            })?;
            self.mint.contract_address = Some(address);
        }
        Ok(())
    }

    /// Load from `FLAPPY_SETTINGS` (if set) plus environment overrides
    ///
    /// Never fails: problems are logged and defaults used instead.
    pub fn load() -> Self {
        let mut settings = match std::env::var_os(SETTINGS_PATH_ENV) {
            Some(path) => match Self::load_from(Path::new(&path)) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", Path::new(&path).display());
                    settings
                }
                Err(e) => {
                    log::warn!("{e}; using default settings");
                    Self::default()
                }
            },
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        };

        if let Err(e) = settings.apply_env_with(|key| std::env::var(key).ok()) {
            log::warn!("{e}; minting stays unconfigured");
        }
        settings
    }

    /// Save settings as pretty JSON
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
