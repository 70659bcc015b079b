//! Session configuration and its TOML loader.

use std::time::Duration;

use bulwark_core::WorldConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_SEED: u64 = 0x6275_6c77_6172_6b21;
const DEFAULT_AUTO_UPGRADE_INTERVAL_MS: u64 = 1_000;
const DEFAULT_AUTO_WAVE_DELAY_MS: u64 = 1_000;
const MIN_COLUMNS: u32 = 3;

/// Everything required to build or rebuild a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Tunables of the authoritative world.
    pub world: WorldConfig,
    /// Seed of every random stream used by the session.
    pub seed: u64,
    /// Real time, in milliseconds, between two passive upgrade sweeps.
    pub auto_upgrade_interval_ms: u64,
    /// Real time, in milliseconds, between a wave clear and the automatic next wave.
    pub auto_wave_delay_ms: u64,
}

impl SessionConfig {
    /// Parses and validates a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration describes a playable session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.columns < MIN_COLUMNS {
            return Err(ConfigError::TooFewColumns {
                columns: self.world.columns,
                minimum: MIN_COLUMNS,
            });
        }

        if self.world.rows == 0 {
            return Err(ConfigError::NoRows);
        }

        if self.world.starting_lives == 0 {
            return Err(ConfigError::NoLives);
        }

        if self.world.max_frame_delta_ms == 0 {
            return Err(ConfigError::ZeroFrameDelta);
        }

        if self.auto_upgrade_interval_ms == 0 {
            return Err(ConfigError::ZeroUpgradeInterval);
        }

        Ok(())
    }

    /// Real time between two passive upgrade sweeps.
    #[must_use]
    pub const fn auto_upgrade_interval(&self) -> Duration {
        Duration::from_millis(self.auto_upgrade_interval_ms)
    }

    /// Real time between a wave clear and the automatic next wave.
    #[must_use]
    pub const fn auto_wave_delay(&self) -> Duration {
        Duration::from_millis(self.auto_wave_delay_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            seed: DEFAULT_SEED,
            auto_upgrade_interval_ms: DEFAULT_AUTO_UPGRADE_INTERVAL_MS,
            auto_wave_delay_ms: DEFAULT_AUTO_WAVE_DELAY_MS,
        }
    }
}

/// Errors raised while loading a [`SessionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("could not parse session configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The grid cannot fit a buildable column between spawn and exit.
    #[error("grid needs at least {minimum} columns but has {columns}")]
    TooFewColumns {
        /// Configured column count.
        columns: u32,
        /// Smallest supported column count.
        minimum: u32,
    },
    /// The grid has no rows.
    #[error("grid needs at least one row")]
    NoRows,
    /// The session would end before the first leak.
    #[error("starting_lives must be positive")]
    NoLives,
    /// Frames would never advance the simulation.
    #[error("max_frame_delta_ms must be positive")]
    ZeroFrameDelta,
    /// The passive upgrade sweep would never pause.
    #[error("auto_upgrade_interval_ms must be positive")]
    ZeroUpgradeInterval,
}
