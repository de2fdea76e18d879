//! Board-level configuration
//!
//! Groups the SDK settings with the parameters of every SPI host on the
//! SoC. With the `toml` feature it can be loaded from a TOML document:
//!
//! ```toml
//! [sdk]
//! system_clock_hz = 50000000
//! tx_watermark = 8
//!
//! [[peripherals]]   # flash
//! tx_depth = 32
//!
//! [[peripherals]]   # host
//!
//! [[peripherals]]   # host 2
//! num_cs = 1
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{ConfigError, HostParams, SdkConfig};
use crate::peripheral::{PeripheralId, NUM_PERIPHERALS};

/// Complete SPI configuration of a board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BoardConfig {
    /// Engine settings
    pub sdk: SdkConfig,
    /// Per-peripheral parameters, in [`PeripheralId`] order
    pub peripherals: [HostParams; NUM_PERIPHERALS],
}

impl BoardConfig {
    /// Parameters of one peripheral
    pub fn params(&self, id: PeripheralId) -> &HostParams {
        &self.peripherals[id.index()]
    }

    /// Validate every peripheral and the SDK settings against each
    pub fn validate(&self) -> Result<(), ConfigError> {
        for params in &self.peripherals {
            params.validate()?;
            self.sdk.validate(params)?;
        }
        Ok(())
    }

    /// Parse and validate a TOML board description
    #[cfg(feature = "toml")]
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: BoardConfig = toml::from_str(text).map_err(|_| ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }
}
