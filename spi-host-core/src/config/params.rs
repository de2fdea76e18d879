//! Peripheral and SDK parameters

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::words::ByteOrder;

/// Largest command queue depth STATUS.CMDQD can report
pub const MAX_CMD_DEPTH: u8 = 15;

/// CONFIGOPTS registers in the register map, one per addressable line
pub const MAX_NUM_CS: u8 = 2;

/// Synthesis parameters of one SPI host instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HostParams {
    /// Chip-select lines
    pub num_cs: u8,
    /// TX FIFO depth in words
    pub tx_depth: u8,
    /// RX FIFO depth in words
    pub rx_depth: u8,
    /// Command queue depth
    pub cmd_depth: u8,
}

impl HostParams {
    pub const fn new() -> Self {
        Self {
            num_cs: 2,
            tx_depth: 72,
            rx_depth: 64,
            cmd_depth: 4,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_cs == 0 || self.num_cs > MAX_NUM_CS {
            return Err(ConfigError::NumCsInvalid);
        }
        if self.tx_depth == 0
            || self.rx_depth == 0
            || self.cmd_depth == 0
            || self.cmd_depth > MAX_CMD_DEPTH
        {
            return Err(ConfigError::DepthInvalid);
        }
        Ok(())
    }
}

impl Default for HostParams {
    fn default() -> Self {
        Self::new()
    }
}

/// Transaction engine settings shared by all peripherals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SdkConfig {
    /// System clock feeding the SPI hosts, in Hz
    pub system_clock_hz: u32,
    /// TX watermark override (words); `None` uses a quarter of the FIFO
    pub tx_watermark: Option<u8>,
    /// RX watermark override (words); `None` leaves 12 words of headroom
    pub rx_watermark: Option<u8>,
    /// Byte order used when packing bytes into FIFO words
    pub byte_order: ByteOrder,
}

impl SdkConfig {
    pub const fn new(system_clock_hz: u32) -> Self {
        Self {
            system_clock_hz,
            tx_watermark: None,
            rx_watermark: None,
            byte_order: ByteOrder::LittleEndian,
        }
    }

    /// TX watermark programmed at launch
    pub fn tx_watermark(&self, params: &HostParams) -> u8 {
        self.tx_watermark.unwrap_or(params.tx_depth / 4)
    }

    /// RX watermark programmed at launch
    pub fn rx_watermark(&self, params: &HostParams) -> u8 {
        self.rx_watermark
            .unwrap_or(params.rx_depth.saturating_sub(12))
    }

    /// Check the settings against one peripheral
    pub fn validate(&self, params: &HostParams) -> Result<(), ConfigError> {
        if self.system_clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        if self.tx_watermark(params) > params.tx_depth
            || self.rx_watermark(params) > params.rx_depth
        {
            return Err(ConfigError::WatermarkExceeds);
        }
        Ok(())
    }
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self::new(100_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_watermarks() {
        let params = HostParams::default();
        let cfg = SdkConfig::default();
        assert_eq!(cfg.tx_watermark(&params), 18);
        assert_eq!(cfg.rx_watermark(&params), 52);
        assert!(cfg.validate(&params).is_ok());
    }

    #[test]
    fn test_watermark_override_bounded_by_depth() {
        let params = HostParams::default();
        let cfg = SdkConfig {
            rx_watermark: Some(65),
            ..SdkConfig::default()
        };
        assert_eq!(cfg.validate(&params), Err(ConfigError::WatermarkExceeds));
    }

    #[test]
    fn test_small_rx_fifo_saturates() {
        let params = HostParams {
            rx_depth: 8,
            ..HostParams::new()
        };
        assert_eq!(SdkConfig::default().rx_watermark(&params), 0);
    }

    #[test]
    fn test_params_validation() {
        assert_eq!(
            HostParams { num_cs: 0, ..HostParams::new() }.validate(),
            Err(ConfigError::NumCsInvalid)
        );
        assert_eq!(
            HostParams { num_cs: 4, ..HostParams::new() }.validate(),
            Err(ConfigError::NumCsInvalid)
        );
        assert!(HostParams { num_cs: 1, ..HostParams::new() }.validate().is_ok());
        assert_eq!(
            HostParams { cmd_depth: 16, ..HostParams::new() }.validate(),
            Err(ConfigError::DepthInvalid)
        );
        assert_eq!(
            SdkConfig::new(0).validate(&HostParams::new()),
            Err(ConfigError::ZeroClock)
        );
    }
}
