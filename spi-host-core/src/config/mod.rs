//! Configuration types
//!
//! Board-agnostic description of the SPI hosts on a SoC and of the
//! transaction engine settings. Optionally loaded from TOML.

pub mod board;
pub mod params;

pub use board::BoardConfig;
pub use params::{HostParams, SdkConfig};

/// Configuration rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// System clock is zero
    ZeroClock,
    /// No chip-select lines, or more than the register map addresses
    NumCsInvalid,
    /// A FIFO or queue depth is zero or out of range
    DepthInvalid,
    /// A watermark is deeper than its FIFO
    WatermarkExceeds,
    /// TOML text could not be parsed
    Parse,
}
