//! Slave device description
//!
//! A slave descriptor captures everything the host needs to talk to one
//! device on one chip-select line. It is validated once when a handle is
//! created and re-applied to the peripheral before every transfer.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::clock::{self, ClockError};

/// Largest chip-select idle/lead/trail count (4-bit fields)
pub const CSN_TIMING_MAX: u8 = 15;

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    #[default]
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    #[default]
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}

impl From<(Polarity, Phase)> for Mode {
    fn from(pair: (Polarity, Phase)) -> Self {
        match pair {
            (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => Mode::Mode0,
            (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => Mode::Mode1,
            (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => Mode::Mode2,
            (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => Mode::Mode3,
        }
    }
}

/// Why a slave descriptor was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveError {
    /// Chip-select line does not exist on the peripheral
    CsidInvalid,
    /// Frequency outside the reachable range
    Frequency(ClockError),
    /// Chip-select timing count does not fit its field
    TimingInvalid,
}

impl From<ClockError> for SlaveError {
    fn from(e: ClockError) -> Self {
        SlaveError::Frequency(e)
    }
}

/// One device on the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SlaveDescriptor {
    /// Chip-select line
    pub csid: u8,
    /// SCK frequency in Hz (the realized frequency once a handle holds it)
    pub freq_hz: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: Phase,
    /// Minimum idle half-cycles between commands, minus one
    pub csn_idle: u8,
    /// Half-cycles from CS assertion to first SCK edge, minus one
    pub csn_lead: u8,
    /// Half-cycles from last SCK edge to CS release, minus one
    pub csn_trail: u8,
    /// Sample a full cycle after launch instead of half
    pub full_cycle: bool,
}

impl SlaveDescriptor {
    /// Zeroed descriptor held by an invalidated handle
    pub const ZERO: Self = Self::new(0, 0);

    /// Mode 0 device with minimal chip-select timing
    pub const fn new(csid: u8, freq_hz: u32) -> Self {
        Self {
            csid,
            freq_hz,
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
            csn_idle: 0,
            csn_lead: 0,
            csn_trail: 0,
            full_cycle: false,
        }
    }

    pub fn with_mode(self, mode: Mode) -> Self {
        let (polarity, phase) = mode.into();
        Self {
            polarity,
            phase,
            ..self
        }
    }

    pub const fn with_timing(self, idle: u8, lead: u8, trail: u8) -> Self {
        Self {
            csn_idle: idle,
            csn_lead: lead,
            csn_trail: trail,
            ..self
        }
    }

    pub const fn with_full_cycle(self, full_cycle: bool) -> Self {
        Self { full_cycle, ..self }
    }

    /// Combined polarity and phase
    pub fn mode(&self) -> Mode {
        (self.polarity, self.phase).into()
    }

    /// Check the descriptor against a peripheral and return its divider
    ///
    /// # Arguments
    /// * `num_cs` - Chip-select lines on the peripheral
    /// * `sys_clk_hz` - System clock feeding the peripheral
    pub fn validate(&self, num_cs: u8, sys_clk_hz: u32) -> Result<u16, SlaveError> {
        if self.csid >= num_cs {
            return Err(SlaveError::CsidInvalid);
        }
        if self.csn_idle > CSN_TIMING_MAX
            || self.csn_lead > CSN_TIMING_MAX
            || self.csn_trail > CSN_TIMING_MAX
        {
            return Err(SlaveError::TimingInvalid);
        }
        Ok(clock::clock_divider(sys_clk_hz, self.freq_hz)?)
    }

    /// Same descriptor with the frequency replaced by what `divider` yields
    pub fn realized(self, sys_clk_hz: u32, divider: u16) -> Self {
        Self {
            freq_hz: clock::realized_frequency(sys_clk_hz, divider),
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYS: u32 = 100_000_000;

    #[test]
    fn test_validate_returns_divider() {
        let slave = SlaveDescriptor::new(1, 10_000_000);
        assert_eq!(slave.validate(2, SYS), Ok(4));
        assert_eq!(slave.realized(SYS, 4).freq_hz, 10_000_000);
    }

    #[test]
    fn test_csid_out_of_range() {
        let slave = SlaveDescriptor::new(2, 1_000_000);
        assert_eq!(slave.validate(2, SYS), Err(SlaveError::CsidInvalid));
    }

    #[test]
    fn test_frequency_out_of_range() {
        let slow = SlaveDescriptor::new(0, 100);
        assert_eq!(
            slow.validate(2, SYS),
            Err(SlaveError::Frequency(ClockError::TooLow))
        );
        let fast = SlaveDescriptor::new(0, 60_000_000);
        assert_eq!(
            fast.validate(2, SYS),
            Err(SlaveError::Frequency(ClockError::TooHigh))
        );
    }

    #[test]
    fn test_timing_fields_limited() {
        let slave = SlaveDescriptor::new(0, 1_000_000).with_timing(0, 16, 0);
        assert_eq!(slave.validate(2, SYS), Err(SlaveError::TimingInvalid));
    }

    #[test]
    fn test_mode_round_trip() {
        for mode in [Mode::Mode0, Mode::Mode1, Mode::Mode2, Mode::Mode3] {
            assert_eq!(SlaveDescriptor::new(0, 1).with_mode(mode).mode(), mode);
        }
    }

    #[test]
    fn test_with_mode_sets_polarity_and_phase() {
        let slave = SlaveDescriptor::new(0, 1).with_mode(Mode::Mode2);
        assert_eq!(slave.polarity, Polarity::IdleHigh);
        assert_eq!(slave.phase, Phase::CaptureOnFirstTransition);
    }
}
