//! COMMAND and CONFIGOPTS register words

use spi_host_core::segment::MAX_SEGMENT_LEN;
use spi_host_core::slave::{Phase, Polarity, SlaveDescriptor};
use spi_host_core::{Direction, Segment, Speed};
use spi_host_hal::regs::{COMMAND, CONFIGOPTS};
use tock_registers::LocalRegisterCopy;

use crate::error::DriverError;

/// Check a raw direction/speed pair
///
/// Speed code 3 is reserved, and full duplex only works on one lane.
pub const fn validate_command(direction: u32, speed: u32) -> bool {
    !(speed > Speed::Quad as u32
        || (direction == Direction::Bidir as u32 && speed != Speed::Standard as u32))
}

/// One command for the COMMAND FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    /// Length in bytes (cycles for dummy commands); the register holds `len - 1`
    pub len: u32,
    /// Keep chip select asserted after this command
    pub csaat: bool,
    /// Lane speed
    pub speed: Speed,
    /// Data direction
    pub direction: Direction,
}

impl Command {
    pub const fn new(direction: Direction, speed: Speed, len: u32, csaat: bool) -> Self {
        Self {
            len,
            csaat,
            speed,
            direction,
        }
    }

    /// Command that executes `segment`
    pub const fn from_segment(segment: &Segment, csaat: bool) -> Self {
        Self::new(segment.direction, segment.speed, segment.len, csaat)
    }

    /// Check length range and direction/speed combination
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.len == 0 || self.len > MAX_SEGMENT_LEN {
            return Err(DriverError::LengthInvalid);
        }
        if !self.direction.allows(self.speed) {
            return Err(DriverError::SpeedInvalid);
        }
        Ok(())
    }

    /// Encode as a COMMAND word (unchecked)
    pub fn to_word(&self) -> u32 {
        let mut reg: LocalRegisterCopy<u32, COMMAND::Register> = LocalRegisterCopy::new(0);
        reg.modify(
            COMMAND::LEN.val(self.len.wrapping_sub(1))
                + COMMAND::CSAAT.val(self.csaat as u32)
                + COMMAND::SPEED.val(self.speed.code())
                + COMMAND::DIRECTION.val(self.direction.code()),
        );
        reg.get()
    }

    /// Decode a COMMAND word; `None` for the reserved speed code
    pub fn from_word(word: u32) -> Option<Self> {
        let reg: LocalRegisterCopy<u32, COMMAND::Register> = LocalRegisterCopy::new(word);
        Some(Self {
            len: reg.read(COMMAND::LEN) + 1,
            csaat: reg.is_set(COMMAND::CSAAT),
            speed: Speed::from_code(reg.read(COMMAND::SPEED))?,
            direction: Direction::from_code(reg.read(COMMAND::DIRECTION))?,
        })
    }
}

/// Per chip-select timing and clocking (CONFIGOPTS layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigOpts {
    /// SCK divider: `f_sck = f_sys / (2 * (clkdiv + 1))`
    pub clkdiv: u16,
    /// Minimum half-cycles with CS high between commands
    pub csn_idle: u8,
    /// Half-cycles from last SCK edge to CS release
    pub csn_trail: u8,
    /// Half-cycles from CS assertion to first SCK edge
    pub csn_lead: u8,
    /// Sample a full cycle after launch
    pub full_cycle: bool,
    /// Clock phase
    pub cpha: bool,
    /// Clock polarity
    pub cpol: bool,
}

impl ConfigOpts {
    /// Options for `slave` with an already resolved divider
    pub fn from_slave(slave: &SlaveDescriptor, clkdiv: u16) -> Self {
        Self {
            clkdiv,
            csn_idle: slave.csn_idle,
            csn_trail: slave.csn_trail,
            csn_lead: slave.csn_lead,
            full_cycle: slave.full_cycle,
            cpha: slave.phase == Phase::CaptureOnSecondTransition,
            cpol: slave.polarity == Polarity::IdleHigh,
        }
    }

    pub fn to_word(&self) -> u32 {
        let mut reg: LocalRegisterCopy<u32, CONFIGOPTS::Register> = LocalRegisterCopy::new(0);
        reg.modify(
            CONFIGOPTS::CLKDIV.val(self.clkdiv as u32)
                + CONFIGOPTS::CSNIDLE.val(self.csn_idle as u32)
                + CONFIGOPTS::CSNTRAIL.val(self.csn_trail as u32)
                + CONFIGOPTS::CSNLEAD.val(self.csn_lead as u32)
                + CONFIGOPTS::FULLCYC.val(self.full_cycle as u32)
                + CONFIGOPTS::CPHA.val(self.cpha as u32)
                + CONFIGOPTS::CPOL.val(self.cpol as u32),
        );
        reg.get()
    }

    pub fn from_word(word: u32) -> Self {
        let reg: LocalRegisterCopy<u32, CONFIGOPTS::Register> = LocalRegisterCopy::new(word);
        Self {
            clkdiv: reg.read(CONFIGOPTS::CLKDIV) as u16,
            csn_idle: reg.read(CONFIGOPTS::CSNIDLE) as u8,
            csn_trail: reg.read(CONFIGOPTS::CSNTRAIL) as u8,
            csn_lead: reg.read(CONFIGOPTS::CSNLEAD) as u8,
            full_cycle: reg.is_set(CONFIGOPTS::FULLCYC),
            cpha: reg.is_set(CONFIGOPTS::CPHA),
            cpol: reg.is_set(CONFIGOPTS::CPOL),
        }
    }
}
