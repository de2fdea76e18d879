//! Peripheral identity

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of SPI host instances on the SoC
pub const NUM_PERIPHERALS: usize = 3;

/// One of the SPI host controllers
///
/// The discriminant is the index into the per-peripheral tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PeripheralId {
    /// Flash controller (boot flash)
    Flash = 0,
    /// General purpose host
    Host = 1,
    /// Second general purpose host
    Host2 = 2,
}

impl PeripheralId {
    /// All peripherals in table order
    pub const ALL: [PeripheralId; NUM_PERIPHERALS] =
        [PeripheralId::Flash, PeripheralId::Host, PeripheralId::Host2];

    /// Look up a peripheral by table index
    pub const fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(PeripheralId::Flash),
            1 => Some(PeripheralId::Host),
            2 => Some(PeripheralId::Host2),
            _ => None,
        }
    }

    /// Table index of this peripheral
    pub const fn index(self) -> usize {
        self as usize
    }
}
