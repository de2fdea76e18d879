//! Logical SPI handle

use spi_host_core::{PeripheralId, SlaveDescriptor};

/// A slave bound to one peripheral
///
/// Created by [`SpiSdk::init`](crate::SpiSdk::init) and invalidated by
/// [`SpiSdk::deinit`](crate::SpiSdk::deinit). Several handles may share a
/// peripheral; the slave configuration is re-applied before each transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Spi {
    idx: Option<PeripheralId>,
    init: bool,
    slave: SlaveDescriptor,
    divider: u16,
}

impl Spi {
    /// Handle that refers to nothing
    pub const UNINIT: Self = Self {
        idx: None,
        init: false,
        slave: SlaveDescriptor::ZERO,
        divider: 0,
    };

    pub(crate) const fn new(id: PeripheralId, slave: SlaveDescriptor, divider: u16) -> Self {
        Self {
            idx: Some(id),
            init: true,
            slave,
            divider,
        }
    }

    /// Peripheral, `None` after deinit
    pub fn id(&self) -> Option<PeripheralId> {
        self.idx
    }

    pub fn is_init(&self) -> bool {
        self.init
    }

    /// Slave descriptor with the realized SCK frequency
    pub fn slave(&self) -> SlaveDescriptor {
        self.slave
    }

    /// Resolved CONFIGOPTS.CLKDIV
    pub fn divider(&self) -> u16 {
        self.divider
    }

    /// Peripheral of an initialized handle
    pub(crate) fn check(&self) -> Result<PeripheralId, crate::SdkError> {
        let id = self.idx.ok_or(crate::SdkError::IdxInvalid)?;
        if !self.init {
            return Err(crate::SdkError::NotInit);
        }
        Ok(id)
    }
}

impl Default for Spi {
    fn default() -> Self {
        Self::UNINIT
    }
}
