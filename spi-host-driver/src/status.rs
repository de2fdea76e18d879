//! Decoded STATUS snapshots

use spi_host_core::words::ByteOrder;
use spi_host_hal::regs::STATUS;
use tock_registers::LocalRegisterCopy;

use crate::events::Events;

/// Typed copy of the STATUS register
pub type StatusVal = LocalRegisterCopy<u32, STATUS::Register>;

/// One read of the STATUS register
///
/// Every accessor decodes the same snapshot, so flags taken from one
/// `Status` are mutually consistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(u32);

impl Status {
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    fn reg(&self) -> StatusVal {
        LocalRegisterCopy::new(self.0)
    }

    /// Words waiting in the TX FIFO
    pub fn tx_queue_depth(&self) -> u8 {
        self.reg().read(STATUS::TXQD) as u8
    }

    /// Words waiting in the RX FIFO
    pub fn rx_queue_depth(&self) -> u8 {
        self.reg().read(STATUS::RXQD) as u8
    }

    /// Commands waiting in the command queue
    pub fn cmd_queue_depth(&self) -> u8 {
        self.reg().read(STATUS::CMDQD) as u8
    }

    /// A command is being processed
    pub fn active(&self) -> bool {
        self.reg().is_set(STATUS::ACTIVE)
    }

    /// The command queue can take another command
    pub fn ready(&self) -> bool {
        self.reg().is_set(STATUS::READY)
    }

    pub fn byte_order(&self) -> ByteOrder {
        ByteOrder::from_status_bit(self.reg().is_set(STATUS::BYTEORDER))
    }

    pub fn tx(&self) -> ChannelStatus {
        let r = self.reg();
        ChannelStatus {
            empty: r.is_set(STATUS::TXEMPTY),
            full: r.is_set(STATUS::TXFULL),
            wm: r.is_set(STATUS::TXWM),
            stall: r.is_set(STATUS::TXSTALL),
        }
    }

    pub fn rx(&self) -> ChannelStatus {
        let r = self.reg();
        ChannelStatus {
            empty: r.is_set(STATUS::RXEMPTY),
            full: r.is_set(STATUS::RXFULL),
            wm: r.is_set(STATUS::RXWM),
            stall: r.is_set(STATUS::RXSTALL),
        }
    }

    /// Event conditions asserted in this snapshot
    pub fn events(&self) -> Events {
        let (tx, rx) = (self.tx(), self.rx());
        let mut events = Events::empty();
        events.set(Events::RXFULL, rx.full);
        events.set(Events::TXEMPTY, tx.empty);
        events.set(Events::RXWM, rx.wm);
        events.set(Events::TXWM, tx.wm);
        events.set(Events::READY, self.ready());
        events.set(Events::IDLE, !self.active());
        events
    }
}

/// State of one data FIFO
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelStatus {
    /// FIFO is empty
    pub empty: bool,
    /// FIFO is full
    pub full: bool,
    /// Past the watermark (at or above for RX, below for TX)
    pub wm: bool,
    /// Bus is stalled waiting on software
    pub stall: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_snapshot() {
        // READY | TXEMPTY | RXWM, rxqd = 60, cmdqd = 1
        let status = Status::from_bits((1 << 31) | (1 << 28) | (1 << 20) | (1 << 16) | (60 << 8));
        assert!(status.ready());
        assert!(!status.active());
        assert_eq!(status.rx_queue_depth(), 60);
        assert_eq!(status.cmd_queue_depth(), 1);
        assert!(status.tx().empty);
        assert!(status.rx().wm);
        assert_eq!(status.byte_order(), ByteOrder::LittleEndian);
        assert_eq!(
            status.events(),
            Events::READY | Events::IDLE | Events::TXEMPTY | Events::RXWM
        );
    }

    #[test]
    fn test_active_clears_idle() {
        let status = Status::from_bits(1 << 30);
        assert!(!status.events().contains(Events::IDLE));
        assert!(!status.events().contains(Events::READY));
    }
}
