//! Event and error bit sets
//!
//! Both sets use the register bit positions, so converting to and from a
//! register word is a plain `bits()` / `from_bits_truncate()`.

use bitflags::bitflags;

bitflags! {
    /// SPI events (EVENT_ENABLE layout)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Events: u32 {
        /// RX FIFO full
        const RXFULL = 1 << 0;
        /// TX FIFO empty
        const TXEMPTY = 1 << 1;
        /// RX FIFO at or above its watermark
        const RXWM = 1 << 2;
        /// TX FIFO below its watermark
        const TXWM = 1 << 3;
        /// Ready to accept a command
        const READY = 1 << 4;
        /// No command in progress
        const IDLE = 1 << 5;
    }
}

bitflags! {
    /// Hardware errors (ERROR_STATUS layout)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HwErrors: u32 {
        /// Command written while the queue was full
        const CMDBUSY = 1 << 0;
        /// TX FIFO overflow
        const OVERFLOW = 1 << 1;
        /// RX FIFO underflow
        const UNDERFLOW = 1 << 2;
        /// Invalid command (reserved speed, multi-lane full duplex)
        const CMDINVAL = 1 << 3;
        /// Command issued with an invalid CSID
        const CSIDINVAL = 1 << 4;
        /// Invalid register access (status only, cannot raise an interrupt)
        const ACCESSINVAL = 1 << 5;
    }
}

impl HwErrors {
    /// Errors that can be enabled as interrupt sources
    pub const IRQ_ALL: Self = Self::from_bits_truncate(0x1f);
}

macro_rules! impl_format {
    ($ty:ident) => {
        #[cfg(feature = "defmt")]
        impl defmt::Format for $ty {
            fn format(&self, f: defmt::Formatter) {
                defmt::write!(f, "{=str}(", stringify!($ty));
                for (i, (name, _)) in self.iter_names().enumerate() {
                    if i > 0 {
                        defmt::write!(f, " | ");
                    }
                    defmt::write!(f, "{=str}", name);
                }
                defmt::write!(f, ")");
            }
        }
    };
}

impl_format!(Events);
impl_format!(HwErrors);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_bits_match_register() {
        assert_eq!(Events::all().bits(), 0x3f);
        assert_eq!(
            (Events::IDLE | Events::READY | Events::TXWM | Events::RXWM).bits(),
            0x3c
        );
    }

    #[test]
    fn test_irq_errors_exclude_access() {
        assert!(!HwErrors::IRQ_ALL.contains(HwErrors::ACCESSINVAL));
        assert!(HwErrors::all().contains(HwErrors::IRQ_ALL));
        assert_eq!(HwErrors::all().bits(), 0x3f);
    }

    #[test]
    fn test_truncate_unknown_bits() {
        assert_eq!(HwErrors::from_bits_truncate(0xffff_ffff), HwErrors::all());
        assert_eq!(Events::from_bits_truncate(1 << 6), Events::empty());
    }
}
