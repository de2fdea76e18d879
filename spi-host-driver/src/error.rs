//! Driver error type

/// Why the driver refused a request
///
/// A rejected request never reaches the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    /// Watermark deeper than its FIFO
    WatermarkExceeds,
    /// Chip-select ID beyond the number of lines
    CsidInvalid,
    /// Command queue is full
    CommandFull,
    /// Reserved speed code, or multi-lane full duplex
    SpeedInvalid,
    /// Command length zero or beyond the 24-bit field
    LengthInvalid,
    /// TX FIFO is full
    TxQueueFull,
    /// RX FIFO is empty
    RxQueueEmpty,
    /// Peripheral cannot accept a command
    NotReady,
    /// Event bits outside the event set
    EventInvalid,
    /// Error bits outside the interrupt-capable error set
    ErrorInvalid,
}

impl DriverError {
    /// The request may succeed once the FIFOs or the command queue move
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DriverError::CommandFull
                | DriverError::NotReady
                | DriverError::TxQueueFull
                | DriverError::RxQueueEmpty
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_conditions_are_transient() {
        assert!(DriverError::CommandFull.is_transient());
        assert!(DriverError::NotReady.is_transient());
        assert!(!DriverError::SpeedInvalid.is_transient());
        assert!(!DriverError::CsidInvalid.is_transient());
    }
}
