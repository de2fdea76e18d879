//! Events that drive the peripheral state machine

/// State machine events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateEvent {
    /// A handle was created for the peripheral
    Initialized,
    /// A transaction was handed to the hardware
    Launched,
    /// The last segment finished and the bus is idle
    Completed,
    /// The hardware reported an error
    Aborted,
    /// Cursors and callbacks were reset after completion or abort
    Settled,
}
