//! Peripheral runtime state machine
//!
//! Every change of a peripheral's runtime state is a function of the
//! current state and an event. Unexpected events leave the state as it is.

use super::events::StateEvent;

/// Runtime state of one peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiState {
    /// Never initialized
    #[default]
    None,
    /// Initialized and idle, ready for a transaction
    Init,
    /// A transaction is in flight
    Busy,
    /// The last transaction completed (transient)
    Done,
    /// The last transaction was aborted by a hardware error (transient)
    Error,
}

impl SpiState {
    /// A transaction is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, SpiState::Busy)
    }

    /// A transaction may be launched from this state
    pub fn can_launch(&self) -> bool {
        matches!(self, SpiState::Init | SpiState::Done | SpiState::Error)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: StateEvent) -> Self {
        use SpiState::*;
        use StateEvent::*;

        match (self, event) {
            // Init is idempotent; a handle may be re-created at any time
            // except mid-transaction
            (Busy, Initialized) => Busy,
            (_, Initialized) => Init,

            (Init | Done | Error, Launched) => Busy,

            (Busy, Completed) => Done,
            (Busy, Aborted) => Error,

            (Done | Error, Settled) => Init,

            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_from_none() {
        assert_eq!(SpiState::None.transition(StateEvent::Initialized), SpiState::Init);
    }

    #[test]
    fn test_transaction_flow() {
        let busy = SpiState::Init.transition(StateEvent::Launched);
        assert_eq!(busy, SpiState::Busy);

        let done = busy.transition(StateEvent::Completed);
        assert_eq!(done, SpiState::Done);
        assert_eq!(done.transition(StateEvent::Settled), SpiState::Init);

        let error = busy.transition(StateEvent::Aborted);
        assert_eq!(error, SpiState::Error);
        assert_eq!(error.transition(StateEvent::Settled), SpiState::Init);
    }

    #[test]
    fn test_no_launch_before_init() {
        assert_eq!(SpiState::None.transition(StateEvent::Launched), SpiState::None);
        assert!(!SpiState::None.can_launch());
    }

    #[test]
    fn test_busy_ignores_launch_and_init() {
        let busy = SpiState::Busy;
        assert_eq!(busy.transition(StateEvent::Launched), SpiState::Busy);
        assert_eq!(busy.transition(StateEvent::Initialized), SpiState::Busy);
        assert!(!busy.can_launch());
    }

    #[test]
    fn test_completion_only_while_busy() {
        for state in [SpiState::None, SpiState::Init, SpiState::Done] {
            assert_eq!(state.transition(StateEvent::Completed), state);
            assert_eq!(state.transition(StateEvent::Aborted), state);
        }
    }
}
