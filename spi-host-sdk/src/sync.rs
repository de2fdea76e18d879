//! Sharing the engine with the interrupt handler
//!
//! The main context and the SPI interrupt both mutate [`SpiSdk`]. On the
//! target the engine lives in a critical-section mutex ([`CsState`], feature
//! `embassy`); host tests use [`MockState`].
//!
//! ```ignore
//! static SPI: CsState<SpiSdk<MmioSpiHost>> = CsState::new(...);
//!
//! fn spi_host_irq() {
//!     SPI.with_mut(|sdk| sdk.handle_irq(PeripheralId::Host));
//! }
//! ```
//!
//! [`SpiSdk`]: crate::SpiSdk

use core::cell::RefCell;

#[cfg(feature = "embassy")]
use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

/// Exclusive access to a value shared with interrupt context
///
/// Accesses must not nest: the inner value is a `RefCell`.
pub trait SharedState<T> {
    fn with<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&T) -> O;

    fn with_mut<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&mut T) -> O;
}

/// Interrupt-safe state behind a critical section
#[cfg(feature = "embassy")]
pub struct CsState<T> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<T>>,
}

#[cfg(feature = "embassy")]
impl<T> CsState<T> {
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }
}

#[cfg(feature = "embassy")]
impl<T> SharedState<T> for CsState<T> {
    fn with<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&T) -> O,
    {
        self.inner.lock(|cell| f(&cell.borrow()))
    }

    fn with_mut<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&mut T) -> O,
    {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Single-threaded state for host tests
pub struct MockState<T> {
    inner: RefCell<T>,
}

impl<T> MockState<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: RefCell::new(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.inner.into_inner()
    }
}

impl<T> SharedState<T> for MockState<T> {
    fn with<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&T) -> O,
    {
        f(&self.inner.borrow())
    }

    fn with_mut<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&mut T) -> O,
    {
        f(&mut self.inner.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_state_access() {
        let state = MockState::new(1u32);
        state.with_mut(|v| *v += 1);
        assert_eq!(state.with(|v| *v), 2);
        assert_eq!(state.into_inner(), 2);
    }

    #[cfg(feature = "embassy")]
    #[test]
    fn test_cs_state_access() {
        static STATE: CsState<u32> = CsState::new(5);
        STATE.with_mut(|v| *v *= 2);
        assert_eq!(STATE.with(|v| *v), 10);
    }
}
