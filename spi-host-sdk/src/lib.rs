//! Interrupt-driven SPI transaction SDK
//!
//! Runs multi-segment SPI transactions on the SPI hosts of a SoC without
//! polling every word. A transaction is launched from the main context and
//! driven to completion by the SPI interrupts: READY issues the next
//! segment, the watermark events refill and drain the FIFOs, and IDLE after
//! the last segment completes it.
//!
//! # Contents
//!
//! - [`SpiSdk`] - Runtime table, client API and interrupt entry point
//! - [`Spi`] - Logical handle (peripheral + slave)
//! - [`Transaction`] / [`Callbacks`] - What to run and whom to tell
//! - [`BlockingSpi`] - Blocking transfers over a [`SharedState`]
//! - [`SpiHostBus`] - `embedded-hal` [`SpiBus`](embedded_hal::spi::SpiBus) adapter
//!
//! # Example
//!
//! ```ignore
//! let slave = SlaveDescriptor::new(0, 10_000_000);
//! let spi = sdk.with_mut(|sdk| sdk.init(PeripheralId::Host, slave))?;
//! let mut blocking = BlockingSpi::new(&sdk, spi, Wfi);
//! let buffers = blocking.transmit(tx, 4)?;
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod blocking;
pub mod bus;
pub mod engine;
pub mod error;
pub mod handle;
pub mod sdk;
pub mod sync;
pub mod transaction;

pub use blocking::BlockingSpi;
pub use bus::{BusError, SpiHostBus};
pub use engine::Runtime;
pub use error::{SdkError, TransferError};
pub use handle::Spi;
pub use sdk::SpiSdk;
#[cfg(feature = "embassy")]
pub use sync::CsState;
pub use sync::{MockState, SharedState};
pub use transaction::{Buffers, Callbacks, Completion, Cursors, Transaction};

pub use spi_host_core::{PeripheralId, Segment, SlaveDescriptor, SpiState};
pub use spi_host_driver::{Events, HwErrors};

#[cfg(test)]
mod testing;
