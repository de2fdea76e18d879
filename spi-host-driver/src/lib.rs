//! Register-level driver for SPI host peripherals
//!
//! [`SpiHost`] wraps one peripheral's registers and validates every
//! request before it reaches the hardware: a rejected call returns a
//! [`DriverError`] and leaves the registers untouched. The driver keeps no
//! state of its own beyond the peripheral's synthesis parameters.
//!
//! # Contents
//!
//! - [`SpiHost`] - Register operations (FIFOs, commands, chip select, interrupts)
//! - [`Command`] / [`ConfigOpts`] - Register word builders
//! - [`Status`] / [`ChannelStatus`] - Decoded status snapshots
//! - [`Events`] / [`HwErrors`] - Event and error bit sets
//! - [`PendingIrq`] / [`SpiIrqHandler`] - Interrupt decode and dispatch

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod error;
pub mod events;
pub mod host;
pub mod irq;
pub mod status;

pub use command::{validate_command, Command, ConfigOpts};
pub use error::DriverError;
pub use events::{Events, HwErrors};
pub use host::SpiHost;
pub use irq::{NoopIrqHandler, PendingIrq, SpiIrqHandler};
pub use status::{ChannelStatus, Status};
