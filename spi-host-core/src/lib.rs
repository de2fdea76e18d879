//! Board-agnostic model for SPI host transfers
//!
//! This crate contains everything about an SPI transfer that does not
//! touch registers:
//!
//! - Peripheral identity table
//! - Segment model and validation
//! - Slave descriptors and the clock divider resolver
//! - Byte packing into FIFO words
//! - Peripheral runtime state machine
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod config;
pub mod peripheral;
pub mod segment;
pub mod slave;
pub mod state;
pub mod words;

pub use peripheral::PeripheralId;
pub use segment::{Direction, Segment, Speed};
pub use slave::SlaveDescriptor;
pub use state::{SpiState, StateEvent};
