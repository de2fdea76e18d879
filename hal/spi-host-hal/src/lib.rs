//! SPI host Hardware Abstraction Layer
//!
//! This crate defines the register-level capability that the SPI host
//! driver is written against. Chip support provides an implementation
//! (memory-mapped on the target, simulated on the host) and everything
//! above it stays hardware-agnostic.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  spi-host-sdk (transaction engine)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  spi-host-driver (validating wrapper)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  spi-host-hal (this crate - registers)  │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  MmioSpiHost  │       │  SimSpiHost   │
//! │   (target)    │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Contents
//!
//! - [`regs::SpiHostRegs`] - Raw register read/write capability
//! - [`regs`] - Register offsets and bit-field layout
//! - [`mmio::MmioSpiHost`] - Volatile memory-mapped implementation
//! - [`wait::Wait`] - Low-power wait primitive used by every polling loop
//! - `mock::SimSpiHost` - Simulated peripheral (feature `mock`)

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "mock")]
extern crate std;

pub mod mmio;
#[cfg(feature = "mock")]
pub mod mock;
pub mod regs;
pub mod wait;

// Re-export key items at crate root for convenience
pub use mmio::MmioSpiHost;
pub use regs::{Reg, SpiHostRegs};
pub use wait::{Spin, Wait};

#[cfg(any(target_arch = "riscv32", target_arch = "riscv64"))]
pub use wait::Wfi;
