//! Peripheral runtime state
//!
//! `None -> Init -> Busy -> {Done, Error} -> Init`. The transaction engine
//! is the only caller.

pub mod events;
pub mod machine;

pub use events::StateEvent;
pub use machine::SpiState;
