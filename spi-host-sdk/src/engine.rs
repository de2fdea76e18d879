//! Transaction engine
//!
//! One [`Peripheral`] record per SPI host instance holds the runtime state
//! of its transaction. The main context launches a transaction and the
//! interrupt path drives it forward:
//!
//! ```text
//! launch ──► issue segment 0 ──► READY ──► issue segment n ...
//!                                  │
//!            TXWM ──► refill TX    │ no segments left and IDLE
//!            RXWM ──► drain RX     ▼
//!                               complete ──► on_done / park ──► Init
//!
//!            ERROR ──► abort ──► on_error / park ──► Init
//! ```

#[cfg(feature = "defmt")]
use defmt::{debug, trace, warn};

use spi_host_core::config::SdkConfig;
use spi_host_core::{PeripheralId, SpiState, StateEvent};
use spi_host_driver::{Command, ConfigOpts, DriverError, Events, HwErrors, SpiHost};
use spi_host_hal::{SpiHostRegs, Spin};

use crate::error::{SdkError, TransferError};
use crate::handle::Spi;
use crate::transaction::{Buffers, Callbacks, Completion, Cursors, Transaction};

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! debug {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! trace {
    ($($arg:tt)*) => {{}};
}

/// Events the engine listens to while a transaction runs
pub const TXN_EVENTS: Events = Events::IDLE
    .union(Events::READY)
    .union(Events::TXWM)
    .union(Events::RXWM);

/// Diagnostic snapshot of a peripheral's runtime record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Runtime {
    pub state: SpiState,
    pub cursors: Cursors,
    /// Segments in the running transaction (0 when idle)
    pub segments: usize,
    /// A finished transaction is waiting in [`take_completion`](crate::SpiSdk::take_completion)
    pub completion_parked: bool,
}

/// Runtime record of one SPI host instance
pub struct Peripheral<R> {
    id: PeripheralId,
    host: SpiHost<R>,
    state: SpiState,
    txn: Option<Transaction>,
    cursors: Cursors,
    callbacks: Callbacks,
    completion: Option<Completion>,
}

impl<R: SpiHostRegs> Peripheral<R> {
    pub fn new(id: PeripheralId, host: SpiHost<R>) -> Self {
        Self {
            id,
            host,
            state: SpiState::None,
            txn: None,
            cursors: Cursors::default(),
            callbacks: Callbacks::NONE,
            completion: None,
        }
    }

    pub fn id(&self) -> PeripheralId {
        self.id
    }

    pub fn host(&self) -> &SpiHost<R> {
        &self.host
    }

    pub fn state(&self) -> SpiState {
        self.state
    }

    pub fn runtime(&self) -> Runtime {
        Runtime {
            state: self.state,
            cursors: self.cursors,
            segments: self.txn.as_ref().map_or(0, |t| t.segments.len()),
            completion_parked: self.completion.is_some(),
        }
    }

    pub fn take_completion(&mut self) -> Option<Completion> {
        self.completion.take()
    }

    pub(crate) fn apply(&mut self, event: StateEvent) {
        self.state = self.state.transition(event);
    }

    /// Program CONFIGOPTS and CSID for the handle's slave
    ///
    /// Registers that already hold the wanted values are not rewritten.
    pub(crate) fn set_slave(&self, spi: &Spi) -> Result<(), SdkError> {
        if self.host.is_active() {
            warn!("spi {}: not idle, slave config refused", self.id);
            return Err(SdkError::NotIdle);
        }
        let slave = spi.slave();
        let csid = slave.csid as u32;
        let opts = ConfigOpts::from_slave(&slave, spi.divider());

        let current = self.host.configopts(csid).map_err(slave_error)?;
        if current != opts {
            debug!("spi {}: configopts[{}] = {=u32:#x}", self.id, csid, opts.to_word());
            self.host.set_configopts(csid, &opts).map_err(slave_error)?;
        }
        if self.host.csid() != csid {
            self.host.set_csid(csid).map_err(slave_error)?;
        }
        Ok(())
    }

    /// Start `txn`; caller has checked the state and validated the transaction
    ///
    /// A refusal before the first segment reaches the hardware hands the
    /// buffers back and leaves the peripheral in Init.
    pub(crate) fn launch(
        &mut self,
        config: &SdkConfig,
        txn: Transaction,
        callbacks: Callbacks,
    ) -> Result<(), TransferError> {
        let params = *self.host.params();
        let setup = self
            .host
            .set_tx_watermark(config.tx_watermark(&params))
            .and_then(|_| self.host.set_rx_watermark(config.rx_watermark(&params)))
            .and_then(|_| self.host.set_events_enabled(TXN_EVENTS, true));
        if let Err(e) = setup {
            return Err(TransferError::new(e.into(), txn.buffers));
        }

        self.apply(StateEvent::Launched);
        self.txn = Some(txn);
        self.callbacks = callbacks;
        self.cursors = Cursors::default();

        self.fill_tx();
        self.host.enable_event_intr(true);
        self.host.wait_for_ready(&mut Spin);

        if let Err(e) = self.issue_next() {
            if !e.is_transient() {
                warn!("spi {}: first segment refused: {}", self.id, e);
                self.quiesce();
                self.apply(StateEvent::Aborted);
                let buffers = self.reset();
                self.apply(StateEvent::Settled);
                return Err(TransferError::new(e.into(), buffers));
            }
            // A full queue is retried on the next READY
            trace!("spi {}: first segment deferred: {}", self.id, e);
        }
        debug!(
            "spi {}: launched {} segment(s)",
            self.id,
            self.txn.as_ref().map_or(0, |t| t.segments.len())
        );
        Ok(())
    }

    /// Issue the segment under the cursor
    ///
    /// The cursor only advances once the driver accepted the command.
    fn issue_next(&mut self) -> Result<(), DriverError> {
        let Some(txn) = self.txn.as_ref() else {
            return Ok(());
        };
        let index = self.cursors.segment;
        let Some(segment) = txn.segments.get(index) else {
            return Ok(());
        };
        let command = Command::from_segment(segment, index + 1 < txn.segments.len());
        self.host.set_command(&command)?;
        self.cursors.segment += 1;
        Ok(())
    }

    /// Push TX words until the FIFO is full or the buffer is consumed
    fn fill_tx(&mut self) {
        let Self {
            host, txn, cursors, ..
        } = self;
        let Some(buffers) = txn.as_ref().map(|t| &t.buffers) else {
            return;
        };
        let Some(tx) = buffers.tx.as_deref() else {
            return;
        };
        while cursors.tx_word < buffers.tx_len {
            let Some(&word) = tx.get(cursors.tx_word as usize) else {
                break;
            };
            if host.write_word(word).is_err() {
                break;
            }
            cursors.tx_word += 1;
        }
    }

    /// Pull RX words until the FIFO is empty or the buffer is full
    fn empty_rx(&mut self) {
        let Self {
            host, txn, cursors, ..
        } = self;
        let Some(buffers) = txn.as_mut().map(|t| &mut t.buffers) else {
            return;
        };
        let rx_len = buffers.rx_len;
        let Some(rx) = buffers.rx.as_deref_mut() else {
            return;
        };
        while cursors.rx_word < rx_len {
            let Some(slot) = rx.get_mut(cursors.rx_word as usize) else {
                break;
            };
            match host.read_word() {
                Ok(word) => *slot = word,
                Err(_) => break,
            }
            cursors.rx_word += 1;
        }
    }

    fn quiesce(&self) {
        self.host.disable_events();
        self.host.enable_event_intr(false);
    }

    fn reset(&mut self) -> Buffers {
        self.cursors = Cursors::default();
        self.callbacks = Callbacks::NONE;
        self.txn.take().map(|t| t.buffers).unwrap_or_default()
    }

    /// Event interrupt entry point
    pub fn on_event(&mut self, events: Events) {
        if !self.state.is_busy() {
            trace!("spi {}: event {} ignored in {}", self.id, events, self.state);
            return;
        }
        let seglen = self.txn.as_ref().map_or(0, |t| t.segments.len());

        if events.contains(Events::READY) {
            if self.cursors.segment < seglen {
                if let Err(e) = self.issue_next() {
                    if !e.is_transient() {
                        warn!("spi {}: segment {} refused: {}", self.id, self.cursors.segment, e);
                        self.abort(HwErrors::CMDINVAL);
                        return;
                    }
                    trace!("spi {}: segment {} deferred: {}", self.id, self.cursors.segment, e);
                }
            } else if events.contains(Events::IDLE) {
                self.complete();
                return;
            }
        }
        if events.contains(Events::TXWM) {
            self.fill_tx();
            if let (Some(cb), Some(txn)) = (self.callbacks.on_tx_watermark, self.txn.as_ref()) {
                cb(self.id, &txn.buffers, self.cursors);
            }
        }
        if events.contains(Events::RXWM) {
            self.empty_rx();
            if let (Some(cb), Some(txn)) = (self.callbacks.on_rx_watermark, self.txn.as_ref()) {
                cb(self.id, &txn.buffers, self.cursors);
            }
        }
    }

    fn complete(&mut self) {
        self.quiesce();
        self.empty_rx();
        self.apply(StateEvent::Completed);
        debug!("spi {}: done, {} rx word(s)", self.id, self.cursors.rx_word);

        let on_done = self.callbacks.on_done;
        let buffers = self.reset();
        match on_done {
            Some(cb) => cb(self.id, buffers),
            None => {
                self.completion = Some(Completion {
                    outcome: Ok(()),
                    buffers,
                })
            }
        }
        self.apply(StateEvent::Settled);
    }

    /// Error interrupt entry point
    pub fn on_error(&mut self, errors: HwErrors) {
        if !self.state.is_busy() {
            trace!("spi {}: error {} ignored in {}", self.id, errors, self.state);
            return;
        }
        self.abort(errors);
    }

    /// Stop the running transaction and report `errors` with its buffers
    fn abort(&mut self, errors: HwErrors) {
        warn!("spi {}: aborted by {}", self.id, errors);
        self.quiesce();
        self.apply(StateEvent::Aborted);

        let on_error = self.callbacks.on_error;
        let buffers = self.reset();
        match on_error {
            Some(cb) => cb(self.id, errors, buffers),
            None => {
                self.completion = Some(Completion {
                    outcome: Err(errors),
                    buffers,
                })
            }
        }
        self.apply(StateEvent::Settled);
    }
}

fn slave_error(e: DriverError) -> SdkError {
    match e {
        DriverError::CsidInvalid => SdkError::SlaveCsidInvalid,
        other => SdkError::Driver(other),
    }
}
