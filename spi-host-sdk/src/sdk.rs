//! Client API
//!
//! [`SpiSdk`] owns the runtime record of every SPI host on the SoC. It is
//! shared between the main context and the interrupt handler through a
//! [`SharedState`](crate::sync::SharedState).

#[cfg(feature = "defmt")]
use defmt::{info, warn};

use spi_host_core::config::{BoardConfig, ConfigError, HostParams, SdkConfig};
use spi_host_core::peripheral::NUM_PERIPHERALS;
use spi_host_core::{PeripheralId, Segment, SlaveDescriptor, SpiState, StateEvent};
use spi_host_driver::{Events, HwErrors, PendingIrq, SpiHost, SpiIrqHandler};
use spi_host_hal::SpiHostRegs;

use crate::engine::{Peripheral, Runtime};
use crate::error::{SdkError, TransferError};
use crate::handle::Spi;
use crate::transaction::{Callbacks, Completion, Transaction};

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {{}};
}

/// Transaction engine for all SPI hosts of a SoC
pub struct SpiSdk<R> {
    peripherals: [Peripheral<R>; NUM_PERIPHERALS],
    config: SdkConfig,
}

impl<R: SpiHostRegs> SpiSdk<R> {
    /// Build the engine over the register blocks of each peripheral
    ///
    /// # Arguments
    /// * `regs` - Register access, in [`PeripheralId`] order
    /// * `board` - SDK settings and per-peripheral parameters
    pub fn new(regs: [R; NUM_PERIPHERALS], board: &BoardConfig) -> Result<Self, ConfigError> {
        board.validate()?;
        let mut index = 0;
        let peripherals = regs.map(|r| {
            let id = PeripheralId::ALL[index];
            let params = board.peripherals[index];
            index += 1;
            Peripheral::new(id, SpiHost::new(r, params))
        });
        Ok(Self {
            peripherals,
            config: board.sdk,
        })
    }

    /// Engine with default board parameters and the given SDK settings
    pub fn with_config(regs: [R; NUM_PERIPHERALS], config: SdkConfig) -> Result<Self, ConfigError> {
        let board = BoardConfig {
            sdk: config,
            peripherals: [HostParams::default(); NUM_PERIPHERALS],
        };
        Self::new(regs, &board)
    }

    pub fn config(&self) -> &SdkConfig {
        &self.config
    }

    pub fn peripheral(&self, id: PeripheralId) -> &Peripheral<R> {
        &self.peripherals[id.index()]
    }

    fn peri_mut(&mut self, id: PeripheralId) -> &mut Peripheral<R> {
        &mut self.peripherals[id.index()]
    }

    // ---------------------------------------------------------------------
    // Handles
    // ---------------------------------------------------------------------

    /// Bind `slave` to peripheral `id`
    ///
    /// Validates the slave, enables the block, its outputs and every error
    /// interrupt. The returned handle carries the realized frequency.
    pub fn init(&mut self, id: PeripheralId, slave: SlaveDescriptor) -> Result<Spi, SdkError> {
        let sys = self.config.system_clock_hz;
        let order = self.config.byte_order;
        let peri = self.peri_mut(id);
        let host = peri.host();
        let divider = slave.validate(host.params().num_cs, sys)?;

        host.set_enable(true);
        host.output_enable(true);
        host.set_errors_enabled(HwErrors::IRQ_ALL, true)?;
        host.enable_error_intr(true);
        if host.byte_order() != order {
            warn!("spi {}: hardware byte order differs from config", id);
        }
        peri.apply(StateEvent::Initialized);

        let slave = slave.realized(sys, divider);
        info!("spi {}: init csid {} at {} Hz", id, slave.csid, slave.freq_hz);
        Ok(Spi::new(id, slave, divider))
    }

    /// [`init`](Self::init) with a raw peripheral index
    pub fn init_index(&mut self, index: u32, slave: SlaveDescriptor) -> Result<Spi, SdkError> {
        let id = PeripheralId::from_index(index).ok_or(SdkError::IdxInvalid)?;
        self.init(id, slave)
    }

    /// Initialize `spi` in place; an initialized handle is rejected
    pub fn init_into(
        &mut self,
        spi: &mut Spi,
        id: PeripheralId,
        slave: SlaveDescriptor,
    ) -> Result<(), SdkError> {
        if spi.is_init() {
            return Err(SdkError::AlreadyInit);
        }
        *spi = self.init(id, slave)?;
        Ok(())
    }

    /// Invalidate a handle; the peripheral is left as is
    pub fn deinit(&mut self, spi: &mut Spi) {
        *spi = Spi::UNINIT;
    }

    /// Software reset of the handle's peripheral
    ///
    /// Drops queued commands and FIFO contents. The engine state is not
    /// touched, so resetting during a transaction leaves it Busy.
    pub fn reset(&mut self, spi: &Spi) -> Result<(), SdkError> {
        let id = spi.check()?;
        self.peripheral(id).host().sw_reset();
        Ok(())
    }

    pub fn get_state(&self, spi: &Spi) -> Result<SpiState, SdkError> {
        let id = spi.check()?;
        Ok(self.peripheral(id).state())
    }

    /// Runtime snapshot of peripheral `id`
    pub fn runtime(&self, id: PeripheralId) -> Runtime {
        self.peripheral(id).runtime()
    }

    /// Outcome and buffers of the last transaction that had no callback
    pub fn take_completion(&mut self, spi: &Spi) -> Result<Option<Completion>, SdkError> {
        let id = spi.check()?;
        Ok(self.peri_mut(id).take_completion())
    }

    // ---------------------------------------------------------------------
    // Non-blocking transfers
    // ---------------------------------------------------------------------

    /// Send `len` bytes from `tx`
    pub fn transmit_nb(
        &mut self,
        spi: &Spi,
        tx: &'static mut [u32],
        len: u32,
        callbacks: Callbacks,
    ) -> Result<(), TransferError> {
        self.submit(spi, Transaction::tx(tx, len), callbacks)
    }

    /// Receive `len` bytes into `rx`
    pub fn receive_nb(
        &mut self,
        spi: &Spi,
        rx: &'static mut [u32],
        len: u32,
        callbacks: Callbacks,
    ) -> Result<(), TransferError> {
        self.submit(spi, Transaction::rx(rx, len), callbacks)
    }

    /// Exchange `len` bytes full duplex
    pub fn transceive_nb(
        &mut self,
        spi: &Spi,
        tx: &'static mut [u32],
        rx: &'static mut [u32],
        len: u32,
        callbacks: Callbacks,
    ) -> Result<(), TransferError> {
        self.submit(spi, Transaction::bidir(tx, rx, len), callbacks)
    }

    /// Run an arbitrary segment list
    pub fn execute_nb(
        &mut self,
        spi: &Spi,
        segments: &[Segment],
        tx: Option<&'static mut [u32]>,
        rx: Option<&'static mut [u32]>,
        callbacks: Callbacks,
    ) -> Result<(), TransferError> {
        let txn = Transaction::generic(segments, tx, rx)
            .map_err(|(kind, buffers)| TransferError::new(kind, buffers))?;
        self.submit(spi, txn, callbacks)
    }

    /// Check everything, then program the slave and launch
    ///
    /// Nothing reaches the hardware unless the handle, the state and the
    /// transaction are all valid.
    pub fn submit(
        &mut self,
        spi: &Spi,
        txn: Transaction,
        callbacks: Callbacks,
    ) -> Result<(), TransferError> {
        if let Err(kind) = self.check_submit(spi, &txn) {
            return Err(TransferError::new(kind, txn.buffers));
        }
        let config = self.config;
        let Some(id) = spi.id() else {
            return Err(TransferError::new(SdkError::IdxInvalid, txn.buffers));
        };
        let peri = self.peri_mut(id);
        if let Err(kind) = peri.set_slave(spi) {
            return Err(TransferError::new(kind, txn.buffers));
        }
        peri.launch(&config, txn, callbacks)
    }

    fn check_submit(&self, spi: &Spi, txn: &Transaction) -> Result<(), SdkError> {
        let id = spi.check()?;
        if self.peripheral(id).state().is_busy() {
            return Err(SdkError::IsBusy);
        }
        if !self.peripheral(id).state().can_launch() {
            return Err(SdkError::NotInit);
        }
        txn.validate()
    }

    // ---------------------------------------------------------------------
    // Interrupts
    // ---------------------------------------------------------------------

    /// Service the interrupt of peripheral `id`
    ///
    /// Acknowledges whatever is pending and runs the error and event
    /// handlers. Harmless when nothing is pending.
    pub fn handle_irq(&mut self, id: PeripheralId) {
        let irq = PendingIrq::take(self.peripheral(id).host());
        irq.dispatch(id, self);
    }
}

impl<R: SpiHostRegs> SpiIrqHandler for SpiSdk<R> {
    fn on_event(&mut self, id: PeripheralId, events: Events) {
        self.peri_mut(id).on_event(events);
    }

    fn on_error(&mut self, id: PeripheralId, errors: HwErrors) {
        self.peri_mut(id).on_error(errors);
    }
}
