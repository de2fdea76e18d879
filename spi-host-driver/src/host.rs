//! Validating SPI host driver
//!
//! Thin layer over [`SpiHostRegs`]. Each operation checks its arguments
//! and the relevant status bits, then performs a single register access
//! (or one read-modify-write). Nothing here blocks except the explicit
//! `wait_for_*` helpers, which go through a caller-supplied [`Wait`].

#[cfg(feature = "defmt")]
use defmt::trace;

use spi_host_core::config::HostParams;
use spi_host_core::words::ByteOrder;
use spi_host_hal::regs::{Reg, SpiHostRegs, ALERT_TEST, CONTROL, INTR, NUM_CS};
use spi_host_hal::Wait;
use tock_registers::fields::FieldValue;
use tock_registers::RegisterLongName;

use crate::command::{validate_command, Command, ConfigOpts};
use crate::error::DriverError;
use crate::events::{Events, HwErrors};
use crate::status::{ChannelStatus, Status};

/// One SPI host peripheral
pub struct SpiHost<R> {
    regs: R,
    params: HostParams,
}

impl<R: SpiHostRegs> SpiHost<R> {
    /// Wrap a register block
    ///
    /// # Arguments
    /// * `regs` - Register access for the instance
    /// * `params` - FIFO depths and chip-select count of the instance
    pub const fn new(regs: R, params: HostParams) -> Self {
        Self { regs, params }
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    pub fn params(&self) -> &HostParams {
        &self.params
    }

    pub fn into_inner(self) -> R {
        self.regs
    }

    fn modify<L: RegisterLongName>(&self, reg: Reg, value: FieldValue<u32, L>) {
        self.regs.modify(reg, |word| value.modify(word));
    }

    // ---------------------------------------------------------------------
    // Events and errors
    // ---------------------------------------------------------------------

    /// Events enabled as interrupt sources
    pub fn events_enabled(&self) -> Events {
        Events::from_bits_truncate(self.regs.read(Reg::EventEnable))
    }

    /// Enable or disable a set of events
    pub fn set_events_enabled(&self, events: Events, enable: bool) -> Result<(), DriverError> {
        if !Events::all().contains(events) {
            return Err(DriverError::EventInvalid);
        }
        self.regs.modify(Reg::EventEnable, |word| {
            if enable {
                word | events.bits()
            } else {
                word & !events.bits()
            }
        });
        Ok(())
    }

    /// Disable every event
    pub fn disable_events(&self) {
        self.regs.write(Reg::EventEnable, 0);
    }

    /// Errors enabled as interrupt sources
    pub fn errors_enabled(&self) -> HwErrors {
        HwErrors::from_bits_truncate(self.regs.read(Reg::ErrorEnable))
    }

    /// Enable or disable a set of error interrupts
    ///
    /// ACCESSINVAL cannot be enabled and is rejected.
    pub fn set_errors_enabled(&self, errors: HwErrors, enable: bool) -> Result<(), DriverError> {
        if !HwErrors::IRQ_ALL.contains(errors) {
            return Err(DriverError::ErrorInvalid);
        }
        self.regs.modify(Reg::ErrorEnable, |word| {
            if enable {
                word | errors.bits()
            } else {
                word & !errors.bits()
            }
        });
        Ok(())
    }

    /// Errors latched by the hardware
    pub fn errors(&self) -> HwErrors {
        HwErrors::from_bits_truncate(self.regs.read(Reg::ErrorStatus))
    }

    /// Clear every latched error
    pub fn acknowledge_errors(&self) {
        self.regs.write(Reg::ErrorStatus, HwErrors::all().bits());
    }

    // ---------------------------------------------------------------------
    // Test hooks
    // ---------------------------------------------------------------------

    pub fn enable_error_intr_test(&self, enable: bool) {
        self.regs
            .write(Reg::IntrTest, INTR::ERROR.val(enable as u32).value);
    }

    pub fn enable_event_intr_test(&self, enable: bool) {
        self.regs
            .write(Reg::IntrTest, INTR::SPI_EVENT.val(enable as u32).value);
    }

    pub fn alert_test_fatal_fault(&self) {
        self.regs
            .write(Reg::AlertTest, ALERT_TEST::FATAL_FAULT::SET.value);
    }

    // ---------------------------------------------------------------------
    // Status
    // ---------------------------------------------------------------------

    /// Read STATUS once
    pub fn status(&self) -> Status {
        Status::from_bits(self.regs.read(Reg::Status))
    }

    pub fn tx_queue_depth(&self) -> u8 {
        self.status().tx_queue_depth()
    }

    pub fn rx_queue_depth(&self) -> u8 {
        self.status().rx_queue_depth()
    }

    pub fn cmd_queue_depth(&self) -> u8 {
        self.status().cmd_queue_depth()
    }

    pub fn tx_channel_status(&self) -> ChannelStatus {
        self.status().tx()
    }

    pub fn rx_channel_status(&self) -> ChannelStatus {
        self.status().rx()
    }

    /// A command is in progress
    pub fn is_active(&self) -> bool {
        self.status().active()
    }

    /// The command queue accepts another command
    pub fn is_ready(&self) -> bool {
        self.status().ready()
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.status().byte_order()
    }

    // ---------------------------------------------------------------------
    // Control
    // ---------------------------------------------------------------------

    /// Pulse SW_RST: drops queued commands and FIFO contents
    pub fn sw_reset(&self) {
        self.modify(Reg::Control, CONTROL::SW_RST::SET);
        self.modify(Reg::Control, CONTROL::SW_RST::CLEAR);
    }

    pub fn set_enable(&self, enable: bool) {
        self.modify(Reg::Control, CONTROL::SPIEN.val(enable as u32));
    }

    pub fn output_enable(&self, enable: bool) {
        self.modify(Reg::Control, CONTROL::OUTPUT_EN.val(enable as u32));
    }

    /// TX watermark in words; TXWM asserts while fewer words are queued
    pub fn set_tx_watermark(&self, watermark: u8) -> Result<(), DriverError> {
        if watermark > self.params.tx_depth {
            return Err(DriverError::WatermarkExceeds);
        }
        self.modify(Reg::Control, CONTROL::TX_WATERMARK.val(watermark as u32));
        Ok(())
    }

    /// RX watermark in words; RXWM asserts at or above it
    pub fn set_rx_watermark(&self, watermark: u8) -> Result<(), DriverError> {
        if watermark > self.params.rx_depth {
            return Err(DriverError::WatermarkExceeds);
        }
        self.modify(Reg::Control, CONTROL::RX_WATERMARK.val(watermark as u32));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Chip select
    // ---------------------------------------------------------------------

    pub fn csid(&self) -> u32 {
        self.regs.read(Reg::Csid)
    }

    pub fn set_csid(&self, csid: u32) -> Result<(), DriverError> {
        self.check_csid(csid)?;
        self.regs.write(Reg::Csid, csid);
        Ok(())
    }

    pub fn configopts(&self, csid: u32) -> Result<ConfigOpts, DriverError> {
        self.check_csid(csid)?;
        Ok(ConfigOpts::from_word(
            self.regs.read(Reg::ConfigOpts(csid as u8)),
        ))
    }

    pub fn set_configopts(&self, csid: u32, opts: &ConfigOpts) -> Result<(), DriverError> {
        self.check_csid(csid)?;
        self.regs.write(Reg::ConfigOpts(csid as u8), opts.to_word());
        Ok(())
    }

    /// Lines beyond the CONFIGOPTS registers of the map are never valid
    fn check_csid(&self, csid: u32) -> Result<(), DriverError> {
        let lines = (self.params.num_cs as usize).min(NUM_CS);
        if csid as usize >= lines {
            return Err(DriverError::CsidInvalid);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Commands and data
    // ---------------------------------------------------------------------

    /// Queue a command
    pub fn set_command(&self, command: &Command) -> Result<(), DriverError> {
        command.validate()?;
        self.check_cmd_queue()?;
        self.regs.write(Reg::Command, command.to_word());
        Ok(())
    }

    /// Queue a raw COMMAND word
    ///
    /// Only the speed/direction pair is checked; the length field is taken
    /// as is.
    pub fn set_command_word(&self, word: u32) -> Result<(), DriverError> {
        let direction = (word >> 27) & 0b11;
        let speed = (word >> 25) & 0b11;
        if !validate_command(direction, speed) {
            return Err(DriverError::SpeedInvalid);
        }
        self.check_cmd_queue()?;
        self.regs.write(Reg::Command, word);
        Ok(())
    }

    fn check_cmd_queue(&self) -> Result<(), DriverError> {
        let status = self.status();
        if status.cmd_queue_depth() >= self.params.cmd_depth {
            #[cfg(feature = "defmt")]
            trace!("command queue full ({})", status.cmd_queue_depth());
            return Err(DriverError::CommandFull);
        }
        if !status.ready() {
            return Err(DriverError::NotReady);
        }
        Ok(())
    }

    /// Push one word into the TX FIFO
    pub fn write_word(&self, word: u32) -> Result<(), DriverError> {
        if self.status().tx().full {
            return Err(DriverError::TxQueueFull);
        }
        self.regs.write(Reg::TxData, word);
        Ok(())
    }

    /// Push one byte into the TX FIFO
    pub fn write_byte(&self, byte: u8) -> Result<(), DriverError> {
        if self.status().tx().full {
            return Err(DriverError::TxQueueFull);
        }
        self.regs.write_byte(Reg::TxData, byte);
        Ok(())
    }

    /// Pop one word from the RX FIFO
    pub fn read_word(&self) -> Result<u32, DriverError> {
        if self.status().rx().empty {
            return Err(DriverError::RxQueueEmpty);
        }
        Ok(self.regs.read(Reg::RxData))
    }

    // ---------------------------------------------------------------------
    // Interrupts
    // ---------------------------------------------------------------------

    pub fn enable_event_intr(&self, enable: bool) {
        self.modify(Reg::IntrEnable, INTR::SPI_EVENT.val(enable as u32));
    }

    pub fn enable_error_intr(&self, enable: bool) {
        self.modify(Reg::IntrEnable, INTR::ERROR.val(enable as u32));
    }

    pub fn event_intr_enabled(&self) -> bool {
        self.regs.read(Reg::IntrEnable) & INTR::SPI_EVENT::SET.value != 0
    }

    pub fn error_intr_enabled(&self) -> bool {
        self.regs.read(Reg::IntrEnable) & INTR::ERROR::SET.value != 0
    }

    pub fn event_intr_pending(&self) -> bool {
        self.regs.read(Reg::IntrState) & INTR::SPI_EVENT::SET.value != 0
    }

    pub fn error_intr_pending(&self) -> bool {
        self.regs.read(Reg::IntrState) & INTR::ERROR::SET.value != 0
    }

    /// Raw INTR_STATE masked by INTR_ENABLE
    pub fn intr_pending(&self) -> u32 {
        self.regs.read(Reg::IntrState) & self.regs.read(Reg::IntrEnable)
    }

    /// Clear latched interrupt bits (write 1 to clear)
    pub fn acknowledge_intr(&self, bits: u32) {
        self.regs.write(Reg::IntrState, bits);
    }

    /// Asserted events that are also enabled
    pub fn pending_events(&self) -> Events {
        self.status().events() & self.events_enabled()
    }

    // ---------------------------------------------------------------------
    // Waits
    // ---------------------------------------------------------------------

    pub fn wait_for_ready<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| self.status().ready());
    }

    pub fn wait_for_idle<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| !self.status().active());
    }

    pub fn wait_for_cmd_not_full<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| self.status().cmd_queue_depth() < self.params.cmd_depth);
    }

    pub fn wait_for_tx_watermark<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| self.status().tx().wm);
    }

    pub fn wait_for_tx_empty<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| self.status().tx().empty);
    }

    pub fn wait_for_tx_not_empty<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| !self.status().tx().empty);
    }

    pub fn wait_for_tx_not_full<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| !self.status().tx().full);
    }

    pub fn wait_for_rx_empty<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| self.status().rx().empty);
    }

    pub fn wait_for_rx_not_empty<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| !self.status().rx().empty);
    }

    pub fn wait_for_rx_not_full<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| !self.status().rx().full);
    }

    pub fn wait_for_rx_watermark<W: Wait>(&self, w: &mut W) {
        w.wait_until(|| self.status().rx().wm);
    }
}
