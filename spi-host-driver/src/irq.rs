//! Interrupt acknowledgement and dispatch
//!
//! The SoC wires one event line and one error line per instance into the
//! platform interrupt controller. Whatever services those lines calls
//! [`PendingIrq::take`] to snapshot and acknowledge the cause, then hands
//! the snapshot to an [`SpiIrqHandler`].

use spi_host_core::PeripheralId;
use spi_host_hal::regs::{SpiHostRegs, INTR};

use crate::events::{Events, HwErrors};
use crate::host::SpiHost;

/// Receiver of decoded SPI host interrupts
///
/// Both methods default to doing nothing.
pub trait SpiIrqHandler {
    /// Enabled events were asserted on `id`
    fn on_event(&mut self, id: PeripheralId, events: Events) {
        let _ = (id, events);
    }

    /// Hardware errors were latched on `id`
    fn on_error(&mut self, id: PeripheralId, errors: HwErrors) {
        let _ = (id, errors);
    }
}

/// Handler that ignores every interrupt
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopIrqHandler;

impl SpiIrqHandler for NoopIrqHandler {}

/// Cause of one interrupt, already acknowledged in hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingIrq {
    /// Enabled events asserted when the interrupt was taken
    pub events: Events,
    /// Errors latched when the interrupt was taken
    pub errors: HwErrors,
}

impl PendingIrq {
    /// Snapshot and acknowledge the pending interrupt of `host`
    ///
    /// ERROR_STATUS is cleared before INTR_STATE so the error line does not
    /// immediately re-assert.
    pub fn take<R: SpiHostRegs>(host: &SpiHost<R>) -> Self {
        let pending = host.intr_pending();
        let mut irq = Self::default();

        if pending & INTR::SPI_EVENT::SET.value != 0 {
            irq.events = host.pending_events();
        }
        if pending & INTR::ERROR::SET.value != 0 {
            irq.errors = host.errors();
            host.acknowledge_errors();
        }
        if pending != 0 {
            host.acknowledge_intr(pending);
        }
        irq
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.errors.is_empty()
    }

    /// Forward to `handler`, errors first
    pub fn dispatch<H: SpiIrqHandler + ?Sized>(&self, id: PeripheralId, handler: &mut H) {
        if !self.errors.is_empty() {
            handler.on_error(id, self.errors);
        }
        if !self.events.is_empty() {
            handler.on_event(id, self.events);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spi_host_core::config::HostParams;
    use spi_host_hal::mock::SimSpiHost;

    #[derive(Default)]
    struct Recorder {
        calls: std::vec::Vec<(&'static str, u32)>,
    }

    impl SpiIrqHandler for Recorder {
        fn on_event(&mut self, _id: PeripheralId, events: Events) {
            self.calls.push(("event", events.bits()));
        }

        fn on_error(&mut self, _id: PeripheralId, errors: HwErrors) {
            self.calls.push(("error", errors.bits()));
        }
    }

    #[test]
    fn test_nothing_pending() {
        let sim = SimSpiHost::new();
        let host = SpiHost::new(&sim, HostParams::default());
        let irq = PendingIrq::take(&host);
        assert!(irq.is_empty());
        assert_eq!(sim.writes_to(spi_host_hal::Reg::IntrState), 0);
    }

    #[test]
    fn test_error_taken_and_cleared() {
        let sim = SimSpiHost::new();
        let host = SpiHost::new(&sim, HostParams::default());
        host.set_errors_enabled(HwErrors::IRQ_ALL, true).unwrap();
        host.enable_error_intr(true);
        sim.inject_error(HwErrors::CSIDINVAL.bits());
        assert!(sim.irq_pending());

        let irq = PendingIrq::take(&host);
        assert_eq!(irq.errors, HwErrors::CSIDINVAL);
        assert!(irq.events.is_empty());
        assert!(host.errors().is_empty());
        assert!(!sim.irq_pending());
    }

    #[test]
    fn test_disabled_line_ignored() {
        let sim = SimSpiHost::new();
        let host = SpiHost::new(&sim, HostParams::default());
        host.set_errors_enabled(HwErrors::IRQ_ALL, true).unwrap();
        sim.inject_error(HwErrors::OVERFLOW.bits());

        let irq = PendingIrq::take(&host);
        assert!(irq.is_empty());
        assert_eq!(host.errors(), HwErrors::OVERFLOW);
    }

    #[test]
    fn test_dispatch_errors_before_events() {
        let irq = PendingIrq {
            events: Events::IDLE,
            errors: HwErrors::UNDERFLOW,
        };
        let mut rec = Recorder::default();
        irq.dispatch(PeripheralId::Host, &mut rec);
        assert_eq!(
            rec.calls,
            [
                ("error", HwErrors::UNDERFLOW.bits()),
                ("event", Events::IDLE.bits())
            ]
        );
        PendingIrq::default().dispatch(PeripheralId::Flash, &mut NoopIrqHandler);
    }
}
