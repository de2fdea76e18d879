//! Blocking transfers
//!
//! Each call launches through the same path as the non-blocking API, with
//! no callbacks, and then waits until the peripheral leaves Busy. The
//! interrupt handler finishes the transaction and parks the outcome, which
//! is collected here. A hardware abort therefore reaches the caller as
//! [`SdkError::Hardware`].

use core::marker::PhantomData;

use spi_host_core::Segment;
use spi_host_hal::{SpiHostRegs, Wait};

use crate::error::{SdkError, TransferError};
use crate::handle::Spi;
use crate::sdk::SpiSdk;
use crate::sync::SharedState;
use crate::transaction::{Buffers, Callbacks, Completion, Transaction};

/// A handle bound to the shared engine and a wait primitive
pub struct BlockingSpi<'a, R, S, W> {
    shared: &'a S,
    spi: Spi,
    pub(crate) wait: W,
    _regs: PhantomData<fn() -> R>,
}

impl<'a, R, S, W> BlockingSpi<'a, R, S, W>
where
    R: SpiHostRegs,
    S: SharedState<SpiSdk<R>>,
    W: Wait,
{
    pub fn new(shared: &'a S, spi: Spi, wait: W) -> Self {
        Self {
            shared,
            spi,
            wait,
            _regs: PhantomData,
        }
    }

    pub fn handle(&self) -> &Spi {
        &self.spi
    }

    pub fn into_handle(self) -> Spi {
        self.spi
    }

    /// Send `len` bytes from `tx`
    pub fn transmit(&mut self, tx: &'static mut [u32], len: u32) -> Result<Buffers, TransferError> {
        self.run(Transaction::tx(tx, len))
    }

    /// Receive `len` bytes into `rx`
    pub fn receive(&mut self, rx: &'static mut [u32], len: u32) -> Result<Buffers, TransferError> {
        self.run(Transaction::rx(rx, len))
    }

    /// Exchange `len` bytes full duplex
    pub fn transceive(
        &mut self,
        tx: &'static mut [u32],
        rx: &'static mut [u32],
        len: u32,
    ) -> Result<Buffers, TransferError> {
        self.run(Transaction::bidir(tx, rx, len))
    }

    /// Run an arbitrary segment list
    pub fn execute(
        &mut self,
        segments: &[Segment],
        tx: Option<&'static mut [u32]>,
        rx: Option<&'static mut [u32]>,
    ) -> Result<Buffers, TransferError> {
        let txn = Transaction::generic(segments, tx, rx)
            .map_err(|(kind, buffers)| TransferError::new(kind, buffers))?;
        self.run(txn)
    }

    /// Launch `txn` and wait for its outcome
    ///
    /// The completion is collected in the same critical section that sees
    /// the peripheral leave Busy, so the parked buffers come back to this
    /// caller.
    fn run(&mut self, txn: Transaction) -> Result<Buffers, TransferError> {
        let spi = self.spi;
        self.shared
            .with_mut(|sdk| sdk.submit(&spi, txn, Callbacks::NONE))?;

        let shared = self.shared;
        let mut collected = None;
        self.wait.wait_until(|| {
            collected = shared.with_mut(|sdk| collect(sdk, &spi));
            collected.is_some()
        });

        match collected {
            Some(Ok(Completion {
                outcome: Ok(()),
                buffers,
            })) => Ok(buffers),
            Some(Ok(Completion {
                outcome: Err(errors),
                buffers,
            })) => Err(TransferError::new(SdkError::Hardware(errors), buffers)),
            Some(Err(kind)) => Err(TransferError::new(kind, Buffers::empty())),
            None => Err(TransferError::new(SdkError::IsBusy, Buffers::empty())),
        }
    }
}

/// Outcome of the finished transaction on `spi`, or `None` while it runs
///
/// A callback-less transaction parks its completion in the same step that
/// leaves Busy, so it is only missing if another caller took it first.
fn collect<R: SpiHostRegs>(
    sdk: &mut SpiSdk<R>,
    spi: &Spi,
) -> Option<Result<Completion, SdkError>> {
    match sdk.get_state(spi) {
        Ok(state) if state.is_busy() => None,
        Ok(_) => Some(
            sdk.take_completion(spi)
                .and_then(|c| c.ok_or(SdkError::IsBusy)),
        ),
        Err(kind) => Some(Err(kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{leak, ready, zeroed, Pump, SimSdk};
    use crate::sync::MockState;
    use spi_host_core::{PeripheralId, SpiState};
    use spi_host_driver::HwErrors;
    use spi_host_hal::mock::SimSpiHost;

    type SimBlocking<'a> = BlockingSpi<'a, &'static SimSpiHost, MockState<SimSdk>, Pump<'a>>;

    fn blocking<'a>(shared: &'a MockState<SimSdk>, sim: &'static SimSpiHost, spi: Spi) -> SimBlocking<'a> {
        BlockingSpi::new(shared, spi, Pump::new(shared, sim, PeripheralId::Host))
    }

    #[test]
    fn test_transmit_returns_buffers() {
        let (sdk, sim, spi) = ready(PeripheralId::Host);
        let shared = MockState::new(sdk);
        let mut bus = blocking(&shared, sim, spi);

        let buffers = bus.transmit(leak(&[1, 2, 3]), 12).unwrap();
        assert_eq!(buffers.tx.as_deref(), Some(&[1, 2, 3][..]));
        assert_eq!(sim.sent(), [1, 2, 3]);
        assert_eq!(shared.with(|sdk| sdk.get_state(&spi)), Ok(SpiState::Init));
    }

    #[test]
    fn test_receive_and_execute() {
        let (sdk, sim, spi) = ready(PeripheralId::Host);
        let shared = MockState::new(sdk);
        let mut bus = blocking(&shared, sim, spi);

        sim.push_miso(&[0xCAFE, 0xF00D]);
        let buffers = bus.receive(zeroed(2), 8).unwrap();
        assert_eq!(buffers.rx.as_deref(), Some(&[0xCAFE, 0xF00D][..]));

        sim.push_miso(&[0x00C2_2017]);
        let segs = [Segment::tx(1), Segment::rx(3)];
        let buffers = bus.execute(&segs, Some(leak(&[0x9F])), Some(zeroed(1))).unwrap();
        assert_eq!(buffers.rx.as_deref(), Some(&[0x00C2_2017][..]));
        assert_eq!(sim.commands().len(), 3);
    }

    #[test]
    fn test_hardware_fault_reported() {
        let (sdk, sim, spi) = ready(PeripheralId::Host);
        let shared = MockState::new(sdk);
        let mut bus = blocking(&shared, sim, spi);
        bus.wait.fault = Some((1, HwErrors::CMDINVAL.bits()));

        let err = bus.transmit(leak(&[1, 2, 3, 4]), 16).unwrap_err();
        assert_eq!(err.kind, SdkError::Hardware(HwErrors::CMDINVAL));
        assert_eq!(err.buffers.tx_len, 4);
        assert!(err.buffers.tx.is_some());
        assert_eq!(shared.with(|sdk| sdk.get_state(&spi)), Ok(SpiState::Init));
    }

    #[test]
    fn test_completion_collected_once() {
        let (sdk, sim, spi) = ready(PeripheralId::Host);
        let shared = MockState::new(sdk);
        let tx = leak(&[7, 8]);
        let submitted = tx.as_ptr();

        shared
            .with_mut(|sdk| sdk.submit(&spi, Transaction::tx(tx, 8), Callbacks::NONE))
            .unwrap();
        assert!(shared.with_mut(|sdk| collect(sdk, &spi)).is_none());

        let mut pump = Pump::new(&shared, sim, PeripheralId::Host);
        pump.wait_until(|| shared.with(|sdk| !sdk.get_state(&spi).is_ok_and(|s| s.is_busy())));

        let done = shared.with_mut(|sdk| collect(sdk, &spi)).unwrap().unwrap();
        assert_eq!(done.outcome, Ok(()));
        assert_eq!(done.buffers.tx.map(|b| b.as_ptr()), Some(submitted));
        assert!(matches!(
            shared.with_mut(|sdk| collect(sdk, &spi)),
            Some(Err(SdkError::IsBusy))
        ));
        assert_eq!(sim.sent(), [7, 8]);
    }

    #[test]
    fn test_rejection_is_not_waited_on() {
        let (sdk, sim, spi) = ready(PeripheralId::Host);
        let shared = MockState::new(sdk);
        let mut bus = blocking(&shared, sim, spi);

        let err = bus.transmit(zeroed(1), 8).unwrap_err();
        assert_eq!(err.kind, SdkError::TxnLenInvalid);
        assert_eq!(bus.wait.steps, 0);

        let mut handle = bus.into_handle();
        shared.with_mut(|sdk| sdk.deinit(&mut handle));
        let mut bus = blocking(&shared, sim, handle);
        let err = bus.transmit(leak(&[1]), 4).unwrap_err();
        assert_eq!(err.kind, SdkError::IdxInvalid);
    }
}
