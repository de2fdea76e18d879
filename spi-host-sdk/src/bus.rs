//! `embedded-hal` bus adapter
//!
//! Lets generic device drivers run on an SPI host. Words are FIFO words
//! (four bytes each). Caller slices are borrowed only for the duration of
//! a call, so data is staged through two `'static` scratch buffers and
//! transfers longer than the scratch are split into several transactions.
//!
//! Chip select is driven by the host for each transaction. Device drivers
//! that need one chip-select window across several operations should use
//! [`BlockingSpi::execute`] directly.

use embedded_hal::spi::{Error, ErrorKind, ErrorType, SpiBus};
use spi_host_driver::HwErrors;
use spi_host_hal::{SpiHostRegs, Wait};

use crate::blocking::BlockingSpi;
use crate::error::{SdkError, TransferError};
use crate::sdk::SpiSdk;
use crate::sync::SharedState;
use crate::transaction::Buffers;

/// Bus error carrying the SDK error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusError(pub SdkError);

impl Error for BusError {
    fn kind(&self) -> ErrorKind {
        match self.0 {
            SdkError::Hardware(e) if e.intersects(HwErrors::OVERFLOW | HwErrors::UNDERFLOW) => {
                ErrorKind::Overrun
            }
            SdkError::Hardware(e) if e.contains(HwErrors::CSIDINVAL) => ErrorKind::ChipSelectFault,
            _ => ErrorKind::Other,
        }
    }
}

/// TX and RX scratch buffers
pub type Scratch = (Option<&'static mut [u32]>, Option<&'static mut [u32]>);

/// [`SpiBus`] over a blocking handle
pub struct SpiHostBus<'a, R, S, W> {
    spi: BlockingSpi<'a, R, S, W>,
    tx: Option<&'static mut [u32]>,
    rx: Option<&'static mut [u32]>,
}

impl<'a, R, S, W> SpiHostBus<'a, R, S, W>
where
    R: SpiHostRegs,
    S: SharedState<SpiSdk<R>>,
    W: Wait,
{
    /// Wrap `spi` with scratch buffers; the shorter one bounds each chunk
    pub fn new(
        spi: BlockingSpi<'a, R, S, W>,
        tx: &'static mut [u32],
        rx: &'static mut [u32],
    ) -> Self {
        Self {
            spi,
            tx: Some(tx),
            rx: Some(rx),
        }
    }

    /// Give back the handle and whatever scratch the adapter still holds
    pub fn release(self) -> (BlockingSpi<'a, R, S, W>, Scratch) {
        (self.spi, (self.tx, self.rx))
    }

    fn chunk(&self) -> usize {
        let tx = self.tx.as_ref().map_or(0, |b| b.len());
        let rx = self.rx.as_ref().map_or(0, |b| b.len());
        tx.min(rx)
    }

    fn restore(&mut self, buffers: Buffers) {
        if buffers.tx.is_some() {
            self.tx = buffers.tx;
        }
        if buffers.rx.is_some() {
            self.rx = buffers.rx;
        }
    }

    fn settle(&mut self, result: Result<Buffers, TransferError>) -> Result<(), BusError> {
        match result {
            Ok(buffers) => {
                self.restore(buffers);
                Ok(())
            }
            Err(e) => {
                self.restore(e.buffers);
                Err(BusError(e.kind))
            }
        }
    }

    fn scratch(&self) -> Result<usize, BusError> {
        match self.chunk() {
            0 => Err(BusError(SdkError::TxnLenInvalid)),
            n => Ok(n),
        }
    }

    /// Full-duplex chunk of `n` words; `out` is zero padded and the
    /// received words stay in the RX scratch
    fn exchange(&mut self, out: &[u32], n: usize) -> Result<(), BusError> {
        let (tx, rx) = match (self.tx.take(), self.rx.take()) {
            (Some(tx), Some(rx)) => (tx, rx),
            (tx, rx) => {
                self.tx = tx;
                self.rx = rx;
                return Err(BusError(SdkError::TxnLenInvalid));
            }
        };
        for (i, slot) in tx[..n].iter_mut().enumerate() {
            *slot = out.get(i).copied().unwrap_or(0);
        }
        let result = self.spi.transceive(tx, rx, (n * 4) as u32);
        self.settle(result)
    }
}

impl<R, S, W> ErrorType for SpiHostBus<'_, R, S, W> {
    type Error = BusError;
}

impl<'a, R, S, W> SpiBus<u32> for SpiHostBus<'a, R, S, W>
where
    R: SpiHostRegs,
    S: SharedState<SpiSdk<R>>,
    W: Wait,
{
    fn read(&mut self, words: &mut [u32]) -> Result<(), Self::Error> {
        let n = self.scratch()?;
        for chunk in words.chunks_mut(n) {
            let Some(rx) = self.rx.take() else {
                return Err(BusError(SdkError::TxnLenInvalid));
            };
            let result = self.spi.receive(rx, (chunk.len() * 4) as u32);
            self.settle(result)?;
            if let Some(rx) = self.rx.as_deref() {
                chunk.copy_from_slice(&rx[..chunk.len()]);
            }
        }
        Ok(())
    }

    fn write(&mut self, words: &[u32]) -> Result<(), Self::Error> {
        let n = self.scratch()?;
        for chunk in words.chunks(n) {
            let Some(tx) = self.tx.take() else {
                return Err(BusError(SdkError::TxnLenInvalid));
            };
            tx[..chunk.len()].copy_from_slice(chunk);
            let result = self.spi.transmit(tx, (chunk.len() * 4) as u32);
            self.settle(result)?;
        }
        Ok(())
    }

    fn transfer(&mut self, read: &mut [u32], write: &[u32]) -> Result<(), Self::Error> {
        let n = self.scratch()?;
        let total = read.len().max(write.len());
        let mut at = 0;
        while at < total {
            let len = n.min(total - at);
            let out = write.get(at..).unwrap_or(&[]);
            self.exchange(&out[..len.min(out.len())], len)?;
            if let (Some(rx), Some(dst)) = (self.rx.as_deref(), read.get_mut(at..)) {
                let keep = len.min(dst.len());
                dst[..keep].copy_from_slice(&rx[..keep]);
            }
            at += len;
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, words: &mut [u32]) -> Result<(), Self::Error> {
        let n = self.scratch()?;
        for chunk in words.chunks_mut(n) {
            self.exchange(chunk, chunk.len())?;
            if let Some(rx) = self.rx.as_deref() {
                chunk.copy_from_slice(&rx[..chunk.len()]);
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // Every call above returns only after its transaction completed
        Ok(())
    }
}
