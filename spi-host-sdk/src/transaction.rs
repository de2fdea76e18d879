//! Transactions, buffers and callbacks
//!
//! A [`Transaction`] is the segment list plus the caller's buffers. The
//! buffers are `'static` because the engine keeps them while the transfer
//! runs in interrupt context; they are handed back through the completion
//! callback, the parked [`Completion`] or a [`TransferError`].
//!
//! [`TransferError`]: crate::error::TransferError

use spi_host_core::segment::{
    len_words, segment_list, validate_segments, SegmentError, SegmentList,
};
use spi_host_core::{PeripheralId, Segment};
use spi_host_driver::HwErrors;

use crate::error::SdkError;

/// Caller-owned data buffers of one transaction
#[derive(Debug, Default)]
pub struct Buffers {
    /// Words to transmit
    pub tx: Option<&'static mut [u32]>,
    /// Words of `tx` the transaction sends
    pub tx_len: u32,
    /// Destination for received words
    pub rx: Option<&'static mut [u32]>,
    /// Words of `rx` the transaction fills
    pub rx_len: u32,
}

impl Buffers {
    pub const fn empty() -> Self {
        Self {
            tx: None,
            tx_len: 0,
            rx: None,
            rx_len: 0,
        }
    }

    /// Check that each buffer holds the words the transaction moves
    fn check(&self) -> Result<(), SdkError> {
        fn fits(buf: &Option<&'static mut [u32]>, len: u32) -> bool {
            len == 0 || buf.as_ref().is_some_and(|b| b.len() >= len as usize)
        }
        if fits(&self.tx, self.tx_len) && fits(&self.rx, self.rx_len) {
            Ok(())
        } else {
            Err(SdkError::TxnLenInvalid)
        }
    }
}

/// Segment list and buffers of one transfer
#[derive(Debug)]
pub struct Transaction {
    pub segments: SegmentList,
    pub buffers: Buffers,
}

impl Transaction {
    /// Standard-speed transmit of `len` bytes from `tx`
    pub fn tx(tx: &'static mut [u32], len: u32) -> Self {
        Self::single(
            Segment::tx(len),
            Buffers {
                tx: Some(tx),
                tx_len: len_words(len),
                ..Buffers::empty()
            },
        )
    }

    /// Standard-speed receive of `len` bytes into `rx`
    pub fn rx(rx: &'static mut [u32], len: u32) -> Self {
        Self::single(
            Segment::rx(len),
            Buffers {
                rx: Some(rx),
                rx_len: len_words(len),
                ..Buffers::empty()
            },
        )
    }

    /// Full-duplex exchange of `len` bytes
    pub fn bidir(tx: &'static mut [u32], rx: &'static mut [u32], len: u32) -> Self {
        let words = len_words(len);
        Self::single(
            Segment::bidir(len),
            Buffers {
                tx: Some(tx),
                tx_len: words,
                rx: Some(rx),
                rx_len: words,
            },
        )
    }

    /// Arbitrary segment list
    ///
    /// The buffer lengths are the word totals of the segments, so the list
    /// is validated here. On rejection the buffers come back with the error.
    pub fn generic(
        segments: &[Segment],
        tx: Option<&'static mut [u32]>,
        rx: Option<&'static mut [u32]>,
    ) -> Result<Self, (SdkError, Buffers)> {
        let mut buffers = Buffers {
            tx,
            rx,
            ..Buffers::empty()
        };
        let counts = match validate_segments(segments) {
            Ok(counts) => counts,
            Err(e) => return Err((e.into(), buffers)),
        };
        let segments = match segment_list(segments) {
            Ok(list) => list,
            Err(e) => return Err((e.into(), buffers)),
        };
        buffers.tx_len = counts.tx;
        buffers.rx_len = counts.rx;
        Ok(Self { segments, buffers })
    }

    fn single(segment: Segment, buffers: Buffers) -> Self {
        let mut segments = SegmentList::new();
        // Capacity is at least one
        let _ = segments.push(segment);
        Self { segments, buffers }
    }

    /// Validate segments and buffer sizes without touching hardware
    pub fn validate(&self) -> Result<(), SdkError> {
        validate_segments(&self.segments).map_err(|e| match e {
            SegmentError::InvalidLength { .. } if self.segments.len() == 1 => SdkError::TxnLenInvalid,
            other => other.into(),
        })?;
        self.buffers.check()
    }
}

/// Engine cursors of the running transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursors {
    /// Segments issued
    pub segment: usize,
    /// TX words pushed into the FIFO
    pub tx_word: u32,
    /// RX words pulled from the FIFO
    pub rx_word: u32,
}

/// Called with the buffers when a transaction completes
pub type DoneFn = fn(PeripheralId, Buffers);

/// Called after a watermark refill or drain
pub type WatermarkFn = fn(PeripheralId, &Buffers, Cursors);

/// Called with the error set and in-flight buffers when the hardware aborts
pub type ErrorFn = fn(PeripheralId, HwErrors, Buffers);

/// Optional notifications for a non-blocking transfer
#[derive(Debug, Clone, Copy, Default)]
pub struct Callbacks {
    pub on_done: Option<DoneFn>,
    pub on_tx_watermark: Option<WatermarkFn>,
    pub on_rx_watermark: Option<WatermarkFn>,
    pub on_error: Option<ErrorFn>,
}

impl Callbacks {
    pub const NONE: Self = Self {
        on_done: None,
        on_tx_watermark: None,
        on_rx_watermark: None,
        on_error: None,
    };

    pub const fn on_done(self, f: DoneFn) -> Self {
        Self {
            on_done: Some(f),
            ..self
        }
    }

    pub const fn on_tx_watermark(self, f: WatermarkFn) -> Self {
        Self {
            on_tx_watermark: Some(f),
            ..self
        }
    }

    pub const fn on_rx_watermark(self, f: WatermarkFn) -> Self {
        Self {
            on_rx_watermark: Some(f),
            ..self
        }
    }

    pub const fn on_error(self, f: ErrorFn) -> Self {
        Self {
            on_error: Some(f),
            ..self
        }
    }
}

/// Outcome of a transaction nobody registered a callback for
#[derive(Debug)]
pub struct Completion {
    /// `Err` holds the errors that aborted the transaction
    pub outcome: Result<(), HwErrors>,
    pub buffers: Buffers,
}

#[cfg(test)]
mod tests {
    use super::*;
    use spi_host_core::Speed;

    fn leak(words: usize) -> &'static mut [u32] {
        Box::leak(vec![0u32; words].into_boxed_slice())
    }

    #[test]
    fn test_tx_rounds_length_to_words() {
        let txn = Transaction::tx(leak(2), 5);
        assert_eq!(txn.segments.as_slice(), [Segment::tx(5)]);
        assert_eq!(txn.buffers.tx_len, 2);
        assert_eq!(txn.buffers.rx_len, 0);
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_short_buffer_rejected() {
        let txn = Transaction::rx(leak(1), 8);
        assert_eq!(txn.validate(), Err(SdkError::TxnLenInvalid));
    }

    #[test]
    fn test_zero_length_rejected() {
        let txn = Transaction::tx(leak(1), 0);
        assert_eq!(txn.validate(), Err(SdkError::TxnLenInvalid));
    }

    #[test]
    fn test_generic_totals_words() {
        let segs = [
            Segment::tx(4),
            Segment::dummy(8),
            Segment::rx(6).with_speed(Speed::Quad),
        ];
        let txn = Transaction::generic(&segs, Some(leak(1)), Some(leak(2))).unwrap();
        assert_eq!(txn.buffers.tx_len, 1);
        assert_eq!(txn.buffers.rx_len, 2);
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_generic_rejects_bidir_quad() {
        let segs = [Segment::bidir(4).with_speed(Speed::Quad)];
        let (kind, buffers) = Transaction::generic(&segs, Some(leak(1)), Some(leak(1))).unwrap_err();
        assert_eq!(kind, SdkError::SegmentInvalid);
        assert!(buffers.tx.is_some());
        assert!(buffers.rx.is_some());
    }

    #[test]
    fn test_generic_requires_buffers_for_used_channels() {
        let segs = [Segment::tx(4), Segment::rx(4)];
        let txn = Transaction::generic(&segs, Some(leak(1)), None).unwrap();
        assert_eq!(txn.validate(), Err(SdkError::TxnLenInvalid));
    }

    #[test]
    fn test_callback_builders() {
        fn done(_: PeripheralId, _: Buffers) {}
        let cbs = Callbacks::NONE.on_done(done);
        assert!(cbs.on_done.is_some());
        assert!(cbs.on_error.is_none());
    }
}
