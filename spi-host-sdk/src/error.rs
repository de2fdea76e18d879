//! SDK error types

use spi_host_core::segment::SegmentError;
use spi_host_core::slave::SlaveError;
use spi_host_driver::{DriverError, HwErrors};

use crate::transaction::Buffers;

/// Client API rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SdkError {
    /// Peripheral index out of range, or the handle was deinitialized
    IdxInvalid,
    /// The handle was never initialized
    NotInit,
    /// The handle is already initialized
    AlreadyInit,
    /// A transaction is in flight on the peripheral
    IsBusy,
    /// The peripheral is mid-command and cannot be reconfigured
    NotIdle,
    /// Chip-select ID does not exist on the peripheral
    SlaveCsidInvalid,
    /// Slave frequency outside the reachable range
    SlaveFreqInvalid,
    /// Other slave parameter rejected
    SlaveInvalid,
    /// A segment has an invalid direction/speed pair or length
    SegmentInvalid,
    /// Transfer length zero, too long, or larger than its buffer
    TxnLenInvalid,
    /// The register driver refused a request
    Driver(DriverError),
    /// The hardware aborted the transaction
    Hardware(HwErrors),
}

impl From<SlaveError> for SdkError {
    fn from(e: SlaveError) -> Self {
        match e {
            SlaveError::CsidInvalid => SdkError::SlaveCsidInvalid,
            SlaveError::Frequency(_) => SdkError::SlaveFreqInvalid,
            SlaveError::TimingInvalid => SdkError::SlaveInvalid,
        }
    }
}

impl From<SegmentError> for SdkError {
    fn from(_: SegmentError) -> Self {
        SdkError::SegmentInvalid
    }
}

impl From<DriverError> for SdkError {
    fn from(e: DriverError) -> Self {
        SdkError::Driver(e)
    }
}

/// A rejected or aborted transfer, with the caller's buffers handed back
#[derive(Debug)]
pub struct TransferError {
    pub kind: SdkError,
    pub buffers: Buffers,
}

impl TransferError {
    pub fn new(kind: SdkError, buffers: Buffers) -> Self {
        Self { kind, buffers }
    }
}

impl From<TransferError> for SdkError {
    fn from(e: TransferError) -> Self {
        e.kind
    }
}
