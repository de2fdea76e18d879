//! Command segments
//!
//! A transaction is an ordered list of segments. Each segment becomes one
//! COMMAND register write: a direction, a lane speed and a length. Chip
//! select stays asserted between the segments of a transaction.

use heapless::Vec;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of segments in one transaction
pub const MAX_SEGMENTS: usize = 16;

/// Pre-allocated storage for the segments of one transaction
pub type SegmentList = Vec<Segment, MAX_SEGMENTS>;

/// Maximum segment length in bytes (cycles for dummy segments)
pub const MAX_SEGMENT_LEN: u32 = (1 << 24) - 1;

/// Data direction of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Clock cycles with no data (turnaround, wait states)
    Dummy = 0,
    /// Receive only
    RxOnly = 1,
    /// Transmit only
    TxOnly = 2,
    /// Full duplex
    Bidir = 3,
}

impl Direction {
    /// Decode a COMMAND.DIRECTION code
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Direction::Dummy),
            1 => Some(Direction::RxOnly),
            2 => Some(Direction::TxOnly),
            3 => Some(Direction::Bidir),
            _ => None,
        }
    }

    /// COMMAND.DIRECTION code
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Whether the segment consumes TX FIFO words
    pub const fn uses_tx(self) -> bool {
        matches!(self, Direction::TxOnly | Direction::Bidir)
    }

    /// Whether the segment produces RX FIFO words
    pub const fn uses_rx(self) -> bool {
        matches!(self, Direction::RxOnly | Direction::Bidir)
    }

    /// Whether the hardware accepts this direction at `speed`
    ///
    /// Full duplex is only possible on a single lane.
    pub const fn allows(self, speed: Speed) -> bool {
        !matches!(
            (self, speed),
            (Direction::Bidir, Speed::Dual) | (Direction::Bidir, Speed::Quad)
        )
    }
}

/// Number of data lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Speed {
    /// One lane each way
    #[default]
    Standard = 0,
    /// Two lanes, half duplex
    Dual = 1,
    /// Four lanes, half duplex
    Quad = 2,
}

impl Speed {
    /// Decode a COMMAND.SPEED code (3 is reserved)
    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(Speed::Standard),
            1 => Some(Speed::Dual),
            2 => Some(Speed::Quad),
            _ => None,
        }
    }

    /// COMMAND.SPEED code
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// One command of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// Data direction
    pub direction: Direction,
    /// Lane speed
    pub speed: Speed,
    /// Length in bytes, or clock cycles for dummy segments
    pub len: u32,
}

impl Segment {
    pub const fn new(direction: Direction, speed: Speed, len: u32) -> Self {
        Self {
            direction,
            speed,
            len,
        }
    }

    /// Standard-speed transmit of `len` bytes
    pub const fn tx(len: u32) -> Self {
        Self::new(Direction::TxOnly, Speed::Standard, len)
    }

    /// Standard-speed receive of `len` bytes
    pub const fn rx(len: u32) -> Self {
        Self::new(Direction::RxOnly, Speed::Standard, len)
    }

    /// Full-duplex exchange of `len` bytes
    pub const fn bidir(len: u32) -> Self {
        Self::new(Direction::Bidir, Speed::Standard, len)
    }

    /// `cycles` clock cycles without data
    pub const fn dummy(cycles: u32) -> Self {
        Self::new(Direction::Dummy, Speed::Standard, cycles)
    }

    /// Same segment on a different number of lanes
    pub const fn with_speed(self, speed: Speed) -> Self {
        Self { speed, ..self }
    }

    /// FIFO words moved by this segment on each channel it uses
    pub const fn words(&self) -> u32 {
        len_words(self.len)
    }

    /// TX FIFO words consumed
    pub const fn tx_words(&self) -> u32 {
        if self.direction.uses_tx() {
            self.words()
        } else {
            0
        }
    }

    /// RX FIFO words produced
    pub const fn rx_words(&self) -> u32 {
        if self.direction.uses_rx() {
            self.words()
        } else {
            0
        }
    }

    /// Check direction/speed combination and length range
    pub fn validate(&self) -> Result<(), SegmentError> {
        if !self.direction.allows(self.speed) {
            return Err(SegmentError::InvalidMode { index: 0 });
        }
        if self.len == 0 || self.len > MAX_SEGMENT_LEN {
            return Err(SegmentError::InvalidLength { index: 0 });
        }
        Ok(())
    }
}

/// Words needed to hold `bytes` bytes
pub const fn len_words(bytes: u32) -> u32 {
    bytes.div_ceil(4)
}

/// TX and RX word totals of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WordCounts {
    pub tx: u32,
    pub rx: u32,
}

/// Segment list rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SegmentError {
    /// No segments
    Empty,
    /// More than [`MAX_SEGMENTS`]
    TooMany,
    /// Direction not allowed at this speed
    InvalidMode { index: usize },
    /// Length zero or above [`MAX_SEGMENT_LEN`]
    InvalidLength { index: usize },
}

/// Copy a segment slice into fixed storage
pub fn segment_list(segments: &[Segment]) -> Result<SegmentList, SegmentError> {
    Vec::from_slice(segments).map_err(|_| SegmentError::TooMany)
}

/// Validate a segment list and total its FIFO words
///
/// Every segment is checked before anything is returned, so a caller that
/// gets `Ok` may issue the whole list.
pub fn validate_segments(segments: &[Segment]) -> Result<WordCounts, SegmentError> {
    if segments.is_empty() {
        return Err(SegmentError::Empty);
    }
    if segments.len() > MAX_SEGMENTS {
        return Err(SegmentError::TooMany);
    }

    let mut counts = WordCounts::default();
    for (index, seg) in segments.iter().enumerate() {
        seg.validate().map_err(|e| match e {
            SegmentError::InvalidMode { .. } => SegmentError::InvalidMode { index },
            SegmentError::InvalidLength { .. } => SegmentError::InvalidLength { index },
            other => other,
        })?;
        counts.tx += seg.tx_words();
        counts.rx += seg.rx_words();
    }
    Ok(counts)
}
