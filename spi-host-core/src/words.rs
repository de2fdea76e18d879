//! Byte packing for the word-wide data FIFOs
//!
//! The FIFOs move 32-bit words. The first byte on the wire is the least
//! significant byte of the word when the peripheral is little-endian
//! (STATUS.BYTEORDER = 0), the most significant otherwise.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::segment::len_words;

/// Order of bytes within a FIFO word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ByteOrder {
    /// First wire byte in bits 7:0
    #[default]
    LittleEndian,
    /// First wire byte in bits 31:24
    BigEndian,
}

impl ByteOrder {
    /// Decode STATUS.BYTEORDER
    pub const fn from_status_bit(big_endian: bool) -> Self {
        if big_endian {
            ByteOrder::BigEndian
        } else {
            ByteOrder::LittleEndian
        }
    }

    fn pack(self, chunk: [u8; 4]) -> u32 {
        match self {
            ByteOrder::LittleEndian => u32::from_le_bytes(chunk),
            ByteOrder::BigEndian => u32::from_be_bytes(chunk),
        }
    }

    fn unpack(self, word: u32) -> [u8; 4] {
        match self {
            ByteOrder::LittleEndian => word.to_le_bytes(),
            ByteOrder::BigEndian => word.to_be_bytes(),
        }
    }
}

/// Pack bytes into FIFO words, zero-padding the last word
///
/// Returns the number of words written, or `None` if `out` is too short.
pub fn pack_words(bytes: &[u8], out: &mut [u32], order: ByteOrder) -> Option<usize> {
    let needed = len_words(bytes.len() as u32) as usize;
    let out = out.get_mut(..needed)?;
    for (word, chunk) in out.iter_mut().zip(bytes.chunks(4)) {
        let mut buf = [0u8; 4];
        buf[..chunk.len()].copy_from_slice(chunk);
        *word = order.pack(buf);
    }
    Some(needed)
}

/// Unpack FIFO words into bytes, dropping padding beyond `out.len()`
///
/// Returns `None` if `words` does not hold `out.len()` bytes.
pub fn unpack_words(words: &[u32], out: &mut [u8], order: ByteOrder) -> Option<()> {
    let needed = len_words(out.len() as u32) as usize;
    let words = words.get(..needed)?;
    for (chunk, word) in out.chunks_mut(4).zip(words) {
        let bytes = order.unpack(*word);
        chunk.copy_from_slice(&bytes[..chunk.len()]);
    }
    Some(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_little_endian_first_byte_lowest() {
        let mut out = [0u32; 1];
        assert_eq!(
            pack_words(&[0x11, 0x22, 0x33, 0x44], &mut out, ByteOrder::LittleEndian),
            Some(1)
        );
        assert_eq!(out[0], 0x4433_2211);
    }

    #[test]
    fn test_big_endian_first_byte_highest() {
        let mut out = [0u32; 1];
        pack_words(&[0x11, 0x22, 0x33, 0x44], &mut out, ByteOrder::BigEndian);
        assert_eq!(out[0], 0x1122_3344);
    }

    #[test]
    fn test_partial_word_padded() {
        let mut out = [0xFFFF_FFFFu32; 3];
        assert_eq!(
            pack_words(&[1, 2, 3, 4, 5], &mut out, ByteOrder::LittleEndian),
            Some(2)
        );
        assert_eq!(out, [0x0403_0201, 0x0000_0005, 0xFFFF_FFFF]);
    }

    #[test]
    fn test_short_output_rejected() {
        let mut out = [0u32; 1];
        assert_eq!(pack_words(&[0; 5], &mut out, ByteOrder::LittleEndian), None);
        let mut bytes = [0u8; 9];
        assert_eq!(unpack_words(&[0, 0], &mut bytes, ByteOrder::LittleEndian), None);
    }

    #[test]
    fn test_unpack_truncates_padding() {
        let mut bytes = [0u8; 6];
        unpack_words(
            &[0x0403_0201, 0x0807_0605],
            &mut bytes,
            ByteOrder::LittleEndian,
        )
        .unwrap();
        assert_eq!(bytes, [1, 2, 3, 4, 5, 6]);
    }
}
