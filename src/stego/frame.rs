// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Message header.
//!
//! Two clusters precede the characters, each holding one big-endian `u32`
//! packed exactly like a 4-byte character:
//!
//! ```text
//! cluster 0 (start anchor)      character count
//! cluster 1 (first walk step)   CRC-32 of the characters' UTF-8 bytes
//! ```
//!
//! The count tells the decoder where to stop; the CRC rejects extractions
//! made with the wrong passphrase or from an image that carries no message.

use crate::raster::{Coord, PixelGrid};
use crate::stego::cluster::{pack_bytes, unpack_bytes, MAX_CLUSTER_BYTES};

/// Clusters consumed by the header.
pub const HEADER_CLUSTERS: usize = 2;

/// Parsed or to-be-written message header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// Number of characters that follow.
    pub char_count: u32,
    /// CRC-32 of the concatenated UTF-8 bytes of those characters.
    pub checksum: u32,
}

impl Header {
    /// Header describing exactly `chars`.
    pub fn for_chars(chars: &[&[u8]]) -> Self {
        Self {
            char_count: chars.len() as u32,
            checksum: checksum(chars),
        }
    }
}

/// CRC-32 over the characters in order.
pub fn checksum(chars: &[&[u8]]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for c in chars {
        hasher.update(c);
    }
    hasher.finalize()
}

/// Pack a header word at `anchor`.
pub fn write_word(word: u32, anchor: Coord, grid: &mut PixelGrid) {
    pack_bytes(&word.to_be_bytes(), anchor, grid);
}

/// Read a header word from `anchor`.
pub fn read_word(anchor: Coord, grid: &PixelGrid) -> u32 {
    let mut bytes = [0u8; MAX_CLUSTER_BYTES];
    bytes.copy_from_slice(&unpack_bytes(anchor, grid, MAX_CLUSTER_BYTES));
    u32::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_roundtrip_keeps_high_bits() {
        let mut grid = PixelGrid::from_fn(3, 2, |_, _| [0xA8, 0x54, 0xFC]);
        write_word(0x0123_4567, Coord::new(0, 1), &mut grid);
        assert_eq!(read_word(Coord::new(0, 1), &grid), 0x0123_4567);
        for px in [Coord::new(0, 0), Coord::new(2, 1)] {
            let p = grid.pixel(px);
            assert_eq!([p[0] & 0xFC, p[1] & 0xFC, p[2] & 0xFC], [0xA8, 0x54, 0xFC]);
        }
    }

    #[test]
    fn checksum_matches_crc32_of_concatenation() {
        let chars: Vec<&[u8]> = vec!["h".as_bytes(), "i".as_bytes(), "\u{00e9}".as_bytes()];
        assert_eq!(checksum(&chars), crc32fast::hash("hi\u{00e9}".as_bytes()));
    }

    #[test]
    fn empty_message_header() {
        let header = Header::for_chars(&[]);
        assert_eq!(header, Header { char_count: 0, checksum: 0 });
    }

    #[test]
    fn known_crc() {
        // CRC-32/IEEE check value
        let chars: Vec<&[u8]> = b"123456789".chunks(1).collect();
        assert_eq!(checksum(&chars), 0xCBF4_3926);
    }
}
