// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Cluster packing: one character's UTF-8 bytes in the 2 low bits of a
//! 3-column pixel block.
//!
//! Each byte is split into four 2-bit groups, most significant first. Group
//! `g` lands in channel `g % 3` of column `anchor.x + (g / 3) % 3` on row
//! `anchor.y - g / 9`:
//!
//! ```text
//!            x      x+1     x+2
//! y-1     [ 9..11 ][12..14][15..17]   (only 3- and 4-byte characters)
//! y       [ 0.. 2 ][ 3.. 5][ 6.. 8]
//! ```
//!
//! Writing clears the two low bits (`& 0b1111_1100`) and ORs the group in; the
//! six high bits of every channel are left untouched. The codec does no
//! bounds checking beyond the grid's own indexing: callers place anchors
//! where the full footprint fits (the placement walk only yields such anchors).

use crate::raster::{Coord, PixelGrid, CHANNELS};
use crate::stego::error::StegoError;

/// Columns spanned by a cluster.
pub const CLUSTER_COLS: usize = 3;
/// Rows spanned by a full (4-byte) cluster, counted upward from the anchor.
pub const CLUSTER_ROWS: usize = 2;
/// 2-bit groups stored per cluster row.
pub const GROUPS_PER_ROW: usize = CLUSTER_COLS * CHANNELS;
/// Longest UTF-8 sequence, and the header word size.
pub const MAX_CLUSTER_BYTES: usize = 4;

const GROUPS_PER_BYTE: usize = 4;
const GROUP_MASK: u8 = 0b11;
const KEEP_MASK: u8 = 0b1111_1100;

/// Byte length of a UTF-8 sequence from its leading byte.
///
/// Returns `None` for continuation bytes (`10xxxxxx`) and for `11111xxx`.
pub fn utf8_len(lead: u8) -> Option<usize> {
    if lead & 0b1000_0000 == 0 {
        Some(1)
    } else if lead & 0b1110_0000 == 0b1100_0000 {
        Some(2)
    } else if lead & 0b1111_0000 == 0b1110_0000 {
        Some(3)
    } else if lead & 0b1111_1000 == 0b1111_0000 {
        Some(4)
    } else {
        None
    }
}

/// Length of the character starting at `text[offset]`, validated as UTF-8.
///
/// Fails with [`StegoError::InvalidCharacter`] on a bad leading byte, a
/// truncated sequence or a sequence `str` would reject (overlong, surrogate).
pub fn char_len_at(text: &[u8], offset: usize) -> Result<usize, StegoError> {
    let lead = text[offset];
    let len = utf8_len(lead).ok_or(StegoError::InvalidCharacter { offset, byte: lead })?;
    let seq = text
        .get(offset..offset + len)
        .ok_or(StegoError::InvalidCharacter { offset, byte: lead })?;
    if std::str::from_utf8(seq).is_err() {
        return Err(StegoError::InvalidCharacter { offset, byte: lead });
    }
    Ok(len)
}

/// Split `text` into per-character byte slices, rejecting malformed UTF-8.
pub fn split_chars(text: &[u8]) -> Result<Vec<&[u8]>, StegoError> {
    let mut chars = Vec::new();
    let mut offset = 0;
    while offset < text.len() {
        let len = char_len_at(text, offset)?;
        chars.push(&text[offset..offset + len]);
        offset += len;
    }
    Ok(chars)
}

/// Pixel and channel receiving 2-bit group `g` of a cluster at `anchor`.
pub fn group_target(anchor: Coord, g: usize) -> (Coord, usize) {
    let col = (g / CHANNELS) % CLUSTER_COLS;
    let row = g / GROUPS_PER_ROW;
    (Coord::new(anchor.x + col, anchor.y - row), g % CHANNELS)
}

/// Pixels touched when `byte_len` bytes are packed at `anchor`.
pub fn footprint(anchor: Coord, byte_len: usize) -> Vec<Coord> {
    let mut pixels: Vec<Coord> = (0..byte_len * GROUPS_PER_BYTE)
        .map(|g| group_target(anchor, g).0)
        .collect();
    pixels.dedup();
    pixels
}

/// Pack up to four raw bytes at `anchor`. Returns the number of bits written.
pub fn pack_bytes(bytes: &[u8], anchor: Coord, grid: &mut PixelGrid) -> usize {
    debug_assert!(bytes.len() <= MAX_CLUSTER_BYTES);
    for (i, &byte) in bytes.iter().enumerate() {
        for k in 0..GROUPS_PER_BYTE {
            let group = (byte >> (6 - 2 * k)) & GROUP_MASK;
            let (coord, channel) = group_target(anchor, i * GROUPS_PER_BYTE + k);
            let px = grid.pixel_mut(coord);
            px[channel] = (px[channel] & KEEP_MASK) | group;
        }
    }
    bytes.len() * 8
}

/// Read byte `index` of the cluster at `anchor`.
pub fn unpack_byte(anchor: Coord, grid: &PixelGrid, index: usize) -> u8 {
    (0..GROUPS_PER_BYTE).fold(0u8, |acc, k| {
        let (coord, channel) = group_target(anchor, index * GROUPS_PER_BYTE + k);
        (acc << 2) | (grid.pixel(coord)[channel] & GROUP_MASK)
    })
}

/// Read `len` raw bytes from the cluster at `anchor`.
pub fn unpack_bytes(anchor: Coord, grid: &PixelGrid, len: usize) -> Vec<u8> {
    (0..len).map(|i| unpack_byte(anchor, grid, i)).collect()
}

/// Pack one encoded character at `anchor`. Returns the number of bits written.
///
/// `bytes` must be exactly one UTF-8 character; anything else is rejected with
/// [`StegoError::InvalidCharacter`] before the grid is touched.
pub fn encode_cluster(bytes: &[u8], anchor: Coord, grid: &mut PixelGrid) -> Result<usize, StegoError> {
    if bytes.is_empty() {
        return Err(StegoError::InvalidCharacter { offset: 0, byte: 0 });
    }
    let len = char_len_at(bytes, 0)?;
    if len != bytes.len() {
        return Err(StegoError::InvalidCharacter { offset: len, byte: bytes[len] });
    }
    Ok(pack_bytes(bytes, anchor, grid))
}

/// Pack a `char` at `anchor`. Returns the number of bits written.
pub fn encode_char(ch: char, anchor: Coord, grid: &mut PixelGrid) -> usize {
    let mut buf = [0u8; MAX_CLUSTER_BYTES];
    pack_bytes(ch.encode_utf8(&mut buf).as_bytes(), anchor, grid)
}

/// Read the raw UTF-8 bytes of the character stored at `anchor`.
///
/// The leading byte declares how many more bytes to read. Continuation bytes
/// are not validated here.
pub fn decode_cluster_bytes(anchor: Coord, grid: &PixelGrid) -> Result<Vec<u8>, StegoError> {
    let lead = unpack_byte(anchor, grid, 0);
    let len = utf8_len(lead).ok_or(StegoError::InvalidCharacter { offset: 0, byte: lead })?;
    Ok(unpack_bytes(anchor, grid, len))
}

/// Read the character stored at `anchor`.
pub fn decode_cluster(anchor: Coord, grid: &PixelGrid) -> Result<char, StegoError> {
    let bytes = decode_cluster_bytes(anchor, grid)?;
    std::str::from_utf8(&bytes)
        .ok()
        .and_then(|s| s.chars().next())
        .ok_or(StegoError::InvalidUtf8)
}
