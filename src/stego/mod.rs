// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Steganographic encoding and decoding.
//!
//! The codec is built from four layers, leaf first:
//!
//! - [`hash`]: keyed mid-square hash of one pixel.
//! - [`walk`]: keyed placement walk choosing non-overlapping cluster anchors.
//! - [`cluster`]: 2-bit-per-channel packing of one character per cluster.
//! - [`session`]: encode/decode sessions driving the walk and the codec,
//!   with the [`frame`] header (character count + CRC) in front.
//!
//! The pipeline functions re-exported here wrap sessions with passphrase
//! handling and image files.

pub mod error;
pub mod hash;
pub mod cluster;
pub mod walk;
pub mod frame;
pub mod capacity;
pub mod crypto;
pub mod progress;
pub mod session;
mod pipeline;

use crate::raster::Coord;

pub use error::{ErrorClass, StegoError};

/// Minimum passphrase length, in characters.
pub const MIN_PASSPHRASE_CHARS: usize = 8;

/// Maximum pixel dimension (width or height).
pub const MAX_DIMENSION: usize = 8192;

/// Maximum total pixel count (width × height).
pub const MAX_PIXELS: usize = 16_000_000;

/// Anchor of the first header cluster: the lowest anchor whose two-row
/// footprint stays inside the grid.
pub const START_ANCHOR: Coord = Coord::new(0, 1);

/// Validate grid dimensions for encoding and decoding.
///
/// # Errors
/// - [`StegoError::ImageTooSmall`] if the grid cannot hold the two header
///   clusters.
/// - [`StegoError::ImageTooLarge`] if either dimension > 8192px or total pixels > 16M.
pub fn validate_grid_dimensions(width: usize, height: usize) -> Result<(), StegoError> {
    if capacity::lattice_anchors(width, height) < frame::HEADER_CLUSTERS {
        return Err(StegoError::ImageTooSmall);
    }
    if width > MAX_DIMENSION
        || height > MAX_DIMENSION
        || width.checked_mul(height).map_or(true, |p| p > MAX_PIXELS)
    {
        return Err(StegoError::ImageTooLarge);
    }
    Ok(())
}

pub use pipeline::{
    decode_file, decode_text, decode_with_progress, encode_bytes, encode_file, encode_text,
    encode_with_progress,
};
pub use capacity::char_capacity;
pub use session::{DecodeSession, EncodeReport, EncodeSession, SessionState};
