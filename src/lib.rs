// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! # stegosaur-core
//!
//! Passphrase-keyed steganography for RGB images. Each character of a UTF-8
//! message is packed, two bits per channel, into the low bits of a small
//! pixel cluster. A keyed walk over the image picks where each cluster goes,
//! so the decoder can only find the message with the same passphrase.
//!
//! - [`raster`]: the in-memory pixel grid and image file I/O.
//! - [`stego`]: keyed hash, placement walk, cluster codec and sessions.
//!
//! The hidden message lives in the least significant bits, so stego images
//! must be stored losslessly (PNG, BMP, TIFF, ...).
//!
//! # Quick start
//!
//! ```rust,ignore
//! use stegosaur_core::{decode_text, encode_text, raster};
//!
//! let cover = raster::io::load("photo.png").unwrap();
//! let (stego, report) = encode_text(cover, "secret message", "passphrase").unwrap();
//! assert!(report.is_complete());
//! let decoded = decode_text(&stego, "passphrase").unwrap();
//! assert_eq!(decoded, "secret message");
//! ```

pub mod raster;
pub mod stego;

pub use raster::error::RasterError;
pub use raster::{Coord, Pixel, PixelGrid};
pub use stego::{
    decode_file, decode_text, decode_with_progress, encode_bytes, encode_file, encode_text,
    encode_with_progress,
};
pub use stego::{char_capacity, DecodeSession, EncodeReport, EncodeSession, SessionState};
pub use stego::{validate_grid_dimensions, ErrorClass, StegoError};
pub use stego::{MAX_DIMENSION, MAX_PIXELS, MIN_PASSPHRASE_CHARS, START_ANCHOR};
pub use stego::progress;
