// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the steganography pipeline.
//!
//! [`StegoError`] covers every failure from loading the cover through cluster
//! packing, placement and message extraction. [`ErrorClass`] groups the
//! variants by how a caller should react to them.

use core::fmt;

use crate::raster::error::RasterError;

/// Errors that can occur during steganographic encoding or decoding.
#[derive(Debug)]
pub enum StegoError {
    /// The cover image could not be read, decoded or written.
    InvalidImage(RasterError),
    /// The image cannot hold a cluster footprint plus the message header.
    ImageTooSmall,
    /// The image dimensions exceed the maximum allowed (8192px / 16MP).
    ImageTooLarge,
    /// The passphrase is shorter than the minimum length.
    PassphraseTooShort,
    /// A byte at `offset` does not start a valid UTF-8 character.
    InvalidCharacter { offset: usize, byte: u8 },
    /// The placement walk found no open anchor.
    Exhausted,
    /// Header or checksum mismatch: wrong passphrase or no embedded message.
    FrameCorrupted,
    /// The extracted bytes are not valid UTF-8.
    InvalidUtf8,
    /// Reading the plaintext source failed.
    Io(std::io::Error),
    /// The operation was cancelled by the user.
    Cancelled,
}

/// Coarse classification of [`StegoError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Rejected before any pixel was touched.
    Validation,
    /// Malformed input character; nothing is written.
    Encoding,
    /// No room left; data already written stays valid.
    Exhaustion,
    /// The image does not carry a message for this passphrase.
    Decode,
    /// Surfaced unchanged from a file collaborator.
    Io,
    Cancelled,
}

impl StegoError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidImage(_)
            | Self::ImageTooSmall
            | Self::ImageTooLarge
            | Self::PassphraseTooShort => ErrorClass::Validation,
            Self::InvalidCharacter { .. } => ErrorClass::Encoding,
            Self::Exhausted => ErrorClass::Exhaustion,
            Self::FrameCorrupted | Self::InvalidUtf8 => ErrorClass::Decode,
            Self::Io(_) => ErrorClass::Io,
            Self::Cancelled => ErrorClass::Cancelled,
        }
    }
}

impl fmt::Display for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidImage(e) => write!(f, "invalid image: {e}"),
            Self::ImageTooSmall => write!(f, "image too small for embedding"),
            Self::ImageTooLarge => write!(f, "image too large (max 8192px / 16MP)"),
            Self::PassphraseTooShort => {
                write!(f, "passphrase too short (min {} characters)", super::MIN_PASSPHRASE_CHARS)
            }
            Self::InvalidCharacter { offset, byte } => {
                write!(f, "byte 0x{byte:02X} at offset {offset} is not a UTF-8 leading byte")
            }
            Self::Exhausted => write!(f, "no open cluster position left in image"),
            Self::FrameCorrupted => write!(f, "no message found (wrong passphrase?)"),
            Self::InvalidUtf8 => write!(f, "extracted text is not valid UTF-8"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Cancelled => write!(f, "operation cancelled by user"),
        }
    }
}

impl std::error::Error for StegoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidImage(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RasterError> for StegoError {
    fn from(e: RasterError) -> Self {
        Self::InvalidImage(e)
    }
}

impl From<std::io::Error> for StegoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
