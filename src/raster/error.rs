// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Error types for loading, building and saving pixel grids.

use std::fmt;
use std::path::PathBuf;

/// Errors raised by the raster layer.
#[derive(Debug)]
pub enum RasterError {
    /// The image file could not be opened or decoded.
    Unreadable { path: PathBuf, source: image::ImageError },
    /// The grid could not be encoded or written to disk.
    Unwritable { path: PathBuf, source: image::ImageError },
    /// A raw RGB buffer does not match `width * height * 3`.
    BufferSizeMismatch { expected: usize, actual: usize },
    /// Image dimensions do not fit the target representation.
    InvalidDimensions,
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreadable { path, source } => {
                write!(f, "cannot read image {}: {source}", path.display())
            }
            Self::Unwritable { path, source } => {
                write!(f, "cannot write image {}: {source}", path.display())
            }
            Self::BufferSizeMismatch { expected, actual } => {
                write!(f, "RGB buffer has {actual} bytes, expected {expected}")
            }
            Self::InvalidDimensions => write!(f, "invalid image dimensions"),
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } | Self::Unwritable { source, .. } => Some(source),
            _ => None,
        }
    }
}
