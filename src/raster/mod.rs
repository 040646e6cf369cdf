// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! In-memory RGB pixel grid.
//!
//! [`PixelGrid`] is the only image representation the codec sees. Loading and
//! saving real image files lives in [`io`]; everything under `stego` works on
//! a grid that is already decoded.

pub mod error;
pub mod io;

use error::RasterError;

/// Number of channels per pixel (R, G, B).
pub const CHANNELS: usize = 3;

/// One pixel: `[R, G, B]`.
pub type Pixel = [u8; CHANNELS];

/// A pixel address. `x` is the column, `y` the row (row 0 is the top row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Row-major grid of RGB pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<Pixel>,
}

impl PixelGrid {
    /// Create a zeroed (black) grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0; CHANNELS]; width * height],
        }
    }

    /// Build a grid from interleaved RGB bytes (`width * height * 3` bytes).
    pub fn from_rgb_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, RasterError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(CHANNELS))
            .ok_or(RasterError::BufferSizeMismatch { expected: usize::MAX, actual: bytes.len() })?;
        if bytes.len() != expected {
            return Err(RasterError::BufferSizeMismatch { expected, actual: bytes.len() });
        }
        let pixels = bytes
            .chunks_exact(CHANNELS)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Ok(Self { width, height, pixels })
    }

    /// Build a grid by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Pixel) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self { width, height, pixels }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether `c` addresses a pixel inside the grid.
    pub fn contains(&self, c: Coord) -> bool {
        c.x < self.width && c.y < self.height
    }

    /// Pixel at `c`. Panics if `c` is outside the grid.
    pub fn pixel(&self, c: Coord) -> &Pixel {
        &self.pixels[self.index(c)]
    }

    pub fn pixel_mut(&mut self, c: Coord) -> &mut Pixel {
        let idx = self.index(c);
        &mut self.pixels[idx]
    }

    /// Interleaved RGB bytes, row-major.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flatten().copied().collect()
    }

    /// All channel values, row-major then channel-major.
    pub fn channels(&self) -> impl Iterator<Item = u8> + '_ {
        self.pixels.iter().flatten().copied()
    }

    fn index(&self, c: Coord) -> usize {
        assert!(self.contains(c), "coordinate ({}, {}) outside {}x{} grid", c.x, c.y, self.width, self.height);
        c.y * self.width + c.x
    }
}
