// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Image file boundary: decode a file into a [`PixelGrid`] and encode it back.
//!
//! Any format the `image` crate can read is accepted as a cover; alpha and
//! higher bit depths are flattened to 8-bit RGB. The output format follows the
//! output path's extension. Lossy formats keep the file valid but destroy the
//! low-order bits the message lives in, so callers are warned about them.

use std::path::Path;

use image::{ImageFormat, RgbImage};
use tracing::{debug, warn};

use super::error::RasterError;
use super::PixelGrid;

/// Decode the image at `path` into an RGB grid.
///
/// The file handle is scoped to this call and released on every path.
pub fn load(path: impl AsRef<Path>) -> Result<PixelGrid, RasterError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| RasterError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let rgb = img.to_rgb8();
    let (width, height) = (rgb.width() as usize, rgb.height() as usize);
    debug!(path = %path.display(), width, height, "loaded cover image");
    PixelGrid::from_rgb_bytes(width, height, rgb.as_raw())
}

/// Encode `grid` and write it to `path`, format chosen by extension.
pub fn save(grid: &PixelGrid, path: impl AsRef<Path>) -> Result<(), RasterError> {
    let path = path.as_ref();
    if is_lossy(path) {
        warn!(
            path = %path.display(),
            "output format is lossy; the embedded message will not survive"
        );
    }
    let width = u32::try_from(grid.width()).map_err(|_| RasterError::InvalidDimensions)?;
    let height = u32::try_from(grid.height()).map_err(|_| RasterError::InvalidDimensions)?;
    let img = RgbImage::from_raw(width, height, grid.to_rgb_bytes())
        .ok_or(RasterError::InvalidDimensions)?;
    img.save(path).map_err(|source| RasterError::Unwritable {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), width, height, "saved stego image");
    Ok(())
}

/// Whether the format implied by `path` discards low-order pixel bits.
pub fn is_lossy(path: &Path) -> bool {
    matches!(
        ImageFormat::from_path(path),
        Ok(ImageFormat::Jpeg) | Ok(ImageFormat::Avif)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::Coord;
    use tempfile::TempDir;

    #[test]
    fn png_roundtrip_is_lossless() {
        let grid = PixelGrid::from_fn(7, 5, |x, y| [(x * 31) as u8, (y * 47) as u8, (x ^ y) as u8]);
        let temp_dir = TempDir::new().expect("create temp dir");
        let path = temp_dir.path().join("roundtrip.png");
        save(&grid, &path).unwrap();
        let back = load(&path).unwrap();
        assert_eq!(back, grid);
        assert_eq!(back.pixel(Coord::new(6, 4)), &[186, 188, 2]);
    }

    #[test]
    fn missing_file_is_unreadable() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let err = load(temp_dir.path().join("does-not-exist.png")).unwrap_err();
        assert!(matches!(err, RasterError::Unreadable { .. }));
    }

    #[test]
    fn lossy_extensions() {
        assert!(is_lossy(Path::new("out.jpg")));
        assert!(is_lossy(Path::new("out.JPEG")));
        assert!(!is_lossy(Path::new("out.png")));
        assert!(!is_lossy(Path::new("out.bmp")));
        assert!(!is_lossy(Path::new("no_extension")));
    }
}
