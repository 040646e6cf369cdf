// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Passphrase-level encode/decode.
//!
//! Each call derives the session key from the passphrase, runs exactly one
//! session and hands back the result. The file variants add loading and
//! saving on top; a truncated encode still writes its output image.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::raster::{io, PixelGrid};
use crate::stego::crypto::{derive_session_key, validate_passphrase};
use crate::stego::error::StegoError;
use crate::stego::progress::Progress;
use crate::stego::session::{DecodeSession, EncodeReport, EncodeSession};

/// Embed `text` into `cover`.
///
/// Returns the stego grid and the encode report. A message longer than the
/// cover's capacity is truncated, not rejected; check
/// [`EncodeReport::is_complete`].
///
/// # Errors
/// - [`StegoError::PassphraseTooShort`] if the passphrase is under 8 characters.
/// - [`StegoError::ImageTooSmall`] / [`StegoError::ImageTooLarge`] for
///   unusable covers.
pub fn encode_text(
    cover: PixelGrid,
    text: &str,
    passphrase: &str,
) -> Result<(PixelGrid, EncodeReport), StegoError> {
    encode_bytes(cover, text.as_bytes(), passphrase)
}

/// Embed raw text bytes into `cover`.
///
/// The bytes are validated as UTF-8 before anything is written.
///
/// # Errors
/// As [`encode_text`], plus [`StegoError::InvalidCharacter`] at the first
/// malformed byte.
pub fn encode_bytes(
    cover: PixelGrid,
    text: &[u8],
    passphrase: &str,
) -> Result<(PixelGrid, EncodeReport), StegoError> {
    let key = derive_session_key(passphrase)?;
    let mut session = EncodeSession::new(cover, key)?;
    let report = session.encode(text)?;
    Ok((session.into_grid(), report))
}

/// [`encode_bytes`] reporting to `progress`. A cancellation keeps the
/// characters accepted so far and ends the session `Truncated`.
pub fn encode_with_progress(
    cover: PixelGrid,
    text: &[u8],
    passphrase: &str,
    progress: Arc<Progress>,
) -> Result<(PixelGrid, EncodeReport), StegoError> {
    let key = derive_session_key(passphrase)?;
    let mut session = EncodeSession::new(cover, key)?.with_progress(progress);
    let report = session.encode(text)?;
    Ok((session.into_grid(), report))
}

/// Extract the message hidden in `grid`.
///
/// # Errors
/// - [`StegoError::PassphraseTooShort`] if the passphrase is under 8 characters.
/// - [`StegoError::FrameCorrupted`] if the passphrase is wrong or the image
///   carries no message.
/// - [`StegoError::InvalidUtf8`] if the extracted bytes are not UTF-8.
pub fn decode_text(grid: &PixelGrid, passphrase: &str) -> Result<String, StegoError> {
    let key = derive_session_key(passphrase)?;
    DecodeSession::new(grid, key)?.decode()
}

/// [`decode_text`] reporting to `progress`.
///
/// # Errors
/// As [`decode_text`], plus [`StegoError::Cancelled`].
pub fn decode_with_progress(
    grid: &PixelGrid,
    passphrase: &str,
    progress: Arc<Progress>,
) -> Result<String, StegoError> {
    let key = derive_session_key(passphrase)?;
    DecodeSession::new(grid, key)?.with_progress(progress).decode()
}

/// Hide the contents of `text_path` in the image at `cover_path` and write
/// the result to `output_path`.
///
/// The output format follows the output extension. Lossy formats destroy
/// the message; a warning is logged when one is chosen.
///
/// # Errors
/// [`StegoError::InvalidImage`] if the cover cannot be read or the output
/// cannot be written, [`StegoError::Io`] if the text file cannot be read,
/// otherwise as [`encode_bytes`].
pub fn encode_file(
    cover_path: impl AsRef<Path>,
    text_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    passphrase: &str,
) -> Result<EncodeReport, StegoError> {
    validate_passphrase(passphrase)?;
    let cover = io::load(cover_path)?;
    let text = std::fs::read(text_path.as_ref())?;
    debug!(path = %text_path.as_ref().display(), bytes = text.len(), "read message");

    let (grid, report) = encode_bytes(cover, &text, passphrase)?;
    io::save(&grid, output_path.as_ref())?;
    info!(
        written = report.written,
        total = report.total,
        path = %output_path.as_ref().display(),
        "stego image written"
    );
    Ok(report)
}

/// Extract the message hidden in the image at `path`.
///
/// # Errors
/// [`StegoError::InvalidImage`] if the image cannot be read, otherwise as
/// [`decode_text`].
pub fn decode_file(path: impl AsRef<Path>, passphrase: &str) -> Result<String, StegoError> {
    validate_passphrase(passphrase)?;
    let grid = io::load(path)?;
    decode_text(&grid, passphrase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stego::session::SessionState;

    const PASS: &str = "correct horse battery";

    fn cover() -> PixelGrid {
        PixelGrid::from_fn(48, 32, |x, y| [(x * 5) as u8, (y * 7) as u8, (x ^ y) as u8])
    }

    #[test]
    fn text_roundtrip() {
        let (grid, report) = encode_text(cover(), "Hello, 世界!", PASS).unwrap();
        assert!(report.is_complete());
        assert_eq!(decode_text(&grid, PASS).unwrap(), "Hello, 世界!");
    }

    #[test]
    fn short_passphrase_rejected_before_work() {
        assert!(matches!(encode_text(cover(), "x", "short"), Err(StegoError::PassphraseTooShort)));
        assert!(matches!(decode_text(&cover(), "short"), Err(StegoError::PassphraseTooShort)));
    }

    #[test]
    fn wrong_passphrase_does_not_decode() {
        let (grid, _) = encode_text(cover(), "secret", PASS).unwrap();
        assert!(decode_text(&grid, "another passphrase").is_err());
    }

    #[test]
    fn cancelled_encode_keeps_nothing() {
        let progress = Arc::new(Progress::new());
        progress.cancel();
        let (grid, report) = encode_with_progress(cover(), b"abc", PASS, progress).unwrap();
        assert_eq!(report.state, SessionState::Truncated);
        assert_eq!(decode_text(&grid, PASS).unwrap(), "");
    }

    #[test]
    fn decode_with_progress_finishes() {
        let (grid, _) = encode_text(cover(), "abcdef", PASS).unwrap();
        let progress = Arc::new(Progress::new());
        let text = decode_with_progress(&grid, PASS, progress.clone()).unwrap();
        assert_eq!(text, "abcdef");
        assert_eq!(progress.get(), (6, 6));
    }

    #[test]
    fn missing_image_is_invalid_image() {
        let temp_dir = tempfile::TempDir::new().expect("create temp dir");
        let missing = temp_dir.path().join("no-such-cover.png");
        let err = decode_file(&missing, PASS).unwrap_err();
        assert!(matches!(err, StegoError::InvalidImage(_)));
    }
}
