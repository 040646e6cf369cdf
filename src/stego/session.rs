// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Encode and decode sessions.
//!
//! A session owns everything one message operation mutates: the pixel grid
//! (encode) or a borrow of it (decode), the session key and the occupied
//! anchor set. Nothing is global, and a session is used for exactly one
//! message.
//!
//! Encoding walks `Idle → Streaming → {Completed, Truncated, Failed}`:
//!
//! - **Completed**: every character was embedded.
//! - **Truncated**: the walk ran out of room (or the caller cancelled); the
//!   embedded prefix is consistent with the header and decodes normally.
//! - **Failed**: the text is not valid UTF-8. The whole text is checked
//!   before the first write, so a failed session leaves the grid untouched.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::raster::{Coord, PixelGrid};
use crate::stego::capacity::char_capacity;
use crate::stego::cluster;
use crate::stego::crypto::SessionKey;
use crate::stego::error::StegoError;
use crate::stego::frame::{self, Header};
use crate::stego::progress::Progress;
use crate::stego::walk::{next_open, OccupiedSet};
use crate::stego::{validate_grid_dimensions, START_ANCHOR};

/// Lifecycle of an [`EncodeSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Completed,
    Truncated,
    Failed,
}

/// Outcome of a finished encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeReport {
    /// Characters embedded.
    pub written: usize,
    /// Characters in the source text.
    pub total: usize,
    /// `Completed` or `Truncated`.
    pub state: SessionState,
}

impl EncodeReport {
    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed
    }
}

/// Embeds one message into a grid it owns.
#[derive(Debug)]
pub struct EncodeSession {
    grid: PixelGrid,
    key: SessionKey,
    occupied: OccupiedSet,
    state: SessionState,
    progress: Option<Arc<Progress>>,
}

impl EncodeSession {
    /// Start a session on `grid`.
    ///
    /// # Errors
    /// [`StegoError::ImageTooSmall`] / [`StegoError::ImageTooLarge`] if the
    /// grid cannot hold the header or exceeds the size limits.
    pub fn new(grid: PixelGrid, key: SessionKey) -> Result<Self, StegoError> {
        validate_grid_dimensions(grid.width(), grid.height())?;
        let occupied = OccupiedSet::for_grid(&grid);
        Ok(Self {
            grid,
            key,
            occupied,
            state: SessionState::Idle,
            progress: None,
        })
    }

    /// Report progress to, and accept cancellation from, `progress`.
    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn grid(&self) -> &PixelGrid {
        &self.grid
    }

    /// Anchors used so far (header clusters included).
    pub fn occupied(&self) -> &OccupiedSet {
        &self.occupied
    }

    /// Release the grid, embedded or not.
    pub fn into_grid(self) -> PixelGrid {
        self.grid
    }

    /// Embed `text` (raw UTF-8 bytes).
    ///
    /// Returns the report for `Completed` and `Truncated` sessions; a
    /// truncation is also logged as a warning.
    ///
    /// A session cancelled through its progress tracker does not keep the
    /// pixels of the interrupted pass. It restores the cover and embeds the
    /// accepted prefix again under a header declaring only that prefix, so
    /// the prefix may land on different anchors than it did before the
    /// cancel.
    ///
    /// # Errors
    /// [`StegoError::InvalidCharacter`] if `text` is not valid UTF-8; the
    /// session ends `Failed` and the grid is unchanged.
    ///
    /// # Panics
    /// If the session has already been used.
    pub fn encode(&mut self, text: &[u8]) -> Result<EncodeReport, StegoError> {
        assert_eq!(self.state, SessionState::Idle, "encode session reused");
        self.state = SessionState::Streaming;

        let result = self.encode_inner(text);
        self.state = match &result {
            Ok(report) => report.state,
            Err(_) => SessionState::Failed,
        };
        if let Some(p) = &self.progress {
            p.finish();
        }
        result
    }

    fn encode_inner(&mut self, text: &[u8]) -> Result<EncodeReport, StegoError> {
        let chars = cluster::split_chars(text)?;
        let total = chars.len();
        let capacity = char_capacity(&self.grid);
        debug!(
            width = self.grid.width(),
            height = self.grid.height(),
            capacity,
            total,
            "encode session started"
        );
        if let Some(p) = &self.progress {
            p.init(u32::try_from(total).unwrap_or(u32::MAX));
        }

        // A cancelled run must be redone with the shorter header, from the
        // untouched cover.
        let cover = self.progress.as_ref().map(|_| self.grid.clone());

        let declared = total.min(capacity);
        let mut written = self.embed(&chars, declared, true)?;
        if written < declared {
            debug!(written, declared, "encode cancelled, re-embedding accepted prefix");
            if let Some(cover) = cover {
                self.grid = cover;
            }
            self.occupied = OccupiedSet::for_grid(&self.grid);
            written = self.embed(&chars[..written], written, false)?;
        }

        let state = if written == total {
            SessionState::Completed
        } else {
            warn!(written, total, "message truncated: embedded {} of {} characters", written, total);
            SessionState::Truncated
        };
        Ok(EncodeReport { written, total, state })
    }

    /// Write the header for `chars[..declared]`, then stream `chars` until
    /// they run out, the walk is exhausted, or cancellation is requested.
    /// Returns the number of characters written.
    fn embed(&mut self, chars: &[&[u8]], declared: usize, cancellable: bool) -> Result<usize, StegoError> {
        let header = Header::for_chars(&chars[..declared]);

        frame::write_word(header.char_count, START_ANCHOR, &mut self.grid);
        self.occupied.insert(START_ANCHOR);
        let checksum_anchor = next_open(START_ANCHOR, &self.grid, self.key, &self.occupied)?;
        frame::write_word(header.checksum, checksum_anchor, &mut self.grid);
        self.occupied.insert(checksum_anchor);

        let mut prev = checksum_anchor;
        let mut written = 0;
        for ch in chars {
            if cancellable && self.progress.as_ref().is_some_and(|p| p.is_cancelled()) {
                break;
            }
            let anchor = match next_open(prev, &self.grid, self.key, &self.occupied) {
                Ok(anchor) => anchor,
                Err(StegoError::Exhausted) => break,
                Err(e) => return Err(e),
            };
            cluster::encode_cluster(ch, anchor, &mut self.grid)?;
            self.occupied.insert(anchor);
            prev = anchor;
            written += 1;
            if let Some(p) = &self.progress {
                p.advance();
            }
        }

        // The walk covers the whole lattice, so it runs dry exactly at capacity.
        debug_assert!(written == declared || (cancellable && written < declared));
        Ok(written)
    }
}

/// Extracts one message from a borrowed grid.
#[derive(Debug)]
pub struct DecodeSession<'g> {
    grid: &'g PixelGrid,
    key: SessionKey,
    occupied: OccupiedSet,
    progress: Option<Arc<Progress>>,
}

impl<'g> DecodeSession<'g> {
    pub fn new(grid: &'g PixelGrid, key: SessionKey) -> Result<Self, StegoError> {
        validate_grid_dimensions(grid.width(), grid.height())?;
        Ok(Self {
            grid,
            key,
            occupied: OccupiedSet::for_grid(grid),
            progress: None,
        })
    }

    pub fn with_progress(mut self, progress: Arc<Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Replay the walk and read the message.
    ///
    /// # Errors
    /// - [`StegoError::FrameCorrupted`] if the header is implausible, a
    ///   cluster does not start a UTF-8 character, or the checksum differs
    ///   (wrong passphrase, or no message in this image).
    /// - [`StegoError::InvalidUtf8`] if the checked bytes are not UTF-8.
    /// - [`StegoError::Cancelled`] if cancelled through the progress tracker.
    pub fn decode(mut self) -> Result<String, StegoError> {
        let result = self.decode_inner();
        if let Some(p) = &self.progress {
            p.finish();
        }
        result
    }

    fn decode_inner(&mut self) -> Result<String, StegoError> {
        let char_count = frame::read_word(START_ANCHOR, self.grid) as usize;
        self.occupied.insert(START_ANCHOR);
        let checksum_anchor = self.step(START_ANCHOR)?;
        let checksum = frame::read_word(checksum_anchor, self.grid);
        self.occupied.insert(checksum_anchor);

        let capacity = char_capacity(self.grid);
        if char_count > capacity {
            debug!(char_count, capacity, "header count exceeds capacity");
            return Err(StegoError::FrameCorrupted);
        }
        if let Some(p) = &self.progress {
            p.init(char_count as u32);
        }

        let mut chars: Vec<Vec<u8>> = Vec::with_capacity(char_count);
        let mut prev = checksum_anchor;
        for _ in 0..char_count {
            if let Some(p) = &self.progress {
                p.check_cancelled()?;
            }
            let anchor = self.step(prev)?;
            let bytes = cluster::decode_cluster_bytes(anchor, self.grid)
                .map_err(|_| StegoError::FrameCorrupted)?;
            chars.push(bytes);
            self.occupied.insert(anchor);
            prev = anchor;
            if let Some(p) = &self.progress {
                p.advance();
            }
        }

        let slices: Vec<&[u8]> = chars.iter().map(Vec::as_slice).collect();
        if frame::checksum(&slices) != checksum {
            return Err(StegoError::FrameCorrupted);
        }
        String::from_utf8(chars.concat()).map_err(|_| StegoError::InvalidUtf8)
    }

    fn step(&self, from: Coord) -> Result<Coord, StegoError> {
        next_open(from, self.grid, self.key, &self.occupied).map_err(|_| StegoError::FrameCorrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn cover(width: usize, height: usize) -> PixelGrid {
        PixelGrid::from_fn(width, height, |x, y| {
            [(x * 7 + y * 3) as u8, (x * y + 11) as u8, (200 - (x + y) % 150) as u8]
        })
    }

    fn encode(grid: PixelGrid, key: SessionKey, text: &str) -> (PixelGrid, EncodeReport) {
        let mut session = EncodeSession::new(grid, key).unwrap();
        let report = session.encode(text.as_bytes()).unwrap();
        (session.into_grid(), report)
    }

    #[test]
    fn roundtrip_mixed_widths() {
        let text = "a\u{0547}\u{0800}\u{1E2C7} héllo 🦕";
        let (grid, report) = encode(cover(40, 30), 77, text);
        assert_eq!(report, EncodeReport { written: text.chars().count(), total: text.chars().count(), state: SessionState::Completed });
        assert_eq!(DecodeSession::new(&grid, 77).unwrap().decode().unwrap(), text);
    }

    #[test]
    fn empty_message() {
        let (grid, report) = encode(cover(12, 8), 5, "");
        assert!(report.is_complete());
        assert_eq!(report.written, 0);
        assert_eq!(DecodeSession::new(&grid, 5).unwrap().decode().unwrap(), "");
    }

    #[test]
    fn states_progress_through_lifecycle() {
        let mut session = EncodeSession::new(cover(12, 8), 1).unwrap();
        assert_eq!(session.state(), SessionState::Idle);
        session.encode(b"hi").unwrap();
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.occupied().len(), 4);
    }

    #[test]
    fn invalid_utf8_fails_without_writing() {
        let original = cover(12, 8);
        let mut session = EncodeSession::new(original.clone(), 1).unwrap();
        let err = session.encode(&[b'o', b'k', 0xBF]).unwrap_err();
        assert!(matches!(err, StegoError::InvalidCharacter { offset: 2, byte: 0xBF }));
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(session.into_grid(), original);
    }

    #[test]
    fn truncates_at_capacity() {
        // 9x6 → 3 columns × 3 rows = 9 cells, 7 for characters
        let grid = cover(9, 6);
        assert_eq!(char_capacity(&grid), 7);
        let (grid, report) = encode(grid, 3, "0123456789");
        assert_eq!(report.state, SessionState::Truncated);
        assert_eq!((report.written, report.total), (7, 10));
        assert_eq!(DecodeSession::new(&grid, 3).unwrap().decode().unwrap(), "0123456");
    }

    #[traced_test]
    #[test]
    fn truncation_is_logged() {
        let (_, report) = encode(cover(9, 6), 3, "0123456789");
        assert_eq!(report.state, SessionState::Truncated);
        assert!(logs_contain("message truncated: embedded 7 of 10 characters"));
    }

    #[traced_test]
    #[test]
    fn completion_is_not_a_warning() {
        let (_, report) = encode(cover(9, 6), 3, "0123");
        assert!(report.is_complete());
        assert!(!logs_contain("message truncated"));
    }

    #[test]
    fn wrong_key_rejected() {
        let (grid, _) = encode(cover(30, 20), 1234, "attack at dawn");
        let err = DecodeSession::new(&grid, 4321).unwrap().decode().unwrap_err();
        assert!(matches!(err, StegoError::FrameCorrupted | StegoError::InvalidUtf8));
    }

    #[test]
    fn cancelled_before_start_embeds_nothing() {
        let progress = Arc::new(Progress::new());
        progress.cancel();
        let mut session = EncodeSession::new(cover(20, 10), 8).unwrap().with_progress(progress.clone());
        let report = session.encode(b"never written").unwrap();
        assert_eq!(report.state, SessionState::Truncated);
        assert_eq!(report.written, 0);
        let grid = session.into_grid();
        assert_eq!(DecodeSession::new(&grid, 8).unwrap().decode().unwrap(), "");
    }

    #[test]
    fn cancelled_mid_stream_keeps_decodable_prefix() {
        let key = 2_718;
        let original = cover(1200, 800);
        let message: String = "ab\u{e9}\u{20ac}\u{1F995} ".chars().cycle().take(150_000).collect();
        let total = message.chars().count();
        assert!(total < char_capacity(&original));

        let progress = Arc::new(Progress::new());
        let watcher = {
            let progress = progress.clone();
            std::thread::spawn(move || {
                while progress.get().0 < 500 {
                    std::thread::yield_now();
                }
                progress.cancel();
            })
        };
        let mut session = EncodeSession::new(original.clone(), key)
            .unwrap()
            .with_progress(progress.clone());
        let report = session.encode(message.as_bytes()).unwrap();
        watcher.join().unwrap();

        assert_eq!(report.state, SessionState::Truncated);
        assert!(report.written >= 500 && report.written < total, "written {}", report.written);
        assert_eq!(report.total, total);

        let grid = session.into_grid();
        let prefix: String = message.chars().take(report.written).collect();
        assert_eq!(DecodeSession::new(&grid, key).unwrap().decode().unwrap(), prefix);
        for (a, b) in grid.channels().zip(original.channels()) {
            assert_eq!(a & 0xFC, b & 0xFC);
        }
    }

    #[test]
    fn progress_reaches_total() {
        let progress = Arc::new(Progress::new());
        let mut session = EncodeSession::new(cover(20, 10), 8).unwrap().with_progress(progress.clone());
        session.encode(b"abcd").unwrap();
        assert_eq!(progress.get(), (4, 4));
    }

    #[test]
    fn cancelled_decode() {
        let (grid, _) = encode(cover(20, 10), 8, "abc");
        let progress = Arc::new(Progress::new());
        progress.cancel();
        let err = DecodeSession::new(&grid, 8)
            .unwrap()
            .with_progress(progress)
            .decode()
            .unwrap_err();
        assert!(matches!(err, StegoError::Cancelled));
    }

    #[test]
    fn too_small_grid_rejected() {
        assert!(matches!(EncodeSession::new(PixelGrid::new(3, 2), 0), Err(StegoError::ImageTooSmall)));
        assert!(matches!(DecodeSession::new(&PixelGrid::new(5, 3), 0), Err(StegoError::ImageTooSmall)));
    }
}
