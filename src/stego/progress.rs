// Copyright (c) 2026 Christoph Gaffga
// SPDX-License-Identifier: GPL-3.0-only

//! Per-operation progress tracking and cooperative cancellation.
//!
//! A [`Progress`] is shared through an `Arc` between the session doing the
//! work and whoever displays progress or wants to stop it. All fields are
//! atomics so it can be polled from another thread. Sessions check the cancel
//! flag once per character.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use super::error::StegoError;

#[derive(Debug, Default)]
pub struct Progress {
    step: AtomicU32,
    total: AtomicU32,
    cancelled: AtomicBool,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset progress to 0 and set the total step count.
    /// Leaves the cancellation flag alone so a cancel issued before the
    /// operation starts still takes effect.
    pub fn init(&self, total: u32) {
        self.step.store(0, Ordering::Relaxed);
        self.total.store(total, Ordering::Relaxed);
    }

    /// Request cancellation of the running operation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Clear a previous cancellation so the tracker can be reused.
    pub fn reset_cancel(&self) {
        self.cancelled.store(false, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Return [`StegoError::Cancelled`] if cancellation has been requested.
    pub fn check_cancelled(&self) -> Result<(), StegoError> {
        if self.is_cancelled() {
            Err(StegoError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Advance by one step, capped at `total - 1` until [`finish`](Self::finish).
    /// With a total of 0 (unknown) the step advances freely.
    pub fn advance(&self) {
        let total = self.total.load(Ordering::Relaxed);
        if total == 0 {
            self.step.fetch_add(1, Ordering::Relaxed);
        } else {
            let _ = self.step.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| {
                if s + 1 < total { Some(s + 1) } else { Some(s) }
            });
        }
    }

    /// Current `(step, total)`.
    pub fn get(&self) -> (u32, u32) {
        (self.step.load(Ordering::Relaxed), self.total.load(Ordering::Relaxed))
    }

    /// Mark progress as complete (step = total).
    pub fn finish(&self) {
        let t = self.total.load(Ordering::Relaxed);
        self.step.store(t, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_caps_below_total() {
        let p = Progress::new();
        p.init(3);
        for _ in 0..10 {
            p.advance();
        }
        assert_eq!(p.get(), (2, 3));
        p.finish();
        assert_eq!(p.get(), (3, 3));
    }

    #[test]
    fn unknown_total_advances_freely() {
        let p = Progress::new();
        p.init(0);
        p.advance();
        p.advance();
        assert_eq!(p.get(), (2, 0));
    }

    #[test]
    fn cancel_survives_init() {
        let p = Progress::new();
        p.cancel();
        p.init(5);
        assert!(matches!(p.check_cancelled(), Err(StegoError::Cancelled)));
        p.reset_cancel();
        assert!(p.check_cancelled().is_ok());
    }
}
