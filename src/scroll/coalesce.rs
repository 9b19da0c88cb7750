// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Folio and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Rate limiting for scroll-driven recomputation.
//!
//! A [`FrameCoalescer`] holds at most one pending deadline. Triggers that arrive while
//! one is pending either push it back (debounce) or fold into it (frame).

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoalesceMode {
    /// Run once the triggers have been quiet for the interval.
    Debounce(Duration),
    /// Run at most once per interval, at the end of the frame that saw the first trigger.
    Frame(Duration),
}

#[derive(Debug, Clone)]
pub struct FrameCoalescer {
    mode: CoalesceMode,
    deadline: Option<Instant>,
}

impl FrameCoalescer {
    pub fn new(mode: CoalesceMode) -> Self {
        Self {
            mode,
            deadline: None,
        }
    }

    pub fn debounce(interval: Duration) -> Self {
        Self::new(CoalesceMode::Debounce(interval))
    }

    pub fn frame(interval: Duration) -> Self {
        Self::new(CoalesceMode::Frame(interval))
    }

    pub fn mode(&self) -> CoalesceMode {
        self.mode
    }

    /// Records a trigger at `now`. Returns `false` when it folded into a pending run.
    pub fn trigger(&mut self, now: Instant) -> bool {
        let was_idle = self.deadline.is_none();
        match self.mode {
            CoalesceMode::Debounce(interval) => self.deadline = Some(now + interval),
            CoalesceMode::Frame(interval) => {
                if was_idle {
                    self.deadline = Some(now + interval);
                }
            }
        }
        if !was_idle {
            tracing::debug!(mode = ?self.mode, "coalesced scroll trigger");
        }
        was_idle
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consumes the pending run if it is due at `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
