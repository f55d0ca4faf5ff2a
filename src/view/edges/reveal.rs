// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, Instant};

/// How many of the computed edges are handed to the renderer.
///
/// A structural change (different edge id set) starts over at one batch and grows by a batch per
/// tick; a purely visual change shows everything at once.
#[derive(Debug, Clone)]
pub struct Reveal {
    batch: usize,
    interval: Duration,
    total: usize,
    shown: usize,
    next_tick: Option<Instant>,
}

impl Reveal {
    pub fn new(batch: usize, interval: Duration) -> Self {
        Self { batch: batch.max(1), interval, total: 0, shown: 0, next_tick: None }
    }

    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn is_complete(&self) -> bool {
        self.shown >= self.total
    }

    pub fn restart(&mut self, total: usize, now: Instant) {
        self.total = total;
        self.shown = self.batch.min(total);
        self.schedule(now);
    }

    pub fn show_all(&mut self, total: usize) {
        self.total = total;
        self.shown = total;
        self.next_tick = None;
    }

    /// Keeps progress but clamps it to a new total of the same id set.
    pub fn resize(&mut self, total: usize) {
        self.total = total;
        self.shown = self.shown.min(total);
        if self.is_complete() {
            self.next_tick = None;
        }
    }

    /// Grows by one batch if a tick is due. Returns whether the shown count changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(due) if now >= due => {
                self.shown = (self.shown + self.batch).min(self.total);
                self.schedule(now);
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    fn schedule(&mut self, now: Instant) {
        self.next_tick = if self.is_complete() { None } else { Some(now + self.interval) };
    }
}
