// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, Instant};

/// Leading-edge rate limiter driven by caller-supplied instants.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_fire: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last_fire: None }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` (and starts a new window) if a full interval passed since the last fire.
    pub fn ready(&mut self, now: Instant) -> bool {
        let open = self.last_fire.map_or(true, |last| now.saturating_duration_since(last) >= self.interval);
        if open {
            self.last_fire = Some(now);
        }
        open
    }

    /// Earliest instant at which [`Throttle::ready`] can return `true` again.
    pub fn next_allowed(&self) -> Option<Instant> {
        self.last_fire.map(|last| last + self.interval)
    }

    pub fn reset(&mut self) {
        self.last_fire = None;
    }
}

/// A throttle that keeps the most recent value offered inside a closed window and releases it
/// once the window reopens, so the final state of a burst is never lost.
#[derive(Debug, Clone)]
pub struct Throttled<T> {
    throttle: Throttle,
    pending: Option<T>,
}

impl<T> Throttled<T> {
    pub fn new(interval: Duration) -> Self {
        Self { throttle: Throttle::new(interval), pending: None }
    }

    /// Returns the value to emit now, or stores it for a later [`Throttled::poll`].
    pub fn offer(&mut self, value: T, now: Instant) -> Option<T> {
        if self.throttle.ready(now) {
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        if self.pending.is_some() && self.throttle.ready(now) {
            return self.pending.take();
        }
        None
    }

    /// Emits whatever is pending regardless of the window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes releasable, if any.
    pub fn deadline(&self) -> Option<Instant> {
        if self.pending.is_some() {
            self.throttle.next_allowed()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
        self.throttle.reset();
    }
}
