// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Timer glue for hosts running a tokio runtime.
//!
//! Time is read from `tokio::time::Instant` so paused test clocks drive the engine as well.

use std::time::Instant;

use super::BoardView;

/// Upper bound on recomputes per [`settle`] call.
pub const MAX_SETTLE_STEPS: usize = 1024;

pub fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Sleeps until the view's next deadline and recomputes. Returns `false` when nothing is pending.
pub async fn tick(view: &mut BoardView) -> bool {
    let Some(deadline) = view.next_deadline() else {
        return false;
    };
    tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
    view.recompute(now());
    true
}

/// Runs [`tick`] until no deadline remains. Returns the number of recomputes performed.
pub async fn settle(view: &mut BoardView) -> usize {
    let mut steps = 0;
    while steps < MAX_SETTLE_STEPS && tick(view).await {
        steps += 1;
    }
    if steps == MAX_SETTLE_STEPS {
        tracing::warn!(steps, "deadlines kept rescheduling; giving up on settle");
    }
    steps
}
