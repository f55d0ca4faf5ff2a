// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

pub mod drag;
pub mod guides;
pub mod throttle;

pub use drag::{DragController, DragPhase, DragStep, PositionBroadcast};
pub use guides::{find_guides, snap, Axis, Guide};
pub use throttle::{Throttle, Throttled};
