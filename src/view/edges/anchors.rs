// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Link, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "top" => Some(Self::Top),
            "right" => Some(Self::Right),
            "bottom" => Some(Self::Bottom),
            "left" => Some(Self::Left),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleRole {
    Source,
    Target,
}

impl HandleRole {
    fn prefix(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

/// A connection point on a node, rendered as `source-left`, `target-top`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle {
    pub role: HandleRole,
    pub side: Side,
}

impl Handle {
    pub const fn new(role: HandleRole, side: Side) -> Self {
        Self { role, side }
    }

    /// Reads a stored handle id for `role`. Ids saved under the other role's prefix (a
    /// `target-left` stored as the source handle) are relabelled; bare sides are accepted.
    pub fn parse_stored(raw: &str, role: HandleRole) -> Option<Self> {
        let side = raw
            .strip_prefix("source-")
            .or_else(|| raw.strip_prefix("target-"))
            .unwrap_or(raw);
        Side::parse(side).map(|side| Self { role, side })
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.role.prefix(), self.side.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    #[default]
    Auto,
    Manual,
}

/// Near-side handle pair along the dominant displacement axis between the two boxes.
pub fn auto_handles(source: Option<Rect>, target: Option<Rect>) -> (Handle, Handle) {
    let (dx, dy) = match (source, target) {
        (Some(source), Some(target)) => {
            (target.center_x() - source.center_x(), target.center_y() - source.center_y())
        }
        _ => (1.0, 0.0),
    };

    let (source_side, target_side) = if dx.abs() > dy.abs() {
        if dx > 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if dy > 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    };
    (Handle::new(HandleRole::Source, source_side), Handle::new(HandleRole::Target, target_side))
}

pub fn resolve_handles(
    link: &Link,
    mode: AnchorMode,
    source: Option<Rect>,
    target: Option<Rect>,
) -> (Handle, Handle) {
    let (auto_source, auto_target) = auto_handles(source, target);
    match mode {
        AnchorMode::Auto => (auto_source, auto_target),
        AnchorMode::Manual => (
            link.source_handle()
                .and_then(|raw| Handle::parse_stored(raw, HandleRole::Source))
                .unwrap_or(auto_source),
            link.target_handle()
                .and_then(|raw| Handle::parse_stored(raw, HandleRole::Target))
                .unwrap_or(auto_target),
        ),
    }
}
