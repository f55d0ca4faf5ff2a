// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Canvas-space geometry shared by the reconciliation stages.

use serde::{Deserialize, Serialize};

/// Width used for elements without a custom or measured width.
pub const DEFAULT_NODE_WIDTH: f64 = 160.0;
/// Height used for elements without a custom or measured height.
pub const DEFAULT_NODE_HEIGHT: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// Converts a group-relative position into canvas space.
    pub fn to_absolute(self, parent: Position) -> Self {
        self.offset(parent.x, parent.y)
    }

    /// Converts a canvas-space position into a position relative to `parent`.
    pub fn to_relative(self, parent: Position) -> Self {
        self.offset(-parent.x, -parent.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self { width: DEFAULT_NODE_WIDTH, height: DEFAULT_NODE_HEIGHT }
    }
}

/// Axis-aligned rectangle in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn from_position(position: Position, size: Size) -> Self {
        Self { x: position.x, y: position.y, width: size.width, height: size.height }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Grows the rectangle by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + margin * 2.0,
            height: self.height + margin * 2.0,
        }
    }

    /// Edges touching count as overlap.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    /// Smallest rectangle enclosing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Self {
        let left = self.left().min(other.left());
        let top = self.top().min(other.top());
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Self { x: left, y: top, width: right - left, height: bottom - top }
    }
}

/// Pan/zoom state of the canvas.
///
/// Screen coordinates relate to canvas coordinates as `screen = canvas * zoom + pan`, where the
/// pan is `(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

impl Viewport {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom }
    }

    pub fn canvas_to_screen(&self, point: Position) -> Position {
        Position { x: point.x * self.zoom + self.x, y: point.y * self.zoom + self.y }
    }

    pub fn screen_to_canvas(&self, point: Position) -> Position {
        let zoom = self.effective_zoom();
        Position { x: (point.x - self.x) / zoom, y: (point.y - self.y) / zoom }
    }

    /// The canvas-space rectangle covered by a screen of the given size.
    pub fn visible_rect(&self, screen: Size) -> Rect {
        let zoom = self.effective_zoom();
        let top_left = self.screen_to_canvas(Position::ORIGIN);
        Rect { x: top_left.x, y: top_left.y, width: screen.width / zoom, height: screen.height / zoom }
    }

    fn effective_zoom(&self) -> f64 {
        if self.zoom.is_finite() && self.zoom > f64::EPSILON {
            self.zoom
        } else {
            1.0
        }
    }
}
