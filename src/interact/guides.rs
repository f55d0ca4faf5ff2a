// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Alignment guides for single-node drags.
//!
//! The dragged box is compared against every sibling (elements sharing its parent group, or all
//! free-standing elements) in the parent's coordinate space. Per axis there are five comparisons:
//! center/center, near/near, far/far, near/far and far/near.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Board, Element, ElementId, Position, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub axis: Axis,
    /// Sibling coordinate the guide line is drawn at.
    pub coordinate: f64,
    /// Dragged-box position on `axis` that aligns it exactly.
    pub snapped: f64,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: f64,
    len: f64,
}

impl Span {
    fn end(self) -> f64 {
        self.start + self.len
    }

    fn center(self) -> f64 {
        self.start + self.len / 2.0
    }

    fn of(rect: &Rect, axis: Axis) -> Self {
        match axis {
            Axis::X => Self { start: rect.x, len: rect.width },
            Axis::Y => Self { start: rect.y, len: rect.height },
        }
    }
}

/// Guides for `dragged` against `siblings`, x-axis guides first. Within an axis a coordinate
/// appears once; the first sibling and comparison to produce it wins.
pub fn find_guides<'a>(
    dragged: Rect,
    siblings: impl IntoIterator<Item = &'a Rect>,
    tolerance: f64,
) -> Vec<Guide> {
    let siblings = siblings.into_iter().collect::<Vec<_>>();
    let mut guides = Vec::new();
    for axis in [Axis::X, Axis::Y] {
        let moving = Span::of(&dragged, axis);
        let start = guides.len();
        for sibling in &siblings {
            let fixed = Span::of(sibling, axis);
            let candidates = [
                (moving.center(), fixed.center(), fixed.center() - moving.len / 2.0),
                (moving.start, fixed.start, fixed.start),
                (moving.end(), fixed.end(), fixed.end() - moving.len),
                (moving.start, fixed.end(), fixed.end()),
                (moving.end(), fixed.start, fixed.start - moving.len),
            ];
            for (ours, theirs, snapped) in candidates {
                if (ours - theirs).abs() > tolerance {
                    continue;
                }
                if guides[start..].iter().any(|guide: &Guide| guide.coordinate == theirs) {
                    continue;
                }
                guides.push(Guide { axis, coordinate: theirs, snapped });
            }
        }
    }
    guides
}

/// Applies the first x guide and the first y guide independently.
pub fn snap(position: Position, guides: &[Guide]) -> Position {
    let first = |axis| guides.iter().find(|guide| guide.axis == axis).map(|guide| guide.snapped);
    Position {
        x: first(Axis::X).unwrap_or(position.x),
        y: first(Axis::Y).unwrap_or(position.y),
    }
}

/// Boxes of `element`'s siblings in its parent's coordinate space. `preview` overrides stored
/// positions of elements that are themselves moving.
pub fn sibling_rects(
    board: &Board,
    element: &Element,
    preview: &HashMap<ElementId, Position>,
) -> Vec<Rect> {
    board
        .elements()
        .iter()
        .filter(|other| other.id() != element.id() && other.parent_group_id() == element.parent_group_id())
        .filter_map(|other| {
            let position = preview.get(other.id()).copied().unwrap_or_else(|| other.position());
            position.is_finite().then(|| Rect::from_position(position, other.size()))
        })
        .collect()
}

/// Guides for `element` placed at `position` on `board`.
pub fn guides_for(
    board: &Board,
    element: &Element,
    position: Position,
    preview: &HashMap<ElementId, Position>,
    tolerance: f64,
) -> Vec<Guide> {
    let siblings = sibling_rects(board, element, preview);
    find_guides(Rect::from_position(position, element.size()), &siblings, tolerance)
}
