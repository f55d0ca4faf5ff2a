// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Domain model: elements, links and the immutable board snapshot.

pub mod board;
pub mod element;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod geometry;
pub mod ids;
pub mod link;

pub use board::{Asset, AssetTable, Board, Comment};
pub use element::{Element, ElementKind, ElementStyle, Property};
pub use geometry::{
    Position, Rect, Size, Viewport, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH,
};
pub use ids::{AssetId, CommentId, ElementId, Id, IdError, LinkId, UserId};
pub use link::{DashStyle, Link, LinkDirection, LinkStyle};
