// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Corkboard: view reconciliation for a collaborative investigation whiteboard.
//!
//! Elements and links live in immutable [`model::Board`] snapshots. The engine turns them into
//! render-ready [`view::ViewNode`]s and [`view::ViewEdge`]s, reusing the previous `Arc` for every
//! item whose inputs did not change, so hosts can diff by pointer.
//!
//! Start at [`board_view::BoardView`].

pub mod assets;
pub mod board_view;
pub mod clipboard;
pub mod config;
pub mod history;
pub mod interact;
pub mod model;
pub mod ops;
pub mod presence;
pub mod store;
pub mod view;

pub use board_view::{BoardView, Frame, Outbound, Selection};
pub use config::{ConfigError, EngineConfig};
