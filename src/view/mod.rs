// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

pub mod edges;
pub mod materialize;
pub mod structure;

pub use edges::{
    element_rects, AnchorMode, CurveMode, EdgeInputs, EdgeKind, EdgePipeline, EdgeReport, EdgeSettings,
    Handle, HandleRole, Lane, Side, ViewEdge,
};
pub use materialize::{
    DisplaySettings, MaterializeReport, NodeMaterializer, TagDisplay, TagSize, Theme, ViewNode, VisualInputs,
};
pub use structure::{
    BuildStats, ConfidenceBadge, PropertyFilter, RenderStructure, StructureBuilder, StructureError,
    StructureInputs, StructureSet, Thumbnail,
};
