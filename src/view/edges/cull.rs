// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{ElementId, Link, Rect};

/// Keeps links with at least one endpoint inside `area`. An endpoint is inside when its box
/// intersects `area`, so a node whose position lies just outside but whose body reaches in still
/// keeps its links. Endpoints without a known box count as inside. With no area (viewport not
/// frozen yet) everything is kept.
pub fn cull<'a>(
    links: impl IntoIterator<Item = &'a Arc<Link>>,
    rects: &HashMap<ElementId, Rect>,
    area: Option<Rect>,
) -> Vec<&'a Arc<Link>> {
    let Some(area) = area else {
        return links.into_iter().collect();
    };
    let inside = |id: &ElementId| rects.get(id).map_or(true, |rect| rect.intersects(&area));
    links
        .into_iter()
        .filter(|link| inside(link.from_id()) || inside(link.to_id()))
        .collect()
}
