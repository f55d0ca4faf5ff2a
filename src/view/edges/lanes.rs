// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::model::{ElementId, Link, LinkId};

/// Position of a link among all links joining the same two elements (either direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Lane {
    pub index: usize,
    pub count: usize,
}

impl Lane {
    pub const SINGLE: Self = Self { index: 0, count: 1 };
}

/// Lanes for every link, grouped by unordered endpoint pair in board order.
pub fn assign_lanes(links: &[Arc<Link>]) -> HashMap<LinkId, Lane> {
    let mut pairs = HashMap::<(&ElementId, &ElementId), SmallVec<[&LinkId; 2]>>::new();
    for link in links {
        let (a, b) = (link.from_id(), link.to_id());
        let key = if a <= b { (a, b) } else { (b, a) };
        pairs.entry(key).or_default().push(link.id());
    }

    let mut lanes = HashMap::with_capacity(links.len());
    for ids in pairs.into_values() {
        let count = ids.len();
        for (index, id) in ids.into_iter().enumerate() {
            lanes.insert(id.clone(), Lane { index, count });
        }
    }
    lanes
}
