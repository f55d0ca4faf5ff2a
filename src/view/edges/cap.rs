// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::sync::Arc;

use crate::model::{ElementId, Link, LinkId};

/// Bounds `links` to `cap` entries.
///
/// Priority: selected links, then links touching a selected element, then the rest in input
/// order. Survivors keep their input order.
pub fn cap<'a>(
    links: Vec<&'a Arc<Link>>,
    selected_links: &HashSet<LinkId>,
    selected_elements: &HashSet<ElementId>,
    cap: usize,
) -> Vec<&'a Arc<Link>> {
    if links.len() <= cap {
        return links;
    }

    let mut keep = vec![false; links.len()];
    let mut budget = cap;
    let tiers: [&dyn Fn(&Link) -> bool; 3] = [
        &|link: &Link| selected_links.contains(link.id()),
        &|link: &Link| selected_elements.contains(link.from_id()) || selected_elements.contains(link.to_id()),
        &|_: &Link| true,
    ];
    for tier in tiers {
        for (index, link) in links.iter().enumerate() {
            if budget == 0 {
                break;
            }
            let link: &Link = link;
            if !keep[index] && tier(link) {
                keep[index] = true;
                budget -= 1;
            }
        }
    }

    tracing::debug!(candidates = links.len(), cap, "edge cap applied");
    links.into_iter().zip(keep).filter_map(|(link, kept)| kept.then_some(link)).collect()
}
