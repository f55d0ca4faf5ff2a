// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Element → render structure, cached per element id.
//!
//! A cached structure is reused while the element `Arc`, its comment count, its resolved parent
//! and the assets it references are unchanged. Filters feed every structure, so changing them
//! empties the cache.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use regex::Regex;

use crate::model::{Asset, AssetId, AssetTable, Board, Element, ElementId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfidenceBadge {
    Low,
    Medium,
    High,
}

impl ConfidenceBadge {
    pub fn for_confidence(confidence: f64) -> Self {
        if confidence < 34.0 {
            Self::Low
        } else if confidence < 67.0 {
            Self::Medium
        } else {
            Self::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Thumbnail {
    Image { asset_id: AssetId, data_url: String },
    /// Image asset whose bytes are not available yet.
    Placeholder { asset_id: AssetId },
}

/// Everything the node renderer needs that is derived from the element alone.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStructure {
    pub element: Arc<Element>,
    /// Parent after integrity correction; `None` when the stored reference was dangling.
    pub parent_group_id: Option<ElementId>,
    pub comment_count: usize,
    pub thumbnail: Option<Thumbnail>,
    pub badge: Option<ConfidenceBadge>,
    pub properties: Vec<String>,
}

impl RenderStructure {
    pub fn id(&self) -> &ElementId {
        self.element.id()
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyFilter {
    /// Only these keys are shown; `None` shows every key.
    pub keys: Option<Vec<String>>,
    /// Regex matched against `key: value`.
    pub pattern: Option<String>,
    pub max_properties: Option<usize>,
}

#[derive(Debug)]
pub enum StructureError {
    InvalidPattern { pattern: String, source: regex::Error },
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, source } => {
                write!(f, "invalid property pattern {pattern:?}: {source}")
            }
        }
    }
}

impl std::error::Error for StructureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StructureInputs<'a> {
    pub board: &'a Board,
    pub hidden: &'a HashSet<ElementId>,
    /// Active tab/scope membership; `None` when every element is in scope.
    pub scope: Option<&'a HashSet<ElementId>>,
}

#[derive(Debug, Clone, Default)]
pub struct StructureSet {
    pub structures: Vec<Arc<RenderStructure>>,
    /// Out-of-scope elements shown because they are linked to an in-scope element.
    pub ghost_ids: BTreeSet<ElementId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildStats {
    pub reused: usize,
    pub rebuilt: usize,
    pub purged: usize,
}

#[derive(Debug)]
struct CacheEntry {
    element: Arc<Element>,
    comment_count: usize,
    parent_group_id: Option<ElementId>,
    /// What each of the element's asset ids resolved to at build time.
    assets: Vec<Option<Arc<Asset>>>,
    structure: Arc<RenderStructure>,
}

#[derive(Debug, Default)]
pub struct StructureBuilder {
    cache: HashMap<ElementId, CacheEntry>,
    filter: PropertyFilter,
    pattern: Option<Regex>,
    last_stats: BuildStats,
}

impl StructureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &PropertyFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: PropertyFilter) -> Result<(), StructureError> {
        if filter == self.filter {
            return Ok(());
        }
        let pattern = filter
            .pattern
            .as_deref()
            .map(|raw| {
                Regex::new(raw).map_err(|source| StructureError::InvalidPattern {
                    pattern: raw.to_owned(),
                    source,
                })
            })
            .transpose()?;
        self.filter = filter;
        self.pattern = pattern;
        self.invalidate("property filter changed");
        Ok(())
    }

    pub fn invalidate(&mut self, reason: &str) {
        if !self.cache.is_empty() {
            tracing::debug!(entries = self.cache.len(), reason, "structure cache invalidated");
        }
        self.cache.clear();
    }

    pub fn last_stats(&self) -> BuildStats {
        self.last_stats
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    pub fn build(&mut self, inputs: StructureInputs<'_>) -> StructureSet {
        let board = inputs.board;
        let ghost_ids = inputs.scope.map(|scope| ghosts(board, scope)).unwrap_or_default();
        let comment_counts = board.comment_counts();
        let lookup = board.element_lookup();
        let mut stats = BuildStats::default();
        let mut structures = Vec::with_capacity(board.elements().len());
        let mut seen = HashSet::with_capacity(board.elements().len());

        for element in board.elements() {
            let id = element.id();
            seen.insert(id.clone());
            if inputs.hidden.contains(id) {
                continue;
            }
            if let Some(scope) = inputs.scope {
                if !scope.contains(id) && !ghost_ids.contains(id) {
                    continue;
                }
            }

            let comment_count = comment_counts.get(id).copied().unwrap_or(0);
            let parent_group_id = resolve_parent(element, &lookup);
            let assets = resolve_assets(element, board.assets());

            if let Some(entry) = self.cache.get(id) {
                if Arc::ptr_eq(&entry.element, element)
                    && entry.comment_count == comment_count
                    && entry.parent_group_id == parent_group_id
                    && same_assets(&entry.assets, &assets)
                {
                    stats.reused += 1;
                    structures.push(Arc::clone(&entry.structure));
                    continue;
                }
            }

            let structure = Arc::new(RenderStructure {
                element: Arc::clone(element),
                parent_group_id: parent_group_id.clone(),
                comment_count,
                thumbnail: thumbnail(element, &assets),
                badge: element.confidence().map(ConfidenceBadge::for_confidence),
                properties: self.property_lines(element),
            });
            stats.rebuilt += 1;
            self.cache.insert(
                id.clone(),
                CacheEntry {
                    element: Arc::clone(element),
                    comment_count,
                    parent_group_id,
                    assets,
                    structure: Arc::clone(&structure),
                },
            );
            structures.push(structure);
        }

        let before = self.cache.len();
        self.cache.retain(|id, _| seen.contains(id));
        stats.purged = before - self.cache.len();

        tracing::trace!(
            reused = stats.reused,
            rebuilt = stats.rebuilt,
            purged = stats.purged,
            "structures built"
        );
        self.last_stats = stats;
        StructureSet { structures, ghost_ids }
    }

    fn property_lines(&self, element: &Element) -> Vec<String> {
        let limit = self.filter.max_properties.unwrap_or(usize::MAX);
        element
            .properties()
            .iter()
            .filter(|property| {
                self.filter.keys.as_ref().map_or(true, |keys| keys.iter().any(|key| *key == property.key))
            })
            .map(|property| format!("{}: {}", property.key, property.value))
            .filter(|line| self.pattern.as_ref().map_or(true, |pattern| pattern.is_match(line)))
            .take(limit)
            .collect()
    }
}

/// Elements outside `scope` that share a link with an element inside it.
fn ghosts(board: &Board, scope: &HashSet<ElementId>) -> BTreeSet<ElementId> {
    let mut ghosts = BTreeSet::new();
    for link in board.links() {
        let (from, to) = (link.from_id(), link.to_id());
        match (scope.contains(from), scope.contains(to)) {
            (true, false) => {
                ghosts.insert(to.clone());
            }
            (false, true) => {
                ghosts.insert(from.clone());
            }
            _ => {}
        }
    }
    ghosts.retain(|id| board.contains_element(id));
    ghosts
}

fn resolve_parent(element: &Element, lookup: &HashMap<&ElementId, &Arc<Element>>) -> Option<ElementId> {
    let parent_id = element.parent_group_id()?;
    match lookup.get(parent_id) {
        Some(parent) if parent.is_group() && parent.child_ids().contains(element.id()) => {
            Some(parent_id.clone())
        }
        Some(parent) => {
            tracing::warn!(
                element = %element.id(),
                parent = %parent_id,
                parent_is_group = parent.is_group(),
                "parent does not list element as a member; rendering it free-standing"
            );
            None
        }
        None => {
            tracing::warn!(
                element = %element.id(),
                parent = %parent_id,
                "parent group is missing; rendering element free-standing"
            );
            None
        }
    }
}

fn resolve_assets(element: &Element, table: &AssetTable) -> Vec<Option<Arc<Asset>>> {
    element.asset_ids().iter().map(|asset_id| table.get(asset_id).cloned()).collect()
}

fn same_assets(cached: &[Option<Arc<Asset>>], current: &[Option<Arc<Asset>>]) -> bool {
    cached.len() == current.len()
        && cached.iter().zip(current).all(|pair| match pair {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        })
}

/// `assets` holds the resolved entries in `asset_ids` order.
fn thumbnail(element: &Element, assets: &[Option<Arc<Asset>>]) -> Option<Thumbnail> {
    for (asset_id, asset) in element.asset_ids().iter().zip(assets) {
        let Some(asset) = asset else {
            tracing::debug!(element = %element.id(), asset = %asset_id, "asset not on board");
            continue;
        };
        if !asset.is_image() {
            continue;
        }
        return Some(match asset.thumbnail() {
            Some(bytes) => Thumbnail::Image {
                asset_id: asset_id.clone(),
                data_url: format!("data:{};base64,{}", asset.mime_type(), STANDARD.encode(bytes)),
            },
            None => Thumbnail::Placeholder { asset_id: asset_id.clone() },
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use rstest::rstest;

    use super::{ConfidenceBadge, PropertyFilter, StructureBuilder, StructureInputs, Thumbnail};
    use crate::model::fixtures::{card, chain_board, commented_board, eid, grouped_board};
    use crate::model::{Asset, AssetId, Board, Comment, CommentId, Element, ElementId, Property};
    use crate::ops::{apply_ops, BoardOp, ElementPatch, Validation};

    fn build(builder: &mut StructureBuilder, board: &Board) -> super::StructureSet {
        let hidden = HashSet::new();
        builder.build(StructureInputs { board, hidden: &hidden, scope: None })
    }

    #[test]
    fn unchanged_elements_reuse_cached_structures() {
        let board = chain_board(3);
        let mut builder = StructureBuilder::new();
        let first = build(&mut builder, &board);

        let (next, _) = apply_ops(
            &board,
            &[BoardOp::PatchElement { element_id: eid("n1"), patch: ElementPatch::label("moved") }],
            Validation::Strict,
        )
        .expect("apply");
        let second = build(&mut builder, &next);

        assert!(Arc::ptr_eq(&first.structures[0], &second.structures[0]));
        assert!(!Arc::ptr_eq(&first.structures[1], &second.structures[1]));
        assert!(Arc::ptr_eq(&first.structures[2], &second.structures[2]));
        assert_eq!(builder.last_stats().rebuilt, 1);
    }

    #[test]
    fn comment_count_change_rebuilds_only_that_element() {
        let board = commented_board();
        let mut builder = StructureBuilder::new();
        let first = build(&mut builder, &board);
        assert_eq!(first.structures[0].comment_count, 2);

        let comment = Comment::new(CommentId::new("c3").expect("id"), eid("b"), "new lead");
        let (next, _) =
            apply_ops(&board, &[BoardOp::AddComment { comment }], Validation::Strict).expect("apply");
        let second = build(&mut builder, &next);

        assert!(Arc::ptr_eq(&first.structures[0], &second.structures[0]));
        assert_eq!(second.structures[1].comment_count, 1);
        assert_eq!(builder.last_stats().rebuilt, 1);
    }

    #[test]
    fn removed_elements_are_purged() {
        let mut builder = StructureBuilder::new();
        build(&mut builder, &chain_board(3));
        assert_eq!(builder.cached_len(), 3);

        build(&mut builder, &Board::new(vec![card("n0", 0.0, 0.0)], Vec::new()));
        assert_eq!(builder.cached_len(), 1);
        assert_eq!(builder.last_stats().purged, 2);
    }

    #[test]
    fn scope_keeps_members_and_linked_ghosts() {
        let board = chain_board(4);
        let mut builder = StructureBuilder::new();
        let hidden = HashSet::new();
        let scope = HashSet::from([eid("n1")]);

        let set = builder.build(StructureInputs { board: &board, hidden: &hidden, scope: Some(&scope) });

        let ids = set.structures.iter().map(|s| s.id().as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["n0", "n1", "n2"]);
        assert_eq!(set.ghost_ids.iter().map(ElementId::as_str).collect::<Vec<_>>(), vec!["n0", "n2"]);
    }

    #[test]
    fn hidden_elements_are_skipped() {
        let board = chain_board(3);
        let mut builder = StructureBuilder::new();
        let hidden = HashSet::from([eid("n1")]);

        let set = builder.build(StructureInputs { board: &board, hidden: &hidden, scope: None });
        assert_eq!(set.structures.len(), 2);
    }

    #[test]
    fn dangling_parent_is_dropped() {
        let board = grouped_board();
        let mut m1 = Element::clone(board.element(&eid("m1")).expect("m1"));
        m1.set_parent_group_id(Some(eid("f1")));
        let (broken, _) =
            apply_ops(&board, &[BoardOp::ReplaceElement { element: m1 }], Validation::Lenient).expect("apply");

        let mut builder = StructureBuilder::new();
        let set = build(&mut builder, &broken);
        let m1 = set.structures.iter().find(|s| s.id() == &eid("m1")).expect("m1");
        assert_eq!(m1.parent_group_id, None);
        let m2 = set.structures.iter().find(|s| s.id() == &eid("m2")).expect("m2");
        assert_eq!(m2.parent_group_id, Some(eid("g1")));
    }

    #[rstest]
    #[case(10.0, ConfidenceBadge::Low)]
    #[case(33.9, ConfidenceBadge::Low)]
    #[case(34.0, ConfidenceBadge::Medium)]
    #[case(66.0, ConfidenceBadge::Medium)]
    #[case(67.0, ConfidenceBadge::High)]
    fn confidence_buckets(#[case] confidence: f64, #[case] expected: ConfidenceBadge) {
        assert_eq!(ConfidenceBadge::for_confidence(confidence), expected);
    }

    #[test]
    fn thumbnail_prefers_first_image_asset_with_bytes() {
        let doc = AssetId::new("doc").expect("id");
        let photo = AssetId::new("photo").expect("id");
        let element = card("a", 0.0, 0.0).with_asset_ids(vec![doc.clone(), photo.clone()]);
        let board = Board::new(vec![element], Vec::new()).with_assets(vec![
            Asset::new(doc, "notes.pdf", "application/pdf"),
            Asset::new(photo.clone(), "cctv.png", "image/png").with_thumbnail(vec![1u8, 2, 3]),
        ]);

        let mut builder = StructureBuilder::new();
        let set = build(&mut builder, &board);
        assert_eq!(
            set.structures[0].thumbnail,
            Some(Thumbnail::Image { asset_id: photo, data_url: "data:image/png;base64,AQID".to_owned() })
        );
    }

    #[test]
    fn image_without_bytes_yields_placeholder() {
        let photo = AssetId::new("photo").expect("id");
        let element = card("a", 0.0, 0.0).with_asset_ids(vec![photo.clone()]);
        let board = Board::new(vec![element], Vec::new())
            .with_assets(vec![Asset::new(photo.clone(), "raw.jpg", "image/jpeg")]);

        let mut builder = StructureBuilder::new();
        let set = build(&mut builder, &board);
        assert_eq!(set.structures[0].thumbnail, Some(Thumbnail::Placeholder { asset_id: photo }));
    }

    #[test]
    fn asset_changes_rebuild_only_referencing_elements() {
        let photo = AssetId::new("photo").expect("id");
        let board = Board::new(
            vec![card("a", 0.0, 0.0).with_asset_ids(vec![photo.clone()]), card("b", 200.0, 0.0)],
            Vec::new(),
        )
        .with_assets(vec![Asset::new(photo.clone(), "raw.jpg", "image/jpeg")]);
        let mut builder = StructureBuilder::new();
        let first = build(&mut builder, &board);

        let unrelated = Asset::new(AssetId::new("memo").expect("id"), "memo.txt", "text/plain");
        let (next, _) =
            apply_ops(&board, &[BoardOp::PutAsset { asset: unrelated }], Validation::Strict).expect("apply");
        let second = build(&mut builder, &next);
        assert!(Arc::ptr_eq(&first.structures[0], &second.structures[0]));
        assert!(Arc::ptr_eq(&first.structures[1], &second.structures[1]));
        assert_eq!(builder.last_stats().rebuilt, 0);

        let with_bytes = Asset::new(photo.clone(), "raw.jpg", "image/jpeg").with_thumbnail(vec![1u8, 2, 3]);
        let (last, _) =
            apply_ops(&next, &[BoardOp::PutAsset { asset: with_bytes }], Validation::Strict).expect("apply");
        let third = build(&mut builder, &last);
        assert_eq!(builder.last_stats().rebuilt, 1);
        assert!(Arc::ptr_eq(&second.structures[1], &third.structures[1]));
        assert_eq!(
            third.structures[0].thumbnail,
            Some(Thumbnail::Image { asset_id: photo, data_url: "data:image/jpeg;base64,AQID".to_owned() })
        );
    }

    #[test]
    fn late_asset_arrival_rebuilds_the_waiting_element() {
        let photo = AssetId::new("photo").expect("id");
        let board = Board::new(vec![card("a", 0.0, 0.0).with_asset_ids(vec![photo.clone()])], Vec::new());
        let mut builder = StructureBuilder::new();
        let first = build(&mut builder, &board);
        assert_eq!(first.structures[0].thumbnail, None);

        let asset = Asset::new(photo.clone(), "raw.jpg", "image/jpeg");
        let (next, _) = apply_ops(&board, &[BoardOp::PutAsset { asset }], Validation::Strict).expect("apply");
        let second = build(&mut builder, &next);
        assert_eq!(builder.last_stats().rebuilt, 1);
        assert_eq!(second.structures[0].thumbnail, Some(Thumbnail::Placeholder { asset_id: photo }));
    }

    #[test]
    fn property_filter_applies_keys_pattern_and_limit() {
        let element = card("a", 0.0, 0.0).with_properties(vec![
            Property::new("phone", "555-0101"),
            Property::new("email", "a@example.com"),
            Property::new("phone", "555-0199"),
            Property::new("alias", "Red"),
        ]);
        let board = Board::new(vec![element], Vec::new());
        let mut builder = StructureBuilder::new();
        let first = build(&mut builder, &board);
        assert_eq!(first.structures[0].properties.len(), 4);

        builder
            .set_filter(PropertyFilter {
                keys: Some(vec!["phone".to_owned(), "email".to_owned()]),
                pattern: Some("555".to_owned()),
                max_properties: Some(1),
            })
            .expect("filter");
        let second = build(&mut builder, &board);
        assert_eq!(second.structures[0].properties, vec!["phone: 555-0101".to_owned()]);
        assert!(!Arc::ptr_eq(&first.structures[0], &second.structures[0]));
    }

    #[test]
    fn invalid_pattern_is_rejected_and_filter_kept() {
        let mut builder = StructureBuilder::new();
        let err = builder
            .set_filter(PropertyFilter { pattern: Some("(".to_owned()), ..PropertyFilter::default() })
            .unwrap_err();
        assert!(err.to_string().contains("invalid property pattern"));
        assert_eq!(builder.filter(), &PropertyFilter::default());
    }
}
