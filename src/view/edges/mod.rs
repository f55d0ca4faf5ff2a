// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Links → view edges.
//!
//! Stages run in order: visibility, viewport culling, capping, simplification, then progressive
//! reveal of the result. Each surviving link goes through a per-link cache so an edge whose inputs
//! did not change keeps its `Arc`.

pub mod anchors;
pub mod cap;
pub mod cull;
pub mod lanes;
pub mod reveal;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::EdgeConfig;
use crate::model::{Board, ElementId, Link, LinkDirection, LinkId, Position, Rect, Size, Viewport};
use crate::presence::{PresenceList, PresenceMap};

pub use anchors::{AnchorMode, Handle, HandleRole, Side};
pub use lanes::Lane;

use anchors::resolve_handles;
use reveal::Reveal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveMode {
    #[default]
    Bezier,
    Straight,
    Step,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeSettings {
    pub anchor_mode: AnchorMode,
    pub curve_mode: CurveMode,
    pub show_confidence: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Full,
    /// No label, no arrow, no drag handle.
    Simple,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewEdge {
    pub id: LinkId,
    pub source: ElementId,
    pub target: ElementId,
    pub kind: EdgeKind,
    pub source_handle: Handle,
    pub target_handle: Handle,
    pub lane: Lane,
    pub selected: bool,
    pub dimmed: bool,
    pub editing: bool,
    pub dragging: bool,
    pub presence: PresenceList,
    pub label: Option<String>,
    pub direction: Option<LinkDirection>,
    pub confidence: Option<f64>,
    pub curve: CurveMode,
    pub curve_offset: Option<f64>,
    pub link: Arc<Link>,
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeInputs<'a> {
    pub board: &'a Board,
    /// Absolute boxes of elements, preview positions included (see [`element_rects`]).
    pub rects: &'a HashMap<ElementId, Rect>,
    /// Elements rendered as nodes; links to anything else are not shown.
    pub visible_nodes: &'a HashSet<ElementId>,
    pub selected_links: &'a HashSet<LinkId>,
    pub selected_elements: &'a HashSet<ElementId>,
    pub dimmed: &'a HashSet<ElementId>,
    pub editing_link: Option<&'a LinkId>,
    pub dragging: &'a HashSet<ElementId>,
    pub presence: &'a PresenceMap,
    pub settings: EdgeSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeReport {
    pub candidates: usize,
    pub after_cull: usize,
    pub capped: bool,
    pub simplified: bool,
    pub rebuilt: usize,
    pub structural: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct EdgeState {
    selected: bool,
    dimmed: bool,
    editing: bool,
    dragging: bool,
    lane: Lane,
    source_handle: Handle,
    target_handle: Handle,
    simplified: bool,
    presence: PresenceList,
}

#[derive(Debug)]
struct CacheEntry {
    link: Arc<Link>,
    settings: EdgeSettings,
    state: EdgeState,
    edge: Arc<ViewEdge>,
}

#[derive(Debug)]
pub struct EdgePipeline {
    config: EdgeConfig,
    frozen: Option<Rect>,
    cache: HashMap<LinkId, CacheEntry>,
    edges: Vec<Arc<ViewEdge>>,
    ids: HashSet<LinkId>,
    reveal: Reveal,
}

impl EdgePipeline {
    pub fn new(config: EdgeConfig) -> Self {
        let reveal = Reveal::new(config.reveal_batch, config.reveal_interval());
        Self {
            config,
            frozen: None,
            cache: HashMap::new(),
            edges: Vec::new(),
            ids: HashSet::new(),
            reveal,
        }
    }

    /// Records the viewport culling works against. Call when pan/zoom has stopped, not per frame.
    pub fn freeze_viewport(&mut self, viewport: Viewport, screen: Size) {
        self.frozen = Some(viewport.visible_rect(screen));
    }

    pub fn frozen_viewport(&self) -> Option<Rect> {
        self.frozen
    }

    /// Edges to render now; a prefix of the full set while a reveal is in progress.
    pub fn edges(&self) -> &[Arc<ViewEdge>] {
        &self.edges[..self.reveal.shown().min(self.edges.len())]
    }

    pub fn all_edges(&self) -> &[Arc<ViewEdge>] {
        &self.edges
    }

    pub fn tick(&mut self, now: Instant) -> bool {
        self.reveal.tick(now)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.reveal.deadline()
    }

    pub fn process(&mut self, inputs: EdgeInputs<'_>, now: Instant) -> EdgeReport {
        let board = inputs.board;
        let visible = board
            .links()
            .iter()
            .filter(|link| {
                inputs.visible_nodes.contains(link.from_id()) && inputs.visible_nodes.contains(link.to_id())
            })
            .collect::<Vec<_>>();
        let candidates = visible.len();

        let area = self.frozen.map(|rect| rect.expand(self.config.viewport_buffer));
        let culled = cull::cull(visible, inputs.rects, area);
        let after_cull = culled.len();

        let kept = cap::cap(culled, inputs.selected_links, inputs.selected_elements, self.config.cap);
        let capped = kept.len() < after_cull;
        let simplified = kept.len() > self.config.simplify_threshold;

        let lanes = lanes::assign_lanes(board.links());
        let mut rebuilt = 0;
        let mut edges = Vec::with_capacity(kept.len());
        for link in &kept {
            let (edge, fresh) = self.edge_for(link, &inputs, &lanes, simplified);
            rebuilt += usize::from(fresh);
            edges.push(edge);
        }

        let ids = kept.iter().map(|link| link.id().clone()).collect::<HashSet<_>>();
        let structural = ids != self.ids;
        if structural {
            self.reveal.restart(edges.len(), now);
        } else if rebuilt > 0 {
            self.reveal.show_all(edges.len());
        } else {
            self.reveal.resize(edges.len());
        }

        let live = board.links().iter().map(|link| link.id()).collect::<HashSet<_>>();
        self.cache.retain(|id, _| live.contains(id));

        self.ids = ids;
        self.edges = edges;
        let report = EdgeReport { candidates, after_cull, capped, simplified, rebuilt, structural };
        tracing::trace!(?report, shown = self.reveal.shown(), "edges processed");
        report
    }

    fn edge_for(
        &mut self,
        link: &Arc<Link>,
        inputs: &EdgeInputs<'_>,
        lanes: &HashMap<LinkId, Lane>,
        simplified_stage: bool,
    ) -> (Arc<ViewEdge>, bool) {
        let id = link.id();
        let selected = inputs.selected_links.contains(id);
        let source_rect = inputs.rects.get(link.from_id()).copied();
        let target_rect = inputs.rects.get(link.to_id()).copied();
        let (source_handle, target_handle) =
            resolve_handles(link, inputs.settings.anchor_mode, source_rect, target_rect);

        let state = EdgeState {
            selected,
            dimmed: inputs.dimmed.contains(link.from_id()) || inputs.dimmed.contains(link.to_id()),
            editing: inputs.editing_link == Some(id),
            dragging: inputs.dragging.contains(link.from_id()) || inputs.dragging.contains(link.to_id()),
            lane: lanes.get(id).copied().unwrap_or(Lane::SINGLE),
            source_handle,
            target_handle,
            simplified: simplified_stage && !selected,
            presence: inputs.presence.link(id).iter().cloned().collect(),
        };

        if let Some(entry) = self.cache.get(id) {
            if Arc::ptr_eq(&entry.link, link) && entry.settings == inputs.settings && entry.state == state {
                return (Arc::clone(&entry.edge), false);
            }
        }

        let kind = if state.simplified { EdgeKind::Simple } else { EdgeKind::Full };
        let edge = Arc::new(ViewEdge {
            id: id.clone(),
            source: link.from_id().clone(),
            target: link.to_id().clone(),
            kind,
            source_handle,
            target_handle,
            lane: state.lane,
            selected: state.selected,
            dimmed: state.dimmed,
            editing: state.editing,
            dragging: state.dragging,
            presence: state.presence.clone(),
            label: match kind {
                EdgeKind::Full => link.label().map(ToOwned::to_owned),
                EdgeKind::Simple => None,
            },
            direction: match kind {
                EdgeKind::Full => Some(link.direction()),
                EdgeKind::Simple => None,
            },
            confidence: if inputs.settings.show_confidence { link.confidence() } else { None },
            curve: inputs.settings.curve_mode,
            curve_offset: link.curve_offset(),
            link: Arc::clone(link),
        });
        self.cache.insert(
            id.clone(),
            CacheEntry {
                link: Arc::clone(link),
                settings: inputs.settings,
                state,
                edge: Arc::clone(&edge),
            },
        );
        (edge, true)
    }
}

/// Absolute boxes for every element with a finite position.
///
/// `preview` overrides stored positions (in the element's own coordinate space) during a drag;
/// `measured` overrides stored sizes.
pub fn element_rects(
    board: &Board,
    preview: &HashMap<ElementId, Position>,
    measured: &HashMap<ElementId, Size>,
) -> HashMap<ElementId, Rect> {
    let lookup = board.element_lookup();
    let local = |id: &ElementId, stored: Position| preview.get(id).copied().unwrap_or(stored);

    let mut rects = HashMap::with_capacity(board.elements().len());
    for element in board.elements() {
        let id = element.id();
        let mut position = local(id, element.position());
        if let Some(parent) = element.parent_group_id().and_then(|parent_id| lookup.get(parent_id)) {
            position = position.to_absolute(local(parent.id(), parent.position()));
        }
        if !position.is_finite() {
            continue;
        }
        let size = measured.get(id).copied().unwrap_or_else(|| element.size());
        rects.insert(id.clone(), Rect::from_position(position, size));
    }
    rects
}
