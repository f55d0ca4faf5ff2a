// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! One board, one engine.
//!
//! `BoardView` owns the store, the history and every pipeline stage, and produces a [`Frame`] on
//! [`BoardView::recompute`]. It is single-threaded: every entry point that depends on time takes
//! the current `Instant`, and [`BoardView::next_deadline`] tells the host when to call back.

pub mod driver;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use crate::assets::{ImageCache, ImageDecoder, ImageState};
use crate::clipboard::{self, ClipboardError};
use crate::config::EngineConfig;
use crate::history::{Command, CommandKind, History};
use crate::interact::{DragController, DragStep, Guide, PositionBroadcast};
use crate::model::{AssetId, Board, Element, ElementId, Link, LinkId, Size, UserId, Viewport};
use crate::ops::{ApplyError, BoardOp, ElementPatch, LinkPatch, PositionUpdate};
use crate::presence::{LocalPresence, PresenceBroadcaster, PresenceMerger, RemoteUser};
use crate::store::{ApplyResult, BoardStore};
use crate::view::{
    element_rects, DisplaySettings, EdgeInputs, EdgePipeline, EdgeReport, EdgeSettings, MaterializeReport,
    NodeMaterializer, PropertyFilter, StructureBuilder, StructureError, StructureInputs, ViewEdge, ViewNode,
    VisualInputs,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub elements: HashSet<ElementId>,
    pub links: HashSet<LinkId>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.links.is_empty()
    }
}

/// Everything the renderer needs for one paint.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    pub nodes: Vec<Arc<ViewNode>>,
    /// Revealed edges only; grows on later frames while a reveal is in progress.
    pub edges: Vec<Arc<ViewEdge>>,
    pub guides: Vec<Guide>,
    pub node_report: MaterializeReport,
    /// `None` when edges were not recomputed this frame.
    pub edge_report: Option<EdgeReport>,
}

/// Messages for collaborators produced since the last [`BoardView::take_outbound`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outbound {
    pub presence: Option<LocalPresence>,
    pub positions: Vec<PositionBroadcast>,
}

#[derive(Debug)]
pub struct BoardView {
    config: EngineConfig,
    store: BoardStore,
    history: History,
    structures: StructureBuilder,
    nodes: NodeMaterializer,
    edges: EdgePipeline,
    drag: DragController,
    presence: PresenceMerger,
    broadcaster: PresenceBroadcaster,
    images: ImageCache,

    selection: Selection,
    dimmed: HashSet<ElementId>,
    hidden: HashSet<ElementId>,
    scope: Option<HashSet<ElementId>>,
    editing_element: Option<ElementId>,
    editing_link: Option<LinkId>,
    display: DisplaySettings,
    edge_settings: EdgeSettings,
    viewport: Viewport,
    screen: Size,
    shared: bool,

    seen_board: Option<Arc<Board>>,
    edge_board: Option<Arc<Board>>,
    edge_dragging: HashSet<ElementId>,
    edges_dirty: bool,
    /// Remote position bursts hold edge recomputation until this instant.
    position_settle: Option<Instant>,
    pending_presence: Option<LocalPresence>,
    frame: Frame,
}

impl BoardView {
    pub fn new(board: Board, config: EngineConfig, local_user: Option<UserId>) -> Self {
        Self {
            store: BoardStore::new(board),
            history: History::new(config.cache.history_limit),
            structures: StructureBuilder::new(),
            nodes: NodeMaterializer::new(),
            edges: EdgePipeline::new(config.edges.clone()),
            drag: DragController::new(config.interaction.clone(), &config.collaboration),
            presence: PresenceMerger::new(local_user),
            broadcaster: PresenceBroadcaster::new(config.collaboration.presence_interval()),
            images: ImageCache::new(config.cache.image_capacity),
            selection: Selection::default(),
            dimmed: HashSet::new(),
            hidden: HashSet::new(),
            scope: None,
            editing_element: None,
            editing_link: None,
            display: DisplaySettings::default(),
            edge_settings: EdgeSettings::default(),
            viewport: Viewport::default(),
            screen: Size::default(),
            shared: false,
            seen_board: None,
            edge_board: None,
            edge_dragging: HashSet::new(),
            edges_dirty: true,
            position_settle: None,
            pending_presence: None,
            frame: Frame::default(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    pub fn board(&self) -> &Arc<Board> {
        self.store.board()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    // View state

    pub fn set_selection(&mut self, selection: Selection) {
        if selection != self.selection {
            self.selection = selection;
            self.edges_dirty = true;
        }
    }

    pub fn clear_selection(&mut self) {
        self.set_selection(Selection::default());
    }

    pub fn set_dimmed(&mut self, dimmed: HashSet<ElementId>) {
        if dimmed != self.dimmed {
            self.dimmed = dimmed;
            self.edges_dirty = true;
        }
    }

    pub fn set_hidden(&mut self, hidden: HashSet<ElementId>) {
        if hidden != self.hidden {
            self.hidden = hidden;
            self.edges_dirty = true;
        }
    }

    /// Restricts the view to `scope` (plus linked ghosts); `None` shows the whole board.
    pub fn set_scope(&mut self, scope: Option<HashSet<ElementId>>) {
        if scope != self.scope {
            self.scope = scope;
            self.edges_dirty = true;
        }
    }

    pub fn set_editing_element(&mut self, element_id: Option<ElementId>) {
        self.editing_element = element_id;
    }

    pub fn set_editing_link(&mut self, link_id: Option<LinkId>) {
        if link_id != self.editing_link {
            self.editing_link = link_id;
            self.edges_dirty = true;
        }
    }

    pub fn set_display(&mut self, display: DisplaySettings) {
        self.display = display;
    }

    pub fn set_edge_settings(&mut self, settings: EdgeSettings) {
        if settings != self.edge_settings {
            self.edge_settings = settings;
            self.edges_dirty = true;
        }
    }

    pub fn set_property_filter(&mut self, filter: PropertyFilter) -> Result<(), StructureError> {
        self.structures.set_filter(filter)
    }

    /// Tracks pan/zoom without touching edges; call [`BoardView::viewport_settled`] once it stops.
    pub fn set_viewport(&mut self, viewport: Viewport, screen: Size) {
        self.viewport = viewport;
        self.screen = screen;
    }

    pub fn viewport_settled(&mut self) {
        self.edges.freeze_viewport(self.viewport, self.screen);
        self.edges_dirty = true;
    }

    pub fn record_measured(&mut self, element_id: ElementId, size: Size) {
        self.nodes.record_measured(element_id, size);
        self.edges_dirty = true;
    }

    // Collaboration

    pub fn set_shared(&mut self, shared: bool) {
        self.shared = shared;
        self.drag.set_shared(shared);
        if !shared {
            self.pending_presence = None;
        }
    }

    pub fn update_remote_users(&mut self, users: &[RemoteUser]) {
        let before = Arc::clone(self.presence.current());
        let after = self.presence.merge(users);
        if !Arc::ptr_eq(&before, &after) {
            self.edges_dirty = true;
        }
    }

    /// Applies a collaborator's batch. Position-only bursts delay edge recomputation until they
    /// have been quiet for the configured debounce.
    pub fn apply_remote(&mut self, ops: &[BoardOp], now: Instant) -> Result<ApplyResult, ApplyError> {
        let result = self.store.apply_remote(ops)?;
        if result.delta.is_empty() {
            return Ok(result);
        }
        if result.delta.positions_only {
            self.position_settle = Some(now + self.config.collaboration.remote_position_debounce());
        } else {
            self.edges_dirty = true;
        }
        Ok(result)
    }

    pub fn take_outbound(&mut self) -> Outbound {
        Outbound { presence: self.pending_presence.take(), positions: self.drag.take_broadcasts() }
    }

    // Pointer input

    pub fn positions_changed(
        &mut self,
        changes: &[PositionUpdate],
        live: bool,
        now: Instant,
    ) -> Result<DragStep, ApplyError> {
        let step = self.drag.positions_changed(&mut self.store, &mut self.history, changes, live, now)?;
        if matches!(step, DragStep::Committed { .. }) {
            self.edges_dirty = true;
        }
        Ok(step)
    }

    pub fn end_drag(&mut self) -> Result<DragStep, ApplyError> {
        let step = self.drag.end_drag(&mut self.store, &mut self.history)?;
        self.edges_dirty = true;
        Ok(step)
    }

    pub fn abort_drag(&mut self) {
        let board = self.store.snapshot();
        self.drag.abort(&board);
    }

    // Store mutations. Each successful edit lands on the history stack.

    pub fn create_element(&mut self, element: Element) -> Result<CommandKind, ApplyError> {
        let command = self.store.create_element(element)?;
        Ok(self.record(command))
    }

    pub fn create_link(&mut self, link: Link) -> Result<CommandKind, ApplyError> {
        let command = self.store.create_link(link)?;
        Ok(self.record(command))
    }

    pub fn update_element(&mut self, element_id: &ElementId, patch: ElementPatch) -> Result<CommandKind, ApplyError> {
        let command = self.store.update_element(element_id, patch)?;
        Ok(self.record(command))
    }

    pub fn update_link(&mut self, link_id: &LinkId, patch: LinkPatch) -> Result<CommandKind, ApplyError> {
        let command = self.store.update_link(link_id, patch)?;
        Ok(self.record(command))
    }

    pub fn delete_elements(&mut self, element_ids: &[ElementId]) -> Result<CommandKind, ApplyError> {
        let command = self.store.delete_elements(element_ids)?;
        Ok(self.record(command))
    }

    pub fn delete_links(&mut self, link_ids: &[LinkId]) -> Result<CommandKind, ApplyError> {
        let command = self.store.delete_links(link_ids)?;
        Ok(self.record(command))
    }

    pub fn create_group(
        &mut self,
        group_id: ElementId,
        label: impl Into<String>,
        member_ids: &[ElementId],
    ) -> Result<CommandKind, ApplyError> {
        let command = self.store.create_group(group_id, label, member_ids)?;
        Ok(self.record(command))
    }

    pub fn dissolve_group(&mut self, group_id: &ElementId) -> Result<CommandKind, ApplyError> {
        let command = self.store.dissolve_group(group_id)?;
        Ok(self.record(command))
    }

    pub fn remove_from_group(&mut self, element_id: &ElementId) -> Result<CommandKind, ApplyError> {
        let command = self.store.remove_from_group(element_id)?;
        Ok(self.record(command))
    }

    pub fn reparent(&mut self, element_id: &ElementId, group_id: Option<&ElementId>) -> Result<CommandKind, ApplyError> {
        let command = self.store.reparent(element_id, group_id)?;
        Ok(self.record(command))
    }

    pub fn undo(&mut self) -> Result<Option<CommandKind>, ApplyError> {
        self.abort_drag();
        let kind = self.history.undo(&mut self.store)?;
        self.edges_dirty |= kind.is_some();
        Ok(kind)
    }

    pub fn redo(&mut self) -> Result<Option<CommandKind>, ApplyError> {
        self.abort_drag();
        let kind = self.history.redo(&mut self.store)?;
        self.edges_dirty |= kind.is_some();
        Ok(kind)
    }

    fn record(&mut self, command: Command) -> CommandKind {
        let kind = command.kind();
        self.history.push(command);
        self.edges_dirty = true;
        kind
    }

    // Side services

    pub fn copy_selection(&self) -> Result<String, ClipboardError> {
        let payload = clipboard::copy_selection(self.store.board(), &self.selection.elements, &self.selection.links);
        clipboard::encode(&payload)
    }

    /// Decoded image for an asset on the board; `None` for unknown assets.
    pub fn image(&mut self, asset_id: &AssetId, decoder: &dyn ImageDecoder) -> Option<ImageState> {
        let asset = Arc::clone(self.store.board().assets().get(asset_id)?);
        Some(self.images.load(&asset, decoder))
    }

    // Reconciliation

    /// Earliest instant at which [`BoardView::recompute`] has pending work.
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.drag.deadline(),
            self.edges.deadline(),
            self.position_settle,
            self.shared.then(|| self.broadcaster.deadline()).flatten(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    pub fn recompute(&mut self, now: Instant) -> &Frame {
        self.drag.poll(now);
        self.edges.tick(now);

        let board = self.store.snapshot();
        if !self.seen_board.as_ref().is_some_and(|seen| Arc::ptr_eq(seen, &board)) {
            self.prune(&board);
            self.seen_board = Some(Arc::clone(&board));
        }

        let structures = self.structures.build(StructureInputs {
            board: &board,
            hidden: &self.hidden,
            scope: self.scope.as_ref(),
        });
        let presence = Arc::clone(self.presence.current());
        let node_report = self.nodes.materialize(
            &structures,
            VisualInputs {
                selected: &self.selection.elements,
                dimmed: &self.dimmed,
                editing: self.editing_element.as_ref(),
                preview: self.drag.preview(),
                presence: &presence,
                display: self.display,
            },
        );

        if self.drag.dragging().len() != self.edge_dragging.len()
            || self.drag.dragging().iter().any(|id| !self.edge_dragging.contains(id))
        {
            self.edge_dragging = self.drag.dragging().iter().cloned().collect();
            self.edges_dirty = true;
        }

        let settle_due = self.position_settle.is_some_and(|deadline| now >= deadline);
        let settling = self.position_settle.is_some_and(|deadline| now < deadline);
        let board_moved = !self.edge_board.as_ref().is_some_and(|seen| Arc::ptr_eq(seen, &board));
        let edge_report = if self.edges_dirty || settle_due || (board_moved && !settling) {
            let rects = element_rects(&board, self.drag.preview(), self.nodes.measured());
            let visible = self.nodes.nodes().iter().map(|node| node.id.clone()).collect::<HashSet<_>>();
            let report = self.edges.process(
                EdgeInputs {
                    board: &board,
                    rects: &rects,
                    visible_nodes: &visible,
                    selected_links: &self.selection.links,
                    selected_elements: &self.selection.elements,
                    dimmed: &self.dimmed,
                    editing_link: self.editing_link.as_ref(),
                    dragging: &self.edge_dragging,
                    presence: &presence,
                    settings: self.edge_settings,
                },
                now,
            );
            self.edges_dirty = false;
            self.position_settle = None;
            self.edge_board = Some(Arc::clone(&board));
            Some(report)
        } else {
            None
        };

        if self.shared {
            let local = self.local_presence();
            let sent = self.broadcaster.update(local, now).or_else(|| self.broadcaster.poll(now));
            if sent.is_some() {
                self.pending_presence = sent;
            }
        }

        self.frame = Frame {
            nodes: self.nodes.nodes().to_vec(),
            edges: self.edges.edges().to_vec(),
            guides: self.drag.guides().to_vec(),
            node_report,
            edge_report,
        };
        &self.frame
    }

    fn local_presence(&self) -> LocalPresence {
        let mut selection = self.selection.elements.iter().cloned().collect::<Vec<_>>();
        selection.sort();
        let mut link_selection = self.selection.links.iter().cloned().collect::<Vec<_>>();
        link_selection.sort();
        LocalPresence {
            selection,
            link_selection,
            dragging: self.drag.dragging().iter().cloned().collect(),
            editing: self.editing_element.clone(),
            editing_link: self.editing_link.clone(),
        }
    }

    /// Drops view state that refers to entities no longer on the board.
    fn prune(&mut self, board: &Board) {
        self.selection.elements.retain(|id| board.contains_element(id));
        self.selection.links.retain(|id| board.link(id).is_some());
        if self.editing_element.as_ref().is_some_and(|id| !board.contains_element(id)) {
            self.editing_element = None;
        }
        if self.editing_link.as_ref().is_some_and(|id| board.link(id).is_none()) {
            self.editing_link = None;
        }
        let stale = self
            .nodes
            .measured()
            .keys()
            .filter(|id| !board.contains_element(id))
            .cloned()
            .collect::<Vec<_>>();
        for id in &stale {
            self.nodes.forget_measured(id);
        }
    }
}
