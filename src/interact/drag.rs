// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pointer drags: preview while moving, one store write on release.
//!
//! `Idle → Dragging` on the first live position change, `Dragging → Committing` on release and
//! back to `Idle` once the store write has returned. While dragging nothing reaches the store;
//! positions live in a local preview that the view layer renders instead of stored positions.

use std::collections::{BTreeSet, HashMap};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::{CollaborationConfig, InteractionConfig};
use crate::history::History;
use crate::model::{Board, ElementId, Position};
use crate::ops::{ApplyError, PositionUpdate};
use crate::store::BoardStore;

use super::guides::{guides_for, snap, Guide};
use super::throttle::{Throttle, Throttled};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging,
    Committing,
}

/// Outbound position update for collaborators. `settled` marks the final positions of a gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionBroadcast {
    pub positions: Vec<PositionUpdate>,
    #[serde(default)]
    pub settled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragStep {
    /// Nothing movable in the batch.
    Ignored,
    Previewed,
    /// Positions were written; `recorded` is false when nothing actually moved.
    Committed { recorded: bool },
}

#[derive(Debug)]
pub struct DragController {
    phase: DragPhase,
    interaction: InteractionConfig,
    shared: bool,
    preview: HashMap<ElementId, Position>,
    dragging: BTreeSet<ElementId>,
    guides: Vec<Guide>,
    guide_throttle: Throttle,
    broadcast: Throttled<PositionBroadcast>,
    outbox: Vec<PositionBroadcast>,
}

impl DragController {
    pub fn new(interaction: InteractionConfig, collaboration: &CollaborationConfig) -> Self {
        let guide_throttle = Throttle::new(interaction.guide_interval());
        Self {
            phase: DragPhase::Idle,
            interaction,
            shared: false,
            preview: HashMap::new(),
            dragging: BTreeSet::new(),
            guides: Vec::new(),
            guide_throttle,
            broadcast: Throttled::new(collaboration.drag_broadcast_interval()),
            outbox: Vec::new(),
        }
    }

    /// Shared mode: other users are connected and receive drag positions.
    pub fn set_shared(&mut self, shared: bool) {
        self.shared = shared;
        if !shared {
            self.broadcast.clear();
        }
    }

    pub fn is_shared(&self) -> bool {
        self.shared
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn preview(&self) -> &HashMap<ElementId, Position> {
        &self.preview
    }

    pub fn dragging(&self) -> &BTreeSet<ElementId> {
        &self.dragging
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Entry point for every position change coming from the canvas.
    ///
    /// `live` changes belong to an ongoing pointer drag. A non-live change ends the current drag,
    /// or, when idle (keyboard nudge, programmatic move), is committed right away.
    pub fn positions_changed(
        &mut self,
        store: &mut BoardStore,
        history: &mut History,
        changes: &[PositionUpdate],
        live: bool,
        now: Instant,
    ) -> Result<DragStep, ApplyError> {
        let changes = movable(store.board(), changes);
        if changes.is_empty() {
            return Ok(DragStep::Ignored);
        }

        if live {
            self.apply_preview(store.board(), changes, now);
            return Ok(DragStep::Previewed);
        }

        match self.phase {
            DragPhase::Idle => commit(store, history, &changes),
            DragPhase::Dragging | DragPhase::Committing => {
                self.extend_preview(changes);
                self.end_drag(store, history)
            }
        }
    }

    /// Writes the previewed positions (snapped for single-node drags) to the store as one batch.
    pub fn end_drag(&mut self, store: &mut BoardStore, history: &mut History) -> Result<DragStep, ApplyError> {
        if self.phase != DragPhase::Dragging {
            return Ok(DragStep::Ignored);
        }
        self.phase = DragPhase::Committing;

        let mut updates = self
            .dragging
            .iter()
            .filter_map(|id| self.preview.get(id).map(|position| PositionUpdate::new(id.clone(), *position)))
            .collect::<Vec<_>>();
        if self.interaction.snap_to_guides {
            if let [update] = updates.as_mut_slice() {
                if let Some(element) = store.board().element(&update.element_id) {
                    let guides = guides_for(
                        store.board(),
                        element,
                        update.position,
                        &self.preview,
                        self.interaction.guide_tolerance,
                    );
                    update.position = snap(update.position, &guides);
                }
            }
        }

        let result = commit(store, history, &updates);
        if self.shared && result.is_ok() {
            self.broadcast.clear();
            self.outbox.push(PositionBroadcast { positions: updates, settled: true });
        }
        tracing::debug!(elements = self.dragging.len(), ok = result.is_ok(), "drag committed");
        self.reset_gesture();
        result
    }

    /// Drops the gesture without writing anything. In shared mode collaborators are told the
    /// stored positions again.
    pub fn abort(&mut self, board: &Board) {
        if self.phase == DragPhase::Idle {
            return;
        }
        if self.shared {
            let positions = self
                .dragging
                .iter()
                .filter_map(|id| board.element(id).map(|element| PositionUpdate::new(id.clone(), element.position())))
                .collect();
            self.broadcast.clear();
            self.outbox.push(PositionBroadcast { positions, settled: true });
        }
        tracing::debug!(elements = self.dragging.len(), "drag aborted");
        self.reset_gesture();
    }

    /// Releases a throttled broadcast whose window has reopened.
    pub fn poll(&mut self, now: Instant) {
        if let Some(message) = self.broadcast.poll(now) {
            self.outbox.push(message);
        }
    }

    pub fn take_broadcasts(&mut self) -> Vec<PositionBroadcast> {
        std::mem::take(&mut self.outbox)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.broadcast.deadline()
    }

    fn apply_preview(&mut self, board: &Board, changes: Vec<PositionUpdate>, now: Instant) {
        if self.phase == DragPhase::Idle {
            self.phase = DragPhase::Dragging;
            self.guide_throttle.reset();
            tracing::debug!(elements = changes.len(), "drag started");
        }
        self.extend_preview(changes);

        if self.shared {
            let message = PositionBroadcast { positions: self.preview_updates(), settled: false };
            if let Some(message) = self.broadcast.offer(message, now) {
                self.outbox.push(message);
            }
        }

        match self.single_dragged().map(|(id, position)| (id.clone(), position)) {
            Some((id, position)) => {
                if self.guide_throttle.ready(now) {
                    self.guides = board
                        .element(&id)
                        .map(|element| {
                            guides_for(board, element, position, &self.preview, self.interaction.guide_tolerance)
                        })
                        .unwrap_or_default();
                }
            }
            None => self.guides.clear(),
        }
    }

    fn extend_preview(&mut self, changes: Vec<PositionUpdate>) {
        for PositionUpdate { element_id, position } in changes {
            self.preview.insert(element_id.clone(), position);
            self.dragging.insert(element_id);
        }
    }

    fn single_dragged(&self) -> Option<(&ElementId, Position)> {
        if self.dragging.len() != 1 {
            return None;
        }
        let id = self.dragging.first()?;
        Some((id, *self.preview.get(id)?))
    }

    fn preview_updates(&self) -> Vec<PositionUpdate> {
        self.dragging
            .iter()
            .filter_map(|id| self.preview.get(id).map(|position| PositionUpdate::new(id.clone(), *position)))
            .collect()
    }

    fn reset_gesture(&mut self) {
        self.preview.clear();
        self.dragging.clear();
        self.guides.clear();
        self.phase = DragPhase::Idle;
    }
}

/// Drops unknown, locked and non-finite entries.
fn movable(board: &Board, changes: &[PositionUpdate]) -> Vec<PositionUpdate> {
    changes
        .iter()
        .filter(|update| match board.element(&update.element_id) {
            Some(element) if element.is_locked() => {
                tracing::trace!(element = %update.element_id, "locked element skipped");
                false
            }
            Some(_) if !update.position.is_finite() => {
                tracing::warn!(element = %update.element_id, "non-finite drag position dropped");
                false
            }
            Some(_) => true,
            None => {
                tracing::debug!(element = %update.element_id, "position change for unknown element");
                false
            }
        })
        .cloned()
        .collect()
}

fn commit(store: &mut BoardStore, history: &mut History, updates: &[PositionUpdate]) -> Result<DragStep, ApplyError> {
    let command = store.update_element_positions(updates)?;
    let recorded = command.is_some();
    if let Some(command) = command {
        history.push(command);
    }
    Ok(DragStep::Committed { recorded })
}

#[cfg(test)]
mod tests;
