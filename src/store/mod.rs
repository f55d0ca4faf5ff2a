// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory board store.
//!
//! Holds the authoritative snapshot behind an `Arc`, bumps a revision per applied batch and
//! notifies subscribers. The high-level mutation API returns the [`Command`] describing what it
//! did so callers can push it onto the history stack.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::history::{
    Command, GroupDissolution, GroupFormation, IndexedElement, IndexedLink, MemberShift, Placement,
    Removal, Restoration,
};
use crate::model::{Asset, Board, Comment, Element, ElementId, Link, LinkId, Position, Rect};
use crate::ops::{
    apply_ops, ApplyError, BoardOp, Delta, ElementPatch, EntityRef, LinkPatch, PositionUpdate,
    Validation,
};

/// Space between a new group's border and the bounding box of its members.
pub const GROUP_PADDING: f64 = 20.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyResult {
    pub new_rev: u64,
    pub applied: usize,
    pub delta: Delta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&Arc<Board>, &Delta)>;

pub struct BoardStore {
    board: Arc<Board>,
    rev: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl fmt::Debug for BoardStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoardStore")
            .field("rev", &self.rev)
            .field("elements", &self.board.elements().len())
            .field("links", &self.board.links().len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new(Board::default())
    }
}

impl BoardStore {
    pub fn new(board: Board) -> Self {
        Self { board: Arc::new(board), rev: 0, listeners: Vec::new(), next_subscription: 0 }
    }

    pub fn board(&self) -> &Arc<Board> {
        &self.board
    }

    /// A cheap handle to the current snapshot.
    pub fn snapshot(&self) -> Arc<Board> {
        Arc::clone(&self.board)
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    /// Registers `listener`, called with the new snapshot and delta after every applied batch.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Arc<Board>, &Delta) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Applies a local batch against `base_rev` with strict validation.
    ///
    /// # Errors
    ///
    /// [`ApplyError::Conflict`] when `base_rev` is stale, or the first op/integrity failure. The
    /// snapshot and revision are unchanged on error.
    pub fn apply(&mut self, base_rev: u64, ops: &[BoardOp]) -> Result<ApplyResult, ApplyError> {
        if base_rev != self.rev {
            return Err(ApplyError::Conflict { base_rev, current_rev: self.rev });
        }
        self.commit(ops, Validation::Strict)
    }

    /// Applies a local batch against the current revision.
    pub fn apply_local(&mut self, ops: &[BoardOp]) -> Result<ApplyResult, ApplyError> {
        self.commit(ops, Validation::Strict)
    }

    /// Applies a batch received from a collaborator. Remote edits are last-writer-wins and are
    /// not integrity-checked; the view layer corrects what it cannot render.
    pub fn apply_remote(&mut self, ops: &[BoardOp]) -> Result<ApplyResult, ApplyError> {
        self.commit(ops, Validation::Lenient)
    }

    fn commit(&mut self, ops: &[BoardOp], validation: Validation) -> Result<ApplyResult, ApplyError> {
        if ops.is_empty() {
            return Ok(ApplyResult { new_rev: self.rev, applied: 0, delta: Delta::default() });
        }

        let (next, delta) = apply_ops(&self.board, ops, validation)?;
        if delta.is_empty() {
            return Ok(ApplyResult { new_rev: self.rev, applied: ops.len(), delta });
        }

        self.board = Arc::new(next);
        self.rev += 1;
        tracing::trace!(
            rev = self.rev,
            added = delta.added.len(),
            removed = delta.removed.len(),
            updated = delta.updated.len(),
            "board snapshot replaced"
        );
        for (_, listener) in &mut self.listeners {
            listener(&self.board, &delta);
        }
        Ok(ApplyResult { new_rev: self.rev, applied: ops.len(), delta })
    }

    fn require_element(&self, element_id: &ElementId) -> Result<&Arc<Element>, ApplyError> {
        self.board
            .element(element_id)
            .ok_or_else(|| ApplyError::NotFound { entity: EntityRef::Element(element_id.clone()) })
    }

    fn require_link(&self, link_id: &LinkId) -> Result<&Arc<Link>, ApplyError> {
        self.board
            .link(link_id)
            .ok_or_else(|| ApplyError::NotFound { entity: EntityRef::Link(link_id.clone()) })
    }

    fn run(&mut self, command: Command) -> Result<Command, ApplyError> {
        self.apply_local(&command.redo_ops())?;
        Ok(command)
    }

    /// Adds elements and links in one step (paste, duplicate). Elements that name an existing
    /// parent group are appended to that group's member list.
    pub fn create(&mut self, elements: Vec<Element>, links: Vec<Link>) -> Result<Command, ApplyError> {
        let mut groups_before = BTreeMap::<ElementId, Element>::new();
        let mut groups_after = BTreeMap::<ElementId, Element>::new();
        for element in &elements {
            let Some(parent_id) = element.parent_group_id() else {
                continue;
            };
            let Some(group) = self.board.element(parent_id) else {
                continue;
            };
            groups_before.entry(parent_id.clone()).or_insert_with(|| Element::clone(group));
            let after = groups_after.entry(parent_id.clone()).or_insert_with(|| Element::clone(group));
            if !after.child_ids().contains(element.id()) {
                after.child_ids_mut().push(element.id().clone());
            }
        }

        let element_base = self.board.elements().len();
        let link_base = self.board.links().len();
        let undo = Removal {
            element_ids: elements.iter().map(|e| e.id().clone()).collect(),
            link_ids: links.iter().map(|l| l.id().clone()).collect(),
            groups: groups_before.into_values().collect(),
        };
        let redo = Restoration {
            elements: elements
                .into_iter()
                .enumerate()
                .map(|(offset, element)| IndexedElement { index: element_base + offset, element })
                .collect(),
            links: links
                .into_iter()
                .enumerate()
                .map(|(offset, link)| IndexedLink { index: link_base + offset, link })
                .collect(),
            groups: groups_after.into_values().collect(),
        };
        self.run(Command::Create { undo, redo })
    }

    pub fn create_element(&mut self, element: Element) -> Result<Command, ApplyError> {
        self.create(vec![element], Vec::new())
    }

    pub fn create_link(&mut self, link: Link) -> Result<Command, ApplyError> {
        self.create(Vec::new(), vec![link])
    }

    pub fn update_element(
        &mut self,
        element_id: &ElementId,
        patch: ElementPatch,
    ) -> Result<Command, ApplyError> {
        let undo = patch.inverse_for(self.require_element(element_id)?);
        self.run(Command::UpdateElement { element_id: element_id.clone(), undo, redo: patch })
    }

    /// Writes a batch of positions. Returns `None` when no element actually moved.
    pub fn update_element_positions(
        &mut self,
        updates: &[PositionUpdate],
    ) -> Result<Option<Command>, ApplyError> {
        let mut undo = Vec::with_capacity(updates.len());
        let mut redo = Vec::with_capacity(updates.len());
        for update in updates {
            let element = self.require_element(&update.element_id)?;
            if element.position() == update.position {
                continue;
            }
            undo.push(PositionUpdate::new(update.element_id.clone(), element.position()));
            redo.push(update.clone());
        }
        if redo.is_empty() {
            return Ok(None);
        }
        self.run(Command::Move { undo, redo }).map(Some)
    }

    /// Deletes elements together with every link touching them. Deleting a group deletes its
    /// members too; deleting a member removes it from its group's member list.
    pub fn delete_elements(&mut self, element_ids: &[ElementId]) -> Result<Command, ApplyError> {
        let mut doomed = BTreeSet::<ElementId>::new();
        for element_id in element_ids {
            let element = self.require_element(element_id)?;
            doomed.insert(element_id.clone());
            if element.is_group() {
                doomed.extend(element.child_ids().iter().cloned());
            }
        }

        let mut groups_before = BTreeMap::<ElementId, Element>::new();
        let mut groups_after = BTreeMap::<ElementId, Element>::new();
        let mut restored_elements = Vec::new();
        for (index, element) in self.board.elements().iter().enumerate() {
            if !doomed.contains(element.id()) {
                continue;
            }
            restored_elements.push(IndexedElement { index, element: Element::clone(element) });

            let Some(parent_id) = element.parent_group_id() else {
                continue;
            };
            if doomed.contains(parent_id) {
                continue;
            }
            if let Some(group) = self.board.element(parent_id) {
                groups_before.entry(parent_id.clone()).or_insert_with(|| Element::clone(group));
                groups_after
                    .entry(parent_id.clone())
                    .or_insert_with(|| Element::clone(group))
                    .child_ids_mut()
                    .retain(|id| id != element.id());
            }
        }

        let restored_links = self
            .board
            .links()
            .iter()
            .enumerate()
            .filter(|(_, link)| doomed.contains(link.from_id()) || doomed.contains(link.to_id()))
            .map(|(index, link)| IndexedLink { index, link: Link::clone(link) })
            .collect::<Vec<_>>();

        let redo = Removal {
            element_ids: restored_elements.iter().map(|e| e.element.id().clone()).collect(),
            link_ids: restored_links.iter().map(|l| l.link.id().clone()).collect(),
            groups: groups_after.into_values().collect(),
        };
        let undo = Restoration {
            elements: restored_elements,
            links: restored_links,
            groups: groups_before.into_values().collect(),
        };
        self.run(Command::Delete { undo, redo })
    }

    pub fn update_link(&mut self, link_id: &LinkId, patch: LinkPatch) -> Result<Command, ApplyError> {
        let undo = patch.inverse_for(self.require_link(link_id)?);
        self.run(Command::UpdateLink { link_id: link_id.clone(), undo, redo: patch })
    }

    pub fn delete_links(&mut self, link_ids: &[LinkId]) -> Result<Command, ApplyError> {
        let mut links = Vec::with_capacity(link_ids.len());
        for link_id in link_ids {
            self.require_link(link_id)?;
        }
        for (index, link) in self.board.links().iter().enumerate() {
            if link_ids.contains(link.id()) {
                links.push(IndexedLink { index, link: Link::clone(link) });
            }
        }
        let redo = Removal {
            link_ids: links.iter().map(|l| l.link.id().clone()).collect(),
            ..Removal::default()
        };
        let undo = Restoration { links, ..Restoration::default() };
        self.run(Command::Delete { undo, redo })
    }

    /// Wraps free-standing, non-group elements in a new group sized to their bounding box plus
    /// [`GROUP_PADDING`]. Member positions become relative to the group.
    pub fn create_group(
        &mut self,
        group_id: ElementId,
        label: impl Into<String>,
        member_ids: &[ElementId],
    ) -> Result<Command, ApplyError> {
        if member_ids.is_empty() {
            return Err(ApplyError::EmptyGroup);
        }
        if self.board.contains_element(&group_id) {
            return Err(ApplyError::AlreadyExists { entity: EntityRef::Element(group_id) });
        }

        let mut bounds: Option<Rect> = None;
        let mut absolutes = Vec::with_capacity(member_ids.len());
        for member_id in member_ids {
            let member = self.require_element(member_id)?;
            if member.is_group() {
                return Err(ApplyError::CannotGroupGroup { element_id: member_id.clone() });
            }
            if let Some(current) = member.parent_group_id() {
                return Err(ApplyError::AlreadyGrouped {
                    element_id: member_id.clone(),
                    group_id: current.clone(),
                });
            }
            let rect = self.board.absolute_rect(member);
            bounds = Some(bounds.map_or(rect, |b| b.union(&rect)));
            absolutes.push((member_id.clone(), rect.x, rect.y));
        }
        let Some(bounds) = bounds else {
            return Err(ApplyError::EmptyGroup);
        };

        let origin = Position::new(bounds.x - GROUP_PADDING, bounds.y - GROUP_PADDING);
        let group = Element::new_group(group_id.clone(), label, origin).with_custom_size(
            bounds.width + 2.0 * GROUP_PADDING,
            bounds.height + 2.0 * GROUP_PADDING,
        );
        let members = absolutes
            .into_iter()
            .map(|(element_id, x, y)| {
                let absolute = Position::new(x, y);
                MemberShift { element_id, absolute, relative: absolute.to_relative(origin) }
            })
            .collect::<Vec<_>>();

        let redo = GroupFormation { group, index: self.board.elements().len(), members: members.clone() };
        let undo = GroupDissolution { group_id, members };
        self.run(Command::Group { undo, redo })
    }

    /// Removes a group, returning its members to the canvas at their absolute positions.
    pub fn dissolve_group(&mut self, group_id: &ElementId) -> Result<Command, ApplyError> {
        let group = self.require_element(group_id)?;
        if !group.is_group() {
            return Err(ApplyError::NotAGroup { element_id: group_id.clone() });
        }
        let origin = group.position();
        let members = group
            .child_ids()
            .iter()
            .filter_map(|child_id| self.board.element(child_id))
            .map(|member| MemberShift {
                element_id: member.id().clone(),
                absolute: member.position().to_absolute(origin),
                relative: member.position(),
            })
            .collect::<Vec<_>>();
        let index = self.board.element_index(group_id).unwrap_or(0);

        let undo = GroupFormation { group: Element::clone(group), index, members: members.clone() };
        let redo = GroupDissolution { group_id: group_id.clone(), members };
        self.run(Command::Ungroup { undo, redo })
    }

    pub fn remove_from_group(&mut self, element_id: &ElementId) -> Result<Command, ApplyError> {
        let current = self.placement_of(element_id)?;
        if current.group_id().is_none() {
            return Err(ApplyError::NotInGroup { element_id: element_id.clone() });
        }
        let element = self.require_element(element_id)?;
        let redo = Placement::Free { position: self.board.absolute_position(element) };
        self.run(Command::RemoveFromGroup { element_id: element_id.clone(), undo: current, redo })
    }

    /// Moves an element into `group_id` (appended to its members), or onto the canvas for `None`.
    /// The element keeps its absolute position.
    pub fn reparent(
        &mut self,
        element_id: &ElementId,
        group_id: Option<&ElementId>,
    ) -> Result<Command, ApplyError> {
        let current = self.placement_of(element_id)?;
        let element = self.require_element(element_id)?;
        let absolute = self.board.absolute_position(element);

        let redo = match group_id {
            None => {
                if current.group_id().is_none() {
                    return Err(ApplyError::NotInGroup { element_id: element_id.clone() });
                }
                Placement::Free { position: absolute }
            }
            Some(target_id) => {
                if element.is_group() {
                    return Err(ApplyError::CannotGroupGroup { element_id: element_id.clone() });
                }
                if current.group_id() == Some(target_id) {
                    return Err(ApplyError::AlreadyGrouped {
                        element_id: element_id.clone(),
                        group_id: target_id.clone(),
                    });
                }
                let target = self.require_element(target_id)?;
                if !target.is_group() {
                    return Err(ApplyError::NotAGroup { element_id: target_id.clone() });
                }
                Placement::Grouped {
                    group_id: target_id.clone(),
                    position: absolute.to_relative(target.position()),
                    slot: target.child_ids().len(),
                }
            }
        };
        self.run(Command::Reparent { element_id: element_id.clone(), undo: current, redo })
    }

    fn placement_of(&self, element_id: &ElementId) -> Result<Placement, ApplyError> {
        let element = self.require_element(element_id)?;
        let grouped = element.parent_group_id().and_then(|parent_id| {
            let group = self.board.element(parent_id)?;
            let slot = group.child_ids().iter().position(|id| id == element_id)?;
            Some(Placement::Grouped { group_id: parent_id.clone(), position: element.position(), slot })
        });
        Ok(grouped.unwrap_or(Placement::Free { position: element.position() }))
    }

    pub fn put_asset(&mut self, asset: Asset) -> Result<ApplyResult, ApplyError> {
        self.apply_local(&[BoardOp::PutAsset { asset }])
    }

    pub fn add_comment(&mut self, comment: Comment) -> Result<ApplyResult, ApplyError> {
        self.apply_local(&[BoardOp::AddComment { comment }])
    }
}

#[cfg(test)]
mod tests;
