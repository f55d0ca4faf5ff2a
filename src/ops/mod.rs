// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Primitive board mutations.
//!
//! Operations are applied to a snapshot and produce a *new* snapshot plus a minimal delta. The
//! store's higher-level API (grouping, cascading deletes) and the history stack are both expressed
//! in terms of these primitives.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{
    Asset, AssetId, Board, Comment, CommentId, Element, ElementId, ElementStyle, Link,
    LinkDirection, LinkId, LinkStyle, Position, Property,
};

#[derive(Debug, Clone, PartialEq)]
pub enum BoardOp {
    InsertElement { element: Element, index: Option<usize> },
    RemoveElement { element_id: ElementId },
    ReplaceElement { element: Element },
    PatchElement { element_id: ElementId, patch: ElementPatch },
    MoveElements { moves: Vec<PositionUpdate> },
    /// Makes `element_id` a member of `group_id`, updating both sides of the membership.
    /// `position` is group-relative; `index` is the slot in the group's member list.
    AttachToGroup {
        element_id: ElementId,
        group_id: ElementId,
        position: Position,
        index: Option<usize>,
    },
    /// Removes `element_id` from its group, updating both sides; `position` is in canvas space.
    DetachFromGroup { element_id: ElementId, position: Position },
    InsertLink { link: Link, index: Option<usize> },
    RemoveLink { link_id: LinkId },
    ReplaceLink { link: Link },
    PatchLink { link_id: LinkId, patch: LinkPatch },
    PutAsset { asset: Asset },
    AddComment { comment: Comment },
    RemoveComment { comment_id: CommentId },
}

/// A single element's new position, in the coordinate space of its parent (canvas space for
/// free-standing elements, group-relative for members).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate {
    pub element_id: ElementId,
    pub position: Position,
}

impl PositionUpdate {
    pub fn new(element_id: ElementId, position: Position) -> Self {
        Self { element_id, position }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub label: Option<String>,
    pub style: Option<ElementStyle>,
    pub locked: Option<bool>,
    pub tags: Option<Vec<String>>,
    pub confidence: Option<Option<f64>>,
    pub properties: Option<Vec<Property>>,
    pub asset_ids: Option<Vec<AssetId>>,
}

impl ElementPatch {
    pub fn label(label: impl Into<String>) -> Self {
        Self { label: Some(label.into()), ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The patch that restores `element`'s current values for every field this patch touches.
    pub fn inverse_for(&self, element: &Element) -> Self {
        Self {
            label: self.label.as_ref().map(|_| element.label().to_owned()),
            style: self.style.as_ref().map(|_| element.style().clone()),
            locked: self.locked.map(|_| element.is_locked()),
            tags: self.tags.as_ref().map(|_| element.tags().to_vec()),
            confidence: self.confidence.map(|_| element.confidence()),
            properties: self.properties.as_ref().map(|_| element.properties().to_vec()),
            asset_ids: self.asset_ids.as_ref().map(|_| element.asset_ids().to_vec()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkPatch {
    pub from_id: Option<ElementId>,
    pub to_id: Option<ElementId>,
    pub direction: Option<LinkDirection>,
    pub style: Option<LinkStyle>,
    pub curve_offset: Option<Option<f64>>,
    pub handles: Option<(Option<String>, Option<String>)>,
    pub label: Option<Option<String>>,
    pub confidence: Option<Option<f64>>,
    pub properties: Option<Vec<Property>>,
}

impl LinkPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn inverse_for(&self, link: &Link) -> Self {
        Self {
            from_id: self.from_id.as_ref().map(|_| link.from_id().clone()),
            to_id: self.to_id.as_ref().map(|_| link.to_id().clone()),
            direction: self.direction.map(|_| link.direction()),
            style: self.style.as_ref().map(|_| link.style().clone()),
            curve_offset: self.curve_offset.map(|_| link.curve_offset()),
            handles: self.handles.as_ref().map(|_| {
                (
                    link.source_handle().map(ToOwned::to_owned),
                    link.target_handle().map(ToOwned::to_owned),
                )
            }),
            label: self.label.as_ref().map(|_| link.label().map(ToOwned::to_owned)),
            confidence: self.confidence.map(|_| link.confidence()),
            properties: self.properties.as_ref().map(|_| link.properties().to_vec()),
        }
    }
}

/// Stable reference to any board entity, used in deltas and errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityRef {
    Element(ElementId),
    Link(LinkId),
    Asset(AssetId),
    Comment(CommentId),
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(id) => write!(f, "element {id}"),
            Self::Link(id) => write!(f, "link {id}"),
            Self::Asset(id) => write!(f, "asset {id}"),
            Self::Comment(id) => write!(f, "comment {id}"),
        }
    }
}

/// Minimal delta describing which entities changed as the result of applying ops.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<EntityRef>,
    pub removed: Vec<EntityRef>,
    pub updated: Vec<EntityRef>,
    /// Every applied op only moved elements.
    pub positions_only: bool,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }
}

#[derive(Debug, Default)]
struct DeltaBuilder {
    added: BTreeSet<EntityRef>,
    removed: BTreeSet<EntityRef>,
    updated: BTreeSet<EntityRef>,
}

impl DeltaBuilder {
    fn record_added(&mut self, entity: EntityRef) {
        self.removed.remove(&entity);
        self.updated.remove(&entity);
        self.added.insert(entity);
    }

    fn record_removed(&mut self, entity: EntityRef) {
        self.added.remove(&entity);
        self.updated.remove(&entity);
        self.removed.insert(entity);
    }

    fn record_updated(&mut self, entity: EntityRef) {
        if self.added.contains(&entity) || self.removed.contains(&entity) {
            return;
        }
        self.updated.insert(entity);
    }

    fn finish(self, positions_only: bool) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
            positions_only,
        }
    }
}

/// How strictly a batch is checked after it has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Local edits: group membership and link endpoints must be consistent afterwards.
    Strict,
    /// Replicated edits: accepted as delivered; the view layer corrects what it cannot render.
    Lenient,
}

/// Applies `ops` to `board`, returning the next snapshot and the delta.
///
/// Entities untouched by the batch keep their `Arc` identity in the returned snapshot. On error
/// the input snapshot is unaffected. `Strict` batches fail only on integrity violations they
/// introduce; inconsistencies already on the board (left by replicated edits) do not block them.
pub fn apply_ops(
    board: &Board,
    ops: &[BoardOp],
    validation: Validation,
) -> Result<(Board, Delta), ApplyError> {
    let mut next = board.clone();
    let mut delta = DeltaBuilder::default();

    for op in ops {
        apply_op(&mut next, op, validation, &mut delta)?;
    }

    if validation == Validation::Strict {
        if let Some(violation) = first_new_violation(board, &next) {
            return Err(violation.into());
        }
    }

    let positions_only = !ops.is_empty() && ops.iter().all(|op| matches!(op, BoardOp::MoveElements { .. }));
    Ok((next, delta.finish(positions_only)))
}

fn first_new_violation(before: &Board, after: &Board) -> Option<IntegrityError> {
    let violations = integrity_violations(after);
    if violations.is_empty() {
        return None;
    }
    let existing = integrity_violations(before).into_iter().collect::<HashSet<_>>();
    violations.into_iter().find(|violation| !existing.contains(violation))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IntegrityError {
    DanglingParent { element_id: ElementId, parent_id: ElementId },
    ParentNotAGroup { element_id: ElementId, parent_id: ElementId },
    NestedGroup { group_id: ElementId, parent_id: ElementId },
    ChildNotListed { element_id: ElementId, group_id: ElementId },
    MissingChild { group_id: ElementId, child_id: ElementId },
    ChildPointsElsewhere { group_id: ElementId, child_id: ElementId },
    DanglingLink { link_id: LinkId, element_id: ElementId },
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingParent { element_id, parent_id } => {
                write!(f, "element {element_id} references missing group {parent_id}")
            }
            Self::ParentNotAGroup { element_id, parent_id } => {
                write!(f, "element {element_id} references non-group parent {parent_id}")
            }
            Self::NestedGroup { group_id, parent_id } => {
                write!(f, "group {group_id} cannot be nested inside group {parent_id}")
            }
            Self::ChildNotListed { element_id, group_id } => {
                write!(f, "group {group_id} does not list member {element_id}")
            }
            Self::MissingChild { group_id, child_id } => {
                write!(f, "group {group_id} lists missing member {child_id}")
            }
            Self::ChildPointsElsewhere { group_id, child_id } => {
                write!(f, "group {group_id} lists {child_id}, which belongs elsewhere")
            }
            Self::DanglingLink { link_id, element_id } => {
                write!(f, "link {link_id} references missing element {element_id}")
            }
        }
    }
}

impl std::error::Error for IntegrityError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyError {
    Conflict { base_rev: u64, current_rev: u64 },
    AlreadyExists { entity: EntityRef },
    NotFound { entity: EntityRef },
    SelfLink { link_id: LinkId },
    MissingEndpoint { link_id: LinkId, element_id: ElementId },
    NotAGroup { element_id: ElementId },
    CannotGroupGroup { element_id: ElementId },
    AlreadyGrouped { element_id: ElementId, group_id: ElementId },
    NotInGroup { element_id: ElementId },
    EmptyGroup,
    Integrity(IntegrityError),
}

impl fmt::Display for ApplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { base_rev, current_rev } => {
                write!(f, "stale base_rev (base_rev={base_rev}, current_rev={current_rev})")
            }
            Self::AlreadyExists { entity } => write!(f, "{entity} already exists"),
            Self::NotFound { entity } => write!(f, "{entity} not found"),
            Self::SelfLink { link_id } => {
                write!(f, "link {link_id} connects an element to itself")
            }
            Self::MissingEndpoint { link_id, element_id } => {
                write!(f, "link {link_id} endpoint {element_id} does not exist")
            }
            Self::NotAGroup { element_id } => write!(f, "element {element_id} is not a group"),
            Self::CannotGroupGroup { element_id } => {
                write!(f, "group {element_id} cannot be placed inside another group")
            }
            Self::AlreadyGrouped { element_id, group_id } => {
                write!(f, "element {element_id} already belongs to group {group_id}")
            }
            Self::NotInGroup { element_id } => {
                write!(f, "element {element_id} does not belong to a group")
            }
            Self::EmptyGroup => f.write_str("a group needs at least one member"),
            Self::Integrity(err) => write!(f, "integrity violation: {err}"),
        }
    }
}

impl std::error::Error for ApplyError {}

impl From<IntegrityError> for ApplyError {
    fn from(err: IntegrityError) -> Self {
        Self::Integrity(err)
    }
}

// Extracted op-application implementation for element/link mutations.
include!("ops_impl.rs");
