// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Element, ElementId, Link, LinkId, Position};
use crate::ops::{BoardOp, ElementPatch, LinkPatch, PositionUpdate};

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedElement {
    pub index: usize,
    pub element: Element,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexedLink {
    pub index: usize,
    pub link: Link,
}

/// Puts a set of entities (back) on the board at their recorded indices.
///
/// `groups` are full snapshots of groups whose member list must match the restored state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Restoration {
    pub elements: Vec<IndexedElement>,
    pub links: Vec<IndexedLink>,
    pub groups: Vec<Element>,
}

impl Restoration {
    fn ops(&self) -> Vec<BoardOp> {
        let mut elements = self.elements.iter().collect::<Vec<_>>();
        elements.sort_by_key(|entry| entry.index);
        let mut links = self.links.iter().collect::<Vec<_>>();
        links.sort_by_key(|entry| entry.index);

        let mut ops = Vec::with_capacity(elements.len() + links.len() + self.groups.len());
        ops.extend(elements.into_iter().map(|entry| BoardOp::InsertElement {
            element: entry.element.clone(),
            index: Some(entry.index),
        }));
        ops.extend(
            links
                .into_iter()
                .map(|entry| BoardOp::InsertLink { link: entry.link.clone(), index: Some(entry.index) }),
        );
        ops.extend(self.groups.iter().map(|group| BoardOp::ReplaceElement { element: group.clone() }));
        ops
    }
}

/// Takes the same set of entities off the board again.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Removal {
    pub element_ids: Vec<ElementId>,
    pub link_ids: Vec<LinkId>,
    pub groups: Vec<Element>,
}

impl Removal {
    fn ops(&self) -> Vec<BoardOp> {
        let mut ops = Vec::with_capacity(self.element_ids.len() + self.link_ids.len() + self.groups.len());
        ops.extend(self.link_ids.iter().map(|link_id| BoardOp::RemoveLink { link_id: link_id.clone() }));
        ops.extend(self.groups.iter().map(|group| BoardOp::ReplaceElement { element: group.clone() }));
        ops.extend(
            self.element_ids
                .iter()
                .map(|element_id| BoardOp::RemoveElement { element_id: element_id.clone() }),
        );
        ops
    }
}

/// A member's position in both coordinate spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberShift {
    pub element_id: ElementId,
    pub absolute: Position,
    pub relative: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupFormation {
    /// Group snapshot; its member list is rebuilt from `members`.
    pub group: Element,
    pub index: usize,
    pub members: Vec<MemberShift>,
}

impl GroupFormation {
    fn ops(&self) -> Vec<BoardOp> {
        let mut group = self.group.clone();
        group.child_ids_mut().clear();

        let mut ops = vec![BoardOp::InsertElement { element: group, index: Some(self.index) }];
        ops.extend(self.members.iter().enumerate().map(|(slot, member)| BoardOp::AttachToGroup {
            element_id: member.element_id.clone(),
            group_id: self.group.id().clone(),
            position: member.relative,
            index: Some(slot),
        }));
        ops
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupDissolution {
    pub group_id: ElementId,
    pub members: Vec<MemberShift>,
}

impl GroupDissolution {
    fn ops(&self) -> Vec<BoardOp> {
        let mut ops = self
            .members
            .iter()
            .map(|member| BoardOp::DetachFromGroup {
                element_id: member.element_id.clone(),
                position: member.absolute,
            })
            .collect::<Vec<_>>();
        ops.push(BoardOp::RemoveElement { element_id: self.group_id.clone() });
        ops
    }
}

/// Where a single element sits: free on the canvas or inside a group.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    Free { position: Position },
    Grouped { group_id: ElementId, position: Position, slot: usize },
}

impl Placement {
    pub fn position(&self) -> Position {
        match self {
            Self::Free { position } | Self::Grouped { position, .. } => *position,
        }
    }

    pub fn group_id(&self) -> Option<&ElementId> {
        match self {
            Self::Free { .. } => None,
            Self::Grouped { group_id, .. } => Some(group_id),
        }
    }
}

/// Ops that move `element_id` from placement `from` to placement `to`.
fn placement_ops(element_id: &ElementId, from: &Placement, to: &Placement) -> Vec<BoardOp> {
    let mut ops = Vec::with_capacity(2);
    match (from, to) {
        (Placement::Free { .. }, Placement::Free { position }) => {
            ops.push(BoardOp::MoveElements {
                moves: vec![PositionUpdate::new(element_id.clone(), *position)],
            });
        }
        (Placement::Grouped { .. }, Placement::Free { position }) => {
            ops.push(BoardOp::DetachFromGroup { element_id: element_id.clone(), position: *position });
        }
        (from, Placement::Grouped { group_id, position, slot }) => {
            if from.group_id().is_some() {
                ops.push(BoardOp::DetachFromGroup { element_id: element_id.clone(), position: *position });
            }
            ops.push(BoardOp::AttachToGroup {
                element_id: element_id.clone(),
                group_id: group_id.clone(),
                position: *position,
                index: Some(*slot),
            });
        }
    }
    ops
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Create,
    Delete,
    Move,
    UpdateElement,
    UpdateLink,
    Group,
    Ungroup,
    RemoveFromGroup,
    Reparent,
}

/// One undoable user action. Each variant carries exactly what its two directions need.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create { undo: Removal, redo: Restoration },
    Delete { undo: Restoration, redo: Removal },
    Move { undo: Vec<PositionUpdate>, redo: Vec<PositionUpdate> },
    UpdateElement { element_id: ElementId, undo: ElementPatch, redo: ElementPatch },
    UpdateLink { link_id: LinkId, undo: LinkPatch, redo: LinkPatch },
    Group { undo: GroupDissolution, redo: GroupFormation },
    Ungroup { undo: GroupFormation, redo: GroupDissolution },
    RemoveFromGroup { element_id: ElementId, undo: Placement, redo: Placement },
    Reparent { element_id: ElementId, undo: Placement, redo: Placement },
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Create { .. } => CommandKind::Create,
            Self::Delete { .. } => CommandKind::Delete,
            Self::Move { .. } => CommandKind::Move,
            Self::UpdateElement { .. } => CommandKind::UpdateElement,
            Self::UpdateLink { .. } => CommandKind::UpdateLink,
            Self::Group { .. } => CommandKind::Group,
            Self::Ungroup { .. } => CommandKind::Ungroup,
            Self::RemoveFromGroup { .. } => CommandKind::RemoveFromGroup,
            Self::Reparent { .. } => CommandKind::Reparent,
        }
    }

    pub fn undo_ops(&self) -> Vec<BoardOp> {
        match self {
            Self::Create { undo, .. } => undo.ops(),
            Self::Delete { undo, .. } => undo.ops(),
            Self::Move { undo, .. } => vec![BoardOp::MoveElements { moves: undo.clone() }],
            Self::UpdateElement { element_id, undo, .. } => {
                vec![BoardOp::PatchElement { element_id: element_id.clone(), patch: undo.clone() }]
            }
            Self::UpdateLink { link_id, undo, .. } => {
                vec![BoardOp::PatchLink { link_id: link_id.clone(), patch: undo.clone() }]
            }
            Self::Group { undo, .. } => undo.ops(),
            Self::Ungroup { undo, .. } => undo.ops(),
            Self::RemoveFromGroup { element_id, undo, redo }
            | Self::Reparent { element_id, undo, redo } => placement_ops(element_id, redo, undo),
        }
    }

    pub fn redo_ops(&self) -> Vec<BoardOp> {
        match self {
            Self::Create { redo, .. } => redo.ops(),
            Self::Delete { redo, .. } => redo.ops(),
            Self::Move { redo, .. } => vec![BoardOp::MoveElements { moves: redo.clone() }],
            Self::UpdateElement { element_id, redo, .. } => {
                vec![BoardOp::PatchElement { element_id: element_id.clone(), patch: redo.clone() }]
            }
            Self::UpdateLink { link_id, redo, .. } => {
                vec![BoardOp::PatchLink { link_id: link_id.clone(), patch: redo.clone() }]
            }
            Self::Group { redo, .. } => redo.ops(),
            Self::Ungroup { redo, .. } => redo.ops(),
            Self::RemoveFromGroup { element_id, undo, redo }
            | Self::Reparent { element_id, undo, redo } => placement_ops(element_id, undo, redo),
        }
    }
}
