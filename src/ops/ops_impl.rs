// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

/// Element/link mutation helpers used by `apply_ops`.
/// Keeps `ops::mod` focused on public op types and orchestration.
fn apply_op(
    board: &mut Board,
    op: &BoardOp,
    validation: Validation,
    delta: &mut DeltaBuilder,
) -> Result<(), ApplyError> {
    match op {
        BoardOp::InsertElement { element, index } => {
            if board.contains_element(element.id()) {
                return Err(ApplyError::AlreadyExists {
                    entity: EntityRef::Element(element.id().clone()),
                });
            }
            let elements = board.elements_mut();
            let at = index.unwrap_or(elements.len()).min(elements.len());
            elements.insert(at, Arc::new(element.clone()));
            delta.record_added(EntityRef::Element(element.id().clone()));
            Ok(())
        }
        BoardOp::RemoveElement { element_id } => {
            let Some(index) = board.element_index(element_id) else {
                return Err(element_not_found(element_id));
            };
            board.elements_mut().remove(index);
            delta.record_removed(EntityRef::Element(element_id.clone()));
            Ok(())
        }
        BoardOp::ReplaceElement { element } => {
            let Some(index) = board.element_index(element.id()) else {
                return Err(element_not_found(element.id()));
            };
            board.elements_mut()[index] = Arc::new(element.clone());
            delta.record_updated(EntityRef::Element(element.id().clone()));
            Ok(())
        }
        BoardOp::PatchElement { element_id, patch } => {
            let Some(index) = board.element_index(element_id) else {
                return Err(element_not_found(element_id));
            };
            if patch.is_empty() {
                return Ok(());
            }
            let mut updated = Element::clone(&board.elements()[index]);
            apply_element_patch(&mut updated, patch);
            board.elements_mut()[index] = Arc::new(updated);
            delta.record_updated(EntityRef::Element(element_id.clone()));
            Ok(())
        }
        BoardOp::MoveElements { moves } => {
            let indices = board
                .elements()
                .iter()
                .enumerate()
                .map(|(index, element)| (element.id().clone(), index))
                .collect::<HashMap<_, _>>();

            for update in moves {
                let Some(&index) = indices.get(&update.element_id) else {
                    return Err(element_not_found(&update.element_id));
                };
                let current = &board.elements()[index];
                if current.position() == update.position {
                    continue;
                }
                let mut moved = Element::clone(current);
                moved.set_position(update.position);
                board.elements_mut()[index] = Arc::new(moved);
                delta.record_updated(EntityRef::Element(update.element_id.clone()));
            }
            Ok(())
        }
        BoardOp::AttachToGroup { element_id, group_id, position, index } => {
            let Some(element_index) = board.element_index(element_id) else {
                return Err(element_not_found(element_id));
            };
            let Some(group_index) = board.element_index(group_id) else {
                return Err(element_not_found(group_id));
            };
            let group = &board.elements()[group_index];
            if !group.is_group() {
                return Err(ApplyError::NotAGroup { element_id: group_id.clone() });
            }
            let element = &board.elements()[element_index];
            if element.is_group() {
                return Err(ApplyError::CannotGroupGroup { element_id: element_id.clone() });
            }
            if let Some(current) = element.parent_group_id() {
                return Err(ApplyError::AlreadyGrouped {
                    element_id: element_id.clone(),
                    group_id: current.clone(),
                });
            }

            let mut member = Element::clone(element);
            member.set_parent_group_id(Some(group_id.clone()));
            member.set_position(*position);

            let mut container = Element::clone(group);
            let children = container.child_ids_mut();
            children.retain(|id| id != element_id);
            let at = index.unwrap_or(children.len()).min(children.len());
            children.insert(at, element_id.clone());

            board.elements_mut()[element_index] = Arc::new(member);
            board.elements_mut()[group_index] = Arc::new(container);
            delta.record_updated(EntityRef::Element(element_id.clone()));
            delta.record_updated(EntityRef::Element(group_id.clone()));
            Ok(())
        }
        BoardOp::DetachFromGroup { element_id, position } => {
            let Some(element_index) = board.element_index(element_id) else {
                return Err(element_not_found(element_id));
            };
            let element = &board.elements()[element_index];
            let Some(group_id) = element.parent_group_id().cloned() else {
                return Err(ApplyError::NotInGroup { element_id: element_id.clone() });
            };

            let mut member = Element::clone(element);
            member.set_parent_group_id(None);
            member.set_position(*position);
            board.elements_mut()[element_index] = Arc::new(member);
            delta.record_updated(EntityRef::Element(element_id.clone()));

            // A replicated snapshot may already have lost the group; the member is freed anyway.
            if let Some(group_index) = board.element_index(&group_id) {
                let mut container = Element::clone(&board.elements()[group_index]);
                container.child_ids_mut().retain(|id| id != element_id);
                board.elements_mut()[group_index] = Arc::new(container);
                delta.record_updated(EntityRef::Element(group_id));
            }
            Ok(())
        }
        BoardOp::InsertLink { link, index } => {
            if board.link(link.id()).is_some() {
                return Err(ApplyError::AlreadyExists { entity: EntityRef::Link(link.id().clone()) });
            }
            validate_link_endpoints(board, link, validation)?;
            let links = board.links_mut();
            let at = index.unwrap_or(links.len()).min(links.len());
            links.insert(at, Arc::new(link.clone()));
            delta.record_added(EntityRef::Link(link.id().clone()));
            Ok(())
        }
        BoardOp::RemoveLink { link_id } => {
            let Some(index) = board.link_index(link_id) else {
                return Err(link_not_found(link_id));
            };
            board.links_mut().remove(index);
            delta.record_removed(EntityRef::Link(link_id.clone()));
            Ok(())
        }
        BoardOp::ReplaceLink { link } => {
            let Some(index) = board.link_index(link.id()) else {
                return Err(link_not_found(link.id()));
            };
            validate_link_endpoints(board, link, validation)?;
            board.links_mut()[index] = Arc::new(link.clone());
            delta.record_updated(EntityRef::Link(link.id().clone()));
            Ok(())
        }
        BoardOp::PatchLink { link_id, patch } => {
            let Some(index) = board.link_index(link_id) else {
                return Err(link_not_found(link_id));
            };
            if patch.is_empty() {
                return Ok(());
            }
            let mut updated = Link::clone(&board.links()[index]);
            apply_link_patch(&mut updated, patch);
            validate_link_endpoints(board, &updated, validation)?;
            board.links_mut()[index] = Arc::new(updated);
            delta.record_updated(EntityRef::Link(link_id.clone()));
            Ok(())
        }
        BoardOp::PutAsset { asset } => {
            let entity = EntityRef::Asset(asset.id().clone());
            let previous = board.assets_mut().insert(asset.id().clone(), Arc::new(asset.clone()));
            if previous.is_some() {
                delta.record_updated(entity);
            } else {
                delta.record_added(entity);
            }
            Ok(())
        }
        BoardOp::AddComment { comment } => {
            if board.comments().iter().any(|c| c.id() == comment.id()) {
                return Err(ApplyError::AlreadyExists {
                    entity: EntityRef::Comment(comment.id().clone()),
                });
            }
            if !board.contains_element(comment.element_id()) {
                return Err(element_not_found(comment.element_id()));
            }
            board.comments_mut().push(Arc::new(comment.clone()));
            delta.record_added(EntityRef::Comment(comment.id().clone()));
            Ok(())
        }
        BoardOp::RemoveComment { comment_id } => {
            let before = board.comments().len();
            board.comments_mut().retain(|c| c.id() != comment_id);
            if board.comments().len() == before {
                return Err(ApplyError::NotFound { entity: EntityRef::Comment(comment_id.clone()) });
            }
            delta.record_removed(EntityRef::Comment(comment_id.clone()));
            Ok(())
        }
    }
}

fn apply_element_patch(element: &mut Element, patch: &ElementPatch) {
    if let Some(label) = &patch.label {
        element.set_label(label.clone());
    }
    if let Some(style) = &patch.style {
        element.set_style(style.clone());
    }
    if let Some(locked) = patch.locked {
        element.set_locked(locked);
    }
    if let Some(tags) = &patch.tags {
        element.set_tags(tags.clone());
    }
    if let Some(confidence) = patch.confidence {
        element.set_confidence(confidence);
    }
    if let Some(properties) = &patch.properties {
        element.set_properties(properties.clone());
    }
    if let Some(asset_ids) = &patch.asset_ids {
        element.set_asset_ids(asset_ids.clone());
    }
}

fn apply_link_patch(link: &mut Link, patch: &LinkPatch) {
    if patch.from_id.is_some() || patch.to_id.is_some() {
        let from_id = patch.from_id.clone().unwrap_or_else(|| link.from_id().clone());
        let to_id = patch.to_id.clone().unwrap_or_else(|| link.to_id().clone());
        let mut retargeted = Link::new(link.id().clone(), from_id, to_id);
        retargeted.set_direction(link.direction());
        retargeted.set_style(link.style().clone());
        retargeted.set_curve_offset(link.curve_offset());
        retargeted.set_handles(
            link.source_handle().map(ToOwned::to_owned),
            link.target_handle().map(ToOwned::to_owned),
        );
        retargeted.set_label(link.label());
        retargeted.set_confidence(link.confidence());
        retargeted.set_properties(link.properties().to_vec());
        *link = retargeted;
    }
    if let Some(direction) = patch.direction {
        link.set_direction(direction);
    }
    if let Some(style) = &patch.style {
        link.set_style(style.clone());
    }
    if let Some(curve_offset) = patch.curve_offset {
        link.set_curve_offset(curve_offset);
    }
    if let Some((source, target)) = &patch.handles {
        link.set_handles(source.clone(), target.clone());
    }
    if let Some(label) = &patch.label {
        link.set_label(label.clone());
    }
    if let Some(confidence) = patch.confidence {
        link.set_confidence(confidence);
    }
    if let Some(properties) = &patch.properties {
        link.set_properties(properties.clone());
    }
}

/// Self links are always rejected. Missing endpoints only fail `Strict` batches; a replicated link
/// may arrive before its element, and the edge pipeline skips it until then.
fn validate_link_endpoints(board: &Board, link: &Link, validation: Validation) -> Result<(), ApplyError> {
    if link.from_id() == link.to_id() {
        return Err(ApplyError::SelfLink { link_id: link.id().clone() });
    }
    if validation == Validation::Lenient {
        return Ok(());
    }
    for endpoint in [link.from_id(), link.to_id()] {
        if !board.contains_element(endpoint) {
            return Err(ApplyError::MissingEndpoint {
                link_id: link.id().clone(),
                element_id: endpoint.clone(),
            });
        }
    }
    Ok(())
}

/// Checks group membership (both directions, one nesting level) and link endpoints.
pub fn check_integrity(board: &Board) -> Result<(), IntegrityError> {
    match integrity_violations(board).into_iter().next() {
        Some(violation) => Err(violation),
        None => Ok(()),
    }
}

/// Every membership and endpoint violation on the board, in element then link order.
pub fn integrity_violations(board: &Board) -> Vec<IntegrityError> {
    let lookup = board.element_lookup();
    let mut violations = Vec::new();

    for element in board.elements() {
        if let Some(parent_id) = element.parent_group_id() {
            match lookup.get(parent_id) {
                None => violations.push(IntegrityError::DanglingParent {
                    element_id: element.id().clone(),
                    parent_id: parent_id.clone(),
                }),
                Some(parent) => check_parent(element, parent, &mut violations),
            }
        }

        for child_id in element.child_ids() {
            let Some(child) = lookup.get(child_id) else {
                violations.push(IntegrityError::MissingChild {
                    group_id: element.id().clone(),
                    child_id: child_id.clone(),
                });
                continue;
            };
            if child.parent_group_id() != Some(element.id()) {
                violations.push(IntegrityError::ChildPointsElsewhere {
                    group_id: element.id().clone(),
                    child_id: child_id.clone(),
                });
            }
        }
    }

    for link in board.links() {
        for endpoint in [link.from_id(), link.to_id()] {
            if !lookup.contains_key(endpoint) {
                violations.push(IntegrityError::DanglingLink {
                    link_id: link.id().clone(),
                    element_id: endpoint.clone(),
                });
            }
        }
    }

    violations
}

fn check_parent(element: &Element, parent: &Element, violations: &mut Vec<IntegrityError>) {
    if !parent.is_group() {
        violations.push(IntegrityError::ParentNotAGroup {
            element_id: element.id().clone(),
            parent_id: parent.id().clone(),
        });
    }
    if element.is_group() {
        violations.push(IntegrityError::NestedGroup {
            group_id: element.id().clone(),
            parent_id: parent.id().clone(),
        });
    }
    if !parent.child_ids().contains(element.id()) {
        violations.push(IntegrityError::ChildNotListed {
            element_id: element.id().clone(),
            group_id: parent.id().clone(),
        });
    }
}

fn element_not_found(element_id: &ElementId) -> ApplyError {
    ApplyError::NotFound { entity: EntityRef::Element(element_id.clone()) }
}

fn link_not_found(link_id: &LinkId) -> ApplyError {
    ApplyError::NotFound { entity: EntityRef::Link(link_id.clone()) }
}
