// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use rstest::{fixture, rstest};

use crate::history::{Command, CommandKind};
use crate::model::fixtures::{card, chain_board, eid, grouped_board, lid, link};
use crate::model::{Element, Position};
use crate::ops::{ApplyError, BoardOp, ElementPatch, EntityRef, IntegrityError, PositionUpdate};

use super::{BoardStore, GROUP_PADDING};

#[fixture]
fn grouped_store() -> BoardStore {
    BoardStore::new(grouped_board())
}

#[fixture]
fn chain_store() -> BoardStore {
    BoardStore::new(chain_board(4))
}

fn ids(store: &BoardStore) -> Vec<String> {
    store.board().elements().iter().map(|e| e.id().to_string()).collect()
}

#[rstest]
fn subscribers_see_every_applied_batch_until_unsubscribed(mut chain_store: BoardStore) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let subscription = chain_store.subscribe(move |board, delta| {
        sink.borrow_mut().push((board.elements().len(), delta.updated.len()));
    });

    chain_store
        .update_element(&eid("n0"), ElementPatch::label("Suspect"))
        .expect("update");
    assert_eq!(*seen.borrow(), vec![(4, 1)]);

    assert!(chain_store.unsubscribe(subscription));
    assert!(!chain_store.unsubscribe(subscription));
    chain_store
        .update_element(&eid("n1"), ElementPatch::label("Witness"))
        .expect("update");
    assert_eq!(seen.borrow().len(), 1);
}

#[rstest]
fn stale_base_rev_is_a_conflict(mut chain_store: BoardStore) {
    let ops = [BoardOp::PatchElement { element_id: eid("n0"), patch: ElementPatch::label("x") }];
    chain_store.apply(0, &ops).expect("first apply");

    let err = chain_store.apply(0, &ops).unwrap_err();
    assert_eq!(err, ApplyError::Conflict { base_rev: 0, current_rev: 1 });
}

#[rstest]
fn no_op_batches_keep_snapshot_and_revision(mut chain_store: BoardStore) {
    let before = chain_store.snapshot();

    let moved = chain_store
        .update_element_positions(&[PositionUpdate::new(eid("n1"), Position::new(200.0, 0.0))])
        .expect("positions");

    assert!(moved.is_none());
    assert_eq!(chain_store.rev(), 0);
    assert!(Arc::ptr_eq(&before, chain_store.board()));
}

#[rstest]
fn position_batch_records_only_moved_elements(mut chain_store: BoardStore) {
    let command = chain_store
        .update_element_positions(&[
            PositionUpdate::new(eid("n0"), Position::new(0.0, 0.0)),
            PositionUpdate::new(eid("n1"), Position::new(210.0, 15.0)),
        ])
        .expect("positions")
        .expect("something moved");

    let Command::Move { undo, redo } = command else {
        panic!("expected a move command");
    };
    assert_eq!(undo, vec![PositionUpdate::new(eid("n1"), Position::new(200.0, 0.0))]);
    assert_eq!(redo, vec![PositionUpdate::new(eid("n1"), Position::new(210.0, 15.0))]);
}

#[rstest]
fn deleting_an_element_cascades_to_its_links(mut chain_store: BoardStore) {
    let command = chain_store.delete_elements(&[eid("n1")]).expect("delete");

    assert_eq!(command.kind(), CommandKind::Delete);
    assert_eq!(ids(&chain_store), vec!["n0", "n2", "n3"]);
    let links = chain_store.board().links().iter().map(|l| l.id().to_string()).collect::<Vec<_>>();
    assert_eq!(links, vec!["l2"]);
}

#[rstest]
fn deleting_a_group_deletes_its_members(mut grouped_store: BoardStore) {
    grouped_store.delete_elements(&[eid("g1")]).expect("delete group");

    assert_eq!(ids(&grouped_store), vec!["f1"]);
    assert!(grouped_store.board().links().is_empty());
}

#[rstest]
fn deleting_a_member_updates_the_group_member_list(mut grouped_store: BoardStore) {
    grouped_store.delete_elements(&[eid("m2")]).expect("delete member");

    let group = grouped_store.board().element(&eid("g1")).expect("group");
    assert_eq!(group.child_ids(), &[eid("m1")]);
}

#[rstest]
fn create_group_wraps_members_and_converts_to_relative(mut chain_store: BoardStore) {
    chain_store
        .create_group(eid("g"), "Ring", &[eid("n1"), eid("n2")])
        .expect("group");

    let board = chain_store.board();
    let group = board.element(&eid("g")).expect("group");
    assert!(group.is_group());
    assert_eq!(group.position(), Position::new(200.0 - GROUP_PADDING, -GROUP_PADDING));
    assert_eq!(group.size().width, 360.0 + 2.0 * GROUP_PADDING);
    assert_eq!(group.size().height, 40.0 + 2.0 * GROUP_PADDING);
    assert_eq!(group.child_ids(), &[eid("n1"), eid("n2")]);

    let n2 = board.element(&eid("n2")).expect("n2");
    assert_eq!(n2.parent_group_id(), Some(&eid("g")));
    assert_eq!(n2.position(), Position::new(200.0 + GROUP_PADDING, GROUP_PADDING));
    assert_eq!(board.absolute_position(n2), Position::new(400.0, 0.0));
}

#[rstest]
#[case::empty(&[], ApplyError::EmptyGroup)]
#[case::grouped(&["m1"], ApplyError::AlreadyGrouped { element_id: eid("m1"), group_id: eid("g1") })]
#[case::nested(&["g1"], ApplyError::CannotGroupGroup { element_id: eid("g1") })]
#[case::missing(&["nope"], ApplyError::NotFound { entity: EntityRef::Element(eid("nope")) })]
fn create_group_rejects_invalid_members(
    mut grouped_store: BoardStore,
    #[case] members: &[&str],
    #[case] expected: ApplyError,
) {
    let members = members.iter().map(|id| eid(id)).collect::<Vec<_>>();
    let err = grouped_store.create_group(eid("g2"), "Other", &members).unwrap_err();
    assert_eq!(err, expected);
    assert_eq!(grouped_store.rev(), 0);
}

#[rstest]
fn dissolve_group_restores_absolute_positions(mut grouped_store: BoardStore) {
    grouped_store.dissolve_group(&eid("g1")).expect("dissolve");

    let board = grouped_store.board();
    assert!(board.element(&eid("g1")).is_none());
    let m1 = board.element(&eid("m1")).expect("m1");
    assert_eq!(m1.parent_group_id(), None);
    assert_eq!(m1.position(), Position::new(120.0, 140.0));
}

#[rstest]
fn remove_from_group_keeps_absolute_position(mut grouped_store: BoardStore) {
    grouped_store.remove_from_group(&eid("m2")).expect("remove");

    let board = grouped_store.board();
    assert_eq!(board.element(&eid("g1")).expect("g1").child_ids(), &[eid("m1")]);
    assert_eq!(board.element(&eid("m2")).expect("m2").position(), Position::new(300.0, 140.0));

    let err = grouped_store.remove_from_group(&eid("m2")).unwrap_err();
    assert_eq!(err, ApplyError::NotInGroup { element_id: eid("m2") });
}

#[rstest]
fn reparent_moves_free_element_into_group(mut grouped_store: BoardStore) {
    grouped_store.reparent(&eid("f1"), Some(&eid("g1"))).expect("reparent");

    let board = grouped_store.board();
    let f1 = board.element(&eid("f1")).expect("f1");
    assert_eq!(f1.parent_group_id(), Some(&eid("g1")));
    assert_eq!(f1.position(), Position::new(500.0, -100.0));
    assert_eq!(
        board.element(&eid("g1")).expect("g1").child_ids(),
        &[eid("m1"), eid("m2"), eid("f1")]
    );
}

#[rstest]
fn reparent_rejects_non_group_target(mut grouped_store: BoardStore) {
    let err = grouped_store.reparent(&eid("m1"), Some(&eid("f1"))).unwrap_err();
    assert_eq!(err, ApplyError::NotAGroup { element_id: eid("f1") });
}

#[rstest]
fn create_link_validates_endpoints(mut chain_store: BoardStore) {
    chain_store.create_link(link("back", "n3", "n0")).expect("link");
    assert!(chain_store.board().link(&lid("back")).is_some());

    let err = chain_store.create_link(link("dangling", "n0", "zz")).unwrap_err();
    assert_eq!(err, ApplyError::MissingEndpoint { link_id: lid("dangling"), element_id: eid("zz") });
}

#[rstest]
fn create_element_inside_group_updates_member_list(mut grouped_store: BoardStore) {
    let mut member = card("m3", 10.0, 10.0);
    member.set_parent_group_id(Some(eid("g1")));

    grouped_store.create_element(member).expect("create");

    let group = grouped_store.board().element(&eid("g1")).expect("g1");
    assert_eq!(group.child_ids(), &[eid("m1"), eid("m2"), eid("m3")]);
}

#[rstest]
fn create_element_with_missing_parent_fails_integrity(mut chain_store: BoardStore) {
    let mut orphan = card("o", 0.0, 0.0);
    orphan.set_parent_group_id(Some(eid("nowhere")));

    let err = chain_store.create_element(orphan).unwrap_err();
    assert_eq!(
        err,
        ApplyError::Integrity(IntegrityError::DanglingParent {
            element_id: eid("o"),
            parent_id: eid("nowhere"),
        })
    );
}

#[rstest]
fn remote_batches_skip_integrity_checks(mut grouped_store: BoardStore) {
    let mut stray = Element::clone(grouped_store.board().element(&eid("m1")).expect("m1"));
    stray.set_parent_group_id(Some(eid("f1")));

    grouped_store.apply_remote(&[BoardOp::ReplaceElement { element: stray }]).expect("remote");
    assert_eq!(grouped_store.rev(), 1);
}

#[rstest]
fn local_edits_still_work_after_a_remote_batch_leaves_dangling_links(mut chain_store: BoardStore) {
    chain_store.apply_remote(&[BoardOp::RemoveElement { element_id: eid("n1") }]).expect("remote");

    let nudge = chain_store
        .update_element_positions(&[PositionUpdate::new(eid("n3"), Position::new(610.0, 5.0))])
        .expect("nudge unrelated element")
        .expect("moved");
    assert_eq!(nudge.kind(), CommandKind::Move);
    chain_store.create_element(card("z", 0.0, 300.0)).expect("create");
    assert!(chain_store.board().contains_element(&eid("z")));

    let err = chain_store.create_link(link("fresh", "n3", "n1")).unwrap_err();
    assert_eq!(err, ApplyError::MissingEndpoint { link_id: lid("fresh"), element_id: eid("n1") });
}
