// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::time::{Duration, Instant};

use rstest::{fixture, rstest};

use super::{DragController, DragPhase, DragStep, PositionBroadcast};
use crate::config::{CollaborationConfig, InteractionConfig};
use crate::history::{Command, CommandKind, History};
use crate::interact::guides::Axis;
use crate::model::fixtures::{card, chain_board, eid};
use crate::model::{Board, Position};
use crate::ops::PositionUpdate;
use crate::store::BoardStore;

struct Rig {
    store: BoardStore,
    history: History,
    drag: DragController,
    start: Instant,
}

impl Rig {
    fn new(board: Board) -> Self {
        Self {
            store: BoardStore::new(board),
            history: History::default(),
            drag: DragController::new(InteractionConfig::default(), &CollaborationConfig::default()),
            start: Instant::now(),
        }
    }

    fn at(&self, millis: u64) -> Instant {
        self.start + Duration::from_millis(millis)
    }

    fn change(&mut self, id: &str, x: f64, y: f64, live: bool, millis: u64) -> DragStep {
        let now = self.at(millis);
        self.drag
            .positions_changed(
                &mut self.store,
                &mut self.history,
                &[PositionUpdate::new(eid(id), Position::new(x, y))],
                live,
                now,
            )
            .expect("position change")
    }

    fn stored(&self, id: &str) -> Position {
        self.store.board().element(&eid(id)).expect("element").position()
    }
}

#[fixture]
fn rig() -> Rig {
    Rig::new(chain_board(4))
}

/// `e1` at the origin; `e2` parked far away so only the dragged position matters.
#[fixture]
fn pair() -> Rig {
    Rig::new(Board::new(vec![card("e1", 0.0, 0.0), card("e2", 600.0, 400.0)], Vec::new()))
}

#[rstest]
fn live_changes_only_touch_the_preview(mut rig: Rig) {
    let before = rig.store.snapshot();

    assert_eq!(rig.change("n1", 250.0, 30.0, true, 0), DragStep::Previewed);
    assert_eq!(rig.change("n1", 260.0, 35.0, true, 16), DragStep::Previewed);

    assert_eq!(rig.drag.phase(), DragPhase::Dragging);
    assert_eq!(rig.drag.preview()[&eid("n1")], Position::new(260.0, 35.0));
    assert!(std::sync::Arc::ptr_eq(&before, rig.store.board()));
    assert_eq!(rig.store.rev(), 0);
}

#[rstest]
fn release_commits_one_batch_with_pre_drag_positions(mut rig: Rig) {
    rig.change("n1", 250.0, 80.0, true, 0);
    rig.change("n2", 450.0, 80.0, true, 5);

    let step = rig.change("n2", 470.0, 90.0, false, 40);

    assert_eq!(step, DragStep::Committed { recorded: true });
    assert_eq!(rig.drag.phase(), DragPhase::Idle);
    assert!(rig.drag.preview().is_empty());
    assert!(rig.drag.dragging().is_empty());
    assert_eq!(rig.store.rev(), 1);
    assert_eq!(rig.stored("n1"), Position::new(250.0, 80.0));
    assert_eq!(rig.stored("n2"), Position::new(470.0, 90.0));

    let Some(Command::Move { undo, .. }) = rig.history.peek_undo() else {
        panic!("expected a move command");
    };
    assert_eq!(
        undo,
        &vec![
            PositionUpdate::new(eid("n1"), Position::new(200.0, 0.0)),
            PositionUpdate::new(eid("n2"), Position::new(400.0, 0.0)),
        ]
    );

    assert_eq!(rig.history.undo(&mut rig.store).expect("undo"), Some(CommandKind::Move));
    assert_eq!(rig.stored("n2"), Position::new(400.0, 0.0));
}

#[rstest]
fn release_snaps_to_the_first_guide(mut pair: Rig) {
    pair.change("e2", 163.0, 62.0, true, 0);

    let guides = pair.drag.guides().to_vec();
    assert_eq!(guides.len(), 1);
    assert_eq!((guides[0].axis, guides[0].coordinate), (Axis::X, 160.0));

    pair.change("e2", 163.0, 62.0, false, 20);

    assert_eq!(pair.stored("e2"), Position::new(160.0, 62.0));
    assert!(pair.drag.guides().is_empty());
}

#[test]
fn snapping_can_be_disabled() {
    let mut rig = Rig::new(Board::new(vec![card("e1", 0.0, 0.0), card("e2", 600.0, 400.0)], Vec::new()));
    rig.drag = DragController::new(
        InteractionConfig { snap_to_guides: false, ..InteractionConfig::default() },
        &CollaborationConfig::default(),
    );

    rig.change("e2", 163.0, 62.0, true, 0);
    rig.change("e2", 163.0, 62.0, false, 20);

    assert_eq!(rig.stored("e2"), Position::new(163.0, 62.0));
}

#[rstest]
fn guides_are_throttled(mut pair: Rig) {
    pair.change("e2", 300.0, 300.0, true, 0);
    assert!(pair.drag.guides().is_empty());

    pair.change("e2", 163.0, 62.0, true, 50);
    assert!(pair.drag.guides().is_empty(), "inside the 100ms window");

    pair.change("e2", 163.0, 62.0, true, 100);
    assert_eq!(pair.drag.guides().len(), 1);
}

#[rstest]
fn multi_node_drags_have_no_guides(mut pair: Rig) {
    pair.change("e2", 163.0, 62.0, true, 0);
    assert_eq!(pair.drag.guides().len(), 1);

    pair.change("e1", 0.0, 200.0, true, 200);

    assert!(pair.drag.guides().is_empty());
}

#[test]
fn locked_elements_are_never_moved() {
    let mut rig = Rig::new(Board::new(
        vec![card("pinned", 0.0, 0.0).with_locked(true), card("free", 300.0, 0.0)],
        Vec::new(),
    ));

    assert_eq!(rig.change("pinned", 50.0, 50.0, true, 0), DragStep::Ignored);
    assert_eq!(rig.drag.phase(), DragPhase::Idle);

    let step = rig
        .drag
        .positions_changed(
            &mut rig.store,
            &mut rig.history,
            &[
                PositionUpdate::new(eid("pinned"), Position::new(9.0, 9.0)),
                PositionUpdate::new(eid("free"), Position::new(320.0, 10.0)),
            ],
            false,
            rig.start,
        )
        .expect("nudge");

    assert_eq!(step, DragStep::Committed { recorded: true });
    assert_eq!(rig.stored("pinned"), Position::new(0.0, 0.0));
    assert_eq!(rig.stored("free"), Position::new(320.0, 10.0));
}

#[rstest]
fn idle_non_live_change_commits_immediately(mut rig: Rig) {
    let step = rig.change("n0", 0.0, 10.0, false, 0);

    assert_eq!(step, DragStep::Committed { recorded: true });
    assert_eq!(rig.drag.phase(), DragPhase::Idle);
    assert_eq!(rig.history.undo_len(), 1);
    assert_eq!(rig.stored("n0"), Position::new(0.0, 10.0));
}

#[rstest]
fn release_without_movement_records_nothing(mut rig: Rig) {
    rig.change("n3", 610.0, 0.0, true, 0);

    let step = rig.change("n3", 600.0, 0.0, false, 30);

    assert_eq!(step, DragStep::Committed { recorded: false });
    assert_eq!(rig.history.undo_len(), 0);
    assert_eq!(rig.store.rev(), 0);
}

#[rstest]
fn abort_discards_the_gesture(mut rig: Rig) {
    rig.change("n1", 999.0, 999.0, true, 0);

    let board = rig.store.snapshot();
    rig.drag.abort(&board);

    assert_eq!(rig.drag.phase(), DragPhase::Idle);
    assert!(rig.drag.preview().is_empty());
    assert!(rig.drag.guides().is_empty());
    assert_eq!(rig.stored("n1"), Position::new(200.0, 0.0));
    assert_eq!(rig.history.undo_len(), 0);
    assert!(rig.drag.take_broadcasts().is_empty());
}

#[rstest]
fn broadcasts_only_in_shared_mode(mut rig: Rig) {
    rig.change("n1", 210.0, 0.0, true, 0);
    rig.change("n1", 220.0, 0.0, false, 10);

    assert!(rig.drag.take_broadcasts().is_empty());
}

#[rstest]
fn shared_broadcasts_are_throttled_and_settle_on_release(mut rig: Rig) {
    rig.drag.set_shared(true);

    rig.change("n1", 210.0, 0.0, true, 0);
    rig.change("n1", 220.0, 0.0, true, 50);
    rig.change("n1", 230.0, 0.0, true, 100);
    let first = rig.drag.take_broadcasts();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].positions, vec![PositionUpdate::new(eid("n1"), Position::new(210.0, 0.0))]);
    assert_eq!(rig.drag.deadline(), Some(rig.at(200)));

    rig.drag.poll(rig.at(150));
    assert!(rig.drag.take_broadcasts().is_empty());
    rig.drag.poll(rig.at(200));
    assert_eq!(
        rig.drag.take_broadcasts(),
        vec![PositionBroadcast {
            positions: vec![PositionUpdate::new(eid("n1"), Position::new(230.0, 0.0))],
            settled: false,
        }]
    );

    rig.change("n1", 240.0, 0.0, false, 220);
    let last = rig.drag.take_broadcasts();
    assert_eq!(last.len(), 1);
    assert!(last[0].settled);
    assert_eq!(last[0].positions, vec![PositionUpdate::new(eid("n1"), Position::new(240.0, 0.0))]);
    assert_eq!(rig.drag.deadline(), None);
}

#[rstest]
fn shared_abort_restores_stored_positions_remotely(mut rig: Rig) {
    rig.drag.set_shared(true);
    rig.change("n2", 999.0, 0.0, true, 0);
    rig.drag.take_broadcasts();

    let board = rig.store.snapshot();
    rig.drag.abort(&board);

    let messages = rig.drag.take_broadcasts();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].settled);
    assert_eq!(messages[0].positions, vec![PositionUpdate::new(eid("n2"), Position::new(400.0, 0.0))]);
}
