// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use corkboard::clipboard;
use corkboard::history::CommandKind;
use corkboard::interact::{Axis, DragStep};
use corkboard::model::{Board, Element, ElementId, Link, LinkId, Position};
use corkboard::ops::{BoardOp, PositionUpdate};
use corkboard::view::EdgeKind;
use corkboard::{BoardView, EngineConfig, Selection};

fn eid(value: &str) -> ElementId {
    ElementId::new(value).expect("element id")
}

fn lid(value: &str) -> LinkId {
    LinkId::new(value).expect("link id")
}

fn card(id: &str, x: f64, y: f64) -> Element {
    Element::new(eid(id), id.to_uppercase(), Position::new(x, y))
}

fn link(id: &str, from: &str, to: &str) -> Link {
    Link::new(lid(id), eid(from), eid(to))
}

fn position_of(view: &BoardView, id: &str) -> Position {
    let board = view.board();
    let element = board.element(&eid(id)).unwrap_or_else(|| panic!("missing element {id}"));
    board.absolute_position(element)
}

/// Recomputes at each pending deadline until the view goes quiet.
fn drain(view: &mut BoardView) {
    for _ in 0..64 {
        let Some(deadline) = view.next_deadline() else {
            return;
        };
        view.recompute(deadline);
    }
    panic!("view never settled");
}

#[test]
fn dragging_near_a_sibling_shows_a_guide_and_snaps_on_release() {
    let board = Board::new(vec![card("e1", 0.0, 0.0), card("e2", 600.0, 400.0)], Vec::new());
    let mut view = BoardView::new(board, EngineConfig::default(), None);
    let start = Instant::now();
    view.recompute(start);

    let moved = [PositionUpdate::new(eid("e2"), Position::new(163.0, 62.0))];
    assert_eq!(view.positions_changed(&moved, true, start).expect("preview"), DragStep::Previewed);
    let frame = view.recompute(start);

    assert_eq!(frame.guides.len(), 1);
    assert_eq!(frame.guides[0].axis, Axis::X);
    assert_eq!(frame.guides[0].coordinate, 160.0);

    let later = start + Duration::from_millis(40);
    view.positions_changed(&moved, false, later).expect("release");
    let frame = view.recompute(later);

    assert!(frame.guides.is_empty());
    assert_eq!(position_of(&view, "e2"), Position::new(160.0, 62.0));
    assert_eq!(view.undo().expect("undo"), Some(CommandKind::Move));
    assert_eq!(position_of(&view, "e2"), Position::new(600.0, 400.0));
}

#[test]
fn grouping_and_ungrouping_round_trip_through_history() {
    let board = Board::new(
        vec![card("a", 0.0, 0.0), card("b", 200.0, 0.0)],
        vec![link("ab", "a", "b")],
    );
    let mut view = BoardView::new(board, EngineConfig::default(), None);
    let now = Instant::now();
    view.recompute(now);

    let kind = view.create_group(eid("g"), "Suspects", &[eid("a"), eid("b")]).expect("group");
    assert_eq!(kind, CommandKind::Group);
    let frame = view.recompute(now);
    assert_eq!(frame.nodes.len(), 3);
    assert_eq!(
        view.board().element(&eid("a")).and_then(|a| a.parent_group_id().cloned()),
        Some(eid("g"))
    );
    assert_eq!(position_of(&view, "a"), Position::new(0.0, 0.0));

    assert_eq!(view.dissolve_group(&eid("g")).expect("ungroup"), CommandKind::Ungroup);
    assert!(view.board().element(&eid("g")).is_none());
    assert_eq!(position_of(&view, "b"), Position::new(200.0, 0.0));

    assert_eq!(view.undo().expect("undo ungroup"), Some(CommandKind::Ungroup));
    assert!(view.board().element(&eid("g")).is_some());
    assert_eq!(position_of(&view, "b"), Position::new(200.0, 0.0));

    assert_eq!(view.undo().expect("undo group"), Some(CommandKind::Group));
    assert!(view.board().element(&eid("g")).is_none());
    assert_eq!(view.board().element(&eid("a")).and_then(|a| a.parent_group_id().cloned()), None);

    assert_eq!(view.redo().expect("redo"), Some(CommandKind::Group));
    let frame = view.recompute(now);
    assert_eq!(frame.nodes.len(), 3);
    assert_eq!(frame.edges.len(), 1);
}

#[test]
fn dense_boards_are_capped_and_keep_the_selected_link() {
    let elements = (0..=1000).map(|i| card(&format!("n{i}"), (i % 40) as f64 * 200.0, (i / 40) as f64 * 80.0));
    let links = (1..=1000).map(|i| link(&format!("l{i}"), "n0", &format!("n{i}")));
    let mut view = BoardView::new(Board::new(elements.collect(), links.collect()), EngineConfig::default(), None);
    view.set_selection(Selection { elements: HashSet::new(), links: HashSet::from([lid("l1000")]) });

    let frame = view.recompute(Instant::now());
    let report = frame.edge_report.clone().expect("edge report");
    assert_eq!(report.candidates, 1000);
    assert!(report.capped);
    assert!(report.simplified);
    assert_eq!(frame.edges.len(), 100);

    drain(&mut view);

    let edges = &view.frame().edges;
    assert_eq!(edges.len(), 800);
    let selected = edges.iter().find(|edge| edge.id == lid("l1000")).expect("selected link kept");
    assert_eq!(selected.kind, EdgeKind::Full);
    assert!(edges.iter().filter(|edge| !edge.selected).all(|edge| edge.kind == EdgeKind::Simple));
}

#[test]
fn remote_batches_show_up_and_dangling_links_are_not_drawn() {
    let board = Board::new(vec![card("a", 0.0, 0.0), card("b", 300.0, 0.0)], vec![link("ab", "a", "b")]);
    let mut view = BoardView::new(board, EngineConfig::default(), None);
    let now = Instant::now();
    let before = view.recompute(now).clone();

    let ops = [
        BoardOp::InsertElement { element: card("c", 600.0, 0.0), index: None },
        BoardOp::InsertLink { link: link("bc", "b", "c"), index: None },
        BoardOp::InsertLink { link: link("cx", "c", "ghost"), index: None },
    ];
    view.apply_remote(&ops, now).expect("remote batch");
    let frame = view.recompute(now);

    assert_eq!(frame.node_report.rebuilt, vec![eid("c")]);
    assert!(Arc::ptr_eq(&before.nodes[0], &frame.nodes[0]));
    let ids = frame.edges.iter().map(|edge| edge.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, vec!["ab", "bc"]);
    assert_eq!(view.history().undo_len(), 0);
}

#[test]
fn copied_selection_carries_internal_links_only() {
    let board = Board::new(
        vec![card("a", 0.0, 0.0), card("b", 200.0, 0.0), card("c", 400.0, 0.0)],
        vec![link("ab", "a", "b"), link("bc", "b", "c")],
    );
    let mut view = BoardView::new(board, EngineConfig::default(), None);
    view.set_selection(Selection { elements: HashSet::from([eid("a"), eid("b")]), links: HashSet::new() });

    let text = view.copy_selection().expect("copy");
    let payload = clipboard::decode(&text).expect("decode");

    let mut elements = payload.elements.iter().map(|entry| entry.id.as_str()).collect::<Vec<_>>();
    elements.sort_unstable();
    assert_eq!(elements, vec!["a", "b"]);
    let links = payload.links.iter().map(|entry| entry.id.as_str()).collect::<Vec<_>>();
    assert_eq!(links, vec!["ab"]);
    assert!(clipboard::decode("plain text").is_none());
}

#[test]
fn json_config_drives_the_reveal_batch() {
    let config = EngineConfig::from_json_str(r#"{"edges":{"reveal_batch":50}}"#).expect("config");
    let elements = (0..=120).map(|i| card(&format!("n{i}"), i as f64 * 10.0, 0.0));
    let links = (1..=120).map(|i| link(&format!("l{i}"), "n0", &format!("n{i}")));
    let mut view = BoardView::new(Board::new(elements.collect(), links.collect()), config, None);
    let start = Instant::now();

    assert_eq!(view.recompute(start).edges.len(), 50);
    assert_eq!(view.recompute(start + Duration::from_millis(16)).edges.len(), 100);
    assert_eq!(view.recompute(start + Duration::from_millis(32)).edges.len(), 120);
    assert_eq!(view.next_deadline(), None);
}
