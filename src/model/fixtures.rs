// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::board::{Board, Comment};
use super::element::Element;
use super::geometry::Position;
use super::ids::{CommentId, ElementId, LinkId};
use super::link::Link;

pub(crate) fn eid(value: &str) -> ElementId {
    ElementId::new(value).expect("element id")
}

pub(crate) fn lid(value: &str) -> LinkId {
    LinkId::new(value).expect("link id")
}

pub(crate) fn card(id: &str, x: f64, y: f64) -> Element {
    Element::new(eid(id), id.to_uppercase(), Position::new(x, y))
}

pub(crate) fn link(id: &str, from: &str, to: &str) -> Link {
    Link::new(lid(id), eid(from), eid(to))
}

/// `g1` at (100, 100) holding `m1` and `m2`; `f1` is free-standing and linked to `m1`.
pub(crate) fn grouped_board() -> Board {
    let mut group = Element::new_group(eid("g1"), "Cluster", Position::new(100.0, 100.0))
        .with_custom_size(400.0, 300.0);
    group.child_ids_mut().extend([eid("m1"), eid("m2")]);

    let mut m1 = card("m1", 20.0, 40.0);
    m1.set_parent_group_id(Some(eid("g1")));
    let mut m2 = card("m2", 200.0, 40.0);
    m2.set_parent_group_id(Some(eid("g1")));

    let f1 = card("f1", 600.0, 0.0);

    Board::new(vec![group, m1, m2, f1], vec![link("l1", "m1", "f1")])
}

pub(crate) fn commented_board() -> Board {
    Board::new(vec![card("a", 0.0, 0.0), card("b", 300.0, 0.0)], vec![link("ab", "a", "b")])
        .with_comments(vec![
            Comment::new(CommentId::new("c1").expect("comment id"), eid("a"), "seen at 9pm"),
            Comment::new(CommentId::new("c2").expect("comment id"), eid("a"), "alibi?"),
        ])
}

/// `n` cards in a row, 200px apart, each linked to the next (`l0`, `l1`, ...).
pub(crate) fn chain_board(n: usize) -> Board {
    let elements = (0..n).map(|i| card(&format!("n{i}"), i as f64 * 200.0, 0.0)).collect();
    let links = (1..n)
        .map(|i| link(&format!("l{}", i - 1), &format!("n{}", i - 1), &format!("n{i}")))
        .collect();
    Board::new(elements, links)
}
