// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use corkboard::model::{Board, Element, ElementId, Link, LinkId, Position, Property};

fn ascii_repeat_to_len(base: &str, fill: char, len: usize) -> String {
    let mut out = base.to_owned();
    while out.len() < len {
        out.push(fill);
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub columns: usize,
    pub rows: usize,
    /// Links from each card to cards in the next column.
    pub fanout: usize,
    /// Extra links from each card to cards two or more columns away.
    pub cross_links: usize,
    pub label_len: usize,
    pub properties: usize,
}

impl Params {
    pub const fn new(
        columns: usize,
        rows: usize,
        fanout: usize,
        cross_links: usize,
        label_len: usize,
        properties: usize,
    ) -> Self {
        Self { columns, rows, fanout, cross_links, label_len, properties }
    }

    pub const fn elements(self) -> usize {
        self.columns * self.rows
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    MediumDense,
    LargeLongLabels,
}

impl Case {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::MediumDense => "medium_dense",
            Self::LargeLongLabels => "large_long_labels",
        }
    }

    pub const fn params(self) -> Params {
        match self {
            Self::Small => Params::new(8, 10, 2, 0, 12, 2),
            Self::MediumDense => Params::new(20, 25, 3, 1, 16, 4),
            Self::LargeLongLabels => Params::new(40, 50, 3, 2, 64, 6),
        }
    }
}

pub fn element_id(column: usize, row: usize) -> ElementId {
    ElementId::new(format!("c{column:03}_r{row:03}")).expect("valid element id")
}

fn link_id(index: usize) -> LinkId {
    LinkId::new(format!("k{index:06}")).expect("valid link id")
}

/// Cards on a 220 x 120 grid, linked column to column.
pub fn board(params: Params) -> Board {
    assert!(params.columns >= 2, "columns must be >= 2");
    assert!(params.rows >= 1, "rows must be >= 1");

    let mut elements = Vec::with_capacity(params.elements());
    for column in 0..params.columns {
        for row in 0..params.rows {
            let base = format!("Card {column}/{row}");
            let properties = (0..params.properties)
                .map(|i| Property::new(format!("key{i}"), format!("value {column}.{row}.{i}")))
                .collect();
            elements.push(
                Element::new(
                    element_id(column, row),
                    ascii_repeat_to_len(&base, '.', params.label_len),
                    Position::new(column as f64 * 220.0, row as f64 * 120.0),
                )
                .with_properties(properties)
                .with_confidence(((column * 7 + row * 13) % 100) as f64),
            );
        }
    }

    let mut links = Vec::new();
    let fanout = params.fanout.min(params.rows);
    for column in 0..params.columns - 1 {
        for row in 0..params.rows {
            let from = element_id(column, row);
            for k in 0..fanout {
                let to = element_id(column + 1, (row + k) % params.rows);
                links.push(Link::new(link_id(links.len()), from.clone(), to).with_label("linked"));
            }
            if column + 2 >= params.columns {
                continue;
            }
            let reachable = params.columns - (column + 2);
            for k in 0..params.cross_links {
                let to = element_id(column + 2 + k % reachable, (row + 1 + k * 3) % params.rows);
                links.push(Link::new(link_id(links.len()), from.clone(), to));
            }
        }
    }

    Board::new(elements, links)
}

pub fn fixture(case: Case) -> Board {
    board(case.params())
}
