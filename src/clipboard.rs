// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Clipboard interchange: a marker line followed by a JSON payload.
//!
//! Text without the marker came from somewhere else and decodes to `None`.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{Board, ElementId, LinkId};

pub const CLIPBOARD_MARKER: &str = "corkboard/clipboard;v1\n";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardEntry {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClipboardPayload {
    #[serde(default)]
    pub elements: Vec<ClipboardEntry>,
    #[serde(default)]
    pub links: Vec<ClipboardEntry>,
}

#[derive(Debug)]
pub enum ClipboardError {
    Encode(serde_json::Error),
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode clipboard payload: {err}"),
        }
    }
}

impl std::error::Error for ClipboardError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
        }
    }
}

/// Escapes characters that delimit structure in labels pasted into other tools.
pub fn escape_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' | '|' | '{' | '}' | '[' | ']' => {
                out.push('\\');
                out.push(ch);
            }
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn unescape_label(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Payload for the selected elements plus every link that is selected or joins two selected
/// elements. Entries follow board order.
pub fn copy_selection(
    board: &Board,
    selected_elements: &HashSet<ElementId>,
    selected_links: &HashSet<LinkId>,
) -> ClipboardPayload {
    let elements = board
        .elements()
        .iter()
        .filter(|element| selected_elements.contains(element.id()))
        .map(|element| ClipboardEntry {
            id: element.id().to_string(),
            label: escape_label(element.label()),
        })
        .collect();
    let links = board
        .links()
        .iter()
        .filter(|link| {
            selected_links.contains(link.id())
                || (selected_elements.contains(link.from_id()) && selected_elements.contains(link.to_id()))
        })
        .map(|link| ClipboardEntry {
            id: link.id().to_string(),
            label: escape_label(link.label().unwrap_or_default()),
        })
        .collect();
    ClipboardPayload { elements, links }
}

pub fn encode(payload: &ClipboardPayload) -> Result<String, ClipboardError> {
    let json = serde_json::to_string(payload).map_err(ClipboardError::Encode)?;
    Ok(format!("{CLIPBOARD_MARKER}{json}"))
}

/// Parses clipboard text written by [`encode`]. Labels are returned escaped, as written.
pub fn decode(text: &str) -> Option<ClipboardPayload> {
    let json = text.strip_prefix(CLIPBOARD_MARKER)?;
    match serde_json::from_str(json) {
        Ok(payload) => Some(payload),
        Err(err) => {
            tracing::debug!(error = %err, "clipboard marker present but payload unreadable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::{copy_selection, decode, encode, escape_label, unescape_label, CLIPBOARD_MARKER};
    use crate::model::fixtures::{card, eid, grouped_board, lid, link};
    use crate::model::Board;

    #[rstest]
    #[case::plain("Suspect A", "Suspect A")]
    #[case::pipes("a|b", "a\\|b")]
    #[case::brackets("[x]{y}", "\\[x\\]\\{y\\}")]
    #[case::backslash("C:\\temp", "C:\\\\temp")]
    #[case::whitespace("line\nnext\tcol", "line\\nnext\\tcol")]
    fn escapes_structural_delimiters(#[case] raw: &str, #[case] escaped: &str) {
        assert_eq!(escape_label(raw), escaped);
        assert_eq!(unescape_label(escaped), raw);
    }

    #[test]
    fn copy_keeps_links_between_selected_elements() {
        let board = grouped_board();
        let selected = HashSet::from([eid("m1"), eid("f1")]);

        let payload = copy_selection(&board, &selected, &HashSet::new());

        let ids = payload.elements.iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["m1", "f1"]);
        assert_eq!(payload.links.len(), 1);
        assert_eq!(payload.links[0].id, "l1");
    }

    #[test]
    fn explicitly_selected_links_are_copied() {
        let board = grouped_board();
        let payload = copy_selection(&board, &HashSet::from([eid("m1")]), &HashSet::from([lid("l1")]));
        assert_eq!(payload.links.len(), 1);
    }

    #[test]
    fn encoded_text_decodes_with_escaped_labels() {
        let board = Board::new(
            vec![card("a", 0.0, 0.0), card("b", 200.0, 0.0)],
            vec![link("ab", "a", "b").with_label("paid | owes {100}")],
        );
        let selected = HashSet::from([eid("a"), eid("b")]);
        let text = encode(&copy_selection(&board, &selected, &HashSet::new())).expect("encode");

        assert!(text.starts_with(CLIPBOARD_MARKER));
        let payload = decode(&text).expect("internal payload");
        assert_eq!(payload.links[0].label, "paid \\| owes \\{100\\}");
        assert_eq!(unescape_label(&payload.links[0].label), "paid | owes {100}");
    }

    #[rstest]
    #[case::prose("just some notes from an email")]
    #[case::json_without_marker(r#"{"elements":[],"links":[]}"#)]
    #[case::marker_with_garbage("corkboard/clipboard;v1\n{not json")]
    fn foreign_text_is_not_a_payload(#[case] text: &str) {
        assert_eq!(decode(text), None);
    }
}
