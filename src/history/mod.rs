// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Linear undo/redo.
//!
//! Commands are produced by the store's mutation API and pushed here after they were applied.
//! Undo and redo replay a command's payload as ordinary store ops, so a replay goes through the
//! same validation as a fresh edit.

mod command;

use std::collections::VecDeque;

use crate::ops::ApplyError;
use crate::store::BoardStore;

pub use command::{
    Command, CommandKind, GroupDissolution, GroupFormation, IndexedElement, IndexedLink,
    MemberShift, Placement, Removal, Restoration,
};

pub const DEFAULT_HISTORY_LIMIT: usize = 200;

#[derive(Debug)]
pub struct History {
    undo: VecDeque<Command>,
    redo: Vec<Command>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self { undo: VecDeque::new(), redo: Vec::new(), limit: limit.max(1) }
    }

    /// Records an applied command. Clears the redo side and drops the oldest entry past the limit.
    pub fn push(&mut self, command: Command) {
        self.redo.clear();
        self.undo.push_back(command);
        while self.undo.len() > self.limit {
            if let Some(dropped) = self.undo.pop_front() {
                tracing::debug!(kind = ?dropped.kind(), limit = self.limit, "oldest history entry dropped");
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn peek_undo(&self) -> Option<&Command> {
        self.undo.back()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Reverts the most recent command. `Ok(None)` when there is nothing to undo.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the inverse no longer applies (for example after a remote
    /// edit removed the entity). Both stacks are left as they were.
    pub fn undo(&mut self, store: &mut BoardStore) -> Result<Option<CommandKind>, ApplyError> {
        let Some(command) = self.undo.pop_back() else {
            return Ok(None);
        };
        if let Err(err) = store.apply_local(&command.undo_ops()) {
            self.undo.push_back(command);
            return Err(err);
        }
        let kind = command.kind();
        self.redo.push(command);
        Ok(Some(kind))
    }

    /// Replays the most recently undone command. `Ok(None)` when there is nothing to redo.
    ///
    /// # Errors
    ///
    /// Same contract as [`History::undo`].
    pub fn redo(&mut self, store: &mut BoardStore) -> Result<Option<CommandKind>, ApplyError> {
        let Some(command) = self.redo.pop() else {
            return Ok(None);
        };
        if let Err(err) = store.apply_local(&command.redo_ops()) {
            self.redo.push(command);
            return Err(err);
        }
        let kind = command.kind();
        self.undo.push_back(command);
        Ok(Some(kind))
    }
}
