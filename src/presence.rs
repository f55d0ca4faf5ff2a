// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Collaborator presence.
//!
//! Inbound [`RemoteUser`] records are folded into per-entity lists; an unchanged fold hands back
//! the previous `Arc` so the materializer and edge cache can skip presence entirely. Outbound
//! [`LocalPresence`] goes through [`PresenceBroadcaster`], which drops repeats and throttles.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::interact::throttle::Throttled;
use crate::model::{ElementId, LinkId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub selection: Vec<ElementId>,
    #[serde(default)]
    pub dragging: Vec<ElementId>,
    #[serde(default)]
    pub link_selection: Vec<LinkId>,
    #[serde(default)]
    pub editing: Option<ElementId>,
    #[serde(default)]
    pub editing_link: Option<LinkId>,
}

/// One collaborator's marker on one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    pub user_id: UserId,
    pub name: String,
    pub color: String,
    pub dragging: bool,
    pub editing: bool,
}

pub type PresenceList = SmallVec<[PresenceEntry; 2]>;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PresenceMap {
    elements: BTreeMap<ElementId, PresenceList>,
    links: BTreeMap<LinkId, PresenceList>,
}

impl PresenceMap {
    /// Folds `users` into per-entity lists, in user-id order.
    pub fn fold<'a>(users: impl IntoIterator<Item = &'a RemoteUser>) -> Self {
        let mut users = users.into_iter().collect::<Vec<_>>();
        users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        users.dedup_by(|a, b| a.user_id == b.user_id);

        let mut map = Self::default();
        for user in users {
            let mut touched = Vec::new();
            touched.extend(user.selection.iter());
            touched.extend(user.dragging.iter());
            touched.extend(user.editing.iter());
            touched.sort();
            touched.dedup();
            for element_id in touched {
                map.elements.entry(element_id.clone()).or_default().push(PresenceEntry {
                    user_id: user.user_id.clone(),
                    name: user.name.clone(),
                    color: user.color.clone(),
                    dragging: user.dragging.contains(element_id),
                    editing: user.editing.as_ref() == Some(element_id),
                });
            }

            let mut links = user.link_selection.iter().chain(user.editing_link.iter()).collect::<Vec<_>>();
            links.sort();
            links.dedup();
            for link_id in links {
                map.links.entry(link_id.clone()).or_default().push(PresenceEntry {
                    user_id: user.user_id.clone(),
                    name: user.name.clone(),
                    color: user.color.clone(),
                    dragging: false,
                    editing: user.editing_link.as_ref() == Some(link_id),
                });
            }
        }
        map
    }

    pub fn element(&self, element_id: &ElementId) -> &[PresenceEntry] {
        self.elements.get(element_id).map(|list| list.as_slice()).unwrap_or(&[])
    }

    pub fn link(&self, link_id: &LinkId) -> &[PresenceEntry] {
        self.links.get(link_id).map(|list| list.as_slice()).unwrap_or(&[])
    }

    pub fn element_ids(&self) -> impl Iterator<Item = &ElementId> {
        self.elements.keys()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.links.is_empty()
    }

    /// Element ids whose presence lists differ between `self` and `other`, including ids
    /// present on only one side.
    pub fn changed_elements<'a>(&'a self, other: &'a PresenceMap) -> Vec<&'a ElementId> {
        let mut changed = self
            .elements
            .iter()
            .filter(|(id, list)| other.elements.get(*id) != Some(*list))
            .map(|(id, _)| id)
            .collect::<Vec<_>>();
        changed.extend(other.elements.keys().filter(|id| !self.elements.contains_key(*id)));
        changed
    }
}

/// Keeps the last folded map and returns it again when a new fold is equal.
#[derive(Debug, Default)]
pub struct PresenceMerger {
    local_user: Option<UserId>,
    current: Arc<PresenceMap>,
}

impl PresenceMerger {
    /// `local_user`'s own record, if echoed back by the transport, is ignored.
    pub fn new(local_user: Option<UserId>) -> Self {
        Self { local_user, current: Arc::default() }
    }

    pub fn current(&self) -> &Arc<PresenceMap> {
        &self.current
    }

    pub fn merge(&mut self, users: &[RemoteUser]) -> Arc<PresenceMap> {
        let local = self.local_user.as_ref();
        let next = PresenceMap::fold(users.iter().filter(|user| Some(&user.user_id) != local));
        if *self.current != next {
            tracing::trace!(elements = next.elements.len(), links = next.links.len(), "presence changed");
            self.current = Arc::new(next);
        }
        Arc::clone(&self.current)
    }
}

/// What the local user advertises to collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LocalPresence {
    pub selection: Vec<ElementId>,
    pub link_selection: Vec<LinkId>,
    pub dragging: Vec<ElementId>,
    pub editing: Option<ElementId>,
    pub editing_link: Option<LinkId>,
}

#[derive(Debug)]
pub struct PresenceBroadcaster {
    outbox: Throttled<LocalPresence>,
    last_sent: Option<LocalPresence>,
}

impl PresenceBroadcaster {
    pub fn new(interval: Duration) -> Self {
        Self { outbox: Throttled::new(interval), last_sent: None }
    }

    /// Offers the current local presence; returns it if it should go out now.
    pub fn update(&mut self, presence: LocalPresence, now: Instant) -> Option<LocalPresence> {
        if self.last_sent.as_ref() == Some(&presence) {
            self.outbox.flush();
            return None;
        }
        let sent = self.outbox.offer(presence, now)?;
        self.last_sent = Some(sent.clone());
        Some(sent)
    }

    pub fn poll(&mut self, now: Instant) -> Option<LocalPresence> {
        let sent = self.outbox.poll(now)?;
        self.last_sent = Some(sent.clone());
        Some(sent)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.outbox.deadline()
    }
}
