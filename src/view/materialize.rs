// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Render structures + visual state → view nodes.
//!
//! The node list is patched in place whenever the visible id order is unchanged, so a selection
//! flip rebuilds exactly the nodes whose state flipped and every other node keeps its `Arc`.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{ElementId, ElementKind, Position, Size};
use crate::presence::{PresenceList, PresenceMap};

use super::structure::{RenderStructure, StructureSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagDisplay {
    Hidden,
    #[default]
    Pills,
    Dots,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSize {
    Small,
    #[default]
    Medium,
    Large,
}

/// Board-wide display options. Any change rebuilds every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DisplaySettings {
    pub theme: Theme,
    pub tag_display: TagDisplay,
    pub tag_size: TagSize,
    pub show_confidence: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewNode {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Relative to `parent_id` when set, canvas space otherwise.
    pub position: Position,
    pub parent_id: Option<ElementId>,
    pub draggable: bool,
    pub selected: bool,
    pub dimmed: bool,
    pub editing: bool,
    pub ghost: bool,
    pub presence: PresenceList,
    pub dimensions: Option<Size>,
    pub display: DisplaySettings,
    pub structure: Arc<RenderStructure>,
}

#[derive(Debug, Clone, Copy)]
pub struct VisualInputs<'a> {
    pub selected: &'a HashSet<ElementId>,
    pub dimmed: &'a HashSet<ElementId>,
    pub editing: Option<&'a ElementId>,
    /// Drag preview positions, in each element's own coordinate space.
    pub preview: &'a HashMap<ElementId, Position>,
    pub presence: &'a Arc<PresenceMap>,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaterializeReport {
    pub full_rebuild: bool,
    /// Nodes created this pass, in output order.
    pub rebuilt: Vec<ElementId>,
}

#[derive(Debug, Default)]
pub struct NodeMaterializer {
    nodes: Vec<Arc<ViewNode>>,
    structures: HashMap<ElementId, Arc<RenderStructure>>,
    selected: HashSet<ElementId>,
    dimmed: HashSet<ElementId>,
    editing: Option<ElementId>,
    preview: HashMap<ElementId, Position>,
    presence: Arc<PresenceMap>,
    ghosts: BTreeSet<ElementId>,
    display: Option<DisplaySettings>,
    measured: HashMap<ElementId, Size>,
}

impl NodeMaterializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Arc<ViewNode>] {
        &self.nodes
    }

    /// Remembers the rendered size of a node; applied to every node built for `id` from now on.
    pub fn record_measured(&mut self, id: ElementId, size: Size) {
        self.measured.insert(id, size);
    }

    pub fn forget_measured(&mut self, id: &ElementId) {
        self.measured.remove(id);
    }

    pub fn measured(&self) -> &HashMap<ElementId, Size> {
        &self.measured
    }

    pub fn materialize(&mut self, set: &StructureSet, visual: VisualInputs<'_>) -> MaterializeReport {
        let mut ordered = set.structures.iter().collect::<Vec<_>>();
        ordered.sort_by_key(|structure| !structure.element.is_group());

        let full_rebuild = self.display != Some(visual.display);
        let report = if full_rebuild {
            tracing::debug!(nodes = ordered.len(), "full node rebuild");
            let nodes = ordered
                .iter()
                .map(|structure| self.build_node(structure, set, visual))
                .collect::<Vec<_>>();
            let rebuilt = nodes.iter().map(|node| node.id.clone()).collect();
            self.nodes = nodes;
            MaterializeReport { full_rebuild: true, rebuilt }
        } else {
            let needs_rebuild = self.needs_rebuild(&ordered, set, visual);
            self.patch(&ordered, set, visual, &needs_rebuild)
        };

        self.structures = ordered.iter().map(|s| (s.id().clone(), Arc::clone(s))).collect();
        if self.selected != *visual.selected {
            self.selected = visual.selected.clone();
        }
        if self.dimmed != *visual.dimmed {
            self.dimmed = visual.dimmed.clone();
        }
        self.editing = visual.editing.cloned();
        if self.preview != *visual.preview {
            self.preview = visual.preview.clone();
        }
        self.presence = Arc::clone(visual.presence);
        self.ghosts = set.ghost_ids.clone();
        self.display = Some(visual.display);

        tracing::trace!(full = report.full_rebuild, rebuilt = report.rebuilt.len(), "nodes materialized");
        report
    }

    fn needs_rebuild(
        &self,
        ordered: &[&Arc<RenderStructure>],
        set: &StructureSet,
        visual: VisualInputs<'_>,
    ) -> HashSet<ElementId> {
        let mut needs = HashSet::new();

        for structure in ordered {
            let unchanged = self
                .structures
                .get(structure.id())
                .is_some_and(|previous| Arc::ptr_eq(previous, structure));
            if !unchanged {
                needs.insert(structure.id().clone());
            }
        }

        needs.extend(self.selected.symmetric_difference(visual.selected).cloned());
        needs.extend(self.dimmed.symmetric_difference(visual.dimmed).cloned());
        if self.editing.as_ref() != visual.editing {
            needs.extend(self.editing.iter().cloned());
            needs.extend(visual.editing.cloned());
        }
        for (id, position) in visual.preview {
            if self.preview.get(id) != Some(position) {
                needs.insert(id.clone());
            }
        }
        needs.extend(self.preview.keys().filter(|id| !visual.preview.contains_key(*id)).cloned());
        if !Arc::ptr_eq(&self.presence, visual.presence) {
            needs.extend(self.presence.changed_elements(visual.presence).into_iter().cloned());
        }
        needs.extend(self.ghosts.symmetric_difference(&set.ghost_ids).cloned());
        needs
    }

    fn patch(
        &mut self,
        ordered: &[&Arc<RenderStructure>],
        set: &StructureSet,
        visual: VisualInputs<'_>,
        needs_rebuild: &HashSet<ElementId>,
    ) -> MaterializeReport {
        let same_order = ordered.len() == self.nodes.len()
            && ordered.iter().zip(&self.nodes).all(|(structure, node)| structure.id() == &node.id);

        let mut rebuilt = Vec::new();
        if same_order {
            for index in 0..ordered.len() {
                let structure = ordered[index];
                if needs_rebuild.contains(structure.id()) {
                    let node = self.build_node(structure, set, visual);
                    self.nodes[index] = node;
                    rebuilt.push(structure.id().clone());
                }
            }
        } else {
            let mut previous = std::mem::take(&mut self.nodes)
                .into_iter()
                .map(|node| (node.id.clone(), node))
                .collect::<HashMap<_, _>>();
            let mut nodes = Vec::with_capacity(ordered.len());
            for structure in ordered {
                let reusable = previous.remove(structure.id()).filter(|_| !needs_rebuild.contains(structure.id()));
                match reusable {
                    Some(node) => nodes.push(node),
                    None => {
                        nodes.push(self.build_node(structure, set, visual));
                        rebuilt.push(structure.id().clone());
                    }
                }
            }
            self.nodes = nodes;
        }
        MaterializeReport { full_rebuild: false, rebuilt }
    }

    fn build_node(
        &self,
        structure: &Arc<RenderStructure>,
        set: &StructureSet,
        visual: VisualInputs<'_>,
    ) -> Arc<ViewNode> {
        let element = &structure.element;
        let id = element.id();

        let mut position = visual.preview.get(id).copied().unwrap_or_else(|| element.position());
        if !position.is_finite() {
            tracing::warn!(element = %id, x = position.x, y = position.y, "non-finite position; using origin");
            position = Position::ORIGIN;
        }

        let dimensions = self.measured.get(id).copied().or_else(|| {
            let style = element.style();
            style.custom_width.zip(style.custom_height).map(|(width, height)| Size::new(width, height))
        });

        Arc::new(ViewNode {
            id: id.clone(),
            kind: element.kind(),
            position,
            parent_id: structure.parent_group_id.clone(),
            draggable: !element.is_locked(),
            selected: visual.selected.contains(id),
            dimmed: visual.dimmed.contains(id),
            editing: visual.editing == Some(id),
            ghost: set.ghost_ids.contains(id),
            presence: visual.presence.element(id).iter().cloned().collect::<PresenceList>(),
            dimensions,
            display: visual.display,
            structure: Arc::clone(structure),
        })
    }
}
