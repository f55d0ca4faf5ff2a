// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::geometry::{Position, Size, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH};
use super::ids::{AssetId, ElementId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    #[default]
    Normal,
    Group,
    Annotation,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementStyle {
    pub color: Option<String>,
    pub border: Option<String>,
    pub shape: Option<String>,
    pub size: Option<String>,
    pub custom_width: Option<f64>,
    pub custom_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// A board entity: a plain card, a group container or an annotation.
///
/// Positions of group members are stored relative to the owning group. The group owns the member
/// list (`child_ids`); members only keep the `parent_group_id` back-reference. Both sides are kept
/// consistent by the store's grouping operations, never by editing either side directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    id: ElementId,
    label: String,
    position: Position,
    kind: ElementKind,
    #[serde(default)]
    style: ElementStyle,
    #[serde(default)]
    parent_group_id: Option<ElementId>,
    #[serde(default)]
    child_ids: Vec<ElementId>,
    #[serde(default)]
    locked: bool,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    properties: Vec<Property>,
    #[serde(default)]
    asset_ids: Vec<AssetId>,
}

impl Element {
    pub fn new(id: ElementId, label: impl Into<String>, position: Position) -> Self {
        Self {
            id,
            label: label.into(),
            position,
            kind: ElementKind::Normal,
            style: ElementStyle::default(),
            parent_group_id: None,
            child_ids: Vec::new(),
            locked: false,
            tags: Vec::new(),
            confidence: None,
            properties: Vec::new(),
            asset_ids: Vec::new(),
        }
    }

    pub fn new_group(id: ElementId, label: impl Into<String>, position: Position) -> Self {
        Self { kind: ElementKind::Group, ..Self::new(id, label, position) }
    }

    pub fn with_kind(mut self, kind: ElementKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_style(mut self, style: ElementStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_custom_size(mut self, width: f64, height: f64) -> Self {
        self.style.custom_width = Some(width);
        self.style.custom_height = Some(height);
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_properties(mut self, properties: Vec<Property>) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_asset_ids(mut self, asset_ids: Vec<AssetId>) -> Self {
        self.asset_ids = asset_ids;
        self
    }

    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn is_group(&self) -> bool {
        self.kind == ElementKind::Group
    }

    pub fn style(&self) -> &ElementStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: ElementStyle) {
        self.style = style;
    }

    /// Stored custom dimensions, falling back to the default card size per axis.
    pub fn size(&self) -> Size {
        Size {
            width: self.style.custom_width.unwrap_or(DEFAULT_NODE_WIDTH),
            height: self.style.custom_height.unwrap_or(DEFAULT_NODE_HEIGHT),
        }
    }

    pub fn parent_group_id(&self) -> Option<&ElementId> {
        self.parent_group_id.as_ref()
    }

    pub(crate) fn set_parent_group_id(&mut self, parent_group_id: Option<ElementId>) {
        self.parent_group_id = parent_group_id;
    }

    pub fn child_ids(&self) -> &[ElementId] {
        &self.child_ids
    }

    pub(crate) fn child_ids_mut(&mut self) -> &mut Vec<ElementId> {
        &mut self.child_ids
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn set_tags(&mut self, tags: Vec<String>) {
        self.tags = tags;
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn set_confidence(&mut self, confidence: Option<f64>) {
        self.confidence = confidence;
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn set_properties(&mut self, properties: Vec<Property>) {
        self.properties = properties;
    }

    pub fn asset_ids(&self) -> &[AssetId] {
        &self.asset_ids
    }

    pub fn set_asset_ids(&mut self, asset_ids: Vec<AssetId>) {
        self.asset_ids = asset_ids;
    }
}
