// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde::{Deserialize, Serialize};

use super::element::Property;
use super::ids::{ElementId, LinkId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkDirection {
    #[default]
    None,
    Forward,
    Backward,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkStyle {
    pub color: Option<String>,
    pub thickness: f64,
    pub dash: DashStyle,
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self { color: None, thickness: 2.0, dash: DashStyle::Solid }
    }
}

/// A relation between two elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    id: LinkId,
    from_id: ElementId,
    to_id: ElementId,
    #[serde(default)]
    direction: LinkDirection,
    #[serde(default)]
    style: LinkStyle,
    #[serde(default)]
    curve_offset: Option<f64>,
    #[serde(default)]
    source_handle: Option<String>,
    #[serde(default)]
    target_handle: Option<String>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    properties: Vec<Property>,
}

impl Link {
    pub fn new(id: LinkId, from_id: ElementId, to_id: ElementId) -> Self {
        Self {
            id,
            from_id,
            to_id,
            direction: LinkDirection::None,
            style: LinkStyle::default(),
            curve_offset: None,
            source_handle: None,
            target_handle: None,
            label: None,
            confidence: None,
            properties: Vec::new(),
        }
    }

    pub fn with_direction(mut self, direction: LinkDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_handles<S: Into<String>, T: Into<String>>(
        mut self,
        source_handle: Option<S>,
        target_handle: Option<T>,
    ) -> Self {
        self.source_handle = source_handle.map(Into::into);
        self.target_handle = target_handle.map(Into::into);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn id(&self) -> &LinkId {
        &self.id
    }

    pub fn from_id(&self) -> &ElementId {
        &self.from_id
    }

    pub fn to_id(&self) -> &ElementId {
        &self.to_id
    }

    pub fn touches(&self, element_id: &ElementId) -> bool {
        &self.from_id == element_id || &self.to_id == element_id
    }

    pub fn direction(&self) -> LinkDirection {
        self.direction
    }

    pub fn set_direction(&mut self, direction: LinkDirection) {
        self.direction = direction;
    }

    pub fn style(&self) -> &LinkStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: LinkStyle) {
        self.style = style;
    }

    pub fn curve_offset(&self) -> Option<f64> {
        self.curve_offset
    }

    pub fn set_curve_offset(&mut self, curve_offset: Option<f64>) {
        self.curve_offset = curve_offset;
    }

    pub fn source_handle(&self) -> Option<&str> {
        self.source_handle.as_deref()
    }

    pub fn target_handle(&self) -> Option<&str> {
        self.target_handle.as_deref()
    }

    pub fn set_handles(&mut self, source_handle: Option<String>, target_handle: Option<String>) {
        self.source_handle = source_handle;
        self.target_handle = target_handle;
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label<T: Into<String>>(&mut self, label: Option<T>) {
        self.label = label.map(Into::into);
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
}
