// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::element::Element;
use super::geometry::{Position, Rect};
use super::ids::{AssetId, CommentId, ElementId, LinkId};
use super::link::Link;

/// An uploaded file attached to elements. Only the metadata and the (optional) small thumbnail
/// live on the board; full-resolution bytes are fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    id: AssetId,
    name: String,
    mime_type: String,
    thumbnail: Option<Arc<[u8]>>,
}

impl Asset {
    pub fn new(id: AssetId, name: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self { id, name: name.into(), mime_type: mime_type.into(), thumbnail: None }
    }

    pub fn with_thumbnail(mut self, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.thumbnail = Some(bytes.into());
        self
    }

    pub fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    pub fn thumbnail(&self) -> Option<&Arc<[u8]>> {
        self.thumbnail.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id: CommentId,
    element_id: ElementId,
    body: String,
}

impl Comment {
    pub fn new(id: CommentId, element_id: ElementId, body: impl Into<String>) -> Self {
        Self { id, element_id, body: body.into() }
    }

    pub fn id(&self) -> &CommentId {
        &self.id
    }

    pub fn element_id(&self) -> &ElementId {
        &self.element_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

pub type AssetTable = BTreeMap<AssetId, Arc<Asset>>;

/// Immutable snapshot of the board.
///
/// Every mutation produces a new `Board` whose unchanged entities are the *same* `Arc`s as in
/// the previous snapshot. The reconciliation caches rely on this: an entity whose `Arc` pointer is
/// unchanged is treated as unchanged without comparing its content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Board {
    elements: Vec<Arc<Element>>,
    links: Vec<Arc<Link>>,
    assets: Arc<AssetTable>,
    comments: Vec<Arc<Comment>>,
}

impl Board {
    pub fn new(elements: Vec<Element>, links: Vec<Link>) -> Self {
        Self {
            elements: elements.into_iter().map(Arc::new).collect(),
            links: links.into_iter().map(Arc::new).collect(),
            assets: Arc::default(),
            comments: Vec::new(),
        }
    }

    pub fn with_assets(mut self, assets: Vec<Asset>) -> Self {
        self.assets = Arc::new(assets.into_iter().map(|a| (a.id().clone(), Arc::new(a))).collect());
        self
    }

    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = comments.into_iter().map(Arc::new).collect();
        self
    }

    pub fn elements(&self) -> &[Arc<Element>] {
        &self.elements
    }

    pub(crate) fn elements_mut(&mut self) -> &mut Vec<Arc<Element>> {
        &mut self.elements
    }

    pub fn links(&self) -> &[Arc<Link>] {
        &self.links
    }

    pub(crate) fn links_mut(&mut self) -> &mut Vec<Arc<Link>> {
        &mut self.links
    }

    pub fn assets(&self) -> &Arc<AssetTable> {
        &self.assets
    }

    pub(crate) fn assets_mut(&mut self) -> &mut AssetTable {
        Arc::make_mut(&mut self.assets)
    }

    pub fn comments(&self) -> &[Arc<Comment>] {
        &self.comments
    }

    pub(crate) fn comments_mut(&mut self) -> &mut Vec<Arc<Comment>> {
        &mut self.comments
    }

    pub fn element(&self, id: &ElementId) -> Option<&Arc<Element>> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn element_index(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    pub fn link(&self, id: &LinkId) -> Option<&Arc<Link>> {
        self.links.iter().find(|l| l.id() == id)
    }

    pub fn link_index(&self, id: &LinkId) -> Option<usize> {
        self.links.iter().position(|l| l.id() == id)
    }

    pub fn contains_element(&self, id: &ElementId) -> bool {
        self.element(id).is_some()
    }

    /// Id-keyed view of the elements, for passes that do many lookups.
    pub fn element_lookup(&self) -> HashMap<&ElementId, &Arc<Element>> {
        self.elements.iter().map(|e| (e.id(), e)).collect()
    }

    /// Number of comments per element; elements without comments are absent.
    pub fn comment_counts(&self) -> HashMap<ElementId, usize> {
        let mut counts = HashMap::new();
        for comment in &self.comments {
            *counts.entry(comment.element_id().clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Canvas-space position of an element, resolving group-relative member positions.
    pub fn absolute_position(&self, element: &Element) -> Position {
        match element.parent_group_id().and_then(|id| self.element(id)) {
            Some(parent) => element.position().to_absolute(parent.position()),
            None => element.position(),
        }
    }

    pub fn absolute_rect(&self, element: &Element) -> Rect {
        Rect::from_position(self.absolute_position(element), element.size())
    }
}
