// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bounded cache of decoded image handles, least recently used first out.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

use crate::model::{Asset, AssetId};

pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Arc<[u8]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    pub message: String,
}

impl DecodeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "image decode failed: {}", self.message)
    }
}

impl std::error::Error for DecodeError {}

/// Host-provided decoder; the engine never reads image formats itself.
pub trait ImageDecoder {
    fn decode(&self, asset: &Asset) -> Result<DecodedImage, DecodeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    Loading,
    Ready(Arc<DecodedImage>),
    Failed(DecodeError),
}

#[derive(Debug)]
pub struct ImageCache {
    entries: LruCache<AssetId, ImageState>,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_CACHE_CAPACITY)
    }
}

impl ImageCache {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self { entries: LruCache::new(capacity) }
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up an entry and marks it most recently used.
    pub fn get(&mut self, asset_id: &AssetId) -> Option<&ImageState> {
        self.entries.get(asset_id)
    }

    pub fn peek(&self, asset_id: &AssetId) -> Option<&ImageState> {
        self.entries.peek(asset_id)
    }

    /// Marks `asset_id` as loading. Returns `false` when an entry already exists, in which case
    /// no decode should be started.
    pub fn begin(&mut self, asset_id: &AssetId) -> bool {
        if self.entries.get(asset_id).is_some() {
            return false;
        }
        self.insert(asset_id.clone(), ImageState::Loading);
        true
    }

    /// Stores the outcome of a decode started with [`ImageCache::begin`].
    pub fn finish(&mut self, asset_id: &AssetId, outcome: Result<DecodedImage, DecodeError>) {
        let state = match outcome {
            Ok(image) => ImageState::Ready(Arc::new(image)),
            Err(err) => {
                tracing::warn!(asset = %asset_id, error = %err, "image decode failed");
                ImageState::Failed(err)
            }
        };
        self.insert(asset_id.clone(), state);
    }

    /// Decodes synchronously on a miss and returns the cached state.
    pub fn load(&mut self, asset: &Asset, decoder: &dyn ImageDecoder) -> ImageState {
        if self.begin(asset.id()) {
            let outcome = decoder.decode(asset);
            self.finish(asset.id(), outcome);
        }
        self.entries.get(asset.id()).cloned().unwrap_or(ImageState::Loading)
    }

    /// Forgets a failed or stale entry so the next load retries.
    pub fn evict(&mut self, asset_id: &AssetId) -> Option<ImageState> {
        self.entries.pop(asset_id)
    }

    fn insert(&mut self, asset_id: AssetId, state: ImageState) {
        if let Some((evicted, _)) = self.entries.push(asset_id.clone(), state) {
            if evicted != asset_id {
                tracing::trace!(asset = %evicted, "image handle evicted");
            }
        }
    }
}
