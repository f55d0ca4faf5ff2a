// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Corkboard-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Corkboard and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Engine tuning knobs.
//!
//! Every section and field is optional in the JSON form; missing values fall back to the defaults
//! below.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub edges: EdgeConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub collaboration: CollaborationConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Hard upper bound on rendered edges.
    #[serde(default = "default_edge_cap")]
    pub cap: usize,
    /// Above this many edges, non-selected edges render simplified.
    #[serde(default = "default_simplify_threshold")]
    pub simplify_threshold: usize,
    /// Canvas pixels added around the frozen viewport before culling.
    #[serde(default = "default_viewport_buffer")]
    pub viewport_buffer: f64,
    #[serde(default = "default_reveal_batch")]
    pub reveal_batch: usize,
    #[serde(default = "default_reveal_interval_ms")]
    pub reveal_interval_ms: u64,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            cap: default_edge_cap(),
            simplify_threshold: default_simplify_threshold(),
            viewport_buffer: default_viewport_buffer(),
            reveal_batch: default_reveal_batch(),
            reveal_interval_ms: default_reveal_interval_ms(),
        }
    }
}

impl EdgeConfig {
    pub fn reveal_interval(&self) -> Duration {
        Duration::from_millis(self.reveal_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    #[serde(default = "default_guide_tolerance")]
    pub guide_tolerance: f64,
    #[serde(default = "default_guide_interval_ms")]
    pub guide_interval_ms: u64,
    #[serde(default = "default_true")]
    pub snap_to_guides: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            guide_tolerance: default_guide_tolerance(),
            guide_interval_ms: default_guide_interval_ms(),
            snap_to_guides: default_true(),
        }
    }
}

impl InteractionConfig {
    pub fn guide_interval(&self) -> Duration {
        Duration::from_millis(self.guide_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaborationConfig {
    #[serde(default = "default_drag_broadcast_interval_ms")]
    pub drag_broadcast_interval_ms: u64,
    #[serde(default = "default_presence_interval_ms")]
    pub presence_interval_ms: u64,
    /// Remote position bursts settle for this long before edges are recomputed.
    #[serde(default = "default_remote_position_debounce_ms")]
    pub remote_position_debounce_ms: u64,
}

impl Default for CollaborationConfig {
    fn default() -> Self {
        Self {
            drag_broadcast_interval_ms: default_drag_broadcast_interval_ms(),
            presence_interval_ms: default_presence_interval_ms(),
            remote_position_debounce_ms: default_remote_position_debounce_ms(),
        }
    }
}

impl CollaborationConfig {
    pub fn drag_broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.drag_broadcast_interval_ms)
    }

    pub fn presence_interval(&self) -> Duration {
        Duration::from_millis(self.presence_interval_ms)
    }

    pub fn remote_position_debounce(&self) -> Duration {
        Duration::from_millis(self.remote_position_debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_image_cache_capacity")]
    pub image_capacity: usize,
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { image_capacity: default_image_cache_capacity(), history_limit: default_history_limit() }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_edge_cap() -> usize {
    800
}

const fn default_simplify_threshold() -> usize {
    200
}

const fn default_viewport_buffer() -> f64 {
    300.0
}

const fn default_reveal_batch() -> usize {
    100
}

const fn default_reveal_interval_ms() -> u64 {
    16
}

const fn default_guide_tolerance() -> f64 {
    5.0
}

const fn default_guide_interval_ms() -> u64 {
    100
}

const fn default_drag_broadcast_interval_ms() -> u64 {
    200
}

const fn default_presence_interval_ms() -> u64 {
    100
}

const fn default_remote_position_debounce_ms() -> u64 {
    300
}

const fn default_image_cache_capacity() -> usize {
    30
}

const fn default_history_limit() -> usize {
    200
}

impl EngineConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config = serde_json::from_str::<Self>(raw).map_err(|source| ConfigError::Parse {
            path: None,
            message: source.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
        };
        Self::from_json_str(&raw).map_err(|err| match err {
            ConfigError::Parse { message, .. } => {
                ConfigError::Parse { path: Some(path.to_path_buf()), message }
            }
            other => other,
        })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.edges.reveal_batch == 0 {
            return Err(ConfigError::Invalid { field: "edges.reveal_batch", reason: "must be positive" });
        }
        if self.edges.simplify_threshold > self.edges.cap {
            return Err(ConfigError::Invalid {
                field: "edges.simplify_threshold",
                reason: "must not exceed edges.cap",
            });
        }
        if !(self.interaction.guide_tolerance.is_finite() && self.interaction.guide_tolerance >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "interaction.guide_tolerance",
                reason: "must be a non-negative number",
            });
        }
        if self.cache.image_capacity == 0 {
            return Err(ConfigError::Invalid { field: "cache.image_capacity", reason: "must be positive" });
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: Option<PathBuf>, message: String },
    Invalid { field: &'static str, reason: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            Self::Parse { path: Some(path), message } => {
                write!(f, "failed to parse {}: {message}", path.display())
            }
            Self::Parse { path: None, message } => write!(f, "failed to parse config: {message}"),
            Self::Invalid { field, reason } => write!(f, "invalid config value {field}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
