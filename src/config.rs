//! # Configuration
//!
//! Deployment knobs for the backup pipeline, managed by [`confique`] with
//! layered loading.
//!
//! Resolution order:
//! 1. **Environment variables**: `HEALTHHUB__RETENTION_DAYS`,
//!    `HEALTHHUB__BACKUP_PREFIX`
//! 2. **Config file**: `healthhub.toml`, when the deployment provides one
//! 3. **Compiled defaults** via `#[config(default = ...)]`
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `retention_days` | `90` | Age threshold after which backup blobs become eligible for deletion |
//! | `backup_prefix` | `backups/HealthHub` | Storage prefix for scheduled backup blobs |

use crate::error::{HubError, Result};
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the backup and retention pipeline.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Retention window in days for scheduled backup blobs.
    #[config(default = 90, env = "HEALTHHUB__RETENTION_DAYS")]
    pub retention_days: u32,

    /// Blob-storage prefix under which scheduled backups are written.
    #[config(default = "backups/HealthHub", env = "HEALTHHUB__BACKUP_PREFIX")]
    pub backup_prefix: String,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            retention_days: 90,
            backup_prefix: "backups/HealthHub".to_string(),
        }
    }
}

impl HubConfig {
    /// Load with env overrides and an optional TOML file.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Self::builder().env();
        if let Some(file) = file {
            builder = builder.file(file);
        }
        builder
            .load()
            .map_err(|e| HubError::Store(format!("config load failed: {}", e)))
    }
}
