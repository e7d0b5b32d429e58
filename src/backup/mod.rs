//! # Backup Pipeline
//!
//! Full-snapshot backup and restore of a user's dashboard content.
//!
//! The pipeline has four stages, each its own module:
//!
//! - [`builder`]: assemble a versioned [`crate::model::BackupData`] snapshot
//!   (layouts, presets, text cards, best-effort system settings) and derive
//!   summary statistics, serialized form, and artifact names.
//! - [`validate`]: structural check of an arbitrary input document. The sole
//!   gate before restore; nothing unvalidated reaches the restore engine.
//! - [`restore`]: selective replay of a validated backup under a
//!   configurable overwrite policy.
//! - [`retention`]: the scheduled job that uploads a fresh backup blob and
//!   sweeps blobs past the retention window, with a hard rule against
//!   deleting the last copies.
//!
//! There is no incremental backup and no cross-document transaction: a
//! backup is always a full snapshot, and a restore that fails mid-way stops
//! where it failed and says so.

pub mod builder;
pub mod restore;
pub mod retention;
pub mod upload;
pub mod validate;

/// Which portions of a backup to replay, and how to treat existing data.
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    pub restore_layouts: bool,
    pub restore_presets: bool,
    pub restore_text_cards: bool,
    /// When false, text cards that already exist at `(id, page)` are left
    /// alone (additive restore). Layout restore is wholesale regardless.
    pub overwrite_existing: bool,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            restore_layouts: true,
            restore_presets: true,
            restore_text_cards: true,
            overwrite_existing: false,
        }
    }
}

/// What a restore run actually did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub layouts_restored: bool,
    pub presets_restored: usize,
    pub text_cards_restored: usize,
    pub text_cards_skipped: usize,
}

/// Outcome of one retention sweep.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub deleted: usize,
    pub kept_recent: usize,
    pub failed_deletes: usize,
    /// Set when the sweep refused to delete anything (empty recent set).
    pub skip_reason: Option<String>,
}
