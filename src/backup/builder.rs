//! Snapshot assembly.
//!
//! A backup gathers, in order: the current layout document, every layout
//! preset, every text card, and (best-effort) the system settings document.
//! The first three reads are integrity-critical; if any of them fails the
//! whole backup fails. Settings are supplementary and their absence is
//! recorded, never fatal.

use crate::error::Result;
use crate::gateway::DocumentStore;
use crate::model::{BackupContents, BackupData, BackupKind, BackupLayouts, LayoutPreset};
use crate::{layout, paths, textcards};
use chrono::{DateTime, Utc};
use log::warn;

/// Version stamp written into every backup document.
pub const BACKUP_VERSION: &str = "1.0.0";

/// Produce a complete point-in-time snapshot for one user. Read-only; the
/// caller decides whether the result is downloaded or uploaded.
pub fn create_backup<S: DocumentStore>(
    store: &S,
    user_id: &str,
    user_email: &str,
    kind: BackupKind,
) -> Result<BackupData> {
    // Steps 1-3 are integrity-critical: a backup that silently misses
    // layouts or presets is worse than no backup.
    let current = layout::read_cards(store, user_id)?;

    let preset_docs = store.list_documents(&paths::user_presets(user_id))?;
    let mut presets: Vec<LayoutPreset> = Vec::with_capacity(preset_docs.len());
    for doc in preset_docs {
        presets.push(serde_json::from_value(doc)?);
    }

    let text_cards = textcards::load_all_text_cards(store, user_id);

    // Step 4: supplementary. A failed settings read is logged and recorded
    // as absent.
    let system_settings = match store.get_document(paths::SYSTEM_SETTINGS) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("system settings omitted from backup: {}", e);
            None
        }
    };

    Ok(BackupData {
        version: BACKUP_VERSION.to_string(),
        backup_date: Utc::now(),
        user_id: user_id.to_string(),
        user_email: user_email.to_string(),
        backup_type: kind,
        data: BackupContents {
            layouts: BackupLayouts { current, presets },
            text_cards,
            system_settings,
        },
    })
}

/// Summary shown to the user before a download or restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupStats {
    pub text_cards: usize,
    pub presets: usize,
    pub layout_cards: usize,
    /// Serialized size of the whole document, formatted in kilobytes.
    pub size: String,
    /// Distinct pages referenced by the text cards, first-seen order.
    pub pages: Vec<String>,
}

pub fn backup_stats(backup: &BackupData) -> Result<BackupStats> {
    let serialized = to_pretty_json(backup)?;
    let size_kb = serialized.len() as f64 / 1024.0;

    let mut pages: Vec<String> = Vec::new();
    for card in &backup.data.text_cards {
        if !pages.contains(&card.page) {
            pages.push(card.page.clone());
        }
    }

    Ok(BackupStats {
        text_cards: backup.data.text_cards.len(),
        presets: backup.data.layouts.presets.len(),
        layout_cards: backup.data.layouts.current.len(),
        size: format!("{:.1} KB", size_kb),
        pages,
    })
}

/// The downloadable artifact: pretty-printed UTF-8 JSON.
pub fn to_pretty_json(backup: &BackupData) -> Result<String> {
    Ok(serde_json::to_string_pretty(backup)?)
}

/// Filename convention for manual downloads.
pub fn manual_backup_filename(date: DateTime<Utc>) -> String {
    format!("health-hub-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Blob path convention for scheduled backups.
pub fn scheduled_blob_path(prefix: &str, date: DateTime<Utc>) -> String {
    format!(
        "{}/{}-healthhub-data.json",
        prefix.trim_end_matches('/'),
        date.format("%Y-%m-%d")
    )
}
