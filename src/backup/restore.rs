//! Selective replay of a validated backup.
//!
//! Restore is not transactional across its three sub-steps: the first write
//! failure aborts the remaining steps and the error names the sub-step that
//! failed. A partially applied restore is an accepted, documented risk —
//! the alternative is a multi-document transaction this system deliberately
//! does not depend on.
//!
//! All writes go through the owning components' document shapes (the layout
//! persist path, the text-card record), never raw, so restore cannot bypass
//! their invariants.

use super::{RestoreOptions, RestoreReport};
use crate::error::{HubError, Result};
use crate::gateway::{write_typed, DocumentStore};
use crate::model::BackupData;
use crate::{layout, paths};
use log::info;

fn step_err(step: &'static str) -> impl FnOnce(HubError) -> HubError {
    move |e| HubError::Restore {
        step,
        reason: e.to_string(),
    }
}

/// Replay `backup` into `target_user`'s namespaces. The backup must have
/// passed [`super::validate::validate_backup`] first.
pub fn restore_from_backup<S: DocumentStore>(
    store: &S,
    backup: &BackupData,
    target_user: &str,
    options: &RestoreOptions,
) -> Result<RestoreReport> {
    let mut report = RestoreReport::default();

    // Layout restore is inherently all-or-nothing per user: a wholesale
    // replace, regardless of overwrite_existing. An empty list is skipped
    // rather than wiping the target's layout.
    if options.restore_layouts && !backup.data.layouts.current.is_empty() {
        layout::persist_cards(store, target_user, &backup.data.layouts.current)
            .map_err(step_err("layouts"))?;
        report.layouts_restored = true;
    }

    if options.restore_presets {
        for preset in &backup.data.layouts.presets {
            write_typed(store, &paths::user_preset(target_user, &preset.id), preset)
                .map_err(step_err("presets"))?;
            report.presets_restored += 1;
        }
    }

    if options.restore_text_cards {
        for card in &backup.data.text_cards {
            let path = paths::text_card(target_user, &card.page, &card.id);
            if !options.overwrite_existing {
                let exists = store
                    .get_document(&path)
                    .map_err(step_err("text cards"))?
                    .is_some();
                if exists {
                    report.text_cards_skipped += 1;
                    continue;
                }
            }
            write_typed(store, &path, card).map_err(step_err("text cards"))?;
            report.text_cards_restored += 1;
        }
    }

    info!(
        "restore for {}: layouts={} presets={} cards={} skipped={}",
        target_user,
        report.layouts_restored,
        report.presets_restored,
        report.text_cards_restored,
        report.text_cards_skipped
    );
    Ok(report)
}
