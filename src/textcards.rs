//! # Text Card Store
//!
//! CRUD for free-form rich-text cards, keyed by `(user, page, card id)`.
//!
//! Saves are merge-upserts: `createdAt` and `createdBy` are written once on
//! first save, `updatedAt` on every save, and fields the caller did not
//! provide (currently `description`) are left untouched on existing cards.
//!
//! Reads are deliberately lopsided in their error handling. A page render
//! must not break because its text cards failed to load, so the page-level
//! readers swallow store errors into an empty list (logged). Writes and
//! deletes propagate errors; a silently dropped save would be worse than a
//! visible one.

use crate::error::Result;
use crate::gateway::{read_typed, DocumentStore};
use crate::model::TextCardData;
use crate::paths;
use chrono::{DateTime, Utc};
use log::warn;
use serde_json::json;

/// The closed set of pages that can host text cards. `load_all_text_cards`
/// iterates exactly this list; adding a page to the product means adding it
/// here.
pub const PAGES: &[&str] = &[
    "dashboard",
    "readiness",
    "nutrition",
    "hydration",
    "training",
    "habits",
    "goals",
];

/// Reserved id prefix for text cards. This predicate is the sole mechanism
/// other components use to tell text cards from built-in panels, so it must
/// stay exact and stable.
pub const TEXT_CARD_PREFIX: &str = "text-card-";

pub fn is_text_card(id: &str) -> bool {
    id.starts_with(TEXT_CARD_PREFIX)
}

/// Allocate a fresh `text-card-<millis>` id, bumping the timestamp until it
/// collides with nothing in `existing`. Two cards created within the same
/// millisecond therefore still get distinct ids.
pub fn allocate_card_id<'a, I>(existing: I, now: DateTime<Utc>) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let taken: Vec<&str> = existing.into_iter().collect();
    let mut millis = now.timestamp_millis();
    loop {
        let candidate = format!("{}{}", TEXT_CARD_PREFIX, millis);
        if !taken.iter().any(|id| *id == candidate) {
            return candidate;
        }
        millis += 1;
    }
}

/// Caller-supplied fields for a text card save.
#[derive(Debug, Clone)]
pub struct TextCardDraft {
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub page: String,
}

/// Upsert a text card. Returns the record as persisted.
pub fn save_text_card<S: DocumentStore>(
    store: &S,
    user_id: &str,
    card_id: &str,
    draft: TextCardDraft,
) -> Result<TextCardData> {
    let path = paths::text_card(user_id, &draft.page, card_id);
    let now = Utc::now();

    match read_typed::<TextCardData, _>(store, &path)? {
        Some(mut existing) => {
            // Merge-write: only touch the fields the caller provided.
            let mut patch = json!({
                "title": draft.title,
                "content": draft.content,
                "updatedAt": now,
            });
            if let Some(description) = &draft.description {
                patch["description"] = json!(description);
            }
            store.set_document(&path, &patch, true)?;

            existing.title = draft.title;
            existing.content = draft.content;
            existing.updated_at = now;
            if draft.description.is_some() {
                existing.description = draft.description;
            }
            Ok(existing)
        }
        None => {
            let record = TextCardData {
                id: card_id.to_string(),
                title: draft.title,
                description: draft.description,
                content: draft.content,
                created_at: now,
                updated_at: now,
                created_by: user_id.to_string(),
                page: draft.page,
            };
            store.set_document(&path, &serde_json::to_value(&record)?, false)?;
            Ok(record)
        }
    }
}

/// Fetch one card. `Ok(None)` for simple absence.
pub fn load_text_card<S: DocumentStore>(
    store: &S,
    user_id: &str,
    card_id: &str,
    page: &str,
) -> Result<Option<TextCardData>> {
    read_typed(store, &paths::text_card(user_id, page, card_id))
}

/// All cards for one page. Store failures degrade to an empty list so the
/// page still renders.
pub fn load_text_cards_for_page<S: DocumentStore>(
    store: &S,
    user_id: &str,
    page: &str,
) -> Vec<TextCardData> {
    match store.list_documents(&paths::text_cards(user_id, page)) {
        Ok(documents) => documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value(doc) {
                Ok(card) => Some(card),
                Err(e) => {
                    warn!("skipping malformed text card on page '{}': {}", page, e);
                    None
                }
            })
            .collect(),
        Err(e) => {
            warn!("failed to load text cards for page '{}': {}", page, e);
            Vec::new()
        }
    }
}

/// All of a user's cards across the known page set. Per-page failures are
/// skipped individually; the result is whatever loaded.
pub fn load_all_text_cards<S: DocumentStore>(store: &S, user_id: &str) -> Vec<TextCardData> {
    PAGES
        .iter()
        .flat_map(|page| load_text_cards_for_page(store, user_id, page))
        .collect()
}

/// Hard delete. The record is removed entirely, not tombstoned.
pub fn delete_text_card<S: DocumentStore>(
    store: &S,
    user_id: &str,
    card_id: &str,
    page: &str,
) -> Result<()> {
    store.delete_document(&paths::text_card(user_id, page, card_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryGateway;
    use chrono::TimeZone;

    fn draft(page: &str) -> TextCardDraft {
        TextCardDraft {
            title: "Notes".to_string(),
            description: Some("desc".to_string()),
            content: "<p>hello</p>".to_string(),
            page: page.to_string(),
        }
    }

    #[test]
    fn predicate_is_exact() {
        assert!(is_text_card("text-card-123"));
        assert!(is_text_card("text-card-"));
        assert!(!is_text_card("textcard-123"));
        assert!(!is_text_card("readiness"));
        assert!(!is_text_card(" text-card-1"));
    }

    #[test]
    fn allocate_skips_taken_ids() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let taken = vec![
            "text-card-1700000000000".to_string(),
            "text-card-1700000000001".to_string(),
        ];
        let id = allocate_card_id(taken.iter().map(|s| s.as_str()), now);
        assert_eq!(id, "text-card-1700000000002");
    }

    #[test]
    fn first_save_sets_created_fields() {
        let gw = MemoryGateway::new();
        let card = save_text_card(&gw, "u1", "text-card-1", draft("dashboard")).unwrap();
        assert_eq!(card.created_by, "u1");
        assert_eq!(card.created_at, card.updated_at);

        let loaded = load_text_card(&gw, "u1", "text-card-1", "dashboard")
            .unwrap()
            .unwrap();
        assert_eq!(loaded, card);
    }

    #[test]
    fn second_save_preserves_created_at_and_merges() {
        let gw = MemoryGateway::new();
        let first = save_text_card(&gw, "u1", "text-card-1", draft("dashboard")).unwrap();

        // Re-save without a description; the stored one must survive.
        let update = TextCardDraft {
            title: "Notes v2".to_string(),
            description: None,
            content: "<p>edited</p>".to_string(),
            page: "dashboard".to_string(),
        };
        let second = save_text_card(&gw, "u1", "text-card-1", update).unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(second.description.as_deref(), Some("desc"));

        let loaded = load_text_card(&gw, "u1", "text-card-1", "dashboard")
            .unwrap()
            .unwrap();
        assert_eq!(loaded.title, "Notes v2");
        assert_eq!(loaded.description.as_deref(), Some("desc"));
        assert_eq!(loaded.created_by, "u1");
    }

    #[test]
    fn absent_card_is_none_not_error() {
        let gw = MemoryGateway::new();
        assert!(load_text_card(&gw, "u1", "text-card-9", "dashboard")
            .unwrap()
            .is_none());
    }

    #[test]
    fn page_load_failure_degrades_to_empty() {
        let gw = MemoryGateway::new();
        save_text_card(&gw, "u1", "text-card-1", draft("goals")).unwrap();
        gw.set_fail_document_reads(true);
        assert!(load_text_cards_for_page(&gw, "u1", "goals").is_empty());
    }

    #[test]
    fn load_all_concatenates_across_pages() {
        let gw = MemoryGateway::new();
        save_text_card(&gw, "u1", "text-card-1", draft("dashboard")).unwrap();
        save_text_card(&gw, "u1", "text-card-2", draft("goals")).unwrap();
        save_text_card(&gw, "u2", "text-card-3", draft("goals")).unwrap();

        let all = load_all_text_cards(&gw, "u1");
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|card| card.created_by == "u1"));
    }

    #[test]
    fn delete_removes_the_record() {
        let gw = MemoryGateway::new();
        save_text_card(&gw, "u1", "text-card-1", draft("dashboard")).unwrap();
        delete_text_card(&gw, "u1", "text-card-1", "dashboard").unwrap();
        assert!(load_text_card(&gw, "u1", "text-card-1", "dashboard")
            .unwrap()
            .is_none());
    }
}
