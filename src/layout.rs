//! # Layout Engine
//!
//! Owns the ordered, sized arrangement of cards for one user and brokers
//! safe bulk edits.
//!
//! ## Edit-mode state machine
//!
//! ```text
//! Viewing --begin_edit (admin)--> Editing
//! Editing --commit_edit--> Viewing   (single terminal persist)
//! Editing --cancel_edit--> Viewing   (pure in-memory rollback)
//! Editing --navigate_to(other page)--> Viewing (implicit cancel)
//! ```
//!
//! Entering edit mode snapshots the current list. While a session is open,
//! every mutation is memory-only; commit performs the one write. Outside a
//! session each mutation persists immediately and independently.
//!
//! ## Schema migration
//!
//! Persisted layout documents carry a `schemaVersion` tag. On load the
//! minimal chain of migration steps runs to reach the current version and
//! the migrated document is re-persisted once:
//!
//! - pre-versioning documents stored the list under a `layouts` key and are
//!   treated as version 1
//! - v1 → v2: cards predate size support; absent `size` is backfilled with
//!   `medium`
//!
//! ## Failure semantics
//!
//! Persistence is best-effort: a mutation applies to memory first, then
//! writes. A failed write is logged and surfaced to the caller, but the
//! in-memory state stays authoritative for the session; there is no
//! automatic rollback. Callers needing strong durability must verify with a
//! read-after-write.

use crate::error::{HubError, Result};
use crate::gateway::{read_typed, write_typed, DocumentStore};
use crate::model::{CardLayout, CardSize, LayoutPreset, UserContext};
use crate::registry;
use crate::reorder;
use crate::{paths, textcards};
use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use uuid::Uuid;

pub const LAYOUT_SCHEMA_VERSION: u32 = 2;

/// The layout installed for users with no stored layout and no system-wide
/// default record.
pub fn builtin_default_layout() -> Vec<CardLayout> {
    vec![
        CardLayout::new("readiness", 0, CardSize::Large),
        CardLayout::new("sleep", 1, CardSize::Medium),
        CardLayout::new("activity", 2, CardSize::Medium),
        CardLayout::new("nutrition", 3, CardSize::Medium),
        CardLayout::new("hydration", 4, CardSize::Small),
        CardLayout::new("habits", 5, CardSize::Medium),
    ]
}

/// Where the cards returned by [`LayoutEngine::load`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutOrigin {
    /// Stored document at the current schema version.
    Stored,
    /// Stored document that needed migration (re-persisted).
    Migrated,
    /// No stored document; defaults installed and persisted.
    Defaults,
    /// Fetch failed; defaults in memory only, error carried in `warning`.
    Fallback,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub origin: LayoutOrigin,
    pub warning: Option<String>,
}

// On-disk document shape, current version.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredLayoutDoc {
    schema_version: u32,
    cards: Vec<CardLayout>,
}

// Card as found in v1 (or older) documents: size may be absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCard {
    id: String,
    order: u32,
    #[serde(default)]
    col_span: Option<u32>,
    #[serde(default)]
    size: Option<CardSize>,
}

fn decode_stored(doc: &Value) -> Result<(u32, Vec<StoredCard>)> {
    if let Some(version) = doc.get("schemaVersion").and_then(Value::as_u64) {
        let cards = doc.get("cards").cloned().unwrap_or_else(|| Value::Array(Vec::new()));
        Ok((version as u32, serde_json::from_value(cards)?))
    } else {
        // Pre-versioning documents kept the list under "layouts".
        let cards = doc
            .get("layouts")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        Ok((1, serde_json::from_value(cards)?))
    }
}

fn migrate_v1_to_v2(cards: Vec<StoredCard>) -> Vec<StoredCard> {
    cards
        .into_iter()
        .map(|mut card| {
            if card.size.is_none() {
                card.size = Some(CardSize::Medium);
            }
            card
        })
        .collect()
}

/// Run the migration chain from `version` up to the current schema.
/// Returns the final cards and whether any step ran.
fn upgrade(mut version: u32, mut cards: Vec<StoredCard>) -> (Vec<CardLayout>, bool) {
    let migrated = version < LAYOUT_SCHEMA_VERSION;
    while version < LAYOUT_SCHEMA_VERSION {
        cards = match version {
            1 => migrate_v1_to_v2(cards),
            _ => cards,
        };
        version += 1;
    }
    let cards = cards
        .into_iter()
        .map(|card| CardLayout {
            id: card.id,
            order: card.order,
            col_span: card.col_span,
            size: card.size.unwrap_or_default(),
        })
        .collect();
    (cards, migrated)
}

/// Write a layout list for a user at the current schema version.
///
/// This is the single write path for layout documents; the restore engine
/// goes through it too so the schema tag is never bypassed.
pub(crate) fn persist_cards<S: DocumentStore>(
    store: &S,
    user_id: &str,
    cards: &[CardLayout],
) -> Result<()> {
    ensure_valid_cards(cards)?;
    write_typed(
        store,
        &paths::user_layout(user_id),
        &StoredLayoutDoc {
            schema_version: LAYOUT_SCHEMA_VERSION,
            cards: cards.to_vec(),
        },
    )
}

/// Read a user's layout list without side effects: decodes any stored
/// schema version and migrates in memory, but never re-persists. Absence is
/// an empty list; store failures propagate (backup assembly treats the
/// layout read as integrity-critical).
pub(crate) fn read_cards<S: DocumentStore>(store: &S, user_id: &str) -> Result<Vec<CardLayout>> {
    match store.get_document(&paths::user_layout(user_id))? {
        Some(doc) => {
            let (version, stored) = decode_stored(&doc)?;
            Ok(upgrade(version, stored).0)
        }
        None => Ok(Vec::new()),
    }
}

/// Every id must be unique within the list and resolve to something the
/// dashboard can render: a registered panel or a text card.
fn ensure_valid_cards(cards: &[CardLayout]) -> Result<()> {
    let mut seen = HashSet::new();
    for card in cards {
        if !registry::is_known_card(&card.id) {
            return Err(HubError::UnknownCard(card.id.clone()));
        }
        if !seen.insert(card.id.as_str()) {
            return Err(HubError::Store(format!(
                "duplicate card id '{}' in layout",
                card.id
            )));
        }
    }
    Ok(())
}

/// Per-user layout engine. Constructed once per session; the persistence
/// gateway is passed into each operation rather than owned, so one gateway
/// can serve the layout engine, text card store, and backup pipeline alike.
pub struct LayoutEngine {
    user: UserContext,
    page: String,
    cards: Vec<CardLayout>,
    /// Snapshot taken on entering edit mode; `Some` means a session is open.
    original: Option<Vec<CardLayout>>,
}

impl LayoutEngine {
    pub fn new(user: UserContext) -> Self {
        Self {
            user,
            page: "dashboard".to_string(),
            cards: Vec::new(),
            original: None,
        }
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    pub fn is_editing(&self) -> bool {
        self.original.is_some()
    }

    /// The raw layout list, in list order.
    pub fn cards(&self) -> &[CardLayout] {
        &self.cards
    }

    /// The layout in display order (sorted by `order`).
    pub fn view(&self) -> Vec<CardLayout> {
        reorder::sorted_by_order(&self.cards)
    }

    /// Page-scoped derived view, computed by filtering the single global
    /// list: the panel matching the page id plus any of the given text
    /// cards. Never stored separately.
    pub fn view_for_page(&self, page: &str, page_text_card_ids: &[String]) -> Vec<CardLayout> {
        if page == "dashboard" {
            return self.view();
        }
        self.view()
            .into_iter()
            .filter(|card| card.id == page || page_text_card_ids.contains(&card.id))
            .collect()
    }

    /// Fetch the persisted layout, installing (and persisting) a default on
    /// first load and migrating stale schemas. Fails soft: a fetch error
    /// falls back to defaults and is reported in the returned warning.
    pub fn load<S: DocumentStore>(&mut self, store: &S) -> LoadReport {
        let doc = match store.get_document(&paths::user_layout(&self.user.user_id)) {
            Ok(doc) => doc,
            Err(e) => {
                warn!("layout fetch failed for {}: {}", self.user.user_id, e);
                self.cards = builtin_default_layout();
                return LoadReport {
                    origin: LayoutOrigin::Fallback,
                    warning: Some(e.to_string()),
                };
            }
        };

        match doc {
            None => {
                self.cards = self.provisioning_layout(store);
                // Write-through on first read.
                let warning = persist_cards(store, &self.user.user_id, &self.cards)
                    .err()
                    .map(|e| {
                        warn!("could not persist first layout: {}", e);
                        e.to_string()
                    });
                LoadReport {
                    origin: LayoutOrigin::Defaults,
                    warning,
                }
            }
            Some(doc) => match decode_stored(&doc) {
                Ok((version, stored)) => {
                    let (cards, migrated) = upgrade(version, stored);
                    self.cards = cards;
                    if migrated {
                        let warning = persist_cards(store, &self.user.user_id, &self.cards)
                            .err()
                            .map(|e| {
                                warn!("could not persist migrated layout: {}", e);
                                e.to_string()
                            });
                        LoadReport {
                            origin: LayoutOrigin::Migrated,
                            warning,
                        }
                    } else {
                        LoadReport {
                            origin: LayoutOrigin::Stored,
                            warning: None,
                        }
                    }
                }
                Err(e) => {
                    warn!("stored layout unreadable for {}: {}", self.user.user_id, e);
                    self.cards = builtin_default_layout();
                    LoadReport {
                        origin: LayoutOrigin::Fallback,
                        warning: Some(e.to_string()),
                    }
                }
            },
        }
    }

    /// New users get the admin-published default layout when one exists,
    /// the built-in one otherwise. The read is best-effort.
    fn provisioning_layout<S: DocumentStore>(&self, store: &S) -> Vec<CardLayout> {
        match read_typed::<StoredLayoutDoc, _>(store, paths::DEFAULT_LAYOUT) {
            Ok(Some(doc)) if !doc.cards.is_empty() => doc.cards,
            Ok(_) => builtin_default_layout(),
            Err(e) => {
                warn!("default-layout record unreadable: {}", e);
                builtin_default_layout()
            }
        }
    }

    // --- Edit-mode session ---

    pub fn begin_edit(&mut self) -> Result<()> {
        if !self.user.is_admin() {
            return Err(HubError::Forbidden("enter edit mode"));
        }
        if self.original.is_none() {
            self.original = Some(self.cards.clone());
        }
        Ok(())
    }

    /// Persist the current list and close the session.
    pub fn commit_edit<S: DocumentStore>(&mut self, store: &S) -> Result<()> {
        self.original = None;
        self.persist(store)
    }

    /// Discard every in-session mutation. No writes happened mid-session,
    /// so no compensating writes are needed.
    pub fn cancel_edit(&mut self) {
        if let Some(original) = self.original.take() {
            self.cards = original;
        }
    }

    /// Switching pages while editing force-cancels the session so stale
    /// edits cannot leak across pages.
    pub fn navigate_to(&mut self, page: &str) {
        if page != self.page && self.is_editing() {
            self.cancel_edit();
        }
        self.page = page.to_string();
    }

    pub fn current_page(&self) -> &str {
        &self.page
    }

    // --- Mutations ---

    fn persist_unless_editing<S: DocumentStore>(&self, store: &S) -> Result<()> {
        if self.is_editing() {
            return Ok(());
        }
        self.persist(store)
    }

    fn persist<S: DocumentStore>(&self, store: &S) -> Result<()> {
        persist_cards(store, &self.user.user_id, &self.cards).inspect_err(|e| {
            warn!("layout persist failed for {}: {}", self.user.user_id, e);
        })
    }

    /// Replace the full ordered list (drag-end handler entry point).
    pub fn update_layout<S: DocumentStore>(
        &mut self,
        store: &S,
        new_cards: Vec<CardLayout>,
    ) -> Result<()> {
        ensure_valid_cards(&new_cards)?;
        self.cards = new_cards;
        self.persist_unless_editing(store)
    }

    /// Point-update one card's size.
    pub fn update_card_size<S: DocumentStore>(
        &mut self,
        store: &S,
        card_id: &str,
        size: CardSize,
    ) -> Result<()> {
        if !registry::size_allowed(card_id, size) {
            return Err(HubError::Store(format!(
                "card '{}' does not support size {:?}",
                card_id, size
            )));
        }
        let card = self
            .cards
            .iter_mut()
            .find(|card| card.id == card_id)
            .ok_or_else(|| HubError::CardNotFound(card_id.to_string()))?;
        card.size = size;
        self.persist_unless_editing(store)
    }

    /// Move-and-shift reorder, dashboard-grid semantics.
    pub fn move_card<S: DocumentStore>(&mut self, store: &S, from: usize, to: usize) -> Result<()> {
        self.cards = reorder::reorder(&self.cards, from, to);
        self.persist_unless_editing(store)
    }

    /// Order-swap reorder, goal-grid semantics: only the two named cards
    /// trade places.
    pub fn swap_cards<S: DocumentStore>(&mut self, store: &S, a: &str, b: &str) -> Result<()> {
        self.cards = reorder::swap_order(&self.cards, a, b);
        self.persist_unless_editing(store)
    }

    /// Append a new text card: fresh `text-card-<millis>` id, order one past
    /// the current maximum, medium size.
    pub fn add_card<S: DocumentStore>(&mut self, store: &S) -> Result<String> {
        let id = textcards::allocate_card_id(self.cards.iter().map(|c| c.id.as_str()), Utc::now());
        let order = self
            .cards
            .iter()
            .map(|card| card.order)
            .max()
            .map_or(0, |max| max + 1);
        self.cards.push(CardLayout::new(id.clone(), order, CardSize::Medium));
        self.persist_unless_editing(store)?;
        Ok(id)
    }

    /// Remove a card and renumber the remainder to `0..n-1`, preserving
    /// their relative display sequence so no order gaps survive.
    pub fn delete_card<S: DocumentStore>(&mut self, store: &S, card_id: &str) -> Result<()> {
        if !self.cards.iter().any(|card| card.id == card_id) {
            return Err(HubError::CardNotFound(card_id.to_string()));
        }
        if !registry::is_deletable(card_id) {
            return Err(HubError::NotDeletable(card_id.to_string()));
        }
        let mut remaining: Vec<CardLayout> = reorder::sorted_by_order(&self.cards)
            .into_iter()
            .filter(|card| card.id != card_id)
            .collect();
        reorder::renumber(&mut remaining);
        self.cards = remaining;
        self.persist_unless_editing(store)
    }

    // --- Presets ---

    /// Snapshot the current layout under a new named preset.
    pub fn save_preset<S: DocumentStore>(&self, store: &S, name: &str) -> Result<LayoutPreset> {
        let preset = LayoutPreset {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            layouts: self.cards.clone(),
            created_at: Utc::now(),
        };
        write_typed(
            store,
            &paths::user_preset(&self.user.user_id, &preset.id),
            &preset,
        )?;
        Ok(preset)
    }

    pub fn list_presets<S: DocumentStore>(&self, store: &S) -> Result<Vec<LayoutPreset>> {
        let documents = store.list_documents(&paths::user_presets(&self.user.user_id))?;
        let mut presets = Vec::with_capacity(documents.len());
        for doc in documents {
            presets.push(serde_json::from_value(doc)?);
        }
        Ok(presets)
    }

    /// Replace the current layout with a preset's saved list.
    pub fn load_preset<S: DocumentStore>(&mut self, store: &S, preset_id: &str) -> Result<()> {
        let preset: LayoutPreset =
            read_typed(store, &paths::user_preset(&self.user.user_id, preset_id))?
                .ok_or_else(|| HubError::PresetNotFound(preset_id.to_string()))?;
        self.cards = preset.layouts;
        self.persist_unless_editing(store)
    }

    pub fn delete_preset<S: DocumentStore>(&self, store: &S, preset_id: &str) -> Result<()> {
        store.delete_document(&paths::user_preset(&self.user.user_id, preset_id))
    }

    /// Publish a layout as the system-wide default for new users: the given
    /// preset's list, or the caller's current layout when no preset id is
    /// given. Admin only.
    pub fn set_default_layout<S: DocumentStore>(
        &self,
        store: &S,
        preset_id: Option<&str>,
    ) -> Result<()> {
        if !self.user.is_admin() {
            return Err(HubError::Forbidden("publish a default layout"));
        }
        let cards = match preset_id {
            Some(id) => {
                let preset: LayoutPreset =
                    read_typed(store, &paths::user_preset(&self.user.user_id, id))?
                        .ok_or_else(|| HubError::PresetNotFound(id.to_string()))?;
                preset.layouts
            }
            None => self.cards.clone(),
        };
        write_typed(
            store,
            paths::DEFAULT_LAYOUT,
            &StoredLayoutDoc {
                schema_version: LAYOUT_SCHEMA_VERSION,
                cards,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryGateway;
    use crate::model::Role;
    use serde_json::json;

    fn admin() -> UserContext {
        UserContext::new("u1", "u1@example.com", Role::Admin)
    }

    fn viewer() -> UserContext {
        UserContext::new("u2", "u2@example.com", Role::Viewer)
    }

    fn engine_with(gw: &MemoryGateway, cards: Vec<CardLayout>) -> LayoutEngine {
        let mut engine = LayoutEngine::new(admin());
        engine.load(gw);
        engine.update_layout(gw, cards).unwrap();
        engine
    }

    #[test]
    fn first_load_installs_and_persists_defaults() {
        let gw = MemoryGateway::new();
        let mut engine = LayoutEngine::new(admin());
        let report = engine.load(&gw);

        assert_eq!(report.origin, LayoutOrigin::Defaults);
        assert_eq!(engine.cards(), builtin_default_layout().as_slice());

        // Write-through: the document now exists at the current schema.
        let doc = gw.get_document(&paths::user_layout("u1")).unwrap().unwrap();
        assert_eq!(doc["schemaVersion"], LAYOUT_SCHEMA_VERSION);
    }

    #[test]
    fn first_load_prefers_published_default() {
        let gw = MemoryGateway::new();
        let publisher = engine_with(
            &gw,
            vec![CardLayout::new("goals", 0, CardSize::Large)],
        );
        publisher.set_default_layout(&gw, None).unwrap();

        let mut fresh = LayoutEngine::new(UserContext::new("u9", "", Role::Viewer));
        let report = fresh.load(&gw);
        assert_eq!(report.origin, LayoutOrigin::Defaults);
        assert_eq!(fresh.cards().len(), 1);
        assert_eq!(fresh.cards()[0].id, "goals");
    }

    #[test]
    fn legacy_document_is_migrated_and_repersisted() {
        let gw = MemoryGateway::new();
        // Pre-versioning shape: "layouts" key, no size fields.
        gw.set_document(
            &paths::user_layout("u1"),
            &json!({"layouts": [
                {"id": "readiness", "order": 0},
                {"id": "sleep", "order": 1, "colSpan": 2, "size": "large"}
            ]}),
            false,
        )
        .unwrap();

        let mut engine = LayoutEngine::new(admin());
        let report = engine.load(&gw);
        assert_eq!(report.origin, LayoutOrigin::Migrated);

        assert_eq!(engine.cards()[0].size, CardSize::Medium);
        assert_eq!(engine.cards()[1].size, CardSize::Large);
        assert_eq!(engine.cards()[1].col_span, Some(2));

        // The migrated list is what got persisted back.
        let doc = gw.get_document(&paths::user_layout("u1")).unwrap().unwrap();
        assert_eq!(doc["schemaVersion"], LAYOUT_SCHEMA_VERSION);
        assert_eq!(doc["cards"][0]["size"], "medium");
    }

    #[test]
    fn current_schema_loads_without_migration() {
        let gw = MemoryGateway::new();
        let engine = engine_with(&gw, vec![CardLayout::new("sleep", 0, CardSize::Small)]);
        drop(engine);

        let mut again = LayoutEngine::new(admin());
        let report = again.load(&gw);
        assert_eq!(report.origin, LayoutOrigin::Stored);
        assert_eq!(again.cards()[0].size, CardSize::Small);
    }

    #[test]
    fn fetch_error_falls_back_to_defaults_without_erroring() {
        let gw = MemoryGateway::new();
        gw.set_fail_document_reads(true);

        let mut engine = LayoutEngine::new(admin());
        let report = engine.load(&gw);
        assert_eq!(report.origin, LayoutOrigin::Fallback);
        assert!(report.warning.is_some());
        assert_eq!(engine.cards(), builtin_default_layout().as_slice());
    }

    #[test]
    fn cancel_restores_exact_pre_edit_state() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(
            &gw,
            vec![
                CardLayout::new("readiness", 0, CardSize::Small),
                CardLayout::new("sleep", 1, CardSize::Medium),
            ],
        );
        let before = engine.cards().to_vec();

        engine.begin_edit().unwrap();
        engine.add_card(&gw).unwrap();
        engine.update_card_size(&gw, "sleep", CardSize::Large).unwrap();
        engine.delete_card(&gw, "sleep").unwrap();
        engine.move_card(&gw, 0, 1).unwrap();
        engine.cancel_edit();

        assert_eq!(engine.cards(), before.as_slice());
        assert!(!engine.is_editing());
    }

    #[test]
    fn edit_session_defers_persistence_until_commit() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(&gw, vec![CardLayout::new("readiness", 0, CardSize::Small)]);

        engine.begin_edit().unwrap();
        engine.add_card(&gw).unwrap();

        // Mid-session nothing was written.
        let doc = gw.get_document(&paths::user_layout("u1")).unwrap().unwrap();
        assert_eq!(doc["cards"].as_array().unwrap().len(), 1);

        engine.commit_edit(&gw).unwrap();
        let doc = gw.get_document(&paths::user_layout("u1")).unwrap().unwrap();
        assert_eq!(doc["cards"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn viewer_cannot_enter_edit_mode() {
        let mut engine = LayoutEngine::new(viewer());
        assert!(matches!(engine.begin_edit(), Err(HubError::Forbidden(_))));
    }

    #[test]
    fn navigation_while_editing_cancels() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(&gw, vec![CardLayout::new("readiness", 0, CardSize::Small)]);
        let before = engine.cards().to_vec();

        engine.begin_edit().unwrap();
        engine.add_card(&gw).unwrap();
        engine.navigate_to("goals");

        assert!(!engine.is_editing());
        assert_eq!(engine.cards(), before.as_slice());
        assert_eq!(engine.current_page(), "goals");
    }

    #[test]
    fn add_card_appends_text_card_after_max_order() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(&gw, vec![CardLayout::new("readiness", 0, CardSize::Large)]);

        let id = engine.add_card(&gw).unwrap();
        assert!(id.starts_with("text-card-"));
        assert!(id["text-card-".len()..].chars().all(|c| c.is_ascii_digit()));

        let added = engine.cards().last().unwrap();
        assert_eq!(added.order, 1);
        assert_eq!(added.size, CardSize::Medium);
        // Original card untouched.
        assert_eq!(engine.cards()[0], CardLayout::new("readiness", 0, CardSize::Large));
    }

    #[test]
    fn delete_card_renumbers_without_gaps() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(
            &gw,
            vec![
                CardLayout::new("text-card-1", 0, CardSize::Small),
                CardLayout::new("sleep", 1, CardSize::Small),
                CardLayout::new("goals", 2, CardSize::Medium),
            ],
        );

        engine.delete_card(&gw, "text-card-1").unwrap();
        let orders: Vec<u32> = engine.cards().iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1]);
        assert_eq!(engine.cards()[0].id, "sleep");
        assert_eq!(engine.cards()[1].id, "goals");
    }

    #[test]
    fn delete_then_add_yields_contiguous_orders() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(
            &gw,
            vec![
                CardLayout::new("sleep", 0, CardSize::Small),
                CardLayout::new("goals", 3, CardSize::Small),
                CardLayout::new("habits", 7, CardSize::Small),
            ],
        );

        engine.delete_card(&gw, "goals").unwrap();
        engine.add_card(&gw).unwrap();

        let orders: Vec<u32> = engine.cards().iter().map(|c| c.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(engine.cards()[0].id, "sleep");
        assert_eq!(engine.cards()[1].id, "habits");
    }

    #[test]
    fn undeletable_panel_is_refused() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(&gw, vec![CardLayout::new("readiness", 0, CardSize::Large)]);
        assert!(matches!(
            engine.delete_card(&gw, "readiness"),
            Err(HubError::NotDeletable(_))
        ));
    }

    #[test]
    fn size_update_respects_registry() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(&gw, vec![CardLayout::new("heart-rate", 0, CardSize::Medium)]);
        assert!(engine.update_card_size(&gw, "heart-rate", CardSize::Small).is_err());
        engine.update_card_size(&gw, "heart-rate", CardSize::Large).unwrap();
        assert_eq!(engine.cards()[0].size, CardSize::Large);
    }

    #[test]
    fn failed_persist_keeps_memory_state_and_surfaces_error() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(&gw, vec![CardLayout::new("sleep", 0, CardSize::Small)]);

        gw.set_fail_document_writes(true);
        let result = engine.update_card_size(&gw, "sleep", CardSize::Large);
        assert!(result.is_err());
        // In-memory state stays authoritative; no rollback.
        assert_eq!(engine.cards()[0].size, CardSize::Large);
    }

    #[test]
    fn unknown_card_id_is_rejected_before_anything_changes() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(&gw, vec![CardLayout::new("sleep", 0, CardSize::Small)]);

        let result = engine.update_layout(
            &gw,
            vec![
                CardLayout::new("sleep", 0, CardSize::Small),
                CardLayout::new("mystery-panel", 1, CardSize::Medium),
            ],
        );
        assert!(matches!(result, Err(HubError::UnknownCard(_))));

        // Neither memory nor the stored document picked up the bad id.
        assert_eq!(engine.cards().len(), 1);
        let doc = gw.get_document(&paths::user_layout("u1")).unwrap().unwrap();
        assert_eq!(doc["cards"].as_array().unwrap().len(), 1);
        assert_eq!(doc["cards"][0]["id"], "sleep");
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let gw = MemoryGateway::new();
        let mut engine = LayoutEngine::new(admin());
        engine.load(&gw);
        let result = engine.update_layout(
            &gw,
            vec![
                CardLayout::new("sleep", 0, CardSize::Small),
                CardLayout::new("sleep", 1, CardSize::Small),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn preset_round_trip() {
        let gw = MemoryGateway::new();
        let mut engine = engine_with(
            &gw,
            vec![
                CardLayout::new("sleep", 0, CardSize::Small),
                CardLayout::new("goals", 1, CardSize::Large),
            ],
        );

        let preset = engine.save_preset(&gw, "compact").unwrap();
        assert_eq!(engine.list_presets(&gw).unwrap().len(), 1);

        engine.update_layout(&gw, vec![CardLayout::new("habits", 0, CardSize::Medium)]).unwrap();
        engine.load_preset(&gw, &preset.id).unwrap();
        assert_eq!(engine.cards().len(), 2);
        assert_eq!(engine.cards()[1].id, "goals");

        // Persisted immediately.
        let doc = gw.get_document(&paths::user_layout("u1")).unwrap().unwrap();
        assert_eq!(doc["cards"].as_array().unwrap().len(), 2);

        engine.delete_preset(&gw, &preset.id).unwrap();
        assert!(engine.list_presets(&gw).unwrap().is_empty());
        assert!(matches!(
            engine.load_preset(&gw, &preset.id),
            Err(HubError::PresetNotFound(_))
        ));
    }

    #[test]
    fn default_layout_publication_is_admin_gated() {
        let gw = MemoryGateway::new();
        let mut engine = LayoutEngine::new(viewer());
        engine.load(&gw);
        assert!(matches!(
            engine.set_default_layout(&gw, None),
            Err(HubError::Forbidden(_))
        ));
    }

    #[test]
    fn page_view_filters_the_global_list() {
        let gw = MemoryGateway::new();
        let engine = engine_with(
            &gw,
            vec![
                CardLayout::new("goals", 0, CardSize::Medium),
                CardLayout::new("sleep", 1, CardSize::Medium),
                CardLayout::new("text-card-5", 2, CardSize::Medium),
            ],
        );

        let view = engine.view_for_page("goals", &["text-card-5".to_string()]);
        let ids: Vec<&str> = view.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["goals", "text-card-5"]);
    }
}
