//! # Session Facade
//!
//! [`HubSession`] binds one user, one persistence gateway, and one layout
//! engine into the surface the UI layer talks to. Every operation is a thin
//! delegation; behavior lives in the component modules, and anything callers
//! can do here they can equally do against those modules directly.

use crate::backup::{self, builder, restore, retention, validate};
use crate::config::HubConfig;
use crate::error::Result;
use crate::gateway::{BlobStore, DocumentStore};
use crate::layout::{LayoutEngine, LoadReport};
use crate::model::{
    BackupData, BackupKind, CardLayout, CardSize, LayoutPreset, NavigationItem, TextCardData,
    UserContext,
};
use crate::settings;
use crate::textcards::{self, TextCardDraft};
use chrono::Utc;
use serde_json::Value;

/// One signed-in user's handle on the whole subsystem.
pub struct HubSession<S> {
    store: S,
    config: HubConfig,
    layout: LayoutEngine,
}

impl<S: DocumentStore> HubSession<S> {
    /// Open a session and load the user's layout. The load report carries
    /// any fallback warning; the session is usable either way.
    pub fn open(store: S, user: UserContext, config: HubConfig) -> (Self, LoadReport) {
        let mut layout = LayoutEngine::new(user);
        let report = layout.load(&store);
        let session = Self {
            store,
            config,
            layout,
        };
        (session, report)
    }

    pub fn user(&self) -> &UserContext {
        self.layout.user()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --- Layout ---

    pub fn cards(&self) -> &[CardLayout] {
        self.layout.cards()
    }

    pub fn layout_view(&self) -> Vec<CardLayout> {
        self.layout.view()
    }

    /// Derived per-page view: the page's own panel plus its text cards.
    pub fn layout_view_for_page(&self, page: &str) -> Vec<CardLayout> {
        let ids: Vec<String> =
            textcards::load_text_cards_for_page(&self.store, &self.layout.user().user_id, page)
                .into_iter()
                .map(|card| card.id)
                .collect();
        self.layout.view_for_page(page, &ids)
    }

    pub fn is_editing(&self) -> bool {
        self.layout.is_editing()
    }

    pub fn begin_edit(&mut self) -> Result<()> {
        self.layout.begin_edit()
    }

    pub fn commit_edit(&mut self) -> Result<()> {
        self.layout.commit_edit(&self.store)
    }

    pub fn cancel_edit(&mut self) {
        self.layout.cancel_edit()
    }

    pub fn navigate_to(&mut self, page: &str) {
        self.layout.navigate_to(page)
    }

    pub fn update_layout(&mut self, cards: Vec<CardLayout>) -> Result<()> {
        self.layout.update_layout(&self.store, cards)
    }

    pub fn update_card_size(&mut self, card_id: &str, size: CardSize) -> Result<()> {
        self.layout.update_card_size(&self.store, card_id, size)
    }

    pub fn move_card(&mut self, from: usize, to: usize) -> Result<()> {
        self.layout.move_card(&self.store, from, to)
    }

    pub fn swap_cards(&mut self, a: &str, b: &str) -> Result<()> {
        self.layout.swap_cards(&self.store, a, b)
    }

    pub fn add_card(&mut self) -> Result<String> {
        self.layout.add_card(&self.store)
    }

    pub fn delete_card(&mut self, card_id: &str) -> Result<()> {
        self.layout.delete_card(&self.store, card_id)
    }

    pub fn save_preset(&self, name: &str) -> Result<LayoutPreset> {
        self.layout.save_preset(&self.store, name)
    }

    pub fn list_presets(&self) -> Result<Vec<LayoutPreset>> {
        self.layout.list_presets(&self.store)
    }

    pub fn load_preset(&mut self, preset_id: &str) -> Result<()> {
        self.layout.load_preset(&self.store, preset_id)
    }

    pub fn delete_preset(&self, preset_id: &str) -> Result<()> {
        self.layout.delete_preset(&self.store, preset_id)
    }

    pub fn set_default_layout(&self, preset_id: Option<&str>) -> Result<()> {
        self.layout.set_default_layout(&self.store, preset_id)
    }

    // --- Text cards ---

    pub fn save_text_card(&self, card_id: &str, draft: TextCardDraft) -> Result<TextCardData> {
        textcards::save_text_card(&self.store, &self.layout.user().user_id, card_id, draft)
    }

    pub fn text_card(&self, card_id: &str, page: &str) -> Result<Option<TextCardData>> {
        textcards::load_text_card(&self.store, &self.layout.user().user_id, card_id, page)
    }

    pub fn text_cards_for_page(&self, page: &str) -> Vec<TextCardData> {
        textcards::load_text_cards_for_page(&self.store, &self.layout.user().user_id, page)
    }

    pub fn all_text_cards(&self) -> Vec<TextCardData> {
        textcards::load_all_text_cards(&self.store, &self.layout.user().user_id)
    }

    pub fn delete_text_card(&self, card_id: &str, page: &str) -> Result<()> {
        textcards::delete_text_card(&self.store, &self.layout.user().user_id, card_id, page)
    }

    // --- Navigation ---

    pub fn navigation(&self) -> Vec<NavigationItem> {
        settings::load_navigation(&self.store)
    }

    pub fn save_navigation(&self, items: &[NavigationItem]) -> Result<()> {
        settings::save_navigation(&self.store, self.layout.user(), items)
    }

    // --- Backup ---

    /// Build a manual backup of this user's data.
    pub fn create_backup(&self) -> Result<BackupData> {
        let user = self.layout.user();
        builder::create_backup(&self.store, &user.user_id, &user.email, BackupKind::Manual)
    }

    /// Build a manual backup, serialize it, and name the download artifact.
    pub fn export_backup(&self) -> Result<(String, String)> {
        let backup = self.create_backup()?;
        let serialized = builder::to_pretty_json(&backup)?;
        let filename = builder::manual_backup_filename(backup.backup_date);
        Ok((filename, serialized))
    }

    pub fn backup_stats(&self, backup: &BackupData) -> Result<builder::BackupStats> {
        builder::backup_stats(backup)
    }

    pub fn validate_backup(&self, doc: &Value) -> validate::ValidationReport {
        validate::validate_backup(doc)
    }

    /// Validate then replay an arbitrary backup document into this user's
    /// namespaces.
    pub fn restore_backup(
        &mut self,
        doc: &Value,
        options: &backup::RestoreOptions,
    ) -> Result<backup::RestoreReport> {
        let backup = validate::parse_backup(doc)?;
        let report = restore::restore_from_backup(
            &self.store,
            &backup,
            &self.layout.user().user_id,
            options,
        )?;
        // Pick up whatever the restore wrote.
        self.layout.load(&self.store);
        Ok(report)
    }
}

impl<S: DocumentStore + BlobStore> HubSession<S> {
    /// Run the scheduled backup job: build, upload, sweep old blobs.
    pub fn run_scheduled_backup(&self) -> Result<retention::ScheduledRunReport> {
        let user = self.layout.user();
        retention::run_scheduled_backup(
            &self.store,
            &user.user_id,
            &user.email,
            &self.config,
            Utc::now(),
        )
    }

    pub fn cleanup_old_backups(&self) -> Result<backup::CleanupReport> {
        retention::cleanup_old_backups(
            &self.store,
            &self.config.backup_prefix,
            self.config.retention_days,
            Utc::now(),
        )
    }
}
