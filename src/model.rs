//! # Domain Model
//!
//! Core data types for the Health Hub layout and backup engine.
//!
//! ## Cards and Layouts
//!
//! A dashboard is an ordered list of [`CardLayout`] entries. Each entry is
//! either a built-in data panel (fixed id such as `readiness`, described by
//! the card registry) or a user-created text card (id prefix `text-card-`).
//! `order` values define display order when sorted; they need not be
//! contiguous, but the engine renumbers them to `0..n-1` after deletions.
//!
//! ## Wire format
//!
//! All persisted documents and the backup artifact use camelCase JSON field
//! names. This is the format the original dashboard wrote, and backups must
//! stay restorable across versions, so the serde renames here are part of
//! the contract, not cosmetics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Size of a card in the dashboard grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSize {
    Small,
    Medium,
    Large,
}

impl Default for CardSize {
    fn default() -> Self {
        Self::Medium
    }
}

/// One entry in a user's dashboard layout.
///
/// `id` is unique within a layout list and resolves either to a registry
/// panel or to a text card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardLayout {
    pub id: String,
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_span: Option<u32>,
    pub size: CardSize,
}

impl CardLayout {
    pub fn new(id: impl Into<String>, order: u32, size: CardSize) -> Self {
        Self {
            id: id.into(),
            order,
            col_span: None,
            size,
        }
    }
}

/// A named, saved snapshot of a layout, restorable on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPreset {
    pub id: String,
    pub name: String,
    pub layouts: Vec<CardLayout>,
    pub created_at: DateTime<Utc>,
}

/// A free-form rich-text card, keyed by `(user, page, id)`.
///
/// `content` is opaque rich-text markup; the engine stores it verbatim and
/// never parses it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextCardData {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: String,
    pub page: String,
}

/// Entry in the system-wide navigation list. Global, not per-user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationItem {
    pub title: String,
    pub url: String,
    /// Key into the icon registry of the UI layer.
    pub icon: String,
    pub order: u32,
}

/// Role supplied by the external identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Viewer,
}

/// The acting user, as handed over by the identity boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
    pub email: String,
    pub role: Role,
}

impl UserContext {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// How a backup came to be. Recorded in the document for operator forensics;
/// the validator does not require it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    Manual,
    Scheduled,
}

impl Default for BackupKind {
    fn default() -> Self {
        Self::Manual
    }
}

/// Layout portion of a backup: the user's current layout plus every preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupLayouts {
    pub current: Vec<CardLayout>,
    #[serde(default)]
    pub presets: Vec<LayoutPreset>,
}

/// Payload of a backup document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupContents {
    pub layouts: BackupLayouts,
    pub text_cards: Vec<TextCardData>,
    /// Opaque snapshot of the system settings document, when readable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_settings: Option<Value>,
}

/// A complete, versioned, point-in-time snapshot of one user's content.
///
/// Produced by the backup builder, persisted as a blob or downloaded as
/// pretty-printed JSON, and consumed by the restore engine after passing
/// structural validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupData {
    pub version: String,
    pub backup_date: DateTime<Utc>,
    pub user_id: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub backup_type: BackupKind,
    pub data: BackupContents,
}
