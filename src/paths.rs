//! Document path builders for the persistence gateway.
//!
//! Every component writes only inside its own namespace; keeping the path
//! scheme in one place is what makes that ownership auditable.
//!
//! ```text
//! users/{uid}/settings/layout              current layout document
//! users/{uid}/layoutPresets/{presetId}     one preset per document
//! users/{uid}/pages/{page}/textCards/{id}  one text card per document
//! system/settings                          navigation + misc (admin-owned)
//! system/defaultLayout                     layout applied to new users
//! ```

pub const SYSTEM_SETTINGS: &str = "system/settings";
pub const DEFAULT_LAYOUT: &str = "system/defaultLayout";

pub fn user_layout(user_id: &str) -> String {
    format!("users/{}/settings/layout", user_id)
}

pub fn user_presets(user_id: &str) -> String {
    format!("users/{}/layoutPresets", user_id)
}

pub fn user_preset(user_id: &str, preset_id: &str) -> String {
    format!("users/{}/layoutPresets/{}", user_id, preset_id)
}

pub fn text_cards(user_id: &str, page: &str) -> String {
    format!("users/{}/pages/{}/textCards", user_id, page)
}

pub fn text_card(user_id: &str, page: &str, card_id: &str) -> String {
    format!("users/{}/pages/{}/textCards/{}", user_id, page, card_id)
}
