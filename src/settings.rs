//! System-wide settings document.
//!
//! One shared document holds global state mutated on behalf of all users:
//! the navigation list, plus whatever else operators stash there (the
//! backup builder snapshots the raw document without interpreting it).
//! Writes are admin-gated at this boundary and last-write-wins, same as
//! per-user data.

use crate::error::{HubError, Result};
use crate::gateway::DocumentStore;
use crate::model::{NavigationItem, UserContext};
use crate::paths;
use log::warn;
use serde_json::json;

/// The navigation list, or empty when unset or unreadable (a broken
/// settings document must not take the whole UI down).
pub fn load_navigation<S: DocumentStore>(store: &S) -> Vec<NavigationItem> {
    let doc = match store.get_document(paths::SYSTEM_SETTINGS) {
        Ok(Some(doc)) => doc,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("system settings unreadable: {}", e);
            return Vec::new();
        }
    };
    match doc.get("navigation") {
        Some(items) => serde_json::from_value(items.clone()).unwrap_or_else(|e| {
            warn!("malformed navigation list: {}", e);
            Vec::new()
        }),
        None => Vec::new(),
    }
}

/// Replace the navigation list. Admin only; other fields of the settings
/// document are preserved via a merge write.
pub fn save_navigation<S: DocumentStore>(
    store: &S,
    user: &UserContext,
    items: &[NavigationItem],
) -> Result<()> {
    if !user.is_admin() {
        return Err(HubError::Forbidden("edit navigation"));
    }
    store.set_document(
        paths::SYSTEM_SETTINGS,
        &json!({ "navigation": items }),
        true,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryGateway;
    use crate::model::Role;

    fn nav(title: &str, order: u32) -> NavigationItem {
        NavigationItem {
            title: title.to_string(),
            url: format!("/{}", title),
            icon: "activity".to_string(),
            order,
        }
    }

    #[test]
    fn round_trips_navigation() {
        let gw = MemoryGateway::new();
        let admin = UserContext::new("u1", "", Role::Admin);
        save_navigation(&gw, &admin, &[nav("readiness", 0), nav("goals", 1)]).unwrap();

        let items = load_navigation(&gw);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "readiness");
    }

    #[test]
    fn viewer_writes_are_refused() {
        let gw = MemoryGateway::new();
        let viewer = UserContext::new("u2", "", Role::Viewer);
        assert!(matches!(
            save_navigation(&gw, &viewer, &[]),
            Err(HubError::Forbidden(_))
        ));
    }

    #[test]
    fn merge_preserves_unrelated_settings() {
        let gw = MemoryGateway::new();
        gw.set_document(paths::SYSTEM_SETTINGS, &json!({"theme": "dark"}), false)
            .unwrap();

        let admin = UserContext::new("u1", "", Role::Admin);
        save_navigation(&gw, &admin, &[nav("habits", 0)]).unwrap();

        let doc = gw.get_document(paths::SYSTEM_SETTINGS).unwrap().unwrap();
        assert_eq!(doc["theme"], "dark");
        assert_eq!(doc["navigation"][0]["title"], "habits");
    }

    #[test]
    fn unreadable_settings_degrade_to_empty() {
        let gw = MemoryGateway::new();
        gw.set_fail_document_reads(true);
        assert!(load_navigation(&gw).is_empty());
    }
}
