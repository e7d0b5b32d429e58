//! # Persistence Gateway
//!
//! Storage abstraction for the engine. The [`DocumentStore`] and
//! [`BlobStore`] traits are the only way core code touches persistence.
//!
//! ## Design Rationale
//!
//! Storage is abstracted behind traits to:
//! - Enable **testing** with [`memory::MemoryGateway`] (no filesystem needed)
//! - Allow the production document database and blob bucket clients to be
//!   adapted in without changing core logic
//! - Keep layout/backup semantics **decoupled** from persistence details
//!
//! Documents are addressed by slash-separated paths (`users/{uid}/...`) and
//! carried as [`serde_json::Value`]; the typed helpers [`read_typed`] and
//! [`write_typed`] convert at the edges. A path's parent segments name its
//! collection, so `list_documents("users/u1/layoutPresets")` returns every
//! preset document for that user.
//!
//! All methods take `&self`; implementations use interior mutability. The
//! engine is single-writer-per-user by construction, so no locking is
//! layered on top.
//!
//! ## Implementations
//!
//! - [`fs::FsGateway`]: JSON files under a root directory, atomic writes.
//! - [`memory::MemoryGateway`]: in-memory, with write-error simulation for
//!   exercising failure paths in tests.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

pub mod fs;
pub mod memory;

/// Metadata for one stored blob, as returned by [`BlobStore::list_blobs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    pub path: String,
    pub created_at: DateTime<Utc>,
    pub size_bytes: u64,
}

/// Abstract document database: get/set/delete/list JSON documents by path.
pub trait DocumentStore {
    /// Fetch a document. `Ok(None)` means simple absence; `Err` is reserved
    /// for actual store failures.
    fn get_document(&self, path: &str) -> Result<Option<Value>>;

    /// Write a document. With `merge`, object fields in `value` are laid
    /// over the existing document (shallow); otherwise the document is
    /// replaced wholesale.
    fn set_document(&self, path: &str, value: &Value, merge: bool) -> Result<()>;

    /// Remove a document. Deleting an absent document is not an error.
    fn delete_document(&self, path: &str) -> Result<()>;

    /// List all documents directly under a collection path.
    fn list_documents(&self, collection: &str) -> Result<Vec<Value>>;
}

/// Abstract blob bucket for backup artifacts.
pub trait BlobStore {
    fn put_blob(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()>;

    fn list_blobs(&self, prefix: &str) -> Result<Vec<BlobInfo>>;

    fn delete_blob(&self, path: &str) -> Result<()>;
}

/// Fetch and deserialize a document in one step.
pub fn read_typed<T: DeserializeOwned, S: DocumentStore + ?Sized>(
    store: &S,
    path: &str,
) -> Result<Option<T>> {
    match store.get_document(path)? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Serialize and write a document in one step (full replace).
pub fn write_typed<T: Serialize, S: DocumentStore + ?Sized>(
    store: &S,
    path: &str,
    value: &T,
) -> Result<()> {
    store.set_document(path, &serde_json::to_value(value)?, false)
}

/// Shallow-merge `patch` over `base`. Non-object patches replace outright,
/// matching the merge contract of the production document database.
pub(crate) fn merge_documents(base: &mut Value, patch: &Value) {
    match (base.as_object_mut(), patch.as_object()) {
        (Some(base_map), Some(patch_map)) => {
            for (key, value) in patch_map {
                base_map.insert(key.clone(), value.clone());
            }
        }
        _ => *base = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn merge_overlays_top_level_fields() {
        let mut base = json!({"a": 1, "b": {"x": 1}, "c": 3});
        merge_documents(&mut base, &json!({"b": {"y": 2}, "d": 4}));
        assert_eq!(base, json!({"a": 1, "b": {"y": 2}, "c": 3, "d": 4}));
    }

    #[test]
    fn merge_replaces_when_patch_is_not_object() {
        let mut base = json!({"a": 1});
        merge_documents(&mut base, &json!([1, 2]));
        assert_eq!(base, json!([1, 2]));
    }
}
