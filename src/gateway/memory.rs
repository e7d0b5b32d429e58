use super::{merge_documents, BlobInfo, BlobStore, DocumentStore};
use crate::error::{HubError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

#[derive(Clone)]
struct BlobEntry {
    bytes: Vec<u8>,
    content_type: String,
    metadata: HashMap<String, String>,
    created_at: DateTime<Utc>,
}

/// In-memory gateway for tests and in-process embedding.
///
/// Uses `RefCell` for interior mutability since the engine is
/// single-threaded per session. `BTreeMap` keeps listings in a stable
/// order, which makes test assertions deterministic.
pub struct MemoryGateway {
    documents: RefCell<BTreeMap<String, Value>>,
    blobs: RefCell<BTreeMap<String, BlobEntry>>,
    fail_document_writes: RefCell<bool>,
    fail_document_reads: RefCell<bool>,
    fail_blob_deletes: RefCell<bool>,
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self {
            documents: RefCell::new(BTreeMap::new()),
            blobs: RefCell::new(BTreeMap::new()),
            fail_document_writes: RefCell::new(false),
            fail_document_reads: RefCell::new(false),
            fail_blob_deletes: RefCell::new(false),
        }
    }
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent document write fail, for exercising the
    /// fatal-write error paths.
    pub fn set_fail_document_writes(&self, fail: bool) {
        *self.fail_document_writes.borrow_mut() = fail;
    }

    /// Make every subsequent document read fail, for exercising the
    /// fail-soft read paths.
    pub fn set_fail_document_reads(&self, fail: bool) {
        *self.fail_document_reads.borrow_mut() = fail;
    }

    /// Make blob deletions fail, for exercising the retention sweeper's
    /// per-item tolerance.
    pub fn set_fail_blob_deletes(&self, fail: bool) {
        *self.fail_blob_deletes.borrow_mut() = fail;
    }

    /// Test helper: insert a blob with an explicit creation time so
    /// retention cutoffs can be exercised without clock games.
    pub fn insert_blob_at(&self, path: &str, bytes: &[u8], created_at: DateTime<Utc>) {
        self.blobs.borrow_mut().insert(
            path.to_string(),
            BlobEntry {
                bytes: bytes.to_vec(),
                content_type: "application/json".to_string(),
                metadata: HashMap::new(),
                created_at,
            },
        );
    }

    /// Number of stored documents, across all collections.
    pub fn document_count(&self) -> usize {
        self.documents.borrow().len()
    }
}

fn in_collection(path: &str, collection: &str) -> bool {
    path.strip_prefix(collection)
        .and_then(|rest| rest.strip_prefix('/'))
        .is_some_and(|leaf| !leaf.contains('/'))
}

impl DocumentStore for MemoryGateway {
    fn get_document(&self, path: &str) -> Result<Option<Value>> {
        if *self.fail_document_reads.borrow() {
            return Err(HubError::Store("simulated read error".to_string()));
        }
        Ok(self.documents.borrow().get(path).cloned())
    }

    fn set_document(&self, path: &str, value: &Value, merge: bool) -> Result<()> {
        if *self.fail_document_writes.borrow() {
            return Err(HubError::Store("simulated write error".to_string()));
        }
        let mut documents = self.documents.borrow_mut();
        match documents.get_mut(path) {
            Some(existing) if merge => merge_documents(existing, value),
            _ => {
                documents.insert(path.to_string(), value.clone());
            }
        }
        Ok(())
    }

    fn delete_document(&self, path: &str) -> Result<()> {
        self.documents.borrow_mut().remove(path);
        Ok(())
    }

    fn list_documents(&self, collection: &str) -> Result<Vec<Value>> {
        if *self.fail_document_reads.borrow() {
            return Err(HubError::Store("simulated read error".to_string()));
        }
        Ok(self
            .documents
            .borrow()
            .iter()
            .filter(|(path, _)| in_collection(path, collection))
            .map(|(_, value)| value.clone())
            .collect())
    }
}

impl BlobStore for MemoryGateway {
    fn put_blob(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        metadata: &HashMap<String, String>,
    ) -> Result<()> {
        self.blobs.borrow_mut().insert(
            path.to_string(),
            BlobEntry {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
                metadata: metadata.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn list_blobs(&self, prefix: &str) -> Result<Vec<BlobInfo>> {
        Ok(self
            .blobs
            .borrow()
            .iter()
            .filter(|(path, _)| path.starts_with(prefix))
            .map(|(path, entry)| BlobInfo {
                path: path.clone(),
                created_at: entry.created_at,
                size_bytes: entry.bytes.len() as u64,
            })
            .collect())
    }

    fn delete_blob(&self, path: &str) -> Result<()> {
        if *self.fail_blob_deletes.borrow() {
            return Err(HubError::Store("simulated delete error".to_string()));
        }
        self.blobs.borrow_mut().remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_then_get_round_trips() {
        let gw = MemoryGateway::new();
        gw.set_document("users/u1/settings/layout", &json!({"a": 1}), false)
            .unwrap();
        let doc = gw.get_document("users/u1/settings/layout").unwrap();
        assert_eq!(doc, Some(json!({"a": 1})));
    }

    #[test]
    fn merge_write_preserves_existing_fields() {
        let gw = MemoryGateway::new();
        gw.set_document("d", &json!({"a": 1, "b": 2}), false).unwrap();
        gw.set_document("d", &json!({"b": 3}), true).unwrap();
        assert_eq!(gw.get_document("d").unwrap(), Some(json!({"a": 1, "b": 3})));
    }

    #[test]
    fn merge_on_absent_document_creates_it() {
        let gw = MemoryGateway::new();
        gw.set_document("d", &json!({"a": 1}), true).unwrap();
        assert_eq!(gw.get_document("d").unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn list_documents_only_returns_direct_children() {
        let gw = MemoryGateway::new();
        gw.set_document("users/u1/layoutPresets/p1", &json!({"id": "p1"}), false)
            .unwrap();
        gw.set_document("users/u1/layoutPresets/p2", &json!({"id": "p2"}), false)
            .unwrap();
        gw.set_document("users/u1/settings/layout", &json!({}), false)
            .unwrap();
        gw.set_document("users/u2/layoutPresets/p3", &json!({"id": "p3"}), false)
            .unwrap();

        let listed = gw.list_documents("users/u1/layoutPresets").unwrap();
        assert_eq!(listed.len(), 2);
    }

    #[test]
    fn delete_absent_document_is_ok() {
        let gw = MemoryGateway::new();
        gw.delete_document("nope").unwrap();
    }

    #[test]
    fn simulated_write_error_surfaces() {
        let gw = MemoryGateway::new();
        gw.set_fail_document_writes(true);
        assert!(gw.set_document("d", &json!({}), false).is_err());
    }

    #[test]
    fn blob_listing_filters_by_prefix() {
        let gw = MemoryGateway::new();
        gw.put_blob("backups/HealthHub/a.json", b"{}", "application/json", &HashMap::new())
            .unwrap();
        gw.put_blob("other/b.json", b"{}", "application/json", &HashMap::new())
            .unwrap();
        let listed = gw.list_blobs("backups/HealthHub/").unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, "backups/HealthHub/a.json");
        assert_eq!(listed[0].size_bytes, 2);
    }
}
