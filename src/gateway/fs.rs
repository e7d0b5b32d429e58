use super::{BlobInfo, BlobStore, DocumentStore};
use crate::error::{HubError, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use uuid::Uuid;

/// Filesystem gateway: documents and blobs as files under a root directory.
///
/// Documents live at `<root>/documents/<path>.json`, blobs at
/// `<root>/blobs/<path>`. Writes go through a tmp-then-rename step so a
/// crash mid-write never leaves a half-written document behind.
pub struct FsGateway {
    root: PathBuf,
}

impl FsGateway {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Gateway rooted at the OS-appropriate data directory.
    pub fn at_default_root() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "healthhub")
            .ok_or_else(|| HubError::Store("no home directory available".to_string()))?;
        Ok(Self::new(dirs.data_dir().to_path_buf()))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_file(&self, path: &str) -> PathBuf {
        self.root.join("documents").join(format!("{}.json", path))
    }

    fn blob_file(&self, path: &str) -> PathBuf {
        self.root.join("blobs").join(path)
    }

    fn write_atomic(&self, target: &Path, bytes: &[u8]) -> Result<()> {
        let parent = target
            .parent()
            .ok_or_else(|| HubError::Store(format!("no parent for {}", target.display())))?;
        fs::create_dir_all(parent)?;

        let tmp = parent.join(format!(".write-{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, target)?;
        Ok(())
    }
}

impl DocumentStore for FsGateway {
    fn get_document(&self, path: &str) -> Result<Option<Value>> {
        let file = self.document_file(path);
        if !file.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(file)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn set_document(&self, path: &str, value: &Value, merge: bool) -> Result<()> {
        let merged = if merge {
            match self.get_document(path)? {
                Some(mut existing) => {
                    super::merge_documents(&mut existing, value);
                    existing
                }
                None => value.clone(),
            }
        } else {
            value.clone()
        };
        let content = serde_json::to_string_pretty(&merged)?;
        self.write_atomic(&self.document_file(path), content.as_bytes())
    }

    fn delete_document(&self, path: &str) -> Result<()> {
        let file = self.document_file(path);
        if file.exists() {
            fs::remove_file(file)?;
        }
        Ok(())
    }

    fn list_documents(&self, collection: &str) -> Result<Vec<Value>> {
        let dir = self.root.join("documents").join(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        let mut entries: Vec<PathBuf> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json")
            })
            .collect();
        entries.sort();

        for path in entries {
            let content = fs::read_to_string(&path)?;
            documents.push(serde_json::from_str(&content)?);
        }
        Ok(documents)
    }
}

impl BlobStore for FsGateway {
    fn put_blob(
        &self,
        path: &str,
        bytes: &[u8],
        _content_type: &str,
        _metadata: &HashMap<String, String>,
    ) -> Result<()> {
        self.write_atomic(&self.blob_file(path), bytes)
    }

    fn list_blobs(&self, prefix: &str) -> Result<Vec<BlobInfo>> {
        let base = self.root.join("blobs");
        if !base.exists() {
            return Ok(Vec::new());
        }

        let mut blobs = Vec::new();
        collect_blobs(&base, &base, &mut blobs)?;
        blobs.retain(|info| info.path.starts_with(prefix));
        blobs.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(blobs)
    }

    fn delete_blob(&self, path: &str) -> Result<()> {
        let file = self.blob_file(path);
        if file.exists() {
            fs::remove_file(file)?;
        }
        Ok(())
    }
}

fn collect_blobs(base: &Path, dir: &Path, out: &mut Vec<BlobInfo>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_blobs(base, &path, out)?;
        } else if path.is_file() {
            let meta = fs::metadata(&path)?;
            let created_at: DateTime<Utc> = meta.modified().unwrap_or(SystemTime::now()).into();
            let rel = path
                .strip_prefix(base)
                .map_err(|e| HubError::Store(e.to_string()))?;
            out.push(BlobInfo {
                path: rel.to_string_lossy().replace('\\', "/"),
                created_at,
                size_bytes: meta.len(),
            });
        }
    }
    Ok(())
}
