//! Scheduled blob backups and the retention sweep.
//!
//! An external scheduler invokes [`run_scheduled_backup`] periodically;
//! concurrent overlapping runs are not guarded against here and must be
//! prevented by a single-instance scheduler.
//!
//! The sweep's hard safety rule: if no blob at all falls inside the
//! retention window, nothing is deleted — even when old blobs exist. A
//! clock or metadata bug must never be able to erase the entire backup set.

use super::{builder, CleanupReport};
use crate::config::HubConfig;
use crate::error::{HubError, Result};
use crate::gateway::{BlobStore, DocumentStore};
use crate::model::{BackupData, BackupKind};
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};
use std::collections::HashMap;

/// Delete backup blobs older than the retention window.
///
/// Deletions are independent: one failed delete is logged and counted, and
/// the sweep moves on.
pub fn cleanup_old_backups<B: BlobStore>(
    store: &B,
    prefix: &str,
    retention_days: u32,
    now: DateTime<Utc>,
) -> Result<CleanupReport> {
    let cutoff = now - Duration::days(retention_days as i64);
    let blobs = store.list_blobs(prefix)?;

    let (recent, old): (Vec<_>, Vec<_>) = blobs.into_iter().partition(|b| b.created_at >= cutoff);

    let mut report = CleanupReport {
        kept_recent: recent.len(),
        ..Default::default()
    };

    if recent.is_empty() {
        let reason = format!(
            "no backup within the last {} days; refusing to delete {} old blob(s)",
            retention_days,
            old.len()
        );
        warn!("retention sweep skipped: {}", reason);
        report.skip_reason = Some(reason);
        return Ok(report);
    }

    for blob in old {
        match store.delete_blob(&blob.path) {
            Ok(()) => report.deleted += 1,
            Err(e) => {
                warn!("could not delete expired backup {}: {}", blob.path, e);
                report.failed_deletes += 1;
            }
        }
    }

    info!(
        "retention sweep: deleted {}, kept {}, failed {}",
        report.deleted, report.kept_recent, report.failed_deletes
    );
    Ok(report)
}

/// One scheduled run: build, upload, sweep.
///
/// Building the backup is the only fatal stage. Upload and cleanup outcomes
/// are reported separately — a cloud failure never invalidates the snapshot
/// that was already produced, and the sweep only runs after a successful
/// upload so it can never delete the last copies to make room for nothing.
#[derive(Debug)]
pub struct ScheduledRunReport {
    pub backup: BackupData,
    /// Blob path on successful upload.
    pub blob_path: Option<String>,
    pub upload_error: Option<String>,
    pub cleanup: Option<CleanupReport>,
}

pub fn run_scheduled_backup<S: DocumentStore + BlobStore>(
    store: &S,
    user_id: &str,
    user_email: &str,
    config: &HubConfig,
    now: DateTime<Utc>,
) -> Result<ScheduledRunReport> {
    let backup = builder::create_backup(store, user_id, user_email, BackupKind::Scheduled)?;
    let serialized = builder::to_pretty_json(&backup)?;
    let path = builder::scheduled_blob_path(&config.backup_prefix, now);

    let mut metadata = HashMap::new();
    metadata.insert("userId".to_string(), user_id.to_string());
    metadata.insert("backupDate".to_string(), backup.backup_date.to_rfc3339());

    match store.put_blob(&path, serialized.as_bytes(), "application/json", &metadata) {
        Ok(()) => {
            let cleanup =
                cleanup_old_backups(store, &config.backup_prefix, config.retention_days, now)?;
            Ok(ScheduledRunReport {
                backup,
                blob_path: Some(path),
                upload_error: None,
                cleanup: Some(cleanup),
            })
        }
        Err(e) => {
            let err = HubError::Upload(e.to_string());
            warn!("{}", err);
            Ok(ScheduledRunReport {
                backup,
                blob_path: None,
                upload_error: Some(err.to_string()),
                cleanup: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::memory::MemoryGateway;

    const PREFIX: &str = "backups/HealthHub";

    fn blob_path(name: &str) -> String {
        format!("{}/{}", PREFIX, name)
    }

    #[test]
    fn old_blobs_are_deleted_when_recent_ones_exist() {
        let gw = MemoryGateway::new();
        let now = Utc::now();
        gw.insert_blob_at(&blob_path("old-1.json"), b"{}", now - Duration::days(120));
        gw.insert_blob_at(&blob_path("old-2.json"), b"{}", now - Duration::days(91));
        gw.insert_blob_at(&blob_path("fresh.json"), b"{}", now - Duration::days(5));

        let report = cleanup_old_backups(&gw, PREFIX, 90, now).unwrap();
        assert_eq!(report.deleted, 2);
        assert_eq!(report.kept_recent, 1);
        assert!(report.skip_reason.is_none());

        let remaining = gw.list_blobs(PREFIX).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].path, blob_path("fresh.json"));
    }

    #[test]
    fn sweep_refuses_to_empty_the_backup_set() {
        let gw = MemoryGateway::new();
        let now = Utc::now();
        for i in 0..5 {
            gw.insert_blob_at(
                &blob_path(&format!("old-{}.json", i)),
                b"{}",
                now - Duration::days(100 + i),
            );
        }

        let report = cleanup_old_backups(&gw, PREFIX, 90, now).unwrap();
        assert_eq!(report.deleted, 0);
        assert!(report.skip_reason.is_some());
        assert_eq!(gw.list_blobs(PREFIX).unwrap().len(), 5);
    }

    #[test]
    fn delete_failures_are_counted_not_fatal() {
        let gw = MemoryGateway::new();
        let now = Utc::now();
        gw.insert_blob_at(&blob_path("old.json"), b"{}", now - Duration::days(120));
        gw.insert_blob_at(&blob_path("fresh.json"), b"{}", now - Duration::days(1));
        gw.set_fail_blob_deletes(true);

        let report = cleanup_old_backups(&gw, PREFIX, 90, now).unwrap();
        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed_deletes, 1);
    }

    #[test]
    fn blobs_outside_the_prefix_are_ignored() {
        let gw = MemoryGateway::new();
        let now = Utc::now();
        gw.insert_blob_at("unrelated/old.json", b"{}", now - Duration::days(365));
        gw.insert_blob_at(&blob_path("fresh.json"), b"{}", now - Duration::days(1));

        let report = cleanup_old_backups(&gw, PREFIX, 90, now).unwrap();
        assert_eq!(report.deleted, 0);
        assert!(gw.list_blobs("unrelated/").unwrap().len() == 1);
    }

    #[test]
    fn scheduled_run_uploads_then_sweeps() {
        let gw = MemoryGateway::new();
        let now = Utc::now();
        gw.insert_blob_at(&blob_path("ancient.json"), b"{}", now - Duration::days(200));

        let config = HubConfig::default();
        let report = run_scheduled_backup(&gw, "u1", "u1@example.com", &config, now).unwrap();

        let path = report.blob_path.expect("upload should succeed");
        assert!(path.ends_with("-healthhub-data.json"));
        assert!(report.upload_error.is_none());

        // The freshly uploaded blob counts as recent, so the sweep ran and
        // removed the ancient one.
        let cleanup = report.cleanup.unwrap();
        assert_eq!(cleanup.deleted, 1);
        assert_eq!(gw.list_blobs(PREFIX).unwrap().len(), 1);
    }
}
