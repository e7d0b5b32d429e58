//! Structural validation of backup documents.
//!
//! The check is shape-only, no deep typing: it exists to give the user a
//! complete list of what is wrong with a file before any restore is
//! attempted, so every violation is accumulated rather than failing fast.

use crate::error::{HubError, Result};
use crate::model::BackupData;
use serde_json::Value;

/// Outcome of validating a candidate backup document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Check that `doc` has the structure of a backup document. This is the
/// sole gate before restore; a restore must never run on an unvalidated
/// document.
pub fn validate_backup(doc: &Value) -> ValidationReport {
    let mut errors = Vec::new();

    if doc.get("version").is_none() {
        errors.push("missing required field: version".to_string());
    }
    if doc.get("backupDate").is_none() {
        errors.push("missing required field: backupDate".to_string());
    }
    if doc.get("userId").is_none() {
        errors.push("missing required field: userId".to_string());
    }

    match doc.get("data") {
        None => errors.push("missing required field: data".to_string()),
        Some(data) => {
            if data.get("layouts").is_none() {
                errors.push("missing required field: data.layouts".to_string());
            }
            match data.get("textCards") {
                None => errors.push("missing required field: data.textCards".to_string()),
                Some(cards) if !cards.is_array() => {
                    errors.push("data.textCards must be an array".to_string());
                }
                Some(_) => {}
            }
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

/// Validate and deserialize in one step, for callers heading into restore.
pub fn parse_backup(doc: &Value) -> Result<BackupData> {
    let report = validate_backup(doc);
    if !report.valid {
        return Err(HubError::InvalidBackup(report.errors.join("; ")));
    }
    Ok(serde_json::from_value(doc.clone())?)
}
