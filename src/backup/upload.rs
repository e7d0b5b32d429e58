//! Admission checks for the backup upload endpoint.
//!
//! The checks are transport-agnostic: the HTTP adapter maps its request
//! into [`UploadRequest`] and maps [`UploadRejection`] back to a status
//! line. Authorization is presence-only here; verifying the credential is
//! the adapter's job and happens before the payload is accepted.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Other,
}

/// Decoded upload request, independent of the HTTP framework in front.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub method: HttpMethod,
    /// Raw Authorization header value, if one was sent.
    pub authorization: Option<String>,
    pub backup_data: Option<Value>,
    /// Destination folder in the remote drive.
    pub folder_id: Option<String>,
}

/// Why a request was refused before any upload work started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{status}: {message}")]
pub struct UploadRejection {
    pub status: u16,
    pub message: String,
}

impl UploadRejection {
    fn new(status: u16, message: &str) -> Self {
        UploadRejection {
            status,
            message: message.to_string(),
        }
    }
}

/// Accepted payload, ready to hand to the drive client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedUpload {
    pub backup_data: Value,
    pub folder_id: String,
}

/// Run the admission checks in order: method, credential presence, payload
/// completeness. The first violation wins.
pub fn admit_upload(request: UploadRequest) -> Result<AcceptedUpload, UploadRejection> {
    if request.method != HttpMethod::Post {
        return Err(UploadRejection::new(405, "method not allowed"));
    }

    if request
        .authorization
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .is_none()
    {
        return Err(UploadRejection::new(401, "missing authorization header"));
    }

    let backup_data = match request.backup_data {
        Some(data) => data,
        None => return Err(UploadRejection::new(400, "missing backupData")),
    };
    let folder_id = match request.folder_id {
        Some(id) if !id.is_empty() => id,
        _ => return Err(UploadRejection::new(400, "missing folderId")),
    };

    Ok(AcceptedUpload {
        backup_data,
        folder_id,
    })
}
