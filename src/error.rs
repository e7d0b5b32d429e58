use thiserror::Error;

#[derive(Error, Debug)]
pub enum HubError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Unknown card id: {0}")]
    UnknownCard(String),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Card '{0}' is not deletable")]
    NotDeletable(String),

    #[error("Preset not found: {0}")]
    PresetNotFound(String),

    #[error("Admin role required to {0}")]
    Forbidden(&'static str),

    #[error("Invalid backup document: {0}")]
    InvalidBackup(String),

    #[error("Restore failed during {step}: {reason}")]
    Restore { step: &'static str, reason: String },

    #[error("Backup upload failed: {0}")]
    Upload(String),
}

pub type Result<T> = std::result::Result<T, HubError>;
