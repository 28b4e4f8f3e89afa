use std::path::PathBuf;

/// Errors raised by the engagement engine and its file-facing helpers.
#[derive(Debug, thiserror::Error)]
pub enum EngagementError {
    #[error("invalid timestamp {value:?} on record {record}")]
    InvalidTimestamp { record: String, value: String },

    #[error("invalid config at {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid snapshot at {}: {message}", path.display())]
    Snapshot { path: PathBuf, message: String },
}

impl EngagementError {
    pub fn invalid_timestamp(record: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidTimestamp {
            record: record.into(),
            value: value.into(),
        }
    }
}
