use std::io;
use std::path::PathBuf;

/// Hard failures that stop a recovery session
///
/// Damage inside a record is never an error; it is reported through
/// [`crate::models::Integrity`] on the decoded record.
#[derive(Debug, thiserror::Error)]
pub enum RecoveryError {
    #[error("I/O failure: {0}")]
    Io(#[from] io::Error),

    #[error("invalid phrase pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("invalid date '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { value: String },

    #[error("not a regular file: {}", path.display())]
    SourceNotFile { path: PathBuf },

    #[error("output {} would overwrite a source log", destination.display())]
    DestinationIsSource { destination: PathBuf },

    #[error(
        "output {} was already written for {} in this batch",
        destination.display(),
        first_source.display()
    )]
    DestinationConflict { destination: PathBuf, first_source: PathBuf },
}

pub type Result<T> = std::result::Result<T, RecoveryError>;
