//! Error taxonomy for the records store. Every variant is recoverable: the
//! front-end turns it into a message and the session carries on.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::models::RecordId;

/// Failures reported by [`Store`](super::Store) operations. None of them leave
/// the in-memory state inconsistent.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Another record already owns this registration number.
    #[error("Registration number {0} already exists.")]
    DuplicateRegistration(String),

    /// No record has the requested id.
    #[error("No student found with ID {0}.")]
    NotFound(RecordId),

    /// No id is left to assign; the file already uses the largest possible id.
    #[error("No student IDs are left to assign.")]
    IdsExhausted,

    /// A field holds text the records file cannot represent.
    #[error("{field} must not contain {reason}.")]
    InvalidField {
        field: &'static str,
        reason: &'static str,
    },

    /// The mutation was applied in memory but the backing file was not rewritten.
    #[error("could not save {}: {source}", .path.display())]
    PersistenceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The records file exists but could not be read at start-up.
    #[error("could not read {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
