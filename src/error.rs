use thiserror::Error;

use crate::entity::NoteId;

#[derive(Error, Debug)]
pub enum StickiesError {
    #[error("Note not found: {0}")]
    NoteNotFound(NoteId),

    #[error("Malformed state record for note {id}: {reason}")]
    MalformedState { id: NoteId, reason: String },

    #[error("Failed to create note {id}: {reason}")]
    CreationFailed { id: NoteId, reason: String },

    #[error("Shell error: {0}")]
    Shell(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, StickiesError>;
