pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod extension;
pub mod manager;
pub mod shell;
pub mod storage;

pub use config::StickiesConfig;
pub use error::{Result, StickiesError};
pub use extension::StickyNotes;
pub use manager::NoteManager;
pub use shell::{Event, Shell};
pub use storage::NoteStore;
