mod note_store;

pub use note_store::{NoteSeed, NoteStore, StoreStats};
