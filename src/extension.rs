//! Plugin entry points called by the host shell.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::StickiesConfig;
use crate::error::Result;
use crate::manager::NoteManager;
use crate::shell::Shell;
use crate::storage::NoteStore;

pub struct StickyNotes<S: Shell> {
    config: StickiesConfig,
    data_dir: PathBuf,
    manager: Option<NoteManager<S>>,
}

impl<S: Shell> StickyNotes<S> {
    pub fn new(config: StickiesConfig, data_dir: PathBuf) -> Self {
        Self {
            config,
            data_dir,
            manager: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.manager.is_some()
    }

    pub fn manager(&self) -> Option<&NoteManager<S>> {
        self.manager.as_ref()
    }

    pub fn manager_mut(&mut self) -> Option<&mut NoteManager<S>> {
        self.manager.as_mut()
    }

    /// Open the notes directory and load every stored note onto `shell`.
    /// Activating twice keeps the running manager and drops `shell`.
    pub fn activate(&mut self, shell: S) -> Result<&mut NoteManager<S>> {
        let manager = match self.manager.take() {
            Some(manager) => {
                warn!("already active");
                manager
            }
            None => {
                let store = NoteStore::open(&self.data_dir, shell.work_area(), self.config.seed())?;
                let mut manager = NoteManager::new(store, shell, self.config.manager_options());
                manager.load_all()?;
                info!(dir = %self.data_dir.display(), "sticky notes activated");
                manager
            }
        };
        Ok(self.manager.insert(manager))
    }

    /// Persist and detach every note, keeping the files. Hands the shell back.
    pub fn deactivate(&mut self) -> Option<S> {
        let mut manager = self.manager.take()?;
        manager.shutdown();
        info!("sticky notes deactivated");
        Some(manager.into_shell())
    }
}
