use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::entity::{Rgb, DEFAULT_FONT_SIZE};
use crate::error::{Result, StickiesError};
use crate::manager::{ManagerOptions, PLACEMENT_ATTEMPTS};
use crate::storage::NoteSeed;

const CONFIG_FILE: &str = "stickies.yaml";
const NOTES_DIR: &str = "notes";

/// User configuration, read from `stickies.yaml`. Every field is optional in
/// the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickiesConfig {
    /// Directory holding the `<id>_state` / `<id>_text` records
    pub data_dir: Option<PathBuf>,
    /// Background of new notes
    pub default_color: Rgb,
    pub default_font_size: u32,
    /// Delay between hiding the notes and detaching them from the layer
    pub detach_delay_ms: u64,
    /// Upper bound on candidates tried when placing a new note
    pub placement_attempts: usize,
}

impl Default for StickiesConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            default_color: Rgb::default(),
            default_font_size: DEFAULT_FONT_SIZE,
            detach_delay_ms: 100,
            placement_attempts: PLACEMENT_ATTEMPTS,
        }
    }
}

impl StickiesConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => Ok(Self::default()),
            Ok(raw) => Ok(serde_yaml::from_str(&raw)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// `<platform config dir>/stickies.yaml`
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    /// Configured data directory, else `<platform data dir>/notes`
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(NOTES_DIR))
            .ok_or_else(|| {
                StickiesError::Io(std::io::Error::new(
                    ErrorKind::NotFound,
                    "no home directory to place notes in; pass --data-dir",
                ))
            })
    }

    pub fn seed(&self) -> NoteSeed {
        NoteSeed {
            color: self.default_color,
            font_size: self.default_font_size.max(2),
            position: None,
        }
    }

    pub fn manager_options(&self) -> ManagerOptions {
        ManagerOptions {
            detach_delay: Duration::from_millis(self.detach_delay_ms),
            placement_attempts: self.placement_attempts,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "stickies")
}
