use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, warn};

use crate::entity::{
    NoteId, NoteState, Position, Rgb, Size, WorkArea, DEFAULT_FONT_SIZE, DEFAULT_SIZE,
};
use crate::error::{Result, StickiesError};

const STATE_SUFFIX: &str = "_state";
const TEXT_SUFFIX: &str = "_text";
const TMP_SUFFIX: &str = ".tmp";

/// Values used when a note has no state record yet
#[derive(Debug, Clone, PartialEq)]
pub struct NoteSeed {
    pub color: Rgb,
    pub font_size: u32,
    /// Preferred top-left; a random spot inside the work area when `None`
    pub position: Option<Position>,
}

impl Default for NoteSeed {
    fn default() -> Self {
        Self {
            color: Rgb::default(),
            font_size: DEFAULT_FONT_SIZE,
            position: None,
        }
    }
}

/// Write/remove counters since the store was opened
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    pub state_writes: usize,
    pub text_writes: usize,
    pub removals: usize,
}

/// On-disk shape of `<id>_state`. Every field is optional so that a record
/// with a single bad value can be repaired instead of discarded.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateRecord {
    x: Option<f64>,
    y: Option<f64>,
    color: Option<Rgb>,
    width: Option<f64>,
    height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_font_size")]
    font_size: Option<u32>,
    entry_visible: Option<bool>,
    is_bold: Option<bool>,
}

impl From<&NoteState> for StateRecord {
    fn from(state: &NoteState) -> Self {
        Self {
            x: Some(state.position.x),
            y: Some(state.position.y),
            color: Some(state.color),
            width: Some(state.size.width),
            height: Some(state.size.height),
            font_size: Some(state.font_size),
            entry_visible: Some(state.text_visible),
            is_bold: Some(state.bold),
        }
    }
}

/// Persists each note as two files keyed by its ID: `<id>_state` (JSON) and
/// `<id>_text` (raw body).
///
/// Reads never fail from the caller's point of view: missing or malformed
/// records are replaced by defaults and write failures are logged.
pub struct NoteStore {
    dir: PathBuf,
    area: WorkArea,
    defaults: NoteSeed,
    rng: StdRng,
    stats: StoreStats,
}

impl NoteStore {
    /// Open the notes directory, creating it if missing
    pub fn open(dir: impl Into<PathBuf>, area: WorkArea, defaults: NoteSeed) -> Result<Self> {
        let store = Self::open_read_only(dir, area, defaults);
        fs::create_dir_all(&store.dir)?;
        Ok(store)
    }

    /// Open without touching the filesystem. Use only the `peek_*` readers
    /// on a store opened this way.
    pub fn open_read_only(dir: impl Into<PathBuf>, area: WorkArea, defaults: NoteSeed) -> Self {
        Self {
            dir: dir.into(),
            area,
            defaults,
            rng: StdRng::from_entropy(),
            stats: StoreStats::default(),
        }
    }

    /// Replace the position generator, e.g. with a seeded one
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn area(&self) -> WorkArea {
        self.area
    }

    pub fn set_area(&mut self, area: WorkArea) {
        self.area = area;
    }

    pub fn defaults(&self) -> &NoteSeed {
        &self.defaults
    }

    pub fn stats(&self) -> StoreStats {
        self.stats
    }

    pub fn state_path(&self, id: NoteId) -> PathBuf {
        self.dir.join(format!("{}{}", id, STATE_SUFFIX))
    }

    pub fn text_path(&self, id: NoteId) -> PathBuf {
        self.dir.join(format!("{}{}", id, TEXT_SUFFIX))
    }

    /// Whether `<id>_state` exists; drives the directory scan
    pub fn has_state(&self, id: NoteId) -> bool {
        self.state_path(id).is_file()
    }

    /// Every ID with a state record on disk, sorted, gaps included
    pub fn list_ids(&self) -> Result<Vec<NoteId>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(stem) = name.strip_suffix(STATE_SUFFIX) {
                if let Ok(id) = stem.parse::<NoteId>() {
                    ids.push(id);
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Random top-left inside the work area for a note of `size`
    pub fn random_position(&mut self, size: Size) -> Position {
        let ux: f64 = self.rng.gen();
        let uy: f64 = self.rng.gen();
        self.area.sample(size, ux, uy)
    }

    /// Load the state record for `id` using the store's default seed
    pub fn load_state(&mut self, id: NoteId) -> NoteState {
        let seed = self.defaults.clone();
        self.load_or_init_state(id, &seed)
    }

    /// Load the state record for `id`. A missing or malformed record is
    /// replaced by a default built from `seed`, which is written back.
    pub fn load_or_init_state(&mut self, id: NoteId, seed: &NoteSeed) -> NoteState {
        match self.read_state(id, seed) {
            Ok(Some(mut state)) => {
                self.normalize(&mut state);
                state
            }
            Ok(None) => {
                debug!(note = %id, "no state record, writing defaults");
                self.init_state(id, seed)
            }
            Err(e) => {
                warn!(note = %id, error = %e, "unreadable state record, resetting to defaults");
                self.init_state(id, seed)
            }
        }
    }

    /// Clamp `state` in place and atomically overwrite the state record.
    /// Write failures are logged; the in-memory state is kept either way.
    pub fn save_state(&mut self, id: NoteId, state: &mut NoteState) {
        self.normalize(state);
        if let Err(e) = self.write_state(id, state) {
            warn!(note = %id, error = %e, "failed to write state record");
        }
    }

    /// Read the text record, creating an empty one if it does not exist.
    /// An unreadable record reads as empty.
    pub fn load_text(&mut self, id: NoteId) -> String {
        self.try_load_text(id).unwrap_or_default()
    }

    /// Like [`NoteStore::load_text`], but `None` when the record exists and
    /// cannot be read (I/O error, invalid UTF-8). The record is left as is.
    pub fn try_load_text(&mut self, id: NoteId) -> Option<String> {
        let path = self.text_path(id);
        match fs::read_to_string(&path) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                self.save_text(id, "");
                Some(String::new())
            }
            Err(e) => {
                warn!(note = %id, error = %e, "failed to read text record");
                None
            }
        }
    }

    /// State record for `id` as the next load would see it, without repairing
    /// or writing anything. Non-finite coordinates are left as read.
    pub fn peek_state(&self, id: NoteId) -> Result<Option<NoteState>> {
        let Some(mut state) = self.read_state(id, &self.defaults)? else {
            return Ok(None);
        };
        state.size = state.size.floored();
        if state.position.is_finite() {
            state.position = self.area.clamp(state.position, state.size);
        }
        Ok(Some(state))
    }

    /// Text record for `id`, invalid UTF-8 replaced. `None` when missing.
    pub fn peek_text(&self, id: NoteId) -> Result<Option<String>> {
        match fs::read(self.text_path(id)) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_text(&mut self, id: NoteId, text: &str) {
        let path = self.text_path(id);
        match write_atomic(&path, text.as_bytes()) {
            Ok(()) => self.stats.text_writes += 1,
            Err(e) => warn!(note = %id, error = %e, "failed to write text record"),
        }
    }

    /// Remove both records for `id`. Missing files are fine.
    pub fn delete_record(&mut self, id: NoteId) {
        for path in [self.state_path(id), self.text_path(id)] {
            match fs::remove_file(&path) {
                Ok(()) => self.stats.removals += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => warn!(note = %id, path = %path.display(), error = %e, "failed to remove record"),
            }
        }
    }

    /// Persist a note that moved from `from` to `to` and drop the records it
    /// left behind. With `text` of `None` the text record is moved as is.
    pub fn renumber(&mut self, from: NoteId, to: NoteId, state: &mut NoteState, text: Option<&str>) {
        self.save_state(to, state);
        match text {
            Some(text) => self.save_text(to, text),
            None if from != to => {
                if let Err(e) = fs::rename(self.text_path(from), self.text_path(to)) {
                    warn!(from = %from, to = %to, error = %e, "failed to move text record");
                }
            }
            None => {}
        }
        if from != to {
            self.delete_record(from);
        }
        debug!(from = %from, to = %to, "renumbered note");
    }

    fn init_state(&mut self, id: NoteId, seed: &NoteSeed) -> NoteState {
        let size = DEFAULT_SIZE;
        let position = match seed.position {
            Some(position) if position.is_finite() => position,
            _ => self.random_position(size),
        };
        let mut state = NoteState {
            position,
            size,
            color: seed.color,
            font_size: valid_font_size(seed.font_size as f64).unwrap_or(DEFAULT_FONT_SIZE),
            text_visible: true,
            bold: false,
        };
        self.save_state(id, &mut state);
        state
    }

    /// `Ok(None)` when the record does not exist
    fn read_state(&self, id: NoteId, seed: &NoteSeed) -> Result<Option<NoteState>> {
        let raw = match fs::read_to_string(self.state_path(id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: StateRecord =
            serde_json::from_str(&raw).map_err(|e| StickiesError::MalformedState {
                id,
                reason: e.to_string(),
            })?;

        // Missing or NaN coordinates come back as non-finite and are
        // re-randomized by normalize()
        let position = Position::new(
            record.x.unwrap_or(f64::NAN),
            record.y.unwrap_or(f64::NAN),
        );
        let size = Size::new(
            record.width.unwrap_or(f64::NAN),
            record.height.unwrap_or(f64::NAN),
        );

        Ok(Some(NoteState {
            position,
            size,
            color: record.color.unwrap_or(seed.color),
            font_size: record.font_size.unwrap_or(seed.font_size),
            text_visible: record.entry_visible.unwrap_or(true),
            bold: record.is_bold.unwrap_or(false),
        }))
    }

    fn normalize(&mut self, state: &mut NoteState) {
        state.size = state.size.floored();
        state.position = if state.position.is_finite() {
            self.area.clamp(state.position, state.size)
        } else {
            self.random_position(state.size)
        };
        if state.font_size <= 1 {
            state.font_size = DEFAULT_FONT_SIZE;
        }
    }

    fn write_state(&mut self, id: NoteId, state: &NoteState) -> Result<()> {
        let json = serde_json::to_vec(&StateRecord::from(state))?;
        write_atomic(&self.state_path(id), &json)?;
        self.stats.state_writes += 1;
        Ok(())
    }
}

fn valid_font_size(value: f64) -> Option<u32> {
    if value.is_finite() && value >= 2.0 {
        Some(value.round().min(u32::MAX as f64) as u32)
    } else {
        None
    }
}

/// `fontSize` is written as an integer, but fractional values such as `12.0`
/// are accepted. Values below 2 read as absent.
fn lenient_font_size<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.and_then(valid_font_size))
}

/// Write to a sibling temp file, then rename it over `path`
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(TMP_SUFFIX);
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
