//! Lifecycle of the live note collection.
//!
//! Notes live in a `Vec` indexed by their ID. Creation appends, deletion
//! swaps the last note into the vacated slot, so the IDs of the collection
//! are always exactly `0..len`.

mod detach;
mod placement;

pub use detach::{Deferred, DetachTimer, Scheduled, DEFAULT_DETACH_DELAY};
pub use placement::{find_free_position, overlaps, Placement, OVERLAP_TOLERANCE, PLACEMENT_ATTEMPTS};

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info, warn};

use crate::entity::{Note, NoteId, Rgb, DEFAULT_SIZE};
use crate::error::{Result, StickiesError};
use crate::shell::{Event, Shell};
use crate::storage::{NoteSeed, NoteStore};

/// Tunables for a [`NoteManager`]
#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub detach_delay: Duration,
    pub placement_attempts: usize,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            detach_delay: DEFAULT_DETACH_DELAY,
            placement_attempts: PLACEMENT_ATTEMPTS,
        }
    }
}

pub struct NoteManager<S: Shell> {
    store: NoteStore,
    shell: S,
    notes: Vec<Note>,
    visible: bool,
    detach: DetachTimer,
    deferred_rx: Option<UnboundedReceiver<Deferred>>,
    placement_attempts: usize,
}

impl<S: Shell> NoteManager<S> {
    pub fn new(store: NoteStore, shell: S, options: ManagerOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            store,
            shell,
            notes: Vec::new(),
            visible: true,
            detach: DetachTimer::new(options.detach_delay, tx),
            deferred_rx: Some(rx),
            placement_attempts: options.placement_attempts,
        }
    }

    /// Receiver for deferred work. The owning event loop must feed every
    /// message back through [`NoteManager::handle_deferred`].
    pub fn take_deferred_receiver(&mut self) -> Option<UnboundedReceiver<Deferred>> {
        self.deferred_rx.take()
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn get(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_detach_pending(&self) -> bool {
        self.detach.is_pending()
    }

    pub fn store(&self) -> &NoteStore {
        &self.store
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut S {
        &mut self.shell
    }

    /// Populate the collection from the longest run of state records starting
    /// at ID 0. Creates one default note when the directory is empty.
    pub fn load_all(&mut self) -> Result<usize> {
        let seed = self.store.defaults().clone();
        let mut id = NoteId(0);
        while self.store.has_state(id) {
            self.insert(id, &seed, false)?;
            id = id.next();
        }

        if self.notes.is_empty() {
            info!("no stored notes, creating a default one");
            self.create_default()?;
        } else {
            self.warn_unreachable();
        }

        info!(count = self.notes.len(), dir = %self.store.dir().display(), "loaded notes");
        Ok(self.notes.len())
    }

    /// Create a note with the configured default color and font size
    pub fn create_default(&mut self) -> Result<NoteId> {
        let seed = self.store.defaults().clone();
        self.create(seed)
    }

    /// Append a new note. Without a seeded position, a free spot is searched.
    pub fn create(&mut self, mut seed: NoteSeed) -> Result<NoteId> {
        let id = NoteId::from_index(self.notes.len());
        if seed.position.is_none() && !self.store.has_state(id) {
            let placement = self.find_free_position();
            debug!(
                attempts = placement.attempts,
                collision_free = placement.collision_free,
                "placed new note"
            );
            seed.position = Some(placement.position);
        }
        self.insert(id, &seed, true)
    }

    /// Delete a note and its records, keeping IDs dense by moving the last
    /// note into the freed slot. Note order carries no meaning.
    pub fn delete(&mut self, id: NoteId) -> Result<()> {
        let index = id.index();
        if index >= self.notes.len() {
            return Err(StickiesError::NoteNotFound(id));
        }

        // Handlers go before the note leaves the collection
        self.detach_note(index);
        self.store.delete_record(id);

        let last = NoteId::from_index(self.notes.len() - 1);
        if id == last {
            self.notes.pop();
            info!(note = %id, "deleted note");
            return Ok(());
        }

        self.detach_note(last.index());
        self.notes.swap_remove(index);

        let note = &mut self.notes[index];
        note.id = id;
        let text = note.body_loaded.then_some(note.body.as_str());
        self.store.renumber(last, id, &mut note.state, text);
        info!(note = %id, moved_from = %last, "deleted note");

        if self.visible {
            self.attach_note(index);
        }
        self.debug_assert_dense();
        Ok(())
    }

    /// Best-effort search for a spot that does not cover another note
    pub fn find_free_position(&mut self) -> Placement {
        let occupied: Vec<_> = self.notes.iter().map(|n| n.state.position).collect();
        let store = &mut self.store;
        find_free_position(&occupied, self.placement_attempts, || {
            store.random_position(DEFAULT_SIZE)
        })
    }

    pub fn show_all(&mut self) {
        self.visible = true;
        if self.detach.cancel() {
            debug!("cancelled pending detach");
        }
        for index in 0..self.notes.len() {
            if !self.notes[index].attached {
                self.attach_note(index);
            }
            if self.notes[index].attached {
                self.shell.redraw(&self.notes[index], true);
            }
        }
    }

    pub fn hide_all(&mut self) {
        self.visible = false;
        for note in self.notes.iter().filter(|n| n.attached) {
            self.shell.redraw(note, false);
        }
        if self.detach.schedule() == Scheduled::Now {
            self.detach_all();
        }
    }

    pub fn toggle_visibility(&mut self) {
        if self.visible {
            self.hide_all();
        } else {
            self.show_all();
        }
    }

    pub fn handle_deferred(&mut self, deferred: Deferred) {
        match deferred {
            Deferred::DetachAll { generation } => {
                if self.detach.fire(generation) {
                    self.detach_all();
                } else {
                    debug!(generation, "ignoring stale detach");
                }
            }
        }
    }

    /// Route one shell event to the matching operation
    pub fn dispatch(&mut self, event: Event) -> Result<()> {
        match event {
            Event::CreateRequested => self.create_default().map(|_| ()),
            Event::DeleteRequested(id) => self.delete(id),
            Event::ColorChangeRequested(id, color) => self.set_color(id, color),
            Event::FontSizeChangeRequested(id, delta) => self.change_font_size(id, delta).map(|_| ()),
            Event::BoldToggleRequested(id) => self.toggle_bold(id),
            Event::TextVisibilityToggleRequested(id) => self.toggle_text_visible(id),
            Event::MoveDelta(id, dx, dy) => self.move_by(id, dx, dy),
            Event::ResizeDelta(id, dw, dh) => self.resize_by(id, dw, dh),
            Event::Released(id) => self.release(id).map(|_| ()),
            Event::TextChanged(id, text) => self.set_text(id, text),
            Event::ToggleVisibilityRequested => {
                self.toggle_visibility();
                Ok(())
            }
        }
    }

    pub fn set_color(&mut self, id: NoteId, color: Rgb) -> Result<()> {
        self.apply(id, |note| {
            note.state.color = color;
            true
        })
        .map(|_| ())
    }

    /// Returns false when the change was rejected by the font size floor
    pub fn change_font_size(&mut self, id: NoteId, delta: i32) -> Result<bool> {
        self.apply(id, |note| note.change_font_size(delta))
    }

    pub fn toggle_bold(&mut self, id: NoteId) -> Result<()> {
        self.apply(id, |note| {
            note.toggle_bold();
            true
        })
        .map(|_| ())
    }

    pub fn toggle_text_visible(&mut self, id: NoteId) -> Result<()> {
        self.apply(id, |note| {
            note.toggle_text_visible();
            true
        })
        .map(|_| ())
    }

    pub fn move_by(&mut self, id: NoteId, dx: f64, dy: f64) -> Result<()> {
        self.apply(id, |note| {
            note.move_by(dx, dy);
            false
        })
        .map(|_| ())
    }

    pub fn resize_by(&mut self, id: NoteId, dw: f64, dh: f64) -> Result<()> {
        self.apply(id, |note| {
            note.resize_by(dw, dh);
            false
        })
        .map(|_| ())
    }

    /// Finish a drag, persisting the new geometry. Returns true if a move or
    /// resize was in progress.
    pub fn release(&mut self, id: NoteId) -> Result<bool> {
        self.apply(id, Note::release)
    }

    pub fn set_text(&mut self, id: NoteId, text: String) -> Result<()> {
        let note = self
            .notes
            .get_mut(id.index())
            .ok_or(StickiesError::NoteNotFound(id))?;
        note.set_body(text);
        self.store.save_text(id, &note.body);
        Ok(())
    }

    /// Save every note's state and text. Text records that could not be read
    /// and were not edited since are left alone.
    pub fn persist_all(&mut self) {
        for note in &mut self.notes {
            self.store.save_state(note.id, &mut note.state);
            if note.body_loaded {
                self.store.save_text(note.id, &note.body);
            }
        }
    }

    /// Teardown: cancel deferred work, detach and persist every note, then
    /// drop the collection. Files stay on disk.
    pub fn shutdown(&mut self) {
        self.detach.cancel();
        for index in 0..self.notes.len() {
            self.detach_note(index);
        }
        self.persist_all();
        let count = self.notes.len();
        self.notes.clear();
        info!(count, "notes shut down");
    }

    pub fn into_shell(self) -> S {
        self.shell
    }

    /// Mutate one note. `f` returns whether the change should be persisted;
    /// that value is passed back to the caller.
    fn apply(&mut self, id: NoteId, f: impl FnOnce(&mut Note) -> bool) -> Result<bool> {
        let visible = self.visible;
        let note = self
            .notes
            .get_mut(id.index())
            .ok_or(StickiesError::NoteNotFound(id))?;

        let commit = f(note);
        if commit {
            self.store.save_state(note.id, &mut note.state);
        }
        if note.attached {
            self.shell.redraw(note, visible);
        }
        Ok(commit)
    }

    fn insert(&mut self, id: NoteId, seed: &NoteSeed, fresh: bool) -> Result<NoteId> {
        debug_assert_eq!(id.index(), self.notes.len());

        let existed = self.store.has_state(id);
        let state = self.store.load_or_init_state(id, seed);
        let body = self.store.try_load_text(id);
        let mut note = Note::new(id, state, body.clone().unwrap_or_default());
        note.body_loaded = body.is_some();
        self.notes.push(note);

        let index = id.index();
        if !self.visible || self.attach_note(index) {
            if fresh {
                info!(note = %id, "created note");
            }
            return Ok(id);
        }

        if !fresh {
            // Stored notes keep their slot so later IDs stay dense; the next
            // show-all retries the attach.
            warn!(note = %id, "stored note left detached");
            return Ok(id);
        }

        self.notes.pop();
        if !existed {
            self.store.delete_record(id);
        }
        self.shell.notify("Failed to create sticky note");
        Err(StickiesError::CreationFailed {
            id,
            reason: "the shell refused to attach the note".to_string(),
        })
    }

    /// Returns false when the shell failed to attach the note
    fn attach_note(&mut self, index: usize) -> bool {
        let note = &mut self.notes[index];
        match self.shell.attach(note) {
            Ok(()) => {
                note.attached = true;
                self.shell.redraw(note, self.visible);
                true
            }
            Err(e) => {
                error!(note = %note.id, error = %e, "failed to attach note");
                false
            }
        }
    }

    fn detach_note(&mut self, index: usize) {
        let note = &mut self.notes[index];
        if note.attached {
            self.shell.detach(note.id);
            note.attached = false;
        }
    }

    fn detach_all(&mut self) {
        for index in 0..self.notes.len() {
            self.detach_note(index);
        }
        debug!("detached all notes");
    }

    fn warn_unreachable(&self) {
        match self.store.list_ids() {
            Ok(ids) => {
                let beyond: Vec<_> = ids
                    .into_iter()
                    .filter(|id| id.index() >= self.notes.len())
                    .collect();
                if !beyond.is_empty() {
                    warn!(
                        loaded = self.notes.len(),
                        unreachable = ?beyond,
                        "state records past the first gap were not loaded"
                    );
                }
            }
            Err(e) => debug!(error = %e, "could not list note records"),
        }
    }

    fn debug_assert_dense(&self) {
        debug_assert!(self
            .notes
            .iter()
            .enumerate()
            .all(|(index, note)| note.id.index() == index));
    }
}
