//! Boundary with the host shell toolkit.
//!
//! The core never draws anything. It tells the [`Shell`] which notes belong on
//! the rendering layer and receives user input back as [`Event`]s.

use crate::entity::{Note, NoteId, Rgb, WorkArea};
use crate::error::Result;

/// Rendering and notification services provided by the host
pub trait Shell {
    /// Visible working area of the primary monitor
    fn work_area(&self) -> WorkArea;

    /// Put a note on the rendering layer and connect its input handlers
    fn attach(&mut self, note: &Note) -> Result<()>;

    /// Disconnect the handlers of `id` and take it off the rendering layer
    fn detach(&mut self, id: NoteId);

    /// Redraw an attached note after its state changed. `visible` is the
    /// process-wide show/hide flag.
    fn redraw(&mut self, note: &Note, visible: bool);

    /// User-visible notification
    fn notify(&mut self, message: &str);
}

/// Input produced by the shell for the note manager
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    CreateRequested,
    DeleteRequested(NoteId),
    ColorChangeRequested(NoteId, Rgb),
    FontSizeChangeRequested(NoteId, i32),
    BoldToggleRequested(NoteId),
    TextVisibilityToggleRequested(NoteId),
    MoveDelta(NoteId, f64, f64),
    ResizeDelta(NoteId, f64, f64),
    /// Pointer released after a move or resize
    Released(NoteId),
    TextChanged(NoteId, String),
    ToggleVisibilityRequested,
}
