use serde::{Deserialize, Serialize};

use super::{NoteId, Position, Rgb, Size, TextColor};

pub const DEFAULT_FONT_SIZE: u32 = 12;
pub const FONT_SIZE_STEP: i32 = 2;

/// Everything persisted in a note's state record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteState {
    pub position: Position,
    pub size: Size,
    pub color: Rgb,
    pub font_size: u32,
    pub text_visible: bool,
    pub bold: bool,
}

/// Pointer interaction in progress on a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interaction {
    #[default]
    Idle,
    Moving,
    Resizing,
}

/// A live note: its identity, persisted state, body, and transient UI state
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(flatten)]
    pub state: NoteState,
    pub body: String,
    #[serde(skip)]
    pub interaction: Interaction,
    #[serde(skip)]
    pub attached: bool,
    /// False while `body` stands in for a text record that could not be read.
    /// Such a body must not be written back over the record.
    #[serde(skip)]
    pub body_loaded: bool,
}

impl Note {
    pub fn new(id: NoteId, state: NoteState, body: String) -> Self {
        Self {
            id,
            state,
            body,
            interaction: Interaction::Idle,
            attached: false,
            body_loaded: true,
        }
    }

    pub fn text_color(&self) -> TextColor {
        self.state.color.text_color()
    }

    /// Apply a font size delta. Rejected, leaving the size untouched, when the
    /// result would be 1 or smaller or would not fit a `u32`.
    pub fn change_font_size(&mut self, delta: i32) -> bool {
        let next = self.state.font_size as i64 + delta as i64;
        match u32::try_from(next) {
            Ok(size) if size > 1 => {
                self.state.font_size = size;
                true
            }
            _ => false,
        }
    }

    /// Replace the body; it now owns the text record
    pub fn set_body(&mut self, body: String) {
        self.body = body;
        self.body_loaded = true;
    }

    pub fn toggle_bold(&mut self) {
        self.state.bold = !self.state.bold;
    }

    pub fn toggle_text_visible(&mut self) {
        self.state.text_visible = !self.state.text_visible;
    }

    pub fn move_by(&mut self, dx: f64, dy: f64) {
        self.interaction = Interaction::Moving;
        self.state.position.x += dx;
        self.state.position.y += dy;
    }

    pub fn resize_by(&mut self, dw: f64, dh: f64) {
        self.interaction = Interaction::Resizing;
        self.state.size = Size::new(self.state.size.width + dw, self.state.size.height + dh).floored();
    }

    /// End a drag. Returns true if a move or resize was in progress.
    pub fn release(&mut self) -> bool {
        let was_active = self.interaction != Interaction::Idle;
        self.interaction = Interaction::Idle;
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{MIN_HEIGHT, MIN_WIDTH};

    fn note_with_font(font_size: u32) -> Note {
        Note::new(
            NoteId(0),
            NoteState {
                position: Position::new(10.0, 10.0),
                size: Size::default(),
                color: Rgb::default(),
                font_size,
                text_visible: true,
                bold: false,
            },
            String::new(),
        )
    }

    #[test]
    fn test_font_size_floor() {
        let mut note = note_with_font(2);
        assert!(!note.change_font_size(-FONT_SIZE_STEP));
        assert_eq!(note.state.font_size, 2);

        let mut note = note_with_font(4);
        assert!(note.change_font_size(-FONT_SIZE_STEP));
        assert_eq!(note.state.font_size, 2);

        assert!(note.change_font_size(FONT_SIZE_STEP));
        assert_eq!(note.state.font_size, 4);
    }

    #[test]
    fn test_font_size_ceiling() {
        let mut note = note_with_font(u32::MAX);
        assert!(!note.change_font_size(FONT_SIZE_STEP));
        assert_eq!(note.state.font_size, u32::MAX);

        assert!(note.change_font_size(-FONT_SIZE_STEP));
        assert_eq!(note.state.font_size, u32::MAX - 2);
    }

    #[test]
    fn test_set_body_claims_text_record() {
        let mut note = note_with_font(12);
        note.body_loaded = false;
        note.set_body("fresh".to_string());
        assert_eq!(note.body, "fresh");
        assert!(note.body_loaded);
    }

    #[test]
    fn test_resize_is_floored() {
        let mut note = note_with_font(12);
        note.resize_by(-1000.0, -1000.0);
        assert_eq!(note.state.size, Size::new(MIN_WIDTH, MIN_HEIGHT));
        assert_eq!(note.interaction, Interaction::Resizing);
    }

    #[test]
    fn test_move_then_release() {
        let mut note = note_with_font(12);
        note.move_by(5.0, -3.0);
        assert_eq!(note.state.position, Position::new(15.0, 7.0));
        assert!(note.release());
        assert!(!note.release());
    }

    #[test]
    fn test_toggles() {
        let mut note = note_with_font(12);
        note.toggle_bold();
        note.toggle_text_visible();
        assert!(note.state.bold);
        assert!(!note.state.text_visible);
    }
}
