use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::entity::{Note, NoteId, WorkArea};
use crate::error::{Result, StickiesError};
use crate::shell::Shell;

/// Shell stand-in for terminals: keeps track of the layer, renders nothing
pub struct HeadlessShell {
    area: WorkArea,
    layer: BTreeSet<NoteId>,
}

impl HeadlessShell {
    pub fn new(area: WorkArea) -> Self {
        Self {
            area,
            layer: BTreeSet::new(),
        }
    }

    pub fn attached(&self) -> usize {
        self.layer.len()
    }
}

impl Shell for HeadlessShell {
    fn work_area(&self) -> WorkArea {
        self.area
    }

    fn attach(&mut self, note: &Note) -> Result<()> {
        if !self.layer.insert(note.id) {
            return Err(StickiesError::Shell(format!("note {} is already on the layer", note.id)));
        }
        debug!(note = %note.id, "attached");
        Ok(())
    }

    fn detach(&mut self, id: NoteId) {
        self.layer.remove(&id);
        debug!(note = %id, "detached");
    }

    fn redraw(&mut self, note: &Note, visible: bool) {
        debug!(
            note = %note.id,
            visible,
            x = note.state.position.x,
            y = note.state.position.y,
            width = note.state.size.width,
            height = note.state.size.height,
            color = %note.state.color,
            text_color = %note.text_color(),
            "redraw"
        );
    }

    fn notify(&mut self, message: &str) {
        info!(message, "notification");
        eprintln!("[stickies] {}", message);
    }
}

/// Parse a `WIDTHxHEIGHT` screen size
pub fn parse_screen(value: &str) -> std::result::Result<WorkArea, String> {
    let (width, height) = value
        .split_once(|c| c == 'x' || c == 'X')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{}'", value))?;
    let width: f64 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width '{}'", width))?;
    let height: f64 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height '{}'", height))?;
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(format!("screen size must be positive, got '{}'", value));
    }
    Ok(WorkArea::new(0.0, 0.0, width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_screen() {
        assert_eq!(parse_screen("1280x720").unwrap(), WorkArea::new(0.0, 0.0, 1280.0, 720.0));
        assert!(parse_screen("1280").is_err());
        assert!(parse_screen("0x720").is_err());
        assert!(parse_screen("axb").is_err());
    }
}
