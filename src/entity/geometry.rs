use serde::{Deserialize, Serialize};

pub const MIN_WIDTH: f64 = 200.0;
pub const MIN_HEIGHT: f64 = 75.0;
pub const DEFAULT_SIZE: Size = Size {
    width: 250.0,
    height: 180.0,
};

/// Top-left offset of a note on screen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

/// Visible working area of the monitor hosting the notes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkArea {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Floor both dimensions to the minimum note size; non-finite values fall
    /// back to the default size for that axis.
    pub fn floored(self) -> Self {
        let axis = |value: f64, min: f64, default: f64| {
            if value.is_finite() {
                value.max(min)
            } else {
                default
            }
        };
        Self {
            width: axis(self.width, MIN_WIDTH, DEFAULT_SIZE.width),
            height: axis(self.height, MIN_HEIGHT, DEFAULT_SIZE.height),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        DEFAULT_SIZE
    }
}

impl WorkArea {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Largest top-left coordinate that keeps a box of `size` inside the area.
    /// Pinned to the origin on any axis where the box does not fit.
    fn max_origin(&self, size: Size) -> Position {
        Position {
            x: self.x + (self.width - size.width).max(0.0),
            y: self.y + (self.height - size.height).max(0.0),
        }
    }

    /// Clamp a finite position so a note of `size` stays inside the area.
    pub fn clamp(&self, position: Position, size: Size) -> Position {
        let max = self.max_origin(size);
        Position {
            x: position.x.clamp(self.x, max.x),
            y: position.y.clamp(self.y, max.y),
        }
    }

    /// Map unit-interval samples onto the valid origins for a note of `size`.
    pub fn sample(&self, size: Size, ux: f64, uy: f64) -> Position {
        let max = self.max_origin(size);
        Position {
            x: self.x + (max.x - self.x) * ux,
            y: self.y + (max.y - self.y) * uy,
        }
    }
}

impl Default for WorkArea {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1920.0, 1080.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_floor() {
        assert_eq!(Size::new(10.0, 10.0).floored(), Size::new(MIN_WIDTH, MIN_HEIGHT));
        assert_eq!(Size::new(400.0, 90.0).floored(), Size::new(400.0, 90.0));
        assert_eq!(Size::new(f64::NAN, 300.0).floored(), Size::new(250.0, 300.0));
    }

    #[test]
    fn test_clamp_keeps_note_inside_area() {
        let area = WorkArea::new(0.0, 30.0, 1000.0, 800.0);
        let size = Size::new(250.0, 180.0);

        let clamped = area.clamp(Position::new(-50.0, 0.0), size);
        assert_eq!(clamped, Position::new(0.0, 30.0));

        let clamped = area.clamp(Position::new(990.0, 900.0), size);
        assert_eq!(clamped, Position::new(750.0, 650.0));

        let inside = Position::new(100.0, 100.0);
        assert_eq!(area.clamp(inside, size), inside);
    }

    #[test]
    fn test_clamp_pins_oversized_note_to_origin() {
        let area = WorkArea::new(10.0, 20.0, 100.0, 100.0);
        let clamped = area.clamp(Position::new(500.0, 500.0), Size::new(250.0, 180.0));
        assert_eq!(clamped, Position::new(10.0, 20.0));
    }

    #[test]
    fn test_sample_stays_in_range() {
        let area = WorkArea::default();
        let size = DEFAULT_SIZE;
        let low = area.sample(size, 0.0, 0.0);
        let high = area.sample(size, 1.0, 1.0);
        assert_eq!(low, Position::new(0.0, 0.0));
        assert_eq!(high, Position::new(1670.0, 900.0));
    }
}
