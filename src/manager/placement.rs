use crate::entity::{Position, Size};

pub const PLACEMENT_ATTEMPTS: usize = 15;

/// Two notes whose top-left corners are closer than this on both axes are
/// considered overlapping
pub const OVERLAP_TOLERANCE: Size = Size {
    width: 230.0,
    height: 100.0,
};

/// Outcome of a free-position search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Position,
    /// Candidates sampled, never more than the attempt bound
    pub attempts: usize,
    /// False when every candidate collided and the last one was kept anyway
    pub collision_free: bool,
}

pub fn overlaps(a: Position, b: Position) -> bool {
    (a.x - b.x).abs() < OVERLAP_TOLERANCE.width && (a.y - b.y).abs() < OVERLAP_TOLERANCE.height
}

/// Rejection-sample up to `max_attempts` candidates (at least one) and return
/// the first that overlaps none of `occupied`. This is a heuristic: when the
/// screen is crowded the last candidate is returned even though it collides.
pub fn find_free_position(
    occupied: &[Position],
    max_attempts: usize,
    mut sample: impl FnMut() -> Position,
) -> Placement {
    let max_attempts = max_attempts.max(1);
    let mut candidate = sample();
    let mut attempts = 1;

    loop {
        if !occupied.iter().any(|&taken| overlaps(taken, candidate)) {
            return Placement {
                position: candidate,
                attempts,
                collision_free: true,
            };
        }
        if attempts == max_attempts {
            return Placement {
                position: candidate,
                attempts,
                collision_free: false,
            };
        }
        candidate = sample();
        attempts += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_screen_takes_first_candidate() {
        let placement = find_free_position(&[], PLACEMENT_ATTEMPTS, || Position::new(10.0, 20.0));
        assert_eq!(placement.position, Position::new(10.0, 20.0));
        assert_eq!(placement.attempts, 1);
        assert!(placement.collision_free);
    }

    #[test]
    fn test_skips_colliding_candidates() {
        let occupied = [Position::new(0.0, 0.0)];
        let mut candidates = vec![
            Position::new(100.0, 50.0),
            Position::new(229.0, 0.0),
            Position::new(230.0, 0.0),
        ]
        .into_iter();

        let placement = find_free_position(&occupied, PLACEMENT_ATTEMPTS, || candidates.next().unwrap());
        assert_eq!(placement.position, Position::new(230.0, 0.0));
        assert_eq!(placement.attempts, 3);
        assert!(placement.collision_free);
    }

    #[test]
    fn test_crowded_screen_falls_back_to_last_candidate() {
        let occupied = [Position::new(0.0, 0.0)];
        let mut calls = 0;
        let placement = find_free_position(&occupied, PLACEMENT_ATTEMPTS, || {
            calls += 1;
            Position::new(calls as f64, 0.0)
        });

        assert_eq!(calls, PLACEMENT_ATTEMPTS);
        assert_eq!(placement.attempts, PLACEMENT_ATTEMPTS);
        assert_eq!(placement.position, Position::new(PLACEMENT_ATTEMPTS as f64, 0.0));
        assert!(!placement.collision_free);
    }

    #[test]
    fn test_zero_attempts_still_samples_once() {
        let placement = find_free_position(&[Position::new(0.0, 0.0)], 0, || Position::new(0.0, 0.0));
        assert_eq!(placement.attempts, 1);
        assert!(!placement.collision_free);
    }

    #[test]
    fn test_overlap_uses_tolerance_box() {
        let origin = Position::new(500.0, 500.0);
        assert!(overlaps(origin, Position::new(300.0, 420.0)));
        assert!(!overlaps(origin, Position::new(270.0, 500.0)));
        assert!(!overlaps(origin, Position::new(500.0, 600.0)));
    }
}
