use crate::motion::Point;

/// Displacements at or below this on both axes are treated as no movement
pub const MOVEMENT_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    None,
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Classify a displacement by its dominant axis.
    ///
    /// Equal magnitudes on both axes count as vertical movement. Screen
    /// coordinates grow downwards, so a positive `y` is `Down`.
    pub fn classify(delta: Point) -> Direction {
        let (ax, ay) = (delta.x.abs(), delta.y.abs());

        if ax <= MOVEMENT_THRESHOLD && ay <= MOVEMENT_THRESHOLD {
            return Direction::None;
        }

        if ax > ay {
            if delta.x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if delta.y > 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    pub fn is_none(self) -> bool {
        self == Direction::None
    }
}
