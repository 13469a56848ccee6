//! Pointer positions and the sources that produce them

use crate::error::Result;
use std::ops::Sub;
use std::time::Duration;

/// A point in absolute screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Supplies pointer positions, either on demand or when the pointer moves
pub trait MotionSource {
    /// Query the pointer position right now
    fn current_position(&mut self) -> Result<Point>;

    /// Block for at most `timeout` waiting for the pointer to move.
    ///
    /// Returns the latest position if any motion was reported, `None` if the
    /// timeout elapsed first.
    fn next_position(&mut self, timeout: Duration) -> Result<Option<Point>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_displacement_is_current_minus_previous() {
        let delta = Point::new(130.0, 95.0) - Point::new(100.0, 100.0);
        assert_eq!(delta, Point::new(30.0, -5.0));
    }

    #[test]
    fn test_length() {
        assert!((Point::new(3.0, 4.0).length() - 5.0).abs() < 1e-9);
        assert_eq!(Point::default().length(), 0.0);
    }
}
