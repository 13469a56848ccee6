use super::direction::Direction;
use crate::motion::Point;

/// Direction changes needed before a movement counts as a shake
pub const SHAKE_THRESHOLD: u32 = 8;
/// Seconds allowed between two direction changes of the same shake
pub const SHAKE_TIMEOUT: f64 = 0.3;
/// Samples closer than this to the previous one are ignored
pub const MIN_SAMPLE_DISTANCE: f64 = 1.0;

/// What a motion sample means for the target scale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Sub-pixel jitter, nothing changed
    Ignored,
    /// Pointer moved but is not shaking; target returns to minimum
    Calm,
    /// Pointer is shaking; target grows
    Shaking,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShakeState {
    pub direction_changes: u32,
    pub last_direction: Option<Direction>,
    pub last_change: f64,
    pub is_shaking: bool,
}

/// Counts rapid direction reversals to tell a shake apart from ordinary travel
pub struct ShakeDetector {
    state: ShakeState,
    last_position: Point,
}

impl ShakeDetector {
    pub fn new(origin: Point, now: f64) -> Self {
        Self {
            state: ShakeState {
                direction_changes: 0,
                last_direction: None,
                last_change: now,
                is_shaking: false,
            },
            last_position: origin,
        }
    }

    pub fn state(&self) -> &ShakeState {
        &self.state
    }

    pub fn is_shaking(&self) -> bool {
        self.state.is_shaking
    }

    /// True while a shake may be building up or is in progress
    pub fn is_engaged(&self) -> bool {
        self.state.direction_changes > 0 || self.state.is_shaking
    }

    /// Feed one pointer sample taken at `now`
    pub fn observe(&mut self, position: Point, now: f64) -> Verdict {
        let delta = position - self.last_position;
        if delta.length() < MIN_SAMPLE_DISTANCE {
            return Verdict::Ignored;
        }

        if self.is_stale(now) {
            self.state.direction_changes = 0;
            self.set_shaking(false);
        }

        let direction = Direction::classify(delta);
        if !direction.is_none() && self.state.last_direction != Some(direction) {
            if now - self.state.last_change < SHAKE_TIMEOUT {
                self.state.direction_changes += 1;
            } else {
                self.state.direction_changes = 1;
            }
            self.state.last_change = now;
            self.state.last_direction = Some(direction);
        }

        self.last_position = position;

        if self.state.direction_changes >= SHAKE_THRESHOLD {
            self.set_shaking(true);
            Verdict::Shaking
        } else {
            Verdict::Calm
        }
    }

    /// Drop an unfinished or finished shake once the pointer has settled.
    ///
    /// Returns true if anything was reset.
    pub fn check_timeout(&mut self, now: f64) -> bool {
        if !self.is_stale(now) || !self.is_engaged() {
            return false;
        }
        self.state.direction_changes = 0;
        self.set_shaking(false);
        true
    }

    fn is_stale(&self, now: f64) -> bool {
        now - self.state.last_change > SHAKE_TIMEOUT
    }

    fn set_shaking(&mut self, shaking: bool) {
        if self.state.is_shaking != shaking {
            tracing::debug!(shaking, changes = self.state.direction_changes, "shake state changed");
        }
        self.state.is_shaking = shaking;
    }
}
