/// Normal cursor size
pub const MIN_SCALE: f64 = 1.0;
/// Largest magnification
pub const MAX_SCALE: f64 = 30.0;
/// Largest change of the displayed scale in one tick
pub const SCALE_STEP: f64 = 0.8;
/// Target growth per motion sample while shaking
pub const TARGET_GROWTH: f64 = 0.15;

/// Moves the displayed scale toward a target by at most `SCALE_STEP` per tick
pub struct ScaleAnimator {
    current: f64,
    target: f64,
}

impl Default for ScaleAnimator {
    fn default() -> Self {
        Self {
            current: MIN_SCALE,
            target: MIN_SCALE,
        }
    }
}

impl ScaleAnimator {
    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_at_rest(&self) -> bool {
        self.current <= MIN_SCALE
    }

    pub fn raise_target(&mut self, amount: f64) {
        self.target = (self.target + amount).clamp(MIN_SCALE, MAX_SCALE);
    }

    pub fn reset_target(&mut self) {
        self.target = MIN_SCALE;
    }

    /// Advance one tick. Returns true if the displayed scale changed.
    pub fn step(&mut self) -> bool {
        if self.current < self.target {
            self.current = (self.current + SCALE_STEP).min(self.target);
            true
        } else if self.current > self.target {
            self.current = (self.current - SCALE_STEP).max(self.target);
            true
        } else {
            false
        }
    }
}
