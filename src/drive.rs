//! The control loop tying sampling, detection, animation and rendering together

use crate::animation::{ScaleAnimator, TARGET_GROWTH};
use crate::clock::Clock;
use crate::error::Result;
use crate::gesture::{ShakeDetector, Verdict};
use crate::motion::{MotionSource, Point};
use crate::overlay::{Compositor, OverlayRenderer};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Tick interval while a shake or animation is in progress (~60 Hz)
pub const ACTIVE_INTERVAL: Duration = Duration::from_micros(16_667);
/// Longest wait for pointer motion while nothing is happening
pub const IDLE_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    Idle,
    Active,
}

impl Cadence {
    pub fn interval(self) -> Duration {
        match self {
            Cadence::Idle => IDLE_INTERVAL,
            Cadence::Active => ACTIVE_INTERVAL,
        }
    }
}

pub struct DriveLoop<S, C, K>
where
    S: MotionSource,
    C: Compositor,
    K: Clock,
{
    source: S,
    renderer: OverlayRenderer<C>,
    clock: K,
    detector: ShakeDetector,
    animator: ScaleAnimator,
    position: Point,
    needs_render: bool,
}

impl<S, C, K> DriveLoop<S, C, K>
where
    S: MotionSource,
    C: Compositor,
    K: Clock,
{
    pub fn new(mut source: S, renderer: OverlayRenderer<C>, clock: K) -> Result<Self> {
        let position = source.current_position()?;
        let detector = ShakeDetector::new(position, clock.now());

        Ok(Self {
            source,
            renderer,
            clock,
            detector,
            animator: ScaleAnimator::default(),
            position,
            needs_render: false,
        })
    }

    pub fn cadence(&self) -> Cadence {
        if !self.animator.is_at_rest() || self.detector.is_engaged() {
            Cadence::Active
        } else {
            Cadence::Idle
        }
    }

    pub fn scale(&self) -> f64 {
        self.animator.current()
    }

    pub fn target_scale(&self) -> f64 {
        self.animator.target()
    }

    pub fn is_shaking(&self) -> bool {
        self.detector.is_shaking()
    }

    /// Run one iteration: wait for motion, update state, draw if needed.
    ///
    /// Returns true if the overlay was redrawn.
    pub fn tick(&mut self) -> Result<bool> {
        let before = self.cadence();

        if let Some(position) = self.source.next_position(before.interval())? {
            self.ingest(position);
        }

        let cadence = self.cadence();
        if cadence != before {
            tracing::debug!(
                ?cadence,
                changes = self.detector.state().direction_changes,
                shaking = self.is_shaking(),
                scale = self.scale(),
                target = self.target_scale(),
                "cadence changed"
            );
        }

        if cadence == Cadence::Idle {
            // At rest the overlay is already down
            self.needs_render = false;
            return Ok(false);
        }

        if self.detector.check_timeout(self.clock.now()) {
            self.animator.reset_target();
            self.needs_render = true;
        }
        if self.animator.step() {
            self.needs_render = true;
        }

        if !self.needs_render {
            return Ok(false);
        }
        self.renderer.render(self.position, self.animator.current())?;
        self.renderer.flush()?;
        self.needs_render = false;
        Ok(true)
    }

    /// Tick until `running` is cleared, then hand the pointer back
    pub fn run(&mut self, running: &AtomicBool) -> Result<()> {
        while running.load(Ordering::SeqCst) {
            self.tick()?;
        }

        if self.renderer.is_hiding_pointer() || self.renderer.is_mapped() {
            tracing::debug!("restoring system pointer");
        }
        self.renderer.restore()?;
        self.renderer.flush()
    }

    fn ingest(&mut self, position: Point) {
        match self.detector.observe(position, self.clock.now()) {
            Verdict::Ignored => return,
            Verdict::Shaking => self.animator.raise_target(TARGET_GROWTH),
            Verdict::Calm => self.animator.reset_target(),
        }
        self.position = position;
        self.needs_render = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{MIN_SCALE, SCALE_STEP};
    use crate::overlay::tests::{Call, RecordingCompositor, GLYPH};
    use std::cell::Cell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct ManualClock(Rc<Cell<f64>>);

    impl Clock for ManualClock {
        fn now(&self) -> f64 {
            self.0.get()
        }
    }

    /// Replays a script of (time, motion) steps, one per wait
    struct ScriptedSource {
        clock: ManualClock,
        origin: Point,
        script: VecDeque<(f64, Option<Point>)>,
        waits: Vec<Duration>,
    }

    impl MotionSource for ScriptedSource {
        fn current_position(&mut self) -> Result<Point> {
            Ok(self.origin)
        }

        fn next_position(&mut self, timeout: Duration) -> Result<Option<Point>> {
            self.waits.push(timeout);
            match self.script.pop_front() {
                Some((time, motion)) => {
                    self.clock.0.set(time);
                    Ok(motion)
                }
                None => {
                    let now = self.clock.now() + timeout.as_secs_f64();
                    self.clock.0.set(now);
                    Ok(None)
                }
            }
        }
    }

    const ORIGIN: Point = Point { x: 300.0, y: 200.0 };
    const FRAME: f64 = 1.0 / 60.0;

    type TestLoop = DriveLoop<ScriptedSource, RecordingCompositor, ManualClock>;

    fn drive_loop(script: Vec<(f64, Option<Point>)>) -> (TestLoop, RecordingCompositor) {
        let clock = ManualClock::default();
        let source = ScriptedSource {
            clock: clock.clone(),
            origin: ORIGIN,
            script: script.into(),
            waits: Vec::new(),
        };
        let compositor = RecordingCompositor::default();
        let renderer = OverlayRenderer::new(compositor.clone(), GLYPH);
        let drive = DriveLoop::new(source, renderer, clock).unwrap();
        (drive, compositor)
    }

    /// `count` samples alternating 25px right and back, `spacing` seconds apart
    fn shake_script(start: f64, spacing: f64, count: usize) -> Vec<(f64, Option<Point>)> {
        (1..=count)
            .map(|i| {
                let x = if i % 2 == 1 { ORIGIN.x + 25.0 } else { ORIGIN.x };
                (start + spacing * i as f64, Some(Point::new(x, ORIGIN.y)))
            })
            .collect()
    }

    #[test]
    fn test_starts_idle_at_rest() {
        let (mut drive, compositor) = drive_loop(vec![]);
        assert_eq!(drive.cadence(), Cadence::Idle);
        assert!(!drive.tick().unwrap());
        assert_eq!(drive.source.waits, vec![IDLE_INTERVAL]);
        assert!(compositor.take().is_empty());
    }

    #[test]
    fn test_straight_travel_does_not_magnify() {
        let script = (1..=20)
            .map(|i| (0.02 * i as f64, Some(Point::new(ORIGIN.x + 30.0 * i as f64, ORIGIN.y))))
            .collect();
        let (mut drive, compositor) = drive_loop(script);

        for _ in 0..40 {
            drive.tick().unwrap();
            assert_eq!(drive.scale(), MIN_SCALE);
        }
        assert!(!drive.is_shaking());
        assert!(!compositor.take().contains(&Call::HidePointer));
        assert_eq!(drive.cadence(), Cadence::Idle);
    }

    #[test]
    fn test_held_still_pointer_times_out_without_motion() {
        let (mut drive, _compositor) = drive_loop(shake_script(0.0, 0.05, 3));
        for _ in 0..3 {
            drive.tick().unwrap();
        }
        assert_eq!(drive.cadence(), Cadence::Active);

        // No more samples; timeouts alone must bring the loop back to idle
        for _ in 0..30 {
            drive.tick().unwrap();
        }
        assert_eq!(drive.cadence(), Cadence::Idle);
        assert!(drive.source.waits[3..20].iter().all(|w| *w == ACTIVE_INTERVAL));
    }

    #[test]
    fn test_shake_grows_then_settles() {
        let mut script = shake_script(0.0, 0.05, 16);
        let last_sample = 0.05 * 16.0;
        // Stillness afterwards, one tick per frame
        script.extend((1..=40).map(|i| (last_sample + FRAME * i as f64, None)));
        let (mut drive, compositor) = drive_loop(script);

        // Seven reversals are not yet a shake
        for _ in 0..7 {
            drive.tick().unwrap();
        }
        assert!(!drive.is_shaking());
        assert_eq!(drive.scale(), MIN_SCALE);

        // The eighth starts it, and scale climbs with every following tick
        let mut previous = drive.scale();
        for _ in 7..16 {
            assert!(drive.tick().unwrap());
            assert!(drive.is_shaking());
            assert!(drive.scale() > previous);
            assert!((drive.scale() - drive.target_scale()).abs() < 1e-9);
            previous = drive.scale();
        }
        let peak = drive.scale();
        assert!((peak - (MIN_SCALE + 9.0 * TARGET_GROWTH)).abs() < 1e-9);

        let calls = compositor.take();
        assert_eq!(calls.iter().filter(|c| **c == Call::HidePointer).count(), 1);
        assert_eq!(calls.iter().filter(|c| **c == Call::Map).count(), 1);

        // Within the timeout the overlay holds still
        let mut ticks = 0;
        while drive.target_scale() > MIN_SCALE {
            assert_eq!(drive.scale(), peak);
            drive.tick().unwrap();
            ticks += 1;
        }
        assert!(ticks as f64 * FRAME > 0.3 - 1e-9);
        assert!(!drive.is_shaking());

        // Then it shrinks back within the step bound
        let bound = ((peak - MIN_SCALE) / SCALE_STEP).ceil() as usize;
        let mut shrink_ticks = 1;
        while drive.scale() > MIN_SCALE {
            drive.tick().unwrap();
            shrink_ticks += 1;
        }
        assert!(shrink_ticks <= bound + 1);

        let calls = compositor.take();
        assert!(calls.contains(&Call::Unmap));
        assert!(calls.contains(&Call::ShowPointer));
        assert_eq!(drive.cadence(), Cadence::Idle);
    }

    #[test]
    fn test_slow_reversals_stay_at_rest() {
        let (mut drive, compositor) = drive_loop(shake_script(0.0, 0.5, 12));
        for _ in 0..12 {
            drive.tick().unwrap();
            assert!(!drive.is_shaking());
            assert_eq!(drive.scale(), MIN_SCALE);
        }
        assert!(!compositor.take().contains(&Call::HidePointer));
    }

    #[test]
    fn test_run_restores_pointer_on_shutdown() {
        let (mut drive, compositor) = drive_loop(shake_script(0.0, 0.05, 10));
        for _ in 0..10 {
            drive.tick().unwrap();
        }
        assert!(drive.scale() > MIN_SCALE);
        compositor.take();

        let running = AtomicBool::new(false);
        drive.run(&running).unwrap();
        assert_eq!(
            compositor.take(),
            vec![Call::Unmap, Call::ShowPointer, Call::Flush]
        );
    }
}
