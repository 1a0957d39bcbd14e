//! Frame driver
//!
//! Wall-clock frame time is noisy, so it is first clamped and averaged by the
//! `DeltaSmoother`, then fed into a `FixedTimestep` accumulator. The
//! simulation only ever sees whole fixed steps; rendering happens once per
//! frame no matter how many steps ran.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use crate::app::GameContext;
use crate::config::TimingConfig;
use crate::error::GameError;
use crate::platform::input::InputFrame;
use crate::platform::surface::{Rgba, Surface};

use super::scene::SceneStack;

/// Clamps raw frame times and averages the last few.
#[derive(Debug, Clone)]
pub struct DeltaSmoother {
    samples: VecDeque<f32>,
    capacity: usize,
    min_dt: f32,
    max_dt: f32,
    smoothed: f32,
}

impl DeltaSmoother {
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;

    pub fn new(capacity: usize, min_dt: f32, max_dt: f32) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            min_dt,
            max_dt,
            smoothed: Self::DEFAULT_DT,
        }
    }

    pub fn from_config(timing: &TimingConfig) -> Self {
        Self::new(timing.smoothing_samples, timing.min_frame_time, timing.max_frame_time)
    }

    /// Add one raw sample and return the new average.
    pub fn smooth(&mut self, raw_dt: f32) -> f32 {
        let dt = if raw_dt.is_finite() {
            raw_dt.clamp(self.min_dt, self.max_dt)
        } else {
            self.max_dt
        };
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(dt);
        self.smoothed = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
        self.smoothed
    }

    pub fn current(&self) -> f32 {
        self.smoothed
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.smoothed = Self::DEFAULT_DT;
    }
}

impl Default for DeltaSmoother {
    fn default() -> Self {
        Self::new(10, 0.001, 0.1)
    }
}

/// Fixed-step accumulator.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    step: f32,
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            accumulator: 0.0,
        }
    }

    /// Add `frame_time` and consume as many whole steps as fit.
    /// The leftover stays in `[0, step)`.
    pub fn advance(&mut self, frame_time: f32) -> u32 {
        self.accumulator += frame_time.max(0.0);
        let mut steps = 0;
        while self.accumulator >= self.step {
            self.accumulator -= self.step;
            steps += 1;
        }
        steps
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn remainder(&self) -> f32 {
        self.accumulator
    }

    /// How far the leftover is into the next step, for interpolation.
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

/// What one call to `GameLoop::frame` did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub updates: u32,
    pub smoothed_dt: f32,
    pub alpha: f32,
}

/// Rolling numbers for the debug overlay.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    pub frames: u64,
    pub updates: u64,
    pub updates_last_frame: u32,
    pub fps: f32,
    /// Simulation time, sum of all fixed steps
    pub sim_time: f64,
}

impl FrameStats {
    fn record(&mut self, smoothed_dt: f32, updates: u32, step: f32) {
        self.frames += 1;
        self.updates += u64::from(updates);
        self.updates_last_frame = updates;
        self.sim_time += f64::from(step) * f64::from(updates);
        if smoothed_dt > 0.0 {
            self.fps = 1.0 / smoothed_dt;
        }
    }
}

pub const BACKGROUND: Rgba = Rgba::rgb(0, 0, 0);

pub struct GameLoop {
    smoother: DeltaSmoother,
    timestep: FixedTimestep,
}

impl GameLoop {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            smoother: DeltaSmoother::from_config(timing),
            timestep: FixedTimestep::new(timing.fixed_step),
        }
    }

    pub fn step(&self) -> f32 {
        self.timestep.step()
    }

    /// Run one frame: input, zero or more fixed updates, one render.
    pub fn frame(
        &mut self,
        raw_dt: f32,
        input: InputFrame,
        stack: &mut SceneStack,
        ctx: &mut GameContext,
        surface: &mut dyn Surface,
    ) -> Result<FrameReport, GameError> {
        let smoothed_dt = self.smoother.smooth(raw_dt);
        let updates = self.timestep.advance(smoothed_dt);
        let step = self.timestep.step();

        for &key in &input.presses {
            stack.handle_input(key, ctx);
        }
        ctx.input = input;
        stack.apply_pending(ctx);

        for _ in 0..updates {
            stack.update(step, ctx);
            stack.apply_pending(ctx);
        }

        if stack.is_empty() {
            return Err(GameError::EmptySceneStack);
        }

        ctx.stats.record(smoothed_dt, updates, step);

        surface.clear(BACKGROUND);
        stack.render(surface, ctx);

        Ok(FrameReport {
            updates,
            smoothed_dt,
            alpha: self.timestep.alpha(),
        })
    }

    /// `frame`, with a panic anywhere below it turned into
    /// `GameError::Panicked` so the caller can still shut down cleanly.
    pub fn guarded_frame(
        &mut self,
        raw_dt: f32,
        input: InputFrame,
        stack: &mut SceneStack,
        ctx: &mut GameContext,
        surface: &mut dyn Surface,
    ) -> Result<FrameReport, GameError> {
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.frame(raw_dt, input, stack, ctx, surface)
        }))
        .unwrap_or_else(|payload| Err(GameError::Panicked(panic_message(payload.as_ref()))))
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::tests::{spy_stack, Log};
    use crate::engine::scene::{Scene, SceneId};
    use crate::platform::input::Key;
    use crate::platform::surface::RecordingSurface;

    #[test]
    fn test_smoother_clamps_spikes() {
        let mut smoother = DeltaSmoother::new(1, 0.001, 0.1);
        assert_eq!(smoother.smooth(5.0), 0.1);
        assert_eq!(smoother.smooth(0.0), 0.001);
        assert_eq!(smoother.smooth(f32::NAN), 0.1);
    }

    #[test]
    fn test_smoother_averages_window() {
        let mut smoother = DeltaSmoother::new(4, 0.001, 0.1);
        assert!((smoother.current() - 1.0 / 60.0).abs() < 1e-6);
        for dt in [0.01, 0.02, 0.03, 0.04, 0.05] {
            smoother.smooth(dt);
        }
        // window holds 0.02..=0.05
        assert!((smoother.current() - 0.035).abs() < 1e-6);
        smoother.reset();
        assert!((smoother.current() - 1.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn test_accumulator_counts_whole_steps() {
        let step = 1.0 / 60.0;
        let mut fixed = FixedTimestep::new(step);
        let mut total = 0;
        let frames = [0.005, 0.02, 0.05, 0.1, 0.016, 0.0333];
        let sum: f32 = frames.iter().sum();
        for dt in frames {
            total += fixed.advance(dt);
            assert!(fixed.remainder() >= 0.0 && fixed.remainder() < step);
        }
        assert_eq!(total, (sum / step).floor() as u32);
    }

    #[test]
    fn test_exact_multiple_leaves_small_remainder() {
        let mut fixed = FixedTimestep::new(0.25);
        assert_eq!(fixed.advance(1.0), 4);
        assert_eq!(fixed.remainder(), 0.0);
        assert_eq!(fixed.advance(0.1), 0);
        assert!((fixed.alpha() - 0.4).abs() < 1e-6);
    }

    fn timing() -> TimingConfig {
        TimingConfig {
            fixed_step: 0.01,
            smoothing_samples: 1,
            min_frame_time: 0.001,
            max_frame_time: 0.1,
        }
    }

    #[test]
    fn test_frame_renders_once_per_call() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();
        let mut surface = RecordingSurface::new(320, 240);
        ctx.commands.push(SceneId::Playing);
        stack.apply_pending(&mut ctx);
        log.borrow_mut().clear();

        let mut game_loop = GameLoop::new(&timing());
        let report = game_loop
            .frame(0.035, InputFrame::default(), &mut stack, &mut ctx, &mut surface)
            .unwrap();

        assert_eq!(report.updates, 3);
        let entries = log.borrow().clone();
        assert_eq!(entries.iter().filter(|e| *e == "playing:update").count(), 3);
        assert_eq!(entries.iter().filter(|e| *e == "playing:render").count(), 1);
        assert_eq!(ctx.stats.updates, 3);

        // too short for a step, still renders
        let report = game_loop
            .frame(0.001, InputFrame::default(), &mut stack, &mut ctx, &mut surface)
            .unwrap();
        assert_eq!(report.updates, 0);
        assert_eq!(
            log.borrow().iter().filter(|e| *e == "playing:render").count(),
            2
        );
    }

    #[test]
    fn test_input_dispatched_before_updates() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();
        let mut surface = RecordingSurface::new(320, 240);
        ctx.commands.push(SceneId::Menu);
        stack.apply_pending(&mut ctx);
        log.borrow_mut().clear();

        let input = InputFrame {
            presses: vec![Key::Confirm],
            ..InputFrame::default()
        };
        GameLoop::new(&timing())
            .frame(0.02, input, &mut stack, &mut ctx, &mut surface)
            .unwrap();
        assert_eq!(log.borrow()[0], "menu:input");
        assert_eq!(log.borrow()[1], "menu:update");
    }

    #[test]
    fn test_empty_stack_is_fatal() {
        let log = Log::default();
        let mut stack = spy_stack(&log);
        let mut ctx = GameContext::headless();
        let mut surface = RecordingSurface::new(320, 240);
        let result = GameLoop::new(&timing()).frame(
            0.02,
            InputFrame::default(),
            &mut stack,
            &mut ctx,
            &mut surface,
        );
        assert!(matches!(result, Err(GameError::EmptySceneStack)));
    }

    struct Exploding;

    impl Scene for Exploding {
        fn id(&self) -> SceneId {
            SceneId::Playing
        }
        fn update(&mut self, _dt: f32, _ctx: &mut GameContext) {
            panic!("t-rex ate the frame");
        }
        fn render(&self, _surface: &mut dyn Surface, _ctx: &GameContext) {}
    }

    #[test]
    fn test_guarded_frame_reports_panics() {
        let mut stack = SceneStack::new(Box::new(|_, _| Box::new(Exploding)));
        let mut ctx = GameContext::headless();
        let mut surface = RecordingSurface::new(320, 240);
        ctx.commands.push(SceneId::Playing);
        stack.apply_pending(&mut ctx);

        let mut game_loop = GameLoop::new(&timing());
        // no fixed step yet, nothing panics
        assert!(game_loop
            .guarded_frame(0.001, InputFrame::default(), &mut stack, &mut ctx, &mut surface)
            .is_ok());

        let err = game_loop
            .guarded_frame(0.05, InputFrame::default(), &mut stack, &mut ctx, &mut surface)
            .unwrap_err();
        assert!(matches!(&err, GameError::Panicked(msg) if msg == "t-rex ate the frame"));
    }
}
