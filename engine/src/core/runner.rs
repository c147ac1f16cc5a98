//! The frame loop.
//!
//! A [`Runner`] owns one [`World`] and drives it frame by frame against a fixed-step
//! [`Time`]. Rates come from [`RunnerConfig`] and can be changed between frames.

use crate::config::{self, ConfigError, RunnerConfig};
use crate::core::time::Time;
use crate::ecs::World;
use log::{info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// What a single frame did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tick {
    /// Entities reclaimed by the flush at the top of the frame.
    pub flushed: usize,
    /// Number of fixed update passes run this frame.
    pub fixed_steps: u32,
    /// The frame delta.
    pub delta: Duration,
}

/// The frame loop around a [`World`].
///
/// Every frame runs, in order: a flush of entities destroyed during the previous frame, one
/// update pass with the frame delta, as many fixed update passes as the accumulated time
/// allows, and one render pass. [`run`](Runner::run) repeats that until the stop handle is
/// raised, pacing frames to the configured target rate.
pub struct Runner {
    world: World,
    time: Time,
    target_frame_rate: f32,
    frame_budget: Option<Duration>,
    stop: Arc<AtomicBool>,
    frames: u64,
}

impl Runner {
    /// Wrap a world. Fails with [`ConfigError::Invalid`] if either rate is unusable.
    pub fn new(world: World, config: &RunnerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world,
            time: Time::from_rate(config.fixed_update_rate),
            target_frame_rate: config.target_frame_rate,
            frame_budget: frame_budget(config.target_frame_rate),
            stop: Arc::new(AtomicBool::new(false)),
            frames: 0,
        })
    }

    /// Frames per second [`run`](Runner::run) paces to. Zero means unpaced.
    pub fn target_frame_rate(&self) -> f32 {
        self.target_frame_rate
    }

    /// Change the pacing of [`run`](Runner::run), zero for unpaced.
    pub fn set_target_frame_rate(&mut self, rate: f32) -> Result<(), ConfigError> {
        config::validate_target_rate(rate)?;
        self.target_frame_rate = rate;
        self.frame_budget = frame_budget(rate);
        Ok(())
    }

    /// Fixed updates per second.
    pub fn fixed_update_rate(&self) -> f32 {
        1.0 / self.time.fixed_step_secs()
    }

    /// Change the fixed step. Time already accumulated carries over to the new step.
    pub fn set_fixed_update_rate(&mut self, rate: f32) -> Result<(), ConfigError> {
        config::validate_fixed_rate(rate)?;
        self.time.fixed_step = Time::from_rate(rate).fixed_step;
        Ok(())
    }

    /// Frames per second measured over the last frame, zero before the first one.
    pub fn frame_rate(&self) -> f32 {
        let delta = self.time.delta_secs();
        if delta > 0.0 { 1.0 / delta } else { 0.0 }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn into_world(self) -> World {
        self.world
    }

    /// The clock as of the last completed frame.
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// Number of frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// A handle that stops [`run`](Runner::run) once set to `true`. It may be raised from
    /// another thread or from inside a system.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Run one frame, measuring the delta from the wall clock.
    pub fn tick(&mut self) -> Tick {
        let time = self.time.next();
        self.step(time)
    }

    /// Run one frame with a caller supplied delta.
    pub fn tick_with(&mut self, delta: Duration) -> Tick {
        let time = self.time.advance(delta);
        self.step(time)
    }

    /// Run frames until the stop handle is raised.
    pub fn run(&mut self) {
        info!(
            "Starting frame loop for world {} with {} systems",
            self.world.id().id(),
            self.world.system_count()
        );
        self.time.reset_now();
        while !self.stop.load(Ordering::Relaxed) {
            let started = Instant::now();
            self.tick();
            if let Some(budget) = self.frame_budget {
                let spent = started.elapsed();
                if spent < budget {
                    std::thread::sleep(budget - spent);
                } else if spent > budget * 2 {
                    warn!("Frame {} took {:?}, budget is {:?}", self.frames, spent, budget);
                }
            }
        }
        info!("Ending frame loop after {} frames due to stop handle", self.frames);
    }

    fn step(&mut self, mut time: Time) -> Tick {
        let flushed = self.world.flush();
        self.world.update_all(time.delta_secs());
        let mut fixed_steps = 0;
        while time.has_fixed() {
            time.increment_fixed();
            self.world.fixed_update_all(time.fixed_step_secs());
            fixed_steps += 1;
        }
        self.world.render_all();
        self.time = time;
        self.frames += 1;
        Tick {
            flushed,
            fixed_steps,
            delta: time.delta,
        }
    }
}

fn frame_budget(rate: f32) -> Option<Duration> {
    (rate > 0.0).then(|| Duration::from_secs_f64(1.0 / f64::from(rate)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::system::{Frame, Require};
    use crate::ecs::{Component, Result, WorldId};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Marker;
    impl Component for Marker {}

    struct Recorder {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl crate::ecs::System for Recorder {
        fn require(&self, require: &mut Require<'_>) -> Result<()> {
            require.component::<Marker>()?;
            Ok(())
        }

        fn update(&mut self, frame: &mut Frame<'_>) {
            self.calls
                .borrow_mut()
                .push(format!("update {}", frame.entities.len()));
        }

        fn fixed_update(&mut self, _frame: &mut Frame<'_>) {
            self.calls.borrow_mut().push("fixed".to_string());
        }

        fn render(&mut self, frame: &mut Frame<'_>) {
            self.calls
                .borrow_mut()
                .push(format!("render {}", frame.delta));
        }
    }

    fn config() -> RunnerConfig {
        RunnerConfig {
            target_frame_rate: 0.0,
            fixed_update_rate: 100.0,
        }
    }

    fn runner_with_recorder() -> (Runner, Rc<RefCell<Vec<String>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new(WorldId::new(0));
        world
            .register_system(Recorder {
                calls: calls.clone(),
            })
            .unwrap();
        (Runner::new(world, &config()).unwrap(), calls)
    }

    #[test]
    fn tick_runs_update_fixed_then_render() {
        // Given
        let (mut runner, calls) = runner_with_recorder();
        let entity = runner.world_mut().create().unwrap();
        runner.world_mut().attach(entity, Marker).unwrap();

        // When
        let tick = runner.tick_with(Duration::from_millis(25));

        // Then
        assert_eq!(tick.fixed_steps, 2);
        assert_eq!(tick.flushed, 0);
        assert_eq!(
            *calls.borrow(),
            vec!["update 1", "fixed", "fixed", "render 0"]
        );
        assert_eq!(runner.frames(), 1);
    }

    #[test]
    fn fixed_remainder_carries_between_frames() {
        // Given
        let (mut runner, _) = runner_with_recorder();

        // When
        let first = runner.tick_with(Duration::from_millis(6));
        let second = runner.tick_with(Duration::from_millis(6));

        // Then
        assert_eq!(first.fixed_steps, 0);
        assert_eq!(second.fixed_steps, 1);
        assert_eq!(runner.time().elapsed, Duration::from_millis(12));
    }

    #[test]
    fn tick_flushes_entities_destroyed_last_frame() {
        // Given
        let (mut runner, calls) = runner_with_recorder();
        let entity = runner.world_mut().create().unwrap();
        runner.world_mut().attach(entity, Marker).unwrap();
        runner.world_mut().destroy(entity).unwrap();

        // When
        let tick = runner.tick_with(Duration::ZERO);

        // Then
        assert_eq!(tick.flushed, 1);
        assert!(!runner.world().is_alive(entity));
        assert_eq!(calls.borrow().first().unwrap(), "update 0");
    }

    #[test]
    fn new_rejects_unusable_rates() {
        // Given
        let config = RunnerConfig {
            target_frame_rate: 0.0,
            fixed_update_rate: 0.0,
        };

        // When
        let result = Runner::new(World::new(WorldId::new(0)), &config);

        // Then
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rates_can_change_between_frames() {
        // Given
        let (mut runner, _) = runner_with_recorder();
        assert_eq!(runner.frame_rate(), 0.0);

        // When
        runner.set_fixed_update_rate(50.0).unwrap();
        let tick = runner.tick_with(Duration::from_millis(40));

        // Then
        assert_eq!(tick.fixed_steps, 2);
        assert!((runner.fixed_update_rate() - 50.0).abs() < 1e-3);
        assert!((runner.frame_rate() - 25.0).abs() < 1e-3);

        // When
        runner.set_target_frame_rate(30.0).unwrap();

        // Then
        assert_eq!(runner.target_frame_rate(), 30.0);
        assert!(runner.set_target_frame_rate(f32::NAN).is_err());
        assert!(runner.set_fixed_update_rate(-5.0).is_err());
        assert_eq!(runner.target_frame_rate(), 30.0);
    }

    #[test]
    fn run_returns_once_stopped() {
        // Given
        let (mut runner, _) = runner_with_recorder();
        runner.stop_handle().store(true, Ordering::Relaxed);

        // When
        runner.run();

        // Then
        assert_eq!(runner.frames(), 0);
    }
}
