//! Particle workload.
//!
//! Keeps a fixed population of particles alive. Every frame the movement system integrates
//! velocity, the lifetime system destroys expired particles and the emitter respawns as many
//! as were lost, so each frame exercises dispatch, deferred destruction and id recycling.

use crate::components::{Lifetime, Particle, Position, Velocity};
use ember_engine::config::{RunnerConfig, WorldConfig};
use ember_engine::core::Runner;
use ember_engine::ecs::system::{Frame, Require};
use ember_engine::ecs::{Entity, Result, System, World, WorldId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::error::Error;
use std::time::Duration;

/// Configuration for the particle benchmark.
pub struct ParticleConfig {
    /// Number of particles to maintain.
    pub particle_count: usize,
    /// Simulated delta time per frame.
    pub delta_time: Duration,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            particle_count: 10_000,
            delta_time: Duration::from_secs_f64(1.0 / 60.0),
            seed: 12345,
        }
    }
}

struct Movement;

impl System for Movement {
    fn require(&self, require: &mut Require<'_>) -> Result<()> {
        require.component::<Position>()?.component::<Velocity>()?;
        Ok(())
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        for &entity in &frame.entities {
            let Ok(Some(velocity)) = frame.world.get::<Velocity>(entity).map(|v| v.copied()) else {
                continue;
            };
            if let Ok(Some(position)) = frame.world.get_mut::<Position>(entity) {
                position.x += velocity.x * frame.delta;
                position.y += velocity.y * frame.delta;
                position.z += velocity.z * frame.delta;
            }
        }
    }
}

struct Expiry;

impl System for Expiry {
    fn require(&self, require: &mut Require<'_>) -> Result<()> {
        require.component::<Lifetime>()?;
        Ok(())
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        let mut expired = Vec::new();
        for &entity in &frame.entities {
            if let Ok(Some(lifetime)) = frame.world.get_mut::<Lifetime>(entity) {
                lifetime.remaining -= frame.delta;
                if lifetime.remaining <= 0.0 {
                    expired.push(entity);
                }
            }
        }
        for entity in expired {
            frame
                .world
                .destroy(entity)
                .expect("subscribers stay live until the next flush");
        }
    }
}

/// Refills the population after each flush.
struct Emitter {
    rng: ChaCha8Rng,
    target: usize,
}

impl Emitter {
    fn spawn(&mut self, world: &mut World) -> Result<Entity> {
        let rng = &mut self.rng;
        let entity = world.create()?;
        world.attach(entity, Particle)?;
        world.attach(
            entity,
            Position {
                x: rng.gen_range(-100.0..100.0),
                y: rng.gen_range(-100.0..100.0),
                z: rng.gen_range(-100.0..100.0),
            },
        )?;
        world.attach(
            entity,
            Velocity {
                x: rng.gen_range(-10.0..10.0),
                y: rng.gen_range(-10.0..10.0),
                z: rng.gen_range(-10.0..10.0),
            },
        )?;
        world.attach(
            entity,
            Lifetime {
                remaining: rng.gen_range(0.1..2.0),
            },
        )?;
        Ok(entity)
    }
}

impl System for Emitter {
    fn require(&self, require: &mut Require<'_>) -> Result<()> {
        require.component::<Particle>()?;
        Ok(())
    }

    fn update(&mut self, frame: &mut Frame<'_>) {
        let live = frame.entities.len();
        for _ in live..self.target {
            if self.spawn(frame.world).is_err() {
                break;
            }
        }
    }
}

/// A particle world wrapped in a runner, ready to tick.
pub struct ParticleScenario {
    runner: Runner,
    delta_time: Duration,
}

impl ParticleScenario {
    pub fn new(config: &ParticleConfig) -> std::result::Result<Self, Box<dyn Error>> {
        let world_config = WorldConfig {
            max_entities: config.particle_count * 2,
            ..WorldConfig::default()
        };
        let mut world = World::with_config(WorldId::new(0), &world_config);
        world.register_system(Emitter {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            target: config.particle_count,
        })?;
        world.register_system(Movement)?;
        world.register_system(Expiry)?;

        let runner_config = RunnerConfig {
            target_frame_rate: 0.0,
            ..RunnerConfig::default()
        };
        Ok(Self {
            runner: Runner::new(world, &runner_config)?,
            delta_time: config.delta_time,
        })
    }

    /// Run one frame.
    pub fn tick(&mut self) {
        self.runner.tick_with(self.delta_time);
    }

    pub fn world(&self) -> &World {
        self.runner.world()
    }
}
