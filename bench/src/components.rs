//! Common component types used across benchmarks.

use ember_macros::Component;

/// 3D position component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 3D velocity component (12 bytes).
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Seconds left before a particle expires.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Lifetime {
    pub remaining: f32,
}

/// Marker for particle entities.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Particle;

/// A component that is only ever attached and detached to trigger routing.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Frozen;
