//! Noise-driven wandering and velocity-aligned orientation.
//!
//! Each tick a fish samples the shared [`NoiseField`] at a phase unique to
//! it, scales the three samples by the school's roaming bounds to get a
//! target around its center, eases toward that target and turns to face
//! the direction it is still travelling.

use crate::agent::Agent;
use aquarium_core::config::Easing;
use aquarium_core::noise_field::NoiseField;
use glam::{DQuat, DVec3};

/// The model's forward axis in local space.
pub const FORWARD: DVec3 = DVec3::Z;

/// Fraction of the way the orientation turns toward the heading per tick.
pub const ORIENTATION_BLEND: f64 = 0.1;

/// Squared speeds at or below this leave the orientation untouched.
pub const MIN_HEADING_LEN_SQ: f64 = 1e-4;

/// What the orientation step did on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    /// The fish turned toward its velocity.
    Turned,
    /// Velocity was too small to define a direction; orientation kept.
    Held,
}

/// Steers agents inside one school's roaming bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionController {
    bounds: DVec3,
    easing: Easing,
}

impl MotionController {
    /// `bounds` must already be validated (see `validate_bounds`).
    pub fn new(bounds: DVec3, easing: Easing) -> Self {
        Self { bounds, easing }
    }

    pub fn bounds(&self) -> DVec3 {
        self.bounds
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Where `agent` wants to be at `elapsed` seconds.
    pub fn target(&self, noise: &dyn NoiseField, agent: &Agent, elapsed: f64) -> DVec3 {
        let params = agent.params();
        let p = elapsed * params.movement_speed + params.offset;
        let wander = DVec3::new(
            noise.sample(p, 0.0),
            noise.sample(0.0, p),
            noise.sample(p, p),
        );
        params.center + wander * self.bounds
    }

    /// Advances one agent by one frame.
    ///
    /// Position moves toward the target by a blend factor in [0, 1], so it
    /// never overshoots. The heading is the remaining offset to the target
    /// after the move.
    pub fn tick(
        &self,
        noise: &dyn NoiseField,
        agent: &mut Agent,
        dt: f64,
        elapsed: f64,
    ) -> Heading {
        let target = self.target(noise, agent, elapsed);
        let t = self.easing.factor(dt, agent.params().lerp_speed);
        agent.position = agent.position.lerp(target, t);

        let velocity = target - agent.position;
        if velocity.length_squared() <= MIN_HEADING_LEN_SQ {
            return Heading::Held;
        }
        let desired = DQuat::from_rotation_arc(FORWARD, velocity.normalize());
        agent.orientation = agent
            .orientation
            .slerp(desired, ORIENTATION_BLEND)
            .normalize();
        Heading::Turned
    }
}
