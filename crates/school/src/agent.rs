//! A single fish: immutable wander parameters plus a mutable transform.

use aquarium_core::config::FishRanges;
use aquarium_core::prng::Xorshift64;
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// Parameters fixed when the fish is created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Noise phase seed; separates one fish's path from its neighbours'.
    pub offset: f64,
    /// Render scale of the model.
    pub scale: f64,
    /// Rate at which the fish walks through noise space.
    pub movement_speed: f64,
    /// Easing rate toward the wander target, in (0, 1).
    pub lerp_speed: f64,
    /// Anchor point the wander target is measured from.
    pub center: DVec3,
}

impl AgentParams {
    /// Draws one fish's parameters.
    ///
    /// Draw order is part of the seeded layout: offset, scale, movement
    /// speed, lerp speed, then the center's x, y and z.
    pub fn draw(rng: &mut Xorshift64, ranges: &FishRanges) -> Self {
        let offset = rng.next_in(ranges.offset);
        let scale = rng.next_in(ranges.scale);
        let movement_speed = rng.next_in(ranges.movement_speed);
        let lerp_speed = rng.next_in(ranges.lerp_speed);
        let extent = ranges.spawn_extent;
        let center = DVec3::new(
            rng.next_centered(extent.x),
            rng.next_centered(extent.y),
            rng.next_centered(extent.z),
        );
        Self {
            offset,
            scale,
            movement_speed,
            lerp_speed,
            center,
        }
    }
}

/// One fish. Only the motion controller writes `position` and `orientation`.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    params: AgentParams,
    pub(crate) position: DVec3,
    pub(crate) orientation: DQuat,
}

impl Agent {
    /// A fish at the origin facing +Z, like a freshly cloned model.
    pub fn new(params: AgentParams) -> Self {
        Self {
            params,
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
        }
    }

    /// Overrides the starting position (builder style).
    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    /// Overrides the starting orientation; the quaternion is normalized.
    pub fn with_orientation(mut self, orientation: DQuat) -> Self {
        self.orientation = orientation.normalize();
        self
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn orientation(&self) -> DQuat {
        self.orientation
    }

    /// Current heading: the model's forward axis rotated by the orientation.
    pub fn heading(&self) -> DVec3 {
        self.orientation * crate::motion::FORWARD
    }
}

/// What the renderer reads for one fish each frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentTransform {
    pub position: DVec3,
    pub orientation: DQuat,
    pub scale: f64,
    pub playback_time: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use aquarium_core::config::Range;

    #[test]
    fn draw_respects_configured_ranges() {
        let ranges = FishRanges::default();
        let mut rng = Xorshift64::new(42);
        for _ in 0..500 {
            let p = AgentParams::draw(&mut rng, &ranges);
            assert!(ranges.offset.contains(p.offset), "offset {}", p.offset);
            assert!(ranges.scale.contains(p.scale), "scale {}", p.scale);
            assert!(ranges.movement_speed.contains(p.movement_speed));
            assert!(ranges.lerp_speed.contains(p.lerp_speed));
            assert!(p.center.x.abs() <= 20.0);
            assert!(p.center.y.abs() <= 10.0);
            assert!(p.center.z.abs() <= 10.0);
        }
    }

    #[test]
    fn draw_is_reproducible_for_a_seed() {
        let ranges = FishRanges::default();
        let a = AgentParams::draw(&mut Xorshift64::new(9), &ranges);
        let b = AgentParams::draw(&mut Xorshift64::new(9), &ranges);
        assert_eq!(a, b);
    }

    #[test]
    fn draw_consumes_seven_values_in_order() {
        let ranges = FishRanges {
            offset: Range::new(0.0, 1.0),
            scale: Range::new(0.0, 1.0),
            movement_speed: Range::new(0.0, 1.0),
            lerp_speed: Range::new(0.0, 1.0),
            spawn_extent: DVec3::ONE,
        };
        let mut rng = Xorshift64::new(77);
        let p = AgentParams::draw(&mut rng.clone(), &ranges);
        assert_eq!(p.offset, rng.next_f64());
        assert_eq!(p.scale, rng.next_f64());
        assert_eq!(p.movement_speed, rng.next_f64());
        assert_eq!(p.lerp_speed, rng.next_f64());
        assert_eq!(p.center.x, rng.next_f64() - 0.5);
    }

    #[test]
    fn new_agent_starts_at_origin_facing_forward() {
        let params = AgentParams::draw(&mut Xorshift64::new(1), &FishRanges::default());
        let agent = Agent::new(params);
        assert_eq!(agent.position(), DVec3::ZERO);
        assert!((agent.heading() - DVec3::Z).length() < 1e-12);
    }

    #[test]
    fn with_orientation_normalizes() {
        let params = AgentParams::draw(&mut Xorshift64::new(1), &FishRanges::default());
        let agent = Agent::new(params).with_orientation(DQuat::from_xyzw(0.0, 0.0, 0.0, 2.0));
        assert!((agent.orientation().length() - 1.0).abs() < 1e-12);
    }
}
