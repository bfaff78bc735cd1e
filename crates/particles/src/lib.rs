#![deny(unsafe_code)]
//! Particle system registry: maps system names to implementations.
//!
//! Both systems upload their per-instance attributes once and are then
//! driven only through the `uTime` uniform. [`ParticleKind`] wraps them so
//! the scene and CLI can construct either one by name.

pub mod bubbles;
pub mod geometry;
pub mod seaweed;

pub use bubbles::{BubbleInstance, BubbleParams, Bubbles};
pub use seaweed::{Seaweed, SeaweedInstance, SeaweedParams};

use aquarium_core::error::AquariumError;
use aquarium_core::instance::{InstanceBuffer, UniformValue, Uniforms};
use aquarium_core::system::{BaseMesh, DrawState, ParticleSystem};
use serde_json::Value;

/// All available particle system names.
const SYSTEM_NAMES: &[&str] = &["bubbles", "seaweed"];

/// Upper bound on instances per system.
pub const MAX_INSTANCES: usize = 1_000_000;

/// GLSL `smoothstep`: 0 below `edge0`, 1 above `edge1`, Hermite in between.
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Zero is a valid count: the system exists but draws nothing.
pub(crate) fn validate_count(name: &str, count: usize) -> Result<(), AquariumError> {
    if count > MAX_INSTANCES {
        return Err(AquariumError::InvalidCount {
            name: name.to_string(),
            value: count,
        });
    }
    Ok(())
}

/// Enumeration of every particle system.
///
/// Use [`ParticleKind::from_name`] for string-based construction.
#[derive(Debug, Clone)]
pub enum ParticleKind {
    Bubbles(Bubbles),
    Seaweed(Seaweed),
}

impl ParticleKind {
    /// Constructs a system by name.
    ///
    /// Returns `AquariumError::UnknownSystem` if the name is not recognized.
    pub fn from_name(name: &str, seed: u64, params: &Value) -> Result<Self, AquariumError> {
        match name {
            "bubbles" => Ok(ParticleKind::Bubbles(Bubbles::from_json(params, seed)?)),
            "seaweed" => Ok(ParticleKind::Seaweed(Seaweed::from_json(params, seed)?)),
            _ => Err(AquariumError::UnknownSystem(name.to_string())),
        }
    }

    /// Returns a slice of all recognized system names.
    pub fn list_systems() -> &'static [&'static str] {
        SYSTEM_NAMES
    }

    fn inner(&self) -> &dyn ParticleSystem {
        match self {
            ParticleKind::Bubbles(s) => s,
            ParticleKind::Seaweed(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn ParticleSystem {
        match self {
            ParticleKind::Bubbles(s) => s,
            ParticleKind::Seaweed(s) => s,
        }
    }
}

impl ParticleSystem for ParticleKind {
    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn instances(&self) -> &InstanceBuffer {
        self.inner().instances()
    }

    fn uniforms(&self) -> &Uniforms {
        self.inner().uniforms()
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.inner_mut().set_uniform(name, value);
    }

    fn vertex_shader(&self) -> &'static str {
        self.inner().vertex_shader()
    }

    fn fragment_shader(&self) -> &'static str {
        self.inner().fragment_shader()
    }

    fn base_mesh(&self) -> Option<&BaseMesh> {
        self.inner().base_mesh()
    }

    fn draw_state(&self) -> DrawState {
        self.inner().draw_state()
    }

    fn params(&self) -> Value {
        self.inner().params()
    }

    fn param_schema(&self) -> Value {
        self.inner().param_schema()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_name_builds_every_listed_system() {
        for name in ParticleKind::list_systems() {
            let system = ParticleKind::from_name(name, 42, &json!({"count": 4})).unwrap();
            assert_eq!(system.name(), *name);
            assert_eq!(system.instances().count(), 4);
        }
    }

    #[test]
    fn from_name_unknown_returns_error() {
        let result = ParticleKind::from_name("jellyfish", 42, &json!({}));
        assert!(matches!(result, Err(AquariumError::UnknownSystem(_))));
    }

    #[test]
    fn from_name_propagates_validation() {
        let result = ParticleKind::from_name("bubbles", 42, &json!({"ceiling": -1.0}));
        assert!(matches!(result, Err(AquariumError::InvalidValue { .. })));
        let result = ParticleKind::from_name("seaweed", 42, &json!({"count": -3}));
        assert!(matches!(result, Err(AquariumError::InvalidConfig(_))));
    }

    #[test]
    fn zero_count_systems_build_empty() {
        for name in ParticleKind::list_systems() {
            let system = ParticleKind::from_name(name, 1, &json!({"count": 0})).unwrap();
            assert_eq!(system.instances().count(), 0);
        }
    }

    #[test]
    fn delegation_reaches_inner_system() {
        let mut system = ParticleKind::from_name("seaweed", 1, &json!({"count": 3})).unwrap();
        system.set_time(4.0);
        assert_eq!(system.time(), 4.0);
        assert!(system.base_mesh().is_some());
        assert!(system.params().get("bend_amp").is_some());
        assert!(system.param_schema().get("bend_amp").is_some());
    }

    #[test]
    fn determinism_same_seed() {
        let a = ParticleKind::from_name("bubbles", 99, &json!({})).unwrap();
        let b = ParticleKind::from_name("bubbles", 99, &json!({})).unwrap();
        assert_eq!(a.instances(), b.instances());
    }

    #[test]
    fn object_safety() {
        let system = ParticleKind::from_name("bubbles", 1, &json!({})).unwrap();
        let boxed: Box<dyn ParticleSystem> = Box::new(system);
        assert_eq!(boxed.name(), "bubbles");
    }

    #[test]
    fn count_bounds_are_enforced() {
        assert!(validate_count("n", 0).is_ok());
        assert!(validate_count("n", 1).is_ok());
        assert!(validate_count("n", MAX_INSTANCES).is_ok());
        assert!(validate_count("n", MAX_INSTANCES + 1).is_err());
    }

    #[test]
    fn smoothstep_matches_glsl() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert!((smoothstep(-5.0, 10.0, 0.0) - 0.259_259_259).abs() < 1e-6);
    }
}
