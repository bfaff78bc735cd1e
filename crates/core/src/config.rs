//! Immutable aquarium configuration.
//!
//! An [`AquariumConfig`] is built once (defaults, JSON, or both via
//! `#[serde(default)]`), validated, and then passed by reference into every
//! school and particle system constructor. Nothing reads it after
//! construction, so there is no shared mutable configuration at runtime.

use crate::error::AquariumError;
use glam::DVec3;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Half-open interval `[min, max)` for randomized per-instance draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Fails unless both ends are finite and `min < max`.
    pub fn validate(&self, name: &str) -> Result<(), AquariumError> {
        if self.min.is_finite() && self.max.is_finite() && self.min < self.max {
            Ok(())
        } else {
            Err(AquariumError::InvalidRange {
                name: name.to_string(),
                min: self.min,
                max: self.max,
            })
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value < self.max
    }
}

/// How an agent's position approaches its wandering target each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// `lerp(position, target, dt * lerp_speed)`: the classic per-frame blend.
    /// Frame-rate dependent.
    #[default]
    FrameLinear,
    /// `lerp(position, target, 1 - exp(-lerp_speed * dt))`: frame-rate independent.
    Exponential,
}

impl Easing {
    /// Blend factor for one tick, always clamped to [0, 1].
    pub fn factor(self, dt: f64, lerp_speed: f64) -> f64 {
        let t = match self {
            Easing::FrameLinear => dt * lerp_speed,
            Easing::Exponential => 1.0 - (-lerp_speed * dt).exp(),
        };
        if t.is_nan() {
            0.0
        } else {
            t.clamp(0.0, 1.0)
        }
    }
}

/// Ranges for the per-fish parameters drawn once at school creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FishRanges {
    /// Noise phase seed.
    pub offset: Range,
    pub scale: Range,
    pub movement_speed: Range,
    pub lerp_speed: Range,
    /// Full extents of the box centered on the origin that school centers are drawn from.
    pub spawn_extent: DVec3,
}

impl Default for FishRanges {
    fn default() -> Self {
        Self {
            offset: Range::new(0.0, 1000.0),
            scale: Range::new(0.1, 0.2),
            movement_speed: Range::new(0.2, 0.3),
            lerp_speed: Range::new(0.2, 0.3),
            spawn_extent: DVec3::new(40.0, 20.0, 20.0),
        }
    }
}

impl FishRanges {
    pub fn validate(&self) -> Result<(), AquariumError> {
        self.offset.validate("offset")?;
        self.scale.validate("scale")?;
        self.movement_speed.validate("movement_speed")?;
        self.lerp_speed.validate("lerp_speed")?;
        if self.lerp_speed.min <= 0.0 || self.lerp_speed.max > 1.0 {
            return Err(AquariumError::InvalidRange {
                name: "lerp_speed".into(),
                min: self.lerp_speed.min,
                max: self.lerp_speed.max,
            });
        }
        let e = self.spawn_extent;
        if !(e.is_finite() && e.min_element() >= 0.0) {
            return Err(AquariumError::InvalidValue {
                name: "spawn_extent".into(),
                value: e.min_element(),
            });
        }
        Ok(())
    }
}

/// Full configuration for one aquarium.
///
/// Defaults describe the stock tank: a 120 x 20 x 20 roaming box,
/// 15 fish in 5 schools, 20 bubbles, 250 seaweed blades and 50 pebbles.
/// Particle system parameters stay as JSON objects and are decoded by each
/// system's own `from_json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AquariumConfig {
    pub seed: u64,
    /// Roaming half-extents shared by every school.
    pub bounds: DVec3,
    pub total_fish_count: usize,
    pub school_count: usize,
    pub fish: FishRanges,
    pub easing: Easing,
    pub pebble_count: usize,
    pub bubbles: Value,
    pub seaweed: Value,
}

impl Default for AquariumConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            bounds: DVec3::new(60.0, 10.0, 10.0),
            total_fish_count: 15,
            school_count: 5,
            fish: FishRanges::default(),
            easing: Easing::default(),
            pebble_count: 50,
            bubbles: Value::Object(serde_json::Map::new()),
            seaweed: Value::Object(serde_json::Map::new()),
        }
    }
}

impl AquariumConfig {
    /// Parses a (possibly partial) JSON config and validates it.
    pub fn from_json(value: &Value) -> Result<Self, AquariumError> {
        let config: Self = serde_json::from_value(value.clone())
            .map_err(|e| AquariumError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Agents per school; the remainder of an uneven split is dropped.
    pub fn agents_per_school(&self) -> usize {
        self.total_fish_count / self.school_count.max(1)
    }

    pub fn validate(&self) -> Result<(), AquariumError> {
        validate_bounds(self.bounds)?;
        if self.school_count == 0 {
            return Err(AquariumError::InvalidCount {
                name: "school_count".into(),
                value: 0,
            });
        }
        self.fish.validate()
    }
}

/// Roaming bounds must be strictly positive and finite on every axis.
pub fn validate_bounds(bounds: DVec3) -> Result<(), AquariumError> {
    if bounds.is_finite() && bounds.min_element() > 0.0 {
        Ok(())
    } else {
        Err(AquariumError::InvalidBounds {
            x: bounds.x,
            y: bounds.y,
            z: bounds.z,
        })
    }
}
