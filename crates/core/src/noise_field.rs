//! Noise fields: deterministic scalar functions of two real inputs.
//!
//! A [`NoiseField`] is the only steering input in the aquarium. Fish read
//! phase-shifted samples of the same field, and the terrain heightfield
//! samples it once at construction. Implementations hold no mutable state,
//! so the same `(u, v)` always yields the same value regardless of call order.

use noise::{NoiseFn, OpenSimplex, Perlin};

/// A continuous, deterministic scalar field with values in [-1, 1].
pub trait NoiseField: Send + Sync {
    /// Sample the field at `(u, v)`.
    fn sample(&self, u: f64, v: f64) -> f64;
}

/// Seeded OpenSimplex noise. The default field for fish steering.
pub struct SimplexNoise {
    noise: OpenSimplex,
}

/// Seeded Perlin gradient noise. Exactly zero on integer lattice points.
pub struct PerlinNoise {
    noise: Perlin,
}

/// A constant field, mostly useful for pinning wandering targets in tests and
/// for holding a school still.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantNoise(pub f64);

impl SimplexNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            noise: OpenSimplex::new(seed),
        }
    }
}

impl PerlinNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
        }
    }
}

/// Folds a 64-bit tank seed into the 32-bit seed the `noise` crate expects.
pub fn noise_seed(seed: u64) -> u32 {
    (seed ^ (seed >> 32)) as u32
}

/// Clamps to [-1, 1]; NaN maps to 0 so a bad input can never poison a position.
fn unit_clamp(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

impl NoiseField for SimplexNoise {
    fn sample(&self, u: f64, v: f64) -> f64 {
        unit_clamp(self.noise.get([u, v]))
    }
}

impl NoiseField for PerlinNoise {
    fn sample(&self, u: f64, v: f64) -> f64 {
        unit_clamp(self.noise.get([u, v]))
    }
}

impl NoiseField for ConstantNoise {
    fn sample(&self, _u: f64, _v: f64) -> f64 {
        unit_clamp(self.0)
    }
}

impl<N: NoiseField + ?Sized> NoiseField for Box<N> {
    fn sample(&self, u: f64, v: f64) -> f64 {
        (**self).sample(u, v)
    }
}
