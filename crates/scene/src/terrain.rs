//! Sea floor: a noise heightfield plus the pebbles resting on it.

use aquarium_core::config::Range;
use aquarium_core::error::AquariumError;
use aquarium_core::noise_field::NoiseField;
use aquarium_core::prng::Xorshift64;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Shape of the floor relative to the roaming bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainParams {
    /// Full size along x.
    pub width: f64,
    /// Full size along z.
    pub depth: f64,
    /// Grid cells per side.
    pub segments: usize,
    /// Noise input is `position / scale`.
    pub scale: f64,
    /// Peak height deviation.
    pub intensity: f64,
}

impl TerrainParams {
    /// The floor of a tank with half-extents `bounds`: ten bounds wide and
    /// five deep, 256 cells a side.
    pub fn for_bounds(bounds: DVec3) -> Self {
        Self {
            width: bounds.x * 10.0,
            depth: bounds.z * 5.0,
            segments: 256,
            scale: 2.0,
            intensity: 0.4,
        }
    }

    fn validate(&self) -> Result<(), AquariumError> {
        if self.segments == 0 {
            return Err(AquariumError::InvalidCount {
                name: "terrain.segments".into(),
                value: 0,
            });
        }
        for (name, value) in [
            ("terrain.width", self.width),
            ("terrain.depth", self.depth),
            ("terrain.scale", self.scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AquariumError::InvalidValue {
                    name: name.into(),
                    value,
                });
            }
        }
        if !self.intensity.is_finite() {
            return Err(AquariumError::InvalidValue {
                name: "terrain.intensity".into(),
                value: self.intensity,
            });
        }
        Ok(())
    }
}

/// A regular grid of heights centered on `center` in the x-z plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Heightfield {
    params: TerrainParams,
    center: DVec3,
    /// Row-major, `(segments + 1)^2` entries, z outer, x inner.
    heights: Vec<f64>,
}

impl Heightfield {
    /// Samples `noise` at every grid vertex.
    pub fn generate(
        noise: &dyn NoiseField,
        params: TerrainParams,
        center: DVec3,
    ) -> Result<Self, AquariumError> {
        params.validate()?;
        let side = params.segments + 1;
        let mut heights = Vec::with_capacity(side * side);
        for j in 0..side {
            for i in 0..side {
                let (x, z) = Self::local_xz(&params, i, j);
                heights.push(noise.sample(x / params.scale, z / params.scale) * params.intensity);
            }
        }
        log::debug!(
            "terrain: {}x{} vertices, {:.0} x {:.0}",
            side,
            side,
            params.width,
            params.depth
        );
        Ok(Self {
            params,
            center,
            heights,
        })
    }

    /// The floor of a tank: laid at `y = -bounds.y` with its front edge at
    /// `z = -bounds.z`, so most of it stretches away behind the fish.
    pub fn for_bounds(noise: &dyn NoiseField, bounds: DVec3) -> Result<Self, AquariumError> {
        let params = TerrainParams::for_bounds(bounds);
        let center = DVec3::new(0.0, -bounds.y, params.depth / 2.0 - bounds.z);
        Self::generate(noise, params, center)
    }

    fn local_xz(params: &TerrainParams, i: usize, j: usize) -> (f64, f64) {
        let n = params.segments as f64;
        (
            (i as f64 / n - 0.5) * params.width,
            (j as f64 / n - 0.5) * params.depth,
        )
    }

    fn nearest_index(params: &TerrainParams, local: f64, extent: f64) -> usize {
        let n = params.segments as f64;
        let cell = ((local / extent + 0.5) * n).round();
        cell.clamp(0.0, n) as usize
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Vertices per side.
    pub fn side(&self) -> usize {
        self.params.segments + 1
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// World position of grid vertex `(i, j)`, or `None` off the grid.
    pub fn vertex(&self, i: usize, j: usize) -> Option<DVec3> {
        let side = self.side();
        if i >= side || j >= side {
            return None;
        }
        let (x, z) = Self::local_xz(&self.params, i, j);
        let h = self.heights[j * side + i];
        Some(self.center + DVec3::new(x, h, z))
    }

    /// World height of the grid vertex nearest to world `(x, z)`.
    ///
    /// Points off the floor snap to the nearest edge vertex.
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        let i = Self::nearest_index(&self.params, x - self.center.x, self.params.width);
        let j = Self::nearest_index(&self.params, z - self.center.z, self.params.depth);
        self.center.y + self.heights[j * self.side() + i]
    }
}

/// One static pebble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pebble {
    pub position: DVec3,
    /// XYZ Euler angles in radians.
    pub rotation: DVec3,
    pub scale: f64,
    pub radius: f64,
}

const PEBBLE_RADIUS: Range = Range::new(1.0, 2.0);
const PEBBLE_SCALE: Range = Range::new(0.5, 0.8);
const PEBBLE_ROTATION: Range = Range::new(0.5, 0.8);

/// Scatters `count` pebbles over `[-bounds.x, bounds.x] x [-bounds.z, bounds.z]`
/// and rests each on the floor.
///
/// Per pebble, in order: radius, scale, rotation x, y, z, then x and z.
pub fn scatter_pebbles(
    count: usize,
    bounds: DVec3,
    floor: &Heightfield,
    rng: &mut Xorshift64,
) -> Vec<Pebble> {
    let x_range = Range::new(-bounds.x, bounds.x);
    let z_range = Range::new(-bounds.z, bounds.z);
    (0..count)
        .map(|_| {
            let radius = rng.next_in(PEBBLE_RADIUS);
            let scale = rng.next_in(PEBBLE_SCALE);
            let rotation = DVec3::new(
                rng.next_in(PEBBLE_ROTATION),
                rng.next_in(PEBBLE_ROTATION),
                rng.next_in(PEBBLE_ROTATION),
            );
            let x = rng.next_in(x_range);
            let z = rng.next_in(z_range);
            Pebble {
                position: DVec3::new(x, floor.height_at(x, z), z),
                rotation,
                scale,
                radius,
            }
        })
        .collect()
}
