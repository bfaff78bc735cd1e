//! Base meshes shared by every instance of a mesh-based particle system.

use aquarium_core::error::AquariumError;
use aquarium_core::system::BaseMesh;

/// Fraction of the base width left at the tip.
const TIP_TAPER: f64 = 0.2;

/// Upper bound on rows of quads per blade.
pub const MAX_BLADE_SEGMENTS: usize = 64;

/// A flat, tapering blade in the local x-y plane, rooted at the origin.
///
/// `segments` rows of quads stack from `y = 0` to `y = height`; more rows
/// give a smoother bend. Vertex `2 * row` is the left edge of a row and
/// `2 * row + 1` the right edge.
pub fn blade(width: f64, height: f64, segments: usize) -> Result<BaseMesh, AquariumError> {
    if segments == 0 || segments > MAX_BLADE_SEGMENTS {
        return Err(AquariumError::InvalidCount {
            name: "seaweed.segments".into(),
            value: segments,
        });
    }
    for (name, value) in [("seaweed.blade_width", width), ("seaweed.blade_height", height)] {
        if !(value.is_finite() && value > 0.0) {
            return Err(AquariumError::InvalidValue {
                name: name.into(),
                value,
            });
        }
    }

    let rows = segments + 1;
    let mut positions = Vec::with_capacity(rows * 2 * 3);
    for row in 0..rows {
        let v = row as f64 / segments as f64;
        let half = 0.5 * width * (1.0 - (1.0 - TIP_TAPER) * v);
        let y = (height * v) as f32;
        positions.extend_from_slice(&[-half as f32, y, 0.0, half as f32, y, 0.0]);
    }

    let mut indices = Vec::with_capacity(segments * 6);
    for row in 0..segments as u32 {
        let bl = row * 2;
        let br = bl + 1;
        let tl = bl + 2;
        let tr = bl + 3;
        indices.extend_from_slice(&[bl, br, tl, br, tr, tl]);
    }

    Ok(BaseMesh { positions, indices })
}
