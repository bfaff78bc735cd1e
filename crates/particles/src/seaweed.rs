//! Swaying, bending seaweed blades.
//!
//! Each blade is an instance of one tapered base mesh. Two motions combine
//! in the vertex shader: a rigid sway that rotates the whole blade about its
//! root in the blade plane, and a travelling bend whose amplitude grows from
//! zero at the root to full strength at the tip. A per-blade yaw turns the
//! blade plane so the field does not look combed.

use crate::geometry::{blade, MAX_BLADE_SEGMENTS};
use crate::{smoothstep, validate_count};
use aquarium_core::config::Range;
use aquarium_core::error::AquariumError;
use aquarium_core::instance::{InstanceBuffer, UniformValue, Uniforms};
use aquarium_core::params::{param_f64, param_range, param_usize};
use aquarium_core::prng::Xorshift64;
use aquarium_core::system::{BaseMesh, DrawState, ParticleSystem};
use glam::DVec3;
use serde_json::{json, Value};
use std::f64::consts::TAU;

const DEFAULT_COUNT: usize = 250;
const DEFAULT_SPEED: Range = Range::new(0.5, 1.5);
/// Peak sway angle in radians.
const DEFAULT_SWAY_AMP: Range = Range::new(0.05, 0.15);
/// Bend wave number along the blade.
const DEFAULT_BEND_FREQ: Range = Range::new(0.5, 1.5);
const DEFAULT_BEND_AMP: f64 = 0.15;
const DEFAULT_BLADE_HEIGHT: f64 = 3.0;
const DEFAULT_BLADE_WIDTH: f64 = 0.3;
const DEFAULT_SEGMENTS: usize = 8;
/// Half extents of the floor area blades are scattered over.
const DEFAULT_SPREAD_X: f64 = 60.0;
const DEFAULT_SPREAD_Z: f64 = 10.0;

pub const BEND_AMP_UNIFORM: &str = "uBendAmp";
pub const BLADE_HEIGHT_UNIFORM: &str = "uBladeHeight";

const VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 position;
in vec3 aOffset;
in float aSpeed;
in float aPhase;
in float aWiggleAmp;
in float aWiggleFreq;

uniform float uTime;
uniform float uBendAmp;
uniform float uBladeHeight;
uniform mat4 uViewProjection;

out float vHeight;

const float TAU = 6.28318530718;

void main() {
    float id = float(gl_InstanceID);
    vec3 p = position;

    float tip = smoothstep(0.0, 1.0, p.y / uBladeHeight);
    p.x += sin(uTime * aSpeed + p.y * aWiggleFreq + id * TAU) * uBendAmp * tip;

    float sway = sin(uTime * aSpeed + id) * aWiggleAmp;
    float s = sin(sway);
    float c = cos(sway);
    p.xy = vec2(c * p.x - s * p.y, s * p.x + c * p.y);

    float sy = sin(aPhase);
    float cy = cos(aPhase);
    p = vec3(cy * p.x + sy * p.z, p.y, cy * p.z - sy * p.x);

    vHeight = position.y / uBladeHeight;
    gl_Position = uViewProjection * vec4(aOffset + p, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

in float vHeight;
out vec4 fragColor;

void main() {
    vec3 root = vec3(0.05, 0.25, 0.10);
    vec3 tip = vec3(0.35, 0.70, 0.30);
    fragColor = vec4(mix(root, tip, clamp(vHeight, 0.0, 1.0)), 1.0);
}
"#;

/// Construction parameters for [`Seaweed`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeaweedParams {
    pub count: usize,
    pub speed: Range,
    pub sway_amp: Range,
    pub bend_freq: Range,
    pub bend_amp: f64,
    pub blade_height: f64,
    pub blade_width: f64,
    pub segments: usize,
    pub spread_x: f64,
    pub spread_z: f64,
}

impl Default for SeaweedParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            speed: DEFAULT_SPEED,
            sway_amp: DEFAULT_SWAY_AMP,
            bend_freq: DEFAULT_BEND_FREQ,
            bend_amp: DEFAULT_BEND_AMP,
            blade_height: DEFAULT_BLADE_HEIGHT,
            blade_width: DEFAULT_BLADE_WIDTH,
            segments: DEFAULT_SEGMENTS,
            spread_x: DEFAULT_SPREAD_X,
            spread_z: DEFAULT_SPREAD_Z,
        }
    }
}

impl SeaweedParams {
    /// Reads parameters from JSON, falling back to defaults for missing keys.
    ///
    /// A key that is present with the wrong shape is an error.
    pub fn from_json(params: &Value) -> Result<Self, AquariumError> {
        Ok(Self {
            count: param_usize(params, "count", DEFAULT_COUNT)?,
            speed: param_range(params, "speed", DEFAULT_SPEED)?,
            sway_amp: param_range(params, "sway_amp", DEFAULT_SWAY_AMP)?,
            bend_freq: param_range(params, "bend_freq", DEFAULT_BEND_FREQ)?,
            bend_amp: param_f64(params, "bend_amp", DEFAULT_BEND_AMP)?,
            blade_height: param_f64(params, "blade_height", DEFAULT_BLADE_HEIGHT)?,
            blade_width: param_f64(params, "blade_width", DEFAULT_BLADE_WIDTH)?,
            segments: param_usize(params, "segments", DEFAULT_SEGMENTS)?,
            spread_x: param_f64(params, "spread_x", DEFAULT_SPREAD_X)?,
            spread_z: param_f64(params, "spread_z", DEFAULT_SPREAD_Z)?,
        })
    }

    /// Checks everything except the blade mesh, which [`blade`] validates.
    pub fn validate(&self) -> Result<(), AquariumError> {
        validate_count("seaweed.count", self.count)?;
        self.speed.validate("seaweed.speed")?;
        self.sway_amp.validate("seaweed.sway_amp")?;
        self.bend_freq.validate("seaweed.bend_freq")?;
        for (name, value) in [
            ("seaweed.bend_amp", self.bend_amp),
            ("seaweed.spread_x", self.spread_x),
            ("seaweed.spread_z", self.spread_z),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AquariumError::InvalidValue {
                    name: name.into(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// One blade's immutable parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeaweedInstance {
    /// Root position in world space.
    pub offset: DVec3,
    pub speed: f64,
    /// Yaw of the blade plane about the vertical axis.
    pub phase: f64,
    /// Peak sway angle.
    pub wiggle_amp: f64,
    /// Bend wave number along the blade.
    pub wiggle_freq: f64,
}

/// Whole-blade sway angle for instance `id` at `time`.
pub fn sway_angle(time: f64, speed: f64, id: usize, amp: f64) -> f64 {
    (time * speed + id as f64).sin() * amp
}

/// Horizontal bend of a vertex at local height `vertex_y`.
///
/// Zero at the root and scaled by `smoothstep(0, 1, vertex_y / blade_height)`
/// toward the tip.
pub fn bend_offset(
    time: f64,
    speed: f64,
    vertex_y: f64,
    bend_freq: f64,
    id: usize,
    bend_amp: f64,
    blade_height: f64,
) -> f64 {
    let tip = smoothstep(0.0, 1.0, vertex_y / blade_height);
    (time * speed + vertex_y * bend_freq + id as f64 * TAU).sin() * bend_amp * tip
}

impl SeaweedInstance {
    /// World position of local blade vertex `local`, mirroring the vertex shader.
    pub fn deform(
        &self,
        local: DVec3,
        id: usize,
        time: f64,
        bend_amp: f64,
        blade_height: f64,
    ) -> DVec3 {
        let bent_x = local.x
            + bend_offset(
                time,
                self.speed,
                local.y,
                self.wiggle_freq,
                id,
                bend_amp,
                blade_height,
            );
        let (s, c) = sway_angle(time, self.speed, id, self.wiggle_amp).sin_cos();
        let x = c * bent_x - s * local.y;
        let y = s * bent_x + c * local.y;
        let (sy, cy) = self.phase.sin_cos();
        let yawed = DVec3::new(cy * x + sy * local.z, y, cy * local.z - sy * x);
        self.offset + yawed
    }
}

/// The seaweed particle system.
#[derive(Debug, Clone)]
pub struct Seaweed {
    params: SeaweedParams,
    blades: Vec<SeaweedInstance>,
    mesh: BaseMesh,
    buffer: InstanceBuffer,
    uniforms: Uniforms,
}

impl Seaweed {
    /// Scatters blades over the floor and roots each one at `ground(x, z)`.
    ///
    /// Per blade, in order: x, z, speed, yaw, sway amplitude, bend frequency.
    pub fn new(
        params: SeaweedParams,
        rng: &mut Xorshift64,
        ground: &dyn Fn(f64, f64) -> f64,
    ) -> Result<Self, AquariumError> {
        params.validate()?;
        let mesh = blade(params.blade_width, params.blade_height, params.segments)?;
        let x_range = Range::new(-params.spread_x, params.spread_x);
        let z_range = Range::new(-params.spread_z, params.spread_z);
        let blades: Vec<SeaweedInstance> = (0..params.count)
            .map(|_| {
                let x = rng.next_in(x_range);
                let z = rng.next_in(z_range);
                let speed = rng.next_in(params.speed);
                let phase = rng.next_angle();
                let wiggle_amp = rng.next_in(params.sway_amp);
                let wiggle_freq = rng.next_in(params.bend_freq);
                SeaweedInstance {
                    offset: DVec3::new(x, ground(x, z), z),
                    speed,
                    phase,
                    wiggle_amp,
                    wiggle_freq,
                }
            })
            .collect();
        let buffer = Self::pack(&blades)?;

        let mut uniforms = Uniforms::new();
        uniforms.set(aquarium_core::TIME_UNIFORM, UniformValue::Float(0.0));
        uniforms.set(BEND_AMP_UNIFORM, UniformValue::Float(params.bend_amp as f32));
        uniforms.set(
            BLADE_HEIGHT_UNIFORM,
            UniformValue::Float(params.blade_height as f32),
        );

        log::debug!(
            "seaweed: {} blades, {} vertices each",
            blades.len(),
            mesh.vertex_count()
        );
        Ok(Self {
            params,
            blades,
            mesh,
            buffer,
            uniforms,
        })
    }

    /// Builds seaweed on a flat floor at `y = 0` from a JSON params object.
    pub fn from_json(params: &Value, seed: u64) -> Result<Self, AquariumError> {
        Self::new(
            SeaweedParams::from_json(params)?,
            &mut Xorshift64::new(seed),
            &|_, _| 0.0,
        )
    }

    fn pack(blades: &[SeaweedInstance]) -> Result<InstanceBuffer, AquariumError> {
        let scalar = |f: fn(&SeaweedInstance) -> f64| -> Vec<f32> {
            blades.iter().map(|b| f(b) as f32).collect()
        };
        let offsets = blades
            .iter()
            .flat_map(|b| b.offset.to_array())
            .map(|v| v as f32)
            .collect();
        InstanceBuffer::new(blades.len())
            .with_attribute("aOffset", 3, offsets)?
            .with_attribute("aSpeed", 1, scalar(|b| b.speed))?
            .with_attribute("aPhase", 1, scalar(|b| b.phase))?
            .with_attribute("aWiggleAmp", 1, scalar(|b| b.wiggle_amp))?
            .with_attribute("aWiggleFreq", 1, scalar(|b| b.wiggle_freq))
    }

    pub fn seaweed_params(&self) -> &SeaweedParams {
        &self.params
    }

    pub fn blades(&self) -> &[SeaweedInstance] {
        &self.blades
    }

    /// Every vertex of blade `index` at `time`, or `None` past the end.
    pub fn blade_vertices(&self, index: usize, time: f64) -> Option<Vec<DVec3>> {
        let blade = self.blades.get(index)?;
        Some(
            self.mesh
                .positions
                .chunks_exact(3)
                .map(|p| {
                    let local = DVec3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2]));
                    blade.deform(
                        local,
                        index,
                        time,
                        self.params.bend_amp,
                        self.params.blade_height,
                    )
                })
                .collect(),
        )
    }

    /// Root and tip centerline points of blade `index` at `time`.
    pub fn blade_spine(&self, index: usize, time: f64) -> Option<(DVec3, DVec3)> {
        let blade = self.blades.get(index)?;
        let h = self.params.blade_height;
        let tip = blade.deform(DVec3::new(0.0, h, 0.0), index, time, self.params.bend_amp, h);
        Some((blade.offset, tip))
    }
}

impl ParticleSystem for Seaweed {
    fn name(&self) -> &'static str {
        "seaweed"
    }

    fn instances(&self) -> &InstanceBuffer {
        &self.buffer
    }

    fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    fn set_uniform(&mut self, name: &str, value: UniformValue) {
        self.uniforms.set(name, value);
    }

    fn vertex_shader(&self) -> &'static str {
        VERTEX_SHADER
    }

    fn fragment_shader(&self) -> &'static str {
        FRAGMENT_SHADER
    }

    fn base_mesh(&self) -> Option<&BaseMesh> {
        Some(&self.mesh)
    }

    fn draw_state(&self) -> DrawState {
        DrawState {
            transparent: false,
            depth_write: true,
        }
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "count": p.count,
            "speed": [p.speed.min, p.speed.max],
            "sway_amp": [p.sway_amp.min, p.sway_amp.max],
            "bend_freq": [p.bend_freq.min, p.bend_freq.max],
            "bend_amp": p.bend_amp,
            "blade_height": p.blade_height,
            "blade_width": p.blade_width,
            "segments": p.segments,
            "spread_x": p.spread_x,
            "spread_z": p.spread_z,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "count": {
                "type": "integer",
                "default": DEFAULT_COUNT,
                "min": 0,
                "max": crate::MAX_INSTANCES,
                "description": "Number of blades"
            },
            "speed": {
                "type": "range",
                "default": [DEFAULT_SPEED.min, DEFAULT_SPEED.max],
                "description": "Time scale of sway and bend"
            },
            "sway_amp": {
                "type": "range",
                "default": [DEFAULT_SWAY_AMP.min, DEFAULT_SWAY_AMP.max],
                "description": "Peak whole-blade sway angle in radians"
            },
            "bend_freq": {
                "type": "range",
                "default": [DEFAULT_BEND_FREQ.min, DEFAULT_BEND_FREQ.max],
                "description": "Wave number of the bend along the blade"
            },
            "bend_amp": {
                "type": "number",
                "default": DEFAULT_BEND_AMP,
                "min": 0.0,
                "max": 1.0,
                "description": "Horizontal bend at the tip"
            },
            "blade_height": {
                "type": "number",
                "default": DEFAULT_BLADE_HEIGHT,
                "min": 0.0,
                "description": "Blade length from root to tip"
            },
            "blade_width": {
                "type": "number",
                "default": DEFAULT_BLADE_WIDTH,
                "min": 0.0,
                "description": "Blade width at the root"
            },
            "segments": {
                "type": "integer",
                "default": DEFAULT_SEGMENTS,
                "min": 1,
                "max": MAX_BLADE_SEGMENTS,
                "description": "Rows of quads along the blade"
            },
            "spread_x": {
                "type": "number",
                "default": DEFAULT_SPREAD_X,
                "min": 0.0,
                "description": "Half width of the planted area"
            },
            "spread_z": {
                "type": "number",
                "default": DEFAULT_SPREAD_Z,
                "min": 0.0,
                "description": "Half depth of the planted area"
            }
        })
    }
}
