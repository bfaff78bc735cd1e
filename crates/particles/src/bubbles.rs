//! Rising, wiggling, recycling bubbles.
//!
//! Every bubble is one point sprite. Its height is a modulo of the distance
//! it has risen, so a bubble that passes the ceiling reappears at the bottom
//! without any host-side respawn. Horizontal wiggle traces a small circle
//! in x/z whose rate and radius vary per bubble.

use crate::{smoothstep, validate_count};
use aquarium_core::config::Range;
use aquarium_core::error::AquariumError;
use aquarium_core::instance::{InstanceBuffer, UniformValue, Uniforms};
use aquarium_core::params::{param_f64, param_range, param_usize};
use aquarium_core::prng::Xorshift64;
use aquarium_core::system::{BaseMesh, DrawState, ParticleSystem};
use glam::DVec3;
use serde_json::{json, Value};

const DEFAULT_COUNT: usize = 20;
/// Height of the wrap column; bubbles live in `[-ceiling/2, ceiling/2]`.
const DEFAULT_CEILING: f64 = 10.0;
const DEFAULT_SPEED: Range = Range::new(2.0, 5.0);
const DEFAULT_WIGGLE_FREQ: Range = Range::new(0.5, 2.5);
const DEFAULT_WIGGLE_AMP: Range = Range::new(0.05, 0.25);
/// Point sprite size in pixels.
const DEFAULT_SIZE: Range = Range::new(10.0, 50.0);
/// Full extents of the spawn box around the emitter.
const DEFAULT_SPREAD: [f64; 3] = [2.0, 10.0, 2.0];

pub const CEILING_UNIFORM: &str = "uCeiling";
pub const ORIGIN_UNIFORM: &str = "uOrigin";

const VERTEX_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 aOffset;
in float aSpeed;
in float aPhase;
in float aWiggleAmp;
in float aWiggleFreq;
in float aSize;

uniform float uTime;
uniform float uCeiling;
uniform vec3 uOrigin;
uniform mat4 uViewProjection;

out float vAlpha;

void main() {
    float t = uTime * aSpeed + aPhase;
    float y = mod(aOffset.y + uTime * aSpeed, uCeiling) - 0.5 * uCeiling;
    vec3 local = vec3(
        aOffset.x + sin(t * aWiggleFreq) * aWiggleAmp,
        y,
        aOffset.z + cos(t * aWiggleFreq) * aWiggleAmp
    );
    vec3 world = uOrigin + local;
    gl_Position = uViewProjection * vec4(world, 1.0);
    gl_PointSize = aSize;
    vAlpha = smoothstep(-0.5 * uCeiling, uCeiling, y);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;

in float vAlpha;
out vec4 fragColor;

void main() {
    float d = length(gl_PointCoord - vec2(0.5));
    if (d > 0.5) {
        discard;
    }
    float rim = smoothstep(0.3, 0.5, d);
    float edge = 1.0 - smoothstep(0.45, 0.5, d);
    vec3 color = mix(vec3(0.6, 0.8, 1.0), vec3(1.0), rim);
    fragColor = vec4(color, (0.2 + 0.6 * rim) * edge * vAlpha);
}
"#;

/// Construction parameters for [`Bubbles`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleParams {
    pub count: usize,
    pub ceiling: f64,
    pub speed: Range,
    pub wiggle_freq: Range,
    pub wiggle_amp: Range,
    pub size: Range,
    pub spread: DVec3,
}

impl Default for BubbleParams {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            ceiling: DEFAULT_CEILING,
            speed: DEFAULT_SPEED,
            wiggle_freq: DEFAULT_WIGGLE_FREQ,
            wiggle_amp: DEFAULT_WIGGLE_AMP,
            size: DEFAULT_SIZE,
            spread: DVec3::from_array(DEFAULT_SPREAD),
        }
    }
}

impl BubbleParams {
    /// Reads parameters from JSON, falling back to defaults for missing keys.
    ///
    /// A key that is present with the wrong shape is an error.
    pub fn from_json(params: &Value) -> Result<Self, AquariumError> {
        Ok(Self {
            count: param_usize(params, "count", DEFAULT_COUNT)?,
            ceiling: param_f64(params, "ceiling", DEFAULT_CEILING)?,
            speed: param_range(params, "speed", DEFAULT_SPEED)?,
            wiggle_freq: param_range(params, "wiggle_freq", DEFAULT_WIGGLE_FREQ)?,
            wiggle_amp: param_range(params, "wiggle_amp", DEFAULT_WIGGLE_AMP)?,
            size: param_range(params, "size", DEFAULT_SIZE)?,
            spread: DVec3::new(
                param_f64(params, "spread_x", DEFAULT_SPREAD[0])?,
                param_f64(params, "spread_y", DEFAULT_SPREAD[1])?,
                param_f64(params, "spread_z", DEFAULT_SPREAD[2])?,
            ),
        })
    }

    pub fn validate(&self) -> Result<(), AquariumError> {
        validate_count("bubbles.count", self.count)?;
        if !(self.ceiling.is_finite() && self.ceiling > 0.0) {
            return Err(AquariumError::InvalidValue {
                name: "bubbles.ceiling".into(),
                value: self.ceiling,
            });
        }
        self.speed.validate("bubbles.speed")?;
        self.wiggle_freq.validate("bubbles.wiggle_freq")?;
        self.wiggle_amp.validate("bubbles.wiggle_amp")?;
        self.size.validate("bubbles.size")?;
        if self.speed.min < 0.0 {
            return Err(AquariumError::InvalidRange {
                name: "bubbles.speed".into(),
                min: self.speed.min,
                max: self.speed.max,
            });
        }
        if !(self.spread.is_finite() && self.spread.min_element() >= 0.0) {
            return Err(AquariumError::InvalidValue {
                name: "bubbles.spread".into(),
                value: self.spread.min_element(),
            });
        }
        Ok(())
    }
}

/// One bubble's immutable parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleInstance {
    /// Spawn position relative to the emitter.
    pub offset: DVec3,
    pub speed: f64,
    pub phase: f64,
    pub wiggle_amp: f64,
    pub wiggle_freq: f64,
    pub size: f64,
}

impl BubbleInstance {
    /// Emitter-relative position at `time`, mirroring the vertex shader.
    pub fn position(&self, time: f64, ceiling: f64) -> DVec3 {
        let rise = time * self.speed;
        let t = rise + self.phase;
        let angle = t * self.wiggle_freq;
        DVec3::new(
            self.offset.x + angle.sin() * self.wiggle_amp,
            (self.offset.y + rise).rem_euclid(ceiling) - 0.5 * ceiling,
            self.offset.z + angle.cos() * self.wiggle_amp,
        )
    }
}

/// Fade factor for a bubble at emitter-relative height `y`.
pub fn bubble_alpha(y: f64, ceiling: f64) -> f64 {
    smoothstep(-0.5 * ceiling, ceiling, y)
}

/// The bubble particle system.
#[derive(Debug, Clone)]
pub struct Bubbles {
    params: BubbleParams,
    bubbles: Vec<BubbleInstance>,
    buffer: InstanceBuffer,
    uniforms: Uniforms,
}

impl Bubbles {
    /// Draws every bubble once from `rng`.
    ///
    /// Per bubble, in order: offset x, y, z, speed, phase, wiggle frequency,
    /// wiggle amplitude, size.
    pub fn new(params: BubbleParams, rng: &mut Xorshift64) -> Result<Self, AquariumError> {
        params.validate()?;
        let bubbles: Vec<BubbleInstance> = (0..params.count)
            .map(|_| {
                let offset = DVec3::new(
                    rng.next_centered(params.spread.x),
                    rng.next_centered(params.spread.y),
                    rng.next_centered(params.spread.z),
                );
                let speed = rng.next_in(params.speed);
                let phase = rng.next_angle();
                let wiggle_freq = rng.next_in(params.wiggle_freq);
                let wiggle_amp = rng.next_in(params.wiggle_amp);
                let size = rng.next_in(params.size);
                BubbleInstance {
                    offset,
                    speed,
                    phase,
                    wiggle_amp,
                    wiggle_freq,
                    size,
                }
            })
            .collect();
        let buffer = Self::pack(&bubbles)?;

        let mut uniforms = Uniforms::new();
        uniforms.set(aquarium_core::TIME_UNIFORM, UniformValue::Float(0.0));
        uniforms.set(CEILING_UNIFORM, UniformValue::Float(params.ceiling as f32));
        uniforms.set(ORIGIN_UNIFORM, UniformValue::Vec3([0.0; 3]));

        log::debug!(
            "bubbles: {} instances, ceiling {}",
            bubbles.len(),
            params.ceiling
        );
        Ok(Self {
            params,
            bubbles,
            buffer,
            uniforms,
        })
    }

    /// Builds bubbles from a JSON params object and a seed.
    pub fn from_json(params: &Value, seed: u64) -> Result<Self, AquariumError> {
        Self::new(BubbleParams::from_json(params)?, &mut Xorshift64::new(seed))
    }

    fn pack(bubbles: &[BubbleInstance]) -> Result<InstanceBuffer, AquariumError> {
        let scalar = |f: fn(&BubbleInstance) -> f64| -> Vec<f32> {
            bubbles.iter().map(|b| f(b) as f32).collect()
        };
        let offsets = bubbles
            .iter()
            .flat_map(|b| b.offset.to_array())
            .map(|v| v as f32)
            .collect();
        InstanceBuffer::new(bubbles.len())
            .with_attribute("aOffset", 3, offsets)?
            .with_attribute("aSpeed", 1, scalar(|b| b.speed))?
            .with_attribute("aPhase", 1, scalar(|b| b.phase))?
            .with_attribute("aWiggleAmp", 1, scalar(|b| b.wiggle_amp))?
            .with_attribute("aWiggleFreq", 1, scalar(|b| b.wiggle_freq))?
            .with_attribute("aSize", 1, scalar(|b| b.size))
    }

    /// Places the emitter in world space.
    pub fn set_origin(&mut self, origin: DVec3) {
        self.uniforms.set(
            ORIGIN_UNIFORM,
            UniformValue::Vec3(origin.as_vec3().to_array()),
        );
    }

    pub fn origin(&self) -> DVec3 {
        match self.uniforms.get(ORIGIN_UNIFORM) {
            Some(UniformValue::Vec3(v)) => glam::Vec3::from_array(v).as_dvec3(),
            _ => DVec3::ZERO,
        }
    }

    pub fn bubble_params(&self) -> &BubbleParams {
        &self.params
    }

    pub fn bubbles(&self) -> &[BubbleInstance] {
        &self.bubbles
    }

    /// World positions of every bubble at `time`.
    pub fn positions_at(&self, time: f64) -> Vec<DVec3> {
        let origin = self.origin();
        self.bubbles
            .iter()
            .map(|b| origin + b.position(time, self.params.ceiling))
            .collect()
    }
}

impl ParticleSystem for Bubbles {
    fn name(&self) -> &'static str {
        "bubbles"
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
        None
    }

    fn draw_state(&self) -> DrawState {
        DrawState {
            transparent: true,
            depth_write: false,
        }
    }

    fn params(&self) -> Value {
        let p = &self.params;
        json!({
            "count": p.count,
            "ceiling": p.ceiling,
            "speed": [p.speed.min, p.speed.max],
            "wiggle_freq": [p.wiggle_freq.min, p.wiggle_freq.max],
            "wiggle_amp": [p.wiggle_amp.min, p.wiggle_amp.max],
            "size": [p.size.min, p.size.max],
            "spread_x": p.spread.x,
            "spread_y": p.spread.y,
            "spread_z": p.spread.z,
        })
    }

    fn param_schema(&self) -> Value {
        json!({
            "count": {
                "type": "integer",
                "default": DEFAULT_COUNT,
                "min": 0,
                "max": crate::MAX_INSTANCES,
                "description": "Number of bubbles"
            },
            "ceiling": {
                "type": "number",
                "default": DEFAULT_CEILING,
                "min": 0.0,
                "description": "Height of the column a bubble rises through before wrapping"
            },
            "speed": {
                "type": "range",
                "default": [DEFAULT_SPEED.min, DEFAULT_SPEED.max],
                "description": "Rise speed in units per second"
            },
            "wiggle_freq": {
                "type": "range",
                "default": [DEFAULT_WIGGLE_FREQ.min, DEFAULT_WIGGLE_FREQ.max],
                "description": "Angular rate of the horizontal wiggle"
            },
            "wiggle_amp": {
                "type": "range",
                "default": [DEFAULT_WIGGLE_AMP.min, DEFAULT_WIGGLE_AMP.max],
                "description": "Radius of the horizontal wiggle"
            },
            "size": {
                "type": "range",
                "default": [DEFAULT_SIZE.min, DEFAULT_SIZE.max],
                "description": "Point sprite size in pixels"
            },
            "spread_x": {
                "type": "number",
                "default": DEFAULT_SPREAD[0],
                "min": 0.0,
                "description": "Spawn box width around the emitter"
            },
            "spread_y": {
                "type": "number",
                "default": DEFAULT_SPREAD[1],
                "min": 0.0,
                "description": "Spawn box height; only shifts the rise phase"
            },
            "spread_z": {
                "type": "number",
                "default": DEFAULT_SPREAD[2],
                "min": 0.0,
                "description": "Spawn box depth around the emitter"
            }
        })
    }
}
