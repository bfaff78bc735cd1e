//! The `ParticleSystem` trait shared by every GPU-instanced effect.
//!
//! A particle system is a static [`InstanceBuffer`] plus a small set of
//! [`Uniforms`]. The host pushes `uTime` once per frame through
//! [`ParticleSystem::set_uniform`]; everything else happens in the vertex
//! shader. Because there is no per-instance host state, systems can be
//! updated in any order and never need synchronization.
//!
//! The trait is object-safe so the scene can hold `Box<dyn ParticleSystem>`.

use crate::instance::{InstanceBuffer, UniformValue, Uniforms};
use serde_json::Value;

/// Name of the scalar time uniform every system reads.
pub const TIME_UNIFORM: &str = "uTime";

/// Per-vertex geometry shared by every instance of a mesh-based system.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseMesh {
    /// `vec3` positions, flattened.
    pub positions: Vec<f32>,
    /// Triangle list indices into `positions`.
    pub indices: Vec<u32>,
}

impl BaseMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Fixed-function state a system needs from the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawState {
    /// Alpha blending on.
    pub transparent: bool,
    /// Depth buffer writes on. Off for overlapping soft sprites.
    pub depth_write: bool,
}

/// A GPU-instanced procedural particle effect.
pub trait ParticleSystem {
    /// Registry name, e.g. `"bubbles"`.
    fn name(&self) -> &'static str;

    /// Per-instance attributes, fixed at construction.
    fn instances(&self) -> &InstanceBuffer;

    /// Current uniform values.
    fn uniforms(&self) -> &Uniforms;

    /// Overwrites one uniform. The only per-frame mutation a system accepts.
    fn set_uniform(&mut self, name: &str, value: UniformValue);

    /// GLSL ES 3.0 vertex shader source.
    fn vertex_shader(&self) -> &'static str;

    /// GLSL ES 3.0 fragment shader source.
    fn fragment_shader(&self) -> &'static str;

    /// Base mesh drawn once per instance, or `None` to draw one point per instance.
    fn base_mesh(&self) -> Option<&BaseMesh>;

    fn draw_state(&self) -> DrawState;

    /// Current parameter values as a JSON object.
    fn params(&self) -> Value;

    /// Schema describing every parameter: type, default, range and description.
    fn param_schema(&self) -> Value;

    /// Pushes the frame's elapsed time into [`TIME_UNIFORM`].
    fn set_time(&mut self, elapsed: f64) {
        self.set_uniform(TIME_UNIFORM, UniformValue::Float(elapsed as f32));
    }

    /// The last time pushed, or 0 before the first frame.
    fn time(&self) -> f64 {
        self.uniforms()
            .float(TIME_UNIFORM)
            .map(f64::from)
            .unwrap_or(0.0)
    }
}
