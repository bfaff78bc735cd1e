//! OpenGL ES 3.0 / WebGL2 glue for particle systems.
//!
//! Only available with the `render` feature. Everything here is a thin
//! transport layer: the animation itself lives in each system's GLSL.
//!
//! - [`shader`] -- program compilation with numbered error output.
//! - [`instancing`] -- one-time instance upload, per-frame uniforms, instanced draw.

pub mod instancing;
pub mod shader;

pub use instancing::{attribute_layout, pack_instances, AttributeSlot, GpuParticles};
pub use shader::{compile_program, format_shader_error, ShaderError, Stage};
