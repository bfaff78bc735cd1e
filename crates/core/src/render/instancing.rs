//! Uploading a particle system to the GPU and drawing it instanced.
//!
//! All attributes go into one VBO in planar layout (each attribute's floats
//! contiguous) with divisor 1. The optional base mesh gets its own VBO and
//! index buffer with divisor 0. After [`GpuParticles::upload`] the only
//! per-frame traffic is [`GpuParticles::apply_uniforms`].

use super::shader::{compile_program, ShaderError};
use crate::instance::{InstanceBuffer, UniformValue, Uniforms};
use crate::system::{DrawState, ParticleSystem};

/// Where one instance attribute lives inside the packed VBO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSlot {
    pub name: String,
    pub components: usize,
    pub byte_offset: usize,
}

/// Planar layout of every attribute in `buffer`, in name order.
pub fn attribute_layout(buffer: &InstanceBuffer) -> Vec<AttributeSlot> {
    let mut offset = 0;
    buffer
        .attributes()
        .map(|(name, attr)| {
            let slot = AttributeSlot {
                name: name.to_string(),
                components: attr.components(),
                byte_offset: offset,
            };
            offset += attr.data().len() * std::mem::size_of::<f32>();
            slot
        })
        .collect()
}

/// Concatenates attribute data in the order given by [`attribute_layout`].
pub fn pack_instances(buffer: &InstanceBuffer) -> Vec<f32> {
    buffer
        .attributes()
        .flat_map(|(_, attr)| attr.data().iter().copied())
        .collect()
}

/// GPU-side resources for one particle system.
pub struct GpuParticles {
    program: glow::Program,
    vao: glow::VertexArray,
    instance_vbo: glow::Buffer,
    mesh: Option<(glow::Buffer, glow::Buffer, i32)>,
    instance_count: i32,
    draw_state: DrawState,
}

impl GpuParticles {
    /// Compiles the system's program and uploads its instance attributes once.
    ///
    /// Attributes the linked program does not use are skipped; drivers strip
    /// unused inputs, so a missing location is not an error.
    #[allow(unsafe_code)]
    pub fn upload(gl: &glow::Context, system: &dyn ParticleSystem) -> Result<Self, ShaderError> {
        use glow::HasContext;

        let program = compile_program(gl, system)?;
        let name = system.name();
        let alloc = |log: String| ShaderError::Allocation {
            system: name.to_string(),
            log,
        };
        let buffer = system.instances();
        let packed = pack_instances(buffer);

        // SAFETY: glow exposes raw GL as unsafe. Every handle used below is
        // created in this block, and the VAO is unbound before returning.
        unsafe {
            let vao = gl.create_vertex_array().map_err(alloc)?;
            gl.bind_vertex_array(Some(vao));

            let mesh = match system.base_mesh() {
                Some(base) => {
                    let vbo = gl.create_buffer().map_err(alloc)?;
                    gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
                    gl.buffer_data_u8_slice(
                        glow::ARRAY_BUFFER,
                        bytemuck::cast_slice(&base.positions),
                        glow::STATIC_DRAW,
                    );
                    if let Some(loc) = gl.get_attrib_location(program, "position") {
                        gl.enable_vertex_attrib_array(loc);
                        gl.vertex_attrib_pointer_f32(loc, 3, glow::FLOAT, false, 0, 0);
                    }
                    let ibo = gl.create_buffer().map_err(alloc)?;
                    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
                    gl.buffer_data_u8_slice(
                        glow::ELEMENT_ARRAY_BUFFER,
                        bytemuck::cast_slice(&base.indices),
                        glow::STATIC_DRAW,
                    );
                    Some((vbo, ibo, base.indices.len() as i32))
                }
                None => None,
            };

            let instance_vbo = gl.create_buffer().map_err(alloc)?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(instance_vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&packed),
                glow::STATIC_DRAW,
            );
            for slot in attribute_layout(buffer) {
                let Some(loc) = gl.get_attrib_location(program, &slot.name) else {
                    log::debug!("{name}: attribute {} unused by program", slot.name);
                    continue;
                };
                gl.enable_vertex_attrib_array(loc);
                gl.vertex_attrib_pointer_f32(
                    loc,
                    slot.components as i32,
                    glow::FLOAT,
                    false,
                    0,
                    slot.byte_offset as i32,
                );
                gl.vertex_attrib_divisor(loc, 1);
            }

            gl.bind_vertex_array(None);

            log::debug!(
                "{name}: uploaded {} instances ({} bytes)",
                buffer.count(),
                buffer.byte_len()
            );

            Ok(Self {
                program,
                vao,
                instance_vbo,
                mesh,
                instance_count: buffer.count() as i32,
                draw_state: system.draw_state(),
            })
        }
    }

    /// Pushes every uniform to the program. Unknown names are ignored.
    #[allow(unsafe_code)]
    pub fn apply_uniforms(&self, gl: &glow::Context, uniforms: &Uniforms) {
        use glow::HasContext;

        // SAFETY: self.program is a valid linked program from upload().
        unsafe {
            gl.use_program(Some(self.program));
            for (name, value) in uniforms.iter() {
                let Some(loc) = gl.get_uniform_location(self.program, name) else {
                    continue;
                };
                match value {
                    UniformValue::Float(v) => gl.uniform_1_f32(Some(&loc), v),
                    UniformValue::Vec3([x, y, z]) => gl.uniform_3_f32(Some(&loc), x, y, z),
                    UniformValue::Mat4(m) => {
                        gl.uniform_matrix_4_f32_slice(Some(&loc), false, &m)
                    }
                }
            }
        }
    }

    /// Issues the instanced draw with the system's blend and depth state.
    #[allow(unsafe_code)]
    pub fn draw(&self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: all handles were created in upload() and are still alive.
        unsafe {
            gl.use_program(Some(self.program));
            gl.bind_vertex_array(Some(self.vao));
            if self.draw_state.transparent {
                gl.enable(glow::BLEND);
                gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            } else {
                gl.disable(glow::BLEND);
            }
            gl.depth_mask(self.draw_state.depth_write);
            match self.mesh {
                Some((_, _, index_count)) => gl.draw_elements_instanced(
                    glow::TRIANGLES,
                    index_count,
                    glow::UNSIGNED_INT,
                    0,
                    self.instance_count,
                ),
                None => gl.draw_arrays_instanced(glow::POINTS, 0, 1, self.instance_count),
            }
            gl.depth_mask(true);
            gl.bind_vertex_array(None);
        }
    }

    /// Releases every GL object owned by this system.
    #[allow(unsafe_code)]
    pub fn destroy(self, gl: &glow::Context) {
        use glow::HasContext;

        // SAFETY: handles are consumed with `self` and never used again.
        unsafe {
            if let Some((vbo, ibo, _)) = self.mesh {
                gl.delete_buffer(vbo);
                gl.delete_buffer(ibo);
            }
            gl.delete_buffer(self.instance_vbo);
            gl.delete_vertex_array(self.vao);
            gl.delete_program(self.program);
        }
    }
}
