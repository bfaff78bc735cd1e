//! Compiling and linking a particle system's GLSL into a program.
//!
//! The source formatting helper is pure string processing and is tested
//! directly; the GL calls need a live `glow::Context`.

use crate::system::ParticleSystem;
use std::fmt;
use thiserror::Error;

/// A shader pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    fn gl_enum(self) -> u32 {
        match self {
            Stage::Vertex => glow::VERTEX_SHADER,
            Stage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Vertex => f.write_str("vertex"),
            Stage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors from building a particle program.
#[derive(Debug, Clone, Error)]
pub enum ShaderError {
    /// One stage failed to compile; `log` holds the numbered source and driver log.
    #[error("{system}: {stage} shader failed to compile:\n{log}")]
    Compile {
        system: String,
        stage: Stage,
        log: String,
    },
    /// The stages compiled but did not link.
    #[error("{system}: program failed to link:\n{log}")]
    Link { system: String, log: String },
    /// The driver refused to allocate a GL object.
    #[error("{system}: GL allocation failed: {log}")]
    Allocation { system: String, log: String },
}

/// Prefixes every source line with a right-aligned line number and appends
/// the driver log, so `0:17: error` can be matched to the GLSL by eye.
pub fn format_shader_error(source: &str, log: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let width = lines.len().max(1).to_string().len();
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("{:>width$}: {line}", i + 1));
    }
    if !log.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(log);
    }
    out
}

#[allow(unsafe_code)]
fn compile_stage(
    gl: &glow::Context,
    system: &str,
    stage: Stage,
    source: &str,
) -> Result<glow::Shader, ShaderError> {
    use glow::HasContext;

    // SAFETY: glow exposes raw GL as unsafe. The shader handle is deleted on
    // the failure path and returned to the caller otherwise.
    unsafe {
        let shader = gl
            .create_shader(stage.gl_enum())
            .map_err(|log| ShaderError::Allocation {
                system: system.to_string(),
                log,
            })?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if gl.get_shader_compile_status(shader) {
            return Ok(shader);
        }
        let driver_log = gl.get_shader_info_log(shader);
        gl.delete_shader(shader);
        Err(ShaderError::Compile {
            system: system.to_string(),
            stage,
            log: format_shader_error(source, &driver_log),
        })
    }
}

/// Compiles and links the vertex and fragment shaders of `system`.
///
/// Shader objects are released once linking finishes, whatever the outcome.
#[allow(unsafe_code)]
pub fn compile_program(
    gl: &glow::Context,
    system: &dyn ParticleSystem,
) -> Result<glow::Program, ShaderError> {
    use glow::HasContext;

    let name = system.name();
    let vertex = compile_stage(gl, name, Stage::Vertex, system.vertex_shader())?;
    let fragment = match compile_stage(gl, name, Stage::Fragment, system.fragment_shader()) {
        Ok(f) => f,
        Err(e) => {
            // SAFETY: `vertex` came from a successful compile_stage.
            unsafe { gl.delete_shader(vertex) };
            return Err(e);
        }
    };

    // SAFETY: both shader handles are valid; they are detached and deleted
    // before returning, the program keeps its own linked copy.
    unsafe {
        let program = match gl.create_program() {
            Ok(p) => p,
            Err(log) => {
                gl.delete_shader(vertex);
                gl.delete_shader(fragment);
                return Err(ShaderError::Allocation {
                    system: name.to_string(),
                    log,
                });
            }
        };
        gl.attach_shader(program, vertex);
        gl.attach_shader(program, fragment);
        gl.link_program(program);
        gl.detach_shader(program, vertex);
        gl.detach_shader(program, fragment);
        gl.delete_shader(vertex);
        gl.delete_shader(fragment);

        if gl.get_program_link_status(program) {
            Ok(program)
        } else {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            Err(ShaderError::Link {
                system: name.to_string(),
                log,
            })
        }
    }
}
