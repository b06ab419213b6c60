use web_sys::{WebGl2RenderingContext as GL, WebGlProgram, WebGlShader, WebGlUniformLocation};

use crate::error::{RainError, ShaderStage};
use crate::shader;

/// Linked rain program with its interface locations resolved once.
///
/// Locations the driver optimised away come back as `None`; setting them is
/// a no-op, which is what WebGL does with a null location anyway.
pub struct ShaderProgram {
    pub program: WebGlProgram,
    pub time: Option<WebGlUniformLocation>,
    pub resolution: Option<WebGlUniformLocation>,
    pub channel0: Option<WebGlUniformLocation>,
    pub position: Option<u32>,
    pub tex_coord: Option<u32>,
}

impl ShaderProgram {
    pub fn link(gl: &GL, vertex_source: &str, fragment_source: &str) -> Result<Self, RainError> {
        let vertex = compile_shader(gl, ShaderStage::Vertex, vertex_source)?;
        let fragment = match compile_shader(gl, ShaderStage::Fragment, fragment_source) {
            Ok(shader) => shader,
            Err(err) => {
                gl.delete_shader(Some(&vertex));
                return Err(err);
            }
        };

        let program = gl.create_program().ok_or(RainError::Allocation("shader program"))?;
        gl.attach_shader(&program, &vertex);
        gl.attach_shader(&program, &fragment);
        gl.link_program(&program);

        let linked = gl
            .get_program_parameter(&program, GL::LINK_STATUS)
            .as_bool()
            .unwrap_or(false);
        if !linked {
            let log = gl
                .get_program_info_log(&program)
                .unwrap_or_else(|| "unknown linker error".to_string());
            gl.delete_program(Some(&program));
            gl.delete_shader(Some(&vertex));
            gl.delete_shader(Some(&fragment));
            return Err(RainError::ProgramLink(log));
        }

        let attrib = |name: &str| u32::try_from(gl.get_attrib_location(&program, name)).ok();
        Ok(Self {
            time: gl.get_uniform_location(&program, shader::TIME_UNIFORM),
            resolution: gl.get_uniform_location(&program, shader::RESOLUTION_UNIFORM),
            channel0: gl.get_uniform_location(&program, shader::CHANNEL0_UNIFORM),
            position: attrib(shader::POSITION_ATTRIBUTE),
            tex_coord: attrib(shader::TEX_COORD_ATTRIBUTE),
            program,
        })
    }
}

fn compile_shader(gl: &GL, stage: ShaderStage, source: &str) -> Result<WebGlShader, RainError> {
    let kind = match stage {
        ShaderStage::Vertex => GL::VERTEX_SHADER,
        ShaderStage::Fragment => GL::FRAGMENT_SHADER,
    };
    let shader = gl.create_shader(kind).ok_or(RainError::Allocation("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "unknown compiler error".to_string());
        gl.delete_shader(Some(&shader));
        Err(RainError::ShaderCompile { stage, log })
    }
}
