use crate::coords::{Mat4, Vec3};
use crate::gfx::shader::{ShaderProgram, UniformValue};
use crate::gfx::texture::Texture;
use crate::gfx::vertex::VertexArray;
use crate::paint::Color;

use super::{DrawError, DrawPass};

/// The program made current by [`DrawPass::use_program`].
///
/// Uniform writes are staged on the program and uploaded by the next draw.
/// Names resolve to uniform fields (`field` or `block.field`); writes to
/// unknown names or with the wrong type are ignored.
pub struct ActiveProgram<'p, 'e> {
    pass: &'p mut DrawPass<'e>,
    program: &'p mut ShaderProgram,
}

impl<'p, 'e> ActiveProgram<'p, 'e> {
    pub(super) fn new(pass: &'p mut DrawPass<'e>, program: &'p mut ShaderProgram) -> Self {
        Self { pass, program }
    }

    pub fn program(&self) -> &ShaderProgram {
        self.program
    }

    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> &mut Self {
        self.program.set_uniform(name, value.into());
        self
    }

    pub fn set_f32(&mut self, name: &str, value: f32) -> &mut Self {
        self.set(name, UniformValue::F32(value))
    }

    /// Writes an `i32` uniform, or selects the texture unit of the texture
    /// variable called `name`.
    pub fn set_i32(&mut self, name: &str, value: i32) -> &mut Self {
        self.set(name, UniformValue::I32(value))
    }

    pub fn set_u32(&mut self, name: &str, value: u32) -> &mut Self {
        self.set(name, UniformValue::U32(value))
    }

    pub fn set_vec2(&mut self, name: &str, value: [f32; 2]) -> &mut Self {
        self.set(name, UniformValue::Vec2(value))
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) -> &mut Self {
        self.set(name, UniformValue::Vec3(value.to_array()))
    }

    pub fn set_vec4(&mut self, name: &str, value: [f32; 4]) -> &mut Self {
        self.set(name, UniformValue::Vec4(value))
    }

    pub fn set_color(&mut self, name: &str, value: Color) -> &mut Self {
        self.set(name, value)
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) -> &mut Self {
        self.set(name, value)
    }

    /// Binds `texture` to `unit` on the underlying pass.
    pub fn bind_texture(&mut self, unit: u32, texture: &Texture) -> Result<&mut Self, DrawError> {
        self.pass.bind_texture(unit, texture)?;
        Ok(self)
    }

    /// Draws `vertices` with this program.
    ///
    /// Indexed arrays draw their index list, others draw every vertex in order.
    pub fn draw(&mut self, vertices: &VertexArray) -> Result<(), DrawError> {
        self.pass.draw_with(self.program, vertices)
    }
}
