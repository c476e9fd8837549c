// SPDX-License-Identifier: LGPL-3.0-or-later OR MPL-2.0
// This file is a part of `glow-rect`.
//
// `glow-rect` is free software: you can redistribute it and/or modify it under the terms of
// either:
//
// * GNU Lesser General Public License as published by the Free Software Foundation, either
// version 3 of the License, or (at your option) any later version.
// * Mozilla Public License as published by the Mozilla Foundation, version 2.
//
// `glow-rect` is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Lesser General Public License or the Mozilla Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public License and the Mozilla
// Public License along with `glow-rect`. If not, see <https://www.gnu.org/licenses/> or
// <https://www.mozilla.org/en-US/MPL/2.0/>.

//! The set of driver calls the renderer is built on.
//!
//! Every OpenGL call made by this crate goes through the [`GpuBackend`] trait. The
//! [`GlowBackend`] implementation forwards them to anything that implements
//! [`glow::HasContext`].

use crate::shader::ShaderStage;

use glow::HasContext;

use std::fmt;

/// An error reported by the driver while allocating an object.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("gl error: {0}")]
pub struct GlError(pub String);

impl From<String> for GlError {
    fn from(s: String) -> Self {
        GlError(s)
    }
}

/// Which buffers a call to [`GpuBackend::clear`] resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClearBuffers {
    /// Clear the color buffer.
    pub color: bool,

    /// Clear the depth buffer.
    pub depth: bool,
}

impl ClearBuffers {
    /// Clear both the color and the depth buffer.
    pub const COLOR_AND_DEPTH: Self = Self {
        color: true,
        depth: true,
    };
}

/// The driver calls used by the renderer.
///
/// Implementations must only be used while their GL context is current on the calling
/// thread. Handle types are plain copies of driver names; destroying them is explicit.
pub trait GpuBackend {
    /// A shader object.
    type Shader: Copy + fmt::Debug;

    /// A program object.
    type Program: Copy + fmt::Debug;

    /// A buffer object.
    type Buffer: Copy + fmt::Debug;

    /// A vertex array object.
    type VertexArray: Copy + fmt::Debug;

    /// The location of a uniform inside of a program.
    type UniformLocation: fmt::Debug;

    /// Allocate a shader object for the given stage.
    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, GlError>;

    /// Replace the source text of a shader.
    fn shader_source(&self, shader: Self::Shader, source: &str);

    /// Compile a shader.
    fn compile_shader(&self, shader: Self::Shader);

    /// Whether the last compilation of the shader succeeded.
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;

    /// The full info log of a shader.
    fn shader_info_log(&self, shader: Self::Shader) -> String;

    /// Delete a shader object.
    fn delete_shader(&self, shader: Self::Shader);

    /// Allocate a program object.
    fn create_program(&self) -> Result<Self::Program, GlError>;

    /// Attach a shader to a program.
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Detach a shader from a program.
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);

    /// Link a program.
    fn link_program(&self, program: Self::Program);

    /// Whether the last link of the program succeeded.
    fn program_link_status(&self, program: Self::Program) -> bool;

    /// The full info log of a program.
    fn program_info_log(&self, program: Self::Program) -> String;

    /// Delete a program object.
    fn delete_program(&self, program: Self::Program);

    /// Make a program current, or unbind the current one.
    fn use_program(&self, program: Option<Self::Program>);

    /// Look up a uniform by name.
    fn uniform_location(&self, program: Self::Program, name: &str)
        -> Option<Self::UniformLocation>;

    /// Upload a column-major 4x4 matrix to a uniform of the current program.
    fn uniform_matrix4(&self, location: &Self::UniformLocation, matrix: &[f32; 16]);

    /// Upload a 4-component vector to a uniform of the current program.
    fn uniform_vec4(&self, location: &Self::UniformLocation, value: &[f32; 4]);

    /// Look up a vertex attribute by name.
    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32>;

    /// Allocate a vertex array object.
    fn create_vertex_array(&self) -> Result<Self::VertexArray, GlError>;

    /// Bind a vertex array object.
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);

    /// Delete a vertex array object.
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    /// Allocate a buffer object.
    fn create_buffer(&self) -> Result<Self::Buffer, GlError>;

    /// Bind a buffer to the array buffer target.
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);

    /// Fill the bound array buffer with static data.
    fn array_buffer_data(&self, data: &[u8]);

    /// Delete a buffer object.
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Enable a vertex attribute array.
    fn enable_vertex_attrib_array(&self, index: u32);

    /// Describe a float vertex attribute sourced from the bound array buffer.
    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32);

    /// Enable depth testing with the `LESS` comparison.
    fn enable_depth_test(&self);

    /// Set the color used by [`GpuBackend::clear`].
    fn clear_color(&self, rgba: &[f32; 4]);

    /// Clear the given buffers.
    fn clear(&self, buffers: ClearBuffers);

    /// Draw `count` vertices as triangles, starting at `first`.
    fn draw_triangles(&self, first: i32, count: i32);

    /// Report any pending driver error.
    fn check_error(&self) {}
}

/// A [`GpuBackend`] backed by a [`glow`] context.
pub struct GlowBackend<H: HasContext + ?Sized> {
    context: H,
}

impl<H: HasContext + ?Sized> fmt::Debug for GlowBackend<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlowBackend").finish_non_exhaustive()
    }
}

impl<H: HasContext> GlowBackend<H> {
    /// Wrap a [`glow`] context.
    ///
    /// # Safety
    ///
    /// The context must be current when this is called and whenever any method of the
    /// returned backend is called.
    pub unsafe fn new(context: H) -> Self {
        Self { context }
    }

    /// Consume this structure and return the underlying context.
    pub fn into_inner(self) -> H {
        self.context
    }
}

impl<H: HasContext + ?Sized> GlowBackend<H> {
    /// Get a reference to the underlying context.
    pub fn context(&self) -> &H {
        &self.context
    }
}

// SAFETY for every `unsafe` block below: the context is current, which is the
// contract of `GlowBackend::new`.
impl<H: HasContext + ?Sized> GpuBackend for GlowBackend<H> {
    type Shader = H::Shader;
    type Program = H::Program;
    type Buffer = H::Buffer;
    type VertexArray = H::VertexArray;
    type UniformLocation = H::UniformLocation;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, GlError> {
        unsafe { self.context.create_shader(stage.as_gl()).gl_err() }
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        unsafe { self.context.shader_source(shader, source) }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        unsafe { self.context.compile_shader(shader) }
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        unsafe { self.context.get_shader_compile_status(shader) }
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        unsafe { self.context.get_shader_info_log(shader) }
    }

    fn delete_shader(&self, shader: Self::Shader) {
        unsafe { self.context.delete_shader(shader) }
    }

    fn create_program(&self) -> Result<Self::Program, GlError> {
        unsafe { self.context.create_program().gl_err() }
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.context.attach_shader(program, shader) }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        unsafe { self.context.detach_shader(program, shader) }
    }

    fn link_program(&self, program: Self::Program) {
        unsafe { self.context.link_program(program) }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        unsafe { self.context.get_program_link_status(program) }
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        unsafe { self.context.get_program_info_log(program) }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { self.context.delete_program(program) }
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { self.context.use_program(program) }
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        unsafe { self.context.get_uniform_location(program, name) }
    }

    fn uniform_matrix4(&self, location: &Self::UniformLocation, matrix: &[f32; 16]) {
        unsafe {
            self.context
                .uniform_matrix_4_f32_slice(Some(location), false, matrix)
        }
    }

    fn uniform_vec4(&self, location: &Self::UniformLocation, value: &[f32; 4]) {
        unsafe { self.context.uniform_4_f32_slice(Some(location), value) }
    }

    fn attrib_location(&self, program: Self::Program, name: &str) -> Option<u32> {
        unsafe { self.context.get_attrib_location(program, name) }
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, GlError> {
        unsafe { self.context.create_vertex_array().gl_err() }
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        unsafe { self.context.bind_vertex_array(vertex_array) }
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        unsafe { self.context.delete_vertex_array(vertex_array) }
    }

    fn create_buffer(&self) -> Result<Self::Buffer, GlError> {
        unsafe { self.context.create_buffer().gl_err() }
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        unsafe { self.context.bind_buffer(glow::ARRAY_BUFFER, buffer) }
    }

    fn array_buffer_data(&self, data: &[u8]) {
        unsafe {
            self.context
                .buffer_data_u8_slice(glow::ARRAY_BUFFER, data, glow::STATIC_DRAW)
        }
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        unsafe { self.context.delete_buffer(buffer) }
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        unsafe { self.context.enable_vertex_attrib_array(index) }
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        unsafe {
            self.context
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, false, stride, offset)
        }
    }

    fn enable_depth_test(&self) {
        unsafe {
            self.context.enable(glow::DEPTH_TEST);
            self.context.depth_func(glow::LESS);
        }
    }

    fn clear_color(&self, [r, g, b, a]: &[f32; 4]) {
        unsafe { self.context.clear_color(*r, *g, *b, *a) }
    }

    fn clear(&self, buffers: ClearBuffers) {
        let mut mask = 0;
        if buffers.color {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if buffers.depth {
            mask |= glow::DEPTH_BUFFER_BIT;
        }

        unsafe { self.context.clear(mask) }
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        unsafe { self.context.draw_arrays(glow::TRIANGLES, first, count) }
    }

    fn check_error(&self) {
        gl_error(&self.context);
    }
}

fn gl_error(h: &(impl HasContext + ?Sized)) {
    let err = unsafe { h.get_error() };

    if err != glow::NO_ERROR {
        let error_str = match err {
            glow::INVALID_ENUM => "GL_INVALID_ENUM",
            glow::INVALID_VALUE => "GL_INVALID_VALUE",
            glow::INVALID_OPERATION => "GL_INVALID_OPERATION",
            glow::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            glow::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            _ => "Unknown GL error",
        };

        tracing::error!("GL error: {}", error_str)
    }
}

trait ResultExt<T, E> {
    fn gl_err(self) -> Result<T, GlError>;
}

impl<T, E: Into<GlError>> ResultExt<T, E> for Result<T, E> {
    fn gl_err(self) -> Result<T, GlError> {
        self.map_err(Into::into)
    }
}
