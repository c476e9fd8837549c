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

//! Test doubles for the driver and the window.

use crate::gpu_backend::{ClearBuffers, GlError, GpuBackend};
use crate::shader::ShaderStage;
use crate::window::Surface;
use crate::ContextError;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

/// A driver call that changes state.
///
/// Pure queries (statuses, logs, locations) are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    CreateShader(ShaderStage, u32),
    ShaderSource(u32, String),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader(u32, u32),
    DetachShader(u32, u32),
    LinkProgram(u32),
    DeleteProgram(u32),
    UseProgram(Option<u32>),
    UniformMatrix4(String, [f32; 16]),
    UniformVec4(String, [f32; 4]),
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    CreateBuffer(u32),
    BindArrayBuffer(Option<u32>),
    ArrayBufferData(Vec<u8>),
    DeleteBuffer(u32),
    EnableVertexAttribArray(u32),
    VertexAttribPointer {
        index: u32,
        size: i32,
        stride: i32,
        offset: i32,
    },
    EnableDepthTest,
    ClearColor([f32; 4]),
    Clear(ClearBuffers),
    DrawTriangles {
        first: i32,
        count: i32,
    },
}

#[derive(Debug, Default)]
struct State {
    calls: RefCell<Vec<Call>>,
    next_id: Cell<u32>,
    stages: RefCell<HashMap<u32, ShaderStage>>,
}

/// A [`GpuBackend`] that records calls instead of talking to a driver.
///
/// Clones share the same call log.
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingBackend {
    state: Rc<State>,
    fail_compile: Option<(ShaderStage, String)>,
    fail_link: Option<String>,
    fail_create_shader: bool,
    fail_create_buffer: bool,
    missing_uniform: Option<&'static str>,
    missing_attribute: bool,
}

impl RecordingBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reject every shader of `stage` with `log`.
    pub(crate) fn fail_compile(mut self, stage: ShaderStage, log: &str) -> Self {
        self.fail_compile = Some((stage, log.to_owned()));
        self
    }

    /// Reject every link with `log`.
    pub(crate) fn fail_link(mut self, log: &str) -> Self {
        self.fail_link = Some(log.to_owned());
        self
    }

    pub(crate) fn fail_create_shader(mut self) -> Self {
        self.fail_create_shader = true;
        self
    }

    pub(crate) fn fail_create_buffer(mut self) -> Self {
        self.fail_create_buffer = true;
        self
    }

    /// Pretend the linked program has no uniform called `name`.
    pub(crate) fn without_uniform(mut self, name: &'static str) -> Self {
        self.missing_uniform = Some(name);
        self
    }

    /// Pretend the linked program has no vertex attributes.
    pub(crate) fn without_attributes(mut self) -> Self {
        self.missing_attribute = true;
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.calls.borrow().clone()
    }

    /// Return the calls recorded so far and start a fresh log.
    pub(crate) fn take_calls(&self) -> Vec<Call> {
        self.state.calls.take()
    }

    pub(crate) fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.state.calls.borrow().iter().filter(|c| f(c)).count()
    }

    fn record(&self, call: Call) {
        self.state.calls.borrow_mut().push(call);
    }

    fn next_id(&self) -> u32 {
        let id = self.state.next_id.get() + 1;
        self.state.next_id.set(id);
        id
    }
}

impl GpuBackend for RecordingBackend {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type UniformLocation = String;

    fn create_shader(&self, stage: ShaderStage) -> Result<u32, GlError> {
        if self.fail_create_shader {
            return Err(GlError("out of shader names".into()));
        }

        let id = self.next_id();
        self.state.stages.borrow_mut().insert(id, stage);
        self.record(Call::CreateShader(stage, id));
        Ok(id)
    }

    fn shader_source(&self, shader: u32, source: &str) {
        self.record(Call::ShaderSource(shader, source.to_owned()));
    }

    fn compile_shader(&self, shader: u32) {
        self.record(Call::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: u32) -> bool {
        let stage = self.state.stages.borrow().get(&shader).copied();
        !matches!(
            (&self.fail_compile, stage),
            (Some((failing, _)), Some(stage)) if *failing == stage
        )
    }

    fn shader_info_log(&self, _shader: u32) -> String {
        self.fail_compile
            .as_ref()
            .map(|(_, log)| log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: u32) {
        self.record(Call::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, GlError> {
        let id = self.next_id();
        self.record(Call::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(Call::AttachShader(program, shader));
    }

    fn detach_shader(&self, program: u32, shader: u32) {
        self.record(Call::DetachShader(program, shader));
    }

    fn link_program(&self, program: u32) {
        self.record(Call::LinkProgram(program));
    }

    fn program_link_status(&self, _program: u32) -> bool {
        self.fail_link.is_none()
    }

    fn program_info_log(&self, _program: u32) -> String {
        self.fail_link.clone().unwrap_or_default()
    }

    fn delete_program(&self, program: u32) {
        self.record(Call::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_location(&self, _program: u32, name: &str) -> Option<String> {
        if self.missing_uniform == Some(name) {
            None
        } else {
            Some(name.to_owned())
        }
    }

    fn uniform_matrix4(&self, location: &String, matrix: &[f32; 16]) {
        self.record(Call::UniformMatrix4(location.clone(), *matrix));
    }

    fn uniform_vec4(&self, location: &String, value: &[f32; 4]) {
        self.record(Call::UniformVec4(location.clone(), *value));
    }

    fn attrib_location(&self, _program: u32, _name: &str) -> Option<u32> {
        if self.missing_attribute {
            None
        } else {
            Some(0)
        }
    }

    fn create_vertex_array(&self) -> Result<u32, GlError> {
        let id = self.next_id();
        self.record(Call::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<u32>) {
        self.record(Call::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: u32) {
        self.record(Call::DeleteVertexArray(vertex_array));
    }

    fn create_buffer(&self) -> Result<u32, GlError> {
        if self.fail_create_buffer {
            return Err(GlError("out of buffer names".into()));
        }

        let id = self.next_id();
        self.record(Call::CreateBuffer(id));
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<u32>) {
        self.record(Call::BindArrayBuffer(buffer));
    }

    fn array_buffer_data(&self, data: &[u8]) {
        self.record(Call::ArrayBufferData(data.to_vec()));
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(Call::DeleteBuffer(buffer));
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer_f32(&self, index: u32, size: i32, stride: i32, offset: i32) {
        self.record(Call::VertexAttribPointer {
            index,
            size,
            stride,
            offset,
        });
    }

    fn enable_depth_test(&self) {
        self.record(Call::EnableDepthTest);
    }

    fn clear_color(&self, rgba: &[f32; 4]) {
        self.record(Call::ClearColor(*rgba));
    }

    fn clear(&self, buffers: ClearBuffers) {
        self.record(Call::Clear(buffers));
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(Call::DrawTriangles { first, count });
    }
}

/// A [`Surface`] with no window behind it.
#[derive(Debug, Default)]
pub(crate) struct NullSurface {
    pub(crate) polls: usize,
    pub(crate) swaps: Cell<usize>,

    /// Report a close request once this many polls have happened.
    pub(crate) close_after: Option<usize>,
}

impl Surface for NullSurface {
    fn poll_events(&mut self) {
        self.polls += 1;
    }

    fn swap_buffers(&self) -> Result<(), ContextError> {
        self.swaps.set(self.swaps.get() + 1);
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.close_after.map_or(false, |n| self.polls >= n)
    }
}
