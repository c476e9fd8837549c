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

//! Shader compilation and program linking.

use crate::gpu_backend::{GlError, GpuBackend};
use crate::CallOnDrop;

use std::fmt;
use std::mem;

/// A stage of the rendering pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,

    /// The fragment stage.
    Fragment,
}

impl ShaderStage {
    pub(crate) fn as_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// GLSL source text for a single stage.
///
/// The text is handed to the driver along with its length, so it does not need to be
/// terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSource<'a> {
    stage: ShaderStage,
    text: &'a str,
}

impl<'a> ShaderSource<'a> {
    /// Source text for the vertex stage.
    pub fn vertex(text: &'a str) -> Self {
        Self {
            stage: ShaderStage::Vertex,
            text,
        }
    }

    /// Source text for the fragment stage.
    pub fn fragment(text: &'a str) -> Self {
        Self {
            stage: ShaderStage::Fragment,
            text,
        }
    }

    /// The stage this source is compiled for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    /// The source text.
    pub fn text(&self) -> &'a str {
        self.text
    }
}

/// An error that occurred while compiling a shader.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ShaderError {
    /// The driver could not allocate a shader object.
    #[error("failed to create {stage} shader: {error}")]
    Create {
        /// The stage being compiled.
        stage: ShaderStage,

        /// The driver error.
        error: GlError,
    },

    /// The driver rejected the source text.
    #[error("failed to compile {stage} shader: {log}\n{source_text}")]
    CompileFailed {
        /// The stage being compiled.
        stage: ShaderStage,

        /// The exact text that was handed to the driver.
        source_text: String,

        /// The driver's diagnostic log.
        log: String,
    },
}

/// An error that occurred while building a program.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LinkError {
    /// One of the stages failed to compile.
    #[error(transparent)]
    Shader(#[from] ShaderError),

    /// The driver could not allocate a program object.
    #[error("failed to create program: {0}")]
    CreateProgram(GlError),

    /// The driver refused to link the stages together.
    #[error("failed to link program: {log}")]
    LinkFailed {
        /// The driver's diagnostic log.
        log: String,
    },
}

/// A compiled shader object.
///
/// Only lives for the duration of a link.
#[derive(Debug)]
pub struct CompiledShader<S> {
    raw: S,
    stage: ShaderStage,
}

impl<S: Copy> CompiledShader<S> {
    /// The driver handle.
    pub fn raw(&self) -> S {
        self.raw
    }

    /// The stage this shader was compiled for.
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

/// A linked program object.
///
/// Deleting it is up to the owner.
#[derive(Debug)]
pub struct LinkedProgram<P> {
    raw: P,
}

impl<P: Copy> LinkedProgram<P> {
    /// The driver handle.
    pub fn raw(&self) -> P {
        self.raw
    }
}

/// Compile a single shader stage.
///
/// On failure the shader object is deleted before returning.
pub fn compile<G: GpuBackend + ?Sized>(
    gpu: &G,
    source: ShaderSource<'_>,
) -> Result<CompiledShader<G::Shader>, ShaderError> {
    let stage = source.stage();
    let shader = gpu
        .create_shader(stage)
        .map_err(|error| ShaderError::Create { stage, error })?;
    let call_on_drop = CallOnDrop(|| gpu.delete_shader(shader));

    gpu.shader_source(shader, source.text());
    gpu.compile_shader(shader);

    if !gpu.shader_compile_status(shader) {
        let log = gpu.shader_info_log(shader);
        return Err(ShaderError::CompileFailed {
            stage,
            source_text: source.text().to_owned(),
            log,
        });
    }

    mem::forget(call_on_drop);
    tracing::debug!(%stage, "compiled shader");

    Ok(CompiledShader { raw: shader, stage })
}

/// Compile both stages and link them into a program.
///
/// Stages are compiled in order and the first failure is returned before any program
/// object is created. The intermediate shader objects are always deleted.
pub fn link<G: GpuBackend + ?Sized>(
    gpu: &G,
    vertex: ShaderSource<'_>,
    fragment: ShaderSource<'_>,
) -> Result<LinkedProgram<G::Program>, LinkError> {
    let vertex = compile(gpu, vertex)?;
    let _delete_vertex = CallOnDrop(|| gpu.delete_shader(vertex.raw));

    let fragment = compile(gpu, fragment)?;
    let _delete_fragment = CallOnDrop(|| gpu.delete_shader(fragment.raw));

    let program = gpu.create_program().map_err(LinkError::CreateProgram)?;
    let delete_program = CallOnDrop(|| gpu.delete_program(program));

    gpu.attach_shader(program, vertex.raw);
    gpu.attach_shader(program, fragment.raw);
    let _detach_shaders = CallOnDrop(|| {
        gpu.detach_shader(program, vertex.raw);
        gpu.detach_shader(program, fragment.raw);
    });

    gpu.link_program(program);

    if !gpu.program_link_status(program) {
        let log = gpu.program_info_log(program);
        return Err(LinkError::LinkFailed { log });
    }

    mem::forget(delete_program);
    tracing::debug!(?program, "linked program");

    Ok(LinkedProgram { raw: program })
}
