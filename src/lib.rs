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

//! A minimal OpenGL context for clearing the screen and drawing colored rectangles.
//!
//! The centerpiece of this crate is [`RenderContext`]. It opens a window through
//! [`winit`] and [`glutin`], builds a single shader program with [`glow`], uploads a unit
//! quad once, and then draws every rectangle by changing two uniforms and issuing one
//! draw call.
//!
//! ```no_run
//! use glow_rect::{Color, RenderContext};
//!
//! let mut context = RenderContext::new(800, 600)?;
//!
//! while !context.should_close() {
//!     context.clear(Color::rgb(0.2, 0.3, 0.4));
//!     context.draw_rectangle(100.0, 100.0, 200.0, 50.0, Color::rgb(1.0, 0.0, 0.0));
//!     context.swap_buffers()?;
//!     context.poll_events();
//! }
//! # Ok::<(), glow_rect::ContextError>(())
//! ```
//!
//! Rectangles are positioned in a fixed 800 by 600 logical space with the origin at the
//! bottom left, whatever the size of the window.
//!
//! All GL calls go through the [`GpuBackend`] trait, so the context can be driven by any
//! [`glow::HasContext`] that is current on the calling thread via
//! [`RenderContext::from_parts`].
//!
//! [`winit`]: https://crates.io/crates/winit
//! [`glutin`]: https://crates.io/crates/glutin
//! [`glow`]: https://crates.io/crates/glow

mod gpu_backend;
mod resources;
pub mod shader;
pub mod transform;
mod window;

#[cfg(test)]
mod testing;

pub use gpu_backend::{ClearBuffers, GlError, GlowBackend, GpuBackend};
pub use shader::{LinkError, ShaderError, ShaderSource, ShaderStage};
pub use window::{GlutinWindow, Surface, WindowConfig};

use resources::Geometry;
use shader::LinkedProgram;

use std::fmt;
use std::mem;

const VERTEX_SHADER: &str = include_str!("./shaders/rect.v.glsl");
const FRAGMENT_SHADER: &str = include_str!("./shaders/rect.f.glsl");

/// Name of the position attribute in the vertex shader.
const POSITION_ATTRIBUTE: &str = "vert";

#[derive(Debug, Clone, Copy)]
enum Uniform {
    Projection = 0,
    Camera = 1,
    Model = 2,
    Color = 3,
}

impl Uniform {
    fn as_index(self) -> usize {
        self as usize
    }

    fn as_name(self) -> &'static str {
        match self {
            Uniform::Projection => "projection",
            Uniform::Camera => "camera",
            Uniform::Model => "model",
            Uniform::Color => "color",
        }
    }
}

const UNIFORM_COUNT: usize = 4;
const UNIFORMS: [Uniform; UNIFORM_COUNT] = [
    Uniform::Projection,
    Uniform::Camera,
    Uniform::Model,
    Uniform::Color,
];

/// An opaque RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    /// The red channel.
    pub r: f32,

    /// The green channel.
    pub g: f32,

    /// The blue channel.
    pub b: f32,
}

impl Color {
    /// Create a color from its channels.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    fn clear_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }

    // Rectangles upload blue, green, red, with the fourth channel left at zero.
    // This swaps red and blue on screen.
    fn rect_bgr(self) -> [f32; 4] {
        [self.b, self.g, self.r, 0.0]
    }
}

/// An error that occurred while creating a [`RenderContext`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ContextError {
    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(String),

    /// The GL context or its surface failed.
    #[error("OpenGL context error: {0}")]
    Gl(#[from] glutin::error::Error),

    /// The driver is older than requested.
    #[error(
        "OpenGL {}.{} is required, but the driver provides {}.{}",
        .required.0, .required.1, .found.0, .found.1
    )]
    UnsupportedVersion {
        /// The requested version.
        required: (u8, u8),

        /// The version of the created context.
        found: (u32, u32),
    },

    /// The rectangle program could not be built.
    #[error("failed to build the rectangle program: {0}")]
    Program(#[from] LinkError),

    /// The linked program lacks a uniform.
    #[error("uniform `{0}` not found in program")]
    MissingUniform(&'static str),

    /// The linked program lacks a vertex attribute.
    #[error("vertex attribute `{0}` not found in program")]
    MissingAttribute(&'static str),

    /// The quad could not be uploaded.
    #[error("failed to upload geometry: {0}")]
    Geometry(GlError),
}

/// A window with a GL program ready to draw rectangles.
///
/// The context is pinned to the thread that created it. Its program and buffers are
/// deleted when it is dropped.
pub struct RenderContext<G: GpuBackend = GlowBackend<glow::Context>, W: Surface = GlutinWindow> {
    /// The driver.
    gpu: G,

    /// The rectangle program.
    program: LinkedProgram<G::Program>,

    /// Uniform locations, in the order of `UNIFORMS`.
    uniforms: Box<[G::UniformLocation]>,

    /// The unit quad.
    geometry: Geometry<G>,

    /// The window we draw into. Dropped last.
    window: W,
}

impl<G: GpuBackend + fmt::Debug, W: Surface + fmt::Debug> fmt::Debug for RenderContext<G, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("gpu", &self.gpu)
            .field("program", &self.program)
            .field("geometry", &self.geometry)
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

impl RenderContext {
    /// Open a `width` by `height` window and prepare it for drawing.
    pub fn new(width: u32, height: u32) -> Result<Self, ContextError> {
        Self::with_config(&WindowConfig::new(width, height))
    }

    /// Open a window described by `config` and prepare it for drawing.
    pub fn with_config(config: &WindowConfig) -> Result<Self, ContextError> {
        let (window, gpu) = GlutinWindow::new(config)?;
        Self::from_parts(gpu, window)
    }
}

impl<G: GpuBackend, W: Surface> RenderContext<G, W> {
    /// Build the program and geometry on an existing context.
    ///
    /// The context behind `gpu` must be current. On error everything created here is
    /// released again.
    pub fn from_parts(gpu: G, window: W) -> Result<Self, ContextError> {
        let program = shader::link(
            &gpu,
            ShaderSource::vertex(VERTEX_SHADER),
            ShaderSource::fragment(FRAGMENT_SHADER),
        )?;
        let delete_program = CallOnDrop(|| gpu.delete_program(program.raw()));

        gpu.use_program(Some(program.raw()));

        // Get the uniform locations.
        let uniforms = UNIFORMS
            .iter()
            .map(|uniform| {
                gpu.uniform_location(program.raw(), uniform.as_name())
                    .ok_or(ContextError::MissingUniform(uniform.as_name()))
            })
            .collect::<Result<Box<[_]>, _>>()?;

        let fixed = [
            (Uniform::Projection, transform::projection()),
            (Uniform::Camera, transform::camera()),
            (Uniform::Model, glam::Mat4::IDENTITY),
        ];
        for (uniform, matrix) in fixed {
            gpu.uniform_matrix4(&uniforms[uniform.as_index()], &matrix.to_cols_array());
        }

        let position = gpu
            .attrib_location(program.raw(), POSITION_ATTRIBUTE)
            .ok_or(ContextError::MissingAttribute(POSITION_ATTRIBUTE))?;
        let geometry = Geometry::upload(&gpu, position).map_err(ContextError::Geometry)?;

        gpu.enable_depth_test();
        gpu.check_error();

        mem::forget(delete_program);
        tracing::debug!("render context ready");

        Ok(Self {
            gpu,
            program,
            uniforms,
            geometry,
            window,
        })
    }

    fn uniform(&self, uniform: Uniform) -> &G::UniformLocation {
        &self.uniforms[uniform.as_index()]
    }

    /// Fill the whole window with `color` and reset the depth buffer.
    pub fn clear(&self, color: Color) {
        self.gpu.clear_color(&color.clear_rgba());
        self.gpu.clear(ClearBuffers::COLOR_AND_DEPTH);
    }

    /// Draw a `w` by `h` rectangle with its bottom left corner at `(x, y)`.
    pub fn draw_rectangle(&self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.gpu.use_program(Some(self.program.raw()));

        let model = transform::model(x, y, w, h);
        self.gpu
            .uniform_matrix4(self.uniform(Uniform::Model), &model.to_cols_array());
        self.gpu
            .uniform_vec4(self.uniform(Uniform::Color), &color.rect_bgr());

        self.geometry.draw(&self.gpu);
    }

    /// Process pending window events without blocking.
    pub fn poll_events(&mut self) {
        self.window.poll_events();
    }

    /// Present what has been drawn since the last swap.
    pub fn swap_buffers(&self) -> Result<(), ContextError> {
        self.window.swap_buffers()
    }

    /// Whether the window has been asked to close.
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// The window being drawn into.
    pub fn window(&self) -> &W {
        &self.window
    }

    /// The driver backing this context.
    pub fn gpu(&self) -> &G {
        &self.gpu
    }
}

impl<G: GpuBackend, W: Surface> Drop for RenderContext<G, W> {
    fn drop(&mut self) {
        self.gpu.use_program(None);
        self.geometry.delete(&self.gpu);
        self.gpu.delete_program(self.program.raw());
    }
}

pub(crate) struct CallOnDrop<F: FnMut()>(pub(crate) F);

impl<F: FnMut()> Drop for CallOnDrop<F> {
    fn drop(&mut self) {
        (self.0)();
    }
}
