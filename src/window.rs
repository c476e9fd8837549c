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

//! Window and GL context creation on top of `winit` and `glutin`.

use crate::gpu_backend::GlowBackend;
use crate::ContextError;

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface as GlutinSurface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};

use raw_window_handle::HasRawWindowHandle;

use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::EventLoop;
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::{Window, WindowBuilder};

use std::fmt;
use std::num::NonZeroU32;

/// What the render context needs from the window it draws into.
pub trait Surface {
    /// Process pending window events without waiting for new ones.
    fn poll_events(&mut self);

    /// Present the back buffer.
    fn swap_buffers(&self) -> Result<(), ContextError>;

    /// Whether the user asked for the window to be closed.
    fn should_close(&self) -> bool;
}

/// Parameters for the window and its GL context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    /// Width of the window, in physical pixels.
    pub width: u32,

    /// Height of the window, in physical pixels.
    pub height: u32,

    /// The window title.
    pub title: String,

    /// The requested OpenGL version, as `(major, minor)`.
    pub gl_version: (u8, u8),

    /// Wait for vertical sync when swapping buffers.
    pub vsync: bool,

    /// Forward driver debug messages to `tracing`.
    pub debug: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

impl WindowConfig {
    /// A configuration for a window of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            title: "OpenGL".into(),
            gl_version: (3, 3),
            vsync: true,
            debug: false,
        }
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the requested OpenGL version.
    pub fn with_gl_version(mut self, major: u8, minor: u8) -> Self {
        self.gl_version = (major, minor);
        self
    }

    /// Enable or disable vertical sync.
    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// Enable or disable driver debug output.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn window_builder(&self) -> WindowBuilder {
        WindowBuilder::new()
            .with_title(&self.title)
            .with_resizable(false)
            .with_inner_size(PhysicalSize::new(self.width, self.height))
    }
}

/// A `winit` window with a current `glutin` context.
///
/// Fields drop in declaration order: the context goes before the surface, and both go
/// before the window they render into.
pub struct GlutinWindow {
    context: PossiblyCurrentContext,
    surface: GlutinSurface<WindowSurface>,
    window: Window,
    event_loop: EventLoop<()>,
    close_requested: bool,
}

impl fmt::Debug for GlutinWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlutinWindow")
            .field("window", &self.window.id())
            .field("close_requested", &self.close_requested)
            .finish_non_exhaustive()
    }
}

impl GlutinWindow {
    /// Open a window, make its context current and load the GL functions.
    ///
    /// # Panics
    ///
    /// Panics if winit cannot create the event loop, or if the platform reports no
    /// GL config for the requested template.
    pub fn new(config: &WindowConfig) -> Result<(Self, GlowBackend<glow::Context>), ContextError> {
        let event_loop = EventLoop::new();

        // Ask for a depth buffer, the pipeline depth-tests every draw.
        let template = ConfigTemplateBuilder::new().with_depth_size(24);
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_builder(Some(config.window_builder()))
            .build(&event_loop, template, |configs| {
                configs
                    .reduce(|accum, config| {
                        if config.num_samples() > accum.num_samples() {
                            config
                        } else {
                            accum
                        }
                    })
                    .expect("no GL config matches the template")
            })
            .map_err(|e| ContextError::Window(e.to_string()))?;

        let window = match window {
            Some(window) => window,
            None => glutin_winit::finalize_window(&event_loop, config.window_builder(), &gl_config)
                .map_err(|e| ContextError::Window(e.to_string()))?,
        };

        let (major, minor) = config.gl_version;
        let attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_profile(GlProfile::Core)
            .with_debug(config.debug)
            .build(Some(window.raw_window_handle()));

        let display = gl_config.display();
        let context = unsafe { display.create_context(&gl_config, &attributes)? };

        let surface_attributes = window.build_surface_attributes(Default::default());
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes)? };
        let context = context.make_current(&surface)?;

        if config.vsync {
            if let Err(err) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN))
            {
                tracing::warn!("failed to enable vsync: {err}");
            }
        }

        let gpu = load_glow(&display, &gl_config, config)?;

        Ok((
            Self {
                context,
                surface,
                window,
                event_loop,
                close_requested: false,
            },
            gpu,
        ))
    }

    /// The underlying `winit` window.
    pub fn window(&self) -> &Window {
        &self.window
    }
}

impl Surface for GlutinWindow {
    fn poll_events(&mut self) {
        let window_id = self.window.id();
        let close_requested = &mut self.close_requested;

        self.event_loop.run_return(|event, _, control_flow| {
            control_flow.set_poll();

            match event {
                Event::WindowEvent {
                    window_id: id,
                    event: WindowEvent::CloseRequested,
                } if id == window_id => {
                    *close_requested = true;
                }
                Event::MainEventsCleared => control_flow.set_exit(),
                _ => (),
            }
        });
    }

    fn swap_buffers(&self) -> Result<(), ContextError> {
        self.surface.swap_buffers(&self.context)?;
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }
}

fn load_glow(
    display: &Display,
    gl_config: &Config,
    config: &WindowConfig,
) -> Result<GlowBackend<glow::Context>, ContextError> {
    use glow::HasContext;

    let context = unsafe {
        glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s) as *const _)
    };

    let version = context.version();
    tracing::debug!(
        major = version.major,
        minor = version.minor,
        vendor = %version.vendor_info,
        samples = gl_config.num_samples(),
        "loaded OpenGL functions"
    );

    let (major, minor) = config.gl_version;
    if (version.major, version.minor) < (u32::from(major), u32::from(minor)) {
        return Err(ContextError::UnsupportedVersion {
            required: config.gl_version,
            found: (version.major, version.minor),
        });
    }

    #[cfg(not(target_vendor = "apple"))]
    if config.debug && context.supported_extensions().contains("GL_KHR_debug") {
        unsafe {
            context.enable(glow::DEBUG_OUTPUT);
            context.debug_message_callback(debug_message_callback);
        }
    }

    // SAFETY: the context was made current by the caller.
    Ok(unsafe { GlowBackend::new(context) })
}

#[cfg(not(target_vendor = "apple"))]
fn debug_message_callback(source: u32, ty: u32, id: u32, severity: u32, message: &str) {
    let source = match source {
        glow::DEBUG_SOURCE_API => "API",
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "Window System",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "Shader Compiler",
        glow::DEBUG_SOURCE_THIRD_PARTY => "Third Party",
        glow::DEBUG_SOURCE_APPLICATION => "Application",
        glow::DEBUG_SOURCE_OTHER => "Other",
        _ => "Unknown",
    };

    let ty = match ty {
        glow::DEBUG_TYPE_ERROR => "Error",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "Deprecated Behavior",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "Undefined Behavior",
        glow::DEBUG_TYPE_PORTABILITY => "Portability",
        glow::DEBUG_TYPE_PERFORMANCE => "Performance",
        _ => "Other",
    };

    match severity {
        glow::DEBUG_SEVERITY_HIGH => tracing::error!("{ty}-{id} ({source}): {message}"),
        glow::DEBUG_SEVERITY_MEDIUM => tracing::warn!("{ty}-{id} ({source}): {message}"),
        glow::DEBUG_SEVERITY_LOW => tracing::info!("{ty}-{id} ({source}): {message}"),
        _ => tracing::debug!("{ty}-{id} ({source}): {message}"),
    }
}
