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

//! Opens a window and draws a few rectangles until it is closed.

use glow_rect::{Color, RenderContext, WindowConfig};

use std::process::ExitCode;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), glow_rect::ContextError> {
    let config = WindowConfig::new(800, 600).with_title("glow-rect");
    let mut context = RenderContext::with_config(&config)?;

    let mut tick = 0u32;
    while !context.should_close() {
        context.clear(Color::rgb(0.2, 0.3, 0.4));

        // A row of squares.
        for i in 0..8 {
            let shade = i as f32 / 7.0;
            context.draw_rectangle(
                40.0 + i as f32 * 90.0,
                40.0,
                80.0,
                80.0,
                Color::rgb(shade, 0.5, 1.0 - shade),
            );
        }

        // One bar that slides back and forth.
        let offset = (tick % 600) as f32;
        let x = if offset < 300.0 { offset } else { 600.0 - offset };
        context.draw_rectangle(100.0 + x, 300.0, 200.0, 50.0, Color::rgb(1.0, 0.0, 0.0));

        context.swap_buffers()?;
        context.poll_events();
        tick = tick.wrapping_add(1);
    }

    Ok(())
}
