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

//! The fixed transforms of the rectangle pipeline.

use glam::{Mat4, Vec3};

/// Width of the logical space covered by the projection.
pub const LOGICAL_WIDTH: f32 = 800.0;

/// Height of the logical space covered by the projection.
pub const LOGICAL_HEIGHT: f32 = 600.0;

/// Orthographic projection over `0..LOGICAL_WIDTH` by `0..LOGICAL_HEIGHT`.
///
/// This does not follow the window size.
pub fn projection() -> Mat4 {
    Mat4::orthographic_rh_gl(0.0, LOGICAL_WIDTH, 0.0, LOGICAL_HEIGHT, -1.0, 1.0)
}

/// The view matrix: looking at the origin from `z = 0.5`, `+Y` up.
pub fn camera() -> Mat4 {
    Mat4::look_at_rh(Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO, Vec3::Y)
}

/// Maps the unit quad onto the rectangle at `(x, y)` with size `(w, h)`.
pub fn model(x: f32, y: f32, w: f32, h: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, 0.0)) * Mat4::from_scale(Vec3::new(w, h, 0.0))
}
