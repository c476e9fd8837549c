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

//! The static unit quad shared by every rectangle.

use crate::gpu_backend::{GlError, GpuBackend};
use crate::CallOnDrop;

use std::fmt;
use std::mem;

/// Two triangles covering `[0, 1] x [0, 1]` at `z = 0`.
pub(crate) const UNIT_QUAD: [[f32; 3]; 6] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0],
];

/// Floats per vertex.
const COMPONENTS: i32 = 3;

/// The vertex array and buffer holding [`UNIT_QUAD`].
pub(crate) struct Geometry<G: GpuBackend + ?Sized> {
    vao: G::VertexArray,
    vbo: G::Buffer,
}

impl<G: GpuBackend + ?Sized> fmt::Debug for Geometry<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Geometry")
            .field("vao", &self.vao)
            .field("vbo", &self.vbo)
            .finish()
    }
}

impl<G: GpuBackend + ?Sized> Geometry<G> {
    /// Upload the unit quad and describe it to the attribute at `position`.
    ///
    /// Leaves the vertex array bound.
    pub(crate) fn upload(gpu: &G, position: u32) -> Result<Self, GlError> {
        let vao = gpu.create_vertex_array()?;
        let delete_vao = CallOnDrop(|| gpu.delete_vertex_array(vao));
        gpu.bind_vertex_array(Some(vao));

        let vbo = gpu.create_buffer()?;
        gpu.bind_array_buffer(Some(vbo));
        gpu.array_buffer_data(bytemuck::cast_slice(&UNIT_QUAD));

        // Tightly packed positions.
        let stride = COMPONENTS * mem::size_of::<f32>() as i32;
        gpu.enable_vertex_attrib_array(position);
        gpu.vertex_attrib_pointer_f32(position, COMPONENTS, stride, 0);

        gpu.check_error();
        mem::forget(delete_vao);
        tracing::debug!(?vao, ?vbo, "uploaded unit quad");

        Ok(Self { vao, vbo })
    }

    #[cfg(test)]
    pub(crate) fn vertex_array(&self) -> G::VertexArray {
        self.vao
    }

    /// Draw the quad with whatever program and uniforms are current.
    pub(crate) fn draw(&self, gpu: &G) {
        gpu.bind_vertex_array(Some(self.vao));
        gpu.draw_triangles(0, UNIT_QUAD.len() as i32);
    }

    pub(crate) fn delete(&self, gpu: &G) {
        gpu.bind_vertex_array(None);
        gpu.delete_buffer(self.vbo);
        gpu.delete_vertex_array(self.vao);
    }
}
