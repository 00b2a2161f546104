//! CPU-side vertex representation produced by the importer.

use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};

/// Fully expanded vertex: position/uv/normal. Values are in object space.
///
/// Layout is `#[repr(C)]` so a `&[Vertex]` can be copied straight into a
/// vertex buffer (see [`as_bytes`]).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub tex_coord: [f32; 2],
    /// Taken as-is from the file, not renormalized.
    pub normal: [f32; 3],
}

/// One interleaved float attribute inside [`Vertex`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components.
    pub components: u32,
    /// Byte offset from the start of the vertex.
    pub offset: usize,
}

impl Vertex {
    pub const STRIDE: usize = size_of::<Vertex>();

    /// Shader locations: 0 = position, 1 = normal, 2 = texcoord.
    pub const ATTRIBUTES: [VertexAttribute; 3] = [
        VertexAttribute {
            location: 0,
            components: 3,
            offset: offset_of!(Vertex, position),
        },
        VertexAttribute {
            location: 1,
            components: 3,
            offset: offset_of!(Vertex, normal),
        },
        VertexAttribute {
            location: 2,
            components: 2,
            offset: offset_of!(Vertex, tex_coord),
        },
    ];

    pub fn new(position: [f32; 3], tex_coord: [f32; 2], normal: [f32; 3]) -> Self {
        Self {
            position,
            tex_coord,
            normal,
        }
    }
}

/// Raw bytes of a flat vertex sequence, ready for a GPU upload routine.
pub fn as_bytes(vertices: &[Vertex]) -> &[u8] {
    bytemuck::cast_slice(vertices)
}

/// Number of whole triangles a flat vertex sequence draws.
#[inline]
pub fn triangle_count(vertices: &[Vertex]) -> usize {
    vertices.len() / 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 32);
        let offsets: Vec<(u32, usize)> = Vertex::ATTRIBUTES
            .iter()
            .map(|a| (a.location, a.offset))
            .collect();
        assert_eq!(offsets, vec![(0, 0), (1, 20), (2, 12)]);
    }

    #[test]
    fn byte_view_covers_every_vertex() {
        let verts = vec![Vertex::new([1.0, 2.0, 3.0], [0.5, 0.25], [0.0, 0.0, 1.0]); 3];
        let bytes = as_bytes(&verts);
        assert_eq!(bytes.len(), 3 * Vertex::STRIDE);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(triangle_count(&verts), 1);
    }
}
