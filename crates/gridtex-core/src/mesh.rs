//! Textured mesh geometry.

use glam::{Vec2, Vec3};

/// One mesh vertex.
/// Layout is 32 bytes: position, normal, texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl TexturedVertex {
    pub fn new(position: Vec3, normal: Vec3, tex_coord: Vec2) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            tex_coord: tex_coord.to_array(),
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    #[must_use]
    pub fn tex_coord(&self) -> Vec2 {
        Vec2::from_array(self.tex_coord)
    }

    /// True if the position has no NaN or infinite component.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position().is_finite()
    }
}

/// How a mesh's vertices form primitives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeshTopology {
    /// Four corners in order (x0,y0), (x0,y1), (x1,y1), (x1,y0).
    Quad,
    /// Consecutive triangle strips with the given vertex counts.
    TriangleStrips(Vec<usize>),
    /// Independent triangles, three vertices each.
    Triangles,
}

/// Immutable geometry of one tile or stitch strip.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    topology: MeshTopology,
    vertices: Vec<TexturedVertex>,
}

impl Mesh {
    /// Four-vertex flat quad.
    pub fn quad(vertices: [TexturedVertex; 4]) -> Self {
        Self {
            topology: MeshTopology::Quad,
            vertices: vertices.to_vec(),
        }
    }

    /// Triangle strips laid out back to back.
    pub fn strips(vertices: Vec<TexturedVertex>, lengths: Vec<usize>) -> Self {
        debug_assert_eq!(lengths.iter().sum::<usize>(), vertices.len());
        Self {
            topology: MeshTopology::TriangleStrips(lengths),
            vertices,
        }
    }

    /// Independent triangles.
    pub fn triangles(vertices: Vec<TexturedVertex>) -> Self {
        debug_assert_eq!(vertices.len() % 3, 0);
        Self {
            topology: MeshTopology::Triangles,
            vertices,
        }
    }

    #[must_use]
    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    #[must_use]
    pub fn vertices(&self) -> &[TexturedVertex] {
        &self.vertices
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Raw vertex bytes, ready for upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Number of triangles drawn.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        match &self.topology {
            MeshTopology::Quad => 2,
            MeshTopology::TriangleStrips(lengths) => {
                lengths.iter().map(|&n| n.saturating_sub(2)).sum()
            }
            MeshTopology::Triangles => self.vertices.len() / 3,
        }
    }

    /// Expands the mesh into independent triangles, preserving winding.
    #[must_use]
    pub fn triangle_list(&self) -> Vec<[TexturedVertex; 3]> {
        let v = &self.vertices;
        match &self.topology {
            MeshTopology::Quad => vec![[v[0], v[1], v[2]], [v[0], v[2], v[3]]],
            MeshTopology::TriangleStrips(lengths) => {
                let mut out = Vec::with_capacity(self.triangle_count());
                let mut offset = 0;
                for &n in lengths {
                    for k in 0..n.saturating_sub(2) {
                        let (a, b, c) = (v[offset + k], v[offset + k + 1], v[offset + k + 2]);
                        if k % 2 == 0 {
                            out.push([a, b, c]);
                        } else {
                            out.push([b, a, c]);
                        }
                    }
                    offset += n;
                }
                out
            }
            MeshTopology::Triangles => v.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect(),
        }
    }
}
