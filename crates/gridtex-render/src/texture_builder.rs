//! Geometry for textured tiles.
//!
//! Linear domains get a flat quad per tile. Curved domains (gridded sample
//! locations or a coordinate transform) get a coarse lattice of triangle
//! strips, followed by missing-vertex and seam surgery.

use glam::{Vec2, Vec3};
use gridtex_core::grid::{DomainKind, Grid};
use gridtex_core::mapping::DisplayMapping;
use gridtex_core::{GridTexError, Mesh, Region, RenderOptions, Result, TexturedVertex};

use crate::surgery::{adjust_seam, has_missing, remove_missing};

/// Lattice spacing for a curved region: `max(2, min(user_step, (w + h) / 64))`.
#[must_use]
pub fn curvature_step(user_step: u32, width: usize, height: usize) -> usize {
    (user_step as usize).min((width + height) / 64).max(2)
}

/// Sample offsets of lattice lines along one axis.
///
/// Every `step`-th sample, always ending on the last one. A single sample
/// yields a doubled line so strips stay well formed.
#[must_use]
pub fn lattice_indices(len: usize, step: usize) -> Vec<usize> {
    if len <= 1 {
        return vec![0, 0];
    }
    let mut out: Vec<usize> = (0..len - 1).step_by(step.max(1)).collect();
    out.push(len - 1);
    out
}

/// Flat quad over `region`, extended by half a sample on every edge.
///
/// Corners run (x0,y0), (x0,y1), (x1,y1), (x1,y0).
#[must_use]
pub fn build_linear_quad(grid: &Grid, region: Region, axes: [usize; 2]) -> Mesh {
    let x0 = region.x_start as f32 - 0.5;
    let y0 = region.y_start as f32 - 0.5;
    let x1 = x0 + region.width as f32;
    let y1 = y0 + region.height as f32;
    let c = [
        grid.spatial_point(x0, y0, axes),
        grid.spatial_point(x0, y1, axes),
        grid.spatial_point(x1, y1, axes),
        grid.spatial_point(x1, y0, axes),
    ];
    let normal = (c[3] - c[0]).cross(c[1] - c[0]).normalize_or_zero();

    let (tw, th) = region.texture_size();
    let rw = region.width as f32 / tw as f32;
    let rh = region.height as f32 / th as f32;
    let uv = [
        Vec2::new(0.0, 0.0),
        Vec2::new(0.0, rh),
        Vec2::new(rw, rh),
        Vec2::new(rw, 0.0),
    ];
    Mesh::quad([0, 1, 2, 3].map(|k| TexturedVertex::new(c[k], normal, uv[k])))
}

/// Triangle strips over a coarse lattice of true sample positions.
///
/// Texture coordinates hit texel centers: `0.5 / tw + i / tw` for
/// lattice sample `i`.
#[must_use]
pub fn build_curved_mesh(grid: &Grid, region: Region, axes: [usize; 2], user_step: u32) -> Mesh {
    let step = curvature_step(user_step, region.width, region.height);
    let is = lattice_indices(region.width, step);
    let js = lattice_indices(region.height, step);
    let nwidth = is.len();
    let nheight = js.len();

    let positions: Vec<Vec3> = js
        .iter()
        .flat_map(|&j| {
            is.iter().map(move |&i| {
                grid.spatial_point(
                    (region.x_start + i) as f32,
                    (region.y_start + j) as f32,
                    axes,
                )
            })
        })
        .collect();
    let at = |i: usize, j: usize| positions[j * nwidth + i];
    let normal = |i: usize, j: usize| {
        let du = at((i + 1).min(nwidth - 1), j) - at(i.saturating_sub(1), j);
        let dv = at(i, (j + 1).min(nheight - 1)) - at(i, j.saturating_sub(1));
        du.cross(dv).normalize_or_zero()
    };

    let (tw, th) = region.texture_size();
    let texel = Vec2::new(1.0 / tw as f32, 1.0 / th as f32);
    let uv = |i: usize, j: usize| (Vec2::new(is[i] as f32, js[j] as f32) + 0.5) * texel;

    let mut vertices = Vec::with_capacity((nheight - 1) * 2 * nwidth);
    for j in 0..nheight - 1 {
        for i in 0..nwidth {
            vertices.push(TexturedVertex::new(at(i, j), normal(i, j), uv(i, j)));
            vertices.push(TexturedVertex::new(at(i, j + 1), normal(i, j + 1), uv(i, j + 1)));
        }
    }
    Mesh::strips(vertices, vec![2 * nwidth; nheight - 1])
}

/// Builds meshes for tile and stitch regions of one grid.
#[derive(Debug)]
pub struct MeshBuilder<'a> {
    grid: &'a Grid,
    axes: [usize; 2],
    kind: DomainKind,
    curvature_step: u32,
    adjust_seam: bool,
}

impl<'a> MeshBuilder<'a> {
    /// Resolves display axes and checks curved textures are allowed.
    pub fn new(grid: &'a Grid, mapping: &DisplayMapping, options: &RenderOptions) -> Result<Self> {
        let axes = mapping.spatial_axes()?;
        let kind = grid.domain_kind();
        if kind == DomainKind::Curved && options.curvature_step == 0 {
            return Err(GridTexError::CurvedTexturesDisabled);
        }
        Ok(Self {
            grid,
            axes,
            kind,
            curvature_step: options.curvature_step,
            adjust_seam: options.adjust_projection_seam,
        })
    }

    #[must_use]
    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    /// Mesh for one tile.
    #[must_use]
    pub fn build(&self, region: Region) -> Mesh {
        match self.kind {
            DomainKind::Linear => build_linear_quad(self.grid, region, self.axes),
            DomainKind::Curved => self.build_curved(region),
        }
    }

    /// Curved mesh for any region, with surgery applied.
    #[must_use]
    pub fn build_curved(&self, region: Region) -> Mesh {
        let mut mesh = build_curved_mesh(self.grid, region, self.axes, self.curvature_step);
        if has_missing(&mesh) {
            mesh = remove_missing(&mesh);
        }
        if self.adjust_seam {
            if let Some(seam) = self.grid.seam() {
                mesh = adjust_seam(&mesh, seam);
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Affine2;
    use gridtex_core::grid::{Domain, Samples};
    use gridtex_core::mapping::{ChannelMapping, DisplayAxis, TableMap, ValueScale};
    use gridtex_core::{ColorTable, MercatorTransform, MeshTopology};
    use std::sync::Arc;

    fn grid(width: usize, height: usize) -> Grid {
        Grid::new(
            &[width, height],
            Domain::identity(),
            Samples::Float(vec![vec![0.0; width * height]]),
        )
        .unwrap()
    }

    fn mapping() -> DisplayMapping {
        let table = Arc::new(ColorTable::rgb("bw", &[[0.0; 3], [1.0; 3]]).unwrap());
        DisplayMapping::new(ChannelMapping::SingleTable(TableMap::new(
            0,
            ValueScale::default(),
            table,
        )))
    }

    #[test]
    fn test_curvature_step() {
        assert_eq!(curvature_step(10, 100, 100), 3);
        assert_eq!(curvature_step(10, 2000, 2000), 10);
        assert_eq!(curvature_step(10, 20, 20), 2);
        assert_eq!(curvature_step(1, 2000, 2000), 2);
    }

    #[test]
    fn test_lattice_indices() {
        assert_eq!(lattice_indices(21, 10), vec![0, 10, 20]);
        assert_eq!(lattice_indices(25, 10), vec![0, 10, 20, 24]);
        assert_eq!(lattice_indices(2, 10), vec![0, 1]);
        assert_eq!(lattice_indices(1, 10), vec![0, 0]);
    }

    #[test]
    fn test_linear_quad_corners() {
        let g = Grid::new(
            &[4, 2],
            Domain::Linear(Affine2::from_scale(Vec2::new(2.0, 1.0))),
            Samples::Float(vec![vec![0.0; 8]]),
        )
        .unwrap()
        .with_elevation(3.0);
        let mesh = build_linear_quad(&g, Region::new(0, 0, 4, 2), [0, 1]);
        assert_eq!(mesh.topology(), &MeshTopology::Quad);
        let v = mesh.vertices();
        assert_eq!(v[0].position(), Vec3::new(-1.0, -0.5, 3.0));
        assert_eq!(v[1].position(), Vec3::new(-1.0, 1.5, 3.0));
        assert_eq!(v[2].position(), Vec3::new(7.0, 1.5, 3.0));
        assert_eq!(v[3].position(), Vec3::new(7.0, -0.5, 3.0));
        assert_eq!(v[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(v[2].tex_coord, [1.0, 1.0]);
    }

    #[test]
    fn test_linear_quad_texture_ratio() {
        let g = grid(300, 300);
        let mesh = build_linear_quad(&g, Region::new(149, 0, 151, 150), [0, 1]);
        let v = mesh.vertices();
        assert_eq!(v[0].position().x, 148.5);
        assert_eq!(v[2].tex_coord, [151.0 / 256.0, 150.0 / 256.0]);
    }

    #[test]
    fn test_curved_mesh_layout() {
        let g = grid(25, 3);
        let mesh = build_curved_mesh(&g, Region::new(0, 0, 25, 3), [0, 1], 10);
        // step = max(2, min(10, 28 / 64)) = 2
        let is = lattice_indices(25, 2);
        let js = lattice_indices(3, 2);
        assert_eq!(js, vec![0, 2]);
        assert_eq!(
            mesh.topology(),
            &MeshTopology::TriangleStrips(vec![2 * is.len(); js.len() - 1])
        );
        let v = mesh.vertices();
        assert_eq!(v[0].position(), Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(v[1].position(), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(v[0].tex_coord, [0.5 / 32.0, 0.5 / 4.0]);
        assert_eq!(v[1].tex_coord, [0.5 / 32.0, 2.5 / 4.0]);
        let last = v[v.len() - 1];
        assert_eq!(last.position(), Vec3::new(24.0, 2.0, 0.0));
        assert!(v.iter().all(|v| v.normal == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_curved_disabled() {
        let g = grid(4, 4).with_transform(Arc::new(MercatorTransform::default()));
        let options = RenderOptions::default().with_curvature_step(0);
        let err = MeshBuilder::new(&g, &mapping(), &options).unwrap_err();
        assert!(matches!(err, GridTexError::CurvedTexturesDisabled));
    }

    #[test]
    fn test_builder_routes_axes() {
        let g = grid(4, 4);
        let m = mapping().with_domain_axes([DisplayAxis::X, DisplayAxis::Z]);
        let builder = MeshBuilder::new(&g, &m, &RenderOptions::default()).unwrap();
        assert_eq!(builder.kind(), DomainKind::Linear);
        let mesh = builder.build(Region::new(0, 0, 4, 4));
        assert!(mesh.vertices().iter().all(|v| v.position[1] == 0.0));
        assert_eq!(mesh.vertices()[1].position[2], 3.5);
    }

    #[test]
    fn test_mercator_pole_is_excised() {
        // rows at latitude 0, 45, 90
        let g = Grid::new(
            &[3, 3],
            Domain::Linear(Affine2::from_scale(Vec2::new(10.0, 45.0))),
            Samples::Float(vec![vec![0.0; 9]]),
        )
        .unwrap()
        .with_transform(Arc::new(MercatorTransform::default()));
        let builder = MeshBuilder::new(&g, &mapping(), &RenderOptions::default()).unwrap();
        let mesh = builder.build(Region::new(0, 0, 3, 3));
        assert_eq!(mesh.topology(), &MeshTopology::Triangles);
        assert!(mesh.vertices().iter().all(TexturedVertex::is_finite));
        // lattice [0, 2] x [0, 2]: the single strip touches the pole row
        assert_eq!(mesh.triangle_count(), 0);
    }
}
