//! gridtex: tiled texture rendering of large 2-D data grids.
//!
//! A grid, or an animated sequence of grids, is split into tiles that fit
//! the texture size limit. Each tile gets a mesh (a flat quad for linear
//! domains, a tessellated lattice for curved ones) and one texture per
//! animation frame. Meshes are kept across redraws while the geometry is
//! unchanged; textures are recolored only when samples or the mapping change.
//!
//! # Quick Start
//!
//! ```no_run
//! use gridtex::*;
//! use std::sync::Arc;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let grid = Grid::new(
//!         &[300, 300],
//!         Domain::identity(),
//!         Samples::Float(vec![vec![0.0; 300 * 300]]),
//!     )?;
//!     let table = Arc::new(ColorTable::rgb("bw", &[[0.0; 3], [1.0; 3]])?);
//!     let mapping = DisplayMapping::new(ChannelMapping::SingleTable(TableMap::new(
//!         0,
//!         ValueScale::new(0.0, 1.0),
//!         table,
//!     )));
//!
//!     let mut renderer = ImageRenderer::new(RenderOptions::default())?;
//!     let mut scene = SceneList::new();
//!     renderer.transform(Some(&Field::from(grid)), &mapping, 0, &mut scene)?;
//!     println!("{} records", scene.records().len());
//!     Ok(())
//! }
//! ```
//!
//! # Crates
//!
//! - `gridtex-core`: grids, color tables, mappings, tiling, meshes, options
//! - `gridtex-render`: the color mapper and mesh construction
//! - `gridtex`: the tile cache and the [`ImageRenderer`] orchestrator

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod cache;
pub mod renderer;

pub use cache::{CacheEntry, CacheStats, FrameResult, GeometryKey, ImageNode, PixelKey, TileState};
pub use renderer::{ImageRenderer, TransformOutcome};

// Re-export core types
pub use gridtex_core::{
    color_byte, resolve_alpha, table_index, texture_extent, Affine2, BlendMode, ChannelInfo,
    ChannelMap, ChannelMapping, ColorTable, ColorTableRegistry, CoordinateTransform, DisplayAxis,
    DisplayMapping, Domain, DomainKind, ErrorKind, Field, Grid, GridSequence, GridTexError,
    LinearSet, LongitudeWrap, MercatorTransform, Mesh, MeshTopology, Mosaic, PackedChannel,
    PixelFormat, RecordKind, Region, RenderOptions, Result, SampleRepresentation, Samples,
    SceneList, SceneRecord, SceneSink, Seam, SphericalTransform, TableMap, TextureBuffer,
    TextureUpdate, TexturedVertex, TileDescriptor, Unit, ValueScale, Vec2, Vec3,
};

// Re-export render types
pub use gridtex_render::{
    encode_png, save_texture, ColorPath, MeshBuilder, TextureExportError, TileBuildContext,
};

/// Installs `env_logger` as the global logger.
///
/// Safe to call more than once; later calls do nothing.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
