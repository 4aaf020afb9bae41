//! Core types for gridtex.
//!
//! This crate provides the data model and the pure parts of the pipeline:
//! - [`Grid`], [`GridSequence`] and [`Field`] for sampled 2-D fields
//! - [`ColorTable`] and [`DisplayMapping`] for turning samples into colors
//! - [`Mosaic`] for splitting grids into texture-sized tiles
//! - [`Mesh`], [`TextureBuffer`] and the [`SceneSink`] trait for output
//! - [`RenderOptions`] and the [`GridTexError`] type

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Options structs legitimately have many boolean flags
#![allow(clippy::struct_excessive_bools)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Sample counts and texel coordinates cross between usize and f32
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_wrap)]

pub mod color_table;
pub mod error;
pub mod grid;
pub mod mapping;
pub mod mesh;
pub mod options;
pub mod scene;
pub mod texture;
pub mod tiling;
pub mod transform;

pub use color_table::{color_byte, table_index, ColorTable, ColorTableRegistry};
pub use error::{ErrorKind, GridTexError, Result};
pub use grid::{
    ChannelInfo, Domain, DomainKind, Field, Grid, GridSequence, LinearSet, PackedChannel,
    SampleRepresentation, Samples, Unit,
};
pub use mapping::{
    resolve_alpha, ChannelMap, ChannelMapping, DisplayAxis, DisplayMapping, PixelFormat,
    TableMap, ValueScale,
};
pub use mesh::{Mesh, MeshTopology, TexturedVertex};
pub use options::RenderOptions;
pub use scene::{BlendMode, RecordKind, SceneList, SceneRecord, SceneSink, TextureUpdate};
pub use texture::TextureBuffer;
pub use tiling::{texture_extent, Mosaic, Region, TileDescriptor};
pub use transform::{
    CoordinateTransform, LongitudeWrap, MercatorTransform, Seam, SphericalTransform,
};

// Re-export glam types for convenience
pub use glam::{Affine2, Vec2, Vec3};
