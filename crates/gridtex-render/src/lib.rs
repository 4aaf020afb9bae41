//! Texture synthesis for gridtex.
//!
//! This crate turns grids into textured tiles:
//! - Color mapping of samples into texture bytes ([`TileBuildContext`])
//! - Flat quad and curved lattice meshes ([`MeshBuilder`])
//! - Missing-vertex and seam surgery on curved meshes
//! - Stitch strips between neighboring tiles
//! - PNG export of texture buffers

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
// Texel math crosses between usize and f32
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::many_single_char_names)]

pub mod color_mapper;
pub mod export;
pub mod stitch;
pub mod surgery;
pub mod texture_builder;

pub use color_mapper::{ColorPath, TileBuildContext};
pub use export::{encode_png, save_texture, TextureExportError};
pub use stitch::{plan_stitches, STITCH_HALF_WIDTH};
pub use surgery::{adjust_seam, has_missing, remove_missing};
pub use texture_builder::{
    build_curved_mesh, build_linear_quad, curvature_step, lattice_indices, MeshBuilder,
};
