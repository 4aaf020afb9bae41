//! Error types for gridtex.

use thiserror::Error;

use crate::mapping::PixelFormat;

/// Broad classification of a [`GridTexError`].
///
/// Data errors (missing samples) and geometry degeneracies are absorbed
/// locally and never surface as errors, so they have no kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid mapping, domain or option values. Nothing was rendered.
    Configuration,
    /// A hardware limit could not be honored.
    Resource,
    /// Reading or writing options failed.
    Io,
}

/// The main error type for gridtex operations.
#[derive(Error, Debug)]
pub enum GridTexError {
    /// The grid domain does not have exactly two dimensions.
    #[error("texture domain dimension must be 2, got {0}")]
    NotTwoDimensional(usize),

    /// The grid has a zero-length axis.
    #[error("grid has an empty axis ({width}x{height})")]
    EmptyGrid { width: usize, height: usize },

    /// Sample or coordinate array length disagrees with the grid size.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// Frames of an animation sequence do not share dimensions.
    #[error("sequence frame {index} is {width}x{height}, expected {expected_width}x{expected_height}")]
    SequenceMismatch {
        index: usize,
        width: usize,
        height: usize,
        expected_width: usize,
        expected_height: usize,
    },

    /// An animation sequence with no frames.
    #[error("sequence has no frames")]
    EmptySequence,

    /// A sequence frame is placed differently from the first frame.
    #[error("sequence frame {index} has a different domain than frame 0")]
    SequenceDomainMismatch { index: usize },

    /// Channel mappings do not form a valid single-table, RGB or RGBA mapping.
    #[error("inconsistent channel mapping: {0}")]
    InconsistentMapping(String),

    /// A mapping refers to a channel the grid does not have.
    #[error("channel {channel} out of range, grid has {available} channels")]
    ChannelOutOfRange { channel: usize, available: usize },

    /// A domain axis is mapped to something other than a spatial display axis.
    #[error("domain must be only spatial: axis {axis} mapped to {target}")]
    NonSpatialDomainAxis { axis: usize, target: String },

    /// Both domain axes are mapped to the same display axis.
    #[error("domain axes mapped to the same display axis {0}")]
    DuplicateDomainAxis(String),

    /// The domain is not linear but curved textures are turned off.
    #[error("domain is not linear and curved textures are disabled (curvature_step = 0)")]
    CurvedTexturesDisabled,

    /// A color table with no entries or malformed components.
    #[error("invalid color table: {0}")]
    InvalidColorTable(String),

    /// An option value outside its allowed range.
    #[error("invalid option {name}: {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// A tile still exceeds the texture limit after tiling.
    #[error("tile {width}x{height} exceeds texture limit {limit}")]
    TextureTooLarge { width: usize, height: usize, limit: u32 },

    /// A texture cannot hold a region's colors.
    #[error("{format:?} texture {width}x{height} cannot hold {region_width}x{region_height} {expected:?} region")]
    TextureMismatch {
        format: PixelFormat,
        width: usize,
        height: usize,
        expected: PixelFormat,
        region_width: usize,
        region_height: usize,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl GridTexError {
    /// Returns the classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TextureTooLarge { .. } => ErrorKind::Resource,
            Self::IoError(_) | Self::JsonError(_) => ErrorKind::Io,
            _ => ErrorKind::Configuration,
        }
    }
}

/// A specialized Result type for gridtex operations.
pub type Result<T> = std::result::Result<T, GridTexError>;
