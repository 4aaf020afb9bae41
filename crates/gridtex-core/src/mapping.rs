//! Mapping of grid channels to colors and of domain axes to display axes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::color_table::ColorTable;
use crate::error::{GridTexError, Result};
use crate::grid::Grid;

/// Linear transform of data values onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    pub min: f32,
    pub max: f32,
}

impl ValueScale {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Scales `value` so `min` maps to 0 and `max` to 1.
    ///
    /// A degenerate range maps every value to 0.
    #[must_use]
    pub fn apply(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span == 0.0 {
            return value * 0.0;
        }
        (value - self.min) / span
    }

    fn hash_into(&self, hasher: &mut DefaultHasher) {
        self.min.to_bits().hash(hasher);
        self.max.to_bits().hash(hasher);
    }
}

impl Default for ValueScale {
    fn default() -> Self {
        Self::new(0.0, 1.0)
    }
}

/// One channel colored through a lookup table.
#[derive(Debug, Clone)]
pub struct TableMap {
    pub channel: usize,
    pub scale: ValueScale,
    pub table: Arc<ColorTable>,
}

impl TableMap {
    pub fn new(channel: usize, scale: ValueScale, table: Arc<ColorTable>) -> Self {
        Self {
            channel,
            scale,
            table,
        }
    }
}

/// One channel driving one color component directly.
#[derive(Debug, Clone)]
pub struct ChannelMap {
    pub channel: usize,
    pub scale: ValueScale,
    /// Optional table; component `i` of its entries is used for output component `i`.
    pub table: Option<Arc<ColorTable>>,
}

impl ChannelMap {
    pub fn new(channel: usize, scale: ValueScale) -> Self {
        Self {
            channel,
            scale,
            table: None,
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: Arc<ColorTable>) -> Self {
        self.table = Some(table);
        self
    }
}

/// How grid channels become colors.
#[derive(Debug, Clone)]
pub enum ChannelMapping {
    SingleTable(TableMap),
    Rgb([ChannelMap; 3]),
    Rgba([ChannelMap; 4]),
}

/// Destination of one domain axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayAxis {
    X,
    Y,
    Z,
    Animation,
    Other,
}

impl DisplayAxis {
    /// Index of a spatial axis, `None` otherwise.
    #[must_use]
    pub fn spatial_index(self) -> Option<usize> {
        match self {
            Self::X => Some(0),
            Self::Y => Some(1),
            Self::Z => Some(2),
            Self::Animation | Self::Other => None,
        }
    }
}

/// Byte layout of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Grey,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Bytes per pixel.
    #[must_use]
    pub fn channels(self) -> usize {
        match self {
            Self::Grey => 1,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Full display mapping of a grid.
#[derive(Debug, Clone)]
pub struct DisplayMapping {
    pub domain_axes: [DisplayAxis; 2],
    pub range: ChannelMapping,
}

impl DisplayMapping {
    /// Domain on x/y with the given channel mapping.
    pub fn new(range: ChannelMapping) -> Self {
        Self {
            domain_axes: [DisplayAxis::X, DisplayAxis::Y],
            range,
        }
    }

    #[must_use]
    pub fn with_domain_axes(mut self, axes: [DisplayAxis; 2]) -> Self {
        self.domain_axes = axes;
        self
    }

    /// Resolves the domain axes to spatial display indices.
    pub fn spatial_axes(&self) -> Result<[usize; 2]> {
        let mut out = [0; 2];
        for (axis, target) in self.domain_axes.iter().enumerate() {
            out[axis] = target
                .spatial_index()
                .ok_or_else(|| GridTexError::NonSpatialDomainAxis {
                    axis,
                    target: format!("{target:?}"),
                })?;
        }
        if out[0] == out[1] {
            return Err(GridTexError::DuplicateDomainAxis(format!(
                "{:?}",
                self.domain_axes[0]
            )));
        }
        Ok(out)
    }

    /// Checks the mapping against a grid's channels.
    pub fn validate(&self, grid: &Grid) -> Result<()> {
        self.spatial_axes()?;
        let available = grid.channel_count();
        let check = |channel: usize| {
            if channel < available {
                Ok(())
            } else {
                Err(GridTexError::ChannelOutOfRange { channel, available })
            }
        };
        match &self.range {
            ChannelMapping::SingleTable(map) => check(map.channel)?,
            ChannelMapping::Rgb(maps) => {
                if available != 3 {
                    return Err(GridTexError::InconsistentMapping(format!(
                        "RGB mapping needs 3 channels, grid has {available}"
                    )));
                }
                check_distinct(maps.iter().map(|m| m.channel))?;
                for m in maps {
                    check(m.channel)?;
                }
            }
            ChannelMapping::Rgba(maps) => {
                if available != 4 {
                    return Err(GridTexError::InconsistentMapping(format!(
                        "RGBA mapping needs 4 channels, grid has {available}"
                    )));
                }
                check_distinct(maps.iter().map(|m| m.channel))?;
                for m in maps {
                    check(m.channel)?;
                }
            }
        }
        Ok(())
    }

    /// Texture byte layout for this mapping.
    #[must_use]
    pub fn pixel_format(&self, missing_transparent: bool) -> PixelFormat {
        match &self.range {
            ChannelMapping::SingleTable(map) => {
                if map.table.has_per_entry_alpha() || missing_transparent {
                    PixelFormat::Rgba
                } else if map.table.is_grey() {
                    PixelFormat::Grey
                } else {
                    PixelFormat::Rgb
                }
            }
            ChannelMapping::Rgb(_) if missing_transparent => PixelFormat::Rgba,
            ChannelMapping::Rgb(_) => PixelFormat::Rgb,
            ChannelMapping::Rgba(_) => PixelFormat::Rgba,
        }
    }

    /// Hash of everything that affects pixel values.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.domain_axes.hash(&mut hasher);
        match &self.range {
            ChannelMapping::SingleTable(map) => {
                0u8.hash(&mut hasher);
                map.channel.hash(&mut hasher);
                map.scale.hash_into(&mut hasher);
                map.table.fingerprint().hash(&mut hasher);
            }
            ChannelMapping::Rgb(maps) => {
                1u8.hash(&mut hasher);
                hash_channel_maps(maps, &mut hasher);
            }
            ChannelMapping::Rgba(maps) => {
                2u8.hash(&mut hasher);
                hash_channel_maps(maps, &mut hasher);
            }
        }
        hasher.finish()
    }
}

/// Alpha applied to a table-mapped texture without per-entry alpha.
///
/// The option wins, then the table's own constant alpha, then opaque.
#[must_use]
pub fn resolve_alpha(table: &ColorTable, constant_alpha: Option<f32>) -> f32 {
    constant_alpha
        .or_else(|| table.constant_alpha())
        .unwrap_or(1.0)
}

fn check_distinct(channels: impl Iterator<Item = usize>) -> Result<()> {
    let mut seen = Vec::new();
    for c in channels {
        if seen.contains(&c) {
            return Err(GridTexError::InconsistentMapping(format!(
                "channel {c} mapped to more than one color component"
            )));
        }
        seen.push(c);
    }
    Ok(())
}

fn hash_channel_maps(maps: &[ChannelMap], hasher: &mut DefaultHasher) {
    for m in maps {
        m.channel.hash(hasher);
        m.scale.hash_into(hasher);
        m.table.as_ref().map(|t| t.fingerprint()).hash(hasher);
    }
}
