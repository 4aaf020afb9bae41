//! Conversion of grid samples into texture bytes.
//!
//! A [`TileBuildContext`] is built once per frame. It picks a [`ColorPath`]
//! by looking at how the samples are stored and precomputes whatever that
//! path needs, then fills any number of tile regions from the same grid.
//!
//! Every path evaluates samples through the same per-value functions, so
//! the byte lookup table gives exactly the bytes the float path would.

use std::sync::Arc;

use gridtex_core::color_table::{color_byte, ColorTable};
use gridtex_core::grid::{Grid, PackedChannel, Samples};
use gridtex_core::mapping::{
    resolve_alpha, ChannelMap, ChannelMapping, DisplayMapping, PixelFormat, ValueScale,
};
use gridtex_core::{BlendMode, GridTexError, Region, RenderOptions, Result, TextureBuffer};
use rayon::prelude::*;

/// Minimum texels in a region before rows are colored in parallel.
const PARALLEL_THRESHOLD: usize = 4096;

/// How samples are turned into colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorPath {
    /// Stored bytes index a precomputed 256-entry color table.
    PackedByte,
    /// Samples are unpacked to floats and looked up in a color table.
    Float,
    /// Each channel is scaled straight into one color component.
    Direct,
}

/// A table-mapped channel.
#[derive(Debug, Clone)]
struct TableEval {
    scale: ValueScale,
    table: Arc<ColorTable>,
}

impl TableEval {
    fn evaluate(&self, value: f32) -> Option<[u8; 4]> {
        let e = self.table.lookup(self.scale.apply(value))?;
        Some([
            color_byte(e[0]),
            color_byte(e[1]),
            color_byte(e[2]),
            color_byte(e[3]),
        ])
    }
}

/// A channel driving one color component.
#[derive(Debug, Clone)]
struct ComponentEval {
    channel: usize,
    component: usize,
    scale: ValueScale,
    table: Option<Arc<ColorTable>>,
    lut: Option<Vec<Option<u8>>>,
}

impl ComponentEval {
    fn evaluate(&self, value: f32) -> Option<u8> {
        component_value(self.scale, self.table.as_deref(), self.component, value)
    }
}

/// Byte for one color component, or `None` for a missing sample.
fn component_value(
    scale: ValueScale,
    table: Option<&ColorTable>,
    component: usize,
    value: f32,
) -> Option<u8> {
    let scaled = scale.apply(value);
    match table {
        Some(table) => table.lookup(scaled).map(|e| color_byte(e[component])),
        None if scaled.is_nan() => None,
        None => Some(color_byte(scaled)),
    }
}

#[derive(Debug, Clone)]
enum Plan {
    Table {
        channel: usize,
        eval: TableEval,
        lut: Option<Vec<Option<[u8; 4]>>>,
    },
    Components {
        components: Vec<ComponentEval>,
        /// Write a full pixel with opaque alpha, or nothing if any component is missing.
        opaque_alpha: bool,
    },
}

/// Per-frame state for coloring tiles of one grid.
#[derive(Debug)]
pub struct TileBuildContext<'a> {
    grid: &'a Grid,
    format: PixelFormat,
    path: ColorPath,
    plan: Plan,
    background: [u8; 4],
    blend_mode: BlendMode,
    constant_alpha: f32,
    parallel: bool,
}

impl<'a> TileBuildContext<'a> {
    /// Validates `mapping` against `grid` and prepares the fastest path.
    pub fn new(grid: &'a Grid, mapping: &DisplayMapping, options: &RenderOptions) -> Result<Self> {
        mapping.validate(grid)?;
        let format = mapping.pixel_format(options.missing_transparent);
        let path = if packed_eligible(grid, &mapping.range) {
            ColorPath::PackedByte
        } else {
            fallback_path(&mapping.range)
        };
        let (blend_mode, constant_alpha) = blending(&mapping.range, format, options);
        let plan = build_plan(grid, &mapping.range, format, path);
        log::debug!(
            "color path {path:?} for {}x{} grid, format {format:?}",
            grid.width(),
            grid.height()
        );
        Ok(Self {
            grid,
            format,
            path,
            plan,
            background: options.background,
            blend_mode,
            constant_alpha,
            parallel: options.parallel,
        })
    }

    /// Forces a color path.
    ///
    /// `Float` and `Direct` both unpack samples and are interchangeable;
    /// `PackedByte` requires byte samples on a range set in the default unit.
    pub fn with_path(mut self, mapping: &DisplayMapping, path: ColorPath) -> Result<Self> {
        let path = match path {
            ColorPath::PackedByte if !packed_eligible(self.grid, &mapping.range) => {
                return Err(GridTexError::InvalidOption {
                    name: "color_path",
                    reason: "samples are not packed bytes on a linear range set".into(),
                });
            }
            ColorPath::PackedByte => ColorPath::PackedByte,
            ColorPath::Float | ColorPath::Direct => fallback_path(&mapping.range),
        };
        self.plan = build_plan(self.grid, &mapping.range, self.format, path);
        self.path = path;
        Ok(self)
    }

    #[must_use]
    pub fn path(&self) -> ColorPath {
        self.path
    }

    #[must_use]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        self.grid
    }

    /// Compositing for textures built by this context.
    #[must_use]
    pub fn blending(&self) -> (BlendMode, f32) {
        (self.blend_mode, self.constant_alpha)
    }

    /// Allocates a background-filled texture large enough for `region`.
    #[must_use]
    pub fn new_texture(&self, region: Region) -> TextureBuffer {
        let (w, h) = region.texture_size();
        TextureBuffer::new(w, h, self.format, self.background)
    }

    /// Writes the colors of `region` into the top-left of `texture`.
    ///
    /// Missing samples leave the existing bytes alone.
    pub fn fill_tile(&self, region: Region, texture: &mut TextureBuffer) -> Result<()> {
        if texture.format() != self.format
            || texture.width() < region.width
            || texture.height() < region.height
        {
            return Err(GridTexError::TextureMismatch {
                format: texture.format(),
                width: texture.width(),
                height: texture.height(),
                expected: self.format,
                region_width: region.width,
                region_height: region.height,
            });
        }
        let stride = texture.row_stride();
        let rows = texture.data_mut();
        if self.parallel && region.width * region.height >= PARALLEL_THRESHOLD {
            rows.par_chunks_exact_mut(stride)
                .take(region.height)
                .enumerate()
                .for_each(|(y, row)| self.fill_row(region, y, row));
        } else {
            for (y, row) in rows.chunks_exact_mut(stride).take(region.height).enumerate() {
                self.fill_row(region, y, row);
            }
        }
        Ok(())
    }

    fn fill_row(&self, region: Region, y: usize, row: &mut [u8]) {
        let c = self.format.channels();
        let base = (region.y_start + y) * self.grid.width() + region.x_start;
        let pixels = row.chunks_exact_mut(c).take(region.width);
        match &self.plan {
            Plan::Table { channel, eval, lut } => {
                let packed = packed_channel(self.grid, *channel);
                for (x, pixel) in pixels.enumerate() {
                    let index = base + x;
                    let color = match (lut, packed) {
                        (Some(lut), Some(p)) => lut_color(lut, p.bytes[index]),
                        _ => eval.evaluate(self.grid.value(*channel, index)),
                    };
                    if let Some(color) = color {
                        pixel.copy_from_slice(&color[..c]);
                    }
                }
            }
            Plan::Components {
                components,
                opaque_alpha,
            } => {
                for (x, pixel) in pixels.enumerate() {
                    let index = base + x;
                    if *opaque_alpha {
                        let mut out = [0, 0, 0, u8::MAX];
                        let mut complete = true;
                        for comp in components {
                            match self.component_byte(comp, index) {
                                Some(b) => out[comp.component] = b,
                                None => complete = false,
                            }
                        }
                        if complete {
                            pixel.copy_from_slice(&out[..c]);
                        }
                    } else {
                        for comp in components {
                            if let Some(b) = self.component_byte(comp, index) {
                                pixel[comp.component] = b;
                            }
                        }
                    }
                }
            }
        }
    }

    fn component_byte(&self, comp: &ComponentEval, index: usize) -> Option<u8> {
        match (&comp.lut, packed_channel(self.grid, comp.channel)) {
            (Some(lut), Some(p)) => lut_color(lut, p.bytes[index]),
            _ => comp.evaluate(self.grid.value(comp.channel, index)),
        }
    }
}

fn lut_color<T: Copy>(lut: &[Option<T>], byte: u8) -> Option<T> {
    if byte < PackedChannel::BIAS {
        return None;
    }
    lut[usize::from(byte - PackedChannel::BIAS)]
}

fn packed_channel(grid: &Grid, channel: usize) -> Option<&PackedChannel> {
    match grid.samples() {
        Samples::Packed(channels) => channels.get(channel),
        Samples::Float(_) => None,
    }
}

fn channel_packed_eligible(grid: &Grid, channel: usize) -> bool {
    let Some(p) = packed_channel(grid, channel) else {
        return false;
    };
    let default_unit = grid
        .channel_info(channel)
        .is_some_and(|info| !info.needs_conversion());
    p.range_set.is_some() && default_unit
}

fn packed_eligible(grid: &Grid, range: &ChannelMapping) -> bool {
    match range {
        ChannelMapping::SingleTable(map) => channel_packed_eligible(grid, map.channel),
        ChannelMapping::Rgb(maps) => maps.iter().all(|m| channel_packed_eligible(grid, m.channel)),
        ChannelMapping::Rgba(maps) => maps.iter().all(|m| channel_packed_eligible(grid, m.channel)),
    }
}

fn fallback_path(range: &ChannelMapping) -> ColorPath {
    match range {
        ChannelMapping::SingleTable(_) => ColorPath::Float,
        ChannelMapping::Rgb(_) | ChannelMapping::Rgba(_) => ColorPath::Direct,
    }
}

/// Byte lookup over every storable index: entry `i` colors byte `i + BIAS`.
fn byte_lut<T>(grid: &Grid, channel: usize, eval: impl Fn(f32) -> Option<T>) -> Option<Vec<Option<T>>> {
    let packed = packed_channel(grid, channel)?;
    let set = packed.range_set?;
    let entries = usize::from(u8::MAX - PackedChannel::BIAS) + 1;
    Some((0..entries).map(|i| eval(set.value(i))).collect())
}

fn build_plan(grid: &Grid, range: &ChannelMapping, format: PixelFormat, path: ColorPath) -> Plan {
    let use_lut = path == ColorPath::PackedByte;
    match range {
        ChannelMapping::SingleTable(map) => {
            let eval = TableEval {
                scale: map.scale,
                table: map.table.clone(),
            };
            let lut = if use_lut {
                byte_lut(grid, map.channel, |v| eval.evaluate(v))
            } else {
                None
            };
            Plan::Table {
                channel: map.channel,
                eval,
                lut,
            }
        }
        ChannelMapping::Rgb(maps) => Plan::Components {
            components: component_evals(grid, maps, use_lut),
            opaque_alpha: format == PixelFormat::Rgba,
        },
        ChannelMapping::Rgba(maps) => Plan::Components {
            components: component_evals(grid, maps, use_lut),
            opaque_alpha: false,
        },
    }
}

fn component_evals(grid: &Grid, maps: &[ChannelMap], use_lut: bool) -> Vec<ComponentEval> {
    maps.iter()
        .enumerate()
        .map(|(component, m)| {
            let lut = if use_lut {
                byte_lut(grid, m.channel, |v| {
                    component_value(m.scale, m.table.as_deref(), component, v)
                })
            } else {
                None
            };
            ComponentEval {
                channel: m.channel,
                component,
                scale: m.scale,
                table: m.table.clone(),
                lut,
            }
        })
        .collect()
}

fn blending(range: &ChannelMapping, format: PixelFormat, options: &RenderOptions) -> (BlendMode, f32) {
    let alpha = match range {
        ChannelMapping::SingleTable(map) => {
            if map.table.has_per_entry_alpha() {
                1.0
            } else {
                resolve_alpha(&map.table, options.constant_alpha)
            }
        }
        ChannelMapping::Rgb(_) => options.constant_alpha.unwrap_or(1.0),
        ChannelMapping::Rgba(_) => 1.0,
    };
    let mode = if alpha < 1.0 || format == PixelFormat::Rgba {
        BlendMode::Blended
    } else {
        BlendMode::Opaque
    };
    (mode, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtex_core::grid::{ChannelInfo, Domain, LinearSet, Unit};
    use gridtex_core::mapping::TableMap;
    use proptest::prelude::*;

    fn bw() -> Arc<ColorTable> {
        Arc::new(ColorTable::rgb("bw", &[[0.0; 3], [1.0; 3]]).unwrap())
    }

    fn single(table: Arc<ColorTable>, scale: ValueScale) -> DisplayMapping {
        DisplayMapping::new(ChannelMapping::SingleTable(TableMap::new(0, scale, table)))
    }

    fn float_grid(width: usize, height: usize, values: Vec<f32>) -> Grid {
        Grid::new(&[width, height], Domain::identity(), Samples::Float(vec![values])).unwrap()
    }

    fn fill(grid: &Grid, mapping: &DisplayMapping, options: &RenderOptions) -> TextureBuffer {
        let ctx = TileBuildContext::new(grid, mapping, options).unwrap();
        let region = Region::new(0, 0, grid.width(), grid.height());
        let mut tex = ctx.new_texture(region);
        ctx.fill_tile(region, &mut tex).unwrap();
        tex
    }

    #[test]
    fn test_grey_table_uses_one_byte() {
        let grid = float_grid(2, 1, vec![0.0, 1.0]);
        let tex = fill(&grid, &single(bw(), ValueScale::default()), &RenderOptions::default());
        assert_eq!(tex.format(), PixelFormat::Grey);
        assert_eq!(tex.pixel(0, 0), &[0]);
        assert_eq!(tex.pixel(1, 0), &[255]);
    }

    #[test]
    fn test_nan_keeps_background() {
        let grid = float_grid(3, 1, vec![1.0, f32::NAN, 1.0]);
        let options = RenderOptions {
            background: [42, 42, 42, 42],
            ..RenderOptions::default()
        };
        let table = Arc::new(ColorTable::rgb("rg", &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]).unwrap());
        let tex = fill(&grid, &single(table, ValueScale::default()), &options);
        assert_eq!(tex.pixel(0, 0), &[0, 255, 0]);
        assert_eq!(tex.pixel(1, 0), &[42, 42, 42]);
        // padding stays background too
        assert_eq!(tex.pixel(3, 0), &[42, 42, 42]);
    }

    #[test]
    fn test_region_offsets() {
        let values = (0..16).map(|v| v as f32 / 15.0).collect();
        let grid = float_grid(4, 4, values);
        let registry = gridtex_core::ColorTableRegistry::new();
        let greys = Arc::new(registry.get("greyscale").unwrap().clone());
        let mapping = single(greys.clone(), ValueScale::default());
        let ctx = TileBuildContext::new(&grid, &mapping, &RenderOptions::default()).unwrap();
        let region = Region::new(2, 1, 2, 3);
        let mut tex = ctx.new_texture(region);
        assert_eq!((tex.width(), tex.height()), (2, 4));
        ctx.fill_tile(region, &mut tex).unwrap();

        // texel (0, 0) holds sample (2, 1), texel (1, 2) sample (3, 3)
        let expect = |v: f32| color_byte(greys.lookup(v).unwrap()[0]);
        assert_eq!(tex.pixel(0, 0), &[expect(6.0 / 15.0)]);
        assert_eq!(tex.pixel(1, 2), &[expect(1.0)]);
        assert_eq!(tex.pixel(0, 3), &[0]);
    }

    #[test]
    fn test_direct_rgb_and_missing_transparent() {
        let grid = Grid::new(
            &[2, 1],
            Domain::identity(),
            Samples::Float(vec![vec![1.0, 1.0], vec![0.5, f32::NAN], vec![0.0, 0.0]]),
        )
        .unwrap();
        let maps = [0, 1, 2].map(|c| ChannelMap::new(c, ValueScale::default()));
        let mapping = DisplayMapping::new(ChannelMapping::Rgb(maps));

        let tex = fill(&grid, &mapping, &RenderOptions::default());
        assert_eq!(tex.format(), PixelFormat::Rgb);
        assert_eq!(tex.pixel(0, 0), &[255, 127, 0]);
        assert_eq!(tex.pixel(1, 0), &[255, 0, 0]);

        let options = RenderOptions {
            missing_transparent: true,
            ..RenderOptions::default()
        };
        let ctx = TileBuildContext::new(&grid, &mapping, &options).unwrap();
        assert_eq!(ctx.path(), ColorPath::Direct);
        assert_eq!(ctx.blending().0, BlendMode::Blended);
        let tex = fill(&grid, &mapping, &options);
        assert_eq!(tex.pixel(0, 0), &[255, 127, 0, 255]);
        assert_eq!(tex.pixel(1, 0), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_shared_table_rgb() {
        let table = Arc::new(
            ColorTable::rgb("ramp", &[[0.0, 0.2, 0.4], [1.0, 0.8, 0.6]]).unwrap(),
        );
        let grid = Grid::new(
            &[1, 1],
            Domain::identity(),
            Samples::Float(vec![vec![0.0], vec![1.0], vec![0.0]]),
        )
        .unwrap();
        let maps = [0, 1, 2].map(|c| ChannelMap::new(c, ValueScale::default()).with_table(table.clone()));
        let tex = fill(
            &grid,
            &DisplayMapping::new(ChannelMapping::Rgb(maps)),
            &RenderOptions::default(),
        );
        assert_eq!(tex.pixel(0, 0), &[0, 204, 102]);
    }

    #[test]
    fn test_alpha_precedence() {
        let grid = float_grid(1, 1, vec![0.0]);
        let faded = Arc::new(ColorTable::rgba("f", &[[1.0, 0.0, 0.0, 0.5]]).unwrap());
        let options = RenderOptions::default();
        let ctx = TileBuildContext::new(&grid, &single(faded.clone(), ValueScale::default()), &options)
            .unwrap();
        assert_eq!(ctx.blending(), (BlendMode::Blended, 0.5));

        let options = RenderOptions::default().with_constant_alpha(Some(0.8));
        let ctx = TileBuildContext::new(&grid, &single(faded, ValueScale::default()), &options)
            .unwrap();
        assert_eq!(ctx.blending(), (BlendMode::Blended, 0.8));

        let ramp = Arc::new(
            ColorTable::rgba("r", &[[1.0, 1.0, 1.0, 0.0], [1.0, 1.0, 1.0, 1.0]]).unwrap(),
        );
        let ctx = TileBuildContext::new(&grid, &single(ramp, ValueScale::default()), &options)
            .unwrap();
        assert_eq!(ctx.format(), PixelFormat::Rgba);
        assert_eq!(ctx.blending(), (BlendMode::Blended, 1.0));

        let ctx = TileBuildContext::new(&grid, &single(bw(), ValueScale::default()), &RenderOptions::default())
            .unwrap();
        assert_eq!(ctx.blending(), (BlendMode::Opaque, 1.0));
    }

    #[test]
    fn test_constant_alpha_table_takes_option() {
        let grid = float_grid(1, 1, vec![0.0]);
        let red = Arc::new(ColorTable::rgba("red", &[[1.0, 0.0, 0.0, 0.5]]).unwrap());
        let mapping = single(red, ValueScale::default());
        let options = RenderOptions::default().with_constant_alpha(Some(0.8));

        let ctx = TileBuildContext::new(&grid, &mapping, &options).unwrap();
        assert_eq!(ctx.format(), PixelFormat::Rgb);
        assert_eq!(ctx.blending(), (BlendMode::Blended, 0.8));
        assert_eq!(mapping.pixel_format(false), PixelFormat::Rgb);

        let tex = fill(&grid, &mapping, &options);
        assert_eq!(tex.pixel(0, 0), &[255, 0, 0]);
    }

    #[test]
    fn test_fill_rejects_mismatched_texture() {
        let grid = float_grid(4, 4, vec![0.5; 16]);
        let ctx = TileBuildContext::new(&grid, &single(bw(), ValueScale::default()), &RenderOptions::default())
            .unwrap();
        let region = Region::new(0, 0, 4, 4);

        let mut wrong_format = TextureBuffer::new(4, 4, PixelFormat::Rgba, [0; 4]);
        let err = ctx.fill_tile(region, &mut wrong_format).unwrap_err();
        assert!(matches!(
            err,
            GridTexError::TextureMismatch {
                format: PixelFormat::Rgba,
                expected: PixelFormat::Grey,
                ..
            }
        ));
        assert_eq!(err.kind(), gridtex_core::ErrorKind::Configuration);

        let mut too_small = TextureBuffer::new(2, 4, PixelFormat::Grey, [0; 4]);
        let err = ctx.fill_tile(region, &mut too_small).unwrap_err();
        assert!(matches!(
            err,
            GridTexError::TextureMismatch {
                width: 2,
                region_width: 4,
                ..
            }
        ));
        assert!(too_small.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_path_selection() {
        let set = LinearSet::new(0.0, 1.0, 255);
        let packed = Grid::new(
            &[2, 1],
            Domain::identity(),
            Samples::Packed(vec![PackedChannel::new(vec![1, 255], Some(set))]),
        )
        .unwrap();
        let mapping = single(bw(), ValueScale::default());
        let options = RenderOptions::default();
        let ctx = TileBuildContext::new(&packed, &mapping, &options).unwrap();
        assert_eq!(ctx.path(), ColorPath::PackedByte);

        let converted = packed
            .clone()
            .with_channel_info(
                0,
                ChannelInfo {
                    unit: Some(Unit::new("cm", 0.01, 0.0)),
                    default_unit: Some(Unit::base("m")),
                },
            )
            .unwrap();
        let ctx = TileBuildContext::new(&converted, &mapping, &options).unwrap();
        assert_eq!(ctx.path(), ColorPath::Float);
        assert!(ctx.with_path(&mapping, ColorPath::PackedByte).is_err());

        let raw = Grid::new(
            &[1, 1],
            Domain::identity(),
            Samples::Packed(vec![PackedChannel::new(vec![3], None)]),
        )
        .unwrap();
        let ctx = TileBuildContext::new(&raw, &mapping, &options).unwrap();
        assert_eq!(ctx.path(), ColorPath::Float);
    }

    #[test]
    fn test_invalid_mapping_is_rejected() {
        let grid = float_grid(1, 1, vec![0.0]);
        let mapping = DisplayMapping::new(ChannelMapping::SingleTable(TableMap::new(
            1,
            ValueScale::default(),
            bw(),
        )));
        assert!(TileBuildContext::new(&grid, &mapping, &RenderOptions::default()).is_err());
    }

    fn table_strategy() -> impl Strategy<Value = Vec<[f32; 4]>> {
        prop_oneof![Just(2usize), Just(256usize), Just(7usize)].prop_flat_map(|len| {
            proptest::collection::vec(
                (0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0, 0.0f32..=1.0)
                    .prop_map(|(r, g, b, a)| [r, g, b, a]),
                len,
            )
        })
    }

    proptest! {
        #[test]
        fn prop_byte_and_float_paths_agree(
            entries in table_strategy(),
            bytes in proptest::collection::vec(any::<u8>(), 64),
            first in -50.0f32..50.0,
            span in 0.1f32..100.0,
            set_len in 2usize..300,
            min in -60.0f32..0.0,
            range in 1.0f32..120.0,
        ) {
            let set = LinearSet::new(first, first + span, set_len);
            let grid = Grid::new(
                &[8, 8],
                Domain::identity(),
                Samples::Packed(vec![PackedChannel::new(bytes, Some(set))]),
            )
            .unwrap();
            let table = Arc::new(ColorTable::rgba("t", &entries).unwrap());
            let mapping = single(table, ValueScale::new(min, min + range));
            let options = RenderOptions::default();
            let region = Region::new(0, 0, 8, 8);

            let fast = TileBuildContext::new(&grid, &mapping, &options).unwrap();
            prop_assert_eq!(fast.path(), ColorPath::PackedByte);
            let mut fast_tex = fast.new_texture(region);
            fast.fill_tile(region, &mut fast_tex).unwrap();

            let slow = TileBuildContext::new(&grid, &mapping, &options)
                .unwrap()
                .with_path(&mapping, ColorPath::Float)
                .unwrap();
            prop_assert_eq!(slow.path(), ColorPath::Float);
            let mut slow_tex = slow.new_texture(region);
            slow.fill_tile(region, &mut slow_tex).unwrap();

            prop_assert_eq!(fast_tex, slow_tex);
        }

        #[test]
        fn prop_direct_paths_agree(
            channels in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 16), 3),
        ) {
            let set = LinearSet::new(0.0, 1.0, 255);
            let packed = channels
                .into_iter()
                .map(|b| PackedChannel::new(b, Some(set)))
                .collect();
            let grid = Grid::new(&[4, 4], Domain::identity(), Samples::Packed(packed)).unwrap();
            let maps = [0, 1, 2].map(|c| ChannelMap::new(c, ValueScale::default()));
            let mapping = DisplayMapping::new(ChannelMapping::Rgb(maps));
            let options = RenderOptions::default();
            let region = Region::new(0, 0, 4, 4);

            let fast = TileBuildContext::new(&grid, &mapping, &options).unwrap();
            let mut a = fast.new_texture(region);
            fast.fill_tile(region, &mut a).unwrap();

            let slow = TileBuildContext::new(&grid, &mapping, &options)
                .unwrap()
                .with_path(&mapping, ColorPath::Direct)
                .unwrap();
            let mut b = slow.new_texture(region);
            slow.fill_tile(region, &mut b).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
