//! The orchestrator that turns a field into scene records.
//!
//! [`ImageRenderer::transform`] is called on every redraw. It plans tiles and
//! builds meshes only when the geometry key changes, recolors only frames
//! whose samples or mapping changed, and otherwise just rebinds the
//! textures of the requested animation frame.

use std::sync::Arc;

use gridtex_core::grid::DomainKind;
use gridtex_core::mapping::DisplayMapping;
use gridtex_core::{
    texture_extent, Field, Grid, GridTexError, Mosaic, RecordKind, Region, RenderOptions, Result,
    SceneSink, TextureBuffer,
};
use gridtex_render::{plan_stitches, MeshBuilder, TileBuildContext};
use rayon::prelude::*;

use crate::cache::{CacheEntry, FrameResult, GeometryKey, ImageNode, PixelKey, TileState};

/// What a call to [`ImageRenderer::transform`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOutcome {
    /// No field; the scene branch was marked empty.
    Empty,
    /// Tiles were planned, meshed and colored from scratch.
    Rebuilt,
    /// Geometry was reused and the selected frame was recolored.
    Refreshed,
    /// Cached textures were handed to the scene again without recoloring.
    Rebound,
    /// Nothing to do.
    Unchanged,
}

/// Renders one field into textured tiles, caching across redraws.
#[derive(Debug)]
pub struct ImageRenderer {
    options: RenderOptions,
    node: ImageNode,
}

impl ImageRenderer {
    pub fn new(options: RenderOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            node: ImageNode::new(),
        })
    }

    #[must_use]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Replaces the options. Changes take effect on the next transform.
    pub fn set_options(&mut self, options: RenderOptions) -> Result<()> {
        options.validate()?;
        self.options = options;
        Ok(())
    }

    /// The tile cache.
    #[must_use]
    pub fn node(&self) -> &ImageNode {
        &self.node
    }

    /// Brings the scene branch up to date with `field` at animation `frame`.
    ///
    /// `frame` wraps around the field's frame count. A missing field marks
    /// the branch empty. Configuration errors leave the cache and the sink
    /// untouched.
    pub fn transform(
        &mut self,
        field: Option<&Field>,
        mapping: &DisplayMapping,
        frame: usize,
        sink: &mut dyn SceneSink,
    ) -> Result<TransformOutcome> {
        let Some(field) = field else {
            self.node.clear();
            sink.mark_empty();
            return Ok(TransformOutcome::Empty);
        };
        for grid in field.frames() {
            mapping.validate(grid)?;
        }
        if let Field::Sequence(seq) = field {
            seq.check_domains()?;
        }
        let first = field.first();
        let builder = MeshBuilder::new(first, mapping, &self.options)?;
        let key = GeometryKey {
            width: first.width(),
            height: first.height(),
            frames: field.frame_count(),
            max_texture_dimension: self.options.max_texture_dimension,
            curvature_step: self.options.curvature_step,
            adjust_seam: self.options.adjust_projection_seam,
            domain: first.geometry_fingerprint(),
            kind: builder.kind(),
            axes: mapping.spatial_axes()?,
        };
        let frame = frame % field.frame_count();

        let reuse = self.options.reuse_geometry_across_frames
            && self.node.geometry_key() == Some(&key);
        if !reuse {
            self.rebuild(field, mapping, &builder, key, frame, sink)?;
            return Ok(TransformOutcome::Rebuilt);
        }

        let keys: Vec<PixelKey> = field
            .frames()
            .iter()
            .map(|grid| self.pixel_key(grid, mapping))
            .collect();
        let pending = self.node.mark_stale(|f| keys[f]);
        let refreshed = pending.contains(&frame);
        if refreshed {
            self.refresh(&field.frames()[frame], mapping, frame)?;
        }

        let ctx = TileBuildContext::new(&field.frames()[frame], mapping, &self.options)?;
        let (mode, alpha) = ctx.blending();
        let blending_changed = self.node.set_blending(mode, alpha);
        let rebound = self.node.bound_frame() != Some(frame);

        if blending_changed {
            sink.replace(self.node.records(frame));
        } else if refreshed || rebound {
            sink.update_textures(self.node.texture_updates(frame));
        }

        Ok(if refreshed {
            TransformOutcome::Refreshed
        } else if rebound || blending_changed {
            TransformOutcome::Rebound
        } else {
            TransformOutcome::Unchanged
        })
    }

    fn pixel_key(&self, grid: &Grid, mapping: &DisplayMapping) -> PixelKey {
        PixelKey {
            revision: grid.revision(),
            mapping: mapping.fingerprint(),
            format: mapping.pixel_format(self.options.missing_transparent),
            background: self.options.background,
        }
    }

    fn rebuild(
        &mut self,
        field: &Field,
        mapping: &DisplayMapping,
        builder: &MeshBuilder<'_>,
        key: GeometryKey,
        frame: usize,
        sink: &mut dyn SceneSink,
    ) -> Result<()> {
        let limit = self.options.max_texture_dimension;
        let mosaic = Mosaic::plan(key.width, key.height, limit);
        let max_texture = texture_extent(limit as usize);
        if let Some(t) = mosaic
            .tiles()
            .iter()
            .find(|t| texture_extent(t.width.max(t.height)) > max_texture)
        {
            return Err(GridTexError::TextureTooLarge {
                width: t.width,
                height: t.height,
                limit,
            });
        }

        let mut regions: Vec<(RecordKind, Region)> = mosaic
            .tiles()
            .iter()
            .map(|t| {
                let kind = RecordKind::Tile {
                    column: t.column,
                    row: t.row,
                };
                (kind, t.region())
            })
            .collect();
        if builder.kind() == DomainKind::Curved {
            regions.extend(
                plan_stitches(&mosaic)
                    .into_iter()
                    .enumerate()
                    .map(|(index, r)| (RecordKind::Stitch { index }, r)),
            );
        }

        let meshes: Vec<_> = if self.options.parallel {
            regions.par_iter().map(|(_, r)| builder.build(*r)).collect()
        } else {
            regions.iter().map(|(_, r)| builder.build(*r)).collect()
        };
        let entries: Vec<CacheEntry> = regions
            .iter()
            .zip(meshes)
            .map(|((kind, region), mesh)| CacheEntry::new(*kind, *region, mesh, key.frames))
            .collect();

        let results = self.color_frames(field, mapping, &regions)?;
        let ctx = TileBuildContext::new(&field.frames()[frame], mapping, &self.options)?;
        let (mode, alpha) = ctx.blending();

        log::info!(
            "built {} tiles and {} stitches for {}x{} grid with {} frames",
            mosaic.len(),
            regions.len() - mosaic.len(),
            key.width,
            key.height,
            key.frames
        );
        self.node.reset(key, entries);
        let epoch = self.node.epoch();
        self.node.commit_pixels(epoch, results);
        self.node.set_blending(mode, alpha);
        sink.replace(self.node.records(frame));
        Ok(())
    }

    /// Colors every region for every frame into new buffers.
    fn color_frames(
        &self,
        field: &Field,
        mapping: &DisplayMapping,
        regions: &[(RecordKind, Region)],
    ) -> Result<Vec<FrameResult>> {
        let color = |(frame, grid): (usize, &Grid)| -> Result<FrameResult> {
            let ctx = TileBuildContext::new(grid, mapping, &self.options)?;
            let textures = regions
                .iter()
                .map(|(_, region)| -> Result<Arc<TextureBuffer>> {
                    let mut texture = ctx.new_texture(*region);
                    ctx.fill_tile(*region, &mut texture)?;
                    Ok(Arc::new(texture))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(FrameResult {
                frame,
                key: self.pixel_key(grid, mapping),
                textures,
            })
        };
        if self.options.parallel {
            field.frames().par_iter().enumerate().map(color).collect()
        } else {
            field.frames().iter().enumerate().map(color).collect()
        }
    }

    /// Recolors one frame, reusing its buffers where format and size allow.
    fn refresh(&mut self, grid: &Grid, mapping: &DisplayMapping, frame: usize) -> Result<()> {
        let ctx = TileBuildContext::new(grid, mapping, &self.options)?;
        let background = self.options.background;
        let regions: Vec<Region> = self.node.entries().iter().map(|e| e.region).collect();
        let previous = self.node.take_textures(frame);
        let state = self.node.frame_state(frame);

        let refill = |(slot, region): (Option<Arc<TextureBuffer>>, &Region)| -> Result<Arc<TextureBuffer>> {
            let (w, h) = region.texture_size();
            let reusable = slot.filter(|t| {
                t.format() == ctx.format() && t.width() == w && t.height() == h
            });
            let texture = match reusable {
                Some(mut shared) => {
                    let buffer = Arc::make_mut(&mut shared);
                    buffer.clear(background);
                    ctx.fill_tile(*region, buffer)?;
                    shared
                }
                None => {
                    let mut buffer = ctx.new_texture(*region);
                    ctx.fill_tile(*region, &mut buffer)?;
                    Arc::new(buffer)
                }
            };
            Ok(texture)
        };
        let textures = if self.options.parallel {
            previous
                .into_par_iter()
                .zip(regions.par_iter())
                .map(refill)
                .collect::<Result<Vec<_>>>()?
        } else {
            previous
                .into_iter()
                .zip(regions.iter())
                .map(refill)
                .collect::<Result<Vec<_>>>()?
        };

        log::debug!(
            "recolored frame {frame} ({} buffers, was {state:?})",
            textures.len()
        );
        let epoch = self.node.epoch();
        self.node.commit_pixels(
            epoch,
            vec![FrameResult {
                frame,
                key: self.pixel_key(grid, mapping),
                textures,
            }],
        );
        debug_assert_eq!(self.node.frame_state(frame), TileState::PixelsFresh);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridtex_core::grid::{Domain, Samples};
    use gridtex_core::mapping::{ChannelMapping, TableMap, ValueScale};
    use gridtex_core::{ColorTable, GridSequence, SceneList};

    fn mapping() -> DisplayMapping {
        let table = Arc::new(ColorTable::rgb("bw", &[[0.0; 3], [1.0; 3]]).unwrap());
        DisplayMapping::new(ChannelMapping::SingleTable(TableMap::new(
            0,
            ValueScale::default(),
            table,
        )))
    }

    fn grid(value: f32) -> Grid {
        Grid::new(
            &[8, 8],
            Domain::identity(),
            Samples::Float(vec![vec![value; 64]]),
        )
        .unwrap()
    }

    #[test]
    fn test_unchanged_after_first_build() {
        let mut renderer = ImageRenderer::new(RenderOptions::default()).unwrap();
        let mut sink = SceneList::new();
        let field = Field::from(grid(0.0));
        let m = mapping();
        assert_eq!(
            renderer.transform(Some(&field), &m, 0, &mut sink).unwrap(),
            TransformOutcome::Rebuilt
        );
        assert_eq!(
            renderer.transform(Some(&field), &m, 0, &mut sink).unwrap(),
            TransformOutcome::Unchanged
        );
        assert_eq!(sink.replacements, 1);
    }

    #[test]
    fn test_frame_wraps() {
        let mut renderer = ImageRenderer::new(RenderOptions::default()).unwrap();
        let mut sink = SceneList::new();
        let field = Field::from(GridSequence::new(vec![grid(0.0), grid(1.0)]).unwrap());
        let m = mapping();
        renderer.transform(Some(&field), &m, 0, &mut sink).unwrap();
        assert_eq!(
            renderer.transform(Some(&field), &m, 3, &mut sink).unwrap(),
            TransformOutcome::Rebound
        );
        assert_eq!(renderer.node().bound_frame(), Some(1));
        assert_eq!(sink.records()[0].texture.pixel(0, 0), &[255]);
    }

    #[test]
    fn test_reuse_disabled_always_rebuilds() {
        let options = RenderOptions {
            reuse_geometry_across_frames: false,
            ..RenderOptions::default()
        };
        let mut renderer = ImageRenderer::new(options).unwrap();
        let mut sink = SceneList::new();
        let field = Field::from(grid(0.0));
        let m = mapping();
        renderer.transform(Some(&field), &m, 0, &mut sink).unwrap();
        assert_eq!(
            renderer.transform(Some(&field), &m, 0, &mut sink).unwrap(),
            TransformOutcome::Rebuilt
        );
        assert_eq!(renderer.node().stats().geometry_builds, 2);
    }
}
