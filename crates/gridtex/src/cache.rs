//! Per-renderer cache of tile meshes and texture buffers.
//!
//! An [`ImageNode`] owns one [`CacheEntry`] per tile and stitch strip. Each
//! entry keeps a single mesh and one texture per animation frame. The node
//! is versioned by an epoch that advances on every geometry rebuild; pixel
//! results computed against an older epoch are dropped on commit.

use std::sync::Arc;

use gridtex_core::grid::DomainKind;
use gridtex_core::{
    BlendMode, Mesh, PixelFormat, RecordKind, Region, SceneRecord, TextureBuffer, TextureUpdate,
};

/// Everything that determines tile layout and meshes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    pub width: usize,
    pub height: usize,
    pub frames: usize,
    pub max_texture_dimension: u32,
    pub curvature_step: u32,
    pub adjust_seam: bool,
    pub domain: u64,
    pub kind: DomainKind,
    pub axes: [usize; 2],
}

/// Everything that determines one frame's texture bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelKey {
    pub revision: u64,
    pub mapping: u64,
    pub format: PixelFormat,
    pub background: [u8; 4],
}

/// Lifecycle of one frame's textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    /// No geometry.
    Empty,
    /// Meshes exist, textures were never filled.
    GeometryBuilt,
    PixelsFresh,
    /// Textures were filled from an older grid or mapping.
    PixelsStale,
}

/// Work counters, for tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Full rebuilds of the tile layout and meshes.
    pub geometry_builds: usize,
    /// Frames whose textures were recomputed.
    pub pixel_refreshes: usize,
    /// Frame results dropped because their epoch was superseded.
    pub discarded_results: usize,
}

/// One tile or stitch strip.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub kind: RecordKind,
    pub region: Region,
    pub mesh: Arc<Mesh>,
    textures: Vec<Option<Arc<TextureBuffer>>>,
}

impl CacheEntry {
    pub fn new(kind: RecordKind, region: Region, mesh: Mesh, frames: usize) -> Self {
        Self {
            kind,
            region,
            mesh: Arc::new(mesh),
            textures: vec![None; frames],
        }
    }

    /// Texture of `frame`, if it was ever filled.
    #[must_use]
    pub fn texture(&self, frame: usize) -> Option<&Arc<TextureBuffer>> {
        self.textures.get(frame).and_then(Option::as_ref)
    }
}

/// Textures of one frame, one per entry in entry order.
#[derive(Debug, Clone)]
pub struct FrameResult {
    pub frame: usize,
    pub key: PixelKey,
    pub textures: Vec<Arc<TextureBuffer>>,
}

#[derive(Debug, Clone, Copy)]
struct FrameSlot {
    key: Option<PixelKey>,
    state: TileState,
}

/// Cached tiles of one rendered field.
#[derive(Debug, Default)]
pub struct ImageNode {
    key: Option<GeometryKey>,
    epoch: u64,
    entries: Vec<CacheEntry>,
    frames: Vec<FrameSlot>,
    bound: Option<usize>,
    blending: Option<(BlendMode, u32)>,
    stats: CacheStats,
}

impl ImageNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current geometry epoch.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    #[must_use]
    pub fn geometry_key(&self) -> Option<&GeometryKey> {
        self.key.as_ref()
    }

    #[must_use]
    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// State of `frame`; frames outside the cache are `Empty`.
    #[must_use]
    pub fn frame_state(&self, frame: usize) -> TileState {
        self.frames.get(frame).map_or(TileState::Empty, |s| s.state)
    }

    /// Frame whose textures were last handed to the scene.
    #[must_use]
    pub fn bound_frame(&self) -> Option<usize> {
        self.bound
    }

    /// Drops everything and advances the epoch.
    pub fn clear(&mut self) {
        self.key = None;
        self.entries.clear();
        self.frames.clear();
        self.bound = None;
        self.blending = None;
        self.epoch += 1;
    }

    /// Installs freshly built geometry; every frame awaits pixels.
    pub fn reset(&mut self, key: GeometryKey, entries: Vec<CacheEntry>) {
        let frames = key.frames;
        self.clear();
        self.key = Some(key);
        self.entries = entries;
        self.frames = vec![
            FrameSlot {
                key: None,
                state: TileState::GeometryBuilt,
            };
            frames
        ];
        self.stats.geometry_builds += 1;
    }

    /// Marks frames whose stored key differs from `key_of(frame)` as stale.
    ///
    /// Returns the frames that are not fresh.
    pub fn mark_stale(&mut self, key_of: impl Fn(usize) -> PixelKey) -> Vec<usize> {
        let mut pending = Vec::new();
        for (frame, slot) in self.frames.iter_mut().enumerate() {
            if slot.state == TileState::PixelsFresh && slot.key != Some(key_of(frame)) {
                slot.state = TileState::PixelsStale;
            }
            if slot.state != TileState::PixelsFresh {
                pending.push(frame);
            }
        }
        pending
    }

    /// Moves the textures of `frame` out of the cache for refilling.
    pub fn take_textures(&mut self, frame: usize) -> Vec<Option<Arc<TextureBuffer>>> {
        self.entries
            .iter_mut()
            .map(|e| e.textures.get_mut(frame).and_then(Option::take))
            .collect()
    }

    /// Stores frame results computed at `epoch`.
    ///
    /// Results from an older epoch are discarded. Returns how many frames
    /// were applied.
    pub fn commit_pixels(&mut self, epoch: u64, results: Vec<FrameResult>) -> usize {
        if epoch != self.epoch {
            log::debug!(
                "discarding {} frame results from epoch {epoch} (current {})",
                results.len(),
                self.epoch
            );
            self.stats.discarded_results += results.len();
            return 0;
        }
        let mut applied = 0;
        for result in results {
            let Some(slot) = self.frames.get_mut(result.frame) else {
                self.stats.discarded_results += 1;
                continue;
            };
            if result.textures.len() != self.entries.len() {
                self.stats.discarded_results += 1;
                continue;
            }
            for (entry, texture) in self.entries.iter_mut().zip(result.textures) {
                entry.textures[result.frame] = Some(texture);
            }
            *slot = FrameSlot {
                key: Some(result.key),
                state: TileState::PixelsFresh,
            };
            self.stats.pixel_refreshes += 1;
            applied += 1;
        }
        applied
    }

    /// Remembers compositing and returns true if it changed.
    pub fn set_blending(&mut self, mode: BlendMode, alpha: f32) -> bool {
        let next = Some((mode, alpha.to_bits()));
        let changed = self.blending != next;
        self.blending = next;
        changed
    }

    /// Scene records for `frame`, binding it.
    pub fn records(&mut self, frame: usize) -> Vec<SceneRecord> {
        let (blend_mode, alpha_bits) = self
            .blending
            .unwrap_or((BlendMode::Opaque, 1.0f32.to_bits()));
        self.bound = Some(frame);
        self.entries
            .iter()
            .filter_map(|e| {
                Some(SceneRecord {
                    kind: e.kind,
                    mesh: e.mesh.clone(),
                    texture: e.texture(frame)?.clone(),
                    blend_mode,
                    constant_alpha: f32::from_bits(alpha_bits),
                })
            })
            .collect()
    }

    /// Texture swaps that show `frame` on already delivered records, binding it.
    pub fn texture_updates(&mut self, frame: usize) -> Vec<TextureUpdate> {
        self.bound = Some(frame);
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(record, e)| {
                Some(TextureUpdate {
                    record,
                    texture: e.texture(frame)?.clone(),
                })
            })
            .collect()
    }

    /// Resets the work counters.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }
}
