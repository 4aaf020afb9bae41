//! The interface to the scene graph that draws finished tiles.

use std::sync::Arc;

use crate::mesh::Mesh;
use crate::texture::TextureBuffer;

/// How a textured mesh is composited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    Blended,
}

/// What a scene record draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Tile { column: usize, row: usize },
    Stitch { index: usize },
}

/// One textured mesh handed to the scene graph.
#[derive(Debug, Clone)]
pub struct SceneRecord {
    pub kind: RecordKind,
    pub mesh: Arc<Mesh>,
    pub texture: Arc<TextureBuffer>,
    pub blend_mode: BlendMode,
    pub constant_alpha: f32,
}

/// A new texture for an already delivered record.
#[derive(Debug, Clone)]
pub struct TextureUpdate {
    /// Index into the last delivered record list.
    pub record: usize,
    pub texture: Arc<TextureBuffer>,
}

/// Consumer of rendered tiles.
pub trait SceneSink {
    /// Replaces every record of this branch.
    fn replace(&mut self, records: Vec<SceneRecord>);

    /// Swaps textures of existing records, keeping their meshes.
    fn update_textures(&mut self, updates: Vec<TextureUpdate>);

    /// The branch has nothing to draw.
    fn mark_empty(&mut self);
}

/// In-memory sink that keeps the current records.
#[derive(Debug, Default)]
pub struct SceneList {
    records: Vec<SceneRecord>,
    empty: bool,
    /// Calls to [`SceneSink::replace`].
    pub replacements: usize,
    /// Calls to [`SceneSink::update_textures`].
    pub texture_updates: usize,
}

impl SceneList {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> &[SceneRecord] {
        &self.records
    }

    /// True after [`SceneSink::mark_empty`] until the next replacement.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty
    }
}

impl SceneSink for SceneList {
    fn replace(&mut self, records: Vec<SceneRecord>) {
        self.records = records;
        self.empty = false;
        self.replacements += 1;
    }

    fn update_textures(&mut self, updates: Vec<TextureUpdate>) {
        for update in updates {
            if let Some(record) = self.records.get_mut(update.record) {
                record.texture = update.texture;
            } else {
                log::warn!("texture update for unknown record {}", update.record);
            }
        }
        self.texture_updates += 1;
    }

    fn mark_empty(&mut self) {
        self.records.clear();
        self.empty = true;
    }
}
