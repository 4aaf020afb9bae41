//! Color lookup tables.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::error::{GridTexError, Result};

/// An ordered table of RGB or RGBA entries with components in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    /// Table name.
    pub name: String,
    entries: Vec<[f32; 4]>,
    has_alpha: bool,
}

impl ColorTable {
    /// Creates an opaque RGB table.
    pub fn rgb(name: impl Into<String>, entries: &[[f32; 3]]) -> Result<Self> {
        let entries = entries.iter().map(|&[r, g, b]| [r, g, b, 1.0]).collect();
        Self::build(name.into(), entries, false)
    }

    /// Creates an RGBA table.
    pub fn rgba(name: impl Into<String>, entries: &[[f32; 4]]) -> Result<Self> {
        Self::build(name.into(), entries.to_vec(), true)
    }

    fn build(name: String, entries: Vec<[f32; 4]>, has_alpha: bool) -> Result<Self> {
        if entries.is_empty() {
            return Err(GridTexError::InvalidColorTable(format!(
                "table '{name}' has no entries"
            )));
        }
        if let Some(i) = entries
            .iter()
            .position(|e| e.iter().any(|c| !(0.0..=1.0).contains(c)))
        {
            return Err(GridTexError::InvalidColorTable(format!(
                "table '{name}' entry {i} has a component outside [0, 1]"
            )));
        }
        Ok(Self {
            name,
            entries,
            has_alpha,
        })
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry `index` as RGBA. RGB tables report alpha 1.
    #[must_use]
    pub fn entry(&self, index: usize) -> [f32; 4] {
        self.entries[index]
    }

    /// Whether the table was built with an alpha component.
    #[must_use]
    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// True if every entry has equal red, green and blue.
    #[must_use]
    pub fn is_grey(&self) -> bool {
        self.entries.iter().all(|e| e[0] == e[1] && e[1] == e[2])
    }

    /// The alpha shared by every entry, if the table has alpha and it is constant.
    #[must_use]
    pub fn constant_alpha(&self) -> Option<f32> {
        if !self.has_alpha {
            return None;
        }
        let first = self.entries[0][3];
        self.entries
            .iter()
            .all(|e| e[3] == first)
            .then_some(first)
    }

    /// True if entries carry differing alpha values.
    #[must_use]
    pub fn has_per_entry_alpha(&self) -> bool {
        self.has_alpha && self.constant_alpha().is_none()
    }

    /// Hash of the table contents. Equal tables give equal fingerprints.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.has_alpha.hash(&mut hasher);
        for e in &self.entries {
            for c in e {
                c.to_bits().hash(&mut hasher);
            }
        }
        hasher.finish()
    }

    /// Entry selected by a value already scaled to `[0, 1]`.
    ///
    /// Returns `None` for NaN.
    #[must_use]
    pub fn lookup(&self, scaled: f32) -> Option<[f32; 4]> {
        if scaled.is_nan() {
            return None;
        }
        Some(self.entries[table_index(scaled, self.len())])
    }
}

/// Table index for a scaled value: `floor(len * scaled)` clamped to `[0, len - 1]`.
#[must_use]
pub fn table_index(scaled: f32, len: usize) -> usize {
    let index = (len as f32 * scaled) as i64;
    index.clamp(0, len as i64 - 1) as usize
}

/// Converts a `[0, 1]` component to a byte, clamping out-of-range values.
#[must_use]
pub fn color_byte(component: f32) -> u8 {
    ((255.0 * component) as i32).clamp(0, 255) as u8
}

/// Named color tables.
#[derive(Default)]
pub struct ColorTableRegistry {
    tables: HashMap<String, ColorTable>,
}

impl ColorTableRegistry {
    /// Creates a registry holding the default presets.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    fn register_defaults(&mut self) {
        let greyscale: Vec<[f32; 3]> = (0..256)
            .map(|i| {
                let v = i as f32 / 255.0;
                [v, v, v]
            })
            .collect();
        self.insert_preset("greyscale", &greyscale);

        self.insert_preset(
            "viridis",
            &[
                [0.267, 0.004, 0.329],
                [0.282, 0.140, 0.457],
                [0.253, 0.265, 0.529],
                [0.206, 0.371, 0.553],
                [0.163, 0.471, 0.558],
                [0.127, 0.566, 0.550],
                [0.134, 0.658, 0.517],
                [0.266, 0.749, 0.440],
                [0.477, 0.821, 0.318],
                [0.741, 0.873, 0.150],
                [0.993, 0.906, 0.144],
            ],
        );

        self.insert_preset(
            "rainbow",
            &[
                [0.5, 0.0, 1.0],
                [0.0, 0.0, 1.0],
                [0.0, 1.0, 1.0],
                [0.0, 1.0, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 0.0, 0.0],
            ],
        );
    }

    fn insert_preset(&mut self, name: &str, entries: &[[f32; 3]]) {
        match ColorTable::rgb(name, entries) {
            Ok(table) => self.register(table),
            Err(e) => log::warn!("skipping preset {name}: {e}"),
        }
    }

    /// Registers a table under its name, replacing any existing one.
    pub fn register(&mut self, table: ColorTable) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Gets a table by name.
    pub fn get(&self, name: &str) -> Option<&ColorTable> {
        self.tables.get(name)
    }

    /// Returns all table names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}
