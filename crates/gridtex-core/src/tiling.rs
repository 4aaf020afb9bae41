//! Splitting grids into texture-sized tiles.
//!
//! Each axis is cut independently into spans no longer than the texture
//! limit. Every span after the first starts one sample before its boundary,
//! so neighboring tiles share a row or column and linear filtering has a
//! continuous source across the edge.

/// A rectangle of grid samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x_start: usize,
    pub y_start: usize,
    pub width: usize,
    pub height: usize,
}

impl Region {
    pub fn new(x_start: usize, y_start: usize, width: usize, height: usize) -> Self {
        Self {
            x_start,
            y_start,
            width,
            height,
        }
    }

    /// Power-of-two texture size holding this region.
    #[must_use]
    pub fn texture_size(&self) -> (usize, usize) {
        (texture_extent(self.width), texture_extent(self.height))
    }
}

/// One rectangular tile in grid-sample coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileDescriptor {
    pub x_start: usize,
    pub y_start: usize,
    pub width: usize,
    pub height: usize,
    /// Columns shared with the left neighbor.
    pub overlap_x: usize,
    /// Rows shared with the upper neighbor.
    pub overlap_y: usize,
    pub column: usize,
    pub row: usize,
}

impl TileDescriptor {
    /// First column not shared with the left neighbor.
    #[must_use]
    pub fn core_x_start(&self) -> usize {
        self.x_start + self.overlap_x
    }

    /// First row not shared with the upper neighbor.
    #[must_use]
    pub fn core_y_start(&self) -> usize {
        self.y_start + self.overlap_y
    }

    /// Samples covered by this tile, overlap included.
    #[must_use]
    pub fn region(&self) -> Region {
        Region::new(self.x_start, self.y_start, self.width, self.height)
    }

    /// Power-of-two texture size holding this tile.
    #[must_use]
    pub fn texture_size(&self) -> (usize, usize) {
        self.region().texture_size()
    }
}

/// Smallest power of two `>= n` (1 for 0).
#[must_use]
pub fn texture_extent(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    len: usize,
    overlap: usize,
}

fn split_axis(len: usize, limit: usize) -> Vec<Span> {
    if len <= limit {
        return vec![Span {
            start: 0,
            len,
            overlap: 0,
        }];
    }
    let mut n = len.div_ceil(limit);
    while len.div_ceil(n) + 1 > limit {
        n += 1;
    }
    let boundary = |k: usize| (k * len + n / 2) / n;
    (0..n)
        .map(|k| {
            let overlap = usize::from(k > 0);
            let start = boundary(k) - overlap;
            Span {
                start,
                len: boundary(k + 1) - start,
                overlap,
            }
        })
        .collect()
}

/// Tile layout of a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mosaic {
    pub width: usize,
    pub height: usize,
    /// Largest tile dimension in samples.
    pub limit: usize,
    pub columns: usize,
    pub rows: usize,
    tiles: Vec<TileDescriptor>,
}

impl Mosaic {
    /// Plans tiles covering a `width x height` grid, in row-major order.
    ///
    /// Tile dimensions never exceed `limit`, so padded textures never exceed
    /// `texture_extent(limit)`. An axis no longer than `limit` is one span
    /// without overlap.
    #[must_use]
    pub fn plan(width: usize, height: usize, limit: u32) -> Self {
        let limit = limit.max(2) as usize;
        let xs = split_axis(width, limit);
        let ys = split_axis(height, limit);
        let mut tiles = Vec::with_capacity(xs.len() * ys.len());
        for (row, y) in ys.iter().enumerate() {
            for (column, x) in xs.iter().enumerate() {
                tiles.push(TileDescriptor {
                    x_start: x.start,
                    y_start: y.start,
                    width: x.len,
                    height: y.len,
                    overlap_x: x.overlap,
                    overlap_y: y.overlap,
                    column,
                    row,
                });
            }
        }
        log::debug!(
            "planned {}x{} tiles for {width}x{height} grid (limit {limit})",
            xs.len(),
            ys.len()
        );
        Self {
            width,
            height,
            limit,
            columns: xs.len(),
            rows: ys.len(),
            tiles,
        }
    }

    #[must_use]
    pub fn tiles(&self) -> &[TileDescriptor] {
        &self.tiles
    }

    #[must_use]
    pub fn tile(&self, column: usize, row: usize) -> &TileDescriptor {
        &self.tiles[row * self.columns + column]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Sample columns where a tile core begins, excluding column 0.
    #[must_use]
    pub fn column_boundaries(&self) -> Vec<usize> {
        (1..self.columns)
            .map(|c| self.tile(c, 0).core_x_start())
            .collect()
    }

    /// Sample rows where a tile core begins, excluding row 0.
    #[must_use]
    pub fn row_boundaries(&self) -> Vec<usize> {
        (1..self.rows).map(|r| self.tile(0, r).core_y_start()).collect()
    }
}
