//! Strips bridging neighboring tiles of a curved texture.
//!
//! Each internal tile boundary gets a four-sample-wide strip straddling it,
//! one per tile along the boundary. Strips are meshed and colored against
//! the full grid, like any other region.

use gridtex_core::{Mosaic, Region};

/// Samples on each side of a boundary covered by a stitch strip.
pub const STITCH_HALF_WIDTH: usize = 2;

/// Regions of all stitch strips for a tile layout.
///
/// Vertical boundaries come first, top to bottom within each boundary,
/// then horizontal ones, left to right.
#[must_use]
pub fn plan_stitches(mosaic: &Mosaic) -> Vec<Region> {
    let straddle = |boundary: usize, len: usize| {
        let start = boundary.saturating_sub(STITCH_HALF_WIDTH);
        let end = (boundary + STITCH_HALF_WIDTH).min(len);
        (start, end - start)
    };

    let mut out = Vec::new();
    for b in mosaic.column_boundaries() {
        let (x, w) = straddle(b, mosaic.width);
        for row in 0..mosaic.rows {
            let t = mosaic.tile(0, row);
            out.push(Region::new(x, t.y_start, w, t.height));
        }
    }
    for b in mosaic.row_boundaries() {
        let (y, h) = straddle(b, mosaic.height);
        for column in 0..mosaic.columns {
            let t = mosaic.tile(column, 0);
            out.push(Region::new(t.x_start, y, t.width, h));
        }
    }
    out
}
