//! Mesh repairs for curved textures.

use gridtex_core::{Mesh, Seam, TexturedVertex};

/// True if any vertex has a non-finite position.
#[must_use]
pub fn has_missing(mesh: &Mesh) -> bool {
    !mesh.vertices().iter().all(TexturedVertex::is_finite)
}

/// Drops every triangle touching a non-finite vertex.
///
/// The result is always a plain triangle list.
#[must_use]
pub fn remove_missing(mesh: &Mesh) -> Mesh {
    let triangles = mesh.triangle_list();
    let total = triangles.len();
    let kept: Vec<TexturedVertex> = triangles
        .into_iter()
        .filter(|t| t.iter().all(TexturedVertex::is_finite))
        .flatten()
        .collect();
    let removed = total - kept.len() / 3;
    if removed > 0 {
        log::warn!("excised {removed} of {total} triangles with missing vertices");
    }
    Mesh::triangles(kept)
}

/// Splits triangles that wrap across a periodic seam.
///
/// A triangle spanning more than half a period along the seam axis is
/// replaced by two copies: one with its low vertices moved up a period and
/// one with its high vertices moved down. Meshes without such triangles are
/// returned unchanged.
#[must_use]
pub fn adjust_seam(mesh: &Mesh, seam: Seam) -> Mesh {
    let triangles = mesh.triangle_list();
    let half = seam.period / 2.0;
    let spans = |t: &[TexturedVertex; 3]| {
        let values = t.map(|v| v.position[seam.axis]);
        let lo = values.iter().copied().fold(f32::INFINITY, f32::min);
        let hi = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        (lo, hi)
    };
    let wrapping = triangles
        .iter()
        .filter(|t| {
            let (lo, hi) = spans(t);
            hi - lo > half
        })
        .count();
    if wrapping == 0 {
        return mesh.clone();
    }

    let mut out = Vec::with_capacity((triangles.len() + wrapping) * 3);
    for t in &triangles {
        let (lo, hi) = spans(t);
        if hi - lo <= half {
            out.extend_from_slice(t);
            continue;
        }
        let mid = (lo + hi) / 2.0;
        let shift = |t: &[TexturedVertex; 3], low: bool, delta: f32| {
            t.map(|mut v| {
                if (v.position[seam.axis] < mid) == low {
                    v.position[seam.axis] += delta;
                }
                v
            })
        };
        out.extend_from_slice(&shift(t, true, seam.period));
        out.extend_from_slice(&shift(t, false, -seam.period));
    }
    log::debug!("split {wrapping} triangles across the seam on axis {}", seam.axis);
    Mesh::triangles(out)
}
