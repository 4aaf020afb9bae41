//! Configuration options for texture rendering.

use serde::{Deserialize, Serialize};

use crate::error::{GridTexError, Result};

/// Smallest hardware texture dimension accepted.
pub const MIN_TEXTURE_DIMENSION: u32 = 64;

/// Options controlling tiling, tessellation and caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Hardware texture dimension limit (tiles never exceed this).
    pub max_texture_dimension: u32,

    /// Lattice spacing for curved textures, in grid cells.
    ///
    /// Zero disables curved tessellation; non-linear domains then fail.
    pub curvature_step: u32,

    /// Constant alpha applied to the whole texture.
    ///
    /// `None` uses the color table's constant alpha (or opaque). Ignored
    /// when the table carries per-entry alpha.
    pub constant_alpha: Option<f32>,

    /// Keep meshes and buffers alive across redraws with unchanged geometry.
    pub reuse_geometry_across_frames: bool,

    /// Split triangles that straddle a periodic seam (e.g. the date line).
    pub adjust_projection_seam: bool,

    /// Promote RGB textures to RGBA so missing samples are transparent.
    pub missing_transparent: bool,

    /// Bytes every texture buffer is seeded with before color mapping.
    pub background: [u8; 4],

    /// Spread tile and frame work over the rayon pool.
    pub parallel: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_texture_dimension: 2048,
            curvature_step: 10,
            constant_alpha: None,
            reuse_geometry_across_frames: true,
            adjust_projection_seam: true,
            missing_transparent: false,
            background: [0, 0, 0, 0],
            parallel: true,
        }
    }
}

impl RenderOptions {
    /// Checks every option against its allowed range.
    pub fn validate(&self) -> Result<()> {
        if self.max_texture_dimension < MIN_TEXTURE_DIMENSION {
            return Err(GridTexError::InvalidOption {
                name: "max_texture_dimension",
                reason: format!(
                    "{} is below the minimum of {MIN_TEXTURE_DIMENSION}",
                    self.max_texture_dimension
                ),
            });
        }
        if let Some(alpha) = self.constant_alpha {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(GridTexError::InvalidOption {
                    name: "constant_alpha",
                    reason: format!("{alpha} is outside [0, 1]"),
                });
            }
        }
        Ok(())
    }

    /// Parses options from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Serializes the options to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Sets the texture dimension limit.
    #[must_use]
    pub fn with_max_texture_dimension(mut self, limit: u32) -> Self {
        self.max_texture_dimension = limit;
        self
    }

    /// Sets the curvature step.
    #[must_use]
    pub fn with_curvature_step(mut self, step: u32) -> Self {
        self.curvature_step = step;
        self
    }

    /// Sets the constant alpha.
    #[must_use]
    pub fn with_constant_alpha(mut self, alpha: Option<f32>) -> Self {
        self.constant_alpha = alpha;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults_are_valid() {
        let opts = RenderOptions::default();
        assert!(opts.validate().is_ok());
        assert!(opts.reuse_geometry_across_frames);
        assert_eq!(opts.curvature_step, 10);
    }

    #[test]
    fn test_rejects_small_texture_limit() {
        let opts = RenderOptions::default().with_max_texture_dimension(32);
        let err = opts.validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_rejects_out_of_range_alpha() {
        let opts = RenderOptions::default().with_constant_alpha(Some(1.5));
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_json_partial_fields() {
        let opts = RenderOptions::from_json_str(
            r#"{ "max_texture_dimension": 256, "curvature_step": 0 }"#,
        )
        .unwrap();
        assert_eq!(opts.max_texture_dimension, 256);
        assert_eq!(opts.curvature_step, 0);
        assert!(opts.adjust_projection_seam);

        let json = opts.to_json_string().unwrap();
        let back = RenderOptions::from_json_str(&json).unwrap();
        assert_eq!(back, opts);
    }

    #[test]
    fn test_json_validation_applies() {
        let err = RenderOptions::from_json_str(r#"{ "max_texture_dimension": 8 }"#).unwrap_err();
        assert!(matches!(err, GridTexError::InvalidOption { .. }));
    }
}
