//! Coordinate transforms from display space to scene space.
//!
//! A grid's domain points are first routed onto the display axes (see
//! [`DisplayAxis`](crate::mapping::DisplayAxis)); a transform then maps the
//! resulting point into the scene. Transforms may return non-finite
//! coordinates (e.g. Mercator at the poles); the texture builder cuts those
//! vertices out of the mesh.

use std::fmt;

use glam::Vec3;

/// A periodic discontinuity along one display axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seam {
    /// Display axis index (0 = x, 1 = y, 2 = z).
    pub axis: usize,
    /// Period of the wrap, in scene units.
    pub period: f32,
}

/// Maps display-space points into scene space.
pub trait CoordinateTransform: Send + Sync + fmt::Debug {
    /// Short name, used in log messages.
    fn name(&self) -> &str;

    /// Transforms one point.
    fn transform(&self, point: Vec3) -> Vec3;

    /// The periodic seam this transform introduces, if any.
    fn seam(&self) -> Option<Seam> {
        None
    }
}

/// Longitude/latitude in degrees onto a sphere.
///
/// `x` is longitude, `y` latitude and `z` is added to the radius.
#[derive(Debug, Clone, Copy)]
pub struct SphericalTransform {
    pub radius: f32,
}

impl Default for SphericalTransform {
    fn default() -> Self {
        Self { radius: 1.0 }
    }
}

impl CoordinateTransform for SphericalTransform {
    fn name(&self) -> &str {
        "spherical"
    }

    fn transform(&self, point: Vec3) -> Vec3 {
        let lon = point.x.to_radians();
        let lat = point.y.to_radians();
        let r = self.radius + point.z;
        Vec3::new(
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
        )
    }
}

/// Mercator projection of longitude/latitude degrees.
///
/// Latitudes of +-90 degrees have no finite image.
#[derive(Debug, Clone, Copy)]
pub struct MercatorTransform {
    pub radius: f32,
}

impl Default for MercatorTransform {
    fn default() -> Self {
        Self { radius: 1.0 }
    }
}

impl CoordinateTransform for MercatorTransform {
    fn name(&self) -> &str {
        "mercator"
    }

    fn transform(&self, point: Vec3) -> Vec3 {
        if point.y.abs() >= 90.0 {
            return Vec3::new(f32::NAN, f32::NAN, point.z);
        }
        let lon = point.x.to_radians();
        let lat = point.y.to_radians();
        let y = (std::f32::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
        Vec3::new(self.radius * lon, self.radius * y, point.z)
    }
}

/// Wraps longitude on one display axis into `[-180, 180)`.
#[derive(Debug, Clone, Copy)]
pub struct LongitudeWrap {
    pub axis: usize,
}

impl Default for LongitudeWrap {
    fn default() -> Self {
        Self { axis: 0 }
    }
}

impl CoordinateTransform for LongitudeWrap {
    fn name(&self) -> &str {
        "longitude-wrap"
    }

    fn transform(&self, point: Vec3) -> Vec3 {
        let mut out = point;
        let v = out[self.axis];
        if v.is_finite() {
            out[self.axis] = (v + 180.0).rem_euclid(360.0) - 180.0;
        }
        out
    }

    fn seam(&self) -> Option<Seam> {
        Some(Seam {
            axis: self.axis,
            period: 360.0,
        })
    }
}
