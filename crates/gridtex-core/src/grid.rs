//! Sampled two-dimensional fields and animation sequences.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use glam::{Affine2, Vec2, Vec3};

use crate::error::{GridTexError, Result};
use crate::transform::{CoordinateTransform, Seam};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// A physical unit with an affine conversion to its base unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub name: String,
    /// `base = value * scale + offset`.
    pub scale: f32,
    pub offset: f32,
}

impl Unit {
    /// Creates a unit with the given conversion to base.
    pub fn new(name: impl Into<String>, scale: f32, offset: f32) -> Self {
        Self {
            name: name.into(),
            scale,
            offset,
        }
    }

    /// Creates a base unit.
    pub fn base(name: impl Into<String>) -> Self {
        Self::new(name, 1.0, 0.0)
    }

    /// Converts `value` in this unit into `target`.
    #[must_use]
    pub fn convert(&self, value: f32, target: &Unit) -> f32 {
        let base = value * self.scale + self.offset;
        (base - target.offset) / target.scale
    }
}

/// Units of one channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelInfo {
    /// Unit the samples are stored in.
    pub unit: Option<Unit>,
    /// Unit the display scale expects.
    pub default_unit: Option<Unit>,
}

impl ChannelInfo {
    /// Whether samples must be converted before scaling.
    #[must_use]
    pub fn needs_conversion(&self) -> bool {
        matches!((&self.unit, &self.default_unit), (Some(u), Some(d)) if u != d)
    }

    /// Converts a stored value into the default unit.
    #[must_use]
    pub fn to_default(&self, value: f32) -> f32 {
        match (&self.unit, &self.default_unit) {
            (Some(u), Some(d)) if u != d => u.convert(value, d),
            _ => value,
        }
    }
}

/// An evenly spaced set of values, `first` to `last` inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearSet {
    pub first: f32,
    pub last: f32,
    pub length: usize,
}

impl LinearSet {
    pub fn new(first: f32, last: f32, length: usize) -> Self {
        Self {
            first,
            last,
            length,
        }
    }

    /// Value at `index`, NaN outside the set.
    #[must_use]
    pub fn value(&self, index: usize) -> f32 {
        if index >= self.length {
            return f32::NAN;
        }
        if self.length == 1 {
            return self.first;
        }
        let t = index as f32 / (self.length - 1) as f32;
        self.first + (self.last - self.first) * t
    }
}

/// Byte-packed samples of one channel.
///
/// Byte `0` marks a missing sample; byte `b >= 1` decodes as
/// `range_set.value(b - 1)`, or `b - 1` itself without a range set.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedChannel {
    pub bytes: Vec<u8>,
    pub range_set: Option<LinearSet>,
}

impl PackedChannel {
    /// Offset between a stored byte and its range-set index.
    pub const BIAS: u8 = 1;

    pub fn new(bytes: Vec<u8>, range_set: Option<LinearSet>) -> Self {
        Self { bytes, range_set }
    }

    /// Decodes one stored byte.
    #[must_use]
    pub fn decode(&self, byte: u8) -> f32 {
        if byte < Self::BIAS {
            return f32::NAN;
        }
        let index = byte - Self::BIAS;
        match &self.range_set {
            Some(set) => set.value(usize::from(index)),
            None => f32::from(index),
        }
    }
}

/// Physical storage of a grid's samples.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    Packed(Vec<PackedChannel>),
    Float(Vec<Vec<f32>>),
}

impl Samples {
    /// Number of channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        match self {
            Self::Packed(c) => c.len(),
            Self::Float(c) => c.len(),
        }
    }

    /// Internal representation of the samples.
    #[must_use]
    pub fn representation(&self) -> SampleRepresentation {
        match self {
            Self::Packed(_) => SampleRepresentation::PackedByte,
            Self::Float(_) => SampleRepresentation::Float,
        }
    }

    fn channel_len(&self, channel: usize) -> usize {
        match self {
            Self::Packed(c) => c[channel].bytes.len(),
            Self::Float(c) => c[channel].len(),
        }
    }
}

/// How sample values are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleRepresentation {
    PackedByte,
    Float,
}

/// Location of samples in the domain.
#[derive(Debug, Clone, PartialEq)]
pub enum Domain {
    /// Sample `(i, j)` sits at `affine * (i, j)`.
    Linear(Affine2),
    /// Explicit location per sample, row-major.
    Gridded(Vec<Vec2>),
}

impl Domain {
    /// Sample `(i, j)` at `(i, j)`.
    pub fn identity() -> Self {
        Self::Linear(Affine2::IDENTITY)
    }

    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        match self {
            Self::Linear(affine) => {
                0u8.hash(&mut hasher);
                for v in affine.to_cols_array() {
                    v.to_bits().hash(&mut hasher);
                }
            }
            Self::Gridded(points) => {
                1u8.hash(&mut hasher);
                for p in points {
                    p.x.to_bits().hash(&mut hasher);
                    p.y.to_bits().hash(&mut hasher);
                }
            }
        }
        hasher.finish()
    }
}

/// Whether a grid can be drawn as a flat quad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainKind {
    Linear,
    Curved,
}

/// A `width x height` field of samples on a two-dimensional domain.
#[derive(Debug, Clone)]
pub struct Grid {
    width: usize,
    height: usize,
    domain: Domain,
    domain_hash: u64,
    elevation: f32,
    transform: Option<Arc<dyn CoordinateTransform>>,
    samples: Samples,
    channels: Vec<ChannelInfo>,
    revision: u64,
}

impl Grid {
    /// Creates a grid. `lengths` must have exactly two entries, `[width, height]`.
    pub fn new(lengths: &[usize], domain: Domain, samples: Samples) -> Result<Self> {
        let &[width, height] = lengths else {
            return Err(GridTexError::NotTwoDimensional(lengths.len()));
        };
        if width == 0 || height == 0 {
            return Err(GridTexError::EmptyGrid { width, height });
        }
        if let Domain::Gridded(points) = &domain {
            check_size(width * height, points.len())?;
        }
        check_samples(width * height, &samples)?;

        let domain_hash = domain.fingerprint();
        let channels = vec![ChannelInfo::default(); samples.channel_count()];
        Ok(Self {
            width,
            height,
            domain,
            domain_hash,
            elevation: 0.0,
            transform: None,
            samples,
            channels,
            revision: next_revision(),
        })
    }

    /// Sets the value of the display axis no domain axis is mapped to.
    #[must_use]
    pub fn with_elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation;
        self
    }

    /// Sets the display-to-scene coordinate transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Arc<dyn CoordinateTransform>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Sets the units of one channel.
    pub fn with_channel_info(mut self, channel: usize, info: ChannelInfo) -> Result<Self> {
        let available = self.channels.len();
        let slot = self
            .channels
            .get_mut(channel)
            .ok_or(GridTexError::ChannelOutOfRange { channel, available })?;
        *slot = info;
        self.revision = next_revision();
        Ok(self)
    }

    /// Replaces the samples, keeping the domain. Bumps the revision.
    pub fn set_samples(&mut self, samples: Samples) -> Result<()> {
        check_samples(self.len(), &samples)?;
        self.channels
            .resize(samples.channel_count(), ChannelInfo::default());
        self.samples = samples;
        self.revision = next_revision();
        Ok(())
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of samples per channel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// `Linear` iff the domain is affine and no transform is set.
    #[must_use]
    pub fn domain_kind(&self) -> DomainKind {
        match (&self.domain, &self.transform) {
            (Domain::Linear(_), None) => DomainKind::Linear,
            _ => DomainKind::Curved,
        }
    }

    #[must_use]
    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    #[must_use]
    pub fn transform(&self) -> Option<&Arc<dyn CoordinateTransform>> {
        self.transform.as_ref()
    }

    /// Periodic seam introduced by the transform.
    #[must_use]
    pub fn seam(&self) -> Option<Seam> {
        self.transform.as_ref().and_then(|t| t.seam())
    }

    #[must_use]
    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    #[must_use]
    pub fn representation(&self) -> SampleRepresentation {
        self.samples.representation()
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn channel_info(&self, channel: usize) -> Option<&ChannelInfo> {
        self.channels.get(channel)
    }

    /// Changes whenever the sample values or units change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Identifies everything that determines sample positions.
    #[must_use]
    pub fn geometry_fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.domain_hash.hash(&mut hasher);
        self.elevation.to_bits().hash(&mut hasher);
        if let Some(t) = &self.transform {
            (Arc::as_ptr(t).cast::<()>() as usize).hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Value of sample `index` in `channel`, in the channel's default unit.
    ///
    /// Missing samples are NaN.
    #[must_use]
    pub fn value(&self, channel: usize, index: usize) -> f32 {
        let raw = match &self.samples {
            Samples::Packed(c) => c[channel].decode(c[channel].bytes[index]),
            Samples::Float(c) => c[channel][index],
        };
        self.channels[channel].to_default(raw)
    }

    /// Domain location of fractional sample coordinates `(x, y)`.
    ///
    /// Gridded domains interpolate bilinearly and clamp to the grid.
    #[must_use]
    pub fn domain_point(&self, x: f32, y: f32) -> Vec2 {
        match &self.domain {
            Domain::Linear(affine) => affine.transform_point2(Vec2::new(x, y)),
            Domain::Gridded(points) => {
                let fx = x.clamp(0.0, (self.width - 1) as f32);
                let fy = y.clamp(0.0, (self.height - 1) as f32);
                let i0 = fx.floor() as usize;
                let j0 = fy.floor() as usize;
                let i1 = (i0 + 1).min(self.width - 1);
                let j1 = (j0 + 1).min(self.height - 1);
                let tx = fx - i0 as f32;
                let ty = fy - j0 as f32;
                let at = |i: usize, j: usize| points[j * self.width + i];
                let top = at(i0, j0).lerp(at(i1, j0), tx);
                let bottom = at(i0, j1).lerp(at(i1, j1), tx);
                top.lerp(bottom, ty)
            }
        }
    }

    /// Scene position of fractional sample coordinates.
    ///
    /// `axes` names the display axes (0..3) the two domain axes land on;
    /// the remaining axis takes the elevation.
    #[must_use]
    pub fn spatial_point(&self, x: f32, y: f32, axes: [usize; 2]) -> Vec3 {
        let d = self.domain_point(x, y);
        let mut p = Vec3::splat(self.elevation);
        p[axes[0]] = d.x;
        p[axes[1]] = d.y;
        match &self.transform {
            Some(t) => t.transform(p),
            None => p,
        }
    }

    /// Scene positions of flat sample indices.
    #[must_use]
    pub fn spatial_positions(&self, indices: &[usize], axes: [usize; 2]) -> Vec<Vec3> {
        indices
            .iter()
            .map(|&index| {
                let i = index % self.width;
                let j = index / self.width;
                self.spatial_point(i as f32, j as f32, axes)
            })
            .collect()
    }
}

fn check_size(expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(GridTexError::SizeMismatch { expected, actual })
    }
}

fn check_samples(expected: usize, samples: &Samples) -> Result<()> {
    if samples.channel_count() == 0 {
        return Err(GridTexError::SizeMismatch {
            expected: 1,
            actual: 0,
        });
    }
    for channel in 0..samples.channel_count() {
        check_size(expected, samples.channel_len(channel))?;
    }
    Ok(())
}

/// An ordered animation of grids with identical dimensions.
#[derive(Debug, Clone)]
pub struct GridSequence {
    frames: Vec<Grid>,
}

impl GridSequence {
    pub fn new(frames: Vec<Grid>) -> Result<Self> {
        let first = frames.first().ok_or(GridTexError::EmptySequence)?;
        let (expected_width, expected_height) = (first.width, first.height);
        for (index, frame) in frames.iter().enumerate() {
            if frame.width != expected_width || frame.height != expected_height {
                return Err(GridTexError::SequenceMismatch {
                    index,
                    width: frame.width,
                    height: frame.height,
                    expected_width,
                    expected_height,
                });
            }
        }
        let seq = Self { frames };
        seq.check_domains()?;
        Ok(seq)
    }

    /// Checks that every frame shares the first frame's domain, elevation
    /// and coordinate transform.
    /// Frames are drawn on the first frame's meshes.
    pub fn check_domains(&self) -> Result<()> {
        let expected = self.frames[0].geometry_fingerprint();
        match self
            .frames
            .iter()
            .position(|f| f.geometry_fingerprint() != expected)
        {
            Some(index) => Err(GridTexError::SequenceDomainMismatch { index }),
            None => Ok(()),
        }
    }

    #[must_use]
    pub fn frames(&self) -> &[Grid] {
        &self.frames
    }

    /// Mutable access to one frame, for replacing its samples.
    pub fn frame_mut(&mut self, index: usize) -> Option<&mut Grid> {
        self.frames.get_mut(index)
    }
}

/// A single grid or an animation of grids.
#[derive(Debug, Clone)]
pub enum Field {
    Single(Grid),
    Sequence(GridSequence),
}

impl Field {
    /// The frames of this field; a single grid is one frame.
    #[must_use]
    pub fn frames(&self) -> &[Grid] {
        match self {
            Self::Single(grid) => std::slice::from_ref(grid),
            Self::Sequence(seq) => seq.frames(),
        }
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames().len()
    }

    /// The first frame, which supplies the geometry.
    #[must_use]
    pub fn first(&self) -> &Grid {
        match self {
            Self::Single(grid) => grid,
            Self::Sequence(seq) => &seq.frames[0],
        }
    }
}

impl From<Grid> for Field {
    fn from(grid: Grid) -> Self {
        Self::Single(grid)
    }
}

impl From<GridSequence> for Field {
    fn from(seq: GridSequence) -> Self {
        Self::Sequence(seq)
    }
}
