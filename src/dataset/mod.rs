//! Dataset capability and typed volume access.
//!
//! [`Dataset`] is the narrow contract a transport layer implements for one
//! external dataset handle. [`VolumeAccessor`] sits on top of it and adds
//! index validation, element-kind dispatch and `[z][y][x]` reshaping.
//! [`MemoryDataset`] is an in-process implementation.

mod accessor;
mod buffer;
mod memory;

use crate::core::{Extents, Sizes};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use accessor::VolumeAccessor;
pub use buffer::{Element, FlatBuffer, SliceBuffer, VolumeBuffer};
pub use memory::MemoryDataset;

/// Sample type shared by every volume of a dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    UInt8,
    UInt16,
    Float32,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementKind::UInt8 => "uint8",
            ElementKind::UInt16 => "uint16",
            ElementKind::Float32 => "float32",
        };
        f.write_str(name)
    }
}

/// Element kind as reported by a dataset implementation, which may know
/// kinds this crate cannot handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportedKind {
    Known(ElementKind),
    Other(String),
}

impl From<ElementKind> for ReportedKind {
    fn from(kind: ElementKind) -> Self {
        ReportedKind::Known(kind)
    }
}

impl TryFrom<ReportedKind> for ElementKind {
    type Error = Error;

    fn try_from(reported: ReportedKind) -> Result<Self> {
        match reported {
            ReportedKind::Known(kind) => Ok(kind),
            ReportedKind::Other(name) => Err(Error::Unsupported(name)),
        }
    }
}

/// Axis-aligned box `[z0, z0+dz) × [y0, y0+dy) × [x0, x0+dx)` in zero-based
/// voxel indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VoxelBox {
    pub x0: usize,
    pub y0: usize,
    pub z0: usize,
    pub dx: usize,
    pub dy: usize,
    pub dz: usize,
}

impl VoxelBox {
    pub fn new(x0: usize, y0: usize, z0: usize, dx: usize, dy: usize, dz: usize) -> Self {
        Self {
            x0,
            y0,
            z0,
            dx,
            dy,
            dz,
        }
    }

    /// The box covering a whole volume.
    pub fn full(sizes: &Sizes) -> Self {
        Self::new(0, 0, 0, sizes.x, sizes.y, sizes.z)
    }

    /// The single plane `z`.
    pub fn plane(sizes: &Sizes, z: usize) -> Self {
        Self::new(0, 0, z, sizes.x, sizes.y, 1)
    }

    /// Number of samples in the box.
    pub fn len(&self) -> usize {
        self.dx * self.dy * self.dz
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shape in `[z, y, x]` order.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.dz, self.dy, self.dx)
    }

    /// Whether the box lies entirely inside a volume of the given sizes.
    ///
    /// Extents are compared against the room left after the origin, so
    /// arbitrarily large `dx, dy, dz` cannot overflow.
    pub fn fits_in(&self, sizes: &Sizes) -> bool {
        self.x0 < sizes.x
            && self.y0 < sizes.y
            && self.z0 < sizes.z
            && self.dx <= sizes.x - self.x0
            && self.dy <= sizes.y - self.y0
            && self.dz <= sizes.z - self.z0
    }
}

/// Read/write contract against one external dataset handle.
///
/// All indices are zero-based. Flat buffers are in row-major `[z][y][x]`
/// order (x varies fastest). Implementations report their own failures as
/// [`Error::Backend`]; the accessor never retries.
pub trait Dataset {
    /// Current dimensions; `x == 0` when nothing is loaded.
    fn sizes(&self) -> Result<Sizes>;

    /// Physical bounding box.
    fn extents(&self) -> Result<Extents>;

    /// Sample type of every volume.
    fn element_kind(&self) -> Result<ReportedKind>;

    /// Interval between consecutive time points.
    fn time_point_delta(&self) -> Result<f64>;

    /// One full `(channel, timepoint)` volume.
    fn read_volume(&self, channel: usize, timepoint: usize) -> Result<FlatBuffer>;

    /// A box cut from one volume.
    fn read_sub_volume(
        &self,
        region: &VoxelBox,
        channel: usize,
        timepoint: usize,
    ) -> Result<FlatBuffer>;

    /// One z plane of one volume.
    fn read_slice(&self, plane: usize, channel: usize, timepoint: usize) -> Result<FlatBuffer> {
        let sizes = self.sizes()?;
        self.read_sub_volume(&VoxelBox::plane(&sizes, plane), channel, timepoint)
    }

    /// Replace one full volume.
    fn write_volume(&mut self, data: &FlatBuffer, channel: usize, timepoint: usize) -> Result<()>;

    /// Overwrite a box inside one volume.
    fn write_sub_volume(
        &mut self,
        data: &FlatBuffer,
        region: &VoxelBox,
        channel: usize,
        timepoint: usize,
    ) -> Result<()>;

    /// Re-create the dataset with new kind and sizes, discarding all data.
    fn create(&mut self, kind: ElementKind, sizes: Sizes) -> Result<()>;

    fn set_extents(&mut self, extents: Extents) -> Result<()>;

    fn set_time_point_delta(&mut self, delta: f64) -> Result<()>;
}

impl<T: Dataset + ?Sized> Dataset for &mut T {
    fn sizes(&self) -> Result<Sizes> {
        (**self).sizes()
    }

    fn extents(&self) -> Result<Extents> {
        (**self).extents()
    }

    fn element_kind(&self) -> Result<ReportedKind> {
        (**self).element_kind()
    }

    fn time_point_delta(&self) -> Result<f64> {
        (**self).time_point_delta()
    }

    fn read_volume(&self, channel: usize, timepoint: usize) -> Result<FlatBuffer> {
        (**self).read_volume(channel, timepoint)
    }

    fn read_sub_volume(
        &self,
        region: &VoxelBox,
        channel: usize,
        timepoint: usize,
    ) -> Result<FlatBuffer> {
        (**self).read_sub_volume(region, channel, timepoint)
    }

    fn read_slice(&self, plane: usize, channel: usize, timepoint: usize) -> Result<FlatBuffer> {
        (**self).read_slice(plane, channel, timepoint)
    }

    fn write_volume(&mut self, data: &FlatBuffer, channel: usize, timepoint: usize) -> Result<()> {
        (**self).write_volume(data, channel, timepoint)
    }

    fn write_sub_volume(
        &mut self,
        data: &FlatBuffer,
        region: &VoxelBox,
        channel: usize,
        timepoint: usize,
    ) -> Result<()> {
        (**self).write_sub_volume(data, region, channel, timepoint)
    }

    fn create(&mut self, kind: ElementKind, sizes: Sizes) -> Result<()> {
        (**self).create(kind, sizes)
    }

    fn set_extents(&mut self, extents: Extents) -> Result<()> {
        (**self).set_extents(extents)
    }

    fn set_time_point_delta(&mut self, delta: f64) -> Result<()> {
        (**self).set_time_point_delta(delta)
    }
}
