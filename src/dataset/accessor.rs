//! Validating, reshaping facade over a [`Dataset`].

use super::{Dataset, Element, ElementKind, SliceBuffer, VolumeBuffer, VoxelBox};
use crate::config::ConnectorConfig;
use crate::core::{CoordinateMapper, Extents, Sizes, VoxelSize};
use crate::error::{Error, Result};
use ndarray::{Array2, Array3, ArrayView2};

/// Typed, bounds-checked access to the volumes of one dataset handle.
///
/// Caller-facing indices (channel, timepoint, plane and subvolume origin)
/// are interpreted relative to [`ConnectorConfig::indexing_start`];
/// subvolume extents `dx, dy, dz` are counts and never shifted.
///
/// The accessor holds no state besides the handle and its config. It does
/// not serialize access: sharing one handle across threads needs external
/// locking.
#[derive(Debug)]
pub struct VolumeAccessor<D> {
    dataset: D,
    config: ConnectorConfig,
}

impl<D: Dataset> VolumeAccessor<D> {
    /// Wrap a handle with the default (zero-based) configuration.
    pub fn new(dataset: D) -> Self {
        Self::with_config(dataset, ConnectorConfig::default())
    }

    pub fn with_config(dataset: D, config: ConnectorConfig) -> Self {
        Self { dataset, config }
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn dataset_mut(&mut self) -> &mut D {
        &mut self.dataset
    }

    pub fn into_inner(self) -> D {
        self.dataset
    }

    // ---- metadata ----

    /// Dataset dimensions; all zero when nothing is loaded.
    pub fn sizes(&self) -> Result<Sizes> {
        self.dataset.sizes()
    }

    fn loaded_sizes(&self) -> Result<Sizes> {
        let sizes = self.dataset.sizes()?;
        if !sizes.is_loaded() {
            return Err(Error::NoDataset);
        }
        Ok(sizes)
    }

    pub fn extents(&self) -> Result<Extents> {
        self.loaded_sizes()?;
        self.dataset.extents()
    }

    /// `(max - min) / size` per axis.
    pub fn voxel_sizes(&self) -> Result<VoxelSize> {
        let sizes = self.loaded_sizes()?;
        Ok(VoxelSize::from_extents(&self.dataset.extents()?, &sizes))
    }

    /// The dataset's element kind; [`Error::Unsupported`] for anything but
    /// u8, u16 and f32.
    pub fn element_kind(&self) -> Result<ElementKind> {
        self.loaded_sizes()?;
        ElementKind::try_from(self.dataset.element_kind()?)
    }

    pub fn time_point_delta(&self) -> Result<f64> {
        self.loaded_sizes()?;
        self.dataset.time_point_delta()
    }

    // ---- coordinates ----

    /// A mapper for the current dataset geometry.
    pub fn coordinate_mapper(&self) -> Result<CoordinateMapper> {
        let sizes = self.loaded_sizes()?;
        CoordinateMapper::new(&self.dataset.extents()?, &sizes)
    }

    /// Map an `N×3` matrix of unit positions to voxel positions.
    pub fn units_to_voxels(&self, points: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        self.coordinate_mapper()?.units_to_voxels(points)
    }

    /// Map an `N×3` matrix of voxel positions to unit positions.
    pub fn voxels_to_units(&self, points: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        self.coordinate_mapper()?.voxels_to_units(points)
    }

    // ---- reads ----

    /// The full volume of `(channel, timepoint)`, shaped `[sizeZ, sizeY, sizeX]`.
    pub fn get_volume(&self, channel: usize, timepoint: usize) -> Result<VolumeBuffer> {
        let sizes = self.loaded_sizes()?;
        let (channel, timepoint) = self.volume_indices(&sizes, channel, timepoint)?;
        let kind = self.element_kind()?;

        let flat = self.dataset.read_volume(channel, timepoint)?;
        check_returned_kind(kind, flat.kind())?;
        flat.into_volume(sizes.volume_shape())
    }

    /// Like [`get_volume`](Self::get_volume), typed; [`Error::TypeMismatch`]
    /// when `T` is not the dataset's kind.
    pub fn get_volume_as<T: Element>(&self, channel: usize, timepoint: usize) -> Result<Array3<T>> {
        let volume = self.get_volume(channel, timepoint)?;
        let found = volume.kind();
        volume.into_array::<T>().ok_or(Error::TypeMismatch {
            expected: found,
            found: T::KIND,
        })
    }

    /// The box `[z0, z0+dz) × [y0, y0+dy) × [x0, x0+dx)`, shaped `[dz, dy, dx]`.
    ///
    /// `result[z][y][x] == get_volume(..)[z0+z][y0+y][x0+x]`.
    #[allow(clippy::too_many_arguments)]
    pub fn get_sub_volume(
        &self,
        x0: usize,
        y0: usize,
        z0: usize,
        channel: usize,
        timepoint: usize,
        dx: usize,
        dy: usize,
        dz: usize,
    ) -> Result<VolumeBuffer> {
        let sizes = self.loaded_sizes()?;
        let region = self.region(&sizes, [x0, y0, z0], [dx, dy, dz])?;
        let (channel, timepoint) = self.volume_indices(&sizes, channel, timepoint)?;
        let kind = self.element_kind()?;

        let flat = self.dataset.read_sub_volume(&region, channel, timepoint)?;
        check_returned_kind(kind, flat.kind())?;
        flat.into_volume(region.shape())
    }

    /// Plane `z = plane`, shaped `[sizeY, sizeX]`.
    pub fn get_slice(&self, plane: usize, channel: usize, timepoint: usize) -> Result<SliceBuffer> {
        let sizes = self.loaded_sizes()?;
        let plane = self.index(plane, sizes.z, "plane")?;
        let (channel, timepoint) = self.volume_indices(&sizes, channel, timepoint)?;
        let kind = self.element_kind()?;

        let flat = self.dataset.read_slice(plane, channel, timepoint)?;
        check_returned_kind(kind, flat.kind())?;
        flat.into_slice((sizes.y, sizes.x))
    }

    // ---- writes ----

    /// Replace the volume of `(channel, timepoint)`.
    ///
    /// With no dataset loaded, one is created first: sized to the buffer
    /// (a 2D slice counts as one plane), one channel, one timepoint, unit
    /// voxel size, buffer's element kind.
    pub fn set_volume(
        &mut self,
        buffer: impl Into<VolumeBuffer>,
        channel: usize,
        timepoint: usize,
    ) -> Result<()> {
        let buffer = buffer.into();
        let (dz, dy, dx) = buffer.shape();

        let sizes = self.dataset.sizes()?;
        if !sizes.is_loaded() {
            let target = Sizes::new(dx, dy, dz, 1, 1);
            let (c, t) = self.volume_indices(&target, channel, timepoint)?;
            tracing::debug!(kind = %buffer.kind(), ?target, "no dataset loaded, creating one for set_volume");
            self.create_dataset(buffer.kind(), target, VoxelSize::new(1.0, 1.0, 1.0), 1.0)?;
            return self.dataset.write_volume(&buffer.to_flat(), c, t);
        }

        let kind = self.element_kind()?;
        check_buffer_kind(kind, buffer.kind())?;
        let (channel, timepoint) = self.volume_indices(&sizes, channel, timepoint)?;
        if buffer.shape() != sizes.volume_shape() {
            return Err(Error::InvalidArgument(format!(
                "volume shape {:?} does not match dataset shape {:?} (z, y, x)",
                buffer.shape(),
                sizes.volume_shape()
            )));
        }

        self.dataset.write_volume(&buffer.to_flat(), channel, timepoint)
    }

    /// Overwrite the box starting at `(x0, y0, z0)` with `buffer`.
    ///
    /// The box extents are the buffer's shape.
    pub fn set_sub_volume(
        &mut self,
        buffer: impl Into<VolumeBuffer>,
        x0: usize,
        y0: usize,
        z0: usize,
        channel: usize,
        timepoint: usize,
    ) -> Result<()> {
        let buffer = buffer.into();
        let sizes = self.loaded_sizes()?;
        let kind = self.element_kind()?;
        check_buffer_kind(kind, buffer.kind())?;

        let (dz, dy, dx) = buffer.shape();
        let region = self.region(&sizes, [x0, y0, z0], [dx, dy, dz])?;
        let (channel, timepoint) = self.volume_indices(&sizes, channel, timepoint)?;

        self.dataset
            .write_sub_volume(&buffer.to_flat(), &region, channel, timepoint)
    }

    /// Overwrite plane `z = plane` with a `[sizeY, sizeX]` slice.
    pub fn set_slice(
        &mut self,
        buffer: SliceBuffer,
        plane: usize,
        channel: usize,
        timepoint: usize,
    ) -> Result<()> {
        let sizes = self.loaded_sizes()?;
        if buffer.shape() != (sizes.y, sizes.x) {
            return Err(Error::InvalidArgument(format!(
                "slice shape {:?} does not match dataset plane {:?} (y, x)",
                buffer.shape(),
                (sizes.y, sizes.x)
            )));
        }
        let x0 = self.config.indexing_start.offset();
        self.set_sub_volume(buffer, x0, x0, plane, channel, timepoint)
    }

    /// Replace the active dataset with an empty one.
    ///
    /// Extents become `[0, size · voxel_size]` per axis.
    pub fn create_dataset(
        &mut self,
        kind: ElementKind,
        sizes: Sizes,
        voxel_size: VoxelSize,
        time_point_delta: f64,
    ) -> Result<()> {
        if [sizes.x, sizes.y, sizes.z, sizes.c, sizes.t].contains(&0) {
            return Err(Error::InvalidArgument(format!(
                "all dataset sizes must be at least 1, got {sizes:?}"
            )));
        }
        if voxel_size
            .as_array()
            .iter()
            .any(|v| !v.is_finite() || *v <= 0.0)
        {
            return Err(Error::InvalidArgument(format!(
                "voxel sizes must be positive, got {voxel_size:?}"
            )));
        }
        if !(time_point_delta.is_finite() && time_point_delta > 0.0) {
            return Err(Error::InvalidArgument(format!(
                "time point delta must be positive, got {time_point_delta}"
            )));
        }

        self.dataset.create(kind, sizes)?;
        self.dataset.set_extents(Extents::new(
            0.0,
            sizes.x as f32 * voxel_size.x,
            0.0,
            sizes.y as f32 * voxel_size.y,
            0.0,
            sizes.z as f32 * voxel_size.z,
        ))?;
        self.dataset.set_time_point_delta(time_point_delta)?;
        tracing::debug!(%kind, ?sizes, ?voxel_size, time_point_delta, "created dataset");
        Ok(())
    }

    // ---- validation ----

    fn index(&self, value: usize, limit: usize, what: &str) -> Result<usize> {
        let start = self.config.indexing_start;
        match start.to_zero_based(value) {
            Some(index) if index < limit => Ok(index),
            _ => {
                tracing::debug!(what, value, limit, "index rejected");
                Err(Error::OutOfBounds(format!(
                    "{what} {value} outside [{}, {})",
                    start.offset(),
                    limit + start.offset()
                )))
            }
        }
    }

    fn volume_indices(&self, sizes: &Sizes, channel: usize, timepoint: usize) -> Result<(usize, usize)> {
        Ok((
            self.index(channel, sizes.c, "channel")?,
            self.index(timepoint, sizes.t, "timepoint")?,
        ))
    }

    fn region(&self, sizes: &Sizes, origin: [usize; 3], extent: [usize; 3]) -> Result<VoxelBox> {
        let [dx, dy, dz] = extent;
        if dx == 0 || dy == 0 || dz == 0 {
            return Err(Error::InvalidArgument(format!(
                "subvolume extent must be at least 1 voxel per axis, got {extent:?}"
            )));
        }
        let x0 = self.index(origin[0], sizes.x, "x0")?;
        let y0 = self.index(origin[1], sizes.y, "y0")?;
        let z0 = self.index(origin[2], sizes.z, "z0")?;
        let region = VoxelBox::new(x0, y0, z0, dx, dy, dz);
        if !region.fits_in(sizes) {
            tracing::debug!(?region, ?sizes, "subvolume rejected");
            return Err(Error::OutOfBounds(format!(
                "subvolume {extent:?} at {origin:?} exceeds volume {}x{}x{}",
                sizes.x, sizes.y, sizes.z
            )));
        }
        Ok(region)
    }
}

fn check_buffer_kind(dataset: ElementKind, buffer: ElementKind) -> Result<()> {
    if dataset != buffer {
        return Err(Error::TypeMismatch {
            expected: dataset,
            found: buffer,
        });
    }
    Ok(())
}

fn check_returned_kind(reported: ElementKind, returned: ElementKind) -> Result<()> {
    if reported != returned {
        return Err(Error::Backend(format!(
            "dataset reports {reported} but returned {returned} samples"
        )));
    }
    Ok(())
}
