//! Mapping between physical (unit) coordinates and voxel-grid coordinates.
//!
//! Voxel `i` occupies unit space `[min + i·v, min + (i+1)·v)` along an axis,
//! with `v = (max - min) / size`. Its center maps to voxel coordinate
//! `i + 0.5`:
//!
//! p_voxel = (p_unit - min) / v + 0.5
//! p_unit  = (p_voxel - 0.5) · v + min

use crate::error::{Error, Result};
use ndarray::{arr1, Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Dataset dimensions `(X, Y, Z, C, T)`. `x == 0` means nothing is loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sizes {
    pub x: usize,
    pub y: usize,
    pub z: usize,
    pub c: usize,
    pub t: usize,
}

impl Sizes {
    pub fn new(x: usize, y: usize, z: usize, c: usize, t: usize) -> Self {
        Self { x, y, z, c, t }
    }

    /// Whether a dataset is loaded.
    pub fn is_loaded(&self) -> bool {
        self.x > 0
    }

    /// Number of samples in one `(channel, timepoint)` volume.
    pub fn voxels_per_volume(&self) -> usize {
        self.x * self.y * self.z
    }

    /// Volume shape in `[z, y, x]` order.
    pub fn volume_shape(&self) -> (usize, usize, usize) {
        (self.z, self.y, self.x)
    }
}

/// Physical bounding box of a dataset, in length units.
///
/// `max >= min` on each axis is the caller's responsibility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Extents {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Extents {
    pub fn new(min_x: f32, max_x: f32, min_y: f32, max_y: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            min_z,
            max_z,
        }
    }

    /// Lower corner `(min_x, min_y, min_z)`.
    pub fn min(&self) -> [f32; 3] {
        [self.min_x, self.min_y, self.min_z]
    }

    /// Upper corner `(max_x, max_y, max_z)`.
    pub fn max(&self) -> [f32; 3] {
        [self.max_x, self.max_y, self.max_z]
    }
}

/// Physical size of one voxel along X, Y and Z.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoxelSize {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl VoxelSize {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// `(max - min) / size` per axis.
    ///
    /// Undefined (infinite or NaN) on an axis whose size is zero; use
    /// [`CoordinateMapper::new`] when that must be rejected.
    pub fn from_extents(extents: &Extents, sizes: &Sizes) -> Self {
        Self {
            x: (extents.max_x - extents.min_x) / sizes.x as f32,
            y: (extents.max_y - extents.min_y) / sizes.y as f32,
            z: (extents.max_z - extents.min_z) / sizes.z as f32,
        }
    }

    pub fn as_array(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

/// Converts `N×3` point matrices between unit and voxel coordinates for one
/// dataset geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateMapper {
    origin: Array1<f32>,
    voxel_size: Array1<f32>,
}

impl CoordinateMapper {
    /// Build a mapper from a dataset's extents and sizes.
    ///
    /// Fails with [`Error::NoDataset`] when `sizes.x == 0` and with
    /// [`Error::InvalidArgument`] when Y or Z is zero or a voxel size is zero
    /// or not finite (the mapping would not be invertible).
    pub fn new(extents: &Extents, sizes: &Sizes) -> Result<Self> {
        if !sizes.is_loaded() {
            return Err(Error::NoDataset);
        }
        if sizes.y == 0 || sizes.z == 0 {
            return Err(Error::InvalidArgument(format!(
                "cannot map coordinates on a degenerate grid {}x{}x{}",
                sizes.x, sizes.y, sizes.z
            )));
        }

        let voxel_size = VoxelSize::from_extents(extents, sizes);
        if voxel_size
            .as_array()
            .iter()
            .any(|v| !v.is_finite() || *v == 0.0)
        {
            return Err(Error::InvalidArgument(format!(
                "voxel size {voxel_size:?} is not invertible"
            )));
        }

        Ok(Self {
            origin: arr1(&extents.min()),
            voxel_size: arr1(&voxel_size.as_array()),
        })
    }

    /// Voxel size used by this mapper.
    pub fn voxel_size(&self) -> VoxelSize {
        VoxelSize::new(self.voxel_size[0], self.voxel_size[1], self.voxel_size[2])
    }

    /// Map physical coordinates to voxel coordinates.
    pub fn units_to_voxels(&self, points: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        check_n_by_3(&points)?;
        Ok((&points - &self.origin) / &self.voxel_size + 0.5)
    }

    /// Map voxel coordinates back to physical coordinates.
    pub fn voxels_to_units(&self, points: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
        check_n_by_3(&points)?;
        Ok((&points - 0.5) * &self.voxel_size + &self.origin)
    }
}

fn check_n_by_3(points: &ArrayView2<'_, f32>) -> Result<()> {
    if points.ncols() != 3 {
        return Err(Error::InvalidArgument(format!(
            "expected an (n x 3) matrix of positions, got {:?}",
            points.shape()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn unit_cube_mapper() -> CoordinateMapper {
        let extents = Extents::new(0.0, 10.0, 0.0, 20.0, -5.0, 5.0);
        CoordinateMapper::new(&extents, &Sizes::new(10, 10, 10, 1, 1)).unwrap()
    }

    #[test]
    fn test_voxel_center_maps_to_half_index() {
        let mapper = unit_cube_mapper();
        // first voxel along x spans [0, 1), center 0.5 in units
        let v = mapper.units_to_voxels(array![[0.5f32, 1.0, -4.5]].view()).unwrap();
        assert_relative_eq!(v[[0, 0]], 1.0, epsilon = 1e-6);
        assert_relative_eq!(v[[0, 1]], 1.0, epsilon = 1e-6);
        assert_relative_eq!(v[[0, 2]], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_extent_min_maps_to_half() {
        let mapper = unit_cube_mapper();
        let v = mapper.units_to_voxels(array![[0.0f32, 0.0, -5.0]].view()).unwrap();
        for axis in 0..3 {
            assert_relative_eq!(v[[0, axis]], 0.5, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_rejects_non_n_by_3() {
        let mapper = unit_cube_mapper();
        let bad = array![[1.0f32, 2.0], [3.0, 4.0]];
        assert!(matches!(
            mapper.units_to_voxels(bad.view()),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            mapper.voxels_to_units(bad.view()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_empty_input_is_fine() {
        let mapper = unit_cube_mapper();
        let empty = Array2::<f32>::zeros((0, 3));
        assert_eq!(mapper.units_to_voxels(empty.view()).unwrap().shape(), &[0, 3]);
    }

    #[test]
    fn test_no_dataset() {
        let err = CoordinateMapper::new(&Extents::default(), &Sizes::default()).unwrap_err();
        assert_eq!(err, Error::NoDataset);
    }

    #[test]
    fn test_flat_extent_is_rejected() {
        let extents = Extents::new(0.0, 10.0, 0.0, 10.0, 3.0, 3.0);
        let err = CoordinateMapper::new(&extents, &Sizes::new(10, 10, 1, 1, 1)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
