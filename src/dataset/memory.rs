//! In-process dataset backed by one flat buffer per `(channel, timepoint)`.

use super::{Dataset, ElementKind, FlatBuffer, ReportedKind, VoxelBox};
use crate::core::{Extents, Sizes};
use crate::error::{Error, Result};
use ndarray::{s, ArrayView3, ArrayViewMut3};

/// A [`Dataset`] held entirely in memory.
///
/// Starts empty (`sizes().x == 0`). [`Dataset::create`] allocates zeroed
/// volumes for every channel and timepoint.
#[derive(Clone, Debug)]
pub struct MemoryDataset {
    kind: ElementKind,
    reported_kind: Option<String>,
    sizes: Sizes,
    extents: Extents,
    time_point_delta: f64,
    // indexed by timepoint * sizes.c + channel
    volumes: Vec<FlatBuffer>,
}

impl Default for MemoryDataset {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDataset {
    /// An empty dataset.
    pub fn new() -> Self {
        Self {
            kind: ElementKind::UInt8,
            reported_kind: None,
            sizes: Sizes::default(),
            extents: Extents::default(),
            time_point_delta: 1.0,
            volumes: Vec::new(),
        }
    }

    /// A zero-filled dataset with the given kind, sizes and extents.
    pub fn with_geometry(kind: ElementKind, sizes: Sizes, extents: Extents) -> Result<Self> {
        let mut dataset = Self::new();
        dataset.create(kind, sizes)?;
        dataset.set_extents(extents)?;
        Ok(dataset)
    }

    /// Make [`Dataset::element_kind`] report a kind name this crate does
    /// not support. Data access keeps using the real kind.
    pub fn report_unsupported_kind(&mut self, name: impl Into<String>) {
        self.reported_kind = Some(name.into());
    }

    fn volume_index(&self, channel: usize, timepoint: usize) -> Result<usize> {
        if channel >= self.sizes.c || timepoint >= self.sizes.t {
            return Err(Error::OutOfBounds(format!(
                "volume (channel {channel}, timepoint {timepoint}) outside {}x{}",
                self.sizes.c, self.sizes.t
            )));
        }
        Ok(timepoint * self.sizes.c + channel)
    }

    fn check_region(&self, region: &VoxelBox) -> Result<()> {
        if !region.fits_in(&self.sizes) {
            return Err(Error::OutOfBounds(format!(
                "{region:?} outside volume {}x{}x{}",
                self.sizes.x, self.sizes.y, self.sizes.z
            )));
        }
        Ok(())
    }
}

fn copy_region<T: Copy>(
    data: &[T],
    shape: (usize, usize, usize),
    region: &VoxelBox,
) -> Result<Vec<T>> {
    let volume = ArrayView3::from_shape(shape, data).map_err(|e| Error::Backend(e.to_string()))?;
    let cut = volume.slice(s![
        region.z0..region.z0 + region.dz,
        region.y0..region.y0 + region.dy,
        region.x0..region.x0 + region.dx
    ]);
    Ok(cut.iter().copied().collect())
}

fn paste_region<T: Copy>(
    target: &mut [T],
    shape: (usize, usize, usize),
    source: &[T],
    region: &VoxelBox,
) -> Result<()> {
    let source = ArrayView3::from_shape(region.shape(), source)
        .map_err(|e| Error::InvalidArgument(e.to_string()))?;
    let mut volume =
        ArrayViewMut3::from_shape(shape, target).map_err(|e| Error::Backend(e.to_string()))?;
    volume
        .slice_mut(s![
            region.z0..region.z0 + region.dz,
            region.y0..region.y0 + region.dy,
            region.x0..region.x0 + region.dx
        ])
        .assign(&source);
    Ok(())
}

impl Dataset for MemoryDataset {
    fn sizes(&self) -> Result<Sizes> {
        Ok(self.sizes)
    }

    fn extents(&self) -> Result<Extents> {
        Ok(self.extents)
    }

    fn element_kind(&self) -> Result<ReportedKind> {
        Ok(match &self.reported_kind {
            Some(name) => ReportedKind::Other(name.clone()),
            None => ReportedKind::Known(self.kind),
        })
    }

    fn time_point_delta(&self) -> Result<f64> {
        Ok(self.time_point_delta)
    }

    fn read_volume(&self, channel: usize, timepoint: usize) -> Result<FlatBuffer> {
        let index = self.volume_index(channel, timepoint)?;
        Ok(self.volumes[index].clone())
    }

    fn read_sub_volume(
        &self,
        region: &VoxelBox,
        channel: usize,
        timepoint: usize,
    ) -> Result<FlatBuffer> {
        let index = self.volume_index(channel, timepoint)?;
        self.check_region(region)?;
        let shape = self.sizes.volume_shape();
        Ok(match &self.volumes[index] {
            FlatBuffer::UInt8(v) => FlatBuffer::UInt8(copy_region(v, shape, region)?),
            FlatBuffer::UInt16(v) => FlatBuffer::UInt16(copy_region(v, shape, region)?),
            FlatBuffer::Float32(v) => FlatBuffer::Float32(copy_region(v, shape, region)?),
        })
    }

    fn write_volume(&mut self, data: &FlatBuffer, channel: usize, timepoint: usize) -> Result<()> {
        let index = self.volume_index(channel, timepoint)?;
        if data.kind() != self.kind {
            return Err(Error::TypeMismatch {
                expected: self.kind,
                found: data.kind(),
            });
        }
        if data.len() != self.sizes.voxels_per_volume() {
            return Err(Error::InvalidArgument(format!(
                "volume needs {} samples, got {}",
                self.sizes.voxels_per_volume(),
                data.len()
            )));
        }
        self.volumes[index] = data.clone();
        Ok(())
    }

    fn write_sub_volume(
        &mut self,
        data: &FlatBuffer,
        region: &VoxelBox,
        channel: usize,
        timepoint: usize,
    ) -> Result<()> {
        let index = self.volume_index(channel, timepoint)?;
        self.check_region(region)?;
        let shape = self.sizes.volume_shape();
        match (&mut self.volumes[index], data) {
            (FlatBuffer::UInt8(target), FlatBuffer::UInt8(source)) => {
                paste_region(target, shape, source, region)
            }
            (FlatBuffer::UInt16(target), FlatBuffer::UInt16(source)) => {
                paste_region(target, shape, source, region)
            }
            (FlatBuffer::Float32(target), FlatBuffer::Float32(source)) => {
                paste_region(target, shape, source, region)
            }
            (target, source) => Err(Error::TypeMismatch {
                expected: target.kind(),
                found: source.kind(),
            }),
        }
    }

    fn create(&mut self, kind: ElementKind, sizes: Sizes) -> Result<()> {
        let voxels = sizes.voxels_per_volume();
        self.kind = kind;
        self.reported_kind = None;
        self.sizes = sizes;
        self.extents = Extents::new(0.0, sizes.x as f32, 0.0, sizes.y as f32, 0.0, sizes.z as f32);
        self.volumes = (0..sizes.c * sizes.t)
            .map(|_| FlatBuffer::zeros(kind, voxels))
            .collect();
        tracing::trace!(%kind, ?sizes, "memory dataset allocated");
        Ok(())
    }

    fn set_extents(&mut self, extents: Extents) -> Result<()> {
        self.extents = extents;
        Ok(())
    }

    fn set_time_point_delta(&mut self, delta: f64) -> Result<()> {
        self.time_point_delta = delta;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let dataset = MemoryDataset::new();
        assert!(!dataset.sizes().unwrap().is_loaded());
    }

    #[test]
    fn test_create_allocates_every_volume() {
        let mut dataset = MemoryDataset::new();
        dataset
            .create(ElementKind::UInt16, Sizes::new(4, 3, 2, 2, 3))
            .unwrap();
        for t in 0..3 {
            for c in 0..2 {
                assert_eq!(
                    dataset.read_volume(c, t).unwrap(),
                    FlatBuffer::UInt16(vec![0; 24])
                );
            }
        }
        assert!(matches!(dataset.read_volume(2, 0), Err(Error::OutOfBounds(_))));
    }

    #[test]
    fn test_sub_volume_write_then_read() {
        let mut dataset = MemoryDataset::new();
        dataset
            .create(ElementKind::Float32, Sizes::new(4, 4, 4, 1, 1))
            .unwrap();
        let region = VoxelBox::new(1, 2, 3, 2, 2, 1);
        let patch = FlatBuffer::Float32(vec![1.0, 2.0, 3.0, 4.0]);
        dataset.write_sub_volume(&patch, &region, 0, 0).unwrap();
        assert_eq!(dataset.read_sub_volume(&region, 0, 0).unwrap(), patch);

        let FlatBuffer::Float32(all) = dataset.read_volume(0, 0).unwrap() else {
            panic!("kind changed");
        };
        // z=3, y=2, x=1 -> 3*16 + 2*4 + 1
        assert_eq!(all[57], 1.0);
        assert_eq!(all[58], 2.0);
        assert_eq!(all[61], 3.0);
        assert_eq!(all.iter().filter(|v| **v != 0.0).count(), 4);
    }

    #[test]
    fn test_oversized_region_is_out_of_bounds() {
        let mut dataset = MemoryDataset::new();
        dataset
            .create(ElementKind::UInt8, Sizes::new(4, 4, 4, 1, 1))
            .unwrap();
        let region = VoxelBox::new(1, 0, 0, usize::MAX, 1, 1);
        assert!(matches!(
            dataset.read_sub_volume(&region, 0, 0),
            Err(Error::OutOfBounds(_))
        ));
        assert!(matches!(
            dataset.write_sub_volume(&FlatBuffer::UInt8(vec![0]), &region, 0, 0),
            Err(Error::OutOfBounds(_))
        ));
    }

    #[test]
    fn test_write_rejects_wrong_kind() {
        let mut dataset = MemoryDataset::new();
        dataset
            .create(ElementKind::UInt8, Sizes::new(2, 2, 1, 1, 1))
            .unwrap();
        let err = dataset
            .write_volume(&FlatBuffer::UInt16(vec![0; 4]), 0, 0)
            .unwrap_err();
        assert_eq!(
            err,
            Error::TypeMismatch {
                expected: ElementKind::UInt8,
                found: ElementKind::UInt16
            }
        );
    }

    #[test]
    fn test_reported_kind_override() {
        let mut dataset = MemoryDataset::new();
        dataset.report_unsupported_kind("eTypeUnknown");
        assert_eq!(
            dataset.element_kind().unwrap(),
            ReportedKind::Other("eTypeUnknown".into())
        );
    }
}
