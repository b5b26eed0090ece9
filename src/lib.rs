//! # imaris-kit: numeric core for driving a volumetric visualization app
//!
//! A scripting connector talks to an external visualization application
//! over RPC and exposes its dataset and scene objects. This crate is the
//! part of such a connector that does actual arithmetic, independent of
//! any transport:
//!
//! - `dataset`: typed, bounds-checked volume/subvolume/slice access over a
//!   [`Dataset`] handle, with `[z][y][x]` reshaping for u8, u16 and f32 data
//! - `core`: coordinate mapping, RGBA packing and orientation math
//! - `camera`: display rotation matrix from a [`Camera`] quaternion
//! - `config`: caller-owned session settings (index base, tolerances)
//!
//! The transport layer implements [`Dataset`] and [`Camera`];
//! [`MemoryDataset`] is a ready-made in-process dataset.
//!
//! ```
//! use imaris_kit::{ElementKind, MemoryDataset, Sizes, VolumeAccessor, VoxelSize};
//! use ndarray::Array3;
//!
//! let mut accessor = VolumeAccessor::new(MemoryDataset::new());
//! let volume = Array3::from_shape_fn((2, 3, 4), |(z, y, x)| (z * 12 + y * 4 + x) as u8);
//! accessor.set_volume(volume.clone(), 0, 0).unwrap();
//!
//! assert_eq!(accessor.sizes().unwrap(), Sizes::new(4, 3, 2, 1, 1));
//! assert_eq!(accessor.element_kind().unwrap(), ElementKind::UInt8);
//! assert_eq!(accessor.voxel_sizes().unwrap(), VoxelSize::new(1.0, 1.0, 1.0));
//! assert_eq!(accessor.get_volume_as::<u8>(0, 0).unwrap(), volume);
//! ```

pub mod camera;
pub mod config;
pub mod core;
pub mod dataset;
pub mod error;

pub use crate::camera::{camera_rotation_matrix, Camera, CameraRotation};
pub use crate::config::{ConnectorConfig, IndexingStart};
pub use crate::core::{CoordinateMapper, Extents, RotationFrame, Sizes, VoxelSize};
pub use crate::dataset::{
    Dataset, Element, ElementKind, FlatBuffer, MemoryDataset, ReportedKind, SliceBuffer,
    VolumeAccessor, VolumeBuffer, VoxelBox,
};
pub use crate::error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
