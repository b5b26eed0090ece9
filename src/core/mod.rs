//! Pure numeric building blocks.
//!
//! - `coords`: unit ↔ voxel coordinate mapping and dataset geometry types
//! - `rgba`: bit-exact RGBA ↔ 32-bit scalar packing
//! - `orientation`: quaternions, rotation matrices, axis-angle
//!
//! Nothing here touches a dataset; every function is a plain function of its
//! arguments and safe to call from any thread.

mod coords;
pub mod orientation;
pub mod rgba;

pub use coords::{CoordinateMapper, Extents, Sizes, VoxelSize};
pub use orientation::{
    calc_rotation_between_vectors_3d, map_axis_angle_to_quaternion,
    map_axis_angle_to_rotation_matrix, map_quaternion_to_rotation_matrix, multiply_quaternions,
    normalize, normalize_quaternion, quaternion_conjugate, RotationFrame,
};
pub use rgba::{scalar_to_vector, vector_to_scalar, PackedRgba};
