//! Orientation math: normalization, quaternions, rotation matrices.
//!
//! Quaternions use the `(x, y, z, w)` layout throughout: `x, y, z` is the
//! vector part and `w` the scalar part. This is also nalgebra's storage
//! order, so `Quaternion::from(Vector4::new(x, y, z, w))` and `q.coords`
//! convert losslessly between the two views.
//!
//! None of these functions fail. Degenerate input has a fixed fallback:
//! - a vector (or quaternion) with norm below [`NORM_EPSILON`] normalizes to zero
//! - the zero quaternion maps to the identity rotation matrix
//! - antiparallel vectors rotate 180° about an arbitrary perpendicular axis

use nalgebra::{Matrix4, Quaternion, SVector, Vector3, Vector4};
use std::f32::consts::PI;

/// Norms below this are treated as zero by [`normalize`].
pub const NORM_EPSILON: f32 = 1e-8;

/// `cos θ` below `-1 + ANTIPARALLEL_EPSILON` counts as antiparallel.
///
/// Close to the f32 resolution of `cos θ` near -1 (~6e-8), so the half-turn
/// fallback only replaces the closed form within ~0.08° of exactly opposite.
const ANTIPARALLEL_EPSILON: f32 = 1e-6;

/// Squared length below which a candidate rotation axis is rejected.
const MIN_AXIS_NORM_SQUARED: f32 = 1e-2;

/// A 4×4 homogeneous rotation matrix and its three basis axes.
///
/// `x_axis`, `y_axis` and `z_axis` are columns 0, 1 and 2 of the upper-left
/// 3×3 block.
#[derive(Clone, Debug, PartialEq)]
pub struct RotationFrame {
    pub matrix: Matrix4<f32>,
    pub x_axis: Vector3<f32>,
    pub y_axis: Vector3<f32>,
    pub z_axis: Vector3<f32>,
}

/// Scale `v` to unit length.
///
/// Returns a zero vector of the same dimension when `‖v‖ < 1e-8`, so the
/// result never contains NaN.
pub fn normalize<const D: usize>(v: &SVector<f32, D>) -> SVector<f32, D> {
    let norm = v.norm();
    if norm < NORM_EPSILON {
        tracing::trace!(norm, "normalize: near-zero vector, returning zero");
        return SVector::<f32, D>::zeros();
    }
    v / norm
}

/// Normalize a quaternion as a 4-vector (same zero fallback as [`normalize`]).
pub fn normalize_quaternion(q: &Quaternion<f32>) -> Quaternion<f32> {
    Quaternion::from(normalize(&q.coords))
}

/// Quaternion for a rotation of `angle` radians about `axis`.
///
/// q = (axis' · sin(angle/2), cos(angle/2)) with axis' = normalize(axis).
/// A zero-length axis yields the identity `(0, 0, 0, 1)` for any angle.
pub fn map_axis_angle_to_quaternion(axis: &Vector3<f32>, angle: f32) -> Quaternion<f32> {
    let axis = normalize(axis);
    if axis == Vector3::zeros() {
        return Quaternion::identity();
    }
    let half = 0.5 * angle;
    let s = half.sin();
    Quaternion::from(Vector4::new(axis.x * s, axis.y * s, axis.z * s, half.cos()))
}

/// Rotation matrix for a rotation of `angle` radians about `axis`.
pub fn map_axis_angle_to_rotation_matrix(axis: &Vector3<f32>, angle: f32) -> RotationFrame {
    map_quaternion_to_rotation_matrix(&map_axis_angle_to_quaternion(axis, angle))
}

/// Convert a quaternion `(x, y, z, w)` to a homogeneous rotation matrix.
///
/// The input is normalized first. With q = (x, y, z, w):
///
/// R = | 1-2(y²+z²)   2(xy-zw)    2(xz+yw)  |
///     | 2(xy+zw)     1-2(x²+z²)  2(yz-xw)  |
///     | 2(xz-yw)     2(yz+xw)    1-2(x²+y²)|
///
/// The zero quaternion normalizes to zero and therefore yields the identity.
/// Callers should not read anything into that result.
pub fn map_quaternion_to_rotation_matrix(q: &Quaternion<f32>) -> RotationFrame {
    let q = normalize(&q.coords);
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);

    let xx = x * x;
    let yy = y * y;
    let zz = z * z;
    let xy = x * y;
    let xz = x * z;
    let yz = y * z;
    let xw = x * w;
    let yw = y * w;
    let zw = z * w;

    let r00 = 1.0 - 2.0 * (yy + zz);
    let r01 = 2.0 * (xy - zw);
    let r02 = 2.0 * (xz + yw);
    let r10 = 2.0 * (xy + zw);
    let r11 = 1.0 - 2.0 * (xx + zz);
    let r12 = 2.0 * (yz - xw);
    let r20 = 2.0 * (xz - yw);
    let r21 = 2.0 * (yz + xw);
    let r22 = 1.0 - 2.0 * (xx + yy);

    #[rustfmt::skip]
    let matrix = Matrix4::new(
        r00, r01, r02, 0.0,
        r10, r11, r12, 0.0,
        r20, r21, r22, 0.0,
        0.0, 0.0, 0.0, 1.0,
    );

    RotationFrame {
        matrix,
        x_axis: Vector3::new(r00, r10, r20),
        y_axis: Vector3::new(r01, r11, r21),
        z_axis: Vector3::new(r02, r12, r22),
    }
}

/// Hamilton product `q1 ⊗ q2` of the normalized operands.
///
/// Applying the result rotates by `q2` first, then by `q1`.
pub fn multiply_quaternions(q1: &Quaternion<f32>, q2: &Quaternion<f32>) -> Quaternion<f32> {
    let a = normalize(&q1.coords);
    let b = normalize(&q2.coords);

    let x = a.w * b.x + a.x * b.w + a.y * b.z - a.z * b.y;
    let y = a.w * b.y - a.x * b.z + a.y * b.w + a.z * b.x;
    let z = a.w * b.z + a.x * b.y - a.y * b.x + a.z * b.w;
    let w = a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z;

    Quaternion::from(Vector4::new(x, y, z, w))
}

/// Conjugate of the normalized quaternion: `(-x, -y, -z, w)`.
pub fn quaternion_conjugate(q: &Quaternion<f32>) -> Quaternion<f32> {
    let n = normalize(&q.coords);
    Quaternion::from(Vector4::new(-n.x, -n.y, -n.z, n.w))
}

/// Quaternion of the minimal rotation taking direction `start` onto `dest`.
///
/// Both inputs are normalized. For (nearly) antiparallel inputs the rotation
/// axis is not unique: the result is a 180° turn about `(0,0,1) × start`, or
/// about `(1,0,0) × start` when `start` lies along z.
///
/// The result is not renormalized, so two zero inputs give `(0, 0, 0, √2/2)`.
pub fn calc_rotation_between_vectors_3d(
    start: &Vector3<f32>,
    dest: &Vector3<f32>,
) -> Quaternion<f32> {
    let start = normalize(start);
    let dest = normalize(dest);

    let cos_theta = start.dot(&dest);

    if cos_theta < -1.0 + ANTIPARALLEL_EPSILON {
        let mut axis = Vector3::<f32>::z().cross(&start);
        if axis.norm_squared() < MIN_AXIS_NORM_SQUARED {
            axis = Vector3::<f32>::x().cross(&start);
        }
        tracing::trace!(cos_theta, "antiparallel vectors, rotating 180° about {:?}", axis);
        return map_axis_angle_to_quaternion(&axis, PI);
    }

    let axis = start.cross(&dest);
    let s = ((1.0 + cos_theta) * 2.0).sqrt();
    let inv_s = 1.0 / s;

    Quaternion::from(Vector4::new(
        axis.x * inv_s,
        axis.y * inv_s,
        axis.z * inv_s,
        0.5 * s,
    ))
}
