//! Camera capability and the display rotation derived from it.
//!
//! The camera is an external object; this crate only reads its orientation
//! quaternion and turns it into a homogeneous rotation matrix.

use crate::config::ConnectorConfig;
use crate::core::{map_quaternion_to_rotation_matrix, RotationFrame};
use crate::error::Result;
use nalgebra::{Matrix4, Quaternion};

/// Read access to a scene camera.
pub trait Camera {
    /// Raw orientation quaternion in `(x, y, z, w)` layout.
    ///
    /// Need not be normalized.
    fn orientation_quaternion(&self) -> Result<Quaternion<f32>>;
}

impl<T: Camera + ?Sized> Camera for &T {
    fn orientation_quaternion(&self) -> Result<Quaternion<f32>> {
        (**self).orientation_quaternion()
    }
}

/// Rotation matrix of the current view.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraRotation {
    /// 4×4 rotation plus its basis axes.
    pub frame: RotationFrame,

    /// True when every entry is within the configured tolerance of the
    /// identity, i.e. the camera looks straight down the dataset z axis.
    pub is_identity: bool,
}

/// Rotation matrix for the camera's current orientation.
pub fn camera_rotation_matrix(
    camera: &impl Camera,
    config: &ConnectorConfig,
) -> Result<CameraRotation> {
    let q = camera.orientation_quaternion()?;
    let frame = map_quaternion_to_rotation_matrix(&q);
    let is_identity = frame
        .matrix
        .iter()
        .zip(Matrix4::<f32>::identity().iter())
        .all(|(a, b)| (a - b).abs() <= config.identity_tolerance);

    tracing::trace!(?q, is_identity, "camera rotation");
    Ok(CameraRotation { frame, is_identity })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use approx::assert_relative_eq;
    use nalgebra::Vector4;

    struct FixedCamera(Quaternion<f32>);

    impl Camera for FixedCamera {
        fn orientation_quaternion(&self) -> Result<Quaternion<f32>> {
            Ok(self.0)
        }
    }

    struct DeadCamera;

    impl Camera for DeadCamera {
        fn orientation_quaternion(&self) -> Result<Quaternion<f32>> {
            Err(Error::Backend("connection lost".into()))
        }
    }

    #[test]
    fn test_identity_camera() {
        let camera = FixedCamera(Quaternion::identity());
        let rotation = camera_rotation_matrix(&camera, &ConnectorConfig::default()).unwrap();
        assert!(rotation.is_identity);
        assert_relative_eq!(rotation.frame.matrix, Matrix4::identity(), epsilon = 1e-6);
    }

    #[test]
    fn test_unnormalized_quaternion_is_normalized() {
        // 90° about z, scaled by 3
        let h = std::f32::consts::FRAC_1_SQRT_2 * 3.0;
        let camera = FixedCamera(Quaternion::from(Vector4::new(0.0, 0.0, h, h)));
        let rotation = camera_rotation_matrix(&camera, &ConnectorConfig::default()).unwrap();
        assert!(!rotation.is_identity);
        assert_relative_eq!(rotation.frame.x_axis, nalgebra::Vector3::<f32>::y(), epsilon = 1e-5);
    }

    #[test]
    fn test_tolerance_controls_identity_flag() {
        let tiny = Quaternion::from(Vector4::new(1e-3, 0.0, 0.0, 1.0));
        let camera = FixedCamera(tiny);
        let strict = camera_rotation_matrix(&camera, &ConnectorConfig::default()).unwrap();
        assert!(!strict.is_identity);

        let loose = ConnectorConfig {
            identity_tolerance: 1e-2,
            ..ConnectorConfig::default()
        };
        assert!(camera_rotation_matrix(&camera, &loose).unwrap().is_identity);
    }

    #[test]
    fn test_backend_error_propagates() {
        let err = camera_rotation_matrix(&DeadCamera, &ConnectorConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
    }
}
