//! RGBA packing between `[0, 1]` float vectors and 32-bit scalars.
//!
//! Layout is little-endian bytes `R | G << 8 | B << 16 | A << 24`. The packing
//! math is done on `u32`, but the value travels as `i32` with the same bit
//! pattern. Alpha sits in the top byte, so any alpha ≥ 128/255 sets the sign
//! bit: converting with a value-preserving cast instead of a bit
//! reinterpretation would corrupt alpha while leaving R, G, B intact.

use crate::error::{Error, Result};

/// A packed RGBA word, accepted either as the signed exchange value or as
/// the raw unsigned word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PackedRgba(u32);

impl PackedRgba {
    /// The raw unsigned word.
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// The signed exchange value (same bits).
    pub fn as_i32(self) -> i32 {
        i32::from_le_bytes(self.0.to_le_bytes())
    }
}

impl From<i32> for PackedRgba {
    fn from(value: i32) -> Self {
        Self(u32::from_le_bytes(value.to_le_bytes()))
    }
}

impl From<u32> for PackedRgba {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Pack an `[R, G, B, A]` vector with components in `[0, 1]` into the
/// signed 32-bit exchange value.
///
/// Each component is scaled by 255 and rounded to the nearest integer.
pub fn vector_to_scalar(rgba: &[f32]) -> Result<i32> {
    if rgba.len() != 4 {
        return Err(Error::InvalidArgument(format!(
            "RGBA vector must have 4 elements, got {}",
            rgba.len()
        )));
    }
    // NaN fails the range check as well
    if let Some(bad) = rgba.iter().find(|c| !(0.0..=1.0).contains(*c)) {
        return Err(Error::InvalidArgument(format!(
            "RGBA components must lie in [0, 1], got {bad}"
        )));
    }

    let mut bytes = [0u8; 4];
    for (byte, component) in bytes.iter_mut().zip(rgba) {
        *byte = (component * 255.0).round() as u8;
    }

    Ok(PackedRgba(u32::from_le_bytes(bytes)).as_i32())
}

/// Unpack a 32-bit RGBA word into `[R, G, B, A]` with components in `[0, 1]`.
pub fn scalar_to_vector(scalar: impl Into<PackedRgba>) -> [f32; 4] {
    let bytes = scalar.into().as_u32().to_le_bytes();
    bytes.map(|b| f32::from(b) / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_white_is_minus_one() {
        assert_eq!(vector_to_scalar(&[1.0, 1.0, 1.0, 1.0]).unwrap(), -1);
    }

    #[test]
    fn test_byte_order_is_little_endian() {
        // R in the low byte, A in the high byte
        assert_eq!(vector_to_scalar(&[1.0, 0.0, 0.0, 0.0]).unwrap(), 0x0000_00FF);
        assert_eq!(vector_to_scalar(&[0.0, 1.0, 0.0, 0.0]).unwrap(), 0x0000_FF00);
        assert_eq!(vector_to_scalar(&[0.0, 0.0, 1.0, 0.0]).unwrap(), 0x00FF_0000);
    }

    #[test]
    fn test_signed_and_unsigned_inputs_agree() {
        let signed = vector_to_scalar(&[1.0, 0.0, 1.0, 1.0]).unwrap();
        assert!(signed < 0);
        let unsigned = PackedRgba::from(signed).as_u32();
        assert_eq!(unsigned, 0xFFFF_00FF);
        assert_eq!(scalar_to_vector(signed), scalar_to_vector(unsigned));
    }

    #[test]
    fn test_rounds_to_nearest() {
        // 0.5 * 255 = 127.5 rounds away from zero
        let packed = PackedRgba::from(vector_to_scalar(&[0.5, 0.0, 0.0, 0.0]).unwrap());
        assert_eq!(packed.as_u32() & 0xFF, 128);
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert!(matches!(
            vector_to_scalar(&[1.0, 0.0, 0.0]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_and_nan() {
        assert!(vector_to_scalar(&[1.1, 0.0, 0.0, 0.0]).is_err());
        assert!(vector_to_scalar(&[0.0, -0.01, 0.0, 0.0]).is_err());
        assert!(vector_to_scalar(&[0.0, 0.0, f32::NAN, 0.0]).is_err());
    }
}
