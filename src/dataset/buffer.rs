//! Typed sample buffers for the three supported element kinds.
//!
//! - [`FlatBuffer`]: what a [`Dataset`](super::Dataset) exchanges, row-major
//!   `[z][y][x]` with x fastest
//! - [`VolumeBuffer`]: a 3D array indexed `[z, y, x]`
//! - [`SliceBuffer`]: a 2D array indexed `[y, x]`

use super::ElementKind;
use crate::error::{Error, Result};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};

/// Flat samples of one element kind.
#[derive(Clone, Debug, PartialEq)]
pub enum FlatBuffer {
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    Float32(Vec<f32>),
}

/// A 3D volume indexed `[z, y, x]`.
#[derive(Clone, Debug, PartialEq)]
pub enum VolumeBuffer {
    UInt8(Array3<u8>),
    UInt16(Array3<u16>),
    Float32(Array3<f32>),
}

/// A 2D z-plane indexed `[y, x]`.
#[derive(Clone, Debug, PartialEq)]
pub enum SliceBuffer {
    UInt8(Array2<u8>),
    UInt16(Array2<u16>),
    Float32(Array2<f32>),
}

macro_rules! each_kind {
    ($value:expr, $buffer:ident, $inner:ident => $body:expr) => {
        match $value {
            $buffer::UInt8($inner) => $body,
            $buffer::UInt16($inner) => $body,
            $buffer::Float32($inner) => $body,
        }
    };
}

mod sealed {
    pub trait Sealed {}
}

/// A sample type that maps onto exactly one [`ElementKind`].
///
/// Implemented for `u8`, `u16` and `f32` only.
pub trait Element: Copy + Default + PartialEq + std::fmt::Debug + sealed::Sealed + 'static {
    const KIND: ElementKind;

    fn into_flat(data: Vec<Self>) -> FlatBuffer;
    fn into_volume(data: Array3<Self>) -> VolumeBuffer;
    fn into_slice(data: Array2<Self>) -> SliceBuffer;

    fn volume_view(buffer: &VolumeBuffer) -> Option<ArrayView3<'_, Self>>;
    fn slice_view(buffer: &SliceBuffer) -> Option<ArrayView2<'_, Self>>;
    fn take_volume(buffer: VolumeBuffer) -> Option<Array3<Self>>;
}

macro_rules! impl_element {
    ($ty:ty, $variant:ident) => {
        impl sealed::Sealed for $ty {}

        impl Element for $ty {
            const KIND: ElementKind = ElementKind::$variant;

            fn into_flat(data: Vec<Self>) -> FlatBuffer {
                FlatBuffer::$variant(data)
            }

            fn into_volume(data: Array3<Self>) -> VolumeBuffer {
                VolumeBuffer::$variant(data)
            }

            fn into_slice(data: Array2<Self>) -> SliceBuffer {
                SliceBuffer::$variant(data)
            }

            fn volume_view(buffer: &VolumeBuffer) -> Option<ArrayView3<'_, Self>> {
                match buffer {
                    VolumeBuffer::$variant(a) => Some(a.view()),
                    _ => None,
                }
            }

            fn slice_view(buffer: &SliceBuffer) -> Option<ArrayView2<'_, Self>> {
                match buffer {
                    SliceBuffer::$variant(a) => Some(a.view()),
                    _ => None,
                }
            }

            fn take_volume(buffer: VolumeBuffer) -> Option<Array3<Self>> {
                match buffer {
                    VolumeBuffer::$variant(a) => Some(a),
                    _ => None,
                }
            }
        }
    };
}

impl_element!(u8, UInt8);
impl_element!(u16, UInt16);
impl_element!(f32, Float32);

impl FlatBuffer {
    pub fn kind(&self) -> ElementKind {
        match self {
            FlatBuffer::UInt8(_) => ElementKind::UInt8,
            FlatBuffer::UInt16(_) => ElementKind::UInt16,
            FlatBuffer::Float32(_) => ElementKind::Float32,
        }
    }

    pub fn len(&self) -> usize {
        each_kind!(self, FlatBuffer, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Zero-filled buffer of `len` samples.
    pub fn zeros(kind: ElementKind, len: usize) -> Self {
        match kind {
            ElementKind::UInt8 => FlatBuffer::UInt8(vec![0; len]),
            ElementKind::UInt16 => FlatBuffer::UInt16(vec![0; len]),
            ElementKind::Float32 => FlatBuffer::Float32(vec![0.0; len]),
        }
    }

    /// Reshape into a `[z, y, x]` volume.
    ///
    /// A length mismatch means the dataset did not return what was asked for
    /// and is reported as [`Error::Backend`].
    pub fn into_volume(self, shape: (usize, usize, usize)) -> Result<VolumeBuffer> {
        let expected = shape.0 * shape.1 * shape.2;
        if self.len() != expected {
            return Err(Error::Backend(format!(
                "dataset returned {} samples, expected {} for shape {:?}",
                self.len(),
                expected,
                shape
            )));
        }
        let volume = match self {
            FlatBuffer::UInt8(v) => VolumeBuffer::UInt8(reshape3(v, shape)?),
            FlatBuffer::UInt16(v) => VolumeBuffer::UInt16(reshape3(v, shape)?),
            FlatBuffer::Float32(v) => VolumeBuffer::Float32(reshape3(v, shape)?),
        };
        Ok(volume)
    }

    /// Reshape into a `[y, x]` slice.
    pub fn into_slice(self, shape: (usize, usize)) -> Result<SliceBuffer> {
        let volume = self.into_volume((1, shape.0, shape.1))?;
        Ok(match volume {
            VolumeBuffer::UInt8(a) => SliceBuffer::UInt8(a.index_axis_move(Axis(0), 0)),
            VolumeBuffer::UInt16(a) => SliceBuffer::UInt16(a.index_axis_move(Axis(0), 0)),
            VolumeBuffer::Float32(a) => SliceBuffer::Float32(a.index_axis_move(Axis(0), 0)),
        })
    }
}

fn reshape3<T>(data: Vec<T>, shape: (usize, usize, usize)) -> Result<Array3<T>> {
    Array3::from_shape_vec(shape, data).map_err(|e| Error::Backend(e.to_string()))
}

impl VolumeBuffer {
    pub fn kind(&self) -> ElementKind {
        match self {
            VolumeBuffer::UInt8(_) => ElementKind::UInt8,
            VolumeBuffer::UInt16(_) => ElementKind::UInt16,
            VolumeBuffer::Float32(_) => ElementKind::Float32,
        }
    }

    /// Shape as `(z, y, x)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        each_kind!(self, VolumeBuffer, a => a.dim())
    }

    /// Samples in row-major `[z][y][x]` order, whatever the memory layout.
    pub fn to_flat(&self) -> FlatBuffer {
        match self {
            VolumeBuffer::UInt8(a) => FlatBuffer::UInt8(a.iter().copied().collect()),
            VolumeBuffer::UInt16(a) => FlatBuffer::UInt16(a.iter().copied().collect()),
            VolumeBuffer::Float32(a) => FlatBuffer::Float32(a.iter().copied().collect()),
        }
    }

    /// Typed view, or `None` if `T` is not this buffer's kind.
    pub fn view<T: Element>(&self) -> Option<ArrayView3<'_, T>> {
        T::volume_view(self)
    }

    /// Typed array, or `None` if `T` is not this buffer's kind.
    pub fn into_array<T: Element>(self) -> Option<Array3<T>> {
        T::take_volume(self)
    }

    /// Copy of plane `z`, or `None` when out of range.
    pub fn plane(&self, z: usize) -> Option<SliceBuffer> {
        if z >= self.shape().0 {
            return None;
        }
        Some(match self {
            VolumeBuffer::UInt8(a) => SliceBuffer::UInt8(a.index_axis(Axis(0), z).to_owned()),
            VolumeBuffer::UInt16(a) => SliceBuffer::UInt16(a.index_axis(Axis(0), z).to_owned()),
            VolumeBuffer::Float32(a) => SliceBuffer::Float32(a.index_axis(Axis(0), z).to_owned()),
        })
    }
}

impl SliceBuffer {
    pub fn kind(&self) -> ElementKind {
        match self {
            SliceBuffer::UInt8(_) => ElementKind::UInt8,
            SliceBuffer::UInt16(_) => ElementKind::UInt16,
            SliceBuffer::Float32(_) => ElementKind::Float32,
        }
    }

    /// Shape as `(y, x)`.
    pub fn shape(&self) -> (usize, usize) {
        each_kind!(self, SliceBuffer, a => a.dim())
    }

    /// Typed view, or `None` if `T` is not this buffer's kind.
    pub fn view<T: Element>(&self) -> Option<ArrayView2<'_, T>> {
        T::slice_view(self)
    }
}

impl<T: Element> From<Vec<T>> for FlatBuffer {
    fn from(data: Vec<T>) -> Self {
        T::into_flat(data)
    }
}

impl<T: Element> From<Array3<T>> for VolumeBuffer {
    fn from(data: Array3<T>) -> Self {
        T::into_volume(data)
    }
}

impl<T: Element> From<Array2<T>> for SliceBuffer {
    fn from(data: Array2<T>) -> Self {
        T::into_slice(data)
    }
}

/// A `[y, x]` slice becomes a `[1, y, x]` volume.
impl From<SliceBuffer> for VolumeBuffer {
    fn from(slice: SliceBuffer) -> Self {
        match slice {
            SliceBuffer::UInt8(a) => VolumeBuffer::UInt8(a.insert_axis(Axis(0))),
            SliceBuffer::UInt16(a) => VolumeBuffer::UInt16(a.insert_axis(Axis(0))),
            SliceBuffer::Float32(a) => VolumeBuffer::Float32(a.insert_axis(Axis(0))),
        }
    }
}
