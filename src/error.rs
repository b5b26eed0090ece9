//! Crate-wide error type.
//!
//! Every fallible operation returns [`Result`]. Degenerate numeric input
//! (zero vectors, antiparallel vectors, zero quaternions) is not an error:
//! the orientation math has documented fallbacks for those.

use crate::dataset::ElementKind;
use thiserror::Error;

/// Errors raised by the volume accessor, coordinate mapper and RGBA codec.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Wrong shape or length, or a color component outside `[0, 1]`.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Channel, timepoint, plane or box outside the dataset dimensions.
    #[error("Index out of bounds: {0}")]
    OutOfBounds(String),

    /// Buffer element kind differs from the dataset element kind.
    #[error("Element kind mismatch: dataset holds {expected}, buffer holds {found}")]
    TypeMismatch {
        expected: ElementKind,
        found: ElementKind,
    },

    /// The operation needs a loaded dataset but `sizeX == 0`.
    #[error("No dataset is loaded")]
    NoDataset,

    /// The dataset reports an element kind outside u8/u16/f32.
    #[error("Unsupported dataset element kind: {0}")]
    Unsupported(String),

    /// The external dataset or camera implementation failed.
    #[error("Dataset backend error: {0}")]
    Backend(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
