//! Caller-owned session configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Whether caller-facing indices start at 0 or 1.
///
/// Serialized as the integer `0` or `1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IndexingStart {
    #[default]
    Zero,
    One,
}

impl IndexingStart {
    /// The first valid caller-facing index.
    pub fn offset(self) -> usize {
        match self {
            IndexingStart::Zero => 0,
            IndexingStart::One => 1,
        }
    }

    /// Convert a caller-facing index to a zero-based one.
    ///
    /// `None` when `index` is below the first valid index.
    pub fn to_zero_based(self, index: usize) -> Option<usize> {
        index.checked_sub(self.offset())
    }
}

impl TryFrom<u8> for IndexingStart {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(IndexingStart::Zero),
            1 => Ok(IndexingStart::One),
            other => Err(format!("indexing start must be 0 or 1, got {other}")),
        }
    }
}

impl From<IndexingStart> for u8 {
    fn from(start: IndexingStart) -> Self {
        start.offset() as u8
    }
}

/// Settings for a [`VolumeAccessor`](crate::dataset::VolumeAccessor) session
/// and the camera helpers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// Base of channel, timepoint, plane and voxel-origin indices.
    pub indexing_start: IndexingStart,

    /// Per-entry tolerance for reporting a camera rotation as the identity.
    pub identity_tolerance: f32,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            indexing_start: IndexingStart::Zero,
            identity_tolerance: 1e-4,
        }
    }
}

impl ConnectorConfig {
    /// One-based indices, default tolerance.
    pub fn one_based() -> Self {
        Self {
            indexing_start: IndexingStart::One,
            ..Self::default()
        }
    }

    /// Parse from TOML text; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::InvalidArgument(e.to_string()))?;
        if !(config.identity_tolerance.is_finite() && config.identity_tolerance >= 0.0) {
            return Err(Error::InvalidArgument(format!(
                "identity_tolerance must be a non-negative number, got {}",
                config.identity_tolerance
            )));
        }
        Ok(config)
    }
}
