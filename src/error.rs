//! Unified error handling for the trail-discovery library.
//!
//! Fatal conditions (bad configuration, structurally invalid input) are returned
//! as [`DiscoveryError`]. Per-trail and per-slice problems are absorbed by the
//! matcher and surfaced as [`crate::DiscoveryWarning`] values instead.

use std::fmt;

/// Unified error type for trail-discovery operations.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryError {
    /// Sub-path extraction was asked for an inverted or out-of-range slice
    Geometry { message: String },
    /// Trail has too few valid positions to be segmented
    DegenerateInput {
        trail_id: String,
        point_count: usize,
        minimum_required: usize,
    },
    /// Input data has the wrong shape (missing geometry, bad coordinates, ...)
    InvalidInput { message: String },
    /// Configuration error
    ConfigError { message: String },
    /// JSON could not be parsed
    Json { message: String },
    /// File could not be read or written
    Io { message: String },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryError::Geometry { message } => {
                write!(f, "Geometry error: {}", message)
            }
            DiscoveryError::DegenerateInput {
                trail_id,
                point_count,
                minimum_required,
            } => {
                write!(
                    f,
                    "Trail '{}' has {} points, minimum {} required",
                    trail_id, point_count, minimum_required
                )
            }
            DiscoveryError::InvalidInput { message } => {
                write!(f, "Invalid input: {}", message)
            }
            DiscoveryError::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            DiscoveryError::Json { message } => {
                write!(f, "JSON error: {}", message)
            }
            DiscoveryError::Io { message } => {
                write!(f, "I/O error: {}", message)
            }
        }
    }
}

impl std::error::Error for DiscoveryError {}

impl DiscoveryError {
    /// Attach a trail id to a degenerate-input error; other variants pass through.
    pub fn with_trail_id(self, id: &str) -> Self {
        match self {
            DiscoveryError::DegenerateInput {
                point_count,
                minimum_required,
                ..
            } => DiscoveryError::DegenerateInput {
                trail_id: id.to_string(),
                point_count,
                minimum_required,
            },
            other => other,
        }
    }
}

impl From<serde_json::Error> for DiscoveryError {
    fn from(err: serde_json::Error) -> Self {
        DiscoveryError::Json {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for DiscoveryError {
    fn from(err: std::io::Error) -> Self {
        DiscoveryError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type alias for trail-discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Extension trait for converting Option to DiscoveryError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an invalid input error.
    fn ok_or_invalid_input(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_invalid_input(self, message: &str) -> Result<T> {
        self.ok_or_else(|| DiscoveryError::InvalidInput {
            message: message.to_string(),
        })
    }
}
