//! Error types for MOHID HDF5 extraction.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for extraction operations.
pub type MohidResult<T> = Result<T, MohidError>;

/// Error types for MOHID HDF5 extraction.
///
/// Every variant is terminal for the call that produced it; nothing is
/// retried and no partial result is returned.
#[derive(Error, Debug)]
pub enum MohidError {
    /// The path does not reference a readable HDF5 file
    #[error("dataset not found: '{}' ({reason})", .path.display())]
    DatasetNotFound { path: PathBuf, reason: String },

    /// Named group or member absent
    #[error("'{group}' is not a group inside the file '{}'", .path.display())]
    FieldNotFound { path: PathBuf, group: String },

    /// A required `/Grid` member is absent
    #[error("grid member '{member}' missing from '{}'", .path.display())]
    MissingGrid { path: PathBuf, member: String },

    /// A `/Time` record could not be turned into a timestamp
    #[error("malformed time record '{member}' in '{}': {reason}", .path.display())]
    MalformedTimeRecord {
        path: PathBuf,
        member: String,
        reason: String,
    },

    /// Requested layer exceeds the stored depth extent
    #[error(
        "layer {layer} out of range for '{group}': the vertical dimension of '{}' contains only {depth} layer(s)",
        .path.display()
    )]
    LayerOutOfRange {
        path: PathBuf,
        group: String,
        layer: usize,
        depth: usize,
    },

    /// Requested step exceeds the stored step count
    #[error(
        "step {step} out of range for '{group}' in '{}': {steps} step(s) stored",
        .path.display()
    )]
    StepOutOfRange {
        path: PathBuf,
        group: String,
        step: usize,
        steps: usize,
    },

    /// A per-step group holds no steps
    #[error("group '{group}' in '{}' holds no time steps", .path.display())]
    EmptyField { path: PathBuf, group: String },

    /// Arrays that must line up do not
    #[error("shape mismatch in '{}' for {what}: expected {expected:?}, found {found:?}", .path.display())]
    ShapeMismatch {
        path: PathBuf,
        what: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    /// Structure that does not follow MOHID conventions
    #[error("invalid data format: {0}")]
    InvalidFormat(String),

    /// The handle was already closed
    #[error("dataset handle for '{}' is closed", .path.display())]
    HandleClosed { path: PathBuf },

    /// Time series text file could not be parsed
    #[error("time series error at line {line}: {message}")]
    TimeSeries { line: usize, message: String },

    /// HDF5 library error
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl MohidError {
    /// Create a FieldNotFound error.
    pub fn field_not_found(path: impl Into<PathBuf>, group: impl Into<String>) -> Self {
        Self::FieldNotFound {
            path: path.into(),
            group: group.into(),
        }
    }

    /// Create a MissingGrid error.
    pub fn missing_grid(path: impl Into<PathBuf>, member: impl Into<String>) -> Self {
        Self::MissingGrid {
            path: path.into(),
            member: member.into(),
        }
    }

    /// Create an InvalidFormat error.
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}
