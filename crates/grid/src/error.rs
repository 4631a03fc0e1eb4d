//! Result and Error types for mutomo-grid

use std::path::PathBuf;

/// Type alias for Result<T, grid::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `mutomo-grid` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("vtkio error")]
    VtkioError(#[from] vtkio::Error),

    #[error("failed binary (de)serialization")]
    FailedBinaryOp(#[from] Box<bincode::ErrorKind>),

    #[error("failed serde JSON operation")]
    Json(#[from] serde_json::Error),

    #[error("failed CSV operation")]
    Csv(#[from] csv::Error),

    #[error("invalid axis bin edges ({0})")]
    InvalidAxis(#[from] mutomo_utils::Error),

    #[error("container {path:?} could not be opened")]
    ContainerNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("grid \"{name}\" not found")]
    GridNotFound { name: String },

    #[error("table \"{name}\" not found")]
    TableNotFound { name: String },

    #[error("column \"{name}\" not found")]
    ColumnNotFound { name: String },

    #[error("grid shapes differ (expected {expected:?}, found {found:?})")]
    DimensionMismatch {
        expected: [usize; 3],
        found: [usize; 3],
    },

    #[error("inconsistent number of voxels (expected {expected}, found {found})")]
    UnexpectedNumberOfVoxels { expected: usize, found: usize },

    #[error("column \"{name}\" has {found} rows, table has {expected}")]
    UnequalColumnLength {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("no grids provided for conversion")]
    NothingToConvert,

    #[error("voxel {bin:?} outside grid of shape {shape:?}")]
    OutOfBounds { bin: [usize; 3], shape: [usize; 3] },
}

impl Error {
    /// True for any of the "missing input" variants
    ///
    /// Missing containers, grids, tables, and columns are the expected way for
    /// a single analysis to fail, and callers usually report and move on.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ContainerNotFound { .. }
                | Self::GridNotFound { .. }
                | Self::TableNotFound { .. }
                | Self::ColumnNotFound { .. }
        )
    }
}
