//! Result and Error types for mutomo-reduce

/// Type alias for Result<T, reduce::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `mutomo-reduce` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed serde JSON operation")]
    Json(#[from] serde_json::Error),

    #[error("failed CSV operation")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Grid(#[from] mutomo_grid::Error),

    #[error(transparent)]
    Region(#[from] mutomo_region::Error),

    #[error("distributions have different binning ({expected} vs {found})")]
    BinningMismatch { expected: String, found: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// True for a missing container, grid, table, or column
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Grid(e) => e.is_not_found(),
            Self::Region(mutomo_region::Error::Grid(e)) => e.is_not_found(),
            _ => false,
        }
    }
}
