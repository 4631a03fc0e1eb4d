//! Result and Error types for mutomo-analysis

/// Type alias for Result<T, analysis::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `mutomo-analysis` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed input/output stream")]
    IOError(#[from] std::io::Error),

    #[error("failed to read analysis configuration")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Grid(#[from] mutomo_grid::Error),

    #[error(transparent)]
    Region(#[from] mutomo_region::Error),

    #[error(transparent)]
    Reduce(#[from] mutomo_reduce::Error),

    #[error("invalid analysis \"{analysis}\": {reason}")]
    InvalidConfig { analysis: String, reason: String },

    #[error("{failed} of {total} analyses failed")]
    AnalysesFailed { failed: usize, total: usize },
}

impl Error {
    /// True for a missing container, grid, table, or column
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Grid(e) => e.is_not_found(),
            Self::Reduce(e) => e.is_not_found(),
            Self::Region(mutomo_region::Error::Grid(e)) => e.is_not_found(),
            _ => false,
        }
    }
}
