//! Result and Error types for mutomo-region

/// Type alias for Result<T, region::Error>
pub type Result<T> = core::result::Result<T, Error>;

/// The error type for the `mutomo-region` crate
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Grid(#[from] mutomo_grid::Error),

    #[error("invalid cut expression \"{expression}\": {reason}")]
    InvalidExpression { expression: String, reason: String },

    #[error("invalid region: {0}")]
    InvalidRegion(String),
}

impl Error {
    pub(crate) fn expression(expression: &str, reason: impl Into<String>) -> Self {
        Self::InvalidExpression {
            expression: expression.to_string(),
            reason: reason.into(),
        }
    }
}
