use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    InsufficientData(String),

    #[error("Calculation error: Division by zero encountered in metric '{0}'")]
    DivisionByZero(String),

    #[error("Invalid analytics parameter: {0}")]
    InvalidParameter(String),

    #[error("An unexpected error occurred during analytics calculation: {0}")]
    InternalError(String),
}
