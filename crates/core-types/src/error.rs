use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Market data unavailable: {0}")]
    DataUnavailable(String),
}
