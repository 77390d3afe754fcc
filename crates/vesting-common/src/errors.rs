use thiserror::Error;

/// Failures of the shared amount arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("arithmetic overflow")]
    Overflow,

    #[error("invalid amount `{0}`")]
    InvalidAmount(String),

    #[error("invalid fee percentage `{0}`")]
    InvalidFeePercent(String),
}

pub type MathResult<T> = std::result::Result<T, MathError>;
