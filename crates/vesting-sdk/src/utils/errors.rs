use std::time::Duration;

use thiserror::Error;
use vesting_common::MathError;

pub type SdkResult<T> = std::result::Result<T, SdkError>;

#[derive(Debug, Error)]
pub enum SdkError {
    // -------------------------------------------------------------------------- //
    //                                   CODEC                                    //
    // -------------------------------------------------------------------------- //
    #[error("Malformed {kind} account: {reason}")]
    MalformedAccount { kind: &'static str, reason: String },
    #[error("Unsupported discriminator {0:?}")]
    UnsupportedDiscriminator([u8; 8]),
    #[error("{field} is {len} bytes long but only {capacity} bytes fit")]
    InputTooLong { field: &'static str, len: usize, capacity: usize },

    // -------------------------------------------------------------------------- //
    //                                 VALIDATION                                 //
    // -------------------------------------------------------------------------- //
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    // -------------------------------------------------------------------------- //
    //                                   REMOTE                                   //
    // -------------------------------------------------------------------------- //
    #[error("Account {0} not found")]
    AccountNotFound(String),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl SdkError {
    pub(crate) fn malformed(kind: &'static str, reason: impl ToString) -> Self {
        Self::MalformedAccount { kind, reason: reason.to_string() }
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameter(reason.into())
    }
}

impl From<MathError> for SdkError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::Overflow => Self::ArithmeticOverflow,
            other => Self::InvalidParameter(other.to_string()),
        }
    }
}

/// The structured part of a program failure reported by a node: the failing module (a program id on Solana, a
/// `<address>::<module>` path on Aptos) and the numeric code it aborted with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawProgramError {
    pub module: String,
    pub code: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("Transaction rejected: {message}")]
    Rejected { message: String, program_error: Option<RawProgramError> },
    #[error("Transaction not confirmed within {0:?}")]
    Timeout(Duration),
    #[error("Transport failure: {0}")]
    Transport(String),
}

impl SubmissionError {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected { message: message.into(), program_error: None }
    }

    pub fn message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
