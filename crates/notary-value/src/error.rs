use thiserror::Error;

/// Errors raised while building, serializing or parsing structured values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("malformed catalog text at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    #[error("expected attribute name starting with '$', got {0:?}")]
    ExpectedAttributeName(String),

    #[error("unterminated literal starting at byte {offset}")]
    Unterminated { offset: usize },

    #[error("invalid tag text: {0}")]
    InvalidTag(String),

    #[error("invalid version text: {0}")]
    InvalidVersion(String),

    #[error("invalid moment text: {0}")]
    InvalidMoment(String),

    #[error("invalid binary text: {0}")]
    InvalidBinary(String),

    #[error("invalid name text: {0}")]
    InvalidName(String),

    #[error("wrong value kind: expected {expected}, got {got}")]
    WrongKind { expected: &'static str, got: &'static str },

    #[error("missing attribute {0}")]
    MissingAttribute(String),

    #[error("missing parameter {0}")]
    MissingParameter(String),
}
