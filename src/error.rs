//! Error types for block descriptor decoding and overlay chain lifecycle.

use thiserror::Error;

/// Result type alias using BlockError
pub type Result<T> = std::result::Result<T, BlockError>;

/// Discriminant of a BlockError, for callers that branch on the failure class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Argument,
    Allocation,
    Size,
    MalformedRecord,
}

/// Core error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockError {
    /// Missing or already-occupied handle, absent operand
    #[error("invalid argument: {0}")]
    Argument(String),

    /// Allocation refused (memory or configured budget)
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// Buffer too small for a record at the given offset
    #[error("size error: {0}")]
    Size(String),

    /// Structurally contradictory record
    #[error("malformed block descriptor record: {0}")]
    MalformedRecord(String),
}

impl BlockError {
    pub fn argument(msg: impl Into<String>) -> Self {
        BlockError::Argument(msg.into())
    }

    pub fn allocation(msg: impl Into<String>) -> Self {
        BlockError::Allocation(msg.into())
    }

    pub fn size(msg: impl Into<String>) -> Self {
        BlockError::Size(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        BlockError::MalformedRecord(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BlockError::Argument(_) => ErrorKind::Argument,
            BlockError::Allocation(_) => ErrorKind::Allocation,
            BlockError::Size(_) => ErrorKind::Size,
            BlockError::MalformedRecord(_) => ErrorKind::MalformedRecord,
        }
    }
}

impl From<std::collections::TryReserveError> for BlockError {
    fn from(e: std::collections::TryReserveError) -> Self {
        BlockError::Allocation(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(BlockError::argument("x").kind(), ErrorKind::Argument);
        assert_eq!(BlockError::allocation("x").kind(), ErrorKind::Allocation);
        assert_eq!(BlockError::size("x").kind(), ErrorKind::Size);
        assert_eq!(BlockError::malformed("x").kind(), ErrorKind::MalformedRecord);
    }

    #[test]
    fn display_carries_message() {
        let e = BlockError::size("need 32 bytes at offset 4, have 20");
        assert_eq!(e.to_string(), "size error: need 32 bytes at offset 4, have 20");
    }
}
