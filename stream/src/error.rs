use std::fmt;

/// Unified error type for pipeline operations.
///
/// Every failure is a local precondition violation surfaced immediately to
/// the caller; there is nothing to retry or recover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A terminal aggregation (`min`, `max`) was invoked on a sequence that
    /// produced no elements.
    EmptySequence { operation: &'static str },

    /// An operation received an argument outside its valid domain, e.g. a
    /// zero chunk size.
    InvalidArgument {
        operation: &'static str,
        message: String,
    },
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::EmptySequence { operation } => {
                write!(f, "{operation} called on an empty sequence")
            }
            StreamError::InvalidArgument { operation, message } => {
                write!(f, "invalid argument to {operation}: {message}")
            }
        }
    }
}

impl std::error::Error for StreamError {}
