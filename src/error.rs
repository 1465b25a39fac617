//! Error taxonomy for pipe operations.

use std::fmt;

/// Failure modes surfaced by [`crate::Sink`] and [`crate::Source`] operations.
///
/// None of these are ever raised as a panic; every fallible operation returns
/// one of these through a `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipeError {
    /// The operation was invoked on an endpoint that is already closed.
    Closed,
    /// A write (or a flush covering buffered bytes) cannot succeed because
    /// the source side has closed.
    SourceClosed,
    /// A blocking wait exceeded the endpoint's deadline.
    Timeout,
    /// The endpoint was interrupted while waiting.
    Interrupted,
    /// [`crate::Source::fold`] was attempted while its preconditions were
    /// violated.
    IllegalState(&'static str),
}

impl fmt::Display for PipeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "endpoint is closed"),
            Self::SourceClosed => write!(f, "source is closed"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::Interrupted => write!(f, "operation was interrupted"),
            Self::IllegalState(reason) => write!(f, "illegal state: {reason}"),
        }
    }
}

impl std::error::Error for PipeError {}

pub type PipeResult<T> = Result<T, PipeError>;
