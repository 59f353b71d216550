use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error types for the partflat library.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Invalid arguments or missing preconditions, detected before any
    /// filesystem side effect.
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Detailed error message
        message: String,
    },

    /// A partition directory name does not carry the expected
    /// underscore-delimited timestamp segment.
    #[error("Malformed partition directory name '{name}': {reason}")]
    MalformedName {
        /// The offending directory name
        name: String,
        /// Reason why it's malformed
        reason: String,
    },

    /// More than one qualifying part file found in a single partition
    /// directory. Treated as a hard inconsistency in the upstream job
    /// output; aborts the whole run.
    #[error("Too many part files in '{path}': found {count}, expected at most 1")]
    AmbiguousPartition {
        /// Partition directory holding the conflicting files
        path: PathBuf,
        /// Number of qualifying files found
        count: usize,
    },

    /// IO error with context about the file path.
    #[error("IO error accessing '{path}': {message}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// A message sink rejected a payload.
    #[error("Failed to send to topic '{topic}': {message}")]
    Send {
        /// Destination topic
        topic: String,
        /// Error message reported by the sink
        message: String,
    },
}

impl Error {
    /// Creates an IO error with path context.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a malformed name error.
    #[must_use]
    pub fn malformed_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedName {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an ambiguous partition error.
    #[must_use]
    pub fn ambiguous_partition(path: impl Into<PathBuf>, count: usize) -> Self {
        Self::AmbiguousPartition {
            path: path.into(),
            count,
        }
    }

    /// Creates a send error for the given topic.
    #[must_use]
    pub fn send(topic: impl Into<String>, source: crate::publish::SendError) -> Self {
        Self::Send {
            topic: topic.into(),
            message: source.to_string(),
        }
    }

    /// Returns true if this is an IO error.
    #[must_use]
    pub const fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Returns true if this is an invalid input error.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput { .. })
    }

    /// Returns true if this is an ambiguous partition error.
    #[must_use]
    pub const fn is_ambiguous_partition(&self) -> bool {
        matches!(self, Self::AmbiguousPartition { .. })
    }
}
