//! Error types for Horizon Sampler.
//!
//! Running off the end of a domain is not an error: searches and moves
//! degrade to a boundary position or [`UNDEFINED`](crate::UNDEFINED).
//! The errors below are structural and always propagated to the caller.

/// Errors that can occur while sampling.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SampleError {
    /// A bundle-addressed cell does not hold a stack of literals.
    #[error("cell at row {row}, column {column} is not a stack")]
    NotAStack { row: usize, column: usize },

    /// A localization method name could not be parsed.
    #[error("unknown localization method '{name}'")]
    UnknownMethod { name: String },

    /// The host asked an object for an operation it does not support.
    #[error("{target} has no operation '{operation}'")]
    UnknownOperation {
        target: &'static str,
        operation: String,
    },

    /// The host passed the wrong number of arguments.
    #[error("'{operation}' expects {expected} argument(s), got {got}")]
    Arity {
        operation: String,
        expected: &'static str,
        got: usize,
    },

    /// The host passed an argument of the wrong kind.
    #[error("'{operation}' expects {expected}")]
    Kind {
        operation: String,
        expected: &'static str,
    },
}

impl SampleError {
    /// Create a schema error for a bundle cell that is not a stack.
    pub fn not_a_stack(row: usize, column: usize) -> Self {
        Self::NotAStack { row, column }
    }

    /// Create an unknown-method error.
    pub fn unknown_method(name: impl Into<String>) -> Self {
        Self::UnknownMethod { name: name.into() }
    }

    /// Create an unknown-operation error.
    pub fn unknown_operation(target: &'static str, operation: impl Into<String>) -> Self {
        Self::UnknownOperation {
            target,
            operation: operation.into(),
        }
    }

    /// Create an arity error.
    pub fn arity(operation: impl Into<String>, expected: &'static str, got: usize) -> Self {
        Self::Arity {
            operation: operation.into(),
            expected,
            got,
        }
    }

    /// Create an argument-kind error.
    pub fn kind(operation: impl Into<String>, expected: &'static str) -> Self {
        Self::Kind {
            operation: operation.into(),
            expected,
        }
    }
}

/// A specialized Result type for sampling operations.
pub type Result<T> = std::result::Result<T, SampleError>;
