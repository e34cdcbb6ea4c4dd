use std::fmt;
use thiserror::Error;

/// Unified error type for every fexec operation.
///
/// Function execution is all-or-nothing: when any stage of the adaptation
/// pipeline fails, the error propagates to the caller with `?` and no partial
/// result column is produced. Nothing in the pipeline retries.
///
/// # Thread Safety
///
/// `Error` implements `Send` and `Sync`, so a failure raised on a worker thread
/// can be handed back to whichever thread drives the enclosing query.
#[derive(Error, Debug)]
pub enum Error {
    /// Arrow library error raised by a column kernel.
    ///
    /// Column operations (take, interleave, concat, comparisons) and function
    /// bodies built on Arrow compute kernels surface their failures through
    /// this variant, e.g. a division by zero inside a modulo kernel.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// The number of supplied arguments does not match the function's arity.
    ///
    /// Raised by the arity check of non-variadic functions, and by the constant
    /// layer when every argument is pinned as constant so nothing could be
    /// unwrapped.
    #[error(
        "Number of arguments for function {function} doesn't match: passed {passed}, should be {expected}"
    )]
    ArgumentCountMismatch {
        function: String,
        passed: usize,
        expected: String,
    },

    /// A column arrived in a representation the call cannot accept.
    ///
    /// Examples are a non-constant column at an argument position the function
    /// pins as constant, or a request for rows of the `Nothing` type.
    #[error("Illegal column: {0}")]
    IllegalColumn(String),

    /// Internal invariant violation.
    ///
    /// This indicates a bug either in a function implementation (for example a
    /// body that produced no column) or in the agreement between the return-type
    /// resolver and the executor. It should never be seen during normal
    /// operation.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Columns that must line up row-for-row disagree on their length.
    #[error("Size mismatch in {context}: expected {expected} rows, got {actual}")]
    SizeMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// The requested operation is not provided by the representation or function.
    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl Error {
    /// Create an [`Error::InvariantViolation`] from any displayable message.
    ///
    /// # Examples
    ///
    /// ```
    /// use fexec_result::Error;
    ///
    /// let err = Error::invariant("empty column returned");
    /// assert!(matches!(err, Error::InvariantViolation(msg) if msg.contains("empty")));
    /// ```
    #[inline]
    pub fn invariant<E: fmt::Display>(msg: E) -> Self {
        Error::InvariantViolation(msg.to_string())
    }

    /// Create an [`Error::IllegalColumn`] from any displayable message.
    #[inline]
    pub fn illegal_column<E: fmt::Display>(msg: E) -> Self {
        Error::IllegalColumn(msg.to_string())
    }

    /// Create an [`Error::Unsupported`] from any displayable message.
    #[inline]
    pub fn unsupported<E: fmt::Display>(msg: E) -> Self {
        Error::Unsupported(msg.to_string())
    }

    /// Create an [`Error::SizeMismatch`] for the given context.
    #[inline]
    pub fn size_mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        Error::SizeMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    /// Arity failure for a function with a fixed argument count.
    #[inline]
    pub fn argument_count(function: impl Into<String>, passed: usize, expected: usize) -> Self {
        Error::ArgumentCountMismatch {
            function: function.into(),
            passed,
            expected: expected.to_string(),
        }
    }
}
