//! Error types and result definitions for fexec.
//!
//! Every crate in the workspace reports failures through the single [`Error`]
//! enum and returns [`Result<T>`]. Errors propagate upward with `?`; the
//! function executor never swallows or retries them, and no partial result is
//! returned when a call fails.
//!
//! # Error Categories
//!
//! - **Arity** ([`Error::ArgumentCountMismatch`]): wrong number of arguments
//! - **Representation** ([`Error::IllegalColumn`]): a column shape the call cannot accept
//! - **Bugs** ([`Error::InvariantViolation`]): broken contracts between components
//! - **Row counts** ([`Error::SizeMismatch`]): columns that do not line up
//! - **Kernels** ([`Error::Arrow`]): failures inside Arrow compute kernels
//! - **Capabilities** ([`Error::Unsupported`]): operations a component does not provide

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
