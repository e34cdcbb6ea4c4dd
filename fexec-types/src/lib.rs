//! Logical data types shared by the fexec crates.
//!
//! [`DataType`] wraps Arrow's physical types with the storage representations
//! the function executor adapts between (nullable, low-cardinality) and the two
//! special types it must recognise (`Nothing` and function-valued types).

pub mod data_type;

pub use arrow::datatypes::DataType as ArrowDataType;
pub use data_type::DataType;
