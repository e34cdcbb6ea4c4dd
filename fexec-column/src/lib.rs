//! Column representations consumed by function execution.
//!
//! Every column is one of a small set of storage representations built on
//! Arrow arrays:
//!
//! - [`Column::Full`]: a plain array with no validity buffer.
//! - [`Column::Nothing`]: rows of the empty type.
//! - [`Column::Const`]: one value broadcast over N rows.
//! - [`Column::Nullable`]: a value column plus a per-row null map.
//! - [`Column::LowCardinality`]: unique dictionary values plus per-row indexes.
//! - [`Column::Sparse`]: only the non-default rows plus their dense positions.
//!
//! Nullability is never encoded in Arrow validity; [`Column::from_arrow`] and
//! [`Column::materialize`] convert at the boundary.

pub mod argument;
pub mod column;
pub mod constant;
pub mod defaults;
pub mod low_cardinality;
pub mod nullable;
pub mod sparse;

pub use argument::Argument;
pub use column::{Column, ColumnKind, NothingColumn};
pub use constant::ConstColumn;
pub use low_cardinality::{
    DictionaryEncoded, LowCardinalityColumn, UniqueDictionary, UniqueDictionaryBuilder,
};
pub use nullable::{NullMap, NullableColumn, null_map_from_bools, or_null_maps};
pub use sparse::SparseColumn;
