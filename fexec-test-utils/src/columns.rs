//! Builders and readers for the column shapes tests use most.

use std::sync::Arc;

use arrow::array::{ArrayRef, AsArray, Int64Array, StringArray};
use arrow::datatypes::{DataType as ArrowDataType, Int64Type};

use fexec_column::{Column, LowCardinalityColumn, SparseColumn};
use fexec_result::Result;
use fexec_types::DataType;

pub fn int64_type() -> DataType {
    DataType::plain(ArrowDataType::Int64)
}

pub fn utf8_type() -> DataType {
    DataType::plain(ArrowDataType::Utf8)
}

pub fn int64(values: &[i64]) -> Column {
    Column::Full(Arc::new(Int64Array::from(values.to_vec())))
}

/// Nullable column; `None` rows are null with a default value underneath.
pub fn nullable_int64(values: &[Option<i64>]) -> Result<Column> {
    let array: ArrayRef = Arc::new(Int64Array::from(values.to_vec()));
    let column = Column::from_arrow(array)?;
    column.to_nullable()
}

pub fn const_int64(value: i64, rows: usize) -> Result<Column> {
    Column::constant(int64(&[value]), rows)
}

/// Constant `NULL` of `Nullable(Int64)`.
pub fn const_null_int64(rows: usize) -> Result<Column> {
    Column::const_default_for_type(&DataType::nullable(int64_type()), rows)
}

pub fn strings(values: &[&str]) -> Column {
    Column::Full(Arc::new(StringArray::from(values.to_vec())))
}

pub fn low_cardinality_strings(dictionary: &[&str], indexes: &[u32]) -> Result<Column> {
    let values: ArrayRef = Arc::new(StringArray::from(dictionary.to_vec()));
    Ok(Column::LowCardinality(LowCardinalityColumn::from_parts(
        values,
        indexes.to_vec(),
    )?))
}

pub fn low_cardinality_int64(dictionary: &[i64], indexes: &[u32]) -> Result<Column> {
    let values: ArrayRef = Arc::new(Int64Array::from(dictionary.to_vec()));
    Ok(Column::LowCardinality(LowCardinalityColumn::from_parts(
        values,
        indexes.to_vec(),
    )?))
}

/// Sparse column holding the non-zero rows of `dense`.
pub fn sparse_int64(dense: &[i64]) -> Result<Column> {
    let array: ArrayRef = Arc::new(Int64Array::from(dense.to_vec()));
    Ok(Column::Sparse(SparseColumn::from_full(&array)?))
}

/// Logical values of an `Int64` column of any representation.
pub fn int64_values(column: &Column) -> Result<Vec<Option<i64>>> {
    let array = column.materialize()?;
    Ok(array.as_primitive::<Int64Type>().iter().collect())
}

/// Logical values of a `Utf8` column of any representation.
pub fn string_values(column: &Column) -> Result<Vec<Option<String>>> {
    let array = column.materialize()?;
    Ok(array
        .as_string::<i32>()
        .iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Per-row null flags of any column.
pub fn null_flags(column: &Column) -> Vec<bool> {
    (0..column.len()).map(|row| column.is_null_at(row)).collect()
}
