//! The [`Column`] value passed into and out of function execution.
//!
//! Columns are immutable and cheap to clone; every variant shares its buffers
//! through `Arc`. Operations that change a column's shape return a new column
//! and leave the receiver untouched.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, BooleanBufferBuilder, NullArray, UInt32Array,
    UInt64Array, make_array,
};
use arrow::compute::{concat, interleave as interleave_arrays};

use fexec_result::{Error, Result};
use fexec_types::DataType;

use crate::constant::ConstColumn;
use crate::defaults::{count_default_rows, default_array, default_mask, is_default_at};
use crate::low_cardinality::{LowCardinalityColumn, UniqueDictionary, UniqueDictionaryBuilder};
use crate::nullable::{NullMap, NullableColumn};
use crate::sparse::SparseColumn;

/// Which storage representation a column uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Full,
    Nothing,
    Const,
    Nullable,
    LowCardinality,
    Sparse,
}

/// Column of the empty type. Only its row count is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NothingColumn {
    len: usize,
}

impl NothingColumn {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A column in one of the representations the executor adapts between.
#[derive(Clone, Debug)]
pub enum Column {
    /// Plain Arrow array. Never carries an Arrow validity buffer.
    Full(ArrayRef),
    Nothing(NothingColumn),
    Const(ConstColumn),
    Nullable(NullableColumn),
    LowCardinality(LowCardinalityColumn),
    Sparse(SparseColumn),
}

impl Column {
    /// Wrap a plain Arrow array, rejecting arrays that contain nulls.
    pub fn full(array: ArrayRef) -> Result<Self> {
        if array.null_count() > 0 {
            return Err(Error::illegal_column(
                "full columns cannot contain nulls; wrap them as nullable",
            ));
        }
        Ok(Column::Full(strip_validity(array)?))
    }

    /// Convert an arbitrary Arrow array, moving its validity into a nullable wrapper.
    pub fn from_arrow(array: ArrayRef) -> Result<Self> {
        if array.data_type() == &arrow::datatypes::DataType::Null {
            return Ok(Column::Nullable(NullableColumn::all_null(Column::nothing(
                array.len(),
            ))?));
        }
        match array.logical_nulls() {
            Some(validity) if validity.null_count() > 0 => {
                let null_map = !validity.inner();
                let nested = Column::Full(strip_validity(array)?);
                Ok(Column::Nullable(NullableColumn::try_new(nested, null_map)?))
            }
            _ => Ok(Column::Full(strip_validity(array)?)),
        }
    }

    #[inline]
    pub fn nothing(len: usize) -> Self {
        Column::Nothing(NothingColumn { len })
    }

    /// Broadcast the one-row `data` to `len` rows.
    pub fn constant(data: Column, len: usize) -> Result<Self> {
        Ok(Column::Const(ConstColumn::try_new(data, len)?))
    }

    pub fn nullable(nested: Column, null_map: NullMap) -> Result<Self> {
        Ok(Column::Nullable(NullableColumn::try_new(nested, null_map)?))
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Column::Full(_) => ColumnKind::Full,
            Column::Nothing(_) => ColumnKind::Nothing,
            Column::Const(_) => ColumnKind::Const,
            Column::Nullable(_) => ColumnKind::Nullable,
            Column::LowCardinality(_) => ColumnKind::LowCardinality,
            Column::Sparse(_) => ColumnKind::Sparse,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Column::Full(array) => array.len(),
            Column::Nothing(c) => c.len(),
            Column::Const(c) => c.len(),
            Column::Nullable(c) => c.len(),
            Column::LowCardinality(c) => c.len(),
            Column::Sparse(c) => c.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_const(&self) -> bool {
        matches!(self, Column::Const(_))
    }

    #[inline]
    pub fn is_nullable(&self) -> bool {
        matches!(self, Column::Nullable(_))
    }

    #[inline]
    pub fn is_low_cardinality(&self) -> bool {
        matches!(self, Column::LowCardinality(_))
    }

    #[inline]
    pub fn is_sparse(&self) -> bool {
        matches!(self, Column::Sparse(_))
    }

    #[inline]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Column::Nothing(_))
    }

    pub fn as_full(&self) -> Option<&ArrayRef> {
        match self {
            Column::Full(array) => Some(array),
            _ => None,
        }
    }

    pub fn as_const(&self) -> Option<&ConstColumn> {
        match self {
            Column::Const(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_nullable(&self) -> Option<&NullableColumn> {
        match self {
            Column::Nullable(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_low_cardinality(&self) -> Option<&LowCardinalityColumn> {
        match self {
            Column::LowCardinality(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_sparse(&self) -> Option<&SparseColumn> {
        match self {
            Column::Sparse(c) => Some(c),
            _ => None,
        }
    }

    /// Take the plain array out of a full column.
    pub fn into_full(self) -> Result<ArrayRef> {
        match self {
            Column::Full(array) => Ok(array),
            other => Err(Error::invariant(format!(
                "expected a full column, found {:?}",
                other.kind()
            ))),
        }
    }

    /// Whether row `index` is `NULL`.
    pub fn is_null_at(&self, index: usize) -> bool {
        match self {
            Column::Nullable(c) => c.is_null_at(index),
            Column::Const(c) => c.data().is_null_at(0),
            _ => false,
        }
    }

    /// True when every row is `NULL`.
    pub fn only_null(&self) -> bool {
        match self {
            Column::Const(c) => c.data().is_null_at(0),
            Column::Nullable(c) => c.null_count() == c.len(),
            _ => false,
        }
    }

    /// Whether row `index` holds its type's default (`NULL` for nullable columns).
    pub fn is_default_at(&self, index: usize) -> Result<bool> {
        match self {
            Column::Full(array) => is_default_at(array, index),
            Column::Nothing(_) => Ok(true),
            Column::Const(c) => c.data().is_default_at(0),
            Column::Nullable(c) => Ok(c.is_null_at(index)),
            Column::LowCardinality(c) => is_default_at(c.dictionary().values(), c.index_at(index)),
            Column::Sparse(c) => match c.value_index(index) {
                0 => Ok(true),
                pos => is_default_at(c.values(), pos),
            },
        }
    }

    /// Number of rows holding their type's default.
    pub fn number_of_default_rows(&self) -> Result<usize> {
        match self {
            Column::Full(array) => count_default_rows(array),
            Column::Nothing(c) => Ok(c.len()),
            Column::Const(c) => {
                if !c.is_empty() && c.data().is_default_at(0)? {
                    Ok(c.len())
                } else {
                    Ok(0)
                }
            }
            Column::Nullable(c) => Ok(c.null_count()),
            Column::LowCardinality(c) => {
                let mask = default_mask(c.dictionary().values())?;
                Ok(c.indexes()
                    .values()
                    .iter()
                    .filter(|ix| mask.value(**ix as usize))
                    .count())
            }
            Column::Sparse(c) => {
                let stored = c.values().slice(1, c.values().len() - 1);
                Ok(c.number_of_default_rows() + count_default_rows(&stored)?)
            }
        }
    }

    /// Rows `offset..offset + len` as a new column.
    pub fn slice(&self, offset: usize, len: usize) -> Result<Column> {
        if offset + len > self.len() {
            return Err(Error::size_mismatch("column slice", self.len(), offset + len));
        }
        Ok(match self {
            Column::Full(array) => Column::Full(array.slice(offset, len)),
            Column::Nothing(_) => Column::nothing(len),
            Column::Const(c) => Column::Const(c.with_len(len)),
            Column::Nullable(c) => Column::nullable(
                c.nested().slice(offset, len)?,
                c.null_map().slice(offset, len),
            )?,
            Column::LowCardinality(c) => Column::LowCardinality(c.slice(offset, len)),
            Column::Sparse(c) => {
                let offsets = c.offsets().values();
                let lo = offsets.partition_point(|o| (*o as usize) < offset);
                let hi = offsets.partition_point(|o| (*o as usize) < offset + len);
                let shifted = UInt64Array::from_iter_values(
                    offsets[lo..hi].iter().map(|o| *o - offset as u64),
                );
                let values = concat(&[
                    c.values().slice(0, 1).as_ref(),
                    c.values().slice(lo + 1, hi - lo).as_ref(),
                ])?;
                Column::Sparse(SparseColumn::try_new(values, shifted, len)?)
            }
        })
    }

    /// Copy with exactly `len` rows: truncated, or padded with default rows.
    ///
    /// Constants only change their broadcast count, and nullable columns pad
    /// with `NULL`.
    pub fn clone_resized(&self, len: usize) -> Result<Column> {
        let current = self.len();
        if len <= current {
            if let Column::Const(c) = self {
                return Ok(Column::Const(c.with_len(len)));
            }
            return self.slice(0, len);
        }
        let extra = len - current;
        Ok(match self {
            Column::Full(array) => Column::Full(concat(&[
                array.as_ref(),
                default_array(array.data_type(), extra)?.as_ref(),
            ])?),
            Column::Nothing(_) => Column::nothing(len),
            Column::Const(c) => Column::Const(c.with_len(len)),
            Column::Nullable(c) => {
                let mut null_map = BooleanBufferBuilder::new(len);
                null_map.append_buffer(c.null_map());
                null_map.append_n(extra, true);
                Column::nullable(c.nested().clone_resized(len)?, null_map.finish())?
            }
            Column::LowCardinality(c) => {
                let values = c.dictionary().values();
                let mut builder = UniqueDictionaryBuilder::new(values.data_type())?;
                builder.insert_range_from(values, 0, values.len())?;
                let default = default_array(values.data_type(), 1)?;
                let default_index = builder.insert_range_from(&default, 0, 1)?.value(0);
                let indexes = c
                    .indexes()
                    .values()
                    .iter()
                    .copied()
                    .chain(std::iter::repeat_n(default_index, extra));
                Column::LowCardinality(LowCardinalityColumn::try_new(
                    Arc::new(builder.finish()?),
                    UInt32Array::from_iter_values(indexes),
                )?)
            }
            Column::Sparse(c) => Column::Sparse(c.resized(len)?),
        })
    }

    /// Expand a constant into a non-constant column; other columns are returned as is.
    pub fn convert_to_full_if_const(&self) -> Result<Column> {
        match self {
            Column::Const(c) => c.to_full(),
            other => Ok(other.clone()),
        }
    }

    /// Replace dictionary encoding by expanded values, looking through
    /// constant and nullable wrappers.
    pub fn remove_low_cardinality(&self) -> Result<Column> {
        match self {
            Column::LowCardinality(c) => Ok(Column::Full(c.to_full()?)),
            Column::Nullable(c) if c.nested().is_low_cardinality() => Column::nullable(
                c.nested().remove_low_cardinality()?,
                c.null_map().clone(),
            ),
            Column::Const(c) if c.data().contains_low_cardinality() => {
                Column::constant(c.data().remove_low_cardinality()?, c.len())
            }
            other => Ok(other.clone()),
        }
    }

    fn contains_low_cardinality(&self) -> bool {
        match self {
            Column::LowCardinality(_) => true,
            Column::Nullable(c) => c.nested().is_low_cardinality(),
            Column::Const(c) => c.data().contains_low_cardinality(),
            _ => false,
        }
    }

    /// Scatter a sparse column into a full one; other columns are returned as is.
    pub fn remove_sparse(&self) -> Result<Column> {
        match self {
            Column::Sparse(c) => Ok(Column::Full(c.to_full()?)),
            other => Ok(other.clone()),
        }
    }

    /// Wrap in a nullable column with no null rows, unless already nullable.
    pub fn to_nullable(&self) -> Result<Column> {
        match self {
            Column::Nullable(_) => Ok(self.clone()),
            Column::Const(c) => Column::constant(c.data().to_nullable()?, c.len()),
            Column::Sparse(_) => self.remove_sparse()?.to_nullable(),
            other => Ok(Column::Nullable(NullableColumn::all_valid(other.clone())?)),
        }
    }

    /// Flatten every representation into one Arrow array, turning the null
    /// map into an Arrow validity buffer. Function bodies use this to reach
    /// the values of whatever columns the executor hands them.
    pub fn materialize(&self) -> Result<ArrayRef> {
        match self {
            Column::Full(array) => Ok(array.clone()),
            Column::Nothing(c) => Ok(Arc::new(NullArray::new(c.len()))),
            Column::Const(c) => c.to_full()?.materialize(),
            Column::Nullable(c) => {
                let nested = c.nested().materialize()?;
                if c.nested().is_nothing() {
                    return Ok(nested);
                }
                let data = nested
                    .to_data()
                    .into_builder()
                    .nulls(Some(c.validity()))
                    .build()?;
                Ok(make_array(data))
            }
            Column::LowCardinality(c) => c.to_full(),
            Column::Sparse(c) => c.to_full(),
        }
    }

    /// A column of `len` default values of `data_type`. For nullable types
    /// every row is `NULL`.
    pub fn default_for_type(data_type: &DataType, len: usize) -> Result<Column> {
        match data_type {
            DataType::Plain(dt) => Ok(Column::Full(default_array(dt, len)?)),
            DataType::Nothing => Ok(Column::nothing(len)),
            DataType::Nullable(inner) => Ok(Column::Nullable(NullableColumn::all_null(
                Column::default_for_type(inner, len)?,
            )?)),
            DataType::LowCardinality(inner) => match inner.as_ref() {
                DataType::Plain(dt) => {
                    let dictionary = UniqueDictionary::try_from_values(default_array(dt, 1)?)?;
                    Ok(Column::LowCardinality(LowCardinalityColumn::try_new(
                        Arc::new(dictionary),
                        UInt32Array::from(vec![0u32; len]),
                    )?))
                }
                other => Err(Error::unsupported(format!(
                    "low-cardinality column of {other}"
                ))),
            },
            DataType::Function { .. } => Err(Error::unsupported(format!(
                "default value of function type {data_type}"
            ))),
        }
    }

    /// The default value of `data_type` broadcast to `len` rows.
    pub fn const_default_for_type(data_type: &DataType, len: usize) -> Result<Column> {
        Column::constant(Column::default_for_type(data_type, 1)?, len)
    }

    /// Build a column whose row `i` is row `indices[i].1` of `columns[indices[i].0]`.
    ///
    /// Mixed representations are reconciled first: if any input is nullable the
    /// result is nullable, and constant, dictionary and sparse inputs are expanded.
    pub fn interleave(columns: &[&Column], indices: &[(usize, usize)]) -> Result<Column> {
        if columns.is_empty() {
            return Err(Error::invariant("interleave requires at least one column"));
        }
        if columns.iter().all(|c| c.is_nothing()) {
            return Ok(Column::nothing(indices.len()));
        }
        if let Some(arrays) = columns
            .iter()
            .map(|c| c.as_full().map(|a| a.as_ref()))
            .collect::<Option<Vec<&dyn Array>>>()
        {
            return Ok(Column::Full(interleave_arrays(&arrays, indices)?));
        }
        if columns.iter().any(|c| c.has_null_map()) {
            let parts = columns
                .iter()
                .map(|c| c.nullable_parts())
                .collect::<Result<Vec<_>>>()?;
            let nested: Vec<&Column> = parts.iter().map(|p| p.nested()).collect();
            let nested = Column::interleave(&nested, indices)?;
            let maps: Vec<BooleanArray> = parts
                .iter()
                .map(|p| BooleanArray::new(p.null_map().clone(), None))
                .collect();
            let map_refs: Vec<&dyn Array> = maps.iter().map(|m| m as &dyn Array).collect();
            let null_map = interleave_arrays(&map_refs, indices)?
                .as_boolean()
                .values()
                .clone();
            return Column::nullable(nested, null_map);
        }
        if columns.iter().any(|c| c.is_nothing()) {
            return Err(Error::invariant(
                "cannot interleave Nothing columns with valued columns",
            ));
        }
        let flat = columns
            .iter()
            .map(|c| c.flatten())
            .collect::<Result<Vec<_>>>()?;
        let refs: Vec<&Column> = flat.iter().collect();
        Column::interleave(&refs, indices)
    }

    /// Scatter this column's rows to dense positions.
    ///
    /// Row `offsets[i]` of the result is row `i + shift` of `self`; every other
    /// row is the single row of `default`. The result has `total_rows` rows.
    pub fn create_with_offsets(
        &self,
        offsets: &UInt64Array,
        default: &Column,
        total_rows: usize,
        shift: usize,
    ) -> Result<Column> {
        if default.len() != 1 {
            return Err(Error::size_mismatch("scatter default value", 1, default.len()));
        }
        if offsets.len() + shift > self.len() {
            return Err(Error::size_mismatch(
                "scatter source rows",
                offsets.len() + shift,
                self.len(),
            ));
        }
        let offsets = offsets.values();
        let mut indices = Vec::with_capacity(total_rows);
        let mut next = 0;
        for row in 0..total_rows {
            if next < offsets.len() && offsets[next] as usize == row {
                indices.push((1, next + shift));
                next += 1;
            } else {
                indices.push((0, 0));
            }
        }
        if next != offsets.len() {
            return Err(Error::invariant(format!(
                "scatter offsets are unsorted or exceed {total_rows} rows"
            )));
        }
        Column::interleave(&[default, self], &indices)
    }

    fn has_null_map(&self) -> bool {
        match self {
            Column::Nullable(_) => true,
            Column::Const(c) => c.data().has_null_map(),
            _ => false,
        }
    }

    fn nullable_parts(&self) -> Result<NullableColumn> {
        match self {
            Column::Nullable(c) => Ok(c.clone()),
            Column::Const(_) | Column::Sparse(_) => self.flatten()?.nullable_parts(),
            other => NullableColumn::all_valid(other.clone()),
        }
    }

    fn flatten(&self) -> Result<Column> {
        match self {
            Column::Const(c) => c.to_full(),
            Column::LowCardinality(c) => Ok(Column::Full(c.to_full()?)),
            Column::Sparse(c) => Ok(Column::Full(c.to_full()?)),
            other => Ok(other.clone()),
        }
    }
}

fn strip_validity(array: ArrayRef) -> Result<ArrayRef> {
    if array.nulls().is_none() {
        return Ok(array);
    }
    let data = array.to_data().into_builder().nulls(None).build()?;
    Ok(make_array(data))
}
