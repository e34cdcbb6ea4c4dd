use std::sync::Arc;

use arrow::buffer::{BooleanBuffer, NullBuffer};

use fexec_result::{Error, Result};

use crate::column::Column;

/// Per-row null indicator. A set bit marks a `NULL` row.
///
/// This is the inverse of an Arrow validity bitmap; see [`NullableColumn::validity`].
pub type NullMap = BooleanBuffer;

/// A value column plus a per-row null indicator.
///
/// Rows marked null still occupy a slot in the nested column; its content
/// there is unspecified (usually the type's default).
#[derive(Clone, Debug)]
pub struct NullableColumn {
    nested: Arc<Column>,
    null_map: NullMap,
}

impl NullableColumn {
    pub fn try_new(nested: Column, null_map: NullMap) -> Result<Self> {
        match &nested {
            Column::Full(_) | Column::LowCardinality(_) | Column::Nothing(_) => {}
            other => {
                return Err(Error::invariant(format!(
                    "nullable column cannot wrap a {:?} column",
                    other.kind()
                )));
            }
        }
        if nested.len() != null_map.len() {
            return Err(Error::size_mismatch(
                "nullable column null map",
                nested.len(),
                null_map.len(),
            ));
        }
        Ok(Self {
            nested: Arc::new(nested),
            null_map,
        })
    }

    /// Wrap `nested` with no null rows.
    pub fn all_valid(nested: Column) -> Result<Self> {
        let len = nested.len();
        Self::try_new(nested, BooleanBuffer::new_unset(len))
    }

    /// Wrap `nested` with every row null.
    pub fn all_null(nested: Column) -> Result<Self> {
        let len = nested.len();
        Self::try_new(nested, BooleanBuffer::new_set(len))
    }

    #[inline]
    pub fn nested(&self) -> &Column {
        &self.nested
    }

    #[inline]
    pub fn null_map(&self) -> &NullMap {
        &self.null_map
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.null_map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_null_at(&self, index: usize) -> bool {
        self.null_map.value(index)
    }

    pub fn null_count(&self) -> usize {
        self.null_map.count_set_bits()
    }

    /// The null map expressed as an Arrow validity buffer.
    pub fn validity(&self) -> NullBuffer {
        NullBuffer::new(!&self.null_map)
    }
}

/// Build a null map from per-row flags.
pub fn null_map_from_bools(flags: &[bool]) -> NullMap {
    BooleanBuffer::from(flags)
}

/// Row-wise logical OR of two null maps.
pub fn or_null_maps(lhs: &NullMap, rhs: &NullMap) -> Result<NullMap> {
    if lhs.len() != rhs.len() {
        return Err(Error::size_mismatch(
            "null map combination",
            lhs.len(),
            rhs.len(),
        ));
    }
    Ok(lhs | rhs)
}
