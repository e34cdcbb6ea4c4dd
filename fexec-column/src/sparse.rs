use arrow::array::{Array, ArrayRef, UInt64Array};
use arrow::compute::{concat, filter, not};
use arrow::datatypes::DataType;

use fexec_result::{Error, Result};

use crate::column::Column;
use crate::defaults::{default_array, default_mask};

/// A default-heavy plain column that stores only its non-default rows.
///
/// `values[0]` holds the default value and `values[i + 1]` holds the row at
/// dense position `offsets[i]`; every row not listed in `offsets` is the
/// default. Offsets are strictly increasing.
#[derive(Clone, Debug)]
pub struct SparseColumn {
    values: ArrayRef,
    offsets: UInt64Array,
    len: usize,
}

impl SparseColumn {
    pub fn try_new(values: ArrayRef, offsets: UInt64Array, len: usize) -> Result<Self> {
        if values.len() != offsets.len() + 1 {
            return Err(Error::size_mismatch(
                "sparse values (default row plus one per offset)",
                offsets.len() + 1,
                values.len(),
            ));
        }
        if offsets.null_count() > 0 || values.null_count() > 0 {
            return Err(Error::invariant("sparse column parts cannot contain nulls"));
        }
        let mut prev: Option<u64> = None;
        for &offset in offsets.values().iter() {
            if offset as usize >= len || prev.is_some_and(|p| p >= offset) {
                return Err(Error::invariant(format!(
                    "sparse offset {offset} is out of order or beyond {len} rows"
                )));
            }
            prev = Some(offset);
        }
        Ok(Self {
            values,
            offsets,
            len,
        })
    }

    /// Sparse-encode a plain array by dropping its default rows.
    pub fn from_full(array: &ArrayRef) -> Result<Self> {
        let defaults = default_mask(array)?;
        let offsets = UInt64Array::from_iter_values(defaults.iter().enumerate().filter_map(
            |(row, is_default)| match is_default {
                Some(true) => None,
                _ => Some(row as u64),
            },
        ));
        let non_default = filter(array, &not(&defaults)?)?;
        let values = concat(&[
            default_array(array.data_type(), 1)?.as_ref(),
            non_default.as_ref(),
        ])?;
        Self::try_new(values, offsets, array.len())
    }

    /// The default row followed by every non-default row.
    #[inline]
    pub fn values(&self) -> &ArrayRef {
        &self.values
    }

    /// Dense row index of each non-default value.
    #[inline]
    pub fn offsets(&self) -> &UInt64Array {
        &self.offsets
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn data_type(&self) -> &DataType {
        self.values.data_type()
    }

    /// Rows not listed in the offset map.
    #[inline]
    pub fn number_of_default_rows(&self) -> usize {
        self.len - self.offsets.len()
    }

    /// Position of dense row `row` within `values`, 0 for default rows.
    pub fn value_index(&self, row: usize) -> usize {
        match self.offsets.values().binary_search(&(row as u64)) {
            Ok(pos) => pos + 1,
            Err(_) => 0,
        }
    }

    /// Scatter the stored values back into a full array.
    pub fn to_full(&self) -> Result<ArrayRef> {
        let values = Column::Full(self.values.clone());
        let default = Column::Full(self.values.slice(0, 1));
        let full = values.create_with_offsets(&self.offsets, &default, self.len, 1)?;
        full.into_full()
    }

    /// Keep the first `len` rows, or extend with default rows.
    pub fn resized(&self, len: usize) -> Result<Self> {
        if len >= self.len {
            return Ok(Self {
                values: self.values.clone(),
                offsets: self.offsets.clone(),
                len,
            });
        }
        let kept = self.offsets.values().partition_point(|o| (*o as usize) < len);
        Self::try_new(
            self.values.slice(0, kept + 1),
            self.offsets.slice(0, kept),
            len,
        )
    }
}
