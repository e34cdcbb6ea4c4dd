use std::sync::Arc;

use fexec_result::{Error, Result};

use crate::column::Column;

/// A single logical value broadcast over `len` rows.
///
/// The value is held as a one-row column of any non-constant representation,
/// so a constant `NULL` is a one-row nullable column with its null bit set.
#[derive(Clone, Debug)]
pub struct ConstColumn {
    data: Arc<Column>,
    len: usize,
}

impl ConstColumn {
    /// Broadcast the single row of `data` to `len` rows.
    ///
    /// A constant passed as `data` is unwrapped first so constants never nest.
    pub fn try_new(data: Column, len: usize) -> Result<Self> {
        let data = match data {
            Column::Const(inner) => inner.data,
            other => Arc::new(other),
        };
        if data.len() != 1 {
            return Err(Error::size_mismatch("constant column data", 1, data.len()));
        }
        Ok(Self { data, len })
    }

    /// The one-row column holding the broadcast value.
    #[inline]
    pub fn data(&self) -> &Column {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Same value, different broadcast count. Never copies the value.
    pub fn with_len(&self, len: usize) -> Self {
        Self {
            data: Arc::clone(&self.data),
            len,
        }
    }

    /// Repeat the value into a non-constant column of `len` rows.
    pub fn to_full(&self) -> Result<Column> {
        let indices = vec![(0, 0); self.len];
        Column::interleave(&[self.data()], &indices)
    }
}
