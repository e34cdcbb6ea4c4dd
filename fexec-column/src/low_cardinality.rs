//! Dictionary-encoded ("low-cardinality") columns.
//!
//! A [`LowCardinalityColumn`] stores each distinct value once in a shared
//! [`UniqueDictionary`] and a `u32` index per row. New dictionaries are built
//! with a [`UniqueDictionaryBuilder`], which deduplicates rows through their
//! Arrow row encoding.

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, UInt32Array, new_empty_array};
use arrow::compute::{interleave, take};
use arrow::datatypes::DataType;
use arrow::row::{OwnedRow, RowConverter, SortField};
use rustc_hash::FxHashMap;

use fexec_result::{Error, Result};

/// A column of pairwise distinct values.
#[derive(Debug)]
pub struct UniqueDictionary {
    values: ArrayRef,
}

impl UniqueDictionary {
    /// Adopt `values` as a dictionary, rejecting duplicates.
    pub fn try_from_values(values: ArrayRef) -> Result<Self> {
        let mut builder = UniqueDictionaryBuilder::new(values.data_type())?;
        builder.insert_range_from(&values, 0, values.len())?;
        if builder.len() != values.len() {
            return Err(Error::invariant(format!(
                "dictionary values are not unique: {} rows, {} distinct",
                values.len(),
                builder.len()
            )));
        }
        Ok(Self { values })
    }

    #[inline]
    pub fn values(&self) -> &ArrayRef {
        &self.values
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn data_type(&self) -> &DataType {
        self.values.data_type()
    }
}

/// Mutable dictionary under construction.
///
/// Owned by a single call; positions are assigned in first-insertion order.
pub struct UniqueDictionaryBuilder {
    data_type: DataType,
    converter: RowConverter,
    positions: FxHashMap<OwnedRow, u32>,
    sources: Vec<ArrayRef>,
    picks: Vec<(usize, usize)>,
}

impl UniqueDictionaryBuilder {
    pub fn new(data_type: &DataType) -> Result<Self> {
        Ok(Self {
            data_type: data_type.clone(),
            converter: RowConverter::new(vec![SortField::new(data_type.clone())])?,
            positions: FxHashMap::default(),
            sources: Vec::new(),
            picks: Vec::new(),
        })
    }

    /// Number of distinct values inserted so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Insert rows `start..start + len` of `source` and return the dictionary
    /// position of every inserted row.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use arrow::array::{ArrayRef, StringArray};
    /// use arrow::datatypes::DataType;
    /// use fexec_column::low_cardinality::UniqueDictionaryBuilder;
    ///
    /// let values: ArrayRef = Arc::new(StringArray::from(vec!["x", "y", "x"]));
    /// let mut builder = UniqueDictionaryBuilder::new(&DataType::Utf8).unwrap();
    /// let indexes = builder.insert_range_from(&values, 0, 3).unwrap();
    /// assert_eq!(indexes.values().as_ref(), &[0, 1, 0]);
    /// assert_eq!(builder.finish().unwrap().len(), 2);
    /// ```
    pub fn insert_range_from(
        &mut self,
        source: &ArrayRef,
        start: usize,
        len: usize,
    ) -> Result<UInt32Array> {
        if source.data_type() != &self.data_type {
            return Err(Error::invariant(format!(
                "cannot insert {} values into a {} dictionary",
                source.data_type(),
                self.data_type
            )));
        }
        if start + len > source.len() {
            return Err(Error::size_mismatch(
                "dictionary insert range",
                source.len(),
                start + len,
            ));
        }

        let slice = source.slice(start, len);
        let rows = self.converter.convert_columns(&[Arc::clone(&slice)])?;
        let source_idx = self.sources.len();
        let mut used_source = false;
        let mut indexes = Vec::with_capacity(len);

        for (row_idx, row) in rows.iter().enumerate() {
            let key = row.owned();
            let position = match self.positions.get(&key) {
                Some(position) => *position,
                None => {
                    let position = u32::try_from(self.picks.len()).map_err(|_| {
                        Error::unsupported("dictionary exceeds u32::MAX distinct values")
                    })?;
                    self.picks.push((source_idx, row_idx));
                    self.positions.insert(key, position);
                    used_source = true;
                    position
                }
            };
            indexes.push(position);
        }

        if used_source {
            self.sources.push(slice);
        }
        Ok(UInt32Array::from(indexes))
    }

    pub fn finish(self) -> Result<UniqueDictionary> {
        if self.picks.is_empty() {
            return Ok(UniqueDictionary {
                values: new_empty_array(&self.data_type),
            });
        }
        let sources: Vec<&dyn Array> = self.sources.iter().map(|a| a.as_ref()).collect();
        let values = interleave(&sources, &self.picks)?;
        Ok(UniqueDictionary { values })
    }
}

/// A dictionary together with indexes into it, not yet wrapped as a column.
#[derive(Clone, Debug)]
pub struct DictionaryEncoded {
    pub dictionary: ArrayRef,
    pub indexes: UInt32Array,
}

/// Dictionary-encoded column: shared unique values plus one index per row.
#[derive(Clone, Debug)]
pub struct LowCardinalityColumn {
    dictionary: Arc<UniqueDictionary>,
    indexes: UInt32Array,
}

impl LowCardinalityColumn {
    pub fn try_new(dictionary: Arc<UniqueDictionary>, indexes: UInt32Array) -> Result<Self> {
        if indexes.null_count() > 0 {
            return Err(Error::invariant("dictionary indexes cannot contain nulls"));
        }
        let bound = dictionary.len();
        if let Some(bad) = indexes.values().iter().find(|ix| **ix as usize >= bound) {
            return Err(Error::invariant(format!(
                "dictionary index {bad} out of bounds for {bound} values"
            )));
        }
        Ok(Self {
            dictionary,
            indexes,
        })
    }

    /// Build from explicit dictionary values and indexes.
    pub fn from_parts(values: ArrayRef, indexes: Vec<u32>) -> Result<Self> {
        let dictionary = Arc::new(UniqueDictionary::try_from_values(values)?);
        Self::try_new(dictionary, UInt32Array::from(indexes))
    }

    /// Dictionary-encode a plain array.
    pub fn encode(values: &ArrayRef) -> Result<Self> {
        let mut builder = UniqueDictionaryBuilder::new(values.data_type())?;
        let indexes = builder.insert_range_from(values, 0, values.len())?;
        Self::try_new(Arc::new(builder.finish()?), indexes)
    }

    #[inline]
    pub fn dictionary(&self) -> &Arc<UniqueDictionary> {
        &self.dictionary
    }

    #[inline]
    pub fn indexes(&self) -> &UInt32Array {
        &self.indexes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }

    #[inline]
    pub fn data_type(&self) -> &DataType {
        self.dictionary.data_type()
    }

    #[inline]
    pub fn index_at(&self, row: usize) -> usize {
        self.indexes.value(row) as usize
    }

    pub fn slice(&self, offset: usize, len: usize) -> Self {
        Self {
            dictionary: Arc::clone(&self.dictionary),
            indexes: self.indexes.slice(offset, len),
        }
    }

    /// Expand into the full column of values.
    pub fn to_full(&self) -> Result<ArrayRef> {
        Ok(take(self.dictionary.values(), &self.indexes, None)?)
    }

    /// Re-encode rows `offset..offset + limit` against a dictionary holding only
    /// the values those rows reference, in order of first reference.
    pub fn minimal_dictionary_encoded(&self, offset: usize, limit: usize) -> Result<DictionaryEncoded> {
        if offset + limit > self.len() {
            return Err(Error::size_mismatch(
                "minimal dictionary range",
                self.len(),
                offset + limit,
            ));
        }
        let mut remap = vec![u32::MAX; self.dictionary.len()];
        let mut used: Vec<u32> = Vec::new();
        let mut indexes = Vec::with_capacity(limit);

        for &ix in self.indexes.slice(offset, limit).values().iter() {
            let slot = &mut remap[ix as usize];
            if *slot == u32::MAX {
                *slot = used.len() as u32;
                used.push(ix);
            }
            indexes.push(*slot);
        }

        let dictionary = take(self.dictionary.values(), &UInt32Array::from(used), None)?;
        Ok(DictionaryEncoded {
            dictionary,
            indexes: UInt32Array::from(indexes),
        })
    }
}
