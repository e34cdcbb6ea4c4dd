//! Default values of plain Arrow types.
//!
//! The default of a plain type is its zero-filled representation: `0` for
//! numbers and temporal types, the empty string or binary, and `false`. Sparse
//! columns leave these values implicit and dictionaries may be padded with them.

use arrow::array::{Array, ArrayRef, BooleanArray, Scalar, make_array, new_null_array};
use arrow::compute::kernels::cmp;
use arrow::datatypes::DataType;

use fexec_result::Result;

/// Build an array of `len` default values of `data_type`.
///
/// A null array of any fixed-layout type is backed by zeroed buffers; dropping
/// its validity buffer turns every slot into the type's default value.
///
/// # Examples
///
/// ```
/// use arrow::array::{Array, AsArray};
/// use arrow::datatypes::{DataType, Int64Type};
/// use fexec_column::defaults::default_array;
///
/// let zeros = default_array(&DataType::Int64, 3).unwrap();
/// assert_eq!(zeros.null_count(), 0);
/// assert_eq!(zeros.as_primitive::<Int64Type>().values().as_ref(), &[0, 0, 0]);
///
/// let empty = default_array(&DataType::Utf8, 1).unwrap();
/// assert_eq!(empty.as_string::<i32>().value(0), "");
/// ```
pub fn default_array(data_type: &DataType, len: usize) -> Result<ArrayRef> {
    let data = new_null_array(data_type, len)
        .to_data()
        .into_builder()
        .nulls(None)
        .build()?;
    Ok(make_array(data))
}

/// Boolean mask that is `true` wherever `array` holds the default value.
pub fn default_mask(array: &ArrayRef) -> Result<BooleanArray> {
    let default = Scalar::new(default_array(array.data_type(), 1)?);
    Ok(cmp::eq(array, &default)?)
}

/// Whether row `index` of `array` holds the default value.
pub fn is_default_at(array: &ArrayRef, index: usize) -> Result<bool> {
    let row = array.slice(index, 1);
    let mask = default_mask(&row)?;
    Ok(mask.is_valid(0) && mask.value(0))
}

/// Number of rows of `array` holding the default value.
pub fn count_default_rows(array: &ArrayRef) -> Result<usize> {
    Ok(default_mask(array)?.true_count())
}
