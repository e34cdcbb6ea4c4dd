use fexec_types::DataType;

use crate::column::Column;

/// One input of a function call: a column, its declared type and a name.
///
/// The declared type may carry wrappers the column does not show (a constant
/// column of `Nullable(Int64)`, say); layers consult both.
#[derive(Clone, Debug)]
pub struct Argument {
    pub column: Column,
    pub data_type: DataType,
    pub name: String,
}

impl Argument {
    pub fn new(column: Column, data_type: DataType, name: impl Into<String>) -> Self {
        Self {
            column,
            data_type,
            name: name.into(),
        }
    }

    /// Same name, new column and type.
    pub fn with_column(&self, column: Column, data_type: DataType) -> Self {
        Self {
            column,
            data_type,
            name: self.name.clone(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.column.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.column.is_empty()
    }
}
