use std::fmt;

use arrow::datatypes::DataType as ArrowDataType;

/// Logical type of a function argument or result.
///
/// Arrow describes the physical layout of plain columns; this enum layers the
/// storage wrappers the executor understands on top of it. Composition follows
/// the column model: `Nullable` may wrap a plain, low-cardinality or `Nothing`
/// type, `LowCardinality` wraps plain types only, and constancy is a property
/// of the column rather than of the type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    /// A plain Arrow type stored as an ordinary array.
    Plain(ArrowDataType),
    /// The empty type. Columns of this type can only have zero rows.
    Nothing,
    /// Values of the inner type plus a per-row null indicator.
    Nullable(Box<DataType>),
    /// Dictionary-encoded values of the inner type.
    LowCardinality(Box<DataType>),
    /// A function-valued type (lambda arguments). Its columns expose no values.
    Function {
        arguments: Vec<DataType>,
        result: Box<DataType>,
    },
}

impl DataType {
    #[inline]
    pub fn plain(data_type: ArrowDataType) -> Self {
        DataType::Plain(data_type)
    }

    #[inline]
    pub fn nullable(inner: DataType) -> Self {
        DataType::Nullable(Box::new(inner))
    }

    #[inline]
    pub fn low_cardinality(inner: DataType) -> Self {
        DataType::LowCardinality(Box::new(inner))
    }

    pub fn function(arguments: Vec<DataType>, result: DataType) -> Self {
        DataType::Function {
            arguments,
            result: Box::new(result),
        }
    }

    /// Type of the literal `NULL`: nullable with no possible non-null value.
    #[inline]
    pub fn null() -> Self {
        DataType::nullable(DataType::Nothing)
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, DataType::Nullable(_))
    }

    /// True when every value of this type is `NULL`.
    pub fn only_null(&self) -> bool {
        matches!(self, DataType::Nullable(inner) if inner.is_nothing())
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, DataType::Nothing)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, DataType::Function { .. })
    }

    pub fn is_low_cardinality(&self) -> bool {
        matches!(self, DataType::LowCardinality(_))
    }

    /// The element type of a low-cardinality type.
    pub fn dictionary_type(&self) -> Option<&DataType> {
        match self {
            DataType::LowCardinality(inner) => Some(inner),
            _ => None,
        }
    }

    /// The Arrow type backing plain values, looking through wrappers.
    pub fn arrow_type(&self) -> Option<&ArrowDataType> {
        match self {
            DataType::Plain(dt) => Some(dt),
            DataType::Nullable(inner) | DataType::LowCardinality(inner) => inner.arrow_type(),
            DataType::Nothing | DataType::Function { .. } => None,
        }
    }

    /// Strip one `Nullable` wrapper, if present.
    pub fn remove_nullable(&self) -> DataType {
        match self {
            DataType::Nullable(inner) => inner.as_ref().clone(),
            other => other.clone(),
        }
    }

    /// Wrap in `Nullable` unless already nullable.
    pub fn make_nullable(&self) -> DataType {
        if self.is_nullable() {
            self.clone()
        } else {
            DataType::nullable(self.clone())
        }
    }

    /// Replace every `LowCardinality(T)` by `T`, recursively.
    pub fn remove_low_cardinality(&self) -> DataType {
        match self {
            DataType::LowCardinality(inner) => inner.remove_low_cardinality(),
            DataType::Nullable(inner) => DataType::nullable(inner.remove_low_cardinality()),
            DataType::Function { arguments, result } => DataType::Function {
                arguments: arguments.iter().map(DataType::remove_low_cardinality).collect(),
                result: Box::new(result.remove_low_cardinality()),
            },
            other => other.clone(),
        }
    }

    pub fn can_be_inside_nullable(&self) -> bool {
        match self {
            DataType::Plain(_) | DataType::Nothing | DataType::LowCardinality(_) => true,
            DataType::Nullable(_) | DataType::Function { .. } => false,
        }
    }

    /// Whether a dictionary may hold values of this type.
    pub fn can_be_inside_low_cardinality(&self) -> bool {
        match self {
            DataType::Plain(dt) => is_dictionary_friendly(dt),
            _ => false,
        }
    }

    /// Whether a column of this type may be stored sparsely.
    pub fn can_be_inside_sparse_columns(&self) -> bool {
        matches!(self, DataType::Plain(dt) if has_default_value(dt))
    }
}

fn is_dictionary_friendly(dt: &ArrowDataType) -> bool {
    dt.is_integer()
        || dt.is_floating()
        || dt.is_temporal()
        || matches!(
            dt,
            ArrowDataType::Boolean
                | ArrowDataType::Utf8
                | ArrowDataType::LargeUtf8
                | ArrowDataType::Binary
                | ArrowDataType::LargeBinary
                | ArrowDataType::FixedSizeBinary(_)
                | ArrowDataType::Decimal128(_, _)
        )
}

// Types whose zero-filled representation is a meaningful default value.
fn has_default_value(dt: &ArrowDataType) -> bool {
    is_dictionary_friendly(dt)
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Plain(dt) => write!(f, "{dt}"),
            DataType::Nothing => f.write_str("Nothing"),
            DataType::Nullable(inner) => write!(f, "Nullable({inner})"),
            DataType::LowCardinality(inner) => write!(f, "LowCardinality({inner})"),
            DataType::Function { arguments, result } => {
                f.write_str("Function(")?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, " -> {result})")
            }
        }
    }
}

impl From<ArrowDataType> for DataType {
    fn from(value: ArrowDataType) -> Self {
        DataType::Plain(value)
    }
}
