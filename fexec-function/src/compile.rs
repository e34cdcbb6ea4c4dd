//! Bridge to an external native code generator.
//!
//! The generator is reached through [`IrBuilder`], which hands out opaque
//! [`ValueId`] handles. A nullable value is an aggregate of two fields: the
//! nested value at index 0 and a boolean null flag at index 1.
//! [`compile`] strips nullable arguments into their parts, lets the function
//! generate code for the nested values, and rebuilds a nullable result whose
//! null flag is the OR of every argument's null flag, mirroring the executor's
//! null stage.

use fexec_result::Result;
use fexec_types::DataType;

use crate::function::ScalarFunction;

/// Handle to a value inside the code generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeBinaryOp {
    Add,
    Sub,
    Mul,
    And,
    Or,
}

/// The instructions the bridge and compilable functions emit.
pub trait IrBuilder {
    /// Read field `index` of an aggregate value.
    fn extract_value(&mut self, aggregate: ValueId, index: u32) -> Result<ValueId>;

    /// A copy of `aggregate` with field `index` replaced by `value`.
    fn insert_value(&mut self, aggregate: ValueId, value: ValueId, index: u32) -> Result<ValueId>;

    fn binary(&mut self, op: NativeBinaryOp, lhs: ValueId, rhs: ValueId) -> Result<ValueId>;

    /// The zero value of the native representation of `data_type`.
    fn zero_value(&mut self, data_type: &DataType) -> Result<ValueId>;
}

/// A generated value together with its logical type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueWithType {
    pub value: ValueId,
    pub data_type: DataType,
}

impl ValueWithType {
    pub fn new(value: ValueId, data_type: DataType) -> Self {
        Self { value, data_type }
    }
}

/// Argument types with one `Nullable` wrapper removed, if any argument had one.
fn remove_nullables(types: &[DataType]) -> Option<Vec<DataType>> {
    if !types.iter().any(DataType::is_nullable) {
        return None;
    }
    Some(types.iter().map(DataType::remove_nullable).collect())
}

/// Whether native code can be generated for this signature.
pub fn is_compilable(
    function: &dyn ScalarFunction,
    arguments: &[DataType],
    result_type: &DataType,
) -> bool {
    if function.capabilities().default_for_nulls
        && let Some(denulled) = remove_nullables(arguments)
    {
        return function.is_compilable_impl(&denulled, result_type);
    }
    function.is_compilable_impl(arguments, result_type)
}

/// Generate code for one call of `function`.
pub fn compile(
    function: &dyn ScalarFunction,
    builder: &mut dyn IrBuilder,
    arguments: &[ValueWithType],
    result_type: &DataType,
) -> Result<ValueId> {
    let types: Vec<DataType> = arguments.iter().map(|a| a.data_type.clone()).collect();
    let denulled = match remove_nullables(&types) {
        Some(denulled) if function.capabilities().default_for_nulls => denulled,
        _ => return function.compile_impl(builder, arguments, result_type),
    };

    let mut unwrapped = Vec::with_capacity(arguments.len());
    let mut null_flags = Vec::new();
    for (argument, nested_type) in arguments.iter().zip(denulled.iter()) {
        let value = if argument.data_type.is_nullable() {
            null_flags.push(builder.extract_value(argument.value, 1)?);
            builder.extract_value(argument.value, 0)?
        } else {
            argument.value
        };
        unwrapped.push(ValueWithType::new(value, nested_type.clone()));
    }

    let nested = function.compile_impl(builder, &unwrapped, &result_type.remove_nullable())?;

    let nullable_type = function.return_type_impl(&denulled)?.make_nullable();
    let zero = builder.zero_value(&nullable_type)?;
    let with_value = builder.insert_value(zero, nested, 0)?;
    let mut is_null = builder.extract_value(with_value, 1)?;
    for flag in null_flags {
        is_null = builder.binary(NativeBinaryOp::Or, is_null, flag)?;
    }
    builder.insert_value(with_value, is_null, 1)
}
