//! Small functions used to exercise the execution pipeline.

use std::sync::{Arc, Mutex, PoisonError};

use arrow::array::{ArrayRef, AsArray, Int64Array, StringArray};
use arrow::compute::kernels::numeric;
use arrow::datatypes::{DataType as ArrowDataType, Int64Type};

use fexec_column::{Argument, Column, ColumnKind, NullableColumn, null_map_from_bools};
use fexec_function::{
    FunctionCapabilities, IrBuilder, NativeBinaryOp, ScalarFunction, ValueId, ValueWithType,
};
use fexec_result::{Error, Result};
use fexec_types::DataType;

use crate::columns::{int64, int64_type, utf8_type};

fn expect_types(function: &str, arguments: &[DataType], expected: &DataType) -> Result<()> {
    match arguments.iter().find(|t| *t != expected) {
        Some(other) => Err(Error::unsupported(format!(
            "function {function} expects {expected} arguments, got {other}"
        ))),
        None => Ok(()),
    }
}

macro_rules! capabilities_constructor {
    ($ty:ident) => {
        impl $ty {
            pub fn new(capabilities: FunctionCapabilities) -> Self {
                Self { capabilities }
            }
        }
    };
}

/// `plus(Int64, Int64) -> Int64`. Compilable.
pub struct Add {
    capabilities: FunctionCapabilities,
}
capabilities_constructor!(Add);

impl Default for Add {
    fn default() -> Self {
        Self::new(FunctionCapabilities::default().with_constants(true))
    }
}

impl ScalarFunction for Add {
    fn name(&self) -> &str {
        "plus"
    }

    fn capabilities(&self) -> &FunctionCapabilities {
        &self.capabilities
    }

    fn number_of_arguments(&self) -> usize {
        2
    }

    fn return_type_impl(&self, arguments: &[DataType]) -> Result<DataType> {
        expect_types(self.name(), arguments, &int64_type())?;
        Ok(int64_type())
    }

    fn execute_impl(
        &self,
        arguments: &[Argument],
        _result_type: &DataType,
        _rows: usize,
    ) -> Result<Option<Column>> {
        let lhs = arguments[0].column.materialize()?;
        let rhs = arguments[1].column.materialize()?;
        Ok(Some(Column::from_arrow(numeric::add(&lhs, &rhs)?)?))
    }

    fn is_compilable_impl(&self, arguments: &[DataType], _result_type: &DataType) -> bool {
        arguments.iter().all(|t| *t == int64_type())
    }

    fn compile_impl(
        &self,
        builder: &mut dyn IrBuilder,
        arguments: &[ValueWithType],
        _result_type: &DataType,
    ) -> Result<ValueId> {
        builder.binary(NativeBinaryOp::Add, arguments[0].value, arguments[1].value)
    }
}

/// `negate(Int64) -> Int64`.
pub struct Negate {
    capabilities: FunctionCapabilities,
}
capabilities_constructor!(Negate);

impl Default for Negate {
    fn default() -> Self {
        Self::new(FunctionCapabilities::default())
    }
}

impl ScalarFunction for Negate {
    fn name(&self) -> &str {
        "negate"
    }

    fn capabilities(&self) -> &FunctionCapabilities {
        &self.capabilities
    }

    fn number_of_arguments(&self) -> usize {
        1
    }

    fn return_type_impl(&self, arguments: &[DataType]) -> Result<DataType> {
        expect_types(self.name(), arguments, &int64_type())?;
        Ok(int64_type())
    }

    fn execute_impl(
        &self,
        arguments: &[Argument],
        _result_type: &DataType,
        _rows: usize,
    ) -> Result<Option<Column>> {
        let values = arguments[0].column.materialize()?;
        Ok(Some(Column::from_arrow(numeric::neg(&values)?)?))
    }
}

/// `upper(Utf8) -> Utf8`.
pub struct Upper {
    capabilities: FunctionCapabilities,
}
capabilities_constructor!(Upper);

impl Default for Upper {
    fn default() -> Self {
        Self::new(FunctionCapabilities::default())
    }
}

impl ScalarFunction for Upper {
    fn name(&self) -> &str {
        "upper"
    }

    fn capabilities(&self) -> &FunctionCapabilities {
        &self.capabilities
    }

    fn number_of_arguments(&self) -> usize {
        1
    }

    fn return_type_impl(&self, arguments: &[DataType]) -> Result<DataType> {
        expect_types(self.name(), arguments, &utf8_type())?;
        Ok(utf8_type())
    }

    fn execute_impl(
        &self,
        arguments: &[Argument],
        _result_type: &DataType,
        _rows: usize,
    ) -> Result<Option<Column>> {
        let values = arguments[0].column.materialize()?;
        let upper: StringArray = values
            .as_string::<i32>()
            .iter()
            .map(|v| v.map(str::to_uppercase))
            .collect();
        Ok(Some(Column::from_arrow(Arc::new(upper) as ArrayRef)?))
    }
}

/// `modulo(Int64, Int64) -> Int64`, failing on a zero divisor.
///
/// Not safe on default arguments: the default divisor is zero.
pub struct Modulo {
    capabilities: FunctionCapabilities,
}
capabilities_constructor!(Modulo);

impl Default for Modulo {
    fn default() -> Self {
        Self::new(FunctionCapabilities::default().with_safe_on_default_arguments(false))
    }
}

impl ScalarFunction for Modulo {
    fn name(&self) -> &str {
        "modulo"
    }

    fn capabilities(&self) -> &FunctionCapabilities {
        &self.capabilities
    }

    fn number_of_arguments(&self) -> usize {
        2
    }

    fn return_type_impl(&self, arguments: &[DataType]) -> Result<DataType> {
        expect_types(self.name(), arguments, &int64_type())?;
        Ok(int64_type())
    }

    fn execute_impl(
        &self,
        arguments: &[Argument],
        _result_type: &DataType,
        _rows: usize,
    ) -> Result<Option<Column>> {
        let lhs = arguments[0].column.materialize()?;
        let rhs = arguments[1].column.materialize()?;
        Ok(Some(Column::from_arrow(numeric::rem(&lhs, &rhs)?)?))
    }
}

/// `null_if_zero(Int64) -> Nullable(Int64)`: produces its own null rows.
pub struct NullIfZero {
    capabilities: FunctionCapabilities,
}
capabilities_constructor!(NullIfZero);

impl Default for NullIfZero {
    fn default() -> Self {
        Self::new(FunctionCapabilities::default())
    }
}

impl ScalarFunction for NullIfZero {
    fn name(&self) -> &str {
        "null_if_zero"
    }

    fn capabilities(&self) -> &FunctionCapabilities {
        &self.capabilities
    }

    fn number_of_arguments(&self) -> usize {
        1
    }

    fn return_type_impl(&self, arguments: &[DataType]) -> Result<DataType> {
        expect_types(self.name(), arguments, &int64_type())?;
        Ok(DataType::nullable(int64_type()))
    }

    fn execute_impl(
        &self,
        arguments: &[Argument],
        _result_type: &DataType,
        _rows: usize,
    ) -> Result<Option<Column>> {
        let values = arguments[0].column.materialize()?;
        let values = values.as_primitive::<Int64Type>();
        let zeros: Vec<bool> = values.values().iter().map(|v| *v == 0).collect();
        let nested = Column::Full(Arc::new(Int64Array::from(values.values().to_vec())));
        Ok(Some(Column::Nullable(NullableColumn::try_new(
            nested,
            null_map_from_bools(&zeros),
        )?)))
    }
}

/// Returns three rows for every call, whatever it was asked for.
///
/// Stands in for functions whose output depends on something other than
/// their arguments.
pub struct Series {
    capabilities: FunctionCapabilities,
}
capabilities_constructor!(Series);

impl Default for Series {
    fn default() -> Self {
        Self::new(FunctionCapabilities::default().with_constants(true))
    }
}

impl ScalarFunction for Series {
    fn name(&self) -> &str {
        "series"
    }

    fn capabilities(&self) -> &FunctionCapabilities {
        &self.capabilities
    }

    fn number_of_arguments(&self) -> usize {
        1
    }

    fn return_type_impl(&self, _arguments: &[DataType]) -> Result<DataType> {
        Ok(int64_type())
    }

    fn execute_impl(
        &self,
        arguments: &[Argument],
        _result_type: &DataType,
        _rows: usize,
    ) -> Result<Option<Column>> {
        let start = arguments[0].column.materialize()?;
        let start = start.as_primitive::<Int64Type>().value(0);
        Ok(Some(int64(&[start, start + 1, start + 2])))
    }
}

/// A broken function whose body never produces a column.
pub struct AlwaysNone {
    capabilities: FunctionCapabilities,
}
capabilities_constructor!(AlwaysNone);

impl Default for AlwaysNone {
    fn default() -> Self {
        Self::new(FunctionCapabilities::default())
    }
}

impl ScalarFunction for AlwaysNone {
    fn name(&self) -> &str {
        "always_none"
    }

    fn capabilities(&self) -> &FunctionCapabilities {
        &self.capabilities
    }

    fn number_of_arguments(&self) -> usize {
        0
    }

    fn is_variadic(&self) -> bool {
        true
    }

    fn return_type_impl(&self, _arguments: &[DataType]) -> Result<DataType> {
        Ok(int64_type())
    }

    fn execute_impl(
        &self,
        _arguments: &[Argument],
        _result_type: &DataType,
        _rows: usize,
    ) -> Result<Option<Column>> {
        Ok(None)
    }
}

/// What a [`Probe`] saw on one call of its body.
#[derive(Debug, Clone)]
pub struct ProbeCall {
    pub kinds: Vec<ColumnKind>,
    pub types: Vec<DataType>,
    pub rows: usize,
    pub result_type: DataType,
    pub dry_run: bool,
}

/// Records every call of its body and echoes its first argument.
///
/// With no arguments it returns `rows` zeros of `Int64`.
pub struct Probe {
    capabilities: FunctionCapabilities,
    arity: usize,
    returns: Option<DataType>,
    calls: Mutex<Vec<ProbeCall>>,
}

impl Probe {
    pub fn new(capabilities: FunctionCapabilities, arity: usize) -> Self {
        Self {
            capabilities,
            arity,
            returns: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Declare a fixed inferred return type instead of echoing the first argument's.
    pub fn returning(mut self, data_type: DataType) -> Self {
        self.returns = Some(data_type);
        self
    }

    pub fn calls(&self) -> Vec<ProbeCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record(
        &self,
        arguments: &[Argument],
        result_type: &DataType,
        rows: usize,
        dry_run: bool,
    ) -> Column {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ProbeCall {
                kinds: arguments.iter().map(|a| a.column.kind()).collect(),
                types: arguments.iter().map(|a| a.data_type.clone()).collect(),
                rows,
                result_type: result_type.clone(),
                dry_run,
            });
        match arguments.first() {
            Some(first) => first.column.clone(),
            None => int64(&vec![0; rows]),
        }
    }
}

impl ScalarFunction for Probe {
    fn name(&self) -> &str {
        "probe"
    }

    fn capabilities(&self) -> &FunctionCapabilities {
        &self.capabilities
    }

    fn number_of_arguments(&self) -> usize {
        self.arity
    }

    fn return_type_impl(&self, arguments: &[DataType]) -> Result<DataType> {
        Ok(self
            .returns
            .clone()
            .or_else(|| arguments.first().cloned())
            .unwrap_or_else(|| DataType::plain(ArrowDataType::Int64)))
    }

    fn execute_impl(
        &self,
        arguments: &[Argument],
        result_type: &DataType,
        rows: usize,
    ) -> Result<Option<Column>> {
        Ok(Some(self.record(arguments, result_type, rows, false)))
    }

    fn execute_dry_run_impl(
        &self,
        arguments: &[Argument],
        result_type: &DataType,
        rows: usize,
    ) -> Result<Option<Column>> {
        Ok(Some(self.record(arguments, result_type, rows, true)))
    }

    fn lambda_argument_types_impl(&self, arguments: &mut [DataType]) -> Result<()> {
        for argument in arguments.iter_mut() {
            if let DataType::Function { arguments, .. } = argument {
                for parameter in arguments.iter_mut() {
                    *parameter = int64_type();
                }
            }
        }
        Ok(())
    }
}
