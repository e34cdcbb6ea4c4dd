//! The contract a concrete function implements.

use fexec_column::{Argument, Column};
use fexec_result::{Error, Result};
use fexec_types::DataType;

use crate::capabilities::FunctionCapabilities;
use crate::compile::{IrBuilder, ValueId, ValueWithType};

/// A function written against plain columns.
///
/// Implementors provide the raw computation and a [`FunctionCapabilities`]
/// record. [`FunctionExecutor`](crate::FunctionExecutor) and the resolver in
/// [`crate::resolver`] use that record to adapt constant, nullable,
/// dictionary-encoded and sparse arguments around the raw computation.
///
/// One instance is shared by every thread that evaluates the function, so
/// implementations must not keep per-call state.
pub trait ScalarFunction: Send + Sync {
    fn name(&self) -> &str;

    fn capabilities(&self) -> &FunctionCapabilities;

    /// Declared argument count. Ignored when [`is_variadic`](Self::is_variadic).
    fn number_of_arguments(&self) -> usize;

    fn is_variadic(&self) -> bool {
        false
    }

    /// Result type for arguments already stripped of the wrappers the enabled
    /// layers handle.
    fn return_type_impl(&self, arguments: &[DataType]) -> Result<DataType>;

    /// Compute `rows` result rows. Returning `Ok(None)` is a bug in the
    /// function and surfaces as [`Error::InvariantViolation`].
    fn execute_impl(
        &self,
        arguments: &[Argument],
        result_type: &DataType,
        rows: usize,
    ) -> Result<Option<Column>>;

    /// Cheaper variant used when only the shape of the result matters.
    fn execute_dry_run_impl(
        &self,
        arguments: &[Argument],
        result_type: &DataType,
        rows: usize,
    ) -> Result<Option<Column>> {
        self.execute_impl(arguments, result_type, rows)
    }

    /// Fill in the parameter types of lambda arguments.
    fn lambda_argument_types_impl(&self, _arguments: &mut [DataType]) -> Result<()> {
        Err(Error::unsupported(format!(
            "function {} does not take lambda arguments",
            self.name()
        )))
    }

    fn is_compilable_impl(&self, _arguments: &[DataType], _result_type: &DataType) -> bool {
        false
    }

    fn compile_impl(
        &self,
        _builder: &mut dyn IrBuilder,
        _arguments: &[ValueWithType],
        _result_type: &DataType,
    ) -> Result<ValueId> {
        Err(Error::unsupported(format!(
            "function {} is not compilable",
            self.name()
        )))
    }
}
