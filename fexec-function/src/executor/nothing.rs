use fexec_column::{Argument, Column};
use fexec_result::{Error, Result};
use fexec_types::DataType;

use super::{FunctionExecutor, Stage};

pub(super) fn execute(
    executor: &FunctionExecutor<'_>,
    arguments: &[Argument],
    result_type: &DataType,
    rows: usize,
) -> Result<Column> {
    let function = executor.function();
    if !function.capabilities().default_for_nothing
        || !arguments.iter().any(|a| a.data_type.is_nothing())
    {
        return executor.forward(Stage::Nothing, arguments, result_type, rows);
    }
    if !result_type.is_nothing() {
        return Err(Error::invariant(format!(
            "function {} with an argument of type Nothing is expected to return Nothing, got {}",
            function.name(),
            result_type
        )));
    }
    if rows > 0 {
        return Err(Error::illegal_column(
            "cannot create a non-empty column of type Nothing",
        ));
    }
    Ok(Column::nothing(0))
}
