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
    let capabilities = function.capabilities();

    for &position in &capabilities.always_constant_arguments {
        if let Some(argument) = arguments.get(position)
            && !argument.column.is_const()
        {
            return Err(Error::illegal_column(format!(
                "argument at index {position} for function {} must be constant",
                function.name()
            )));
        }
    }

    if arguments.is_empty()
        || !capabilities.default_for_constants
        || !arguments.iter().all(|a| a.column.is_const())
    {
        return executor.forward(Stage::Constants, arguments, result_type, rows);
    }

    let mut unwrapped = Vec::with_capacity(arguments.len());
    let mut converted = false;
    for (position, argument) in arguments.iter().enumerate() {
        let Column::Const(constant) = &argument.column else {
            return Err(Error::invariant("constant argument changed representation"));
        };
        let column = if capabilities.is_always_constant(position) {
            Column::Const(constant.with_len(1))
        } else {
            converted = true;
            constant.data().clone()
        };
        unwrapped.push(argument.with_column(column, argument.data_type.clone()));
    }

    // Every argument pinned as constant would re-enter this stage forever.
    if !converted {
        return Err(Error::ArgumentCountMismatch {
            function: function.name().to_string(),
            passed: arguments.len(),
            expected: format!("at least {}", arguments.len() + 1),
        });
    }

    let mut result = executor.run(Stage::Nothing, &unwrapped, result_type, 1)?;
    if result.len() > 1 {
        tracing::debug!(
            "[CONSTANTS] function={} returned {} rows for constant arguments; keeping the first",
            function.name(),
            result.len()
        );
        result = result.clone_resized(1)?;
    }
    Column::constant(result, rows)
}
