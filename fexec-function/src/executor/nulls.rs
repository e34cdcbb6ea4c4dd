use fexec_column::{Argument, Column, NullMap, or_null_maps};
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
    if arguments.is_empty() || !function.capabilities().default_for_nulls {
        return executor.forward(Stage::Nulls, arguments, result_type, rows);
    }

    if arguments.iter().any(|a| a.data_type.only_null()) {
        if !result_type.is_nullable() {
            return Err(Error::invariant(format!(
                "function {} with a NULL argument is expected to return a nullable result, got {}",
                function.name(),
                result_type
            )));
        }
        return Column::const_default_for_type(result_type, rows);
    }

    if arguments.iter().any(|a| a.data_type.is_nullable()) {
        if !result_type.is_nullable()
            && let Some(argument) = arguments
                .iter()
                .find(|a| a.data_type.is_nullable() && has_null_rows(&a.column))
        {
            return Err(Error::invariant(format!(
                "function {} returns non-nullable {} but argument {} has NULL rows",
                function.name(),
                result_type,
                argument.name
            )));
        }
        let nested = nested_arguments(arguments)?;
        let nested_type = result_type.remove_nullable();
        let result = executor.run(Stage::Nothing, &nested, &nested_type, rows)?;
        return wrap_in_nullable(result, arguments, result_type, rows);
    }

    executor.forward(Stage::Nulls, arguments, result_type, rows)
}

/// Replace every nullable argument by its values and its type by the nested type.
pub(super) fn nested_arguments(arguments: &[Argument]) -> Result<Vec<Argument>> {
    arguments
        .iter()
        .map(|argument| {
            if !argument.data_type.is_nullable() {
                return Ok(argument.clone());
            }
            let column = match &argument.column {
                Column::Nullable(nullable) => nullable.nested().clone(),
                Column::Const(constant) => match constant.data() {
                    Column::Nullable(nullable) => {
                        Column::constant(nullable.nested().clone(), constant.len())?
                    }
                    _ => argument.column.clone(),
                },
                other => other.clone(),
            };
            Ok(argument.with_column(column, argument.data_type.remove_nullable()))
        })
        .collect()
}

/// Apply the null rows of `arguments` to a result computed on their values.
///
/// The null map of the result is the row-wise OR of every nullable argument's
/// null map and, if the computed result is itself nullable, its own null map.
/// A constant `NULL` argument makes every row `NULL`.
pub(super) fn wrap_in_nullable(
    result: Column,
    arguments: &[Argument],
    result_type: &DataType,
    rows: usize,
) -> Result<Column> {
    if !result_type.is_nullable() || result.only_null() {
        return Ok(result);
    }

    let mut null_map: Option<NullMap> = None;
    for argument in arguments {
        if !argument.data_type.is_nullable() {
            continue;
        }
        if argument.column.only_null() {
            return Column::default_for_type(result_type, rows);
        }
        if let Column::Nullable(nullable) = &argument.column {
            null_map = Some(merge(null_map, nullable.null_map())?);
        }
    }

    let Some(argument_nulls) = null_map else {
        return result.to_nullable();
    };

    let result = result.convert_to_full_if_const()?.remove_sparse()?;
    match result {
        Column::Nullable(nullable) => {
            let combined = or_null_maps(&argument_nulls, nullable.null_map())?;
            Column::nullable(nullable.nested().clone(), combined)
        }
        values => Column::nullable(values, argument_nulls),
    }
}

fn has_null_rows(column: &Column) -> bool {
    match column {
        Column::Nullable(nullable) => nullable.null_count() > 0,
        Column::Const(constant) => !constant.is_empty() && constant.data().is_null_at(0),
        _ => false,
    }
}

fn merge(accumulated: Option<NullMap>, next: &NullMap) -> Result<NullMap> {
    match accumulated {
        None => Ok(next.clone()),
        Some(accumulated) => or_null_maps(&accumulated, next),
    }
}
