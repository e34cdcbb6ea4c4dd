use fexec_column::{Argument, Column, SparseColumn};
use fexec_result::Result;
use fexec_types::DataType;

use super::{FunctionExecutor, Stage};

pub(super) fn execute(
    executor: &FunctionExecutor<'_>,
    arguments: &[Argument],
    result_type: &DataType,
    rows: usize,
) -> Result<Column> {
    if !executor.function().capabilities().default_for_sparse {
        return executor.forward(Stage::Sparse, arguments, result_type, rows);
    }
    // Function values have no default row, so their results cannot be scattered.
    if result_type.is_function() {
        let dense = without_sparse(arguments)?;
        return executor.forward(Stage::Sparse, &dense, result_type, rows);
    }

    let mut sparse: Option<(usize, &SparseColumn)> = None;
    let mut sparse_count = 0usize;
    let mut full_count = 0usize;
    for (position, argument) in arguments.iter().enumerate() {
        match &argument.column {
            Column::Sparse(column) if column.number_of_default_rows() > 0 => {
                sparse = Some((position, column));
                sparse_count += 1;
            }
            Column::Const(_) => {}
            _ => full_count += 1,
        }
    }

    let (sparse, column) = match sparse {
        Some(found) if sparse_count == 1 && full_count == 0 => found,
        _ => {
            let dense = without_sparse(arguments)?;
            return executor.forward(Stage::Sparse, &dense, result_type, rows);
        }
    };

    let values = column.values().clone();
    let stored_rows = values.len();
    tracing::debug!(
        "[SPARSE] function={} executing on {} stored rows of {}",
        executor.function().name(),
        stored_rows,
        rows
    );

    let mut reduced = Vec::with_capacity(arguments.len());
    for (position, argument) in arguments.iter().enumerate() {
        let resized = if position == sparse {
            Column::Full(values.clone())
        } else {
            argument.column.clone_resized(stored_rows)?
        };
        reduced.push(argument.with_column(resized, argument.data_type.clone()));
    }

    let result = executor.forward(Stage::Sparse, &reduced, result_type, stored_rows)?;
    let result = executor.expect_rows(result, stored_rows)?;
    if result.is_const() {
        return result.clone_resized(rows);
    }

    let keeps_sparsity = result_type.can_be_inside_sparse_columns()
        && result.is_default_at(0)?
        && result.number_of_default_rows()? == 1;
    if !keeps_sparsity {
        tracing::debug!(
            "[SPARSE] function={} result does not stay sparse; materializing {} rows",
            executor.function().name(),
            rows
        );
        let default = result.slice(0, 1)?;
        return result.create_with_offsets(column.offsets(), &default, rows, 1);
    }

    let result_values = result.into_full()?;
    Ok(Column::Sparse(SparseColumn::try_new(
        result_values,
        column.offsets().clone(),
        rows,
    )?))
}

fn without_sparse(arguments: &[Argument]) -> Result<Vec<Argument>> {
    arguments
        .iter()
        .map(|argument| {
            Ok(argument.with_column(argument.column.remove_sparse()?, argument.data_type.clone()))
        })
        .collect()
}
