use std::sync::Arc;

use arrow::array::{AsArray, UInt32Array};
use arrow::compute::take;
use arrow::datatypes::UInt32Type;

use fexec_column::{Argument, Column, LowCardinalityColumn, UniqueDictionaryBuilder};
use fexec_result::{Error, Result};
use fexec_types::DataType;

use super::{FunctionExecutor, Stage, nulls};

/// Arguments rewritten to run on dictionary values, plus the row indexes of
/// the dictionary argument when there was one.
struct DictionaryArguments {
    arguments: Vec<Argument>,
    indexes: Option<UInt32Array>,
}

pub(super) fn execute(
    executor: &FunctionExecutor<'_>,
    arguments: &[Argument],
    result_type: &DataType,
    rows: usize,
) -> Result<Column> {
    let capabilities = executor.function().capabilities();
    if !capabilities.default_for_low_cardinality {
        return executor.forward(Stage::LowCardinality, arguments, result_type, rows);
    }
    if capabilities.default_for_nulls
        && let DataType::Nullable(inner) = result_type
        && inner.is_low_cardinality()
    {
        return execute_nullable_dictionary(executor, arguments, result_type, inner, rows);
    }
    let Some(dictionary_type) = result_type.dictionary_type() else {
        let expanded = without_low_cardinality(arguments)?;
        return executor.forward(Stage::LowCardinality, &expanded, result_type, rows);
    };

    let DictionaryArguments { arguments, indexes } = match replace_by_dictionary(
        arguments,
        capabilities.safe_on_default_arguments,
        rows,
    )? {
        Some(replaced) => replaced,
        None => {
            tracing::warn!(
                "[LOW_CARDINALITY] function={} got more than one full argument for a dictionary-encoded result; expanding",
                executor.function().name()
            );
            DictionaryArguments {
                arguments: without_low_cardinality(arguments)?,
                indexes: None,
            }
        }
    };

    let reduced_rows = arguments.first().map_or(rows, Argument::len);
    tracing::debug!(
        "[LOW_CARDINALITY] function={} executing on {} dictionary rows for {} rows",
        executor.function().name(),
        reduced_rows,
        rows
    );
    let result =
        executor.forward(Stage::LowCardinality, &arguments, dictionary_type, reduced_rows)?;
    let result = executor.expect_rows(result, reduced_rows)?;
    let is_const = result.is_const();
    let keys = if is_const {
        result.clone_resized(1)?.convert_to_full_if_const()?
    } else {
        result
    };
    let keys = keys.into_full()?;

    let mut builder = UniqueDictionaryBuilder::new(keys.data_type())?;
    let key_indexes = builder.insert_range_from(&keys, 0, keys.len())?;
    let row_indexes = match indexes {
        Some(indexes) if !is_const => take(&key_indexes, &indexes, None)?
            .as_primitive::<UInt32Type>()
            .clone(),
        _ => key_indexes,
    };

    let encoded = Column::LowCardinality(LowCardinalityColumn::try_new(
        Arc::new(builder.finish()?),
        row_indexes,
    )?);
    if is_const {
        Column::constant(encoded, rows)
    } else {
        Ok(encoded)
    }
}

/// A `Nullable(LowCardinality(T))` result: strip the null maps, encode on the
/// dictionary values underneath, then wrap the combined null map around the
/// dictionary-encoded result.
fn execute_nullable_dictionary(
    executor: &FunctionExecutor<'_>,
    arguments: &[Argument],
    result_type: &DataType,
    dictionary_result_type: &DataType,
    rows: usize,
) -> Result<Column> {
    tracing::debug!(
        "[LOW_CARDINALITY] function={} stripping null maps around a dictionary-encoded result",
        executor.function().name()
    );
    let nested = nulls::nested_arguments(arguments)?;
    let result = execute(executor, &nested, dictionary_result_type, rows)?;
    nulls::wrap_in_nullable(result, arguments, result_type, rows)
}

/// Swap the single dictionary argument for its values and shrink constants
/// to match. Returns `None` when the arguments do not allow this.
fn replace_by_dictionary(
    arguments: &[Argument],
    safe_on_default_arguments: bool,
    rows: usize,
) -> Result<Option<DictionaryArguments>> {
    let mut dictionary_position = None;
    let mut dictionary_count = 0usize;
    let mut const_count = 0usize;
    let mut full_count = 0usize;
    for (position, argument) in arguments.iter().enumerate() {
        match &argument.column {
            Column::LowCardinality(_) => {
                dictionary_position = Some(position);
                dictionary_count += 1;
            }
            Column::Const(_) => const_count += 1,
            _ => full_count += 1,
        }
    }

    if dictionary_count == 0 && const_count == 0 {
        return Ok(Some(DictionaryArguments {
            arguments: arguments.to_vec(),
            indexes: None,
        }));
    }
    if full_count > 0 || dictionary_count > 1 {
        return Ok(None);
    }

    let mut replaced = arguments.to_vec();
    let mut indexes = None;
    let mut reduced_rows = rows;
    if let Some(position) = dictionary_position {
        let argument = &arguments[position];
        let Some(element_type) = argument.data_type.dictionary_type() else {
            return Err(Error::invariant(format!(
                "incompatible type {} for low-cardinality column {}",
                argument.data_type, argument.name
            )));
        };
        let Column::LowCardinality(column) = &argument.column else {
            return Err(Error::invariant("dictionary argument changed representation"));
        };

        let values = if safe_on_default_arguments {
            indexes = Some(column.indexes().clone());
            column.dictionary().values().clone()
        } else {
            // Dictionaries always hold the default value, which this function
            // cannot be evaluated on. Keep only the referenced values.
            let encoded = column.minimal_dictionary_encoded(0, column.len())?;
            indexes = Some(encoded.indexes);
            encoded.dictionary
        };
        reduced_rows = values.len();
        replaced[position] = argument.with_column(Column::Full(values), element_type.clone());
    }

    for argument in replaced.iter_mut() {
        if let Column::Const(constant) = &argument.column {
            let column = Column::constant(constant.data().remove_low_cardinality()?, reduced_rows)?;
            let data_type = argument.data_type.remove_low_cardinality();
            *argument = argument.with_column(column, data_type);
        }
    }

    Ok(Some(DictionaryArguments {
        arguments: replaced,
        indexes,
    }))
}

fn without_low_cardinality(arguments: &[Argument]) -> Result<Vec<Argument>> {
    arguments
        .iter()
        .map(|argument| {
            Ok(argument.with_column(
                argument.column.remove_low_cardinality()?,
                argument.data_type.remove_low_cardinality(),
            ))
        })
        .collect()
}
