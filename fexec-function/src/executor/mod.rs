//! Staged execution of a [`ScalarFunction`].
//!
//! A call passes through a fixed sequence of stages, outermost first:
//!
//! 1. [`Stage::Sparse`] runs the function on the stored rows of a single
//!    sparse argument.
//! 2. [`Stage::LowCardinality`] runs the function on a dictionary's values
//!    when the result is dictionary-encoded, possibly under a null map, and
//!    expands dictionaries otherwise.
//! 3. [`Stage::Nothing`] short-circuits arguments of the empty type.
//! 4. [`Stage::Constants`] runs the function once when every argument is constant.
//! 5. [`Stage::Nulls`] strips null maps, runs on the nested values and
//!    re-applies the combined null map.
//! 6. [`Stage::Raw`] calls the function body.
//!
//! Each stage either handles the call, usually by recursing into a later
//! stage with adapted arguments, or forwards it unchanged to [`Stage::next`].
//! Results are checked against the requested row count.
//! The constant and null stages recurse from [`Stage::Nothing`] so nested
//! calls get every inner adaptation again.

mod constants;
mod low_cardinality;
mod nothing;
mod nulls;
mod sparse;

use fexec_column::{Argument, Column};
use fexec_result::{Error, Result};
use fexec_types::DataType;

use crate::function::ScalarFunction;

/// One layer of the execution pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Sparse,
    LowCardinality,
    Nothing,
    Constants,
    Nulls,
    Raw,
}

impl Stage {
    /// The stage a call falls through to when this one does not apply.
    pub fn next(self) -> Stage {
        match self {
            Stage::Sparse => Stage::LowCardinality,
            Stage::LowCardinality => Stage::Nothing,
            Stage::Nothing => Stage::Constants,
            Stage::Constants => Stage::Nulls,
            Stage::Nulls | Stage::Raw => Stage::Raw,
        }
    }
}

/// Runs a function over arguments in any column representation.
///
/// The executor borrows the function and holds no other state, so one
/// function may be executed from many threads at once, each with its own
/// executor.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use arrow::array::{ArrayRef, Int64Array};
/// use arrow::datatypes::DataType as ArrowDataType;
/// use fexec_column::{Argument, Column, NullableColumn, null_map_from_bools};
/// use fexec_function::{FunctionCapabilities, FunctionExecutor, ScalarFunction};
/// use fexec_result::Result;
/// use fexec_types::DataType;
///
/// struct Identity(FunctionCapabilities);
///
/// impl ScalarFunction for Identity {
///     fn name(&self) -> &str { "identity" }
///     fn capabilities(&self) -> &FunctionCapabilities { &self.0 }
///     fn number_of_arguments(&self) -> usize { 1 }
///     fn return_type_impl(&self, args: &[DataType]) -> Result<DataType> { Ok(args[0].clone()) }
///     fn execute_impl(&self, args: &[Argument], _: &DataType, _: usize) -> Result<Option<Column>> {
///         Ok(Some(args[0].column.clone()))
///     }
/// }
///
/// let int64 = DataType::plain(ArrowDataType::Int64);
/// let values = Column::Full(Arc::new(Int64Array::from(vec![1, 0])) as ArrayRef);
/// let column = Column::Nullable(
///     NullableColumn::try_new(values, null_map_from_bools(&[false, true])).unwrap(),
/// );
/// let args = [Argument::new(column, DataType::nullable(int64.clone()), "x")];
///
/// let function = Identity(FunctionCapabilities::default());
/// let out = FunctionExecutor::new(&function)
///     .execute(&args, &DataType::nullable(int64), 2)
///     .unwrap();
/// assert!(out.is_null_at(1));
/// ```
pub struct FunctionExecutor<'f> {
    function: &'f dyn ScalarFunction,
    dry_run: bool,
}

impl<'f> FunctionExecutor<'f> {
    pub fn new(function: &'f dyn ScalarFunction) -> Self {
        Self {
            function,
            dry_run: false,
        }
    }

    /// Executor that calls the function's dry-run body instead of its real one.
    pub fn dry_run(function: &'f dyn ScalarFunction) -> Self {
        Self {
            function,
            dry_run: true,
        }
    }

    #[inline]
    pub fn function(&self) -> &'f dyn ScalarFunction {
        self.function
    }

    #[inline]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Execute the function over `arguments`, producing exactly `rows` rows.
    ///
    /// `result_type` must be the type the resolver produced for these
    /// argument types; it decides whether the result is dictionary-encoded or
    /// nullable.
    pub fn execute(
        &self,
        arguments: &[Argument],
        result_type: &DataType,
        rows: usize,
    ) -> Result<Column> {
        for argument in arguments {
            if argument.len() != rows {
                return Err(Error::size_mismatch(
                    format!(
                        "argument {} of function {}",
                        argument.name,
                        self.function.name()
                    ),
                    rows,
                    argument.len(),
                ));
            }
        }
        let result = self.run(Stage::Sparse, arguments, result_type, rows)?;
        self.expect_rows(result, rows)
    }

    /// Fall through to the stage after `stage`.
    pub(crate) fn forward(
        &self,
        stage: Stage,
        arguments: &[Argument],
        result_type: &DataType,
        rows: usize,
    ) -> Result<Column> {
        self.run(stage.next(), arguments, result_type, rows)
    }

    /// Reject a result whose row count differs from the one requested.
    pub(crate) fn expect_rows(&self, result: Column, rows: usize) -> Result<Column> {
        if result.len() != rows {
            return Err(Error::size_mismatch(
                format!("result of function {}", self.function.name()),
                rows,
                result.len(),
            ));
        }
        Ok(result)
    }

    /// Execute starting at `stage`.
    pub(crate) fn run(
        &self,
        stage: Stage,
        arguments: &[Argument],
        result_type: &DataType,
        rows: usize,
    ) -> Result<Column> {
        tracing::trace!(
            "[EXEC] function={} stage={:?} rows={} result_type={}",
            self.function.name(),
            stage,
            rows,
            result_type
        );
        match stage {
            Stage::Sparse => sparse::execute(self, arguments, result_type, rows),
            Stage::LowCardinality => low_cardinality::execute(self, arguments, result_type, rows),
            Stage::Nothing => nothing::execute(self, arguments, result_type, rows),
            Stage::Constants => constants::execute(self, arguments, result_type, rows),
            Stage::Nulls => nulls::execute(self, arguments, result_type, rows),
            Stage::Raw => self.execute_raw(arguments, result_type, rows),
        }
    }

    fn execute_raw(
        &self,
        arguments: &[Argument],
        result_type: &DataType,
        rows: usize,
    ) -> Result<Column> {
        let result = if self.dry_run {
            self.function
                .execute_dry_run_impl(arguments, result_type, rows)?
        } else {
            self.function.execute_impl(arguments, result_type, rows)?
        };
        result.ok_or_else(|| {
            Error::invariant(format!(
                "empty column was returned by function {}",
                self.function.name()
            ))
        })
    }
}
