//! fexec: representation-adapting function execution over Arrow columns
//!
//! This crate is the entrypoint for the fexec workspace. It re-exports the
//! column model, the function contract and its executor from the underlying
//! `fexec-*` crates.
//!
//! # Quick Start
//!
//! Bind a function to an argument signature, then execute batches:
//!
//! ```rust
//! use std::sync::Arc;
//! use arrow::array::{ArrayRef, Int64Array};
//! use arrow::datatypes::DataType as ArrowDataType;
//! use fexec::{
//!     Argument, ArgumentSignature, BoundFunction, Column, DataType, FunctionCapabilities,
//!     Result, ScalarFunction,
//! };
//!
//! struct Double(FunctionCapabilities);
//!
//! impl ScalarFunction for Double {
//!     fn name(&self) -> &str { "double" }
//!     fn capabilities(&self) -> &FunctionCapabilities { &self.0 }
//!     fn number_of_arguments(&self) -> usize { 1 }
//!     fn return_type_impl(&self, args: &[DataType]) -> Result<DataType> { Ok(args[0].clone()) }
//!     fn execute_impl(&self, args: &[Argument], _: &DataType, _: usize) -> Result<Option<Column>> {
//!         let values = args[0].column.materialize()?;
//!         let doubled = arrow::compute::kernels::numeric::add(&values, &values)?;
//!         Ok(Some(Column::from_arrow(doubled)?))
//!     }
//! }
//!
//! let int64 = DataType::plain(ArrowDataType::Int64);
//! let caps = FunctionCapabilities::default().with_constants(true);
//! let double = BoundFunction::build(
//!     Arc::new(Double(caps)),
//!     &[ArgumentSignature::constant(int64.clone())],
//! )
//! .unwrap();
//!
//! let one_row = Column::Full(Arc::new(Int64Array::from(vec![21])) as ArrayRef);
//! let args = [Argument::new(Column::constant(one_row, 1000).unwrap(), int64, "x")];
//! let result = double.execute(&args, 1000).unwrap();
//! assert!(result.is_const());
//! assert_eq!(result.len(), 1000);
//! ```
//!
//! # Architecture
//!
//! - **Errors** (`fexec-result`): the unified `Error` enum and `Result` alias.
//! - **Types** (`fexec-types`): wrapper-aware logical types.
//! - **Columns** (`fexec-column`): full, constant, nullable, dictionary-encoded
//!   and sparse columns over Arrow arrays.
//! - **Functions** (`fexec-function`): the `ScalarFunction` contract, the staged
//!   executor, the return-type resolver and the compilation bridge.

pub use fexec_column::{
    Argument, Column, ColumnKind, ConstColumn, LowCardinalityColumn, NullMap, NullableColumn,
    SparseColumn, UniqueDictionary, UniqueDictionaryBuilder,
};
pub use fexec_function::{
    ArgumentSignature, BoundFunction, FunctionCapabilities, FunctionExecutor, IrBuilder,
    NativeBinaryOp, ReturnTypeCache, ScalarFunction, Stage, ValueId, ValueWithType,
};
pub use fexec_result::{Error, Result};
pub use fexec_types::DataType;

pub mod column {
    //! The full column model, including default-value helpers.
    pub use fexec_column::*;
}

pub mod function {
    //! Executor internals: resolver and compilation bridge functions.
    pub use fexec_function::{compile, resolver};
}
