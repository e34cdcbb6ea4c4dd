use std::sync::Arc;

use fexec_column::{Argument, Column};
use fexec_result::{Error, Result};
use fexec_types::DataType;

use crate::compile::{self, IrBuilder, ValueId, ValueWithType};
use crate::executor::FunctionExecutor;
use crate::function::ScalarFunction;
use crate::resolver::{self, ArgumentSignature, ReturnTypeCache};

/// A function bound to one argument signature.
///
/// Building resolves the return type once; every batch executed afterwards
/// must match the bound argument types.
#[derive(Clone)]
pub struct BoundFunction {
    function: Arc<dyn ScalarFunction>,
    arguments: Vec<ArgumentSignature>,
    return_type: DataType,
}

impl BoundFunction {
    pub fn build(function: Arc<dyn ScalarFunction>, arguments: &[ArgumentSignature]) -> Result<Self> {
        let return_type = resolver::return_type(function.as_ref(), arguments)?;
        Ok(Self::with_return_type(function, arguments, return_type))
    }

    /// Like [`build`](Self::build), reusing a previously resolved return type
    /// from `cache` when one exists.
    pub fn build_cached(
        function: Arc<dyn ScalarFunction>,
        arguments: &[ArgumentSignature],
        cache: &ReturnTypeCache,
    ) -> Result<Self> {
        let return_type = cache.get_or_resolve(function.as_ref(), arguments)?;
        Ok(Self::with_return_type(function, arguments, return_type))
    }

    fn with_return_type(
        function: Arc<dyn ScalarFunction>,
        arguments: &[ArgumentSignature],
        return_type: DataType,
    ) -> Self {
        tracing::debug!(
            "[BIND] function={} return_type={}",
            function.name(),
            return_type
        );
        Self {
            function,
            arguments: arguments.to_vec(),
            return_type,
        }
    }

    pub fn name(&self) -> &str {
        self.function.name()
    }

    pub fn function(&self) -> &Arc<dyn ScalarFunction> {
        &self.function
    }

    pub fn arguments(&self) -> &[ArgumentSignature] {
        &self.arguments
    }

    pub fn return_type(&self) -> &DataType {
        &self.return_type
    }

    pub fn execute(&self, arguments: &[Argument], rows: usize) -> Result<Column> {
        self.check_arguments(arguments)?;
        FunctionExecutor::new(self.function.as_ref()).execute(arguments, &self.return_type, rows)
    }

    pub fn execute_dry_run(&self, arguments: &[Argument], rows: usize) -> Result<Column> {
        self.check_arguments(arguments)?;
        FunctionExecutor::dry_run(self.function.as_ref()).execute(arguments, &self.return_type, rows)
    }

    pub fn is_compilable(&self) -> bool {
        compile::is_compilable(
            self.function.as_ref(),
            &self.argument_types(),
            &self.return_type,
        )
    }

    /// Generate code for one call over the values `arguments`, given in the
    /// order of the bound signature.
    pub fn compile(&self, builder: &mut dyn IrBuilder, arguments: &[ValueId]) -> Result<ValueId> {
        if arguments.len() != self.arguments.len() {
            return Err(Error::argument_count(
                self.name(),
                arguments.len(),
                self.arguments.len(),
            ));
        }
        let values: Vec<ValueWithType> = arguments
            .iter()
            .zip(&self.arguments)
            .map(|(value, signature)| ValueWithType::new(*value, signature.data_type.clone()))
            .collect();
        compile::compile(self.function.as_ref(), builder, &values, &self.return_type)
    }

    fn argument_types(&self) -> Vec<DataType> {
        self.arguments.iter().map(|a| a.data_type.clone()).collect()
    }

    fn check_arguments(&self, arguments: &[Argument]) -> Result<()> {
        if arguments.len() != self.arguments.len() {
            return Err(Error::argument_count(
                self.name(),
                arguments.len(),
                self.arguments.len(),
            ));
        }
        for (argument, signature) in arguments.iter().zip(&self.arguments) {
            if argument.data_type != signature.data_type {
                return Err(Error::invariant(format!(
                    "function {} was bound for argument type {}, got {} for {}",
                    self.name(),
                    signature.data_type,
                    argument.data_type,
                    argument.name
                )));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for BoundFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundFunction")
            .field("function", &self.function.name())
            .field("arguments", &self.arguments)
            .field("return_type", &self.return_type)
            .finish()
    }
}
