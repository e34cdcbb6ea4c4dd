//! Type-level mirror of the executor.
//!
//! [`return_type`] decides the declared result type of a call from argument
//! types and constness alone, applying the same dictionary, empty-type and
//! null rules the executor applies to values. The two must agree: the
//! executor produces a dictionary-encoded result exactly when the resolved
//! type is `LowCardinality`.

use std::sync::{OnceLock, PoisonError, RwLock};

use rustc_hash::FxHashMap;

use fexec_column::Argument;
use fexec_result::{Error, Result};
use fexec_types::DataType;

use crate::function::ScalarFunction;

/// What the resolver knows about one argument: its declared type and
/// whether its column is constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArgumentSignature {
    pub data_type: DataType,
    pub is_const: bool,
}

impl ArgumentSignature {
    pub fn new(data_type: DataType, is_const: bool) -> Self {
        Self {
            data_type,
            is_const,
        }
    }

    /// Signature of a non-constant argument.
    pub fn column(data_type: DataType) -> Self {
        Self::new(data_type, false)
    }

    pub fn constant(data_type: DataType) -> Self {
        Self::new(data_type, true)
    }

    pub fn of(argument: &Argument) -> Self {
        Self::new(argument.data_type.clone(), argument.column.is_const())
    }
}

/// Fail with [`Error::ArgumentCountMismatch`] unless a non-variadic function
/// receives exactly its declared number of arguments.
pub fn check_number_of_arguments(function: &dyn ScalarFunction, passed: usize) -> Result<()> {
    if function.is_variadic() {
        return Ok(());
    }
    let expected = function.number_of_arguments();
    if passed != expected {
        return Err(Error::argument_count(function.name(), passed, expected));
    }
    Ok(())
}

/// Resolve the declared result type of a call.
///
/// With dictionary handling enabled, dictionary-encoded argument types are
/// replaced by their element types before inference, and the inferred type is
/// wrapped back into `LowCardinality` when the function may run on
/// dictionary values, at least one argument was dictionary-encoded, at most
/// one non-constant argument was, no other argument is non-constant, and the
/// inferred type can live in a dictionary. A dictionary under a `Nullable`
/// wrapper counts as a dictionary argument and yields
/// `Nullable(LowCardinality(..))`.
pub fn return_type(function: &dyn ScalarFunction, arguments: &[ArgumentSignature]) -> Result<DataType> {
    let capabilities = function.capabilities();
    if !capabilities.default_for_low_cardinality {
        let types: Vec<DataType> = arguments.iter().map(|a| a.data_type.clone()).collect();
        return return_type_without_low_cardinality(function, &types);
    }

    let mut has_low_cardinality = false;
    let mut full_low_cardinality = 0usize;
    let mut full_ordinary = 0usize;
    for argument in arguments {
        if argument.data_type.remove_nullable().is_low_cardinality() {
            has_low_cardinality = true;
            if !argument.is_const {
                full_low_cardinality += 1;
            }
        } else if !argument.is_const {
            full_ordinary += 1;
        }
    }

    let types: Vec<DataType> = arguments
        .iter()
        .map(|a| a.data_type.remove_low_cardinality())
        .collect();
    let resolved = return_type_without_low_cardinality(function, &types)?;

    if !capabilities.safe_on_dictionary_values
        || !has_low_cardinality
        || full_low_cardinality > 1
        || full_ordinary > 0
    {
        return Ok(resolved);
    }
    if resolved.can_be_inside_low_cardinality() {
        return Ok(DataType::low_cardinality(resolved));
    }

    // Null maps are stripped around the dictionary, so nullable arguments
    // give a nullable dictionary when the null-free result can be encoded.
    if capabilities.default_for_nulls
        && types.iter().any(DataType::is_nullable)
        && !types.iter().any(DataType::only_null)
    {
        let nested: Vec<DataType> = types.iter().map(DataType::remove_nullable).collect();
        let inner = return_type_without_low_cardinality(function, &nested)?;
        if inner.can_be_inside_low_cardinality() {
            return Ok(DataType::nullable(DataType::low_cardinality(inner)));
        }
    }
    Ok(resolved)
}

/// Resolve the result type ignoring dictionary encoding.
///
/// Checks the arity, then short-circuits empty-type arguments to `Nothing`,
/// a `NULL` argument to `Nullable(Nothing)`, and nullable arguments to the
/// nullable form of the type inferred from their nested types.
pub fn return_type_without_low_cardinality(
    function: &dyn ScalarFunction,
    arguments: &[DataType],
) -> Result<DataType> {
    check_number_of_arguments(function, arguments.len())?;
    let capabilities = function.capabilities();

    if !arguments.is_empty()
        && capabilities.default_for_nothing
        && arguments.iter().any(DataType::is_nothing)
    {
        return Ok(DataType::Nothing);
    }

    if !arguments.is_empty() && capabilities.default_for_nulls {
        if arguments.iter().any(DataType::only_null) {
            return Ok(DataType::null());
        }
        if arguments.iter().any(DataType::is_nullable) {
            let nested: Vec<DataType> = arguments.iter().map(DataType::remove_nullable).collect();
            return Ok(function.return_type_impl(&nested)?.make_nullable());
        }
    }

    function.return_type_impl(arguments)
}

/// Let the function fill in the parameter types of its lambda arguments.
pub fn lambda_argument_types(
    function: &dyn ScalarFunction,
    arguments: &mut [DataType],
) -> Result<()> {
    check_number_of_arguments(function, arguments.len())?;
    function.lambda_argument_types_impl(arguments)
}

/// Resolved return types of one function, keyed by argument signature.
///
/// The first function resolved through the cache owns it; asking it for
/// another function's types is an error. Entries never change once
/// inserted. Readers on different threads share the map through a read
/// lock; a miss resolves outside the lock and the first insert for a
/// signature wins.
#[derive(Debug, Default)]
pub struct ReturnTypeCache {
    function: OnceLock<String>,
    entries: RwLock<FxHashMap<Vec<ArgumentSignature>, DataType>>,
}

impl ReturnTypeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_resolve(
        &self,
        function: &dyn ScalarFunction,
        arguments: &[ArgumentSignature],
    ) -> Result<DataType> {
        let owner = self
            .function
            .get_or_init(|| function.name().to_string());
        if owner != function.name() {
            return Err(Error::invariant(format!(
                "return type cache of function {owner} cannot resolve function {}",
                function.name()
            )));
        }

        if let Some(found) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(arguments)
        {
            return Ok(found.clone());
        }

        let resolved = return_type(function, arguments)?;
        tracing::trace!(
            "[RESOLVER] function={} resolved {} for {} argument(s)",
            function.name(),
            resolved,
            arguments.len()
        );
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries
            .entry(arguments.to_vec())
            .or_insert(resolved)
            .clone())
    }

    /// Name of the function this cache serves, once it has resolved one.
    pub fn function_name(&self) -> Option<&str> {
        self.function.get().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
