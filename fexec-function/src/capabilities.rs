/// Per-function switches that select which adaptation layers apply.
///
/// A function builds this record once and returns it from
/// [`ScalarFunction::capabilities`](crate::ScalarFunction::capabilities); the
/// executor and the return-type resolver read nothing else when deciding how
/// to adapt a call.
///
/// # Examples
///
/// ```
/// use fexec_function::FunctionCapabilities;
///
/// let caps = FunctionCapabilities::default()
///     .with_constants(true)
///     .with_always_constant_arguments(vec![1]);
/// assert!(caps.default_for_nulls);
/// assert!(caps.is_always_constant(1));
/// assert!(!caps.is_always_constant(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCapabilities {
    /// Strip nullable arguments, run on the nested values and re-wrap the nulls.
    pub default_for_nulls: bool,
    /// Run once on the single value when every argument is constant.
    pub default_for_constants: bool,
    /// Run on a dictionary's values instead of its expanded rows.
    pub default_for_low_cardinality: bool,
    /// Run on the non-default rows of a single sparse argument.
    pub default_for_sparse: bool,
    /// Short-circuit arguments of the empty type.
    pub default_for_nothing: bool,
    /// Argument positions that must arrive as constants and stay constant.
    pub always_constant_arguments: Vec<usize>,
    /// Evaluating the function on default values cannot fail or mislead.
    pub safe_on_default_arguments: bool,
    /// The function may produce a dictionary-encoded result from dictionary values.
    pub safe_on_dictionary_values: bool,
}

impl Default for FunctionCapabilities {
    fn default() -> Self {
        Self {
            default_for_nulls: true,
            default_for_constants: false,
            default_for_low_cardinality: true,
            default_for_sparse: true,
            default_for_nothing: true,
            always_constant_arguments: Vec::new(),
            safe_on_default_arguments: true,
            safe_on_dictionary_values: true,
        }
    }
}

impl FunctionCapabilities {
    /// Every adaptation layer disabled. The function sees its arguments untouched.
    pub fn none() -> Self {
        Self {
            default_for_nulls: false,
            default_for_constants: false,
            default_for_low_cardinality: false,
            default_for_sparse: false,
            default_for_nothing: false,
            always_constant_arguments: Vec::new(),
            safe_on_default_arguments: true,
            safe_on_dictionary_values: false,
        }
    }

    pub fn with_nulls(mut self, enabled: bool) -> Self {
        self.default_for_nulls = enabled;
        self
    }

    pub fn with_constants(mut self, enabled: bool) -> Self {
        self.default_for_constants = enabled;
        self
    }

    pub fn with_low_cardinality(mut self, enabled: bool) -> Self {
        self.default_for_low_cardinality = enabled;
        self
    }

    pub fn with_sparse(mut self, enabled: bool) -> Self {
        self.default_for_sparse = enabled;
        self
    }

    pub fn with_nothing(mut self, enabled: bool) -> Self {
        self.default_for_nothing = enabled;
        self
    }

    pub fn with_always_constant_arguments(mut self, positions: Vec<usize>) -> Self {
        self.always_constant_arguments = positions;
        self
    }

    pub fn with_safe_on_default_arguments(mut self, safe: bool) -> Self {
        self.safe_on_default_arguments = safe;
        self
    }

    pub fn with_safe_on_dictionary_values(mut self, safe: bool) -> Self {
        self.safe_on_dictionary_values = safe;
        self
    }

    #[inline]
    pub fn is_always_constant(&self, position: usize) -> bool {
        self.always_constant_arguments.contains(&position)
    }
}
