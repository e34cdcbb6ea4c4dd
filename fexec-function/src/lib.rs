//! Adapting plain-column functions to every column representation.
//!
//! A [`ScalarFunction`] computes results over plain columns and declares,
//! through [`FunctionCapabilities`], which adaptations it accepts. The
//! [`FunctionExecutor`] applies those adaptations around each call so the
//! function body never sees constant, nullable, dictionary-encoded or sparse
//! columns it did not ask for. [`resolver::return_type`] computes the result
//! type the executor will produce, and [`BoundFunction`] ties the two together
//! for one argument signature.

pub mod base;
pub mod capabilities;
pub mod compile;
pub mod executor;
pub mod function;
pub mod resolver;

pub use base::BoundFunction;
pub use capabilities::FunctionCapabilities;
pub use compile::{IrBuilder, NativeBinaryOp, ValueId, ValueWithType};
pub use executor::{FunctionExecutor, Stage};
pub use function::ScalarFunction;
pub use resolver::{ArgumentSignature, ReturnTypeCache};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<BoundFunction>();
        assert_send_sync::<ReturnTypeCache>();
        assert_send_sync::<FunctionCapabilities>();
        assert_send_sync::<std::sync::Arc<dyn ScalarFunction>>();
    }
}
