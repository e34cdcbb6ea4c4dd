//! An [`IrBuilder`] that evaluates instructions eagerly.
//!
//! Tests hand it concrete input values and read back the value a compiled
//! function produced.

use arrow::datatypes::DataType as ArrowDataType;

use fexec_function::{IrBuilder, NativeBinaryOp, ValueId};
use fexec_result::{Error, Result};
use fexec_types::DataType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrValue {
    Int(i64),
    Bool(bool),
    Struct(Vec<IrValue>),
}

impl IrValue {
    /// A nullable value: the nested value and its null flag.
    pub fn nullable(value: IrValue, is_null: bool) -> Self {
        IrValue::Struct(vec![value, IrValue::Bool(is_null)])
    }
}

#[derive(Debug, Default)]
pub struct Interpreter {
    values: Vec<IrValue>,
    instructions: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&mut self, value: IrValue) -> ValueId {
        self.push(value)
    }

    pub fn value(&self, id: ValueId) -> Result<&IrValue> {
        self.values
            .get(id.0 as usize)
            .ok_or_else(|| Error::invariant(format!("unknown value {}", id.0)))
    }

    /// Number of instructions emitted so far, inputs excluded.
    pub fn instructions(&self) -> usize {
        self.instructions
    }

    fn push(&mut self, value: IrValue) -> ValueId {
        self.values.push(value);
        ValueId((self.values.len() - 1) as u32)
    }

    fn emit(&mut self, value: IrValue) -> ValueId {
        self.instructions += 1;
        self.push(value)
    }

    fn zero(data_type: &DataType) -> Result<IrValue> {
        match data_type {
            DataType::Plain(ArrowDataType::Boolean) => Ok(IrValue::Bool(false)),
            DataType::Plain(dt) if dt.is_integer() => Ok(IrValue::Int(0)),
            DataType::Nullable(inner) => Ok(IrValue::nullable(Self::zero(inner)?, false)),
            other => Err(Error::unsupported(format!("no native type for {other}"))),
        }
    }
}

impl IrBuilder for Interpreter {
    fn extract_value(&mut self, aggregate: ValueId, index: u32) -> Result<ValueId> {
        let field = match self.value(aggregate)? {
            IrValue::Struct(fields) => fields.get(index as usize).cloned(),
            _ => None,
        };
        let field =
            field.ok_or_else(|| Error::invariant(format!("no field {index} in value {}", aggregate.0)))?;
        Ok(self.emit(field))
    }

    fn insert_value(&mut self, aggregate: ValueId, value: ValueId, index: u32) -> Result<ValueId> {
        let inserted = self.value(value)?.clone();
        let mut fields = match self.value(aggregate)? {
            IrValue::Struct(fields) if (index as usize) < fields.len() => fields.clone(),
            _ => {
                return Err(Error::invariant(format!(
                    "cannot insert field {index} into value {}",
                    aggregate.0
                )));
            }
        };
        fields[index as usize] = inserted;
        Ok(self.emit(IrValue::Struct(fields)))
    }

    fn binary(&mut self, op: NativeBinaryOp, lhs: ValueId, rhs: ValueId) -> Result<ValueId> {
        let result = match (op, self.value(lhs)?, self.value(rhs)?) {
            (NativeBinaryOp::Add, IrValue::Int(a), IrValue::Int(b)) => IrValue::Int(a.wrapping_add(*b)),
            (NativeBinaryOp::Sub, IrValue::Int(a), IrValue::Int(b)) => IrValue::Int(a.wrapping_sub(*b)),
            (NativeBinaryOp::Mul, IrValue::Int(a), IrValue::Int(b)) => IrValue::Int(a.wrapping_mul(*b)),
            (NativeBinaryOp::And, IrValue::Bool(a), IrValue::Bool(b)) => IrValue::Bool(*a && *b),
            (NativeBinaryOp::Or, IrValue::Bool(a), IrValue::Bool(b)) => IrValue::Bool(*a || *b),
            (op, a, b) => {
                return Err(Error::invariant(format!(
                    "cannot apply {op:?} to {a:?} and {b:?}"
                )));
            }
        };
        Ok(self.emit(result))
    }

    fn zero_value(&mut self, data_type: &DataType) -> Result<ValueId> {
        let zero = Self::zero(data_type)?;
        Ok(self.emit(zero))
    }
}
