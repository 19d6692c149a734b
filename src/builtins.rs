//! The reference operator and function catalog.
//!
//! | Symbol | Fixity | Precedence | Assoc |
//! |---|---|---|---|
//! | `\|\|` | infix | 1 | left |
//! | `&&` | infix | 2 | left |
//! | `==` `!=` | infix | 3 | left |
//! | `>` `>=` `<` `<=` | infix | 4 | left |
//! | `+` `-` | infix | 5 | left |
//! | `*` `/` `%` | infix | 6 | left |
//! | `^` | infix | 7 | right |
//! | `!` `-` | prefix | 8 | right |
//!
//! Functions: `IF`, `DATEDIFF`, `DATEADD`.

mod arithmetic;
mod comparison;
mod functions;
mod logical;

use crate::evaluator::EvalError;
use crate::moment::Moment;
use crate::registry::RegistryBuilder;
use crate::value::{DataType, Value};

pub const OR_PRECEDENCE: u8 = 1;
pub const AND_PRECEDENCE: u8 = 2;
pub const EQUALITY_PRECEDENCE: u8 = 3;
pub const RELATIONAL_PRECEDENCE: u8 = 4;
pub const ADDITIVE_PRECEDENCE: u8 = 5;
pub const MULTIPLICATIVE_PRECEDENCE: u8 = 6;
pub const POWER_PRECEDENCE: u8 = 7;
pub const PREFIX_PRECEDENCE: u8 = 8;

pub(crate) fn register_defaults(builder: &mut RegistryBuilder) {
    logical::register(builder);
    arithmetic::register(builder);
    comparison::register(builder);
    functions::register(builder);
}

fn mismatch(symbol: &str, expected: DataType, found: &Value) -> EvalError {
    EvalError::TypeMismatch {
        symbol: symbol.to_string(),
        expected,
        found: found.type_name(),
    }
}

fn missing(symbol: &str) -> EvalError {
    EvalError::MissingOperand {
        symbol: symbol.to_string(),
    }
}

fn number(symbol: &str, value: &Value) -> Result<f64, EvalError> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::Null => Err(missing(symbol)),
        other => Err(mismatch(symbol, DataType::Number, other)),
    }
}

fn boolean(symbol: &str, value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::Boolean(b) => Ok(*b),
        Value::Null => Err(missing(symbol)),
        other => Err(mismatch(symbol, DataType::Boolean, other)),
    }
}

fn text<'v>(symbol: &str, value: &'v Value) -> Result<&'v str, EvalError> {
    match value {
        Value::String(s) => Ok(s),
        Value::Null => Err(missing(symbol)),
        other => Err(mismatch(symbol, DataType::String, other)),
    }
}

fn moment(symbol: &str, value: &Value) -> Result<Moment, EvalError> {
    match value {
        Value::DateTime(m) => Ok(*m),
        Value::Null => Err(missing(symbol)),
        other => Err(mismatch(symbol, DataType::DateTime, other)),
    }
}
