use crate::ast::{Associativity, BinaryOperator, UnaryOperator};
use crate::evaluator::EvalError;
use crate::registry::RegistryBuilder;
use crate::value::{DataType, Value};

use super::{ADDITIVE_PRECEDENCE, MULTIPLICATIVE_PRECEDENCE, POWER_PRECEDENCE, PREFIX_PRECEDENCE};
use super::{number, text};

pub(super) fn register(builder: &mut RegistryBuilder) {
    builder
        .add_binary_operator(numeric("+", ADDITIVE_PRECEDENCE, Associativity::Left, |a, b| {
            Some(a + b)
        }))
        .add_binary_operator(BinaryOperator::new(
            "+",
            ADDITIVE_PRECEDENCE,
            Associativity::Left,
            (DataType::String, DataType::String),
            DataType::String,
            |l, r| Ok(Value::String(format!("{}{}", text("+", l)?, text("+", r)?))),
        ))
        .add_binary_operator(numeric("-", ADDITIVE_PRECEDENCE, Associativity::Left, |a, b| {
            Some(a - b)
        }))
        .add_binary_operator(numeric("*", MULTIPLICATIVE_PRECEDENCE, Associativity::Left, |a, b| {
            Some(a * b)
        }))
        .add_binary_operator(numeric("/", MULTIPLICATIVE_PRECEDENCE, Associativity::Left, |a, b| {
            (b != 0.0).then(|| a / b)
        }))
        .add_binary_operator(numeric("%", MULTIPLICATIVE_PRECEDENCE, Associativity::Left, |a, b| {
            (b != 0.0).then(|| a % b)
        }))
        .add_binary_operator(numeric("^", POWER_PRECEDENCE, Associativity::Right, |a, b| {
            Some(a.powf(b))
        }))
        .add_unary_operator(UnaryOperator::new(
            "-",
            PREFIX_PRECEDENCE,
            Associativity::Right,
            DataType::Number,
            DataType::Number,
            |v| Ok(Value::Number(-number("-", v)?)),
        ));
}

/// Number × Number → Number operator. `op` returns `None` for a zero divisor.
fn numeric(
    symbol: &'static str,
    precedence: u8,
    associativity: Associativity,
    op: fn(f64, f64) -> Option<f64>,
) -> BinaryOperator {
    BinaryOperator::new(
        symbol,
        precedence,
        associativity,
        (DataType::Number, DataType::Number),
        DataType::Number,
        move |l, r| {
            let (l, r) = (number(symbol, l)?, number(symbol, r)?);
            op(l, r).map(Value::Number).ok_or_else(|| EvalError::DivisionByZero {
                symbol: symbol.to_string(),
            })
        },
    )
}
