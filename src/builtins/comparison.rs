use std::cmp::Ordering;

use crate::ast::{Associativity, BinaryOperator};
use crate::evaluator::EvalError;
use crate::registry::RegistryBuilder;
use crate::value::{DataType, Value};

use super::{EQUALITY_PRECEDENCE, RELATIONAL_PRECEDENCE};
use super::{mismatch, moment, number};

const EQUATABLE: [DataType; 4] = [
    DataType::String,
    DataType::Number,
    DataType::Boolean,
    DataType::DateTime,
];

pub(super) fn register(builder: &mut RegistryBuilder) {
    for data_type in EQUATABLE {
        builder
            .add_binary_operator(equality("==", data_type, false))
            .add_binary_operator(equality("!=", data_type, true));
    }

    let relational: [(&'static str, fn(Ordering) -> bool); 4] = [
        (">", Ordering::is_gt),
        (">=", Ordering::is_ge),
        ("<", Ordering::is_lt),
        ("<=", Ordering::is_le),
    ];
    for (symbol, test) in relational {
        builder
            .add_binary_operator(compare_numbers(symbol, test))
            .add_binary_operator(compare_moments(symbol, test));
    }
}

/// Missing operands are comparable here, unlike every other operator: two
/// missing values are equal, one missing value is unequal to anything.
fn equals(symbol: &str, data_type: DataType, left: &Value, right: &Value) -> Result<bool, EvalError> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(true),
        (Value::Null, _) | (_, Value::Null) => Ok(false),
        _ => {
            for value in [left, right] {
                if value.data_type() != Some(data_type) {
                    return Err(mismatch(symbol, data_type, value));
                }
            }
            Ok(left == right)
        }
    }
}

fn equality(symbol: &'static str, data_type: DataType, negate: bool) -> BinaryOperator {
    BinaryOperator::new(
        symbol,
        EQUALITY_PRECEDENCE,
        Associativity::Left,
        (data_type, data_type),
        DataType::Boolean,
        move |l, r| Ok(Value::Boolean(equals(symbol, data_type, l, r)? != negate)),
    )
}

fn compare_numbers(symbol: &'static str, test: fn(Ordering) -> bool) -> BinaryOperator {
    BinaryOperator::new(
        symbol,
        RELATIONAL_PRECEDENCE,
        Associativity::Left,
        (DataType::Number, DataType::Number),
        DataType::Boolean,
        move |l, r| {
            let (l, r) = (number(symbol, l)?, number(symbol, r)?);
            // NaN compares false against everything
            Ok(Value::Boolean(l.partial_cmp(&r).is_some_and(test)))
        },
    )
}

fn compare_moments(symbol: &'static str, test: fn(Ordering) -> bool) -> BinaryOperator {
    BinaryOperator::new(
        symbol,
        RELATIONAL_PRECEDENCE,
        Associativity::Left,
        (DataType::DateTime, DataType::DateTime),
        DataType::Boolean,
        move |l, r| {
            let (l, r) = (moment(symbol, l)?, moment(symbol, r)?);
            Ok(Value::Boolean(test(l.cmp(&r))))
        },
    )
}
