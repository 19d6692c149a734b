use crate::ast::{Associativity, BinaryOperator, UnaryOperator};
use crate::registry::RegistryBuilder;
use crate::value::{DataType, Value};

use super::boolean;
use super::{AND_PRECEDENCE, OR_PRECEDENCE, PREFIX_PRECEDENCE};

pub(super) fn register(builder: &mut RegistryBuilder) {
    builder
        .add_unary_operator(UnaryOperator::new(
            "!",
            PREFIX_PRECEDENCE,
            Associativity::Right,
            DataType::Boolean,
            DataType::Boolean,
            |v| Ok(Value::Boolean(!boolean("!", v)?)),
        ))
        .add_binary_operator(connective("&&", AND_PRECEDENCE, |a, b| a && b))
        .add_binary_operator(connective("||", OR_PRECEDENCE, |a, b| a || b));
}

/// Both operands are always evaluated; there is no short-circuit.
fn connective(symbol: &'static str, precedence: u8, op: fn(bool, bool) -> bool) -> BinaryOperator {
    BinaryOperator::new(
        symbol,
        precedence,
        Associativity::Left,
        (DataType::Boolean, DataType::Boolean),
        DataType::Boolean,
        move |l, r| Ok(Value::Boolean(op(boolean(symbol, l)?, boolean(symbol, r)?))),
    )
}
