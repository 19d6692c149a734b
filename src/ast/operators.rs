//! Operator and function descriptors.
//!
//! A descriptor is one typed overload: it declares its operand or parameter
//! types up front, so overload resolution is a lookup against these
//! signatures and never inspects runtime values.

use std::fmt;
use std::sync::Arc;

use crate::evaluator::EvalError;
use crate::value::{DataType, Value};

/// Evaluation rule of a unary operator.
pub type UnaryRule = Arc<dyn Fn(&Value) -> Result<Value, EvalError> + Send + Sync>;

/// Evaluation rule of a binary operator, `(left, right)`.
pub type BinaryRule = Arc<dyn Fn(&Value, &Value) -> Result<Value, EvalError> + Send + Sync>;

/// Evaluation rule of a function over its arguments, in call order.
pub type FunctionRule = Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
}

/// Whether an operator occurrence takes one operand (prefix) or two (infix).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Infix,
}

/// Common view over descriptors used by overload resolution.
pub trait Signature {
    /// Symbol or function name, as registered.
    fn key(&self) -> &str;
    fn parameter_types(&self) -> &[DataType];
    fn return_type(&self) -> DataType;

    fn accepts(&self, operand_types: &[DataType]) -> bool {
        self.parameter_types() == operand_types
    }
}

/// A prefix operator overload, such as `!` over Boolean.
#[derive(Clone)]
pub struct UnaryOperator {
    symbol: String,
    precedence: u8,
    associativity: Associativity,
    operand: [DataType; 1],
    return_type: DataType,
    rule: UnaryRule,
}

impl UnaryOperator {
    pub fn new<F>(
        symbol: impl Into<String>,
        precedence: u8,
        associativity: Associativity,
        operand: DataType,
        return_type: DataType,
        rule: F,
    ) -> Self
    where
        F: Fn(&Value) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        UnaryOperator {
            symbol: symbol.into(),
            precedence,
            associativity,
            operand: [operand],
            return_type,
            rule: Arc::new(rule),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    pub fn associativity(&self) -> Associativity {
        self.associativity
    }

    pub fn operand_type(&self) -> DataType {
        self.operand[0]
    }

    pub fn apply(&self, operand: &Value) -> Result<Value, EvalError> {
        (self.rule)(operand)
    }
}

impl Signature for UnaryOperator {
    fn key(&self) -> &str {
        &self.symbol
    }

    fn parameter_types(&self) -> &[DataType] {
        &self.operand
    }

    fn return_type(&self) -> DataType {
        self.return_type
    }
}

impl fmt::Debug for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnaryOperator")
            .field("symbol", &self.symbol)
            .field("precedence", &self.precedence)
            .field("associativity", &self.associativity)
            .field("operand", &self.operand[0])
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// An infix operator overload, such as `+` over (Number, Number).
#[derive(Clone)]
pub struct BinaryOperator {
    symbol: String,
    precedence: u8,
    associativity: Associativity,
    operands: [DataType; 2],
    return_type: DataType,
    rule: BinaryRule,
}

impl BinaryOperator {
    pub fn new<F>(
        symbol: impl Into<String>,
        precedence: u8,
        associativity: Associativity,
        operands: (DataType, DataType),
        return_type: DataType,
        rule: F,
    ) -> Self
    where
        F: Fn(&Value, &Value) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        BinaryOperator {
            symbol: symbol.into(),
            precedence,
            associativity,
            operands: [operands.0, operands.1],
            return_type,
            rule: Arc::new(rule),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    pub fn associativity(&self) -> Associativity {
        self.associativity
    }

    pub fn left_type(&self) -> DataType {
        self.operands[0]
    }

    pub fn right_type(&self) -> DataType {
        self.operands[1]
    }

    pub fn apply(&self, left: &Value, right: &Value) -> Result<Value, EvalError> {
        (self.rule)(left, right)
    }
}

impl Signature for BinaryOperator {
    fn key(&self) -> &str {
        &self.symbol
    }

    fn parameter_types(&self) -> &[DataType] {
        &self.operands
    }

    fn return_type(&self) -> DataType {
        self.return_type
    }
}

impl fmt::Debug for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryOperator")
            .field("symbol", &self.symbol)
            .field("precedence", &self.precedence)
            .field("associativity", &self.associativity)
            .field("operands", &self.operands)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}

/// A function overload, such as `IF(Boolean, Number, Number) -> Number`.
///
/// Names are matched case-insensitively.
#[derive(Clone)]
pub struct Function {
    name: String,
    parameters: Vec<DataType>,
    return_type: DataType,
    rule: FunctionRule,
}

impl Function {
    pub fn new<F>(
        name: impl Into<String>,
        parameters: Vec<DataType>,
        return_type: DataType,
        rule: F,
    ) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static,
    {
        Function {
            name: name.into(),
            parameters,
            return_type,
            rule: Arc::new(rule),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn apply(&self, args: &[Value]) -> Result<Value, EvalError> {
        (self.rule)(args)
    }
}

impl Signature for Function {
    fn key(&self) -> &str {
        &self.name
    }

    fn parameter_types(&self) -> &[DataType] {
        &self.parameters
    }

    fn return_type(&self) -> DataType {
        self.return_type
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}
