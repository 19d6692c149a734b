use std::collections::HashMap;

use thiserror::Error;

use crate::ast::expressions::resolve_overload;
use crate::ast::{Expr, Signature};
use crate::error::ErrorKind;
use crate::value::{DataType, Value};

/// Errors raised while resolving overloads or evaluating a tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("no overload of '{symbol}' accepts ({})", join_types(.operand_types))]
    NoMatchingOverload {
        symbol: String,
        operand_types: Vec<DataType>,
    },

    #[error("variable '{0}' not found")]
    VariableNotFound(String),

    #[error("division by zero in '{symbol}'")]
    DivisionByZero { symbol: String },

    /// A missing (`Null`) value reached an operator that needs a real one
    #[error("missing operand for '{symbol}'")]
    MissingOperand { symbol: String },

    #[error("'{symbol}' expected {expected}, found {found}")]
    TypeMismatch {
        symbol: String,
        expected: DataType,
        found: &'static str,
    },

    #[error("invalid argument to {function}: {message}")]
    InvalidArgument { function: String, message: String },

    /// Variable exists but carries no type, e.g. a bare `Null`
    #[error("variable '{name}' has no declared type")]
    UntypedVariable { name: String },
}

fn join_types(types: &[DataType]) -> String {
    types
        .iter()
        .map(DataType::name)
        .collect::<Vec<_>>()
        .join(", ")
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::NoMatchingOverload { .. } => ErrorKind::OverloadResolution,
            EvalError::VariableNotFound(_) => ErrorKind::VariableNotFound,
            EvalError::DivisionByZero { .. } => ErrorKind::Arithmetic,
            EvalError::MissingOperand { .. }
            | EvalError::TypeMismatch { .. }
            | EvalError::InvalidArgument { .. }
            | EvalError::UntypedVariable { .. } => ErrorKind::TypeCoercion,
        }
    }
}

/// Answers "what type is this variable" without producing its value.
pub trait TypeContext {
    fn data_type(&self, name: &str) -> Result<DataType, EvalError>;
}

/// Supplies variable values during evaluation.
pub trait EvalContext: TypeContext {
    /// Current value of `name`. `Value::Null` means declared but missing.
    fn variable_value(&self, name: &str) -> Result<Value, EvalError>;
}

impl TypeContext for HashMap<String, DataType> {
    fn data_type(&self, name: &str) -> Result<DataType, EvalError> {
        self.get(name)
            .copied()
            .ok_or_else(|| EvalError::VariableNotFound(name.to_string()))
    }
}

/// In-memory variable bindings.
///
/// [`insert`](VariableMap::insert) takes the type from the value itself;
/// [`declare`](VariableMap::declare) sets it explicitly, which is the only way
/// to bind a typed `Null`.
///
/// ```
/// use formula_lang::{DataType, Parser, Value, VariableMap};
///
/// let vars = VariableMap::new()
///     .with("price", 20.0)
///     .with("qty", 3);
///
/// let parser = Parser::with_defaults();
/// let total = parser.evaluate("{{price}} * {{qty}}", &vars).unwrap();
/// assert_eq!(total, Value::Number(60.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableMap {
    entries: HashMap<String, (Option<DataType>, Value)>,
}

impl VariableMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let value = value.into();
        self.entries.insert(name.into(), (value.data_type(), value));
    }

    pub fn declare(&mut self, name: impl Into<String>, data_type: DataType, value: impl Into<Value>) {
        self.entries.insert(name.into(), (Some(data_type), value.into()));
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TypeContext for VariableMap {
    fn data_type(&self, name: &str) -> Result<DataType, EvalError> {
        match self.entries.get(name) {
            Some((Some(data_type), _)) => Ok(*data_type),
            Some((None, _)) => Err(EvalError::UntypedVariable {
                name: name.to_string(),
            }),
            None => Err(EvalError::VariableNotFound(name.to_string())),
        }
    }
}

impl EvalContext for VariableMap {
    fn variable_value(&self, name: &str) -> Result<Value, EvalError> {
        self.get(name)
            .cloned()
            .ok_or_else(|| EvalError::VariableNotFound(name.to_string()))
    }
}

/// Every non-null operand must carry the type the chosen overload declared.
fn check_operands(symbol: &str, declared: &[DataType], values: &[Value]) -> Result<(), EvalError> {
    for (expected, value) in declared.iter().zip(values) {
        if let Some(found) = value.data_type()
            && found != *expected
        {
            return Err(EvalError::TypeMismatch {
                symbol: symbol.to_string(),
                expected: *expected,
                found: value.type_name(),
            });
        }
    }
    Ok(())
}

impl Expr {
    /// Evaluates the tree against `ctx`.
    ///
    /// Children are evaluated first, left to right; each compound node then
    /// resolves its overload from its children's types and applies the rule.
    /// Nothing is memoized except the overload choice.
    pub fn evaluate<C: EvalContext + ?Sized>(&self, ctx: &C) -> Result<Value, EvalError> {
        self.eval_typed(ctx).map(|(value, _)| value)
    }

    fn eval_typed<C: EvalContext + ?Sized>(&self, ctx: &C) -> Result<(Value, DataType), EvalError> {
        match self {
            Expr::Constant { value, data_type } => Ok((value.clone(), *data_type)),

            Expr::Variable { name } => {
                let data_type = ctx.data_type(name)?;
                Ok((ctx.variable_value(name)?, data_type))
            }

            Expr::UnaryOp {
                symbol,
                operand,
                candidates,
                resolved,
            } => {
                let (value, operand_type) = operand.eval_typed(ctx)?;
                let op = resolve_overload(symbol, candidates, resolved, vec![operand_type])?;
                check_operands(symbol, op.parameter_types(), std::slice::from_ref(&value))?;
                Ok((op.apply(&value)?, op.return_type()))
            }

            Expr::BinaryOp {
                symbol,
                left,
                right,
                candidates,
                resolved,
            } => {
                let (left, left_type) = left.eval_typed(ctx)?;
                let (right, right_type) = right.eval_typed(ctx)?;
                let op = resolve_overload(symbol, candidates, resolved, vec![left_type, right_type])?;
                let operands = [left, right];
                check_operands(symbol, op.parameter_types(), &operands)?;
                let [left, right] = &operands;
                Ok((op.apply(left, right)?, op.return_type()))
            }

            Expr::FunctionCall {
                name,
                args,
                candidates,
                resolved,
            } => {
                let (values, types): (Vec<Value>, Vec<DataType>) = args
                    .iter()
                    .map(|arg| arg.eval_typed(ctx))
                    .collect::<Result<Vec<_>, _>>()?
                    .into_iter()
                    .unzip();
                let function = resolve_overload(name, candidates, resolved, types)?;
                check_operands(name, function.parameter_types(), &values)?;
                Ok((function.apply(&values)?, function.return_type()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moment::Moment;

    #[test]
    fn test_declared_null_keeps_type() {
        let mut vars = VariableMap::new();
        vars.declare("missing", DataType::Number, Value::Null);
        assert_eq!(vars.data_type("missing"), Ok(DataType::Number));
        assert_eq!(vars.variable_value("missing"), Ok(Value::Null));
    }

    #[test]
    fn test_inserted_null_is_untyped() {
        let mut vars = VariableMap::new();
        vars.insert("nothing", Value::Null);
        assert_eq!(
            vars.data_type("nothing"),
            Err(EvalError::UntypedVariable {
                name: "nothing".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_variable() {
        let vars = VariableMap::new().with("d", Moment::from_millis(0));
        assert_eq!(vars.data_type("d"), Ok(DataType::DateTime));
        let err = vars.variable_value("x").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VariableNotFound);
    }

    #[test]
    fn test_overload_error_message_lists_types() {
        let err = EvalError::NoMatchingOverload {
            symbol: "==".to_string(),
            operand_types: vec![DataType::Number, DataType::String],
        };
        assert_eq!(err.to_string(), "no overload of '==' accepts (Number, String)");
    }
}
