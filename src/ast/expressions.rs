use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::ast::operators::{BinaryOperator, Function, Signature, UnaryOperator};
use crate::evaluator::{EvalError, TypeContext};
use crate::value::{DataType, Value};

/// Outcome of overload resolution for one node.
///
/// The operand types are kept so a later query with different types can tell
/// the cached choice does not apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub operand_types: Vec<DataType>,
    /// Index into the node's candidate list
    pub index: usize,
}

/// Expression tree node.
///
/// Compound nodes hold the full overload list for their symbol or name and
/// pick one lazily, the first time their type is asked for. The choice is
/// written once and shared by every later evaluation.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Literal with its fixed type
    ///
    /// # Example
    /// ```text
    /// 42
    /// "hello"
    /// TRUE
    /// ```
    Constant { value: Value, data_type: DataType },

    /// Placeholder looked up in the evaluation context
    ///
    /// # Example
    /// ```text
    /// {{price}}
    /// ```
    Variable { name: String },

    /// Prefix operator application
    ///
    /// # Example
    /// ```text
    /// !{{active}}
    /// -{{delta}}
    /// ```
    UnaryOp {
        symbol: String,
        operand: Box<Expr>,
        candidates: Arc<[UnaryOperator]>,
        resolved: OnceLock<Resolution>,
    },

    /// Infix operator application
    ///
    /// # Example
    /// ```text
    /// {{price}} * 1.2
    /// ```
    BinaryOp {
        symbol: String,
        left: Box<Expr>,
        right: Box<Expr>,
        candidates: Arc<[BinaryOperator]>,
        resolved: OnceLock<Resolution>,
    },

    /// Function call; `name` is the registered spelling
    ///
    /// # Example
    /// ```text
    /// IF({{qty}} > 10, "bulk", "single")
    /// ```
    FunctionCall {
        name: String,
        args: Vec<Expr>,
        candidates: Arc<[Function]>,
        resolved: OnceLock<Resolution>,
    },
}

impl Expr {
    /// A literal node. `None` for `Value::Null`, which has no type of its own.
    pub fn constant(value: Value) -> Option<Expr> {
        let data_type = value.data_type()?;
        Some(Expr::Constant { value, data_type })
    }

    pub fn variable(name: impl Into<String>) -> Expr {
        Expr::Variable { name: name.into() }
    }

    pub fn unary(symbol: impl Into<String>, operand: Expr, candidates: Arc<[UnaryOperator]>) -> Expr {
        Expr::UnaryOp {
            symbol: symbol.into(),
            operand: Box::new(operand),
            candidates,
            resolved: OnceLock::new(),
        }
    }

    pub fn binary(
        symbol: impl Into<String>,
        left: Expr,
        right: Expr,
        candidates: Arc<[BinaryOperator]>,
    ) -> Expr {
        Expr::BinaryOp {
            symbol: symbol.into(),
            left: Box::new(left),
            right: Box::new(right),
            candidates,
            resolved: OnceLock::new(),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<Expr>, candidates: Arc<[Function]>) -> Expr {
        Expr::FunctionCall {
            name: name.into(),
            args,
            candidates,
            resolved: OnceLock::new(),
        }
    }

    /// Type this node produces under `types`, resolving overloads on the way.
    ///
    /// # Errors
    ///
    /// [`EvalError::VariableNotFound`] for an unknown variable,
    /// [`EvalError::NoMatchingOverload`] when no candidate accepts the operand
    /// types.
    pub fn return_type<C: TypeContext + ?Sized>(&self, types: &C) -> Result<DataType, EvalError> {
        match self {
            Expr::Constant { data_type, .. } => Ok(*data_type),
            Expr::Variable { name } => types.data_type(name),
            Expr::UnaryOp {
                symbol,
                operand,
                candidates,
                resolved,
            } => {
                let operand_types = vec![operand.return_type(types)?];
                resolve_overload(symbol, candidates, resolved, operand_types).map(|op| op.return_type())
            }
            Expr::BinaryOp {
                symbol,
                left,
                right,
                candidates,
                resolved,
            } => {
                let operand_types = vec![left.return_type(types)?, right.return_type(types)?];
                resolve_overload(symbol, candidates, resolved, operand_types).map(|op| op.return_type())
            }
            Expr::FunctionCall {
                name,
                args,
                candidates,
                resolved,
            } => {
                let operand_types = args
                    .iter()
                    .map(|arg| arg.return_type(types))
                    .collect::<Result<Vec<_>, _>>()?;
                resolve_overload(name, candidates, resolved, operand_types).map(|f| f.return_type())
            }
        }
    }

    /// Whether this node and all of its descendants have chosen an overload.
    /// Leaves count as resolved.
    pub fn is_resolved(&self) -> bool {
        match self {
            Expr::Constant { .. } | Expr::Variable { .. } => true,
            Expr::UnaryOp {
                operand, resolved, ..
            } => resolved.get().is_some() && operand.is_resolved(),
            Expr::BinaryOp {
                left,
                right,
                resolved,
                ..
            } => resolved.get().is_some() && left.is_resolved() && right.is_resolved(),
            Expr::FunctionCall { args, resolved, .. } => {
                resolved.get().is_some() && args.iter().all(Expr::is_resolved)
            }
        }
    }
}

/// Picks the first candidate whose declared types equal `operand_types`.
///
/// A cached choice is reused only when it was made for the same operand
/// types; otherwise the scan runs again. The cache is written at most once.
pub(crate) fn resolve_overload<'a, D: Signature>(
    key: &str,
    candidates: &'a [D],
    cache: &OnceLock<Resolution>,
    operand_types: Vec<DataType>,
) -> Result<&'a D, EvalError> {
    if let Some(cached) = cache.get()
        && cached.operand_types == operand_types
        && let Some(descriptor) = candidates.get(cached.index)
    {
        return Ok(descriptor);
    }

    let Some(index) = candidates.iter().position(|c| c.accepts(&operand_types)) else {
        return Err(EvalError::NoMatchingOverload {
            symbol: key.to_string(),
            operand_types,
        });
    };

    tracing::trace!(symbol = key, ?operand_types, index, "resolved overload");
    // A concurrent resolver may have won; its choice is identical for the
    // same operand types.
    let _ = cache.set(Resolution {
        operand_types,
        index,
    });
    Ok(&candidates[index])
}

fn write_string_literal(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    f.write_str("\"")?;
    for ch in s.chars() {
        if ch == '"' || ch == '\\' {
            f.write_str("\\")?;
        }
        write!(f, "{ch}")?;
    }
    f.write_str("\"")
}

/// Fully parenthesized rendering: `1 + 2 * 3` prints as `(1 + (2 * 3))`.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant {
                value: Value::String(s),
                ..
            } => write_string_literal(f, s),
            Expr::Constant { value, .. } => write!(f, "{value}"),
            Expr::Variable { name } => write!(f, "{{{{{name}}}}}"),
            Expr::UnaryOp {
                symbol, operand, ..
            } => write!(f, "({symbol}{operand})"),
            Expr::BinaryOp {
                symbol,
                left,
                right,
                ..
            } => write!(f, "({left} {symbol} {right})"),
            Expr::FunctionCall { name, args, .. } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}
