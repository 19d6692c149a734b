//! Error taxonomy shared by every phase.
//!
//! Each phase has its own error enum ([`LexError`](crate::lexer::LexError),
//! [`ParseError`](crate::parser::ParseError),
//! [`EvalError`](crate::evaluator::EvalError)); all of them map onto one
//! [`ErrorKind`] so callers can branch on the category without matching every
//! variant.

use thiserror::Error;

use crate::evaluator::EvalError;
use crate::parser::ParseError;

/// Category of a parse or evaluation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unrecognized lexeme, unterminated string or placeholder
    Syntax,
    /// Mismatched parentheses, missing operands, leftover expressions
    Structural,
    /// No operator or function overload accepts the operand types
    OverloadResolution,
    /// The context has no variable with that name
    VariableNotFound,
    /// Division by zero
    Arithmetic,
    /// A value is not usable by the selected rule
    TypeCoercion,
}

/// Failure of a combined parse-and-evaluate call.
#[derive(Debug, Clone, Error)]
pub enum FormulaError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),
}

impl FormulaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FormulaError::Parse(e) => e.kind(),
            FormulaError::Eval(e) => e.kind(),
        }
    }
}
