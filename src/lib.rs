//! A small typed formula language.
//!
//! Formulas such as `IF({{qty}} >= 10, {{price}} * 0.9, {{price}})` are lexed
//! against a [`Registry`] of operators and functions, reordered into postfix,
//! built into an [`Expr`] tree and evaluated against a variable context.
//! Operators and functions are overloaded by operand type; the tree picks the
//! overload once the operand types are known.

pub mod ast;
pub mod builtins;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod moment;
pub mod parser;
pub mod postfix;
pub mod registry;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{
    Associativity, BinaryOperator, Expr, Fixity, Function, Payload, Signature, Token, TokenKind,
    UnaryOperator,
};
pub use error::{ErrorKind, FormulaError};
pub use evaluator::{EvalContext, EvalError, TypeContext, VariableMap};
pub use lexer::{LexError, Lexer};
pub use moment::{Moment, ParseMomentError};
pub use parser::{ParseError, Parser};
pub use registry::{Registry, RegistryBuilder, RegistryError};
pub use value::{DataType, Value};
