//! # Formula Language - Syntax Tree
//!
//! This module defines the tokens and tree nodes a formula passes through on
//! its way from text to value.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer and re-tagged by the
//!   postfix converter
//! - **[expressions]** - Tree nodes (constants, variables, operator and
//!   function applications)
//! - **[operators]** - Typed operator and function descriptors
//!
//! ## Quick Start
//!
//! ```text
//! IF({{qty}} >= 10, {{price}} * 0.9, {{price}})
//! ```
//!
//! Evaluates to a discounted price when at least ten items are ordered.
//!
//! ## Core Concepts
//!
//! ### Overloads
//!
//! A symbol such as `==` or a name such as `IF` may have several descriptors,
//! one per operand type combination. The tree keeps all of them and picks one
//! when the operand types are first known:
//!
//! ```text
//! {{a}} == {{b}}        // Number == Number, String == String, ...
//! IF(c, "x", "y")       // IF(Boolean, String, String) -> String
//! ```
//!
//! ### Prefix and Infix
//!
//! `-` is both a binary and a unary operator. Which one applies is decided by
//! position: after an operand it is infix, anywhere else it is prefix.
//!
//! ```text
//! 3 - -2                // 3 minus (negative 2)
//! !({{a}} && {{b}})     // prefix not
//! ```
pub mod tokens;
pub mod expressions;
pub mod operators;

pub use tokens::{Payload, Token, TokenKind};
pub use expressions::{Expr, Resolution};
pub use operators::{
    Associativity, BinaryOperator, BinaryRule, Fixity, Function, FunctionRule, Signature,
    UnaryOperator, UnaryRule,
};
