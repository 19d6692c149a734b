use std::sync::Arc;

use thiserror::Error;

use crate::ast::{Expr, Token, TokenKind};
use crate::error::{ErrorKind, FormulaError};
use crate::evaluator::{EvalContext, EvalError, TypeContext};
use crate::lexer::{LexError, Lexer};
use crate::postfix;
use crate::registry::Registry;
use crate::value::Value;

/// Errors raised while turning formula text into a tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("mismatched parenthesis at position {position}")]
    MismatchedParenthesis { position: usize },

    /// An operator or function has fewer operands than it needs
    #[error("missing operand for '{symbol}' at position {position}")]
    MissingOperand { symbol: String, position: usize },

    #[error("'{symbol}' at position {position} cannot be used as a binary operator")]
    NotBinaryOperator { symbol: String, position: usize },

    #[error("malformed formula: expected one expression, found {operands}")]
    MalformedExpression { operands: usize },

    #[error("unexpected '{text}' at position {position}")]
    UnexpectedToken { text: String, position: usize },

    /// Eager overload resolution failed in [`Parser::parse_typed`]
    #[error(transparent)]
    Resolution(#[from] EvalError),
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Lex(e) => e.kind(),
            ParseError::Resolution(e) => e.kind(),
            ParseError::MismatchedParenthesis { .. }
            | ParseError::MissingOperand { .. }
            | ParseError::NotBinaryOperator { .. }
            | ParseError::MalformedExpression { .. }
            | ParseError::UnexpectedToken { .. } => ErrorKind::Structural,
        }
    }
}

/// Parses formula text into [`Expr`] trees against one registry.
///
/// A parser is cheap to clone and can be shared between threads; every
/// parse call is independent.
///
/// # Examples
///
/// ```
/// use formula_lang::{Parser, Value, VariableMap};
///
/// let parser = Parser::with_defaults();
/// let expr = parser.parse("1 + 2 * 3").unwrap();
/// assert_eq!(expr.to_string(), "(1 + (2 * 3))");
/// assert_eq!(expr.evaluate(&VariableMap::new()).unwrap(), Value::Number(7.0));
/// ```
#[derive(Debug, Clone)]
pub struct Parser {
    registry: Arc<Registry>,
}

impl Parser {
    pub fn new(registry: Registry) -> Self {
        Parser {
            registry: Arc::new(registry),
        }
    }

    /// Parser over [`Registry::defaults`].
    pub fn with_defaults() -> Self {
        Self::new(Registry::defaults())
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Lexes `input`; the last token is [`TokenKind::End`].
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, ParseError> {
        let tokens = Lexer::new(input, &self.registry).tokenize()?;
        tracing::trace!(count = tokens.len(), "tokenized");
        Ok(tokens)
    }

    /// Lexes `input` and reorders it into postfix.
    pub fn to_postfix(&self, input: &str) -> Result<Vec<Token>, ParseError> {
        let tokens = self.tokenize(input)?;
        let postfix = postfix::to_postfix(tokens, &self.registry)?;
        tracing::trace!(postfix = %postfix::render(&postfix), "converted to postfix");
        Ok(postfix)
    }

    /// Parses `input` into an unresolved tree.
    ///
    /// Overloads are picked later, when the tree is first typed or evaluated,
    /// so a formula over variables parses without knowing their types.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn parse(&self, input: &str) -> Result<Expr, ParseError> {
        let postfix = self.to_postfix(input)?;
        self.build_tree(postfix)
    }

    /// Parses `input` and resolves every overload against `types` up front.
    ///
    /// ```
    /// use std::collections::HashMap;
    /// use formula_lang::{DataType, ErrorKind, Parser};
    ///
    /// let types = HashMap::from([("name".to_string(), DataType::String)]);
    /// let parser = Parser::with_defaults();
    ///
    /// assert!(parser.parse_typed("{{name}} + \"!\"", &types).is_ok());
    /// let err = parser.parse_typed("{{name}} * 2", &types).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::OverloadResolution);
    /// ```
    pub fn parse_typed<T: TypeContext + ?Sized>(&self, input: &str, types: &T) -> Result<Expr, ParseError> {
        let expr = self.parse(input)?;
        let data_type = expr.return_type(types)?;
        tracing::debug!(%data_type, "resolved formula type");
        Ok(expr)
    }

    /// Parses `input` typed against `ctx` and evaluates it.
    pub fn evaluate<C: EvalContext + ?Sized>(&self, input: &str, ctx: &C) -> Result<Value, FormulaError> {
        let expr = self.parse_typed(input, ctx)?;
        Ok(expr.evaluate(ctx)?)
    }

    fn build_tree(&self, postfix: Vec<Token>) -> Result<Expr, ParseError> {
        let mut stack: Vec<Expr> = Vec::new();

        for token in postfix {
            let node = match token.kind {
                TokenKind::Number | TokenKind::String | TokenKind::Boolean => token
                    .literal()
                    .cloned()
                    .and_then(Expr::constant)
                    .ok_or_else(|| unexpected(&token))?,

                TokenKind::Variable => match token.variable_name() {
                    Some(name) => Expr::variable(name),
                    None => return Err(unexpected(&token)),
                },

                TokenKind::PrefixOperator => {
                    let candidates = self
                        .registry
                        .unary_candidates(&token.text)
                        .cloned()
                        .ok_or_else(|| unexpected(&token))?;
                    let operand = pop_operand(&mut stack, &token)?;
                    Expr::unary(token.text, operand, candidates)
                }

                TokenKind::InfixOperator => {
                    let candidates = self
                        .registry
                        .binary_candidates(&token.text)
                        .cloned()
                        .ok_or_else(|| unexpected(&token))?;
                    let right = pop_operand(&mut stack, &token)?;
                    let left = pop_operand(&mut stack, &token)?;
                    Expr::binary(token.text, left, right, candidates)
                }

                TokenKind::Function => {
                    let (Some(count), Some(candidates)) = (
                        token.arg_count(),
                        self.registry.function_candidates(&token.text).cloned(),
                    ) else {
                        return Err(unexpected(&token));
                    };
                    if stack.len() < count {
                        return Err(ParseError::MissingOperand {
                            symbol: token.text,
                            position: token.position,
                        });
                    }
                    let args = stack.split_off(stack.len() - count);
                    let name = candidates
                        .first()
                        .map_or_else(|| token.text.clone(), |f| f.name().to_string());
                    Expr::call(name, args, candidates)
                }

                TokenKind::Operator
                | TokenKind::Comma
                | TokenKind::LeftParen
                | TokenKind::RightParen
                | TokenKind::End => return Err(unexpected(&token)),
            };
            stack.push(node);
        }

        match stack.len() {
            1 => stack
                .pop()
                .ok_or(ParseError::MalformedExpression { operands: 0 }),
            operands => Err(ParseError::MalformedExpression { operands }),
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn unexpected(token: &Token) -> ParseError {
    ParseError::UnexpectedToken {
        text: token.text.clone(),
        position: token.position,
    }
}

fn pop_operand(stack: &mut Vec<Expr>, token: &Token) -> Result<Expr, ParseError> {
    stack.pop().ok_or_else(|| ParseError::MissingOperand {
        symbol: token.text.clone(),
        position: token.position,
    })
}
