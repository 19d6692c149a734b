//! The operator and function catalog.
//!
//! A [`RegistryBuilder`] collects descriptors in registration order;
//! [`RegistryBuilder::build`] validates them and freezes them into a
//! [`Registry`], where every symbol or function name maps to a shared,
//! ordered list of overloads. A registry never changes after it is built and
//! can be shared freely between threads.
//!
//! ```
//! use formula_lang::{Associativity, BinaryOperator, DataType, Parser, Registry, Value, VariableMap};
//!
//! let mut builder = Registry::builder();
//! builder.add_defaults().add_binary_operator(BinaryOperator::new(
//!     "<>",
//!     3,
//!     Associativity::Left,
//!     (DataType::Number, DataType::Number),
//!     DataType::Boolean,
//!     |l, r| Ok(Value::Boolean(l != r)),
//! ));
//! let parser = Parser::new(builder.build().unwrap());
//!
//! let expr = parser.parse("1 <> 2").unwrap();
//! assert_eq!(expr.evaluate(&VariableMap::new()).unwrap(), Value::Boolean(true));
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::ast::{Associativity, BinaryOperator, Fixity, Function, UnaryOperator};
use crate::builtins;

/// Longest operator symbol the lexer will try to match.
pub const MAX_SYMBOL_LEN: usize = 3;

/// Whether `c` may appear in an operator symbol.
///
/// Characters the lexer claims for other tokens (quotes, braces, parentheses,
/// commas, dots, identifiers) are excluded.
pub fn is_symbol_char(c: char) -> bool {
    c.is_ascii_punctuation() && !matches!(c, '(' | ')' | ',' | '"' | '\'' | '{' | '}' | '_' | '.')
}

fn is_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_ok = chars.next().is_some_and(|c| c.is_alphabetic() || c == '_');
    let reserved = name.eq_ignore_ascii_case("true") || name.eq_ignore_ascii_case("false");
    starts_ok && !reserved && chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Errors raised when freezing a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("invalid operator symbol '{symbol}': expected 1 to 3 operator characters")]
    InvalidSymbol { symbol: String },

    #[error("invalid function name '{name}'")]
    InvalidFunctionName { name: String },

    /// Overloads of one symbol must parse the same way
    #[error("overloads of {fixity:?} operator '{symbol}' disagree on precedence or associativity")]
    ConflictingPrecedence { symbol: String, fixity: Fixity },
}

/// Frozen catalog of operators and functions.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    unary: HashMap<String, Arc<[UnaryOperator]>>,
    binary: HashMap<String, Arc<[BinaryOperator]>>,
    /// Keyed by upper-cased name
    functions: HashMap<String, Arc<[Function]>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The reference catalog: arithmetic, logical and comparison operators
    /// plus `IF`, `DATEDIFF` and `DATEADD`.
    pub fn defaults() -> Registry {
        let mut builder = RegistryBuilder::new();
        builder.add_defaults();
        builder.freeze()
    }

    pub fn unary_candidates(&self, symbol: &str) -> Option<&Arc<[UnaryOperator]>> {
        self.unary.get(symbol)
    }

    pub fn binary_candidates(&self, symbol: &str) -> Option<&Arc<[BinaryOperator]>> {
        self.binary.get(symbol)
    }

    /// Overloads of a function, looked up case-insensitively.
    pub fn function_candidates(&self, name: &str) -> Option<&Arc<[Function]>> {
        self.functions.get(&name.to_uppercase())
    }

    pub fn has_unary(&self, symbol: &str) -> bool {
        self.unary.contains_key(symbol)
    }

    pub fn has_binary(&self, symbol: &str) -> bool {
        self.binary.contains_key(symbol)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.function_candidates(name).is_some()
    }

    pub fn is_operator_symbol(&self, symbol: &str) -> bool {
        self.has_unary(symbol) || self.has_binary(symbol)
    }

    /// Precedence and associativity of a symbol used as a prefix operator.
    pub fn unary_precedence(&self, symbol: &str) -> Option<(u8, Associativity)> {
        self.unary
            .get(symbol)
            .and_then(|ops| ops.first())
            .map(|op| (op.precedence(), op.associativity()))
    }

    /// Precedence and associativity of a symbol used as an infix operator.
    pub fn binary_precedence(&self, symbol: &str) -> Option<(u8, Associativity)> {
        self.binary
            .get(symbol)
            .and_then(|ops| ops.first())
            .map(|op| (op.precedence(), op.associativity()))
    }

    /// Registered function names, sorted.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .functions
            .values()
            .filter_map(|overloads| overloads.first().map(|f| f.name()))
            .collect();
        names.sort_unstable();
        names
    }
}

/// Ordered list of descriptors waiting to be frozen into a [`Registry`].
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    unary: Vec<UnaryOperator>,
    binary: Vec<BinaryOperator>,
    functions: Vec<Function>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_unary_operator(&mut self, op: UnaryOperator) -> &mut Self {
        self.unary.push(op);
        self
    }

    pub fn add_binary_operator(&mut self, op: BinaryOperator) -> &mut Self {
        self.binary.push(op);
        self
    }

    pub fn add_function(&mut self, function: Function) -> &mut Self {
        self.functions.push(function);
        self
    }

    /// Appends the reference catalog.
    pub fn add_defaults(&mut self) -> &mut Self {
        builtins::register_defaults(self);
        self
    }

    /// Validates the collected descriptors and freezes them.
    pub fn build(self) -> Result<Registry, RegistryError> {
        for symbol in self
            .unary
            .iter()
            .map(UnaryOperator::symbol)
            .chain(self.binary.iter().map(BinaryOperator::symbol))
        {
            let len = symbol.chars().count();
            if len == 0 || len > MAX_SYMBOL_LEN || !symbol.chars().all(is_symbol_char) {
                return Err(RegistryError::InvalidSymbol {
                    symbol: symbol.to_string(),
                });
            }
        }

        if let Some(f) = self.functions.iter().find(|f| !is_function_name(f.name())) {
            return Err(RegistryError::InvalidFunctionName {
                name: f.name().to_string(),
            });
        }

        check_consistent(
            &self.unary,
            |op| (op.symbol(), op.precedence(), op.associativity()),
            Fixity::Prefix,
        )?;
        check_consistent(
            &self.binary,
            |op| (op.symbol(), op.precedence(), op.associativity()),
            Fixity::Infix,
        )?;

        Ok(self.freeze())
    }

    fn freeze(self) -> Registry {
        Registry {
            unary: group(self.unary, |op| op.symbol().to_string()),
            binary: group(self.binary, |op| op.symbol().to_string()),
            functions: group(self.functions, |f| f.name().to_uppercase()),
        }
    }
}

fn check_consistent<T>(
    ops: &[T],
    parts: impl Fn(&T) -> (&str, u8, Associativity),
    fixity: Fixity,
) -> Result<(), RegistryError> {
    let mut seen: HashMap<&str, (u8, Associativity)> = HashMap::new();
    for op in ops {
        let (symbol, precedence, associativity) = parts(op);
        let first = *seen.entry(symbol).or_insert((precedence, associativity));
        if first != (precedence, associativity) {
            return Err(RegistryError::ConflictingPrecedence {
                symbol: symbol.to_string(),
                fixity,
            });
        }
    }
    Ok(())
}

/// Groups descriptors by key, keeping registration order within each group.
fn group<T>(items: Vec<T>, key: impl Fn(&T) -> String) -> HashMap<String, Arc<[T]>> {
    let mut groups: HashMap<String, Vec<T>> = HashMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }
    groups
        .into_iter()
        .map(|(k, v)| (k, Arc::from(v)))
        .collect()
}
