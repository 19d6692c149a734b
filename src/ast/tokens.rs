use crate::value::Value;

/// What a token is, as far as the parser cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Numeric literal
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// ```
    Number,

    /// Single- or double-quoted string literal
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// ```
    String,

    /// `true` or `false`, any case
    Boolean,

    /// Variable placeholder
    ///
    /// # Examples
    /// ```text
    /// {{price}}
    /// {{ order.total }}
    /// ```
    Variable,

    /// Registered function name, always followed by `(`
    Function,

    /// Operator symbol as lexed, before the parser decides its fixity
    Operator,

    /// Operator occurrence classified as unary
    PrefixOperator,

    /// Operator occurrence classified as binary
    InfixOperator,

    Comma,
    LeftParen,
    RightParen,

    /// End of input
    End,
}

/// Extra data carried by some tokens. A token never needs more than one.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Parsed value of a literal
    Literal(Value),

    /// Number of arguments of a function call, set once its `)` is seen
    ArgCount(usize),
}

/// A lexeme with its kind, source offset and optional payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text of the lexeme
    pub text: String,
    /// Character offset of the first character in the input
    pub position: usize,
    pub payload: Option<Payload>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            position,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn literal(&self) -> Option<&Value> {
        match &self.payload {
            Some(Payload::Literal(value)) => Some(value),
            _ => None,
        }
    }

    pub fn arg_count(&self) -> Option<usize> {
        match self.payload {
            Some(Payload::ArgCount(n)) => Some(n),
            _ => None,
        }
    }

    /// Name inside a `{{...}}` placeholder.
    pub fn variable_name(&self) -> Option<&str> {
        if self.kind != TokenKind::Variable {
            return None;
        }
        self.text
            .strip_prefix("{{")
            .and_then(|rest| rest.strip_suffix("}}"))
    }

    pub fn is_operator(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Operator | TokenKind::PrefixOperator | TokenKind::InfixOperator
        )
    }
}
