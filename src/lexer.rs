use thiserror::Error;

use crate::ast::{Payload, Token, TokenKind};
use crate::error::ErrorKind;
use crate::registry::{MAX_SYMBOL_LEN, Registry, is_symbol_char};
use crate::value::Value;

/// Errors raised while splitting a formula into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("unknown operator '{symbol}' at position {position}")]
    UnknownOperator { symbol: String, position: usize },

    /// Identifier that is not a registered function directly followed by `(`
    #[error("unknown identifier '{name}' at position {position}")]
    UnknownIdentifier { name: String, position: usize },

    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },

    #[error("unterminated string literal starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("unterminated variable placeholder starting at position {position}")]
    UnterminatedVariable { position: usize },

    #[error("empty variable placeholder at position {position}")]
    EmptyVariable { position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedCharacter { position, .. }
            | LexError::UnknownOperator { position, .. }
            | LexError::UnknownIdentifier { position, .. }
            | LexError::InvalidNumber { position, .. }
            | LexError::UnterminatedString { position }
            | LexError::UnterminatedVariable { position }
            | LexError::EmptyVariable { position } => *position,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Syntax
    }
}

/// Splits formula text into tokens.
///
/// The registry decides which identifiers are function names and which glyph
/// runs are operators, so unknown functions and operators fail here rather
/// than in the parser.
pub struct Lexer<'r> {
    input: Vec<char>,
    position: usize,
    registry: &'r Registry,
}

impl<'r> Lexer<'r> {
    pub fn new(input: &str, registry: &'r Registry) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            registry,
        }
    }

    /// Lexes the whole input. The last token is always [`TokenKind::End`].
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::End;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.input[start..end].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut seen_dot = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.'
                && !seen_dot
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        let text = self.slice(start, self.position);
        let number = text.parse::<f64>().map_err(|_| LexError::InvalidNumber {
            text: text.clone(),
            position: start,
        })?;
        Ok(Token::new(TokenKind::Number, text, start)
            .with_payload(Payload::Literal(Value::Number(number))))
    }

    fn read_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    let text = self.slice(start, self.position);
                    return Ok(Token::new(TokenKind::String, text, start)
                        .with_payload(Payload::Literal(Value::String(result))));
                }
                '\\' => {
                    self.advance();
                    // The escaped character is taken literally
                    match self.current_char() {
                        Some(escaped) => {
                            result.push(escaped);
                            self.advance();
                        }
                        None => break,
                    }
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString { position: start })
    }

    /// Case-insensitive whole-word match at the current position.
    fn at_word(&self, word: &str) -> bool {
        let len = word.chars().count();
        let matches = word
            .chars()
            .enumerate()
            .all(|(i, w)| self.peek_char(i).is_some_and(|c| c.eq_ignore_ascii_case(&w)));
        matches && !self.peek_char(len).is_some_and(|c| c.is_alphanumeric())
    }

    fn read_boolean(&mut self) -> Option<Token> {
        let start = self.position;
        let (value, len) = if self.at_word("true") {
            (true, 4)
        } else if self.at_word("false") {
            (false, 5)
        } else {
            return None;
        };
        self.position += len;
        let text = self.slice(start, self.position);
        Some(Token::new(TokenKind::Boolean, text, start)
            .with_payload(Payload::Literal(Value::Boolean(value))))
    }

    fn read_variable(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let content_start = start + 2;
        let close = (content_start..self.input.len().saturating_sub(1))
            .find(|&i| self.input[i] == '}' && self.input[i + 1] == '}')
            .ok_or(LexError::UnterminatedVariable { position: start })?;

        let name = self.slice(content_start, close).trim().to_string();
        if name.is_empty() {
            return Err(LexError::EmptyVariable { position: start });
        }
        self.position = close + 2;
        Ok(Token::new(TokenKind::Variable, format!("{{{{{name}}}}}"), start))
    }

    fn read_function(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let name = self.read_identifier();
        if self.current_char() != Some('(') || !self.registry.has_function(&name) {
            return Err(LexError::UnknownIdentifier {
                name,
                position: start,
            });
        }
        Ok(Token::new(TokenKind::Function, name, start))
    }

    /// Longest registered operator symbol starting at the current position.
    fn read_operator(&mut self) -> Option<Token> {
        let start = self.position;
        let longest = MAX_SYMBOL_LEN.min(self.input.len() - start);
        for len in (1..=longest).rev() {
            let candidate = self.slice(start, start + len);
            if self.registry.is_operator_symbol(&candidate) {
                self.position += len;
                return Some(Token::new(TokenKind::Operator, candidate, start));
            }
        }
        None
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        let start = self.position;

        let Some(ch) = self.current_char() else {
            return Ok(Token::new(TokenKind::End, "", start));
        };

        if ch.is_ascii_digit() {
            return self.read_number();
        }
        if ch == '"' || ch == '\'' {
            return self.read_string(ch);
        }
        if let Some(token) = self.read_boolean() {
            return Ok(token);
        }
        if ch == '{' && self.peek_char(1) == Some('{') {
            return self.read_variable();
        }
        if ch.is_alphabetic() || ch == '_' {
            return self.read_function();
        }
        if let Some(token) = self.read_operator() {
            return Ok(token);
        }

        let kind = match ch {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            c if is_symbol_char(c) => {
                return Err(LexError::UnknownOperator {
                    symbol: c.to_string(),
                    position: start,
                });
            }
            c => {
                return Err(LexError::UnexpectedCharacter {
                    ch: c,
                    position: start,
                });
            }
        };
        self.advance();
        Ok(Token::new(kind, ch.to_string(), start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        let registry = Registry::defaults();
        Lexer::new(input, &registry)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_longest_operator_match() {
        let registry = Registry::defaults();
        let tokens = Lexer::new("1>=2", &registry).tokenize().unwrap();
        assert_eq!(tokens[1].kind, TokenKind::Operator);
        assert_eq!(tokens[1].text, ">=");
    }

    #[test]
    fn test_boolean_needs_word_boundary() {
        assert_eq!(kinds("TRUE"), vec![TokenKind::Boolean, TokenKind::End]);
        let registry = Registry::defaults();
        let err = Lexer::new("trueish", &registry).tokenize().unwrap_err();
        assert_eq!(
            err,
            LexError::UnknownIdentifier {
                name: "trueish".to_string(),
                position: 0
            }
        );
    }

    #[test]
    fn test_function_requires_open_paren() {
        let registry = Registry::defaults();
        let err = Lexer::new("IF (true, 1, 2)", &registry).tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnknownIdentifier { .. }));
    }
}
