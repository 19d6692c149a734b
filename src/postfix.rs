//! Infix to postfix conversion (shunting-yard).
//!
//! Besides reordering, the converter does two jobs the tree builder relies on:
//! every operator token leaves re-tagged as [`TokenKind::PrefixOperator`] or
//! [`TokenKind::InfixOperator`], and every function token leaves carrying its
//! argument count.

use crate::ast::{Associativity, Payload, Token, TokenKind};
use crate::parser::ParseError;
use crate::registry::Registry;

/// Precedence of an operator token already on the stack, by its fixity.
fn stacked_precedence(token: &Token, registry: &Registry) -> Option<(u8, Associativity)> {
    match token.kind {
        TokenKind::PrefixOperator => registry.unary_precedence(&token.text),
        TokenKind::InfixOperator => registry.binary_precedence(&token.text),
        _ => None,
    }
}

/// Reorders `tokens` into postfix. The trailing [`TokenKind::End`] is consumed
/// and not emitted.
///
/// # Errors
///
/// [`ParseError::MismatchedParenthesis`] for unbalanced parentheses,
/// [`ParseError::MissingOperand`] for an operator with no unary form where no
/// left operand exists, [`ParseError::NotBinaryOperator`] for a unary-only
/// operator after an operand, [`ParseError::UnexpectedToken`] for a comma
/// outside a function call.
pub fn to_postfix(tokens: Vec<Token>, registry: &Registry) -> Result<Vec<Token>, ParseError> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();
    // One counter per open function call, counting commas seen so far
    let mut arg_counts: Vec<usize> = Vec::new();
    let mut previous: Option<TokenKind> = None;
    // True while the next token must start an operand
    let mut prefix_position = true;

    for mut token in tokens {
        let kind = token.kind;
        let opens_operand =
            token.is_operator() || matches!(kind, TokenKind::LeftParen | TokenKind::Comma);
        match kind {
            TokenKind::Number | TokenKind::String | TokenKind::Boolean | TokenKind::Variable => {
                output.push(token);
            }

            TokenKind::Function => {
                stack.push(token);
                arg_counts.push(0);
            }

            TokenKind::Comma => {
                while let Some(top) = stack.pop_if(|top| top.kind != TokenKind::LeftParen) {
                    output.push(top);
                }
                // The paren must be the one opened right after a function name
                let in_call = stack.len() >= 2 && stack[stack.len() - 2].kind == TokenKind::Function;
                match arg_counts.last_mut() {
                    Some(count) if in_call => *count += 1,
                    _ => {
                        return Err(ParseError::UnexpectedToken {
                            text: token.text,
                            position: token.position,
                        });
                    }
                }
            }

            TokenKind::Operator | TokenKind::PrefixOperator | TokenKind::InfixOperator => {
                if prefix_position {
                    if !registry.has_unary(&token.text) {
                        return Err(ParseError::MissingOperand {
                            symbol: token.text,
                            position: token.position,
                        });
                    }
                    // Nothing to the left can belong to a prefix operator
                    token.kind = TokenKind::PrefixOperator;
                } else {
                    let Some((precedence, associativity)) = registry.binary_precedence(&token.text)
                    else {
                        return Err(ParseError::NotBinaryOperator {
                            symbol: token.text,
                            position: token.position,
                        });
                    };
                    while let Some(top) = stack.pop_if(|top| {
                        stacked_precedence(top, registry).is_some_and(|(top_precedence, _)| {
                            top_precedence > precedence
                                || (top_precedence == precedence
                                    && associativity == Associativity::Left)
                        })
                    }) {
                        output.push(top);
                    }
                    token.kind = TokenKind::InfixOperator;
                }
                stack.push(token);
            }

            TokenKind::LeftParen => stack.push(token),

            TokenKind::RightParen => {
                loop {
                    match stack.pop() {
                        Some(top) if top.kind == TokenKind::LeftParen => break,
                        Some(top) => output.push(top),
                        None => {
                            return Err(ParseError::MismatchedParenthesis {
                                position: token.position,
                            });
                        }
                    }
                }
                if let Some(function) = stack.pop_if(|top| top.kind == TokenKind::Function) {
                    let commas = arg_counts.pop().unwrap_or(0);
                    let count = if previous == Some(TokenKind::LeftParen) {
                        0
                    } else {
                        commas + 1
                    };
                    output.push(function.with_payload(Payload::ArgCount(count)));
                }
            }

            TokenKind::End => break,
        }
        previous = Some(kind);
        prefix_position = opens_operand;
    }

    while let Some(top) = stack.pop() {
        if top.kind == TokenKind::LeftParen {
            return Err(ParseError::MismatchedParenthesis {
                position: top.position,
            });
        }
        output.push(top);
    }

    Ok(output)
}

/// Space-separated token texts, for logs and the `tokens` command.
pub fn render(tokens: &[Token]) -> String {
    tokens
        .iter()
        .map(|token| match (token.kind, token.arg_count()) {
            (TokenKind::Function, Some(count)) => format!("{}/{count}", token.text),
            _ => token.text.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn postfix(input: &str) -> Result<String, ParseError> {
        let registry = Registry::defaults();
        let tokens = Lexer::new(input, &registry).tokenize()?;
        to_postfix(tokens, &registry).map(|out| render(&out))
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(postfix("1 + 2 * 3").unwrap(), "1 2 3 * +");
        assert_eq!(postfix("1 - 2 - 3").unwrap(), "1 2 - 3 -");
        assert_eq!(postfix("2 ^ 3 ^ 2").unwrap(), "2 3 2 ^ ^");
        assert_eq!(postfix("(1 + 2) * 3").unwrap(), "1 2 + 3 *");
    }

    #[test]
    fn test_prefix_classification() {
        let registry = Registry::defaults();
        let tokens = Lexer::new("-1 - -2", &registry).tokenize().unwrap();
        let out = to_postfix(tokens, &registry).unwrap();
        let kinds: Vec<TokenKind> = out.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Number,
                TokenKind::PrefixOperator,
                TokenKind::Number,
                TokenKind::PrefixOperator,
                TokenKind::InfixOperator,
            ]
        );
    }

    #[test]
    fn test_function_argument_counts() {
        assert_eq!(postfix("IF(true, 1, 2)").unwrap(), "true 1 2 IF/3");
        assert_eq!(
            postfix("DATEDIFF({{a}}, {{b}}) + 1").unwrap(),
            "{{a}} {{b}} DATEDIFF/2 1 +"
        );
        assert_eq!(
            postfix("IF(!true, IF(true, 1, 2), 3)").unwrap(),
            "true ! true 1 2 IF/3 3 IF/3"
        );
    }

    #[test]
    fn test_mismatched_parentheses() {
        assert_eq!(
            postfix("(1 + 2").unwrap_err(),
            ParseError::MismatchedParenthesis { position: 0 }
        );
        assert_eq!(
            postfix("1 + 2)").unwrap_err(),
            ParseError::MismatchedParenthesis { position: 5 }
        );
    }

    #[test]
    fn test_unary_only_operator_in_infix_position() {
        assert_eq!(
            postfix("true ! false").unwrap_err(),
            ParseError::NotBinaryOperator {
                symbol: "!".to_string(),
                position: 5
            }
        );
    }

    #[test]
    fn test_binary_only_operator_in_prefix_position() {
        assert_eq!(
            postfix("* 2").unwrap_err(),
            ParseError::MissingOperand {
                symbol: "*".to_string(),
                position: 0
            }
        );
    }

    #[test]
    fn test_comma_outside_call() {
        assert!(matches!(
            postfix("(1, 2)").unwrap_err(),
            ParseError::UnexpectedToken { .. }
        ));
    }
}
