use std::collections::HashMap;

use formula_lang::{
    DataType, ErrorKind, EvalError, Expr, LexError, ParseError, Parser, TokenKind,
};
use pretty_assertions::assert_eq;

fn parse(input: &str) -> Result<Expr, ParseError> {
    Parser::with_defaults().parse(input)
}

fn shape(input: &str) -> String {
    parse(input).unwrap().to_string()
}

#[test]
fn test_multiplication_binds_tighter() {
    assert_eq!(shape("1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(shape("1 * 2 + 3"), "((1 * 2) + 3)");
}

#[test]
fn test_left_associative_operators() {
    assert_eq!(shape("1 - 2 - 3"), "((1 - 2) - 3)");
    assert_eq!(shape("8 / 4 / 2"), "((8 / 4) / 2)");
}

#[test]
fn test_power_is_right_associative() {
    assert_eq!(shape("2 ^ 3 ^ 2"), "(2 ^ (3 ^ 2))");
}

#[test]
fn test_parentheses_override_precedence() {
    assert_eq!(shape("(1 + 2) * 3"), "((1 + 2) * 3)");
    assert_eq!(shape("((1))"), "1");
}

#[test]
fn test_logical_precedence() {
    assert_eq!(
        shape("1 < 2 && 3 > 4 || true"),
        "(((1 < 2) && (3 > 4)) || true)"
    );
    assert_eq!(shape("{{a}} == 1 && {{b}} != 2"), "(({{a}} == 1) && ({{b}} != 2))");
}

#[test]
fn test_prefix_operators() {
    assert_eq!(shape("!true && false"), "((!true) && false)");
    assert_eq!(shape("1 - -2"), "(1 - (-2))");
    assert_eq!(shape("-{{x}} ^ 2"), "((-{{x}}) ^ 2)");
    assert_eq!(shape("!!true"), "(!(!true))");
}

#[test]
fn test_prefix_after_open_paren_and_comma() {
    assert_eq!(shape("(!true)"), "(!true)");
    assert_eq!(shape("IF(!true, -1, 2)"), "IF((!true), (-1), 2)");
}

#[test]
fn test_function_calls() {
    assert_eq!(shape("if(TRUE, 'a', \"b\")"), "IF(true, \"a\", \"b\")");
    assert_eq!(
        shape("DATEADD('d', 1 + 1, {{d}})"),
        "DATEADD(\"d\", (1 + 1), {{d}})"
    );
    assert_eq!(
        shape("IF(true, IF(false, 1, 2), 3) * 2"),
        "(IF(true, IF(false, 1, 2), 3) * 2)"
    );
}

#[test]
fn test_string_constants_are_requoted() {
    assert_eq!(shape(r#"'say "hi"'"#), r#""say \"hi\"""#);
}

#[test]
fn test_variable_node() {
    match parse("{{ price }}").unwrap() {
        Expr::Variable { name } => assert_eq!(name, "price"),
        other => panic!("expected variable, got {other:?}"),
    }
}

#[test]
fn test_constant_types() {
    for (input, expected) in [
        ("1", DataType::Number),
        ("'x'", DataType::String),
        ("false", DataType::Boolean),
    ] {
        match parse(input).unwrap() {
            Expr::Constant { data_type, .. } => assert_eq!(data_type, expected),
            other => panic!("expected constant, got {other:?}"),
        }
    }
}

#[test]
fn test_postfix_tokens_are_retagged() {
    let parser = Parser::with_defaults();
    let kinds: Vec<TokenKind> = parser
        .to_postfix("-1 + IF(true, 2, 3)")
        .unwrap()
        .iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::Number,
            TokenKind::PrefixOperator,
            TokenKind::Boolean,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::Function,
            TokenKind::InfixOperator,
        ]
    );
}

#[test]
fn test_function_argument_count_payload() {
    let parser = Parser::with_defaults();
    let postfix = parser.to_postfix("IF(true, 1, 2)").unwrap();
    assert_eq!(postfix.last().and_then(|t| t.arg_count()), Some(3));
}

#[test]
fn test_parse_does_not_resolve() {
    let expr = parse("{{a}} + {{b}}").unwrap();
    assert!(!expr.is_resolved());

    let types = HashMap::from([
        ("a".to_string(), DataType::String),
        ("b".to_string(), DataType::String),
    ]);
    assert_eq!(expr.return_type(&types), Ok(DataType::String));
    assert!(expr.is_resolved());
}

#[test]
fn test_parse_typed_resolves_every_node() {
    let types = HashMap::from([("qty".to_string(), DataType::Number)]);
    let expr = Parser::with_defaults()
        .parse_typed("IF({{qty}} > 10, 'bulk', 'single')", &types)
        .unwrap();
    assert!(expr.is_resolved());
}

#[test]
fn test_parse_typed_overload_failure() {
    let types = HashMap::from([("name".to_string(), DataType::String)]);
    let err = Parser::with_defaults()
        .parse_typed("{{name}} > 3", &types)
        .unwrap_err();
    assert_eq!(
        err,
        ParseError::Resolution(EvalError::NoMatchingOverload {
            symbol: ">".to_string(),
            operand_types: vec![DataType::String, DataType::Number],
        })
    );
    assert_eq!(err.kind(), ErrorKind::OverloadResolution);
}

#[test]
fn test_parse_typed_unknown_variable() {
    let types: HashMap<String, DataType> = HashMap::new();
    let err = Parser::with_defaults()
        .parse_typed("{{missing}} + 1", &types)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VariableNotFound);
}

#[test]
fn test_unclosed_parenthesis() {
    let err = parse("(1 + 2").unwrap_err();
    assert_eq!(err, ParseError::MismatchedParenthesis { position: 0 });
    assert_eq!(err.kind(), ErrorKind::Structural);
}

#[test]
fn test_extra_closing_parenthesis() {
    assert_eq!(
        parse("IF(true, 1, 2))").unwrap_err(),
        ParseError::MismatchedParenthesis { position: 14 }
    );
}

#[test]
fn test_missing_right_operand() {
    assert_eq!(
        parse("1 +").unwrap_err(),
        ParseError::MissingOperand {
            symbol: "+".to_string(),
            position: 2
        }
    );
}

#[test]
fn test_binary_only_operator_at_start() {
    let err = parse("* 2").unwrap_err();
    assert_eq!(
        err,
        ParseError::MissingOperand {
            symbol: "*".to_string(),
            position: 0
        }
    );
    assert_eq!(err.kind(), ErrorKind::Structural);
}

#[test]
fn test_unary_only_operator_between_operands() {
    assert_eq!(
        parse("true ! false").unwrap_err(),
        ParseError::NotBinaryOperator {
            symbol: "!".to_string(),
            position: 5
        }
    );
}

#[test]
fn test_empty_argument_is_missing_operand() {
    assert_eq!(
        parse("IF(true,,2)").unwrap_err(),
        ParseError::MissingOperand {
            symbol: "IF".to_string(),
            position: 0
        }
    );
}

#[test]
fn test_leftover_operands() {
    assert_eq!(
        parse("1 2").unwrap_err(),
        ParseError::MalformedExpression { operands: 2 }
    );
}

#[test]
fn test_empty_formula() {
    assert_eq!(
        parse("").unwrap_err(),
        ParseError::MalformedExpression { operands: 0 }
    );
    assert_eq!(
        parse("()").unwrap_err(),
        ParseError::MalformedExpression { operands: 0 }
    );
}

#[test]
fn test_comma_outside_call() {
    let err = parse("1, 2").unwrap_err();
    assert_eq!(
        err,
        ParseError::UnexpectedToken {
            text: ",".to_string(),
            position: 1
        }
    );
    assert_eq!(err.kind(), ErrorKind::Structural);
}

#[test]
fn test_lex_errors_surface_as_syntax() {
    let err = parse("'abc").unwrap_err();
    assert_eq!(err, ParseError::Lex(LexError::UnterminatedString { position: 0 }));
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_error_messages() {
    assert_eq!(
        parse("(1").unwrap_err().to_string(),
        "mismatched parenthesis at position 0"
    );
    assert_eq!(
        parse("1 # 2").unwrap_err().to_string(),
        "unknown operator '#' at position 2"
    );
}
