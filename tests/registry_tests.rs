use formula_lang::{
    Associativity, BinaryOperator, DataType, ErrorKind, EvalError, Fixity, Function, LexError,
    ParseError, Parser, Registry, RegistryError, UnaryOperator, Value, VariableMap,
};
use pretty_assertions::assert_eq;

fn number_op(symbol: &str, precedence: u8, rule: fn(f64, f64) -> f64) -> BinaryOperator {
    BinaryOperator::new(
        symbol,
        precedence,
        Associativity::Left,
        (DataType::Number, DataType::Number),
        DataType::Number,
        move |l, r| match (l, r) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(rule(*a, *b))),
            _ => Err(EvalError::MissingOperand {
                symbol: "custom".to_string(),
            }),
        },
    )
}

fn pi() -> Function {
    Function::new("Pi", vec![], DataType::Number, |_| Ok(Value::Number(std::f64::consts::PI)))
}

#[test]
fn test_default_catalog_shape() {
    let registry = Registry::defaults();
    assert!(registry.has_unary("-") && registry.has_binary("-"));
    assert!(registry.has_unary("!") && !registry.has_binary("!"));
    assert!(!registry.has_unary("*"));
    assert_eq!(registry.unary_precedence("-"), Some((8, Associativity::Right)));
    assert_eq!(registry.binary_precedence("-"), Some((5, Associativity::Left)));
    assert_eq!(registry.binary_precedence("^"), Some((7, Associativity::Right)));
    assert_eq!(registry.binary_precedence("||"), Some((1, Associativity::Left)));
    assert_eq!(registry.function_names(), vec!["DATEADD", "DATEDIFF", "IF"]);
}

#[test]
fn test_overloads_keep_registration_order() {
    let registry = Registry::defaults();
    let equality: Vec<(DataType, DataType)> = registry
        .binary_candidates("==")
        .unwrap()
        .iter()
        .map(|op| (op.left_type(), op.right_type()))
        .collect();
    assert_eq!(
        equality,
        vec![
            (DataType::String, DataType::String),
            (DataType::Number, DataType::Number),
            (DataType::Boolean, DataType::Boolean),
            (DataType::DateTime, DataType::DateTime),
        ]
    );
    assert_eq!(registry.function_candidates("if").map(|f| f.len()), Some(5));
}

#[test]
fn test_empty_registry_knows_nothing() {
    let registry = Registry::builder().build().unwrap();
    let parser = Parser::new(registry);
    assert_eq!(
        parser.parse("1 + 2").unwrap_err(),
        ParseError::Lex(LexError::UnknownOperator {
            symbol: "+".to_string(),
            position: 2
        })
    );
    // Literals need no catalog
    assert_eq!(parser.parse("42").unwrap().to_string(), "42");
}

#[test]
fn test_custom_binary_operator() {
    let mut builder = Registry::builder();
    builder
        .add_binary_operator(number_op("+", 1, |a, b| a + b))
        .add_binary_operator(number_op("max", 2, f64::max));
    assert!(matches!(
        builder.build().unwrap_err(),
        RegistryError::InvalidSymbol { symbol } if symbol == "max"
    ));

    let mut builder = Registry::builder();
    builder
        .add_binary_operator(number_op("+", 1, |a, b| a + b))
        .add_binary_operator(number_op("<?>", 2, f64::max));
    let parser = Parser::new(builder.build().unwrap());
    let vars = VariableMap::new();
    assert_eq!(parser.evaluate("1 + 3 <?> 2", &vars).unwrap(), Value::Number(4.0));
    assert_eq!(parser.parse("1 + 3 <?> 2").unwrap().to_string(), "(1 + (3 <?> 2))");
}

#[test]
fn test_custom_precedence_changes_grouping() {
    let mut builder = Registry::builder();
    builder
        .add_binary_operator(number_op("+", 2, |a, b| a + b))
        .add_binary_operator(number_op("*", 1, |a, b| a * b));
    let parser = Parser::new(builder.build().unwrap());
    assert_eq!(parser.parse("1 + 2 * 3").unwrap().to_string(), "((1 + 2) * 3)");
    assert_eq!(
        parser.evaluate("1 + 2 * 3", &VariableMap::new()).unwrap(),
        Value::Number(9.0)
    );
}

#[test]
fn test_custom_unary_operator() {
    let mut builder = Registry::builder();
    builder.add_defaults().add_unary_operator(UnaryOperator::new(
        "~",
        8,
        Associativity::Right,
        DataType::Number,
        DataType::Number,
        |v| match v {
            Value::Number(n) => Ok(Value::Number(n.floor())),
            other => Err(EvalError::TypeMismatch {
                symbol: "~".to_string(),
                expected: DataType::Number,
                found: other.type_name(),
            }),
        },
    ));
    let parser = Parser::new(builder.build().unwrap());
    assert_eq!(
        parser.evaluate("~2.7 + 1", &VariableMap::new()).unwrap(),
        Value::Number(3.0)
    );
    assert_eq!(
        parser.parse("1 ~ 2").unwrap_err(),
        ParseError::NotBinaryOperator {
            symbol: "~".to_string(),
            position: 2
        }
    );
}

#[test]
fn test_zero_argument_function() {
    let mut builder = Registry::builder();
    builder.add_defaults().add_function(pi());
    let parser = Parser::new(builder.build().unwrap());

    let expr = parser.parse("pi() * 2").unwrap();
    assert_eq!(expr.to_string(), "(Pi() * 2)");
    assert_eq!(
        expr.evaluate(&VariableMap::new()).unwrap(),
        Value::Number(std::f64::consts::PI * 2.0)
    );
    assert_eq!(
        parser.evaluate("PI(1)", &VariableMap::new()).unwrap_err().kind(),
        ErrorKind::OverloadResolution
    );
}

#[test]
fn test_first_matching_overload_wins() {
    let mut builder = Registry::builder();
    builder
        .add_function(Function::new("PICK", vec![DataType::Number], DataType::String, |_| {
            Ok(Value::from("first"))
        }))
        .add_function(Function::new("PICK", vec![DataType::Number], DataType::String, |_| {
            Ok(Value::from("second"))
        }))
        .add_function(Function::new("PICK", vec![DataType::String], DataType::String, |_| {
            Ok(Value::from("text"))
        }));
    let parser = Parser::new(builder.build().unwrap());
    let vars = VariableMap::new();
    assert_eq!(parser.evaluate("PICK(1)", &vars).unwrap(), Value::from("first"));
    assert_eq!(parser.evaluate("PICK('a')", &vars).unwrap(), Value::from("text"));
}

#[test]
fn test_invalid_symbols() {
    for symbol in ["", "abc", "(", "====", "a+"] {
        let mut builder = Registry::builder();
        builder.add_binary_operator(number_op(symbol, 1, |a, b| a + b));
        assert_eq!(
            builder.build().unwrap_err(),
            RegistryError::InvalidSymbol {
                symbol: symbol.to_string()
            },
            "{symbol:?}"
        );
    }
}

#[test]
fn test_invalid_function_names() {
    for name in ["1X", "true", "A-B", ""] {
        let mut builder = Registry::builder();
        builder.add_function(Function::new(name, vec![], DataType::Number, |_| {
            Ok(Value::Number(0.0))
        }));
        assert_eq!(
            builder.build().unwrap_err(),
            RegistryError::InvalidFunctionName {
                name: name.to_string()
            }
        );
    }
}

#[test]
fn test_conflicting_precedence() {
    let mut builder = Registry::builder();
    builder
        .add_defaults()
        .add_binary_operator(number_op("+", 9, |a, b| a + b));
    assert_eq!(
        builder.build().unwrap_err(),
        RegistryError::ConflictingPrecedence {
            symbol: "+".to_string(),
            fixity: Fixity::Infix
        }
    );
}

#[test]
fn test_same_symbol_may_differ_by_fixity() {
    let mut builder = Registry::builder();
    builder.add_defaults();
    let registry = builder.build().unwrap();
    assert_ne!(registry.unary_precedence("-"), registry.binary_precedence("-"));
}

#[test]
fn test_registry_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Registry>();
    assert_send_sync::<Parser>();
    assert_send_sync::<formula_lang::Expr>();
}
