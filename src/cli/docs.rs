//! Documentation content for the formula CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Syntax,
    Operators,
    Functions,
    Types,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "syntax" => Some(Self::Syntax),
            "operators" | "ops" => Some(Self::Operators),
            "functions" | "function" | "fn" => Some(Self::Functions),
            "types" | "type" => Some(Self::Types),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"FORMULA DOCUMENTATION

Formulas are single expressions over literals, {{variables}}, operators and
function calls. Operators and functions are overloaded by operand type; the
overload is chosen once the types of the operands are known.

DOCUMENTATION CATEGORIES

  syntax            Literals, variables, parentheses and function calls
  operators         Arithmetic, comparison and logical operators, precedence
  functions         IF, DATEDIFF and DATEADD
  types             Number, String, Boolean, DateTime, Array and missing values

QUICK REFERENCE

  42  3.5           Number literals
  "a"  'b'          String literals
  TRUE  false       Boolean literals
  {{name}}          Variable
  IF(c, a, b)       Function call
  -x  !b            Prefix operators

Run 'formula doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Syntax) => Ok(SYNTAX_DOC),
        Some(DocCategory::Operators) => Ok(OPERATORS_DOC),
        Some(DocCategory::Functions) => Ok(FUNCTIONS_DOC),
        Some(DocCategory::Types) => Ok(TYPES_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const SYNTAX_DOC: &str = r#"SYNTAX - Literals, Variables and Calls

NUMBERS
  42    3.14
    Digits with an optional fractional part. There is no exponent form and no
    leading-dot form; a leading minus is the prefix operator.

STRINGS
  "hello"    'world'
    Single or double quotes. A backslash makes the next character literal:

      "say \"hi\""     ->  say "hi"
      'it\'s'          ->  it's
      "a\\b"           ->  a\b

    Constraints:
      - An unterminated string is a syntax error

BOOLEANS
  true    FALSE    True
    Case-insensitive, whole word only: `trueish` is not a boolean.

VARIABLES
  {{price}}    {{ order.total }}    {{ns:key}}
    Looked up in the evaluation context. Surrounding whitespace inside the
    braces is ignored; dots and colons are part of the name.

    Constraints:
      - {{}} and an unclosed {{ are syntax errors
      - An unknown variable fails at evaluation time

FUNCTION CALLS
  IF({{qty}} > 10, "bulk", "single")
    The name is case-insensitive and must be followed directly by `(`.
    Arguments are separated by commas; zero arguments is written `F()`.

PARENTHESES
  ({{a}} + {{b}}) * 2
    Override precedence. Unbalanced parentheses are a structural error.

Run 'formula tokens "<formula>"' to see how a formula is tokenized.
"#;

const OPERATORS_DOC: &str = r#"OPERATORS - Precedence and Overloads

PRECEDENCE (highest first)

  8   !  -          prefix, right-associative
  7   ^             power, right-associative   2 ^ 3 ^ 2 = 512
  6   *  /  %       left-associative
  5   +  -          left-associative
  4   >  >=  <  <=  left-associative
  3   ==  !=        left-associative
  2   &&            left-associative
  1   ||            left-associative

ARITHMETIC
  +  -  *  /  %  ^     Number, Number -> Number
  +                    String, String -> String (concatenation)
  -x                   Number -> Number

    Constraints:
      - Division or modulo by zero is an arithmetic error

COMPARISON
  ==  !=               String, Number, Boolean or DateTime pairs -> Boolean
  >  >=  <  <=         Number or DateTime pairs -> Boolean

    Both operands must have the same type: 1 == "1" is an overload error.
    A missing value equals another missing value and nothing else.

LOGICAL
  &&  ||               Boolean, Boolean -> Boolean
  !b                   Boolean -> Boolean

    Both operands are always evaluated.

PREFIX OR INFIX
  An operator at the start, after another operator, after `(` or after `,`
  is prefix; anywhere else it is infix.

    3 - -2       ->  5
    !(1 > 2)     ->  true
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS - Built-in Functions

IF(condition, when_true, when_false)
    Returns one of the branches. Both branches must have the same type, one
    of Boolean, Array, DateTime, Number or String.

    Example:
      Formula:  IF({{qty}} >= 10, {{price}} * 0.9, {{price}})
      Input:    {"qty": 12, "price": 5}
      Output:   4.5

DATEDIFF(a, b)
    Days from b to a as a Number, including fractions of a day.

    Example:
      Formula:  DATEDIFF({{end}}, {{start}})
      Input:    {"end": {"$date": "2024-01-10"}, "start": {"$date": "2024-01-01"}}
      Output:   9

DATEADD(interval, count, date)
    Shifts a date. The interval is case-insensitive:

      yyyy      years      (count truncated)
      q         quarters   (count truncated)
      m         months     (count truncated)
      y  d  w   days
      ww        weeks
      h         hours
      n         minutes
      s         seconds

    Month arithmetic clamps the day: adding one month to Jan 31 gives the
    last day of February. The date may also be a String in the form
    YYYY-MM-DD[THH:MM[:SS[.fff]]]; a String that does not parse is an error.

    Example:
      Formula:  DATEADD("d", 5, {{d}})
      Input:    {"d": {"$date": "2024-01-01"}}
      Output:   "2024-01-06T00:00:00"

      Formula:  DATEADD("m", 1, "2024-01-31")
      Output:   "2024-02-29T00:00:00"
"#;

const TYPES_DOC: &str = r#"TYPES - Data Types and Missing Values

TYPES
  Number      64-bit float; integers and decimals share this type
  String      UTF-8 text
  Boolean     true or false
  DateTime    calendar date and time, millisecond precision
  Array       ordered list of values

    There are no implicit conversions between types.

JSON INPUT
  The CLI reads variables from a JSON object:

    number          ->  Number
    string          ->  String
    true / false    ->  Boolean
    [ ... ]         ->  Array
    {"$date": "YYYY-MM-DD[THH:MM[:SS[.fff]]]"}  ->  DateTime
    null            ->  missing String

MISSING VALUES
  A variable can be declared with a type but no value. Arithmetic, ordering
  and logical operators fail on a missing value; == and != treat two missing
  values as equal and one missing value as unequal to anything else.

    Example:
      Formula:  {{nickname}} == "bob"
      Input:    {"nickname": null}
      Output:   false
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases() {
        assert_eq!(DocCategory::from_name("OPS"), Some(DocCategory::Operators));
        assert_eq!(DocCategory::from_name("fn"), Some(DocCategory::Functions));
        assert_eq!(DocCategory::from_name("queries"), None);
    }

    #[test]
    fn test_unknown_category() {
        assert!(matches!(
            get_doc_category("nope"),
            Err(CliError::UnknownCategory(name)) if name == "nope"
        ));
    }
}
