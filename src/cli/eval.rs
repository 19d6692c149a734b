//! Evaluate formulas against JSON variables

use crate::evaluator::VariableMap;
use crate::parser::Parser;
use crate::postfix;

use super::{CliError, json_to_variables, value_to_json};

/// Options for the eval command
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// The formula to evaluate
    pub formula: String,
    /// JSON object with the variables
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't evaluate
    pub syntax_only: bool,
}

/// Result of an eval operation
#[derive(Debug)]
pub enum EvalOutcome {
    /// Syntax validation passed
    SyntaxValid,
    /// Formula evaluated successfully with JSON output
    Success(serde_json::Value),
}

/// Execute a formula eval operation
///
/// Without input the formula is evaluated against no variables, which is
/// enough for constant formulas.
pub fn execute_eval(parser: &Parser, options: &EvalOptions) -> Result<EvalOutcome, CliError> {
    if options.syntax_only {
        parser.parse(&options.formula)?;
        return Ok(EvalOutcome::SyntaxValid);
    }

    let vars = match options.input.as_deref() {
        Some(json) => json_to_variables(serde_json::from_str(json)?)?,
        None => VariableMap::new(),
    };
    tracing::debug!(variables = vars.len(), "loaded variables");

    let result = parser.evaluate(&options.formula, &vars)?;
    Ok(EvalOutcome::Success(value_to_json(result)))
}

/// Token stream and postfix order of a formula, one section each
pub fn describe_tokens(parser: &Parser, formula: &str) -> Result<String, CliError> {
    let tokens = parser.tokenize(formula)?;
    let postfix = parser.to_postfix(formula)?;

    let mut out = String::from("TOKENS\n");
    for token in &tokens {
        out.push_str(&format!(
            "  {:>4}  {:<15} {}\n",
            token.position,
            format!("{:?}", token.kind),
            token.text
        ));
    }
    out.push_str("\nPOSTFIX\n  ");
    out.push_str(&postfix::render(&postfix));
    out.push('\n');
    Ok(out)
}
