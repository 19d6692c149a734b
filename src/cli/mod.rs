//! CLI support for formula-lang
//!
//! Provides programmatic access to the `formula` command so other tools can
//! run the same evaluation and documentation paths without spawning it.

mod convert;
mod docs;
mod eval;

pub use convert::{json_to_value, json_to_variables, value_to_json};
pub use docs::{DocCategory, get_doc_category, get_docs_overview};
pub use eval::{EvalOptions, EvalOutcome, describe_tokens, execute_eval};

use std::io;

use thiserror::Error;

use crate::error::FormulaError;
use crate::evaluator::EvalError;
use crate::parser::ParseError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON that parsed but cannot become formula variables
    #[error("Invalid input: {0}")]
    Input(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown category: '{0}'\nRun 'formula docs' to see available categories.")]
    UnknownCategory(String),
}

impl From<FormulaError> for CliError {
    fn from(e: FormulaError) -> Self {
        match e {
            FormulaError::Parse(e) => CliError::Parse(e),
            FormulaError::Eval(e) => CliError::Eval(e),
        }
    }
}
