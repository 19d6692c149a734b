use clap::{Parser as ClapParser, Subcommand};
use formula_lang::Parser;
use formula_lang::cli::{self, CliError, EvalOptions, EvalOutcome};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "formula")]
#[command(about = "formula - Evaluate typed formulas with overloaded operators and functions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and evaluate a formula
    Eval {
        /// The formula to evaluate
        formula: String,

        /// JSON object with variables (reads from stdin if piped)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate syntax, don't evaluate
        #[arg(long)]
        syntax_only: bool,
    },

    /// Show the token stream and postfix order of a formula
    Tokens {
        /// The formula to tokenize
        formula: String,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'formula docs' to list categories)
        category: String,
    },
}

/// Log to stderr, only when RUST_LOG is set
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let parser = Parser::with_defaults();

    let result = match cli.command {
        Commands::Eval {
            formula,
            input,
            pretty,
            syntax_only,
        } => run_eval(&parser, formula, input, pretty, syntax_only),
        Commands::Tokens { formula } => cli::describe_tokens(&parser, &formula).map(|out| print!("{out}")),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| print!("{content}")),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run_eval(
    parser: &Parser,
    formula: String,
    input: Option<String>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer).filter(|b| !b.trim().is_empty())
        }
        None => None,
    };

    let options = EvalOptions {
        formula,
        input,
        pretty,
        syntax_only,
    };

    match cli::execute_eval(parser, &options)? {
        EvalOutcome::SyntaxValid => println!("Syntax is valid"),
        EvalOutcome::Success(output) => {
            let json = if pretty {
                serde_json::to_string_pretty(&output)?
            } else {
                serde_json::to_string(&output)?
            };
            println!("{json}");
        }
    }
    Ok(())
}
