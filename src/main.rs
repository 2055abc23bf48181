mod repl;
mod runner;

use clap::Parser;
use exprcalc::{EvalConfig, DEFAULT_MAX_DEPTH};
use std::{path::PathBuf, process::ExitCode};

/// Evaluates arithmetic, comparison, logical and IF-THEN-ELSE expressions.
/// Starts an interactive prompt when neither an expression nor a file is given.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Expression to evaluate.
    #[arg(short, long, conflicts_with = "file", allow_hyphen_values = true)]
    expr: Option<String>,

    /// Print the tokens of the input instead of evaluating it.
    #[arg(short, long)]
    tokens: bool,

    /// How deeply parentheses, unary signs and exponents may nest.
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// File holding a single expression, which may span lines and contain `#` comments.
    file: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    let config = EvalConfig {
        max_depth: args.max_depth,
    };

    let res = match (args.expr, args.file) {
        (Some(expr), _) => runner::run_text(&expr, &config, args.tokens),
        (None, Some(file)) => runner::run_file(&file, &config, args.tokens),
        (None, None) => repl::repl(&config, args.tokens),
    };

    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
