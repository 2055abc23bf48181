//! A small expression language over floating-point numbers: arithmetic,
//! comparisons, `AND`/`OR` and a top-level `IF ... THEN ... ELSE ...`.
//!
//! ```
//! use exprcalc::{evaluate, Value};
//!
//! assert_eq!(evaluate("2 ^ 3 + 4 * 5 - 6").unwrap(), Value::Number(22.0));
//! assert_eq!(evaluate("5 > 3 AND 2 < 4").unwrap(), Value::Bool(true));
//! ```
pub mod evaluator;
pub mod lexer;
pub mod textlocator;
pub mod token;
pub mod value;

pub use evaluator::{EvalConfig, EvalError, RuntimeError, SyntaxError, DEFAULT_MAX_DEPTH};
pub use lexer::{LexError, Scanner};
pub use textlocator::Location;
pub use token::{Token, TokenKind};
pub use value::Value;

use evaluator::Evaluator;
use log::debug;

/// Evaluates `source` with the default [`EvalConfig`].
pub fn evaluate(source: &str) -> Result<Value, EvalError> {
    evaluate_with(source, &EvalConfig::default())
}

pub fn evaluate_with(source: &str, config: &EvalConfig) -> Result<Value, EvalError> {
    let result = Evaluator::new(Scanner::from_text(source), config).and_then(Evaluator::program);
    match &result {
        Ok(value) => debug!("{source:?} evaluated to {value}"),
        Err(e) => debug!("{source:?} failed: {e}"),
    }
    result
}

/// Every token of `source` in order, without the trailing end-of-input token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Scanner::from_text(source).collect()
}
