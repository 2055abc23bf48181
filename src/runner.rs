use exprcalc::{evaluate_with, tokenize, EvalConfig, LexError};
use itertools::Itertools;
use std::{error::Error, fs::read_to_string, path::Path};

pub fn run_file<P>(filename: P, config: &EvalConfig, tokens: bool) -> Result<(), Box<dyn Error>>
where
    P: AsRef<Path>,
{
    let text = read_to_string(filename)?;
    run_text(&text, config, tokens)
}

pub fn run_text(text: &str, config: &EvalConfig, tokens: bool) -> Result<(), Box<dyn Error>> {
    if tokens {
        println!("{}", token_listing(text)?);
    } else {
        println!("{}", evaluate_with(text, config)?);
    }
    Ok(())
}

/// One `line:column lexeme` entry per line.
pub fn token_listing(text: &str) -> Result<String, LexError> {
    Ok(tokenize(text)?.iter().join("\n"))
}
