use crate::runner::token_listing;
use exprcalc::{evaluate_with, EvalConfig};
use owo_colors::OwoColorize;
use std::error::Error;

const BANNER: &str = "\
Expression evaluator
====================
Supported operations:
1. Arithmetic: +, -, *, /, ^, %
2. Comparison: ==, !=, <, >, <=, >=
3. Logical: AND, OR
4. IF <condition> THEN <expression> ELSE <expression>
5. Enter 'quit' to exit

Example expressions:
- 3 + 4 * 2
- (3 + 4) * 2
- 2 ^ 3
- 5 % 2
- 5 > 3 AND 2 < 4
- IF 5 > 3 THEN 1 ELSE 0";

pub fn repl(config: &EvalConfig, tokens: bool) -> Result<(), Box<dyn Error>> {
    let mut rl = rustyline::DefaultEditor::new()?;
    println!("{BANNER}");

    loop {
        let readline = rl.readline("> ");
        let Ok(line) = readline else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("quit") {
            println!("Goodbye!");
            break;
        }
        rl.add_history_entry(line)?;

        if tokens {
            match token_listing(line) {
                Ok(listing) => println!("{listing}"),
                Err(e) => eprintln!("{}", format!("Error: {e}").red()),
            }
            continue;
        }
        match evaluate_with(line, config) {
            Ok(value) => println!("Result: {value}"),
            Err(e) => eprintln!("{}", format!("Error: {e}").red()),
        }
    }
    Ok(())
}
