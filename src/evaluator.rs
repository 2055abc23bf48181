//! Recursive-descent evaluator. Every production computes its value as soon as
//! it has parsed its operands; no tree is ever built.
//!
//! ```text
//! program        := if_expr | logical_expr
//! if_expr        := IF logical_expr THEN expression ELSE expression
//! logical_expr   := comparison { (AND | OR) comparison }
//! comparison     := expression { (== | != | < | > | <= | >=) expression }
//! expression     := term { (+ | -) term }
//! term           := factor { (* | / | %) factor }
//! factor         := (+ | -) factor | exponentiation
//! exponentiation := atom { ^ factor }
//! atom           := NUMBER | ( expression )
//! ```
use crate::{
    lexer::{LexError, Scanner},
    textlocator::Location,
    token::{Token, TokenKind},
    value::{Comparison, Value},
};
use log::trace;
use std::mem::replace;
use thiserror::Error;

pub const DEFAULT_MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// How deeply parentheses, unary signs and exponents may nest before
    /// evaluation gives up instead of growing the stack further.
    pub max_depth: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("invalid syntax at {}: expected {expected}, found `{}`", found.location, found.kind)]
    UnexpectedToken { expected: String, found: Token },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("division by zero at {0}")]
    DivisionByZero(Location),
    #[error("`{operator}` needs boolean operands but found `{value}` at {location}")]
    NonBooleanOperand {
        operator: TokenKind,
        value: Value,
        location: Location,
    },
    #[error("IF condition must be boolean but found `{0}` at {1}")]
    NonBooleanCondition(Value, Location),
    #[error("expression nests deeper than {0} levels at {1}")]
    TooDeep(usize, Location),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

type EvalResult<T> = Result<T, EvalError>;

pub struct Evaluator<I: Iterator<Item = char>> {
    scanner: Scanner<I>,
    lookahead: Token,
    max_depth: usize,
    depth: usize,
}

impl<I: Iterator<Item = char>> Evaluator<I> {
    pub fn new(mut scanner: Scanner<I>, config: &EvalConfig) -> EvalResult<Self> {
        let lookahead = scanner.next_token()?;
        Ok(Self {
            scanner,
            lookahead,
            max_depth: config.max_depth,
            depth: 0,
        })
    }

    /// Evaluates the whole input. Consumes the evaluator so that nothing can
    /// resume from the state an error left behind.
    pub fn program(mut self) -> EvalResult<Value> {
        let value = if self.lookahead.kind == TokenKind::If {
            self.if_expr()?
        } else {
            self.logical_expr()?
        };
        self.eat(TokenKind::Eof)?;
        Ok(value)
    }

    fn advance(&mut self) -> EvalResult<Token> {
        let next = self.scanner.next_token()?;
        Ok(replace(&mut self.lookahead, next))
    }

    fn eat(&mut self, kind: TokenKind) -> EvalResult<Token> {
        if self.lookahead.kind != kind {
            let expected = match kind {
                TokenKind::Eof => kind.to_string(),
                _ => format!("`{kind}`"),
            };
            return Err(self.unexpected(expected));
        }
        self.advance()
    }

    fn unexpected(&self, expected: impl Into<String>) -> EvalError {
        SyntaxError::UnexpectedToken {
            expected: expected.into(),
            found: self.lookahead,
        }
        .into()
    }

    /// Runs `production` one nesting level deeper, refusing once the limit is hit.
    fn nested<T>(
        &mut self,
        location: Location,
        production: fn(&mut Self) -> EvalResult<T>,
    ) -> EvalResult<T> {
        if self.depth >= self.max_depth {
            return Err(RuntimeError::TooDeep(self.max_depth, location).into());
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    // Both branches are evaluated; the condition only picks the result.
    fn if_expr(&mut self) -> EvalResult<Value> {
        self.eat(TokenKind::If)?;
        let condition_location = self.lookahead.location;
        let condition = self.logical_expr()?;
        self.eat(TokenKind::Then)?;
        let then_value = self.expression()?;
        self.eat(TokenKind::Else)?;
        let else_value = self.expression()?;

        match condition {
            Value::Bool(true) => Ok(Value::Number(then_value)),
            Value::Bool(false) => Ok(Value::Number(else_value)),
            other => Err(RuntimeError::NonBooleanCondition(other, condition_location).into()),
        }
    }

    fn logical_expr(&mut self) -> EvalResult<Value> {
        let mut location = self.lookahead.location;
        let mut result = self.comparison()?;
        loop {
            if !matches!(self.lookahead.kind, TokenKind::And | TokenKind::Or) {
                return Ok(result);
            }
            let op = self.advance()?;
            let right_location = self.lookahead.location;
            // The right side is always evaluated to keep the token stream in step.
            let right = self.comparison()?;

            let left = Self::boolean_operand(result, op.kind, location)?;
            let right = Self::boolean_operand(right, op.kind, right_location)?;
            result = Value::Bool(match op.kind {
                TokenKind::And => left && right,
                _ => left || right,
            });
            location = op.location;
        }
    }

    fn boolean_operand(
        value: Value,
        operator: TokenKind,
        location: Location,
    ) -> EvalResult<bool> {
        value.as_bool().ok_or_else(|| {
            RuntimeError::NonBooleanOperand {
                operator,
                value,
                location,
            }
            .into()
        })
    }

    fn comparison(&mut self) -> EvalResult<Value> {
        let mut result = Value::Number(self.expression()?);
        loop {
            let op = match self.lookahead.kind {
                TokenKind::DoubleEquals => Comparison::Equal,
                TokenKind::NotEqual => Comparison::NotEqual,
                TokenKind::LessThan => Comparison::LessThan,
                TokenKind::GreaterThan => Comparison::GreaterThan,
                TokenKind::LessThanOrEqual => Comparison::LessThanOrEqual,
                TokenKind::GreaterThanOrEqual => Comparison::GreaterThanOrEqual,
                _ => return Ok(result),
            };
            self.advance()?;
            let right = self.expression()?;
            trace!("comparing {result} {op:?} {right}");
            result = Value::Bool(result.compare(op, right));
        }
    }

    fn expression(&mut self) -> EvalResult<f64> {
        let mut result = self.term()?;
        loop {
            match self.lookahead.kind {
                TokenKind::Plus => {
                    self.advance()?;
                    result += self.term()?;
                }
                TokenKind::Minus => {
                    self.advance()?;
                    result -= self.term()?;
                }
                _ => return Ok(result),
            }
        }
    }

    fn term(&mut self) -> EvalResult<f64> {
        let mut result = self.factor()?;
        loop {
            match self.lookahead.kind {
                TokenKind::Asterisk => {
                    self.advance()?;
                    result *= self.factor()?;
                }
                TokenKind::ForwardSlash => {
                    let op = self.advance()?;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(RuntimeError::DivisionByZero(op.location).into());
                    }
                    result /= divisor;
                }
                // Not zero-checked: `x % 0` is NaN.
                TokenKind::Mod => {
                    self.advance()?;
                    result %= self.factor()?;
                }
                _ => return Ok(result),
            }
        }
    }

    fn factor(&mut self) -> EvalResult<f64> {
        match self.lookahead.kind {
            TokenKind::Plus => {
                let op = self.advance()?;
                self.nested(op.location, Self::factor)
            }
            TokenKind::Minus => {
                let op = self.advance()?;
                Ok(-self.nested(op.location, Self::factor)?)
            }
            _ => self.exponentiation(),
        }
    }

    /// The exponent recurses through `factor`, which makes `^` right-associative
    /// and lets a sign follow it directly (`2^-1`).
    fn exponentiation(&mut self) -> EvalResult<f64> {
        let mut result = self.atom()?;
        while self.lookahead.kind == TokenKind::Hat {
            let op = self.advance()?;
            let exponent = self.nested(op.location, Self::factor)?;
            result = result.powf(exponent);
        }
        Ok(result)
    }

    fn atom(&mut self) -> EvalResult<f64> {
        match self.lookahead.kind {
            TokenKind::Number(n) => {
                self.advance()?;
                Ok(n)
            }
            TokenKind::OpenParen => {
                let open = self.advance()?;
                let value = self.nested(open.location, Self::expression)?;
                self.eat(TokenKind::CloseParen)?;
                Ok(value)
            }
            _ => Err(self.unexpected("a number or `(`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(text: &str) -> EvalResult<Value> {
        eval_with(text, &EvalConfig::default())
    }

    fn eval_with(text: &str, config: &EvalConfig) -> EvalResult<Value> {
        Evaluator::new(Scanner::from_text(text), config)?.program()
    }

    macro_rules! assert_eval {
        ($text:expr => $expt:expr) => {
            assert_eq!(eval($text), Ok(Value::from($expt)), "evaluating `{}`", $text)
        };
    }

    macro_rules! assert_fails {
        ($text:expr => $expt:pat) => {{
            let res = eval($text);
            assert!(matches!(res, Err($expt)), "evaluating `{}` gave {res:?}", $text)
        }};
    }

    #[test]
    fn precedence() {
        assert_eval!("2 ^ 3 + 4 * 5 - 6" => 22.0);
        assert_eval!("10 / 2 + 3 ^ 2" => 14.0);
        assert_eval!("5 + 2 ^ 3 ^ 2 - 1" => 516.0);
        assert_eval!("(3 + 4) * 2" => 14.0);
        assert_eval!("3 + 4 * 2" => 11.0);
        assert_eval!("7 - 2 - 1" => 4.0);
        assert_eval!("16 / 4 / 2" => 2.0);
    }

    #[test]
    fn unary() {
        assert_eval!("-2^2" => -4.0);
        assert_eval!("--5" => 5.0);
        assert_eval!("+-+3" => -3.0);
        assert_eval!("2^-1" => 0.5);
        assert_eval!("2 * -3" => -6.0);
        assert_eval!("(-2)^2" => 4.0);
    }

    #[test]
    fn modulus() {
        assert_eval!("5 % 2" => 1.0);
        assert_eval!("-7 % 3" => -1.0);
        assert_eval!("7.5 % 2" => 1.5);
        let Ok(Value::Number(n)) = eval("5 % 0") else {
            panic!("`5 % 0` did not produce a number");
        };
        assert!(n.is_nan());
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(
            eval("1 +\n 5 / 0"),
            Err(EvalError::Runtime(RuntimeError::DivisionByZero(Location {
                line: 2,
                column: 4
            })))
        );
        assert_fails!("5 / (2 - 2)" => EvalError::Runtime(RuntimeError::DivisionByZero(_)));
    }

    #[test]
    fn undefined_power_is_nan() {
        let Ok(Value::Number(n)) = eval("(-8) ^ 0.5") else {
            panic!("power did not produce a number");
        };
        assert!(n.is_nan());
    }

    #[test]
    fn comparisons() {
        assert_eval!("5 > 3" => true);
        assert_eval!("5 < 3" => false);
        assert_eval!("2 + 2 == 4" => true);
        assert_eval!("2 != 2" => false);
        assert_eval!("3 >= 3" => true);
        assert_eval!("3 <= 2.5" => false);
    }

    #[test]
    fn chained_comparisons_feed_back_result() {
        // (1 < 2) < 3 is true < 3, i.e. 1 < 3
        assert_eval!("1 < 2 < 3" => true);
        // (3 > 2) > 1 is true > 1, i.e. 1 > 1
        assert_eval!("3 > 2 > 1" => false);
        assert_eval!("1 < 2 == 1" => true);
        assert_eval!("5 == 5 == 0" => false);
    }

    #[test]
    fn logical() {
        assert_eval!("5 > 3 AND 2 < 4" => true);
        assert_eval!("5 > 3 OR 2 > 4" => true);
        assert_eval!("5 < 3 AND 2 < 4" => false);
        assert_eval!("5 < 3 or 2 > 4" => false);
        // left-associative: (false AND true) OR true
        assert_eval!("1 > 2 AND 1 < 2 OR 3 == 3" => true);
        // (true OR x) AND false
        assert_eval!("1 < 2 OR 1 > 2 AND 1 > 2" => false);
    }

    #[test]
    fn logical_needs_booleans() {
        assert_eq!(
            eval("1 AND 2 > 1"),
            Err(EvalError::Runtime(RuntimeError::NonBooleanOperand {
                operator: TokenKind::And,
                value: Value::Number(1.0),
                location: Location::START,
            }))
        );
        assert_fails!("1 < 2 OR 7" => EvalError::Runtime(RuntimeError::NonBooleanOperand { .. }));
    }

    #[test]
    fn logical_right_side_is_consumed() {
        assert_eval!("1 > 2 AND 3 > 4" => false);
        assert_eval!("1 < 2 OR 3 > 4" => true);
    }

    #[test]
    fn if_then_else() {
        assert_eval!("IF 5 > 3 THEN 1 ELSE 0" => 1.0);
        assert_eval!("IF 2 > 3 THEN 1 ELSE 0" => 0.0);
        assert_eval!("if 1 < 2 and 2 < 3 then 2 ^ 3 else -1" => 8.0);
        assert_eval!("IF 1 == 1 THEN 1 + 1 ELSE 2 * 5" => 2.0);
    }

    #[test]
    fn if_evaluates_both_branches() {
        assert_fails!(
            "IF 1 < 2 THEN 1 ELSE 1 / 0" => EvalError::Runtime(RuntimeError::DivisionByZero(_))
        );
    }

    #[test]
    fn if_needs_boolean_condition() {
        assert_eq!(
            eval("IF 1 + 1 THEN 1 ELSE 0"),
            Err(EvalError::Runtime(RuntimeError::NonBooleanCondition(
                Value::Number(2.0),
                Location { line: 1, column: 4 }
            )))
        );
    }

    #[test]
    fn if_only_at_top_level() {
        assert_fails!("1 + IF 1 < 2 THEN 1 ELSE 0" => EvalError::Syntax(_));
        assert_fails!("IF 1 < 2 THEN 1" => EvalError::Syntax(_));
        assert_fails!("IF 1 < 2 1 ELSE 0" => EvalError::Syntax(_));
    }

    #[test]
    fn syntax_errors() {
        assert_fails!("3 +" => EvalError::Syntax(_));
        assert_fails!("(1 + 2" => EvalError::Syntax(_));
        assert_fails!("1 + 2)" => EvalError::Syntax(_));
        assert_fails!("()" => EvalError::Syntax(_));
        assert_fails!("3 3" => EvalError::Syntax(_));
        assert_fails!("NOT 1 < 2" => EvalError::Syntax(_));
        assert_fails!("" => EvalError::Syntax(_));
    }

    #[test]
    fn syntax_error_message() {
        let err = eval("(1 + 2").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid syntax at line 1, column 7: expected `)`, found `end of input`"
        );
        let err = eval("2 *\n  )").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid syntax at line 2, column 3: expected a number or `(`, found `)`"
        );
    }

    #[test]
    fn bitwise_tokens_are_not_operators() {
        assert_eq!(
            eval("5 & 3"),
            Err(EvalError::Syntax(SyntaxError::UnexpectedToken {
                expected: "end of input".into(),
                found: Token {
                    location: Location { line: 1, column: 3 },
                    kind: TokenKind::Ampersand,
                },
            }))
        );
        assert_fails!("5 | 3" => EvalError::Syntax(_));
    }

    #[test]
    fn lex_errors_pass_through() {
        assert_fails!("FOO + 1" => EvalError::Lex(LexError::UnknownIdentifier(..)));
        assert_fails!("1 + 1.2.3" => EvalError::Lex(LexError::SecondDecimalPoint(_)));
        assert_fails!("1 = 1" => EvalError::Lex(LexError::IncompleteOperator('=', _)));
        assert_fails!("1 @ 1" => EvalError::Lex(LexError::Char('@', _)));
    }

    #[test]
    fn comments_and_lines() {
        assert_eval!("# leading comment\n1 +  # add\n  2\n" => 3.0);
        assert_eval!(".5 + 1." => 1.5);
    }

    #[test]
    fn nesting_limit() {
        let config = EvalConfig { max_depth: 4 };
        assert_eq!(eval_with("((((1))))", &config), Ok(Value::Number(1.0)));
        assert_eq!(
            eval_with("(((((1)))))", &config),
            Err(EvalError::Runtime(RuntimeError::TooDeep(
                4,
                Location { line: 1, column: 5 }
            )))
        );
        assert!(matches!(
            eval_with("-----1", &config),
            Err(EvalError::Runtime(RuntimeError::TooDeep(4, _)))
        ));
        assert_eq!(eval_with("----1", &config), Ok(Value::Number(1.0)));
    }

    #[test]
    fn default_depth_handles_reasonable_nesting() {
        let text = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert_eval!(&text => 1.0);
    }
}
