use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Number(f64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
}

impl Value {
    /// Booleans count as `1` and `0` when they meet a number.
    pub fn as_number(self) -> f64 {
        match self {
            Self::Number(n) => n,
            Self::Bool(true) => 1.0,
            Self::Bool(false) => 0.0,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(b),
            Self::Number(_) => None,
        }
    }

    /// Compares the running result of a comparison chain against the next operand.
    ///
    /// A chain like `1 < 2 < 3` feeds the boolean from `1 < 2` back in here, so
    /// the second step is `true < 3`.
    pub fn compare(self, op: Comparison, right: f64) -> bool {
        let left = self.as_number();
        match op {
            Comparison::Equal => left == right,
            Comparison::NotEqual => left != right,
            Comparison::LessThan => left < right,
            Comparison::GreaterThan => left > right,
            Comparison::LessThanOrEqual => left <= right,
            Comparison::GreaterThanOrEqual => left >= right,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}
