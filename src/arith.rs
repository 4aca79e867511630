//! Minimal arithmetic expression evaluator for comparison rules.
//!
//! Supports integer and float literals, `+ - * /`, parentheses, and
//! unary sign, evaluated in `f64`. Division by zero and non-finite
//! intermediate results are errors, never silent infinities. Criteria and
//! values for the ordering rules both go through this evaluator, so a
//! resource value like `"90/10+1"` compares as `10`.

use std::fmt;

/// Malformed expression or undefined arithmetic result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArithError {
    pub message: String,
}

impl fmt::Display for ArithError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ArithError {}

fn arith_error(message: impl Into<String>) -> ArithError {
    ArithError {
        message: message.into(),
    }
}

/// Evaluate an arithmetic expression.
pub fn eval(input: &str) -> Result<f64, ArithError> {
    let mut parser = Parser {
        bytes: input.as_bytes(),
        pos: 0,
    };
    let value = parser.expression()?;
    parser.skip_whitespace();
    if parser.pos != parser.bytes.len() {
        return Err(arith_error(format!(
            "unexpected trailing input in expression: '{}'",
            input
        )));
    }
    check_finite(value)?;
    Ok(value)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    // expression := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<f64, ArithError> {
        let mut value = self.term()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'+') => {
                    self.pos += 1;
                    value += self.term()?;
                }
                Some(b'-') => {
                    self.pos += 1;
                    value -= self.term()?;
                }
                _ => return Ok(value),
            }
            check_finite(value)?;
        }
    }

    // term := factor (('*' | '/') factor)*
    fn term(&mut self) -> Result<f64, ArithError> {
        let mut value = self.factor()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(b'*') => {
                    self.pos += 1;
                    value *= self.factor()?;
                }
                Some(b'/') => {
                    self.pos += 1;
                    let divisor = self.factor()?;
                    if divisor == 0.0 {
                        return Err(arith_error("division by zero"));
                    }
                    value /= divisor;
                }
                _ => return Ok(value),
            }
            check_finite(value)?;
        }
    }

    // factor := number | '(' expression ')' | ('+' | '-') factor
    fn factor(&mut self) -> Result<f64, ArithError> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'(') => {
                self.pos += 1;
                let value = self.expression()?;
                self.skip_whitespace();
                if self.peek() != Some(b')') {
                    return Err(arith_error("missing closing parenthesis"));
                }
                self.pos += 1;
                Ok(value)
            }
            Some(b'-') => {
                self.pos += 1;
                Ok(-self.factor()?)
            }
            Some(b'+') => {
                self.pos += 1;
                self.factor()
            }
            Some(c) if c.is_ascii_digit() || c == b'.' => self.number(),
            _ => Err(arith_error("expected a number")),
        }
    }

    fn number(&mut self) -> Result<f64, ArithError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
        }
        // `bytes` came from a &str and the consumed range is pure ASCII.
        let text = std::str::from_utf8(&self.bytes[start..self.pos])
            .map_err(|_| arith_error("invalid number"))?;
        text.parse::<f64>()
            .map_err(|_| arith_error(format!("invalid number: '{}'", text)))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }
}

fn check_finite(value: f64) -> Result<(), ArithError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(arith_error("arithmetic overflow"))
    }
}
