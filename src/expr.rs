//! Four-operator arithmetic for the calculator display.
//!
//! The display buffer only ever holds digits, the decimal point and the
//! operator glyphs, so evaluation is a small recursive descent parser rather
//! than a general expression engine. `%` is accepted on screen but is not an
//! operator here, so any buffer containing it fails to evaluate.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),
    #[error("malformed number `{0}`")]
    InvalidNumber(String),
    #[error("expression ended early")]
    UnexpectedEnd,
    #[error("input continues after a complete expression")]
    TrailingInput,
    #[error("division by zero")]
    DivisionByZero,
    #[error("result is not finite")]
    NonFinite,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Op(char),
}

/// Evaluate a display buffer and render the truncated integer result
pub fn evaluate_display(display: &str) -> Result<String, EvalError> {
    let expr = display.replace('÷', "/").replace('×', "*");
    let value = evaluate(&expr)?;
    format_truncated(value)
}

/// Evaluate an ASCII expression using `+ - * /`
pub fn evaluate(expr: &str) -> Result<f64, EvalError> {
    let tokens = tokenize(expr)?;
    let mut parser = Parser { tokens, pos: 0 };
    let value = parser.expr()?;
    if parser.peek().is_some() {
        return Err(EvalError::TrailingInput);
    }
    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    Ok(value)
}

/// Truncate toward zero and print every integer digit
pub fn format_truncated(value: f64) -> Result<String, EvalError> {
    if !value.is_finite() {
        return Err(EvalError::NonFinite);
    }
    // adding 0.0 folds -0.0 into 0.0
    Ok(format!("{:.0}", value.trunc() + 0.0))
}

fn tokenize(expr: &str) -> Result<Vec<Token>, EvalError> {
    let mut tokens = Vec::new();
    let mut chars = expr.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            '0'..='9' | '.' => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| EvalError::InvalidNumber(literal.clone()))?;
                tokens.push(Token::Number(value));
            }
            '+' | '-' | '*' | '/' => {
                tokens.push(Token::Op(c));
                chars.next();
            }
            c if c.is_whitespace() => {
                chars.next();
            }
            other => return Err(EvalError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expr(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.term()?;
        while let Some(Token::Op(op @ ('+' | '-'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == '+' { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, EvalError> {
        let mut acc = self.unary()?;
        while let Some(Token::Op(op @ ('*' | '/'))) = self.peek().cloned() {
            self.pos += 1;
            let rhs = self.unary()?;
            acc = if op == '*' {
                acc * rhs
            } else {
                if rhs == 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                acc / rhs
            };
        }
        Ok(acc)
    }

    // Signs are folded iteratively so long runs of `-` cannot grow the stack.
    fn unary(&mut self) -> Result<f64, EvalError> {
        let mut negative = false;
        loop {
            match self.bump() {
                Some(Token::Op('+')) => {}
                Some(Token::Op('-')) => negative = !negative,
                Some(Token::Number(n)) => return Ok(if negative { -n } else { n }),
                Some(Token::Op(c)) => return Err(EvalError::UnexpectedChar(c)),
                None => return Err(EvalError::UnexpectedEnd),
            }
        }
    }
}
