//! `magic_calculator`: a small arithmetic evaluator.
//!
//! Expressions are tokenized and evaluated by a recursive-descent parser over
//! a fixed allow-list of constants and functions. There is no way to reach
//! anything outside that list: the model's expression is trusted only to be
//! arithmetic, and anything else is a syntax or name error. Number semantics
//! follow Python (integers stay integers, `/` is true division, `//` and `%`
//! floor), since that is what users of the tool expect to see printed back.

use std::fmt;

use anyhow::anyhow;
use serde_json::{json, Value};
use thiserror::Error;

use crate::providers::types::tool::Tool;

pub const NAME: &str = "magic_calculator";

const RESERVED_PREFIX: &str = "__";
const MAX_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    #[error("invalid syntax: {0}")]
    Syntax(String),
    #[error("name '{0}' is not defined")]
    UnknownName(String),
    #[error("access to reserved name '{0}' is not allowed")]
    ReservedName(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow")]
    Overflow,
    #[error("math domain error")]
    Domain,
    #[error("{0}() takes {1}")]
    Arity(String, &'static str),
    #[error("{0}")]
    Invalid(String),
}

type CalcResult<T> = Result<T, CalcError>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(i) => write!(f, "{}", i),
            Number::Float(x) => f.write_str(&format_float(*x)),
        }
    }
}

/// Format a float the way Python's `repr` does: always a decimal point or
/// exponent, exponent form outside `[1e-4, 1e16)`.
fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = x.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", x);
        let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{}e{}{:0>2}", mantissa, sign, digits);
    }

    let formatted = format!("{}", x);
    if formatted.contains('.') {
        formatted
    } else {
        format!("{}.0", formatted)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Num(Number),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Power,
    LParen,
    RParen,
    Comma,
}

fn tokenize(input: &str) -> CalcResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                let start = i;
                let mut is_float = false;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    is_float |= chars[i] == '.';
                    i += 1;
                }
                if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                    let mut j = i + 1;
                    if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                        j += 1;
                    }
                    if j < chars.len() && chars[j].is_ascii_digit() {
                        while j < chars.len() && chars[j].is_ascii_digit() {
                            j += 1;
                        }
                        is_float = true;
                        i = j;
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Num(parse_number(&literal, is_float)?));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                if name.starts_with(RESERVED_PREFIX) {
                    return Err(CalcError::ReservedName(name));
                }
                tokens.push(Token::Ident(name));
            }
            '*' if chars.get(i + 1) == Some(&'*') => {
                tokens.push(Token::Power);
                i += 2;
            }
            '/' if chars.get(i + 1) == Some(&'/') => {
                tokens.push(Token::DoubleSlash);
                i += 2;
            }
            _ => {
                let token = match c {
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '/' => Token::Slash,
                    '%' => Token::Percent,
                    '(' => Token::LParen,
                    ')' => Token::RParen,
                    ',' => Token::Comma,
                    other => {
                        return Err(CalcError::Syntax(format!(
                            "unexpected character '{}'",
                            other
                        )))
                    }
                };
                tokens.push(token);
                i += 1;
            }
        }
    }

    Ok(tokens)
}

fn parse_number(literal: &str, is_float: bool) -> CalcResult<Number> {
    let malformed = || CalcError::Syntax(format!("malformed number '{}'", literal));
    if is_float {
        literal.parse::<f64>().map(Number::Float).map_err(|_| malformed())
    } else {
        match literal.parse::<i64>() {
            Ok(value) => Ok(Number::Int(value)),
            Err(e) if matches!(e.kind(), std::num::IntErrorKind::PosOverflow) => {
                Err(CalcError::Overflow)
            }
            Err(_) => Err(malformed()),
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> CalcResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(CalcError::Syntax(format!("expected {}", what)))
        }
    }

    // expr := term (('+' | '-') term)*
    fn expr(&mut self) -> CalcResult<Number> {
        let mut left = self.term()?;
        loop {
            if self.eat(&Token::Plus) {
                left = add(left, self.term()?)?;
            } else if self.eat(&Token::Minus) {
                left = sub(left, self.term()?)?;
            } else {
                return Ok(left);
            }
        }
    }

    // term := unary (('*' | '/' | '//' | '%') unary)*
    fn term(&mut self) -> CalcResult<Number> {
        let mut left = self.unary()?;
        loop {
            left = match self.peek() {
                Some(Token::Star) => {
                    self.pos += 1;
                    mul(left, self.unary()?)?
                }
                Some(Token::Slash) => {
                    self.pos += 1;
                    div(left, self.unary()?)?
                }
                Some(Token::DoubleSlash) => {
                    self.pos += 1;
                    floor_div(left, self.unary()?)?
                }
                Some(Token::Percent) => {
                    self.pos += 1;
                    modulo(left, self.unary()?)?
                }
                _ => return Ok(left),
            };
        }
    }

    // unary := ('+' | '-') unary | power
    fn unary(&mut self) -> CalcResult<Number> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::Syntax("expression nested too deeply".to_string()));
        }
        let value = if self.eat(&Token::Minus) {
            negate(self.unary()?)
        } else if self.eat(&Token::Plus) {
            self.unary()
        } else {
            self.power()
        };
        self.depth -= 1;
        value
    }

    // power := primary ('**' unary)?
    fn power(&mut self) -> CalcResult<Number> {
        let base = self.primary()?;
        if self.eat(&Token::Power) {
            let exponent = self.unary()?;
            return pow(base, exponent);
        }
        Ok(base)
    }

    fn primary(&mut self) -> CalcResult<Number> {
        match self.advance() {
            Some(Token::Num(n)) => Ok(n),
            Some(Token::LParen) => {
                let value = self.expr()?;
                self.expect(&Token::RParen, "')'")?;
                Ok(value)
            }
            Some(Token::Ident(name)) => {
                if self.eat(&Token::LParen) {
                    let args = self.arguments()?;
                    call_function(&name, &args)
                } else {
                    constant(&name)
                }
            }
            Some(token) => Err(CalcError::Syntax(format!("unexpected token {:?}", token))),
            None => Err(CalcError::Syntax("unexpected end of expression".to_string())),
        }
    }

    fn arguments(&mut self) -> CalcResult<Vec<Number>> {
        let mut args = Vec::new();
        if self.eat(&Token::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(&Token::RParen) {
                return Ok(args);
            }
            self.expect(&Token::Comma, "',' or ')'")?;
        }
    }
}

fn float_checked(value: f64, inputs_finite: bool) -> CalcResult<Number> {
    if value.is_infinite() && inputs_finite {
        Err(CalcError::Overflow)
    } else {
        Ok(Number::Float(value))
    }
}

fn add(a: Number, b: Number) -> CalcResult<Number> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_add(y).map(Number::Int).ok_or(CalcError::Overflow),
        _ => Ok(Number::Float(a.as_f64() + b.as_f64())),
    }
}

fn sub(a: Number, b: Number) -> CalcResult<Number> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_sub(y).map(Number::Int).ok_or(CalcError::Overflow),
        _ => Ok(Number::Float(a.as_f64() - b.as_f64())),
    }
}

fn mul(a: Number, b: Number) -> CalcResult<Number> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => x.checked_mul(y).map(Number::Int).ok_or(CalcError::Overflow),
        _ => Ok(Number::Float(a.as_f64() * b.as_f64())),
    }
}

fn div(a: Number, b: Number) -> CalcResult<Number> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    Ok(Number::Float(a.as_f64() / b.as_f64()))
}

fn floor_div(a: Number, b: Number) -> CalcResult<Number> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            let q = x.checked_div(y).ok_or(CalcError::Overflow)?;
            if x % y != 0 && ((x < 0) != (y < 0)) {
                Ok(Number::Int(q - 1))
            } else {
                Ok(Number::Int(q))
            }
        }
        _ => Ok(Number::Float((a.as_f64() / b.as_f64()).floor())),
    }
}

fn modulo(a: Number, b: Number) -> CalcResult<Number> {
    if b.is_zero() {
        return Err(CalcError::DivisionByZero);
    }
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => {
            let r = x.checked_rem(y).ok_or(CalcError::Overflow)?;
            if r != 0 && ((r < 0) != (y < 0)) {
                Ok(Number::Int(r + y))
            } else {
                Ok(Number::Int(r))
            }
        }
        _ => {
            let (x, y) = (a.as_f64(), b.as_f64());
            let r = x % y;
            if r != 0.0 && ((r < 0.0) != (y < 0.0)) {
                Ok(Number::Float(r + y))
            } else {
                Ok(Number::Float(r))
            }
        }
    }
}

fn negate(a: Number) -> CalcResult<Number> {
    match a {
        Number::Int(x) => x.checked_neg().map(Number::Int).ok_or(CalcError::Overflow),
        Number::Float(x) => Ok(Number::Float(-x)),
    }
}

fn pow(base: Number, exponent: Number) -> CalcResult<Number> {
    if let (Number::Int(b), Number::Int(e)) = (base, exponent) {
        if e >= 0 {
            let e = u32::try_from(e).map_err(|_| CalcError::Overflow)?;
            return b.checked_pow(e).map(Number::Int).ok_or(CalcError::Overflow);
        }
    }
    float_pow(base.as_f64(), exponent.as_f64())
}

fn float_pow(base: f64, exponent: f64) -> CalcResult<Number> {
    if base == 0.0 && exponent < 0.0 {
        return Err(CalcError::DivisionByZero);
    }
    if base < 0.0 && exponent.fract() != 0.0 && exponent.is_finite() {
        return Err(CalcError::Domain);
    }
    float_checked(base.powf(exponent), base.is_finite() && exponent.is_finite())
}

fn constant(name: &str) -> CalcResult<Number> {
    let value = match name {
        "pi" => std::f64::consts::PI,
        "e" => std::f64::consts::E,
        "tau" => std::f64::consts::TAU,
        "inf" => f64::INFINITY,
        "nan" => f64::NAN,
        _ if is_function(name) => {
            return Err(CalcError::Invalid(format!("function '{}' must be called", name)))
        }
        _ => return Err(CalcError::UnknownName(name.to_string())),
    };
    Ok(Number::Float(value))
}

const FUNCTIONS: &[&str] = &[
    "sqrt", "exp", "log", "log2", "log10", "sin", "cos", "tan", "asin", "acos", "atan", "atan2",
    "sinh", "cosh", "tanh", "hypot", "degrees", "radians", "fabs", "pow", "floor", "ceil",
    "trunc", "factorial", "gcd", "abs", "round", "min", "max",
];

fn is_function(name: &str) -> bool {
    FUNCTIONS.contains(&name)
}

fn expect_args(name: &str, args: &[Number], count: usize) -> CalcResult<()> {
    if args.len() == count {
        return Ok(());
    }
    let expected = match count {
        1 => "exactly one argument",
        2 => "exactly two arguments",
        _ => "a different number of arguments",
    };
    Err(CalcError::Arity(name.to_string(), expected))
}

fn to_int(value: f64) -> CalcResult<Number> {
    if !value.is_finite() {
        return Err(CalcError::Invalid(format!("cannot convert {} to integer", format_float(value))));
    }
    if value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Ok(Number::Int(value as i64))
    } else {
        Err(CalcError::Overflow)
    }
}

fn round_half_even(x: f64) -> f64 {
    let rounded = x.round();
    if (x - x.trunc()).abs() == 0.5 {
        2.0 * (x / 2.0).round()
    } else {
        rounded
    }
}

fn unary_float(name: &str, args: &[Number], f: impl Fn(f64) -> CalcResult<f64>) -> CalcResult<Number> {
    expect_args(name, args, 1)?;
    let x = args[0].as_f64();
    float_checked(f(x)?, x.is_finite())
}

fn call_function(name: &str, args: &[Number]) -> CalcResult<Number> {
    let positive = |x: f64| if x > 0.0 { Ok(x) } else { Err(CalcError::Domain) };
    match name {
        "sqrt" => unary_float(name, args, |x| {
            if x < 0.0 {
                Err(CalcError::Domain)
            } else {
                Ok(x.sqrt())
            }
        }),
        "exp" => unary_float(name, args, |x| Ok(x.exp())),
        "log" => match args {
            [x] => Ok(Number::Float(positive(x.as_f64())?.ln())),
            [x, base] => {
                let base = positive(base.as_f64())?;
                if base == 1.0 {
                    return Err(CalcError::DivisionByZero);
                }
                Ok(Number::Float(positive(x.as_f64())?.ln() / base.ln()))
            }
            _ => Err(CalcError::Arity(name.to_string(), "one or two arguments")),
        },
        "log2" => unary_float(name, args, |x| Ok(positive(x)?.log2())),
        "log10" => unary_float(name, args, |x| Ok(positive(x)?.log10())),
        "sin" => unary_float(name, args, |x| Ok(x.sin())),
        "cos" => unary_float(name, args, |x| Ok(x.cos())),
        "tan" => unary_float(name, args, |x| Ok(x.tan())),
        "asin" | "acos" => unary_float(name, args, |x| {
            if !(-1.0..=1.0).contains(&x) {
                Err(CalcError::Domain)
            } else if name == "asin" {
                Ok(x.asin())
            } else {
                Ok(x.acos())
            }
        }),
        "atan" => unary_float(name, args, |x| Ok(x.atan())),
        "sinh" => unary_float(name, args, |x| Ok(x.sinh())),
        "cosh" => unary_float(name, args, |x| Ok(x.cosh())),
        "tanh" => unary_float(name, args, |x| Ok(x.tanh())),
        "degrees" => unary_float(name, args, |x| Ok(x.to_degrees())),
        "radians" => unary_float(name, args, |x| Ok(x.to_radians())),
        "fabs" => unary_float(name, args, |x| Ok(x.abs())),
        "atan2" => {
            expect_args(name, args, 2)?;
            Ok(Number::Float(args[0].as_f64().atan2(args[1].as_f64())))
        }
        "hypot" => {
            expect_args(name, args, 2)?;
            Ok(Number::Float(args[0].as_f64().hypot(args[1].as_f64())))
        }
        "pow" => {
            expect_args(name, args, 2)?;
            float_pow(args[0].as_f64(), args[1].as_f64())
        }
        "floor" | "ceil" | "trunc" => {
            expect_args(name, args, 1)?;
            match args[0] {
                Number::Int(i) => Ok(Number::Int(i)),
                Number::Float(x) => to_int(match name {
                    "floor" => x.floor(),
                    "ceil" => x.ceil(),
                    _ => x.trunc(),
                }),
            }
        }
        "factorial" => {
            expect_args(name, args, 1)?;
            match args[0] {
                Number::Int(n) if n < 0 => Err(CalcError::Invalid(
                    "factorial() not defined for negative values".to_string(),
                )),
                Number::Int(n) => (1..=n)
                    .try_fold(1i64, |acc, k| acc.checked_mul(k))
                    .map(Number::Int)
                    .ok_or(CalcError::Overflow),
                Number::Float(_) => Err(CalcError::Invalid(
                    "factorial() only accepts integral values".to_string(),
                )),
            }
        }
        "gcd" => args.iter().try_fold(Number::Int(0), |acc, arg| match (acc, arg) {
            (Number::Int(a), Number::Int(b)) => Ok(Number::Int(gcd(a, *b))),
            _ => Err(CalcError::Invalid("gcd() only accepts integers".to_string())),
        }),
        "abs" => {
            expect_args(name, args, 1)?;
            match args[0] {
                Number::Int(i) => i.checked_abs().map(Number::Int).ok_or(CalcError::Overflow),
                Number::Float(x) => Ok(Number::Float(x.abs())),
            }
        }
        "round" => match args {
            [Number::Int(i)] => Ok(Number::Int(*i)),
            [Number::Float(x)] => to_int(round_half_even(*x)),
            [value, Number::Int(digits)] => {
                let digits = i32::try_from(*digits).map_err(|_| CalcError::Overflow)?;
                match value {
                    Number::Int(i) if digits >= 0 => Ok(Number::Int(*i)),
                    Number::Int(i) => {
                        let scale = 10f64.powi(-digits);
                        to_int(round_half_even(*i as f64 / scale) * scale)
                    }
                    Number::Float(x) => {
                        let scale = 10f64.powi(digits);
                        Ok(Number::Float(round_half_even(x * scale) / scale))
                    }
                }
            }
            [_, Number::Float(_)] => Err(CalcError::Invalid(
                "round() ndigits must be an integer".to_string(),
            )),
            _ => Err(CalcError::Arity(name.to_string(), "one or two arguments")),
        },
        "min" | "max" => {
            let Some(first) = args.first() else {
                return Err(CalcError::Arity(name.to_string(), "at least one argument"));
            };
            Ok(args.iter().skip(1).fold(*first, |best, candidate| {
                let better = if name == "min" {
                    candidate.as_f64() < best.as_f64()
                } else {
                    candidate.as_f64() > best.as_f64()
                };
                if better {
                    *candidate
                } else {
                    best
                }
            }))
        }
        _ => Err(CalcError::UnknownName(name.to_string())),
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a as i64
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> CalcResult<Number> {
    let tokens = tokenize(expression)?;
    if tokens.is_empty() {
        return Err(CalcError::Syntax("empty expression".to_string()));
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        return Err(CalcError::Syntax(format!("unexpected token {:?}", token)));
    }
    Ok(value)
}

/// Evaluate `expression` and render the result, or a readable error.
pub fn magic_calculator(expression: &str) -> String {
    match evaluate(expression) {
        Ok(value) => value.to_string(),
        Err(e) => format!("Error calculating expression: {}", e),
    }
}

pub fn calculator_tool() -> Tool {
    Tool::new(
        NAME,
        "Evaluate mathematical expressions safely.",
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "A mathematical expression (e.g., \"2 + 2\", \"sqrt(16)\", \"3 * 7 + 1\")"
                }
            },
            "required": ["expression"]
        }),
        |args: &Value| {
            let expression = args
                .get("expression")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("missing required string argument 'expression'"))?;
            Ok(magic_calculator(expression))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_examples() {
        assert_eq!(magic_calculator("2 + 2"), "4");
        assert_eq!(magic_calculator("sqrt(16)"), "4.0");
        assert_eq!(magic_calculator("3 * 7 + 1"), "22");
        assert_eq!(magic_calculator("15 * 23"), "345");
    }

    #[test]
    fn test_reserved_names_are_rejected() {
        let output = magic_calculator("__import__('os')");
        assert_eq!(
            output,
            "Error calculating expression: access to reserved name '__import__' is not allowed"
        );
        assert!(magic_calculator("__builtins__").starts_with("Error calculating expression"));
    }

    #[test]
    fn test_only_allow_listed_names_resolve() {
        assert_eq!(
            evaluate("open(1)"),
            Err(CalcError::UnknownName("open".to_string()))
        );
        assert_eq!(
            evaluate("os"),
            Err(CalcError::UnknownName("os".to_string()))
        );
        assert!(matches!(evaluate("math.sqrt(4)"), Err(CalcError::Syntax(_))));
        assert!(matches!(evaluate("'a' * 3"), Err(CalcError::Syntax(_))));
        assert!(matches!(evaluate("sqrt"), Err(CalcError::Invalid(_))));
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(magic_calculator("2 + 3 * 4"), "14");
        assert_eq!(magic_calculator("(2 + 3) * 4"), "20");
        assert_eq!(magic_calculator("2 ** 3 ** 2"), "512");
        assert_eq!(magic_calculator("-2 ** 2"), "-4");
        assert_eq!(magic_calculator("2 ** -1"), "0.5");
        assert_eq!(magic_calculator("10 - 4 - 3"), "3");
    }

    #[test]
    fn test_python_division_semantics() {
        assert_eq!(magic_calculator("7 / 2"), "3.5");
        assert_eq!(magic_calculator("4 / 2"), "2.0");
        assert_eq!(magic_calculator("7 // 2"), "3");
        assert_eq!(magic_calculator("-7 // 2"), "-4");
        assert_eq!(magic_calculator("-7 % 2"), "1");
        assert_eq!(magic_calculator("7 % -2"), "-1");
        assert_eq!(magic_calculator("7.5 // 2"), "3.0");
        assert_eq!(
            magic_calculator("1 / 0"),
            "Error calculating expression: division by zero"
        );
        assert_eq!(evaluate("5 % 0"), Err(CalcError::DivisionByZero));
    }

    #[test]
    fn test_float_rendering() {
        assert_eq!(magic_calculator("0.1 + 0.2"), "0.30000000000000004");
        assert_eq!(magic_calculator("1e16"), "1e+16");
        assert_eq!(magic_calculator("1.5e-5"), "1.5e-05");
        assert_eq!(magic_calculator("0.0001"), "0.0001");
        assert_eq!(magic_calculator("-0.0"), "-0.0");
        assert_eq!(magic_calculator("inf"), "inf");
    }

    #[test]
    fn test_functions() {
        assert_eq!(magic_calculator("abs(-5)"), "5");
        assert_eq!(magic_calculator("round(2.5)"), "2");
        assert_eq!(magic_calculator("round(3.5)"), "4");
        assert_eq!(magic_calculator("round(3.14159, 2)"), "3.14");
        assert_eq!(magic_calculator("min(3, 1.5, 2)"), "1.5");
        assert_eq!(magic_calculator("max(1, 2)"), "2");
        assert_eq!(magic_calculator("floor(2.7)"), "2");
        assert_eq!(magic_calculator("ceil(2.1)"), "3");
        assert_eq!(magic_calculator("factorial(5)"), "120");
        assert_eq!(magic_calculator("gcd(12, 18)"), "6");
        assert_eq!(magic_calculator("log(8, 2)"), "3.0");
        assert_eq!(magic_calculator("pow(2, 10)"), "1024.0");
        assert_eq!(magic_calculator("cos(0)"), "1.0");
        assert_eq!(magic_calculator("hypot(3, 4)"), "5.0");
        assert_eq!(magic_calculator("pi"), "3.141592653589793");
    }

    #[test]
    fn test_math_errors() {
        assert_eq!(evaluate("sqrt(-1)"), Err(CalcError::Domain));
        assert_eq!(evaluate("log(0)"), Err(CalcError::Domain));
        assert_eq!(evaluate("9223372036854775807 + 1"), Err(CalcError::Overflow));
        assert_eq!(evaluate("2 ** 64"), Err(CalcError::Overflow));
        assert_eq!(
            evaluate("sqrt(1, 2)"),
            Err(CalcError::Arity("sqrt".to_string(), "exactly one argument"))
        );
        assert!(matches!(evaluate("factorial(-1)"), Err(CalcError::Invalid(_))));
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(magic_calculator("-3"), "-3");
        assert_eq!(magic_calculator("--3"), "3");
        assert_eq!(magic_calculator("-2 ** 2"), "-4");
        assert_eq!(magic_calculator("-(1.5)"), "-1.5");
        assert!(matches!(evaluate("-foo"), Err(CalcError::UnknownName(_))));
    }

    #[test]
    fn test_integer_range_is_64_bit() {
        assert_eq!(magic_calculator("factorial(20)"), "2432902008176640000");
        assert_eq!(evaluate("factorial(21)"), Err(CalcError::Overflow));
        assert_eq!(magic_calculator("2 ** 62"), "4611686018427387904");
        assert_eq!(evaluate("floor(2.0 ** 63)"), Err(CalcError::Overflow));
        assert_eq!(magic_calculator("floor(-(2.0 ** 63))"), "-9223372036854775808");
        assert_eq!(
            magic_calculator("2 ** 64"),
            "Error calculating expression: integer overflow"
        );
    }

    #[test]
    fn test_syntax_errors() {
        assert!(matches!(evaluate(""), Err(CalcError::Syntax(_))));
        assert!(matches!(evaluate("2 +"), Err(CalcError::Syntax(_))));
        assert!(matches!(evaluate("(1 + 2"), Err(CalcError::Syntax(_))));
        assert!(matches!(evaluate("1 2"), Err(CalcError::Syntax(_))));
        assert!(matches!(evaluate("1..2"), Err(CalcError::Syntax(_))));

        let nested = format!("{}1{}", "(".repeat(500), ")".repeat(500));
        assert!(matches!(evaluate(&nested), Err(CalcError::Syntax(_))));
    }

    #[test]
    fn test_tool_requires_expression_argument() {
        let tool = calculator_tool();
        assert_eq!(tool.name, NAME);
        assert_eq!(tool.call(&json!({"expression": "1 + 1"})).unwrap(), "2");
        assert!(tool.call(&json!({"expr": "1 + 1"})).is_err());
    }
}
