//! Restrictive arithmetic evaluator for `patch` values.
//!
//! # Responsibility
//! - Turn user text into a number without evaluating arbitrary code.
//! - Report why text was rejected (syntax, shape, arithmetic failure).
//!
//! # Invariants
//! - Accepted shapes: one numeric literal, or `literal op literal` with
//!   `op` in `+ - * / % **`. Parentheses around either are transparent.
//! - Everything else that parses (names, calls, unary or nested operators,
//!   comparisons, `//`) is rejected as an invalid expression.
//! - Evaluation never panics; undefined arithmetic is an error value.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:0[xX](?:_?[0-9a-fA-F])+|0[oO](?:_?[0-7])+|0[bB](?:_?[01])+|(?:[0-9](?:_?[0-9])*)?\.[0-9](?:_?[0-9])*(?:[eE][+-]?[0-9](?:_?[0-9])*)?|[0-9](?:_?[0-9])*\.?(?:[eE][+-]?[0-9](?:_?[0-9])*)?)",
    )
    .expect("valid number regex")
});
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("valid name regex"));

const ANSWER_QUOTE: &str =
    "\"The answer to the Ultimate Question of Life, the Universe, and Everything\"";

/// Numeric literal or result, keeping Python's int/float distinction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    fn is_zero(self) -> bool {
        self.as_f64() == 0.0
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => f.write_str(&float_repr(*value)),
        }
    }
}

/// Which accepted shape produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationKind {
    Constant,
    /// A constant equal to 42.
    Answer,
    Arithmetic,
}

/// Accepted expression result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub value: Number,
    pub kind: EvaluationKind,
}

impl Evaluation {
    /// Informational line shown to the user.
    pub fn message(&self) -> String {
        match self.kind {
            EvaluationKind::Constant => format!("expression ({}) is a constant", self.value),
            EvaluationKind::Answer => ANSWER_QUOTE.to_string(),
            EvaluationKind::Arithmetic => {
                format!("expression (={}) is an arithmetic operation", self.value)
            }
        }
    }
}

/// Reasons an expression is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    InvalidSyntax,
    InvalidExpression,
    Arithmetic(String),
}

impl Display for ExprError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSyntax => f.write_str("invalid syntax"),
            Self::InvalidExpression => f.write_str("invalid expression"),
            Self::Arithmetic(message) => f.write_str(message),
        }
    }
}

impl Error for ExprError {}

/// Evaluates `text` under the restrictive allow-list.
pub fn evaluate(text: &str) -> Result<Evaluation, ExprError> {
    let tokens = tokenize(text)?;
    let mut parser = Parser { tokens, pos: 0 };
    let node = parser.parse_expression()?;
    if parser.pos != parser.tokens.len() {
        return Err(ExprError::InvalidSyntax);
    }

    match node {
        Node::Literal(value) => {
            let kind = if value.as_f64() == 42.0 {
                EvaluationKind::Answer
            } else {
                EvaluationKind::Constant
            };
            Ok(Evaluation { value, kind })
        }
        Node::Binary { op, left, right } => match (*left, *right) {
            (Node::Literal(lhs), Node::Literal(rhs)) if op.is_allowed() => Ok(Evaluation {
                value: apply(op, lhs, rhs)?,
                kind: EvaluationKind::Arithmetic,
            }),
            _ => Err(ExprError::InvalidExpression),
        },
        Node::Other => Err(ExprError::InvalidExpression),
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(Number),
    /// Strings and imaginary literals: valid syntax, never accepted.
    OtherLiteral,
    Name(String),
    Punct(&'static str),
}

const PUNCTUATION: &[&str] = &[
    "**", "//", "<<", ">>", "<=", ">=", "==", "!=", "+", "-", "*", "/", "%", "@", "&", "|", "^",
    "~", "<", ">", "(", ")", ",", ".",
];

fn tokenize(text: &str) -> Result<Vec<Token>, ExprError> {
    let mut tokens = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        if let Some(found) = NUMBER_RE.find(rest) {
            let literal = found.as_str();
            rest = &rest[found.end()..];
            if let Some(suffix) = rest.strip_prefix(['j', 'J']) {
                tokens.push(Token::OtherLiteral);
                rest = suffix;
            } else {
                tokens.push(Token::Number(parse_number(literal)?));
            }
            if rest.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
                return Err(ExprError::InvalidSyntax);
            }
        } else if let Some(found) = NAME_RE.find(rest) {
            tokens.push(Token::Name(found.as_str().to_string()));
            rest = &rest[found.end()..];
        } else if rest.starts_with(['\'', '"']) {
            rest = skip_string(rest)?;
            tokens.push(Token::OtherLiteral);
        } else if let Some(punct) = PUNCTUATION.iter().copied().find(|p| rest.starts_with(p)) {
            tokens.push(Token::Punct(punct));
            rest = &rest[punct.len()..];
        } else {
            return Err(ExprError::InvalidSyntax);
        }
        rest = rest.trim_start();
    }

    Ok(tokens)
}

fn skip_string(text: &str) -> Result<&str, ExprError> {
    let mut chars = text.char_indices();
    let Some((_, quote)) = chars.next() else {
        return Err(ExprError::InvalidSyntax);
    };
    let mut escaped = false;
    for (index, c) in chars {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return Ok(&text[index + c.len_utf8()..]);
        }
    }
    Err(ExprError::InvalidSyntax)
}

fn parse_number(literal: &str) -> Result<Number, ExprError> {
    let digits = literal.replace('_', "");
    let radix = match digits.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };

    if let Some(radix) = radix {
        return Ok(i64::from_str_radix(&digits[2..], radix)
            .map(Number::Int)
            .unwrap_or_else(|_| Number::Float(radix_to_f64(&digits[2..], radix))));
    }

    if digits.contains(['.', 'e', 'E']) {
        return digits
            .parse::<f64>()
            .map(Number::Float)
            .map_err(|_| ExprError::InvalidSyntax);
    }

    // Decimal integers other than zero may not carry leading zeros.
    if digits.starts_with('0') && !digits.trim_start_matches('0').is_empty() {
        return Err(ExprError::InvalidSyntax);
    }
    if let Ok(value) = digits.parse::<i64>() {
        return Ok(Number::Int(value));
    }
    digits
        .parse::<f64>()
        .map(Number::Float)
        .map_err(|_| ExprError::InvalidSyntax)
}

fn radix_to_f64(digits: &str, radix: u32) -> f64 {
    digits.chars().fold(0.0, |acc, c| {
        acc * f64::from(radix) + f64::from(c.to_digit(radix).unwrap_or(0))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    FloorDiv,
    MatMul,
    Shl,
    Shr,
    BitAnd,
    BitOr,
    BitXor,
}

impl BinaryOp {
    fn is_allowed(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Mul | Self::Div | Self::Mod | Self::Pow
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Literal(Number),
    Binary {
        op: BinaryOp,
        left: Box<Node>,
        right: Box<Node>,
    },
    /// Any syntactically valid shape outside the allow-list.
    Other,
}

/// Binary precedence levels from loosest to tightest, below unary operators.
const BINARY_LEVELS: &[&[(&str, BinaryOp)]] = &[
    &[("|", BinaryOp::BitOr)],
    &[("^", BinaryOp::BitXor)],
    &[("&", BinaryOp::BitAnd)],
    &[("<<", BinaryOp::Shl), (">>", BinaryOp::Shr)],
    &[("+", BinaryOp::Add), ("-", BinaryOp::Sub)],
    &[
        ("*", BinaryOp::Mul),
        ("/", BinaryOp::Div),
        ("//", BinaryOp::FloorDiv),
        ("%", BinaryOp::Mod),
        ("@", BinaryOp::MatMul),
    ],
];

const COMPARISONS: &[&str] = &["<", ">", "<=", ">=", "==", "!="];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if matches!(self.peek(), Some(Token::Punct(p)) if *p == punct) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Name(name)) if name == keyword) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect_punct(&mut self, punct: &str) -> Result<(), ExprError> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(ExprError::InvalidSyntax)
        }
    }

    fn parse_expression(&mut self) -> Result<Node, ExprError> {
        let mut node = self.parse_and()?;
        while self.eat_keyword("or") {
            self.parse_and()?;
            node = Node::Other;
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> Result<Node, ExprError> {
        let mut node = self.parse_not()?;
        while self.eat_keyword("and") {
            self.parse_not()?;
            node = Node::Other;
        }
        Ok(node)
    }

    fn parse_not(&mut self) -> Result<Node, ExprError> {
        if self.eat_keyword("not") {
            self.parse_not()?;
            return Ok(Node::Other);
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Node, ExprError> {
        let mut node = self.parse_binary(0)?;
        while COMPARISONS.iter().any(|op| self.eat_punct(op)) {
            self.parse_binary(0)?;
            node = Node::Other;
        }
        Ok(node)
    }

    fn parse_binary(&mut self, level: usize) -> Result<Node, ExprError> {
        let Some(ops) = BINARY_LEVELS.get(level) else {
            return self.parse_unary();
        };

        let mut node = self.parse_binary(level + 1)?;
        loop {
            let Some(op) = ops
                .iter()
                .find(|(punct, _)| self.eat_punct(punct))
                .map(|(_, op)| *op)
            else {
                return Ok(node);
            };
            let right = self.parse_binary(level + 1)?;
            node = Node::Binary {
                op,
                left: Box::new(node),
                right: Box::new(right),
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Node, ExprError> {
        if ["-", "+", "~"].iter().any(|op| self.eat_punct(op)) {
            self.parse_unary()?;
            return Ok(Node::Other);
        }
        self.parse_power()
    }

    fn parse_power(&mut self) -> Result<Node, ExprError> {
        let base = self.parse_primary()?;
        if self.eat_punct("**") {
            let exponent = self.parse_unary()?;
            return Ok(Node::Binary {
                op: BinaryOp::Pow,
                left: Box::new(base),
                right: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Node, ExprError> {
        let mut node = self.parse_atom()?;
        loop {
            if self.eat_punct("(") {
                if !self.eat_punct(")") {
                    loop {
                        self.parse_expression()?;
                        if !self.eat_punct(",") {
                            break;
                        }
                        if matches!(self.peek(), Some(Token::Punct(")"))) {
                            break;
                        }
                    }
                    self.expect_punct(")")?;
                }
                node = Node::Other;
            } else if self.eat_punct(".") {
                match self.peek() {
                    Some(Token::Name(_)) => self.pos += 1,
                    _ => return Err(ExprError::InvalidSyntax),
                }
                node = Node::Other;
            } else {
                return Ok(node);
            }
        }
    }

    fn parse_atom(&mut self) -> Result<Node, ExprError> {
        let token = self.peek().cloned().ok_or(ExprError::InvalidSyntax)?;
        self.pos += 1;
        match token {
            Token::Number(value) => Ok(Node::Literal(value)),
            Token::OtherLiteral => Ok(Node::Other),
            Token::Name(name) if is_reserved(&name) => Err(ExprError::InvalidSyntax),
            Token::Name(_) => Ok(Node::Other),
            Token::Punct("(") => {
                if self.eat_punct(")") {
                    return Ok(Node::Other);
                }
                let inner = self.parse_expression()?;
                if self.eat_punct(",") {
                    while !matches!(self.peek(), Some(Token::Punct(")"))) {
                        self.parse_expression()?;
                        if !self.eat_punct(",") {
                            break;
                        }
                    }
                    self.expect_punct(")")?;
                    return Ok(Node::Other);
                }
                self.expect_punct(")")?;
                Ok(inner)
            }
            Token::Punct(_) => Err(ExprError::InvalidSyntax),
        }
    }
}

fn is_reserved(name: &str) -> bool {
    matches!(name, "and" | "or" | "not")
}

fn apply(op: BinaryOp, lhs: Number, rhs: Number) -> Result<Number, ExprError> {
    use Number::{Float, Int};

    let int_pair = match (lhs, rhs) {
        (Int(a), Int(b)) => Some((a, b)),
        _ => None,
    };
    let (a, b) = (lhs.as_f64(), rhs.as_f64());

    match op {
        BinaryOp::Add => Ok(int_pair
            .and_then(|(x, y)| x.checked_add(y))
            .map_or(Float(a + b), Int)),
        BinaryOp::Sub => Ok(int_pair
            .and_then(|(x, y)| x.checked_sub(y))
            .map_or(Float(a - b), Int)),
        BinaryOp::Mul => Ok(int_pair
            .and_then(|(x, y)| x.checked_mul(y))
            .map_or(Float(a * b), Int)),
        BinaryOp::Div => {
            if rhs.is_zero() {
                return Err(ExprError::Arithmetic(
                    if int_pair.is_some() {
                        "division by zero"
                    } else {
                        "float division by zero"
                    }
                    .to_string(),
                ));
            }
            Ok(Float(a / b))
        }
        BinaryOp::Mod => {
            if rhs.is_zero() {
                return Err(ExprError::Arithmetic(
                    if int_pair.is_some() {
                        "integer modulo by zero"
                    } else {
                        "float modulo"
                    }
                    .to_string(),
                ));
            }
            if let Some((x, y)) = int_pair {
                let rem = x.checked_rem(y).unwrap_or(0);
                let floored = if rem != 0 && (rem < 0) != (y < 0) {
                    rem + y
                } else {
                    rem
                };
                return Ok(Int(floored));
            }
            let rem = a % b;
            let floored = if rem != 0.0 && (rem < 0.0) != (b < 0.0) {
                rem + b
            } else if rem == 0.0 {
                0.0_f64.copysign(b)
            } else {
                rem
            };
            Ok(Float(floored))
        }
        BinaryOp::Pow => {
            if let Some((x, y)) = int_pair {
                if let Some(value) = u32::try_from(y).ok().and_then(|exp| x.checked_pow(exp)) {
                    return Ok(Int(value));
                }
            }
            let value = a.powf(b);
            if value.is_infinite() && a.is_finite() && b.is_finite() {
                return Err(ExprError::Arithmetic(
                    "(34, 'Numerical result out of range')".to_string(),
                ));
            }
            Ok(Float(value))
        }
        BinaryOp::FloorDiv
        | BinaryOp::MatMul
        | BinaryOp::Shl
        | BinaryOp::Shr
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor => Err(ExprError::InvalidExpression),
    }
}

/// Shortest round-trip float text, switching to exponent form outside
/// `1e-4 <= |x| < 1e16` and always carrying a fractional part otherwise.
fn float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if value == 0.0 || (-4..16).contains(&exponent) {
        let plain = format!("{value}");
        if plain.contains('.') {
            plain
        } else {
            format!("{plain}.0")
        }
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
    }
}
