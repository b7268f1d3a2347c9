//! Scanning of expression text into tokens.

use super::error::LexError;
use std::fmt;

/// Binary operators recognized by the tokenizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl Operator {
    /// Map an operator character to its operator.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Subtract),
            '*' => Some(Self::Multiply),
            '/' => Some(Self::Divide),
            '^' => Some(Self::Power),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
            Self::Power => '^',
        }
    }
}

/// Unary functions that take a single parenthesized argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Sin,
    Cos,
    Tan,
    /// Natural logarithm.
    Log,
    Log10,
}

impl Function {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sqrt" => Some(Self::Sqrt),
            "sin" => Some(Self::Sin),
            "cos" => Some(Self::Cos),
            "tan" => Some(Self::Tan),
            "log" => Some(Self::Log),
            "log10" => Some(Self::Log10),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Log => "log",
            Self::Log10 => "log10",
        }
    }
}

/// Named constants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Self::Pi),
            "e" => Some(Self::E),
            _ => None,
        }
    }

    pub fn value(self) -> f64 {
        match self {
            Self::Pi => std::f64::consts::PI,
            Self::E => std::f64::consts::E,
        }
    }

    /// Decimal literal the keypad inserts into the input buffer.
    pub fn literal(self) -> &'static str {
        match self {
            Self::Pi => "3.14159265359",
            Self::E => "2.71828182846",
        }
    }
}

/// A lexical token of the expression grammar.
#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Number(f64),
    Operator(Operator),
    Function(Function),
    Constant(Constant),
    LeftParen,
    RightParen,
    Factorial,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "number {}", n),
            Self::Operator(op) => write!(f, "operator '{}'", op.symbol()),
            Self::Function(func) => write!(f, "function '{}'", func.name()),
            Self::Constant(Constant::Pi) => write!(f, "constant 'pi'"),
            Self::Constant(Constant::E) => write!(f, "constant 'e'"),
            Self::LeftParen => write!(f, "'('"),
            Self::RightParen => write!(f, "')'"),
            Self::Factorial => write!(f, "'!'"),
        }
    }
}

/// Values that display as words rather than digits.
fn non_finite_literal(name: &str) -> Option<f64> {
    match name {
        "Infinity" => Some(f64::INFINITY),
        "NaN" => Some(f64::NAN),
        _ => None,
    }
}

/// Convert expression text into a sequence of tokens.
///
/// Whitespace is skipped. Positions in errors are byte offsets into `text`.
pub fn tokenize(text: &str) -> Result<Vec<Token>, LexError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(pos, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if c.is_ascii_digit() || c == '.' {
            let mut end = pos;
            let mut seen_dot = false;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_digit() || (d == '.' && !seen_dot) {
                    seen_dot |= d == '.';
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let value: f64 = text[pos..end]
                .parse()
                .map_err(|_| LexError::MalformedNumber(pos))?;
            tokens.push(Token::Number(value));
            continue;
        }

        if c.is_ascii_alphabetic() {
            let mut end = pos;
            while let Some(&(i, d)) = chars.peek() {
                if d.is_ascii_alphanumeric() {
                    end = i + d.len_utf8();
                    chars.next();
                } else {
                    break;
                }
            }
            let name = &text[pos..end];
            let token = if let Some(func) = Function::from_name(name) {
                Token::Function(func)
            } else if let Some(constant) = Constant::from_name(name) {
                Token::Constant(constant)
            } else if let Some(value) = non_finite_literal(name) {
                Token::Number(value)
            } else {
                return Err(LexError::UnknownIdentifier {
                    name: name.to_string(),
                    pos,
                });
            };
            tokens.push(token);
            continue;
        }

        let token = match c {
            '(' => Token::LeftParen,
            ')' => Token::RightParen,
            '!' => match tokens.last() {
                Some(
                    Token::Number(_) | Token::RightParen | Token::Constant(_) | Token::Factorial,
                ) => Token::Factorial,
                _ => return Err(LexError::DanglingFactorial(pos)),
            },
            _ => match Operator::from_char(c) {
                Some(op) => Token::Operator(op),
                None => return Err(LexError::UnknownChar(pos)),
            },
        };
        tokens.push(token);
        chars.next();
    }

    Ok(tokens)
}
