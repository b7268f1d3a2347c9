//! Error types for the expression pipeline.
//!
//! Each stage has its own error enum; [`CalcError`] wraps them so the full
//! tokenize → parse → evaluate pipeline composes with `?`.

use thiserror::Error;

/// Errors raised while scanning expression text into tokens.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unknown character at position {0}")]
    UnknownChar(usize),
    #[error("unknown identifier '{name}' at position {pos}")]
    UnknownIdentifier { name: String, pos: usize },
    #[error("malformed number at position {0}")]
    MalformedNumber(usize),
    #[error("factorial without an operand at position {0}")]
    DanglingFactorial(usize),
}

/// Errors raised while building the expression tree.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("function '{0}' must be followed by '('")]
    ExpectedParen(String),
    #[error("expression is empty or incomplete")]
    EmptyOrIncomplete,
    #[error("unexpected {0}")]
    UnexpectedToken(String),
    #[error("expression is nested too deeply")]
    TooDeep,
}

/// Errors raised while computing the value of an expression tree.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("{function} is undefined for {operand}")]
    DomainError { function: String, operand: f64 },
}

/// Any failure of the expression pipeline.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum CalcError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Result alias used throughout the engine.
pub type CalcResult<T> = Result<T, CalcError>;
