//! Expression evaluation over the parsed tree.
//!
//! Provides the tree walker plus the full text → value pipeline used by the
//! session and the command line.

use super::error::{CalcResult, EvalError};
use super::format::{FormatSettings, format_number};
use super::parser::{Expr, parse};
use super::tokenizer::{Function, Operator, tokenize};
use tracing::debug;

/// Operands above this evaluate to positive infinity under factorial.
pub const FACTORIAL_LIMIT: f64 = 100.0;

/// Result of evaluating an expression successfully.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    /// The expression text that was evaluated.
    pub expression: String,
    /// The numeric value.
    pub value: f64,
    /// The value formatted for display.
    pub formatted: String,
}

/// Compute the value of an expression tree.
pub fn evaluate(expr: &Expr) -> Result<f64, EvalError> {
    match expr {
        Expr::Literal(n) => Ok(*n),
        Expr::Negate(operand) => Ok(-evaluate(operand)?),
        Expr::Factorial(operand) => factorial(evaluate(operand)?),
        Expr::UnaryFunction { function, operand } => apply_function(*function, evaluate(operand)?),
        Expr::BinaryOp { op, left, right } => {
            let left = evaluate(left)?;
            let right = evaluate(right)?;
            match op {
                Operator::Add => Ok(left + right),
                Operator::Subtract => Ok(left - right),
                Operator::Multiply => Ok(left * right),
                Operator::Divide if right == 0.0 => Err(EvalError::DivisionByZero),
                Operator::Divide => Ok(left / right),
                Operator::Power => Ok(left.powf(right)),
            }
        }
    }
}

fn apply_function(function: Function, operand: f64) -> Result<f64, EvalError> {
    let domain_error = || EvalError::DomainError {
        function: function.name().to_string(),
        operand,
    };

    match function {
        Function::Sqrt if operand < 0.0 => Err(domain_error()),
        Function::Sqrt => Ok(operand.sqrt()),
        // Arguments are taken as radians, unconverted.
        Function::Sin => Ok(operand.sin()),
        Function::Cos => Ok(operand.cos()),
        Function::Tan => Ok(operand.tan()),
        Function::Log | Function::Log10 if operand <= 0.0 => Err(domain_error()),
        Function::Log => Ok(operand.ln()),
        Function::Log10 => Ok(operand.log10()),
    }
}

/// Factorial of a non-negative integer, saturating to infinity above 100.
pub fn factorial(n: f64) -> Result<f64, EvalError> {
    if n.is_nan() || n < 0.0 || (n.is_finite() && n.fract() != 0.0) {
        return Err(EvalError::DomainError {
            function: "factorial".to_string(),
            operand: n,
        });
    }
    if n > FACTORIAL_LIMIT {
        return Ok(f64::INFINITY);
    }

    // n is an integer in 0..=100 here.
    let mut result = 1.0;
    for i in 2..=(n as u32) {
        result *= f64::from(i);
    }
    Ok(result)
}

/// Run the full pipeline on `text` and return the bare value.
pub fn evaluate_value(text: &str) -> CalcResult<f64> {
    let tokens = tokenize(text)?;
    debug!(?tokens, "tokenized expression");
    let tree = parse(&tokens)?;
    debug!(?tree, "parsed expression");
    Ok(evaluate(&tree)?)
}

/// Evaluate `text` and format the value with `settings`.
pub fn evaluate_expression(text: &str, settings: FormatSettings) -> CalcResult<Evaluation> {
    let expression = text.trim().to_string();
    let value = evaluate_value(&expression)?;

    Ok(Evaluation {
        formatted: format_number(value, settings.precision(), settings.thousands_separator()),
        expression,
        value,
    })
}
