//! Calculator engine for evaluating arithmetic expressions.
//!
//! This module provides functionality to:
//! - Tokenize and parse expression text without executing it as code
//! - Evaluate the expression tree to a double-precision value
//! - Format results for display
//! - Guard keypad entry against malformed input
//! - Copy results to the clipboard

mod clipboard;
mod detection;
mod error;
mod evaluation;
mod format;
mod parser;
mod tokenizer;

pub use clipboard::copy_to_clipboard;
pub use detection::{ends_with_operand, is_binary_operator, is_operator_collision};
pub use error::{CalcError, CalcResult, EvalError, LexError, ParseError};
pub use evaluation::{
    Evaluation, FACTORIAL_LIMIT, evaluate, evaluate_expression, evaluate_value, factorial,
};
pub use format::{FormatSettings, MAX_PRECISION, format_number};
pub use parser::{Expr, MAX_NESTING, MAX_TREE_DEPTH, parse};
pub use tokenizer::{Constant, Function, Operator, Token, tokenize};
