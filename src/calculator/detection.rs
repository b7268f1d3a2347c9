//! Input-buffer checks used while the user composes an expression.
//!
//! These look only at the tail of the buffer and decide whether a keypad
//! entry may be appended.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Buffer ends with a binary operator.
    static ref TRAILING_OPERATOR: Regex = Regex::new(r"[+\-*/^]$").unwrap();

    /// Buffer ends with something a postfix entry (`!`, `/100`) can apply to.
    static ref TRAILING_OPERAND: Regex = Regex::new(r"(?:[\d)!]|Infinity|NaN)$").unwrap();
}

/// Check whether `c` is one of the binary operator characters.
pub fn is_binary_operator(c: char) -> bool {
    matches!(c, '+' | '-' | '*' | '/' | '^')
}

/// Check if appending `entry` to `buffer` would put two binary operators
/// side by side, as in `5+` followed by `+`.
pub fn is_operator_collision(buffer: &str, entry: &str) -> bool {
    TRAILING_OPERATOR.is_match(buffer) && entry.chars().next().is_some_and(is_binary_operator)
}

/// Check if the buffer ends in a digit, a closing parenthesis, a factorial
/// or a recalled non-finite value.
pub fn ends_with_operand(buffer: &str) -> bool {
    TRAILING_OPERAND.is_match(buffer)
}
