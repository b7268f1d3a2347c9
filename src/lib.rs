//! Arithmetic expression engine and calculator session.
//!
//! Expression text is tokenized, parsed into a tree and evaluated; it is
//! never executed as code. A [`session::Session`] layers the keypad
//! behaviour on top: input buffer, undo, memory register and history.

pub mod calculator;
pub mod cli;
pub mod config;
pub mod session;

pub use calculator::{CalcError, Evaluation, FormatSettings, evaluate_expression, format_number};
pub use session::{MemoryOp, Session, SessionState};
