//! Calculator session: the input buffer and everything the keypad mutates.
//!
//! A [`Session`] owns the input buffer, the last result, the memory register,
//! the undo stack and the calculation history. Independent sessions share no
//! state. Every action that changes the buffer first pushes the previous
//! buffer onto the undo stack.

mod history;
mod memory;
mod undo;

pub use history::{History, HistoryEntry};
pub use memory::{Memory, MemoryOp};
pub use undo::{UNDO_CAPACITY, UndoStack};

use crate::calculator::{
    CalcError, CalcResult, Constant, Evaluation, FormatSettings, Function, ParseError,
    ends_with_operand, evaluate_expression, evaluate_value, is_operator_collision,
};
use tracing::{debug, warn};

/// What the display is currently showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing entered.
    Idle,
    /// The user is editing the buffer.
    Composing,
    /// The last calculation succeeded; the buffer still holds its expression.
    ResultShown,
    /// The last calculation failed; the buffer is kept for correction.
    Error,
}

/// A single calculator session.
#[derive(Clone, Debug, Default)]
pub struct Session {
    buffer: String,
    result: Option<Evaluation>,
    error: Option<CalcError>,
    memory: Memory,
    undo: UndoStack,
    history: History,
    settings: FormatSettings,
}

impl Session {
    pub fn new(settings: FormatSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// Start a session with previously saved history.
    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn state(&self) -> SessionState {
        if self.error.is_some() {
            SessionState::Error
        } else if self.result.is_some() {
            SessionState::ResultShown
        } else if self.buffer.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Composing
        }
    }

    /// The cached result of the last successful calculation.
    pub fn result(&self) -> Option<&Evaluation> {
        self.result.as_ref()
    }

    /// The error of the last failed calculation.
    pub fn error(&self) -> Option<&CalcError> {
        self.error.as_ref()
    }

    pub fn memory(&self) -> f64 {
        self.memory.value()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn settings(&self) -> FormatSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: FormatSettings) {
        self.settings = settings;
    }

    /// Snapshot the buffer, then apply `f` to it. Any shown result or error
    /// is dropped since the buffer no longer matches it.
    fn edit(&mut self, f: impl FnOnce(&mut String)) {
        self.undo.push(self.buffer.clone());
        f(&mut self.buffer);
        self.result = None;
        self.error = None;
    }

    /// Append keypad text to the buffer.
    ///
    /// Returns `false` without touching anything when the entry would follow
    /// a binary operator with another one.
    pub fn submit(&mut self, entry: &str) -> bool {
        if entry.is_empty() || is_operator_collision(&self.buffer, entry) {
            debug!(buffer = %self.buffer, entry, "rejected entry");
            return false;
        }
        self.edit(|buffer| buffer.push_str(entry));
        true
    }

    /// Replace the whole buffer with `text` as a single undoable edit.
    pub fn replace(&mut self, text: &str) -> bool {
        if text.is_empty() || text == self.buffer {
            return false;
        }
        self.edit(|buffer| *buffer = text.to_string());
        true
    }

    /// Load the history entry at `index` (oldest first) back into the
    /// buffer, showing its recorded result.
    pub fn reuse(&mut self, index: usize) -> bool {
        let Some(entry) = self.history.entries().get(index).cloned() else {
            return false;
        };
        self.edit(|buffer| *buffer = entry.input.clone());
        // Recorded results carry grouping commas.
        if let Ok(value) = entry.result.replace(',', "").parse::<f64>() {
            self.result = Some(Evaluation {
                expression: entry.input,
                value,
                formatted: entry.result,
            });
        }
        true
    }

    pub fn submit_char(&mut self, ch: char) -> bool {
        let mut encoded = [0u8; 4];
        self.submit(ch.encode_utf8(&mut encoded))
    }

    /// Append `name(` for a function key.
    pub fn enter_function(&mut self, function: Function) -> bool {
        self.submit(&format!("{}(", function.name()))
    }

    /// Append the decimal literal of a constant.
    pub fn enter_constant(&mut self, constant: Constant) -> bool {
        self.submit(constant.literal())
    }

    pub fn power(&mut self) -> bool {
        self.submit("^")
    }

    pub fn power_of_ten(&mut self) -> bool {
        self.submit("10^")
    }

    /// Divide the trailing operand by 100.
    pub fn percent(&mut self) -> bool {
        ends_with_operand(&self.buffer) && self.submit("/100")
    }

    /// Apply factorial to the trailing operand.
    pub fn factorial(&mut self) -> bool {
        ends_with_operand(&self.buffer) && self.submit("!")
    }

    /// Evaluate the buffer, record it in the history and cache the result.
    ///
    /// Failures are kept as the session's error state and returned; the
    /// buffer is left untouched either way.
    pub fn calculate(&mut self) -> CalcResult<Evaluation> {
        if self.buffer.trim().is_empty() {
            return Err(ParseError::EmptyOrIncomplete.into());
        }

        match evaluate_expression(&self.buffer, self.settings) {
            Ok(evaluation) => {
                debug!(expression = %evaluation.expression, value = evaluation.value, "calculated");
                self.history.push(HistoryEntry::new(
                    evaluation.expression.clone(),
                    evaluation.formatted.clone(),
                ));
                self.result = Some(evaluation.clone());
                self.error = None;
                Ok(evaluation)
            }
            Err(err) => {
                warn!(buffer = %self.buffer, error = %err, "calculation failed");
                self.result = None;
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Reset the buffer and any shown result. Memory and history are kept.
    pub fn clear(&mut self) {
        if self.buffer.is_empty() {
            self.result = None;
            self.error = None;
            return;
        }
        self.edit(String::clear);
    }

    /// Drop the last character of the buffer.
    pub fn backspace(&mut self) -> bool {
        if self.buffer.is_empty() {
            return false;
        }
        self.edit(|buffer| {
            buffer.pop();
        });
        true
    }

    /// Restore the buffer from before the last edit.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(snapshot) => {
                self.buffer = snapshot;
                self.result = None;
                self.error = None;
                true
            }
            None => false,
        }
    }

    /// Apply a memory operation and return the register's new value.
    ///
    /// Add and subtract use the shown result if there is one, otherwise the
    /// buffer is evaluated without touching the history or the display. If
    /// that evaluation fails the register is left unchanged.
    pub fn memory_op(&mut self, op: MemoryOp) -> CalcResult<f64> {
        match op {
            MemoryOp::Clear => self.memory.clear(),
            MemoryOp::Recall => {
                let text = self.memory.recall_text();
                self.edit(|buffer| buffer.push_str(&text));
            }
            MemoryOp::Add | MemoryOp::Subtract => {
                let Some(value) = self.current_value().inspect_err(|err| {
                    warn!(%op, error = %err, "memory operation skipped");
                })?
                else {
                    return Ok(self.memory.value());
                };
                if op == MemoryOp::Add {
                    self.memory.add(value);
                } else {
                    self.memory.subtract(value);
                }
            }
        }
        debug!(%op, memory = self.memory.value(), "memory updated");
        Ok(self.memory.value())
    }

    /// The shown result, or the buffer evaluated in value-only mode.
    fn current_value(&self) -> CalcResult<Option<f64>> {
        if let Some(result) = &self.result {
            return Ok(Some(result.value));
        }
        if self.buffer.trim().is_empty() {
            return Ok(None);
        }
        evaluate_value(&self.buffer).map(Some)
    }
}
