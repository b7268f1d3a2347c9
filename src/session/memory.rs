//! The calculator's memory register.

use std::fmt;
use std::str::FromStr;

/// Keypad memory operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemoryOp {
    /// MC: reset the register to zero.
    Clear,
    /// MR: append the register's value to the input buffer.
    Recall,
    /// M+: add the current value to the register.
    Add,
    /// M-: subtract the current value from the register.
    Subtract,
}

impl FromStr for MemoryOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mc" => Ok(Self::Clear),
            "mr" => Ok(Self::Recall),
            "m+" => Ok(Self::Add),
            "m-" => Ok(Self::Subtract),
            other => Err(format!("unknown memory operation '{}'", other)),
        }
    }
}

impl fmt::Display for MemoryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Clear => "MC",
            Self::Recall => "MR",
            Self::Add => "M+",
            Self::Subtract => "M-",
        };
        f.write_str(label)
    }
}

/// A single stored value that outlives individual evaluations.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Memory {
    value: f64,
}

impl Memory {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn clear(&mut self) {
        self.value = 0.0;
    }

    pub fn add(&mut self, amount: f64) {
        self.value += amount;
    }

    pub fn subtract(&mut self, amount: f64) {
        self.value -= amount;
    }

    /// The register's value as text suitable for the input buffer.
    ///
    /// Non-finite values use the same words the tokenizer reads back.
    pub fn recall_text(&self) -> String {
        if self.value.is_nan() {
            "NaN".to_string()
        } else if self.value.is_infinite() {
            let sign = if self.value < 0.0 { "-" } else { "" };
            format!("{}Infinity", sign)
        } else {
            self.value.to_string()
        }
    }
}
