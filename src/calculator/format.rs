//! Rendering of numeric results as display text.

use serde::{Deserialize, Serialize};

/// Largest supported number of decimal places.
pub const MAX_PRECISION: u8 = 10;

/// Enough fractional digits to hold the exact decimal expansion of any f64.
const EXACT_DIGITS: usize = 1100;

/// Display preferences for formatted results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    precision: u8,
    thousands_separator: bool,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            precision: 2,
            thousands_separator: true,
        }
    }
}

impl FormatSettings {
    /// Create settings, clamping `precision` to `0..=MAX_PRECISION`.
    pub fn new(precision: u8, thousands_separator: bool) -> Self {
        Self {
            precision: precision.min(MAX_PRECISION),
            thousands_separator,
        }
    }

    pub fn precision(&self) -> u8 {
        self.precision.min(MAX_PRECISION)
    }

    pub fn thousands_separator(&self) -> bool {
        self.thousands_separator
    }

    pub fn with_precision(self, precision: u8) -> Self {
        Self::new(precision, self.thousands_separator)
    }

    pub fn with_separator(self, thousands_separator: bool) -> Self {
        Self::new(self.precision, thousands_separator)
    }
}

/// Format `value` with `precision` decimal places.
///
/// Rounds half away from zero on the exact binary value, so `2.5` becomes
/// `3` but `1.005` (stored as 1.00499...) becomes `1.00`. Grouping commas are
/// inserted into the integer part when `use_separator` is set.
pub fn format_number(value: f64, precision: u8, use_separator: bool) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value.is_sign_positive() {
            "Infinity"
        } else {
            "-Infinity"
        };
        return text.to_string();
    }

    let (int_part, frac_part) = round_half_away(value.abs(), usize::from(precision));
    let int_part = if use_separator {
        group_thousands(&int_part)
    } else {
        int_part
    };

    let sign = if value < 0.0 { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, int_part)
    } else {
        format!("{}{}.{}", sign, int_part, frac_part)
    }
}

/// Round a non-negative finite value to `precision` places, returning the
/// integer and fractional digit strings.
fn round_half_away(value: f64, precision: usize) -> (String, String) {
    let exact = format!("{:.*}", EXACT_DIGITS, value);
    let (int_digits, frac_digits) = exact.split_once('.').unwrap_or((&exact, ""));

    let mut digits: Vec<u8> = int_digits
        .bytes()
        .chain(frac_digits.bytes().take(precision))
        .collect();
    let round_up = frac_digits
        .as_bytes()
        .get(precision)
        .is_some_and(|d| *d >= b'5');

    if round_up {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - precision;
    let frac = digits.split_off(split);
    // Digits are ASCII throughout.
    (
        String::from_utf8_lossy(&digits).into_owned(),
        String::from_utf8_lossy(&frac).into_owned(),
    )
}

/// Insert a comma every three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
