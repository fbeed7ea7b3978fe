use pest_derive::Parser;
use thiserror::Error;

pub mod convert;
pub mod dispatch;
pub mod evaluator;
pub mod fraction;
pub mod functions;
pub mod history;
pub mod session;
pub mod syntax;

#[derive(Parser)]
#[grammar = "calc.pest"]
pub struct CalcParser;

pub use convert::{
  ConversionRequest, ConversionResponse, ConvertError, UnitConverter,
};
pub use dispatch::EvalMode;
pub use evaluator::EvalContext;
pub use fraction::Fraction;
pub use history::{History, HistoryEntry};
pub use session::{KeyEvent, KeyKind, Phase, PressAction, Session};

/// Angle unit for the six basic trigonometric functions. Hyperbolic and
/// non-trig functions are unaffected by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleMode {
  #[default]
  Degrees,
  Radians,
}

/// User-visible evaluation failures. Silent input rejections (operator on an
/// empty buffer, unreadable memory value) are no-ops in the session and never
/// produce an error value.
#[derive(Error, Debug)]
pub enum EvalError {
  #[error("Fraction error: {0}")]
  Fraction(String),
  #[error("Conversion error: {0}")]
  Conversion(String),
  #[error("Calculation error: {0}")]
  Calculation(String),
}

/// Formats a finite result rounded to 12 significant digits, trimming the
/// floating-point noise trig evaluation leaves behind. Magnitudes outside the
/// plain-decimal range use exponent notation, which the grammar can read back
/// when the result re-enters the expression buffer.
pub fn format_number(value: f64) -> String {
  let rounded: f64 = format!("{value:.11e}").parse().unwrap_or(value);
  if rounded == 0.0 {
    return "0".to_string();
  }
  let magnitude = rounded.abs();
  if magnitude >= 1e21 || magnitude < 1e-7 {
    format!("{rounded:e}")
  } else {
    rounded.to_string()
  }
}
