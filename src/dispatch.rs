use tracing::debug;

/// Alphabetic runs matching one of these never trigger unit-conversion
/// routing. This is the grammar's token set: every function name, the
/// constants, the answer reference, and the combinatorial operators.
const RECOGNIZED_TOKENS: &[&str] = &[
  "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "cosh", "tanh",
  "asinh", "acosh", "atanh", "log", "ln", "sqrt", "abs", "e", "π", "Ans",
  "C", "P",
];

/// Evaluation path for one `=` press, derived from the buffer content and
/// never persisted. A failure in the chosen path does not fall back to
/// another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
  Fraction,
  UnitConversion,
  Numeric,
}

/// First match wins: a raw `/` with no letters is exact-fraction arithmetic
/// (the ÷ key stores `÷`, so ordinary division never lands here); an
/// unrecognized word is assumed to denote physical units; everything else is
/// numeric.
pub fn classify(expression: &str) -> EvalMode {
  let has_alpha = expression.chars().any(|c| c.is_ascii_alphabetic());
  let mode = if expression.contains('/') && !has_alpha {
    EvalMode::Fraction
  } else if has_unrecognized_word(expression) {
    EvalMode::UnitConversion
  } else {
    EvalMode::Numeric
  };
  debug!(?mode, expression, "classified expression");
  mode
}

/// True when the expression contains a run of two or more letters and no run
/// matches a recognized token. Single stray letters are left to the numeric
/// parser, which rejects them.
fn has_unrecognized_word(expression: &str) -> bool {
  let mut has_word = false;
  for run in expression
    .split(|c: char| !c.is_ascii_alphabetic())
    .filter(|run| !run.is_empty())
  {
    if RECOGNIZED_TOKENS.contains(&run) {
      return false;
    }
    if run.len() >= 2 {
      has_word = true;
    }
  }
  has_word
}
