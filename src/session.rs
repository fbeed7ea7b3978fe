use std::time::Duration;

use tracing::{debug, warn};

use crate::convert::{self, ConversionRequest, ConvertError, UnitConverter};
use crate::dispatch::{self, EvalMode};
use crate::evaluator::{self, EvalContext};
use crate::fraction::{self, Fraction};
use crate::history::History;
use crate::{AngleMode, EvalError, format_number};

/// Function names recognised for whole-token deletion and for the shift /
/// hyperbolic rewrites. Longer names first so a suffix match on "asinh("
/// is not mistaken for "sinh(".
const FUNCTION_TOKENS: &[&str] = &[
  "asinh", "acosh", "atanh", "sinh", "cosh", "tanh", "asin", "acos", "atan",
  "sin", "cos", "tan", "sqrt", "abs", "log", "ln",
];

/// Operators subject to last-write-wins replacement when pressed twice in a
/// row. `√` and the fraction bar are deliberately absent.
const REPLACEABLE_OPERATORS: &str = "+-×÷^CP";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
  Number,
  Decimal,
  Operator,
  Function,
  Percent,
  Parenthesis,
  Constant,
  Ans,
  FractionBar,
  Combination,
  Permutation,
  Memory,
  Clear,
  Delete,
  Equals,
  Shift,
  Hyperbolic,
  SdToggle,
}

/// A discrete key/button event from the UI layer. Only `value`, `kind`, and
/// the active session flags matter here; layout and styling do not exist at
/// this level.
#[derive(Debug, Clone)]
pub struct KeyEvent {
  pub value: String,
  pub kind: KeyKind,
  pub shift_value: Option<String>,
}

impl KeyEvent {
  pub fn new(kind: KeyKind, value: impl Into<String>) -> Self {
    Self {
      value: value.into(),
      kind,
      shift_value: None,
    }
  }

  pub fn with_shift(
    kind: KeyKind,
    value: impl Into<String>,
    shift_value: impl Into<String>,
  ) -> Self {
    Self {
      value: value.into(),
      kind,
      shift_value: Some(shift_value.into()),
    }
  }
}

/// Tagged session state. Shift, hyperbolic, and angle mode are orthogonal
/// attributes, not phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
  #[default]
  Idle,
  HasExpression,
  ShowingResult,
  Busy,
}

/// What the UI layer should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressAction {
  None,
  Evaluate,
}

/// One calculator session: the expression under construction, its display
/// projection, toggle flags, memory register, last answer, and history.
/// Exclusively owned; all mutation goes through `press` and `evaluate`.
pub struct Session {
  expression: String,
  display: String,
  phase: Phase,
  shift: bool,
  hyperbolic: bool,
  angle_mode: AngleMode,
  last_answer: String,
  memory: f64,
  fraction_result: Option<Fraction>,
  history: History,
  conversion_timeout: Duration,
}

impl Default for Session {
  fn default() -> Self {
    Self::new()
  }
}

impl Session {
  pub fn new() -> Self {
    Self {
      expression: String::new(),
      display: "0".to_string(),
      phase: Phase::Idle,
      shift: false,
      hyperbolic: false,
      angle_mode: AngleMode::Degrees,
      last_answer: "0".to_string(),
      memory: 0.0,
      fraction_result: None,
      history: History::default(),
      conversion_timeout: Duration::from_secs(15),
    }
  }

  pub fn expression(&self) -> &str {
    &self.expression
  }

  pub fn display(&self) -> &str {
    &self.display
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  pub fn angle_mode(&self) -> AngleMode {
    self.angle_mode
  }

  pub fn set_angle_mode(&mut self, mode: AngleMode) {
    self.angle_mode = mode;
  }

  pub fn shift_active(&self) -> bool {
    self.shift
  }

  pub fn hyperbolic_active(&self) -> bool {
    self.hyperbolic
  }

  pub fn last_answer(&self) -> &str {
    &self.last_answer
  }

  pub fn history(&self) -> &History {
    &self.history
  }

  /// Presence indicator for the UI; the register's value itself is not part
  /// of the readout contract.
  pub fn has_memory(&self) -> bool {
    self.memory != 0.0
  }

  pub fn set_conversion_timeout(&mut self, timeout: Duration) {
    self.conversion_timeout = timeout;
  }

  /// Feeds one key event through the input state machine. Returns
  /// `PressAction::Evaluate` when the UI should follow up with `evaluate`.
  pub fn press(&mut self, key: &KeyEvent) -> PressAction {
    if self.phase == Phase::Busy && key.kind != KeyKind::Clear {
      // Input is serialized while a conversion is outstanding; a repeated
      // `=` in particular must not start a second evaluation. Clear stays
      // live so an abandoned conversion cannot wedge the session.
      return PressAction::None;
    }
    match key.kind {
      KeyKind::Shift => {
        self.shift = !self.shift;
        return PressAction::None;
      }
      KeyKind::Hyperbolic => {
        self.hyperbolic = !self.hyperbolic;
        self.shift = false;
        return PressAction::None;
      }
      KeyKind::SdToggle => {
        self.toggle_result_projection();
        return PressAction::None;
      }
      _ => {}
    }

    let shifted = self.shift && key.shift_value.is_some();
    let value = if shifted {
      key.shift_value.clone().unwrap_or_default()
    } else {
      key.value.clone()
    };
    let kind = if shifted && key.kind == KeyKind::Combination {
      KeyKind::Permutation
    } else {
      key.kind
    };

    match kind {
      KeyKind::Number
      | KeyKind::Decimal
      | KeyKind::Constant
      | KeyKind::Parenthesis
      | KeyKind::Ans
      | KeyKind::FractionBar => self.insert_literal(&value),
      KeyKind::Operator | KeyKind::Combination | KeyKind::Permutation => {
        self.push_operator(&value)
      }
      KeyKind::Function => self.push_function(&value),
      KeyKind::Percent => self.push_percent(),
      KeyKind::Memory => self.memory_key(&value),
      KeyKind::Clear => self.clear(),
      KeyKind::Delete => self.delete(),
      KeyKind::Equals => {
        self.shift = false;
        if !self.expression.is_empty() {
          return PressAction::Evaluate;
        }
      }
      KeyKind::Shift | KeyKind::Hyperbolic | KeyKind::SdToggle => {}
    }
    PressAction::None
  }

  /// Runs the `=` press: classifies the buffer into exactly one evaluation
  /// mode and executes it. On success the result becomes the new display,
  /// buffer, and last answer, and the evaluation is recorded in history. On
  /// failure the display shows "Error", the buffer is cleared, and the error
  /// is returned for the UI notification; history, memory, and the last
  /// answer are left untouched.
  pub async fn evaluate<C: UnitConverter>(
    &mut self,
    converter: &C,
  ) -> Result<(), EvalError> {
    if self.phase == Phase::Busy || self.expression.is_empty() {
      return Ok(());
    }
    let expression = self.expression.trim().to_string();
    let outcome = match dispatch::classify(&expression) {
      EvalMode::Fraction => self.evaluate_fraction(&expression),
      EvalMode::UnitConversion => {
        self.evaluate_conversion(&expression, converter).await
      }
      EvalMode::Numeric => self.evaluate_numeric(&expression),
    };
    self.shift = false;
    self.phase = Phase::ShowingResult;
    if let Err(err) = &outcome {
      warn!(%err, "evaluation failed");
      self.display = "Error".to_string();
      self.expression.clear();
      self.fraction_result = None;
    }
    outcome
  }

  fn evaluate_fraction(&mut self, expression: &str) -> Result<(), EvalError> {
    let result = fraction::evaluate(expression)?;
    let result_string = result.to_ratio_string();
    self.history.record(expression, &result_string);
    self.display.clone_from(&result_string);
    self.expression = result_string;
    self.last_answer = result.to_decimal_string();
    self.fraction_result = Some(result);
    Ok(())
  }

  fn evaluate_numeric(&mut self, expression: &str) -> Result<(), EvalError> {
    let ctx = EvalContext {
      angle_mode: self.angle_mode,
      last_answer: self.last_answer.parse().unwrap_or(0.0),
    };
    let result = evaluator::evaluate(expression, &ctx)?;
    self.history.record(expression, &result);
    self.display.clone_from(&result);
    self.expression.clone_from(&result);
    self.last_answer = result;
    self.fraction_result = None;
    Ok(())
  }

  async fn evaluate_conversion<C: UnitConverter>(
    &mut self,
    expression: &str,
    converter: &C,
  ) -> Result<(), EvalError> {
    self.phase = Phase::Busy;
    debug!(expression, "forwarding to unit-conversion delegate");
    let request = ConversionRequest {
      expression: expression.to_string(),
    };
    let result =
      match tokio::time::timeout(self.conversion_timeout, converter.convert(request))
        .await
      {
        Ok(inner) => inner,
        Err(_) => Err(ConvertError::Timeout),
      };
    let response =
      result.map_err(|e| EvalError::Conversion(e.to_string()))?;
    let prefix = convert::numeric_prefix(&response.result);
    self.history.record(expression, &response.result);
    self.display = response.result;
    self.expression.clone_from(&prefix);
    self.last_answer = prefix;
    self.fraction_result = None;
    Ok(())
  }

  /// Digit, decimal point, constant, parenthesis, answer reference, or the
  /// fraction bar. Replaces the buffer when a result is showing; otherwise
  /// appends, overwriting a bare "0" unless the key is the decimal point.
  /// The `Ans` key stores the symbolic token; substitution happens only at
  /// evaluation time.
  fn insert_literal(&mut self, value: &str) {
    if self.phase == Phase::ShowingResult {
      self.expression = value.to_string();
      self.display = value.to_string();
      self.fraction_result = None;
    } else {
      if self.expression == "0" && value != "." {
        self.expression = value.to_string();
      } else {
        self.expression.push_str(value);
      }
      if self.display == "0" && value != "." {
        self.display = value.to_string();
      } else {
        self.display.push_str(value);
      }
    }
    self.phase = Phase::HasExpression;
    self.shift = false;
  }

  /// Binary operator or combinatorial key. Rejected on an empty buffer
  /// unless unary minus or square root; a trailing operator is replaced
  /// rather than doubled.
  fn push_operator(&mut self, value: &str) {
    if self.expression.is_empty() && !matches!(value, "-" | "√") {
      return;
    }
    if self.phase == Phase::ShowingResult {
      self.fraction_result = None;
    }
    let replace_last = self
      .expression
      .chars()
      .last()
      .is_some_and(|c| REPLACEABLE_OPERATORS.contains(c));
    if replace_last {
      self.expression.pop();
      self.display.pop();
    }
    self.expression.push_str(value);
    self.display.push_str(value);
    self.phase = Phase::HasExpression;
    self.shift = false;
  }

  /// Function key. The postfix set applies to the current token (and to a
  /// just-produced result); prefix functions open a new call, clearing a
  /// shown result first. The hyperbolic flag rewrites the six trig names
  /// before insertion and survives the press.
  fn push_function(&mut self, value: &str) {
    let postfix = matches!(value, "!" | "x²" | "x³" | "x⁻¹");
    if self.phase == Phase::ShowingResult && !postfix {
      self.expression.clear();
      self.display = "0".to_string();
      self.fraction_result = None;
    }
    match value {
      "!" => {
        self.expression.push('!');
        self.display.push('!');
      }
      "x²" => {
        self.expression.push_str("^2");
        self.display.push('²');
      }
      "x³" => {
        self.expression.push_str("^3");
        self.display.push('³');
      }
      "x⁻¹" => {
        self.expression.push_str("^-1");
        self.display.push_str("⁻¹");
      }
      _ => {
        let mut name = value.to_string();
        if self.hyperbolic
          && matches!(value, "sin" | "cos" | "tan" | "asin" | "acos" | "atan")
        {
          name.push('h');
        }
        let token = format!("{name}(");
        self.expression.push_str(&token);
        if self.display == "0" {
          self.display = token;
        } else {
          self.display.push_str(&token);
        }
      }
    }
    self.phase = Phase::HasExpression;
    self.shift = false;
  }

  fn push_percent(&mut self) {
    if self.expression.is_empty() {
      return;
    }
    self.expression.push('%');
    self.display.push('%');
    self.phase = Phase::HasExpression;
    self.shift = false;
  }

  /// Memory keys read the currently displayed value, not the raw buffer; an
  /// unreadable display (a fraction, "Error") silently rejects M+ and M-.
  fn memory_key(&mut self, value: &str) {
    match value {
      "m+" | "m-" => {
        let Ok(displayed) = self.display.parse::<f64>() else {
          return;
        };
        if value == "m+" {
          self.memory += displayed;
        } else {
          self.memory -= displayed;
        }
      }
      "mr" => {
        let recalled = format_number(self.memory);
        self.insert_literal(&recalled);
        return;
      }
      "mc" => self.memory = 0.0,
      _ => return,
    }
    self.shift = false;
  }

  /// Resets the expression, display, phase, and both toggle flags. Memory,
  /// history, and the last answer survive.
  fn clear(&mut self) {
    self.expression.clear();
    self.display = "0".to_string();
    self.phase = Phase::Idle;
    self.shift = false;
    self.hyperbolic = false;
    self.fraction_result = None;
  }

  /// Removes the last complete function-call token if one ends the buffer,
  /// else one postfix-power token, else a single character. A no-op while a
  /// result is showing.
  fn delete(&mut self) {
    if self.phase == Phase::ShowingResult || self.expression.is_empty() {
      return;
    }
    if let Some(token_len) = trailing_function_token(&self.expression) {
      self.expression.truncate(self.expression.len() - token_len);
      self
        .display
        .truncate(self.display.len().saturating_sub(token_len));
    } else if let Some((expr_len, display_len)) =
      trailing_power_token(&self.expression, &self.display)
    {
      self.expression.truncate(self.expression.len() - expr_len);
      self
        .display
        .truncate(self.display.len().saturating_sub(display_len));
    } else {
      self.expression.pop();
      self.display.pop();
    }
    if self.expression.is_empty() {
      self.display = "0".to_string();
      self.phase = Phase::Idle;
    }
  }

  /// S↔D: re-projects the most recent fraction result between p/q and
  /// decimal. No effect after a numeric or conversion result, after an
  /// error, or once the buffer has been edited.
  fn toggle_result_projection(&mut self) {
    let Some(result) = self.fraction_result else {
      return;
    };
    if self.display == "Error" {
      return;
    }
    self.display = if self.display.contains('/') {
      result.to_decimal_string()
    } else {
      result.to_ratio_string()
    };
  }
}

/// Byte length of a `name(` token sitting at the end of the buffer, if any.
fn trailing_function_token(expression: &str) -> Option<usize> {
  FUNCTION_TOKENS.iter().find_map(|name| {
    expression
      .ends_with(&format!("{name}("))
      .then(|| name.len() + 1)
  })
}

/// Byte lengths to strip from buffer and display when a postfix power token
/// ends the expression. The display holds the superscript form, so the two
/// sides shrink by different amounts.
fn trailing_power_token(
  expression: &str,
  display: &str,
) -> Option<(usize, usize)> {
  const TOKENS: &[(&str, &str)] = &[("^-1", "⁻¹"), ("^2", "²"), ("^3", "³")];
  TOKENS.iter().find_map(|(expr_token, display_token)| {
    (expression.ends_with(expr_token) && display.ends_with(display_token))
      .then(|| (expr_token.len(), display_token.len()))
  })
}
