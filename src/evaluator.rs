use crate::syntax::{
  self, BinaryOperator, Constant, Expr, UnaryOperator,
};
use crate::{AngleMode, EvalError, format_number, functions};

/// Per-evaluation inputs that are not part of the expression itself.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext {
  pub angle_mode: AngleMode,
  pub last_answer: f64,
}

impl Default for EvalContext {
  fn default() -> Self {
    Self {
      angle_mode: AngleMode::Degrees,
      last_answer: 0.0,
    }
  }
}

/// Replaces the display-only operator symbols with their canonical forms.
pub fn normalize(input: &str) -> String {
  input.replace('×', "*").replace('÷', "/")
}

/// Evaluates a numeric-mode expression to its formatted result string.
/// Non-finite results (division by zero, factorial of a non-integer, an
/// out-of-domain combinatorial call) are calculation errors; finite results
/// are rounded to 12 significant digits at this boundary and not earlier.
pub fn evaluate(input: &str, ctx: &EvalContext) -> Result<String, EvalError> {
  let normalized = normalize(input);
  let expr = syntax::parse_expression(&normalized)
    .map_err(|e| EvalError::Calculation(e.to_string()))?;
  let value = eval(&expr, ctx);
  if !value.is_finite() {
    return Err(EvalError::Calculation(
      "result is not a finite number".to_string(),
    ));
  }
  Ok(format_number(value))
}

fn eval(expr: &Expr, ctx: &EvalContext) -> f64 {
  match expr {
    Expr::Integer(i) => *i as f64,
    Expr::Real(r) => *r,
    Expr::Constant(Constant::Pi) => std::f64::consts::PI,
    Expr::Constant(Constant::E) => std::f64::consts::E,
    Expr::Ans => ctx.last_answer,
    Expr::UnaryOp { op, operand } => {
      let x = eval(operand, ctx);
      match op {
        UnaryOperator::Neg => -x,
        UnaryOperator::Sqrt => x.sqrt(),
        UnaryOperator::Factorial => functions::factorial(x),
        UnaryOperator::Percent => x / 100.0,
      }
    }
    Expr::BinaryOp { op, left, right } => {
      // a+b% and a-b% mean "b percent of the preceding term", added or
      // subtracted; percent after any other operator is the plain /100
      // reading
      if matches!(op, BinaryOperator::Plus | BinaryOperator::Minus) {
        if let Expr::UnaryOp {
          op: UnaryOperator::Percent,
          operand,
        } = right.as_ref()
        {
          let total = eval(left, ctx);
          let base = eval(percent_base(left), ctx);
          let delta = base * eval(operand, ctx) / 100.0;
          return if *op == BinaryOperator::Plus {
            total + delta
          } else {
            total - delta
          };
        }
      }
      let a = eval(left, ctx);
      let b = eval(right, ctx);
      match op {
        BinaryOperator::Plus => a + b,
        BinaryOperator::Minus => a - b,
        BinaryOperator::Times => a * b,
        BinaryOperator::Divide => a / b,
        BinaryOperator::Power => a.powf(b),
        BinaryOperator::Choose => functions::combinations(a, b),
        BinaryOperator::Permute => functions::permutations(a, b),
      }
    }
    Expr::Call { function, argument } => {
      functions::apply(*function, eval(argument, ctx), ctx.angle_mode)
    }
  }
}

/// The term a trailing percent refers to: the rightmost addend of the
/// left-hand side, so `2+3+10%` reads as ten percent of 3, not of 5.
fn percent_base(left: &Expr) -> &Expr {
  match left {
    Expr::BinaryOp {
      op: BinaryOperator::Plus | BinaryOperator::Minus,
      right,
      ..
    } => right,
    _ => left,
  }
}
