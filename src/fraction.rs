use crate::syntax::{self, BinaryOperator, Expr, UnaryOperator};
use crate::{EvalError, evaluator, format_number};

/// Exact rational value. The numerator carries the sign, the denominator is
/// always positive, and the pair is kept in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
  num: i128,
  den: i128,
}

impl Fraction {
  pub fn new(num: i128, den: i128) -> Result<Self, EvalError> {
    if den == 0 {
      return Err(division_by_zero());
    }
    Ok(Self::reduced(num, den))
  }

  fn reduced(num: i128, den: i128) -> Self {
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    let g = gcd(num.unsigned_abs(), den.unsigned_abs()) as i128;
    Self {
      num: num / g,
      den: den / g,
    }
  }

  /// Exact fraction for a plain decimal literal, e.g. "0.125" -> 1/8.
  /// Accepts an optional exponent suffix ("1e-7" -> 1/10000000).
  pub fn from_decimal_str(text: &str) -> Result<Self, EvalError> {
    let invalid =
      || EvalError::Fraction(format!("invalid fraction literal: {text}"));
    let (mantissa, exponent) = match text.split_once('e') {
      Some((m, e)) => (m, e.parse::<i32>().map_err(|_| invalid())?),
      None => (text, 0),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
      Some((i, f)) => (i, f),
      None => (mantissa, ""),
    };
    let digits = format!("{int_part}{frac_part}");
    let num: i128 = if digits.is_empty() {
      return Err(invalid());
    } else {
      digits.parse().map_err(|_| invalid())?
    };
    let shift = exponent - frac_part.len() as i32;
    if shift >= 0 {
      Self::new(num.checked_mul(pow10(shift)?).ok_or_else(overflow)?, 1)
    } else {
      Self::new(num, pow10(-shift)?)
    }
  }

  pub fn numer(&self) -> i128 {
    self.num
  }

  pub fn denom(&self) -> i128 {
    self.den
  }

  pub fn neg(self) -> Self {
    Self {
      num: -self.num,
      den: self.den,
    }
  }

  pub fn add(self, other: Self) -> Result<Self, EvalError> {
    let num = self
      .num
      .checked_mul(other.den)
      .and_then(|a| {
        other
          .num
          .checked_mul(self.den)
          .and_then(|b| a.checked_add(b))
      })
      .ok_or_else(overflow)?;
    let den = self.den.checked_mul(other.den).ok_or_else(overflow)?;
    Ok(Self::reduced(num, den))
  }

  pub fn sub(self, other: Self) -> Result<Self, EvalError> {
    self.add(other.neg())
  }

  pub fn mul(self, other: Self) -> Result<Self, EvalError> {
    let num = self.num.checked_mul(other.num).ok_or_else(overflow)?;
    let den = self.den.checked_mul(other.den).ok_or_else(overflow)?;
    Ok(Self::reduced(num, den))
  }

  pub fn div(self, other: Self) -> Result<Self, EvalError> {
    if other.num == 0 {
      return Err(division_by_zero());
    }
    let num = self.num.checked_mul(other.den).ok_or_else(overflow)?;
    let den = self.den.checked_mul(other.num).ok_or_else(overflow)?;
    Ok(Self::reduced(num, den))
  }

  /// The exact p/q projection; a whole number is shown without denominator.
  pub fn to_ratio_string(&self) -> String {
    if self.den == 1 {
      self.num.to_string()
    } else {
      format!("{}/{}", self.num, self.den)
    }
  }

  /// The decimal projection, formatted like any other numeric result.
  pub fn to_decimal_string(&self) -> String {
    format_number(self.num as f64 / self.den as f64)
  }
}

/// Evaluates a fraction-mode expression into one exact reduced fraction.
/// Only rational literals combined with + - * / are meaningful here; any
/// other construct the grammar can produce is a fraction error.
pub fn evaluate(input: &str) -> Result<Fraction, EvalError> {
  let normalized = evaluator::normalize(input);
  let expr = syntax::parse_expression(&normalized)
    .map_err(|e| EvalError::Fraction(e.to_string()))?;
  eval(&expr)
}

fn eval(expr: &Expr) -> Result<Fraction, EvalError> {
  match expr {
    Expr::Integer(i) => Fraction::new(*i, 1),
    Expr::Real(r) => Fraction::from_decimal_str(&r.to_string()),
    Expr::UnaryOp {
      op: UnaryOperator::Neg,
      operand,
    } => Ok(eval(operand)?.neg()),
    Expr::BinaryOp { op, left, right } => {
      let a = eval(left)?;
      let b = eval(right)?;
      match op {
        BinaryOperator::Plus => a.add(b),
        BinaryOperator::Minus => a.sub(b),
        BinaryOperator::Times => a.mul(b),
        BinaryOperator::Divide => a.div(b),
        _ => Err(unsupported()),
      }
    }
    _ => Err(unsupported()),
  }
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
  while b != 0 {
    (a, b) = (b, a % b);
  }
  // gcd(0, 0) cannot occur: denominators are never zero here
  a.max(1)
}

fn pow10(exp: i32) -> Result<i128, EvalError> {
  10i128
    .checked_pow(u32::try_from(exp).map_err(|_| overflow())?)
    .ok_or_else(overflow)
}

fn division_by_zero() -> EvalError {
  EvalError::Fraction("division by zero".to_string())
}

fn overflow() -> EvalError {
  EvalError::Fraction("value out of range for exact arithmetic".to_string())
}

fn unsupported() -> EvalError {
  EvalError::Fraction(
    "only + - * / over rational literals are supported".to_string(),
  )
}
