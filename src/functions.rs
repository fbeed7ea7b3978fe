use std::f64::consts::PI;

use crate::AngleMode;
use crate::syntax::Function;

/// n! for non-negative integer n, NaN for anything else. Arguments above
/// 170 saturate to infinity (171! already exceeds f64::MAX) and fail result
/// validation downstream.
pub fn factorial(n: f64) -> f64 {
  if n < 0.0 || n.fract() != 0.0 {
    return f64::NAN;
  }
  if n > 170.0 {
    return f64::INFINITY;
  }
  let mut result = 1.0;
  let mut i = 2.0;
  while i <= n {
    result *= i;
    i += 1.0;
  }
  result
}

/// nCr, NaN when r < 0 or r > n.
pub fn combinations(n: f64, r: f64) -> f64 {
  if r < 0.0 || r > n {
    return f64::NAN;
  }
  factorial(n) / (factorial(r) * factorial(n - r))
}

/// nPr, NaN when r < 0 or r > n.
pub fn permutations(n: f64, r: f64) -> f64 {
  if r < 0.0 || r > n {
    return f64::NAN;
  }
  factorial(n) / factorial(n - r)
}

/// Applies a named unary function. In degrees mode the direct trig functions
/// convert their argument and the inverse ones convert their return value;
/// the hyperbolic family and everything else pass through unscaled.
pub fn apply(function: Function, x: f64, angle_mode: AngleMode) -> f64 {
  let to_radians = |v: f64| match angle_mode {
    AngleMode::Degrees => v * PI / 180.0,
    AngleMode::Radians => v,
  };
  let from_radians = |v: f64| match angle_mode {
    AngleMode::Degrees => v * 180.0 / PI,
    AngleMode::Radians => v,
  };
  match function {
    Function::Sin => to_radians(x).sin(),
    Function::Cos => to_radians(x).cos(),
    Function::Tan => to_radians(x).tan(),
    Function::Asin => from_radians(x.asin()),
    Function::Acos => from_radians(x.acos()),
    Function::Atan => from_radians(x.atan()),
    Function::Sinh => x.sinh(),
    Function::Cosh => x.cosh(),
    Function::Tanh => x.tanh(),
    Function::Asinh => x.asinh(),
    Function::Acosh => x.acosh(),
    Function::Atanh => x.atanh(),
    Function::Log10 => x.log10(),
    Function::Ln => x.ln(),
    Function::Sqrt => x.sqrt(),
    Function::Abs => x.abs(),
  }
}
