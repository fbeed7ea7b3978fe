use pest::Parser;
use pest::iterators::Pair;

use crate::{CalcParser, Rule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
  Plus,
  Minus,
  Times,
  Divide,
  Power,
  Choose,
  Permute,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
  Neg,
  Sqrt,
  Factorial,
  Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
  Sin,
  Cos,
  Tan,
  Asin,
  Acos,
  Atan,
  Sinh,
  Cosh,
  Tanh,
  Asinh,
  Acosh,
  Atanh,
  Log10,
  Ln,
  Sqrt,
  Abs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
  Pi,
  E,
}

/// Closed AST over the calculator's operator and function set. Evaluation is
/// a tree walk over these nodes only; there is no name resolution and no way
/// for an expression to reach ambient program state.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Integer(i128),
  Real(f64),
  Constant(Constant),
  Ans,
  UnaryOp {
    op: UnaryOperator,
    operand: Box<Expr>,
  },
  BinaryOp {
    op: BinaryOperator,
    left: Box<Expr>,
    right: Box<Expr>,
  },
  Call {
    function: Function,
    argument: Box<Expr>,
  },
}

pub fn parse_expression(
  input: &str,
) -> Result<Expr, Box<pest::error::Error<Rule>>> {
  let mut pairs =
    CalcParser::parse(Rule::expression, input).map_err(Box::new)?;
  // Grammar guarantees: expression = SOI ~ expr ~ EOI
  let expression = pairs.next().unwrap();
  let expr = expression.into_inner().next().unwrap();
  Ok(build_expr(expr))
}

fn build_expr(pair: Pair<Rule>) -> Expr {
  match pair.as_rule() {
    Rule::expr | Rule::term | Rule::choose => build_left_assoc(pair),
    Rule::power => {
      let mut inner = pair.into_inner();
      let base = build_expr(inner.next().unwrap());
      match inner.next() {
        Some(exponent) => Expr::BinaryOp {
          op: BinaryOperator::Power,
          left: Box::new(base),
          right: Box::new(build_expr(exponent)),
        },
        None => base,
      }
    }
    Rule::unary | Rule::group => build_expr(pair.into_inner().next().unwrap()),
    Rule::neg => Expr::UnaryOp {
      op: UnaryOperator::Neg,
      operand: Box::new(build_expr(pair.into_inner().next().unwrap())),
    },
    Rule::radical => Expr::UnaryOp {
      op: UnaryOperator::Sqrt,
      operand: Box::new(build_expr(pair.into_inner().next().unwrap())),
    },
    Rule::postfix => {
      let mut inner = pair.into_inner();
      let mut expr = build_expr(inner.next().unwrap());
      for op_pair in inner {
        let op = match op_pair.as_str() {
          "!" => UnaryOperator::Factorial,
          _ => UnaryOperator::Percent,
        };
        expr = Expr::UnaryOp {
          op,
          operand: Box::new(expr),
        };
      }
      expr
    }
    Rule::call => {
      let mut inner = pair.into_inner();
      let function = function_from_name(inner.next().unwrap().as_str());
      Expr::Call {
        function,
        argument: Box::new(build_expr(inner.next().unwrap())),
      }
    }
    Rule::number => build_number(pair.as_str()),
    Rule::constant => match pair.as_str() {
      "π" => Expr::Constant(Constant::Pi),
      _ => Expr::Constant(Constant::E),
    },
    Rule::ans => Expr::Ans,
    rule => unreachable!("unexpected rule in expression tree: {rule:?}"),
  }
}

fn build_left_assoc(pair: Pair<Rule>) -> Expr {
  let mut inner = pair.into_inner();
  let mut expr = build_expr(inner.next().unwrap());
  while let Some(op_pair) = inner.next() {
    let op = binary_op_from_str(op_pair.as_str());
    let right = build_expr(inner.next().unwrap());
    expr = Expr::BinaryOp {
      op,
      left: Box::new(expr),
      right: Box::new(right),
    };
  }
  expr
}

fn build_number(text: &str) -> Expr {
  if text.contains('.') || text.contains('e') {
    Expr::Real(text.parse().unwrap_or(f64::NAN))
  } else {
    // Integer literals wider than i128 fall back to the float domain
    text
      .parse::<i128>()
      .map(Expr::Integer)
      .unwrap_or_else(|_| Expr::Real(text.parse().unwrap_or(f64::NAN)))
  }
}

fn binary_op_from_str(op: &str) -> BinaryOperator {
  match op {
    "+" => BinaryOperator::Plus,
    "-" => BinaryOperator::Minus,
    "*" => BinaryOperator::Times,
    "/" => BinaryOperator::Divide,
    "C" => BinaryOperator::Choose,
    _ => BinaryOperator::Permute,
  }
}

fn function_from_name(name: &str) -> Function {
  match name {
    "sin" => Function::Sin,
    "cos" => Function::Cos,
    "tan" => Function::Tan,
    "asin" => Function::Asin,
    "acos" => Function::Acos,
    "atan" => Function::Atan,
    "sinh" => Function::Sinh,
    "cosh" => Function::Cosh,
    "tanh" => Function::Tanh,
    "asinh" => Function::Asinh,
    "acosh" => Function::Acosh,
    "atanh" => Function::Atanh,
    "log" => Function::Log10,
    "ln" => Function::Ln,
    "sqrt" => Function::Sqrt,
    _ => Function::Abs,
  }
}
