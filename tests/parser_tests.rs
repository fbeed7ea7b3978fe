use fxcalc::syntax::{
  BinaryOperator, Constant, Expr, Function, UnaryOperator, parse_expression,
};

fn int(value: i128) -> Box<Expr> {
  Box::new(Expr::Integer(value))
}

mod structure {
  use super::*;

  #[test]
  fn multiplication_binds_tighter_than_addition() {
    assert_eq!(
      parse_expression("2+3*4").unwrap(),
      Expr::BinaryOp {
        op: BinaryOperator::Plus,
        left: int(2),
        right: Box::new(Expr::BinaryOp {
          op: BinaryOperator::Times,
          left: int(3),
          right: int(4),
        }),
      }
    );
  }

  #[test]
  fn power_is_right_associative() {
    assert_eq!(
      parse_expression("2^3^2").unwrap(),
      Expr::BinaryOp {
        op: BinaryOperator::Power,
        left: int(2),
        right: Box::new(Expr::BinaryOp {
          op: BinaryOperator::Power,
          left: int(3),
          right: int(2),
        }),
      }
    );
  }

  #[test]
  fn subtraction_is_left_associative() {
    assert_eq!(
      parse_expression("7-3-1").unwrap(),
      Expr::BinaryOp {
        op: BinaryOperator::Minus,
        left: Box::new(Expr::BinaryOp {
          op: BinaryOperator::Minus,
          left: int(7),
          right: int(3),
        }),
        right: int(1),
      }
    );
  }

  #[test]
  fn combinatorial_infix_operators() {
    assert_eq!(
      parse_expression("5C2").unwrap(),
      Expr::BinaryOp {
        op: BinaryOperator::Choose,
        left: int(5),
        right: int(2),
      }
    );
    assert_eq!(
      parse_expression("5P2").unwrap(),
      Expr::BinaryOp {
        op: BinaryOperator::Permute,
        left: int(5),
        right: int(2),
      }
    );
  }

  #[test]
  fn percent_is_a_postfix_operator() {
    assert_eq!(
      parse_expression("100+10%").unwrap(),
      Expr::BinaryOp {
        op: BinaryOperator::Plus,
        left: int(100),
        right: Box::new(Expr::UnaryOp {
          op: UnaryOperator::Percent,
          operand: int(10),
        }),
      }
    );
  }

  #[test]
  fn factorial_applies_to_groups() {
    assert_eq!(
      parse_expression("(2+3)!").unwrap(),
      Expr::UnaryOp {
        op: UnaryOperator::Factorial,
        operand: Box::new(Expr::BinaryOp {
          op: BinaryOperator::Plus,
          left: int(2),
          right: int(3),
        }),
      }
    );
  }

  #[test]
  fn radical_prefix() {
    assert_eq!(
      parse_expression("√9").unwrap(),
      Expr::UnaryOp {
        op: UnaryOperator::Sqrt,
        operand: int(9),
      }
    );
  }

  #[test]
  fn longest_function_name_wins() {
    assert_eq!(
      parse_expression("asinh(1)").unwrap(),
      Expr::Call {
        function: Function::Asinh,
        argument: int(1),
      }
    );
  }
}

mod literals {
  use super::*;

  #[test]
  fn integers_and_decimals() {
    assert_eq!(parse_expression("42").unwrap(), Expr::Integer(42));
    assert_eq!(parse_expression("3.25").unwrap(), Expr::Real(3.25));
    assert_eq!(parse_expression(".5").unwrap(), Expr::Real(0.5));
  }

  #[test]
  fn exponent_notation_is_part_of_the_literal() {
    assert_eq!(parse_expression("2e3").unwrap(), Expr::Real(2000.0));
    assert_eq!(parse_expression("1.5e-2").unwrap(), Expr::Real(0.015));
  }

  #[test]
  fn euler_constant_is_its_own_token() {
    assert_eq!(
      parse_expression("e").unwrap(),
      Expr::Constant(Constant::E)
    );
    assert_eq!(
      parse_expression("π").unwrap(),
      Expr::Constant(Constant::Pi)
    );
    // "2e" is neither a literal nor implicit multiplication by e
    assert!(parse_expression("2e").is_err());
  }

  #[test]
  fn answer_reference() {
    assert_eq!(parse_expression("Ans").unwrap(), Expr::Ans);
  }
}

mod rejects {
  use super::*;

  #[test]
  fn unclosed_function_call() {
    assert!(parse_expression("sin(30").is_err());
  }

  #[test]
  fn consecutive_operators() {
    assert!(parse_expression("2++2").is_err());
    assert!(parse_expression("2*/2").is_err());
  }

  #[test]
  fn implicit_multiplication() {
    assert!(parse_expression("2(3)").is_err());
    assert!(parse_expression("2π").is_err());
  }

  #[test]
  fn empty_and_dangling_input() {
    assert!(parse_expression("").is_err());
    assert!(parse_expression("2+").is_err());
    assert!(parse_expression("()").is_err());
  }

  #[test]
  fn unknown_identifiers() {
    assert!(parse_expression("x+1").is_err());
    assert!(parse_expression("meters").is_err());
  }
}
