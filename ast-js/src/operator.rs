/// Operator names for unary and binary operator application nodes.
///
/// One flat enum covers both arities; each node kind only constructs the
/// variants that make sense for it. Operators that resolve dynamically
/// (`in`, `instanceof`, `delete`) are outside the closed set; applying any
/// operator listed here to already-evaluated operands neither throws nor
/// touches state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorName {
  Addition,
  Subtraction,
  Multiplication,
  Division,
  Remainder,
  Exponentiation,
  BitwiseAnd,
  BitwiseOr,
  BitwiseXor,
  BitwiseLeftShift,
  BitwiseRightShift,
  BitwiseUnsignedRightShift,
  LessThan,
  LessThanOrEqual,
  GreaterThan,
  GreaterThanOrEqual,
  Equality,
  Inequality,
  StrictEquality,
  StrictInequality,
  LogicalAnd,
  LogicalOr,
  UnaryPlus,
  UnaryNegation,
  LogicalNot,
  BitwiseNot,
  Void,
  TypeOf,
}

impl OperatorName {
  /// Whether the right operand of this binary operator is conditionally
  /// evaluated (short-circuiting).
  pub fn short_circuits(&self) -> bool {
    matches!(self, OperatorName::LogicalAnd | OperatorName::LogicalOr)
  }
}
