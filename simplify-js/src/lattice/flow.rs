/// Net effect of a statement sequence on subsequent control: guaranteed to
/// fall through, guaranteed to divert (return/throw), or not locally
/// resolvable (`break`/`continue`/`with`/`try`, loops).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlFlow {
  FallsThrough,
  Diverges,
  Unknown,
}

impl ControlFlow {
  pub fn lte(self, other: ControlFlow) -> bool {
    self == other || other == ControlFlow::Unknown
  }

  /// Join for alternative control paths (the two arms of an `if`).
  pub fn lub(self, other: ControlFlow) -> ControlFlow {
    if self == other {
      self
    } else {
      ControlFlow::Unknown
    }
  }

  /// Left-to-right sequencing: once a prefix diverges, nothing after it
  /// runs; once it is unknown, so is the whole.
  pub fn seq(self, next: ControlFlow) -> ControlFlow {
    match self {
      ControlFlow::FallsThrough => next,
      ControlFlow::Diverges => ControlFlow::Diverges,
      ControlFlow::Unknown => ControlFlow::Unknown,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::ControlFlow::*;

  #[test]
  fn join_and_seq() {
    assert_eq!(FallsThrough.lub(Diverges), Unknown);
    assert_eq!(Diverges.lub(Diverges), Diverges);
    assert_eq!(Diverges.seq(FallsThrough), Diverges);
    assert_eq!(FallsThrough.seq(Diverges), Diverges);
    assert_eq!(Unknown.seq(Diverges), Unknown);
  }
}
