/// Bound on how many times, and in what order relative to its context, a
/// position will be evaluated:
///
/// - `Once`: exactly once, in original order.
/// - `Opt`: at most once, possibly skipped.
/// - `AtLeastOnce`: at least once, possibly more.
/// - `Any`: unconstrained.
///
/// `Opt` and `AtLeastOnce` are incomparable; both sit below `Any`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EvalTimes {
  Once,
  Opt,
  AtLeastOnce,
  Any,
}

impl EvalTimes {
  pub fn lte(self, other: EvalTimes) -> bool {
    use EvalTimes::*;
    match (self, other) {
      (Once, _) => true,
      (_, Any) => true,
      (a, b) => a == b,
    }
  }

  pub fn lub(self, other: EvalTimes) -> EvalTimes {
    use EvalTimes::*;
    match (self, other) {
      (a, b) if a == b => a,
      (Once, b) => b,
      (a, Once) => a,
      // Opt vs AtLeastOnce, or anything vs Any.
      _ => Any,
    }
  }

  /// Widening applied when control passes through a branch that might not
  /// execute.
  pub fn branched(self) -> EvalTimes {
    self.lub(EvalTimes::Opt)
  }

  /// Widening applied to positions evaluated repeatedly (loop bodies run
  /// through `branched().looped()` when zero iterations are possible).
  pub fn looped(self) -> EvalTimes {
    self.lub(EvalTimes::AtLeastOnce)
  }
}

#[cfg(test)]
mod tests {
  use super::EvalTimes::*;

  #[test]
  fn order() {
    assert!(Once.lte(Opt) && Once.lte(AtLeastOnce) && Once.lte(Any));
    assert!(Opt.lte(Any) && AtLeastOnce.lte(Any));
    assert!(!Opt.lte(AtLeastOnce) && !AtLeastOnce.lte(Opt));
  }

  #[test]
  fn widenings() {
    assert_eq!(Once.branched(), Opt);
    assert_eq!(Once.looped(), AtLeastOnce);
    assert_eq!(Opt.looped(), Any);
    assert_eq!(AtLeastOnce.branched(), Any);
    assert_eq!(Once.branched().looped(), Any);
  }
}
