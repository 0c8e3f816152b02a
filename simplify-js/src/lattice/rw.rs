/// Three-point access lattice: `None ⊑ Read ⊑ Write`.
///
/// Commutability is structural: `None` touches no storage, so it commutes
/// with anything; two accesses of the same storage commute iff neither is a
/// `Write`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadWrite {
  #[default]
  None,
  Read,
  Write,
}

impl ReadWrite {
  pub fn lte(self, other: ReadWrite) -> bool {
    self <= other
  }

  pub fn lub(self, other: ReadWrite) -> ReadWrite {
    self.max(other)
  }

  pub fn commutes_with(self, other: ReadWrite) -> bool {
    if self == ReadWrite::None || other == ReadWrite::None {
      return true;
    }
    self != ReadWrite::Write && other != ReadWrite::Write
  }

  pub fn is_bottom(self) -> bool {
    self == ReadWrite::None
  }

  pub fn is_top(self) -> bool {
    self == ReadWrite::Write
  }
}

/// Two-point boolean domain used for "may throw".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MayThrow {
  #[default]
  Bottom,
  Top,
}

impl MayThrow {
  pub fn lte(self, other: MayThrow) -> bool {
    self <= other
  }

  pub fn lub(self, other: MayThrow) -> MayThrow {
    self.max(other)
  }

  pub fn is_bottom(self) -> bool {
    self == MayThrow::Bottom
  }

  pub fn is_top(self) -> bool {
    self == MayThrow::Top
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rw_order_and_join() {
    use ReadWrite::*;
    assert!(None.lte(Read) && Read.lte(Write) && None.lte(Write));
    assert!(!Write.lte(Read));
    assert_eq!(Read.lub(Write), Write);
    assert_eq!(None.lub(Read), Read);
  }

  #[test]
  fn rw_commutes() {
    use ReadWrite::*;
    assert!(Read.commutes_with(Read));
    assert!(None.commutes_with(Write));
    assert!(Write.commutes_with(None));
    assert!(!Read.commutes_with(Write));
    assert!(!Write.commutes_with(Write));
  }
}
