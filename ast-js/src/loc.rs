use std::cmp::max;
use std::cmp::min;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;

/// A half-open byte range within the original source.
///
/// Transformations may create entirely new nodes that don't exist anywhere in
/// the source code, so locations are best-effort; `Loc::UNKNOWN` marks a
/// synthesized node. Locations never participate in syntax equality.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  pub const UNKNOWN: Loc = Loc(0, 0);

  pub fn is_unknown(&self) -> bool {
    *self == Loc::UNKNOWN
  }

  pub fn extend(&mut self, other: Loc) {
    if other.is_unknown() {
      return;
    }
    if self.is_unknown() {
      *self = other;
      return;
    }
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }
}

impl Debug for Loc {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "[{}:{}]", self.0, self.1)
  }
}
