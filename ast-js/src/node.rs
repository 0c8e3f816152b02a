use crate::loc::Loc;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;

/// A syntax node: a location paired with boxed syntax.
///
/// Equality is structural over the syntax only; two nodes with different
/// locations but identical syntax compare equal. Simplification must be
/// idempotent up to this equality, so locations cannot take part in it.
#[derive(Clone)]
pub struct Node<S> {
  pub loc: Loc,
  pub stx: Box<S>,
}

impl<S> Node<S> {
  pub fn new(loc: Loc, stx: S) -> Node<S> {
    Node {
      loc,
      stx: Box::new(stx),
    }
  }

  /// Maps the syntax, keeping the location.
  pub fn map_stx<T, F: FnOnce(S) -> T>(self, f: F) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(f(*self.stx)),
    }
  }

  pub fn into_stx(self) -> S {
    *self.stx
  }
}

impl<S: PartialEq> PartialEq for Node<S> {
  fn eq(&self, other: &Self) -> bool {
    self.stx == other.stx
  }
}

impl<S: Eq> Eq for Node<S> {}

impl<S: Debug> Debug for Node<S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    self.stx.fmt(f)
  }
}
