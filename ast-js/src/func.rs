use crate::node::Node;
use crate::pat::IdPat;
use crate::stmt::Stmt;

// This common type backs both function literals and function declarations, as
// one type is easier to match on and wrangle than several.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Func {
  /// Required for declarations; optional for literals. A literal's name is
  /// bound inside its own body only.
  pub name: Option<Node<IdPat>>,
  pub parameters: Vec<Node<IdPat>>,
  pub body: Vec<Node<Stmt>>,
}

impl Func {
  pub fn param_names(&self) -> impl Iterator<Item = &str> {
    self.parameters.iter().map(|p| p.stx.name.as_str())
  }
}
