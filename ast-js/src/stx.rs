use crate::node::Node;
use crate::stmt::Stmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopLevel {
  pub body: Vec<Node<Stmt>>,
}
