use crate::expr::Expr;
use crate::func::Func;
use crate::node::Node;
use crate::pat::IdPat;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmptyStmt {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockStmt {
  pub body: Vec<Node<Stmt>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarDeclarator {
  pub name: Node<IdPat>,
  pub initializer: Option<Node<Expr>>,
}

/// `var` declaration list. Bindings hoist to the enclosing function scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VarDeclStmt {
  pub declarators: Vec<VarDeclarator>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExprStmt {
  pub expr: Node<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IfStmt {
  pub test: Node<Expr>,
  pub consequent: Node<Stmt>,
  pub alternate: Option<Node<Stmt>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WhileStmt {
  pub condition: Node<Expr>,
  pub body: Node<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoWhileStmt {
  pub body: Node<Stmt>,
  pub condition: Node<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ForInit {
  None,
  Expr(Node<Expr>),
  Decl(VarDeclStmt),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForTripleStmt {
  pub init: ForInit,
  pub cond: Option<Node<Expr>>,
  pub post: Option<Node<Expr>>,
  pub body: Node<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReturnStmt {
  pub value: Option<Node<Expr>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThrowStmt {
  pub value: Node<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakStmt {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContinueStmt {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatchBlock {
  pub parameter: Option<Node<IdPat>>,
  pub body: Vec<Node<Stmt>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TryStmt {
  pub wrapped: Vec<Node<Stmt>>,
  pub catch: Option<CatchBlock>,
  pub finally: Option<Vec<Node<Stmt>>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WithStmt {
  pub object: Node<Expr>,
  pub body: Node<Stmt>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncDeclStmt {
  pub func: Func,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stmt {
  Empty(EmptyStmt),
  Block(BlockStmt),
  VarDecl(VarDeclStmt),
  Expr(ExprStmt),
  If(IfStmt),
  While(WhileStmt),
  DoWhile(DoWhileStmt),
  ForTriple(ForTripleStmt),
  Return(ReturnStmt),
  Throw(ThrowStmt),
  Break(BreakStmt),
  Continue(ContinueStmt),
  Try(TryStmt),
  With(WithStmt),
  FuncDecl(FuncDeclStmt),
}
