use crate::func::Func;
use crate::node::Node;
use crate::num::JsNumber;
use crate::operator::OperatorName;
use crate::stmt::Stmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LitNullExpr {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LitBoolExpr {
  pub value: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LitNumExpr {
  pub value: JsNumber,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LitStrExpr {
  pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LitArrElem {
  Single(Node<Expr>),
  Empty,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LitArrExpr {
  pub elements: Vec<LitArrElem>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjMember {
  pub key: String,
  pub value: Node<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LitObjExpr {
  pub members: Vec<ObjMember>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdExpr {
  pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThisExpr {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnaryExpr {
  pub operator: OperatorName,
  pub argument: Node<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryExpr {
  pub operator: OperatorName,
  pub left: Node<Expr>,
  pub right: Node<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CondExpr {
  pub test: Node<Expr>,
  pub consequent: Node<Expr>,
  pub alternate: Node<Expr>,
}

/// Plain `=` assignment. The target must be an `Id`, `Member` or
/// `ComputedMember` expression.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssignExpr {
  pub target: Node<Expr>,
  pub value: Node<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallExpr {
  pub callee: Node<Expr>,
  pub arguments: Vec<Node<Expr>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberExpr {
  pub object: Node<Expr>,
  pub member: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComputedMemberExpr {
  pub object: Node<Expr>,
  pub member: Node<Expr>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FuncExpr {
  pub func: Func,
}

/// Synthetic statement-sequence-with-value: evaluate `stmts`, then the whole
/// expression's value is `value` (or `undefined` if absent). Produced only by
/// the inliner when a collapsed call body cannot be hoisted into its
/// enclosing statement list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StmtSeqExpr {
  pub stmts: Vec<Node<Stmt>>,
  pub value: Option<Node<Expr>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
  LitNull(LitNullExpr),
  LitBool(LitBoolExpr),
  LitNum(LitNumExpr),
  LitStr(LitStrExpr),
  LitArr(LitArrExpr),
  LitObj(LitObjExpr),
  Id(IdExpr),
  This(ThisExpr),
  Unary(UnaryExpr),
  Binary(BinaryExpr),
  Cond(CondExpr),
  Assign(AssignExpr),
  Call(CallExpr),
  Member(MemberExpr),
  ComputedMember(ComputedMemberExpr),
  Func(FuncExpr),
  StmtSeq(StmtSeqExpr),
}

impl Expr {
  /// Whether this expression is a value: guaranteed free of side effects,
  /// unaffected by other expressions' side effects, and hence safely
  /// reorderable and duplicatable. Primitive literals and bare identifiers
  /// qualify; everything else is conservatively not a value (a function
  /// literal is side-effect free but duplicating it changes object identity).
  pub fn is_value(&self) -> bool {
    matches!(
      self,
      Expr::LitNull(_) | Expr::LitBool(_) | Expr::LitNum(_) | Expr::LitStr(_) | Expr::Id(_)
    )
  }

  pub fn as_identifier(&self) -> Option<&str> {
    match self {
      Expr::Id(id) => Some(id.name.as_str()),
      _ => None,
    }
  }
}
