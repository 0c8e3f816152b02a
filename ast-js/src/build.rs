//! Terse constructors for building trees programmatically. There is no parser
//! in this workspace; drivers and tests assemble syntax with these.

use crate::expr::*;
use crate::func::Func;
use crate::loc::Loc;
use crate::node::Node;
use crate::num::JsNumber;
use crate::operator::OperatorName;
use crate::pat::IdPat;
use crate::stmt::*;
use crate::stx::TopLevel;

fn new<S>(stx: S) -> Node<S> {
  Node::new(Loc::UNKNOWN, stx)
}

pub fn num(value: f64) -> Node<Expr> {
  new(Expr::LitNum(LitNumExpr {
    value: JsNumber(value),
  }))
}

pub fn str_lit(value: &str) -> Node<Expr> {
  new(Expr::LitStr(LitStrExpr {
    value: value.to_string(),
  }))
}

pub fn bool_(value: bool) -> Node<Expr> {
  new(Expr::LitBool(LitBoolExpr { value }))
}

pub fn null() -> Node<Expr> {
  new(Expr::LitNull(LitNullExpr {}))
}

pub fn id(name: &str) -> Node<Expr> {
  new(Expr::Id(IdExpr {
    name: name.to_string(),
  }))
}

pub fn this() -> Node<Expr> {
  new(Expr::This(ThisExpr {}))
}

pub fn array(elements: Vec<Node<Expr>>) -> Node<Expr> {
  new(Expr::LitArr(LitArrExpr {
    elements: elements.into_iter().map(LitArrElem::Single).collect(),
  }))
}

pub fn object(members: Vec<(&str, Node<Expr>)>) -> Node<Expr> {
  new(Expr::LitObj(LitObjExpr {
    members: members
      .into_iter()
      .map(|(key, value)| ObjMember {
        key: key.to_string(),
        value,
      })
      .collect(),
  }))
}

pub fn unary(operator: OperatorName, argument: Node<Expr>) -> Node<Expr> {
  new(Expr::Unary(UnaryExpr { operator, argument }))
}

pub fn binary(operator: OperatorName, left: Node<Expr>, right: Node<Expr>) -> Node<Expr> {
  new(Expr::Binary(BinaryExpr {
    operator,
    left,
    right,
  }))
}

pub fn cond(test: Node<Expr>, consequent: Node<Expr>, alternate: Node<Expr>) -> Node<Expr> {
  new(Expr::Cond(CondExpr {
    test,
    consequent,
    alternate,
  }))
}

pub fn assign(target: Node<Expr>, value: Node<Expr>) -> Node<Expr> {
  new(Expr::Assign(AssignExpr { target, value }))
}

pub fn call(callee: Node<Expr>, arguments: Vec<Node<Expr>>) -> Node<Expr> {
  new(Expr::Call(CallExpr { callee, arguments }))
}

pub fn member(object: Node<Expr>, name: &str) -> Node<Expr> {
  new(Expr::Member(MemberExpr {
    object,
    member: name.to_string(),
  }))
}

pub fn index(object: Node<Expr>, member: Node<Expr>) -> Node<Expr> {
  new(Expr::ComputedMember(ComputedMemberExpr { object, member }))
}

pub fn id_pat(name: &str) -> Node<IdPat> {
  new(IdPat {
    name: name.to_string(),
  })
}

pub fn func(name: Option<&str>, params: &[&str], body: Vec<Node<Stmt>>) -> Func {
  Func {
    name: name.map(id_pat),
    parameters: params.iter().copied().map(id_pat).collect(),
    body,
  }
}

pub fn func_expr(name: Option<&str>, params: &[&str], body: Vec<Node<Stmt>>) -> Node<Expr> {
  new(Expr::Func(FuncExpr {
    func: func(name, params, body),
  }))
}

pub fn stmt_seq(stmts: Vec<Node<Stmt>>, value: Option<Node<Expr>>) -> Node<Expr> {
  new(Expr::StmtSeq(StmtSeqExpr { stmts, value }))
}

pub fn empty() -> Node<Stmt> {
  new(Stmt::Empty(EmptyStmt {}))
}

pub fn block(body: Vec<Node<Stmt>>) -> Node<Stmt> {
  new(Stmt::Block(BlockStmt { body }))
}

pub fn var_decl(declarators: Vec<(&str, Option<Node<Expr>>)>) -> Node<Stmt> {
  new(Stmt::VarDecl(VarDeclStmt {
    declarators: declarators
      .into_iter()
      .map(|(name, initializer)| VarDeclarator {
        name: id_pat(name),
        initializer,
      })
      .collect(),
  }))
}

pub fn expr_stmt(expr: Node<Expr>) -> Node<Stmt> {
  new(Stmt::Expr(ExprStmt { expr }))
}

pub fn if_(test: Node<Expr>, consequent: Node<Stmt>, alternate: Option<Node<Stmt>>) -> Node<Stmt> {
  new(Stmt::If(IfStmt {
    test,
    consequent,
    alternate,
  }))
}

pub fn while_(condition: Node<Expr>, body: Node<Stmt>) -> Node<Stmt> {
  new(Stmt::While(WhileStmt { condition, body }))
}

pub fn do_while(body: Node<Stmt>, condition: Node<Expr>) -> Node<Stmt> {
  new(Stmt::DoWhile(DoWhileStmt { body, condition }))
}

pub fn for_triple(
  init: ForInit,
  cond: Option<Node<Expr>>,
  post: Option<Node<Expr>>,
  body: Node<Stmt>,
) -> Node<Stmt> {
  new(Stmt::ForTriple(ForTripleStmt {
    init,
    cond,
    post,
    body,
  }))
}

pub fn ret(value: Option<Node<Expr>>) -> Node<Stmt> {
  new(Stmt::Return(ReturnStmt { value }))
}

pub fn throw_(value: Node<Expr>) -> Node<Stmt> {
  new(Stmt::Throw(ThrowStmt { value }))
}

pub fn break_() -> Node<Stmt> {
  new(Stmt::Break(BreakStmt {}))
}

pub fn continue_() -> Node<Stmt> {
  new(Stmt::Continue(ContinueStmt {}))
}

pub fn try_(
  wrapped: Vec<Node<Stmt>>,
  catch: Option<(&str, Vec<Node<Stmt>>)>,
  finally: Option<Vec<Node<Stmt>>>,
) -> Node<Stmt> {
  new(Stmt::Try(TryStmt {
    wrapped,
    catch: catch.map(|(param, body)| CatchBlock {
      parameter: Some(id_pat(param)),
      body,
    }),
    finally,
  }))
}

pub fn with_(object: Node<Expr>, body: Node<Stmt>) -> Node<Stmt> {
  new(Stmt::With(WithStmt { object, body }))
}

pub fn func_decl(name: &str, params: &[&str], body: Vec<Node<Stmt>>) -> Node<Stmt> {
  new(Stmt::FuncDecl(FuncDeclStmt {
    func: func(Some(name), params, body),
  }))
}

pub fn top_level(body: Vec<Node<Stmt>>) -> Node<TopLevel> {
  new(TopLevel { body })
}
