use crate::check::CallCx;
use crate::lattice::effects::Effects;
use crate::lattice::eval_times::EvalTimes;
use crate::lattice::flow::ControlFlow;
use ahash::HashSet;
use ast_js::expr::Expr;
use ast_js::expr::LitArrElem;
use ast_js::node::Node;
use ast_js::stmt::ForInit;
use ast_js::stmt::Stmt;
use ast_js::vars::func_free_vars;

/// Running effect accumulator for one walk. The hidden set holds scope-local
/// names whose variable effects must not escape the current scope; reads and
/// writes of hidden names leave the accumulator untouched.
pub struct EffectsCx {
  hidden: HashSet<String>,
  pub effects: Effects,
}

impl Default for EffectsCx {
  fn default() -> Self {
    Self::new()
  }
}

impl EffectsCx {
  pub fn new() -> Self {
    Self {
      hidden: HashSet::default(),
      effects: Effects::bottom(),
    }
  }

  pub fn with_hidden(hidden: HashSet<String>) -> Self {
    Self {
      hidden,
      effects: Effects::bottom(),
    }
  }

  fn read_var(&mut self, name: &str) {
    if !self.hidden.contains(name) {
      self.effects.lub_into(&Effects::var_read(name));
    }
  }

  fn write_var(&mut self, name: &str) {
    if !self.hidden.contains(name) {
      self.effects.lub_into(&Effects::var_write(name));
    }
  }

  fn join(&mut self, other: &Effects) {
    self.effects.lub_into(other);
  }
}

/// Effects of a single expression in isolation.
pub fn effects_of_expr(expr: &Node<Expr>) -> Effects {
  let mut cx = EffectsCx::new();
  expr_effects(&mut cx, None, EvalTimes::Once, expr);
  cx.effects
}

/// Effects of a statement list in isolation.
pub fn effects_of_stmts(stmts: &[Node<Stmt>]) -> Effects {
  let mut cx = EffectsCx::new();
  stmts_effects(&mut cx, None, EvalTimes::Once, stmts);
  cx.effects
}

pub fn expr_effects(
  cx: &mut EffectsCx,
  mut call: Option<&mut CallCx>,
  eval: EvalTimes,
  expr: &Node<Expr>,
) {
  match expr.stx.as_ref() {
    Expr::LitNull(_) | Expr::LitBool(_) | Expr::LitNum(_) | Expr::LitStr(_) => {}
    Expr::LitArr(arr) => {
      for elem in arr.elements.iter() {
        if let LitArrElem::Single(expr) = elem {
          expr_effects(cx, call.as_deref_mut(), eval, expr);
        }
      }
    }
    Expr::LitObj(obj) => {
      for member in obj.members.iter() {
        expr_effects(cx, call.as_deref_mut(), eval, &member.value);
      }
    }
    Expr::Id(id) => {
      if let Some(call) = call.as_deref_mut() {
        if let Some(position) = call.param_position(&id.name) {
          call.on_param_read(position, eval, &cx.effects);
        }
      }
      cx.read_var(&id.name);
    }
    Expr::This(_) => {
      if let Some(call) = call.as_deref_mut() {
        call.on_this();
      }
    }
    Expr::Unary(unary) => expr_effects(cx, call, eval, &unary.argument),
    Expr::Binary(bin) => {
      expr_effects(cx, call.as_deref_mut(), eval, &bin.left);
      let right_eval = if bin.operator.short_circuits() {
        eval.branched()
      } else {
        eval
      };
      expr_effects(cx, call, right_eval, &bin.right);
    }
    Expr::Cond(cond) => {
      expr_effects(cx, call.as_deref_mut(), eval, &cond.test);
      expr_effects(cx, call.as_deref_mut(), eval.branched(), &cond.consequent);
      expr_effects(cx, call, eval.branched(), &cond.alternate);
    }
    Expr::Assign(assign) => match assign.target.stx.as_ref() {
      Expr::Id(id) => {
        expr_effects(cx, call.as_deref_mut(), eval, &assign.value);
        if let Some(call) = call.as_deref_mut() {
          if let Some(position) = call.param_position(&id.name) {
            call.on_param_write(position);
          }
        }
        cx.write_var(&id.name);
      }
      Expr::Member(member) => {
        expr_effects(cx, call.as_deref_mut(), eval, &member.object);
        expr_effects(cx, call, eval, &assign.value);
        cx.join(&Effects::heap_write());
        cx.join(&Effects::throwing());
      }
      Expr::ComputedMember(member) => {
        expr_effects(cx, call.as_deref_mut(), eval, &member.object);
        expr_effects(cx, call.as_deref_mut(), eval, &member.member);
        expr_effects(cx, call, eval, &assign.value);
        cx.join(&Effects::heap_write());
        cx.join(&Effects::throwing());
      }
      _ => unreachable!("invalid assignment target"),
    },
    Expr::Call(call_expr) => {
      expr_effects(cx, call.as_deref_mut(), eval, &call_expr.callee);
      for arg in call_expr.arguments.iter() {
        expr_effects(cx, call.as_deref_mut(), eval, arg);
      }
      // Unknown call target: unknown effect.
      cx.join(&Effects::top());
    }
    Expr::Member(member) => {
      expr_effects(cx, call, eval, &member.object);
      cx.join(&Effects::heap_read());
      cx.join(&Effects::throwing());
    }
    Expr::ComputedMember(member) => {
      expr_effects(cx, call.as_deref_mut(), eval, &member.object);
      expr_effects(cx, call, eval, &member.member);
      cx.join(&Effects::heap_read());
      cx.join(&Effects::throwing());
    }
    Expr::Func(func) => {
      // Defining a function has no effect, but a closure capturing a tracked
      // parameter voids the attempt's evaluation-count guarantees.
      if let Some(call) = call.as_deref_mut() {
        call.on_closure(&func_free_vars(&func.func));
      }
    }
    Expr::StmtSeq(seq) => {
      stmts_effects(cx, call.as_deref_mut(), eval, &seq.stmts);
      if let Some(value) = seq.value.as_ref() {
        expr_effects(cx, call, eval, value);
      }
    }
  }
}

pub fn stmts_effects(
  cx: &mut EffectsCx,
  mut call: Option<&mut CallCx>,
  eval: EvalTimes,
  stmts: &[Node<Stmt>],
) -> ControlFlow {
  let mut flow = ControlFlow::FallsThrough;
  for stmt in stmts {
    flow = flow.seq(stmt_effects(cx, call.as_deref_mut(), eval, stmt));
  }
  flow
}

pub fn stmt_effects(
  cx: &mut EffectsCx,
  mut call: Option<&mut CallCx>,
  eval: EvalTimes,
  stmt: &Node<Stmt>,
) -> ControlFlow {
  match stmt.stx.as_ref() {
    Stmt::Empty(_) => ControlFlow::FallsThrough,
    Stmt::Block(block) => stmts_effects(cx, call, eval, &block.body),
    Stmt::VarDecl(decl) => {
      for declarator in decl.declarators.iter() {
        if let Some(init) = declarator.initializer.as_ref() {
          expr_effects(cx, call.as_deref_mut(), eval, init);
          cx.write_var(&declarator.name.stx.name);
        }
      }
      ControlFlow::FallsThrough
    }
    Stmt::Expr(expr_stmt) => {
      expr_effects(cx, call, eval, &expr_stmt.expr);
      ControlFlow::FallsThrough
    }
    Stmt::If(if_stmt) => {
      expr_effects(cx, call.as_deref_mut(), eval, &if_stmt.test);
      let cons = stmt_effects(cx, call.as_deref_mut(), eval.branched(), &if_stmt.consequent);
      let alt = match if_stmt.alternate.as_ref() {
        Some(alt) => stmt_effects(cx, call, eval.branched(), alt),
        None => ControlFlow::FallsThrough,
      };
      cons.lub(alt)
    }
    Stmt::While(while_stmt) => {
      expr_effects(cx, call.as_deref_mut(), eval.looped(), &while_stmt.condition);
      stmt_effects(cx, call, eval.branched().looped(), &while_stmt.body);
      ControlFlow::Unknown
    }
    Stmt::DoWhile(do_stmt) => {
      stmt_effects(cx, call.as_deref_mut(), eval.looped(), &do_stmt.body);
      expr_effects(cx, call, eval.looped(), &do_stmt.condition);
      ControlFlow::Unknown
    }
    Stmt::ForTriple(for_stmt) => {
      match &for_stmt.init {
        ForInit::None => {}
        ForInit::Expr(expr) => expr_effects(cx, call.as_deref_mut(), eval, expr),
        ForInit::Decl(decl) => {
          for declarator in decl.declarators.iter() {
            if let Some(init) = declarator.initializer.as_ref() {
              expr_effects(cx, call.as_deref_mut(), eval, init);
              cx.write_var(&declarator.name.stx.name);
            }
          }
        }
      }
      if let Some(cond) = for_stmt.cond.as_ref() {
        expr_effects(cx, call.as_deref_mut(), eval.looped(), cond);
      }
      let body_eval = eval.branched().looped();
      if let Some(post) = for_stmt.post.as_ref() {
        expr_effects(cx, call.as_deref_mut(), body_eval, post);
      }
      stmt_effects(cx, call, body_eval, &for_stmt.body);
      ControlFlow::Unknown
    }
    Stmt::Return(ret) => {
      if let Some(value) = ret.value.as_ref() {
        expr_effects(cx, call, eval, value);
      }
      ControlFlow::Diverges
    }
    Stmt::Throw(throw_stmt) => {
      expr_effects(cx, call, eval, &throw_stmt.value);
      cx.join(&Effects::throwing());
      ControlFlow::Diverges
    }
    Stmt::Break(_) | Stmt::Continue(_) => ControlFlow::Unknown,
    Stmt::Try(try_stmt) => {
      stmts_effects(cx, call.as_deref_mut(), eval, &try_stmt.wrapped);
      if let Some(catch) = try_stmt.catch.as_ref() {
        let newly_hidden = match catch.parameter.as_ref() {
          Some(param) => cx.hidden.insert(param.stx.name.clone()),
          None => false,
        };
        stmts_effects(cx, call.as_deref_mut(), eval.branched(), &catch.body);
        if newly_hidden {
          if let Some(param) = catch.parameter.as_ref() {
            cx.hidden.remove(&param.stx.name);
          }
        }
      }
      if let Some(finally) = try_stmt.finally.as_ref() {
        stmts_effects(cx, call, eval, finally);
      }
      ControlFlow::Unknown
    }
    Stmt::With(with_stmt) => {
      expr_effects(cx, call.as_deref_mut(), eval, &with_stmt.object);
      // Identifiers inside the body resolve dynamically.
      cx.join(&Effects::top());
      stmt_effects(cx, call, eval, &with_stmt.body);
      ControlFlow::Unknown
    }
    Stmt::FuncDecl(decl) => {
      if let Some(call) = call {
        call.on_closure(&func_free_vars(&decl.func));
      }
      ControlFlow::FallsThrough
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ast_js::build::*;
  use ast_js::operator::OperatorName;

  #[test]
  fn identifier_read_is_read_only() {
    let fx = effects_of_expr(&id("a"));
    assert!(fx.is_read_only());
    assert!(!fx.is_bottom());
  }

  #[test]
  fn call_is_top() {
    let fx = effects_of_expr(&call(id("f"), vec![]));
    assert!(fx.is_top());
  }

  #[test]
  fn assignment_writes_variable() {
    let fx = effects_of_expr(&assign(id("a"), num(1.0)));
    assert!(!fx.is_read_only());
    assert!(!fx.commutes_with(&Effects::var_read("a")));
    assert!(fx.commutes_with(&Effects::var_read("b")));
  }

  #[test]
  fn member_read_may_throw() {
    let fx = effects_of_expr(&member(id("a"), "b"));
    assert!(!fx.is_read_only());
    assert!(fx.commutes_with(&Effects::var_read("a")));
  }

  #[test]
  fn sequences_diverge_after_return() {
    let flow = {
      let mut cx = EffectsCx::new();
      stmts_effects(&mut cx, None, EvalTimes::Once, &[
        expr_stmt(assign(id("a"), num(1.0))),
        ret(None),
        expr_stmt(call(id("f"), vec![])),
      ])
    };
    assert_eq!(flow, ControlFlow::Diverges);
  }

  #[test]
  fn branch_flow_joins() {
    let both_return = if_(id("c"), ret(None), Some(ret(None)));
    let mut cx = EffectsCx::new();
    assert_eq!(
      stmt_effects(&mut cx, None, EvalTimes::Once, &both_return),
      ControlFlow::Diverges
    );
    let one_returns = if_(id("c"), ret(None), None);
    let mut cx = EffectsCx::new();
    assert_eq!(
      stmt_effects(&mut cx, None, EvalTimes::Once, &one_returns),
      ControlFlow::Unknown
    );
  }

  #[test]
  fn short_circuit_widens_right_operand() {
    // `a && p` under Once reads p under Opt; the checker must see that.
    use crate::check::{ArgInfo, CallCx};
    let mut call_cx = CallCx::new(vec![ArgInfo {
      placeholder: Some("p".to_string()),
      effects: Effects::top(),
    }]);
    let mut cx = EffectsCx::new();
    let expr = binary(OperatorName::LogicalAnd, id("a"), id("p"));
    expr_effects(&mut cx, Some(&mut call_cx), EvalTimes::Once, &expr);
    call_cx.finish();
    assert!(!call_cx.is_ok());
  }

  #[test]
  fn loop_bodies_widen_to_any() {
    use crate::check::{ArgInfo, CallCx};
    let mut call_cx = CallCx::new(vec![ArgInfo {
      placeholder: Some("p".to_string()),
      effects: Effects::var_read("x"),
    }]);
    let mut cx = EffectsCx::new();
    let stmt = while_(id("c"), expr_stmt(id("p")));
    stmt_effects(&mut cx, Some(&mut call_cx), EvalTimes::Once, &stmt);
    assert!(!call_cx.is_ok());
  }

  #[test]
  fn hidden_names_do_not_escape() {
    let mut hidden = ahash::HashSet::default();
    hidden.insert("t".to_string());
    let mut cx = EffectsCx::with_hidden(hidden);
    stmts_effects(&mut cx, None, EvalTimes::Once, &[
      var_decl(vec![("t", Some(num(1.0)))]),
      expr_stmt(id("t")),
    ]);
    assert!(cx.effects.is_bottom());
  }
}
