//! The tree simplifier: constant folding, dead-branch elimination, and sound
//! inlining of calls to locally-visible function literals.
//!
//! The walk rebuilds every node bottom-up. Statement lists are produced
//! through a [`StmtBuf`], which also tracks a conservative join of the
//! effects of everything emitted so far plus the partially-built current
//! statement; the inliner consults it to decide whether a collapsed call
//! body may be spliced into the enclosing list or must stay wrapped in a
//! statement-sequence expression.

mod inline;

use crate::accumulate::effects_of_expr;
use crate::accumulate::effects_of_stmts;
use crate::lattice::effects::Effects;
use crate::lattice::eval_times::EvalTimes;
use crate::lattice::flow::ControlFlow;
use crate::names::NameSupply;
use crate::names::ScopeId;
use ahash::HashMap;
use ahash::HashSet;
use ast_js::build;
use ast_js::expr::Expr;
use ast_js::expr::LitArrElem;
use ast_js::expr::LitBoolExpr;
use ast_js::expr::LitNumExpr;
use ast_js::expr::LitStrExpr;
use ast_js::expr::ObjMember;
use ast_js::func::Func;
use ast_js::node::Node;
use ast_js::num::JsNumber;
use ast_js::operator::OperatorName;
use ast_js::stmt::ForInit;
use ast_js::stmt::Stmt;
use ast_js::stmt::VarDeclStmt;
use ast_js::stx::TopLevel;
use ast_js::vars::all_names;
use ast_js::vars::func_bound_names;
use ast_js::vars::hoisted_names;
use itertools::Itertools;

/// Simplifies a whole program. Pure tree-to-tree; the input is consumed and
/// an equivalent, smaller tree is returned.
pub fn simplify(top: Node<TopLevel>) -> Node<TopLevel> {
  let Node { loc, stx } = top;
  let TopLevel { body } = *stx;
  let mut cx = SimplifyCx::new(all_names(&body));
  let (body, _) = cx.simplify_stmts(body, EvalTimes::Once);
  Node::new(loc, TopLevel { body })
}

/// Convenience entry for simplifying a bare statement list as a program body.
pub fn simplify_stmts(stmts: Vec<Node<Stmt>>) -> Vec<Node<Stmt>> {
  let mut cx = SimplifyCx::new(all_names(&stmts));
  let (stmts, _) = cx.simplify_stmts(stmts, EvalTimes::Once);
  stmts
}

/// Output buffer for one statement list, paired with the join of the effects
/// of the partially-simplified *current* statement (reset at each statement
/// boundary; statements already emitted stay ahead of any splice and so
/// never constrain one). The join is deliberately conservative: noting an
/// effect twice is harmless since it is idempotent, while missing one would
/// let the inliner hoist code across it.
pub(crate) struct StmtBuf {
  pub(crate) stmts: Vec<Node<Stmt>>,
  pub(crate) effects: Effects,
}

impl StmtBuf {
  fn new() -> Self {
    Self {
      stmts: Vec::new(),
      effects: Effects::bottom(),
    }
  }

  fn push(&mut self, stmt: Node<Stmt>) {
    self
      .effects
      .lub_into(&effects_of_stmts(std::slice::from_ref(&stmt)));
    self.stmts.push(stmt);
  }
}

/// State threaded through one simplification pass.
pub(crate) struct SimplifyCx {
  pub(crate) names: NameSupply,
  pub(crate) scope: ScopeId,
  /// Identifier name to already-simplified replacement expression.
  pub(crate) subst: HashMap<String, Node<Expr>>,
  /// Inside a `with` body identifiers resolve dynamically, so substitution
  /// and inlining are suspended.
  pub(crate) in_with: bool,
}

impl SimplifyCx {
  fn new(program_names: impl IntoIterator<Item = String>) -> Self {
    let names = NameSupply::new(program_names);
    let scope = names.root();
    Self {
      names,
      scope,
      subst: HashMap::default(),
      in_with: false,
    }
  }

  pub(crate) fn simplify_stmts(
    &mut self,
    stmts: Vec<Node<Stmt>>,
    eval: EvalTimes,
  ) -> (Vec<Node<Stmt>>, ControlFlow) {
    let mut buf = StmtBuf::new();
    let mut flow = ControlFlow::FallsThrough;
    for stmt in stmts {
      buf.effects = Effects::bottom();
      if flow == ControlFlow::Diverges {
        self.retain_hoisted_decls(stmt, eval, &mut buf);
        continue;
      }
      flow = flow.seq(self.simplify_stmt_into(stmt, eval, &mut buf));
    }
    (buf.stmts, flow)
  }

  /// Replaces an unreachable or untaken statement with what hoisting still
  /// makes observable: its `var` bindings (as a bare declaration) and any
  /// function declarations, which bind and initialize at function entry.
  /// Nothing else from the statement may survive; its other side effects
  /// never run.
  fn retain_hoisted_decls(&mut self, stmt: Node<Stmt>, eval: EvalTimes, buf: &mut StmtBuf) {
    let names = hoisted_names(std::slice::from_ref(&stmt));
    let mut funcs = Vec::new();
    extract_func_decls(stmt, &mut funcs);
    let func_names: HashSet<String> = funcs
      .iter()
      .filter_map(|stmt| match stmt.stx.as_ref() {
        Stmt::FuncDecl(decl) => decl.func.name.as_ref().map(|name| name.stx.name.clone()),
        _ => None,
      })
      .collect();
    let names: Vec<String> = names
      .into_iter()
      .filter(|name| !func_names.contains(name))
      .sorted()
      .collect();
    if !names.is_empty() {
      buf.push(build::var_decl(
        names.iter().map(|name| (name.as_str(), None)).collect(),
      ));
    }
    for func in funcs {
      self.simplify_stmt_into(func, eval, buf);
    }
  }

  /// Simplifies one statement position into its own buffer, then re-packages
  /// the result as zero statements, one, or a block.
  fn simplify_substmt(
    &mut self,
    stmt: Node<Stmt>,
    eval: EvalTimes,
  ) -> (Option<Node<Stmt>>, ControlFlow) {
    let mut buf = StmtBuf::new();
    let flow = self.simplify_stmt_into(stmt, eval, &mut buf);
    let stmt = match buf.stmts.len() {
      0 => None,
      1 => buf.stmts.into_iter().next(),
      _ => Some(build::block(buf.stmts)),
    };
    (stmt, flow)
  }

  fn simplify_declarators(
    &mut self,
    decl: VarDeclStmt,
    eval: EvalTimes,
    buf: &mut StmtBuf,
  ) -> VarDeclStmt {
    VarDeclStmt {
      declarators: decl
        .declarators
        .into_iter()
        .map(|mut declarator| {
          declarator.initializer = declarator
            .initializer
            .map(|init| self.simplify_expr(init, eval, true, buf));
          // The declarator assigns as soon as its initializer finishes, so
          // later initializers in the same declaration run after this write.
          if declarator.initializer.is_some() {
            buf
              .effects
              .lub_into(&Effects::var_write(&declarator.name.stx.name));
          }
          declarator
        })
        .collect(),
    }
  }

  fn simplify_stmt_into(
    &mut self,
    stmt: Node<Stmt>,
    eval: EvalTimes,
    buf: &mut StmtBuf,
  ) -> ControlFlow {
    let Node { loc, stx } = stmt;
    match *stx {
      Stmt::Empty(_) => ControlFlow::FallsThrough,
      Stmt::Block(block) => {
        let (body, flow) = self.simplify_stmts(block.body, eval);
        if body.is_empty() {
          return flow;
        }
        // A block holding a function declaration stays a block: flattening
        // would widen the declaration's (Annex B) scope.
        if body.iter().any(|stmt| matches!(stmt.stx.as_ref(), Stmt::FuncDecl(_))) {
          buf.push(Node::new(loc, Stmt::Block(ast_js::stmt::BlockStmt { body })));
        } else {
          for stmt in body {
            buf.push(stmt);
          }
        }
        flow
      }
      Stmt::VarDecl(decl) => {
        let decl = self.simplify_declarators(decl, eval, buf);
        buf.push(Node::new(loc, Stmt::VarDecl(decl)));
        ControlFlow::FallsThrough
      }
      Stmt::Expr(expr_stmt) => {
        let expr = self.simplify_expr(expr_stmt.expr, eval, true, buf);
        let Node { loc, stx } = expr;
        match *stx {
          // An unwrapped inlined body in statement position: keep its
          // statements in place and its value only if discarding it would
          // lose effects.
          Expr::StmtSeq(seq) => {
            for stmt in seq.stmts {
              buf.push(stmt);
            }
            if let Some(value) = seq.value {
              if !effects_of_expr(&value).is_read_only() {
                buf.push(build::expr_stmt(value));
              }
            }
          }
          stx => {
            let expr = Node::new(loc, stx);
            if !effects_of_expr(&expr).is_read_only() {
              buf.push(Node::new(loc, Stmt::Expr(ast_js::stmt::ExprStmt { expr })));
            }
          }
        }
        ControlFlow::FallsThrough
      }
      Stmt::If(if_stmt) => {
        let test = self.simplify_expr(if_stmt.test, eval, true, buf);
        if let Some(truthy) = const_truthiness(test.stx.as_ref()) {
          let (taken, dropped) = if truthy {
            (Some(if_stmt.consequent), if_stmt.alternate)
          } else {
            (if_stmt.alternate, Some(if_stmt.consequent))
          };
          if let Some(dropped) = dropped {
            self.retain_hoisted_decls(dropped, eval, buf);
          }
          return match taken {
            Some(taken) => self.simplify_stmt_into(taken, eval, buf),
            None => ControlFlow::FallsThrough,
          };
        }
        let (cons, cons_flow) = self.simplify_substmt(if_stmt.consequent, eval.branched());
        let (alt, alt_flow) = match if_stmt.alternate {
          Some(alt) => self.simplify_substmt(alt, eval.branched()),
          None => (None, ControlFlow::FallsThrough),
        };
        match (cons, alt) {
          (None, None) => {
            if !effects_of_expr(&test).is_read_only() {
              buf.push(build::expr_stmt(test));
            }
            ControlFlow::FallsThrough
          }
          (None, Some(alt)) => {
            let test = build::unary(OperatorName::LogicalNot, test);
            buf.push(Node::new(
              loc,
              Stmt::If(ast_js::stmt::IfStmt {
                test,
                consequent: alt,
                alternate: None,
              }),
            ));
            cons_flow.lub(alt_flow)
          }
          (Some(cons), alt) => {
            buf.push(Node::new(
              loc,
              Stmt::If(ast_js::stmt::IfStmt {
                test,
                consequent: cons,
                alternate: alt,
              }),
            ));
            cons_flow.lub(alt_flow)
          }
        }
      }
      Stmt::While(while_stmt) => {
        let condition = self.simplify_expr(while_stmt.condition, eval.looped(), false, buf);
        if const_truthiness(condition.stx.as_ref()) == Some(false) {
          self.retain_hoisted_decls(while_stmt.body, eval, buf);
          return ControlFlow::FallsThrough;
        }
        let (body, _) = self.simplify_substmt(while_stmt.body, eval.branched().looped());
        buf.push(Node::new(
          loc,
          Stmt::While(ast_js::stmt::WhileStmt {
            condition,
            body: body.unwrap_or_else(build::empty),
          }),
        ));
        ControlFlow::Unknown
      }
      Stmt::DoWhile(do_stmt) => {
        let (body, _) = self.simplify_substmt(do_stmt.body, eval.looped());
        let condition = self.simplify_expr(do_stmt.condition, eval.looped(), false, buf);
        buf.push(Node::new(
          loc,
          Stmt::DoWhile(ast_js::stmt::DoWhileStmt {
            body: body.unwrap_or_else(build::empty),
            condition,
          }),
        ));
        ControlFlow::Unknown
      }
      Stmt::ForTriple(for_stmt) => {
        let init = match for_stmt.init {
          ForInit::None => ForInit::None,
          ForInit::Expr(expr) => ForInit::Expr(self.simplify_expr(expr, eval, true, buf)),
          ForInit::Decl(decl) => ForInit::Decl(self.simplify_declarators(decl, eval, buf)),
        };
        let cond = for_stmt
          .cond
          .map(|cond| self.simplify_expr(cond, eval.looped(), false, buf));
        let post_eval = eval.branched().looped();
        let post = for_stmt
          .post
          .map(|post| self.simplify_expr(post, post_eval, false, buf));
        let (body, _) = self.simplify_substmt(for_stmt.body, eval.branched().looped());
        buf.push(Node::new(
          loc,
          Stmt::ForTriple(ast_js::stmt::ForTripleStmt {
            init,
            cond,
            post,
            body: body.unwrap_or_else(build::empty),
          }),
        ));
        ControlFlow::Unknown
      }
      Stmt::Return(ret) => {
        let value = ret
          .value
          .map(|value| self.simplify_expr(value, eval, true, buf));
        buf.push(Node::new(loc, Stmt::Return(ast_js::stmt::ReturnStmt { value })));
        ControlFlow::Diverges
      }
      Stmt::Throw(throw_stmt) => {
        let value = self.simplify_expr(throw_stmt.value, eval, true, buf);
        buf.push(Node::new(loc, Stmt::Throw(ast_js::stmt::ThrowStmt { value })));
        ControlFlow::Diverges
      }
      Stmt::Break(stx) => {
        buf.push(Node::new(loc, Stmt::Break(stx)));
        ControlFlow::Unknown
      }
      Stmt::Continue(stx) => {
        buf.push(Node::new(loc, Stmt::Continue(stx)));
        ControlFlow::Unknown
      }
      Stmt::Try(try_stmt) => {
        let (wrapped, _) = self.simplify_stmts(try_stmt.wrapped, eval);
        if wrapped.is_empty() {
          // Nothing can throw; the catch is dead and the finally always runs.
          if let Some(catch) = try_stmt.catch {
            for stmt in catch.body {
              self.retain_hoisted_decls(stmt, eval, buf);
            }
          }
          if let Some(finally) = try_stmt.finally {
            let (finally, flow) = self.simplify_stmts(finally, eval);
            for stmt in finally {
              buf.push(stmt);
            }
            return flow;
          }
          return ControlFlow::FallsThrough;
        }
        let catch = try_stmt.catch.map(|catch| {
          // The catch parameter shadows any substitution of the same name.
          let shadowed = catch
            .parameter
            .as_ref()
            .and_then(|param| self.subst.remove_entry(&param.stx.name));
          let (body, _) = self.simplify_stmts(catch.body, eval.branched());
          if let Some((name, repl)) = shadowed {
            self.subst.insert(name, repl);
          }
          ast_js::stmt::CatchBlock {
            parameter: catch.parameter,
            body,
          }
        });
        let finally = try_stmt
          .finally
          .map(|finally| self.simplify_stmts(finally, eval).0);
        buf.push(Node::new(
          loc,
          Stmt::Try(ast_js::stmt::TryStmt {
            wrapped,
            catch,
            finally,
          }),
        ));
        ControlFlow::Unknown
      }
      Stmt::With(with_stmt) => {
        let object = self.simplify_expr(with_stmt.object, eval, true, buf);
        let was_in_with = self.in_with;
        self.in_with = true;
        let (body, _) = self.simplify_substmt(with_stmt.body, eval);
        self.in_with = was_in_with;
        buf.push(Node::new(
          loc,
          Stmt::With(ast_js::stmt::WithStmt {
            object,
            body: body.unwrap_or_else(build::empty),
          }),
        ));
        ControlFlow::Unknown
      }
      Stmt::FuncDecl(decl) => {
        let func = self.simplify_func(decl.func);
        buf.push(Node::new(
          loc,
          Stmt::FuncDecl(ast_js::stmt::FuncDeclStmt { func }),
        ));
        ControlFlow::FallsThrough
      }
    }
  }

  /// Simplifies a function's body in a child scope, with every name the
  /// function binds shadowing the outer substitution. A trailing bare
  /// `return` falls through anyway and is dropped.
  pub(crate) fn simplify_func(&mut self, func: Func) -> Func {
    let bound = func_bound_names(&func);
    let shadowed: Vec<(String, Node<Expr>)> = bound
      .iter()
      .filter_map(|name| self.subst.remove_entry(name))
      .collect();
    let outer_scope = self.scope;
    self.scope = self.names.fork(outer_scope);
    let (mut body, _) = self.simplify_stmts(func.body, EvalTimes::Once);
    if let Some(last) = body.last() {
      if matches!(last.stx.as_ref(), Stmt::Return(ret) if ret.value.is_none()) {
        body.pop();
      }
    }
    self.scope = outer_scope;
    for (name, repl) in shadowed {
      self.subst.insert(name, repl);
    }
    Func {
      name: func.name,
      parameters: func.parameters,
      body,
    }
  }

  /// Simplifies one expression. `hoist` is true only when this position is
  /// evaluated unconditionally, exactly once, as part of the statement
  /// currently being built; only then may an inlined body's statements be
  /// spliced into `buf` (subject to the commutation check against
  /// `buf.effects`).
  pub(crate) fn simplify_expr(
    &mut self,
    expr: Node<Expr>,
    eval: EvalTimes,
    hoist: bool,
    buf: &mut StmtBuf,
  ) -> Node<Expr> {
    let out = self.simplify_expr_inner(expr, eval, hoist, buf);
    // Everything simplified so far in this statement is "already evaluated"
    // from the perspective of later hoisting decisions.
    buf.effects.lub_into(&effects_of_expr(&out));
    out
  }

  fn simplify_expr_inner(
    &mut self,
    expr: Node<Expr>,
    eval: EvalTimes,
    hoist: bool,
    buf: &mut StmtBuf,
  ) -> Node<Expr> {
    let Node { loc, stx } = expr;
    match *stx {
      stx @ (Expr::LitNull(_) | Expr::LitBool(_) | Expr::LitNum(_) | Expr::LitStr(_)) => {
        Node::new(loc, stx)
      }
      Expr::LitArr(arr) => Node::new(
        loc,
        Expr::LitArr(ast_js::expr::LitArrExpr {
          elements: arr
            .elements
            .into_iter()
            .map(|elem| match elem {
              LitArrElem::Single(expr) => {
                LitArrElem::Single(self.simplify_expr(expr, eval, hoist, buf))
              }
              LitArrElem::Empty => LitArrElem::Empty,
            })
            .collect(),
        }),
      ),
      Expr::LitObj(obj) => Node::new(
        loc,
        Expr::LitObj(ast_js::expr::LitObjExpr {
          members: obj
            .members
            .into_iter()
            .map(|member| ObjMember {
              key: member.key,
              value: self.simplify_expr(member.value, eval, hoist, buf),
            })
            .collect(),
        }),
      ),
      Expr::Id(id) => {
        if !self.in_with {
          if let Some(repl) = self.subst.get(&id.name) {
            return repl.clone();
          }
        }
        Node::new(loc, Expr::Id(id))
      }
      Expr::This(stx) => Node::new(loc, Expr::This(stx)),
      Expr::Unary(unary) => {
        let argument = self.simplify_expr(unary.argument, eval, hoist, buf);
        if let Some(folded) = fold_unary(unary.operator, argument.stx.as_ref()) {
          return Node::new(loc, folded);
        }
        Node::new(
          loc,
          Expr::Unary(ast_js::expr::UnaryExpr {
            operator: unary.operator,
            argument,
          }),
        )
      }
      Expr::Binary(bin) => {
        let left = self.simplify_expr(bin.left, eval, hoist, buf);
        if bin.operator.short_circuits() {
          if let Some(truthy) = const_truthiness(left.stx.as_ref()) {
            let take_right = match bin.operator {
              OperatorName::LogicalAnd => truthy,
              OperatorName::LogicalOr => !truthy,
              _ => unreachable!("operator does not short-circuit"),
            };
            return if take_right {
              self.simplify_expr(bin.right, eval, hoist, buf)
            } else {
              left
            };
          }
          let right = self.simplify_expr(bin.right, eval.branched(), false, buf);
          return Node::new(
            loc,
            Expr::Binary(ast_js::expr::BinaryExpr {
              operator: bin.operator,
              left,
              right,
            }),
          );
        }
        let right = self.simplify_expr(bin.right, eval, hoist, buf);
        if let Some(folded) = fold_binary(bin.operator, left.stx.as_ref(), right.stx.as_ref()) {
          return Node::new(loc, folded);
        }
        Node::new(
          loc,
          Expr::Binary(ast_js::expr::BinaryExpr {
            operator: bin.operator,
            left,
            right,
          }),
        )
      }
      Expr::Cond(cond) => {
        let test = self.simplify_expr(cond.test, eval, hoist, buf);
        if let Some(truthy) = const_truthiness(test.stx.as_ref()) {
          let taken = if truthy { cond.consequent } else { cond.alternate };
          return self.simplify_expr(taken, eval, hoist, buf);
        }
        let consequent = self.simplify_expr(cond.consequent, eval.branched(), false, buf);
        let alternate = self.simplify_expr(cond.alternate, eval.branched(), false, buf);
        Node::new(
          loc,
          Expr::Cond(ast_js::expr::CondExpr {
            test,
            consequent,
            alternate,
          }),
        )
      }
      Expr::Assign(assign) => {
        let target_loc = assign.target.loc;
        let target = match *assign.target.stx {
          Expr::Id(mut id) => {
            // Substituting into a target position is only meaningful when
            // the replacement is itself an identifier (a rename).
            if !self.in_with {
              if let Some(repl) = self.subst.get(&id.name) {
                if let Some(name) = repl.stx.as_identifier() {
                  id.name = name.to_string();
                }
              }
            }
            Node::new(target_loc, Expr::Id(id))
          }
          stx => self.simplify_expr(Node::new(target_loc, stx), eval, hoist, buf),
        };
        let value = self.simplify_expr(assign.value, eval, hoist, buf);
        Node::new(loc, Expr::Assign(ast_js::expr::AssignExpr { target, value }))
      }
      Expr::Call(call) => {
        let callee = self.simplify_expr(call.callee, eval, hoist, buf);
        let callee_loc = callee.loc;
        match *callee.stx {
          Expr::Func(func) => {
            match inline::try_inline(self, eval, hoist, func, call.arguments, loc, buf) {
              Ok(expr) => expr,
              Err((func, arguments)) => {
                let arguments = arguments
                  .into_iter()
                  .map(|arg| self.simplify_expr(arg, eval, hoist, buf))
                  .collect();
                Node::new(
                  loc,
                  Expr::Call(ast_js::expr::CallExpr {
                    callee: Node::new(callee_loc, Expr::Func(func)),
                    arguments,
                  }),
                )
              }
            }
          }
          stx => {
            let arguments = call
              .arguments
              .into_iter()
              .map(|arg| self.simplify_expr(arg, eval, hoist, buf))
              .collect();
            Node::new(
              loc,
              Expr::Call(ast_js::expr::CallExpr {
                callee: Node::new(callee_loc, stx),
                arguments,
              }),
            )
          }
        }
      }
      Expr::Member(member) => {
        let object = self.simplify_expr(member.object, eval, hoist, buf);
        Node::new(
          loc,
          Expr::Member(ast_js::expr::MemberExpr {
            object,
            member: member.member,
          }),
        )
      }
      Expr::ComputedMember(member) => {
        let object = self.simplify_expr(member.object, eval, hoist, buf);
        let key = self.simplify_expr(member.member, eval, hoist, buf);
        Node::new(
          loc,
          Expr::ComputedMember(ast_js::expr::ComputedMemberExpr {
            object,
            member: key,
          }),
        )
      }
      Expr::Func(func_expr) => Node::new(
        loc,
        Expr::Func(ast_js::expr::FuncExpr {
          func: self.simplify_func(func_expr.func),
        }),
      ),
      Expr::StmtSeq(seq) => {
        let (stmts, _) = self.simplify_stmts(seq.stmts, eval);
        if stmts.is_empty() {
          return match seq.value {
            Some(value) => self.simplify_expr(value, eval, hoist, buf),
            None => void_0(),
          };
        }
        let fx = effects_of_stmts(&stmts);
        if hoist && fx.commutes_with(&buf.effects) {
          for stmt in stmts {
            buf.push(stmt);
          }
          return match seq.value {
            Some(value) => self.simplify_expr(value, eval, hoist, buf),
            None => void_0(),
          };
        }
        let value = seq
          .value
          .map(|value| self.simplify_expr(value, eval, false, buf));
        Node::new(loc, Expr::StmtSeq(ast_js::expr::StmtSeqExpr { stmts, value }))
      }
    }
  }
}

/// The canonical `undefined` spelling.
pub(crate) fn void_0() -> Node<Expr> {
  build::unary(OperatorName::Void, build::num(0.0))
}

/// Pulls the function declarations for the current function scope out of a
/// statement, at any nesting depth short of another function body. The rest
/// of the statement is discarded.
fn extract_func_decls(stmt: Node<Stmt>, out: &mut Vec<Node<Stmt>>) {
  let Node { loc, stx } = stmt;
  match *stx {
    Stmt::FuncDecl(decl) => out.push(Node::new(loc, Stmt::FuncDecl(decl))),
    Stmt::Block(block) => {
      for stmt in block.body {
        extract_func_decls(stmt, out);
      }
    }
    Stmt::If(if_stmt) => {
      extract_func_decls(if_stmt.consequent, out);
      if let Some(alt) = if_stmt.alternate {
        extract_func_decls(alt, out);
      }
    }
    Stmt::While(while_stmt) => extract_func_decls(while_stmt.body, out),
    Stmt::DoWhile(do_stmt) => extract_func_decls(do_stmt.body, out),
    Stmt::ForTriple(for_stmt) => extract_func_decls(for_stmt.body, out),
    Stmt::Try(try_stmt) => {
      for stmt in try_stmt.wrapped {
        extract_func_decls(stmt, out);
      }
      if let Some(catch) = try_stmt.catch {
        for stmt in catch.body {
          extract_func_decls(stmt, out);
        }
      }
      if let Some(finally) = try_stmt.finally {
        for stmt in finally {
          extract_func_decls(stmt, out);
        }
      }
    }
    Stmt::With(with_stmt) => extract_func_decls(with_stmt.body, out),
    Stmt::Empty(_)
    | Stmt::VarDecl(_)
    | Stmt::Expr(_)
    | Stmt::Return(_)
    | Stmt::Throw(_)
    | Stmt::Break(_)
    | Stmt::Continue(_) => {}
  }
}

fn const_truthiness(expr: &Expr) -> Option<bool> {
  match expr {
    Expr::LitNull(_) => Some(false),
    Expr::LitBool(b) => Some(b.value),
    Expr::LitNum(n) => Some(n.value.0 != 0.0 && !n.value.0.is_nan()),
    Expr::LitStr(s) => Some(!s.value.is_empty()),
    _ => None,
  }
}

fn lit_num(value: f64) -> Expr {
  Expr::LitNum(LitNumExpr {
    value: JsNumber(value),
  })
}

fn lit_bool(value: bool) -> Expr {
  Expr::LitBool(LitBoolExpr { value })
}

fn lit_str(value: String) -> Expr {
  Expr::LitStr(LitStrExpr { value })
}

fn as_num(expr: &Expr) -> Option<f64> {
  match expr {
    Expr::LitNum(n) => Some(n.value.0),
    _ => None,
  }
}

// ToInt32, less the bigint and object cases that cannot reach here.
fn to_int32(n: f64) -> i32 {
  let bits = to_uint32(n);
  bits as i32
}

fn to_uint32(n: f64) -> u32 {
  if !n.is_finite() || n == 0.0 {
    return 0;
  }
  const MODULUS: f64 = 4294967296.0;
  let mut r = n.trunc() % MODULUS;
  if r < 0.0 {
    r += MODULUS;
  }
  r as u32
}

fn fold_unary(operator: OperatorName, argument: &Expr) -> Option<Expr> {
  match operator {
    OperatorName::LogicalNot => const_truthiness(argument).map(|t| lit_bool(!t)),
    OperatorName::UnaryNegation => as_num(argument).map(|n| lit_num(-n)),
    OperatorName::UnaryPlus => as_num(argument).map(lit_num),
    OperatorName::BitwiseNot => as_num(argument).map(|n| lit_num(!to_int32(n) as f64)),
    OperatorName::TypeOf => match argument {
      Expr::LitNum(_) => Some(lit_str("number".to_string())),
      Expr::LitStr(_) => Some(lit_str("string".to_string())),
      Expr::LitBool(_) => Some(lit_str("boolean".to_string())),
      Expr::LitNull(_) => Some(lit_str("object".to_string())),
      _ => None,
    },
    _ => None,
  }
}

fn fold_binary(operator: OperatorName, left: &Expr, right: &Expr) -> Option<Expr> {
  if let (Expr::LitStr(l), Expr::LitStr(r)) = (left, right) {
    return match operator {
      OperatorName::Addition => Some(lit_str(format!("{}{}", l.value, r.value))),
      OperatorName::Equality | OperatorName::StrictEquality => Some(lit_bool(l.value == r.value)),
      OperatorName::Inequality | OperatorName::StrictInequality => {
        Some(lit_bool(l.value != r.value))
      }
      _ => None,
    };
  }
  if let (Expr::LitBool(l), Expr::LitBool(r)) = (left, right) {
    return match operator {
      OperatorName::Equality | OperatorName::StrictEquality => Some(lit_bool(l.value == r.value)),
      OperatorName::Inequality | OperatorName::StrictInequality => {
        Some(lit_bool(l.value != r.value))
      }
      _ => None,
    };
  }
  if let (Expr::LitNull(_), Expr::LitNull(_)) = (left, right) {
    return match operator {
      OperatorName::Equality | OperatorName::StrictEquality => Some(lit_bool(true)),
      OperatorName::Inequality | OperatorName::StrictInequality => Some(lit_bool(false)),
      _ => None,
    };
  }
  let l = as_num(left)?;
  let r = as_num(right)?;
  Some(match operator {
    OperatorName::Addition => lit_num(l + r),
    OperatorName::Subtraction => lit_num(l - r),
    OperatorName::Multiplication => lit_num(l * r),
    OperatorName::Division => lit_num(l / r),
    OperatorName::Remainder => lit_num(l % r),
    OperatorName::Exponentiation => lit_num(l.powf(r)),
    OperatorName::BitwiseAnd => lit_num((to_int32(l) & to_int32(r)) as f64),
    OperatorName::BitwiseOr => lit_num((to_int32(l) | to_int32(r)) as f64),
    OperatorName::BitwiseXor => lit_num((to_int32(l) ^ to_int32(r)) as f64),
    OperatorName::BitwiseLeftShift => lit_num((to_int32(l) << (to_uint32(r) & 31)) as f64),
    OperatorName::BitwiseRightShift => lit_num((to_int32(l) >> (to_uint32(r) & 31)) as f64),
    OperatorName::BitwiseUnsignedRightShift => {
      lit_num((to_uint32(l) >> (to_uint32(r) & 31)) as f64)
    }
    OperatorName::LessThan => lit_bool(l < r),
    OperatorName::LessThanOrEqual => lit_bool(l <= r),
    OperatorName::GreaterThan => lit_bool(l > r),
    OperatorName::GreaterThanOrEqual => lit_bool(l >= r),
    // IEEE comparison, so NaN operands fold correctly here.
    OperatorName::Equality | OperatorName::StrictEquality => lit_bool(l == r),
    OperatorName::Inequality | OperatorName::StrictInequality => lit_bool(l != r),
    _ => return None,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use ast_js::build::*;

  fn simplified_expr(expr: Node<Expr>) -> Vec<Node<Stmt>> {
    simplify_stmts(vec![ret(Some(expr))])
  }

  #[test]
  fn folds_arithmetic() {
    let out = simplified_expr(binary(
      OperatorName::Addition,
      binary(OperatorName::Multiplication, num(6.0), num(7.0)),
      num(1.0),
    ));
    assert_eq!(out, vec![ret(Some(num(43.0)))]);
  }

  #[test]
  fn folds_string_concat() {
    let out = simplified_expr(binary(OperatorName::Addition, str_lit("a"), str_lit("b")));
    assert_eq!(out, vec![ret(Some(str_lit("ab")))]);
  }

  #[test]
  fn folds_truthiness() {
    let out = simplified_expr(cond(
      unary(OperatorName::LogicalNot, num(0.0)),
      id("a"),
      id("b"),
    ));
    assert_eq!(out, vec![ret(Some(id("a")))]);
  }

  #[test]
  fn short_circuit_selects_operand() {
    let out = simplified_expr(binary(OperatorName::LogicalAnd, bool_(false), call(id("f"), vec![])));
    assert_eq!(out, vec![ret(Some(bool_(false)))]);
    let out = simplified_expr(binary(OperatorName::LogicalOr, num(0.0), id("b")));
    assert_eq!(out, vec![ret(Some(id("b")))]);
  }

  #[test]
  fn drops_dead_branch_but_keeps_hoisted_names() {
    let out = simplify_stmts(vec![if_(
      bool_(false),
      block(vec![
        var_decl(vec![("kept", Some(num(1.0)))]),
        expr_stmt(call(id("f"), vec![])),
      ]),
      Some(expr_stmt(call(id("g"), vec![]))),
    )]);
    assert_eq!(out, vec![
      var_decl(vec![("kept", None)]),
      expr_stmt(call(id("g"), vec![])),
    ]);
  }

  #[test]
  fn dead_branch_with_func_decl_drops_sibling_effects() {
    // if (false) { f(); function g() {} } else h();
    // `g` survives hoisting; the call to `f` must not.
    let out = simplify_stmts(vec![if_(
      bool_(false),
      block(vec![
        expr_stmt(call(id("f"), vec![])),
        func_decl("g", &[], vec![]),
      ]),
      Some(expr_stmt(call(id("h"), vec![]))),
    )]);
    assert_eq!(out, vec![
      func_decl("g", &[], vec![]),
      expr_stmt(call(id("h"), vec![])),
    ]);
  }

  #[test]
  fn dead_branch_with_func_decl_still_keeps_var_names() {
    let out = simplify_stmts(vec![if_(
      bool_(false),
      block(vec![
        var_decl(vec![("kept", Some(call(id("f"), vec![])))]),
        func_decl("g", &[], vec![]),
      ]),
      None,
    )]);
    assert_eq!(out, vec![
      var_decl(vec![("kept", None)]),
      func_decl("g", &[], vec![]),
    ]);
  }

  #[test]
  fn drops_statements_after_return() {
    let out = simplify_stmts(vec![func_decl(
      "f",
      &[],
      vec![
        ret(Some(num(1.0))),
        expr_stmt(call(id("g"), vec![])),
        var_decl(vec![("a", Some(call(id("h"), vec![])))]),
      ],
    )]);
    assert_eq!(out, vec![func_decl("f", &[], vec![
      ret(Some(num(1.0))),
      var_decl(vec![("a", None)]),
    ])]);
  }

  #[test]
  fn drops_trailing_bare_return() {
    let out = simplify_stmts(vec![func_decl(
      "f",
      &[],
      vec![expr_stmt(call(id("g"), vec![])), ret(None)],
    )]);
    assert_eq!(out, vec![func_decl("f", &[], vec![expr_stmt(call(
      id("g"),
      vec![]
    ))])]);
  }

  #[test]
  fn drops_effect_free_statements() {
    let out = simplify_stmts(vec![
      expr_stmt(id("a")),
      expr_stmt(num(1.0)),
      expr_stmt(call(id("f"), vec![])),
    ]);
    assert_eq!(out, vec![expr_stmt(call(id("f"), vec![]))]);
  }

  #[test]
  fn flattens_blocks_without_func_decls() {
    let out = simplify_stmts(vec![block(vec![
      expr_stmt(call(id("f"), vec![])),
      block(vec![expr_stmt(call(id("g"), vec![]))]),
    ])]);
    assert_eq!(out, vec![
      expr_stmt(call(id("f"), vec![])),
      expr_stmt(call(id("g"), vec![])),
    ]);
    let kept = simplify_stmts(vec![block(vec![func_decl("f", &[], vec![])])]);
    assert_eq!(kept, vec![block(vec![func_decl("f", &[], vec![])])]);
  }

  #[test]
  fn empty_try_unwraps_finally() {
    let out = simplify_stmts(vec![try_(
      vec![],
      Some(("e", vec![expr_stmt(call(id("f"), vec![]))])),
      Some(vec![expr_stmt(call(id("g"), vec![]))]),
    )]);
    assert_eq!(out, vec![expr_stmt(call(id("g"), vec![]))]);
  }

  #[test]
  fn while_false_keeps_hoisted_names_only() {
    let out = simplify_stmts(vec![while_(
      bool_(false),
      block(vec![var_decl(vec![("a", Some(call(id("f"), vec![])))])]),
    )]);
    assert_eq!(out, vec![var_decl(vec![("a", None)])]);
  }

  #[test]
  fn empty_consequent_negates_test() {
    let out = simplify_stmts(vec![if_(
      id("c"),
      empty(),
      Some(expr_stmt(call(id("f"), vec![]))),
    )]);
    assert_eq!(out, vec![if_(
      unary(OperatorName::LogicalNot, id("c")),
      expr_stmt(call(id("f"), vec![])),
      None,
    )]);
  }
}
