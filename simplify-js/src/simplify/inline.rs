//! The two-pass call-collapsing protocol.
//!
//! Pass 1 freshens every local the candidate body binds, binds value
//! arguments directly (constant propagation) and the rest to fresh
//! placeholder names, simplifies the body, and drives the call safety
//! checker over the result. Pass 2 then either substitutes each remaining
//! argument for its placeholder (checker passed) or declares the arguments
//! as local variables in original order (checker failed), and the collapsed
//! statements are spliced into the enclosing buffer when their effects
//! commute with everything already evaluated there, or wrapped in a
//! statement-sequence expression when they do not.

use super::void_0;
use super::SimplifyCx;
use super::StmtBuf;
use crate::accumulate::effects_of_expr;
use crate::accumulate::effects_of_stmts;
use crate::accumulate::expr_effects;
use crate::accumulate::stmts_effects;
use crate::accumulate::EffectsCx;
use crate::check::ArgInfo;
use crate::check::CallCx;
use crate::lattice::effects::Effects;
use crate::lattice::eval_times::EvalTimes;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use ast_js::build;
use ast_js::expr::Expr;
use ast_js::expr::FuncExpr;
use ast_js::expr::LitArrElem;
use ast_js::expr::StmtSeqExpr;
use ast_js::func::Func;
use ast_js::loc::Loc;
use ast_js::node::Node;
use ast_js::stmt::ForInit;
use ast_js::stmt::Stmt;
use ast_js::vars::expr_free_vars;
use ast_js::vars::func_bound_names;
use ast_js::vars::func_free_vars;
use ast_js::vars::hoisted_names;
use itertools::Itertools;

/// Attempts to collapse a call to a function literal. `Err` returns
/// ownership of the untouched callee and arguments when the preconditions
/// are not met; the caller then simplifies the call parts independently.
pub(super) fn try_inline(
  cx: &mut SimplifyCx,
  eval: EvalTimes,
  hoist: bool,
  func: FuncExpr,
  arguments: Vec<Node<Expr>>,
  loc: Loc,
  buf: &mut StmtBuf,
) -> Result<Node<Expr>, (FuncExpr, Vec<Node<Expr>>)> {
  if !inlinable(cx, eval, &func.func, arguments.len()) {
    return Err((func, arguments));
  }
  let func = func.func;
  // Effects of everything already evaluated before the call; splicing the
  // collapsed body into the buffer moves it across exactly this much.
  let ambient = buf.effects.clone();

  let args: Vec<Node<Expr>> = arguments
    .into_iter()
    .map(|arg| cx.simplify_expr(arg, eval, hoist, buf))
    .collect();
  let arg_fx: Vec<Effects> = args.iter().map(effects_of_expr).collect();

  let outer_scope = cx.scope;
  let child = cx.names.fork(outer_scope);
  cx.scope = child;

  // Freshen the body's own bindings so two inlined copies of the same
  // function, or an inlined local and a caller-scope name, can never share
  // a `var` binding.
  let mut rename: HashMap<String, String> = HashMap::new();
  for name in hoisted_names(&func.body).into_iter().sorted() {
    let fresh = cx.names.gen_sym(child);
    rename.insert(name, fresh);
  }
  let mut body = func.body;
  let mut freshen = Freshen {
    map: &rename,
    shadows: Vec::new(),
  };
  freshen.walk_stmts(&mut body);
  let fresh_locals: HashSet<String> = rename.values().cloned().collect();

  // Names bound anywhere inside the freshened body. An argument whose free
  // variables intersect them would be captured by substitution, so such
  // arguments are forced through the local-binding fallback.
  let binders = all_binders(&body);

  let mut placeholders: Vec<Option<String>> = Vec::with_capacity(args.len());
  let mut shadowed: Vec<(String, Node<Expr>)> = Vec::new();
  let mut force_fallback = false;
  for (param, arg) in func.parameters.iter().zip(args.iter()) {
    let param = &param.stx.name;
    let capture_risk =
      !binders.is_empty() && expr_free_vars(arg).iter().any(|name| binders.contains(name));
    if capture_risk {
      force_fallback = true;
    }
    if let Some(entry) = cx.subst.remove_entry(param) {
      shadowed.push(entry);
    }
    if arg.stx.is_value() && !capture_risk {
      cx.subst.insert(param.clone(), arg.clone());
      placeholders.push(None);
    } else {
      let fresh = cx.names.gen_sym(child);
      cx.subst.insert(param.clone(), build::id(&fresh));
      placeholders.push(Some(fresh));
    }
  }

  // Pass 1.
  let (mut stmts, _) = cx.simplify_stmts(body, EvalTimes::Once);
  let mut value = None;
  if matches!(stmts.last().map(|stmt| stmt.stx.as_ref()), Some(Stmt::Return(_))) {
    if let Some(last) = stmts.pop() {
      if let Stmt::Return(ret) = *last.stx {
        value = ret.value;
      }
    }
  }
  for param in func.parameters.iter() {
    cx.subst.remove(&param.stx.name);
  }
  for (name, repl) in shadowed {
    cx.subst.insert(name, repl);
  }

  let infos = placeholders
    .iter()
    .zip(arg_fx.iter())
    .map(|(placeholder, fx)| ArgInfo {
      placeholder: placeholder.clone(),
      effects: fx.clone(),
    })
    .collect();
  let mut call_cx = CallCx::new(infos);
  let mut fx_cx = EffectsCx::with_hidden(fresh_locals);
  stmts_effects(&mut fx_cx, Some(&mut call_cx), EvalTimes::Once, &stmts);
  if let Some(value) = value.as_ref() {
    expr_effects(&mut fx_cx, Some(&mut call_cx), EvalTimes::Once, value);
  }
  call_cx.finish();

  // Pass 2, under a fresh substitution so nested inlines are not
  // re-simplified repeatedly.
  let (stmts, value) = if call_cx.is_ok() && !force_fallback {
    let outer_subst = std::mem::take(&mut cx.subst);
    for (placeholder, arg) in placeholders.iter().zip(args.into_iter()) {
      if let Some(name) = placeholder {
        cx.subst.insert(name.clone(), arg);
      }
    }
    let (stmts, _) = cx.simplify_stmts(stmts, EvalTimes::Once);
    let value = value.map(|value| {
      let mut scratch = StmtBuf::new();
      cx.simplify_expr(value, EvalTimes::Once, false, &mut scratch)
    });
    cx.subst = outer_subst;
    (stmts, value)
  } else {
    // Every remaining argument is evaluated exactly once, in original
    // order, before the body runs; the body's placeholder references now
    // resolve to these bindings.
    let mut decls: Vec<Node<Stmt>> = Vec::new();
    for (placeholder, arg) in placeholders.iter().zip(args.into_iter()) {
      if let Some(name) = placeholder {
        decls.push(build::var_decl(vec![(name.as_str(), Some(arg))]));
      }
    }
    decls.extend(stmts);
    (decls, value)
  };
  cx.scope = outer_scope;

  if stmts.is_empty() {
    return Ok(value.unwrap_or_else(void_0));
  }
  let fx = effects_of_stmts(&stmts);
  if hoist && fx.commutes_with(&ambient) {
    for stmt in stmts {
      buf.push(stmt);
    }
    return Ok(value.unwrap_or_else(void_0));
  }
  Ok(Node::new(loc, Expr::StmtSeq(StmtSeqExpr { stmts, value })))
}

fn inlinable(cx: &SimplifyCx, eval: EvalTimes, func: &Func, arg_count: usize) -> bool {
  if cx.in_with {
    return false;
  }
  if func.parameters.len() != arg_count {
    return false;
  }
  let mut params: HashSet<&str> = HashSet::new();
  for name in func.param_names() {
    if !params.insert(name) {
      // Duplicate parameter names; only the last binding receives the value.
      return false;
    }
  }
  let hoisted = hoisted_names(&func.body);
  // A parameter redeclared by a `var` (or colliding with a catch parameter)
  // shares or shadows the binding substitution would stand in for.
  if func.param_names().any(|name| hoisted.contains(name)) {
    return false;
  }
  let mut catch_params: HashSet<String> = HashSet::new();
  collect_catch_params(&func.body, &mut catch_params);
  if catch_params
    .iter()
    .any(|name| params.contains(name.as_str()) || hoisted.contains(name))
  {
    return false;
  }
  if let Some(name) = func.name.as_ref() {
    let name = name.stx.name.as_str();
    if params.contains(name) || hoisted.contains(name) {
      return false;
    }
    // Recursion: the body must not reference the literal's own name.
    let unnamed = Func {
      name: None,
      parameters: func.parameters.clone(),
      body: func.body.clone(),
    };
    if func_free_vars(&unnamed).contains(name) {
      return false;
    }
  }
  let free = func_free_vars(func);
  if !(eval == EvalTimes::Once || eval == EvalTimes::Opt) && !free.is_empty() {
    return false;
  }
  // Direct `eval` can observe local names; `arguments` reflects the
  // parameter bindings the collapse removes.
  if free.contains("eval") || free.contains("arguments") {
    return false;
  }
  // The receiver binding changes when the call frame disappears.
  if scan_stmts(&func.body, false, &mut |_| false, &mut |expr| {
    matches!(expr, Expr::This(_))
  }) {
    return false;
  }
  // `with` makes identifier resolution dynamic, defeating renaming.
  if scan_stmts(&func.body, true, &mut |stmt| matches!(stmt, Stmt::With(_)), &mut |_| false) {
    return false;
  }
  if !returns_only_in_tail(&func.body) {
    return false;
  }
  // An assigned parameter cannot be replaced by an expression.
  if scan_stmts(&func.body, true, &mut |_| false, &mut |expr| {
    matches!(expr, Expr::Assign(assign)
      if assign.target.stx.as_identifier().is_some_and(|name| params.contains(name)))
  }) {
    return false;
  }
  true
}

/// Whether `return` appears only as the final top-level statement of the
/// body, so popping it yields the call's value without rewriting control
/// flow.
fn returns_only_in_tail(stmts: &[Node<Stmt>]) -> bool {
  let Some((last, init)) = stmts.split_last() else {
    return true;
  };
  let mut is_return = |stmt: &Stmt| matches!(stmt, Stmt::Return(_));
  let mut no_expr = |_: &Expr| false;
  for stmt in init {
    if scan_stmt(stmt, false, &mut is_return, &mut no_expr) {
      return false;
    }
  }
  if matches!(last.stx.as_ref(), Stmt::Return(_)) {
    return true;
  }
  !scan_stmt(last, false, &mut is_return, &mut no_expr)
}

fn collect_catch_params(stmts: &[Node<Stmt>], out: &mut HashSet<String>) {
  scan_stmts(
    stmts,
    false,
    &mut |stmt| {
      if let Stmt::Try(try_stmt) = stmt {
        if let Some(param) = try_stmt.catch.as_ref().and_then(|c| c.parameter.as_ref()) {
          out.insert(param.stx.name.clone());
        }
      }
      false
    },
    &mut |_| false,
  );
}

/// Every name bound anywhere inside a statement list, at any depth,
/// including nested function scopes and catch parameters.
fn all_binders(stmts: &[Node<Stmt>]) -> HashSet<String> {
  let mut out: HashSet<String> = hoisted_names(stmts);
  scan_stmts(
    stmts,
    true,
    &mut |stmt| {
      match stmt {
        Stmt::Try(try_stmt) => {
          if let Some(param) = try_stmt.catch.as_ref().and_then(|c| c.parameter.as_ref()) {
            out.insert(param.stx.name.clone());
          }
        }
        Stmt::FuncDecl(decl) => out.extend(func_bound_names(&decl.func)),
        _ => {}
      }
      false
    },
    &mut |_| false,
  );
  let mut funcs = out;
  scan_stmts(
    stmts,
    true,
    &mut |_| false,
    &mut |expr| {
      if let Expr::Func(func) = expr {
        funcs.extend(func_bound_names(&func.func));
      }
      false
    },
  );
  funcs
}

/// Depth-first search for a statement or expression matching either
/// predicate. `enter_funcs` controls whether nested function bodies are
/// searched.
fn scan_stmts(
  stmts: &[Node<Stmt>],
  enter_funcs: bool,
  sp: &mut dyn FnMut(&Stmt) -> bool,
  ep: &mut dyn FnMut(&Expr) -> bool,
) -> bool {
  for stmt in stmts {
    if scan_stmt(stmt, enter_funcs, sp, ep) {
      return true;
    }
  }
  false
}

fn scan_stmt(
  stmt: &Node<Stmt>,
  enter_funcs: bool,
  sp: &mut dyn FnMut(&Stmt) -> bool,
  ep: &mut dyn FnMut(&Expr) -> bool,
) -> bool {
  let stmt = stmt.stx.as_ref();
  if sp(stmt) {
    return true;
  }
  match stmt {
    Stmt::Empty(_) | Stmt::Break(_) | Stmt::Continue(_) => false,
    Stmt::Block(block) => scan_stmts(&block.body, enter_funcs, sp, ep),
    Stmt::VarDecl(decl) => decl.declarators.iter().any(|declarator| {
      declarator
        .initializer
        .as_ref()
        .is_some_and(|init| scan_expr(init, enter_funcs, sp, ep))
    }),
    Stmt::Expr(expr_stmt) => scan_expr(&expr_stmt.expr, enter_funcs, sp, ep),
    Stmt::If(if_stmt) => {
      scan_expr(&if_stmt.test, enter_funcs, sp, ep)
        || scan_stmt(&if_stmt.consequent, enter_funcs, sp, ep)
        || if_stmt
          .alternate
          .as_ref()
          .is_some_and(|alt| scan_stmt(alt, enter_funcs, sp, ep))
    }
    Stmt::While(while_stmt) => {
      scan_expr(&while_stmt.condition, enter_funcs, sp, ep)
        || scan_stmt(&while_stmt.body, enter_funcs, sp, ep)
    }
    Stmt::DoWhile(do_stmt) => {
      scan_stmt(&do_stmt.body, enter_funcs, sp, ep)
        || scan_expr(&do_stmt.condition, enter_funcs, sp, ep)
    }
    Stmt::ForTriple(for_stmt) => {
      let init = match &for_stmt.init {
        ForInit::None => false,
        ForInit::Expr(expr) => scan_expr(expr, enter_funcs, sp, ep),
        ForInit::Decl(decl) => decl.declarators.iter().any(|declarator| {
          declarator
            .initializer
            .as_ref()
            .is_some_and(|init| scan_expr(init, enter_funcs, sp, ep))
        }),
      };
      init
        || for_stmt
          .cond
          .as_ref()
          .is_some_and(|cond| scan_expr(cond, enter_funcs, sp, ep))
        || for_stmt
          .post
          .as_ref()
          .is_some_and(|post| scan_expr(post, enter_funcs, sp, ep))
        || scan_stmt(&for_stmt.body, enter_funcs, sp, ep)
    }
    Stmt::Return(ret) => ret
      .value
      .as_ref()
      .is_some_and(|value| scan_expr(value, enter_funcs, sp, ep)),
    Stmt::Throw(throw_stmt) => scan_expr(&throw_stmt.value, enter_funcs, sp, ep),
    Stmt::Try(try_stmt) => {
      scan_stmts(&try_stmt.wrapped, enter_funcs, sp, ep)
        || try_stmt
          .catch
          .as_ref()
          .is_some_and(|catch| scan_stmts(&catch.body, enter_funcs, sp, ep))
        || try_stmt
          .finally
          .as_ref()
          .is_some_and(|finally| scan_stmts(finally, enter_funcs, sp, ep))
    }
    Stmt::With(with_stmt) => {
      scan_expr(&with_stmt.object, enter_funcs, sp, ep)
        || scan_stmt(&with_stmt.body, enter_funcs, sp, ep)
    }
    Stmt::FuncDecl(decl) => enter_funcs && scan_stmts(&decl.func.body, enter_funcs, sp, ep),
  }
}

fn scan_expr(
  expr: &Node<Expr>,
  enter_funcs: bool,
  sp: &mut dyn FnMut(&Stmt) -> bool,
  ep: &mut dyn FnMut(&Expr) -> bool,
) -> bool {
  let expr = expr.stx.as_ref();
  if ep(expr) {
    return true;
  }
  match expr {
    Expr::LitNull(_)
    | Expr::LitBool(_)
    | Expr::LitNum(_)
    | Expr::LitStr(_)
    | Expr::Id(_)
    | Expr::This(_) => false,
    Expr::LitArr(arr) => arr.elements.iter().any(|elem| match elem {
      LitArrElem::Single(expr) => scan_expr(expr, enter_funcs, sp, ep),
      LitArrElem::Empty => false,
    }),
    Expr::LitObj(obj) => obj
      .members
      .iter()
      .any(|member| scan_expr(&member.value, enter_funcs, sp, ep)),
    Expr::Unary(unary) => scan_expr(&unary.argument, enter_funcs, sp, ep),
    Expr::Binary(bin) => {
      scan_expr(&bin.left, enter_funcs, sp, ep) || scan_expr(&bin.right, enter_funcs, sp, ep)
    }
    Expr::Cond(cond) => {
      scan_expr(&cond.test, enter_funcs, sp, ep)
        || scan_expr(&cond.consequent, enter_funcs, sp, ep)
        || scan_expr(&cond.alternate, enter_funcs, sp, ep)
    }
    Expr::Assign(assign) => {
      scan_expr(&assign.target, enter_funcs, sp, ep)
        || scan_expr(&assign.value, enter_funcs, sp, ep)
    }
    Expr::Call(call) => {
      scan_expr(&call.callee, enter_funcs, sp, ep)
        || call
          .arguments
          .iter()
          .any(|arg| scan_expr(arg, enter_funcs, sp, ep))
    }
    Expr::Member(member) => scan_expr(&member.object, enter_funcs, sp, ep),
    Expr::ComputedMember(member) => {
      scan_expr(&member.object, enter_funcs, sp, ep)
        || scan_expr(&member.member, enter_funcs, sp, ep)
    }
    Expr::Func(func) => enter_funcs && scan_stmts(&func.func.body, enter_funcs, sp, ep),
    Expr::StmtSeq(seq) => {
      scan_stmts(&seq.stmts, enter_funcs, sp, ep)
        || seq
          .value
          .as_ref()
          .is_some_and(|value| scan_expr(value, enter_funcs, sp, ep))
    }
  }
}

/// Shadowing-aware renamer for the freshening step. Renames references and
/// binding sites of the mapped names in the function's own scope; names
/// rebound by a nested function or catch parameter are left alone.
struct Freshen<'a> {
  map: &'a HashMap<String, String>,
  shadows: Vec<HashSet<String>>,
}

impl Freshen<'_> {
  fn rename(&self, name: &mut String) {
    if self.shadows.iter().any(|scope| scope.contains(name.as_str())) {
      return;
    }
    if let Some(fresh) = self.map.get(name.as_str()) {
      *name = fresh.clone();
    }
  }

  fn walk_stmts(&mut self, stmts: &mut [Node<Stmt>]) {
    for stmt in stmts {
      self.walk_stmt(stmt);
    }
  }

  fn walk_var_decl(&mut self, decl: &mut ast_js::stmt::VarDeclStmt) {
    for declarator in decl.declarators.iter_mut() {
      // `var` binds in the function scope being freshened.
      self.rename(&mut declarator.name.stx.name);
      if let Some(init) = declarator.initializer.as_mut() {
        self.walk_expr(init);
      }
    }
  }

  fn walk_stmt(&mut self, stmt: &mut Node<Stmt>) {
    match stmt.stx.as_mut() {
      Stmt::Empty(_) | Stmt::Break(_) | Stmt::Continue(_) => {}
      Stmt::Block(block) => self.walk_stmts(&mut block.body),
      Stmt::VarDecl(decl) => self.walk_var_decl(decl),
      Stmt::Expr(expr_stmt) => self.walk_expr(&mut expr_stmt.expr),
      Stmt::If(if_stmt) => {
        self.walk_expr(&mut if_stmt.test);
        self.walk_stmt(&mut if_stmt.consequent);
        if let Some(alt) = if_stmt.alternate.as_mut() {
          self.walk_stmt(alt);
        }
      }
      Stmt::While(while_stmt) => {
        self.walk_expr(&mut while_stmt.condition);
        self.walk_stmt(&mut while_stmt.body);
      }
      Stmt::DoWhile(do_stmt) => {
        self.walk_stmt(&mut do_stmt.body);
        self.walk_expr(&mut do_stmt.condition);
      }
      Stmt::ForTriple(for_stmt) => {
        match &mut for_stmt.init {
          ForInit::None => {}
          ForInit::Expr(expr) => self.walk_expr(expr),
          ForInit::Decl(decl) => self.walk_var_decl(decl),
        }
        if let Some(cond) = for_stmt.cond.as_mut() {
          self.walk_expr(cond);
        }
        if let Some(post) = for_stmt.post.as_mut() {
          self.walk_expr(post);
        }
        self.walk_stmt(&mut for_stmt.body);
      }
      Stmt::Return(ret) => {
        if let Some(value) = ret.value.as_mut() {
          self.walk_expr(value);
        }
      }
      Stmt::Throw(throw_stmt) => self.walk_expr(&mut throw_stmt.value),
      Stmt::Try(try_stmt) => {
        self.walk_stmts(&mut try_stmt.wrapped);
        if let Some(catch) = try_stmt.catch.as_mut() {
          let mut shadow = HashSet::new();
          if let Some(param) = catch.parameter.as_ref() {
            shadow.insert(param.stx.name.clone());
          }
          self.shadows.push(shadow);
          self.walk_stmts(&mut catch.body);
          self.shadows.pop();
        }
        if let Some(finally) = try_stmt.finally.as_mut() {
          self.walk_stmts(finally);
        }
      }
      Stmt::With(with_stmt) => {
        self.walk_expr(&mut with_stmt.object);
        self.walk_stmt(&mut with_stmt.body);
      }
      Stmt::FuncDecl(decl) => {
        // A declaration's name binds in the scope being freshened; inside
        // the body, references to it resolve to the same (renamed) binding.
        if let Some(name) = decl.func.name.as_mut() {
          self.rename(&mut name.stx.name);
        }
        let mut shadow = func_bound_names(&decl.func);
        if let Some(name) = decl.func.name.as_ref() {
          shadow.remove(&name.stx.name);
        }
        self.shadows.push(shadow);
        self.walk_stmts(&mut decl.func.body);
        self.shadows.pop();
      }
    }
  }

  fn walk_expr(&mut self, expr: &mut Node<Expr>) {
    match expr.stx.as_mut() {
      Expr::LitNull(_) | Expr::LitBool(_) | Expr::LitNum(_) | Expr::LitStr(_) | Expr::This(_) => {}
      Expr::LitArr(arr) => {
        for elem in arr.elements.iter_mut() {
          if let LitArrElem::Single(expr) = elem {
            self.walk_expr(expr);
          }
        }
      }
      Expr::LitObj(obj) => {
        for member in obj.members.iter_mut() {
          self.walk_expr(&mut member.value);
        }
      }
      Expr::Id(id) => self.rename(&mut id.name),
      Expr::Unary(unary) => self.walk_expr(&mut unary.argument),
      Expr::Binary(bin) => {
        self.walk_expr(&mut bin.left);
        self.walk_expr(&mut bin.right);
      }
      Expr::Cond(cond) => {
        self.walk_expr(&mut cond.test);
        self.walk_expr(&mut cond.consequent);
        self.walk_expr(&mut cond.alternate);
      }
      Expr::Assign(assign) => {
        self.walk_expr(&mut assign.target);
        self.walk_expr(&mut assign.value);
      }
      Expr::Call(call) => {
        self.walk_expr(&mut call.callee);
        for arg in call.arguments.iter_mut() {
          self.walk_expr(arg);
        }
      }
      Expr::Member(member) => self.walk_expr(&mut member.object),
      Expr::ComputedMember(member) => {
        self.walk_expr(&mut member.object);
        self.walk_expr(&mut member.member);
      }
      Expr::Func(func) => {
        // A literal's name is visible only inside its own body, so the whole
        // bound-name set shadows.
        self.shadows.push(func_bound_names(&func.func));
        self.walk_stmts(&mut func.func.body);
        self.shadows.pop();
      }
      Expr::StmtSeq(seq) => {
        self.walk_stmts(&mut seq.stmts);
        if let Some(value) = seq.value.as_mut() {
          self.walk_expr(value);
        }
      }
    }
  }
}
