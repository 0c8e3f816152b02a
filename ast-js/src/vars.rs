use crate::expr::Expr;
use crate::expr::LitArrElem;
use crate::func::Func;
use crate::node::Node;
use crate::stmt::ForInit;
use crate::stmt::Stmt;
use ahash::HashSet;
use ahash::HashSetExt;

/// Names bound by `var` declarators and function declarations in a statement
/// list, per JS function-scoped hoisting. Descends into nested blocks,
/// branches, loops, `try` and `with` bodies, and through expressions into
/// statement-sequence expressions (whose `var`s execute in the enclosing
/// function scope), but never into a nested function's body. Catch
/// parameters are not hoisted (they shadow within their catch block only),
/// though `var`s inside a catch body are.
pub fn hoisted_names(stmts: &[Node<Stmt>]) -> HashSet<String> {
  let mut names = HashSet::new();
  collect_hoisted(stmts, &mut names);
  names
}

fn collect_hoisted(stmts: &[Node<Stmt>], names: &mut HashSet<String>) {
  for stmt in stmts {
    collect_hoisted_stmt(stmt, names);
  }
}

fn collect_hoisted_stmt(stmt: &Node<Stmt>, names: &mut HashSet<String>) {
  match stmt.stx.as_ref() {
    Stmt::VarDecl(decl) => collect_hoisted_var_decl(decl, names),
    Stmt::FuncDecl(decl) => {
      if let Some(name) = decl.func.name.as_ref() {
        names.insert(name.stx.name.clone());
      }
    }
    Stmt::Block(block) => collect_hoisted(&block.body, names),
    Stmt::Expr(expr_stmt) => collect_hoisted_expr(&expr_stmt.expr, names),
    Stmt::If(if_stmt) => {
      collect_hoisted_expr(&if_stmt.test, names);
      collect_hoisted_stmt(&if_stmt.consequent, names);
      if let Some(alt) = if_stmt.alternate.as_ref() {
        collect_hoisted_stmt(alt, names);
      }
    }
    Stmt::While(while_stmt) => {
      collect_hoisted_expr(&while_stmt.condition, names);
      collect_hoisted_stmt(&while_stmt.body, names);
    }
    Stmt::DoWhile(do_stmt) => {
      collect_hoisted_stmt(&do_stmt.body, names);
      collect_hoisted_expr(&do_stmt.condition, names);
    }
    Stmt::ForTriple(for_stmt) => {
      match &for_stmt.init {
        ForInit::None => {}
        ForInit::Expr(expr) => collect_hoisted_expr(expr, names),
        ForInit::Decl(decl) => collect_hoisted_var_decl(decl, names),
      }
      if let Some(cond) = for_stmt.cond.as_ref() {
        collect_hoisted_expr(cond, names);
      }
      if let Some(post) = for_stmt.post.as_ref() {
        collect_hoisted_expr(post, names);
      }
      collect_hoisted_stmt(&for_stmt.body, names);
    }
    Stmt::Return(ret) => {
      if let Some(value) = ret.value.as_ref() {
        collect_hoisted_expr(value, names);
      }
    }
    Stmt::Throw(throw_stmt) => collect_hoisted_expr(&throw_stmt.value, names),
    Stmt::Try(try_stmt) => {
      collect_hoisted(&try_stmt.wrapped, names);
      if let Some(catch) = try_stmt.catch.as_ref() {
        collect_hoisted(&catch.body, names);
      }
      if let Some(finally) = try_stmt.finally.as_ref() {
        collect_hoisted(finally, names);
      }
    }
    Stmt::With(with_stmt) => {
      collect_hoisted_expr(&with_stmt.object, names);
      collect_hoisted_stmt(&with_stmt.body, names);
    }
    Stmt::Empty(_) | Stmt::Break(_) | Stmt::Continue(_) => {}
  }
}

fn collect_hoisted_var_decl(decl: &crate::stmt::VarDeclStmt, names: &mut HashSet<String>) {
  for declarator in decl.declarators.iter() {
    names.insert(declarator.name.stx.name.clone());
    if let Some(init) = declarator.initializer.as_ref() {
      collect_hoisted_expr(init, names);
    }
  }
}

fn collect_hoisted_expr(expr: &Node<Expr>, names: &mut HashSet<String>) {
  match expr.stx.as_ref() {
    Expr::LitNull(_)
    | Expr::LitBool(_)
    | Expr::LitNum(_)
    | Expr::LitStr(_)
    | Expr::Id(_)
    | Expr::This(_)
    | Expr::Func(_) => {}
    Expr::LitArr(arr) => {
      for elem in arr.elements.iter() {
        if let LitArrElem::Single(expr) = elem {
          collect_hoisted_expr(expr, names);
        }
      }
    }
    Expr::LitObj(obj) => {
      for member in obj.members.iter() {
        collect_hoisted_expr(&member.value, names);
      }
    }
    Expr::Unary(unary) => collect_hoisted_expr(&unary.argument, names),
    Expr::Binary(bin) => {
      collect_hoisted_expr(&bin.left, names);
      collect_hoisted_expr(&bin.right, names);
    }
    Expr::Cond(cond) => {
      collect_hoisted_expr(&cond.test, names);
      collect_hoisted_expr(&cond.consequent, names);
      collect_hoisted_expr(&cond.alternate, names);
    }
    Expr::Assign(assign) => {
      collect_hoisted_expr(&assign.target, names);
      collect_hoisted_expr(&assign.value, names);
    }
    Expr::Call(call) => {
      collect_hoisted_expr(&call.callee, names);
      for arg in call.arguments.iter() {
        collect_hoisted_expr(arg, names);
      }
    }
    Expr::Member(member) => collect_hoisted_expr(&member.object, names),
    Expr::ComputedMember(member) => {
      collect_hoisted_expr(&member.object, names);
      collect_hoisted_expr(&member.member, names);
    }
    Expr::StmtSeq(seq) => {
      collect_hoisted(&seq.stmts, names);
      if let Some(value) = seq.value.as_ref() {
        collect_hoisted_expr(value, names);
      }
    }
  }
}

/// All names bound in a function's own scope: parameters, the function's own
/// name (a literal's name is visible inside its body), and hoisted names.
pub fn func_bound_names(func: &Func) -> HashSet<String> {
  let mut names = hoisted_names(&func.body);
  for param in func.parameters.iter() {
    names.insert(param.stx.name.clone());
  }
  if let Some(name) = func.name.as_ref() {
    names.insert(name.stx.name.clone());
  }
  names
}

/// Free variables of a function literal: identifier references in its body
/// that resolve outside its own scope. Shadowing-aware across nested
/// functions and catch parameters.
pub fn func_free_vars(func: &Func) -> HashSet<String> {
  let mut walker = IdentWalker::free_only();
  walker.walk_func(func);
  walker.names
}

/// Free variables of a bare statement list (no enclosing binders).
pub fn stmts_free_vars(stmts: &[Node<Stmt>]) -> HashSet<String> {
  let mut walker = IdentWalker::free_only();
  walker.walk_stmts(stmts);
  walker.names
}

/// Free variables of a single expression.
pub fn expr_free_vars(expr: &Node<Expr>) -> HashSet<String> {
  let mut walker = IdentWalker::free_only();
  walker.walk_expr(expr);
  walker.names
}

/// Every identifier name occurring anywhere in a tree, referenced or bound.
/// Used to seed fresh-name allocation so generated names stay disjoint from
/// all program names.
pub fn all_names(stmts: &[Node<Stmt>]) -> HashSet<String> {
  let mut walker = IdentWalker::all();
  walker.walk_stmts(stmts);
  walker.names
}

struct IdentWalker {
  include_bound: bool,
  scopes: Vec<HashSet<String>>,
  names: HashSet<String>,
}

impl IdentWalker {
  fn free_only() -> Self {
    Self {
      include_bound: false,
      scopes: Vec::new(),
      names: HashSet::new(),
    }
  }

  fn all() -> Self {
    Self {
      include_bound: true,
      scopes: Vec::new(),
      names: HashSet::new(),
    }
  }

  fn is_bound(&self, name: &str) -> bool {
    self.scopes.iter().any(|scope| scope.contains(name))
  }

  fn reference(&mut self, name: &str) {
    if self.include_bound || !self.is_bound(name) {
      self.names.insert(name.to_string());
    }
  }

  fn binding(&mut self, name: &str) {
    if self.include_bound {
      self.names.insert(name.to_string());
    }
  }

  fn walk_func(&mut self, func: &Func) {
    let scope = func_bound_names(func);
    if self.include_bound {
      self.names.extend(scope.iter().cloned());
    }
    self.scopes.push(scope);
    self.walk_stmts(&func.body);
    self.scopes.pop();
  }

  fn walk_stmts(&mut self, stmts: &[Node<Stmt>]) {
    for stmt in stmts {
      self.walk_stmt(stmt);
    }
  }

  fn walk_stmt(&mut self, stmt: &Node<Stmt>) {
    match stmt.stx.as_ref() {
      Stmt::Empty(_) | Stmt::Break(_) | Stmt::Continue(_) => {}
      Stmt::Block(block) => self.walk_stmts(&block.body),
      Stmt::VarDecl(decl) => self.walk_var_decl(decl),
      Stmt::Expr(expr_stmt) => self.walk_expr(&expr_stmt.expr),
      Stmt::If(if_stmt) => {
        self.walk_expr(&if_stmt.test);
        self.walk_stmt(&if_stmt.consequent);
        if let Some(alt) = if_stmt.alternate.as_ref() {
          self.walk_stmt(alt);
        }
      }
      Stmt::While(while_stmt) => {
        self.walk_expr(&while_stmt.condition);
        self.walk_stmt(&while_stmt.body);
      }
      Stmt::DoWhile(do_stmt) => {
        self.walk_stmt(&do_stmt.body);
        self.walk_expr(&do_stmt.condition);
      }
      Stmt::ForTriple(for_stmt) => {
        match &for_stmt.init {
          ForInit::None => {}
          ForInit::Expr(expr) => self.walk_expr(expr),
          ForInit::Decl(decl) => self.walk_var_decl(decl),
        }
        if let Some(cond) = for_stmt.cond.as_ref() {
          self.walk_expr(cond);
        }
        if let Some(post) = for_stmt.post.as_ref() {
          self.walk_expr(post);
        }
        self.walk_stmt(&for_stmt.body);
      }
      Stmt::Return(ret) => {
        if let Some(value) = ret.value.as_ref() {
          self.walk_expr(value);
        }
      }
      Stmt::Throw(throw_stmt) => self.walk_expr(&throw_stmt.value),
      Stmt::Try(try_stmt) => {
        self.walk_stmts(&try_stmt.wrapped);
        if let Some(catch) = try_stmt.catch.as_ref() {
          let mut scope = HashSet::new();
          if let Some(param) = catch.parameter.as_ref() {
            scope.insert(param.stx.name.clone());
            self.binding(&param.stx.name);
          }
          self.scopes.push(scope);
          self.walk_stmts(&catch.body);
          self.scopes.pop();
        }
        if let Some(finally) = try_stmt.finally.as_ref() {
          self.walk_stmts(finally);
        }
      }
      Stmt::With(with_stmt) => {
        self.walk_expr(&with_stmt.object);
        self.walk_stmt(&with_stmt.body);
      }
      Stmt::FuncDecl(decl) => self.walk_func(&decl.func),
    }
  }

  fn walk_var_decl(&mut self, decl: &crate::stmt::VarDeclStmt) {
    for declarator in decl.declarators.iter() {
      self.binding(&declarator.name.stx.name);
      if let Some(init) = declarator.initializer.as_ref() {
        self.walk_expr(init);
      }
    }
  }

  fn walk_expr(&mut self, expr: &Node<Expr>) {
    match expr.stx.as_ref() {
      Expr::LitNull(_) | Expr::LitBool(_) | Expr::LitNum(_) | Expr::LitStr(_) | Expr::This(_) => {}
      Expr::LitArr(arr) => {
        for elem in arr.elements.iter() {
          if let LitArrElem::Single(expr) = elem {
            self.walk_expr(expr);
          }
        }
      }
      Expr::LitObj(obj) => {
        for member in obj.members.iter() {
          self.walk_expr(&member.value);
        }
      }
      Expr::Id(id) => self.reference(&id.name),
      Expr::Unary(unary) => self.walk_expr(&unary.argument),
      Expr::Binary(bin) => {
        self.walk_expr(&bin.left);
        self.walk_expr(&bin.right);
      }
      Expr::Cond(cond) => {
        self.walk_expr(&cond.test);
        self.walk_expr(&cond.consequent);
        self.walk_expr(&cond.alternate);
      }
      Expr::Assign(assign) => {
        self.walk_expr(&assign.target);
        self.walk_expr(&assign.value);
      }
      Expr::Call(call) => {
        self.walk_expr(&call.callee);
        for arg in call.arguments.iter() {
          self.walk_expr(arg);
        }
      }
      Expr::Member(member) => self.walk_expr(&member.object),
      Expr::ComputedMember(member) => {
        self.walk_expr(&member.object);
        self.walk_expr(&member.member);
      }
      Expr::Func(func) => self.walk_func(&func.func),
      Expr::StmtSeq(seq) => {
        self.walk_stmts(&seq.stmts);
        if let Some(value) = seq.value.as_ref() {
          self.walk_expr(value);
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::build::*;
  use crate::func::Func;
  use crate::operator::OperatorName;

  #[test]
  fn hoisting_sees_through_blocks_but_not_functions() {
    let body = vec![
      block(vec![var_decl(vec![("a", None)])]),
      if_(
        bool_(true),
        var_decl(vec![("b", Some(num(1.0)))]),
        Some(expr_stmt(call(id("f"), vec![]))),
      ),
      func_decl("g", &["p"], vec![var_decl(vec![("inner", None)])]),
    ];
    let names = hoisted_names(&body);
    assert!(names.contains("a"));
    assert!(names.contains("b"));
    assert!(names.contains("g"));
    assert!(!names.contains("inner"));
    assert!(!names.contains("p"));
  }

  #[test]
  fn hoisting_sees_into_statement_sequences() {
    // u = (var a = f(), a + a); declares `a` in the enclosing function scope.
    let body = vec![expr_stmt(assign(
      id("u"),
      stmt_seq(
        vec![var_decl(vec![("a", Some(call(id("f"), vec![])))])],
        Some(binary(OperatorName::Addition, id("a"), id("a"))),
      ),
    ))];
    let names = hoisted_names(&body);
    assert!(names.contains("a"));
    assert!(!names.contains("u"));
  }

  #[test]
  fn free_vars_respect_shadowing() {
    // function(x) { var y; return x + y + z + (function(z) { return z + x; })(w); }
    let inner = func_expr(None, &["z"], vec![ret(Some(binary(
      OperatorName::Addition,
      id("z"),
      id("x"),
    )))]);
    let f = Func {
      name: None,
      parameters: vec![id_pat("x")],
      body: vec![
        var_decl(vec![("y", None)]),
        ret(Some(binary(
          OperatorName::Addition,
          binary(
            OperatorName::Addition,
            binary(OperatorName::Addition, id("x"), id("y")),
            id("z"),
          ),
          call(inner, vec![id("w")]),
        ))),
      ],
    };
    let free = func_free_vars(&f);
    assert!(free.contains("z"));
    assert!(free.contains("w"));
    assert!(!free.contains("x"));
    assert!(!free.contains("y"));
  }

  #[test]
  fn catch_parameter_shadows_within_catch_only() {
    let body = vec![try_(
      vec![expr_stmt(id("e"))],
      Some(("e", vec![expr_stmt(id("e"))])),
      None,
    )];
    let free = stmts_free_vars(&body);
    assert!(free.contains("e"));
    // The reference inside the catch body is bound; only the wrapped one leaks.
    let body_shadowed = vec![try_(vec![], Some(("e", vec![expr_stmt(id("e"))])), None)];
    assert!(!stmts_free_vars(&body_shadowed).contains("e"));
  }
}
