use ast_js::build::*;
use ast_js::node::Node;
use ast_js::operator::OperatorName;
use ast_js::stmt::ForInit;
use ast_js::stmt::Stmt;
use simplify_js::accumulate::effects_of_stmts;
use simplify_js::simplify;
use simplify_js::simplify_stmts;

fn add(left: Node<ast_js::expr::Expr>, right: Node<ast_js::expr::Expr>) -> Node<ast_js::expr::Expr> {
  binary(OperatorName::Addition, left, right)
}

/// A spread of program shapes covering folding, dead code, loops, exception
/// structure, scope suspension and the inliner's ok/fallback/wrap paths.
fn programs() -> Vec<Vec<Node<Stmt>>> {
  vec![
    // Constant arithmetic and string folding.
    vec![
      expr_stmt(assign(
        id("u"),
        binary(
          OperatorName::Subtraction,
          binary(
            OperatorName::Multiplication,
            add(num(1.0), num(2.0)),
            num(3.0),
          ),
          binary(OperatorName::Division, num(4.0), num(2.0)),
        ),
      )),
      expr_stmt(assign(id("s"), add(str_lit("a"), str_lit("b")))),
      expr_stmt(assign(id("t"), unary(OperatorName::TypeOf, num(1.0)))),
    ],
    // Branch selection and read-only statement elimination.
    vec![
      if_(
        bool_(true),
        expr_stmt(assign(id("u"), num(1.0))),
        Some(expr_stmt(assign(id("v"), num(2.0)))),
      ),
      if_(num(0.0), expr_stmt(assign(id("w"), num(3.0))), None),
      expr_stmt(add(num(1.0), id("u"))),
      expr_stmt(assign(id("v"), binary(OperatorName::LogicalAnd, num(0.0), call(id("g"), vec![])))),
      expr_stmt(assign(id("w"), binary(OperatorName::LogicalOr, num(1.0), call(id("g"), vec![])))),
    ],
    // Code after a return: bindings survive, work does not.
    vec![func_decl(
      "f",
      &[],
      vec![
        ret(Some(num(1.0))),
        expr_stmt(assign(id("u"), call(id("g"), vec![]))),
        var_decl(vec![("x", Some(num(5.0)))]),
        func_decl("inner", &[], vec![ret(Some(id("x")))]),
      ],
    )],
    // Inliner: constant argument, duplicated argument, unused effectful
    // argument.
    vec![
      expr_stmt(assign(
        id("u"),
        call(
          func_expr(None, &["x"], vec![ret(Some(add(id("x"), num(2.0))))]),
          vec![num(1.0)],
        ),
      )),
      expr_stmt(assign(
        id("v"),
        call(
          func_expr(None, &["x"], vec![ret(Some(add(id("x"), id("x"))))]),
          vec![call(id("g"), vec![])],
        ),
      )),
      expr_stmt(call(
        func_expr(None, &["x"], vec![ret(Some(num(0.0)))]),
        vec![call(id("h"), vec![])],
      )),
    ],
    // Loops: capture-free literal inlined in a body, plus the classic
    // counting shapes left alone.
    vec![
      while_(
        id("c"),
        expr_stmt(assign(
          id("u"),
          call(
            func_expr(None, &["x"], vec![ret(Some(add(id("x"), num(1.0))))]),
            vec![id("v")],
          ),
        )),
      ),
      do_while(
        expr_stmt(assign(id("u"), add(id("u"), num(1.0)))),
        binary(OperatorName::LessThan, id("u"), num(10.0)),
      ),
      for_triple(
        ForInit::Expr(assign(id("i"), num(0.0))),
        Some(binary(OperatorName::LessThan, id("i"), id("n"))),
        Some(assign(id("i"), add(id("i"), num(1.0)))),
        expr_stmt(assign(id("s"), add(id("s"), id("i")))),
      ),
      while_(bool_(false), var_decl(vec![("dead", Some(num(1.0)))])),
    ],
    // Exception structure with a shadowing catch parameter.
    vec![
      var_decl(vec![("e", Some(num(1.0)))]),
      try_(
        vec![expr_stmt(assign(id("u"), call(id("g"), vec![])))],
        Some(("e", vec![expr_stmt(call(id("h"), vec![id("e")]))])),
        Some(vec![expr_stmt(assign(id("v"), num(1.0)))]),
      ),
      try_(vec![], None, Some(vec![expr_stmt(assign(id("w"), num(2.0)))])),
    ],
    // `with` suspends everything inside it.
    vec![with_(
      id("o"),
      block(vec![
        expr_stmt(assign(id("u"), id("x"))),
        expr_stmt(call(
          func_expr(None, &["q"], vec![ret(Some(id("q")))]),
          vec![num(1.0)],
        )),
      ]),
    )],
    // A hoist that cannot cross the left operand stays a statement
    // sequence expression.
    vec![ret(Some(add(
      call(id("g"), vec![]),
      call(
        func_expr(None, &["x"], vec![ret(Some(add(id("x"), id("x"))))]),
        vec![call(id("h"), vec![])],
      ),
    )))],
  ]
}

#[test]
fn simplification_is_idempotent() {
  for program in programs() {
    let once = simplify_stmts(program);
    let twice = simplify_stmts(once.clone());
    assert_eq!(twice, once);
  }
}

#[test]
fn simplification_never_adds_effects() {
  for program in programs() {
    let before = effects_of_stmts(&program);
    let after = effects_of_stmts(&simplify_stmts(program));
    assert!(
      after.lte(&before),
      "simplified effects {after:?} exceed original {before:?}"
    );
  }
}

#[test]
fn top_level_entry_simplifies_the_body() {
  let top = top_level(vec![
    expr_stmt(assign(id("u"), add(num(2.0), num(2.0)))),
    expr_stmt(id("u")),
  ]);
  let out = simplify(top);
  assert_eq!(
    out.stx.body,
    vec![expr_stmt(assign(id("u"), num(4.0)))]
  );
}

#[test]
fn folded_branches_keep_only_the_live_arm() {
  let out = simplify_stmts(vec![
    if_(
      str_lit(""),
      expr_stmt(assign(id("u"), num(1.0))),
      Some(expr_stmt(assign(id("v"), num(2.0)))),
    ),
  ]);
  assert_eq!(out, vec![expr_stmt(assign(id("v"), num(2.0)))]);
}

#[test]
fn removed_loops_keep_their_bindings() {
  let out = simplify_stmts(vec![while_(
    bool_(false),
    var_decl(vec![("dead", Some(num(1.0)))]),
  )]);
  assert_eq!(out, vec![var_decl(vec![("dead", None)])]);
}
