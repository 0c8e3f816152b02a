use crate::lattice::effects::Effects;
use crate::lattice::eval_times::EvalTimes;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;

/// One argument of an inlining attempt. Value arguments (constants, bare
/// identifiers) were bound directly during pass 1 and carry no placeholder;
/// their occurrences are gone from the body, so they can never be marked
/// seen — `finish` relies on this.
pub struct ArgInfo {
  pub placeholder: Option<String>,
  pub effects: Effects,
}

/// Transient validation state for one inlining attempt. Driven by the effect
/// accumulation walk over the freshened, simplified body: every identifier
/// read, every l-value use, every `this` reference and every nested function
/// literal calls back into it. `ok` starts true and only ever goes false;
/// failures never abort the traversal, since later occurrences still need to
/// be marked seen for subsequent checks to be meaningful.
pub struct CallCx {
  positions: HashMap<String, usize>,
  arg_effects: Vec<Effects>,
  combined: Effects,
  all_read_only: bool,
  seen: Vec<bool>,
  ok: bool,
}

impl CallCx {
  pub fn new(args: Vec<ArgInfo>) -> Self {
    let mut positions = HashMap::new();
    let mut arg_effects = Vec::with_capacity(args.len());
    let mut combined = Effects::bottom();
    let mut all_read_only = true;
    for (position, arg) in args.into_iter().enumerate() {
      if let Some(name) = arg.placeholder {
        positions.insert(name, position);
      }
      combined.lub_into(&arg.effects);
      all_read_only &= arg.effects.is_read_only();
      arg_effects.push(arg.effects);
    }
    let seen = vec![false; arg_effects.len()];
    Self {
      positions,
      arg_effects,
      combined,
      all_read_only,
      seen,
      ok: true,
    }
  }

  pub fn param_position(&self, name: &str) -> Option<usize> {
    self.positions.get(name).copied()
  }

  /// Whether every argument is read-only, permitting reordering and
  /// at-most-once evaluation.
  pub fn all_read_only(&self) -> bool {
    self.all_read_only
  }

  /// Join of all argument effects.
  pub fn args_effect(&self) -> &Effects {
    &self.combined
  }

  /// Idempotent; once the attempt has failed it stays failed.
  pub fn fail(&mut self) {
    self.ok = false;
  }

  pub fn is_ok(&self) -> bool {
    self.ok
  }

  /// A read of the parameter at `position`, under the ambient evaluation
  /// bound and the effects of everything evaluated in the body strictly
  /// before this occurrence.
  pub fn on_param_read(&mut self, position: usize, eval: EvalTimes, ambient: &Effects) {
    // A second syntactic occurrence would duplicate a possibly-effectful
    // expression.
    if self.seen[position] {
      self.fail();
    }
    self.seen[position] = true;
    // Arguments not known reorder-safe must be consumed in their original
    // left-to-right order.
    if !self.all_read_only && !self.seen[..position].iter().all(|seen| *seen) {
      self.fail();
    }
    match eval {
      EvalTimes::Once => {}
      // An argument that might end up evaluated zero times must be provably
      // effect-free to drop safely.
      EvalTimes::Opt => {
        if !self.all_read_only {
          self.fail();
        }
      }
      EvalTimes::AtLeastOnce | EvalTimes::Any => self.fail(),
    }
    // Evaluating the argument here instead of at the call site must not
    // reorder observable effects.
    if !ambient.commutes_with(&self.arg_effects[position]) {
      self.fail();
    }
  }

  /// A parameter position cannot be substituted by an arbitrary expression
  /// and still be assignable.
  pub fn on_param_write(&mut self, _position: usize) {
    self.fail();
  }

  /// The receiver binding is not preserved by substitution.
  pub fn on_this(&mut self) {
    self.fail();
  }

  /// A nested function literal capturing a parameter may be invoked an
  /// unbounded number of times later, voiding the evaluation-count
  /// guarantees.
  pub fn on_closure(&mut self, free_vars: &HashSet<String>) {
    if free_vars
      .iter()
      .any(|name| self.positions.contains_key(name.as_str()))
    {
      self.fail();
    }
  }

  /// End of traversal: unless every argument is reorder-safe, an argument
  /// whose parameter was never reached would silently lose its effects.
  pub fn finish(&mut self) {
    if !self.all_read_only && !self.seen.iter().all(|seen| *seen) {
      self.fail();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn tracked(name: &str, effects: Effects) -> ArgInfo {
    ArgInfo {
      placeholder: Some(name.to_string()),
      effects,
    }
  }

  fn value(effects: Effects) -> ArgInfo {
    ArgInfo {
      placeholder: None,
      effects,
    }
  }

  #[test]
  fn single_use_effectful_arg_is_ok() {
    let mut cx = CallCx::new(vec![tracked("t", Effects::top())]);
    cx.on_param_read(0, EvalTimes::Once, &Effects::bottom());
    cx.finish();
    assert!(cx.is_ok());
  }

  #[test]
  fn duplicate_occurrence_fails_but_marks_seen() {
    let mut cx = CallCx::new(vec![tracked("t", Effects::top())]);
    cx.on_param_read(0, EvalTimes::Once, &Effects::bottom());
    cx.on_param_read(0, EvalTimes::Once, &Effects::bottom());
    assert!(!cx.is_ok());
    cx.finish();
    assert!(!cx.is_ok());
  }

  #[test]
  fn unseen_effectful_arg_fails_at_finish() {
    let mut cx = CallCx::new(vec![
      tracked("t", Effects::top()),
      value(Effects::bottom()),
    ]);
    cx.on_param_read(0, EvalTimes::Once, &Effects::bottom());
    cx.finish();
    assert!(!cx.is_ok());
  }

  #[test]
  fn read_only_args_may_be_skipped() {
    let mut cx = CallCx::new(vec![
      tracked("t", Effects::var_read("a")),
      value(Effects::bottom()),
    ]);
    cx.finish();
    assert!(cx.is_ok());
  }

  #[test]
  fn opt_eval_requires_read_only() {
    let mut cx = CallCx::new(vec![tracked("t", Effects::top())]);
    cx.on_param_read(0, EvalTimes::Opt, &Effects::bottom());
    assert!(!cx.is_ok());

    let mut cx = CallCx::new(vec![tracked("t", Effects::var_read("a"))]);
    cx.on_param_read(0, EvalTimes::Opt, &Effects::bottom());
    cx.finish();
    assert!(cx.is_ok());
  }

  #[test]
  fn repeat_eval_always_fails() {
    for eval in [EvalTimes::AtLeastOnce, EvalTimes::Any] {
      let mut cx = CallCx::new(vec![tracked("t", Effects::var_read("a"))]);
      cx.on_param_read(0, eval, &Effects::bottom());
      assert!(!cx.is_ok());
    }
  }

  #[test]
  fn out_of_order_consumption_fails_unless_read_only() {
    let mut cx = CallCx::new(vec![
      tracked("t", Effects::var_write("a")),
      tracked("u", Effects::var_write("b")),
    ]);
    cx.on_param_read(1, EvalTimes::Once, &Effects::bottom());
    assert!(!cx.is_ok());

    let mut cx = CallCx::new(vec![
      tracked("t", Effects::var_read("a")),
      tracked("u", Effects::var_read("b")),
    ]);
    cx.on_param_read(1, EvalTimes::Once, &Effects::bottom());
    cx.on_param_read(0, EvalTimes::Once, &Effects::var_read("b"));
    cx.finish();
    assert!(cx.is_ok());
  }

  #[test]
  fn ambient_effects_must_commute() {
    let mut cx = CallCx::new(vec![tracked("t", Effects::var_read("a"))]);
    cx.on_param_read(0, EvalTimes::Once, &Effects::var_write("a"));
    assert!(!cx.is_ok());
  }

  #[test]
  fn this_and_lvalue_and_closure_fail() {
    let mut cx = CallCx::new(vec![tracked("t", Effects::bottom())]);
    cx.on_this();
    assert!(!cx.is_ok());

    let mut cx = CallCx::new(vec![tracked("t", Effects::bottom())]);
    cx.on_param_write(0);
    assert!(!cx.is_ok());

    let mut cx = CallCx::new(vec![tracked("t", Effects::bottom())]);
    let mut free = HashSet::default();
    free.insert("t".to_string());
    cx.on_closure(&free);
    assert!(!cx.is_ok());
  }
}
