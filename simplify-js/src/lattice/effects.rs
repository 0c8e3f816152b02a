use super::rw::MayThrow;
use super::rw::ReadWrite;
use ahash::HashMap;
use ahash::HashSet;

/// Finite mapping from variable name to access level; absence means `None`.
/// Entries are normalized: a `ReadWrite::None` value is never stored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VarEffects {
  map: HashMap<String, ReadWrite>,
}

impl VarEffects {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, name: &str) -> ReadWrite {
    self.map.get(name).copied().unwrap_or(ReadWrite::None)
  }

  pub fn record(&mut self, name: &str, access: ReadWrite) {
    if access == ReadWrite::None {
      return;
    }
    let slot = self.map.entry(name.to_string()).or_default();
    *slot = slot.lub(access);
  }

  pub fn remove(&mut self, name: &str) {
    self.map.remove(name);
  }

  pub fn is_bottom(&self) -> bool {
    self.map.is_empty()
  }

  pub fn all_read(&self) -> bool {
    self.map.values().all(|rw| rw.lte(ReadWrite::Read))
  }

  pub fn lte(&self, other: &VarEffects) -> bool {
    self
      .map
      .iter()
      .all(|(name, rw)| rw.lte(other.get(name)))
  }

  pub fn lub(&self, other: &VarEffects) -> VarEffects {
    let mut out = self.clone();
    out.lub_into(other);
    out
  }

  /// Joins `other` into `self`, reporting whether anything changed.
  pub fn lub_into(&mut self, other: &VarEffects) -> bool {
    let mut changed = false;
    for (name, rw) in other.map.iter() {
      let slot = self.map.entry(name.clone()).or_default();
      let joined = slot.lub(*rw);
      if joined != *slot {
        *slot = joined;
        changed = true;
      }
    }
    changed
  }

  /// Two variable-effect maps commute iff every shared key's accesses do;
  /// disjoint keys are disjoint storage.
  pub fn commutes_with(&self, other: &VarEffects) -> bool {
    let (small, large) = if self.map.len() <= other.map.len() {
      (self, other)
    } else {
      (other, self)
    };
    small
      .map
      .iter()
      .all(|(name, rw)| rw.commutes_with(large.get(name)))
  }
}

/// Flat lift of a domain with an explicit extra top: `Top` means the value
/// affects unboundedly many or unknown variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dropped<T> {
  Value(T),
  Top,
}

impl Dropped<VarEffects> {
  pub fn bottom() -> Self {
    Dropped::Value(VarEffects::new())
  }

  pub fn is_top(&self) -> bool {
    matches!(self, Dropped::Top)
  }

  pub fn is_bottom(&self) -> bool {
    matches!(self, Dropped::Value(v) if v.is_bottom())
  }

  pub fn lte(&self, other: &Self) -> bool {
    match (self, other) {
      (_, Dropped::Top) => true,
      (Dropped::Top, Dropped::Value(_)) => false,
      (Dropped::Value(a), Dropped::Value(b)) => a.lte(b),
    }
  }

  pub fn lub(&self, other: &Self) -> Self {
    match (self, other) {
      (Dropped::Top, _) | (_, Dropped::Top) => Dropped::Top,
      (Dropped::Value(a), Dropped::Value(b)) => Dropped::Value(a.lub(b)),
    }
  }

  pub fn lub_into(&mut self, other: &Self) -> bool {
    match (&mut *self, other) {
      (Dropped::Top, _) => false,
      (slot, Dropped::Top) => {
        *slot = Dropped::Top;
        true
      }
      (Dropped::Value(a), Dropped::Value(b)) => a.lub_into(b),
    }
  }

  /// `Top` may write any variable, so it only commutes with a side that
  /// touches no variables at all.
  pub fn commutes_with(&self, other: &Self) -> bool {
    match (self, other) {
      (Dropped::Value(a), Dropped::Value(b)) => a.commutes_with(b),
      (Dropped::Top, other) => other.is_bottom(),
      (this, Dropped::Top) => this.is_bottom(),
    }
  }
}

/// What a tree fragment may read, write or throw: a product of variable
/// effects, a heap access level, and a may-throw flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Effects {
  pub vars: Dropped<VarEffects>,
  pub heap: ReadWrite,
  pub throws: MayThrow,
}

impl Effects {
  pub fn bottom() -> Self {
    Self {
      vars: Dropped::bottom(),
      heap: ReadWrite::None,
      throws: MayThrow::Bottom,
    }
  }

  pub fn top() -> Self {
    Self {
      vars: Dropped::Top,
      heap: ReadWrite::Write,
      throws: MayThrow::Top,
    }
  }

  pub fn var_read(name: &str) -> Self {
    let mut vars = VarEffects::new();
    vars.record(name, ReadWrite::Read);
    Self {
      vars: Dropped::Value(vars),
      ..Self::bottom()
    }
  }

  pub fn var_write(name: &str) -> Self {
    let mut vars = VarEffects::new();
    vars.record(name, ReadWrite::Write);
    Self {
      vars: Dropped::Value(vars),
      ..Self::bottom()
    }
  }

  pub fn heap_read() -> Self {
    Self {
      heap: ReadWrite::Read,
      ..Self::bottom()
    }
  }

  pub fn heap_write() -> Self {
    Self {
      heap: ReadWrite::Write,
      ..Self::bottom()
    }
  }

  pub fn throwing() -> Self {
    Self {
      throws: MayThrow::Top,
      ..Self::bottom()
    }
  }

  pub fn is_bottom(&self) -> bool {
    self.vars.is_bottom() && self.heap.is_bottom() && self.throws.is_bottom()
  }

  pub fn is_top(&self) -> bool {
    self.vars.is_top() && self.heap.is_top() && self.throws.is_top()
  }

  /// Holds iff this fragment may be freely reordered and duplicated relative
  /// to other read-only fragments: no variable writes, no heap writes, no
  /// throws, and a bounded variable set.
  pub fn is_read_only(&self) -> bool {
    match &self.vars {
      Dropped::Top => false,
      Dropped::Value(vars) => {
        vars.all_read() && !self.heap.is_top() && self.throws.is_bottom()
      }
    }
  }

  /// Whether this fragment writes nothing (variables or heap). Throws are
  /// allowed.
  fn is_write_free(&self) -> bool {
    let vars_ok = match &self.vars {
      Dropped::Top => false,
      Dropped::Value(vars) => vars.all_read(),
    };
    vars_ok && !self.heap.is_top()
  }

  pub fn lte(&self, other: &Effects) -> bool {
    self.vars.lte(&other.vars) && self.heap.lte(other.heap) && self.throws.lte(other.throws)
  }

  pub fn lub(&self, other: &Effects) -> Effects {
    let mut out = self.clone();
    out.lub_into(other);
    out
  }

  /// Joins `other` into `self`, reporting whether the accumulator changed.
  /// The changed flag is what fixpoint iteration keys off.
  pub fn lub_into(&mut self, other: &Effects) -> bool {
    let mut changed = self.vars.lub_into(&other.vars);
    let heap = self.heap.lub(other.heap);
    if heap != self.heap {
      self.heap = heap;
      changed = true;
    }
    let throws = self.throws.lub(other.throws);
    if throws != self.throws {
      self.throws = throws;
      changed = true;
    }
    changed
  }

  /// Whether evaluating the two fragments in either order is observably the
  /// same. Computed structurally: variables and heap commute componentwise,
  /// and a fragment that may throw additionally requires the other side to
  /// be write-free (a write ordered across a throw is observable in the
  /// surviving state).
  pub fn commutes_with(&self, other: &Effects) -> bool {
    if !self.vars.commutes_with(&other.vars) {
      return false;
    }
    if !self.heap.commutes_with(other.heap) {
      return false;
    }
    if self.throws.is_top() && !other.is_write_free() {
      return false;
    }
    if other.throws.is_top() && !self.is_write_free() {
      return false;
    }
    true
  }

  /// Drops all variable-effect detail, keeping heap and throw components.
  pub fn without_vars(&self) -> Effects {
    Effects {
      vars: Dropped::bottom(),
      heap: self.heap,
      throws: self.throws,
    }
  }

  /// Removes the named variables' effects: used when leaving a scope whose
  /// locals cannot be observed outside it.
  pub fn hide_vars(&self, names: &HashSet<String>) -> Effects {
    let vars = match &self.vars {
      Dropped::Top => Dropped::Top,
      Dropped::Value(vars) => {
        let mut vars = vars.clone();
        for name in names {
          vars.remove(name);
        }
        Dropped::Value(vars)
      }
    };
    Effects {
      vars,
      heap: self.heap,
      throws: self.throws,
    }
  }

  pub fn without_throws(&self) -> Effects {
    Effects {
      vars: self.vars.clone(),
      heap: self.heap,
      throws: MayThrow::Bottom,
    }
  }
}
