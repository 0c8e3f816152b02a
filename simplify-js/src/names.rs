use ahash::HashSet;
use ahash::HashSetExt;
use once_cell::sync::Lazy;

const FIRST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_";
const NON_FIRST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_0123456789";

// Words that cannot be used as binding identifiers, including literals that
// lex as keywords and the strict-mode restricted names.
static RESERVED_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  [
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "finally", "for", "function", "if",
    "import", "in", "instanceof", "let", "new", "package", "return", "static", "super", "switch",
    "this", "throw", "try", "typeof", "var", "void", "while", "with", "yield", "true", "false",
    "null", "eval", "arguments",
  ]
  .into_iter()
  .collect()
});

fn encode(mut n: usize) -> String {
  let mut out = String::new();
  let first = FIRST_CHARS[n % FIRST_CHARS.len()] as char;
  out.push(first);
  n /= FIRST_CHARS.len();
  while n > 0 {
    let c = NON_FIRST_CHARS[n % NON_FIRST_CHARS.len()] as char;
    out.push(c);
    n /= NON_FIRST_CHARS.len();
  }
  out
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopeId(usize);

struct ScopeRec {
  parent: Option<ScopeId>,
  /// Names this scope has allocated.
  bound: HashSet<String>,
  /// Names allocated by any descendant scope. Ancestors never reuse a
  /// descendant's name, since the ancestor's references inside the
  /// descendant's region would be captured.
  claimed_by_descendants: HashSet<String>,
  /// Candidate counter. Per-scope, so sibling scopes restart the canonical
  /// sequence and may legally reuse each other's names.
  counter: usize,
}

/// Hierarchical fresh-identifier allocator: a tree of scopes sharing one
/// exclusion set (reserved words plus every name occurring in the program).
pub struct NameSupply {
  excluded: HashSet<String>,
  scopes: Vec<ScopeRec>,
}

impl NameSupply {
  /// `program_names` should contain every identifier name the input tree
  /// mentions, standing in for declared globals: generated names then stay
  /// disjoint from all program names.
  pub fn new(program_names: impl IntoIterator<Item = String>) -> Self {
    let mut excluded: HashSet<String> =
      RESERVED_NAMES.iter().map(|name| name.to_string()).collect();
    excluded.extend(program_names);
    Self {
      excluded,
      scopes: vec![ScopeRec {
        parent: None,
        bound: HashSet::new(),
        claimed_by_descendants: HashSet::new(),
        counter: 0,
      }],
    }
  }

  pub fn root(&self) -> ScopeId {
    ScopeId(0)
  }

  /// Creates a child scope. The child sees everything bound in its ancestors
  /// but is invisible to its siblings.
  pub fn fork(&mut self, parent: ScopeId) -> ScopeId {
    let id = ScopeId(self.scopes.len());
    self.scopes.push(ScopeRec {
      parent: Some(parent),
      bound: HashSet::new(),
      claimed_by_descendants: HashSet::new(),
      counter: 0,
    });
    id
  }

  fn is_taken(&self, scope: ScopeId, candidate: &str) -> bool {
    if self.excluded.contains(candidate) {
      return true;
    }
    if self.scopes[scope.0]
      .claimed_by_descendants
      .contains(candidate)
    {
      return true;
    }
    let mut current = Some(scope);
    while let Some(id) = current {
      let rec = &self.scopes[id.0];
      if rec.bound.contains(candidate) {
        return true;
      }
      current = rec.parent;
    }
    false
  }

  /// Returns the first acceptable name in the canonical candidate sequence,
  /// records it as bound in `scope`, and propagates the claim to every
  /// ancestor.
  pub fn gen_sym(&mut self, scope: ScopeId) -> String {
    loop {
      let candidate = encode(self.scopes[scope.0].counter);
      self.scopes[scope.0].counter += 1;
      if self.is_taken(scope, &candidate) {
        continue;
      }
      self.scopes[scope.0].bound.insert(candidate.clone());
      let mut current = self.scopes[scope.0].parent;
      while let Some(id) = current {
        self.scopes[id.0]
          .claimed_by_descendants
          .insert(candidate.clone());
        current = self.scopes[id.0].parent;
      }
      return candidate;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn skips_program_names_and_reserved() {
    let mut supply = NameSupply::new(["a".to_string(), "b".to_string()]);
    let root = supply.root();
    assert_eq!(supply.gen_sym(root), "c");
    assert_eq!(supply.gen_sym(root), "d");
  }

  #[test]
  fn nested_scopes_never_collide() {
    let mut supply = NameSupply::new([]);
    let root = supply.root();
    let child = supply.fork(root);
    let grandchild = supply.fork(child);
    let inner = supply.gen_sym(grandchild);
    let mid = supply.gen_sym(child);
    let outer = supply.gen_sym(root);
    assert_ne!(inner, mid);
    assert_ne!(inner, outer);
    assert_ne!(mid, outer);
  }

  #[test]
  fn ancestors_skip_descendant_claims() {
    let mut supply = NameSupply::new([]);
    let root = supply.root();
    let child = supply.fork(root);
    let name = supply.gen_sym(child);
    assert_eq!(name, "a");
    // The root must not reuse a name claimed under it.
    assert_eq!(supply.gen_sym(root), "b");
  }

  #[test]
  fn siblings_may_reuse_names() {
    let mut supply = NameSupply::new([]);
    let root = supply.root();
    let left = supply.fork(root);
    let right = supply.fork(root);
    assert_eq!(supply.gen_sym(left), "a");
    assert_eq!(supply.gen_sym(right), "a");
  }

  #[test]
  fn child_sees_ancestor_bindings() {
    let mut supply = NameSupply::new([]);
    let root = supply.root();
    assert_eq!(supply.gen_sym(root), "a");
    let child = supply.fork(root);
    assert_eq!(supply.gen_sym(child), "b");
  }
}
