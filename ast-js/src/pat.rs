/// An identifier binding site (declaration, parameter, catch parameter,
/// function name). Destructuring patterns are outside the closed node set.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IdPat {
  pub name: String,
}
