//! Tree-to-tree JavaScript simplifier: constant folding, dead-branch
//! elimination, and provably-safe inlining of calls to function literals,
//! justified by a small abstract-interpretation engine over effect,
//! evaluation-count, and control-flow lattices.

pub mod accumulate;
pub mod check;
pub mod lattice;
pub mod names;
pub mod simplify;

pub use simplify::simplify;
pub use simplify::simplify_stmts;
