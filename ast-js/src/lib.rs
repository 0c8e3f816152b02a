pub mod build;
pub mod expr;
pub mod func;
pub mod loc;
pub mod node;
pub mod num;
pub mod operator;
pub mod pat;
pub mod stmt;
pub mod stx;
pub mod vars;
