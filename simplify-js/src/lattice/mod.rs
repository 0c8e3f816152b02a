pub mod effects;
pub mod eval_times;
pub mod flow;
pub mod rw;
