//! Bounded fan-out for independent per-item work (one compile per source file).

mod scheduler;

pub use scheduler::run_bounded;
