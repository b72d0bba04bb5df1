//! Solver backends.

pub mod bitvec;
pub mod exhaustive;
#[cfg(feature = "z3")]
pub mod z3_backend;

pub use exhaustive::{ExhaustiveSolver, ExhaustiveSort, TermId, DEFAULT_MAX_FREE_BITS};
#[cfg(feature = "z3")]
pub use z3_backend::{Z3Solver, Z3Sort};
