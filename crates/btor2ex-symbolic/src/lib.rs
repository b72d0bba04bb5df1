//! Symbolic execution and bounded model checking for BTOR2 programs.
//!
//! [`SymbolicExecutor`] unrolls a program over any [`BtorSolver`] backend,
//! and [`check`] runs the whole pipeline with a configured backend.

pub mod backends;
pub mod bmc;
pub mod engine;
pub mod solver;
pub mod sorts;

pub use backends::{ExhaustiveSolver, DEFAULT_MAX_FREE_BITS};
#[cfg(feature = "z3")]
pub use backends::Z3Solver;
pub use engine::{Frame, SymbolicExecutor};
pub use solver::{BtorSolver, OpTable, SolverError, SolverResult};
pub use sorts::{BvSort, SortTable};

use btor2ex_ir::{BinaryOp, Instruction, Lid};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Symbolic execution error.
#[derive(Debug, Error)]
pub enum SymbolicError {
    #[error("unsupported sort at {lid}: {kind}")]
    UnsupportedSort { lid: Lid, kind: String },

    #[error("unsupported instruction '{keyword}' at {lid}")]
    UnsupportedInstruction { lid: Lid, keyword: &'static str },

    #[error("program is already preprocessed")]
    AlreadyPreprocessed,

    #[error("instruction {lid} refers to unknown sort {sort}")]
    UnknownSort { lid: Lid, sort: Lid },

    #[error("instruction {lid} refers to {operand}, which has no value")]
    UnresolvedOperand { lid: Lid, operand: Lid },

    #[error("next instruction {lid} was not registered during preprocessing")]
    MissingNext { lid: Lid },

    #[error("solver provides no method for '{0}'")]
    MissingOperator(BinaryOp),

    #[error("solver backend '{name}' is not compiled in")]
    BackendUnavailable { name: &'static str },

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type SymbolicResult<T> = Result<T, SymbolicError>;

/// Result of bounded model checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BmcOutcome {
    /// No bad condition is reachable within `depth` steps.
    Safe { depth: usize },
    /// The bad instruction `bad` is reachable at `step` (1-based).
    Unsafe {
        step: usize,
        bad: Lid,
        model: String,
    },
    /// The solver could not decide a query.
    Unknown { step: usize, reason: String },
}

impl BmcOutcome {
    pub fn is_safe(&self) -> bool {
        matches!(self, BmcOutcome::Safe { .. })
    }

    pub fn is_unsafe(&self) -> bool {
        matches!(self, BmcOutcome::Unsafe { .. })
    }
}

/// Solver backend selection.
///
/// Z3 is the verification backend. A build without the `z3` feature
/// refuses it with [`SymbolicError::BackendUnavailable`] instead of
/// falling back to the enumerating solver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SolverKind {
    /// Built-in enumerating solver; test oracle for small designs.
    Exhaustive,
    /// Z3, available with the `z3` feature (on by default).
    #[default]
    Z3,
}

impl SolverKind {
    pub fn name(self) -> &'static str {
        match self {
            SolverKind::Exhaustive => "exhaustive",
            SolverKind::Z3 => "z3",
        }
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exhaustive" => Ok(SolverKind::Exhaustive),
            "z3" => Ok(SolverKind::Z3),
            other => Err(format!("unknown solver '{other}' (expected exhaustive or z3)")),
        }
    }
}

/// Configuration for a BMC run.
#[derive(Debug, Clone)]
pub struct BmcConfig {
    pub depth: usize,
    pub solver: SolverKind,
    /// Per-query timeout; honoured by the Z3 backend.
    pub timeout_ms: Option<u64>,
    /// Free-bit limit of the exhaustive backend.
    pub max_free_bits: u32,
}

impl Default for BmcConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            solver: SolverKind::default(),
            timeout_ms: None,
            max_free_bits: DEFAULT_MAX_FREE_BITS,
        }
    }
}

/// Run bounded model checking on `program` with the configured backend.
pub fn check(program: Vec<Instruction>, config: &BmcConfig) -> SymbolicResult<BmcOutcome> {
    match config.solver {
        SolverKind::Exhaustive => {
            let solver = ExhaustiveSolver::with_max_free_bits(config.max_free_bits);
            SymbolicExecutor::new(solver, program).bmc(config.depth)
        }
        SolverKind::Z3 => check_z3(program, config),
    }
}

#[cfg(feature = "z3")]
fn check_z3(program: Vec<Instruction>, config: &BmcConfig) -> SymbolicResult<BmcOutcome> {
    let solver = match config.timeout_ms {
        Some(ms) => Z3Solver::with_timeout_ms(ms),
        None => Z3Solver::new(),
    };
    SymbolicExecutor::new(solver, program).bmc(config.depth)
}

#[cfg(not(feature = "z3"))]
fn check_z3(_program: Vec<Instruction>, _config: &BmcConfig) -> SymbolicResult<BmcOutcome> {
    Err(SymbolicError::BackendUnavailable { name: "z3" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::exhaustive::ExhaustiveSort;
    use crate::solver::binary_fn;

    #[test]
    fn test_oplut_covers_every_operator() {
        let solver = ExhaustiveSolver::new();
        let table = solver.oplut();
        assert_eq!(table.len(), BinaryOp::ALL.len());
        for op in BinaryOp::ALL {
            assert!(table.contains_key(&op), "missing {op}");
        }
    }

    #[test]
    fn test_oplut_dispatches_to_the_named_method() {
        let mut s = ExhaustiveSolver::new();
        let sort: ExhaustiveSort = s.mk_sort(8).unwrap();
        let a = s.mk_const(200, &sort).unwrap();
        let b = s.mk_const(100, &sort).unwrap();
        let sum = binary_fn::<ExhaustiveSolver>(BinaryOp::Add)(&mut s, &a, &b);
        let expected = s.mk_const(44, &sort).unwrap();
        let ok = s.eq(&sum, &expected);
        s.mk_assert(&ok);
        assert!(s.check_sat().unwrap());
    }

    #[test]
    fn test_solver_kind_parse() {
        assert_eq!("z3".parse::<SolverKind>(), Ok(SolverKind::Z3));
        assert_eq!(
            "exhaustive".parse::<SolverKind>(),
            Ok(SolverKind::Exhaustive)
        );
        assert!("boolector".parse::<SolverKind>().is_err());
        assert_eq!(SolverKind::Exhaustive.to_string(), "exhaustive");
    }

    #[test]
    fn test_default_backend_is_z3() {
        assert_eq!(SolverKind::default(), SolverKind::Z3);
        assert_eq!(BmcConfig::default().solver, SolverKind::Z3);
    }

    #[cfg(not(feature = "z3"))]
    #[test]
    fn test_z3_unavailable_without_feature() {
        let config = BmcConfig::default();
        assert!(matches!(
            check(Vec::new(), &config),
            Err(SymbolicError::BackendUnavailable { name: "z3" })
        ));
    }
}
