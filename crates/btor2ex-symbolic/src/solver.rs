//! Solver capability interface.
//!
//! The engine is written purely against [`BtorSolver`]. A backend supplies
//! sort, variable and constant construction, one method per BTOR2 operator,
//! and the query calls used by the BMC driver.
//!
//! All values are bitvectors. Booleans are 1-bit bitvectors, so comparison
//! results, `ite` conditions, assumptions and assertions are all width 1.

use btor2ex_ir::BinaryOp;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Backend failure.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The solver could not decide the query (timeout, resource limit).
    #[error("solver returned unknown: {reason}")]
    Unknown { reason: String },

    #[error("bitvector width {width} is not supported by this backend")]
    UnsupportedWidth { width: u32 },

    #[error("search space of {bits} free bits exceeds the limit of {limit}")]
    SearchSpaceTooLarge { bits: u32, limit: u32 },

    #[error("no model available: the last query was not satisfiable")]
    NoModel,

    #[error("backend error: {0}")]
    Backend(String),
}

pub type SolverResult<T> = Result<T, SolverError>;

/// A binary operator method of a backend.
pub type BinaryFn<S> =
    fn(&mut S, &<S as BtorSolver>::Term, &<S as BtorSolver>::Term) -> <S as BtorSolver>::Term;

/// Operator lookup table used for generic binary dispatch.
pub type OpTable<S> = HashMap<BinaryOp, BinaryFn<S>>;

/// Capabilities a bitvector SMT backend must provide.
///
/// Numeric semantics follow BTOR2, which in turn follows SMT-LIB fixed-width
/// two's complement arithmetic (division by zero included).
pub trait BtorSolver: Sized {
    /// Backend sort handle. Equal widths must yield equal sorts.
    type Sort: Clone + PartialEq + fmt::Debug;
    /// Backend symbolic value.
    type Term: Clone + fmt::Debug;

    /// Bitvector sort of the given width. Idempotent; backends cache by width.
    fn mk_sort(&mut self, width: u32) -> SolverResult<Self::Sort>;

    /// Fresh variable. Callers keep `name` unique.
    fn mk_var(&mut self, name: &str, sort: &Self::Sort) -> SolverResult<Self::Term>;

    /// Literal constant, truncated to the sort width.
    fn mk_const(&mut self, value: u64, sort: &Self::Sort) -> SolverResult<Self::Term>;

    /// Hypothesis for the next [`check_sat`](Self::check_sat) only.
    ///
    /// Backends may drop assumptions after every query. Callers re-register
    /// them before each query.
    fn mk_assume(&mut self, expr: &Self::Term);

    /// Assertion that holds until the enclosing scope is popped.
    fn mk_assert(&mut self, expr: &Self::Term);

    /// Open an assertion scope.
    fn push(&mut self);

    /// Drop every assertion made since the matching [`push`](Self::push).
    fn pop(&mut self);

    /// True if the assertions and pending assumptions are satisfiable.
    fn check_sat(&mut self) -> SolverResult<bool>;

    /// Textual model. Only valid right after a satisfiable `check_sat`.
    fn get_model(&mut self) -> SolverResult<String>;

    fn not(&mut self, a: &Self::Term) -> Self::Term;

    fn add(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn sub(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn mul(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn sdiv(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn udiv(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    /// Signed remainder whose sign follows the divisor.
    fn smod(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn sll(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn srl(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn sra(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn and(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn or(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn xor(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    /// `a` in the high bits, `b` in the low bits.
    fn concat(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn eq(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn neq(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn ugt(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn sgt(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn ugte(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn sgte(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn ult(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn slt(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn ulte(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn slte(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn implies(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;
    fn iff(&mut self, a: &Self::Term, b: &Self::Term) -> Self::Term;

    /// `cond` is 1-bit; `then` and `otherwise` share a sort.
    fn ite(&mut self, cond: &Self::Term, then: &Self::Term, otherwise: &Self::Term)
        -> Self::Term;

    /// Zero-extend by `by` bits.
    fn uext(&mut self, a: &Self::Term, by: u32) -> Self::Term;

    /// Bits `high` down to `low`, both inclusive.
    fn slice(&mut self, a: &Self::Term, high: u32, low: u32) -> Self::Term;

    /// Map every binary operator tag to its method.
    fn oplut(&self) -> OpTable<Self> {
        BinaryOp::ALL
            .iter()
            .map(|&op| (op, binary_fn::<Self>(op)))
            .collect()
    }
}

/// The method of `S` that implements `op`.
pub fn binary_fn<S: BtorSolver>(op: BinaryOp) -> BinaryFn<S> {
    match op {
        BinaryOp::Add => S::add,
        BinaryOp::Sub => S::sub,
        BinaryOp::Mul => S::mul,
        BinaryOp::Sdiv => S::sdiv,
        BinaryOp::Udiv => S::udiv,
        BinaryOp::Smod => S::smod,
        BinaryOp::Sll => S::sll,
        BinaryOp::Srl => S::srl,
        BinaryOp::Sra => S::sra,
        BinaryOp::And => S::and,
        BinaryOp::Or => S::or,
        BinaryOp::Xor => S::xor,
        BinaryOp::Concat => S::concat,
        BinaryOp::Eq => S::eq,
        BinaryOp::Neq => S::neq,
        BinaryOp::Ugt => S::ugt,
        BinaryOp::Sgt => S::sgt,
        BinaryOp::Ugte => S::ugte,
        BinaryOp::Sgte => S::sgte,
        BinaryOp::Ult => S::ult,
        BinaryOp::Slt => S::slt,
        BinaryOp::Ulte => S::ulte,
        BinaryOp::Slte => S::slte,
        BinaryOp::Implies => S::implies,
        BinaryOp::Iff => S::iff,
    }
}
