//! Z3 backend.
//!
//! Every BTOR2 value is a Z3 bitvector. Z3 predicates are Bools, so
//! comparison results are turned back into 1-bit vectors with an `ite`, and
//! 1-bit conditions become Bools by comparing against `#b1`.

use crate::solver::{BtorSolver, SolverError, SolverResult};
use std::collections::HashMap;
use z3::ast::{Ast, Bool, BV};
use z3::{Params, SatResult, Solver};

/// Bitvector sort of the Z3 backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Z3Sort {
    pub width: u32,
}

/// Incremental Z3 solver with per-query assumptions.
pub struct Z3Solver {
    solver: Solver,
    sorts: HashMap<u32, Z3Sort>,
    assumptions: Vec<Bool>,
    has_model: bool,
}

impl Default for Z3Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Z3Solver {
    pub fn new() -> Self {
        Self {
            solver: Solver::new(),
            sorts: HashMap::new(),
            assumptions: Vec::new(),
            has_model: false,
        }
    }

    /// Solver whose queries give up after `timeout_ms` milliseconds.
    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        let s = Self::new();
        if timeout_ms > 0 {
            let mut params = Params::new();
            params.set_u32("timeout", timeout_ms.min(u32::MAX as u64) as u32);
            s.solver.set_params(&params);
        }
        s
    }

    fn to_bool(t: &BV) -> Bool {
        t.eq(&BV::from_u64(1, 1))
    }

    fn from_bool(b: &Bool) -> BV {
        b.ite(&BV::from_u64(1, 1), &BV::from_u64(0, 1))
    }
}

impl BtorSolver for Z3Solver {
    type Sort = Z3Sort;
    type Term = BV;

    fn mk_sort(&mut self, width: u32) -> SolverResult<Z3Sort> {
        if width == 0 {
            return Err(SolverError::UnsupportedWidth { width });
        }
        Ok(*self.sorts.entry(width).or_insert(Z3Sort { width }))
    }

    fn mk_var(&mut self, name: &str, sort: &Z3Sort) -> SolverResult<BV> {
        Ok(BV::new_const(name, sort.width))
    }

    fn mk_const(&mut self, value: u64, sort: &Z3Sort) -> SolverResult<BV> {
        if sort.width >= 64 {
            let wide = BV::from_u64(value, 64);
            return Ok(if sort.width == 64 {
                wide
            } else {
                wide.zero_ext(sort.width - 64)
            });
        }
        Ok(BV::from_u64(value & ((1u64 << sort.width) - 1), sort.width))
    }

    fn mk_assume(&mut self, expr: &BV) {
        self.assumptions.push(Self::to_bool(expr));
    }

    fn mk_assert(&mut self, expr: &BV) {
        self.solver.assert(&Self::to_bool(expr));
    }

    fn push(&mut self) {
        self.solver.push();
    }

    fn pop(&mut self) {
        self.solver.pop(1);
    }

    fn check_sat(&mut self) -> SolverResult<bool> {
        let assumptions = std::mem::take(&mut self.assumptions);
        self.has_model = false;
        match self.solver.check_assumptions(&assumptions) {
            SatResult::Sat => {
                self.has_model = true;
                Ok(true)
            }
            SatResult::Unsat => Ok(false),
            SatResult::Unknown => Err(SolverError::Unknown {
                reason: self
                    .solver
                    .get_reason_unknown()
                    .unwrap_or_else(|| "Z3 returned unknown".to_string()),
            }),
        }
    }

    fn get_model(&mut self) -> SolverResult<String> {
        if !self.has_model {
            return Err(SolverError::NoModel);
        }
        let model = self.solver.get_model().ok_or(SolverError::NoModel)?;
        Ok(model.to_string())
    }

    fn not(&mut self, a: &BV) -> BV {
        a.bvnot()
    }

    fn add(&mut self, a: &BV, b: &BV) -> BV {
        a.bvadd(b)
    }
    fn sub(&mut self, a: &BV, b: &BV) -> BV {
        a.bvsub(b)
    }
    fn mul(&mut self, a: &BV, b: &BV) -> BV {
        a.bvmul(b)
    }
    fn sdiv(&mut self, a: &BV, b: &BV) -> BV {
        a.bvsdiv(b)
    }
    fn udiv(&mut self, a: &BV, b: &BV) -> BV {
        a.bvudiv(b)
    }
    fn smod(&mut self, a: &BV, b: &BV) -> BV {
        a.bvsmod(b)
    }
    fn sll(&mut self, a: &BV, b: &BV) -> BV {
        a.bvshl(b)
    }
    fn srl(&mut self, a: &BV, b: &BV) -> BV {
        a.bvlshr(b)
    }
    fn sra(&mut self, a: &BV, b: &BV) -> BV {
        a.bvashr(b)
    }
    fn and(&mut self, a: &BV, b: &BV) -> BV {
        a.bvand(b)
    }
    fn or(&mut self, a: &BV, b: &BV) -> BV {
        a.bvor(b)
    }
    fn xor(&mut self, a: &BV, b: &BV) -> BV {
        a.bvxor(b)
    }
    fn concat(&mut self, a: &BV, b: &BV) -> BV {
        a.concat(b)
    }
    fn eq(&mut self, a: &BV, b: &BV) -> BV {
        Self::from_bool(&a.eq(b))
    }
    fn neq(&mut self, a: &BV, b: &BV) -> BV {
        Self::from_bool(&a.eq(b).not())
    }
    fn ugt(&mut self, a: &BV, b: &BV) -> BV {
        Self::from_bool(&a.bvugt(b))
    }
    fn sgt(&mut self, a: &BV, b: &BV) -> BV {
        Self::from_bool(&a.bvsgt(b))
    }
    fn ugte(&mut self, a: &BV, b: &BV) -> BV {
        Self::from_bool(&a.bvuge(b))
    }
    fn sgte(&mut self, a: &BV, b: &BV) -> BV {
        Self::from_bool(&a.bvsge(b))
    }
    fn ult(&mut self, a: &BV, b: &BV) -> BV {
        Self::from_bool(&a.bvult(b))
    }
    fn slt(&mut self, a: &BV, b: &BV) -> BV {
        Self::from_bool(&a.bvslt(b))
    }
    fn ulte(&mut self, a: &BV, b: &BV) -> BV {
        Self::from_bool(&a.bvule(b))
    }
    fn slte(&mut self, a: &BV, b: &BV) -> BV {
        Self::from_bool(&a.bvsle(b))
    }
    fn implies(&mut self, a: &BV, b: &BV) -> BV {
        a.bvnot().bvor(b)
    }
    fn iff(&mut self, a: &BV, b: &BV) -> BV {
        a.bvxor(b).bvnot()
    }

    fn ite(&mut self, cond: &BV, then: &BV, otherwise: &BV) -> BV {
        Self::to_bool(cond).ite(then, otherwise)
    }

    fn uext(&mut self, a: &BV, by: u32) -> BV {
        if by == 0 {
            a.clone()
        } else {
            a.zero_ext(by)
        }
    }

    fn slice(&mut self, a: &BV, high: u32, low: u32) -> BV {
        a.extract(high, low)
    }
}
