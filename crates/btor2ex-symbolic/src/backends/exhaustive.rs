//! Exhaustive reference backend.
//!
//! Terms live in an arena and are decided by enumerating every assignment of
//! the free variables they reach. Only usable for small search spaces, which
//! makes it a good oracle for tests and a dependency-free default.

use super::bitvec::{self, MAX_WIDTH};
use crate::solver::{BtorSolver, SolverError, SolverResult};
use btor2ex_ir::BinaryOp;
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::debug;

/// Default cap on the number of free bits a query may enumerate.
pub const DEFAULT_MAX_FREE_BITS: u32 = 20;

/// Handle to a term in the solver's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(usize);

/// Bitvector sort of the exhaustive backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExhaustiveSort {
    pub width: u32,
}

#[derive(Debug, Clone)]
enum Node {
    Var(usize),
    Const(u64),
    Not(TermId),
    Binary(BinaryOp, TermId, TermId),
    Ite(TermId, TermId, TermId),
    Slice(TermId, u32, u32),
}

#[derive(Debug, Clone)]
struct TermData {
    node: Node,
    width: u32,
}

#[derive(Debug, Clone)]
struct Var {
    name: String,
    width: u32,
}

/// Brute-force bitvector solver.
#[derive(Debug)]
pub struct ExhaustiveSolver {
    terms: Vec<TermData>,
    vars: Vec<Var>,
    sorts: HashMap<u32, ExhaustiveSort>,
    assertions: Vec<TermId>,
    scopes: Vec<usize>,
    assumptions: Vec<TermId>,
    model: Option<Vec<u64>>,
    max_free_bits: u32,
    /// Width of the first term that exceeded [`MAX_WIDTH`].
    overflow: Option<u32>,
}

impl Default for ExhaustiveSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ExhaustiveSolver {
    pub fn new() -> Self {
        Self::with_max_free_bits(DEFAULT_MAX_FREE_BITS)
    }

    pub fn with_max_free_bits(max_free_bits: u32) -> Self {
        Self {
            terms: Vec::new(),
            vars: Vec::new(),
            sorts: HashMap::new(),
            assertions: Vec::new(),
            scopes: Vec::new(),
            assumptions: Vec::new(),
            model: None,
            max_free_bits,
            overflow: None,
        }
    }

    /// Effective free-bit limit. Enumeration never exceeds 63 bits.
    pub fn max_free_bits(&self) -> u32 {
        self.max_free_bits.min(63)
    }

    /// Width of a term.
    pub fn width(&self, t: TermId) -> u32 {
        self.terms[t.0].width
    }

    /// Value of `t` under the last model, if the last query was satisfiable.
    pub fn model_value(&self, t: TermId) -> Option<u64> {
        let model = self.model.as_ref()?;
        let order = self.reachable(&[t]);
        let mut values = vec![0u64; self.terms.len()];
        self.evaluate(&order, model, &mut values);
        values.get(t.0).copied()
    }

    fn alloc(&mut self, node: Node, width: u32) -> TermId {
        if width > MAX_WIDTH && self.overflow.is_none() {
            self.overflow = Some(width);
        }
        self.terms.push(TermData { node, width });
        TermId(self.terms.len() - 1)
    }

    fn children(&self, t: TermId) -> Vec<TermId> {
        match &self.terms[t.0].node {
            Node::Var(_) | Node::Const(_) => Vec::new(),
            Node::Not(a) | Node::Slice(a, _, _) => vec![*a],
            Node::Binary(_, a, b) => vec![*a, *b],
            Node::Ite(c, t, e) => vec![*c, *t, *e],
        }
    }

    /// Terms reachable from `roots`, in arena order. Children are always
    /// allocated before their parents, so arena order is a topological order.
    fn reachable(&self, roots: &[TermId]) -> Vec<TermId> {
        let mut seen = vec![false; self.terms.len()];
        let mut stack: Vec<TermId> = roots.to_vec();
        while let Some(t) = stack.pop() {
            if seen[t.0] {
                continue;
            }
            seen[t.0] = true;
            stack.extend(self.children(t));
        }
        seen.iter()
            .enumerate()
            .filter(|(_, s)| **s)
            .map(|(i, _)| TermId(i))
            .collect()
    }

    /// Evaluate `order` (topologically sorted) under a full variable
    /// assignment, writing each term's value into `values` at its index.
    fn evaluate(&self, order: &[TermId], assignment: &[u64], values: &mut [u64]) {
        for &t in order {
            let data = &self.terms[t.0];
            let value = match &data.node {
                Node::Var(index) => assignment.get(*index).copied().unwrap_or(0),
                Node::Const(v) => *v,
                Node::Not(a) => bitvec::not(values[a.0], data.width),
                Node::Binary(op, a, b) => bitvec::binary(
                    *op,
                    values[a.0],
                    values[b.0],
                    self.width(*a),
                    self.width(*b),
                ),
                Node::Ite(c, then, otherwise) => {
                    if values[c.0] & 1 != 0 {
                        values[then.0]
                    } else {
                        values[otherwise.0]
                    }
                }
                Node::Slice(a, high, low) => bitvec::slice(values[a.0], *high, *low),
            };
            values[t.0] = value;
        }
    }

    fn format_model(&self, assignment: &[u64]) -> String {
        let mut out = String::new();
        for (index, var) in self.vars.iter().enumerate() {
            let value = assignment.get(index).copied().unwrap_or(0);
            let _ = writeln!(
                out,
                "{} {:0width$b} {}",
                index,
                value,
                var.name,
                width = var.width as usize
            );
        }
        out
    }
}

impl BtorSolver for ExhaustiveSolver {
    type Sort = ExhaustiveSort;
    type Term = TermId;

    fn mk_sort(&mut self, width: u32) -> SolverResult<ExhaustiveSort> {
        if width == 0 || width > MAX_WIDTH {
            return Err(SolverError::UnsupportedWidth { width });
        }
        Ok(*self
            .sorts
            .entry(width)
            .or_insert(ExhaustiveSort { width }))
    }

    fn mk_var(&mut self, name: &str, sort: &ExhaustiveSort) -> SolverResult<TermId> {
        let index = self.vars.len();
        self.vars.push(Var {
            name: name.to_string(),
            width: sort.width,
        });
        Ok(self.alloc(Node::Var(index), sort.width))
    }

    fn mk_const(&mut self, value: u64, sort: &ExhaustiveSort) -> SolverResult<TermId> {
        Ok(self.alloc(
            Node::Const(value & bitvec::mask(sort.width)),
            sort.width,
        ))
    }

    fn mk_assume(&mut self, expr: &TermId) {
        self.assumptions.push(*expr);
    }

    fn mk_assert(&mut self, expr: &TermId) {
        self.assertions.push(*expr);
    }

    fn push(&mut self) {
        self.scopes.push(self.assertions.len());
    }

    fn pop(&mut self) {
        if let Some(len) = self.scopes.pop() {
            self.assertions.truncate(len);
        }
    }

    fn check_sat(&mut self) -> SolverResult<bool> {
        self.model = None;
        let assumptions = std::mem::take(&mut self.assumptions);
        if let Some(width) = self.overflow {
            return Err(SolverError::UnsupportedWidth { width });
        }

        let roots: Vec<TermId> = self
            .assertions
            .iter()
            .chain(assumptions.iter())
            .copied()
            .collect();
        let order = self.reachable(&roots);
        let free: Vec<usize> = order
            .iter()
            .filter_map(|t| match self.terms[t.0].node {
                Node::Var(index) => Some(index),
                _ => None,
            })
            .collect();
        let bits: u32 = free.iter().map(|&i| self.vars[i].width).sum();
        let limit = self.max_free_bits();
        if bits > limit {
            return Err(SolverError::SearchSpaceTooLarge { bits, limit });
        }
        debug!(
            terms = order.len(),
            vars = free.len(),
            bits,
            "enumerating assignments"
        );

        let mut assignment = vec![0u64; self.vars.len()];
        let mut values = vec![0u64; self.terms.len()];
        for counter in 0..(1u64 << bits) {
            let mut rest = counter;
            for &index in &free {
                let width = self.vars[index].width;
                assignment[index] = rest & bitvec::mask(width);
                rest = rest.checked_shr(width).unwrap_or(0);
            }
            self.evaluate(&order, &assignment, &mut values);
            let holds = roots.iter().all(|root| values[root.0] & 1 != 0);
            if holds {
                self.model = Some(assignment);
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn get_model(&mut self) -> SolverResult<String> {
        match &self.model {
            Some(assignment) => Ok(self.format_model(assignment)),
            None => Err(SolverError::NoModel),
        }
    }

    fn not(&mut self, a: &TermId) -> TermId {
        let width = self.width(*a);
        self.alloc(Node::Not(*a), width)
    }

    fn add(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Add, a, b)
    }
    fn sub(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Sub, a, b)
    }
    fn mul(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Mul, a, b)
    }
    fn sdiv(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Sdiv, a, b)
    }
    fn udiv(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Udiv, a, b)
    }
    fn smod(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Smod, a, b)
    }
    fn sll(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Sll, a, b)
    }
    fn srl(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Srl, a, b)
    }
    fn sra(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Sra, a, b)
    }
    fn and(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::And, a, b)
    }
    fn or(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Or, a, b)
    }
    fn xor(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Xor, a, b)
    }
    fn concat(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Concat, a, b)
    }
    fn eq(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Eq, a, b)
    }
    fn neq(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Neq, a, b)
    }
    fn ugt(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Ugt, a, b)
    }
    fn sgt(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Sgt, a, b)
    }
    fn ugte(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Ugte, a, b)
    }
    fn sgte(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Sgte, a, b)
    }
    fn ult(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Ult, a, b)
    }
    fn slt(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Slt, a, b)
    }
    fn ulte(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Ulte, a, b)
    }
    fn slte(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Slte, a, b)
    }
    fn implies(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Implies, a, b)
    }
    fn iff(&mut self, a: &TermId, b: &TermId) -> TermId {
        self.binary(BinaryOp::Iff, a, b)
    }

    fn ite(&mut self, cond: &TermId, then: &TermId, otherwise: &TermId) -> TermId {
        let width = self.width(*then);
        self.alloc(Node::Ite(*cond, *then, *otherwise), width)
    }

    fn uext(&mut self, a: &TermId, by: u32) -> TermId {
        if by == 0 {
            return *a;
        }
        let width = self.width(*a).saturating_add(by);
        let zeros = self.alloc(Node::Const(0), by);
        self.alloc(Node::Binary(BinaryOp::Concat, zeros, *a), width)
    }

    fn slice(&mut self, a: &TermId, high: u32, low: u32) -> TermId {
        self.alloc(Node::Slice(*a, high, low), high.saturating_sub(low) + 1)
    }
}

impl ExhaustiveSolver {
    fn binary(&mut self, op: BinaryOp, a: &TermId, b: &TermId) -> TermId {
        let width = bitvec::result_width(op, self.width(*a), self.width(*b));
        self.alloc(Node::Binary(op, *a, *b), width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bv(s: &mut ExhaustiveSolver, width: u32) -> ExhaustiveSort {
        s.mk_sort(width).unwrap()
    }

    #[test]
    fn test_sorts_are_cached() {
        let mut s = ExhaustiveSolver::new();
        let a = bv(&mut s, 8);
        let b = bv(&mut s, 8);
        assert_eq!(a, b);
        assert!(matches!(
            s.mk_sort(65),
            Err(SolverError::UnsupportedWidth { width: 65 })
        ));
        assert!(s.mk_sort(0).is_err());
    }

    #[test]
    fn test_finds_model() {
        let mut s = ExhaustiveSolver::new();
        let sort = bv(&mut s, 4);
        let x = s.mk_var("x", &sort).unwrap();
        let five = s.mk_const(5, &sort).unwrap();
        let sum = s.add(&x, &five);
        let twelve = s.mk_const(12, &sort).unwrap();
        let goal = s.eq(&sum, &twelve);
        s.mk_assert(&goal);
        assert!(s.check_sat().unwrap());
        assert_eq!(s.model_value(x), Some(7));
        assert_eq!(s.get_model().unwrap(), "0 0111 x\n");
    }

    #[test]
    fn test_unsat_has_no_model() {
        let mut s = ExhaustiveSolver::new();
        let sort = bv(&mut s, 1);
        let x = s.mk_var("x", &sort).unwrap();
        let nx = s.not(&x);
        s.mk_assert(&x);
        s.mk_assert(&nx);
        assert!(!s.check_sat().unwrap());
        assert!(matches!(s.get_model(), Err(SolverError::NoModel)));
    }

    #[test]
    fn test_assumptions_are_dropped_after_query() {
        let mut s = ExhaustiveSolver::new();
        let sort = bv(&mut s, 1);
        let x = s.mk_var("x", &sort).unwrap();
        let nx = s.not(&x);
        s.mk_assert(&x);
        s.mk_assume(&nx);
        assert!(!s.check_sat().unwrap());
        assert!(s.check_sat().unwrap());
    }

    #[test]
    fn test_pop_discards_scoped_assertions() {
        let mut s = ExhaustiveSolver::new();
        let sort = bv(&mut s, 1);
        let x = s.mk_var("x", &sort).unwrap();
        let nx = s.not(&x);
        s.mk_assert(&x);
        s.push();
        s.mk_assert(&nx);
        assert!(!s.check_sat().unwrap());
        s.pop();
        assert!(s.check_sat().unwrap());
        // Unbalanced pops are ignored.
        s.pop();
        assert!(s.check_sat().unwrap());
    }

    #[test]
    fn test_search_space_limit() {
        let mut s = ExhaustiveSolver::with_max_free_bits(8);
        let sort = bv(&mut s, 16);
        let x = s.mk_var("x", &sort).unwrap();
        let zero = s.mk_const(0, &sort).unwrap();
        let goal = s.eq(&x, &zero);
        s.mk_assert(&goal);
        assert!(matches!(
            s.check_sat(),
            Err(SolverError::SearchSpaceTooLarge { bits: 16, limit: 8 })
        ));
    }

    #[test]
    fn test_search_space_limit_reports_the_enforced_cap() {
        let mut s = ExhaustiveSolver::with_max_free_bits(100);
        assert_eq!(s.max_free_bits(), 63);
        let sort = bv(&mut s, 64);
        let x = s.mk_var("x", &sort).unwrap();
        let zero = s.mk_const(0, &sort).unwrap();
        let goal = s.eq(&x, &zero);
        s.mk_assert(&goal);
        assert!(matches!(
            s.check_sat(),
            Err(SolverError::SearchSpaceTooLarge { bits: 64, limit: 63 })
        ));
    }

    #[test]
    fn test_unreachable_vars_do_not_count() {
        let mut s = ExhaustiveSolver::with_max_free_bits(4);
        let wide = bv(&mut s, 32);
        let narrow = bv(&mut s, 1);
        let _unused = s.mk_var("unused", &wide).unwrap();
        let x = s.mk_var("x", &narrow).unwrap();
        s.mk_assert(&x);
        assert!(s.check_sat().unwrap());
        assert_eq!(s.get_model().unwrap(), format!("0 {} unused\n1 1 x\n", "0".repeat(32)));
    }

    #[test]
    fn test_uext_and_slice() {
        let mut s = ExhaustiveSolver::new();
        let sort = bv(&mut s, 4);
        let c = s.mk_const(0b1010, &sort).unwrap();
        let wide = s.uext(&c, 4);
        assert_eq!(s.width(wide), 8);
        let top = s.slice(&wide, 7, 4);
        let low = s.slice(&wide, 3, 1);
        assert_eq!(s.width(low), 3);
        let sort4 = bv(&mut s, 4);
        let zero = s.mk_const(0, &sort4).unwrap();
        let top_zero = s.eq(&top, &zero);
        s.mk_assert(&top_zero);
        assert!(s.check_sat().unwrap());
        assert_eq!(s.model_value(wide), Some(0b1010));
        assert_eq!(s.model_value(low), Some(0b101));
    }

    #[test]
    fn test_oversized_concat_fails_query() {
        let mut s = ExhaustiveSolver::new();
        let sort = bv(&mut s, 40);
        let a = s.mk_const(1, &sort).unwrap();
        let wide = s.concat(&a, &a);
        assert_eq!(s.width(wide), 80);
        assert!(matches!(
            s.check_sat(),
            Err(SolverError::UnsupportedWidth { width: 80 })
        ));
    }

    #[test]
    fn test_ite_selects_branch() {
        let mut s = ExhaustiveSolver::new();
        let bit = bv(&mut s, 1);
        let byte = bv(&mut s, 8);
        let c = s.mk_var("c", &bit).unwrap();
        let a = s.mk_const(3, &byte).unwrap();
        let b = s.mk_const(9, &byte).unwrap();
        let pick = s.ite(&c, &a, &b);
        let nine = s.mk_const(9, &byte).unwrap();
        let goal = s.eq(&pick, &nine);
        s.mk_assert(&goal);
        assert!(s.check_sat().unwrap());
        assert_eq!(s.model_value(c), Some(0));
    }
}
