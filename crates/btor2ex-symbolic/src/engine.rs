//! Symbolic execution engine: time-indexed unrolling of a BTOR2 program.
//!
//! The executor owns its solver and all frames. [`SymbolicExecutor::preprocess`]
//! registers sorts and seeds frame 0 with one variable per state register.
//! Each [`SymbolicExecutor::execute`] call then interprets the whole program
//! once, completing the newest frame and appending the next-state frame.

use crate::bmc::check_bmc;
use crate::solver::{BtorSolver, OpTable};
use crate::sorts::SortTable;
use crate::{BmcOutcome, SymbolicError, SymbolicResult};
use btor2ex_ir::{InstKind, Instruction, Lid, SortKind};
use indexmap::IndexMap;
use std::rc::Rc;
use tracing::{debug, info};

/// Symbolic values keyed by the lid that defines them, in definition order.
pub type Frame<T> = IndexMap<Lid, T>;

/// Bounded unroller over a solver backend.
pub struct SymbolicExecutor<S: BtorSolver> {
    solver: S,
    program: Rc<[Instruction]>,
    /// Declared names, including `uext` rename aliases, mapped to their lid.
    names: IndexMap<String, Lid>,
    /// Base name used for the step variables of each input and state.
    var_names: IndexMap<Lid, String>,
    /// `states[0]` is the seed frame; `states[k]` holds register values at
    /// the start of step `k + 1` and, once executed, every value of that step.
    states: Vec<Frame<S::Term>>,
    bads: Vec<Frame<S::Term>>,
    constraints: Vec<Frame<S::Term>>,
    /// `next` lid to the state it updates.
    nexts: IndexMap<Lid, Lid>,
    /// States without a `next`, with their sort lid. They get a fresh
    /// variable every step.
    free_states: Vec<(Lid, Lid)>,
    sorts: SortTable<S::Sort>,
    oplut: OpTable<S>,
}

impl<S: BtorSolver> SymbolicExecutor<S> {
    pub fn new(solver: S, program: Vec<Instruction>) -> Self {
        let oplut = solver.oplut();
        Self {
            solver,
            program: program.into(),
            names: IndexMap::new(),
            var_names: IndexMap::new(),
            states: Vec::new(),
            bads: Vec::new(),
            constraints: Vec::new(),
            nexts: IndexMap::new(),
            free_states: Vec::new(),
            sorts: SortTable::new(),
            oplut,
        }
    }

    /// Step-qualified variable name.
    fn mk_name(var: &str, step: usize) -> String {
        format!("{var}_{step}")
    }

    fn bind_name(&mut self, lid: Lid, name: String) {
        let base = if self.names.contains_key(&name) {
            format!("{name}@{lid}")
        } else {
            name.clone()
        };
        self.var_names.insert(lid, base);
        self.names.insert(name, lid);
    }

    fn sort_of(&self, lid: Lid, sort: Lid) -> SymbolicResult<S::Sort> {
        self.sorts
            .get(sort)
            .map(|s| s.handle.clone())
            .ok_or(SymbolicError::UnknownSort { lid, sort })
    }

    fn var_name(&self, lid: Lid) -> &str {
        self.var_names.get(&lid).map(String::as_str).unwrap_or("")
    }

    /// Register sorts, names and the `next` map, and build the seed frame.
    ///
    /// Fails if the executor already holds frames.
    pub fn preprocess(&mut self) -> SymbolicResult<()> {
        if !self.states.is_empty() {
            return Err(SymbolicError::AlreadyPreprocessed);
        }
        info!(instructions = self.program.len(), "preprocessing");

        let program = Rc::clone(&self.program);
        let mut seed: Frame<S::Term> = Frame::new();
        let mut has_next: Vec<Lid> = Vec::new();
        let mut state_lids: Vec<(Lid, Lid)> = Vec::new();

        for inst in program.iter() {
            let lid = inst.lid;
            match &inst.kind {
                InstKind::Sort(SortKind::BitVec { width }) => {
                    if !self.sorts.contains(lid) {
                        let handle = self.solver.mk_sort(*width)?;
                        self.sorts.register(lid, *width, handle);
                    }
                }
                InstKind::Sort(SortKind::Array { index, element }) => {
                    return Err(SymbolicError::UnsupportedSort {
                        lid,
                        kind: format!("array {index} {element}"),
                    });
                }
                InstKind::Input { name, .. } => {
                    let name = name.clone().unwrap_or_else(|| format!("input{lid}"));
                    self.bind_name(lid, name);
                }
                InstKind::State { sort, name } => {
                    let name = name.clone().unwrap_or_else(|| format!("state{lid}"));
                    self.bind_name(lid, name);
                    state_lids.push((lid, *sort));
                    let sort = self.sort_of(lid, *sort)?;
                    let var_name = Self::mk_name(self.var_name(lid), 1);
                    seed.insert(lid, self.solver.mk_var(&var_name, &sort)?);
                }
                InstKind::Uext {
                    operand,
                    name: Some(name),
                    ..
                } if inst.is_renaming() => {
                    self.names.insert(name.clone(), *operand);
                }
                InstKind::Next { state, .. } => {
                    self.nexts.insert(lid, *state);
                    has_next.push(*state);
                }
                _ => {}
            }
        }

        self.free_states = state_lids
            .into_iter()
            .filter(|(lid, _)| !has_next.contains(lid))
            .collect();
        debug!(
            sorts = ?self
                .sorts
                .iter()
                .map(|(lid, sort)| (lid, sort.width))
                .collect::<Vec<_>>(),
            "registered sorts"
        );
        debug!(names = ?self.names, "registered names");
        debug!(
            states = seed.len(),
            free = self.free_states.len(),
            "seed frame"
        );
        self.states.push(seed);
        info!("preprocessing complete");
        Ok(())
    }

    /// Unroll one more step. Preprocesses first if needed.
    ///
    /// Returns the 1-based index of the step just unrolled.
    pub fn execute(&mut self) -> SymbolicResult<usize> {
        if self.states.is_empty() {
            self.preprocess()?;
        }
        let step = self.states.len();
        let program = Rc::clone(&self.program);

        let mut curr: Frame<S::Term> = self.states.last().cloned().unwrap_or_default();
        let mut next: Frame<S::Term> = Frame::new();
        let mut bads: Frame<S::Term> = Frame::new();
        let mut constraints: Frame<S::Term> = Frame::new();

        for inst in program.iter() {
            let lid = inst.lid;
            let value = match &inst.kind {
                InstKind::Sort(_) | InstKind::State { .. } | InstKind::Output { .. } => None,
                InstKind::Input { sort, .. } => {
                    let sort = self.sort_of(lid, *sort)?;
                    let name = Self::mk_name(self.var_name(lid), step);
                    Some(self.solver.mk_var(&name, &sort)?)
                }
                InstKind::Init { .. } | InstKind::Ones { .. } => {
                    return Err(SymbolicError::UnsupportedInstruction {
                        lid,
                        keyword: inst.keyword(),
                    });
                }
                InstKind::Const { sort, value } => {
                    let sort = self.sort_of(lid, *sort)?;
                    Some(self.solver.mk_const(*value, &sort)?)
                }
                InstKind::Zero { sort } => {
                    let sort = self.sort_of(lid, *sort)?;
                    Some(self.solver.mk_const(0, &sort)?)
                }
                InstKind::One { sort } => {
                    let sort = self.sort_of(lid, *sort)?;
                    Some(self.solver.mk_const(1, &sort)?)
                }
                InstKind::Not { sort, operand } => {
                    self.sort_of(lid, *sort)?;
                    let a = resolve(&curr, lid, *operand)?;
                    Some(self.solver.not(&a))
                }
                InstKind::Binary { op, sort, lhs, rhs } => {
                    self.sort_of(lid, *sort)?;
                    let a = resolve(&curr, lid, *lhs)?;
                    let b = resolve(&curr, lid, *rhs)?;
                    let f = *self
                        .oplut
                        .get(op)
                        .ok_or(SymbolicError::MissingOperator(*op))?;
                    Some(f(&mut self.solver, &a, &b))
                }
                InstKind::Ite {
                    sort,
                    cond,
                    then,
                    otherwise,
                } => {
                    self.sort_of(lid, *sort)?;
                    let c = resolve(&curr, lid, *cond)?;
                    let t = resolve(&curr, lid, *then)?;
                    let e = resolve(&curr, lid, *otherwise)?;
                    Some(self.solver.ite(&c, &t, &e))
                }
                InstKind::Uext {
                    sort, operand, by, ..
                } => {
                    self.sort_of(lid, *sort)?;
                    let a = resolve(&curr, lid, *operand)?;
                    Some(self.solver.uext(&a, *by))
                }
                InstKind::Slice {
                    sort,
                    operand,
                    lowbit,
                    width,
                } => {
                    self.sort_of(lid, *sort)?;
                    let a = resolve(&curr, lid, *operand)?;
                    let high = lowbit + width.saturating_sub(1);
                    Some(self.solver.slice(&a, high, *lowbit))
                }
                InstKind::Next { value, .. } => {
                    let state = *self
                        .nexts
                        .get(&lid)
                        .ok_or(SymbolicError::MissingNext { lid })?;
                    next.insert(state, resolve(&curr, lid, *value)?);
                    None
                }
                InstKind::Constraint { cond, .. } => {
                    constraints.insert(lid, resolve(&curr, lid, *cond)?);
                    None
                }
                InstKind::Bad { cond, .. } => {
                    bads.insert(lid, resolve(&curr, lid, *cond)?);
                    None
                }
            };
            if let Some(value) = value {
                curr.insert(lid, value);
            }
        }

        for &(lid, sort) in &self.free_states {
            let sort = self.sort_of(lid, sort)?;
            let name = Self::mk_name(self.var_name(lid), step + 1);
            next.insert(lid, self.solver.mk_var(&name, &sort)?);
        }

        debug!(
            step,
            states = next.len(),
            bads = bads.len(),
            constraints = constraints.len(),
            "unrolled step"
        );

        if let Some(last) = self.states.last_mut() {
            *last = curr;
        }
        self.states.push(next);
        self.bads.push(bads);
        self.constraints.push(constraints);
        Ok(step)
    }

    /// Bounded model check up to `depth` steps.
    pub fn bmc(&mut self, depth: usize) -> SymbolicResult<BmcOutcome> {
        check_bmc(self, depth)
    }

    pub fn states(&self) -> &[Frame<S::Term>] {
        &self.states
    }

    pub fn bads(&self) -> &[Frame<S::Term>] {
        &self.bads
    }

    pub fn constraints(&self) -> &[Frame<S::Term>] {
        &self.constraints
    }

    pub fn names(&self) -> &IndexMap<String, Lid> {
        &self.names
    }

    pub fn next_map(&self) -> &IndexMap<Lid, Lid> {
        &self.nexts
    }

    pub fn sorts(&self) -> &SortTable<S::Sort> {
        &self.sorts
    }

    /// Number of executed steps.
    pub fn step(&self) -> usize {
        self.bads.len()
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    pub fn into_solver(self) -> S {
        self.solver
    }
}

fn resolve<T: Clone>(frame: &Frame<T>, lid: Lid, operand: Lid) -> SymbolicResult<T> {
    frame
        .get(&operand)
        .cloned()
        .ok_or(SymbolicError::UnresolvedOperand { lid, operand })
}
