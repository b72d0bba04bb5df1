//! Bounded Model Checking: unroll the design step by step and query every
//! bad condition under all constraints seen so far.

use crate::engine::SymbolicExecutor;
use crate::solver::{BtorSolver, SolverError};
use crate::{BmcOutcome, SymbolicResult};
use btor2ex_ir::Lid;
use tracing::info;

/// Run bounded model checking for `depth` steps on `exec`.
///
/// Each bad condition is checked in its own assertion scope, so a bad that is
/// unreachable at one step does not constrain later queries. Constraints are
/// re-assumed before every query because backends may drop assumptions.
pub fn check_bmc<S: BtorSolver>(
    exec: &mut SymbolicExecutor<S>,
    depth: usize,
) -> SymbolicResult<BmcOutcome> {
    info!(depth, "starting BMC");

    for _ in 0..depth {
        let step = exec.execute()?;

        let bads: Vec<(Lid, S::Term)> = exec
            .bads()
            .last()
            .map(|frame| frame.iter().map(|(lid, t)| (*lid, t.clone())).collect())
            .unwrap_or_default();
        let constraints: Vec<S::Term> = exec
            .constraints()
            .iter()
            .flat_map(|frame| frame.values().cloned())
            .collect();

        for (bad, cond) in bads {
            let solver = exec.solver_mut();
            solver.push();
            for c in &constraints {
                solver.mk_assume(c);
            }
            solver.mk_assert(&cond);

            match solver.check_sat() {
                Ok(true) => {
                    let model = solver.get_model();
                    solver.pop();
                    let model = model?;
                    info!(step, bad, "bad state reachable, please see log for trace");
                    info!("model:\n{model}");
                    return Ok(BmcOutcome::Unsafe { step, bad, model });
                }
                Ok(false) => {
                    solver.pop();
                    info!(step, bad, "bad state unreachable");
                }
                Err(SolverError::Unknown { reason }) => {
                    solver.pop();
                    info!(step, bad, %reason, "solver returned unknown");
                    return Ok(BmcOutcome::Unknown { step, reason });
                }
                Err(e) => {
                    solver.pop();
                    return Err(e.into());
                }
            }
        }
    }

    info!(depth, "BMC complete, no bad state reachable");
    Ok(BmcOutcome::Safe { depth })
}
