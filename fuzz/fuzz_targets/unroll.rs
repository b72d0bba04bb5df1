#![no_main]
use btor2ex_symbolic::{ExhaustiveSolver, SymbolicExecutor};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(program) = btor2ex_ir::parse(s) {
            // Errors are fine; panics are not.
            let mut exec = SymbolicExecutor::new(ExhaustiveSolver::with_max_free_bits(8), program);
            let _ = exec.bmc(2);
        }
    }
});
