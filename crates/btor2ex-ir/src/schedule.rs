//! Proof-schedule counter generation.
//!
//! A proof schedule is a free-running counter that designs can reference to
//! stage their assumptions. [`ProofSchedule`] emits the BTOR2 fragment for
//! such a counter so it can be spliced into a program before unrolling.

use crate::ir::{max_lid, BinaryOp, InstKind, Instruction, Lid, SortKind};

/// Default name of the generated counter state.
pub const DEFAULT_COUNTER_NAME: &str = "fv__counter";

/// Generator for a bounded counter sub-program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofSchedule {
    counter_name: String,
    num_steps: u64,
}

impl Default for ProofSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_COUNTER_NAME, 2)
    }
}

impl ProofSchedule {
    pub fn new(counter_name: impl Into<String>, num_steps: u64) -> Self {
        Self {
            counter_name: counter_name.into(),
            num_steps,
        }
    }

    pub fn counter_name(&self) -> &str {
        &self.counter_name
    }

    pub fn num_steps(&self) -> u64 {
        self.num_steps
    }

    /// Bits needed to count `0..num_steps`, never less than one.
    pub fn counter_width(&self) -> u32 {
        let max = self.num_steps.saturating_sub(1);
        (u64::BITS - max.leading_zeros()).max(1)
    }

    /// Emit the counter fragment with lids `start_lid..start_lid + 6`.
    ///
    /// Order: sort, zero, one, counter state, `one + counter`, next.
    pub fn subprogram(&self, start_lid: Lid) -> Vec<Instruction> {
        let sort = start_lid;
        let zero = start_lid + 1;
        let one = start_lid + 2;
        let counter = start_lid + 3;
        let add_one = start_lid + 4;
        let next = start_lid + 5;

        vec![
            Instruction::new(
                sort,
                InstKind::Sort(SortKind::BitVec {
                    width: self.counter_width(),
                }),
            ),
            Instruction::new(zero, InstKind::Const { sort, value: 0 }),
            Instruction::new(one, InstKind::Const { sort, value: 1 }),
            Instruction::new(
                counter,
                InstKind::State {
                    sort,
                    name: Some(self.counter_name.clone()),
                },
            ),
            Instruction::new(
                add_one,
                InstKind::Binary {
                    op: BinaryOp::Add,
                    sort,
                    lhs: one,
                    rhs: counter,
                },
            ),
            Instruction::new(
                next,
                InstKind::Next {
                    sort,
                    state: counter,
                    value: add_one,
                },
            ),
        ]
    }

    /// Generate the counter for `program`, numbered after its last lid.
    ///
    /// The result is not spliced into `program`; see [`ProofSchedule::splice`].
    pub fn run(&self, program: &[Instruction]) -> Vec<Instruction> {
        let last = program.last().map(|inst| inst.lid).unwrap_or(0);
        self.subprogram(last.max(max_lid(program)) + 1)
    }

    /// Append the generated counter to a copy of `program`.
    pub fn splice(&self, program: &[Instruction]) -> Vec<Instruction> {
        let mut out = program.to_vec();
        out.extend(self.run(program));
        out
    }
}
