//! BTOR2 printer.
//!
//! Renders instructions back to BTOR2 text. Constants are always written as
//! `constd`, so the output re-parses to the same instructions.

use crate::ir::{InstKind, Instruction, SortKind};
use std::fmt;

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.lid, self.keyword())?;
        match &self.kind {
            InstKind::Sort(SortKind::BitVec { width }) => write!(f, " bitvec {width}")?,
            InstKind::Sort(SortKind::Array { index, element }) => {
                write!(f, " array {index} {element}")?
            }
            InstKind::Input { sort, .. } | InstKind::State { sort, .. } => write!(f, " {sort}")?,
            InstKind::Init { sort, state, value } | InstKind::Next { sort, state, value } => {
                write!(f, " {sort} {state} {value}")?
            }
            InstKind::Constraint { cond, .. } | InstKind::Bad { cond, .. } => {
                write!(f, " {cond}")?
            }
            InstKind::Output { value, .. } => write!(f, " {value}")?,
            InstKind::Const { sort, value } => write!(f, " {sort} {value}")?,
            InstKind::Zero { sort } | InstKind::One { sort } | InstKind::Ones { sort } => {
                write!(f, " {sort}")?
            }
            InstKind::Not { sort, operand } => write!(f, " {sort} {operand}")?,
            InstKind::Binary { sort, lhs, rhs, .. } => write!(f, " {sort} {lhs} {rhs}")?,
            InstKind::Ite {
                sort,
                cond,
                then,
                otherwise,
            } => write!(f, " {sort} {cond} {then} {otherwise}")?,
            InstKind::Uext {
                sort, operand, by, ..
            } => write!(f, " {sort} {operand} {by}")?,
            InstKind::Slice {
                sort,
                operand,
                lowbit,
                width,
            } => write!(f, " {sort} {operand} {} {lowbit}", lowbit + width.saturating_sub(1))?,
        }
        if let Some(name) = self.name() {
            write!(f, " {name}")?;
        }
        Ok(())
    }
}

/// Render a whole program, one instruction per line.
pub fn print_program(program: &[Instruction]) -> String {
    let mut out = String::new();
    for inst in program {
        out.push_str(&inst.to_string());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::BinaryOp;

    #[test]
    fn test_print_lines() {
        let program = vec![
            Instruction::new(1, InstKind::Sort(SortKind::BitVec { width: 8 })),
            Instruction::new(
                2,
                InstKind::State {
                    sort: 1,
                    name: Some("r".into()),
                },
            ),
            Instruction::new(3, InstKind::Const { sort: 1, value: 42 }),
            Instruction::new(
                4,
                InstKind::Binary {
                    op: BinaryOp::Ugte,
                    sort: 1,
                    lhs: 2,
                    rhs: 3,
                },
            ),
            Instruction::new(
                5,
                InstKind::Slice {
                    sort: 1,
                    operand: 2,
                    lowbit: 2,
                    width: 3,
                },
            ),
            Instruction::new(
                6,
                InstKind::Bad {
                    cond: 4,
                    name: None,
                },
            ),
        ];
        assert_eq!(
            print_program(&program),
            "1 sort bitvec 8\n2 state 1 r\n3 constd 1 42\n4 ugte 1 2 3\n5 slice 1 2 4 2\n6 bad 4\n"
        );
    }
}
