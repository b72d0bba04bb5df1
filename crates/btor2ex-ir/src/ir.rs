//! Instruction model for BTOR2 programs.

/// Literal id: the unique number that labels every BTOR2 line.
pub type Lid = u64;

/// Payload of a `sort` instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKind {
    /// Fixed-width bitvector.
    BitVec { width: u32 },
    /// Array from index sort to element sort. Parsed, never interpreted.
    Array { index: Lid, element: Lid },
}

impl SortKind {
    /// Bitvector width, or `None` for array sorts.
    pub fn width(&self) -> Option<u32> {
        match self {
            SortKind::BitVec { width } => Some(*width),
            SortKind::Array { .. } => None,
        }
    }
}

/// Binary bitvector operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Sdiv,
    Udiv,
    Smod,
    Sll,
    Srl,
    Sra,
    And,
    Or,
    Xor,
    Concat,
    Eq,
    Neq,
    Ugt,
    Sgt,
    Ugte,
    Sgte,
    Ult,
    Slt,
    Ulte,
    Slte,
    Implies,
    Iff,
}

impl BinaryOp {
    /// Every binary operator, in declaration order.
    pub const ALL: [BinaryOp; 25] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Sdiv,
        BinaryOp::Udiv,
        BinaryOp::Smod,
        BinaryOp::Sll,
        BinaryOp::Srl,
        BinaryOp::Sra,
        BinaryOp::And,
        BinaryOp::Or,
        BinaryOp::Xor,
        BinaryOp::Concat,
        BinaryOp::Eq,
        BinaryOp::Neq,
        BinaryOp::Ugt,
        BinaryOp::Sgt,
        BinaryOp::Ugte,
        BinaryOp::Sgte,
        BinaryOp::Ult,
        BinaryOp::Slt,
        BinaryOp::Ulte,
        BinaryOp::Slte,
        BinaryOp::Implies,
        BinaryOp::Iff,
    ];

    /// The BTOR2 keyword for this operator.
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Sdiv => "sdiv",
            BinaryOp::Udiv => "udiv",
            BinaryOp::Smod => "smod",
            BinaryOp::Sll => "sll",
            BinaryOp::Srl => "srl",
            BinaryOp::Sra => "sra",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Xor => "xor",
            BinaryOp::Concat => "concat",
            BinaryOp::Eq => "eq",
            BinaryOp::Neq => "neq",
            BinaryOp::Ugt => "ugt",
            BinaryOp::Sgt => "sgt",
            BinaryOp::Ugte => "ugte",
            BinaryOp::Sgte => "sgte",
            BinaryOp::Ult => "ult",
            BinaryOp::Slt => "slt",
            BinaryOp::Ulte => "ulte",
            BinaryOp::Slte => "slte",
            BinaryOp::Implies => "implies",
            BinaryOp::Iff => "iff",
        }
    }

    /// Look up an operator by its BTOR2 keyword.
    pub fn from_name(name: &str) -> Option<Self> {
        BinaryOp::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// True for operators whose result is a single bit regardless of operand width.
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::Neq
                | BinaryOp::Ugt
                | BinaryOp::Sgt
                | BinaryOp::Ugte
                | BinaryOp::Sgte
                | BinaryOp::Ult
                | BinaryOp::Slt
                | BinaryOp::Ulte
                | BinaryOp::Slte
        )
    }
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What an instruction does. Operand fields hold the lids of earlier instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstKind {
    Sort(SortKind),
    Input {
        sort: Lid,
        name: Option<String>,
    },
    State {
        sort: Lid,
        name: Option<String>,
    },
    Init {
        sort: Lid,
        state: Lid,
        value: Lid,
    },
    Next {
        sort: Lid,
        state: Lid,
        value: Lid,
    },
    Constraint {
        cond: Lid,
        name: Option<String>,
    },
    Bad {
        cond: Lid,
        name: Option<String>,
    },
    Output {
        value: Lid,
        name: Option<String>,
    },
    /// Literal, already truncated to the sort width.
    Const {
        sort: Lid,
        value: u64,
    },
    Zero {
        sort: Lid,
    },
    One {
        sort: Lid,
    },
    Ones {
        sort: Lid,
    },
    Not {
        sort: Lid,
        operand: Lid,
    },
    Binary {
        op: BinaryOp,
        sort: Lid,
        lhs: Lid,
        rhs: Lid,
    },
    Ite {
        sort: Lid,
        cond: Lid,
        then: Lid,
        otherwise: Lid,
    },
    /// Zero extension by `by` bits. With `by == 0` and a name it only renames.
    Uext {
        sort: Lid,
        operand: Lid,
        by: u32,
        name: Option<String>,
    },
    /// Bits `lowbit ..= lowbit + width - 1` of the operand.
    Slice {
        sort: Lid,
        operand: Lid,
        lowbit: u32,
        width: u32,
    },
}

/// One BTOR2 line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub lid: Lid,
    pub kind: InstKind,
}

impl Instruction {
    pub fn new(lid: Lid, kind: InstKind) -> Self {
        Self { lid, kind }
    }

    /// The BTOR2 keyword of this instruction.
    pub fn keyword(&self) -> &'static str {
        match &self.kind {
            InstKind::Sort(_) => "sort",
            InstKind::Input { .. } => "input",
            InstKind::State { .. } => "state",
            InstKind::Init { .. } => "init",
            InstKind::Next { .. } => "next",
            InstKind::Constraint { .. } => "constraint",
            InstKind::Bad { .. } => "bad",
            InstKind::Output { .. } => "output",
            InstKind::Const { .. } => "constd",
            InstKind::Zero { .. } => "zero",
            InstKind::One { .. } => "one",
            InstKind::Ones { .. } => "ones",
            InstKind::Not { .. } => "not",
            InstKind::Binary { op, .. } => op.name(),
            InstKind::Ite { .. } => "ite",
            InstKind::Uext { .. } => "uext",
            InstKind::Slice { .. } => "slice",
        }
    }

    /// Result sort reference, if the instruction has one.
    pub fn sort(&self) -> Option<Lid> {
        match &self.kind {
            InstKind::Sort(_)
            | InstKind::Constraint { .. }
            | InstKind::Bad { .. }
            | InstKind::Output { .. } => None,
            InstKind::Input { sort, .. }
            | InstKind::State { sort, .. }
            | InstKind::Init { sort, .. }
            | InstKind::Next { sort, .. }
            | InstKind::Const { sort, .. }
            | InstKind::Zero { sort }
            | InstKind::One { sort }
            | InstKind::Ones { sort }
            | InstKind::Not { sort, .. }
            | InstKind::Binary { sort, .. }
            | InstKind::Ite { sort, .. }
            | InstKind::Uext { sort, .. }
            | InstKind::Slice { sort, .. } => Some(*sort),
        }
    }

    /// Lids of the value operands, in BTOR2 argument order.
    pub fn operands(&self) -> Vec<Lid> {
        match &self.kind {
            InstKind::Sort(_)
            | InstKind::Input { .. }
            | InstKind::State { .. }
            | InstKind::Const { .. }
            | InstKind::Zero { .. }
            | InstKind::One { .. }
            | InstKind::Ones { .. } => Vec::new(),
            InstKind::Init { state, value, .. } | InstKind::Next { state, value, .. } => {
                vec![*state, *value]
            }
            InstKind::Constraint { cond, .. } | InstKind::Bad { cond, .. } => vec![*cond],
            InstKind::Output { value, .. } => vec![*value],
            InstKind::Not { operand, .. }
            | InstKind::Uext { operand, .. }
            | InstKind::Slice { operand, .. } => vec![*operand],
            InstKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            InstKind::Ite {
                cond,
                then,
                otherwise,
                ..
            } => vec![*cond, *then, *otherwise],
        }
    }

    /// Symbol attached to the instruction, if any.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            InstKind::Input { name, .. }
            | InstKind::State { name, .. }
            | InstKind::Constraint { name, .. }
            | InstKind::Bad { name, .. }
            | InstKind::Output { name, .. }
            | InstKind::Uext { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// True for a `uext` that adds no bits and only binds a new name.
    pub fn is_renaming(&self) -> bool {
        matches!(&self.kind, InstKind::Uext { by: 0, name: Some(_), .. })
    }

    /// True if the instruction produces a value other instructions can reference.
    pub fn is_value(&self) -> bool {
        !matches!(
            self.kind,
            InstKind::Sort(_)
                | InstKind::Init { .. }
                | InstKind::Next { .. }
                | InstKind::Constraint { .. }
                | InstKind::Bad { .. }
                | InstKind::Output { .. }
        )
    }
}

/// Largest lid in a program, or 0 for an empty one.
pub fn max_lid(program: &[Instruction]) -> Lid {
    program.iter().map(|inst| inst.lid).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_op_names_roundtrip() {
        for op in BinaryOp::ALL {
            assert_eq!(BinaryOp::from_name(op.name()), Some(op));
        }
        assert_eq!(BinaryOp::from_name("urem"), None);
    }

    #[test]
    fn test_predicates() {
        assert!(BinaryOp::Eq.is_predicate());
        assert!(BinaryOp::Slte.is_predicate());
        assert!(!BinaryOp::Add.is_predicate());
        assert!(!BinaryOp::Concat.is_predicate());
        assert!(!BinaryOp::Implies.is_predicate());
    }

    #[test]
    fn test_renaming_uext() {
        let rename = Instruction::new(
            5,
            InstKind::Uext {
                sort: 1,
                operand: 3,
                by: 0,
                name: Some("alias".into()),
            },
        );
        assert!(rename.is_renaming());
        assert_eq!(rename.operands(), vec![3]);

        let extend = Instruction::new(
            6,
            InstKind::Uext {
                sort: 2,
                operand: 3,
                by: 4,
                name: Some("wide".into()),
            },
        );
        assert!(!extend.is_renaming());
    }

    #[test]
    fn test_max_lid() {
        assert_eq!(max_lid(&[]), 0);
        let program = vec![
            Instruction::new(1, InstKind::Sort(SortKind::BitVec { width: 1 })),
            Instruction::new(7, InstKind::Zero { sort: 1 }),
            Instruction::new(3, InstKind::One { sort: 1 }),
        ];
        assert_eq!(max_lid(&program), 7);
    }
}
