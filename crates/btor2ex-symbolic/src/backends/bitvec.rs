//! Concrete fixed-width bitvector arithmetic, widths 1 through 64.
//!
//! Values are carried in a `u64` whose bits above the width are zero.

use btor2ex_ir::BinaryOp;

/// Largest width the concrete evaluator handles.
pub const MAX_WIDTH: u32 = 64;

/// All ones in the low `width` bits.
pub fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Two's complement reading of a `width`-bit value.
pub fn to_signed(value: u64, width: u32) -> i64 {
    if width == 0 {
        return 0;
    }
    let shift = 64 - width.min(64);
    ((value << shift) as i64) >> shift
}

fn bit(b: bool) -> u64 {
    b as u64
}

/// Result width of `op` applied to operands of the given widths.
pub fn result_width(op: BinaryOp, lhs: u32, rhs: u32) -> u32 {
    if op.is_predicate() {
        1
    } else if op == BinaryOp::Concat {
        lhs.saturating_add(rhs)
    } else {
        lhs
    }
}

pub fn not(a: u64, width: u32) -> u64 {
    !a & mask(width)
}

pub fn slice(a: u64, high: u32, low: u32) -> u64 {
    a.checked_shr(low).unwrap_or(0) & mask(high.saturating_sub(low) + 1)
}

/// Evaluate a binary operator. `a` has width `wa`, `b` has width `wb`.
pub fn binary(op: BinaryOp, a: u64, b: u64, wa: u32, wb: u32) -> u64 {
    let w = wa;
    let m = mask(w);
    let sa = to_signed(a, w);
    let sb = to_signed(b, w);
    match op {
        BinaryOp::Add => a.wrapping_add(b) & m,
        BinaryOp::Sub => a.wrapping_sub(b) & m,
        BinaryOp::Mul => a.wrapping_mul(b) & m,
        BinaryOp::Udiv => {
            if b == 0 {
                m
            } else {
                a / b
            }
        }
        BinaryOp::Sdiv => {
            if sb == 0 {
                if sa >= 0 {
                    m
                } else {
                    1
                }
            } else {
                (sa as i128 / sb as i128) as u64 & m
            }
        }
        BinaryOp::Smod => {
            if sb == 0 {
                a
            } else {
                let (sa, sb) = (sa as i128, sb as i128);
                let mut r = sa % sb;
                if r != 0 && (r < 0) != (sb < 0) {
                    r += sb;
                }
                r as u64 & m
            }
        }
        BinaryOp::Sll => {
            if b >= w as u64 {
                0
            } else {
                (a << b) & m
            }
        }
        BinaryOp::Srl => {
            if b >= w as u64 {
                0
            } else {
                a >> b
            }
        }
        BinaryOp::Sra => {
            if b >= w as u64 {
                if sa < 0 {
                    m
                } else {
                    0
                }
            } else {
                (sa >> b) as u64 & m
            }
        }
        BinaryOp::And => a & b,
        BinaryOp::Or => a | b,
        BinaryOp::Xor => a ^ b,
        BinaryOp::Concat => {
            if wb >= 64 {
                b
            } else {
                ((a << wb) | b) & mask(wa + wb)
            }
        }
        BinaryOp::Eq => bit(a == b),
        BinaryOp::Neq => bit(a != b),
        BinaryOp::Ugt => bit(a > b),
        BinaryOp::Sgt => bit(sa > sb),
        BinaryOp::Ugte => bit(a >= b),
        BinaryOp::Sgte => bit(sa >= sb),
        BinaryOp::Ult => bit(a < b),
        BinaryOp::Slt => bit(sa < sb),
        BinaryOp::Ulte => bit(a <= b),
        BinaryOp::Slte => bit(sa <= sb),
        BinaryOp::Implies => (!a | b) & m,
        BinaryOp::Iff => !(a ^ b) & m,
    }
}
