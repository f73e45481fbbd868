//! The ALU: binary arithmetic on two integer inputs, with
//! zero/negative flags latched from every result.

use vm_isa::{Error, Result};

/// Binary arithmetic unit.
///
/// `L`/`R` are the latched operands, `O` the last result. Every operation
/// unconditionally recomputes `Z`/`N` from `O`, including `cmp`, which
/// discards `O` for ACC purposes but still updates flags from it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Alu {
    /// Left operand.
    pub l: i64,
    /// Right operand.
    pub r: i64,
    /// Last computed result.
    pub o: i64,
    /// Zero flag: `O == 0`.
    pub zero: bool,
    /// Negative flag: `O < 0`.
    pub negative: bool,
}

/// The four ALU operations the control unit can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    /// `O = L + R`.
    Add,
    /// `O = L - R`.
    Sub,
    /// `O = L mod R`, floored; `R == 0` is an `ArithmeticError`.
    Mod,
    /// Same as `Sub`, but callers discard `O` and keep only the flags.
    Cmp,
}

impl Alu {
    /// Apply `op` to the latched `L`/`R`, updating `O` and the flags.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ArithmeticError`] if `op` is `Mod` and `R == 0`.
    pub fn apply(&mut self, op: AluOp) -> Result<()> {
        self.o = match op {
            AluOp::Add => self.l.wrapping_add(self.r),
            AluOp::Sub | AluOp::Cmp => self.l.wrapping_sub(self.r),
            AluOp::Mod => {
                if self.r == 0 {
                    return Err(Error::ArithmeticError);
                }
                floored_mod(self.l, self.r)
            }
        };
        self.zero = self.o == 0;
        self.negative = self.o < 0;
        Ok(())
    }
}

/// Mathematical (floored) modulo, pinned for determinism across
/// implementations regardless of operand signs.
fn floored_mod(l: i64, r: i64) -> i64 {
    ((l % r) + r) % r
}
