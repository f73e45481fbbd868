//! Opcode alphabet and the three dispatch groups the control unit uses.

use serde::{Deserialize, Serialize};

/// The VM's opcode alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Opcode {
    /// Load `DMEM[arg]` into ACC.
    Load,
    /// Store ACC into `DMEM[arg]`.
    Store,
    /// ACC += `DMEM[arg]`.
    Add,
    /// ACC -= `DMEM[arg]`.
    Sub,
    /// ACC = ACC mod `DMEM[arg]` (floored).
    Mod,
    /// Update flags from ACC - `DMEM[arg]`, discard the result.
    Cmp,
    /// Unconditional jump.
    Jmp,
    /// Jump if the zero flag is set.
    Jz,
    /// Jump if the zero flag is clear.
    Jnz,
    /// Jump if the negative flag is set.
    Jn,
    /// Jump if the negative flag is clear.
    Jnn,
    /// Push ACC onto the stack.
    Push,
    /// Pop the stack into ACC.
    Pop,
    /// Return from interrupt.
    Iret,
    /// Enable interrupts.
    Ei,
    /// Disable interrupts.
    Di,
    /// Halt the machine.
    Hlt,
}

impl Opcode {
    /// The assembler mnemonic for this opcode, as it appears in source text.
    #[must_use]
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Load => "load",
            Opcode::Store => "store",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mod => "mod",
            Opcode::Cmp => "cmp",
            Opcode::Jmp => "jmp",
            Opcode::Jz => "jz",
            Opcode::Jnz => "jnz",
            Opcode::Jn => "jn",
            Opcode::Jnn => "jnn",
            Opcode::Push => "push",
            Opcode::Pop => "pop",
            Opcode::Iret => "iret",
            Opcode::Ei => "ei",
            Opcode::Di => "di",
            Opcode::Hlt => "hlt",
        }
    }

    /// Parse a mnemonic into its opcode. Returns `None` on unknown mnemonics
    /// so callers can raise their own `ParseError` with line context.
    #[must_use]
    pub fn from_mnemonic(s: &str) -> Option<Opcode> {
        Some(match s {
            "load" => Opcode::Load,
            "store" => Opcode::Store,
            "add" => Opcode::Add,
            "sub" => Opcode::Sub,
            "mod" => Opcode::Mod,
            "cmp" => Opcode::Cmp,
            "jmp" => Opcode::Jmp,
            "jz" => Opcode::Jz,
            "jnz" => Opcode::Jnz,
            "jn" => Opcode::Jn,
            "jnn" => Opcode::Jnn,
            "push" => Opcode::Push,
            "pop" => Opcode::Pop,
            "iret" => Opcode::Iret,
            "ei" => Opcode::Ei,
            "di" => Opcode::Di,
            "hlt" => Opcode::Hlt,
            _ => return None,
        })
    }

    /// Opcodes that take no operand at all: `iret, ei, di, hlt, push, pop`.
    #[must_use]
    pub fn takes_operand(self) -> bool {
        !matches!(
            self,
            Opcode::Iret | Opcode::Ei | Opcode::Di | Opcode::Hlt | Opcode::Push | Opcode::Pop
        )
    }

    /// "Basic" group: `load, store, add, sub, mod, cmp, ei, di, hlt`.
    #[must_use]
    pub fn is_basic(self) -> bool {
        matches!(
            self,
            Opcode::Load
                | Opcode::Store
                | Opcode::Add
                | Opcode::Sub
                | Opcode::Mod
                | Opcode::Cmp
                | Opcode::Ei
                | Opcode::Di
                | Opcode::Hlt
        )
    }

    /// "Control flow" group: `jmp, jz, jnz, jn, jnn`.
    #[must_use]
    pub fn is_control_flow(self) -> bool {
        matches!(
            self,
            Opcode::Jmp | Opcode::Jz | Opcode::Jnz | Opcode::Jn | Opcode::Jnn
        )
    }

    /// "Stack" group: `push, pop, iret`.
    #[must_use]
    pub fn is_stack(self) -> bool {
        matches!(self, Opcode::Push | Opcode::Pop | Opcode::Iret)
    }

    /// ALU-driving opcodes that latch an arithmetic result into ACC.
    #[must_use]
    pub fn is_arithmetic(self) -> bool {
        matches!(self, Opcode::Add | Opcode::Sub | Opcode::Mod)
    }

    /// Opcodes whose `arg` addresses `DMEM` (as opposed to `IMEM` for jumps).
    #[must_use]
    pub fn accesses_dmem(self) -> bool {
        matches!(
            self,
            Opcode::Load
                | Opcode::Store
                | Opcode::Add
                | Opcode::Sub
                | Opcode::Mod
                | Opcode::Cmp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnemonic_roundtrips() {
        for op in [
            Opcode::Load,
            Opcode::Store,
            Opcode::Add,
            Opcode::Sub,
            Opcode::Mod,
            Opcode::Cmp,
            Opcode::Jmp,
            Opcode::Jz,
            Opcode::Jnz,
            Opcode::Jn,
            Opcode::Jnn,
            Opcode::Push,
            Opcode::Pop,
            Opcode::Iret,
            Opcode::Ei,
            Opcode::Di,
            Opcode::Hlt,
        ] {
            assert_eq!(Opcode::from_mnemonic(op.mnemonic()), Some(op));
        }
    }

    #[test]
    fn unknown_mnemonic_is_none() {
        assert_eq!(Opcode::from_mnemonic("frobnicate"), None);
    }

    #[test]
    fn operandless_opcodes() {
        for op in [Opcode::Iret, Opcode::Ei, Opcode::Di, Opcode::Hlt, Opcode::Push, Opcode::Pop] {
            assert!(!op.takes_operand());
        }
        assert!(Opcode::Load.takes_operand());
        assert!(Opcode::Jmp.takes_operand());
    }

    #[test]
    fn groups_are_disjoint_and_exhaustive() {
        let all = [
            Opcode::Load,
            Opcode::Store,
            Opcode::Add,
            Opcode::Sub,
            Opcode::Mod,
            Opcode::Cmp,
            Opcode::Jmp,
            Opcode::Jz,
            Opcode::Jnz,
            Opcode::Jn,
            Opcode::Jnn,
            Opcode::Push,
            Opcode::Pop,
            Opcode::Iret,
            Opcode::Ei,
            Opcode::Di,
            Opcode::Hlt,
        ];
        for op in all {
            let groups = [op.is_basic(), op.is_control_flow(), op.is_stack()];
            assert_eq!(groups.iter().filter(|g| **g).count(), 1, "{op:?} in one group");
        }
    }
}
