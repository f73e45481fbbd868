//! Assembled instruction records and their JSON wire format.

use crate::error::Error;
use crate::opcode::Opcode;
use serde::{Deserialize, Serialize};

/// Whether an operand addresses `DMEM[arg]` directly or is resolved through
/// one extra indirection (`AR := IR.arg; DR := DMEM[AR]; AR := DR.val`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    /// `arg` is the target address.
    Direct,
    /// `arg` points at a cell holding the target address.
    Indirect,
}

impl AddressType {
    /// Whether this mode is indirect.
    #[must_use]
    pub fn is_indirect(self) -> bool {
        matches!(self, AddressType::Indirect)
    }
}

impl From<bool> for AddressType {
    fn from(indirect: bool) -> Self {
        if indirect {
            AddressType::Indirect
        } else {
            AddressType::Direct
        }
    }
}

impl From<AddressType> for bool {
    fn from(a: AddressType) -> Self {
        a.is_indirect()
    }
}

/// A single assembled instruction.
///
/// `arg` is absent for opcodes taking no operand. For memory-access opcodes
/// it is a data-memory address; for control-flow opcodes an instruction-memory
/// address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// The operand, or `None` for operandless opcodes.
    pub arg: Option<i64>,
    /// Direct or indirect addressing.
    pub address_type: AddressType,
    /// Whether a DMEM-accessing `arg` names a position in this segment's own
    /// data (and so must be shifted by the segment's load offset) rather
    /// than an absolute address such as a memory-mapped port. Mirrors
    /// [`crate::DataRecord`]'s `l2l` flag, but is not part of the wire
    /// format (`arg`'s string form can't distinguish the two cases on its
    /// own); deserializing from JSON falls back to treating any operand
    /// below [`crate::RESERVED_CELLS`] as absolute.
    pub relocatable: bool,
}

impl Instruction {
    /// Build an operandless instruction (`iret`, `ei`, `di`, `hlt`, `push`, `pop`).
    #[must_use]
    pub fn bare(opcode: Opcode) -> Self {
        Self {
            opcode,
            arg: None,
            address_type: AddressType::Direct,
            relocatable: true,
        }
    }

    /// Build an instruction whose operand names a position in the segment's
    /// own data (a resolved label), which the loader relocates.
    #[must_use]
    pub fn with_arg(opcode: Opcode, arg: i64, address_type: AddressType) -> Self {
        Self {
            opcode,
            arg: Some(arg),
            address_type,
            relocatable: true,
        }
    }

    /// Build an instruction whose operand is an absolute address written
    /// directly in source (e.g. a memory-mapped port), which the loader
    /// leaves untouched.
    #[must_use]
    pub fn with_literal_arg(opcode: Opcode, arg: i64, address_type: AddressType) -> Self {
        Self {
            opcode,
            arg: Some(arg),
            address_type,
            relocatable: false,
        }
    }
}

/// On-the-wire shape of an instruction record: `arg` is either the string
/// form of a signed integer or the literal string `"None"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct InstructionWire {
    opcode: Opcode,
    arg: String,
    address_type: bool,
}

impl From<Instruction> for InstructionWire {
    fn from(instr: Instruction) -> Self {
        Self {
            opcode: instr.opcode,
            arg: instr.arg.map_or_else(|| "None".to_string(), |a| a.to_string()),
            address_type: instr.address_type.into(),
        }
    }
}

impl TryFrom<InstructionWire> for Instruction {
    type Error = Error;

    fn try_from(wire: InstructionWire) -> Result<Self, Error> {
        let arg = if wire.arg == "None" {
            None
        } else {
            Some(
                wire.arg
                    .parse::<i64>()
                    .map_err(|_| Error::MalformedImage(format!("invalid instruction arg {:?}", wire.arg)))?,
            )
        };
        // The wire format has no room for the assembler's literal-vs-label
        // distinction (spec pins the shape to exactly these three fields),
        // so a reloaded image falls back to treating low addresses as the
        // memory-mapped ports/interrupt vector rather than a segment's own
        // data — the only case that actually appears checked into images.
        let relocatable = match arg {
            Some(a) => a >= i64::from(crate::RESERVED_CELLS),
            None => true,
        };
        Ok(Instruction {
            opcode: wire.opcode,
            arg,
            address_type: wire.address_type.into(),
            relocatable,
        })
    }
}

impl Serialize for Instruction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        InstructionWire::from(*self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Instruction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = InstructionWire::deserialize(deserializer)?;
        Instruction::try_from(wire).map_err(serde::de::Error::custom)
    }
}
