//! Shared error type for assembly, loading, and execution.

use thiserror::Error;

/// Every terminal condition the system can raise.
///
/// All variants are terminal: assembly errors abort translation before any
/// output file is written, and simulation errors abort the run.
#[derive(Debug, Error)]
pub enum Error {
    /// The assembler encountered an unrecognized mnemonic or malformed line.
    #[error("parse error on line {line}: {message}")]
    Parse {
        /// 1-based source line number.
        line: usize,
        /// Description of what was wrong.
        message: String,
    },

    /// An operand referenced a label that was never defined.
    #[error("undefined label {label:?} on line {line}")]
    UndefinedLabel {
        /// 1-based source line number.
        line: usize,
        /// The label that was referenced but never declared.
        label: String,
    },

    /// A `string` literal was missing its NUL terminator, or some other
    /// structural rule of the source dialect was violated.
    #[error("syntax error on line {line}: {message}")]
    Syntax {
        /// 1-based source line number.
        line: usize,
        /// Description of the violated rule.
        message: String,
    },

    /// `mod` by zero.
    #[error("arithmetic error: mod by zero")]
    ArithmeticError,

    /// A `load`/arithmetic instruction read `DMEM[0]` with no input left.
    #[error("input exhausted: read from empty input port")]
    InputExhausted,

    /// The driver's instruction-count ceiling was reached.
    #[error("instruction limit exceeded: {limit} instructions executed without halting")]
    InstructionLimitExceeded {
        /// The ceiling that was reached.
        limit: u64,
    },

    /// An instruction or data image failed to parse into well-formed records.
    #[error("malformed image: {0}")]
    MalformedImage(String),

    /// The input schedule's YAML was malformed or contained a negative tick.
    #[error("invalid input schedule: {0}")]
    InvalidSchedule(String),

    /// Underlying I/O failure (reading source/image/schedule files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Underlying YAML (de)serialization failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
