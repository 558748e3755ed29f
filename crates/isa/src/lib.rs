//! Instruction-set tables for the asm12 12-bit CPU.

/// The 12-bit machine word.
pub mod word;
pub use word::{Word, WORD_BITS, WORD_MASK};

/// Addressing modes and the register file.
pub mod addressing;
pub use addressing::{AddressingMode, Register, REGISTER_COUNT};

/// Opcode table and instruction-word layout.
pub mod encoding;
pub use encoding::{
    classify_opcode, decode_instruction_word, encode_instruction_word, InstructionFields, Opcode,
    OPCODE_ENCODING_TABLE,
};

/// Operand count and addressing-mode compatibility per opcode.
pub mod rules;
pub use rules::{ModeSet, OperandRules};

/// Errors raised by ISA lookups.
pub mod error;
pub use error::IsaError;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;
