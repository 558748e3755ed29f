//! Code and data memory images.
//!
//! Pass one appends words as lines are classified: instruction words are
//! complete immediately, label operands are stored as references. Pass two
//! ([`MemoryImage::resolve`]) replaces every reference with its value.

use std::fmt;

use asm12_isa::{encode_instruction_word, AddressingMode, Opcode, Word};

use crate::operands::{Instruction, Operand, OperandRole};
use crate::symbols::SymbolTable;

/// Address of the first code word.
pub const CODE_START: u32 = 100;

/// Relocation tag written next to each object word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelocationTag {
    /// `A`: the value does not depend on load address.
    Absolute,
    /// `R`: the value is an address inside this file.
    Relocatable,
    /// `E`: the value refers to an external symbol.
    External,
}

impl RelocationTag {
    /// The single-letter object-file tag.
    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Self::Absolute => 'A',
            Self::Relocatable => 'R',
            Self::External => 'E',
        }
    }
}

impl fmt::Display for RelocationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// A label operand waiting for pass two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRef {
    /// Referenced label.
    pub label: String,
    /// Source line of the operand.
    pub line: usize,
    /// Operand slot the label was written in.
    pub role: OperandRole,
}

/// Contents of one memory word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Instruction word fields.
    Instruction {
        /// The operation.
        opcode: Opcode,
        /// Source addressing mode, if the operand exists.
        source: Option<AddressingMode>,
        /// Destination addressing mode, if the operand exists.
        destination: Option<AddressingMode>,
    },
    /// A numeric value: immediate, register bit, data, or resolved label.
    Value(i32),
    /// Direct label operand; resolves to the label's address.
    Direct(LabelRef),
    /// Relative label operand; resolves to target minus this word's address.
    Relative(LabelRef),
}

/// One word of the code or data image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryWord {
    /// Word address.
    pub address: u32,
    /// Word contents.
    pub payload: Payload,
    /// Relocation tag.
    pub tag: RelocationTag,
}

impl MemoryWord {
    /// The 12-bit encoding, or `None` while a label reference is pending.
    #[must_use]
    pub fn encode(&self) -> Option<Word> {
        match &self.payload {
            Payload::Instruction {
                opcode,
                source,
                destination,
            } => Some(encode_instruction_word(*opcode, *source, *destination)),
            Payload::Value(value) => Some(Word::from_signed(*value)),
            Payload::Direct(_) | Payload::Relative(_) => None,
        }
    }
}

/// A direct use of an external label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternUse {
    /// External label name.
    pub label: String,
    /// Address of the operand word that uses it.
    pub address: u32,
}

/// Outcome of pass two.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// External usage sites in code order.
    pub extern_uses: Vec<ExternUse>,
    /// Label references that named no known symbol, in code order.
    pub unresolved: Vec<LabelRef>,
}

/// Code and data images with their counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryImage {
    code: Vec<MemoryWord>,
    data: Vec<MemoryWord>,
    ic: u32,
    dc: u32,
}

impl Default for MemoryImage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryImage {
    /// Empty images with IC at [`CODE_START`] and DC at 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            code: Vec::new(),
            data: Vec::new(),
            ic: CODE_START,
            dc: 0,
        }
    }

    /// Instruction counter: address of the next code word.
    #[must_use]
    pub const fn ic(&self) -> u32 {
        self.ic
    }

    /// Data counter: offset of the next data word.
    #[must_use]
    pub const fn dc(&self) -> u32 {
        self.dc
    }

    /// Number of code words.
    #[must_use]
    pub const fn code_len(&self) -> u32 {
        self.ic - CODE_START
    }

    /// Code words in address order.
    #[must_use]
    pub fn code(&self) -> &[MemoryWord] {
        &self.code
    }

    /// Data words in address order.
    #[must_use]
    pub fn data(&self) -> &[MemoryWord] {
        &self.data
    }

    /// Whether both images are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.code.is_empty() && self.data.is_empty()
    }

    /// Appends an instruction word followed by one word per operand.
    pub fn push_instruction(&mut self, instruction: &Instruction, line: usize) {
        let payload = Payload::Instruction {
            opcode: instruction.opcode,
            source: instruction.source.as_ref().map(Operand::mode),
            destination: instruction.destination.as_ref().map(Operand::mode),
        };
        self.push_code(payload, RelocationTag::Absolute);

        for (role, operand) in instruction.operands() {
            let (payload, tag) = match operand {
                Operand::Immediate(value) => (Payload::Value(*value), RelocationTag::Absolute),
                Operand::Register(register) => (
                    Payload::Value(i32::from(register.bit())),
                    RelocationTag::Absolute,
                ),
                Operand::Direct(label) => (
                    Payload::Direct(LabelRef {
                        label: label.clone(),
                        line,
                        role,
                    }),
                    RelocationTag::Relocatable,
                ),
                Operand::Relative(label) => (
                    Payload::Relative(LabelRef {
                        label: label.clone(),
                        line,
                        role,
                    }),
                    RelocationTag::Absolute,
                ),
            };
            self.push_code(payload, tag);
        }
    }

    /// Appends one data word per integer.
    pub fn push_data(&mut self, values: &[i32]) {
        for &value in values {
            self.push_data_word(value);
        }
    }

    /// Appends one data word per character plus a zero terminator.
    pub fn push_string(&mut self, text: &str) {
        for ch in text.chars() {
            #[allow(clippy::cast_possible_wrap)]
            self.push_data_word(u32::from(ch) as i32);
        }
        self.push_data_word(0);
    }

    /// Moves every data word past the final code word.
    ///
    /// Call once, after the last line of pass one. Returns the offset applied.
    pub fn relocate_data(&mut self) -> u32 {
        let offset = self.ic;
        for word in &mut self.data {
            word.address += offset;
        }
        offset
    }

    /// Replaces every label reference in the code image with its value.
    pub fn resolve(&mut self, symbols: &SymbolTable) -> Resolution {
        let mut resolution = Resolution::default();

        for word in &mut self.code {
            let (reference, relative) = match &word.payload {
                Payload::Direct(reference) => (reference.clone(), false),
                Payload::Relative(reference) => (reference.clone(), true),
                Payload::Instruction { .. } | Payload::Value(_) => continue,
            };

            let Some(target) = symbols.lookup(&reference.label) else {
                resolution.unresolved.push(reference);
                continue;
            };

            if relative {
                word.payload = Payload::Value(displacement(target, word.address));
            } else if symbols.is_external(&reference.label) {
                word.payload = Payload::Value(0);
                word.tag = RelocationTag::External;
                resolution.extern_uses.push(ExternUse {
                    label: reference.label,
                    address: word.address,
                });
            } else {
                word.payload = Payload::Value(as_value(target));
            }
        }

        resolution
    }

    fn push_code(&mut self, payload: Payload, tag: RelocationTag) {
        self.code.push(MemoryWord {
            address: self.ic,
            payload,
            tag,
        });
        self.ic += 1;
    }

    fn push_data_word(&mut self, value: i32) {
        self.data.push(MemoryWord {
            address: self.dc,
            payload: Payload::Value(value),
            tag: RelocationTag::Absolute,
        });
        self.dc += 1;
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn as_value(address: u32) -> i32 {
    address as i32
}

#[allow(clippy::cast_possible_wrap)]
const fn displacement(target: u32, from: u32) -> i32 {
    target.wrapping_sub(from) as i32
}
