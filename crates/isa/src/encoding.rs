use std::fmt;
use std::str::FromStr;

use crate::addressing::AddressingMode;
use crate::error::IsaError;
use crate::word::Word;

const OPCODE_SHIFT: u16 = 8;
const FUNCT_SHIFT: u16 = 4;
const SOURCE_SHIFT: u16 = 2;
const NIBBLE: u16 = 0xF;
const MODE_FIELD: u16 = 0b11;

/// The sixteen operations of the instruction set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Opcode {
    Mov,
    Cmp,
    Add,
    Sub,
    Lea,
    Clr,
    Not,
    Inc,
    Dec,
    Jmp,
    Bne,
    Jsr,
    Red,
    Prn,
    Rts,
    Stop,
}

/// Single source-of-truth `(opcode, funct)` table.
///
/// Any pair not present here is unassigned.
pub const OPCODE_ENCODING_TABLE: &[(u8, u8, Opcode)] = &[
    (0, 0, Opcode::Mov),
    (1, 0, Opcode::Cmp),
    (2, 10, Opcode::Add),
    (2, 11, Opcode::Sub),
    (4, 0, Opcode::Lea),
    (5, 10, Opcode::Clr),
    (5, 11, Opcode::Not),
    (5, 12, Opcode::Inc),
    (5, 13, Opcode::Dec),
    (9, 10, Opcode::Jmp),
    (9, 11, Opcode::Bne),
    (9, 12, Opcode::Jsr),
    (12, 0, Opcode::Red),
    (13, 0, Opcode::Prn),
    (14, 0, Opcode::Rts),
    (15, 0, Opcode::Stop),
];

impl Opcode {
    /// Every operation in table order.
    pub const ALL: [Self; 16] = [
        Self::Mov,
        Self::Cmp,
        Self::Add,
        Self::Sub,
        Self::Lea,
        Self::Clr,
        Self::Not,
        Self::Inc,
        Self::Dec,
        Self::Jmp,
        Self::Bne,
        Self::Jsr,
        Self::Red,
        Self::Prn,
        Self::Rts,
        Self::Stop,
    ];

    /// Lower-case source mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Mov => "mov",
            Self::Cmp => "cmp",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Lea => "lea",
            Self::Clr => "clr",
            Self::Not => "not",
            Self::Inc => "inc",
            Self::Dec => "dec",
            Self::Jmp => "jmp",
            Self::Bne => "bne",
            Self::Jsr => "jsr",
            Self::Red => "red",
            Self::Prn => "prn",
            Self::Rts => "rts",
            Self::Stop => "stop",
        }
    }

    /// Primary opcode nibble (bits 11..8).
    #[must_use]
    pub const fn opcode(self) -> u8 {
        match self {
            Self::Mov => 0,
            Self::Cmp => 1,
            Self::Add | Self::Sub => 2,
            Self::Lea => 4,
            Self::Clr | Self::Not | Self::Inc | Self::Dec => 5,
            Self::Jmp | Self::Bne | Self::Jsr => 9,
            Self::Red => 12,
            Self::Prn => 13,
            Self::Rts => 14,
            Self::Stop => 15,
        }
    }

    /// Function nibble (bits 7..4) distinguishing operations that share an opcode.
    #[must_use]
    pub const fn funct(self) -> u8 {
        match self {
            Self::Add | Self::Clr | Self::Jmp => 10,
            Self::Sub | Self::Not | Self::Bne => 11,
            Self::Inc | Self::Jsr => 12,
            Self::Dec => 13,
            Self::Mov
            | Self::Cmp
            | Self::Lea
            | Self::Red
            | Self::Prn
            | Self::Rts
            | Self::Stop => 0,
        }
    }

    /// Exact, case-sensitive mnemonic lookup.
    #[must_use]
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.mnemonic() == name)
    }
}

impl FromStr for Opcode {
    type Err = IsaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mnemonic(s).ok_or(IsaError::UnknownMnemonic)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Returns the operation assigned to an `(opcode, funct)` pair.
///
/// `None` means the pair is unassigned.
#[must_use]
pub fn classify_opcode(opcode: u8, funct: u8) -> Option<Opcode> {
    OPCODE_ENCODING_TABLE
        .iter()
        .find_map(|(entry_opcode, entry_funct, op)| {
            ((*entry_opcode == opcode) && (*entry_funct == funct)).then_some(*op)
        })
}

/// Fields of a decoded instruction word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstructionFields {
    /// Operation selected by the opcode and funct nibbles.
    pub opcode: Opcode,
    /// Source addressing-mode field.
    pub source: AddressingMode,
    /// Destination addressing-mode field.
    pub destination: AddressingMode,
}

/// Packs an instruction word as `opcode(4) | funct(4) | src(2) | dest(2)`.
#[must_use]
pub const fn encode_instruction_word(
    opcode: Opcode,
    source: Option<AddressingMode>,
    destination: Option<AddressingMode>,
) -> Word {
    Word::new(
        ((opcode.opcode() as u16) << OPCODE_SHIFT)
            | ((opcode.funct() as u16) << FUNCT_SHIFT)
            | ((AddressingMode::field_code(source) as u16) << SOURCE_SHIFT)
            | AddressingMode::field_code(destination) as u16,
    )
}

/// Unpacks an instruction word.
///
/// # Errors
///
/// Returns [`IsaError::UnassignedEncoding`] when the opcode/funct pair is
/// not in [`OPCODE_ENCODING_TABLE`].
#[allow(clippy::cast_possible_truncation)]
pub fn decode_instruction_word(word: Word) -> Result<InstructionFields, IsaError> {
    let raw = word.value();
    let opcode = ((raw >> OPCODE_SHIFT) & NIBBLE) as u8;
    let funct = ((raw >> FUNCT_SHIFT) & NIBBLE) as u8;
    let op = classify_opcode(opcode, funct)
        .ok_or(IsaError::UnassignedEncoding { opcode, funct })?;

    Ok(InstructionFields {
        opcode: op,
        source: mode_field((raw >> SOURCE_SHIFT) & MODE_FIELD),
        destination: mode_field(raw & MODE_FIELD),
    })
}

#[allow(clippy::cast_possible_truncation)]
const fn mode_field(bits: u16) -> AddressingMode {
    match AddressingMode::from_code(bits as u8) {
        Some(mode) => mode,
        None => AddressingMode::Immediate,
    }
}
