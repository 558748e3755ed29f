use std::fmt;
use std::str::FromStr;

use crate::error::IsaError;

/// Number of general registers.
pub const REGISTER_COUNT: usize = 8;

/// Operand addressing modes with their 2-bit field codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[repr(u8)]
pub enum AddressingMode {
    /// `#<integer>` literal.
    Immediate = 0b00,
    /// Bare label, resolved to the label's address.
    Direct = 0b01,
    /// `%<label>`, resolved to a displacement from the operand word.
    Relative = 0b10,
    /// `r0`..`r7`.
    Register = 0b11,
}

impl AddressingMode {
    /// Every mode in field-code order.
    pub const ALL: [Self; 4] = [
        Self::Immediate,
        Self::Direct,
        Self::Relative,
        Self::Register,
    ];

    /// The 2-bit field code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Field code for an optional operand; an absent operand encodes as `00`.
    #[must_use]
    pub const fn field_code(mode: Option<Self>) -> u8 {
        match mode {
            Some(mode) => mode.code(),
            None => 0,
        }
    }

    /// Converts a 2-bit field code back into a mode.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0b00 => Some(Self::Immediate),
            0b01 => Some(Self::Direct),
            0b10 => Some(Self::Relative),
            0b11 => Some(Self::Register),
            _ => None,
        }
    }
}

impl fmt::Display for AddressingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Immediate => "immediate",
            Self::Direct => "direct",
            Self::Relative => "relative",
            Self::Register => "register-direct",
        };
        f.write_str(name)
    }
}

/// General register `r0`..`r7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[allow(missing_docs)]
pub enum Register {
    R0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    R7,
}

impl Register {
    /// Every register in index order.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::R0,
        Self::R1,
        Self::R2,
        Self::R3,
        Self::R4,
        Self::R5,
        Self::R6,
        Self::R7,
    ];

    /// Register index `0..=7`.
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::R0 => 0,
            Self::R1 => 1,
            Self::R2 => 2,
            Self::R3 => 3,
            Self::R4 => 4,
            Self::R5 => 5,
            Self::R6 => 6,
            Self::R7 => 7,
        }
    }

    /// One-hot operand word value: `r<n>` encodes as `1 << n`.
    #[must_use]
    pub const fn bit(self) -> u16 {
        1 << self.index()
    }

    /// Source spelling, `r0`..`r7`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::R0 => "r0",
            Self::R1 => "r1",
            Self::R2 => "r2",
            Self::R3 => "r3",
            Self::R4 => "r4",
            Self::R5 => "r5",
            Self::R6 => "r6",
            Self::R7 => "r7",
        }
    }
}

impl FromStr for Register {
    type Err = IsaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|register| register.name() == s)
            .ok_or(IsaError::UnknownRegister)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
