//! Mnemonic, directive and reserved-name resolution over the ISA tables.

use asm12_isa::{Opcode, Register};

/// Words that can never be used as labels besides registers and operations.
pub const KEYWORDS: [&str; 5] = ["PSW", "data", "string", "entry", "extern"];

/// Assembler directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
    /// `.entry LABEL`
    Entry,
    /// `.extern LABEL`
    Extern,
    /// `.string "text"`
    String,
    /// `.data 1, -2, +3`
    Data,
}

impl Directive {
    /// Matches a directive token, including its leading dot.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            ".entry" => Some(Self::Entry),
            ".extern" => Some(Self::Extern),
            ".string" => Some(Self::String),
            ".data" => Some(Self::Data),
            _ => None,
        }
    }
}

/// What a reserved name collides with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReservedName {
    /// A register name.
    Register(Register),
    /// A keyword from [`KEYWORDS`].
    Keyword,
    /// An operation mnemonic.
    Operation(Opcode),
}

/// Resolves an operation mnemonic. Matching is case-sensitive.
#[must_use]
pub fn resolve_mnemonic(token: &str) -> Option<Opcode> {
    Opcode::from_mnemonic(token)
}

/// True when `token` spells an operation in the wrong case, e.g. `MOV`.
#[must_use]
pub fn is_miscased_mnemonic(token: &str) -> bool {
    resolve_mnemonic(token).is_none()
        && Opcode::ALL
            .iter()
            .any(|op| op.mnemonic().eq_ignore_ascii_case(token))
}

/// Returns what `name` collides with, if it is reserved.
///
/// Registers take precedence over keywords, keywords over operations.
#[must_use]
pub fn reserved_name(name: &str) -> Option<ReservedName> {
    if let Ok(register) = name.parse::<Register>() {
        return Some(ReservedName::Register(register));
    }
    if KEYWORDS.contains(&name) {
        return Some(ReservedName::Keyword);
    }
    resolve_mnemonic(name).map(ReservedName::Operation)
}
