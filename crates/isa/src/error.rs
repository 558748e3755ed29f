use thiserror::Error;

/// Lookup failures against the fixed instruction-set tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum IsaError {
    /// Text did not name one of the sixteen operations.
    #[error("unknown operation mnemonic")]
    UnknownMnemonic,
    /// Text did not name one of `r0`..`r7`.
    #[error("unknown register name")]
    UnknownRegister,
    /// An `(opcode, funct)` pair outside the assigned table.
    #[error("unassigned opcode/funct pair {opcode}/{funct}")]
    UnassignedEncoding {
        /// Primary opcode nibble.
        opcode: u8,
        /// Function nibble.
        funct: u8,
    },
}
