use std::fmt;

/// Width of a machine word in bits.
pub const WORD_BITS: u32 = 12;

/// Mask selecting the low twelve bits of a value.
pub const WORD_MASK: u16 = 0x0FFF;

const SIGN_BIT: u16 = 0x0800;

/// A 12-bit machine word. Values are always stored masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Word(u16);

impl Word {
    /// The all-zero word.
    pub const ZERO: Self = Self(0);

    /// Builds a word from the low twelve bits of `raw`.
    #[must_use]
    pub const fn new(raw: u16) -> Self {
        Self(raw & WORD_MASK)
    }

    /// Builds a word from the two's-complement low twelve bits of `value`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub const fn from_signed(value: i32) -> Self {
        Self((value as u16) & WORD_MASK)
    }

    /// Raw unsigned value (`0..=0xFFF`).
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Value sign-extended from bit 11.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn as_signed(self) -> i16 {
        if self.0 & SIGN_BIT == 0 {
            self.0 as i16
        } else {
            (self.0 | !WORD_MASK) as i16
        }
    }
}

impl From<Word> for u16 {
    fn from(word: Word) -> Self {
        word.value()
    }
}

impl fmt::UpperHex for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

/// Three upper-case hex digits, the object-file rendering.
impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03X}", self.0)
    }
}
