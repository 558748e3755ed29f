//! Property tests over the instruction-word layout.

use asm12_isa::{
    decode_instruction_word, encode_instruction_word, AddressingMode, Opcode, Word, WORD_MASK,
};
use proptest::prelude::*;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

fn any_opcode() -> impl Strategy<Value = Opcode> {
    (0..Opcode::ALL.len()).prop_map(|index| Opcode::ALL[index])
}

fn any_mode() -> impl Strategy<Value = Option<AddressingMode>> {
    prop_oneof![
        Just(None),
        (0..AddressingMode::ALL.len()).prop_map(|index| Some(AddressingMode::ALL[index])),
    ]
}

proptest! {
    #[test]
    fn encoded_fields_decode_back(opcode in any_opcode(), source in any_mode(), destination in any_mode()) {
        let word = encode_instruction_word(opcode, source, destination);
        let fields = decode_instruction_word(word).expect("table opcode decodes");
        prop_assert_eq!(fields.opcode, opcode);
        prop_assert_eq!(fields.source, source.unwrap_or(AddressingMode::Immediate));
        prop_assert_eq!(fields.destination, destination.unwrap_or(AddressingMode::Immediate));
    }

    #[test]
    fn signed_values_keep_their_low_twelve_bits(value in any::<i32>()) {
        let word = Word::from_signed(value);
        prop_assert!(word.value() <= WORD_MASK);
        prop_assert_eq!(i32::from(word.as_signed()) & 0xFFF, value & 0xFFF);
    }
}
