use crate::addressing::AddressingMode;
use crate::encoding::Opcode;

/// A set of addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModeSet(u8);

impl ModeSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    const IMM_DIR_REG: Self = Self::EMPTY
        .with(AddressingMode::Immediate)
        .with(AddressingMode::Direct)
        .with(AddressingMode::Register);
    const DIR_REG: Self = Self::EMPTY
        .with(AddressingMode::Direct)
        .with(AddressingMode::Register);
    const DIR: Self = Self::EMPTY.with(AddressingMode::Direct);
    const DIR_REL: Self = Self::EMPTY
        .with(AddressingMode::Direct)
        .with(AddressingMode::Relative);

    /// Returns this set plus `mode`.
    #[must_use]
    pub const fn with(self, mode: AddressingMode) -> Self {
        Self(self.0 | (1 << mode.code()))
    }

    /// Whether `mode` is a member.
    #[must_use]
    pub const fn contains(self, mode: AddressingMode) -> bool {
        self.0 & (1 << mode.code()) != 0
    }

    /// Members in field-code order.
    pub fn iter(self) -> impl Iterator<Item = AddressingMode> {
        AddressingMode::ALL
            .into_iter()
            .filter(move |mode| self.contains(*mode))
    }
}

/// Operand slots of an operation. `None` means the slot does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperandRules {
    /// Modes accepted as the source operand.
    pub source: Option<ModeSet>,
    /// Modes accepted as the destination operand.
    pub destination: Option<ModeSet>,
}

impl OperandRules {
    const NONE: Self = Self {
        source: None,
        destination: None,
    };

    const fn unary(destination: ModeSet) -> Self {
        Self {
            source: None,
            destination: Some(destination),
        }
    }

    const fn binary(source: ModeSet, destination: ModeSet) -> Self {
        Self {
            source: Some(source),
            destination: Some(destination),
        }
    }

    /// Number of operands the operation takes.
    #[must_use]
    pub const fn operand_count(self) -> usize {
        match (self.source, self.destination) {
            (Some(_), Some(_)) => 2,
            (None, Some(_)) | (Some(_), None) => 1,
            (None, None) => 0,
        }
    }
}

impl Opcode {
    /// Operand count and accepted addressing modes.
    #[must_use]
    pub const fn operand_rules(self) -> OperandRules {
        match self {
            Self::Mov | Self::Add | Self::Sub => {
                OperandRules::binary(ModeSet::IMM_DIR_REG, ModeSet::DIR_REG)
            }
            Self::Cmp => OperandRules::binary(ModeSet::IMM_DIR_REG, ModeSet::IMM_DIR_REG),
            Self::Lea => OperandRules::binary(ModeSet::DIR, ModeSet::DIR_REG),
            Self::Clr | Self::Not | Self::Inc | Self::Dec | Self::Red => {
                OperandRules::unary(ModeSet::DIR_REG)
            }
            Self::Jmp | Self::Bne | Self::Jsr => OperandRules::unary(ModeSet::DIR_REL),
            Self::Prn => OperandRules::unary(ModeSet::IMM_DIR_REG),
            Self::Rts | Self::Stop => OperandRules::NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::ModeSet;
    use crate::addressing::AddressingMode::{self, Direct, Immediate, Register, Relative};
    use crate::encoding::Opcode;

    #[rstest]
    #[case(Opcode::Mov, 2)]
    #[case(Opcode::Lea, 2)]
    #[case(Opcode::Clr, 1)]
    #[case(Opcode::Jsr, 1)]
    #[case(Opcode::Prn, 1)]
    #[case(Opcode::Rts, 0)]
    #[case(Opcode::Stop, 0)]
    fn operand_counts(#[case] opcode: Opcode, #[case] count: usize) {
        assert_eq!(opcode.operand_rules().operand_count(), count);
    }

    #[test]
    fn relative_is_only_a_jump_destination() {
        for opcode in Opcode::ALL {
            let rules = opcode.operand_rules();
            let jumps = matches!(opcode, Opcode::Jmp | Opcode::Bne | Opcode::Jsr);
            assert!(!rules.source.is_some_and(|set| set.contains(Relative)));
            assert_eq!(
                rules.destination.is_some_and(|set| set.contains(Relative)),
                jumps,
                "{opcode}"
            );
        }
    }

    #[test]
    fn only_cmp_and_prn_take_an_immediate_destination() {
        let with_immediate: Vec<Opcode> = Opcode::ALL
            .into_iter()
            .filter(|op| {
                op.operand_rules()
                    .destination
                    .is_some_and(|set| set.contains(Immediate))
            })
            .collect();
        assert_eq!(with_immediate, vec![Opcode::Cmp, Opcode::Prn]);
    }

    #[test]
    fn lea_source_is_direct_only() {
        let source = Opcode::Lea.operand_rules().source.expect("lea has a source");
        assert_eq!(source.iter().collect::<Vec<_>>(), vec![Direct]);
    }

    #[test]
    fn mode_set_membership() {
        let set = ModeSet::EMPTY.with(Direct).with(Register);
        assert!(set.contains(Direct));
        assert!(set.contains(Register));
        assert!(!set.contains(AddressingMode::Immediate));
        assert!(!ModeSet::EMPTY.contains(Relative));
    }
}
