//! Operand separation, addressing-mode inference and compatibility checks.

use std::cmp::Ordering;
use std::fmt;

use asm12_isa::{AddressingMode, Opcode, Register};

use crate::errors::ErrorKind;
use crate::parser::validate_label;

/// Which operand slot an operand occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandRole {
    /// First of two operands.
    Source,
    /// The only operand, or the second of two.
    Destination,
}

impl OperandRole {
    /// The error reported when this operand names an undefined label.
    #[must_use]
    pub const fn undefined_label_error(self) -> ErrorKind {
        match self {
            Self::Source => ErrorKind::UndefinedLabelInSourceOperand,
            Self::Destination => ErrorKind::UndefinedLabelInDestinationOperand,
        }
    }

    const fn bad_syntax_error(self) -> ErrorKind {
        match self {
            Self::Source => ErrorKind::BadSyntaxOfSrcOperand,
            Self::Destination => ErrorKind::BadSyntaxOfDestOperand,
        }
    }
}

/// A syntactically valid operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    /// `#<integer>`
    Immediate(i32),
    /// `LABEL`
    Direct(String),
    /// `%LABEL`
    Relative(String),
    /// `r0`..`r7`
    Register(Register),
}

impl Operand {
    /// The addressing mode this operand was written in.
    #[must_use]
    pub const fn mode(&self) -> AddressingMode {
        match self {
            Self::Immediate(_) => AddressingMode::Immediate,
            Self::Direct(_) => AddressingMode::Direct,
            Self::Relative(_) => AddressingMode::Relative,
            Self::Register(_) => AddressingMode::Register,
        }
    }

    /// The label this operand refers to, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Direct(label) | Self::Relative(label) => Some(label),
            Self::Immediate(_) | Self::Register(_) => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate(value) => write!(f, "#{value}"),
            Self::Direct(label) => f.write_str(label),
            Self::Relative(label) => write!(f, "%{label}"),
            Self::Register(register) => write!(f, "{register}"),
        }
    }
}

/// An operation with its resolved operands.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// The operation.
    pub opcode: Opcode,
    /// Source operand, present only for two-operand operations.
    pub source: Option<Operand>,
    /// Destination operand, present for one- and two-operand operations.
    pub destination: Option<Operand>,
}

impl Instruction {
    /// Words this instruction occupies: one plus one per operand.
    #[must_use]
    pub const fn word_count(&self) -> u32 {
        let mut count = 1;
        if self.source.is_some() {
            count += 1;
        }
        if self.destination.is_some() {
            count += 1;
        }
        count
    }

    /// Present operands, source first.
    pub fn operands(&self) -> impl Iterator<Item = (OperandRole, &Operand)> {
        self.source
            .iter()
            .map(|op| (OperandRole::Source, op))
            .chain(
                self.destination
                    .iter()
                    .map(|op| (OperandRole::Destination, op)),
            )
    }
}

/// Why a single operand token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandFault {
    /// An immediate-specific error, reported as is.
    Immediate(ErrorKind),
    /// Any other malformed operand; reported by its role.
    Syntax,
}

/// Infers the addressing mode of one operand token.
///
/// # Errors
///
/// Returns [`OperandFault::Immediate`] for a malformed `#` operand and
/// [`OperandFault::Syntax`] for anything else that is not a valid operand.
pub fn infer_operand(token: &str) -> Result<Operand, OperandFault> {
    if let Some(number) = token.strip_prefix('#') {
        if number.is_empty() {
            return Err(OperandFault::Immediate(
                ErrorKind::MissingNumberAfterNumberSign,
            ));
        }
        return number
            .parse::<i32>()
            .map(Operand::Immediate)
            .map_err(|_| OperandFault::Immediate(ErrorKind::InvalidImmediateOperand));
    }

    if let Ok(register) = token.parse::<Register>() {
        return Ok(Operand::Register(register));
    }

    if let Some(label) = token.strip_prefix('%') {
        return validate_label(label)
            .map(|()| Operand::Relative(label.to_string()))
            .map_err(|_| OperandFault::Syntax);
    }

    validate_label(token)
        .map(|()| Operand::Direct(token.to_string()))
        .map_err(|_| OperandFault::Syntax)
}

/// Splits the tokens after an operation into at most two operand texts.
///
/// # Errors
///
/// Returns the comma or separator error describing the malformed operand area.
pub fn split_operands<'a>(tokens: &[&'a str]) -> Result<Vec<&'a str>, ErrorKind> {
    match *tokens {
        [] => Ok(Vec::new()),
        [only] => match only.split_once(',') {
            None => Ok(vec![only]),
            Some((first, second)) => operand_pair(first, second),
        },
        [first, second] => match (first.strip_suffix(','), second.strip_prefix(',')) {
            (Some(_), Some(_)) => Err(ErrorKind::ARedundantCommaBetweenOperands),
            (None, None) => Err(ErrorKind::MissingCommaBetweenOperands),
            (Some(first), None) => operand_pair(first, second),
            (None, Some(second)) => operand_pair(first, second),
        },
        [first, separator, second] => {
            if separator == "," {
                Ok(vec![first, second])
            } else {
                Err(ErrorKind::InvalidCharacterBetweenOperands)
            }
        }
        _ => Err(ErrorKind::RedundantInformationInOperandsArea),
    }
}

/// Two operand texts around a comma; a side left empty is a missing operand.
fn operand_pair<'a>(first: &'a str, second: &'a str) -> Result<Vec<&'a str>, ErrorKind> {
    if first.is_empty() || second.is_empty() {
        Err(ErrorKind::MissingOperands)
    } else {
        Ok(vec![first, second])
    }
}

/// Resolves the operand tokens of `opcode` into an [`Instruction`].
///
/// # Errors
///
/// Returns the most specific [`ErrorKind`] describing why the operand area
/// is malformed or incompatible with the operation.
pub fn resolve_operands(opcode: Opcode, tokens: &[&str]) -> Result<Instruction, ErrorKind> {
    let texts = split_operands(tokens)?;

    let (source, destination) = match texts.as_slice() {
        [] => (None, None),
        [destination] => {
            let destination = infer_operand(destination)
                .map_err(|fault| fault_kind(fault, OperandRole::Destination))?;
            (None, Some(destination))
        }
        [source, destination] => {
            match (infer_operand(source), infer_operand(destination)) {
                (Ok(source), Ok(destination)) => (Some(source), Some(destination)),
                (Err(OperandFault::Immediate(kind)), _)
                | (_, Err(OperandFault::Immediate(kind))) => return Err(kind),
                (Err(_), Err(_)) => return Err(ErrorKind::BadSyntaxOfSrcAndDestOperands),
                (Err(_), Ok(_)) => return Err(ErrorKind::BadSyntaxOfSrcOperand),
                (Ok(_), Err(_)) => return Err(ErrorKind::BadSyntaxOfDestOperand),
            }
        }
        _ => return Err(ErrorKind::RedundantInformationInOperandsArea),
    };

    check_compatibility(opcode, source.as_ref(), destination.as_ref())?;

    Ok(Instruction {
        opcode,
        source,
        destination,
    })
}

const fn fault_kind(fault: OperandFault, role: OperandRole) -> ErrorKind {
    match fault {
        OperandFault::Immediate(kind) => kind,
        OperandFault::Syntax => role.bad_syntax_error(),
    }
}

fn check_compatibility(
    opcode: Opcode,
    source: Option<&Operand>,
    destination: Option<&Operand>,
) -> Result<(), ErrorKind> {
    let rules = opcode.operand_rules();
    let expected = rules.operand_count();
    let given = usize::from(source.is_some()) + usize::from(destination.is_some());

    match given.cmp(&expected) {
        Ordering::Less => return Err(ErrorKind::MissingOperands),
        Ordering::Greater if expected == 0 => {
            return Err(ErrorKind::RedundantInformationInOperandsArea)
        }
        Ordering::Greater => return Err(ErrorKind::TooManyOperands),
        Ordering::Equal => {}
    }

    if let (Some(operand), Some(allowed)) = (source, rules.source) {
        if !allowed.contains(operand.mode()) {
            return Err(OperandRole::Source.bad_syntax_error());
        }
    }
    if let (Some(operand), Some(allowed)) = (destination, rules.destination) {
        if !allowed.contains(operand.mode()) {
            return Err(OperandRole::Destination.bad_syntax_error());
        }
    }
    Ok(())
}
