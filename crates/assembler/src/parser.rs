//! Line classifier for assembly source.
//!
//! Each raw line is classified independently into a [`ParsedLine`]. A line
//! that cannot be classified becomes [`ParsedLine::Invalid`] carrying the
//! most specific [`ErrorKind`]; the caller records it and moves on.
//!
//! # Syntax
//!
//! ```text
//! ; comment
//! LABEL: mov #5, r1
//!        bne %LOOP
//! STR:   .string "abc"
//! NUMS:  .data 3, -2, +7
//!        .entry LABEL
//!        .extern EXT
//! ```
//!
//! Tokens are separated by spaces and tabs. Operation names are
//! case-sensitive; labels are at most 31 letters and digits, starting with a
//! letter, and may not spell a register, keyword or operation.

use asm12_isa::Opcode;

use crate::errors::ErrorKind;
use crate::mnemonic::{
    is_miscased_mnemonic, reserved_name, resolve_mnemonic, Directive, ReservedName,
};
use crate::operands::{resolve_operands, Instruction};
use crate::source::{significant_len, strip_line_terminator, MAX_LINE_LENGTH};

/// Maximum label length in characters.
pub const MAX_LABEL_LENGTH: usize = 31;

/// Maximum `.string` content length in characters.
pub const MAX_STRING_LENGTH: usize = 100;

/// One classified source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// Blank or whitespace-only line.
    Empty,
    /// Line whose first token starts with `;`.
    Comment,
    /// `.entry NAME`.
    Entry {
        /// The declared label.
        name: String,
        /// A label written in front of the directive; it has no effect.
        ignored_label: Option<String>,
    },
    /// `.extern NAME`.
    Extern {
        /// The declared label.
        name: String,
        /// A label written in front of the directive; it has no effect.
        ignored_label: Option<String>,
    },
    /// `.data` with its integers.
    Data {
        /// Label defined on this line.
        label: Option<String>,
        /// The integers in source order.
        values: Vec<i32>,
    },
    /// `.string` with its content, quotes removed.
    String {
        /// Label defined on this line.
        label: Option<String>,
        /// The characters between the quotes.
        text: String,
    },
    /// An operation with resolved operands.
    Instruction {
        /// Label defined on this line.
        label: Option<String>,
        /// The operation and its operands.
        instruction: Instruction,
    },
    /// A line that could not be classified.
    Invalid {
        /// Label written on the line; it is never defined.
        label: Option<String>,
        /// Why the line was rejected.
        error: ErrorKind,
    },
}

/// Flat shape tag of a [`ParsedLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum LineShape {
    Empty,
    Comment,
    Entry,
    Extern,
    DataWithLabel,
    DataWithoutLabel,
    StringWithLabel,
    StringWithoutLabel,
    InstructionWithLabelNoOperands,
    InstructionWithLabelOneOperand,
    InstructionWithLabelTwoOperands,
    InstructionWithoutLabelNoOperands,
    InstructionWithoutLabelOneOperand,
    InstructionWithoutLabelTwoOperands,
    Invalid,
    Unknown,
}

impl ParsedLine {
    /// The shape tag of this line.
    #[must_use]
    pub fn shape(&self) -> LineShape {
        match self {
            Self::Empty => LineShape::Empty,
            Self::Comment => LineShape::Comment,
            Self::Entry { .. } => LineShape::Entry,
            Self::Extern { .. } => LineShape::Extern,
            Self::Data { label: Some(_), .. } => LineShape::DataWithLabel,
            Self::Data { label: None, .. } => LineShape::DataWithoutLabel,
            Self::String { label: Some(_), .. } => LineShape::StringWithLabel,
            Self::String { label: None, .. } => LineShape::StringWithoutLabel,
            Self::Instruction { label, instruction } => {
                let operands = instruction.operands().count();
                match (label.is_some(), operands) {
                    (true, 0) => LineShape::InstructionWithLabelNoOperands,
                    (true, 1) => LineShape::InstructionWithLabelOneOperand,
                    (true, _) => LineShape::InstructionWithLabelTwoOperands,
                    (false, 0) => LineShape::InstructionWithoutLabelNoOperands,
                    (false, 1) => LineShape::InstructionWithoutLabelOneOperand,
                    (false, _) => LineShape::InstructionWithoutLabelTwoOperands,
                }
            }
            Self::Invalid {
                error: ErrorKind::UnknownLine,
                ..
            } => LineShape::Unknown,
            Self::Invalid { .. } => LineShape::Invalid,
        }
    }

    /// The label this line defines, if any.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Data { label, .. }
            | Self::String { label, .. }
            | Self::Instruction { label, .. } => label.as_deref(),
            Self::Empty
            | Self::Comment
            | Self::Entry { .. }
            | Self::Extern { .. }
            | Self::Invalid { .. } => None,
        }
    }

    /// The error carried by an invalid line.
    #[must_use]
    pub const fn error(&self) -> Option<ErrorKind> {
        match self {
            Self::Invalid { error, .. } => Some(*error),
            _ => None,
        }
    }

    const fn invalid(label: Option<String>, error: ErrorKind) -> Self {
        Self::Invalid { label, error }
    }
}

/// Classifies one raw source line.
#[must_use]
pub fn parse_line(line: &str) -> ParsedLine {
    let line = strip_line_terminator(line);
    if significant_len(line) > MAX_LINE_LENGTH {
        return ParsedLine::invalid(None, ErrorKind::LongLine);
    }

    let tokens: Vec<&str> = tokenize(line).collect();
    let Some((&first, rest)) = tokens.split_first() else {
        return ParsedLine::Empty;
    };

    if first.starts_with(';') {
        return ParsedLine::Comment;
    }

    match first.strip_suffix(':') {
        Some(name) => {
            if let Err(kind) = validate_label(name) {
                return ParsedLine::invalid(None, kind);
            }
            parse_body(Some(name.to_string()), rest)
        }
        None => parse_body(None, &tokens),
    }
}

/// Splits a line on spaces and tabs.
pub fn tokenize(line: &str) -> impl Iterator<Item = &str> {
    line.split([' ', '\t']).filter(|token| !token.is_empty())
}

/// Checks a label name against the syntax, length and reserved-name rules.
///
/// # Errors
///
/// Returns the label error kind describing the first rule broken, with
/// combined length and syntax failures reported together.
pub fn validate_label(name: &str) -> Result<(), ErrorKind> {
    let too_long = name.chars().count() > MAX_LABEL_LENGTH;
    let mut chars = name.chars();
    let well_formed = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric());

    match (too_long, well_formed) {
        (true, false) => Err(ErrorKind::LabelLengthExceedAndBadSyntax),
        (true, true) => Err(ErrorKind::LabelLengthExceed),
        (false, false) => Err(ErrorKind::LabelBadSyntax),
        (false, true) => match reserved_name(name) {
            Some(ReservedName::Register(_)) => Err(ErrorKind::LabelNameLikeRegisterName),
            Some(ReservedName::Keyword) => Err(ErrorKind::LabelNameLikeKeywordName),
            Some(ReservedName::Operation(_)) => Err(ErrorKind::LabelNameLikeOperationName),
            None => Ok(()),
        },
    }
}

fn parse_body(label: Option<String>, tokens: &[&str]) -> ParsedLine {
    let Some((&head, args)) = tokens.split_first() else {
        return ParsedLine::invalid(label, ErrorKind::MissingInformationAfterLabel);
    };

    if let Some(opcode) = resolve_mnemonic(head) {
        return parse_instruction(label, opcode, args);
    }

    let parsed = match Directive::from_token(head) {
        Some(Directive::Entry) => parse_declared_label(args).map(|name| ParsedLine::Entry {
            name,
            ignored_label: label.clone(),
        }),
        Some(Directive::Extern) => parse_declared_label(args).map(|name| ParsedLine::Extern {
            name,
            ignored_label: label.clone(),
        }),
        Some(Directive::String) => parse_string(args).map(|text| ParsedLine::String {
            label: label.clone(),
            text,
        }),
        Some(Directive::Data) => parse_data(args).map(|values| ParsedLine::Data {
            label: label.clone(),
            values,
        }),
        None if is_miscased_mnemonic(head) => Err(ErrorKind::BadOperationSyntax),
        None => Err(ErrorKind::UnknownLine),
    };

    parsed.unwrap_or_else(|error| ParsedLine::invalid(label, error))
}

fn parse_instruction(label: Option<String>, opcode: Opcode, args: &[&str]) -> ParsedLine {
    match resolve_operands(opcode, args) {
        Ok(instruction) => ParsedLine::Instruction { label, instruction },
        Err(error) => ParsedLine::invalid(label, error),
    }
}

fn parse_declared_label(args: &[&str]) -> Result<String, ErrorKind> {
    match args {
        [] => Err(ErrorKind::NoValuesAfterOperation),
        [name] => validate_label(name).map(|()| (*name).to_string()),
        _ => Err(ErrorKind::TooManyValuesAfterOperation),
    }
}

fn parse_string(args: &[&str]) -> Result<String, ErrorKind> {
    if args.is_empty() {
        return Err(ErrorKind::MissingInformationAfterString);
    }

    let joined = args.join(" ");
    if joined.chars().count() == 1 {
        return Err(ErrorKind::TooShortString);
    }

    match (joined.starts_with('"'), joined.ends_with('"')) {
        (false, false) => return Err(ErrorKind::StringStartsAndEndsWithoutQuotationMark),
        (false, true) => return Err(ErrorKind::StringStartsWithoutQuotationMark),
        (true, false) => return Err(ErrorKind::StringEndsWithoutQuotationMark),
        (true, true) => {}
    }

    let content = &joined[1..joined.len() - 1];
    if content.chars().count() > MAX_STRING_LENGTH {
        return Err(ErrorKind::TooLongString);
    }
    Ok(content.to_string())
}

fn parse_data(args: &[&str]) -> Result<Vec<i32>, ErrorKind> {
    let Some((first, rest)) = args.split_first() else {
        return Err(ErrorKind::MissingInformationAfterData);
    };

    let mut joined = (*first).to_string();
    for token in rest {
        match (joined.ends_with(','), token.starts_with(',')) {
            (false, false) => return Err(ErrorKind::MissingCommaInData),
            (true, true) => return Err(ErrorKind::TooManyCommasInData),
            _ => joined.push_str(token),
        }
    }

    split_data_values(&joined)
}

fn split_data_values(text: &str) -> Result<Vec<i32>, ErrorKind> {
    if !text.starts_with(|c: char| c.is_ascii_digit() || c == '+' || c == '-') {
        return Err(ErrorKind::DataDoesntStartWithANumber);
    }
    if !text.ends_with(|c: char| c.is_ascii_digit()) {
        return Err(ErrorKind::DataDoesntEndWithANumber);
    }

    let bytes = text.as_bytes();
    let mut values = Vec::new();
    let mut pos = 0;
    loop {
        let start = pos;
        if matches!(bytes.get(pos), Some(b'+' | b'-')) {
            pos += 1;
        }
        let digits = pos;
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
        }
        if pos == digits {
            return Err(ErrorKind::WrongCharInData);
        }
        let value = text[start..pos]
            .parse::<i32>()
            .map_err(|_| ErrorKind::WrongCharInData)?;
        values.push(value);

        match bytes.get(pos) {
            None => return Ok(values),
            Some(b',') => {
                pos += 1;
                if bytes.get(pos) == Some(&b',') {
                    return Err(ErrorKind::TooManyCommasInData);
                }
            }
            // `5-3`: a second number started without a separator.
            Some(b'+' | b'-') => return Err(ErrorKind::MissingCommaInData),
            Some(_) => return Err(ErrorKind::WrongCharInData),
        }
    }
}

#[cfg(test)]
mod tests {
    use asm12_isa::Register;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::operands::Operand;

    fn error_of(line: &str) -> Option<ErrorKind> {
        parse_line(line).error()
    }

    #[test]
    fn blank_and_comment_lines() {
        assert_eq!(parse_line(""), ParsedLine::Empty);
        assert_eq!(parse_line(" \t \n"), ParsedLine::Empty);
        assert_eq!(parse_line("; a comment"), ParsedLine::Comment);
        assert_eq!(parse_line("   ;indented"), ParsedLine::Comment);
    }

    #[test]
    fn labelled_instruction() {
        let parsed = parse_line("MAIN: mov #5, r1");
        assert_eq!(parsed.label(), Some("MAIN"));
        assert_eq!(parsed.shape(), LineShape::InstructionWithLabelTwoOperands);
        let ParsedLine::Instruction { instruction, .. } = parsed else {
            panic!("expected instruction");
        };
        assert_eq!(instruction.opcode, Opcode::Mov);
        assert_eq!(instruction.source, Some(Operand::Immediate(5)));
        assert_eq!(
            instruction.destination,
            Some(Operand::Register(Register::R1))
        );
    }

    #[rstest]
    #[case("stop", LineShape::InstructionWithoutLabelNoOperands)]
    #[case("END: stop", LineShape::InstructionWithLabelNoOperands)]
    #[case("inc r2", LineShape::InstructionWithoutLabelOneOperand)]
    #[case("X: jmp %X", LineShape::InstructionWithLabelOneOperand)]
    #[case("add r1,r2", LineShape::InstructionWithoutLabelTwoOperands)]
    #[case("S: .string \"ab\"", LineShape::StringWithLabel)]
    #[case(".string \"ab\"", LineShape::StringWithoutLabel)]
    #[case("D: .data 1", LineShape::DataWithLabel)]
    #[case(".data 1", LineShape::DataWithoutLabel)]
    #[case(".entry MAIN", LineShape::Entry)]
    #[case(".extern EXT", LineShape::Extern)]
    #[case("hello world", LineShape::Unknown)]
    #[case("mov r1", LineShape::Invalid)]
    fn line_shapes(#[case] line: &str, #[case] shape: LineShape) {
        assert_eq!(parse_line(line).shape(), shape);
    }

    #[rstest]
    #[case("1abc", ErrorKind::LabelBadSyntax)]
    #[case("ab_c", ErrorKind::LabelBadSyntax)]
    #[case("", ErrorKind::LabelBadSyntax)]
    #[case("abcdefghijabcdefghijabcdefghijab", ErrorKind::LabelLengthExceed)]
    #[case("abcdefghijabcdefghijabcdefghija!", ErrorKind::LabelLengthExceedAndBadSyntax)]
    #[case("r3", ErrorKind::LabelNameLikeRegisterName)]
    #[case("PSW", ErrorKind::LabelNameLikeKeywordName)]
    #[case("string", ErrorKind::LabelNameLikeKeywordName)]
    #[case("lea", ErrorKind::LabelNameLikeOperationName)]
    fn label_errors(#[case] name: &str, #[case] kind: ErrorKind) {
        assert_eq!(validate_label(name), Err(kind));
    }

    #[test]
    fn thirty_one_character_label_is_accepted() {
        assert_eq!(validate_label(&"a".repeat(31)), Ok(()));
        assert_eq!(validate_label("Loop2"), Ok(()));
    }

    #[test]
    fn invalid_label_rejects_the_whole_line() {
        assert_eq!(
            parse_line("r1: mov r1,r2"),
            ParsedLine::Invalid {
                label: None,
                error: ErrorKind::LabelNameLikeRegisterName
            }
        );
    }

    #[test]
    fn label_alone_is_missing_information() {
        assert_eq!(
            parse_line("LONELY:"),
            ParsedLine::Invalid {
                label: Some("LONELY".into()),
                error: ErrorKind::MissingInformationAfterLabel
            }
        );
    }

    #[test]
    fn invalid_line_keeps_label_text_but_defines_nothing() {
        let parsed = parse_line("X: mov r1");
        assert_eq!(parsed.error(), Some(ErrorKind::MissingOperands));
        assert_eq!(parsed.label(), None);
    }

    #[rstest]
    #[case("MOV r1,r2", ErrorKind::BadOperationSyntax)]
    #[case("L: Stop", ErrorKind::BadOperationSyntax)]
    #[case("move r1,r2", ErrorKind::UnknownLine)]
    #[case(".entry", ErrorKind::NoValuesAfterOperation)]
    #[case(".extern A B", ErrorKind::TooManyValuesAfterOperation)]
    #[case(".extern 9A", ErrorKind::LabelBadSyntax)]
    #[case(".entry jmp", ErrorKind::LabelNameLikeOperationName)]
    fn line_errors(#[case] line: &str, #[case] kind: ErrorKind) {
        assert_eq!(error_of(line), Some(kind));
    }

    #[test]
    fn label_before_entry_is_ignored_but_kept() {
        assert_eq!(
            parse_line("X: .entry MAIN"),
            ParsedLine::Entry {
                name: "MAIN".into(),
                ignored_label: Some("X".into())
            }
        );
    }

    #[rstest]
    #[case(".string \"abc\"", "abc")]
    #[case(".string \"\"", "")]
    #[case(".string \"a  b\"", "a b")]
    #[case(".string \"say \"hi\"\"", "say \"hi\"")]
    fn string_contents(#[case] line: &str, #[case] text: &str) {
        assert_eq!(
            parse_line(line),
            ParsedLine::String {
                label: None,
                text: text.to_string()
            }
        );
    }

    #[rstest]
    #[case(".string", ErrorKind::MissingInformationAfterString)]
    #[case(".string \"", ErrorKind::TooShortString)]
    #[case(".string abc\"", ErrorKind::StringStartsWithoutQuotationMark)]
    #[case(".string \"abc", ErrorKind::StringEndsWithoutQuotationMark)]
    #[case(".string abc", ErrorKind::StringStartsAndEndsWithoutQuotationMark)]
    fn string_errors(#[case] line: &str, #[case] kind: ErrorKind) {
        assert_eq!(error_of(line), Some(kind));
    }

    #[test]
    fn string_length_limit() {
        let at_limit = format!("\"{}\"", "x".repeat(MAX_STRING_LENGTH));
        assert_eq!(
            parse_string(&[at_limit.as_str()]),
            Ok("x".repeat(MAX_STRING_LENGTH))
        );

        let over = format!("\"{}\"", "x".repeat(MAX_STRING_LENGTH + 1));
        assert_eq!(
            parse_string(&[over.as_str()]),
            Err(ErrorKind::TooLongString)
        );
    }

    #[rstest]
    #[case(".data 3, -2, +7", vec![3, -2, 7])]
    #[case(".data 3,-2,+7", vec![3, -2, 7])]
    #[case(".data 3 ,-2 , +7", vec![3, -2, 7])]
    #[case(".data -0", vec![0])]
    #[case(".data 2147483647", vec![i32::MAX])]
    fn data_values(#[case] line: &str, #[case] values: Vec<i32>) {
        assert_eq!(
            parse_line(line),
            ParsedLine::Data {
                label: None,
                values
            }
        );
    }

    #[rstest]
    #[case(".data", ErrorKind::MissingInformationAfterData)]
    #[case(".data 1 2", ErrorKind::MissingCommaInData)]
    #[case(".data 1, ,2", ErrorKind::TooManyCommasInData)]
    #[case(".data 1,,2", ErrorKind::TooManyCommasInData)]
    #[case(".data ,1", ErrorKind::DataDoesntStartWithANumber)]
    #[case(".data 1,", ErrorKind::DataDoesntEndWithANumber)]
    #[case(".data 1,a2", ErrorKind::WrongCharInData)]
    #[case(".data 1,+,2", ErrorKind::WrongCharInData)]
    #[case(".data 1x2", ErrorKind::WrongCharInData)]
    #[case(".data 5-3", ErrorKind::MissingCommaInData)]
    #[case(".data 2147483648", ErrorKind::WrongCharInData)]
    fn data_errors(#[case] line: &str, #[case] kind: ErrorKind) {
        assert_eq!(error_of(line), Some(kind));
    }

    #[test]
    fn long_line_is_rejected_before_anything_else() {
        let line = format!("; {}", "x".repeat(80));
        assert_eq!(error_of(&line), Some(ErrorKind::LongLine));
    }

    proptest! {
        #[test]
        fn line_length_limit_counts_only_significant_characters(
            count in 0usize..160,
            padding in 0usize..40,
        ) {
            let line = format!("{}{}", ";".repeat(count), " \t".repeat(padding));
            let parsed = parse_line(&line);
            if count > MAX_LINE_LENGTH {
                prop_assert_eq!(parsed.error(), Some(ErrorKind::LongLine));
            } else {
                prop_assert_ne!(parsed.error(), Some(ErrorKind::LongLine));
            }
        }

        #[test]
        fn data_lists_parse_back(values in proptest::collection::vec(any::<i32>(), 1..6)) {
            let list = values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let parsed = parse_line(&format!("N: .data {list}"));
            prop_assert_eq!(
                parsed,
                ParsedLine::Data { label: Some("N".into()), values }
            );
        }
    }
}
