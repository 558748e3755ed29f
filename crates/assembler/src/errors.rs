//! Error taxonomy and per-file error collection.
//!
//! Source errors ([`ErrorKind`]) are recorded and never stop assembly; every
//! line is still processed so the diagnostic report lists all problems in a
//! file at once. Fatal conditions that abort a file (unreadable source, a
//! failed artifact write) are [`AssembleError`].
//!
//! # Report Format
//!
//! ```text
//! List of errors in file 'prog.as'
//! -----------------------------------------------------------
//! ****  2 errors detected  ****
//!
//! Error in file 'prog.as': File name is longer than allowed. ...
//! Error in line 4: Unknown line.
//!
//! ****  End of error list for file 'prog.as'  ****
//! -----------------------------------------------------------
//! ```

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

const REPORT_RULE: &str = "-----------------------------------------------------------";

/// Broad grouping of [`ErrorKind`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The line as a whole could not be classified.
    LineShape,
    /// A label definition or reference is malformed or reserved.
    LabelSyntax,
    /// Operation operands are malformed or incompatible.
    OperandSyntax,
    /// `.data` or `.string` payload is malformed.
    DataSyntax,
    /// A label sighting conflicts with an existing symbol.
    SymbolConflict,
    /// A label could not be resolved after the first pass.
    LabelResolution,
    /// The error concerns the file rather than a line.
    FileLevel,
}

/// Every error the assembler records against a source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ErrorKind {
    /// More than 80 significant characters on the line.
    #[error("Line length is longer than allowed. Max line length is 80 characters (not including whitespace and the newline character).")]
    LongLine,
    /// Label contains a character other than letters and digits, or starts with a digit.
    #[error("Label syntax is wrong (only lowercase and uppercase letters and numbers are allowed, and the first character must be a letter).")]
    LabelBadSyntax,
    /// Label is longer than 31 characters.
    #[error("Label length is longer than allowed. Max label length is 31 characters.")]
    LabelLengthExceed,
    /// Label is both too long and malformed.
    #[error("Label syntax is wrong and label is longer than allowed. Only letters and numbers are allowed, the first character must be a letter, and the max label length is 31 characters.")]
    LabelLengthExceedAndBadSyntax,
    /// Label spells an operation mnemonic.
    #[error("Label has the same name as an operation.")]
    LabelNameLikeOperationName,
    /// Label spells a register name.
    #[error("Label has the same name as a register.")]
    LabelNameLikeRegisterName,
    /// Label is already external, or external is requested for a defined label.
    #[error("Label has the same name as an existing label.")]
    LabelNameLikeExistingLabel,
    /// `.entry`/`.extern` without a label.
    #[error("Missing values after operation.")]
    NoValuesAfterOperation,
    /// `.entry`/`.extern` followed by more than one token.
    #[error("Too many values after operation.")]
    TooManyValuesAfterOperation,
    /// `.string` operand of a single character.
    #[error("The string must be at least of size 2: a quotation mark at the beginning and at the end, and any characters in between.")]
    TooShortString,
    /// `.string` operand without an opening quote.
    #[error("Quotation mark is missing at the beginning of the string.")]
    StringStartsWithoutQuotationMark,
    /// `.string` operand without a closing quote.
    #[error("Quotation mark is missing at the end of the string.")]
    StringEndsWithoutQuotationMark,
    /// `.string` operand without either quote.
    #[error("Quotation marks are missing at the beginning and at the end of the string.")]
    StringStartsAndEndsWithoutQuotationMark,
    /// `.string` content longer than 100 characters.
    #[error("The string is too long. Max string size is 100 characters.")]
    TooLongString,
    /// `.data` payload starts with something other than a digit or sign.
    #[error("Data doesn't start with an integer.")]
    DataDoesntStartWithANumber,
    /// `.data` payload ends with something other than a digit.
    #[error("Data doesn't end with an integer.")]
    DataDoesntEndWithANumber,
    /// Unexpected character inside a `.data` payload.
    #[error("Wrong character in data. Data must contain only integers separated by commas, and must start and end with an integer.")]
    WrongCharInData,
    /// Two `.data` integers without a comma between them.
    #[error("A comma is missing. Data integers must be separated by commas.")]
    MissingCommaInData,
    /// More than one comma between two `.data` integers.
    #[error("Data integers must be separated by exactly one comma.")]
    TooManyCommasInData,
    /// Fewer operands than the operation takes.
    #[error("Missing operand(s) for this operation.")]
    MissingOperands,
    /// More operands than a one-operand operation takes.
    #[error("Too many operands.")]
    TooManyOperands,
    /// `#` followed by something other than an integer.
    #[error("Invalid integer after #.")]
    InvalidImmediateOperand,
    /// `#` with nothing after it.
    #[error("An integer is expected after #.")]
    MissingNumberAfterNumberSign,
    /// Source operand is malformed or not allowed for the operation.
    #[error("Invalid syntax of source operand.")]
    BadSyntaxOfSrcOperand,
    /// Destination operand is malformed or not allowed for the operation.
    #[error("Invalid syntax of destination operand.")]
    BadSyntaxOfDestOperand,
    /// Both operands are malformed.
    #[error("Invalid syntax of both source and destination operands.")]
    BadSyntaxOfSrcAndDestOperands,
    /// Two operand tokens without a comma between them.
    #[error("Missing comma between source and destination operands.")]
    MissingCommaBetweenOperands,
    /// A comma on both sides of the operand seam.
    #[error("A redundant comma between source and destination operands.")]
    ARedundantCommaBetweenOperands,
    /// The separator token between operands is not a lone comma.
    #[error("Invalid character in operands area, use a comma as a separator between operands.")]
    InvalidCharacterBetweenOperands,
    /// Operands given to an operation that takes none, or too many tokens.
    #[error("Redundant information in operands area.")]
    RedundantInformationInOperandsArea,
    /// First token differs from an operation name only by case.
    #[error("Invalid operation syntax.")]
    BadOperationSyntax,
    /// `.data` with no payload.
    #[error("Missing information after .data.")]
    MissingInformationAfterData,
    /// `.string` with no payload.
    #[error("Missing information after .string.")]
    MissingInformationAfterString,
    /// The line matches none of the known shapes.
    #[error("Unknown line.")]
    UnknownLine,
    /// A label definition with nothing after it.
    #[error("Missing information after label.")]
    MissingInformationAfterLabel,
    /// Label spells a reserved keyword.
    #[error("Label has the same name as a keyword. Keywords: data, string, entry, extern, PSW.")]
    LabelNameLikeKeywordName,
    /// Destination operand names a label that was never defined.
    #[error("Undefined label in destination operand.")]
    UndefinedLabelInDestinationOperand,
    /// Source operand names a label that was never defined.
    #[error("Undefined label in source operand.")]
    UndefinedLabelInSourceOperand,
    /// `.extern` for a label already declared `.entry`.
    #[error("Failed attempt to add an extern label. This label already exists as an entry label.")]
    EntryLabelExistsTryToAddExternLabel,
    /// `.entry` for a label already declared `.extern`.
    #[error("Failed attempt to add an entry label. This label already exists as an extern label.")]
    ExternLabelExistsTryToAddEntryLabel,
    /// Data label for a name already defined in code.
    #[error("Failed attempt to add a data segment label. This label already exists as a code segment label.")]
    LabelExistsInCodeTryToAddDataLabel,
    /// Code label for a name already defined in data.
    #[error("Failed attempt to add a code segment label. This label already exists as a data segment label.")]
    LabelExistsInDataTryToAddCodeLabel,
    /// Second code definition of a label.
    #[error("Failed attempt to duplicate a code segment label.")]
    DuplicateCodeLabelAttempt,
    /// Second data definition of a label.
    #[error("Failed attempt to duplicate a data segment label.")]
    DuplicateDataLabelAttempt,
    /// `.entry` label never defined in the file.
    #[error("Undefined entry label.")]
    UndefinedEntryLabel,
    /// Source file name stem exceeds 30 characters.
    #[error("File name is longer than allowed. Max file name length allowed is 30 characters.")]
    FileNameLongerThanAllowed,
}

impl ErrorKind {
    /// Returns the grouping this error belongs to.
    #[must_use]
    pub const fn category(self) -> ErrorCategory {
        match self {
            Self::LongLine
            | Self::UnknownLine
            | Self::MissingInformationAfterLabel
            | Self::BadOperationSyntax => ErrorCategory::LineShape,
            Self::LabelBadSyntax
            | Self::LabelLengthExceed
            | Self::LabelLengthExceedAndBadSyntax
            | Self::LabelNameLikeOperationName
            | Self::LabelNameLikeRegisterName
            | Self::LabelNameLikeKeywordName
            | Self::LabelNameLikeExistingLabel => ErrorCategory::LabelSyntax,
            Self::NoValuesAfterOperation
            | Self::TooManyValuesAfterOperation
            | Self::MissingOperands
            | Self::TooManyOperands
            | Self::InvalidImmediateOperand
            | Self::MissingNumberAfterNumberSign
            | Self::BadSyntaxOfSrcOperand
            | Self::BadSyntaxOfDestOperand
            | Self::BadSyntaxOfSrcAndDestOperands
            | Self::MissingCommaBetweenOperands
            | Self::ARedundantCommaBetweenOperands
            | Self::InvalidCharacterBetweenOperands
            | Self::RedundantInformationInOperandsArea => ErrorCategory::OperandSyntax,
            Self::TooShortString
            | Self::StringStartsWithoutQuotationMark
            | Self::StringEndsWithoutQuotationMark
            | Self::StringStartsAndEndsWithoutQuotationMark
            | Self::TooLongString
            | Self::DataDoesntStartWithANumber
            | Self::DataDoesntEndWithANumber
            | Self::WrongCharInData
            | Self::MissingCommaInData
            | Self::TooManyCommasInData
            | Self::MissingInformationAfterData
            | Self::MissingInformationAfterString => ErrorCategory::DataSyntax,
            Self::EntryLabelExistsTryToAddExternLabel
            | Self::ExternLabelExistsTryToAddEntryLabel
            | Self::LabelExistsInCodeTryToAddDataLabel
            | Self::LabelExistsInDataTryToAddCodeLabel
            | Self::DuplicateCodeLabelAttempt
            | Self::DuplicateDataLabelAttempt => ErrorCategory::SymbolConflict,
            Self::UndefinedLabelInSourceOperand
            | Self::UndefinedLabelInDestinationOperand
            | Self::UndefinedEntryLabel => ErrorCategory::LabelResolution,
            Self::FileNameLongerThanAllowed => ErrorCategory::FileLevel,
        }
    }
}

/// One recorded error: where it happened and what it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerError {
    /// 1-indexed source line, or 0 for file-level errors.
    pub line: usize,
    /// The kind of error.
    pub kind: ErrorKind,
    /// Name of the source file the error belongs to.
    pub file: String,
}

impl AssemblerError {
    /// Creates a new error record.
    #[must_use]
    pub fn new(line: usize, kind: ErrorKind, file: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            file: file.into(),
        }
    }

    /// Whether the error concerns the file as a whole.
    #[must_use]
    pub const fn is_file_level(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Display for AssemblerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_file_level() {
            write!(f, "Error in file '{}': {}", self.file, self.kind)
        } else {
            write!(f, "Error in line {}: {}", self.line, self.kind)
        }
    }
}

impl std::error::Error for AssemblerError {}

/// Append-only collection of the errors recorded for one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorCollection {
    errors: Vec<AssemblerError>,
}

impl ErrorCollection {
    /// Creates an empty error collection.
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Adds an error to the collection.
    pub fn push(&mut self, error: AssemblerError) {
        self.errors.push(error);
    }

    /// Returns true if the collection is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of errors.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns an iterator over the errors in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &AssemblerError> {
        self.errors.iter()
    }

    /// Errors ordered by line, file-level errors first.
    ///
    /// The sort is stable, so errors on the same line keep discovery order.
    #[must_use]
    pub fn sorted(&self) -> Vec<&AssemblerError> {
        let mut sorted: Vec<&AssemblerError> = self.iter().collect();
        sorted.sort_by_key(|error| error.line);
        sorted
    }

    /// Formats the full diagnostic report for `file_name`.
    #[must_use]
    pub fn format_report(&self, file_name: &str) -> String {
        let count = match self.errors.len() {
            1 => "1 error detected".to_string(),
            n => format!("{n} errors detected"),
        };

        let mut lines = vec![
            format!("List of errors in file '{file_name}'"),
            REPORT_RULE.to_string(),
            format!("****  {count}  ****"),
            String::new(),
        ];
        lines.extend(self.sorted().into_iter().map(ToString::to_string));
        lines.push(String::new());
        lines.push(format!(
            "****  End of error list for file '{file_name}'  ****"
        ));
        lines.push(REPORT_RULE.to_string());

        let mut report = lines.join("\n");
        report.push('\n');
        report
    }
}

impl fmt::Display for ErrorCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.sorted().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl FromIterator<AssemblerError> for ErrorCollection {
    fn from_iter<T: IntoIterator<Item = AssemblerError>>(iter: T) -> Self {
        Self {
            errors: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ErrorCollection {
    type Item = &'a AssemblerError;
    type IntoIter = std::slice::Iter<'a, AssemblerError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

/// Fatal failure that aborts assembly of one file.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// The source could not be read.
    #[error("cannot read '{name}': {source}")]
    Read {
        /// Source file name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// An artifact could not be written.
    #[error("cannot write '{}': {source}", .path.display())]
    Write {
        /// Artifact path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The diagnostic report could not be written.
    #[error("cannot write diagnostics: {0}")]
    Report(#[source] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(line: usize, kind: ErrorKind) -> AssemblerError {
        AssemblerError::new(line, kind, "prog.as")
    }

    #[test]
    fn line_errors_name_the_line() {
        assert_eq!(
            error(7, ErrorKind::UnknownLine).to_string(),
            "Error in line 7: Unknown line."
        );
    }

    #[test]
    fn file_level_errors_name_the_file() {
        let text = error(0, ErrorKind::FileNameLongerThanAllowed).to_string();
        assert!(text.starts_with("Error in file 'prog.as': File name is longer"));
    }

    #[test]
    fn messages_are_single_lines() {
        let kinds = [
            ErrorKind::LongLine,
            ErrorKind::LabelLengthExceedAndBadSyntax,
            ErrorKind::TooShortString,
            ErrorKind::WrongCharInData,
            ErrorKind::InvalidCharacterBetweenOperands,
            ErrorKind::FileNameLongerThanAllowed,
        ];
        for kind in kinds {
            assert!(!kind.to_string().contains('\n'), "{kind:?}");
        }
    }

    #[test]
    fn sorted_puts_file_level_first_and_keeps_discovery_order() {
        let collection: ErrorCollection = [
            error(9, ErrorKind::UnknownLine),
            error(3, ErrorKind::MissingOperands),
            error(0, ErrorKind::FileNameLongerThanAllowed),
            error(3, ErrorKind::DuplicateCodeLabelAttempt),
        ]
        .into_iter()
        .collect();

        let order: Vec<(usize, ErrorKind)> = collection
            .sorted()
            .into_iter()
            .map(|e| (e.line, e.kind))
            .collect();
        assert_eq!(
            order,
            vec![
                (0, ErrorKind::FileNameLongerThanAllowed),
                (3, ErrorKind::MissingOperands),
                (3, ErrorKind::DuplicateCodeLabelAttempt),
                (9, ErrorKind::UnknownLine),
            ]
        );
    }

    #[test]
    fn collection_push_and_query() {
        let mut collection = ErrorCollection::new();
        assert!(collection.is_empty());
        collection.push(error(2, ErrorKind::TooManyOperands));
        assert_eq!(collection.len(), 1);
        let kinds: Vec<ErrorKind> = collection.iter().map(|error| error.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::TooManyOperands]);
    }

    #[test]
    fn report_has_banner_count_and_closing_line() {
        let collection: ErrorCollection = [
            error(4, ErrorKind::UnknownLine),
            error(1, ErrorKind::MissingOperands),
        ]
        .into_iter()
        .collect();

        let report = collection.format_report("prog.as");
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "List of errors in file 'prog.as'");
        assert_eq!(lines[2], "****  2 errors detected  ****");
        assert_eq!(
            lines[4],
            "Error in line 1: Missing operand(s) for this operation."
        );
        assert_eq!(lines[5], "Error in line 4: Unknown line.");
        assert_eq!(
            lines[7],
            "****  End of error list for file 'prog.as'  ****"
        );
    }

    #[test]
    fn report_uses_singular_for_one_error() {
        let collection: ErrorCollection =
            std::iter::once(error(1, ErrorKind::UnknownLine)).collect();
        assert!(collection
            .format_report("a.as")
            .contains("****  1 error detected  ****"));
    }

    #[test]
    fn categories_group_related_kinds() {
        assert_eq!(ErrorKind::LongLine.category(), ErrorCategory::LineShape);
        assert_eq!(
            ErrorKind::LabelNameLikeKeywordName.category(),
            ErrorCategory::LabelSyntax
        );
        assert_eq!(
            ErrorKind::MissingCommaInData.category(),
            ErrorCategory::DataSyntax
        );
        assert_eq!(
            ErrorKind::DuplicateDataLabelAttempt.category(),
            ErrorCategory::SymbolConflict
        );
        assert_eq!(
            ErrorKind::UndefinedEntryLabel.category(),
            ErrorCategory::LabelResolution
        );
        assert_eq!(
            ErrorKind::FileNameLongerThanAllowed.category(),
            ErrorCategory::FileLevel
        );
    }

    #[test]
    fn fatal_errors_carry_the_io_cause() {
        let fatal = AssembleError::Read {
            name: "prog.as".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(fatal.to_string(), "cannot read 'prog.as': no such file");
    }
}
