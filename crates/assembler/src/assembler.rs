//! Two-pass assembly of one source file.
//!
//! 1. **Pass 1**: every line is classified, labels enter the symbol table,
//!    and words are appended to the code and data images. Label operands are
//!    stored as references.
//! 2. **End of pass 1**: data moves past the final code word, and `.entry`
//!    labels that were never defined are reported.
//! 3. **Pass 2**: label references are resolved against the symbol table.
//!
//! Errors are recorded and assembly continues; artifacts are produced only
//! when the file has no errors at all. The entry point is [`assemble`].

use std::path::Path;

use crate::errors::{AssembleError, AssemblerError, ErrorCollection, ErrorKind};
use crate::image::MemoryImage;
use crate::output::{ArtifactSink, ObjectImage, SymbolRecord};
use crate::parser::{parse_line, ParsedLine};
use crate::source::LineSource;
use crate::symbols::{Sighting, SymbolTable};

/// Maximum length of a source file name without its extension.
pub const MAX_FILE_NAME_LENGTH: usize = 30;

/// Result of assembling one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    /// Source file name, as used in diagnostics.
    pub file_name: String,
    /// Every error recorded for the file.
    pub errors: ErrorCollection,
    /// Object artifact; absent on error or when no word was produced.
    pub object: Option<ObjectImage>,
    /// Entry artifact lines; empty on error.
    pub entries: Vec<SymbolRecord>,
    /// Extern artifact lines; empty on error.
    pub externs: Vec<SymbolRecord>,
}

impl Assembly {
    /// Whether the file assembled without errors.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Delivers the artifacts, or the diagnostics on failure, to `sink`.
    ///
    /// # Errors
    ///
    /// Propagates the first [`AssembleError`] raised by the sink.
    pub fn emit<S: ArtifactSink + ?Sized>(&self, sink: &mut S) -> Result<(), AssembleError> {
        if !self.is_success() {
            return sink.emit_diagnostics(&self.file_name, &self.errors);
        }
        if let Some(object) = &self.object {
            sink.emit_object(object)?;
        }
        if !self.entries.is_empty() {
            sink.emit_entries(&self.entries)?;
        }
        if !self.externs.is_empty() {
            sink.emit_externs(&self.externs)?;
        }
        Ok(())
    }
}

/// Per-file assembly state.
#[derive(Debug, Clone)]
pub struct AssemblyContext {
    file_name: String,
    line: usize,
    image: MemoryImage,
    symbols: SymbolTable,
    errors: ErrorCollection,
}

impl AssemblyContext {
    /// Starts assembling `file_name`.
    ///
    /// A file name whose stem exceeds [`MAX_FILE_NAME_LENGTH`] is recorded as
    /// a file-level error.
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        let mut context = Self {
            file_name: file_name.into(),
            line: 0,
            image: MemoryImage::new(),
            symbols: SymbolTable::new(),
            errors: ErrorCollection::new(),
        };

        let stem_length = Path::new(&context.file_name)
            .file_stem()
            .map_or(0, |stem| stem.to_string_lossy().chars().count());
        if stem_length > MAX_FILE_NAME_LENGTH {
            context.record(0, ErrorKind::FileNameLongerThanAllowed);
        }
        context
    }

    /// Number of lines processed so far.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// The code and data images built so far.
    #[must_use]
    pub const fn image(&self) -> &MemoryImage {
        &self.image
    }

    /// The symbol table built so far.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// The errors recorded so far.
    #[must_use]
    pub const fn errors(&self) -> &ErrorCollection {
        &self.errors
    }

    /// Runs pass one over the next source line.
    pub fn process_line(&mut self, raw: &str) {
        self.line += 1;
        let parsed = parse_line(raw);
        tracing::trace!(line = self.line, shape = ?parsed.shape(), "classified line");

        match parsed {
            ParsedLine::Empty | ParsedLine::Comment => {}
            ParsedLine::Entry {
                name,
                ignored_label,
            } => {
                self.warn_ignored_label(ignored_label.as_deref(), ".entry");
                self.declare(&name, 0, Sighting::Entry);
            }
            ParsedLine::Extern {
                name,
                ignored_label,
            } => {
                self.warn_ignored_label(ignored_label.as_deref(), ".extern");
                self.declare(&name, 0, Sighting::External);
            }
            ParsedLine::Data { label, values } => {
                if let Some(label) = label {
                    self.declare(&label, self.image.dc(), Sighting::Data);
                }
                self.image.push_data(&values);
            }
            ParsedLine::String { label, text } => {
                if let Some(label) = label {
                    self.declare(&label, self.image.dc(), Sighting::Data);
                }
                self.image.push_string(&text);
            }
            ParsedLine::Instruction { label, instruction } => {
                if let Some(label) = label {
                    self.declare(&label, self.image.ic(), Sighting::Code);
                }
                self.image.push_instruction(&instruction, self.line);
            }
            ParsedLine::Invalid { error, .. } => self.record(self.line, error),
        }
    }

    /// Completes pass one, runs pass two, and builds the artifacts.
    #[must_use]
    pub fn finish(mut self) -> Assembly {
        tracing::debug!(
            file = %self.file_name,
            ic = self.image.ic(),
            dc = self.image.dc(),
            "first pass complete"
        );

        let offset = self.image.relocate_data();
        self.symbols.shift_data(offset);

        let undefined_entries: Vec<usize> = self
            .symbols
            .undefined_entries()
            .map(|symbol| symbol.line)
            .collect();
        for line in undefined_entries {
            self.record(line, ErrorKind::UndefinedEntryLabel);
        }

        let resolution = self.image.resolve(&self.symbols);
        for reference in &resolution.unresolved {
            self.record(reference.line, reference.role.undefined_label_error());
        }

        tracing::debug!(
            file = %self.file_name,
            errors = self.errors.len(),
            "second pass complete"
        );

        if !self.errors.is_empty() {
            return Assembly {
                file_name: self.file_name,
                errors: self.errors,
                object: None,
                entries: Vec::new(),
                externs: Vec::new(),
            };
        }

        let object = (!self.image.is_empty()).then(|| ObjectImage::from_image(&self.image));
        let entries = self
            .symbols
            .entries()
            .map(|symbol| SymbolRecord {
                label: symbol.name.clone(),
                address: symbol.address,
            })
            .collect();
        let externs = resolution
            .extern_uses
            .into_iter()
            .map(|usage| SymbolRecord {
                label: usage.label,
                address: usage.address,
            })
            .collect();

        Assembly {
            file_name: self.file_name,
            errors: self.errors,
            object,
            entries,
            externs,
        }
    }

    fn declare(&mut self, name: &str, address: u32, sighting: Sighting) {
        if let Err(kind) = self.symbols.insert(name, address, sighting, self.line) {
            self.record(self.line, kind);
        }
    }

    fn record(&mut self, line: usize, kind: ErrorKind) {
        tracing::trace!(line, ?kind, "recorded error");
        self.errors
            .push(AssemblerError::new(line, kind, self.file_name.clone()));
    }

    fn warn_ignored_label(&self, label: Option<&str>, directive: &str) {
        if let Some(label) = label {
            tracing::warn!(
                file = %self.file_name,
                line = self.line,
                label,
                "label before {directive} is ignored"
            );
        }
    }
}

/// Assembles every line of `source` as the file `file_name`.
///
/// # Errors
///
/// Returns [`AssembleError::Read`] if the source fails mid-read. Errors in
/// the assembly source itself are reported in [`Assembly::errors`].
pub fn assemble<S: LineSource + ?Sized>(
    file_name: &str,
    source: &mut S,
) -> Result<Assembly, AssembleError> {
    let mut context = AssemblyContext::new(file_name);
    while let Some(line) = source.next_line() {
        let line = line.map_err(|source| AssembleError::Read {
            name: file_name.to_string(),
            source,
        })?;
        context.process_line(&line);
    }
    Ok(context.finish())
}

/// Assembles in-memory source text.
#[must_use]
pub fn assemble_str(file_name: &str, text: &str) -> Assembly {
    let mut context = AssemblyContext::new(file_name);
    for line in text.lines() {
        context.process_line(line);
    }
    context.finish()
}
