//! Artifact records, their text formats, and the sinks that receive them.
//!
//! ```text
//! prog.ob              prog.ent          prog.ext
//! 5 3                  MAIN 0100         EXT 0104
//! 0100 003 A           NUMS 0105
//! 0101 005 A
//! ...
//! ```

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use asm12_isa::Word;

use crate::errors::{AssembleError, ErrorCollection};
use crate::image::{MemoryImage, MemoryWord, RelocationTag};

/// Object file extension.
pub const OBJECT_EXTENSION: &str = "ob";
/// Entry file extension.
pub const ENTRIES_EXTENSION: &str = "ent";
/// Extern file extension.
pub const EXTERNS_EXTENSION: &str = "ext";

/// One line of the object artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectWord {
    /// Word address.
    pub address: u32,
    /// Encoded value.
    pub word: Word,
    /// Relocation tag.
    pub tag: RelocationTag,
}

/// The object artifact: word counts and every word, code then data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectImage {
    /// Number of code words.
    pub code_words: u32,
    /// Number of data words.
    pub data_words: u32,
    /// All words in ascending address order.
    pub words: Vec<ObjectWord>,
}

impl ObjectImage {
    /// Builds the object artifact from a resolved image.
    ///
    /// The image must have been through [`MemoryImage::resolve`] without
    /// unresolved references; debug builds panic otherwise.
    #[must_use]
    pub fn from_image(image: &MemoryImage) -> Self {
        let words: Vec<ObjectWord> = image
            .code()
            .iter()
            .chain(image.data())
            .filter_map(object_word)
            .collect();
        debug_assert_eq!(
            words.len(),
            image.code().len() + image.data().len(),
            "object built from an image with unresolved label references"
        );
        Self {
            code_words: image.code_len(),
            data_words: image.dc(),
            words,
        }
    }
}

fn object_word(word: &MemoryWord) -> Option<ObjectWord> {
    word.encode().map(|encoded| ObjectWord {
        address: word.address,
        word: encoded,
        tag: word.tag,
    })
}

/// A `label address` line of the entry or extern artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolRecord {
    /// Label name.
    pub label: String,
    /// Label address, or the using word's address for externs.
    pub address: u32,
}

/// Renders the object artifact.
#[must_use]
pub fn format_object(object: &ObjectImage) -> String {
    let mut text = format!("{} {}\n", object.code_words, object.data_words);
    for word in &object.words {
        let _ = writeln!(text, "{:04} {} {}", word.address, word.word, word.tag);
    }
    text
}

/// Renders an entry or extern artifact.
#[must_use]
pub fn format_symbol_records(records: &[SymbolRecord]) -> String {
    records.iter().fold(String::new(), |mut text, record| {
        let _ = writeln!(text, "{} {:04}", record.label, record.address);
        text
    })
}

/// Receives the artifacts of one assembled file.
pub trait ArtifactSink {
    /// Receives the object artifact.
    ///
    /// # Errors
    ///
    /// Returns an [`AssembleError`] if the artifact cannot be stored.
    fn emit_object(&mut self, object: &ObjectImage) -> Result<(), AssembleError>;

    /// Receives the entry artifact.
    ///
    /// # Errors
    ///
    /// Returns an [`AssembleError`] if the artifact cannot be stored.
    fn emit_entries(&mut self, entries: &[SymbolRecord]) -> Result<(), AssembleError>;

    /// Receives the extern artifact.
    ///
    /// # Errors
    ///
    /// Returns an [`AssembleError`] if the artifact cannot be stored.
    fn emit_externs(&mut self, externs: &[SymbolRecord]) -> Result<(), AssembleError>;

    /// Receives the errors of a file that failed to assemble.
    ///
    /// # Errors
    ///
    /// Returns an [`AssembleError`] if the report cannot be written.
    fn emit_diagnostics(
        &mut self,
        file_name: &str,
        errors: &ErrorCollection,
    ) -> Result<(), AssembleError>;
}

/// Writes artifacts next to a base path and the report to a writer.
///
/// A base of `out/prog` produces `out/prog.ob`, `out/prog.ent` and
/// `out/prog.ext`.
#[derive(Debug)]
pub struct FileSink<W> {
    base: PathBuf,
    report: W,
}

impl FileSink<io::Stdout> {
    /// Artifacts at `base`, diagnostics on stdout.
    #[must_use]
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self::with_report_writer(base, io::stdout())
    }
}

impl<W: Write> FileSink<W> {
    /// Artifacts at `base`, diagnostics on `report`.
    pub fn with_report_writer(base: impl Into<PathBuf>, report: W) -> Self {
        Self {
            base: base.into(),
            report,
        }
    }

    /// Path of the artifact with `extension`.
    #[must_use]
    pub fn artifact_path(&self, extension: &str) -> PathBuf {
        with_extension(&self.base, extension)
    }

    fn write_artifact(&self, extension: &str, contents: &str) -> Result<(), AssembleError> {
        let path = self.artifact_path(extension);
        tracing::debug!(path = %path.display(), "writing artifact");
        fs::write(&path, contents).map_err(|source| AssembleError::Write { path, source })
    }
}

impl<W: Write> ArtifactSink for FileSink<W> {
    fn emit_object(&mut self, object: &ObjectImage) -> Result<(), AssembleError> {
        self.write_artifact(OBJECT_EXTENSION, &format_object(object))
    }

    fn emit_entries(&mut self, entries: &[SymbolRecord]) -> Result<(), AssembleError> {
        self.write_artifact(ENTRIES_EXTENSION, &format_symbol_records(entries))
    }

    fn emit_externs(&mut self, externs: &[SymbolRecord]) -> Result<(), AssembleError> {
        self.write_artifact(EXTERNS_EXTENSION, &format_symbol_records(externs))
    }

    fn emit_diagnostics(
        &mut self,
        file_name: &str,
        errors: &ErrorCollection,
    ) -> Result<(), AssembleError> {
        self.report
            .write_all(errors.format_report(file_name).as_bytes())
            .and_then(|()| self.report.flush())
            .map_err(AssembleError::Report)
    }
}

/// Appends `.extension` without replacing dots already in the file name.
fn with_extension(base: &Path, extension: &str) -> PathBuf {
    let mut path = base.as_os_str().to_owned();
    path.push(".");
    path.push(extension);
    PathBuf::from(path)
}
