//! Line ingestion for assembly sources.
//!
//! The assembler core pulls raw lines through the [`LineSource`] trait and
//! never touches the filesystem itself. [`ReaderLineSource`] adapts any
//! buffered reader; string slices iterate their lines directly.
//!
//! Lines are always consumed whole up to the next newline, so a physical
//! line longer than the 80-character limit is reported once rather than
//! being split into several logical lines.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use crate::errors::AssembleError;

/// Maximum significant characters on one source line.
pub const MAX_LINE_LENGTH: usize = 80;

/// Supplies raw source lines one at a time.
pub trait LineSource {
    /// Returns the next line without its terminator, `None` at end of input.
    fn next_line(&mut self) -> Option<io::Result<String>>;
}

impl LineSource for std::str::Lines<'_> {
    fn next_line(&mut self) -> Option<io::Result<String>> {
        self.next().map(|line| Ok(line.to_string()))
    }
}

/// A [`LineSource`] over any buffered reader.
///
/// Bytes that are not valid UTF-8 are replaced rather than aborting the read.
#[derive(Debug)]
pub struct ReaderLineSource<R> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: BufRead> ReaderLineSource<R> {
    /// Wraps a buffered reader.
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
        }
    }
}

impl<R: BufRead> LineSource for ReaderLineSource<R> {
    fn next_line(&mut self) -> Option<io::Result<String>> {
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                let text = String::from_utf8_lossy(&self.buffer);
                Some(Ok(strip_line_terminator(&text).to_string()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Opens a source file as a [`LineSource`].
///
/// # Errors
///
/// Returns [`AssembleError::Read`] if the file cannot be opened.
pub fn open_source(path: &Path) -> Result<ReaderLineSource<BufReader<File>>, AssembleError> {
    let file = File::open(path).map_err(|source| AssembleError::Read {
        name: path.display().to_string(),
        source,
    })?;
    Ok(ReaderLineSource::new(BufReader::new(file)))
}

/// Removes a trailing `\n` or `\r\n`.
#[must_use]
pub fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Counts the characters that count toward the line-length limit.
///
/// Spaces, tabs and line terminators are not significant.
#[must_use]
pub fn significant_len(line: &str) -> usize {
    line.chars()
        .filter(|c| !matches!(c, ' ' | '\t' | '\n' | '\r'))
        .count()
}
