//! Two-pass assembler for the asm12 12-bit CPU.
//!
//! [`assembler::assemble`] reads a [`source::LineSource`], records every
//! error it finds, and returns an [`assembler::Assembly`] whose artifacts are
//! delivered to an [`output::ArtifactSink`].

use clap as _;
use tracing_subscriber as _;

#[cfg(test)]
use proptest as _;
#[cfg(test)]
use rstest as _;

/// Per-file two-pass pipeline.
pub mod assembler;
/// Recorded assembly errors and fatal I/O errors.
pub mod errors;
/// Code and data memory images.
pub mod image;
/// Operation, directive and reserved-name lookup.
pub mod mnemonic;
/// Operand parsing, addressing modes and compatibility checks.
pub mod operands;
/// Object, entry and extern artifacts and their sinks.
pub mod output;
/// Line classifier.
pub mod parser;
/// Line sources.
pub mod source;
/// Symbol table.
pub mod symbols;
