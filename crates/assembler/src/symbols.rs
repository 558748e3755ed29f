//! Symbol table with attribute merging.
//!
//! A label may be sighted several times: defined in code or data, declared
//! `.entry`, or declared `.extern`. [`SymbolTable::insert`] merges each new
//! sighting into the existing entry or rejects it with the conflict error.
//! Iteration follows discovery order.

use std::collections::HashMap;
use std::fmt;

use crate::errors::ErrorKind;

/// Accumulated attribute of a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Declared `.extern`; address is 0.
    External,
    /// Declared `.entry` but not yet defined.
    Entry,
    /// Defined on an instruction line.
    Code,
    /// Defined on a `.data` or `.string` line.
    Data,
    /// Defined in code and declared `.entry`.
    CodeEntry,
    /// Defined in data and declared `.entry`.
    DataEntry,
}

impl Attribute {
    /// Whether the symbol is exported through the entry artifact.
    #[must_use]
    pub const fn is_exported(self) -> bool {
        matches!(self, Self::CodeEntry | Self::DataEntry)
    }

    /// Whether the address lives in the data image.
    #[must_use]
    pub const fn is_data(self) -> bool {
        matches!(self, Self::Data | Self::DataEntry)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::External => "external",
            Self::Entry => "entry",
            Self::Code => "code",
            Self::Data => "data",
            Self::CodeEntry => "code+entry",
            Self::DataEntry => "data+entry",
        };
        f.write_str(name)
    }
}

/// One sighting of a label in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sighting {
    /// Label on an instruction line.
    Code,
    /// Label on a `.data` or `.string` line.
    Data,
    /// `.entry` declaration.
    Entry,
    /// `.extern` declaration.
    External,
}

/// A symbol with its address and attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    /// Label name.
    pub name: String,
    /// Resolved address; the declaring line while still only `.entry`.
    pub address: u32,
    /// Accumulated attribute.
    pub attribute: Attribute,
    /// Source line of the first sighting.
    pub line: usize,
}

enum Merge {
    Keep,
    Become(Attribute, Option<u32>),
}

/// Symbol table keyed by label name, iterated in discovery order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a sighting of `name` at `address` on source line `line`.
    ///
    /// # Errors
    ///
    /// Returns the conflict error when the sighting cannot be merged with the
    /// existing symbol. The existing symbol is left unchanged.
    pub fn insert(
        &mut self,
        name: &str,
        address: u32,
        sighting: Sighting,
        line: usize,
    ) -> Result<(), ErrorKind> {
        let Some(&slot) = self.index.get(name) else {
            let (attribute, address) = match sighting {
                Sighting::Code => (Attribute::Code, address),
                Sighting::Data => (Attribute::Data, address),
                Sighting::Entry => (Attribute::Entry, placeholder_address(line)),
                Sighting::External => (Attribute::External, 0),
            };
            self.index.insert(name.to_string(), self.symbols.len());
            self.symbols.push(Symbol {
                name: name.to_string(),
                address,
                attribute,
                line,
            });
            return Ok(());
        };

        let symbol = &mut self.symbols[slot];
        match merge(symbol.attribute, sighting, address)? {
            Merge::Keep => {}
            Merge::Become(attribute, new_address) => {
                symbol.attribute = attribute;
                if let Some(new_address) = new_address {
                    symbol.address = new_address;
                }
            }
        }
        Ok(())
    }

    /// Returns the symbol named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&slot| &self.symbols[slot])
    }

    /// Returns the address of a defined or external label.
    ///
    /// A label that is still only `.entry` has no address yet.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<u32> {
        self.get(name)
            .filter(|symbol| symbol.attribute != Attribute::Entry)
            .map(|symbol| symbol.address)
    }

    /// Whether `name` is declared `.extern`.
    #[must_use]
    pub fn is_external(&self, name: &str) -> bool {
        self.get(name)
            .is_some_and(|symbol| symbol.attribute == Attribute::External)
    }

    /// Moves every data-attributed symbol by `offset`.
    pub fn shift_data(&mut self, offset: u32) {
        for symbol in &mut self.symbols {
            if symbol.attribute.is_data() {
                symbol.address += offset;
            }
        }
    }

    /// Symbols declared `.entry` but never defined.
    pub fn undefined_entries(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols
            .iter()
            .filter(|symbol| symbol.attribute == Attribute::Entry)
    }

    /// Defined symbols declared `.entry`, in discovery order.
    pub fn entries(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols
            .iter()
            .filter(|symbol| symbol.attribute.is_exported())
    }

    /// Number of symbols.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

fn placeholder_address(line: usize) -> u32 {
    u32::try_from(line).unwrap_or(u32::MAX)
}

const fn merge(existing: Attribute, sighting: Sighting, address: u32) -> Result<Merge, ErrorKind> {
    use Attribute as A;
    use Sighting as S;

    match (existing, sighting) {
        (A::Entry, S::Code) => Ok(Merge::Become(A::CodeEntry, Some(address))),
        (A::Entry, S::Data) => Ok(Merge::Become(A::DataEntry, Some(address))),
        (A::Code, S::Entry) => Ok(Merge::Become(A::CodeEntry, None)),
        (A::Data, S::Entry) => Ok(Merge::Become(A::DataEntry, None)),
        (A::Entry | A::CodeEntry | A::DataEntry, S::Entry) | (A::External, S::External) => {
            Ok(Merge::Keep)
        }
        (A::Code | A::CodeEntry, S::Code) => Err(ErrorKind::DuplicateCodeLabelAttempt),
        (A::Data | A::DataEntry, S::Data) => Err(ErrorKind::DuplicateDataLabelAttempt),
        (A::Code | A::CodeEntry, S::Data) => Err(ErrorKind::LabelExistsInCodeTryToAddDataLabel),
        (A::Data | A::DataEntry, S::Code) => Err(ErrorKind::LabelExistsInDataTryToAddCodeLabel),
        (A::Entry | A::CodeEntry | A::DataEntry, S::External) => {
            Err(ErrorKind::EntryLabelExistsTryToAddExternLabel)
        }
        (A::External, S::Entry) => Err(ErrorKind::ExternLabelExistsTryToAddEntryLabel),
        (A::Code | A::Data, S::External) | (A::External, S::Code | S::Data) => {
            Err(ErrorKind::LabelNameLikeExistingLabel)
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn table_with(name: &str, address: u32, sighting: Sighting) -> SymbolTable {
        let mut table = SymbolTable::new();
        table
            .insert(name, address, sighting, 1)
            .expect("first sighting always succeeds");
        table
    }

    #[test]
    fn first_sightings_store_their_address() {
        let mut table = SymbolTable::new();
        table.insert("MAIN", 100, Sighting::Code, 1).unwrap();
        table.insert("NUMS", 3, Sighting::Data, 2).unwrap();
        table.insert("EXT", 77, Sighting::External, 3).unwrap();
        table.insert("LATER", 55, Sighting::Entry, 4).unwrap();

        assert_eq!(table.lookup("MAIN"), Some(100));
        assert_eq!(table.lookup("NUMS"), Some(3));
        assert_eq!(table.lookup("EXT"), Some(0));
        assert_eq!(table.get("LATER").map(|s| s.address), Some(4));
        assert_eq!(table.lookup("LATER"), None);
        assert_eq!(table.lookup("NOPE"), None);
    }

    #[test]
    fn entry_then_code_takes_the_code_address() {
        let mut table = table_with("A", 0, Sighting::Entry);
        table.insert("A", 10, Sighting::Code, 5).unwrap();
        let symbol = table.get("A").unwrap();
        assert_eq!(symbol.attribute, Attribute::CodeEntry);
        assert_eq!(symbol.address, 10);
    }

    #[test]
    fn entry_then_data_takes_the_data_address() {
        let mut table = table_with("A", 0, Sighting::Entry);
        table.insert("A", 4, Sighting::Data, 5).unwrap();
        let symbol = table.get("A").unwrap();
        assert_eq!(symbol.attribute, Attribute::DataEntry);
        assert_eq!(symbol.address, 4);
    }

    #[test]
    fn code_then_entry_keeps_the_address() {
        let mut table = table_with("A", 120, Sighting::Code);
        table.insert("A", 0, Sighting::Entry, 9).unwrap();
        let symbol = table.get("A").unwrap();
        assert_eq!(symbol.attribute, Attribute::CodeEntry);
        assert_eq!(symbol.address, 120);
    }

    #[test]
    fn repeated_entry_and_extern_are_no_ops() {
        let mut table = table_with("A", 0, Sighting::External);
        table.insert("A", 0, Sighting::External, 2).unwrap();
        assert_eq!(table.get("A").unwrap().attribute, Attribute::External);

        let mut table = table_with("B", 101, Sighting::Code);
        table.insert("B", 0, Sighting::Entry, 2).unwrap();
        table.insert("B", 0, Sighting::Entry, 3).unwrap();
        assert_eq!(table.get("B").unwrap().attribute, Attribute::CodeEntry);
        assert_eq!(table.len(), 1);
    }

    #[rstest]
    #[case(Sighting::Entry, Sighting::External, ErrorKind::EntryLabelExistsTryToAddExternLabel)]
    #[case(Sighting::Code, Sighting::Code, ErrorKind::DuplicateCodeLabelAttempt)]
    #[case(Sighting::Code, Sighting::Data, ErrorKind::LabelExistsInCodeTryToAddDataLabel)]
    #[case(Sighting::Code, Sighting::External, ErrorKind::LabelNameLikeExistingLabel)]
    #[case(Sighting::Data, Sighting::Code, ErrorKind::LabelExistsInDataTryToAddCodeLabel)]
    #[case(Sighting::Data, Sighting::Data, ErrorKind::DuplicateDataLabelAttempt)]
    #[case(Sighting::Data, Sighting::External, ErrorKind::LabelNameLikeExistingLabel)]
    #[case(Sighting::External, Sighting::Code, ErrorKind::LabelNameLikeExistingLabel)]
    #[case(Sighting::External, Sighting::Data, ErrorKind::LabelNameLikeExistingLabel)]
    #[case(Sighting::External, Sighting::Entry, ErrorKind::ExternLabelExistsTryToAddEntryLabel)]
    fn conflicts_leave_the_symbol_unchanged(
        #[case] first: Sighting,
        #[case] second: Sighting,
        #[case] kind: ErrorKind,
    ) {
        let mut table = table_with("L", 100, first);
        let before = table.get("L").cloned();
        assert_eq!(table.insert("L", 200, second, 7), Err(kind));
        assert_eq!(table.get("L").cloned(), before);
    }

    #[rstest]
    #[case(Sighting::Code, ErrorKind::DuplicateCodeLabelAttempt)]
    #[case(Sighting::Data, ErrorKind::LabelExistsInCodeTryToAddDataLabel)]
    #[case(Sighting::External, ErrorKind::EntryLabelExistsTryToAddExternLabel)]
    fn code_entry_conflicts(#[case] sighting: Sighting, #[case] kind: ErrorKind) {
        let mut table = table_with("L", 0, Sighting::Entry);
        table.insert("L", 110, Sighting::Code, 2).unwrap();
        assert_eq!(table.insert("L", 1, sighting, 3), Err(kind));
        assert_eq!(table.get("L").unwrap().attribute, Attribute::CodeEntry);
    }

    #[rstest]
    #[case(Sighting::Code, ErrorKind::LabelExistsInDataTryToAddCodeLabel)]
    #[case(Sighting::Data, ErrorKind::DuplicateDataLabelAttempt)]
    #[case(Sighting::External, ErrorKind::EntryLabelExistsTryToAddExternLabel)]
    fn data_entry_conflicts(#[case] sighting: Sighting, #[case] kind: ErrorKind) {
        let mut table = table_with("L", 2, Sighting::Data);
        table.insert("L", 0, Sighting::Entry, 2).unwrap();
        assert_eq!(table.insert("L", 1, sighting, 3), Err(kind));
        assert_eq!(table.get("L").unwrap().attribute, Attribute::DataEntry);
    }

    #[test]
    fn extern_then_entry_stays_external() {
        let mut table = table_with("X", 0, Sighting::External);
        assert_eq!(
            table.insert("X", 0, Sighting::Entry, 2),
            Err(ErrorKind::ExternLabelExistsTryToAddEntryLabel)
        );
        assert!(table.is_external("X"));
    }

    #[test]
    fn shift_data_moves_only_data_symbols() {
        let mut table = SymbolTable::new();
        table.insert("C", 100, Sighting::Code, 1).unwrap();
        table.insert("D", 0, Sighting::Data, 2).unwrap();
        table.insert("DE", 2, Sighting::Data, 3).unwrap();
        table.insert("DE", 0, Sighting::Entry, 4).unwrap();
        table.insert("X", 0, Sighting::External, 5).unwrap();

        table.shift_data(108);

        assert_eq!(table.lookup("C"), Some(100));
        assert_eq!(table.lookup("D"), Some(108));
        assert_eq!(table.lookup("DE"), Some(110));
        assert_eq!(table.lookup("X"), Some(0));
    }

    #[test]
    fn entries_and_undefined_entries_follow_discovery_order() {
        let mut table = SymbolTable::new();
        table.insert("B", 0, Sighting::Entry, 1).unwrap();
        table.insert("GHOST", 0, Sighting::Entry, 2).unwrap();
        table.insert("A", 100, Sighting::Code, 3).unwrap();
        table.insert("A", 0, Sighting::Entry, 4).unwrap();
        table.insert("B", 5, Sighting::Data, 5).unwrap();

        let entries: Vec<&str> = table.entries().map(|s| s.name.as_str()).collect();
        assert_eq!(entries, vec!["B", "A"]);

        let undefined: Vec<(&str, usize)> = table
            .undefined_entries()
            .map(|s| (s.name.as_str(), s.line))
            .collect();
        assert_eq!(undefined, vec![("GHOST", 2)]);
    }

    #[test]
    fn attributes_display_combined_names() {
        assert_eq!(Attribute::CodeEntry.to_string(), "code+entry");
        assert_eq!(Attribute::External.to_string(), "external");
    }
}
