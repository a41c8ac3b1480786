use compact_str::CompactString;
use smi_text_size::{Ranged, TextRange};
use std::fmt;

/// A name token, with its source span retained so that later phases
/// (identifier validation, resolver diagnostics) can point back at it.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub text: CompactString,
    pub range: TextRange,
}

impl Ident {
    pub fn new(text: impl Into<CompactString>, range: TextRange) -> Self {
        Self {
            text: text.into(),
            range,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Conventionally, a type name starts with an upper-case letter and a
    /// value name starts with a lower-case letter. This is a semantic hint
    /// used to disambiguate grammar productions, never a lexer rule
    /// (spec.md §4.1).
    pub fn looks_like_type_name(&self) -> bool {
        self.text
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
    }
}

impl Ranged for Ident {
    fn range(&self) -> TextRange {
        self.range
    }
}

impl fmt::Debug for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ident({:?})", self.text)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl PartialEq<str> for Ident {
    fn eq(&self, other: &str) -> bool {
        self.text.as_str() == other
    }
}
