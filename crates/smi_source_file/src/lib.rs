//! Converts byte offsets into 1-indexed line/column pairs for diagnostic
//! rendering. Nothing upstream of rendering ever needs a line/column: the
//! lexer, parser, and resolver all operate on [`smi_text_size::TextSize`].

use std::fmt;

use memchr::memchr_iter;
use smi_text_size::{TextRange, TextSize};

/// A 1-indexed count (a line number or a column number). Never zero.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OneIndexed(u32);

impl OneIndexed {
    pub const ONE: OneIndexed = OneIndexed(1);

    pub const fn new(value: u32) -> Option<Self> {
        if value == 0 {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Builds a `OneIndexed` from a zero-based count, saturating rather than
    /// panicking so that an empty file still reports line 1.
    pub const fn from_zero_indexed(value: u32) -> Self {
        Self(value.saturating_add(1))
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    pub const fn to_zero_indexed(self) -> u32 {
        self.0 - 1
    }
}

impl fmt::Debug for OneIndexed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OneIndexed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A resolved `(line, column)` pair, both 1-indexed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: OneIndexed,
    pub column: OneIndexed,
}

/// Byte offsets of the start of every line in a source buffer, built once per
/// module and reused for every diagnostic raised against it.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// `line_starts[0]` is always `0`. `line_starts[i]` is the offset of the
    /// first byte of the `i`-th line (zero-indexed).
    line_starts: Vec<TextSize>,
}

impl LineIndex {
    pub fn from_source_text(text: &str) -> Self {
        let mut line_starts = Vec::with_capacity(text.len() / 88);
        line_starts.push(TextSize::new(0));
        line_starts.extend(
            memchr_iter(b'\n', text.as_bytes())
                .map(|offset| TextSize::try_from(offset + 1).expect("source too large")),
        );
        Self { line_starts }
    }

    /// The 0-indexed line number containing `offset`.
    fn line_number(&self, offset: TextSize) -> usize {
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next_line) => next_line - 1,
        }
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// The byte range of the given 0-indexed line, not including its terminator.
    pub fn line_range(&self, line: usize, text: &str) -> Option<TextRange> {
        let start = *self.line_starts.get(line)?;
        let end = self
            .line_starts
            .get(line + 1)
            .copied()
            .unwrap_or_else(|| TextSize::try_from(text.len()).unwrap());
        let end = trim_trailing_newline(text, start, end);
        Some(TextRange::new(start, end))
    }

    pub fn source_location(&self, offset: TextSize, text: &str) -> SourceLocation {
        let line = self.line_number(offset);
        let line_start = self.line_starts[line];
        let column = count_chars(&text[line_start.to_usize()..offset.to_usize()]);
        SourceLocation {
            line: OneIndexed::from_zero_indexed(line as u32),
            column: OneIndexed::from_zero_indexed(column),
        }
    }
}

fn trim_trailing_newline(text: &str, start: TextSize, end: TextSize) -> TextSize {
    let slice = &text[start.to_usize()..end.to_usize()];
    if let Some(stripped) = slice.strip_suffix("\r\n") {
        TextSize::new(start.to_u32() + u32::try_from(stripped.len()).unwrap())
    } else if let Some(stripped) = slice.strip_suffix('\n') {
        TextSize::new(start.to_u32() + u32::try_from(stripped.len()).unwrap())
    } else {
        end
    }
}

fn count_chars(slice: &str) -> u32 {
    u32::try_from(slice.chars().count()).unwrap_or(u32::MAX)
}

/// A source buffer paired with its [`LineIndex`], the unit every diagnostic
/// renderer converts offsets through.
pub struct SourceCode<'a> {
    text: &'a str,
    index: &'a LineIndex,
}

impl<'a> SourceCode<'a> {
    pub fn new(text: &'a str, index: &'a LineIndex) -> Self {
        Self { text, index }
    }

    pub fn source_location(&self, offset: TextSize) -> SourceLocation {
        self.index.source_location(offset, self.text)
    }

    pub fn line_text(&self, line: usize) -> Option<&'a str> {
        let range = self.index.line_range(line, self.text)?;
        Some(&self.text[range])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_line_is_one_one() {
        let text = "FOO-MIB DEFINITIONS ::= BEGIN\nEND\n";
        let index = LineIndex::from_source_text(text);
        let code = SourceCode::new(text, &index);
        let loc = code.source_location(TextSize::new(0));
        assert_eq!(loc.line, OneIndexed::ONE);
        assert_eq!(loc.column, OneIndexed::ONE);
    }

    #[test]
    fn second_line_offset_resolves() {
        let text = "line one\nline two\nline three\n";
        let index = LineIndex::from_source_text(text);
        let code = SourceCode::new(text, &index);
        // offset of 'l' in "line two"
        let offset = TextSize::try_from(text.find("line two").unwrap()).unwrap();
        let loc = code.source_location(offset);
        assert_eq!(loc.line.get(), 2);
        assert_eq!(loc.column.get(), 1);
    }

    #[test]
    fn column_counts_chars_not_bytes() {
        let text = "-- caf\u{e9} comment\nnext";
        let index = LineIndex::from_source_text(text);
        let code = SourceCode::new(text, &index);
        let offset = TextSize::try_from(text.find("next").unwrap()).unwrap();
        let loc = code.source_location(offset);
        assert_eq!(loc.line.get(), 2);
    }

    #[test]
    fn line_text_strips_newline() {
        let text = "alpha\r\nbeta\n";
        let index = LineIndex::from_source_text(text);
        let code = SourceCode::new(text, &index);
        assert_eq!(code.line_text(0), Some("alpha"));
        assert_eq!(code.line_text(1), Some("beta"));
    }
}
