//! Byte-offset positions and ranges over SMI source text.
//!
//! Every span the lexer, parser, and resolver hand around is a [`TextSize`] or
//! [`TextRange`] rather than a line/column pair. Line/column is a presentation
//! detail computed on demand from a [`smi_source_file::SourceCode`] only when a
//! diagnostic is about to be rendered.

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Range, Sub, SubAssign};

/// A zero-based byte offset into a source buffer.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextSize(u32);

impl TextSize {
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    pub const fn to_u32(self) -> u32 {
        self.0
    }

    pub const fn to_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TextSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for TextSize {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<TextSize> for u32 {
    fn from(value: TextSize) -> Self {
        value.0
    }
}

impl TryFrom<usize> for TextSize {
    type Error = std::num::TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Ok(Self(u32::try_from(value)?))
    }
}

impl Add for TextSize {
    type Output = TextSize;

    fn add(self, rhs: TextSize) -> TextSize {
        TextSize(self.0 + rhs.0)
    }
}

impl AddAssign for TextSize {
    fn add_assign(&mut self, rhs: TextSize) {
        self.0 += rhs.0;
    }
}

impl Sub for TextSize {
    type Output = TextSize;

    fn sub(self, rhs: TextSize) -> TextSize {
        TextSize(self.0 - rhs.0)
    }
}

impl SubAssign for TextSize {
    fn sub_assign(&mut self, rhs: TextSize) {
        self.0 -= rhs.0;
    }
}

/// A half-open `[start, end)` byte range into a source buffer.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TextRange {
    start: TextSize,
    end: TextSize,
}

impl fmt::Debug for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}..{:?}", self.start, self.end)
    }
}

impl TextRange {
    /// # Panics
    /// Panics if `end < start`.
    pub fn new(start: TextSize, end: TextSize) -> Self {
        assert!(start <= end, "range start must not exceed end");
        Self { start, end }
    }

    pub fn empty(offset: TextSize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn at(offset: TextSize, len: u32) -> Self {
        Self::new(offset, TextSize::new(offset.to_u32() + len))
    }

    pub const fn start(self) -> TextSize {
        self.start
    }

    pub const fn end(self) -> TextSize {
        self.end
    }

    pub fn len(self) -> TextSize {
        self.end - self.start
    }

    pub fn is_empty(self) -> bool {
        self.start == self.end
    }

    pub fn contains(self, offset: TextSize) -> bool {
        self.start <= offset && offset < self.end
    }

    pub fn contains_range(self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The smallest range containing both `self` and `other`.
    pub fn cover(self, other: TextRange) -> TextRange {
        TextRange::new(self.start.min(other.start), self.end.max(other.end))
    }
}

impl From<TextRange> for Range<usize> {
    fn from(range: TextRange) -> Self {
        range.start.to_usize()..range.end.to_usize()
    }
}

impl Index<TextRange> for str {
    type Output = str;

    fn index(&self, index: TextRange) -> &str {
        &self[Range::from(index)]
    }
}

impl Index<TextRange> for [u8] {
    type Output = [u8];

    fn index(&self, index: TextRange) -> &[u8] {
        &self[Range::from(index)]
    }
}

impl IndexMut<TextRange> for String {
    fn index_mut(&mut self, _index: TextRange) -> &mut str {
        unreachable!("source text is never mutated through a TextRange")
    }
}

/// Implemented by every type that occupies a span of source text.
pub trait Ranged {
    fn range(&self) -> TextRange;

    fn start(&self) -> TextSize {
        self.range().start()
    }

    fn end(&self) -> TextSize {
        self.range().end()
    }
}

impl Ranged for TextRange {
    fn range(&self) -> TextRange {
        *self
    }
}

static_assertions::assert_impl_all!(TextSize: Send, Sync, Copy, Ord);
static_assertions::assert_impl_all!(TextRange: Send, Sync, Copy, Eq);
static_assertions::const_assert!(std::mem::size_of::<TextSize>() == 4);
static_assertions::const_assert!(std::mem::size_of::<TextRange>() == 8);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn range_cover_spans_both_sides() {
        let a = TextRange::new(TextSize::new(2), TextSize::new(5));
        let b = TextRange::new(TextSize::new(10), TextSize::new(12));
        let covered = a.cover(b);
        assert_eq!(covered, TextRange::new(TextSize::new(2), TextSize::new(12)));
    }

    #[test]
    fn range_contains_is_half_open() {
        let range = TextRange::new(TextSize::new(0), TextSize::new(3));
        assert!(range.contains(TextSize::new(0)));
        assert!(range.contains(TextSize::new(2)));
        assert!(!range.contains(TextSize::new(3)));
    }

    #[test]
    fn index_into_str() {
        let text = "hello world";
        let range = TextRange::new(TextSize::new(6), TextSize::new(11));
        assert_eq!(&text[range], "world");
    }
}
