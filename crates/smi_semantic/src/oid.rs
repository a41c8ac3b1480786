//! [`Oid`]: an ordered sequence of non-negative 32-bit arcs (spec.md §3).

use smallvec::SmallVec;
use std::fmt;

/// One arc of an object identifier.
pub type Arc = u32;

/// Most real-world OIDs (even deeply nested table columns) stay within a
/// dozen arcs; inlining that many avoids a heap allocation for the
/// overwhelming majority of nodes the resolver builds.
type ArcVec = SmallVec<[Arc; 12]>;

/// An absolute object identifier: a sequence of arcs, compared and ordered
/// lexicographically. The empty `Oid` is a valid value only as the root
/// sentinel; every other use should carry at least one arc.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Oid(ArcVec);

impl Oid {
    pub const fn root() -> Self {
        Self(SmallVec::new_const())
    }

    pub fn new(arcs: impl Into<ArcVec>) -> Self {
        Self(arcs.into())
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new `Oid` with `arc` appended.
    pub fn child(&self, arc: Arc) -> Self {
        let mut arcs = self.0.clone();
        arcs.push(arc);
        Self(arcs)
    }

    /// Whether `self` is a prefix of `other` (including `self == other`).
    pub fn is_prefix_of(&self, other: &Oid) -> bool {
        other.0.len() >= self.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// Parses canonical dotted form `a.b.c`. Returns `None` if any component
    /// is not a valid arc number.
    pub fn parse(text: &str) -> Option<Self> {
        let mut arcs = ArcVec::new();
        for part in text.split('.') {
            if part.is_empty() {
                continue;
            }
            arcs.push(part.parse().ok()?);
        }
        Some(Self(arcs))
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{arc}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({self})")
    }
}

impl FromIterator<Arc> for Oid {
    fn from_iter<T: IntoIterator<Item = Arc>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn dotted_display_matches_arcs() {
        let oid = Oid::new(vec![1, 3, 6, 1]);
        assert_eq!(oid.to_string(), "1.3.6.1");
    }

    #[test]
    fn child_appends_one_arc() {
        let oid = Oid::new(vec![1, 3]);
        assert_eq!(oid.child(6).arcs(), &[1, 3, 6]);
    }

    #[test]
    fn prefix_check_handles_equal_and_strict_prefixes() {
        let parent = Oid::new(vec![1, 3, 6]);
        let child = Oid::new(vec![1, 3, 6, 1, 2]);
        assert!(parent.is_prefix_of(&child));
        assert!(parent.is_prefix_of(&parent));
        assert!(!child.is_prefix_of(&parent));
    }

    #[test]
    fn ordering_is_lexicographic_on_arcs() {
        let a = Oid::new(vec![1, 2]);
        let b = Oid::new(vec![1, 2, 0]);
        let c = Oid::new(vec![1, 3]);
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn parse_rejects_non_numeric_components() {
        assert_eq!(Oid::parse("1.3.6.1").unwrap().arcs(), &[1, 3, 6, 1]);
        assert!(Oid::parse("1.foo.6").is_none());
    }
}
