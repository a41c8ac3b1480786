use crate::{Ident, ObjectIdValueAst};

/// One disjunct of a SIZE or value-range constraint: `a` (a single value, as
/// `min == max`) or `a..b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintRange {
    pub min: i64,
    pub max: i64,
}

impl ConstraintRange {
    pub fn single(value: i64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }
}

/// A disjunction of ranges, e.g. `(0..63)` or `(1 | 4..8 | 16)`.
pub type ConstraintList = Vec<ConstraintRange>;

/// One `name(value)` member of an `INTEGER { ... }` enumeration or a `BITS
/// { ... }` position list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumItem {
    pub name: Ident,
    pub value: i64,
}

/// One field of a structural `SEQUENCE { ... }` row-entry type. Recorded per
/// spec.md §4.2 but not part of the externally visible model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceField {
    pub name: Ident,
    pub type_name: Ident,
}

/// The type-syntax grammar (spec.md §4.2): a small, closed set of variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSyntax {
    /// A reference to a named type, local or imported.
    Named(Ident),
    /// A base or named type refined with SIZE and/or value-range constraints.
    Constrained {
        base: Box<TypeSyntax>,
        size: Option<ConstraintList>,
        value_range: Option<ConstraintList>,
    },
    /// `INTEGER { name(value), ... }`.
    IntegerEnum(Vec<EnumItem>),
    /// `BITS { name(position), ... }`.
    Bits(Vec<EnumItem>),
    /// A structural `SEQUENCE { field Type, ... }` (table row layout).
    Sequence(Vec<SequenceField>),
    /// `SEQUENCE OF T` (table payload).
    SequenceOf(Box<TypeSyntax>),
    /// `CHOICE { ... }`. Rare in practice; recorded for completeness but
    /// never appears in the external model.
    Choice(Vec<(Ident, TypeSyntax)>),
}

impl TypeSyntax {
    /// The innermost named reference, if this syntax is (possibly
    /// constrained) a plain named-type reference.
    pub fn named_reference(&self) -> Option<&Ident> {
        match self {
            TypeSyntax::Named(name) => Some(name),
            TypeSyntax::Constrained { base, .. } => base.named_reference(),
            _ => None,
        }
    }
}

/// The parsed form of a `DEFVAL { ... }` clause. Symbolic contents
/// (`Identifier`, `BitsList`) are resolved against enum labels, OID symbols,
/// or BITS positions in resolver Phase R5.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefValAst {
    Integer(i64),
    QuotedString(String),
    /// A `'...'H` or `'...'B` literal, already decoded to bytes.
    Bytes(Vec<u8>),
    Oid(ObjectIdValueAst),
    /// A bare identifier: an enum label or a value-assignment symbol.
    Identifier(Ident),
    /// `{ name1, name2 }`: a BITS member list.
    BitsList(Vec<Ident>),
}
