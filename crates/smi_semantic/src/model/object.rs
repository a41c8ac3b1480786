use crate::ids::{ModuleId, NodeId, ObjectId, TypeId};
use crate::model::node::Kind;
use crate::oid::{Arc, Oid};
use compact_str::CompactString;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    NotAccessible,
    AccessibleForNotify,
    ReadOnly,
    ReadWrite,
    ReadCreate,
    WriteOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Current,
    Deprecated,
    Obsolete,
    Mandatory,
    Optional,
}

/// The resolved, canonicalized form of a `DEFVAL` clause (spec.md §3).
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Integer(i64),
    String(String),
    Bytes(Vec<u8>),
    Oid(Oid),
    EnumLabel(CompactString),
    Bits(Vec<CompactString>),
    None,
}

impl DefaultValue {
    pub fn kind(&self) -> &'static str {
        match self {
            DefaultValue::Integer(_) => "integer",
            DefaultValue::String(_) => "string",
            DefaultValue::Bytes(_) => "bytes",
            DefaultValue::Oid(_) => "oid",
            DefaultValue::EnumLabel(_) => "enum",
            DefaultValue::Bits(_) => "bits",
            DefaultValue::None => "none",
        }
    }

    /// Interprets the value as an integer where meaningful: a direct
    /// integer, or an all-zero byte string canonicalized per spec.md §8
    /// scenario 4 (`DEFVAL { '00000000'H }` reads as `0`).
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            DefaultValue::Integer(n) => Some(*n),
            DefaultValue::Bytes(bytes) => {
                if bytes.iter().all(|b| *b == 0) {
                    Some(0)
                } else {
                    let mut acc: i64 = 0;
                    for b in bytes {
                        acc = (acc << 8) | i64::from(*b);
                    }
                    Some(acc)
                }
            }
            _ => None,
        }
    }
}

/// One column referenced by a row's `INDEX` clause, or inherited through
/// `AUGMENTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexColumn {
    pub object: ObjectId,
    pub implied: bool,
}

/// A resolved `Object` (spec.md §3): `OBJECT-TYPE`, `OBJECT-IDENTITY`,
/// `MODULE-IDENTITY`, or a plain value assignment attached to the OID tree.
#[derive(Debug, Clone)]
pub struct Object {
    pub name: CompactString,
    pub module: ModuleId,
    pub node: NodeId,
    pub oid: Oid,
    pub ty: Option<TypeId>,
    pub access: Option<Access>,
    pub status: Option<Status>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub units: Option<String>,
    /// Inline `SIZE`/value-range overlays declared directly on this object,
    /// layered last over the type chain's constraints (resolver Phase R7).
    pub inline_sizes: Vec<crate::model::ty::Constraint>,
    pub inline_value_ranges: Vec<crate::model::ty::Constraint>,
    pub inline_enum_values: Vec<crate::model::ty::EnumValue>,
    pub inline_bits: Vec<crate::model::ty::EnumValue>,
    /// Declared `INDEX` columns, unresolved names dropped (recorded as
    /// `UnresolvedRef` instead).
    pub index: Vec<IndexColumn>,
    pub augments: Option<ObjectId>,
    pub default_value: DefaultValue,
    /// `true` if this object's syntax is the bare structural `SEQUENCE`
    /// used only to describe a row's column layout (SPEC_FULL.md §3
    /// supplement).
    pub is_table_entry_sequence: bool,

    /// Classification computed in resolver Phase R6. Defaults to `Node`
    /// until classification runs.
    pub kind: Kind,
    /// This object's own `index` if non-empty, otherwise the `AUGMENTS`
    /// target's effective index, computed in Phase R7.
    pub effective_index: Vec<IndexColumn>,
    pub effective_sizes: Vec<crate::model::ty::Constraint>,
    pub effective_value_ranges: Vec<crate::model::ty::Constraint>,
    pub effective_enum_values: Vec<crate::model::ty::EnumValue>,
    pub effective_bits: Vec<crate::model::ty::EnumValue>,
    pub effective_display_hint: Option<String>,
}

impl Object {
    /// Effective index: this object's own `INDEX` columns, or (if empty and
    /// `augments` is set) the chain resolves through the Enricher instead —
    /// see `Mib::effective_indexes`.
    pub fn has_own_index(&self) -> bool {
        !self.index.is_empty()
    }

    /// A freshly interned object with every optional/derived field empty;
    /// Phase R3 fills `name`/`module`/`node`/`oid`, later phases fill the
    /// rest.
    pub fn new(name: impl Into<CompactString>, module: ModuleId, node: NodeId, oid: Oid) -> Self {
        Self {
            name: name.into(),
            module,
            node,
            oid,
            ty: None,
            access: None,
            status: None,
            description: None,
            reference: None,
            units: None,
            inline_sizes: Vec::new(),
            inline_value_ranges: Vec::new(),
            inline_enum_values: Vec::new(),
            inline_bits: Vec::new(),
            index: Vec::new(),
            augments: None,
            default_value: DefaultValue::None,
            is_table_entry_sequence: false,
            kind: Kind::Node,
            effective_index: Vec::new(),
            effective_sizes: Vec::new(),
            effective_value_ranges: Vec::new(),
            effective_enum_values: Vec::new(),
            effective_bits: Vec::new(),
            effective_display_hint: None,
        }
    }
}

pub type ArcValue = Arc;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn all_zero_bytes_canonicalize_to_zero() {
        let value = DefaultValue::Bytes(vec![0, 0, 0, 0]);
        assert_eq!(value.kind(), "bytes");
        assert_eq!(value.as_integer(), Some(0));
    }

    #[test]
    fn nonzero_bytes_interpret_as_big_endian_integer() {
        let value = DefaultValue::Bytes(vec![0x01, 0x00]);
        assert_eq!(value.as_integer(), Some(256));
    }
}
