use crate::ids::{ModuleId, TypeId};
use compact_str::CompactString;

/// The closed set of SMI base types every type chain must terminate in
/// (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    Integer32,
    Unsigned32,
    Counter32,
    Counter64,
    Gauge32,
    TimeTicks,
    IpAddress,
    OctetString,
    ObjectIdentifier,
    Bits,
    Opaque,
    Enum,
    Unknown,
}

impl BaseType {
    /// Maps a type-syntax named reference to its base type, for the names
    /// that resolve directly rather than through a textual convention.
    pub fn from_primitive_name(name: &str) -> Option<Self> {
        Some(match name {
            "Integer32" | "INTEGER" => BaseType::Integer32,
            "Unsigned32" => BaseType::Unsigned32,
            "Counter32" | "Counter" => BaseType::Counter32,
            "Counter64" => BaseType::Counter64,
            "Gauge32" | "Gauge" => BaseType::Gauge32,
            "TimeTicks" => BaseType::TimeTicks,
            "IpAddress" => BaseType::IpAddress,
            "OCTET STRING" => BaseType::OctetString,
            "OBJECT IDENTIFIER" => BaseType::ObjectIdentifier,
            "BITS" => BaseType::Bits,
            "Opaque" => BaseType::Opaque,
            _ => return None,
        })
    }
}

/// One disjunct of a SIZE or value-range constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub min: i64,
    pub max: i64,
}

/// One `name(value)` enumeration or BITS position entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    pub label: CompactString,
    pub value: i64,
}

/// A resolved `Type` definition (spec.md §3). `parent` links a textual
/// convention to the type it refines; `base_type` is the type this chain
/// ultimately bottoms out at, computed in resolver Phase R4.
#[derive(Debug, Clone)]
pub struct Type {
    pub name: CompactString,
    pub module: ModuleId,
    pub base_type: BaseType,
    pub parent: Option<TypeId>,
    pub is_textual_convention: bool,
    pub status: Option<crate::model::object::Status>,
    pub description: Option<String>,
    pub display_hint: Option<String>,
    pub sizes: Vec<Constraint>,
    pub value_ranges: Vec<Constraint>,
    pub enum_values: Vec<EnumValue>,
    pub bits: Vec<EnumValue>,
}

impl Type {
    pub fn is_enum_or_bits(&self) -> bool {
        matches!(self.base_type, BaseType::Enum | BaseType::Bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn primitive_name_maps_known_base_types() {
        assert_eq!(
            BaseType::from_primitive_name("Unsigned32"),
            Some(BaseType::Unsigned32)
        );
        assert_eq!(
            BaseType::from_primitive_name("OCTET STRING"),
            Some(BaseType::OctetString)
        );
        assert_eq!(BaseType::from_primitive_name("DisplayString"), None);
    }
}
