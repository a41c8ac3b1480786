use crate::Ident;
use smi_text_size::TextRange;

/// One component of a brace-delimited OID value, e.g. each of `iso`,
/// `org(3)`, `6` in `{ iso org(3) 6 }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OidComponent {
    /// A bare arc number, e.g. `6`.
    Number(u32),
    /// A bare name reference, resolved against scope in Phase R3.
    Name(Ident),
    /// A `name(number)` pair. The name is documentation; the number is the
    /// arc. Only the first component of an `ObjectIdValueAst` uses the name
    /// half as an anchor candidate during resolution.
    NamedNumber(Ident, u32),
}

impl OidComponent {
    pub fn number(&self) -> Option<u32> {
        match self {
            OidComponent::Number(n) | OidComponent::NamedNumber(_, n) => Some(*n),
            OidComponent::Name(_) => None,
        }
    }

    pub fn name(&self) -> Option<&Ident> {
        match self {
            OidComponent::Name(name) | OidComponent::NamedNumber(name, _) => Some(name),
            OidComponent::Number(_) => None,
        }
    }
}

/// The parsed form of `{ ... }` OID value syntax. The first component is the
/// parent anchor; resolved to an absolute OID in resolver Phase R3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIdValueAst {
    pub components: Vec<OidComponent>,
    pub range: TextRange,
}
