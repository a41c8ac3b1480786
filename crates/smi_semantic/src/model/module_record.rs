use crate::ids::{
    CapabilitiesId, ComplianceId, GroupId, NotificationId, ObjectId, TypeId,
};
use crate::oid::Oid;
use compact_str::CompactString;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Smiv1,
    Smiv2,
}

impl Dialect {
    /// Module preference rule (spec.md §4.4): SMIv2 outranks SMIv1.
    pub fn precedence(self) -> u8 {
        match self {
            Dialect::Smiv2 => 1,
            Dialect::Smiv1 => 0,
        }
    }
}

/// One `REVISION "date" DESCRIPTION "..."` entry of a `MODULE-IDENTITY`
/// (SPEC_FULL.md §3 supplement).
#[derive(Debug, Clone)]
pub struct Revision {
    pub date: String,
    pub description: Option<String>,
}

/// The unit of lexical scope (spec.md §3). Owns the local name -> id
/// indices used by the resolver; the lifetime of a `Module` is the lifetime
/// of the enclosing `Mib`.
#[derive(Debug, Clone)]
pub struct Module {
    pub name: CompactString,
    pub dialect: Dialect,
    pub source_path: Option<CompactString>,
    pub identity_oid: Option<Oid>,
    pub organization: Option<String>,
    pub contact_info: Option<String>,
    pub last_updated: Option<String>,
    pub description: Option<String>,
    pub revisions: Vec<Revision>,

    pub types: FxHashMap<CompactString, TypeId>,
    pub objects: FxHashMap<CompactString, ObjectId>,
    pub notifications: FxHashMap<CompactString, NotificationId>,
    pub groups: FxHashMap<CompactString, GroupId>,
    pub compliances: FxHashMap<CompactString, ComplianceId>,
    pub capabilities: FxHashMap<CompactString, CapabilitiesId>,
    /// Symbols imported by this module, keyed by local name, with the
    /// defining module recorded for diagnostics and re-export chains
    /// (resolver Phase R2).
    pub imports: FxHashMap<CompactString, CompactString>,
}

impl Module {
    pub fn new(name: impl Into<CompactString>, dialect: Dialect) -> Self {
        Self {
            name: name.into(),
            dialect,
            source_path: None,
            identity_oid: None,
            organization: None,
            contact_info: None,
            last_updated: None,
            description: None,
            revisions: Vec::new(),
            types: FxHashMap::default(),
            objects: FxHashMap::default(),
            notifications: FxHashMap::default(),
            groups: FxHashMap::default(),
            compliances: FxHashMap::default(),
            capabilities: FxHashMap::default(),
            imports: FxHashMap::default(),
        }
    }
}
