use crate::ids::{GroupId, ModuleId, NodeId, ObjectId};
use crate::model::object::Status;
use crate::oid::Oid;
use compact_str::CompactString;

/// One `MODULE [name] MANDATORY-GROUPS {...} GROUP/OBJECT ...` clause
/// inside a `MODULE-COMPLIANCE` (spec.md §3).
#[derive(Debug, Clone)]
pub struct ComplianceModule {
    /// `None` means "this module" (the compliance's own defining module),
    /// per the SMIv2 convention of omitting the name for a self-reference.
    pub module: Option<ModuleId>,
    pub mandatory_groups: Vec<GroupId>,
    /// `GROUP`/`OBJECT` refinement members; resolved against either the
    /// group or object namespace depending on which keyword introduced it.
    /// Unresolved entries are dropped and recorded as `UnresolvedRef`.
    pub group_members: Vec<GroupId>,
    pub object_members: Vec<ObjectId>,
}

/// A resolved `MODULE-COMPLIANCE` (spec.md §3).
#[derive(Debug, Clone)]
pub struct Compliance {
    pub name: CompactString,
    pub module: ModuleId,
    pub node: NodeId,
    pub oid: Oid,
    pub status: Option<Status>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub modules: Vec<ComplianceModule>,
}

/// One `SUPPORTS module INCLUDES {...}` clause inside `AGENT-CAPABILITIES`.
#[derive(Debug, Clone)]
pub struct SupportsModule {
    pub module: Option<ModuleId>,
    pub includes: Vec<GroupId>,
}

/// A resolved `AGENT-CAPABILITIES` (spec.md §3).
#[derive(Debug, Clone)]
pub struct Capabilities {
    pub name: CompactString,
    pub module: ModuleId,
    pub node: NodeId,
    pub oid: Oid,
    pub product_release: Option<String>,
    pub status: Option<Status>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub supports: Vec<SupportsModule>,
}
