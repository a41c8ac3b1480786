use crate::ids::{ModuleId, NodeId, ObjectId};
use crate::model::object::Status;
use crate::oid::Oid;
use compact_str::CompactString;

/// A resolved `NOTIFICATION-TYPE` or `TRAP-TYPE` (spec.md §3).
#[derive(Debug, Clone)]
pub struct Notification {
    pub name: CompactString,
    pub module: ModuleId,
    pub node: NodeId,
    pub oid: Oid,
    pub status: Option<Status>,
    pub description: Option<String>,
    pub reference: Option<String>,
    /// Ordered `OBJECTS`/`VARIABLES` list. Entries that failed to resolve
    /// are dropped here and recorded as `UnresolvedRef` instead.
    pub objects: Vec<ObjectId>,
}
