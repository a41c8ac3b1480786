use crate::ids::{ModuleId, NodeId, NotificationId, ObjectId};
use crate::model::object::Status;
use crate::oid::Oid;
use compact_str::CompactString;

/// A resolved `OBJECT-GROUP` or `NOTIFICATION-GROUP` (spec.md §3). Both
/// macros share the same shape (a name, a member list, the usual
/// status/description/reference clauses); `is_notification_group`
/// distinguishes which member list is populated: an `OBJECT-GROUP` fills
/// `members`, a `NOTIFICATION-GROUP` fills `notification_members`.
#[derive(Debug, Clone)]
pub struct Group {
    pub name: CompactString,
    pub module: ModuleId,
    pub node: NodeId,
    pub oid: Oid,
    pub status: Option<Status>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub members: Vec<ObjectId>,
    pub notification_members: Vec<NotificationId>,
    pub is_notification_group: bool,
}
