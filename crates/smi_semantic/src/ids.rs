//! Typed arena indices for every interned aggregate (Design Notes, spec.md
//! §9): a `Mib` owns dense `IndexVec`s and all cross-references between
//! `Module`, `Type`, `Object`, `Notification`, `Group`, `Compliance`,
//! `Capabilities`, and `Node` are index handles, never pointers.

smi_index::newtype_index!(pub struct ModuleId);
smi_index::newtype_index!(pub struct TypeId);
smi_index::newtype_index!(pub struct ObjectId);
smi_index::newtype_index!(pub struct NotificationId);
smi_index::newtype_index!(pub struct GroupId);
smi_index::newtype_index!(pub struct ComplianceId);
smi_index::newtype_index!(pub struct CapabilitiesId);
smi_index::newtype_index!(pub struct NodeId);
