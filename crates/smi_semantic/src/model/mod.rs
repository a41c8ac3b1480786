//! The resolved data model (spec.md §3): every aggregate is interned into a
//! dense arena owned by the `Mib` and referenced by typed index (Design
//! Notes, spec.md §9).

pub mod compliance;
pub mod group;
pub mod module_record;
pub mod node;
pub mod notification;
pub mod object;
pub mod ty;

pub use compliance::{Capabilities, Compliance, ComplianceModule, SupportsModule};
pub use group::Group;
pub use module_record::{Dialect, Module, Revision};
pub use node::{Attachment, Kind, Node, NodeBinding};
pub use notification::Notification;
pub use object::{Access, DefaultValue, IndexColumn, Object, Status};
pub use ty::{BaseType, Constraint, EnumValue, Type};
