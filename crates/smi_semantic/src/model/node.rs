use crate::ids::{
    CapabilitiesId, ComplianceId, GroupId, ModuleId, NodeId, NotificationId, ObjectId,
};
use crate::oid::Arc;
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smi_index::Idx;

/// The classification of an OID-tree node (spec.md §3 GLOSSARY "Node kind").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Node,
    Scalar,
    Table,
    Row,
    Column,
    Notification,
    Group,
    Compliance,
    Capabilities,
    Internal,
}

/// A back-reference to whichever record is attached to a node, used to
/// dispatch `Mib` accessors without re-deriving the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Object(ObjectId),
    Notification(NotificationId),
    Group(GroupId),
    Compliance(ComplianceId),
    Capabilities(CapabilitiesId),
}

/// One module's record attached to a shared node (spec.md §3: "Multiple
/// modules may attach their own records to the same node").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeBinding {
    pub module: ModuleId,
    pub attachment: Attachment,
}

/// The unit of the global OID tree (spec.md §3). Children are keyed by arc
/// in an `FxHashMap`, but iteration order for deterministic output is
/// carried separately in `child_order` (insertion order), per spec.md's
/// "insertion-order preserved for output determinism".
#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub arc: Arc,
    children_by_arc: FxHashMap<Arc, NodeId>,
    child_order: Vec<NodeId>,
    pub name: Option<CompactString>,
    pub kind: Kind,
    /// Every module/record combination attached to this node. The first
    /// entry's `module` is the primary module once Phase R6 has run (see
    /// module preference rule, spec.md §4.4).
    pub bindings: Vec<NodeBinding>,
}

impl Node {
    pub fn new_root() -> Self {
        Self {
            parent: None,
            arc: 0,
            children_by_arc: FxHashMap::default(),
            child_order: Vec::new(),
            name: None,
            kind: Kind::Internal,
            bindings: Vec::new(),
        }
    }

    pub fn new_child(parent: NodeId, arc: Arc) -> Self {
        Self {
            parent: Some(parent),
            arc,
            children_by_arc: FxHashMap::default(),
            child_order: Vec::new(),
            name: None,
            kind: Kind::Internal,
            bindings: Vec::new(),
        }
    }

    pub fn child(&self, arc: Arc) -> Option<NodeId> {
        self.children_by_arc.get(&arc).copied()
    }

    pub fn add_child(&mut self, arc: Arc, id: NodeId) {
        if self.children_by_arc.insert(arc, id).is_none() {
            self.child_order.push(id);
        }
    }

    /// Children in insertion order, the order a visitor walks them in.
    pub fn children(&self) -> &[NodeId] {
        &self.child_order
    }

    pub fn primary_module(&self) -> Option<ModuleId> {
        self.bindings.first().map(|b| b.module)
    }

    /// The [`ObjectId`] bound to this node by `module`, if any.
    pub fn object_for_module(&self, module: ModuleId) -> Option<ObjectId> {
        self.bindings.iter().find_map(|b| {
            if b.module == module {
                if let Attachment::Object(id) = b.attachment {
                    return Some(id);
                }
            }
            None
        })
    }

    pub fn primary_object(&self) -> Option<ObjectId> {
        self.bindings.iter().find_map(|b| match b.attachment {
            Attachment::Object(id) => Some(id),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_child_is_idempotent_for_repeated_arc() {
        let mut node = Node::new_root();
        let id = NodeId::new(1);
        node.add_child(5, id);
        node.add_child(5, id);
        assert_eq!(node.children(), &[id]);
        assert_eq!(node.child(5), Some(id));
    }

    #[test]
    fn children_preserve_insertion_order() {
        let mut node = Node::new_root();
        let a = NodeId::new(1);
        let b = NodeId::new(2);
        node.add_child(9, b);
        node.add_child(3, a);
        assert_eq!(node.children(), &[b, a]);
    }
}
