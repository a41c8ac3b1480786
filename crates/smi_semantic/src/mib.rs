//! The `Mib`: the resolved, read-only query surface (spec.md §4.5). Built
//! exclusively by [`crate::resolver::resolve`]; every field here is mutated
//! only through `pub(crate)` methods used during that build, so a `&Mib`
//! handed back to a caller is logically immutable (Design Notes, spec.md
//! §9 — "builder phase... queryable phase", the transition point being the
//! return of `load`).

use crate::ids::{
    CapabilitiesId, ComplianceId, GroupId, ModuleId, NodeId, NotificationId, ObjectId, TypeId,
};
use crate::model::{
    Capabilities, Compliance, Group, Kind, Module, Node, Notification, Object, Type,
};
use crate::oid::{Arc, Oid};
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smi_diagnostics::{Diagnostic, DiagnosticConfig, Severity, UnresolvedRef};
use smi_index::IndexVec;

#[derive(Debug, Clone)]
pub struct Mib {
    pub(crate) modules: IndexVec<ModuleId, Module>,
    pub(crate) types: IndexVec<TypeId, Type>,
    pub(crate) objects: IndexVec<ObjectId, Object>,
    pub(crate) notifications: IndexVec<NotificationId, Notification>,
    pub(crate) groups: IndexVec<GroupId, Group>,
    pub(crate) compliances: IndexVec<ComplianceId, Compliance>,
    pub(crate) capabilities: IndexVec<CapabilitiesId, Capabilities>,
    pub(crate) nodes: IndexVec<NodeId, Node>,
    pub(crate) root: NodeId,
    pub(crate) module_by_name: FxHashMap<CompactString, ModuleId>,
    pub(crate) diagnostics: Vec<Diagnostic>,
    pub(crate) unresolved: Vec<UnresolvedRef>,
}

impl Mib {
    pub(crate) fn empty() -> Self {
        let mut nodes = IndexVec::new();
        let root = nodes.push(Node::new_root());
        Self {
            modules: IndexVec::new(),
            types: IndexVec::new(),
            objects: IndexVec::new(),
            notifications: IndexVec::new(),
            groups: IndexVec::new(),
            compliances: IndexVec::new(),
            capabilities: IndexVec::new(),
            nodes,
            root,
            module_by_name: FxHashMap::default(),
            diagnostics: Vec::new(),
            unresolved: Vec::new(),
        }
    }

    // -- modules -----------------------------------------------------

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.module_by_name.get(name).map(|id| &self.modules[*id])
    }

    pub fn module_id(&self, name: &str) -> Option<ModuleId> {
        self.module_by_name.get(name).copied()
    }

    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    pub fn get_module(&self, id: ModuleId) -> &Module {
        &self.modules[id]
    }

    // -- types ---------------------------------------------------------

    pub fn get_type(&self, id: TypeId) -> &Type {
        &self.types[id]
    }

    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.types.iter()
    }

    pub fn type_named(&self, module: &str, name: &str) -> Option<&Type> {
        let module_id = self.module_id(module)?;
        let type_id = *self.modules[module_id].types.get(name)?;
        Some(&self.types[type_id])
    }

    // -- objects ---------------------------------------------------------

    /// Lookup by plain name: the primary binding, i.e. the object attached
    /// to the node whose primary module owns this name (spec.md §4.5,
    /// module preference rule, spec.md §4.4). Falls back to the first
    /// object (by id order) that declares the name only when no node
    /// carries it, since two unrelated modules may coincidentally share an
    /// identifier even when they do not share a node.
    pub fn object(&self, name: &str) -> Option<&Object> {
        if let Some(object_id) = self.node(name).and_then(|id| self.nodes[id].primary_object()) {
            return Some(&self.objects[object_id]);
        }
        self.objects.iter().find(|o| o.name.as_str() == name)
    }

    pub fn object_qualified(&self, module: &str, name: &str) -> Option<&Object> {
        let module_id = self.module_id(module)?;
        let object_id = *self.modules[module_id].objects.get(name)?;
        Some(&self.objects[object_id])
    }

    pub fn get_object(&self, id: ObjectId) -> &Object {
        &self.objects[id]
    }

    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    // -- notifications / groups / compliances / capabilities -------------

    pub fn get_notification(&self, id: NotificationId) -> &Notification {
        &self.notifications[id]
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn get_group(&self, id: GroupId) -> &Group {
        &self.groups[id]
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn get_compliance(&self, id: ComplianceId) -> &Compliance {
        &self.compliances[id]
    }

    pub fn compliances(&self) -> impl Iterator<Item = &Compliance> {
        self.compliances.iter()
    }

    pub fn get_capabilities(&self, id: CapabilitiesId) -> &Capabilities {
        &self.capabilities[id]
    }

    pub fn capabilities(&self) -> impl Iterator<Item = &Capabilities> {
        self.capabilities.iter()
    }

    // -- OID tree ----------------------------------------------------

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get_node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Lookup by plain name (spec.md §4.5, scenario 3): the node carrying
    /// this name, whichever kind of record attached it first. Checked in
    /// the same attachment-kind order `Attachment` declares, which only
    /// matters when two different kinds of record coincidentally share a
    /// name without sharing a node.
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.objects
            .iter()
            .find(|o| o.name.as_str() == name)
            .map(|o| o.node)
            .or_else(|| self.notifications.iter().find(|n| n.name.as_str() == name).map(|n| n.node))
            .or_else(|| self.groups.iter().find(|g| g.name.as_str() == name).map(|g| g.node))
            .or_else(|| self.compliances.iter().find(|c| c.name.as_str() == name).map(|c| c.node))
            .or_else(|| self.capabilities.iter().find(|c| c.name.as_str() == name).map(|c| c.node))
    }

    /// Lookup by absolute dotted OID.
    pub fn node_by_oid(&self, oid: &Oid) -> Option<NodeId> {
        self.node_by_arcs(oid.arcs())
    }

    /// Lookup by arc array, walking from the synthetic root.
    pub fn node_by_arcs(&self, arcs: &[Arc]) -> Option<NodeId> {
        let mut current = self.root;
        for arc in arcs {
            current = self.nodes[current].child(*arc)?;
        }
        Some(current)
    }

    /// `LongestPrefixByOID` (spec.md §4.5): the deepest node whose OID is a
    /// prefix of `oid`. Returns `None` only if `oid` shares no arc with the
    /// top of the tree (i.e. not even the root's children match).
    pub fn longest_prefix(&self, oid: &Oid) -> Option<NodeId> {
        let mut current = self.root;
        let mut matched_any = false;
        for arc in oid.arcs() {
            match self.nodes[current].child(*arc) {
                Some(next) => {
                    current = next;
                    matched_any = true;
                }
                None => break,
            }
        }
        if matched_any || current != self.root {
            Some(current)
        } else {
            None
        }
    }

    /// Visits every node in the tree, insertion order, pre-order.
    pub fn visit_tree(&self, mut visitor: impl FnMut(NodeId, &Node)) {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            visitor(id, node);
            stack.extend(node.children().iter().rev().copied());
        }
    }

    // -- diagnostics -------------------------------------------------

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Prepends diagnostics raised before the resolver ran (the Loader's
    /// `import-module-missing`/`module-duplicate-source`/parse diagnostics),
    /// so callers see one chronologically ordered stream regardless of
    /// which phase actually raised each entry.
    ///
    /// The Loader and the lexer/parser never filter by `config` themselves
    /// (so that unit tests exercising them directly see every diagnostic
    /// they raise); `config` is applied here, once, so the final stream
    /// respects `level`/`ignore`/`only` uniformly across every phase, the
    /// same as the resolver already does at push time for its own
    /// diagnostics (`resolver::ResolveCtx::diag`).
    pub fn merge_loader_diagnostics(
        &mut self,
        mut loader_diagnostics: Vec<Diagnostic>,
        config: &DiagnosticConfig,
    ) {
        loader_diagnostics.retain(|d| config.should_emit(d.severity, &d.code));
        loader_diagnostics.append(&mut self.diagnostics);
        self.diagnostics = loader_diagnostics;
    }

    pub fn diagnostics_by_severity(&self, threshold: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.severity <= threshold)
    }

    pub fn unresolved(&self) -> &[UnresolvedRef] {
        &self.unresolved
    }

    /// A `{Kind -> count}` summary over every object/notification/group/etc
    /// attached to the tree (SPEC_FULL.md §4.5 supplement).
    pub fn counts_by_kind(&self) -> FxHashMap<Kind, usize> {
        let mut counts = FxHashMap::default();
        for node in self.nodes.iter() {
            *counts.entry(node.kind).or_insert(0) += 1;
        }
        counts
    }

    // -- per-object computed accessors (spec.md §4.5) -----------------

    pub fn effective_indexes(&self, id: ObjectId) -> &[crate::model::IndexColumn] {
        &self.objects[id].effective_index
    }

    pub fn effective_sizes(&self, id: ObjectId) -> &[crate::model::Constraint] {
        &self.objects[id].effective_sizes
    }

    pub fn effective_ranges(&self, id: ObjectId) -> &[crate::model::Constraint] {
        &self.objects[id].effective_value_ranges
    }

    pub fn effective_enums(&self, id: ObjectId) -> &[crate::model::EnumValue] {
        &self.objects[id].effective_enum_values
    }

    pub fn effective_bits(&self, id: ObjectId) -> &[crate::model::EnumValue] {
        &self.objects[id].effective_bits
    }

    pub fn effective_display_hint(&self, id: ObjectId) -> Option<&str> {
        self.objects[id].effective_display_hint.as_deref()
    }

    pub fn default_value(&self, id: ObjectId) -> &crate::model::DefaultValue {
        &self.objects[id].default_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_mib_has_only_root_node() {
        let mib = Mib::empty();
        assert_eq!(mib.nodes().count(), 1);
        assert_eq!(mib.get_node(mib.root()).kind, Kind::Internal);
    }

    #[test]
    fn node_by_arcs_walks_from_root() {
        let mut mib = Mib::empty();
        let root = mib.root;
        let child = mib.nodes.push(Node::new_child(root, 1));
        mib.nodes[root].add_child(1, child);
        assert_eq!(mib.node_by_arcs(&[1]), Some(child));
        assert_eq!(mib.node_by_arcs(&[2]), None);
    }

    #[test]
    fn longest_prefix_stops_at_deepest_match() {
        let mut mib = Mib::empty();
        let root = mib.root;
        let a = mib.nodes.push(Node::new_child(root, 1));
        mib.nodes[root].add_child(1, a);
        let b = mib.nodes.push(Node::new_child(a, 3));
        mib.nodes[a].add_child(3, b);
        let found = mib.longest_prefix(&Oid::new(vec![1, 3, 6, 1])).unwrap();
        assert_eq!(found, b);
    }

    #[test]
    fn longest_prefix_returns_none_when_nothing_matches() {
        let mib = Mib::empty();
        assert_eq!(mib.longest_prefix(&Oid::new(vec![99])), None);
    }
}
