//! Phase R3 (spec.md §4.4): assign every interned definition its absolute
//! OID and attach it to the shared node tree.
//!
//! Anchors can reference a definition that appears later in the same module,
//! or in another module entirely, so this phase runs its candidate list to a
//! fixed point instead of a single top-to-bottom pass: each round resolves
//! whatever it can, and stops once a round makes no further progress.
//! Anything left over at that point is either a genuine cycle (detected by a
//! bounded DFS over the remaining candidates' anchor dependencies) or a
//! plain unresolved reference.

use super::names::{emit_anchor_diagnostics, locate_anchor_silent, well_known_arcs, AnchorLookup, AnchorRef};
use super::ResolveCtx;
use crate::ids::{CapabilitiesId, ComplianceId, GroupId, ModuleId, NotificationId, ObjectId};
use crate::model::node::{Attachment, Node, NodeBinding};
use crate::oid::Oid;
use compact_str::CompactString;
use smi_ast::{Definition, ObjectIdValueAst, OidComponent};
use smi_diagnostics::{codes, UnresolvedRefKind};
use smi_text_size::{Ranged, TextSize};

#[derive(Debug, Clone, Copy)]
enum Target {
    Object(ObjectId),
    Notification(NotificationId),
    Group(GroupId),
    Compliance(ComplianceId),
    Capabilities(CapabilitiesId),
}

enum Anchor {
    Value(ObjectIdValueAst),
    Trap { enterprise: CompactString, specific: u32 },
}

struct Pending {
    module_id: ModuleId,
    name: CompactString,
    offset: TextSize,
    target: Target,
    anchor: Anchor,
    is_module_identity: bool,
    done: bool,
}

enum Resolution {
    Ready(Oid),
    Deferred,
    Missing,
}

pub(super) fn run(ctx: &mut ResolveCtx) {
    let mut pending = collect(ctx);

    loop {
        let mut progressed = false;
        for i in 0..pending.len() {
            if pending[i].done {
                continue;
            }
            if let Resolution::Ready(oid) = try_resolve(ctx, &pending[i]) {
                let item = &pending[i];
                attach(ctx, item.module_id, &item.name, item.target, oid, item.is_module_identity);
                emit_final_diagnostics(ctx, item);
                pending[i].done = true;
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    classify_leftovers(ctx, &pending);
}

fn collect(ctx: &ResolveCtx) -> Vec<Pending> {
    let mut pending = Vec::new();
    let mut seen: rustc_hash::FxHashSet<(ModuleId, u8, CompactString)> = rustc_hash::FxHashSet::default();
    for i in 0..ctx.loaded.len() {
        let module_id = ctx.module_ids[i];
        for def in &ctx.loaded[i].ast.definitions {
            let namespace: Option<u8> = match def {
                Definition::Value(_) | Definition::ObjectType(_) | Definition::ObjectIdentity(_)
                | Definition::ModuleIdentity(_) => Some(0),
                Definition::NotificationType(_) | Definition::TrapType(_) => Some(1),
                Definition::ObjectGroup(_) | Definition::NotificationGroup(_) => Some(2),
                Definition::ModuleCompliance(_) => Some(3),
                Definition::AgentCapabilities(_) => Some(4),
                Definition::Type(_) | Definition::TextualConvention(_) => None,
            };
            if let Some(namespace) = namespace {
                let key = (module_id, namespace, def.name().text.clone());
                if !seen.insert(key) {
                    // A later duplicate-named definition: R1 already
                    // reported `duplicate-definition` and did not intern a
                    // separate id for it, so there is nothing new to
                    // resolve here.
                    continue;
                }
            }
            let entry = match def {
                Definition::Value(v) => {
                    let id = ctx.mib.modules[module_id].objects[v.name.as_str()];
                    Some(Pending {
                        module_id,
                        name: v.name.text.clone(),
                        offset: v.range().start(),
                        target: Target::Object(id),
                        anchor: Anchor::Value(v.value.clone()),
                        is_module_identity: false,
                        done: false,
                    })
                }
                Definition::ObjectType(o) => {
                    let id = ctx.mib.modules[module_id].objects[o.name.as_str()];
                    Some(Pending {
                        module_id,
                        name: o.name.text.clone(),
                        offset: o.range().start(),
                        target: Target::Object(id),
                        anchor: Anchor::Value(o.value.clone()),
                        is_module_identity: false,
                        done: false,
                    })
                }
                Definition::ObjectIdentity(o) => {
                    let id = ctx.mib.modules[module_id].objects[o.name.as_str()];
                    Some(Pending {
                        module_id,
                        name: o.name.text.clone(),
                        offset: o.range().start(),
                        target: Target::Object(id),
                        anchor: Anchor::Value(o.value.clone()),
                        is_module_identity: false,
                        done: false,
                    })
                }
                Definition::ModuleIdentity(m) => {
                    let id = ctx.mib.modules[module_id].objects[m.name.as_str()];
                    Some(Pending {
                        module_id,
                        name: m.name.text.clone(),
                        offset: m.range().start(),
                        target: Target::Object(id),
                        anchor: Anchor::Value(m.value.clone()),
                        is_module_identity: true,
                        done: false,
                    })
                }
                Definition::NotificationType(n) => {
                    let id = ctx.mib.modules[module_id].notifications[n.name.as_str()];
                    Some(Pending {
                        module_id,
                        name: n.name.text.clone(),
                        offset: n.range().start(),
                        target: Target::Notification(id),
                        anchor: Anchor::Value(n.value.clone()),
                        is_module_identity: false,
                        done: false,
                    })
                }
                Definition::TrapType(t) => {
                    let id = ctx.mib.modules[module_id].notifications[t.name.as_str()];
                    Some(Pending {
                        module_id,
                        name: t.name.text.clone(),
                        offset: t.range().start(),
                        target: Target::Notification(id),
                        anchor: Anchor::Trap {
                            enterprise: t.enterprise.text.clone(),
                            specific: t.specific_trap_number,
                        },
                        is_module_identity: false,
                        done: false,
                    })
                }
                Definition::ObjectGroup(g) => {
                    let id = ctx.mib.modules[module_id].groups[g.name.as_str()];
                    Some(Pending {
                        module_id,
                        name: g.name.text.clone(),
                        offset: g.range().start(),
                        target: Target::Group(id),
                        anchor: Anchor::Value(g.value.clone()),
                        is_module_identity: false,
                        done: false,
                    })
                }
                Definition::NotificationGroup(g) => {
                    let id = ctx.mib.modules[module_id].groups[g.name.as_str()];
                    Some(Pending {
                        module_id,
                        name: g.name.text.clone(),
                        offset: g.range().start(),
                        target: Target::Group(id),
                        anchor: Anchor::Value(g.value.clone()),
                        is_module_identity: false,
                        done: false,
                    })
                }
                Definition::ModuleCompliance(c) => {
                    let id = ctx.mib.modules[module_id].compliances[c.name.as_str()];
                    Some(Pending {
                        module_id,
                        name: c.name.text.clone(),
                        offset: c.range().start(),
                        target: Target::Compliance(id),
                        anchor: Anchor::Value(c.value.clone()),
                        is_module_identity: false,
                        done: false,
                    })
                }
                Definition::AgentCapabilities(c) => {
                    let id = ctx.mib.modules[module_id].capabilities[c.name.as_str()];
                    Some(Pending {
                        module_id,
                        name: c.name.text.clone(),
                        offset: c.range().start(),
                        target: Target::Capabilities(id),
                        anchor: Anchor::Value(c.value.clone()),
                        is_module_identity: false,
                        done: false,
                    })
                }
                Definition::Type(_) | Definition::TextualConvention(_) => None,
            };
            if let Some(entry) = entry {
                // Duplicate-named definitions were dropped in R1 and never
                // got an id; skip them here rather than panic on lookup.
                pending.push(entry);
            }
        }
    }
    pending
}

fn anchor_current_oid(ctx: &ResolveCtx, anchor: AnchorRef) -> Option<Oid> {
    let oid = match anchor {
        AnchorRef::Object(id) => &ctx.mib.objects[id].oid,
        AnchorRef::Notification(id) => &ctx.mib.notifications[id].oid,
        AnchorRef::Group(id) => &ctx.mib.groups[id].oid,
        AnchorRef::Compliance(id) => &ctx.mib.compliances[id].oid,
        AnchorRef::Capabilities(id) => &ctx.mib.capabilities[id].oid,
    };
    if oid.is_empty() {
        None
    } else {
        Some(oid.clone())
    }
}

fn try_resolve(ctx: &ResolveCtx, item: &Pending) -> Resolution {
    match &item.anchor {
        Anchor::Value(value) => try_resolve_value(ctx, item.module_id, value),
        Anchor::Trap { enterprise, specific } => {
            match resolve_base(ctx, item.module_id, enterprise) {
                Resolution::Ready(base) => Resolution::Ready(base.child(0).child(*specific)),
                other => other,
            }
        }
    }
}

fn resolve_base(ctx: &ResolveCtx, module_id: ModuleId, name: &str) -> Resolution {
    let lookup = locate_anchor_silent(ctx, module_id, name);
    if lookup.chain_too_deep {
        return Resolution::Missing;
    }
    match lookup.found {
        Some(anchor) => match anchor_current_oid(ctx, anchor) {
            Some(oid) => Resolution::Ready(oid),
            None => Resolution::Deferred,
        },
        None => match well_known_arcs(name) {
            Some(arcs) => Resolution::Ready(Oid::new(arcs)),
            None => Resolution::Missing,
        },
    }
}

fn try_resolve_value(ctx: &ResolveCtx, module_id: ModuleId, value: &ObjectIdValueAst) -> Resolution {
    let mut components = value.components.iter();
    let Some(first) = components.next() else {
        return Resolution::Missing;
    };
    let mut arcs: Vec<u32> = match first {
        OidComponent::Number(n) => vec![*n],
        OidComponent::Name(ident) | OidComponent::NamedNumber(ident, _) => {
            match resolve_base(ctx, module_id, ident.as_str()) {
                Resolution::Ready(oid) => oid.arcs().to_vec(),
                other => return other,
            }
        }
    };
    for comp in components {
        match comp.number() {
            Some(n) => arcs.push(n),
            None => return Resolution::Deferred,
        }
    }
    Resolution::Ready(Oid::new(arcs))
}

fn attach(ctx: &mut ResolveCtx, module_id: ModuleId, name: &str, target: Target, oid: Oid, is_module_identity: bool) {
    let node_id = ensure_node_path(ctx, oid.arcs());
    {
        let node = &mut ctx.mib.nodes[node_id];
        if node.name.is_none() {
            node.name = Some(CompactString::from(name));
        }
        let attachment = match target {
            Target::Object(id) => Attachment::Object(id),
            Target::Notification(id) => Attachment::Notification(id),
            Target::Group(id) => Attachment::Group(id),
            Target::Compliance(id) => Attachment::Compliance(id),
            Target::Capabilities(id) => Attachment::Capabilities(id),
        };
        node.bindings.push(NodeBinding {
            module: module_id,
            attachment,
        });
    }
    match target {
        Target::Object(id) => {
            let object = &mut ctx.mib.objects[id];
            object.node = node_id;
            object.oid = oid.clone();
            if is_module_identity {
                ctx.mib.modules[module_id].identity_oid = Some(oid);
            }
            let _ = name;
        }
        Target::Notification(id) => {
            ctx.mib.notifications[id].node = node_id;
            ctx.mib.notifications[id].oid = oid;
        }
        Target::Group(id) => {
            ctx.mib.groups[id].node = node_id;
            ctx.mib.groups[id].oid = oid;
        }
        Target::Compliance(id) => {
            ctx.mib.compliances[id].node = node_id;
            ctx.mib.compliances[id].oid = oid;
        }
        Target::Capabilities(id) => {
            ctx.mib.capabilities[id].node = node_id;
            ctx.mib.capabilities[id].oid = oid;
        }
    }
}

fn ensure_node_path(ctx: &mut ResolveCtx, arcs: &[u32]) -> crate::ids::NodeId {
    let mut current = ctx.mib.root;
    for &arc in arcs {
        current = match ctx.mib.nodes[current].child(arc) {
            Some(id) => id,
            None => {
                let node = Node::new_child(current, arc);
                let id = ctx.mib.nodes.push(node);
                ctx.mib.nodes[current].add_child(arc, id);
                id
            }
        };
    }
    current
}

fn emit_final_diagnostics(ctx: &mut ResolveCtx, item: &Pending) {
    let name = match &item.anchor {
        Anchor::Value(value) => match value.components.first() {
            Some(OidComponent::Name(ident) | OidComponent::NamedNumber(ident, _)) => {
                Some(ident.as_str().to_string())
            }
            _ => None,
        },
        Anchor::Trap { enterprise, .. } => Some(enterprise.to_string()),
    };
    if let Some(name) = name {
        let lookup = locate_anchor_silent(ctx, item.module_id, &name);
        emit_anchor_diagnostics(ctx, item.module_id, &name, &lookup);
    }
}

/// For every pending definition that never resolved, decide whether it sits
/// on a cycle (bounded DFS through other still-pending anchors) or is simply
/// missing, and emit the matching diagnostic.
fn classify_leftovers(ctx: &mut ResolveCtx, pending: &[Pending]) {
    const MAX_DEPTH: usize = 64;

    // Name -> pending index, scoped per-module so a same-named anchor in a
    // different module does not get conflated.
    let mut by_name: rustc_hash::FxHashMap<(ModuleId, CompactString), usize> = rustc_hash::FxHashMap::default();
    for (i, item) in pending.iter().enumerate() {
        if !item.done {
            by_name.insert((item.module_id, item.name.clone()), i);
        }
    }

    fn anchor_name_of(item: &Pending) -> Option<&str> {
        match &item.anchor {
            Anchor::Value(value) => match value.components.first() {
                Some(OidComponent::Name(ident) | OidComponent::NamedNumber(ident, _)) => {
                    Some(ident.as_str())
                }
                _ => None,
            },
            Anchor::Trap { enterprise, .. } => Some(enterprise.as_str()),
        }
    }

    // depends_on[i] = pending index that i's anchor name refers to, if that
    // name is itself another still-pending definition reachable from i's
    // scope (local name or declared import source module).
    let depends_on = |ctx: &ResolveCtx, i: usize| -> Option<usize> {
        let item = &pending[i];
        let name = anchor_name_of(item)?;
        if ctx.mib.modules[item.module_id].objects.contains_key(name)
            || ctx.mib.modules[item.module_id].notifications.contains_key(name)
            || ctx.mib.modules[item.module_id].groups.contains_key(name)
            || ctx.mib.modules[item.module_id].compliances.contains_key(name)
            || ctx.mib.modules[item.module_id].capabilities.contains_key(name)
        {
            return by_name.get(&(item.module_id, CompactString::from(name))).copied();
        }
        if let Some(from) = ctx.mib.modules[item.module_id].imports.get(name) {
            if let Some(&from_id) = ctx.mib.module_by_name.get(from.as_str()) {
                return by_name.get(&(from_id, CompactString::from(name))).copied();
            }
        }
        None
    };

    let mut cycle_members = rustc_hash::FxHashSet::default();
    for start in 0..pending.len() {
        if pending[start].done || cycle_members.contains(&start) {
            continue;
        }
        let mut path = vec![start];
        let mut current = start;
        for _ in 0..MAX_DEPTH {
            match depends_on(ctx, current) {
                Some(next) if next == start => {
                    for &idx in &path {
                        cycle_members.insert(idx);
                    }
                    break;
                }
                Some(next) if path.contains(&next) => break,
                Some(next) => {
                    path.push(next);
                    current = next;
                }
                None => break,
            }
        }
    }

    for (i, item) in pending.iter().enumerate() {
        if item.done {
            continue;
        }
        if cycle_members.contains(&i) {
            ctx.diag(
                item.module_id,
                codes::OID_CYCLE,
                format!("`{}`'s OID anchor chain forms a cycle", item.name),
                item.offset,
            );
        } else {
            ctx.diag(
                item.module_id,
                codes::OID_ANCHOR_UNRESOLVED,
                format!("`{}`'s OID parent anchor could not be resolved", item.name),
                item.offset,
            );
            ctx.unresolved(UnresolvedRefKind::Oid, &item.name, item.module_id);
        }
    }
}
