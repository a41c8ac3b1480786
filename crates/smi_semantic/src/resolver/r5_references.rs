//! Phase R5 (spec.md §4.4): bind every remaining name reference that is not
//! an OID parent anchor — INDEX columns, AUGMENTS targets, notification
//! OBJECTS/VARIABLES lists, group and compliance member lists, AGENT-
//! CAPABILITIES SUPPORTS clauses, and DEFVAL symbolic contents. Unresolved
//! names are recorded as `UnresolvedRef` and otherwise ignored; nothing here
//! halts resolution.

use super::names::{resolve_group, resolve_notification, resolve_object, AnchorRef};
use super::ResolveCtx;
use crate::ids::ObjectId;
use crate::model::{ComplianceModule, DefaultValue, IndexColumn, SupportsModule};
use crate::oid::Oid;
use compact_str::CompactString;
use smi_ast::{DefValAst, Definition, ObjectIdValueAst, OidComponent};
use smi_diagnostics::{codes, UnresolvedRefKind};
use smi_text_size::TextSize;

pub(super) fn run(ctx: &mut ResolveCtx) {
    for i in 0..ctx.loaded.len() {
        let module_id = ctx.module_ids[i];
        let definitions = ctx.loaded[i].ast.definitions.clone();
        for def in &definitions {
            match def {
                Definition::ObjectType(o) => {
                    let Some(&object_id) = ctx.mib.modules[module_id].objects.get(o.name.as_str()) else {
                        continue;
                    };
                    if o.index.is_some() || o.augments.is_some() {
                        ctx.row_declared.insert(object_id);
                    }
                    if let Some(index) = &o.index {
                        let columns: Vec<IndexColumn> = index
                            .iter()
                            .filter_map(|col| {
                                match resolve_object(ctx, module_id, col.name.as_str()) {
                                    Some(target) => Some(IndexColumn {
                                        object: target,
                                        implied: col.implied,
                                    }),
                                    None => {
                                        ctx.diag(
                                            module_id,
                                            codes::INDEX_UNRESOLVED,
                                            format!(
                                                "`{}`'s INDEX column `{}` does not resolve to an object",
                                                o.name.as_str(),
                                                col.name.as_str()
                                            ),
                                            TextSize::new(0),
                                        );
                                        ctx.unresolved(UnresolvedRefKind::Index, col.name.as_str(), module_id);
                                        None
                                    }
                                }
                            })
                            .collect();
                        ctx.mib.objects[object_id].index = columns;
                    }
                    if let Some(augments) = &o.augments {
                        match resolve_object(ctx, module_id, augments.as_str()) {
                            Some(target) => ctx.mib.objects[object_id].augments = Some(target),
                            None => {
                                ctx.diag(
                                    module_id,
                                    codes::AUGMENTS_UNRESOLVED,
                                    format!(
                                        "`{}`'s AUGMENTS target `{}` does not resolve to an object",
                                        o.name.as_str(),
                                        augments.as_str()
                                    ),
                                    TextSize::new(0),
                                );
                                ctx.unresolved(UnresolvedRefKind::Object, augments.as_str(), module_id);
                            }
                        }
                    }
                    if let Some(defval) = &o.defval {
                        let value = bind_defval(ctx, object_id, module_id, defval);
                        ctx.mib.objects[object_id].default_value = value;
                    }
                }
                Definition::NotificationType(n) => {
                    let Some(&id) = ctx.mib.modules[module_id].notifications.get(n.name.as_str()) else {
                        continue;
                    };
                    let objects = bind_object_list(ctx, module_id, &n.objects, n.name.as_str());
                    ctx.mib.notifications[id].objects = objects;
                }
                Definition::TrapType(t) => {
                    let Some(&id) = ctx.mib.modules[module_id].notifications.get(t.name.as_str()) else {
                        continue;
                    };
                    let objects = bind_object_list(ctx, module_id, &t.variables, t.name.as_str());
                    ctx.mib.notifications[id].objects = objects;
                }
                Definition::ObjectGroup(g) => {
                    let Some(&id) = ctx.mib.modules[module_id].groups.get(g.name.as_str()) else {
                        continue;
                    };
                    let members = bind_object_list(ctx, module_id, &g.objects, g.name.as_str());
                    ctx.mib.groups[id].members = members;
                }
                Definition::NotificationGroup(g) => {
                    let Some(&id) = ctx.mib.modules[module_id].groups.get(g.name.as_str()) else {
                        continue;
                    };
                    let members: Vec<_> = g
                        .notifications
                        .iter()
                        .filter_map(|name| match resolve_notification(ctx, module_id, name.as_str()) {
                            Some(target) => Some(target),
                            None => {
                                ctx.diag(
                                    module_id,
                                    codes::INDEX_UNRESOLVED,
                                    format!(
                                        "`{}`'s member `{}` does not resolve to a notification",
                                        g.name.as_str(),
                                        name.as_str()
                                    ),
                                    TextSize::new(0),
                                );
                                ctx.unresolved(UnresolvedRefKind::Notification, name.as_str(), module_id);
                                None
                            }
                        })
                        .collect();
                    ctx.mib.groups[id].notification_members = members;
                }
                Definition::ModuleCompliance(c) => {
                    let Some(&id) = ctx.mib.modules[module_id].compliances.get(c.name.as_str()) else {
                        continue;
                    };
                    let modules = c
                        .modules
                        .iter()
                        .map(|m| {
                            let target_module = m.module_name.as_ref().and_then(|name| {
                                let found = ctx.mib.module_by_name.get(name.as_str()).copied();
                                if found.is_none() {
                                    ctx.diag(
                                        module_id,
                                        codes::IMPORT_MODULE_MISSING,
                                        format!("compliance module clause names unknown module `{}`", name.as_str()),
                                        TextSize::new(0),
                                    );
                                }
                                found
                            });
                            let mandatory_groups: Vec<_> = m
                                .mandatory_groups
                                .iter()
                                .filter_map(|name| {
                                    resolve_group(ctx, module_id, name.as_str()).or_else(|| {
                                        ctx.unresolved(UnresolvedRefKind::Object, name.as_str(), module_id);
                                        None
                                    })
                                })
                                .collect();
                            let (group_members, object_members) = bind_compliance_members(ctx, module_id, &m.members);
                            ComplianceModule {
                                module: target_module,
                                mandatory_groups,
                                group_members,
                                object_members,
                            }
                        })
                        .collect();
                    ctx.mib.compliances[id].modules = modules;
                }
                Definition::AgentCapabilities(c) => {
                    let Some(&id) = ctx.mib.modules[module_id].capabilities.get(c.name.as_str()) else {
                        continue;
                    };
                    let supports = c
                        .supports
                        .iter()
                        .map(|s| {
                            let target_module = ctx.mib.module_by_name.get(s.module_name.as_str()).copied();
                            if target_module.is_none() {
                                ctx.diag(
                                    module_id,
                                    codes::IMPORT_MODULE_MISSING,
                                    format!("SUPPORTS clause names unknown module `{}`", s.module_name.as_str()),
                                    TextSize::new(0),
                                );
                            }
                            let includes: Vec<_> = s
                                .includes
                                .iter()
                                .filter_map(|name| {
                                    resolve_group(ctx, module_id, name.as_str()).or_else(|| {
                                        ctx.unresolved(UnresolvedRefKind::Object, name.as_str(), module_id);
                                        None
                                    })
                                })
                                .collect();
                            SupportsModule {
                                module: target_module,
                                includes,
                            }
                        })
                        .collect();
                    ctx.mib.capabilities[id].supports = supports;
                }
                _ => {}
            }
        }
    }
}

fn bind_object_list(ctx: &mut ResolveCtx, module_id: crate::ids::ModuleId, names: &[smi_ast::Ident], owner: &str) -> Vec<ObjectId> {
    names
        .iter()
        .filter_map(|name| match resolve_object(ctx, module_id, name.as_str()) {
            Some(id) => Some(id),
            None => {
                ctx.diag(
                    module_id,
                    codes::INDEX_UNRESOLVED,
                    format!("`{owner}`'s member `{}` does not resolve to an object", name.as_str()),
                    TextSize::new(0),
                );
                ctx.unresolved(UnresolvedRefKind::Object, name.as_str(), module_id);
                None
            }
        })
        .collect()
}

/// `ComplianceModuleAst::members` does not distinguish `GROUP` from `OBJECT`
/// refinement lines (spec.md §4.2: parsed, the refinement syntax itself
/// discarded), so each name is tried against the group namespace first and
/// the object namespace second.
fn bind_compliance_members(
    ctx: &mut ResolveCtx,
    module_id: crate::ids::ModuleId,
    names: &[smi_ast::Ident],
) -> (Vec<crate::ids::GroupId>, Vec<ObjectId>) {
    let mut group_members = Vec::new();
    let mut object_members = Vec::new();
    for name in names {
        if let Some(id) = resolve_group(ctx, module_id, name.as_str()) {
            group_members.push(id);
        } else if let Some(id) = resolve_object(ctx, module_id, name.as_str()) {
            object_members.push(id);
        } else {
            ctx.unresolved(UnresolvedRefKind::Object, name.as_str(), module_id);
        }
    }
    (group_members, object_members)
}

fn find_enum_label(ctx: &ResolveCtx, object_id: ObjectId, label: &str) -> bool {
    let object = &ctx.mib.objects[object_id];
    if object.inline_enum_values.iter().any(|e| e.label.as_str() == label) {
        return true;
    }
    if let Some(type_id) = object.ty {
        if ctx.mib.types[type_id].enum_values.iter().any(|e| e.label.as_str() == label) {
            return true;
        }
    }
    false
}

fn find_bits_label(ctx: &ResolveCtx, object_id: ObjectId, label: &str) -> bool {
    let object = &ctx.mib.objects[object_id];
    if object.inline_bits.iter().any(|e| e.label.as_str() == label) {
        return true;
    }
    if let Some(type_id) = object.ty {
        if ctx.mib.types[type_id].bits.iter().any(|e| e.label.as_str() == label) {
            return true;
        }
    }
    false
}

fn anchor_oid(ctx: &ResolveCtx, anchor: AnchorRef) -> Oid {
    match anchor {
        AnchorRef::Object(id) => ctx.mib.objects[id].oid.clone(),
        AnchorRef::Notification(id) => ctx.mib.notifications[id].oid.clone(),
        AnchorRef::Group(id) => ctx.mib.groups[id].oid.clone(),
        AnchorRef::Compliance(id) => ctx.mib.compliances[id].oid.clone(),
        AnchorRef::Capabilities(id) => ctx.mib.capabilities[id].oid.clone(),
    }
}

fn bind_oid_value(ctx: &mut ResolveCtx, module_id: crate::ids::ModuleId, value: &ObjectIdValueAst) -> Option<Oid> {
    let mut components = value.components.iter();
    let first = components.next()?;
    let mut arcs: Vec<u32> = match first {
        OidComponent::Number(n) => vec![*n],
        OidComponent::Name(ident) | OidComponent::NamedNumber(ident, _) => {
            let lookup = super::names::locate_anchor_silent(ctx, module_id, ident.as_str());
            super::names::emit_anchor_diagnostics(ctx, module_id, ident.as_str(), &lookup);
            let anchor = lookup.found?;
            anchor_oid(ctx, anchor).arcs().to_vec()
        }
    };
    for comp in components {
        arcs.push(comp.number()?);
    }
    Some(Oid::new(arcs))
}

fn bind_defval(ctx: &mut ResolveCtx, object_id: ObjectId, module_id: crate::ids::ModuleId, defval: &DefValAst) -> DefaultValue {
    match defval {
        DefValAst::Integer(n) => DefaultValue::Integer(*n),
        DefValAst::QuotedString(s) => DefaultValue::String(s.clone()),
        DefValAst::Bytes(bytes) => DefaultValue::Bytes(bytes.clone()),
        DefValAst::Oid(value) => match bind_oid_value(ctx, module_id, value) {
            Some(oid) => DefaultValue::Oid(oid),
            None => {
                ctx.diag(
                    module_id,
                    codes::OID_ANCHOR_UNRESOLVED,
                    "DEFVAL OID value does not resolve".to_string(),
                    TextSize::new(0),
                );
                ctx.unresolved(UnresolvedRefKind::Oid, "DEFVAL", module_id);
                DefaultValue::None
            }
        },
        DefValAst::Identifier(ident) => {
            let label = ident.as_str();
            if find_enum_label(ctx, object_id, label) {
                DefaultValue::EnumLabel(CompactString::from(label))
            } else {
                let lookup = super::names::locate_anchor_silent(ctx, module_id, label);
                super::names::emit_anchor_diagnostics(ctx, module_id, label, &lookup);
                match lookup.found {
                    Some(anchor) => DefaultValue::Oid(anchor_oid(ctx, anchor)),
                    None => {
                        ctx.diag(
                            module_id,
                            codes::DEFVAL_TYPE_MISMATCH,
                            format!("DEFVAL identifier `{label}` is neither an enum label nor a known symbol"),
                            TextSize::new(0),
                        );
                        ctx.unresolved(UnresolvedRefKind::Object, label, module_id);
                        DefaultValue::None
                    }
                }
            }
        }
        DefValAst::BitsList(idents) => {
            let mut labels = Vec::new();
            for ident in idents {
                if find_bits_label(ctx, object_id, ident.as_str()) {
                    labels.push(ident.text.clone());
                } else {
                    ctx.unresolved(UnresolvedRefKind::Object, ident.as_str(), module_id);
                }
            }
            DefaultValue::Bits(labels)
        }
    }
}
