//! Phase R1 (spec.md §4.4): intern every module and every definition name.
//! Definitions get an id and a slot in their module's namespace map; nothing
//! about OIDs, types, or references is resolved yet. Within one namespace of
//! one module, the first definition of a name wins and every later one is a
//! `duplicate-definition` error (SPEC_FULL.md §4.4 Open Question: "keep
//! first, unconditional error").

use super::dialect;
use super::{ResolveCtx, RowLayout};
use crate::ids::ModuleId;
use crate::model::{Capabilities, Compliance, Group, Module, Notification, Object, SupportsModule, Type};
use crate::oid::Oid;
use compact_str::CompactString;
use smi_ast::{Definition, TypeSyntax};
use smi_diagnostics::codes;
use smi_text_size::{Ranged, TextSize};

pub(super) fn run(ctx: &mut ResolveCtx) {
    let count = ctx.loaded.len();
    for i in 0..count {
        let name = ctx.loaded[i].ast.name.as_str().to_string();
        let dialect_value = dialect::infer(&ctx.loaded[i].ast);
        let mut module = Module::new(name.clone(), dialect_value);
        module.source_path = Some(CompactString::from(name.as_str()));
        for import in &ctx.loaded[i].ast.imports {
            for symbol in &import.symbols {
                module
                    .imports
                    .insert(symbol.text.clone(), import.from_module.text.clone());
            }
        }
        let module_id = ctx.mib.modules.push(module);
        ctx.module_ids.push(module_id);
        ctx.module_index.insert(module_id, i);
        if ctx.mib.module_by_name.insert(CompactString::from(name.as_str()), module_id).is_some() {
            ctx.diag(
                module_id,
                codes::DUPLICATE_DEFINITION,
                format!("module `{name}` already interned under this name"),
                TextSize::new(0),
            );
        }
    }

    for i in 0..count {
        let module_id = ctx.module_ids[i];
        intern_definitions(ctx, module_id, i);
    }
}

fn intern_definitions(ctx: &mut ResolveCtx, module_id: ModuleId, loaded_idx: usize) {
    let definitions = ctx.loaded[loaded_idx].ast.definitions.clone();
    for def in &definitions {
        match def {
            Definition::Type(t) => {
                if let TypeSyntax::Sequence(fields) = &t.syntax {
                    ctx.row_layouts.insert(
                        (module_id, t.name.text.clone()),
                        RowLayout {
                            fields: fields.clone(),
                        },
                    );
                    continue;
                }
                intern_type(ctx, module_id, t.name.as_str(), t.range().start(), false);
            }
            Definition::TextualConvention(tc) => {
                let type_id = intern_type(ctx, module_id, tc.name.as_str(), tc.range().start(), true);
                if let Some(type_id) = type_id {
                    let ty = &mut ctx.mib.types[type_id];
                    ty.status = tc.status.map(super::convert_status);
                    ty.description = tc.description.clone();
                    ty.display_hint = tc.display_hint.clone();
                }
            }
            Definition::Value(v) => {
                intern_object(ctx, module_id, v.name.as_str(), v.range().start());
            }
            Definition::ObjectType(o) => {
                if let Some(object_id) = intern_object(ctx, module_id, o.name.as_str(), o.range().start()) {
                    let object = &mut ctx.mib.objects[object_id];
                    object.access = o.access.map(super::convert_access);
                    object.status = o.status.map(super::convert_status);
                    object.description = o.description.clone();
                    object.reference = o.reference.clone();
                    object.units = o.units.clone();
                }
            }
            Definition::ObjectIdentity(o) => {
                if let Some(object_id) = intern_object(ctx, module_id, o.name.as_str(), o.range().start()) {
                    let object = &mut ctx.mib.objects[object_id];
                    object.status = o.status.map(super::convert_status);
                    object.description = o.description.clone();
                    object.reference = o.reference.clone();
                }
            }
            Definition::ModuleIdentity(m) => {
                let object_id = intern_object(ctx, module_id, m.name.as_str(), m.range().start());
                if object_id.is_some() {
                    let module = &mut ctx.mib.modules[module_id];
                    module.organization = m.organization.clone();
                    module.contact_info = m.contact_info.clone();
                    module.last_updated = m.last_updated.clone();
                    module.description = m.description.clone();
                    module.revisions = m
                        .revisions
                        .iter()
                        .map(|r| crate::model::Revision {
                            date: r.date.clone(),
                            description: r.description.clone(),
                        })
                        .collect();
                }
            }
            Definition::NotificationType(n) => {
                if let Some(id) = intern_notification(ctx, module_id, n.name.as_str(), n.range().start()) {
                    let notification = &mut ctx.mib.notifications[id];
                    notification.status = n.status.map(super::convert_status);
                    notification.description = n.description.clone();
                    notification.reference = n.reference.clone();
                }
            }
            Definition::TrapType(t) => {
                if let Some(id) = intern_notification(ctx, module_id, t.name.as_str(), t.range().start()) {
                    let notification = &mut ctx.mib.notifications[id];
                    notification.description = t.description.clone();
                    notification.reference = t.reference.clone();
                }
            }
            Definition::ObjectGroup(g) => {
                if let Some(id) = intern_group(ctx, module_id, g.name.as_str(), g.range().start(), false) {
                    let group = &mut ctx.mib.groups[id];
                    group.status = g.status.map(super::convert_status);
                    group.description = g.description.clone();
                    group.reference = g.reference.clone();
                }
            }
            Definition::NotificationGroup(g) => {
                if let Some(id) = intern_group(ctx, module_id, g.name.as_str(), g.range().start(), true) {
                    let group = &mut ctx.mib.groups[id];
                    group.status = g.status.map(super::convert_status);
                    group.description = g.description.clone();
                    group.reference = g.reference.clone();
                }
            }
            Definition::ModuleCompliance(c) => {
                if let Some(id) = intern_compliance(ctx, module_id, c.name.as_str(), c.range().start()) {
                    let compliance = &mut ctx.mib.compliances[id];
                    compliance.status = c.status.map(super::convert_status);
                    compliance.description = c.description.clone();
                    compliance.reference = c.reference.clone();
                }
            }
            Definition::AgentCapabilities(c) => {
                if let Some(id) = intern_capabilities(ctx, module_id, c.name.as_str(), c.range().start()) {
                    let capabilities = &mut ctx.mib.capabilities[id];
                    capabilities.product_release = c.product_release.clone();
                    capabilities.status = c.status.map(super::convert_status);
                    capabilities.description = c.description.clone();
                    capabilities.reference = c.reference.clone();
                }
            }
        }
    }
}

fn duplicate(ctx: &mut ResolveCtx, module_id: ModuleId, name: &str, offset: TextSize) {
    ctx.diag(
        module_id,
        codes::DUPLICATE_DEFINITION,
        format!("`{name}` is already defined in this module"),
        offset,
    );
}

fn intern_type(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    name: &str,
    offset: TextSize,
    is_tc: bool,
) -> Option<crate::ids::TypeId> {
    if ctx.mib.modules[module_id].types.contains_key(name) {
        duplicate(ctx, module_id, name, offset);
        return None;
    }
    let placeholder = Type {
        name: CompactString::from(name),
        module: module_id,
        base_type: crate::model::BaseType::Unknown,
        parent: None,
        is_textual_convention: is_tc,
        status: None,
        description: None,
        display_hint: None,
        sizes: Vec::new(),
        value_ranges: Vec::new(),
        enum_values: Vec::new(),
        bits: Vec::new(),
    };
    let type_id = ctx.mib.types.push(placeholder);
    ctx.mib.modules[module_id].types.insert(CompactString::from(name), type_id);
    Some(type_id)
}

fn intern_object(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    name: &str,
    offset: TextSize,
) -> Option<crate::ids::ObjectId> {
    if ctx.mib.modules[module_id].objects.contains_key(name) {
        duplicate(ctx, module_id, name, offset);
        return None;
    }
    let root = ctx.mib.root;
    let placeholder = Object::new(name, module_id, root, Oid::root());
    let object_id = ctx.mib.objects.push(placeholder);
    ctx.mib.modules[module_id].objects.insert(CompactString::from(name), object_id);
    Some(object_id)
}

fn intern_notification(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    name: &str,
    offset: TextSize,
) -> Option<crate::ids::NotificationId> {
    if ctx.mib.modules[module_id].notifications.contains_key(name) {
        duplicate(ctx, module_id, name, offset);
        return None;
    }
    let root = ctx.mib.root;
    let placeholder = Notification {
        name: CompactString::from(name),
        module: module_id,
        node: root,
        oid: Oid::root(),
        status: None,
        description: None,
        reference: None,
        objects: Vec::new(),
    };
    let id = ctx.mib.notifications.push(placeholder);
    ctx.mib.modules[module_id].notifications.insert(CompactString::from(name), id);
    Some(id)
}

fn intern_group(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    name: &str,
    offset: TextSize,
    is_notification_group: bool,
) -> Option<crate::ids::GroupId> {
    if ctx.mib.modules[module_id].groups.contains_key(name) {
        duplicate(ctx, module_id, name, offset);
        return None;
    }
    let root = ctx.mib.root;
    let placeholder = Group {
        name: CompactString::from(name),
        module: module_id,
        node: root,
        oid: Oid::root(),
        status: None,
        description: None,
        reference: None,
        members: Vec::new(),
        notification_members: Vec::new(),
        is_notification_group,
    };
    let id = ctx.mib.groups.push(placeholder);
    ctx.mib.modules[module_id].groups.insert(CompactString::from(name), id);
    Some(id)
}

fn intern_compliance(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    name: &str,
    offset: TextSize,
) -> Option<crate::ids::ComplianceId> {
    if ctx.mib.modules[module_id].compliances.contains_key(name) {
        duplicate(ctx, module_id, name, offset);
        return None;
    }
    let root = ctx.mib.root;
    let placeholder = Compliance {
        name: CompactString::from(name),
        module: module_id,
        node: root,
        oid: Oid::root(),
        status: None,
        description: None,
        reference: None,
        modules: Vec::new(),
    };
    let id = ctx.mib.compliances.push(placeholder);
    ctx.mib.modules[module_id].compliances.insert(CompactString::from(name), id);
    Some(id)
}

fn intern_capabilities(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    name: &str,
    offset: TextSize,
) -> Option<crate::ids::CapabilitiesId> {
    if ctx.mib.modules[module_id].capabilities.contains_key(name) {
        duplicate(ctx, module_id, name, offset);
        return None;
    }
    let root = ctx.mib.root;
    let placeholder = Capabilities {
        name: CompactString::from(name),
        module: module_id,
        node: root,
        oid: Oid::root(),
        product_release: None,
        status: None,
        description: None,
        reference: None,
        supports: Vec::<SupportsModule>::new(),
    };
    let id = ctx.mib.capabilities.push(placeholder);
    ctx.mib.modules[module_id].capabilities.insert(CompactString::from(name), id);
    Some(id)
}
