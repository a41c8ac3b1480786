//! Name resolution shared by every later phase: local scope, then the
//! module's `IMPORTS` record (followed through a bounded re-export chain),
//! then — permissive mode only — a global fallback search across every
//! loaded module (spec.md §4.4, Open Question resolved in SPEC_FULL.md §4.4:
//! "global-fallback resolution is permissive-only").

use super::ResolveCtx;
use crate::ids::{CapabilitiesId, ComplianceId, GroupId, ModuleId, NotificationId, ObjectId, TypeId};
use crate::model::Module;
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smi_diagnostics::codes;
use smi_text_size::TextSize;
use std::cmp::Reverse;

const MAX_IMPORT_CHAIN: u32 = 16;

/// Resolves `name` against one namespace (`accessor` projects a `Module` to
/// that namespace's local map), following imports and — in permissive mode —
/// falling back to a global search.
pub(crate) fn resolve_symbol<T: Copy>(
    ctx: &mut ResolveCtx,
    start_module: ModuleId,
    name: &str,
    accessor: fn(&Module) -> &FxHashMap<CompactString, T>,
) -> Option<T> {
    if let Some(&id) = accessor(&ctx.mib.modules[start_module]).get(name) {
        return Some(id);
    }

    let mut current_name: Option<CompactString> =
        ctx.mib.modules[start_module].imports.get(name).cloned();
    let mut hops = 0u32;
    while let Some(from_name) = current_name.take() {
        hops += 1;
        if hops > MAX_IMPORT_CHAIN {
            ctx.diag(
                start_module,
                codes::IMPORT_CHAIN_TOO_DEEP,
                format!("import chain resolving `{name}` exceeds {MAX_IMPORT_CHAIN} hops"),
                TextSize::new(0),
            );
            return None;
        }
        let Some(from_id) = ctx.mib.module_by_name.get(from_name.as_str()).copied() else {
            break;
        };
        if let Some(&id) = accessor(&ctx.mib.modules[from_id]).get(name) {
            return Some(id);
        }
        current_name = ctx.mib.modules[from_id].imports.get(name).cloned();
    }

    global_fallback(ctx, start_module, name, accessor)
}

fn global_fallback<T: Copy>(
    ctx: &mut ResolveCtx,
    start_module: ModuleId,
    name: &str,
    accessor: fn(&Module) -> &FxHashMap<CompactString, T>,
) -> Option<T> {
    if !ctx.strictness.allows_global_fallback() {
        return None;
    }
    let mut candidates: Vec<(ModuleId, T)> = Vec::new();
    for module_id in ctx.module_ids.clone() {
        if let Some(&id) = accessor(&ctx.mib.modules[module_id]).get(name) {
            candidates.push((module_id, id));
        }
    }
    candidates.sort_by_key(|(mid, _)| Reverse(ctx.mib.modules[*mid].dialect.precedence()));
    let (found_module, id) = candidates.into_iter().next()?;
    let found_name = ctx.mib.modules[found_module].name.to_string();
    ctx.diag(
        start_module,
        codes::RESOLUTION_GLOBAL_FALLBACK,
        format!("`{name}` resolved via global fallback from module `{found_name}`"),
        TextSize::new(0),
    );
    Some(id)
}

pub(crate) fn resolve_type(ctx: &mut ResolveCtx, module_id: ModuleId, name: &str) -> Option<TypeId> {
    resolve_symbol(ctx, module_id, name, |m| &m.types)
}

pub(crate) fn resolve_object(ctx: &mut ResolveCtx, module_id: ModuleId, name: &str) -> Option<ObjectId> {
    resolve_symbol(ctx, module_id, name, |m| &m.objects)
}

pub(crate) fn resolve_notification(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    name: &str,
) -> Option<NotificationId> {
    resolve_symbol(ctx, module_id, name, |m| &m.notifications)
}

pub(crate) fn resolve_group(ctx: &mut ResolveCtx, module_id: ModuleId, name: &str) -> Option<GroupId> {
    resolve_symbol(ctx, module_id, name, |m| &m.groups)
}

pub(crate) fn resolve_compliance(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    name: &str,
) -> Option<ComplianceId> {
    resolve_symbol(ctx, module_id, name, |m| &m.compliances)
}

#[allow(dead_code)]
pub(crate) fn resolve_capabilities(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    name: &str,
) -> Option<CapabilitiesId> {
    resolve_symbol(ctx, module_id, name, |m| &m.capabilities)
}

/// Whichever record `name` refers to when used as an OID value's parent
/// anchor: any of the five node-attached namespaces can serve as an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnchorRef {
    Object(ObjectId),
    Notification(NotificationId),
    Group(GroupId),
    Compliance(ComplianceId),
    Capabilities(CapabilitiesId),
}

fn local_anchor(module: &Module, name: &str) -> Option<AnchorRef> {
    if let Some(&id) = module.objects.get(name) {
        return Some(AnchorRef::Object(id));
    }
    if let Some(&id) = module.notifications.get(name) {
        return Some(AnchorRef::Notification(id));
    }
    if let Some(&id) = module.groups.get(name) {
        return Some(AnchorRef::Group(id));
    }
    if let Some(&id) = module.compliances.get(name) {
        return Some(AnchorRef::Compliance(id));
    }
    if let Some(&id) = module.capabilities.get(name) {
        return Some(AnchorRef::Capabilities(id));
    }
    None
}

/// The outcome of a read-only anchor lookup: what was found, plus enough
/// provenance to emit the right diagnostic exactly once. Phase R3 runs this
/// repeatedly (every fixed-point pass) without side effects and only emits
/// the provenance diagnostics once a pending definition's final state is
/// known, via [`emit_anchor_diagnostics`].
#[derive(Debug, Clone)]
pub(crate) struct AnchorLookup {
    pub found: Option<AnchorRef>,
    pub via_global_fallback_from: Option<CompactString>,
    pub chain_too_deep: bool,
}

pub(crate) fn locate_anchor_silent(ctx: &ResolveCtx, module_id: ModuleId, name: &str) -> AnchorLookup {
    if let Some(found) = local_anchor(&ctx.mib.modules[module_id], name) {
        return AnchorLookup {
            found: Some(found),
            via_global_fallback_from: None,
            chain_too_deep: false,
        };
    }

    let mut current_name: Option<CompactString> =
        ctx.mib.modules[module_id].imports.get(name).cloned();
    let mut hops = 0u32;
    while let Some(from_name) = current_name.take() {
        hops += 1;
        if hops > MAX_IMPORT_CHAIN {
            return AnchorLookup {
                found: None,
                via_global_fallback_from: None,
                chain_too_deep: true,
            };
        }
        let Some(from_id) = ctx.mib.module_by_name.get(from_name.as_str()).copied() else {
            break;
        };
        if let Some(found) = local_anchor(&ctx.mib.modules[from_id], name) {
            return AnchorLookup {
                found: Some(found),
                via_global_fallback_from: None,
                chain_too_deep: false,
            };
        }
        current_name = ctx.mib.modules[from_id].imports.get(name).cloned();
    }

    if ctx.strictness.allows_global_fallback() {
        let mut candidates: Vec<(ModuleId, AnchorRef)> = Vec::new();
        for candidate_module in &ctx.module_ids {
            if let Some(found) = local_anchor(&ctx.mib.modules[*candidate_module], name) {
                candidates.push((*candidate_module, found));
            }
        }
        candidates.sort_by_key(|(mid, _)| Reverse(ctx.mib.modules[*mid].dialect.precedence()));
        if let Some((found_module, found)) = candidates.into_iter().next() {
            return AnchorLookup {
                found: Some(found),
                via_global_fallback_from: Some(ctx.mib.modules[found_module].name.clone()),
                chain_too_deep: false,
            };
        }
    }

    AnchorLookup {
        found: None,
        via_global_fallback_from: None,
        chain_too_deep: false,
    }
}

pub(crate) fn emit_anchor_diagnostics(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    name: &str,
    lookup: &AnchorLookup,
) {
    if lookup.chain_too_deep {
        ctx.diag(
            module_id,
            codes::IMPORT_CHAIN_TOO_DEEP,
            format!("import chain resolving `{name}` exceeds {MAX_IMPORT_CHAIN} hops"),
            TextSize::new(0),
        );
    }
    if let Some(from) = &lookup.via_global_fallback_from {
        ctx.diag(
            module_id,
            codes::RESOLUTION_GLOBAL_FALLBACK,
            format!("`{name}` resolved via global fallback from module `{from}`"),
            TextSize::new(0),
        );
    }
}

/// Resolves `name` to whichever definition it names, across all five
/// OID-bearing namespaces, in one shot (single-use call sites in Phase
/// R4/R5; Phase R3's iterative resolution uses [`locate_anchor_silent`]
/// instead so it does not re-emit diagnostics on every fixed-point pass).
pub(crate) fn resolve_anchor(ctx: &mut ResolveCtx, module_id: ModuleId, name: &str) -> Option<AnchorRef> {
    let lookup = locate_anchor_silent(ctx, module_id, name);
    emit_anchor_diagnostics(ctx, module_id, name, &lookup);
    lookup.found
}

/// Fixed arcs for the ASN.1/SNMP roots every MIB can reference by name even
/// when the module that formally defines them (`SNMPv2-SMI`, `RFC1155-SMI`)
/// was not among the loaded sources (SPEC_FULL.md §4.4 supplement). Only
/// consulted as a last resort, after a real definition search has failed.
pub(crate) fn well_known_arcs(name: &str) -> Option<Vec<u32>> {
    Some(match name {
        "iso" => vec![1],
        "org" => vec![1, 3],
        "dod" => vec![1, 3, 6],
        "internet" => vec![1, 3, 6, 1],
        "directory" => vec![1, 3, 6, 1, 1],
        "mgmt" => vec![1, 3, 6, 1, 2],
        "mib-2" => vec![1, 3, 6, 1, 2, 1],
        "experimental" => vec![1, 3, 6, 1, 3],
        "private" => vec![1, 3, 6, 1, 4],
        "enterprises" => vec![1, 3, 6, 1, 4, 1],
        "security" => vec![1, 3, 6, 1, 5],
        "snmpV2" => vec![1, 3, 6, 1, 6],
        "snmpDomains" => vec![1, 3, 6, 1, 6, 1],
        "snmpProxys" => vec![1, 3, 6, 1, 6, 2],
        "snmpModules" => vec![1, 3, 6, 1, 6, 3],
        _ => return None,
    })
}
