//! Phase R2 (spec.md §4.4): validate every `IMPORTS ... FROM` entry recorded
//! in R1. The Loader already reports a module that could not be found
//! (`import-module-missing`); this phase reports a module that *was* found
//! but does not actually define the imported symbol (`import-symbol-missing`).
//!
//! Macro keywords (`OBJECT-TYPE`, ...), the primitive base types, and the
//! well-known OID roots are never interned as definitions, so importing them
//! is always valid and skipped here.

use super::names::well_known_arcs;
use super::ResolveCtx;
use crate::ids::ModuleId;
use crate::model::BaseType;
use smi_diagnostics::codes;
use smi_text_size::TextSize;

const MACRO_KEYWORDS: &[&str] = &[
    "OBJECT-TYPE",
    "OBJECT-IDENTITY",
    "MODULE-IDENTITY",
    "NOTIFICATION-TYPE",
    "TRAP-TYPE",
    "OBJECT-GROUP",
    "NOTIFICATION-GROUP",
    "MODULE-COMPLIANCE",
    "AGENT-CAPABILITIES",
    "TEXTUAL-CONVENTION",
];

fn always_available(name: &str) -> bool {
    MACRO_KEYWORDS.contains(&name)
        || BaseType::from_primitive_name(name).is_some()
        || well_known_arcs(name).is_some()
}

fn module_defines(ctx: &ResolveCtx, module_id: ModuleId, name: &str) -> bool {
    let module = &ctx.mib.modules[module_id];
    module.types.contains_key(name)
        || module.objects.contains_key(name)
        || module.notifications.contains_key(name)
        || module.groups.contains_key(name)
        || module.compliances.contains_key(name)
        || module.capabilities.contains_key(name)
}

pub(super) fn run(ctx: &mut ResolveCtx) {
    for i in 0..ctx.loaded.len() {
        let module_id = ctx.module_ids[i];
        let imports = ctx.loaded[i].ast.imports.clone();
        for import in &imports {
            let from_name = import.from_module.as_str();
            let Some(from_id) = ctx.mib.module_by_name.get(from_name).copied() else {
                // Loader already reported this module as missing.
                continue;
            };
            for symbol in &import.symbols {
                let symbol_name = symbol.as_str();
                if always_available(symbol_name) {
                    continue;
                }
                if !module_defines(ctx, from_id, symbol_name) {
                    ctx.diag(
                        module_id,
                        codes::IMPORT_SYMBOL_MISSING,
                        format!("`{symbol_name}` is not defined by module `{from_name}`"),
                        TextSize::new(0),
                    );
                }
            }
        }
    }
}
