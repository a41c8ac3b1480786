//! Phase R7 (spec.md §4.4): the Enricher. Computes every per-object derived
//! field that the earlier phases leave unset — effective constraints along
//! a textual-convention type chain, the effective `INDEX` for `AUGMENTS`
//! rows, and the canonicalized `DEFVAL`.

use super::ResolveCtx;
use crate::ids::{ObjectId, TypeId};
use crate::model::object::{DefaultValue, IndexColumn};
use crate::model::ty::{BaseType, Type};
use crate::model::Kind;
use smi_diagnostics::codes;
use smi_text_size::TextSize;

const MAX_TYPE_CHAIN: u32 = 32;
const MAX_AUGMENTS_CHAIN: u32 = 16;

pub(super) fn run(ctx: &mut ResolveCtx) {
    enrich_constraints(ctx);
    enrich_augments_index(ctx);
    canonicalize_defvals(ctx);
}

/// Nearest non-empty value in a type chain, object-inline first. Mirrors
/// the effective-`DISPLAY-HINT` rule (spec.md §4.4 R7: "nearest non-empty
/// hint in the chain") for every other per-chain field: sizes, value
/// ranges, enums, bits all use the same "first non-empty wins, nearest to
/// the object wins ties" rule rather than merging across layers.
fn nearest_in_chain<T: Clone>(
    ctx: &ResolveCtx,
    start: Option<TypeId>,
    get: impl Fn(&Type) -> &[T],
) -> Vec<T> {
    let mut current = start;
    let mut visited = rustc_hash::FxHashSet::default();
    let mut hops = 0u32;
    while let Some(type_id) = current {
        if !visited.insert(type_id) || hops > MAX_TYPE_CHAIN {
            break;
        }
        hops += 1;
        let ty = &ctx.mib.types[type_id];
        let values = get(ty);
        if !values.is_empty() {
            return values.to_vec();
        }
        current = ty.parent;
    }
    Vec::new()
}

fn nearest_hint_in_chain(ctx: &ResolveCtx, start: Option<TypeId>) -> Option<String> {
    let mut current = start;
    let mut visited = rustc_hash::FxHashSet::default();
    let mut hops = 0u32;
    while let Some(type_id) = current {
        if !visited.insert(type_id) || hops > MAX_TYPE_CHAIN {
            break;
        }
        hops += 1;
        let ty = &ctx.mib.types[type_id];
        if ty.display_hint.is_some() {
            return ty.display_hint.clone();
        }
        current = ty.parent;
    }
    None
}

fn enrich_constraints(ctx: &mut ResolveCtx) {
    let object_ids: Vec<ObjectId> = ctx.mib.objects.indices().collect();
    for object_id in object_ids {
        let (inline_sizes, inline_ranges, inline_enums, inline_bits, ty) = {
            let object = &ctx.mib.objects[object_id];
            (
                object.inline_sizes.clone(),
                object.inline_value_ranges.clone(),
                object.inline_enum_values.clone(),
                object.inline_bits.clone(),
                object.ty,
            )
        };

        let sizes = if inline_sizes.is_empty() {
            nearest_in_chain(ctx, ty, |t: &Type| t.sizes.as_slice())
        } else {
            inline_sizes
        };
        let value_ranges = if inline_ranges.is_empty() {
            nearest_in_chain(ctx, ty, |t: &Type| t.value_ranges.as_slice())
        } else {
            inline_ranges
        };
        let enum_values = if inline_enums.is_empty() {
            nearest_in_chain(ctx, ty, |t: &Type| t.enum_values.as_slice())
        } else {
            inline_enums
        };
        let bits = if inline_bits.is_empty() {
            nearest_in_chain(ctx, ty, |t: &Type| t.bits.as_slice())
        } else {
            inline_bits
        };
        let display_hint = nearest_hint_in_chain(ctx, ty);

        let object = &mut ctx.mib.objects[object_id];
        object.effective_sizes = sizes;
        object.effective_value_ranges = value_ranges;
        object.effective_enum_values = enum_values;
        object.effective_bits = bits;
        object.effective_display_hint = display_hint;
    }
}

/// Resolves every row's effective `INDEX`: its own columns if declared,
/// otherwise walks the `AUGMENTS` chain (bounded, since an `AUGMENTS` target
/// is itself almost always a plain row but nothing stops a pathological
/// input from chaining several) to the first row with a non-empty index.
/// Emits `row-missing-index` when a row's own index is empty and either it
/// has no `AUGMENTS` target or that chain never reaches a non-empty index,
/// and `augments-target-not-row` when the named target is not itself a row.
fn enrich_augments_index(ctx: &mut ResolveCtx) {
    let object_ids: Vec<ObjectId> = ctx.mib.objects.indices().collect();
    for object_id in object_ids {
        let object = &ctx.mib.objects[object_id];
        if object.kind != Kind::Row {
            continue;
        }
        if !object.index.is_empty() {
            ctx.mib.objects[object_id].effective_index = object.index.clone();
            continue;
        }
        let Some(target) = object.augments else {
            report_missing_index(ctx, object_id);
            continue;
        };
        match resolve_augmented_index(ctx, target) {
            Some(index) => ctx.mib.objects[object_id].effective_index = index,
            None => report_missing_index(ctx, object_id),
        }
    }
}

/// Follows an `AUGMENTS` target (and, transitively, its own `AUGMENTS`
/// target) to the first row with a non-empty `INDEX`. Returns `None` if the
/// target is not a row, the chain is empty all the way down, or the chain
/// exceeds `MAX_AUGMENTS_CHAIN`.
fn resolve_augmented_index(ctx: &mut ResolveCtx, target: ObjectId) -> Option<Vec<IndexColumn>> {
    let mut current = target;
    let mut hops = 0u32;
    loop {
        let object = &ctx.mib.objects[current];
        if object.kind != Kind::Row {
            let module_id = object.module;
            let name = object.name.clone();
            ctx.diag(
                module_id,
                codes::AUGMENTS_TARGET_NOT_ROW,
                format!("`{name}`'s AUGMENTS target is not a row"),
                TextSize::new(0),
            );
            return None;
        }
        if !object.index.is_empty() {
            return Some(object.index.clone());
        }
        let Some(next) = object.augments else {
            return None;
        };
        hops += 1;
        if hops > MAX_AUGMENTS_CHAIN {
            return None;
        }
        current = next;
    }
}

fn report_missing_index(ctx: &mut ResolveCtx, object_id: ObjectId) {
    let object = &ctx.mib.objects[object_id];
    let module_id = object.module;
    let name = object.name.clone();
    ctx.diag(
        module_id,
        codes::ROW_MISSING_INDEX,
        format!("row `{name}` has neither its own INDEX nor an AUGMENTS chain reaching one"),
        TextSize::new(0),
    );
}

/// Canonicalizes every `DEFVAL` against the object's base type (spec.md §4.4
/// R7, spec.md §8 scenario 4): an all-`0xFF` byte string typed against a
/// signed integer base (`Integer32`) reads as `-1` in two's complement,
/// rather than surfacing as an opaque byte string.
fn canonicalize_defvals(ctx: &mut ResolveCtx) {
    let object_ids: Vec<ObjectId> = ctx.mib.objects.indices().collect();
    for object_id in object_ids {
        let object = &ctx.mib.objects[object_id];
        let DefaultValue::Bytes(bytes) = &object.default_value else {
            continue;
        };
        let is_signed = object
            .ty
            .is_some_and(|type_id| ctx.mib.types[type_id].base_type == BaseType::Integer32);
        if is_signed && !bytes.is_empty() && bytes.iter().all(|b| *b == 0xFF) {
            ctx.mib.objects[object_id].default_value = DefaultValue::Integer(-1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crate::resolver::resolve;
    use smi_diagnostics::{DiagnosticConfig, Strictness};
    use smi_parser::parse_module;
    use smi_source_file::LineIndex;

    fn resolve_single(text: &str) -> crate::mib::Mib {
        let strictness = Strictness::Permissive;
        let config = DiagnosticConfig::from_strictness(strictness);
        let (ast, _diags) = parse_module(text, "SYNTHETIC-MIB", strictness, &config);
        let ast = ast.expect("module parses");
        let loaded = vec![crate::loader::LoadedModule {
            ast,
            text: text.to_string(),
            line_index: LineIndex::from_source_text(text),
        }];
        resolve(loaded, strictness, config, CancellationToken::new(), None)
    }

    const AUGMENTS_MIB: &str = r#"
SYNTHETIC-MIB DEFINITIONS ::= BEGIN
syntheticMIB OBJECT IDENTIFIER ::= { iso 999 }
syntheticSimpleTable OBJECT-TYPE
    SYNTAX SEQUENCE OF SyntheticSimpleEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "table"
    ::= { syntheticMIB 1 }
SyntheticSimpleEntry ::= SEQUENCE {
    syntheticSimpleIndex Unsigned32
}
syntheticSimpleEntry OBJECT-TYPE
    SYNTAX SyntheticSimpleEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "row"
    INDEX { syntheticSimpleIndex }
    ::= { syntheticSimpleTable 1 }
syntheticSimpleIndex OBJECT-TYPE
    SYNTAX Unsigned32 (1..65535)
    MAX-ACCESS read-only
    STATUS current
    DESCRIPTION "index"
    ::= { syntheticSimpleEntry 1 }
syntheticAugmentTable OBJECT-TYPE
    SYNTAX SEQUENCE OF SyntheticAugmentEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "table"
    ::= { syntheticMIB 2 }
SyntheticAugmentEntry ::= SEQUENCE {
    syntheticAugmentValue Unsigned32
}
syntheticAugmentEntry OBJECT-TYPE
    SYNTAX SyntheticAugmentEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "augmenting row"
    AUGMENTS { syntheticSimpleEntry }
    ::= { syntheticAugmentTable 1 }
syntheticAugmentValue OBJECT-TYPE
    SYNTAX Unsigned32
    MAX-ACCESS read-only
    STATUS current
    DESCRIPTION "value"
    ::= { syntheticAugmentEntry 1 }
END
"#;

    #[test]
    fn augments_row_inherits_base_rows_index() {
        let mib = resolve_single(AUGMENTS_MIB);
        let base_row = mib.object("syntheticSimpleEntry").unwrap();
        let augment_row = mib.object("syntheticAugmentEntry").unwrap();
        assert_eq!(augment_row.effective_index.len(), 1);
        assert_eq!(augment_row.effective_index[0].object, base_row.effective_index[0].object);
        assert!(!mib
            .diagnostics()
            .iter()
            .any(|d| d.code == codes::ROW_MISSING_INDEX));
    }

    const HINT_MIB: &str = r#"
SYNTHETIC-MIB DEFINITIONS ::= BEGIN
SyntheticFixedOctetString ::= TEXTUAL-CONVENTION
    DISPLAY-HINT "8x"
    STATUS current
    DESCRIPTION "fixed"
    SYNTAX OCTET STRING (SIZE (8))
syntheticMIB OBJECT IDENTIFIER ::= { iso 999 }
syntheticFixed OBJECT-TYPE
    SYNTAX SyntheticFixedOctetString
    MAX-ACCESS read-only
    STATUS current
    DESCRIPTION "fixed value"
    ::= { syntheticMIB 1 }
END
"#;

    #[test]
    fn effective_display_hint_inherits_from_textual_convention() {
        let mib = resolve_single(HINT_MIB);
        let object = mib.object("syntheticFixed").unwrap();
        assert_eq!(object.effective_display_hint.as_deref(), Some("8x"));
    }

    const ROW_WITHOUT_INDEX_MIB: &str = r#"
SYNTHETIC-MIB DEFINITIONS ::= BEGIN
syntheticMIB OBJECT IDENTIFIER ::= { iso 999 }
syntheticBadTable OBJECT-TYPE
    SYNTAX SEQUENCE OF SyntheticBadEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "table"
    ::= { syntheticMIB 1 }
SyntheticBadEntry ::= SEQUENCE {
    syntheticBadValue Unsigned32
}
syntheticBadEntry OBJECT-TYPE
    SYNTAX SyntheticBadEntry
    MAX-ACCESS not-accessible
    STATUS current
    DESCRIPTION "row augmenting an entry that does not exist"
    AUGMENTS { syntheticUnknownEntry }
    ::= { syntheticBadTable 1 }
END
"#;

    #[test]
    fn row_without_index_or_augments_is_reported() {
        let mib = resolve_single(ROW_WITHOUT_INDEX_MIB);
        assert!(mib
            .diagnostics()
            .iter()
            .any(|d| d.code == codes::ROW_MISSING_INDEX));
    }
}
