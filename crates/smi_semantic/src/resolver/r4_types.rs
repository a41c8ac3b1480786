//! Phase R4 (spec.md §4.4): resolve every `SYNTAX` reference.
//!
//! Two passes: first every named `Type`/`TEXTUAL-CONVENTION` definition's own
//! syntax is bound (filling `parent` and any directly-attached constraints),
//! then every `Object`'s `SYNTAX` clause is bound against the now-complete
//! type table. A final sweep walks each `Type`'s parent chain to compute its
//! ultimate base type, since a textual convention's syntax may name another
//! textual convention defined earlier or later in the load set.

use super::names::resolve_type;
use super::ResolveCtx;
use crate::ids::{ModuleId, ObjectId, TypeId};
use crate::model::{BaseType, Constraint, EnumValue, Type};
use compact_str::CompactString;
use smi_ast::{ConstraintList, Definition, EnumItem, TypeSyntax};
use smi_diagnostics::{codes, UnresolvedRefKind};
use smi_index::Idx;
use smi_text_size::TextSize;

const MAX_ROW_LAYOUT_CHAIN: u32 = 16;
const MAX_TYPE_CHAIN: u32 = 32;

pub(super) fn run(ctx: &mut ResolveCtx) {
    bind_named_types(ctx);
    compute_base_types(ctx);
    bind_object_types(ctx);
}

fn convert_constraints(list: &ConstraintList) -> Vec<Constraint> {
    list.iter().map(|r| Constraint { min: r.min, max: r.max }).collect()
}

fn convert_enum_items(items: &[EnumItem]) -> Vec<EnumValue> {
    items
        .iter()
        .map(|item| EnumValue {
            label: item.name.text.clone(),
            value: item.value,
        })
        .collect()
}

fn bind_named_types(ctx: &mut ResolveCtx) {
    let mut seen = rustc_hash::FxHashSet::default();
    for i in 0..ctx.loaded.len() {
        let module_id = ctx.module_ids[i];
        let definitions = ctx.loaded[i].ast.definitions.clone();
        for def in &definitions {
            let (name, syntax) = match def {
                Definition::Type(t) => {
                    if matches!(t.syntax, TypeSyntax::Sequence(_)) {
                        continue;
                    }
                    (t.name.as_str(), &t.syntax)
                }
                Definition::TextualConvention(tc) => (tc.name.as_str(), &tc.syntax),
                _ => continue,
            };
            if !seen.insert((module_id, CompactString::from(name))) {
                continue;
            }
            let Some(&type_id) = ctx.mib.modules[module_id].types.get(name) else {
                continue;
            };
            resolve_named_syntax(ctx, module_id, type_id, syntax);
        }
    }
}

/// Fills `ctx.mib.types[type_id]`'s `parent`/`base_type`/constraint fields
/// from `syntax`. Recurses through `Constrained` so the constraint always
/// lands on the top-level `type_id`, not a synthesized child.
fn resolve_named_syntax(ctx: &mut ResolveCtx, module_id: ModuleId, type_id: TypeId, syntax: &TypeSyntax) {
    match syntax {
        TypeSyntax::Named(ident) => match resolve_named_base(ctx, module_id, ident.as_str()) {
            Some(NamedBase::Type(parent_id)) => {
                ctx.mib.types[type_id].parent = Some(parent_id);
            }
            Some(NamedBase::Primitive(base)) => {
                ctx.mib.types[type_id].base_type = base;
            }
            None => {
                ctx.diag(
                    module_id,
                    codes::TYPE_UNKNOWN_BASE,
                    format!("`{}`'s SYNTAX names unknown type `{}`", ctx.mib.types[type_id].name, ident.as_str()),
                    TextSize::new(0),
                );
                ctx.unresolved(UnresolvedRefKind::Type, ident.as_str(), module_id);
            }
        },
        TypeSyntax::Constrained { base, size, value_range } => {
            resolve_named_syntax(ctx, module_id, type_id, base);
            if let Some(size) = size {
                ctx.mib.types[type_id].sizes = convert_constraints(size);
            }
            if let Some(value_range) = value_range {
                ctx.mib.types[type_id].value_ranges = convert_constraints(value_range);
            }
        }
        TypeSyntax::IntegerEnum(items) => {
            ctx.mib.types[type_id].base_type = BaseType::Enum;
            ctx.mib.types[type_id].enum_values = convert_enum_items(items);
        }
        TypeSyntax::Bits(items) => {
            ctx.mib.types[type_id].base_type = BaseType::Bits;
            ctx.mib.types[type_id].bits = convert_enum_items(items);
        }
        // A named `SEQUENCE OF` or `CHOICE` type assignment is vanishingly
        // rare and carries no base type of its own; left `Unknown`.
        TypeSyntax::Sequence(_) | TypeSyntax::SequenceOf(_) | TypeSyntax::Choice(_) => {}
    }
}

enum NamedBase {
    Type(TypeId),
    Primitive(BaseType),
}

fn resolve_named_base(ctx: &mut ResolveCtx, module_id: ModuleId, name: &str) -> Option<NamedBase> {
    if let Some(type_id) = resolve_type(ctx, module_id, name) {
        return Some(NamedBase::Type(type_id));
    }
    BaseType::from_primitive_name(name).map(NamedBase::Primitive)
}

/// Walks every `Type`'s `parent` chain (bounded 32 hops) to propagate a
/// known base type down to textual conventions layered over it.
fn compute_base_types(ctx: &mut ResolveCtx) {
    let ids: Vec<TypeId> = ctx.mib.types.indices().collect();
    let mut resolved = Vec::new();
    for type_id in ids {
        if ctx.mib.types[type_id].base_type != BaseType::Unknown {
            continue;
        }
        let mut current = type_id;
        let mut visited = rustc_hash::FxHashSet::default();
        let mut hops = 0u32;
        let mut found = None;
        loop {
            if !visited.insert(current) {
                break;
            }
            hops += 1;
            if hops > MAX_TYPE_CHAIN {
                break;
            }
            match ctx.mib.types[current].parent {
                Some(parent_id) => {
                    if ctx.mib.types[parent_id].base_type != BaseType::Unknown {
                        found = Some(ctx.mib.types[parent_id].base_type);
                        break;
                    }
                    current = parent_id;
                }
                None => break,
            }
        }
        match found {
            Some(base) => resolved.push((type_id, base)),
            None => {
                let module_id = ctx.mib.types[type_id].module;
                let name = ctx.mib.types[type_id].name.clone();
                ctx.diag(
                    module_id,
                    codes::TYPE_CHAIN_UNRESOLVABLE,
                    format!("`{name}`'s type chain does not terminate in a known base type"),
                    TextSize::new(0),
                );
            }
        }
    }
    for (type_id, base) in resolved {
        ctx.mib.types[type_id].base_type = base;
    }
}

fn bind_object_types(ctx: &mut ResolveCtx) {
    let mut seen = rustc_hash::FxHashSet::default();
    for i in 0..ctx.loaded.len() {
        let module_id = ctx.module_ids[i];
        let definitions = ctx.loaded[i].ast.definitions.clone();
        for def in &definitions {
            let Definition::ObjectType(o) = def else { continue };
            if !seen.insert((module_id, o.name.text.clone())) {
                continue;
            }
            let Some(&object_id) = ctx.mib.modules[module_id].objects.get(o.name.as_str()) else {
                continue;
            };
            bind_object_syntax(ctx, object_id, module_id, &o.syntax);
        }
    }
}

fn bind_object_syntax(ctx: &mut ResolveCtx, object_id: ObjectId, module_id: ModuleId, syntax: &TypeSyntax) {
    match syntax {
        TypeSyntax::Named(ident) => {
            if locate_row_layout(ctx, module_id, ident.as_str()) {
                ctx.mib.objects[object_id].is_table_entry_sequence = true;
                ctx.syntax_shape.insert(object_id, super::SyntaxShape::Sequence);
                return;
            }
            ctx.syntax_shape.insert(object_id, super::SyntaxShape::Other);
            match resolve_named_base(ctx, module_id, ident.as_str()) {
                Some(NamedBase::Type(type_id)) => {
                    ctx.mib.objects[object_id].ty = Some(type_id);
                }
                Some(NamedBase::Primitive(base)) => {
                    let type_id = intern_primitive_type(ctx, module_id, ident.as_str(), base);
                    ctx.mib.objects[object_id].ty = Some(type_id);
                }
                None => {
                    ctx.diag(
                        module_id,
                        codes::TYPE_UNKNOWN_BASE,
                        format!("object `{}`'s SYNTAX names unknown type `{}`", ctx.mib.objects[object_id].name, ident.as_str()),
                        TextSize::new(0),
                    );
                    ctx.unresolved(UnresolvedRefKind::Type, ident.as_str(), module_id);
                }
            }
        }
        TypeSyntax::Constrained { base, size, value_range } => {
            bind_object_syntax(ctx, object_id, module_id, base);
            if let Some(size) = size {
                ctx.mib.objects[object_id].inline_sizes = convert_constraints(size);
            }
            if let Some(value_range) = value_range {
                ctx.mib.objects[object_id].inline_value_ranges = convert_constraints(value_range);
            }
        }
        TypeSyntax::IntegerEnum(items) => {
            ctx.syntax_shape.insert(object_id, super::SyntaxShape::Other);
            let enum_values = convert_enum_items(items);
            let type_id = push_anonymous_type(ctx, module_id, BaseType::Enum, enum_values.clone(), Vec::new());
            ctx.mib.objects[object_id].ty = Some(type_id);
            ctx.mib.objects[object_id].inline_enum_values = enum_values;
        }
        TypeSyntax::Bits(items) => {
            ctx.syntax_shape.insert(object_id, super::SyntaxShape::Other);
            let bits = convert_enum_items(items);
            let type_id = push_anonymous_type(ctx, module_id, BaseType::Bits, Vec::new(), bits.clone());
            ctx.mib.objects[object_id].ty = Some(type_id);
            ctx.mib.objects[object_id].inline_bits = bits;
        }
        TypeSyntax::SequenceOf(_) => {
            ctx.syntax_shape.insert(object_id, super::SyntaxShape::SequenceOf);
        }
        TypeSyntax::Sequence(_) => {
            // Objects never carry a literal inline SEQUENCE (only a named
            // reference to one); treated the same as the named case for
            // robustness against non-conforming input.
            ctx.mib.objects[object_id].is_table_entry_sequence = true;
            ctx.syntax_shape.insert(object_id, super::SyntaxShape::Sequence);
        }
        TypeSyntax::Choice(_) => {
            ctx.syntax_shape.insert(object_id, super::SyntaxShape::Other);
        }
    }
}

fn locate_row_layout(ctx: &ResolveCtx, module_id: ModuleId, name: &str) -> bool {
    if ctx.row_layouts.contains_key(&(module_id, CompactString::from(name))) {
        return true;
    }
    let mut current_name = ctx.mib.modules[module_id].imports.get(name).cloned();
    let mut hops = 0u32;
    while let Some(from_name) = current_name.take() {
        hops += 1;
        if hops > MAX_ROW_LAYOUT_CHAIN {
            return false;
        }
        let Some(from_id) = ctx.mib.module_by_name.get(from_name.as_str()).copied() else {
            break;
        };
        if ctx.row_layouts.contains_key(&(from_id, CompactString::from(name))) {
            return true;
        }
        current_name = ctx.mib.modules[from_id].imports.get(name).cloned();
    }
    false
}

fn intern_primitive_type(ctx: &mut ResolveCtx, module_id: ModuleId, name: &str, base: BaseType) -> TypeId {
    let key = (module_id, CompactString::from(name));
    if let Some(&type_id) = ctx.primitive_types.get(&key) {
        return type_id;
    }
    let type_id = ctx.mib.types.push(Type {
        name: CompactString::from(name),
        module: module_id,
        base_type: base,
        parent: None,
        is_textual_convention: false,
        status: None,
        description: None,
        display_hint: None,
        sizes: Vec::new(),
        value_ranges: Vec::new(),
        enum_values: Vec::new(),
        bits: Vec::new(),
    });
    ctx.primitive_types.insert(key, type_id);
    type_id
}

fn push_anonymous_type(
    ctx: &mut ResolveCtx,
    module_id: ModuleId,
    base_type: BaseType,
    enum_values: Vec<EnumValue>,
    bits: Vec<EnumValue>,
) -> TypeId {
    ctx.mib.types.push(Type {
        name: CompactString::from("<inline>"),
        module: module_id,
        base_type,
        parent: None,
        is_textual_convention: false,
        status: None,
        description: None,
        display_hint: None,
        sizes: Vec::new(),
        value_ranges: Vec::new(),
        enum_values,
        bits,
    })
}
