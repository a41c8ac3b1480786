//! Phase R6 (spec.md §4.4): classify every node's [`Kind`] and settle the
//! module-preference rule for nodes shared by more than one module.
//!
//! Two independent sub-steps: first every node's `bindings` list is sorted
//! into preference order (so `bindings[0]` is the primary module, spec.md
//! §4.4 "module preference rule"), then the tree is walked top-down so a
//! node's classification can consult its already-classified parent (needed
//! for the `column` rule, which depends on the parent being a `row`).

use super::ResolveCtx;
use crate::ids::{ModuleId, NodeId, ObjectId};
use crate::model::node::{Attachment, Kind};
use crate::model::object::Access;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;

pub(super) fn run(ctx: &mut ResolveCtx) {
    reorder_bindings_by_preference(ctx);
    classify_tree(ctx);
}

/// Sorts each node's bindings by (dialect precedence descending, then
/// definition file order ascending) so `bindings.first()` is always the
/// primary module per spec.md §4.4. Every module's own `Object`/etc. record
/// stays reachable by name regardless of this order — only `Node::module()`
/// (via `primary_module`) is affected.
fn reorder_bindings_by_preference(ctx: &mut ResolveCtx) {
    let mut preference: FxHashMap<ModuleId, (u8, usize)> = FxHashMap::default();
    for (file_order, &module_id) in ctx.module_ids.iter().enumerate() {
        let precedence = ctx.mib.modules[module_id].dialect.precedence();
        preference.insert(module_id, (precedence, file_order));
    }
    for node in ctx.mib.nodes.iter_mut() {
        if node.bindings.len() <= 1 {
            continue;
        }
        node.bindings.sort_by(|a, b| {
            let (prec_a, file_a) = preference[&a.module];
            let (prec_b, file_b) = preference[&b.module];
            prec_b.cmp(&prec_a).then(file_a.cmp(&file_b))
        });
    }
}

/// Walks the tree from the root (already `Internal`) so every node's parent
/// has a final `Kind` by the time the node itself is classified.
fn classify_tree(ctx: &mut ResolveCtx) {
    let root = ctx.mib.root;
    let mut queue: VecDeque<NodeId> = ctx.mib.nodes[root].children().to_vec().into();
    while let Some(node_id) = queue.pop_front() {
        let parent_kind = ctx.mib.nodes[node_id]
            .parent
            .map(|parent_id| ctx.mib.nodes[parent_id].kind);
        let kind = classify_node(ctx, node_id, parent_kind);
        ctx.mib.nodes[node_id].kind = kind;
        queue.extend(ctx.mib.nodes[node_id].children().iter().copied());
    }
}

fn classify_node(ctx: &mut ResolveCtx, node_id: NodeId, parent_kind: Option<Kind>) -> Kind {
    let Some(binding) = ctx.mib.nodes[node_id].bindings.first().copied() else {
        return Kind::Internal;
    };
    match binding.attachment {
        Attachment::Object(object_id) => classify_object(ctx, object_id, parent_kind),
        Attachment::Notification(_) => Kind::Notification,
        Attachment::Group(_) => Kind::Group,
        Attachment::Compliance(_) => Kind::Compliance,
        Attachment::Capabilities(_) => Kind::Capabilities,
    }
}

fn classify_object(ctx: &ResolveCtx, object_id: ObjectId, parent_kind: Option<Kind>) -> Kind {
    let object = &ctx.mib.objects[object_id];
    let shape = ctx.syntax_shape.get(&object_id).copied();
    if shape == Some(super::SyntaxShape::SequenceOf) {
        return Kind::Table;
    }
    let has_index_or_augments = ctx.row_declared.contains(&object_id);
    let row_shaped = shape == Some(super::SyntaxShape::Sequence) || parent_kind == Some(Kind::Table);
    if has_index_or_augments && row_shaped {
        return Kind::Row;
    }
    if parent_kind == Some(Kind::Row) {
        return Kind::Column;
    }
    match object.access {
        Some(access) if access != Access::NotAccessible => Kind::Scalar,
        _ => Kind::Node,
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

    const TABLE_MIB: &str = r#"
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
END
"#;

    #[test]
    fn classifies_table_row_and_column() {
        let mib = resolve_single(TABLE_MIB);
        let table = mib.object("syntheticSimpleTable").unwrap();
        assert_eq!(mib.get_node(table.node).kind, Kind::Table);
        let row = mib.object("syntheticSimpleEntry").unwrap();
        assert_eq!(mib.get_node(row.node).kind, Kind::Row);
        let column = mib.object("syntheticSimpleIndex").unwrap();
        assert_eq!(mib.get_node(column.node).kind, Kind::Column);
    }

    const SCALAR_MIB: &str = r#"
SYNTHETIC-MIB DEFINITIONS ::= BEGIN
syntheticMIB OBJECT IDENTIFIER ::= { iso 999 }
syntheticScalar OBJECT-TYPE
    SYNTAX Unsigned32
    MAX-ACCESS read-only
    STATUS current
    DESCRIPTION "scalar"
    ::= { syntheticMIB 1 }
END
"#;

    #[test]
    fn classifies_plain_object_as_scalar() {
        let mib = resolve_single(SCALAR_MIB);
        let object = mib.object("syntheticScalar").unwrap();
        assert_eq!(mib.get_node(object.node).kind, Kind::Scalar);
    }
}
