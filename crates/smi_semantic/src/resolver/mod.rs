//! The Resolver (spec.md §4.4): seven ordered, idempotent phases that turn
//! a `Vec<LoadedModule>` of parsed ASTs into a queryable [`crate::mib::Mib`].
//!
//! Phases run strictly in order and each is allowed to assume every earlier
//! phase has already completed for every module (not just the one it is
//! currently looking at) — e.g. Phase R4 can resolve a `SYNTAX` reference
//! into another module's type because Phase R1 has already interned every
//! module's definitions before R4 starts on any of them.

mod dialect;
mod names;
mod r1_intern;
mod r2_imports;
mod r3_oid_tree;
mod r4_types;
mod r5_references;
mod r6_kinds;
mod r7_enrich;

use crate::cancel::CancellationToken;
use crate::ids::ModuleId;
use crate::loader::LoadedModule;
use crate::mib::Mib;
use crate::trace::TraceSink;
use compact_str::CompactString;
use rustc_hash::FxHashMap;
use smi_ast::SequenceField;
use smi_diagnostics::{codes, Diagnostic, DiagnosticConfig, Severity, Strictness, UnresolvedRef, UnresolvedRefKind};
use smi_source_file::{LineIndex, SourceCode};
use smi_text_size::TextSize;

pub(crate) fn convert_status(status: smi_ast::StatusAst) -> crate::model::object::Status {
    use crate::model::object::Status;
    match status {
        smi_ast::StatusAst::Current => Status::Current,
        smi_ast::StatusAst::Deprecated => Status::Deprecated,
        smi_ast::StatusAst::Obsolete => Status::Obsolete,
        smi_ast::StatusAst::Mandatory => Status::Mandatory,
        smi_ast::StatusAst::Optional => Status::Optional,
    }
}

pub(crate) fn convert_access(access: smi_ast::AccessAst) -> crate::model::object::Access {
    use crate::model::object::Access;
    match access {
        smi_ast::AccessAst::NotAccessible => Access::NotAccessible,
        smi_ast::AccessAst::AccessibleForNotify => Access::AccessibleForNotify,
        smi_ast::AccessAst::ReadOnly => Access::ReadOnly,
        smi_ast::AccessAst::ReadWrite => Access::ReadWrite,
        smi_ast::AccessAst::ReadCreate => Access::ReadCreate,
        smi_ast::AccessAst::WriteOnly => Access::WriteOnly,
    }
}

/// A structural `SEQUENCE { ... }` row layout, kept aside during resolution
/// (spec.md §4.2 "not part of the externally visible model") so Phase R4 can
/// recognize table/row `SYNTAX` references without re-parsing anything.
pub(crate) struct RowLayout {
    pub fields: Vec<SequenceField>,
}

/// The shape a definition's `SYNTAX` clause had in source, retained across
/// the R4/R6 phase boundary instead of re-deriving it from the bound `Type`
/// (SEQUENCE never becomes a `Type` at all, so there is nothing to re-derive
/// it from).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SyntaxShape {
    /// `SYNTAX SEQUENCE OF <entry-type>` — a conceptual table.
    SequenceOf,
    /// `SYNTAX <entry-type>` where `<entry-type>` is a structural `SEQUENCE`
    /// — a conceptual row.
    Sequence,
    Other,
}

/// Resolver-local mutable state threaded through every phase. Dropped once
/// [`resolve`] returns; nothing here survives into the finished `Mib`.
pub(crate) struct ResolveCtx<'a> {
    pub mib: Mib,
    pub loaded: Vec<LoadedModule>,
    pub module_ids: Vec<ModuleId>,
    pub module_index: FxHashMap<ModuleId, usize>,
    pub strictness: Strictness,
    pub config: DiagnosticConfig,
    pub cancellation: CancellationToken,
    pub logger: Option<&'a dyn TraceSink>,
    pub row_layouts: FxHashMap<(ModuleId, CompactString), RowLayout>,
    pub syntax_shape: FxHashMap<crate::ids::ObjectId, SyntaxShape>,
    pub primitive_types: FxHashMap<(ModuleId, CompactString), crate::ids::TypeId>,
    /// Objects whose source declared an `INDEX` or `AUGMENTS` clause,
    /// recorded in Phase R5 regardless of whether the clause's names
    /// actually resolved. Phase R6 classifies `Kind::Row` off this set
    /// rather than the post-resolution `index`/`augments` fields, so a row
    /// whose sole `AUGMENTS` target turned out to be unresolvable is still
    /// classified `Row` (and can still earn `row-missing-index`) instead of
    /// silently falling back to `Kind::Node`.
    pub row_declared: rustc_hash::FxHashSet<crate::ids::ObjectId>,
}

impl<'a> ResolveCtx<'a> {
    fn module_idx(&self, module_id: ModuleId) -> usize {
        self.module_index[&module_id]
    }

    fn source_for(&self, module_idx: usize) -> SourceCode<'_> {
        let loaded = &self.loaded[module_idx];
        SourceCode::new(&loaded.text, &loaded.line_index)
    }

    fn module_name(&self, module_idx: usize) -> &str {
        self.loaded[module_idx].ast.name.as_str()
    }

    /// Pushes a diagnostic anchored at `offset` in `module_id`'s source,
    /// filtered through `self.config.should_emit`.
    pub(crate) fn diag(&mut self, module_id: ModuleId, code: &str, message: String, offset: TextSize) {
        let idx = self.module_idx(module_id);
        let source = self.source_for(idx);
        let module = self.module_name(idx).to_string();
        let diagnostic = Diagnostic::new(code, message, module, offset, &source);
        if self.config.should_emit(diagnostic.severity, &diagnostic.code) {
            self.mib.diagnostics.push(diagnostic);
        }
    }

    /// Like [`Self::diag`] but with an explicit severity, for the
    /// strictness-dependent `missing-*`/`duplicate-*` families.
    pub(crate) fn diag_with_severity(
        &mut self,
        severity: Severity,
        module_id: ModuleId,
        code: String,
        message: String,
        offset: TextSize,
    ) {
        let idx = self.module_idx(module_id);
        let source = self.source_for(idx);
        let module = self.module_name(idx).to_string();
        let diagnostic = Diagnostic::with_severity(severity, code, message, module, offset, &source);
        if self.config.should_emit(diagnostic.severity, &diagnostic.code) {
            self.mib.diagnostics.push(diagnostic);
        }
    }

    pub(crate) fn unresolved(&mut self, kind: UnresolvedRefKind, symbol: &str, module_id: ModuleId) {
        let idx = self.module_idx(module_id);
        let module = self.module_name(idx).to_string();
        self.mib.unresolved.push(UnresolvedRef::new(kind, symbol, module));
    }

    fn trace(&self, message: &str) {
        if let Some(logger) = self.logger {
            logger.trace(message);
        }
    }

    fn cancelled_now(&mut self, phase: &str) -> bool {
        if !self.cancellation.is_cancelled() {
            return false;
        }
        let (text, line_index) = (String::new(), LineIndex::from_source_text(""));
        let source = SourceCode::new(&text, &line_index);
        let diagnostic = Diagnostic::new(
            codes::LOAD_CANCELLED,
            format!("resolution cancelled before phase {phase} completed"),
            "",
            TextSize::new(0),
            &source,
        );
        self.mib.diagnostics.push(diagnostic);
        true
    }
}

/// Runs every resolver phase over `loaded` and returns the finished `Mib`.
/// Polls `cancellation` between phases (spec.md §5); on cancellation the
/// partial result accumulated so far is returned with a `load-cancelled`
/// diagnostic appended.
pub fn resolve<'a>(
    loaded: Vec<LoadedModule>,
    strictness: Strictness,
    config: DiagnosticConfig,
    cancellation: CancellationToken,
    logger: Option<&'a dyn TraceSink>,
) -> Mib {
    let mut ctx = ResolveCtx {
        mib: Mib::empty(),
        loaded,
        module_ids: Vec::new(),
        module_index: FxHashMap::default(),
        strictness,
        config,
        cancellation,
        logger,
        row_layouts: FxHashMap::default(),
        syntax_shape: FxHashMap::default(),
        primitive_types: FxHashMap::default(),
        row_declared: rustc_hash::FxHashSet::default(),
    };

    ctx.trace("resolver: phase R1 intern modules");
    r1_intern::run(&mut ctx);
    if ctx.cancelled_now("R1") {
        return ctx.mib;
    }

    ctx.trace("resolver: phase R2 resolve imports");
    r2_imports::run(&mut ctx);
    if ctx.cancelled_now("R2") {
        return ctx.mib;
    }

    ctx.trace("resolver: phase R3 build OID tree");
    r3_oid_tree::run(&mut ctx);
    if ctx.cancelled_now("R3") {
        return ctx.mib;
    }

    ctx.trace("resolver: phase R4 bind types");
    r4_types::run(&mut ctx);
    if ctx.cancelled_now("R4") {
        return ctx.mib;
    }

    ctx.trace("resolver: phase R5 bind references");
    r5_references::run(&mut ctx);
    if ctx.cancelled_now("R5") {
        return ctx.mib;
    }

    ctx.trace("resolver: phase R6 classify kinds");
    r6_kinds::run(&mut ctx);
    if ctx.cancelled_now("R6") {
        return ctx.mib;
    }

    ctx.trace("resolver: phase R7 enrich");
    r7_enrich::run(&mut ctx);

    ctx.mib
}
