use crate::{DefValAst, Ident, ObjectIdValueAst, TypeSyntax};
use smi_text_size::TextRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAst {
    Current,
    Deprecated,
    Obsolete,
    Mandatory,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAst {
    NotAccessible,
    AccessibleForNotify,
    ReadOnly,
    ReadWrite,
    ReadCreate,
    /// Legacy SMIv1 keyword; accepted with `access-legacy-write-only`
    /// (spec.md §4.2).
    WriteOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportAst {
    pub symbols: Vec<Ident>,
    pub from_module: Ident,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionAst {
    pub date: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueAssignmentAst {
    pub name: Ident,
    pub value: ObjectIdValueAst,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAssignmentAst {
    pub name: Ident,
    pub syntax: TypeSyntax,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextualConventionAst {
    pub name: Ident,
    pub display_hint: Option<String>,
    pub status: Option<StatusAst>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub syntax: TypeSyntax,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumnAst {
    pub implied: bool,
    pub name: Ident,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTypeAst {
    pub name: Ident,
    pub syntax: TypeSyntax,
    pub units: Option<String>,
    pub access: Option<AccessAst>,
    pub status: Option<StatusAst>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub index: Option<Vec<IndexColumnAst>>,
    pub augments: Option<Ident>,
    pub defval: Option<DefValAst>,
    pub value: ObjectIdValueAst,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectIdentityAst {
    pub name: Ident,
    pub status: Option<StatusAst>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub value: ObjectIdValueAst,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleIdentityAst {
    pub name: Ident,
    pub last_updated: Option<String>,
    pub organization: Option<String>,
    pub contact_info: Option<String>,
    pub description: Option<String>,
    pub revisions: Vec<RevisionAst>,
    pub value: ObjectIdValueAst,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTypeAst {
    pub name: Ident,
    pub objects: Vec<Ident>,
    pub status: Option<StatusAst>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub value: ObjectIdValueAst,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrapTypeAst {
    pub name: Ident,
    pub enterprise: Ident,
    pub variables: Vec<Ident>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub specific_trap_number: u32,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectGroupAst {
    pub name: Ident,
    pub objects: Vec<Ident>,
    pub status: Option<StatusAst>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub value: ObjectIdValueAst,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationGroupAst {
    pub name: Ident,
    pub notifications: Vec<Ident>,
    pub status: Option<StatusAst>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub value: ObjectIdValueAst,
    pub range: TextRange,
}

/// One `MODULE [module-name] MANDATORY-GROUPS {...} GROUP ... / OBJECT ...`
/// clause inside a `MODULE-COMPLIANCE` macro.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplianceModuleAst {
    pub module_name: Option<Ident>,
    pub mandatory_groups: Vec<Ident>,
    /// Names pulled in via `GROUP x` or `OBJECT x` refinement lines. Object
    /// refinement syntax details (`SYNTAX`, `WRITE-SYNTAX`, `MIN-ACCESS`) are
    /// parsed and discarded: spec.md §3 only requires member lists.
    pub members: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleComplianceAst {
    pub name: Ident,
    pub status: Option<StatusAst>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub modules: Vec<ComplianceModuleAst>,
    pub value: ObjectIdValueAst,
    pub range: TextRange,
}

/// One `SUPPORTS module-name INCLUDES {...}` clause inside
/// `AGENT-CAPABILITIES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportsModuleAst {
    pub module_name: Ident,
    pub includes: Vec<Ident>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCapabilitiesAst {
    pub name: Ident,
    pub product_release: Option<String>,
    pub status: Option<StatusAst>,
    pub description: Option<String>,
    pub reference: Option<String>,
    pub supports: Vec<SupportsModuleAst>,
    pub value: ObjectIdValueAst,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Value(ValueAssignmentAst),
    Type(TypeAssignmentAst),
    TextualConvention(TextualConventionAst),
    ObjectType(ObjectTypeAst),
    ObjectIdentity(ObjectIdentityAst),
    ModuleIdentity(ModuleIdentityAst),
    NotificationType(NotificationTypeAst),
    TrapType(TrapTypeAst),
    ObjectGroup(ObjectGroupAst),
    NotificationGroup(NotificationGroupAst),
    ModuleCompliance(ModuleComplianceAst),
    AgentCapabilities(AgentCapabilitiesAst),
}

impl Definition {
    pub fn name(&self) -> &Ident {
        match self {
            Definition::Value(d) => &d.name,
            Definition::Type(d) => &d.name,
            Definition::TextualConvention(d) => &d.name,
            Definition::ObjectType(d) => &d.name,
            Definition::ObjectIdentity(d) => &d.name,
            Definition::ModuleIdentity(d) => &d.name,
            Definition::NotificationType(d) => &d.name,
            Definition::TrapType(d) => &d.name,
            Definition::ObjectGroup(d) => &d.name,
            Definition::NotificationGroup(d) => &d.name,
            Definition::ModuleCompliance(d) => &d.name,
            Definition::AgentCapabilities(d) => &d.name,
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            Definition::Value(d) => d.range,
            Definition::Type(d) => d.range,
            Definition::TextualConvention(d) => d.range,
            Definition::ObjectType(d) => d.range,
            Definition::ObjectIdentity(d) => d.range,
            Definition::ModuleIdentity(d) => d.range,
            Definition::NotificationType(d) => d.range,
            Definition::TrapType(d) => d.range,
            Definition::ObjectGroup(d) => d.range,
            Definition::NotificationGroup(d) => d.range,
            Definition::ModuleCompliance(d) => d.range,
            Definition::AgentCapabilities(d) => d.range,
        }
    }
}

/// The AST produced for one parsed module, spanning `<IDENT> DEFINITIONS ::=
/// BEGIN ... END` (spec.md §4.2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleAst {
    pub name: Ident,
    pub imports: Vec<ImportAst>,
    /// `true` if a legacy SMIv1 `EXPORTS` clause was present. Parsed and
    /// tolerated, never used for symbol binding (SPEC_FULL.md §4.2).
    pub exports_present: bool,
    pub definitions: Vec<Definition>,
}

impl ModuleAst {
    /// Every module name referenced in an `IMPORTS ... FROM X` clause,
    /// deduplicated, in first-appearance order. Used by the Loader to
    /// discover transitive dependencies (spec.md §4.3).
    pub fn imported_module_names(&self) -> Vec<&Ident> {
        let mut seen = std::collections::HashSet::new();
        let mut names = Vec::new();
        for import in &self.imports {
            if seen.insert(import.from_module.as_str()) {
                names.push(&import.from_module);
            }
        }
        names
    }
}
