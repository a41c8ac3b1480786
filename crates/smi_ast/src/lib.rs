//! Parse-tree types produced by `smi_parser`.
//!
//! Every node keeps its [`smi_text_size::TextRange`] so that later phases can
//! attach diagnostics back to source. Nothing in this crate resolves
//! references or validates semantics; it is a plain tree shape.

mod ident;
mod module;
mod oid;
mod ty;

pub use ident::Ident;
pub use module::{
    AccessAst, AgentCapabilitiesAst, ComplianceModuleAst, Definition, ImportAst, IndexColumnAst,
    ModuleAst, ModuleComplianceAst, ModuleIdentityAst, NotificationGroupAst, NotificationTypeAst,
    ObjectGroupAst, ObjectIdentityAst, ObjectTypeAst, RevisionAst, StatusAst, SupportsModuleAst,
    TextualConventionAst, TrapTypeAst, TypeAssignmentAst, ValueAssignmentAst,
};
pub use oid::{ObjectIdValueAst, OidComponent};
pub use ty::{ConstraintList, ConstraintRange, DefValAst, EnumItem, SequenceField, TypeSyntax};

#[cfg(test)]
mod tests {
    use super::*;
    use smi_text_size::TextRange;

    fn range() -> TextRange {
        TextRange::new(0.into(), 1.into())
    }

    #[test]
    fn definition_name_dispatches_through_every_variant() {
        let ident = Ident::new("sysDescr", range());
        let value = ObjectIdValueAst {
            components: vec![OidComponent::Number(1)],
            range: range(),
        };
        let def = Definition::ObjectIdentity(ObjectIdentityAst {
            name: ident.clone(),
            status: Some(StatusAst::Current),
            description: None,
            reference: None,
            value,
            range: range(),
        });
        assert_eq!(def.name().as_str(), "sysDescr");
    }

    #[test]
    fn imported_module_names_deduplicates_in_order() {
        let module = ModuleAst {
            name: Ident::new("MY-MIB", range()),
            imports: vec![
                ImportAst {
                    symbols: vec![Ident::new("OBJECT-TYPE", range())],
                    from_module: Ident::new("SNMPv2-SMI", range()),
                    range: range(),
                },
                ImportAst {
                    symbols: vec![Ident::new("DisplayString", range())],
                    from_module: Ident::new("SNMPv2-TC", range()),
                    range: range(),
                },
                ImportAst {
                    symbols: vec![Ident::new("MODULE-COMPLIANCE", range())],
                    from_module: Ident::new("SNMPv2-SMI", range()),
                    range: range(),
                },
            ],
            exports_present: false,
            definitions: vec![],
        };
        let names: Vec<&str> = module
            .imported_module_names()
            .iter()
            .map(|i| i.as_str())
            .collect();
        assert_eq!(names, vec!["SNMPv2-SMI", "SNMPv2-TC"]);
    }

    #[test]
    fn type_syntax_named_reference_sees_through_constraints() {
        let base = TypeSyntax::Named(Ident::new("Integer32", range()));
        let constrained = TypeSyntax::Constrained {
            base: Box::new(base),
            size: None,
            value_range: Some(vec![ConstraintRange { min: 0, max: 63 }]),
        };
        assert_eq!(
            constrained.named_reference().map(Ident::as_str),
            Some("Integer32")
        );
    }
}
