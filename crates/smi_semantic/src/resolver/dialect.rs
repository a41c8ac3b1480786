//! Dialect inference (spec.md §3 GLOSSARY "Dialect"): SMIv1 modules predate
//! `MODULE-IDENTITY`; any macro introduced by SMIv2 is conclusive evidence a
//! module is SMIv2, even if it also contains legacy `TRAP-TYPE` definitions
//! for backward compatibility (real-world MIBs mix both).

use crate::model::Dialect;
use smi_ast::{Definition, ModuleAst};

pub(crate) fn infer(ast: &ModuleAst) -> Dialect {
    let has_v2_marker = ast.definitions.iter().any(|def| {
        matches!(
            def,
            Definition::ModuleIdentity(_)
                | Definition::ObjectGroup(_)
                | Definition::NotificationGroup(_)
                | Definition::ModuleCompliance(_)
                | Definition::AgentCapabilities(_)
                | Definition::NotificationType(_)
                | Definition::TextualConvention(_)
        )
    });
    if has_v2_marker {
        Dialect::Smiv2
    } else {
        Dialect::Smiv1
    }
}
