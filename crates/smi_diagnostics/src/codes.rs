//! The stable diagnostic code catalogue. Codes are plain `&'static str`
//! constants rather than an enum so that the resolver and parser can build
//! the dynamic `missing-<clause>` / `duplicate-<clause>` family (spec.md
//! §4.2) by formatting a clause keyword without growing this table.

use crate::Severity;

pub const LEX_INVALID_CHAR: &str = "lex-invalid-char";
pub const IDENTIFIER_UNDERSCORE: &str = "identifier-underscore";
pub const IDENTIFIER_LENGTH_64: &str = "identifier-length-64";
pub const IDENTIFIER_HYPHEN_END: &str = "identifier-hyphen-end";
pub const IDENTIFIER_HYPHEN_DOUBLE: &str = "identifier-hyphen-double";
pub const KEYWORD_RESERVED: &str = "keyword-reserved";
pub const COMMENT_DASH_DASH: &str = "comment-dash-dash";
pub const MISSING_DEFINITIONS_BEGIN: &str = "missing-definitions-begin";
pub const DUPLICATE_DEFINITION: &str = "duplicate-definition";
pub const IMPORT_MODULE_MISSING: &str = "import-module-missing";
pub const IMPORT_SYMBOL_MISSING: &str = "import-symbol-missing";
pub const IMPORT_CHAIN_TOO_DEEP: &str = "import-chain-too-deep";
pub const MODULE_DUPLICATE_SOURCE: &str = "module-duplicate-source";
pub const OID_CYCLE: &str = "oid-cycle";
pub const OID_ARC_OVERFLOW: &str = "oid-arc-overflow";
/// SUPPLEMENT: an OID parent anchor that never resolves and is not part of
/// a cycle (genuinely missing symbol), see SPEC_FULL.md §4.4 Phase R3.
pub const OID_ANCHOR_UNRESOLVED: &str = "oid-anchor-unresolved";
pub const TYPE_CHAIN_UNRESOLVABLE: &str = "type-chain-unresolvable";
pub const TYPE_UNKNOWN_BASE: &str = "type-unknown-base";
pub const INDEX_UNRESOLVED: &str = "index-unresolved";
pub const AUGMENTS_UNRESOLVED: &str = "augments-unresolved";
pub const AUGMENTS_TARGET_NOT_ROW: &str = "augments-target-not-row";
pub const DEFVAL_TYPE_MISMATCH: &str = "defval-type-mismatch";
pub const ACCESS_LEGACY_WRITE_ONLY: &str = "access-legacy-write-only";
pub const ROW_MISSING_INDEX: &str = "row-missing-index";
pub const RESOLUTION_GLOBAL_FALLBACK: &str = "resolution-global-fallback";
pub const LOAD_CANCELLED: &str = "load-cancelled";
pub const SOURCE_IO: &str = "source-io";
/// SUPPLEMENT: emitted (info) when a legacy SMIv1 `EXPORTS` clause is parsed
/// and ignored, see SPEC_FULL.md §4.2.
pub const EXPORTS_CLAUSE_IGNORED: &str = "exports-clause-ignored";

/// Fixed-severity entries. The `missing-*` and `duplicate-*` families are
/// handled separately by [`default_severity`] because their code string is
/// built dynamically from a clause keyword (`missing-description`,
/// `duplicate-index`, ...).
const CATALOGUE: &[(&str, Severity)] = &[
    (LEX_INVALID_CHAR, Severity::Error),
    (IDENTIFIER_UNDERSCORE, Severity::Style),
    (IDENTIFIER_LENGTH_64, Severity::Minor),
    (IDENTIFIER_HYPHEN_END, Severity::Error),
    (IDENTIFIER_HYPHEN_DOUBLE, Severity::Error),
    (KEYWORD_RESERVED, Severity::Error),
    (COMMENT_DASH_DASH, Severity::Style),
    (MISSING_DEFINITIONS_BEGIN, Severity::Error),
    (DUPLICATE_DEFINITION, Severity::Error),
    (IMPORT_MODULE_MISSING, Severity::Error),
    (IMPORT_SYMBOL_MISSING, Severity::Error),
    (IMPORT_CHAIN_TOO_DEEP, Severity::Error),
    (MODULE_DUPLICATE_SOURCE, Severity::Info),
    (OID_CYCLE, Severity::Error),
    (OID_ARC_OVERFLOW, Severity::Error),
    (TYPE_CHAIN_UNRESOLVABLE, Severity::Error),
    (TYPE_UNKNOWN_BASE, Severity::Error),
    (INDEX_UNRESOLVED, Severity::Error),
    (AUGMENTS_UNRESOLVED, Severity::Error),
    (AUGMENTS_TARGET_NOT_ROW, Severity::Error),
    (DEFVAL_TYPE_MISMATCH, Severity::Error),
    (ACCESS_LEGACY_WRITE_ONLY, Severity::Warning),
    (ROW_MISSING_INDEX, Severity::Error),
    (RESOLUTION_GLOBAL_FALLBACK, Severity::Info),
    (LOAD_CANCELLED, Severity::Fatal),
    (SOURCE_IO, Severity::Severe),
    (EXPORTS_CLAUSE_IGNORED, Severity::Info),
];

/// The catalogued default severity for `code`.
///
/// For the `missing-<clause>` family this returns the *strict-mode* default
/// (`Error`); callers in permissive mode construct the diagnostic with
/// [`crate::Diagnostic::with_severity`] and `Severity::Minor` instead, per
/// spec.md §4.2's "severity error in strict mode, minor in permissive".
pub fn default_severity(code: &str) -> Severity {
    if let Some((_, severity)) = CATALOGUE.iter().find(|(entry, _)| *entry == code) {
        return *severity;
    }
    if code.starts_with("missing-") {
        return Severity::Error;
    }
    if code.starts_with("duplicate-") {
        return Severity::Error;
    }
    Severity::Error
}

/// Whether `code` is a recognized stable diagnostic code (fixed or in the
/// dynamic `missing-*`/`duplicate-*` families).
pub fn is_known_code(code: &str) -> bool {
    CATALOGUE.iter().any(|(entry, _)| *entry == code)
        || code.starts_with("missing-")
        || code.starts_with("duplicate-")
}

/// Builds the dynamic code for a missing required clause, e.g.
/// `missing-description`.
pub fn missing_clause(clause: &str) -> String {
    format!("missing-{clause}")
}

/// Builds the dynamic code for a duplicated clause, e.g. `duplicate-index`.
pub fn duplicate_clause(clause: &str) -> String {
    format!("duplicate-{clause}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_codes_have_stable_severities() {
        assert_eq!(default_severity(OID_CYCLE), Severity::Error);
        assert_eq!(default_severity(LOAD_CANCELLED), Severity::Fatal);
        assert_eq!(default_severity(RESOLUTION_GLOBAL_FALLBACK), Severity::Info);
    }

    #[test]
    fn dynamic_missing_clause_defaults_to_error() {
        let code = missing_clause("description");
        assert_eq!(code, "missing-description");
        assert_eq!(default_severity(&code), Severity::Error);
        assert!(is_known_code(&code));
    }

    #[test]
    fn dynamic_duplicate_clause_is_error() {
        let code = duplicate_clause("index");
        assert_eq!(default_severity(&code), Severity::Error);
    }

    #[test]
    fn unknown_code_is_not_known() {
        assert!(!is_known_code("not-a-real-code"));
    }
}
