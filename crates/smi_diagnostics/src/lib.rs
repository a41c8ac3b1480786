//! The diagnostic system: stable codes, severities, strictness-driven
//! filtering, and the `UnresolvedRef` record.
//!
//! Per the Design Notes, the code/severity catalogue is immutable data
//! compiled into the binary (a `const` table), not a runtime-built registry.

use compact_str::CompactString;
use smi_source_file::{OneIndexed, SourceCode};
use smi_text_size::TextSize;
use std::fmt;

pub mod codes;

pub use codes::{default_severity, is_known_code};

/// Severity, ordered so that `Fatal` sorts lowest ("lower is worse").
/// Filtering a diagnostic set is `severity <= level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Fatal = 0,
    Severe = 1,
    Error = 2,
    Minor = 3,
    Style = 4,
    Warning = 5,
    Info = 6,
}

impl Severity {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Fatal => "fatal",
            Severity::Severe => "severe",
            Severity::Error => "error",
            Severity::Minor => "minor",
            Severity::Style => "style",
            Severity::Warning => "warning",
            Severity::Info => "info",
        };
        f.write_str(label)
    }
}

/// A preset that expands into an emission threshold (`level`) and a
/// fail-the-load threshold (`fail_at`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Permissive,
}

impl Strictness {
    pub const fn level(self) -> Severity {
        match self {
            Strictness::Strict => Severity::Error,
            Strictness::Permissive => Severity::Minor,
        }
    }

    pub const fn fail_at(self) -> Severity {
        match self {
            Strictness::Strict => Severity::Error,
            Strictness::Permissive => Severity::Fatal,
        }
    }

    /// Whether the permissive-only "global fallback" resolution step (see
    /// resolver Phase R5) is allowed to run under this strictness preset.
    pub const fn allows_global_fallback(self) -> bool {
        matches!(self, Strictness::Permissive)
    }

    /// Severity for the `missing-<clause>` diagnostic family, per spec.md
    /// §4.2: error under strict, minor under permissive.
    pub const fn missing_clause_severity(self) -> Severity {
        match self {
            Strictness::Strict => Severity::Error,
            Strictness::Permissive => Severity::Minor,
        }
    }
}

/// Emission and failure policy for the diagnostic stream produced by a load.
#[derive(Debug, Clone)]
pub struct DiagnosticConfig {
    pub level: Severity,
    pub fail_at: Severity,
    pub ignore: rustc_hash::FxHashSet<CompactString>,
    pub only: Option<rustc_hash::FxHashSet<CompactString>>,
}

impl DiagnosticConfig {
    pub fn from_strictness(strictness: Strictness) -> Self {
        Self {
            level: strictness.level(),
            fail_at: strictness.fail_at(),
            ignore: rustc_hash::FxHashSet::default(),
            only: None,
        }
    }

    /// Whether a diagnostic with `severity` and `code` should be kept in the
    /// accumulated diagnostic stream under this configuration.
    pub fn should_emit(&self, severity: Severity, code: &str) -> bool {
        if severity > self.level {
            return false;
        }
        if self.ignore.contains(code) {
            return false;
        }
        if let Some(only) = &self.only {
            return only.contains(code);
        }
        true
    }

    pub fn meets_fail_at(&self, severity: Severity) -> bool {
        severity <= self.fail_at
    }
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self::from_strictness(Strictness::Permissive)
    }
}

/// A single structured diagnostic: a stable code, a severity, a rendered
/// message, and a resolved source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: CompactString,
    pub message: String,
    pub module: CompactString,
    pub line: OneIndexed,
    pub column: OneIndexed,
}

impl Diagnostic {
    /// Builds a diagnostic whose severity is the code's catalogued default.
    pub fn new(
        code: impl Into<CompactString>,
        message: impl Into<String>,
        module: impl Into<CompactString>,
        offset: TextSize,
        source: &SourceCode<'_>,
    ) -> Self {
        let code = code.into();
        let severity = default_severity(&code);
        Self::with_severity(severity, code, message, module, offset, source)
    }

    /// Builds a diagnostic with an explicit severity, overriding the code's
    /// catalogued default. Used for the handful of codes (the `missing-*`
    /// clause-completeness family) whose severity is strictness-dependent
    /// rather than fixed, per spec.md §4.2.
    pub fn with_severity(
        severity: Severity,
        code: impl Into<CompactString>,
        message: impl Into<String>,
        module: impl Into<CompactString>,
        offset: TextSize,
        source: &SourceCode<'_>,
    ) -> Self {
        let location = source.source_location(offset);
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            module: module.into(),
            line: location.line,
            column: location.column,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{module}:{line}:{column}: {severity} [{code}] {message}",
            module = self.module,
            line = self.line,
            column = self.column,
            severity = self.severity,
            code = self.code,
            message = self.message,
        )
    }
}

/// The kind of symbol a reference could not be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnresolvedRefKind {
    Import,
    Type,
    Object,
    Oid,
    Index,
    Notification,
}

impl fmt::Display for UnresolvedRefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UnresolvedRefKind::Import => "import",
            UnresolvedRefKind::Type => "type",
            UnresolvedRefKind::Object => "object",
            UnresolvedRefKind::Oid => "oid",
            UnresolvedRefKind::Index => "index",
            UnresolvedRefKind::Notification => "notification",
        };
        f.write_str(label)
    }
}

/// Recorded when resolution cannot bind a name reference. Never halts
/// resolution; the owning phase also emits a matching `Diagnostic`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedRef {
    pub kind: UnresolvedRefKind,
    pub symbol: CompactString,
    pub module: CompactString,
}

impl UnresolvedRef {
    pub fn new(
        kind: UnresolvedRefKind,
        symbol: impl Into<CompactString>,
        module: impl Into<CompactString>,
    ) -> Self {
        Self {
            kind,
            symbol: symbol.into(),
            module: module.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smi_source_file::LineIndex;

    #[test]
    fn severity_ordering_matches_numeric_encoding() {
        assert!(Severity::Fatal < Severity::Severe);
        assert!(Severity::Severe < Severity::Error);
        assert!(Severity::Error < Severity::Minor);
        assert!(Severity::Minor < Severity::Style);
        assert!(Severity::Style < Severity::Warning);
        assert!(Severity::Warning < Severity::Info);
        assert_eq!(Severity::Fatal.as_u8(), 0);
        assert_eq!(Severity::Info.as_u8(), 6);
    }

    #[test]
    fn strict_preset_is_error_error() {
        let config = DiagnosticConfig::from_strictness(Strictness::Strict);
        assert_eq!(config.level, Severity::Error);
        assert_eq!(config.fail_at, Severity::Error);
        assert!(!Strictness::Strict.allows_global_fallback());
    }

    #[test]
    fn missing_clause_severity_follows_strictness() {
        assert_eq!(
            Strictness::Strict.missing_clause_severity(),
            Severity::Error
        );
        assert_eq!(
            Strictness::Permissive.missing_clause_severity(),
            Severity::Minor
        );
    }

    #[test]
    fn permissive_preset_is_minor_fatal() {
        let config = DiagnosticConfig::from_strictness(Strictness::Permissive);
        assert_eq!(config.level, Severity::Minor);
        assert_eq!(config.fail_at, Severity::Fatal);
        assert!(Strictness::Permissive.allows_global_fallback());
    }

    #[test]
    fn should_emit_respects_level_and_ignore() {
        let mut config = DiagnosticConfig::from_strictness(Strictness::Permissive);
        assert!(config.should_emit(Severity::Warning, "access-legacy-write-only"));
        config
            .ignore
            .insert(CompactString::const_new("access-legacy-write-only"));
        assert!(!config.should_emit(Severity::Warning, "access-legacy-write-only"));
    }

    #[test]
    fn should_emit_respects_only_allowlist() {
        let mut config = DiagnosticConfig::from_strictness(Strictness::Permissive);
        config.only = Some(
            [CompactString::const_new("oid-cycle")]
                .into_iter()
                .collect(),
        );
        assert!(config.should_emit(Severity::Error, "oid-cycle"));
        assert!(!config.should_emit(Severity::Error, "duplicate-definition"));
    }

    #[test]
    fn diagnostic_resolves_line_and_column() {
        let text = "FOO-MIB DEFINITIONS ::= BEGIN\n    bad_name OBJECT IDENTIFIER ::= { iso 1 }\nEND\n";
        let index = LineIndex::from_source_text(text);
        let source = SourceCode::new(text, &index);
        let offset = TextSize::try_from(text.find("bad_name").unwrap()).unwrap();
        let diagnostic = Diagnostic::new(
            codes::IDENTIFIER_UNDERSCORE,
            "identifier contains an underscore",
            "FOO-MIB",
            offset,
            &source,
        );
        assert_eq!(diagnostic.severity, Severity::Style);
        assert_eq!(diagnostic.line.get(), 2);
        assert_eq!(diagnostic.column.get(), 5);
    }
}
