//! The public façade: configure a [`LoadOption`] with [`LoadOptionsBuilder`],
//! hand it to [`load`], and get back a resolved [`Mib`] plus a [`LoadOutcome`]
//! (spec.md §6, §7). Everything else — the lexer, parser, loader, resolver,
//! and the `Mib` query surface itself — lives in `smi_parser`/`smi_semantic`
//! and is re-exported here for a caller who only depends on this crate.

use rustc_hash::FxHashSet;
use smi_diagnostics::{DiagnosticConfig, Severity, Strictness};
use smi_semantic::{CancellationToken, Source, TraceSink};

pub use smi_diagnostics::{codes, Diagnostic, DiagnosticConfig as DiagnosticSettings, Severity as DiagnosticSeverity, Strictness as LoadStrictness, UnresolvedRef, UnresolvedRefKind};
pub use smi_semantic::{
    CancellationToken as Cancellation, LoadedModule, LogTraceSink, MapSource, Mib, MultiSource,
    Oid, Source as ModuleSource, SourceError, TraceSink as Logger,
};

/// The outcome of a [`load`] call (spec.md §7): the partial `Mib` is always
/// accessible on the returned value regardless of which variant this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Ok,
    FailedAtThreshold,
    Cancelled,
}

/// Recognized configuration for a [`load`] call (spec.md §6). Built with
/// [`LoadOptionsBuilder`] rather than constructed directly, since `strictness`
/// expands into `diagnostic_config` at build time and a later explicit
/// `diagnostic_config` override should win over that expansion.
pub struct LoadOption<'a> {
    sources: MultiSource,
    modules: Option<Vec<String>>,
    diagnostic_config: DiagnosticConfig,
    strictness: Strictness,
    logger: Option<&'a dyn TraceSink>,
    cancellation: CancellationToken,
}

/// Chainable, owned builder for [`LoadOption`] (SPEC_FULL.md §6 AMBIENT
/// Configuration). `strictness` is applied first; an explicit
/// `diagnostic_config`/`ignore_codes`/`only_codes` call after it overrides
/// the preset's expansion for that field.
pub struct LoadOptionsBuilder<'a> {
    sources: Vec<Box<dyn Source>>,
    modules: Option<Vec<String>>,
    strictness: Strictness,
    diagnostic_config: Option<DiagnosticConfig>,
    logger: Option<&'a dyn TraceSink>,
    cancellation: Option<CancellationToken>,
}

impl<'a> Default for LoadOptionsBuilder<'a> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> LoadOptionsBuilder<'a> {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            modules: None,
            strictness: Strictness::Permissive,
            diagnostic_config: None,
            logger: None,
            cancellation: None,
        }
    }

    /// Adds one source, in precedence order (earlier calls win ties).
    pub fn source(mut self, source: impl Source + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Restricts the load to these root module names; absent means "load
    /// everything listable from the sources" (spec.md §6).
    pub fn modules(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.modules = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Overrides the diagnostic config wholesale, superseding whatever
    /// `strictness` would otherwise expand to.
    pub fn diagnostic_config(mut self, config: DiagnosticConfig) -> Self {
        self.diagnostic_config = Some(config);
        self
    }

    pub fn ignore_codes(mut self, codes: impl IntoIterator<Item = impl Into<compact_str::CompactString>>) -> Self {
        let config = self
            .diagnostic_config
            .get_or_insert_with(|| DiagnosticConfig::from_strictness(self.strictness));
        config.ignore.extend(codes.into_iter().map(Into::into));
        self
    }

    pub fn only_codes(mut self, codes: impl IntoIterator<Item = impl Into<compact_str::CompactString>>) -> Self {
        let config = self
            .diagnostic_config
            .get_or_insert_with(|| DiagnosticConfig::from_strictness(self.strictness));
        let set: FxHashSet<_> = codes.into_iter().map(Into::into).collect();
        config.only = Some(set);
        self
    }

    pub fn logger(mut self, logger: &'a dyn TraceSink) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = Some(cancellation);
        self
    }

    pub fn build(self) -> LoadOption<'a> {
        let strictness = self.strictness;
        LoadOption {
            sources: MultiSource::new(self.sources),
            modules: self.modules,
            diagnostic_config: self
                .diagnostic_config
                .unwrap_or_else(|| DiagnosticConfig::from_strictness(strictness)),
            strictness,
            logger: self.logger,
            cancellation: self.cancellation.unwrap_or_default(),
        }
    }
}

/// Drives the Loader and Resolver to a finished [`Mib`] (spec.md §4.3–§4.5).
/// Always returns a usable `Mib`, even on [`LoadOutcome::FailedAtThreshold`]
/// or [`LoadOutcome::Cancelled`] — callers may inspect diagnostics and
/// whatever was resolved before the outcome was decided (spec.md §7).
pub fn load(option: LoadOption<'_>) -> (Mib, LoadOutcome) {
    log::debug!("smi: load starting");
    let roots = option.modules.as_deref();
    let load_result = smi_semantic::load_modules(
        &option.sources,
        roots,
        option.strictness,
        &option.diagnostic_config,
        &option.cancellation,
        option.logger,
    );

    if load_result.cancelled {
        log::debug!("smi: load cancelled during module loading");
        let mut mib = smi_semantic::resolve(
            Vec::new(),
            option.strictness,
            option.diagnostic_config.clone(),
            option.cancellation.clone(),
            option.logger,
        );
        mib.merge_loader_diagnostics(load_result.diagnostics, &option.diagnostic_config);
        return (mib, LoadOutcome::Cancelled);
    }

    let mut mib = smi_semantic::resolve(
        load_result.modules,
        option.strictness,
        option.diagnostic_config.clone(),
        option.cancellation.clone(),
        option.logger,
    );
    mib.merge_loader_diagnostics(load_result.diagnostics, &option.diagnostic_config);
    log::debug!("smi: load finished with {} diagnostics", mib.diagnostics().len());

    if option.cancellation.is_cancelled() {
        return (mib, LoadOutcome::Cancelled);
    }
    let worst = mib.diagnostics().iter().map(|d| d.severity).min();
    let outcome = match worst {
        Some(severity) if option.diagnostic_config.meets_fail_at(severity) => LoadOutcome::FailedAtThreshold,
        _ => LoadOutcome::Ok,
    };
    (mib, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn source_with(name: &str, text: &str) -> MapSource {
        MapSource::new().with_module(name, text)
    }

    #[test]
    fn builder_strictness_expands_diagnostic_config() {
        let option = LoadOptionsBuilder::new()
            .source(source_with("A-MIB", "A-MIB DEFINITIONS ::= BEGIN\nEND"))
            .strictness(Strictness::Strict)
            .build();
        assert_eq!(option.diagnostic_config.level, Severity::Error);
        assert_eq!(option.diagnostic_config.fail_at, Severity::Error);
    }

    #[test]
    fn explicit_diagnostic_config_overrides_strictness_preset() {
        let mut custom = DiagnosticConfig::from_strictness(Strictness::Strict);
        custom.level = Severity::Info;
        let option = LoadOptionsBuilder::new()
            .source(source_with("A-MIB", "A-MIB DEFINITIONS ::= BEGIN\nEND"))
            .strictness(Strictness::Strict)
            .diagnostic_config(custom)
            .build();
        assert_eq!(option.diagnostic_config.level, Severity::Info);
    }

    #[test]
    fn load_resolves_a_simple_module() {
        let text = "A-MIB DEFINITIONS ::= BEGIN\naObj OBJECT IDENTIFIER ::= { iso 1 }\nEND";
        let option = LoadOptionsBuilder::new().source(source_with("A-MIB", text)).build();
        let (mib, outcome) = load(option);
        assert_eq!(outcome, LoadOutcome::Ok);
        assert!(mib.object("aObj").is_some());
    }

    #[test]
    fn load_reports_cancelled_outcome() {
        let text = "A-MIB DEFINITIONS ::= BEGIN\naObj OBJECT IDENTIFIER ::= { iso 1 }\nEND";
        let cancellation = CancellationToken::new();
        cancellation.cancel();
        let option = LoadOptionsBuilder::new()
            .source(source_with("A-MIB", text))
            .cancellation(cancellation)
            .build();
        let (_, outcome) = load(option);
        assert_eq!(outcome, LoadOutcome::Cancelled);
    }
}
