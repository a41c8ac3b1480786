//! [`Source`]: the abstract byte provider the Loader reads modules from
//! (spec.md §6). Kept pure — no filesystem detail lives here; a directory
//! walker is an external collaborator, out of scope for the core (spec.md
//! §1).

use compact_str::CompactString;
use std::fmt;

/// Failure modes a [`Source`] implementation can report. The only place the
/// core raises a genuine `Result` error rather than a diagnostic
/// (SPEC_FULL.md §6, spec.md §7 "I/O / Source").
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("module `{0}` not found")]
    NotFound(CompactString),
    #[error("I/O error reading module `{module}`: {message}")]
    Io { module: CompactString, message: String },
}

/// An abstract byte provider keyed by module name (spec.md §6).
pub trait Source {
    /// Enumerates available modules without reading their content.
    fn list_modules(&self) -> Vec<CompactString>;

    /// Yields the raw text and a canonical path for `module_name`.
    fn open(&self, module_name: &str) -> Result<(String, CompactString), SourceError>;
}

/// An in-memory [`Source`] keyed by module name, used by tests and by any
/// embedding caller that already has module text in memory (SPEC_FULL.md
/// §4.3).
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    modules: Vec<(CompactString, String)>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, name: impl Into<CompactString>, text: impl Into<String>) -> Self {
        self.modules.push((name.into(), text.into()));
        self
    }

    pub fn insert(&mut self, name: impl Into<CompactString>, text: impl Into<String>) {
        self.modules.push((name.into(), text.into()));
    }
}

impl Source for MapSource {
    fn list_modules(&self) -> Vec<CompactString> {
        self.modules.iter().map(|(name, _)| name.clone()).collect()
    }

    fn open(&self, module_name: &str) -> Result<(String, CompactString), SourceError> {
        self.modules
            .iter()
            .find(|(name, _)| name.as_str() == module_name)
            .map(|(name, text)| (text.clone(), name.clone()))
            .ok_or_else(|| SourceError::NotFound(module_name.into()))
    }
}

/// Concatenates several [`Source`]s with deterministic precedence: earlier
/// sources in the list win ties on module name (spec.md §6). Duplicate
/// candidates are reported by the Loader via `module-duplicate-source`, not
/// here — this type only decides which bytes to hand back.
pub struct MultiSource {
    sources: Vec<Box<dyn Source>>,
}

impl fmt::Debug for MultiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiSource")
            .field("sources", &self.sources.len())
            .finish()
    }
}

impl MultiSource {
    pub fn new(sources: Vec<Box<dyn Source>>) -> Self {
        Self { sources }
    }

    /// All (source_index, canonical_path) candidates for `module_name`,
    /// in source precedence order. Used by the Loader to emit
    /// `module-duplicate-source` for every candidate after the first.
    pub fn candidates(&self, module_name: &str) -> Vec<(usize, CompactString)> {
        self.sources
            .iter()
            .enumerate()
            .filter_map(|(i, source)| {
                source
                    .open(module_name)
                    .ok()
                    .map(|(_, path)| (i, path))
            })
            .collect()
    }
}

impl Source for MultiSource {
    fn list_modules(&self) -> Vec<CompactString> {
        let mut seen = rustc_hash::FxHashSet::default();
        let mut names = Vec::new();
        for source in &self.sources {
            for name in source.list_modules() {
                if seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn open(&self, module_name: &str) -> Result<(String, CompactString), SourceError> {
        for source in &self.sources {
            if let Ok(result) = source.open(module_name) {
                return Ok(result);
            }
        }
        Err(SourceError::NotFound(module_name.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn map_source_opens_inserted_module() {
        let source = MapSource::new().with_module("FOO-MIB", "text");
        let (text, path) = source.open("FOO-MIB").unwrap();
        assert_eq!(text, "text");
        assert_eq!(path, "FOO-MIB");
    }

    #[test]
    fn map_source_reports_not_found() {
        let source = MapSource::new();
        assert!(matches!(source.open("MISSING"), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn multi_source_prefers_earlier_source_on_conflict() {
        let a = MapSource::new().with_module("FOO-MIB", "first");
        let b = MapSource::new().with_module("FOO-MIB", "second");
        let multi = MultiSource::new(vec![Box::new(a), Box::new(b)]);
        let (text, _) = multi.open("FOO-MIB").unwrap();
        assert_eq!(text, "first");
        assert_eq!(multi.candidates("FOO-MIB").len(), 2);
    }

    #[test]
    fn multi_source_lists_union_of_modules_deduplicated() {
        let a = MapSource::new().with_module("FOO-MIB", "1");
        let b = MapSource::new().with_module("FOO-MIB", "2").with_module("BAR-MIB", "3");
        let multi = MultiSource::new(vec![Box::new(a), Box::new(b)]);
        let mut names: Vec<_> = multi.list_modules().into_iter().map(|n| n.to_string()).collect();
        names.sort();
        assert_eq!(names, vec!["BAR-MIB", "FOO-MIB"]);
    }
}
