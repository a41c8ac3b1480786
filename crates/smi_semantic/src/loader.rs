//! The Loader (spec.md §4.3): drives parsing from a root set of module
//! names out to every transitive import.

use crate::cancel::CancellationToken;
use crate::source::{MultiSource, Source};
use crate::trace::TraceSink;
use compact_str::CompactString;
use rustc_hash::FxHashSet;
use smi_ast::ModuleAst;
use smi_diagnostics::{codes, Diagnostic, DiagnosticConfig, Strictness};
use smi_source_file::{LineIndex, SourceCode};
use smi_text_size::TextSize;
use std::collections::VecDeque;

/// One successfully parsed module: its AST plus the owned source text and
/// line index the resolver needs to keep emitting diagnostics against the
/// original byte offsets.
pub struct LoadedModule {
    pub ast: ModuleAst,
    pub text: String,
    pub line_index: LineIndex,
}

/// The outcome of driving the Loader to a fixed point.
pub struct LoadResult {
    pub modules: Vec<LoadedModule>,
    pub diagnostics: Vec<Diagnostic>,
    pub cancelled: bool,
}

/// Runs the Loader's work-queue algorithm (spec.md §4.3): parse every
/// requested root module, then every module transitively named in an
/// `IMPORTS ... FROM` clause, until the queue empties or cancellation is
/// observed. A name is parsed at most once even if multiple modules import
/// it (cycle tolerance).
pub fn load_modules(
    sources: &MultiSource,
    roots: Option<&[String]>,
    strictness: Strictness,
    config: &DiagnosticConfig,
    cancellation: &CancellationToken,
    logger: Option<&dyn TraceSink>,
) -> LoadResult {
    let mut queue: VecDeque<CompactString> = match roots {
        Some(names) => names.iter().map(CompactString::from).collect(),
        None => sources.list_modules().into_iter().collect(),
    };
    let mut seen: FxHashSet<CompactString> = FxHashSet::default();
    let mut modules = Vec::new();
    let mut diagnostics = Vec::new();

    while let Some(name) = queue.pop_front() {
        if cancellation.is_cancelled() {
            diagnostics.push(cancelled_diagnostic(&name));
            return LoadResult {
                modules,
                diagnostics,
                cancelled: true,
            };
        }
        if !seen.insert(name.clone()) {
            continue;
        }
        if let Some(logger) = logger {
            logger.trace(&format!("loader: parsing {name}"));
        }

        let candidates = sources.candidates(&name);
        for (_, path) in candidates.iter().skip(1) {
            diagnostics.push(duplicate_source_diagnostic(&name, path));
        }

        match sources.open(&name) {
            Ok((text, _path)) => {
                let line_index = LineIndex::from_source_text(&text);
                let source = SourceCode::new(&text, &line_index);
                let (ast, mut parse_diags) =
                    smi_parser::parse_module(&text, &name, strictness, config);
                diagnostics.append(&mut parse_diags);
                if let Some(ast) = ast {
                    for imported in ast.imported_module_names() {
                        queue.push_back(CompactString::from(imported.as_str()));
                    }
                    modules.push(LoadedModule {
                        ast,
                        text,
                        line_index,
                    });
                } else {
                    diagnostics.push(Diagnostic::new(
                        codes::MISSING_DEFINITIONS_BEGIN,
                        format!("module `{name}` could not be parsed"),
                        name.clone(),
                        TextSize::new(0),
                        &source,
                    ));
                }
            }
            Err(_) => {
                diagnostics.push(missing_module_diagnostic(&name));
            }
        }
    }

    LoadResult {
        modules,
        diagnostics,
        cancelled: false,
    }
}

fn empty_source() -> (String, LineIndex) {
    (String::new(), LineIndex::from_source_text(""))
}

fn missing_module_diagnostic(name: &str) -> Diagnostic {
    let (text, line_index) = empty_source();
    let source = SourceCode::new(&text, &line_index);
    Diagnostic::new(
        codes::IMPORT_MODULE_MISSING,
        format!("module `{name}` could not be found in any configured source"),
        name,
        TextSize::new(0),
        &source,
    )
}

fn duplicate_source_diagnostic(name: &str, path: &str) -> Diagnostic {
    let (text, line_index) = empty_source();
    let source = SourceCode::new(&text, &line_index);
    Diagnostic::new(
        codes::MODULE_DUPLICATE_SOURCE,
        format!("module `{name}` also found at `{path}`; ignored by source precedence"),
        name,
        TextSize::new(0),
        &source,
    )
}

fn cancelled_diagnostic(name: &str) -> Diagnostic {
    let (text, line_index) = empty_source();
    let source = SourceCode::new(&text, &line_index);
    Diagnostic::new(
        codes::LOAD_CANCELLED,
        "load cancelled before all modules were parsed",
        name,
        TextSize::new(0),
        &source,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MapSource;
    use pretty_assertions::assert_eq;

    fn config() -> DiagnosticConfig {
        DiagnosticConfig::from_strictness(Strictness::Permissive)
    }

    #[test]
    fn loads_root_and_transitive_import() {
        let a = "A-MIB DEFINITIONS ::= BEGIN\n\
                 IMPORTS OBJECT-TYPE FROM B-MIB;\n\
                 aObj OBJECT IDENTIFIER ::= { iso 1 }\n\
                 END";
        let b = "B-MIB DEFINITIONS ::= BEGIN\n\
                 bObj OBJECT IDENTIFIER ::= { iso 2 }\n\
                 END";
        let sources = MultiSource::new(vec![Box::new(
            MapSource::new().with_module("A-MIB", a).with_module("B-MIB", b),
        )]);
        let result = load_modules(
            &sources,
            Some(&["A-MIB".to_string()]),
            Strictness::Permissive,
            &config(),
            &CancellationToken::new(),
            None,
        );
        let names: Vec<_> = result.modules.iter().map(|m| m.ast.name.as_str().to_string()).collect();
        assert_eq!(names.len(), 2);
        assert!(names.contains(&"A-MIB".to_string()));
        assert!(names.contains(&"B-MIB".to_string()));
        assert!(!result.cancelled);
    }

    #[test]
    fn missing_import_is_reported_and_does_not_stall() {
        let a = "A-MIB DEFINITIONS ::= BEGIN\n\
                 IMPORTS OBJECT-TYPE FROM MISSING-MIB;\n\
                 aObj OBJECT IDENTIFIER ::= { iso 1 }\n\
                 END";
        let sources = MultiSource::new(vec![Box::new(MapSource::new().with_module("A-MIB", a))]);
        let result = load_modules(
            &sources,
            Some(&["A-MIB".to_string()]),
            Strictness::Permissive,
            &config(),
            &CancellationToken::new(),
            None,
        );
        assert_eq!(result.modules.len(), 1);
        assert!(result
            .diagnostics
            .iter()
            .any(|d| d.code == codes::IMPORT_MODULE_MISSING));
    }

    #[test]
    fn import_cycle_does_not_loop_forever() {
        let a = "A-MIB DEFINITIONS ::= BEGIN\n\
                 IMPORTS x FROM B-MIB;\n\
                 aObj OBJECT IDENTIFIER ::= { iso 1 }\n\
                 END";
        let b = "B-MIB DEFINITIONS ::= BEGIN\n\
                 IMPORTS y FROM A-MIB;\n\
                 bObj OBJECT IDENTIFIER ::= { iso 2 }\n\
                 END";
        let sources = MultiSource::new(vec![Box::new(
            MapSource::new().with_module("A-MIB", a).with_module("B-MIB", b),
        )]);
        let result = load_modules(
            &sources,
            Some(&["A-MIB".to_string()]),
            Strictness::Permissive,
            &config(),
            &CancellationToken::new(),
            None,
        );
        assert_eq!(result.modules.len(), 2);
    }

    #[test]
    fn cancellation_stops_the_queue() {
        let a = "A-MIB DEFINITIONS ::= BEGIN\naObj OBJECT IDENTIFIER ::= { iso 1 }\nEND";
        let sources = MultiSource::new(vec![Box::new(MapSource::new().with_module("A-MIB", a))]);
        let token = CancellationToken::new();
        token.cancel();
        let result = load_modules(
            &sources,
            Some(&["A-MIB".to_string()]),
            Strictness::Permissive,
            &config(),
            &token,
            None,
        );
        assert!(result.cancelled);
        assert!(result.diagnostics.iter().any(|d| d.code == codes::LOAD_CANCELLED));
    }
}
