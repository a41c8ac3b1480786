//! The Loader, Resolver, resolved data model, and `Mib` query surface
//! (spec.md §4.3–§4.5). This is the crate that turns parsed module ASTs
//! into a queryable semantic model; the `smi` facade crate wires it to a
//! public `load()` entry point.

pub mod cancel;
pub mod ids;
pub mod loader;
pub mod mib;
pub mod model;
pub mod oid;
pub mod resolver;
pub mod source;
pub mod trace;

pub use cancel::CancellationToken;
pub use loader::{load_modules, LoadResult, LoadedModule};
pub use mib::Mib;
pub use oid::{Arc, Oid};
pub use resolver::resolve;
pub use source::{MapSource, MultiSource, Source, SourceError};
pub use trace::{LogTraceSink, TraceSink};
