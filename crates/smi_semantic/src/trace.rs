//! The injectable `logger` sink (spec.md §6), separate from the ambient
//! `log` facade records the loader/resolver also emit at phase boundaries
//! (SPEC_FULL.md §6 "Logging"). Embedding callers that cannot rely on a
//! process-global logger pass a `TraceSink` instead.

/// A structured trace/debug sink for parse and resolve activity.
pub trait TraceSink {
    fn trace(&self, message: &str);
}

/// A `TraceSink` that forwards to the `log` crate at debug level, used when
/// no explicit sink is configured but callers still want phase-boundary
/// visibility through `RUST_LOG`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogTraceSink;

impl TraceSink for LogTraceSink {
    fn trace(&self, message: &str) {
        log::debug!("{message}");
    }
}
