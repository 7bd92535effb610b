//! DiagnosticSink trait for the per-call diagnostic blocks.
//!
//! This trait enables dependency injection for testability,
//! allowing tests to capture blocks in memory.

/// Destination for rendered diagnostic blocks.
///
/// `emit` is called exactly once per intercepted call, from many calls
/// concurrently. Implementations must write each block as one unit so that
/// blocks from different calls never interleave.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, block: &str);
}
