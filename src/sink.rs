use tracing::info;

use crate::port::DiagnosticSink;

/// Tracing target used for diagnostic blocks, so they can be filtered
/// independently (e.g. `RUST_LOG=rask_spy::diagnostic=off`).
pub const DIAGNOSTIC_TARGET: &str = "rask_spy::diagnostic";

/// Emits each block as a single `tracing` event.
///
/// The fmt subscriber formats an event fully before one write to stdout, so a
/// block never interleaves with another call's block.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, block: &str) {
        info!(target: DIAGNOSTIC_TARGET, "{block}");
    }
}
