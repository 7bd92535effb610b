//! Shared test support utilities
//!
//! Provides a `MemorySink` implementing `DiagnosticSink` that keeps every
//! emitted block for later assertions, in unit and integration tests.

use crate::port::DiagnosticSink;
use std::sync::{Mutex, PoisonError};

/// Diagnostic sink that captures blocks in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    blocks: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All blocks emitted so far, in emission order.
    pub fn blocks(&self) -> Vec<String> {
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The only block emitted so far; panics unless exactly one was emitted.
    pub fn single_block(&self) -> String {
        let blocks = self.blocks();
        assert_eq!(blocks.len(), 1, "expected exactly one diagnostic block");
        blocks.into_iter().next().unwrap_or_default()
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, block: &str) {
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(block.to_string());
    }
}
