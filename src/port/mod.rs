pub mod diagnostic_sink;

pub use diagnostic_sink::DiagnosticSink;
