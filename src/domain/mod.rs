mod exchange;
mod signal;

pub use exchange::{ExchangeContext, ResponsePayload, UpstreamRecord};
pub use signal::SignalType;
