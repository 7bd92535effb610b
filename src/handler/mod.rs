pub mod health;
pub mod otlp;
