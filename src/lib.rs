#![warn(rust_2018_idioms)]

pub mod app;
pub mod config;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod forwarder;
pub mod handler;
pub mod healthcheck;
pub mod otlp;
pub mod port;
pub mod sink;
pub mod test_support;

pub use healthcheck::{healthcheck, healthcheck_with_port};
