//! Adapters for external systems: analysis engines and the HTTP API.

pub mod engines;
pub mod http;
