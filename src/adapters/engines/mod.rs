//! Analysis engine adapters.

pub mod command;
pub mod http;
pub mod mock;
pub mod registry;

pub use command::{CommandAnalysisEngine, CommandEngineConfig};
pub use http::HttpAnalysisEngine;
pub use mock::{Invocation, MockAnalysisEngine, MockResponse};
pub use registry::EngineRegistry;
