//! Service layer: single-flight gating, rubric resolution and the
//! evaluation pipeline.

pub mod evaluation_pipeline;
pub mod rubric_loader;
pub mod single_flight;

pub use evaluation_pipeline::{criteria_overview, EvaluationPipeline};
pub use rubric_loader::{load_parameters, resolve_parameters, RubricResolution};
pub use single_flight::{GateError, GatePermit, GateRegistry, SingleFlightGate, GLOBAL_SCOPE};
