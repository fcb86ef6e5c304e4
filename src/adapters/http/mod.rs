//! HTTP surface of the evaluation service.

pub mod evaluation_http;

pub use evaluation_http::{
    ErrorResponse, EvaluationHttpConfig, EvaluationHttpServer, HealthResponse, SERVICE_NAME,
};
