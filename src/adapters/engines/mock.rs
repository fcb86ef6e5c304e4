//! Mock analysis engine for testing.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::domain::errors::EngineError;
use crate::domain::models::{AnalysisContext, EvaluationParameters};
use crate::domain::ports::AnalysisEngine;
use crate::services::single_flight::GatePermit;

/// Mock response configuration.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this context verbatim.
    Context(AnalysisContext),
    /// Award `fraction` of every criterion's maximum.
    Proportional(f64),
    /// Fail with this message.
    Failure(String),
    /// Panic inside the engine.
    Panic(String),
}

impl Default for MockResponse {
    fn default() -> Self {
        Self::Proportional(0.5)
    }
}

/// One recorded engine call.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub file_path: PathBuf,
    pub mode: String,
    /// Whether the transient file was on disk when the engine was entered.
    pub file_existed: bool,
    pub bytes_seen: usize,
    pub gate_scope: String,
    pub started: Instant,
    pub finished: Instant,
}

impl Invocation {
    /// Whether this call's active interval intersects `other`'s.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.started < other.finished && other.started < self.finished
    }
}

/// Mock engine with scripted responses.
///
/// Responses queued with [`push_response`](Self::push_response) are used
/// first, in order; afterwards the default response applies.
pub struct MockAnalysisEngine {
    default_response: MockResponse,
    scripted: Mutex<VecDeque<MockResponse>>,
    delay: Duration,
    available: bool,
    invocations: Mutex<Vec<Invocation>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl MockAnalysisEngine {
    pub fn new() -> Self {
        Self::with_default_response(MockResponse::default())
    }

    pub fn with_default_response(response: MockResponse) -> Self {
        Self {
            default_response: response,
            scripted: Mutex::new(VecDeque::new()),
            delay: Duration::ZERO,
            available: true,
            invocations: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
        }
    }

    /// Always return `context`.
    pub fn returning(context: AnalysisContext) -> Self {
        Self::with_default_response(MockResponse::Context(context))
    }

    /// Always fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_default_response(MockResponse::Failure(message.into()))
    }

    /// Simulate analysis taking `delay`.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub const fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    /// Queue a one-shot response.
    pub fn push_response(&self, response: MockResponse) {
        self.scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
    }

    /// All completed calls, in completion order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Highest number of calls that were ever in progress at once.
    pub fn max_concurrent(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> MockResponse {
        self.scripted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone())
    }

    fn proportional_context(fraction: f64, params: &EvaluationParameters) -> AnalysisContext {
        params
            .criteria
            .iter()
            .fold(AnalysisContext::new(), |ctx, (name, criterion)| {
                #[allow(clippy::cast_possible_truncation)]
                let score = (f64::from(criterion.max_score) * fraction).floor() as i64;
                ctx.with_score(name.clone(), score)
                    .with_feedback(name.clone(), "Mock assessment")
            })
    }
}

impl Default for MockAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Decrements the active-call counter even if the engine panics.
struct ActiveCall<'a>(&'a AtomicUsize);

impl Drop for ActiveCall<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl AnalysisEngine for MockAnalysisEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn process(
        &self,
        file_path: &Path,
        mode: &str,
        permit: &GatePermit,
        params: &EvaluationParameters,
    ) -> Result<AnalysisContext, EngineError> {
        let started = Instant::now();
        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        let _active = ActiveCall(&self.active);
        self.max_active.fetch_max(now_active, Ordering::SeqCst);

        let file_existed = file_path.exists();
        let bytes_seen = tokio::fs::read(file_path).await.map_or(0, |b| b.len());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let response = self.next_response();

        self.invocations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Invocation {
                file_path: file_path.to_path_buf(),
                mode: mode.to_string(),
                file_existed,
                bytes_seen,
                gate_scope: permit.scope().to_string(),
                started,
                finished: Instant::now(),
            });

        match response {
            MockResponse::Context(ctx) => Ok(ctx),
            MockResponse::Proportional(fraction) => Ok(Self::proportional_context(fraction, params)),
            MockResponse::Failure(message) => Err(EngineError::Failed(message)),
            MockResponse::Panic(message) => panic!("{message}"),
        }
    }
}
