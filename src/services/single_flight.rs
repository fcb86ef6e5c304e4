//! Single-flight gate.
//!
//! Serializes access to an expensive resource so at most one holder is active
//! per scope. Waiters are served in arrival order (tokio's semaphore is fair),
//! and acquisition is a scoped resource: dropping the [`GatePermit`] releases
//! the gate, so engine failures, panics and cancelled callers cannot leak it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, trace};

/// Scope label of the process-wide gate.
pub const GLOBAL_SCOPE: &str = "global";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Single-flight gate '{0}' is closed")]
    Closed(String),
}

struct GateInner {
    scope: String,
    semaphore: Arc<Semaphore>,
    waiting: AtomicUsize,
}

/// A gate admitting one holder at a time.
///
/// Cloning is cheap and every clone refers to the same gate.
#[derive(Clone)]
pub struct SingleFlightGate {
    inner: Arc<GateInner>,
}

impl SingleFlightGate {
    /// Create a gate for the given scope.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(GateInner {
                scope: scope.into(),
                semaphore: Arc::new(Semaphore::new(1)),
                waiting: AtomicUsize::new(0),
            }),
        }
    }

    /// Create the process-wide gate.
    pub fn global() -> Self {
        Self::new(GLOBAL_SCOPE)
    }

    pub fn scope(&self) -> &str {
        &self.inner.scope
    }

    /// Wait until the gate is free and take it.
    ///
    /// Cancelling the returned future while it waits removes the caller from
    /// the queue without ever holding the gate.
    pub async fn acquire(&self) -> Result<GatePermit, GateError> {
        let _queued = QueuedGuard::enter(&self.inner.waiting);
        let wait_started = Instant::now();

        let permit = Arc::clone(&self.inner.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| GateError::Closed(self.inner.scope.clone()))?;

        debug!(
            scope = %self.inner.scope,
            waited_ms = wait_started.elapsed().as_millis() as u64,
            "single-flight gate acquired"
        );

        Ok(GatePermit {
            _permit: permit,
            scope: self.inner.scope.clone(),
            acquired_at: Instant::now(),
        })
    }

    /// Whether someone currently holds the gate.
    pub fn is_busy(&self) -> bool {
        self.inner.semaphore.available_permits() == 0
    }

    /// Number of callers queued in [`acquire`](Self::acquire).
    pub fn waiting(&self) -> usize {
        self.inner.waiting.load(Ordering::SeqCst)
    }

    /// Refuse all current and future waiters. The active holder is unaffected.
    pub fn close(&self) {
        self.inner.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.semaphore.is_closed()
    }
}

impl std::fmt::Debug for SingleFlightGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingleFlightGate")
            .field("scope", &self.inner.scope)
            .field("busy", &self.is_busy())
            .field("waiting", &self.waiting())
            .finish()
    }
}

/// Proof of exclusive access. The gate is released when this is dropped.
#[derive(Debug)]
pub struct GatePermit {
    _permit: OwnedSemaphorePermit,
    scope: String,
    acquired_at: Instant,
}

impl GatePermit {
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// How long the gate has been held.
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }
}

impl Drop for GatePermit {
    fn drop(&mut self) {
        trace!(
            scope = %self.scope,
            held_ms = self.acquired_at.elapsed().as_millis() as u64,
            "single-flight gate released"
        );
    }
}

/// Keeps the waiting counter accurate even when `acquire` is cancelled.
struct QueuedGuard<'a>(&'a AtomicUsize);

impl<'a> QueuedGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for QueuedGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Hands out one gate per scope key, e.g. per tenant or resource pool.
#[derive(Default)]
pub struct GateRegistry {
    gates: Mutex<HashMap<String, SingleFlightGate>>,
}

impl GateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The gate for `scope`, created on first use.
    pub fn gate(&self, scope: &str) -> SingleFlightGate {
        let mut gates = self.gates.lock().unwrap_or_else(PoisonError::into_inner);
        gates
            .entry(scope.to_string())
            .or_insert_with(|| SingleFlightGate::new(scope))
            .clone()
    }

    pub fn len(&self) -> usize {
        self.gates.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
