//! Out-of-band matrix recomputation
//!
//! Per-key state machine Idle -> InProgress -> Idle. A recompute request is
//! fire-and-forget: the caller gets an in-progress status immediately and the
//! computation runs on a spawned task. The in-flight set is the only mutable
//! shared state; the mutex-guarded insert is the check-and-set that keeps two
//! near-simultaneous requests from both launching (at most one computation
//! per key, system-wide). A failed computation clears the flag without a
//! cache write, so a previously good artifact is never destroyed.

use super::{MatrixArtifact, MatrixCache};
use crate::region::CacheKey;
use crate::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Scheduler state for one cache key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeStatus {
    Idle,
    InProgress,
}

/// What a recompute request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeOutcome {
    /// A new computation was launched for this key
    Launched,

    /// A computation was already in flight; the request was coalesced with it
    Coalesced,
}

/// Deduplicating scheduler for background matrix recomputation
#[derive(Clone)]
pub struct RecomputeScheduler {
    cache: Arc<MatrixCache>,
    in_flight: Arc<Mutex<HashSet<CacheKey>>>,
}

impl RecomputeScheduler {
    pub fn new(cache: Arc<MatrixCache>) -> Self {
        Self {
            cache,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Current state for a key
    pub fn status(&self, key: CacheKey) -> RecomputeStatus {
        if self.guard().contains(&key) {
            RecomputeStatus::InProgress
        } else {
            RecomputeStatus::Idle
        }
    }

    /// Request recomputation of the artifact for `key`
    ///
    /// If the key is already in progress, returns immediately without
    /// starting a second computation. Otherwise marks the key in flight,
    /// spawns `compute`, and on success writes the result through the cache
    /// before returning the key to idle. On failure the error is logged and
    /// the stale cached value, if any, is left untouched. There is no queue:
    /// a request arriving while in progress coalesces with the running one.
    pub fn request_recompute<F>(&self, key: CacheKey, compute: F) -> RecomputeOutcome
    where
        F: Future<Output = Result<MatrixArtifact>> + Send + 'static,
    {
        if !self.guard().insert(key) {
            tracing::info!(key = %key, "Recompute already in progress, coalescing request");
            return RecomputeOutcome::Coalesced;
        }

        tracing::info!(key = %key, "Matrix recomputation started");

        let cache = Arc::clone(&self.cache);
        let in_flight = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            match compute.await {
                Ok(artifact) => match cache.put(key, &artifact) {
                    Ok(()) => {
                        tracing::info!(key = %key, "Matrix recomputation finished");
                    }
                    Err(e) => {
                        tracing::error!(key = %key, error = %e, "Failed to write recomputed matrix");
                    }
                },
                Err(e) => {
                    tracing::error!(key = %key, error = %e, "Matrix recomputation failed");
                }
            }
            in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&key);
        });

        RecomputeOutcome::Launched
    }

    fn guard(&self) -> MutexGuard<'_, HashSet<CacheKey>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
