//! Background execution with one live task per request key.
//!
//! A key is `Running` while it has an entry in the in-flight map; absence
//! means `Idle`. The entry is claimed through the `DashMap` entry API, so two
//! concurrent submits for one key cannot both win. Terminal order on the
//! worker: cache write (success only), release of the key, then exactly one
//! callback.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::TaskError;
use crate::state::cache::{CacheKey, RequestCache};
use crate::types::RequestKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Running,
}

#[derive(Debug, Clone)]
struct Inflight {
    id: Uuid,
    started_at: Instant,
}

/// Releases a claimed slot on drop unless the worker took ownership of it.
struct Claim<'a> {
    inflight: &'a DashMap<RequestKey, Inflight>,
    key: &'a RequestKey,
    id: Uuid,
    armed: bool,
}

impl Claim<'_> {
    fn handed_off(mut self) {
        self.armed = false;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.inflight.remove_if(self.key, |_, f| f.id == self.id);
        }
    }
}

/// Handle to a started unit of work. Dropping it does not cancel the task.
#[derive(Debug)]
pub struct TaskHandle {
    id: Uuid,
    key: RequestKey,
    join: JoinHandle<()>,
}

impl TaskHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Wait until the terminal callback has returned.
    pub async fn finished(self) {
        if let Err(e) = self.join.await {
            warn!(task_id = %self.id, key = %self.key, "task join failed: {e}");
        }
    }
}

/// Result of asking for a keyed value.
#[derive(Debug)]
pub enum Dispatch<V> {
    /// Served from the cache; no work started, no callback will fire.
    Cached(V),
    /// Work started; exactly one callback will fire.
    Started(TaskHandle),
}

#[derive(Debug, Clone)]
pub struct TaskRunner {
    cache: Arc<RequestCache>,
    inflight: Arc<DashMap<RequestKey, Inflight>>,
}

impl TaskRunner {
    pub fn new(cache: Arc<RequestCache>) -> Self {
        Self {
            cache,
            inflight: Arc::new(DashMap::new()),
        }
    }

    pub fn cache(&self) -> &Arc<RequestCache> {
        &self.cache
    }

    pub fn state(&self, key: &RequestKey) -> TaskState {
        if self.inflight.contains_key(key) {
            TaskState::Running
        } else {
            TaskState::Idle
        }
    }

    pub fn running(&self) -> usize {
        self.inflight.len()
    }

    /// Cache lookup first; on a miss, [`submit`](Self::submit).
    pub fn dispatch<K, W, Fut, S, F>(
        &self,
        key: K,
        work: W,
        on_success: S,
        on_failure: F,
    ) -> Result<Dispatch<K::Value>, TaskError>
    where
        K: CacheKey,
        W: FnOnce() -> Fut,
        Fut: Future<Output = Result<K::Value, TaskError>> + Send + 'static,
        S: FnOnce(K::Value) + Send + 'static,
        F: FnOnce(TaskError) + Send + 'static,
    {
        if let Some(v) = self.cache.get(&key) {
            let request_key: RequestKey = key.into();
            debug!(key = %request_key, "cache hit");
            return Ok(Dispatch::Cached(v));
        }
        self.submit(key, work, on_success, on_failure)
            .map(Dispatch::Started)
    }

    /// Start `work` on its own task unless `key` is already running.
    ///
    /// Returns [`TaskError::Duplicate`] without calling `work` or either
    /// callback when the key is taken. Must be called inside a Tokio runtime.
    pub fn submit<K, W, Fut, S, F>(
        &self,
        key: K,
        work: W,
        on_success: S,
        on_failure: F,
    ) -> Result<TaskHandle, TaskError>
    where
        K: CacheKey,
        W: FnOnce() -> Fut,
        Fut: Future<Output = Result<K::Value, TaskError>> + Send + 'static,
        S: FnOnce(K::Value) + Send + 'static,
        F: FnOnce(TaskError) + Send + 'static,
    {
        let request_key: RequestKey = key.clone().into();
        let id = Uuid::new_v4();
        let started_at = Instant::now();

        match self.inflight.entry(request_key.clone()) {
            Entry::Occupied(running) => {
                info!(
                    key = %request_key,
                    running_task = %running.get().id,
                    "request already in progress"
                );
                return Err(TaskError::Duplicate(request_key));
            }
            Entry::Vacant(slot) => {
                slot.insert(Inflight { id, started_at });
            }
        }

        // Covers a panic in `work()` or a spawn outside a runtime.
        let claim = Claim { inflight: &self.inflight, key: &request_key, id, armed: true };

        debug!(task_id = %id, key = %request_key, "task started");
        let fut = work();
        let cache = self.cache.clone();
        let inflight = self.inflight.clone();
        let task_key = request_key.clone();

        let join = tokio::spawn(async move {
            // Inner spawn so a panicking unit still reaches a terminal callback.
            let outcome = match tokio::spawn(fut).await {
                Ok(r) => r,
                Err(e) if e.is_panic() => Err(TaskError::Internal("unit of work panicked".into())),
                Err(e) => Err(TaskError::Internal(e.to_string())),
            };
            let elapsed_ms = u64::try_from(started_at.elapsed().as_millis()).unwrap_or(u64::MAX);

            match outcome {
                Ok(value) => {
                    cache.put(key, value.clone());
                    inflight.remove_if(&task_key, |_, f| f.id == id);
                    info!(task_id = %id, key = %task_key, elapsed_ms, "task succeeded");
                    on_success(value);
                }
                Err(err) => {
                    inflight.remove_if(&task_key, |_, f| f.id == id);
                    warn!(
                        task_id = %id,
                        key = %task_key,
                        elapsed_ms,
                        kind = ?err.kind(),
                        "task failed: {err}"
                    );
                    on_failure(err);
                }
            }
        });
        claim.handed_off();

        Ok(TaskHandle { id, key: request_key, join })
    }
}
