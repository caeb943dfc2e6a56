use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::args::{FailureMessage, RepeatArgs};
use crate::error::{ErrorKind, RepeatError};
use crate::manager::RepeatManager;
use crate::outcome::{IntoLoopResult, LoopStatus};
use crate::threshold::Threshold;

/// Cadence for re-checking a condition while a stability threshold is
/// configured and the poll result carried no delay of its own. Everything
/// else is scheduled with a bare yield, so there is no minimum spacing
/// between iterations beyond one scheduler turn.
pub const STABILITY_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run `poll` until it reports done, honoring `args`.
///
/// Settles with `Ok(Some(value))` on success, `Ok(None)` only when a
/// single-shot miss is suppressed via [`RepeatArgs::ignore_loop_error`] or an
/// explicit done result carried no value, and `Err` per the error taxonomy.
///
/// Equivalent to `Repeat::new(poll, args).execute()`.
pub async fn repeat<F, Fut, T>(poll: F, args: RepeatArgs) -> Result<Option<T>, RepeatError>
where
    F: FnMut() -> Fut,
    Fut: Future,
    Fut::Output: IntoLoopResult<Value = T>,
{
    Repeat::new(poll, args).execute().await
}

/// Out-of-band settlement for an in-flight task.
#[derive(Debug)]
pub enum Abort<T> {
    /// Settle the task successfully with this value.
    Resolve(T),
    /// Fail the task with this error.
    Fail(RepeatError),
    /// Fail the task with the internal exit signal.
    Cancel,
}

/// One polling task.
///
/// Drives `poll` in strictly sequential iterations until it reports done,
/// the timeout budget runs out, an unignored error occurs, or the task is
/// aborted through its [`RepeatHandle`]. Executing consumes the task, so a
/// loop can only be started once.
pub struct Repeat<F, T> {
    id: String,
    poll: F,
    timeout: Option<Duration>,
    threshold: Option<Threshold>,
    ignore_errors: Vec<ErrorKind>,
    message: Option<FailureMessage>,
    ignore_loop_error: bool,
    manager: RepeatManager,
    token: CancellationToken,
    aborted: Arc<Mutex<Option<Abort<T>>>>,
}

impl<F, Fut, T> Repeat<F, T>
where
    F: FnMut() -> Fut,
    Fut: Future,
    Fut::Output: IntoLoopResult<Value = T>,
{
    pub fn new(poll: F, args: RepeatArgs) -> Self {
        let RepeatArgs {
            ignore_errors,
            timeout,
            threshold,
            message,
            id,
            ignore_loop_error,
        } = args;

        Self {
            id: id.unwrap_or_else(|| format!("repeat-{}", Uuid::new_v4().as_simple())),
            poll,
            timeout,
            threshold: threshold.map(Threshold::new),
            ignore_errors,
            message,
            ignore_loop_error,
            manager: RepeatManager::global().clone(),
            token: CancellationToken::new(),
            aborted: Arc::new(Mutex::new(None)),
        }
    }

    /// Register with `manager` instead of the process-wide one.
    pub fn with_manager(mut self, manager: RepeatManager) -> Self {
        self.manager = manager;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Handle for aborting the task once it runs.
    pub fn handle(&self) -> RepeatHandle<T> {
        RepeatHandle {
            id: self.id.clone(),
            token: self.token.clone(),
            aborted: Arc::clone(&self.aborted),
        }
    }

    /// Drive the loop until the task settles.
    ///
    /// The task registers with its manager before the first iteration and
    /// deregisters on settlement, whichever path settles it; dropping the
    /// returned future mid-loop deregisters too and tears down any pending
    /// iteration timer.
    pub async fn execute(mut self) -> Result<Option<T>, RepeatError> {
        self.manager.insert(self.id.clone(), self.token.clone());
        let _deregister = Deregister {
            manager: self.manager.clone(),
            id: self.id.clone(),
        };
        debug!(
            id = %self.id,
            timeout = ?self.timeout,
            explicit = <Fut::Output as IntoLoopResult>::EXPLICIT,
            "repeat task started"
        );

        let token = self.token.clone();
        let started = Instant::now();
        let single_shot = self.timeout == Some(Duration::ZERO);

        loop {
            if token.is_cancelled() {
                return self.settle_aborted();
            }
            if let Some(timeout) = self.timeout {
                // budget is checked before polling again; the in-flight
                // iteration that crossed it already ran to completion
                if !single_shot && started.elapsed() >= timeout {
                    debug!(id = %self.id, ?timeout, "repeat task timed out");
                    return Err(self.unsuccessful().await);
                }
            }

            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => return self.settle_aborted(),
                outcome = (self.poll)() => outcome.into_loop_result(),
            };

            let mut requested_delay = None;
            match outcome {
                Ok(step) => {
                    requested_delay = step.delay;
                    match step.status {
                        LoopStatus::Done => match self.threshold.as_mut() {
                            None => {
                                debug!(id = %self.id, "repeat task finished");
                                return Ok(step.value);
                            }
                            Some(stability) => {
                                if !stability.is_armed() {
                                    stability.reset();
                                    trace!(
                                        id = %self.id,
                                        resets = stability.reset_count(),
                                        "stability window armed"
                                    );
                                }
                                if stability.has_finished() {
                                    debug!(id = %self.id, "repeat task finished after holding stable");
                                    return Ok(step.value);
                                }
                            }
                        },
                        LoopStatus::Undone => {
                            if let Some(stability) = self.threshold.as_mut() {
                                if stability.is_armed() {
                                    stability.clear();
                                    trace!(id = %self.id, "stability window cleared");
                                }
                            }
                        }
                    }
                }
                Err(err) if self.ignore_errors.contains(&err.kind()) => {
                    trace!(id = %self.id, %err, "ignoring poll error");
                    if let Some(stability) = self.threshold.as_mut() {
                        stability.clear();
                    }
                }
                Err(err) => {
                    debug!(id = %self.id, %err, "repeat task failed");
                    return Err(err);
                }
            }

            if single_shot {
                return if self.ignore_loop_error {
                    debug!(id = %self.id, "single shot missed, loop error ignored");
                    Ok(None)
                } else {
                    Err(self.unsuccessful().await)
                };
            }

            // an explicit delay wins; a threshold re-checks on a fixed
            // cadence; everything else yields once to the scheduler
            let pause = requested_delay
                .or_else(|| self.threshold.as_ref().map(|_| STABILITY_POLL_INTERVAL));
            match pause {
                Some(pause) => tokio::select! {
                    biased;
                    _ = token.cancelled() => return self.settle_aborted(),
                    _ = sleep(pause) => {}
                },
                None => tokio::task::yield_now().await,
            }
        }
    }

    fn settle_aborted(&self) -> Result<Option<T>, RepeatError> {
        debug!(id = %self.id, "repeat task aborted");
        match self.aborted.lock().take() {
            Some(Abort::Resolve(value)) => Ok(Some(value)),
            Some(Abort::Fail(err)) => Err(err),
            Some(Abort::Cancel) | None => Err(RepeatError::Exit),
        }
    }

    async fn unsuccessful(&mut self) -> RepeatError {
        let message = match self.message.take() {
            Some(message) => message.resolve().await,
            None => match self.timeout {
                Some(timeout) if timeout == Duration::ZERO => {
                    format!("repeat task '{}' missed its single attempt", self.id)
                }
                Some(timeout) => {
                    format!("repeat task '{}' did not succeed within {timeout:?}", self.id)
                }
                None => format!("repeat task '{}' did not succeed", self.id),
            },
        };
        RepeatError::Unsuccessful(message)
    }
}

/// Cloneable handle for aborting a running [`Repeat`] task.
pub struct RepeatHandle<T> {
    id: String,
    token: CancellationToken,
    aborted: Arc<Mutex<Option<Abort<T>>>>,
}

impl<T> Clone for RepeatHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            token: self.token.clone(),
            aborted: Arc::clone(&self.aborted),
        }
    }
}

impl<T> RepeatHandle<T> {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Settle the task now.
    ///
    /// The first abort wins; an already-scheduled iteration or an in-flight
    /// poll can no longer change the outcome. Aborting a settled task is a
    /// no-op.
    pub fn abort(&self, outcome: Abort<T>) {
        {
            let mut slot = self.aborted.lock();
            if slot.is_none() {
                *slot = Some(outcome);
            }
        }
        self.token.cancel();
    }

    /// Abort with the internal exit signal.
    pub fn cancel(&self) {
        self.abort(Abort::Cancel);
    }
}

struct Deregister {
    manager: RepeatManager,
    id: String,
}

impl Drop for Deregister {
    fn drop(&mut self) {
        self.manager.remove(&self.id);
    }
}
