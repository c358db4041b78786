//! One-shot health check worker.
//!
//! A [`HealthCheckWorker`] takes exactly one job, runs it, reports the
//! result (or nothing) to the requester and ends. `spawn` consumes the
//! worker, so a unit can never be handed a second job.
//!
//! ```text
//! Idle ──spawn──▶ Running ──probe finished──▶ Done ──reply sent──▶ Terminated
//! ```
//!
//! Dispatch errors, panics and cancellation of the probe task are all
//! converted to `Unhealthy` before the reply is sent; the requester never
//! sees a fault.

use std::sync::Arc;

use healthprobe_core::{HealthCheckJob, HealthResult};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dispatcher::Dispatch;
use crate::error::ProbeError;

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Created, no job yet.
    Idle,
    /// Probe in flight.
    Running,
    /// Result computed (or suppressed).
    Done,
    /// Finished. Terminal.
    Terminated,
}

/// A worker dedicated to a single health check job.
pub struct HealthCheckWorker<D> {
    dispatcher: Arc<D>,
    state: WorkerState,
}

impl<D: Dispatch> HealthCheckWorker<D> {
    pub fn new(dispatcher: Arc<D>) -> Self {
        Self {
            dispatcher,
            state: WorkerState::Idle,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Run `job` in a background task and send its result on `reply`.
    ///
    /// The handle resolves to the final state, always `Terminated`.
    pub fn spawn(
        self,
        job: HealthCheckJob,
        reply: mpsc::Sender<HealthResult>,
    ) -> JoinHandle<WorkerState> {
        tokio::spawn(self.run(job, reply))
    }

    async fn run(mut self, job: HealthCheckJob, reply: mpsc::Sender<HealthResult>) -> WorkerState {
        let instance_id = job.instance.id.clone();
        self.transition(WorkerState::Running, &instance_id);

        let result = run_job(Arc::clone(&self.dispatcher), job).await;
        self.transition(WorkerState::Done, &instance_id);

        if let Some(result) = result {
            if reply.send(result).await.is_err() {
                warn!(%instance_id, "requester went away, dropping health result");
            }
        }

        self.transition(WorkerState::Terminated, &instance_id);
        self.state
    }

    fn transition(&mut self, next: WorkerState, instance_id: &str) {
        debug!(%instance_id, from = ?self.state, to = ?next, "health check worker state change");
        self.state = next;
    }
}

/// Run one job to completion and derive its result.
///
/// Never fails: errors and panics inside dispatch become `Unhealthy`.
/// `None` means the response was deliberately left unjudged.
pub async fn run_job<D: Dispatch>(dispatcher: Arc<D>, job: HealthCheckJob) -> Option<HealthResult> {
    let job = Arc::new(job);
    let task_job = Arc::clone(&job);

    let outcome = tokio::spawn(async move { dispatcher.dispatch(&task_job).await })
        .await
        .unwrap_or_else(|e| Err(ProbeError::from_join(e)));

    match outcome {
        Ok(result) => result,
        Err(e) => {
            let cause = e.diagnostic();
            warn!(instance_id = %job.instance.id, error = %cause, "health check failed");
            Some(HealthResult::unhealthy(&job, cause))
        }
    }
}
