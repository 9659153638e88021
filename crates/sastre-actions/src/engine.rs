use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Semaphore;

use sastre_client::{AggregateStatus, Client};

use crate::device::{chunk_devices, Device};
use crate::error::ActionsError;

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

/// Outcome of one action run (one or more chunks, each polled to a
/// terminal status): success, a partial failure that still completed, an
/// outright failure, or a timeout (spec.md §4.F.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Success,
    PartialFailure,
    Failure,
    TimedOut,
}

impl ActionOutcome {
    /// Combines this run's chunk statuses into one outcome. A run with any
    /// timed-out chunk is reported as timed out; otherwise any failing
    /// chunk (full or partial) demotes the whole run to at least
    /// `PartialFailure`, and a run where every chunk failed is `Failure`.
    fn aggregate(statuses: &[AggregateStatus]) -> Self {
        if statuses.iter().any(|s| *s == AggregateStatus::TimedOut) {
            return ActionOutcome::TimedOut;
        }
        let failures = statuses
            .iter()
            .filter(|s| matches!(s, AggregateStatus::Failure | AggregateStatus::PartialFailure))
            .count();
        if failures == 0 {
            ActionOutcome::Success
        } else if failures == statuses.len() {
            ActionOutcome::Failure
        } else {
            ActionOutcome::PartialFailure
        }
    }
}

/// Submits chunked device actions and polls them to completion, bounding
/// concurrent pollers (spec.md §4.F).
pub struct ActionEngine<'c> {
    client: &'c Client,
    chunk_size: usize,
    pollers: usize,
    poll_interval: Option<Duration>,
    timeout: Option<Duration>,
}

impl<'c> ActionEngine<'c> {
    pub fn new(client: &'c Client) -> Self {
        ActionEngine {
            client,
            chunk_size: 10,
            pollers: 10,
            poll_interval: None,
            timeout: None,
        }
    }

    pub fn with_chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n;
        self
    }

    pub fn with_pollers(mut self, n: usize) -> Self {
        self.pollers = n;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Chunks `devices`, submits each chunk to `submit_path` with a body
    /// built by `build_body`, then polls every resulting action id
    /// concurrently (bounded to `self.pollers`) until each reaches a
    /// terminal status or the overall timeout fires.
    pub async fn run<F>(
        &self,
        devices: Vec<Device>,
        submit_path: &str,
        build_body: F,
    ) -> Result<ActionOutcome, ActionsError>
    where
        F: Fn(&[Device]) -> Value,
    {
        let chunks = chunk_devices(devices, self.chunk_size);
        let mut action_ids = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let body = build_body(chunk);
            let response: SubmitResponse = self.client.post_json(submit_path, &body).await?;
            tracing::info!(action_id = %response.id, devices = chunk.len(), "submitted action chunk");
            action_ids.push(response.id);
        }

        let semaphore = Arc::new(Semaphore::new(self.pollers.max(1)));
        let polls = action_ids.into_iter().map(|action_id| {
            let semaphore = semaphore.clone();
            async move {
                let _permit = semaphore.acquire().await.expect("semaphore is never closed");
                self.client
                    .poll_action(&action_id, self.poll_interval, self.timeout)
                    .await
            }
        });

        let results = futures::future::join_all(polls).await;
        let mut statuses = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(poll_result) => {
                    if poll_result.status != AggregateStatus::Success {
                        tracing::warn!(action_id = %poll_result.action_id, status = ?poll_result.status, "action chunk did not fully succeed");
                    }
                    statuses.push(poll_result.status);
                }
                Err(e) => return Err(ActionsError::from(e)),
            }
        }

        Ok(ActionOutcome::aggregate(&statuses))
    }
}
