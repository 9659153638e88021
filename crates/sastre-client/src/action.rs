use std::time::Duration;

use serde::Deserialize;

use crate::client::{Client, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
use crate::error::ClientError;

/// Per-subtask status reported inside an action-status response.
#[derive(Debug, Clone, Deserialize)]
pub struct SubTaskStatus {
    #[serde(rename = "activity")]
    pub activity: Vec<String>,
    #[serde(rename = "status")]
    pub status: String,
    #[serde(rename = "device")]
    pub device: Option<DeviceRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceRef {
    #[serde(rename = "host-name")]
    pub hostname: Option<String>,
    #[serde(rename = "system-ip")]
    pub system_ip: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ActionStatusResponse {
    data: Vec<SubTaskStatus>,
}

/// An action's aggregate status after `poll_action` stops polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AggregateStatus {
    Success,
    Failure,
    PartialFailure,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct PollResult {
    pub action_id: String,
    pub status: AggregateStatus,
    pub sub_tasks: Vec<SubTaskStatus>,
}

const TERMINAL_STATUSES: &[&str] = &["Success", "Failure", "Done"];

fn is_terminal(status: &str) -> bool {
    TERMINAL_STATUSES.contains(&status)
}

impl Client {
    /// Polls `device/action/status/{action_id}` every `interval` until every
    /// sub-task reaches a terminal status or `timeout` elapses (spec.md
    /// §4.A). `interval`/`timeout` of `None` use the documented defaults
    /// (10s / 20min).
    pub async fn poll_action(
        &self,
        action_id: &str,
        interval: Option<Duration>,
        timeout: Option<Duration>,
    ) -> Result<PollResult, ClientError> {
        let interval = interval.unwrap_or(DEFAULT_POLL_INTERVAL);
        let timeout = timeout.unwrap_or(DEFAULT_POLL_TIMEOUT);
        let path = format!("device/action/status/{action_id}");

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let response: ActionStatusResponse = self.get_json(&path).await?;
            if response.data.iter().all(|t| is_terminal(&t.status)) {
                let failures = response
                    .data
                    .iter()
                    .filter(|t| t.status == "Failure")
                    .count();
                let status = if failures == 0 {
                    AggregateStatus::Success
                } else if failures == response.data.len() {
                    AggregateStatus::Failure
                } else {
                    AggregateStatus::PartialFailure
                };
                return Ok(PollResult {
                    action_id: action_id.to_string(),
                    status,
                    sub_tasks: response.data,
                });
            }

            if tokio::time::Instant::now() >= deadline {
                return Ok(PollResult {
                    action_id: action_id.to_string(),
                    status: AggregateStatus::TimedOut,
                    sub_tasks: response.data,
                });
            }

            tokio::time::sleep(interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses_are_recognized() {
        assert!(is_terminal("Success"));
        assert!(is_terminal("Failure"));
        assert!(is_terminal("Done"));
        assert!(!is_terminal("In Progress"));
    }
}
