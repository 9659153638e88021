//! One authenticated HTTP session to one SD-WAN controller: typed
//! GET/POST/PUT/DELETE, request retry and rate-limit backoff, and polling
//! for controller-side long-running actions.

mod action;
mod client;
mod config;
mod error;
mod retry;

pub use action::{AggregateStatus, DeviceRef, PollResult, SubTaskStatus};
pub use client::{Client, DEFAULT_HTTP_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
pub use config::ConnectionConfig;
pub use error::ClientError;
pub use retry::{RateLimitBackoff, TransientBackoff};
