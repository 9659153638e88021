//! Chunked submission and bounded-concurrency polling of controller
//! long-running actions: template attach/detach, vSmart policy
//! activate/deactivate.

mod category;
mod device;
mod engine;
mod error;

pub use category::{attach_order, teardown_order, ActionCategory};
pub use device::{chunk_devices, Device};
pub use engine::{ActionEngine, ActionOutcome};
pub use error::ActionsError;
