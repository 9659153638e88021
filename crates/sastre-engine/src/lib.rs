//! Task orchestration: backup, restore, delete, migrate, and transform,
//! built on top of the catalog, store, client, and reference-graph crates.
//! Every task is a function taking an `EngineContext` (or a source/dest
//! `Store` pair) and returning a report the caller renders however it
//! likes — no task prints or reads from the terminal itself.

mod backup;
mod context;
mod controller;
mod delete;
mod error;
mod migrate;
mod recipe;
mod restore;
mod snapshot;
mod transform;

pub use backup::{backup, BackupOptions, BackupReport};
pub use context::EngineContext;
pub use controller::{ActionDevice, ControllerApi};
pub use delete::{delete, DeleteOptions, DeleteReport};
pub use error::EngineError;
pub use migrate::{migrate, MigrateReport};
pub use recipe::Recipe;
pub use restore::{restore, RestoreOptions, RestoreReport, UpdateMode};
pub use snapshot::{all_persisted_kinds, load_items};
pub use transform::{transform, TransformReport};
