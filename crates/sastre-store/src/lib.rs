//! The on-disk (or in-archive) backup format: a directory tree, or a zip
//! archive of the same tree, holding per-kind indexes and item bodies plus
//! the handful of side files (server info, certificates, device running
//! configs, template attachments) backup/restore need.

mod archive;
mod backup;
mod error;
mod layout;
mod safe_name;
mod store;
mod writer;

pub use error::StoreError;
pub use safe_name::{safe_filename, NameLedger};
pub use store::Store;
