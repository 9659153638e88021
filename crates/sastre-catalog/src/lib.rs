//! The item catalog: a static, declarative description of every
//! configuration item kind the engine knows about — its REST endpoints,
//! where its id/name/factory-default fields live in the JSON body, which
//! other kinds it depends on, and where it references them. Every other
//! sastre-* crate that needs kind-specific behavior goes through this
//! catalog instead of matching on kind strings itself.

mod catalog;
mod descriptor;
mod error;
mod pointer;
mod registry;

pub use catalog::Catalog;
pub use descriptor::{CatalogEntry, Endpoints, MinVersion, ReferenceSite, ReferenceSiteDef};
pub use error::CatalogError;
pub use pointer::{get_bool, get_str, walk_get, walk_set_mut, PathSegment, Pointer};
