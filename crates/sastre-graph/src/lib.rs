//! The cross-item reference graph: given a snapshot of items and the
//! catalog's reference-site descriptors, exposes dependency-valid
//! orderings over kinds and over items within a kind, and rewrites
//! embedded references through an id mapping.

mod error;
mod graph;

pub use error::GraphError;
pub use graph::ReferenceGraph;
