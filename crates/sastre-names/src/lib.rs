//! Name templates and the rename/copy bookkeeping Migrate and Transform
//! build on: `{name}` / `{name <regex>}` substitution, explicit
//! `old -> new` overrides, and post-rename collision detection.

mod error;
mod template;
mod transformer;

pub use error::NameError;
pub use template::Template;
pub use transformer::{check_collisions, NameTransformer};
