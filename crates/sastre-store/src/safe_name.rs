use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use sastre_model::Id;

lazy_static! {
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^A-Za-z0-9 _-]").unwrap();
}

/// Transforms an item name into a filesystem-safe stem: every character
/// outside `[A-Za-z0-9 _-]` becomes `_` (spec.md §3), one-for-one rather
/// than collapsing runs, so the mapping stays a pure per-character
/// substitution.
pub fn safe_filename(name: &str) -> String {
    UNSAFE_CHARS.replace_all(name, "_").to_string()
}

/// Tracks which safe names are already in use within one kind directory, so
/// that two items whose names collide after sanitization still get distinct
/// files (spec.md §4.C).
#[derive(Debug, Default)]
pub struct NameLedger {
    used: HashMap<String, Id>,
}

impl NameLedger {
    pub fn new() -> Self {
        NameLedger::default()
    }

    /// Resolves the on-disk stem for `(name, id)`. If `safe_filename(name)`
    /// is already taken by a different id, falls back to
    /// `<safe-name>_<id>`.
    pub fn resolve(&mut self, name: &str, id: &Id) -> String {
        let base = safe_filename(name);
        match self.used.get(&base) {
            Some(existing) if existing != id => {
                let fallback = format!("{base}_{}", safe_filename(id.as_str()));
                self.used.insert(fallback.clone(), id.clone());
                fallback
            }
            _ => {
                self.used.insert(base.clone(), id.clone());
                base
            }
        }
    }
}
