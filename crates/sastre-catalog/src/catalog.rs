use std::collections::BTreeSet;

use sastre_model::{Kind, Tag};

use crate::descriptor::CatalogEntry;
use crate::error::CatalogError;
use crate::registry::ENTRIES;

/// The closed set of tags spec.md §6 accepts on `--tag`/`--deny-tag`. `all`
/// is handled specially: it expands to every kind the registry knows about,
/// not just kinds that happen to carry an `"all"` entry in their own table
/// (those two are equivalent today, but the special case keeps the registry
/// free to add an untagged kind without silently dropping it from backups).
const KNOWN_TAGS: &[&str] = &[
    "all",
    "policy_customapp",
    "policy_definition",
    "policy_list",
    "policy_profile",
    "policy_security",
    "policy_vedge",
    "policy_voice",
    "policy_vsmart",
    "template_device",
    "template_feature",
    "config_group",
    "feature_profile",
];

/// Read-only view over the static item catalog. Cheap to construct and
/// clone — it borrows the `'static` registry table directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct Catalog;

impl Catalog {
    pub fn new() -> Self {
        Catalog
    }

    /// All entries in registry order. Registry order has no semantic
    /// meaning — callers that need a stable order should go through
    /// `sastre-graph`'s topological sort instead.
    pub fn entries(&self) -> impl Iterator<Item = &'static CatalogEntry> {
        ENTRIES.iter()
    }

    pub fn entry(&self, kind: &Kind) -> Option<&'static CatalogEntry> {
        ENTRIES.iter().find(|e| e.kind == kind.as_str())
    }

    pub fn require(&self, kind: &Kind) -> Result<&'static CatalogEntry, CatalogError> {
        self.entry(kind).ok_or_else(|| CatalogError::UnknownKind(kind.clone()))
    }

    /// Expand a list of tags into the set of kinds they select, per spec.md
    /// §6 (`--tag` is a union across the given tags; `all` short-circuits
    /// to every known kind).
    pub fn expand_tags<'a, I>(&self, tags: I) -> Result<BTreeSet<Kind>, CatalogError>
    where
        I: IntoIterator<Item = &'a Tag>,
    {
        let mut out = BTreeSet::new();
        for tag in tags {
            if !KNOWN_TAGS.contains(&tag.as_str()) {
                return Err(CatalogError::InvalidTag(tag.clone()));
            }
            if tag.as_str() == "all" {
                out.extend(ENTRIES.iter().map(|e| e.kind()));
                continue;
            }
            out.extend(
                ENTRIES
                    .iter()
                    .filter(|e| e.tags.contains(&tag.as_str()))
                    .map(|e| e.kind()),
            );
        }
        Ok(out)
    }

    /// Entries available on `controller_version`, in registry order.
    pub fn entries_for_version(
        &self,
        controller_version: (u32, u32),
    ) -> impl Iterator<Item = &'static CatalogEntry> {
        ENTRIES
            .iter()
            .filter(move |e| e.is_available_on(controller_version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_looks_up_by_kind() {
        let catalog = Catalog::new();
        let entry = catalog.entry(&Kind::new("template_device")).unwrap();
        assert_eq!(entry.endpoints.get, "template/device");
    }

    #[test]
    fn unknown_kind_is_none() {
        let catalog = Catalog::new();
        assert!(catalog.entry(&Kind::new("not_a_real_kind")).is_none());
    }

    #[test]
    fn all_tag_expands_to_every_kind() {
        let catalog = Catalog::new();
        let expanded = catalog.expand_tags([&Tag::new("all")]).unwrap();
        assert_eq!(expanded.len(), ENTRIES.len());
    }

    #[test]
    fn specific_tag_expands_to_matching_kinds_only() {
        let catalog = Catalog::new();
        let expanded = catalog.expand_tags([&Tag::new("policy_list")]).unwrap();
        assert!(expanded.contains(&Kind::new("policy_list.site")));
        assert!(!expanded.contains(&Kind::new("template_device")));
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let catalog = Catalog::new();
        let err = catalog.expand_tags([&Tag::new("no_such_tag")]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidTag(_)));
    }

    #[test]
    fn version_gating_hides_new_kinds_from_older_controllers() {
        let catalog = Catalog::new();
        let pre_20_1: Vec<_> = catalog.entries_for_version((19, 2)).map(|e| e.kind()).collect();
        assert!(!pre_20_1.contains(&Kind::new("config_group")));

        let post_20_1: Vec<_> = catalog.entries_for_version((20, 1)).map(|e| e.kind()).collect();
        assert!(post_20_1.contains(&Kind::new("config_group")));
    }
}
