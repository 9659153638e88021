use std::collections::BTreeMap;

use serde::Deserialize;

use sastre_model::{Kind, Tag};

use crate::error::EngineError;

/// The `name_template` block of a recipe: a regex applied to an item's
/// original name and spliced through `{name <regex>}` (spec.md §4.G).
/// Older recipes spell the same key `name_regex`; both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct NameTemplateConfig {
    #[serde(alias = "name_regex")]
    pub regex: String,
}

/// A Transform/Migrate recipe, loaded from YAML (spec.md §6). `tag`
/// selects which kinds get their names evaluated against `name_template`;
/// `name_map` is an explicit `old -> new` override consulted before the
/// template. `copy`, when set, makes a transformed item a new item
/// alongside the original rather than a rename in place — only items whose
/// new name came from an explicit `name_map` entry have their referrers
/// retargeted at the copy (spec.md §4.E.5: "pointed at the new copy when
/// the policy in the recipe asks for it"). `field_renames` is Migrate's
/// per-kind, per-field value mapping (spec.md §4.E.4): a top-level JSON key
/// in a kind's body is renamed to another top-level key, kind-wide,
/// regardless of `tag`.
#[derive(Debug, Clone, Deserialize)]
pub struct Recipe {
    pub tag: Tag,
    #[serde(default)]
    pub name_template: Option<NameTemplateConfig>,
    #[serde(default)]
    pub name_map: BTreeMap<String, String>,
    #[serde(default)]
    pub copy: bool,
    #[serde(default)]
    pub field_renames: BTreeMap<String, BTreeMap<String, String>>,
}

impl Recipe {
    pub fn parse(yaml: &str) -> Result<Self, EngineError> {
        let recipe: Recipe =
            serde_yaml::from_str(yaml).map_err(|e| EngineError::InvalidRecipe(e.to_string()))?;
        if recipe.name_template.is_none() && recipe.name_map.is_empty() && recipe.field_renames.is_empty() {
            return Err(EngineError::InvalidRecipe(
                "recipe must specify at least one of name_template, name_map, field_renames".into(),
            ));
        }
        Ok(recipe)
    }

    /// The name-template string passed to `sastre_names::NameTransformer`:
    /// `{name <regex>}` when a `name_template` is given, or the identity
    /// template `{name}` when the recipe drives renaming purely through
    /// `name_map`.
    pub fn template_string(&self) -> String {
        match &self.name_template {
            Some(cfg) => format!("{{name {}}}", cfg.regex),
            None => "{name}".to_string(),
        }
    }

    pub fn field_renames_for(&self, kind: &Kind) -> Option<&BTreeMap<String, String>> {
        self.field_renames.get(kind.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_name_template_recipe() {
        let yaml = "tag: template_feature\nname_template:\n  regex: \"(.+)_v1\"\n";
        let recipe = Recipe::parse(yaml).unwrap();
        assert_eq!(recipe.tag.as_str(), "template_feature");
        assert_eq!(recipe.template_string(), "{name (.+)_v1}");
    }

    #[test]
    fn accepts_legacy_name_regex_alias() {
        let yaml = "tag: policy_list\nname_template:\n  name_regex: \"(.+)\"\n";
        let recipe = Recipe::parse(yaml).unwrap();
        assert_eq!(recipe.template_string(), "{name (.+)}");
    }

    #[test]
    fn name_map_only_recipe_is_valid() {
        let yaml = "tag: policy_list\nname_map:\n  DC1: US-EAST-1\n";
        let recipe = Recipe::parse(yaml).unwrap();
        assert_eq!(recipe.template_string(), "{name}");
        assert_eq!(recipe.name_map.get("DC1").unwrap(), "US-EAST-1");
    }

    #[test]
    fn empty_recipe_is_rejected() {
        let yaml = "tag: policy_list\n";
        let err = Recipe::parse(yaml).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRecipe(_)));
    }

    #[test]
    fn unknown_field_is_ignored_not_fatal() {
        // serde_yaml is permissive about unknown top-level keys by default;
        // this just documents that parsing doesn't fail on one.
        let yaml = "tag: policy_list\nname_map:\n  DC1: US-EAST-1\nextra_note: ignored\n";
        assert!(Recipe::parse(yaml).is_ok());
    }
}
