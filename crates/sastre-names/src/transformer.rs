use std::collections::HashMap;

use sastre_model::Kind;

use crate::error::NameError;
use crate::template::Template;

/// Resolves the new name for an item: an explicit `old -> new` override is
/// consulted first; on miss, the template is evaluated against the
/// original name (spec.md §4.G).
pub struct NameTransformer {
    template: Template,
    overrides: HashMap<(Kind, String), String>,
}

impl NameTransformer {
    pub fn new(template: &str, overrides: HashMap<(Kind, String), String>) -> Result<Self, NameError> {
        Ok(NameTransformer {
            template: Template::parse(template)?,
            overrides,
        })
    }

    pub fn resolve(&self, kind: &Kind, original_name: &str) -> String {
        if let Some(explicit) = self.overrides.get(&(kind.clone(), original_name.to_string())) {
            return explicit.clone();
        }
        self.template.evaluate(original_name)
    }
}

/// Checks that no two `(original_name, new_name)` pairs within the same
/// kind collapse to the same `new_name`. Fails the whole transform on the
/// first kind with a collision (spec.md §4.G), listing every offending
/// original name.
pub fn check_collisions(kind: &Kind, renamed: &[(String, String)]) -> Result<(), NameError> {
    let mut by_new_name: HashMap<&str, Vec<&str>> = HashMap::new();
    for (original, new_name) in renamed {
        by_new_name.entry(new_name.as_str()).or_default().push(original.as_str());
    }
    for (new_name, offenders) in by_new_name {
        if offenders.len() > 1 {
            let mut offenders: Vec<String> = offenders.into_iter().map(String::from).collect();
            offenders.sort();
            return Err(NameError::NameCollision {
                kind: kind.clone(),
                new_name: new_name.to_string(),
                offenders,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_override_wins_over_template() {
        let mut overrides = HashMap::new();
        overrides.insert((Kind::new("policy_list.site"), "DC1".to_string()), "US-EAST-1".to_string());
        let transformer = NameTransformer::new("{name}-copy", overrides).unwrap();

        assert_eq!(transformer.resolve(&Kind::new("policy_list.site"), "DC1"), "US-EAST-1");
        assert_eq!(transformer.resolve(&Kind::new("policy_list.site"), "DC2"), "DC2-copy");
    }

    #[test]
    fn collision_is_detected_and_reported() {
        let kind = Kind::new("policy_list.site");
        let renamed = vec![
            ("DC1".to_string(), "SAME".to_string()),
            ("DC2".to_string(), "SAME".to_string()),
        ];
        let err = check_collisions(&kind, &renamed).unwrap_err();
        match err {
            NameError::NameCollision { offenders, .. } => {
                assert_eq!(offenders, vec!["DC1".to_string(), "DC2".to_string()]);
            }
            _ => panic!("expected NameCollision"),
        }
    }

    #[test]
    fn distinct_names_do_not_collide() {
        let kind = Kind::new("policy_list.site");
        let renamed = vec![("DC1".to_string(), "A".to_string()), ("DC2".to_string(), "B".to_string())];
        assert!(check_collisions(&kind, &renamed).is_ok());
    }
}
