use std::fmt;

/// A short tag naming a family of configuration items, e.g. `template_device`
/// or `policy_list.site`. `Kind` is the engine's unit of catalog lookup.
///
/// Modeled as a newtype over `String` rather than an enum: the catalog lists
/// ~80+ kinds and new kinds arrive as the controller's API grows, so the tag
/// space is data the catalog owns, not a closed Rust type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Kind(String);

impl Kind {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Kind {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Kind {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Kind {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for Kind {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A human-friendly selector that expands to a set of `Kind`s, e.g. `policy_list`
/// or `all`. See the Item Catalog's tag table for the expansion rules.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_roundtrips_through_json() {
        let k = Kind::new("template_device");
        let s = serde_json::to_string(&k).unwrap();
        assert_eq!(s, "\"template_device\"");
        let back: Kind = serde_json::from_str(&s).unwrap();
        assert_eq!(back, k);
    }
}
