use std::fmt;

/// A controller-assigned opaque identifier. Globally unique *on the
/// controller that minted it*, but never portable across controllers — the
/// engine never persists an `Id` as the cross-controller identity of an item
/// (see `Name`-based identity in `sastre_catalog`). Values are typically
/// UUID-shaped strings, but the engine treats the contents as opaque.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_displays_as_its_raw_string() {
        let id = Id::new("a1b2c3");
        assert_eq!(id.to_string(), "a1b2c3");
    }
}
