use crate::pointer::Pointer;
use sastre_model::{Kind, Tag};

/// Minimum controller version (major, minor) required for a kind to be
/// listed, pushed, or deleted (spec.md §4.B). `None` means the kind is
/// available on every supported controller version.
pub type MinVersion = Option<(u32, u32)>;

/// The REST paths a kind's CRUD operations live under. `{id}` in `get`,
/// `put`, and `delete` is substituted with the item's controller id at
/// call time.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub list: &'static str,
    pub get: &'static str,
    pub post: &'static str,
    pub put: &'static str,
    pub delete: &'static str,
}

impl Endpoints {
    /// Most kinds share one base path across all five operations, varying
    /// only by whether `{id}` is appended.
    pub const fn uniform(base: &'static str) -> Self {
        Endpoints {
            list: base,
            get: base,
            post: base,
            put: base,
            delete: base,
        }
    }
}

/// A declarative pointer into a body, naming the other `Kind` whose `Id`
/// is expected to appear there. Reference extraction and rewriting are
/// generic walkers over `pointer` driven entirely by this descriptor — no
/// kind-specific code is required (spec.md §4.B, §9).
#[derive(Debug, Clone)]
pub struct ReferenceSite {
    pub target_kind: Kind,
    pub pointer: Pointer,
}

/// Static, per-kind metadata: everything the engine needs to know about a
/// kind without containing any kind-specific logic (spec.md §3 "Catalog
/// Entry", §9 "plugin-style per-kind metadata" re-architected as data).
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub kind: &'static str,
    pub endpoints: Endpoints,
    pub id_field: Pointer,
    pub name_field: Pointer,
    pub factory_default_field: Pointer,
    pub depends_on: &'static [&'static str],
    pub reference_sites: &'static [ReferenceSiteDef],
    pub min_version: MinVersion,
    pub tags: &'static [&'static str],
}

/// A `const`-friendly version of `ReferenceSite` (kind name as `&'static
/// str` rather than an owned `Kind`), so the static registry table can be
/// written as plain data.
#[derive(Debug, Clone)]
pub struct ReferenceSiteDef {
    pub target_kind: &'static str,
    pub pointer: Pointer,
}

impl CatalogEntry {
    pub fn kind(&self) -> Kind {
        Kind::new(self.kind)
    }

    pub fn reference_sites(&self) -> impl Iterator<Item = ReferenceSite> + '_ {
        self.reference_sites.iter().map(|def| ReferenceSite {
            target_kind: Kind::new(def.target_kind),
            pointer: def.pointer,
        })
    }

    pub fn depends_on_kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.depends_on.iter().map(|s| Kind::new(*s))
    }

    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.tags.iter().map(|s| Tag::new(*s))
    }

    pub fn is_available_on(&self, controller_version: (u32, u32)) -> bool {
        match self.min_version {
            None => true,
            Some(min) => controller_version >= min,
        }
    }
}
