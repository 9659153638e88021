use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use sastre_catalog::Catalog;
use sastre_model::{Id, Item, Kind};

use crate::error::GraphError;

type ItemKey = (Kind, Id);

/// An in-memory reference graph over one snapshot of items: every item's
/// embedded references to other items, resolved via the catalog's
/// reference-site descriptors (spec.md §4.D).
pub struct ReferenceGraph<'c> {
    catalog: &'c Catalog,
    items: HashMap<ItemKey, Item>,
    /// `referenced -> referrers`: who points at a given item. Used to order
    /// items so a referenced item's creation always precedes its referrer.
    referenced_by: HashMap<ItemKey, Vec<ItemKey>>,
    kinds: BTreeSet<Kind>,
}

impl<'c> ReferenceGraph<'c> {
    /// Builds a graph from `items`, scanning each body's reference sites
    /// for edges to other items in the same snapshot. A reference whose
    /// target isn't present in `items` is simply not recorded as an edge —
    /// callers that care (e.g. restore, computing unresolved references)
    /// inspect the source item's body directly.
    pub fn build(catalog: &'c Catalog, items: impl IntoIterator<Item = Item>) -> Result<Self, GraphError> {
        let mut by_key = HashMap::new();
        let mut kinds = BTreeSet::new();
        for item in items {
            kinds.insert(item.kind.clone());
            by_key.insert((item.kind.clone(), item.id.clone()), item);
        }

        let mut referenced_by: HashMap<ItemKey, Vec<ItemKey>> = HashMap::new();
        for (key, item) in &by_key {
            let entry = catalog.require(&item.kind)?;
            for site in entry.reference_sites() {
                for id in sastre_catalog::walk_get(&item.body, site.pointer) {
                    let Some(id_str) = id.as_str() else { continue };
                    let target_key = (site.target_kind.clone(), Id::new(id_str));
                    if by_key.contains_key(&target_key) {
                        referenced_by.entry(target_key).or_default().push(key.clone());
                    }
                }
            }
        }

        Ok(ReferenceGraph {
            catalog,
            items: by_key,
            referenced_by,
            kinds,
        })
    }

    pub fn item(&self, kind: &Kind, id: &Id) -> Option<&Item> {
        self.items.get(&(kind.clone(), id.clone()))
    }

    pub fn items_of_kind(&self, kind: &Kind) -> impl Iterator<Item = &Item> {
        self.items.values().filter(move |i| &i.kind == kind)
    }

    /// Kinds in a dependency-valid order: a kind referenced by another kind
    /// (via the catalog's static `depends_on`, or an edge actually observed
    /// in this snapshot) always comes before its referrer. Ties break by
    /// kind name ascending (spec.md §4.D), and a cycle is broken by cutting
    /// the edge into whichever kind sorts lowest, logged as a warning.
    pub fn topo_kinds(&self) -> Vec<Kind> {
        let mut deps: HashMap<Kind, BTreeSet<Kind>> = HashMap::new();
        for kind in &self.kinds {
            deps.entry(kind.clone()).or_default();
        }
        for kind in &self.kinds {
            if let Some(entry) = self.catalog.entry(kind) {
                for dep in entry.depends_on_kinds() {
                    if self.kinds.contains(&dep) {
                        deps.entry(kind.clone()).or_default().insert(dep);
                    }
                }
            }
        }
        for (target, referrers) in &self.referenced_by {
            for referrer in referrers {
                if referrer.0 != target.0 {
                    deps.entry(referrer.0.clone()).or_default().insert(target.0.clone());
                }
            }
        }

        topo_sort(self.kinds.iter().cloned().collect(), deps)
    }

    /// Items within `kind`, ordered so that an item referenced by another
    /// item of the *same* kind precedes its referrer; ties break by name
    /// ascending.
    pub fn topo_items(&self, kind: &Kind) -> Vec<&Item> {
        let mut in_kind: Vec<&Item> = self.items_of_kind(kind).collect();
        in_kind.sort_by(|a, b| a.name.cmp(&b.name));

        let mut deps: HashMap<Id, BTreeSet<Id>> = HashMap::new();
        for item in &in_kind {
            deps.entry(item.id.clone()).or_default();
        }
        for item in &in_kind {
            let key = (kind.clone(), item.id.clone());
            if let Some(referrers) = self.referenced_by.get(&key) {
                for (ref_kind, ref_id) in referrers {
                    if ref_kind == kind && ref_id != &item.id {
                        deps.entry(ref_id.clone()).or_default().insert(item.id.clone());
                    }
                }
            }
        }

        let name_by_id: HashMap<Id, &str> = in_kind.iter().map(|i| (i.id.clone(), i.name.as_str())).collect();
        let ordered_ids = topo_sort_with_key(
            in_kind.iter().map(|i| i.id.clone()).collect(),
            deps,
            |id| name_by_id.get(id).copied().unwrap_or(""),
        );

        let by_id: HashMap<Id, &Item> = in_kind.iter().map(|i| (i.id.clone(), *i)).collect();
        ordered_ids.into_iter().filter_map(|id| by_id.get(&id).copied()).collect()
    }

    /// Returns a copy of `body` (an item of kind `kind`) with every
    /// embedded reference rewritten through `mapping: (kind, old_id) ->
    /// new_id`. References whose target isn't in `mapping` are left as-is.
    pub fn rewrite(&self, kind: &Kind, body: &Value, mapping: &HashMap<ItemKey, Id>) -> Value {
        let mut out = body.clone();
        let Some(entry) = self.catalog.entry(kind) else {
            return out;
        };
        for site in entry.reference_sites() {
            let target_kind = site.target_kind.clone();
            let mapping = mapping;
            sastre_catalog::walk_set_mut(&mut out, site.pointer, &mut |v| {
                if let Some(s) = v.as_str() {
                    if let Some(new_id) = mapping.get(&(target_kind.clone(), Id::new(s))) {
                        *v = Value::String(new_id.as_str().to_string());
                    }
                }
            });
        }
        out
    }
}

fn topo_sort(nodes: Vec<Kind>, deps: HashMap<Kind, BTreeSet<Kind>>) -> Vec<Kind> {
    topo_sort_with_key(nodes, deps, |k| k.as_str())
}

/// Generic Kahn's-algorithm topo sort with deterministic tie-breaking by
/// `key`. Any remaining cycle is broken by repeatedly dropping the
/// dependency edge pointing at the lowest-keyed node still blocked, which
/// always makes progress since a cycle has at least one such edge.
fn topo_sort_with_key<T, K>(nodes: Vec<T>, mut deps: HashMap<T, BTreeSet<T>>, key: K) -> Vec<T>
where
    T: std::hash::Hash + Eq + Clone + Ord,
    K: Fn(&T) -> &str,
{
    let mut remaining: BTreeSet<T> = nodes.into_iter().collect();
    let mut out = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let mut ready: Vec<&T> = remaining
            .iter()
            .filter(|n| deps.get(*n).map(|d| d.iter().all(|dep| !remaining.contains(dep))).unwrap_or(true))
            .collect();

        if ready.is_empty() {
            // Cycle: cut the dependency into whichever blocked node sorts
            // lowest by name, then retry.
            let victim = remaining.iter().min_by_key(|n| key(n)).cloned().unwrap();
            tracing::warn!(kind = key(&victim), "breaking dependency cycle");
            deps.insert(victim.clone(), BTreeSet::new());
            ready.push(remaining.iter().find(|n| **n == victim).unwrap());
        }

        ready.sort_by_key(|n| key(n).to_string());
        let next = ready[0].clone();
        remaining.remove(&next);
        out.push(next);
    }

    out
}
