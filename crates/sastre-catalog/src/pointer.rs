use serde_json::Value;

/// One step of a declarative, JSON-path-like descriptor used to locate a
/// field inside an item body without per-kind code (spec.md §4.B, §9).
/// `AnyElement` lets a single descriptor cover every element of an array —
/// e.g. a policy definition's `sequences[].match.entries[].ref` — without
/// the catalog needing to know array lengths ahead of time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(&'static str),
    AnyElement,
}

/// A sequence of `PathSegment`s locating zero or more leaf values inside a
/// body. Pointers ending inside an array (via `AnyElement`) can resolve to
/// more than one leaf; pointers without a wildcard resolve to at most one.
pub type Pointer = &'static [PathSegment];

/// Collect every leaf `&Value` that `pointer` resolves to under `value`.
pub fn walk_get<'a>(value: &'a Value, pointer: Pointer) -> Vec<&'a Value> {
    let mut out = Vec::new();
    walk_get_inner(value, pointer, &mut out);
    out
}

fn walk_get_inner<'a>(value: &'a Value, pointer: Pointer, out: &mut Vec<&'a Value>) {
    match pointer.split_first() {
        None => out.push(value),
        Some((PathSegment::Key(key), rest)) => {
            if let Some(next) = value.get(*key) {
                walk_get_inner(next, rest, out);
            }
        }
        Some((PathSegment::AnyElement, rest)) => {
            if let Some(items) = value.as_array() {
                for item in items {
                    walk_get_inner(item, rest, out);
                }
            }
        }
    }
}

/// Apply `f` to every leaf value `pointer` resolves to under `value`,
/// mutating in place. Used by reference rewriting (spec.md §4.D `rewrite`).
pub fn walk_set_mut(value: &mut Value, pointer: Pointer, f: &mut dyn FnMut(&mut Value)) {
    match pointer.split_first() {
        None => f(value),
        Some((PathSegment::Key(key), rest)) => {
            if let Some(next) = value.get_mut(*key) {
                walk_set_mut(next, rest, f);
            }
        }
        Some((PathSegment::AnyElement, rest)) => {
            if let Some(items) = value.as_array_mut() {
                for item in items {
                    walk_set_mut(item, rest, f);
                }
            }
        }
    }
}

/// Read a single string leaf (used for id-field / name-field descriptors,
/// which never contain a wildcard and resolve to at most one value).
pub fn get_str<'a>(value: &'a Value, pointer: Pointer) -> Option<&'a str> {
    walk_get(value, pointer).into_iter().next()?.as_str()
}

/// Read a single bool leaf (used for the factory-default-field descriptor).
pub fn get_bool(value: &Value, pointer: Pointer) -> Option<bool> {
    walk_get(value, pointer).into_iter().next()?.as_bool()
}
