use sha2::{Digest, Sha256};

/// Render `value` as the canonical JSON text the store and the update-diff
/// comparison both rely on: UTF-8, object keys sorted, 2-space indent
/// (spec.md §6). `serde_json::Value`'s `Map` is a `BTreeMap` unless the
/// `preserve_order` feature is enabled (it isn't, here), so keys already
/// come out sorted; we only need to ask for pretty-printing.
pub fn canonicalize(value: &serde_json::Value) -> String {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    serde::Serialize::serialize(value, &mut ser).expect("Value serialization cannot fail");
    String::from_utf8(buf).expect("serde_json always emits valid UTF-8")
}

/// A stable content digest of a body's canonical form, used for:
/// - the update-diff comparison (`sastre_engine::restore`) to decide whether
///   a PUT is needed;
/// - "log ERROR with body digest" (spec.md §4.E.2 step 6), so a failed push
///   can be matched back to a specific body without re-printing it whole.
pub fn digest(value: &serde_json::Value) -> String {
    let canon = canonicalize(value);
    let mut hasher = Sha256::new();
    hasher.update(canon.as_bytes());
    format!("{:x}", hasher.finalize())
}
