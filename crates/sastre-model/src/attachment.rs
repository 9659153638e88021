use crate::Id;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Records the variable bindings used when a device was attached to a
/// device template. `values` is a `BTreeMap` (rather than `HashMap`) so
/// persisted attachment files are byte-stable across runs, matching the
/// store's "sorted keys" canonical-JSON requirement (spec.md §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub device_template_id: Id,
    pub device_id: Id,
    pub values: BTreeMap<String, String>,
}

impl Attachment {
    pub fn new(
        device_template_id: Id,
        device_id: Id,
        values: BTreeMap<String, String>,
    ) -> Self {
        Self {
            device_template_id,
            device_id,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_values_are_order_stable() {
        let mut values = BTreeMap::new();
        values.insert("zz_var".to_string(), "1".to_string());
        values.insert("aa_var".to_string(), "2".to_string());
        let a = Attachment::new(Id::new("dt1"), Id::new("d1"), values);
        let json = serde_json::to_string(&a).unwrap();
        let aa = json.find("aa_var").unwrap();
        let zz = json.find("zz_var").unwrap();
        assert!(aa < zz, "BTreeMap should serialize keys in sorted order");
    }
}
