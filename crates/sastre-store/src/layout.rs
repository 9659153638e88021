pub const SERVER_INFO_FILE: &str = "server_info.json";
pub const INDEX_FILE: &str = "index.json";
pub const CERTIFICATES_DIR: &str = "certificates";
pub const WAN_EDGE_LIST_FILE: &str = "wan_edge_list.json";
pub const DEVICE_CONFIGS_DIR: &str = "device_configs";

/// Suffix of a device template's attachment-records file,
/// `<safe-name>_attached.json` (spec.md §4.C).
pub fn attached_suffix() -> &'static str {
    "_attached"
}

/// Suffix of a device template's attachment-values file,
/// `<safe-name>_values.json` (spec.md §4.C).
pub fn values_suffix() -> &'static str {
    "_values"
}
