//! The static item catalog: one `CatalogEntry` per kind. This is
//! intentionally a plain data table (spec.md §9 "plugin-style per-kind
//! metadata... re-architect as a table of descriptors") — adding a kind
//! means adding a row here, never writing new extraction/rewrite code.

use crate::descriptor::{CatalogEntry, Endpoints, ReferenceSiteDef};
use crate::pointer::Pointer;
use crate::pointer::PathSegment::{AnyElement, Key};

const ID: Pointer = &[Key("id")];
const NAME: Pointer = &[Key("name")];
const FACTORY_DEFAULT: Pointer = &[Key("factoryDefault")];

pub static ENTRIES: &[CatalogEntry] = &[
    // --- Policy lists -----------------------------------------------------
    CatalogEntry {
        kind: "policy_list.site",
        endpoints: Endpoints::uniform("template/policy/list/site"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &[],
        reference_sites: &[],
        min_version: None,
        tags: &["policy_list", "all"],
    },
    CatalogEntry {
        kind: "policy_list.vpn",
        endpoints: Endpoints::uniform("template/policy/list/vpn"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &[],
        reference_sites: &[],
        min_version: None,
        tags: &["policy_list", "all"],
    },
    CatalogEntry {
        kind: "policy_list.prefix",
        endpoints: Endpoints::uniform("template/policy/list/prefix"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &[],
        reference_sites: &[],
        min_version: None,
        tags: &["policy_list", "all"],
    },
    CatalogEntry {
        kind: "policy_list.community",
        endpoints: Endpoints::uniform("template/policy/list/community"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &[],
        reference_sites: &[],
        min_version: None,
        tags: &["policy_list", "all"],
    },
    CatalogEntry {
        kind: "policy_list.zone",
        endpoints: Endpoints::uniform("template/policy/list/zone"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &[],
        reference_sites: &[],
        min_version: None,
        tags: &["policy_list", "policy_security", "all"],
    },
    CatalogEntry {
        kind: "policy_list.app",
        endpoints: Endpoints::uniform("template/policy/list/app"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &[],
        reference_sites: &[],
        min_version: None,
        tags: &["policy_list", "policy_customapp", "all"],
    },
    // --- Policy definitions -------------------------------------------------
    CatalogEntry {
        kind: "policy_definition.vedge",
        endpoints: Endpoints::uniform("template/policy/definition/vedge"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &["policy_list.site", "policy_list.vpn", "policy_list.prefix"],
        reference_sites: &[
            ReferenceSiteDef {
                target_kind: "policy_list.site",
                pointer: &[Key("sequences"), AnyElement, Key("match"), Key("entries"), AnyElement, Key("siteListId")],
            },
            ReferenceSiteDef {
                target_kind: "policy_list.vpn",
                pointer: &[Key("sequences"), AnyElement, Key("match"), Key("entries"), AnyElement, Key("vpnListId")],
            },
            ReferenceSiteDef {
                target_kind: "policy_list.prefix",
                pointer: &[Key("sequences"), AnyElement, Key("match"), Key("entries"), AnyElement, Key("prefixListId")],
            },
        ],
        min_version: None,
        tags: &["policy_definition", "policy_vedge", "all"],
    },
    CatalogEntry {
        kind: "policy_definition.vsmart",
        endpoints: Endpoints::uniform("template/policy/definition/vsmart"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &["policy_list.site", "policy_list.vpn", "policy_list.community"],
        reference_sites: &[
            ReferenceSiteDef {
                target_kind: "policy_list.site",
                pointer: &[Key("sequences"), AnyElement, Key("match"), Key("entries"), AnyElement, Key("siteListId")],
            },
            ReferenceSiteDef {
                target_kind: "policy_list.community",
                pointer: &[Key("sequences"), AnyElement, Key("actions"), AnyElement, Key("communityListId")],
            },
        ],
        min_version: None,
        tags: &["policy_definition", "policy_vsmart", "all"],
    },
    CatalogEntry {
        kind: "policy_definition.security",
        endpoints: Endpoints::uniform("template/policy/definition/zonebasedfw"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &["policy_list.zone", "policy_list.app"],
        reference_sites: &[
            ReferenceSiteDef {
                target_kind: "policy_list.zone",
                pointer: &[Key("sequences"), AnyElement, Key("match"), Key("entries"), AnyElement, Key("sourceZoneListId")],
            },
            ReferenceSiteDef {
                target_kind: "policy_list.app",
                pointer: &[Key("sequences"), AnyElement, Key("match"), Key("entries"), AnyElement, Key("appListId")],
            },
        ],
        min_version: None,
        tags: &["policy_definition", "policy_security", "all"],
    },
    CatalogEntry {
        kind: "policy_definition.voice",
        endpoints: Endpoints::uniform("template/policy/definition/dialpeer"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &[],
        reference_sites: &[],
        min_version: Some((19, 2)),
        tags: &["policy_definition", "policy_voice", "all"],
    },
    // --- Activated policy profiles ------------------------------------------
    CatalogEntry {
        kind: "policy_vsmart",
        endpoints: Endpoints::uniform("template/policy/vsmart"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &["policy_definition.vsmart"],
        reference_sites: &[ReferenceSiteDef {
            target_kind: "policy_definition.vsmart",
            pointer: &[Key("policyDefinition"), AnyElement, Key("definitionId")],
        }],
        min_version: None,
        tags: &["policy_profile", "policy_vsmart", "all"],
    },
    // --- Feature templates ---------------------------------------------------
    CatalogEntry {
        kind: "template_feature",
        endpoints: Endpoints::uniform("template/feature"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &["policy_list.prefix"],
        reference_sites: &[ReferenceSiteDef {
            target_kind: "policy_list.prefix",
            pointer: &[Key("templateDefinition"), Key("tracker"), Key("vipPrefixList"), Key("vipValue")],
        }],
        min_version: None,
        tags: &["template_feature", "all"],
    },
    // --- Device templates ------------------------------------------------
    CatalogEntry {
        kind: "template_device",
        endpoints: Endpoints::uniform("template/device"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &["template_feature", "policy_vsmart"],
        reference_sites: &[ReferenceSiteDef {
            target_kind: "template_feature",
            pointer: &[Key("generalTemplates"), AnyElement, Key("templateId")],
        }],
        min_version: None,
        tags: &["template_device", "all"],
    },
    // --- Feature profiles (20.1+ config-group model) ---------------------
    CatalogEntry {
        kind: "feature_profile.system",
        endpoints: Endpoints::uniform("v1/feature-profile/sdwan/system"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &[],
        reference_sites: &[],
        min_version: Some((20, 1)),
        tags: &["feature_profile", "all"],
    },
    CatalogEntry {
        kind: "feature_profile.transport",
        endpoints: Endpoints::uniform("v1/feature-profile/sdwan/transport"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &["policy_list.prefix"],
        reference_sites: &[ReferenceSiteDef {
            target_kind: "policy_list.prefix",
            pointer: &[Key("trackerRefs"), AnyElement, Key("prefixListId")],
        }],
        min_version: Some((20, 1)),
        tags: &["feature_profile", "all"],
    },
    CatalogEntry {
        kind: "config_group",
        endpoints: Endpoints::uniform("v1/config-group"),
        id_field: ID,
        name_field: NAME,
        factory_default_field: FACTORY_DEFAULT,
        depends_on: &["feature_profile.system", "feature_profile.transport"],
        reference_sites: &[
            ReferenceSiteDef {
                target_kind: "feature_profile.system",
                pointer: &[Key("profiles"), AnyElement, Key("systemProfileId")],
            },
            ReferenceSiteDef {
                target_kind: "feature_profile.transport",
                pointer: &[Key("profiles"), AnyElement, Key("transportProfileId")],
            },
        ],
        min_version: Some((20, 1)),
        tags: &["config_group", "all"],
    },
];
