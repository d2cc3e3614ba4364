#![cfg(feature = "serde")]

use bt_core::{kinds, NodeDesc, ResolverConfig, Status};

#[test]
fn node_descriptions_round_trip_through_json() {
    let desc = NodeDesc::decision([NodeDesc::strategy(
        NodeDesc::fact_exists("enemy_visible"),
        NodeDesc::scope(
            [("target", "@enemy")],
            NodeDesc::sequence([
                NodeDesc::set_fact_const("#target", "marked"),
                NodeDesc::leaf("Attack").with_params(["#target"]),
            ]),
        ),
    )
    .with_label("engage")])
    .with_label("root");

    let json = serde_json::to_string(&desc).unwrap();
    let back: NodeDesc = serde_json::from_str(&json).unwrap();
    assert_eq!(back, desc);
}

#[test]
fn omitted_description_fields_default_to_empty() {
    let desc: NodeDesc = serde_json::from_str(r#"{ "kind": "FactExists" }"#).unwrap();
    assert_eq!(desc.kind, kinds::FACT_EXISTS);
    assert!(desc.label.is_empty());
    assert!(desc.children.is_empty());
    assert!(desc.params.is_empty());
}

#[test]
fn statuses_serialize_by_name() {
    for status in [
        Status::Invalid,
        Status::Success,
        Status::Failure,
        Status::Running,
        Status::Suspended,
    ] {
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, format!("\"{status:?}\""));
        assert_eq!(serde_json::from_str::<Status>(&json).unwrap(), status);
    }
}

#[test]
fn resolver_config_fills_missing_fields_from_default() {
    let config: ResolverConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, ResolverConfig::default());
    assert_eq!(config.max_depth, 16);

    let config: ResolverConfig = serde_json::from_str(r#"{ "max_depth": 4 }"#).unwrap();
    assert_eq!(config.max_depth, 4);

    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(serde_json::from_str::<ResolverConfig>(&json).unwrap(), config);
}
