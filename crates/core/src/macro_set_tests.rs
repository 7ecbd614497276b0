use super::*;
use crate::id::TransactionId;

fn sample() -> MacroSet {
    let mut ms = MacroSet::new(TransactionId::new("transc-1"));
    ms.domain = "web".to_string();
    ms.instance_id = "i-0123".to_string();
    ms.instance_type = "m5.large".to_string();
    ms.instance_index = Some(7);
    ms.placement_zone = Some("us-east-1a".to_string());
    ms.public_ipv4_list = vec!["10.0.0.1".to_string(), "10.0.0.2".to_string()];
    ms
}

#[test]
fn null_scalars_render_as_empty_string() {
    let ms = MacroSet::new(TransactionId::new("t"));
    assert_eq!(ms.format("[{placement_zone}]").unwrap(), "[]");
}

#[test]
fn sequences_render_comma_and_space_joined() {
    let ms = sample();
    assert_eq!(
        ms.format("{public_ipv4_list}").unwrap(),
        "10.0.0.1, 10.0.0.2"
    );
}

#[test]
fn scalars_render_injectively() {
    let ms = sample();
    assert_eq!(ms.format("{domain}").unwrap(), "web");
    assert_eq!(ms.format("{instance_id}").unwrap(), "i-0123");
    assert_eq!(ms.format("{instance_index}").unwrap(), "7");
}

#[test]
fn all_json_is_tab_indented_json() {
    let ms = sample();
    let rendered = ms.format("{all_json}").unwrap();
    assert!(rendered.contains("\t\"domain\": \"web\""));
    let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(parsed["domain"], "web");
}

#[test]
fn unknown_placeholder_is_an_error() {
    let ms = sample();
    assert!(ms.format("{totally_bogus}").is_err());
}

#[test]
fn literal_text_without_braces_passes_through() {
    let ms = sample();
    assert_eq!(
        ms.format("no placeholders here").unwrap(),
        "no placeholders here"
    );
}

#[test]
fn every_documented_placeholder_is_total() {
    let ms = sample();
    let placeholders = [
        "all_json",
        "domain",
        "instance_id",
        "instance_type",
        "instance_index",
        "placement_region",
        "placement_zone",
        "hypervisor",
        "primary_public_ipv4",
        "primary_public_ipv6",
        "public_ipv4_list",
        "public_ipv6_list",
        "static_dns_rr",
        "attach_source",
        "attach_op",
        "volume_id",
        "volume_pool",
        "attached_device",
        "daemon_state",
        "error",
        "interrupt_action",
        "interrupt_time",
        "transaction_id",
        "transaction_log",
        "cwd",
        "ts",
        "pid",
    ];
    for p in placeholders {
        let template = format!("{{{p}}}");
        assert!(ms.format(&template).is_ok(), "placeholder {p} failed");
    }
}

#[test]
fn daemon_state_event_name_is_lowercase() {
    assert_eq!(DaemonState::Starting.event_name(), "starting");
    assert_eq!(DaemonState::Interrupted.event_name(), "interrupted");
    assert_eq!(DaemonState::Starting.to_string(), "starting");
}
