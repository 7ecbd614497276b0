use super::*;
use crate::error::ConfigError;

const SAMPLE: &str = r#"
{
  // trailing comments and commas are fine (JSON5)
  "set-hostname": "{domain}-{instance_id}",
  "domains": {
    "web": {
      "attach-volume": [
        {
          "device": "/dev/xvdf",
          "source": "xp",
          "volume-id": "vol-aaa",
          "pool-name": "web-pool",
          "exec": [
            { "lines": [ { "argv": ["true"], "ec": "0" } ] },
          ],
        },
      ],
      "update-route53": [
        { "hostedzone": "Z1", "name": "web.example.com.", "ttl": 300 },
      ],
      "notify": [
        { "backend": "aws-sqs", "options": { "QueueUrl": "q" } },
      ],
    },
  },
}
"#;

#[test]
fn parses_and_validates_a_well_formed_document() {
    let cfg = parse(SAMPLE).unwrap();
    assert_eq!(cfg.domains.len(), 1);
    let web = &cfg.domains["web"];
    assert_eq!(web.attach_volume[0].source, "xp");
    assert_eq!(web.attach_volume[0].pool_name.as_deref(), Some("web-pool"));
    assert!(web.attach_volume[0].critical);
}

#[test]
fn rejects_empty_domains_map() {
    let err = parse(r#"{"domains": {}}"#).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn rejects_unknown_source_character() {
    let doc = r#"{"domains": {"d": {"attach-volume": [
        {"device": "/dev/xvdf", "source": "z"}
    ]}}}"#;
    let err = parse(doc).unwrap_err();
    assert!(matches!(err, ConfigError::Domain { .. }));
}

#[test]
fn pool_source_without_pool_name_is_rejected() {
    let doc = r#"{"domains": {"d": {"attach-volume": [
        {"device": "/dev/xvdf", "source": "p"}
    ]}}}"#;
    let err = parse(doc).unwrap_err();
    assert!(matches!(err, ConfigError::Domain { .. }));
}

#[test]
fn zero_ttl_route53_is_rejected() {
    let doc = r#"{"domains": {"d": {"update-route53": [
        {"hostedzone": "Z1", "name": "x.", "ttl": 0}
    ]}}}"#;
    let err = parse(doc).unwrap_err();
    assert!(matches!(err, ConfigError::Domain { .. }));
}

#[test]
fn bad_exit_code_range_is_rejected_at_parse_time() {
    let doc = r#"{"domains": {"d": {"exec": [
        {"lines": [{"argv": ["true"], "ec": "5-2"}]}
    ]}}}"#;
    let err = parse(doc).unwrap_err();
    assert!(matches!(err, ConfigError::Domain { .. }));
}

#[test]
fn unknown_notify_backend_is_rejected() {
    let doc = r#"{"domains": {"d": {"notify": [
        {"backend": "carrier-pigeon", "options": {}}
    ]}}}"#;
    let err = parse(doc).unwrap_err();
    assert!(matches!(err, ConfigError::Domain { .. }));
}

#[test]
fn ans_sqs_typo_is_accepted_by_the_schema() {
    let doc = r#"{"domains": {"d": {"notify": [
        {"backend": "ans-sqs", "options": {}}
    ]}}}"#;
    assert!(parse(doc).is_ok());
}

#[test]
fn malformed_json5_is_a_malformed_error() {
    let err = parse("{ not json at all").unwrap_err();
    assert!(matches!(err, ConfigError::Malformed(_)));
}
