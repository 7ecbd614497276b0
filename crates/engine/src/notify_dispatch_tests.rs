use super::*;
use fleetd_adapters::{CloudClient, FakeCloudClient};
use fleetd_core::config::{DomainConfig, NotifySpec};
use fleetd_core::test_support::sample_macro_set;
use fleetd_core::DaemonState;
use serde_json::json;
use std::collections::BTreeMap;

fn sns_spec(matrix: Option<BTreeMap<String, bool>>) -> NotifySpec {
    NotifySpec {
        backend: "aws-sns".to_string(),
        options: json!({"TopicArn": "arn:aws:sns:us-east-1:1:t"}),
        matrix,
        envelope: None,
    }
}

#[test]
fn missing_matrix_defaults_to_enabled() {
    let spec = sns_spec(None);
    assert!(enabled_for(&spec, "started"));
}

#[test]
fn matrix_present_but_missing_key_defaults_to_enabled() {
    let mut matrix = BTreeMap::new();
    matrix.insert("failed".to_string(), false);
    let spec = sns_spec(Some(matrix));
    assert!(enabled_for(&spec, "started"));
}

#[test]
fn matrix_can_explicitly_disable_an_event() {
    let mut matrix = BTreeMap::new();
    matrix.insert("started".to_string(), false);
    let spec = sns_spec(Some(matrix));
    assert!(!enabled_for(&spec, "started"));
}

#[tokio::test]
async fn notify_all_posts_to_every_configured_domain() {
    let fake = FakeCloudClient::new();
    let cloud: Arc<dyn CloudClient> = Arc::new(fake.clone());

    let mut domains = BTreeMap::new();
    let mut web = DomainConfig::default();
    web.notify.push(sns_spec(None));
    domains.insert("web".to_string(), web);
    domains.insert("db".to_string(), DomainConfig::default());

    let mut ms = sample_macro_set();
    ms.daemon_state = DaemonState::Started;

    notify_all(cloud, &domains, &ms).await;

    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "publish");
}

#[tokio::test]
async fn notify_all_skips_an_event_disabled_in_the_matrix() {
    let fake = FakeCloudClient::new();
    let cloud: Arc<dyn CloudClient> = Arc::new(fake.clone());

    let mut matrix = BTreeMap::new();
    matrix.insert("started".to_string(), false);

    let mut domains = BTreeMap::new();
    let mut web = DomainConfig::default();
    web.notify.push(sns_spec(Some(matrix)));
    domains.insert("web".to_string(), web);

    let mut ms = sample_macro_set();
    ms.daemon_state = DaemonState::Started;

    notify_all(cloud, &domains, &ms).await;

    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn notify_all_never_aborts_when_a_backend_post_fails() {
    let fake = FakeCloudClient::new();
    fake.push_response(Err(fleetd_adapters::CloudError::CallFailed {
        method: "publish".to_string(),
        message: "throttled".to_string(),
    }));
    let cloud: Arc<dyn CloudClient> = Arc::new(fake.clone());

    let mut domains = BTreeMap::new();
    let mut web = DomainConfig::default();
    web.notify.push(sns_spec(None));
    domains.insert("web".to_string(), web);

    let mut ms = sample_macro_set();
    ms.daemon_state = DaemonState::Started;

    // Must return normally, not panic, even though the post failed.
    notify_all(cloud, &domains, &ms).await;
}

#[tokio::test]
async fn notify_all_rejects_an_unknown_backend_kind_without_posting() {
    let fake = FakeCloudClient::new();
    let cloud: Arc<dyn CloudClient> = Arc::new(fake.clone());

    let mut domains = BTreeMap::new();
    let mut web = DomainConfig::default();
    let mut spec = sns_spec(None);
    spec.backend = "carrier-pigeon".to_string();
    web.notify.push(spec);
    domains.insert("web".to_string(), web);

    let mut ms = sample_macro_set();
    ms.daemon_state = DaemonState::Started;

    notify_all(cloud, &domains, &ms).await;

    assert!(fake.calls().is_empty());
}
