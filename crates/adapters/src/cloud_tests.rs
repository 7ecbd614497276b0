use super::fake::FakeCloudClient;
use super::*;
use serde_json::json;

#[tokio::test]
async fn wraps_a_successful_call_with_a_transaction_log_entry() {
    let inner = FakeCloudClient::new();
    inner.set_default_response(json!({"Volumes": []}));
    let client = LoggingCloudClient::new(inner, "web", false);

    let (result, log) = client.call("describe_volumes", json!({"x": 1})).await;
    assert!(result.is_ok());
    assert_eq!(log.method, "describe_volumes");
    assert_eq!(log.domain, "web");
    assert!(!log.dry);
    assert_eq!(log.param, json!({"x": 1}));
}

#[tokio::test]
async fn a_failed_call_still_produces_exactly_one_log_entry() {
    let inner = FakeCloudClient::new();
    inner.push_response(Err(CloudError::CallFailed {
        method: "attach_volume".to_string(),
        message: "conflict".to_string(),
    }));
    let client = LoggingCloudClient::new(inner, "web", false);

    let (result, log) = client.call("attach_volume", json!({})).await;
    assert!(result.is_err());
    assert_eq!(log.method, "attach_volume");
}

#[tokio::test]
async fn dry_run_skips_the_inner_call_entirely() {
    let inner = FakeCloudClient::new();
    let client = LoggingCloudClient::new(inner.clone(), "web", true);

    let (result, log) = client.call("create_volume", json!({})).await;
    assert!(result.is_ok());
    assert!(log.dry);
    assert!(inner.calls().is_empty());
}

#[tokio::test]
async fn unconfigured_cloud_client_fails_every_call() {
    let client = UnconfiguredCloudClient;
    let err = client.call("describe_volumes", json!({})).await.unwrap_err();
    match err {
        CloudError::CallFailed { method, .. } => assert_eq!(method, "describe_volumes"),
    }
}
