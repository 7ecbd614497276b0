use super::*;
use fleetd_adapters::FakeCloudClient;
use serde_json::{json, Value};

#[tokio::test]
async fn cleans_up_every_matching_volume() {
    let fake = FakeCloudClient::new();
    fake.push_response(Ok(json!({
        "Volumes": [
            {"VolumeId": "vol-a", "Attachments": [{"InstanceId": "i-1"}]},
            {"VolumeId": "vol-b", "Attachments": []},
        ]
    })));
    fake.push_response(Ok(Value::Null)); // detach vol-a
    fake.push_response(Ok(Value::Null)); // delete vol-a
    fake.push_response(Ok(Value::Null)); // delete vol-b

    let cloud: Arc<dyn CloudClient> = Arc::new(fake.clone());
    let (logs, err) = clean_up_transaction(cloud, "transc-1", false).await;

    assert!(err.is_none());
    assert_eq!(logs.len(), 4);
    let methods: Vec<&str> = fake.calls().iter().map(|c| c.method.as_str()).collect();
    assert_eq!(methods, vec!["describe_volumes", "detach_volume", "delete_volume", "delete_volume"]);
}

#[tokio::test]
async fn no_matching_volumes_is_a_no_op() {
    let fake = FakeCloudClient::new();
    fake.push_response(Ok(json!({"Volumes": []})));

    let cloud: Arc<dyn CloudClient> = Arc::new(fake.clone());
    let (logs, err) = clean_up_transaction(cloud, "transc-1", false).await;

    assert!(err.is_none());
    assert_eq!(logs.len(), 1);
}

#[tokio::test]
async fn continues_past_a_failed_volume_and_reports_only_the_first_error() {
    let fake = FakeCloudClient::new();
    fake.push_response(Ok(json!({
        "Volumes": [
            {"VolumeId": "vol-a", "Attachments": []},
            {"VolumeId": "vol-b", "Attachments": []},
        ]
    })));
    fake.push_response(Err(fleetd_adapters::CloudError::CallFailed {
        method: "delete_volume".to_string(),
        message: "in use".to_string(),
    }));
    fake.push_response(Ok(Value::Null)); // delete vol-b still attempted

    let cloud: Arc<dyn CloudClient> = Arc::new(fake.clone());
    let (_logs, err) = clean_up_transaction(cloud, "transc-1", false).await;

    assert!(err.is_some());
    let methods: Vec<&str> = fake.calls().iter().map(|c| c.method.as_str()).collect();
    assert_eq!(methods, vec!["describe_volumes", "delete_volume", "delete_volume"]);
}

#[tokio::test]
async fn describe_failure_short_circuits_with_no_further_calls() {
    let fake = FakeCloudClient::new();
    fake.push_response(Err(fleetd_adapters::CloudError::CallFailed {
        method: "describe_volumes".to_string(),
        message: "denied".to_string(),
    }));

    let cloud: Arc<dyn CloudClient> = Arc::new(fake.clone());
    let (logs, err) = clean_up_transaction(cloud, "transc-1", false).await;

    assert!(err.is_some());
    assert_eq!(logs.len(), 1);
    assert_eq!(fake.calls().len(), 1);
}
