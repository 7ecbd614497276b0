use super::*;
use crate::cloud::FakeCloudClient;
use std::sync::Arc;

fn client() -> Arc<dyn CloudClient> {
    Arc::new(FakeCloudClient::new())
}

#[test]
fn aws_sns_resolves_to_an_sns_backend() {
    assert!(mk_notify_backend("aws-sns", serde_json::json!({}), client()).is_ok());
}

#[test]
fn aws_sqs_resolves_to_an_sqs_backend() {
    assert!(mk_notify_backend("aws-sqs", serde_json::json!({}), client()).is_ok());
}

#[test]
fn the_ans_sqs_typo_is_also_accepted() {
    assert!(mk_notify_backend("ans-sqs", serde_json::json!({}), client()).is_ok());
}

#[test]
fn unknown_kinds_are_rejected() {
    let err = mk_notify_backend("carrier-pigeon", serde_json::json!({}), client()).unwrap_err();
    assert!(matches!(err, NotifyError::UnknownKind(_)));
}
