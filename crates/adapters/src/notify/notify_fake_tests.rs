use super::*;

#[tokio::test]
async fn records_posted_subject_and_body() {
    let backend = FakeNotifyBackend::new();
    backend.post("subj", "body").await.unwrap();
    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].subject, "subj");
    assert_eq!(calls[0].body, "body");
}
