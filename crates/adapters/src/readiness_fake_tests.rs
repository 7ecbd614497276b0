use super::*;

#[test]
fn records_calls_in_order() {
    let notifier = FakeReadinessNotifier::new();
    notifier.ready();
    notifier.status("started");
    notifier.stopping();
    assert_eq!(
        notifier.calls(),
        vec![
            ReadinessCall::Ready,
            ReadinessCall::Status("started".to_string()),
            ReadinessCall::Stopping,
        ]
    );
}
