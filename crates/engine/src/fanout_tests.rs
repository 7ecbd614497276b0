use super::*;
use fleetd_adapters::{CloudClient, FakeBlockDeviceFinder, FakeCloudClient};
use fleetd_core::config::{DomainConfig, ExecLine, ExecSpec, VolumeSpec};
use fleetd_core::test_support::sample_macro_set;

fn exec_spec(argv: &[&str]) -> ExecSpec {
    ExecSpec {
        lines: vec![ExecLine {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            ec: None,
        }],
        on: None,
    }
}

#[tokio::test]
async fn run_exec_matrix_runs_unconditional_and_event_execs() {
    let matrix = build_exec_matrix(&[exec_spec(&["true"])], &sample_macro_set()).unwrap();
    run_exec_matrix(matrix, "started".to_string()).await.unwrap();
}

#[tokio::test]
async fn run_exec_matrix_surfaces_a_failing_command() {
    let matrix = build_exec_matrix(&[exec_spec(&["false"])], &sample_macro_set()).unwrap();
    let err = run_exec_matrix(matrix, "started".to_string()).await.unwrap_err();
    assert!(matches!(err, ExecError::ExitCodeOutOfRange { .. }));
}

#[tokio::test]
async fn init_all_aggregates_failures_across_domains_without_failing_fast() {
    let fake = FakeCloudClient::new();
    // "web": "x" with no volume-id never resolves -> error.
    // "db": no volumes configured at all -> succeeds.
    let cloud: Arc<dyn CloudClient> = Arc::new(fake.clone());
    let executor = DomainExecutor::new(cloud, Arc::new(FakeBlockDeviceFinder::new()), false);

    let mut domains = BTreeMap::new();
    let mut failing = DomainConfig::default();
    failing.attach_volume.push(VolumeSpec {
        device: "/dev/xvdf".to_string(),
        source: "x".to_string(),
        volume_id: None,
        pool_name: None,
        create: None,
        critical: true,
        exec: Vec::new(),
    });
    domains.insert("web".to_string(), failing);
    domains.insert("db".to_string(), DomainConfig::default());

    let (_, outcome) = init_all(&executor, &domains, &sample_macro_set()).await;

    match outcome {
        Err(DomainError::DomainFailed(names)) => {
            assert!(names.contains("web"));
            assert!(!names.contains("db"));
        }
        other => panic!("expected DomainFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn init_all_succeeds_when_every_domain_succeeds() {
    let fake = FakeCloudClient::new();
    let cloud: Arc<dyn CloudClient> = Arc::new(fake.clone());
    let executor = DomainExecutor::new(cloud, Arc::new(FakeBlockDeviceFinder::new()), false);

    let mut domains = BTreeMap::new();
    domains.insert("web".to_string(), DomainConfig::default());
    domains.insert("db".to_string(), DomainConfig::default());

    let (_, outcome) = init_all(&executor, &domains, &sample_macro_set()).await;
    assert!(outcome.is_ok());
}

#[tokio::test]
async fn exec_all_runs_every_domains_matrix() {
    let mut domains = BTreeMap::new();
    let mut web = DomainConfig::default();
    web.exec.push(exec_spec(&["true"]));
    domains.insert("web".to_string(), web);
    domains.insert("db".to_string(), DomainConfig::default());

    exec_all(&domains, &sample_macro_set(), "started").await.unwrap();
}

#[tokio::test]
async fn exec_all_fails_fast_on_the_first_failing_domain() {
    let mut domains = BTreeMap::new();
    let mut web = DomainConfig::default();
    web.exec.push(exec_spec(&["false"]));
    domains.insert("web".to_string(), web);

    let err = exec_all(&domains, &sample_macro_set(), "started").await.unwrap_err();
    assert!(matches!(err, DomainError::Exec(_)));
}
