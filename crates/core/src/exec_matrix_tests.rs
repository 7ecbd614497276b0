use super::*;
use crate::config::ExecLine;

fn unconditional(argv: &str) -> ExecSpec {
    ExecSpec {
        lines: vec![ExecLine {
            argv: vec![argv.to_string()],
            ec: None,
        }],
        on: None,
    }
}

fn on_event(argv: &str, events: &[&str]) -> ExecSpec {
    ExecSpec {
        lines: vec![ExecLine {
            argv: vec![argv.to_string()],
            ec: None,
        }],
        on: Some(events.iter().map(|s| s.to_string()).collect()),
    }
}

fn identity(token: &str) -> String {
    token.to_string()
}

#[test]
fn specs_with_no_on_go_to_unconditional_in_order() {
    let specs = vec![unconditional("a"), unconditional("b")];
    let matrix = ExecMatrix::build(&specs, identity).unwrap();
    let argvs: Vec<_> = matrix
        .unconditional()
        .iter()
        .map(|e| e.argv()[0].clone())
        .collect();
    assert_eq!(argvs, vec!["a", "b"]);
    assert!(matrix.for_event("started").is_empty());
}

#[test]
fn specs_with_on_go_only_to_their_listed_events() {
    let specs = vec![on_event("a", &["started"]), on_event("b", &["failed"])];
    let matrix = ExecMatrix::build(&specs, identity).unwrap();
    assert_eq!(matrix.for_event("started").len(), 1);
    assert_eq!(matrix.for_event("started")[0].argv()[0], "a");
    assert_eq!(matrix.for_event("failed")[0].argv()[0], "b");
    assert!(matrix.for_event("stopping").is_empty());
}

#[test]
fn repeated_event_keys_append_rather_than_overwrite() {
    // Locks in spec.md §9 open question 1: the original's first-insert-
    // overwrites, later-inserts-append behavior is an apparent bug; fleetd
    // always appends.
    let specs = vec![
        on_event("first", &["started"]),
        on_event("second", &["started"]),
    ];
    let matrix = ExecMatrix::build(&specs, identity).unwrap();
    let argvs: Vec<_> = matrix
        .for_event("started")
        .iter()
        .map(|e| e.argv()[0].clone())
        .collect();
    assert_eq!(argvs, vec!["first", "second"]);
}

#[test]
fn a_single_spec_can_target_multiple_events() {
    let specs = vec![on_event("a", &["started", "failed"])];
    let matrix = ExecMatrix::build(&specs, identity).unwrap();
    assert_eq!(matrix.for_event("started").len(), 1);
    assert_eq!(matrix.for_event("failed").len(), 1);
}

#[test]
fn argv_transform_is_applied_to_every_token() {
    let specs = vec![unconditional("{domain}")];
    let matrix = ExecMatrix::build(&specs, |t| t.replace("{domain}", "web")).unwrap();
    assert_eq!(matrix.unconditional()[0].argv()[0], "web");
}

#[test]
fn invalid_exit_code_range_fails_the_build() {
    let spec = ExecSpec {
        lines: vec![ExecLine {
            argv: vec!["true".to_string()],
            ec: Some("5-2".to_string()),
        }],
        on: None,
    };
    assert!(ExecMatrix::build(&[spec], identity).is_err());
}

#[test]
fn run_executes_unconditional_then_the_event_list() {
    let specs = vec![unconditional("true"), on_event("true", &["started"])];
    let matrix = ExecMatrix::build(&specs, identity).unwrap();
    assert!(matrix.run("started").is_ok());
}
