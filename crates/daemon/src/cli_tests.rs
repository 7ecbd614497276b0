use super::*;
use clap::Parser;

fn parse(args: &[&str]) -> Cli {
    let mut argv = vec!["fleetd"];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

#[test]
fn parse_bool_accepts_case_insensitive_true_false() {
    assert_eq!(parse_bool("true"), Ok(true));
    assert_eq!(parse_bool("TRUE"), Ok(true));
    assert_eq!(parse_bool("False"), Ok(false));
    assert_eq!(parse_bool("false"), Ok(false));
}

#[test]
fn parse_bool_falls_back_to_numeric_nonzero() {
    assert_eq!(parse_bool("1"), Ok(true));
    assert_eq!(parse_bool("0"), Ok(false));
    assert_eq!(parse_bool("42"), Ok(true));
    assert_eq!(parse_bool("-1"), Ok(true));
}

#[test]
fn parse_bool_rejects_garbage() {
    assert!(parse_bool("yes").is_err());
}

#[test]
fn default_toggles_are_all_enabled() {
    let cli = parse(&[]);
    let toggles = cli.phase_toggles();
    assert_eq!(
        toggles,
        PhaseToggles {
            init: true,
            notify: true,
            exec: true,
            poll: true
        }
    );
}

#[test]
fn disable_all_disables_every_phase() {
    let cli = parse(&["--disable-all"]);
    let toggles = cli.phase_toggles();
    assert_eq!(
        toggles,
        PhaseToggles {
            init: false,
            notify: false,
            exec: false,
            poll: false
        }
    );
}

#[test]
fn explicit_enable_wins_over_disable_all() {
    let cli = parse(&["--disable-all", "--enable-poll=true"]);
    let toggles = cli.phase_toggles();
    assert!(!toggles.init);
    assert!(toggles.poll);
}

#[test]
fn explicit_disable_wins_without_disable_all() {
    let cli = parse(&["--enable-notify=false"]);
    let toggles = cli.phase_toggles();
    assert!(toggles.init);
    assert!(!toggles.notify);
}

#[test]
fn empty_transc_id_is_rejected() {
    let result = Cli::try_parse_from(["fleetd", "--transc_id="]);
    assert!(result.is_err());
}

#[test]
fn transc_id_override_is_accepted() {
    let cli = parse(&["--transc_id=abc-123"]);
    assert_eq!(cli.transc_id.as_deref(), Some("abc-123"));
}

#[test]
fn imds_and_userdata_overrides_parse() {
    let cli = parse(&["--imds=http://169.254.169.254", "--userdata=/tmp/ud.json"]);
    assert_eq!(cli.imds.as_deref(), Some("http://169.254.169.254"));
    assert_eq!(cli.userdata, Some(std::path::PathBuf::from("/tmp/ud.json")));
}

#[test]
fn repeated_v_flag_is_accepted_and_ignored() {
    let cli = parse(&["-vvv"]);
    assert_eq!(cli.verbose, 3);
}
