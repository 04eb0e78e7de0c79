//! Tests for CLI parsing and default behaviours.

use super::*;
use clap::CommandFactory;
use rstest::rstest;

#[test]
fn cli_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn configure_uses_default_inputs() {
    let cli = Cli::parse_from(["trellis", "configure"]);
    assert!(!cli.quiet);
    assert_eq!(
        cli.command,
        Command::Configure(CommonArgs {
            config: Utf8PathBuf::from("trellis.toml"),
            modules: Utf8PathBuf::from("modules.json"),
        })
    );
}

#[test]
fn assemble_parses_out_dir_and_inputs() {
    let cli = Cli::parse_from([
        "trellis",
        "assemble",
        "--out-dir",
        "/tmp/libs",
        "--config",
        "ci.toml",
        "--modules",
        "build/modules.json",
    ]);
    let Command::Assemble(args) = cli.command else {
        panic!("expected assemble");
    };
    assert_eq!(args.out_dir, Utf8PathBuf::from("/tmp/libs"));
    assert_eq!(args.common.config, Utf8PathBuf::from("ci.toml"));
    assert_eq!(args.common.modules, Utf8PathBuf::from("build/modules.json"));
}

#[rstest]
#[case::check("api-check")]
#[case::dump("api-dump")]
fn api_commands_take_an_api_dir(#[case] subcommand: &str) {
    let cli = Cli::parse_from(["trellis", subcommand, "--api-dir", "snapshots"]);
    let (Command::ApiCheck(args) | Command::ApiDump(args)) = &cli.command else {
        panic!("expected an api command");
    };
    assert_eq!(args.api_dir, Utf8PathBuf::from("snapshots"));
}

#[rstest]
#[case::before(&["trellis", "--quiet", "docs-policy"])]
#[case::after(&["trellis", "docs-policy", "-q"])]
fn quiet_is_global(#[case] argv: &[&str]) {
    let cli = Cli::parse_from(argv);
    assert!(cli.quiet);
    assert_eq!(cli.command.common().config, Utf8PathBuf::from("trellis.toml"));
}

#[test]
fn subcommand_is_required() {
    assert!(Cli::try_parse_from(["trellis"]).is_err());
}
