use clap::Parser;
use std::path::PathBuf;

use hackeval::cli::{Cli, Commands};

#[test]
fn test_parse_serve_with_overrides() {
    let cli = Cli::try_parse_from(["hackeval", "serve", "--host", "127.0.0.1", "--port", "9001"])
        .unwrap();

    assert!(cli.command.is_service());
    match cli.command {
        Commands::Serve(args) => {
            assert_eq!(args.host.as_deref(), Some("127.0.0.1"));
            assert_eq!(args.port, Some(9001));
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_serve_defaults_come_from_config() {
    let cli = Cli::try_parse_from(["hackeval", "serve"]).unwrap();
    match cli.command {
        Commands::Serve(args) => {
            assert!(args.host.is_none());
            assert!(args.port.is_none());
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_evaluate() {
    let cli = Cli::try_parse_from(["hackeval", "evaluate", "deck.pdf", "--mode", "technical"])
        .unwrap();

    assert!(!cli.command.is_service());
    match cli.command {
        Commands::Evaluate(args) => {
            assert_eq!(args.file, PathBuf::from("deck.pdf"));
            assert_eq!(args.mode, "technical");
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_evaluate_default_mode() {
    let cli = Cli::try_parse_from(["hackeval", "evaluate", "deck.pdf"]).unwrap();
    match cli.command {
        Commands::Evaluate(args) => assert_eq!(args.mode, "combined"),
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_evaluate_requires_file() {
    assert!(Cli::try_parse_from(["hackeval", "evaluate"]).is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "hackeval",
        "criteria",
        "--json",
        "--config",
        "/etc/hackeval/prod.yaml",
    ])
    .unwrap();

    assert!(cli.json);
    assert_eq!(cli.config, Some(PathBuf::from("/etc/hackeval/prod.yaml")));
    assert!(matches!(cli.command, Commands::Criteria));
}

#[test]
fn test_parse_check() {
    let cli = Cli::try_parse_from(["hackeval", "check"]).unwrap();
    assert!(matches!(cli.command, Commands::Check));
    assert!(!cli.json);
}

#[test]
fn test_unknown_command_is_rejected() {
    assert!(Cli::try_parse_from(["hackeval", "judge"]).is_err());
}
