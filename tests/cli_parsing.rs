use clap::Parser;
use examglass::cli::{Cli, Commands};
use std::path::PathBuf;

#[test]
fn test_parse_solve() {
    let cli = Cli::try_parse_from(vec!["examglass", "solve"]).unwrap();

    assert!(matches!(cli.command, Commands::Solve));
    assert!(cli.config.is_none());
}

#[test]
fn test_parse_init_defaults() {
    let cli = Cli::try_parse_from(vec!["examglass", "init"]).unwrap();

    match cli.command {
        Commands::Init(args) => {
            assert!(!args.force);
            assert_eq!(args.path, PathBuf::from("."));
        }
        Commands::Solve => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_init_force_with_path() {
    let cli = Cli::try_parse_from(vec!["examglass", "init", "--force", "/tmp/proj"]).unwrap();

    match cli.command {
        Commands::Init(args) => {
            assert!(args.force);
            assert_eq!(args.path, PathBuf::from("/tmp/proj"));
        }
        Commands::Solve => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_config_flag_is_global() {
    let cli = Cli::try_parse_from(vec!["examglass", "solve", "--config", "custom.yaml"]).unwrap();

    assert!(matches!(cli.command, Commands::Solve));
    assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
}

#[test]
fn test_missing_subcommand_is_rejected() {
    assert!(Cli::try_parse_from(vec!["examglass"]).is_err());
}
