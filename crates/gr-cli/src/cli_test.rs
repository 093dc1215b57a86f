use super::*;
use clap::CommandFactory;
use clap::Parser;
use gr_core::Domain;

#[test]
fn test_cli_structure_is_valid() {
    Cli::command().debug_assert();
}

#[test]
fn test_run_defaults() {
    let cli = Cli::try_parse_from(["granary", "run"]).unwrap();
    match cli.command {
        Commands::Run(args) => assert!(!args.incremental),
        other => panic!("expected run command, got {other:?}"),
    }
    assert!(!cli.global.verbose);
    assert_eq!(cli.global.project_dir, ".");
    assert!(cli.global.config.is_none());
}

#[test]
fn test_run_incremental_flag() {
    let cli = Cli::try_parse_from(["granary", "run", "--incremental"]).unwrap();
    match cli.command {
        Commands::Run(args) => assert!(args.incremental),
        other => panic!("expected run command, got {other:?}"),
    }
}

#[test]
fn test_global_args_after_subcommand() {
    let cli = Cli::try_parse_from(["granary", "transform", "-p", "/tmp/project", "-v"]).unwrap();
    assert!(matches!(cli.command, Commands::Transform));
    assert_eq!(cli.global.project_dir, "/tmp/project");
    assert!(cli.global.verbose);
}

#[test]
fn test_extract_domain_value_enum() {
    let cli = Cli::try_parse_from(["granary", "extract", "--domain", "sales"]).unwrap();
    match cli.command {
        Commands::Extract(args) => {
            assert_eq!(args.domain, Some(DomainArg::Sales));
            assert_eq!(Domain::from(DomainArg::Sales), Domain::Sales);
        }
        other => panic!("expected extract command, got {other:?}"),
    }
}

#[test]
fn test_extract_rejects_unknown_domain() {
    let result = Cli::try_parse_from(["granary", "extract", "--domain", "orders"]);
    assert!(result.is_err());
}

#[test]
fn test_domain_arg_maps_to_every_domain() {
    assert_eq!(Domain::from(DomainArg::Customers), Domain::Customers);
    assert_eq!(Domain::from(DomainArg::Products), Domain::Products);
    assert_eq!(Domain::from(DomainArg::Sales), Domain::Sales);
}

#[test]
fn test_validate_output_default_is_table() {
    let cli = Cli::try_parse_from(["granary", "validate"]).unwrap();
    match cli.command {
        Commands::Validate(args) => assert_eq!(args.output, ValidateOutput::Table),
        other => panic!("expected validate command, got {other:?}"),
    }
}

#[test]
fn test_validate_json_output() {
    let cli = Cli::try_parse_from(["granary", "validate", "--output", "json"]).unwrap();
    match cli.command {
        Commands::Validate(args) => assert_eq!(args.output, ValidateOutput::Json),
        other => panic!("expected validate command, got {other:?}"),
    }
}

#[test]
fn test_init_takes_name_and_database_path() {
    let cli =
        Cli::try_parse_from(["granary", "init", "depot", "--database-path", "dw.duckdb"]).unwrap();
    match cli.command {
        Commands::Init(args) => {
            assert_eq!(args.name, "depot");
            assert_eq!(args.database_path, "dw.duckdb");
        }
        other => panic!("expected init command, got {other:?}"),
    }
}

#[test]
fn test_database_override_flag() {
    let cli = Cli::try_parse_from(["granary", "load", "--database", "other.duckdb"]).unwrap();
    assert!(matches!(cli.command, Commands::Load));
    assert_eq!(cli.global.database.as_deref(), Some("other.duckdb"));
}
