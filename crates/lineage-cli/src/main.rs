use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use lineage_cli::{commands, LineageConfig, ResolveArgs, Workspace};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("lineage")
        .version(lineage_cli::VERSION)
        .about("Class-ownership relationship resolver")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file (lineage.toml)"),
        )
        .arg(
            Arg::new("metadata")
                .long("metadata")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Class and field metadata (YAML)"),
        )
        .arg(
            Arg::new("schema")
                .long("schema")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Ownership tree and path catalog (YAML)"),
        )
        .subcommand(
            Command::new("check")
                .about("Load everything, print the tree and report missing paths")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify how two classes relate")
                .arg(Arg::new("prev").required(true).help("Previous class"))
                .arg(Arg::new("new").required(true).help("New class")),
        )
        .subcommand(
            Command::new("resolve")
                .about("Map object ids from one list field onto another")
                .arg(
                    Arg::new("snapshot")
                        .long("snapshot")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Object snapshot (YAML)"),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .required(true)
                        .help("Previous field as Class.Field"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .help("New field as Class.Field"),
                )
                .arg(
                    Arg::new("first-only")
                        .long("first-only")
                        .action(ArgAction::SetTrue)
                        .help("Stop at the first descendant of each ancestor"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                )
                .arg(
                    Arg::new("ids")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(u32))
                        .help("Previous object ids"),
                ),
        )
        .subcommand(
            Command::new("source-field")
                .about("Print the source field that lists a class")
                .arg(Arg::new("class").required(true).help("Class name"))
                .arg(
                    Arg::new("edited")
                        .long("edited")
                        .help("Field being bulk-edited"),
                ),
        )
}

fn init_tracing(config: &LineageConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new(lineage_cli::DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn required_path<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    matches
        .get_one::<PathBuf>(name)
        .with_context(|| format!("--{name} is required"))
}

fn run(matches: &ArgMatches) -> Result<bool> {
    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => LineageConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => LineageConfig::default(),
    };
    init_tracing(&config);

    let ws = Workspace::load(
        config,
        required_path(matches, "metadata")?,
        required_path(matches, "schema")?,
    )?;
    let mut out = std::io::stdout().lock();

    match matches.subcommand() {
        Some(("check", args)) => {
            let report = commands::check(&ws, args.get_flag("json"), &mut out)?;
            return Ok(report.passed());
        }
        Some(("classify", args)) => {
            let prev = args.get_one::<String>("prev").context("missing previous class")?;
            let new = args.get_one::<String>("new").context("missing new class")?;
            commands::classify(&ws, prev, new, &mut out)?;
        }
        Some(("resolve", args)) => {
            let resolve = ResolveArgs {
                snapshot: required_path(args, "snapshot")?,
                from: args.get_one::<String>("from").context("missing --from")?,
                to: args.get_one::<String>("to").context("missing --to")?,
                first_only: args.get_flag("first-only"),
                json: args.get_flag("json"),
                ids: args.get_many::<u32>("ids").into_iter().flatten().copied().collect(),
            };
            commands::resolve(&ws, &resolve, &mut out)?;
        }
        Some(("source-field", args)) => {
            let class = args.get_one::<String>("class").context("missing class")?;
            let edited = args.get_one::<String>("edited").map(String::as_str);
            commands::source_field(&ws, class, edited, &mut out)?;
        }
        _ => {}
    }
    Ok(true)
}

fn main() {
    let matches = cli().get_matches();
    match run(&matches) {
        Ok(passed) => std::process::exit(if passed { 0 } else { 1 }),
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        cli().debug_assert();
    }

    #[test]
    fn parses_resolve_invocation() {
        let matches = cli()
            .try_get_matches_from([
                "lineage",
                "--metadata",
                "meta.yaml",
                "--schema",
                "schema.yaml",
                "resolve",
                "--snapshot",
                "snap.yaml",
                "--from",
                "LexDb.Entries",
                "--to",
                "LexDb.AllSenses",
                "--first-only",
                "10",
                "20",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "resolve");
        let ids: Vec<u32> = args.get_many::<u32>("ids").unwrap().copied().collect();
        assert_eq!(ids, [10, 20]);
        assert!(args.get_flag("first-only"));
        assert_eq!(
            matches.get_one::<PathBuf>("metadata"),
            Some(&PathBuf::from("meta.yaml"))
        );
    }
}
