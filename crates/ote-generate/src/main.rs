use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use ote_generate::{GenerateConfig, Generator, GeneratorOptions, Session, TRIPLESTORE_SETTINGS};
use ote_instance::{Collection, Datamodel};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("ote-generate")
        .version(ote_generate::VERSION)
        .about("Select an instance from a collection, persist it and record provenance")
        .arg(
            Arg::new("collection")
                .long("collection")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON file holding the source collection"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON file holding the generate configuration"),
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_parser(value_parser!(PathBuf))
                .help("JSON file holding triplestore settings"),
        )
        .arg(
            Arg::new("datamodel")
                .long("datamodel")
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf))
                .help("JSON datamodel file (repeatable)"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .default_value("30")
                .value_parser(value_parser!(u64))
                .help("Triplestore connection timeout in seconds"),
        );

    let matches = cli.get_matches();

    let timeout = matches.get_one::<u64>("timeout").copied().unwrap_or(30);
    let generator = Generator::new(GeneratorOptions::new().with_connect_timeout(Duration::from_secs(timeout)));

    if let Some(paths) = matches.get_many::<PathBuf>("datamodel") {
        for path in paths {
            let model: Datamodel = read_json(path)?;
            generator
                .datamodels()
                .register(model)
                .with_context(|| format!("registering {}", path.display()))?;
        }
    }

    let collection_path = matches
        .get_one::<PathBuf>("collection")
        .context("--collection is required")?;
    let collection: Collection = read_json(collection_path)?;
    let mut session = Session::new().with_collection_id(collection.id());
    generator.registry().insert(collection);

    if let Some(path) = matches.get_one::<PathBuf>("settings") {
        session.insert_settings(TRIPLESTORE_SETTINGS, read_json(path)?);
    }

    let config_path = matches.get_one::<PathBuf>("config").context("--config is required")?;
    let config = GenerateConfig::from_value(read_json(config_path)?)?;

    match generator.generate(&config, &session).await {
        Ok(update) => {
            println!("{}", serde_json::to_string_pretty(&update)?);
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "generate failed");
            Err(err.into())
        }
    }
}
