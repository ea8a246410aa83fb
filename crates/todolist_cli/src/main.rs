use clap::Parser;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use std::io;
use todolist_cli::cli::{self, Cli};
use todolist_cli::CliConfig;
use todolist_core::db::open_db;
use todolist_core::{init_logging, sqlite_document_store, LogLevel, LogSettings};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let config_path = match cli.config {
        Some(path) => path,
        None => CliConfig::default_path()?,
    };
    let mut config = CliConfig::load_or_create(&config_path)?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }

    let level = LogLevel::parse(&config.log_level).map_err(|err| eyre!("{err}"))?;
    let log_dir = config.log_dir(&std::env::current_dir()?);
    init_logging(&LogSettings::new(level, log_dir)).map_err(|err| eyre!("{err}"))?;

    let conn = open_db(config.database_path())?;
    let store = sqlite_document_store(&conn)?;

    let mut input = io::stdin().lock();
    let mut out = io::stdout().lock();
    cli::run(cli.command, &store, &mut input, &mut out)?;

    Ok(())
}
