use clap::Parser;
use std::process;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use geogrid_cli::cli::{Cli, Commands};
use geogrid_cli::config::{load_config, GeogridConfig};

mod commands;

use crate::commands::{export, graph, publish, simulate};

fn main() {
    let cli = Cli::parse();

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err:#}");
            process::exit(2);
        }
    };
    let level = match cli.log_level {
        Some(level) => level,
        None => match config.logging.level.parse::<Level>() {
            Ok(level) => level,
            Err(_) => {
                eprintln!(
                    "error: invalid log level '{}' in configuration",
                    config.logging.level
                );
                process::exit(2);
            }
        },
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: could not install log subscriber: {err}");
    }

    if let Some(dir) = &cli.data_dir {
        config.data.data_dir = dir.clone();
    }
    info!(
        "geogrid reading data from {}",
        config.data.data_dir.display()
    );

    if let Err(err) = dispatch(cli.command.as_ref(), &config) {
        error!("{err:#}");
        process::exit(1);
    }
}

fn dispatch(command: Option<&Commands>, config: &GeogridConfig) -> anyhow::Result<()> {
    match command {
        Some(Commands::Graph { command }) => graph::handle(command, config),
        Some(Commands::Export { command }) => export::handle(command, config),
        Some(Commands::Publish { topics_dir }) => publish::handle(topics_dir.as_deref(), config),
        Some(Commands::Simulate { args }) => simulate::handle(args, config),
        Some(Commands::Run { args, out_dir }) => {
            simulate::run_scenario(args, out_dir.as_deref(), config)
        }
        None => simulate::run_scenario(&Default::default(), None, config),
    }
}
