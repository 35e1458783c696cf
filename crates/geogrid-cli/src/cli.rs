use clap::{Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "geogrid", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level (overrides `[logging] level`)
    #[arg(long)]
    pub log_level: Option<tracing::Level>,

    /// TOML configuration file
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Directory holding stations.csv, plants.csv and regions.csv
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub data_dir: Option<PathBuf>,

    /// Runs the full scenario when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Graph utilities
    Graph {
        #[command(subcommand)]
        command: GraphCommands,
    },
    /// Map exports
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Publish the grid context (regions, stations, plants, links) once
    Publish {
        /// Directory receiving one `<topic>.jsonl` file per topic
        #[arg(long, value_hint = ValueHint::DirPath)]
        topics_dir: Option<PathBuf>,
    },
    /// Generate and publish flow samples
    Simulate {
        #[command(flatten)]
        args: SimulateArgs,
    },
    /// Export, publish the context, then simulate
    Run {
        #[command(flatten)]
        args: SimulateArgs,
        /// Directory for the GeoJSON files
        #[arg(long, value_hint = ValueHint::DirPath)]
        out_dir: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SimulateArgs {
    /// Number of steps
    #[arg(long)]
    pub steps: Option<u64>,
    /// Seed for the noise source
    #[arg(long)]
    pub seed: Option<u64>,
    /// Directory receiving one `<topic>.jsonl` file per topic
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub topics_dir: Option<PathBuf>,
    /// Print the per-step report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum GraphCommands {
    /// Graph stats summary
    Stats,
    /// Export the directed topology
    Export {
        /// Output format (dot)
        #[arg(long, default_value = "dot")]
        format: String,
        /// Write to a file instead of stdout
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Write grid, region transfer and node feature collections
    Geojson {
        #[arg(long, value_hint = ValueHint::DirPath)]
        out_dir: Option<PathBuf>,
    },
}
