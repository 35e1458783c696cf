pub mod cli;
pub mod config;

pub use cli::{Cli, Commands, ExportCommands, GraphCommands, SimulateArgs};
pub use config::{load_config, GeogridConfig};
