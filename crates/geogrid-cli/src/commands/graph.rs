use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use geogrid_cli::cli::GraphCommands;
use geogrid_cli::config::GeogridConfig;
use geogrid_core::graph_utils;
use tabwriter::TabWriter;

use super::load_grid;

pub fn handle(command: &GraphCommands, config: &GeogridConfig) -> Result<()> {
    let graph = load_grid(config)?;
    match command {
        GraphCommands::Stats => {
            let stats = graph_utils::graph_stats(&graph)?;
            println!("Graph statistics for {}:", config.data.data_dir.display());
            println!("  Nodes         : {}", stats.node_count);
            println!("  Links         : {}", stats.link_count);
            println!("  Components    : {}", stats.connected_components);
            println!(
                "  Degree [min/avg/max]: {}/{:.2}/{}",
                stats.min_degree, stats.avg_degree, stats.max_degree
            );

            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "KIND\tCOUNT")?;
            writeln!(writer, "STATION\t{}", stats.stations)?;
            writeln!(writer, "POWERPLANT\t{}", stats.power_plants)?;
            writeln!(writer, "REGION\t{}", stats.regions)?;
            writeln!(writer, "GRID_SEGMENT\t{}", stats.grid_segments)?;
            writeln!(writer, "PLANT_FEED\t{}", stats.plant_feeds)?;
            writer.flush()?;

            if !stats.isolated_stations.is_empty() {
                println!("Isolated stations: {}", stats.isolated_stations.join(", "));
            }
            Ok(())
        }
        GraphCommands::Export { format, out } => {
            let dot = graph_utils::export_graph(&graph, format)?;
            if let Some(path) = out {
                fs::write(path, &dot).with_context(|| format!("writing '{}'", path.display()))?;
                println!("Graph exported to {}", path.display());
            } else {
                println!("{dot}");
            }
            Ok(())
        }
    }
}
