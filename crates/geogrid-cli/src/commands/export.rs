use std::path::{Path, PathBuf};

use anyhow::Result;
use geogrid_cli::cli::ExportCommands;
use geogrid_cli::config::{GeogridConfig, OutputConfig};
use geogrid_core::Graph;
use geogrid_io::geojson::{
    render_grid, render_nodes, render_region_transfers, write_geojson, TRANSFER_OFFSET,
};

use super::load_grid;

pub fn handle(command: &ExportCommands, config: &GeogridConfig) -> Result<()> {
    match command {
        ExportCommands::Geojson { out_dir } => {
            let graph = load_grid(config)?;
            for path in write_all(&graph, &config.output, out_dir.as_deref())? {
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
    }
}

/// Write the grid, region transfer and node collections; returns their paths.
pub fn write_all(
    graph: &Graph,
    output: &OutputConfig,
    out_dir: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let dir = out_dir.unwrap_or(output.out_dir.as_path());
    let grid = dir.join(&output.grid_file);
    let transfers = dir.join(&output.region_links_file);
    let nodes = dir.join(&output.nodes_file);

    write_geojson(&grid, &render_grid(graph))?;
    write_geojson(&transfers, &render_region_transfers(graph, TRANSFER_OFFSET))?;
    write_geojson(&nodes, &render_nodes(graph))?;
    Ok(vec![grid, transfers, nodes])
}
