pub mod export;
pub mod graph;
pub mod publish;
pub mod simulate;

use anyhow::{Context, Result};
use geogrid_cli::config::GeogridConfig;
use geogrid_core::Graph;
use geogrid_io::load_graph;

/// Load the configured grid tables into a finished graph.
pub fn load_grid(config: &GeogridConfig) -> Result<Graph> {
    let files = config.data.grid_files();
    load_graph(&files, config.simulation.link_defaults())
        .with_context(|| format!("loading grid from '{}'", config.data.data_dir.display()))
}
