//! CSV tables for stations, power plants and regions.
//!
//! Each file starts with one header row which is skipped. Rows are handed to
//! the core record parsers as positional fields; extra trailing columns are
//! tolerated, missing ones are reported as malformed records.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use geogrid_core::{
    Graph, GraphBuilder, GridResult, LinkDefaults, Node, PowerPlant, RawGrid, Region, Station,
};
use tracing::{debug, info};

use crate::segments;

pub const STATIONS_FILE: &str = "stations.csv";
pub const PLANTS_FILE: &str = "plants.csv";
pub const REGIONS_FILE: &str = "regions.csv";
pub const SEGMENTS_FILE: &str = "segments.csv";

/// Locations of the grid input tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFiles {
    pub stations: PathBuf,
    pub plants: PathBuf,
    pub regions: PathBuf,
    /// Declared segments; `None` selects the built-in demo topology.
    pub segments: Option<PathBuf>,
}

impl GridFiles {
    /// Default file names inside `dir`. `segments.csv` is only picked up when
    /// it exists.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let segments = dir.join(SEGMENTS_FILE);
        Self {
            stations: dir.join(STATIONS_FILE),
            plants: dir.join(PLANTS_FILE),
            regions: dir.join(REGIONS_FILE),
            segments: segments.exists().then_some(segments),
        }
    }
}

/// Read every data row of a headed CSV stream as owned fields.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<Vec<String>>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("reading CSV row {}", idx + 1))?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

pub fn read_rows_from_path(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = File::open(path).with_context(|| format!("opening CSV file '{}'", path.display()))?;
    let rows = read_rows(file).with_context(|| format!("parsing '{}'", path.display()))?;
    debug!(path = %path.display(), rows = rows.len(), "read CSV table");
    Ok(rows)
}

/// Load the raw tables without parsing them into records.
pub fn load_raw_grid(files: &GridFiles) -> Result<RawGrid> {
    Ok(RawGrid {
        stations: read_rows_from_path(&files.stations)?,
        plants: read_rows_from_path(&files.plants)?,
        regions: read_rows_from_path(&files.regions)?,
        segments: segments::load_segments(files.segments.as_deref())?,
    })
}

/// Load all tables and assemble the finished graph.
///
/// The first malformed row aborts the load; the error names the file and the
/// data row (1-based, header excluded) and wraps the underlying
/// [`GridError`](geogrid_core::GridError).
pub fn load_graph(files: &GridFiles, defaults: LinkDefaults) -> Result<Graph> {
    let mut builder = GraphBuilder::with_defaults(defaults);
    let stations = add_rows(&mut builder, &files.stations, |row| {
        Station::from_fields(row).map(Node::Station)
    })?;
    let plants = add_rows(&mut builder, &files.plants, |row| {
        PowerPlant::from_fields(row).map(Node::PowerPlant)
    })?;
    let regions = add_rows(&mut builder, &files.regions, |row| {
        Region::from_fields(row).map(Node::Region)
    })?;

    let declared = segments::load_segments(files.segments.as_deref())?;
    builder.declare_segments(declared.iter().map(|(s, t)| (s.as_str(), t.as_str())));

    let graph = builder.finalize().context("assembling grid graph")?;
    info!(
        stations,
        plants,
        regions,
        links = graph.link_count(),
        "loaded grid"
    );
    Ok(graph)
}

fn add_rows<F>(builder: &mut GraphBuilder, path: &Path, parse: F) -> Result<usize>
where
    F: Fn(&[String]) -> GridResult<Node>,
{
    let rows = read_rows_from_path(path)?;
    for (idx, row) in rows.iter().enumerate() {
        let node = parse(row).with_context(|| format!("{}: data row {}", path.display(), idx + 1))?;
        builder
            .add_node(node)
            .with_context(|| format!("{}: data row {}", path.display(), idx + 1))?;
    }
    Ok(rows.len())
}
