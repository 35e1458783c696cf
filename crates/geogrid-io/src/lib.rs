//! # geogrid-io: file adapters around the grid model
//!
//! Everything that touches the filesystem lives here so `geogrid-core` stays
//! pure:
//!
//! - [`csv_source`]: station, plant and region tables (one header row each)
//! - [`segments`]: declared grid segments, either from a CSV file or the
//!   built-in demo topology
//! - [`geojson`]: feature collections for map rendering
//! - [`topics`]: keyed records per topic, written as JSON lines or kept in
//!   memory, plus the [`GridPublisher`](topics::GridPublisher) that feeds
//!   the simulation loop
//!
//! ```rust,no_run
//! use geogrid_core::LinkDefaults;
//! use geogrid_io::csv_source::{load_graph, GridFiles};
//!
//! let files = GridFiles::in_dir("test_data/grid");
//! let graph = load_graph(&files, LinkDefaults::default())?;
//! println!("{} nodes, {} links", graph.node_count(), graph.link_count());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod csv_source;
pub mod geojson;
pub mod segments;
pub mod topics;

pub use csv_source::{load_graph, load_raw_grid, GridFiles};
pub use topics::{GridPublisher, JsonlTopicSink, MemoryTopicSink, TopicConfig, TopicSink};
