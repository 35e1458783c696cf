//! # geogrid-core: Toy Power-Grid Graph Core
//!
//! Provides the entity model and the directed grid graph used by the geogrid
//! demo: stations, power plants and regions as nodes, flow paths between them
//! as directed links, plus the stochastic flow samples and the regional
//! production/consumption balance computed over that graph.
//!
//! ## Design Philosophy
//!
//! The grid is modeled as a **directed multigraph** where:
//! - **Nodes**: [`Station`], [`PowerPlant`] and [`Region`] records sharing a
//!   [`Site`] (identity and location)
//! - **Links**: directed flow paths tagged with a [`LinkKind`]
//!
//! A [`Graph`] is only ever produced by a [`GraphBuilder`], which rejects
//! duplicate identifiers and dangling link endpoints. After construction the
//! graph is read-only and every link endpoint is guaranteed to resolve.
//!
//! ## Quick Start
//!
//! ```rust
//! use geogrid_core::*;
//!
//! let mut builder = GraphBuilder::new();
//! builder.add_node(Node::Station(Station::from_fields(&["A", "DE", "Alpha", "52.5", "13.4"])?))?;
//! builder.add_node(Node::Station(Station::from_fields(&["B", "DE", "Beta", "50.1", "8.7"])?))?;
//! builder.add_node(Node::PowerPlant(PowerPlant::from_fields(&[
//!     "P1", "DE", "Plant", "51.0", "10.0", "250", "A",
//! ])?))?;
//! builder.declare_segment("A", "B");
//!
//! let graph = builder.finalize()?;
//! assert_eq!(graph.node_count(), 3);
//! assert_eq!(graph.link_count(), 2); // A->B segment + P1->A feed
//! # Ok::<(), GridError>(())
//! ```
//!
//! ## Modules
//!
//! - [`builder`] - graph assembly from typed nodes or raw field rows
//! - [`sample`] - bounded white-noise flow samples per link
//! - [`balance`] - network-wide regional balance
//! - [`simulation`] - the bounded step loop that drives samples to a publisher
//! - [`graph_utils`] - topology statistics and DOT export

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod balance;
pub mod builder;
pub mod error;
pub mod graph;
pub mod graph_utils;
mod records;
pub mod sample;
pub mod simulation;
pub mod units;

pub use balance::{balance, RegionalBalance};
pub use builder::{build_graph, GraphBuilder, LinkDefaults, RawGrid};
pub use error::{GridError, GridResult};
pub use graph::{Graph, LinkView, NodeView};
pub use graph_utils::*;
pub use petgraph::graph::{EdgeIndex, NodeIndex};
pub use sample::{Sample, SampleClock, SampleGenerator};
pub use simulation::{SamplePublisher, Simulation, SimulationReport, StepSummary};
pub use units::Megawatts;

use records::Fields;

/// Identity and location shared by every node variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    /// Country code (e.g. "DE")
    pub country: String,
    pub lat: f64,
    pub lon: f64,
}

impl Site {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        country: impl Into<String>,
        lat: f64,
        lon: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            country: country.into(),
            lat,
            lon,
        }
    }

    /// Reads the common `id, country, name, lat, lon` prefix of a row.
    fn from_fields<S: AsRef<str>>(fields: &Fields<'_, S>) -> GridResult<Self> {
        let id = fields.text(0)?;
        if id.is_empty() {
            return Err(GridError::malformed(
                fields.record(),
                0,
                id,
                "identifier is empty",
            ));
        }
        Ok(Self {
            id: id.to_string(),
            country: fields.text(1)?.to_string(),
            name: fields.text(2)?.to_string(),
            lat: fields.number(3)?,
            lon: fields.number(4)?,
        })
    }
}

/// A substation; carries no attributes beyond identity and location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(flatten)]
    pub site: Site,
}

impl Station {
    pub const ARITY: usize = 5;

    pub fn new(site: Site) -> Self {
        Self { site }
    }

    /// Parses `id, country, name, lat, lon`.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> GridResult<Self> {
        let fields = Fields::new("station", fields, Self::ARITY)?;
        Ok(Self {
            site: Site::from_fields(&fields)?,
        })
    }
}

/// A generating unit feeding into one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerPlant {
    #[serde(flatten)]
    pub site: Site,
    /// Production capacity
    pub production: Megawatts,
    /// Identifier of the station this plant feeds into
    pub linked_to_station: String,
}

impl PowerPlant {
    pub const ARITY: usize = 7;

    pub fn new(site: Site, production: Megawatts, linked_to_station: impl Into<String>) -> Self {
        Self {
            site,
            production,
            linked_to_station: linked_to_station.into(),
        }
    }

    /// Parses `id, country, name, lat, lon, production, linked_to_station`.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> GridResult<Self> {
        let fields = Fields::new("power plant", fields, Self::ARITY)?;
        Ok(Self {
            site: Site::from_fields(&fields)?,
            production: fields.megawatts(5)?,
            linked_to_station: fields.text(6)?.to_string(),
        })
    }
}

/// A market region with externally supplied aggregate totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    #[serde(flatten)]
    pub site: Site,
    pub production: Megawatts,
    pub consumption: Megawatts,
    pub imports: Megawatts,
    pub exports: Megawatts,
}

impl Region {
    pub const ARITY: usize = 9;

    pub fn new(
        site: Site,
        production: Megawatts,
        consumption: Megawatts,
        imports: Megawatts,
        exports: Megawatts,
    ) -> Self {
        Self {
            site,
            production,
            consumption,
            imports,
            exports,
        }
    }

    /// Parses `id, country, name, lat, lon, production, consumption, imports, exports`.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> GridResult<Self> {
        let fields = Fields::new("region", fields, Self::ARITY)?;
        Ok(Self {
            site: Site::from_fields(&fields)?,
            production: fields.megawatts(5)?,
            consumption: fields.megawatts(6)?,
            imports: fields.megawatts(7)?,
            exports: fields.megawatts(8)?,
        })
    }
}

/// Discriminant of a [`Node`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Station,
    PowerPlant,
    Region,
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Station => "STATION",
            NodeKind::PowerPlant => "POWERPLANT",
            NodeKind::Region => "REGION",
        }
    }

    /// Map marker image used by the GeoJSON renderer.
    pub fn image_file(&self) -> &'static str {
        match self {
            NodeKind::Station => "station.png",
            NodeKind::PowerPlant => "ppt.png",
            NodeKind::Region => "r.png",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// Enum to represent the different node variants in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Node {
    Station(Station),
    PowerPlant(PowerPlant),
    Region(Region),
}

impl Node {
    pub fn site(&self) -> &Site {
        match self {
            Node::Station(station) => &station.site,
            Node::PowerPlant(plant) => &plant.site,
            Node::Region(region) => &region.site,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.site().id
    }

    /// Returns a human-readable label for the node.
    pub fn label(&self) -> &str {
        &self.site().name
    }

    pub fn country(&self) -> &str {
        &self.site().country
    }

    /// `(lat, lon)` of the node.
    pub fn coordinate(&self) -> (f64, f64) {
        let site = self.site();
        (site.lat, site.lon)
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Station(_) => NodeKind::Station,
            Node::PowerPlant(_) => NodeKind::PowerPlant,
            Node::Region(_) => NodeKind::Region,
        }
    }

    /// Variant-specific properties as rendered on a map feature.
    pub fn properties(&self) -> BTreeMap<String, String> {
        let mut props = BTreeMap::new();
        match self {
            Node::Station(station) => {
                props.insert(
                    "popupContent".to_string(),
                    format!("id={}, name={}", station.site.id, station.site.name),
                );
            }
            Node::PowerPlant(plant) => {
                insert_quantity(&mut props, "production", plant.production);
            }
            Node::Region(region) => {
                insert_quantity(&mut props, "production", region.production);
                insert_quantity(&mut props, "consumption", region.consumption);
                insert_quantity(&mut props, "imports", region.imports);
                insert_quantity(&mut props, "exports", region.exports);
            }
        }
        props
    }
}

fn insert_quantity(props: &mut BTreeMap<String, String>, key: &str, mw: Megawatts) {
    props.insert(key.to_string(), format!("{:?}", mw.value()));
}

/// Tag describing what a link represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkKind {
    /// Grid segment between two stations
    GridSegment,
    /// Feed from a power plant into its station
    PlantFeed,
    /// Transfer between two regions
    RegionTransfer,
}

impl LinkKind {
    pub fn label(&self) -> &'static str {
        match self {
            LinkKind::GridSegment => "GRID_SEGMENT",
            LinkKind::PlantFeed => "PLANT_FEED",
            LinkKind::RegionTransfer => "REGION_TRANSFER",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Directed flow path between two nodes of a [`Graph`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// `source + "-" + target`
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: LinkKind,
    /// Average flow magnitude
    pub avg_flow: f64,
    /// Noise bound as a fraction of `avg_flow`
    pub epsilon: f64,
    /// `source country + "->" + target country`
    pub region_context_tag: String,
    /// Lat/lon offset applied when drawing the link on a map
    pub visual_offset: f64,
}

impl Link {
    /// Derives the link identifier for a source/target pair.
    pub fn link_id(source: &str, target: &str) -> String {
        format!("{source}-{target}")
    }

    /// Closed interval every sampled flow of this link falls into.
    pub fn flow_envelope(&self) -> (f64, f64) {
        let band = (self.avg_flow * self.epsilon).abs();
        (self.avg_flow - band, self.avg_flow + band)
    }
}
