//! Graph construction from typed nodes or raw field rows.
//!
//! A [`GraphBuilder`] collects nodes and explicit links, then [`finalize`]
//! synthesizes the derived links:
//!
//! - one grid segment per declared `source-target` pair whose stations both exist,
//!   directed as declared (no reciprocal link is created)
//! - one feed link per power plant into the station it declares
//!
//! [`finalize`]: GraphBuilder::finalize
//!
//! # Example
//! ```
//! use geogrid_core::{build_graph, LinkDefaults, RawGrid};
//!
//! let raw = RawGrid {
//!     stations: vec![
//!         vec!["A".into(), "DE".into(), "Alpha".into(), "52.0".into(), "13.0".into()],
//!         vec!["B".into(), "DE".into(), "Beta".into(), "50.0".into(), "8.0".into()],
//!     ],
//!     segments: vec![("A".into(), "B".into())],
//!     ..RawGrid::default()
//! };
//! let graph = build_graph(&raw, LinkDefaults::default())?;
//! assert!(graph.link("A-B").is_some());
//! assert!(graph.link("B-A").is_none());
//! # Ok::<(), geogrid_core::GridError>(())
//! ```

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::error::{GridError, GridResult};
use crate::graph::Graph;
use crate::{Link, LinkKind, Node, PowerPlant, Region, Station};

/// Flow parameters used for synthesized links.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkDefaults {
    /// Average flow of a station-to-station grid segment
    pub segment_avg_flow: f64,
    /// Noise bound of a grid segment
    pub segment_epsilon: f64,
    /// Noise bound of a plant feed (its average flow is the plant's production)
    pub feed_epsilon: f64,
}

impl Default for LinkDefaults {
    fn default() -> Self {
        Self {
            segment_avg_flow: 100.0,
            segment_epsilon: 0.1,
            feed_epsilon: 0.1,
        }
    }
}

/// Raw field rows as delivered by an ingestion adapter, headers already stripped.
#[derive(Debug, Clone, Default)]
pub struct RawGrid {
    pub stations: Vec<Vec<String>>,
    pub plants: Vec<Vec<String>>,
    pub regions: Vec<Vec<String>>,
    /// Declared station segments as `(source, target)` identifier pairs
    pub segments: Vec<(String, String)>,
}

/// Builder for a consistent [`Graph`].
///
/// Handles the common operations of graph construction:
/// - Identifier to NodeIndex mapping (unique across all variants)
/// - Endpoint resolution for every link
/// - Derivation of segment and feed links in [`finalize`](Self::finalize)
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
    segments: Vec<String>,
    declared: HashSet<String>,
    defaults: LinkDefaults,
}

impl GraphBuilder {
    /// Create a new builder with the default link parameters
    pub fn new() -> Self {
        Self::with_defaults(LinkDefaults::default())
    }

    pub fn with_defaults(defaults: LinkDefaults) -> Self {
        Self {
            graph: Graph::new(),
            segments: Vec::new(),
            declared: HashSet::new(),
            defaults,
        }
    }

    /// Add a node, rejecting identifiers already present in any variant.
    pub fn add_node(&mut self, node: Node) -> GridResult<()> {
        let id = node.identifier().to_string();
        if self.graph.index.contains_key(&id) {
            return Err(GridError::DuplicateIdentifier(id));
        }
        if matches!(node, Node::Station(_)) && id.contains('-') {
            warn!(station = %id, "station identifier contains '-'; segment keys may collide");
        }
        let idx = self.graph.graph.add_node(node);
        self.graph.index.insert(id, idx);
        Ok(())
    }

    /// Add a directed link between two existing nodes and return its identifier.
    pub fn add_link(
        &mut self,
        source_id: &str,
        target_id: &str,
        kind: LinkKind,
        avg_flow: f64,
        epsilon: f64,
    ) -> GridResult<String> {
        let source = self
            .graph
            .node_index(source_id)
            .ok_or_else(|| GridError::UnknownEndpoint(source_id.to_string()))?;
        let target = self
            .graph
            .node_index(target_id)
            .ok_or_else(|| GridError::UnknownEndpoint(target_id.to_string()))?;

        let region_context_tag = format!(
            "{}->{}",
            self.graph.graph[source].country(),
            self.graph.graph[target].country()
        );
        let link = Link {
            id: Link::link_id(source_id, target_id),
            source: source_id.to_string(),
            target: target_id.to_string(),
            kind,
            avg_flow,
            epsilon,
            region_context_tag,
            visual_offset: 0.0,
        };
        let id = link.id.clone();
        self.graph.graph.add_edge(source, target, link);
        debug!(link = %id, %kind, "added link");
        Ok(id)
    }

    /// Declare a directed station segment; resolved in [`finalize`](Self::finalize).
    ///
    /// Only the joined `source-target` key is kept, so with hyphenated station
    /// ids `("A", "B-C")` also matches the pair `("A-B", "C")`.
    pub fn declare_segment(&mut self, source_id: &str, target_id: &str) {
        let key = Link::link_id(source_id, target_id);
        if self.declared.insert(key.clone()) {
            self.segments.push(key);
        }
    }

    pub fn declare_segments<I, S>(&mut self, segments: I)
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        for (source, target) in segments {
            self.declare_segment(source.as_ref(), target.as_ref());
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Synthesize segment and feed links and hand out the finished graph.
    ///
    /// Segment matching tests whether the exact `source-target` string was
    /// declared, walking stations in insertion order. Declared segments whose
    /// stations are absent are skipped. A plant whose station is absent (or
    /// is not a station) fails with [`GridError::UnknownEndpoint`].
    pub fn finalize(mut self) -> GridResult<Graph> {
        let station_ids: Vec<String> = self
            .graph
            .stations()
            .map(|station| station.site.id.clone())
            .collect();

        let mut matched = HashSet::new();
        for source in &station_ids {
            for target in &station_ids {
                let key = Link::link_id(source, target);
                if self.declared.contains(&key) {
                    self.add_link(
                        source,
                        target,
                        LinkKind::GridSegment,
                        self.defaults.segment_avg_flow,
                        self.defaults.segment_epsilon,
                    )?;
                    matched.insert(key);
                }
            }
        }
        for key in self.segments.iter().filter(|key| !matched.contains(*key)) {
            warn!(segment = %key, "declared segment does not connect two known stations");
        }

        let feeds: Vec<(String, String, f64)> = self
            .graph
            .power_plants()
            .map(|plant| {
                (
                    plant.site.id.clone(),
                    plant.linked_to_station.clone(),
                    plant.production.value(),
                )
            })
            .collect();
        for (plant_id, station_id, production) in feeds {
            match self.graph.node(&station_id) {
                Some(Node::Station(_)) => {}
                _ => return Err(GridError::UnknownEndpoint(station_id)),
            }
            self.add_link(
                &plant_id,
                &station_id,
                LinkKind::PlantFeed,
                production,
                self.defaults.feed_epsilon,
            )?;
        }

        debug!(
            nodes = self.graph.node_count(),
            links = self.graph.link_count(),
            "graph finalized"
        );
        Ok(self.graph)
    }
}

/// Parse all raw rows and assemble the graph in one pass.
///
/// The first malformed row aborts the whole load.
pub fn build_graph(raw: &RawGrid, defaults: LinkDefaults) -> GridResult<Graph> {
    let mut builder = GraphBuilder::with_defaults(defaults);
    for row in &raw.stations {
        builder.add_node(Node::Station(Station::from_fields(row)?))?;
    }
    for row in &raw.plants {
        builder.add_node(Node::PowerPlant(PowerPlant::from_fields(row)?))?;
    }
    for row in &raw.regions {
        builder.add_node(Node::Region(Region::from_fields(row)?))?;
    }
    builder.declare_segments(raw.segments.iter().map(|(s, t)| (s.as_str(), t.as_str())));
    builder.finalize()
}

/// Count links per kind.
pub fn link_kind_counts(graph: &Graph) -> HashMap<LinkKind, usize> {
    let mut counts = HashMap::new();
    for link in graph.links() {
        *counts.entry(link.kind).or_insert(0) += 1;
    }
    counts
}
