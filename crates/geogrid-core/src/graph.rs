//! The directed grid graph and the read-only views handed to export adapters.

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use crate::{Link, LinkKind, Node, NodeKind, PowerPlant, Region, Station};

/// Nodes and directed links of one grid.
///
/// Built exclusively by [`GraphBuilder`](crate::GraphBuilder); every link
/// endpoint resolves to a node in the graph and identifiers are unique
/// across all node variants.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) graph: DiGraph<Node, Link>,
    pub(crate) index: HashMap<String, NodeIndex>,
}

impl Graph {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Underlying petgraph topology, for algorithms that need it.
    pub fn topology(&self) -> &DiGraph<Node, Link> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Look up a node by identifier.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index(id).map(|idx| &self.graph[idx])
    }

    /// All nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.graph.node_weights()
    }

    /// All links in creation order.
    pub fn links(&self) -> impl Iterator<Item = &Link> + '_ {
        self.graph.edge_weights()
    }

    /// First link with the given identifier.
    pub fn link(&self, id: &str) -> Option<&Link> {
        self.links().find(|link| link.id == id)
    }

    pub fn links_of_kind(&self, kind: LinkKind) -> impl Iterator<Item = &Link> + '_ {
        self.links().filter(move |link| link.kind == kind)
    }

    /// Source and target node of a link.
    pub fn endpoints(&self, edge: EdgeIndex) -> Option<(&Node, &Node)> {
        self.graph
            .edge_endpoints(edge)
            .map(|(source, target)| (&self.graph[source], &self.graph[target]))
    }

    pub fn stations(&self) -> impl Iterator<Item = &Station> + '_ {
        self.nodes().filter_map(|node| match node {
            Node::Station(station) => Some(station),
            _ => None,
        })
    }

    pub fn power_plants(&self) -> impl Iterator<Item = &PowerPlant> + '_ {
        self.nodes().filter_map(|node| match node {
            Node::PowerPlant(plant) => Some(plant),
            _ => None,
        })
    }

    pub fn regions(&self) -> impl Iterator<Item = &Region> + '_ {
        self.nodes().filter_map(|node| match node {
            Node::Region(region) => Some(region),
            _ => None,
        })
    }

    /// Point-feature view of every node, in insertion order.
    pub fn node_views(&self) -> Vec<NodeView> {
        self.nodes().map(NodeView::from).collect()
    }

    /// Line-feature view of every link, in creation order.
    pub fn link_views(&self) -> Vec<LinkView> {
        self.graph
            .edge_references()
            .map(|edge| {
                LinkView::new(
                    edge.weight(),
                    &self.graph[edge.source()],
                    &self.graph[edge.target()],
                )
            })
            .collect()
    }
}

/// What an export adapter needs to render a node as a point feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeView {
    pub identifier: String,
    pub display_name: String,
    pub country_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub kind: NodeKind,
    pub properties: BTreeMap<String, String>,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        let site = node.site();
        Self {
            identifier: site.id.clone(),
            display_name: site.name.clone(),
            country_code: site.country.clone(),
            latitude: site.lat,
            longitude: site.lon,
            kind: node.kind(),
            properties: node.properties(),
        }
    }
}

/// What an export adapter needs to render a link as a line feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkView {
    pub identifier: String,
    /// `(lat, lon)` of the source node
    pub source_coordinate: (f64, f64),
    /// `(lat, lon)` of the target node
    pub target_coordinate: (f64, f64),
    pub kind: LinkKind,
    pub visual_offset: f64,
    pub popup_label: String,
}

impl LinkView {
    pub fn new(link: &Link, source: &Node, target: &Node) -> Self {
        Self {
            identifier: link.id.clone(),
            source_coordinate: source.coordinate(),
            target_coordinate: target.coordinate(),
            kind: link.kind,
            visual_offset: link.visual_offset,
            popup_label: format!(
                "{}: ({}=>{})",
                link.kind,
                source.label(),
                target.identifier()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GraphBuilder, Megawatts, Site};

    fn station(id: &str, name: &str, country: &str, lat: f64, lon: f64) -> Node {
        Node::Station(Station::new(Site::new(id, name, country, lat, lon)))
    }

    fn sample_graph() -> Graph {
        let mut builder = GraphBuilder::new();
        builder
            .add_node(station("A", "Alpha", "DE", 52.0, 13.0))
            .unwrap();
        builder
            .add_node(station("B", "Beta", "PL", 52.2, 21.0))
            .unwrap();
        builder
            .add_node(Node::PowerPlant(PowerPlant::new(
                Site::new("P", "Plant", "DE", 51.0, 12.0),
                Megawatts(300.0),
                "A",
            )))
            .unwrap();
        builder.declare_segment("A", "B");
        builder.finalize().unwrap()
    }

    #[test]
    fn test_lookup_by_identifier() {
        let graph = sample_graph();
        assert!(graph.contains("A"));
        assert_eq!(graph.node("P").map(Node::kind), Some(NodeKind::PowerPlant));
        assert!(graph.node("missing").is_none());
    }

    #[test]
    fn test_variant_accessors() {
        let graph = sample_graph();
        assert_eq!(graph.stations().count(), 2);
        assert_eq!(graph.power_plants().count(), 1);
        assert_eq!(graph.regions().count(), 0);
    }

    #[test]
    fn test_link_views_carry_coordinates_and_popup() {
        let graph = sample_graph();
        let views = graph.link_views();
        let segment = views.iter().find(|v| v.identifier == "A-B").unwrap();
        assert_eq!(segment.source_coordinate, (52.0, 13.0));
        assert_eq!(segment.target_coordinate, (52.2, 21.0));
        assert_eq!(segment.popup_label, "GRID_SEGMENT: (Alpha=>B)");

        let feed = views.iter().find(|v| v.identifier == "P-A").unwrap();
        assert_eq!(feed.kind, LinkKind::PlantFeed);
    }

    #[test]
    fn test_every_link_endpoint_resolves() {
        let graph = sample_graph();
        for link in graph.links() {
            assert!(graph.contains(&link.source));
            assert!(graph.contains(&link.target));
        }
        for edge in graph.topology().edge_indices() {
            assert!(graph.endpoints(edge).is_some());
        }
    }

    #[test]
    fn test_node_views_in_insertion_order() {
        let graph = sample_graph();
        let ids: Vec<_> = graph
            .node_views()
            .into_iter()
            .map(|v| v.identifier)
            .collect();
        assert_eq!(ids, vec!["A", "B", "P"]);
    }
}
