use crate::{Graph, LinkKind, Node, NodeKind};
use anyhow::{anyhow, Result};
use petgraph::algo::connected_components;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

/// Summary statistics produced by `graph stats` (counts per kind, degree, weak components).
#[derive(Debug)]
pub struct GraphStats {
    pub node_count: usize,
    pub link_count: usize,
    pub stations: usize,
    pub power_plants: usize,
    pub regions: usize,
    pub grid_segments: usize,
    pub plant_feeds: usize,
    /// Components when link direction is ignored
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    /// Stations with neither incoming nor outgoing links
    pub isolated_stations: Vec<String>,
}

/// Calculates graph-level statistics over the directed grid graph.
pub fn graph_stats(graph: &Graph) -> Result<GraphStats> {
    let topology = graph.topology();
    let node_count = topology.node_count();
    let link_count = topology.edge_count();

    let mut degrees = Vec::with_capacity(node_count);
    let mut isolated_stations = Vec::new();
    let (mut stations, mut power_plants, mut regions) = (0, 0, 0);
    for idx in topology.node_indices() {
        let degree = topology.edges_directed(idx, Direction::Outgoing).count()
            + topology.edges_directed(idx, Direction::Incoming).count();
        degrees.push(degree);
        match topology[idx].kind() {
            NodeKind::Station => {
                stations += 1;
                if degree == 0 {
                    isolated_stations.push(topology[idx].identifier().to_string());
                }
            }
            NodeKind::PowerPlant => power_plants += 1,
            NodeKind::Region => regions += 1,
        }
    }

    let (mut grid_segments, mut plant_feeds) = (0, 0);
    for link in graph.links() {
        match link.kind {
            LinkKind::GridSegment => grid_segments += 1,
            LinkKind::PlantFeed => plant_feeds += 1,
            // Transfers are map lines only, never graph links.
            LinkKind::RegionTransfer => {}
        }
    }

    let min_degree = *degrees.iter().min().unwrap_or(&0);
    let max_degree = *degrees.iter().max().unwrap_or(&0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().copied().sum::<usize>() as f64 / node_count as f64
    };

    Ok(GraphStats {
        node_count,
        link_count,
        stations,
        power_plants,
        regions,
        grid_segments,
        plant_feeds,
        connected_components: connected_components(topology),
        min_degree,
        avg_degree,
        max_degree,
        isolated_stations,
    })
}

/// Export the topology to a DOT string (Graphviz) so external tools can draw it.
pub fn export_graph(graph: &Graph, format: &str) -> Result<String> {
    match format.to_ascii_lowercase().as_str() {
        "graphviz" | "dot" => Ok(render_dot(graph)),
        other => Err(anyhow!("unsupported graph export format '{other}'")),
    }
}

fn render_dot(graph: &Graph) -> String {
    let topology = graph.topology();
    let mut buffer = String::new();
    buffer.push_str("digraph geogrid {\n");
    for idx in topology.node_indices() {
        let node = &topology[idx];
        buffer.push_str(&format!(
            "  \"{}\" [label=\"{}\", shape={}];\n",
            sanitize_label(node.identifier()),
            sanitize_label(node.label()),
            shape_for(node)
        ));
    }
    for edge in topology.edge_references() {
        let source = topology[edge.source()].identifier();
        let target = topology[edge.target()].identifier();
        buffer.push_str(&format!(
            "  \"{}\" -> \"{}\" [label=\"{}\"];\n",
            sanitize_label(source),
            sanitize_label(target),
            edge.weight().kind
        ));
    }
    buffer.push('}');
    buffer
}

fn shape_for(node: &Node) -> &'static str {
    match node {
        Node::Station(_) => "box",
        Node::PowerPlant(_) => "triangle",
        Node::Region(_) => "ellipse",
    }
}

fn sanitize_label(label: &str) -> String {
    label.replace('"', "\\\"")
}
