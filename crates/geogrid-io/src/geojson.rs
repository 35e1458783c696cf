//! GeoJSON feature collections for map rendering.
//!
//! Points use `[lon, lat]` order. Line endpoints are shifted by the link's
//! visual offset (`[lon - offset, lat + offset]`) so opposite directions
//! between the same pair stay visually apart.

use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use geogrid_core::{Graph, Link, LinkKind, LinkView, NodeKind, NodeView, Region};
use petgraph::visit::EdgeRef;
use serde_json::{json, Map, Value};
use tracing::info;

/// Offset applied to region transfer lines.
pub const TRANSFER_OFFSET: f64 = 0.02;

pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}

pub fn point_feature(view: &NodeView) -> Value {
    let mut properties = Map::new();
    properties.insert("name".into(), Value::from(view.display_name.clone()));
    properties.insert("image".into(), Value::from(view.kind.image_file()));
    for (key, value) in &view.properties {
        properties.insert(key.clone(), Value::from(value.clone()));
    }
    json!({
        "type": "Feature",
        "id": view.identifier,
        "geometry": {
            "type": "Point",
            "coordinates": [view.longitude, view.latitude],
        },
        "properties": properties,
    })
}

pub fn line_feature(view: &LinkView) -> Value {
    let offset = view.visual_offset;
    let (source_lat, source_lon) = view.source_coordinate;
    let (target_lat, target_lon) = view.target_coordinate;
    json!({
        "type": "Feature",
        "id": view.identifier,
        "geometry": {
            "type": "LineString",
            "coordinates": [
                [source_lon - offset, source_lat + offset],
                [target_lon - offset, target_lat + offset],
            ],
        },
        "properties": {
            "popupContent": view.popup_label,
            "kind": view.kind.label(),
        },
    })
}

/// Stations with their outgoing segments, then plants with their feeds.
pub fn render_grid(graph: &Graph) -> Value {
    let topology = graph.topology();
    let mut features = Vec::new();

    for idx in topology.node_indices() {
        let node = &topology[idx];
        match node.kind() {
            NodeKind::Station => {
                let segments = outgoing_lines(graph, node.identifier(), LinkKind::GridSegment);
                features.extend(segments);
                features.push(point_feature(&NodeView::from(node)));
            }
            NodeKind::PowerPlant | NodeKind::Region => {}
        }
    }
    for idx in topology.node_indices() {
        let node = &topology[idx];
        if node.kind() == NodeKind::PowerPlant {
            features.push(point_feature(&NodeView::from(node)));
            let feeds = outgoing_lines(graph, node.identifier(), LinkKind::PlantFeed);
            features.extend(feeds);
        }
    }
    feature_collection(features)
}

// Links in creation order; petgraph's per-node adjacency walks newest first.
fn outgoing_lines(graph: &Graph, source: &str, kind: LinkKind) -> Vec<Value> {
    let topology = graph.topology();
    topology
        .edge_references()
        .filter(|edge| edge.weight().kind == kind && edge.weight().source == source)
        .map(|edge| {
            line_feature(&LinkView::new(
                edge.weight(),
                &topology[edge.source()],
                &topology[edge.target()],
            ))
        })
        .collect()
}

/// One line per ordered pair of distinct regions.
pub fn render_region_transfers(graph: &Graph, delta: f64) -> Value {
    let regions: Vec<&Region> = graph.regions().collect();
    let mut features = Vec::new();
    for source in &regions {
        for target in &regions {
            if source.site.id == target.site.id {
                continue;
            }
            features.push(line_feature(&transfer_view(source, target, delta)));
        }
    }
    feature_collection(features)
}

fn transfer_view(source: &Region, target: &Region, delta: f64) -> LinkView {
    let visual_offset = match compare_ids(&source.site.id, &target.site.id) {
        Ordering::Greater => -delta,
        _ => delta,
    };
    LinkView {
        identifier: Link::link_id(&source.site.id, &target.site.id),
        source_coordinate: (source.site.lat, source.site.lon),
        target_coordinate: (target.site.lat, target.site.lon),
        kind: LinkKind::RegionTransfer,
        visual_offset,
        popup_label: format!(
            "Transfer: ({}=>{})",
            source.site.country, target.site.country
        ),
    }
}

/// Numeric ordering when both ids are integers, lexical otherwise.
fn compare_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

/// Every node as a point feature.
pub fn render_nodes(graph: &Graph) -> Value {
    feature_collection(graph.node_views().iter().map(point_feature).collect())
}

pub fn write_geojson(path: &Path, collection: &Value) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory '{}'", parent.display()))?;
    }
    let body = serde_json::to_string_pretty(collection).context("serializing GeoJSON")?;
    fs::write(path, body).with_context(|| format!("writing '{}'", path.display()))?;
    let features = collection["features"].as_array().map_or(0, Vec::len);
    info!(path = %path.display(), features, "wrote GeoJSON");
    Ok(())
}
