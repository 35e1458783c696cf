//! Declared station-to-station segments.
//!
//! A segments file has a header row followed by `source,target` rows. A
//! single-column `source-target` row is accepted as well and split on the
//! first `-`.

use std::path::Path;

use anyhow::{bail, Result};
use tracing::debug;

use crate::csv_source::read_rows_from_path;

/// Topology used when no segments file is supplied.
pub const DEMO_SEGMENTS: &[(&str, &str)] = &[
    ("1ST12345", "2ST12345"),
    ("1ST12345", "3ST12345"),
    ("2ST12345", "3ST12345"),
    ("4ST12345", "5ST12345"),
    ("6ST12345", "5ST12345"),
    ("4ST12345", "6ST12345"),
    ("7ST12345", "9ST12345"),
    ("7ST12345", "8ST12345"),
    ("8ST12345", "9ST12345"),
    ("5ST12345", "7ST12345"),
    ("6ST12345", "7ST12345"),
    ("6ST12345", "1ST12345"),
    ("6ST12345", "2ST12345"),
    ("6ST12345", "3ST12345"),
    ("7ST12345", "1ST12345"),
    ("7ST12345", "2ST12345"),
    ("7ST12345", "3ST12345"),
    ("5ST12345", "9ST12345"),
];

pub fn demo_segments() -> Vec<(String, String)> {
    DEMO_SEGMENTS
        .iter()
        .map(|(s, t)| (s.to_string(), t.to_string()))
        .collect()
}

/// Read the segments file at `path`, or fall back to [`demo_segments`].
pub fn load_segments(path: Option<&Path>) -> Result<Vec<(String, String)>> {
    match path {
        Some(path) => {
            let segments = parse_segment_rows(read_rows_from_path(path)?)?;
            debug!(path = %path.display(), count = segments.len(), "read declared segments");
            Ok(segments)
        }
        None => Ok(demo_segments()),
    }
}

pub fn parse_segment_rows(rows: Vec<Vec<String>>) -> Result<Vec<(String, String)>> {
    let mut segments = Vec::with_capacity(rows.len());
    for (idx, row) in rows.into_iter().enumerate() {
        match row.as_slice() {
            [source, target, ..] if !source.is_empty() && !target.is_empty() => {
                segments.push((source.clone(), target.clone()));
            }
            [joined] => match joined.split_once('-') {
                Some((source, target)) if !source.is_empty() && !target.is_empty() => {
                    segments.push((source.to_string(), target.to_string()));
                }
                _ => bail!(
                    "segment row {}: expected 'source-target', got {joined:?}",
                    idx + 1
                ),
            },
            _ => bail!(
                "segment row {}: expected source and target columns",
                idx + 1
            ),
        }
    }
    Ok(segments)
}
