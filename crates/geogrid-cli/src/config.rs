//! Configuration for the `geogrid` binary.
//!
//! Every section is optional; missing keys fall back to the reference
//! scenario (data in the working directory, outputs under `out/`, ten steps).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use geogrid_core::simulation::DEFAULT_STEPS;
use geogrid_core::LinkDefaults;
use geogrid_io::{GridFiles, TopicConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GeogridConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub topics: TopicsConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Input tables, relative to `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_stations_file")]
    pub stations_file: String,
    #[serde(default = "default_plants_file")]
    pub plants_file: String,
    #[serde(default = "default_regions_file")]
    pub regions_file: String,
    /// Used when present on disk; otherwise the demo segment list applies
    #[serde(default = "default_segments_file")]
    pub segments_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            stations_file: default_stations_file(),
            plants_file: default_plants_file(),
            regions_file: default_regions_file(),
            segments_file: default_segments_file(),
        }
    }
}

impl DataConfig {
    pub fn grid_files(&self) -> GridFiles {
        let segments = self.data_dir.join(&self.segments_file);
        GridFiles {
            stations: self.data_dir.join(&self.stations_file),
            plants: self.data_dir.join(&self.plants_file),
            regions: self.data_dir.join(&self.regions_file),
            segments: segments.exists().then_some(segments),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_stations_file() -> String {
    geogrid_io::csv_source::STATIONS_FILE.to_string()
}

fn default_plants_file() -> String {
    geogrid_io::csv_source::PLANTS_FILE.to_string()
}

fn default_regions_file() -> String {
    geogrid_io::csv_source::REGIONS_FILE.to_string()
}

fn default_segments_file() -> String {
    geogrid_io::csv_source::SEGMENTS_FILE.to_string()
}

/// GeoJSON output files, relative to `out_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutputConfig {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    #[serde(default = "default_grid_file")]
    pub grid_file: String,
    #[serde(default = "default_region_links_file")]
    pub region_links_file: String,
    #[serde(default = "default_nodes_file")]
    pub nodes_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            grid_file: default_grid_file(),
            region_links_file: default_region_links_file(),
            nodes_file: default_nodes_file(),
        }
    }
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("out")
}

fn default_grid_file() -> String {
    "grid.json".to_string()
}

fn default_region_links_file() -> String {
    "links-result.json".to_string()
}

fn default_nodes_file() -> String {
    "nodes.geojson".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicsConfig {
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// Prefix of the flow-data topic
    #[serde(default)]
    pub namespace: String,
    #[serde(default = "default_topics_dir")]
    pub topics_dir: PathBuf,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            namespace: String::new(),
            topics_dir: default_topics_dir(),
        }
    }
}

impl TopicsConfig {
    pub fn topic_config(&self) -> TopicConfig {
        TopicConfig {
            app_id: self.app_id.clone(),
            namespace: self.namespace.clone(),
        }
    }
}

fn default_app_id() -> String {
    TopicConfig::default().app_id
}

fn default_topics_dir() -> PathBuf {
    PathBuf::from("out").join("topics")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    #[serde(default = "default_steps")]
    pub steps: u64,
    /// Seed for the noise source; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_segment_avg_flow")]
    pub segment_avg_flow: f64,
    #[serde(default = "default_epsilon")]
    pub segment_epsilon: f64,
    #[serde(default = "default_epsilon")]
    pub feed_epsilon: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            seed: None,
            segment_avg_flow: default_segment_avg_flow(),
            segment_epsilon: default_epsilon(),
            feed_epsilon: default_epsilon(),
        }
    }
}

impl SimulationConfig {
    pub fn link_defaults(&self) -> LinkDefaults {
        LinkDefaults {
            segment_avg_flow: self.segment_avg_flow,
            segment_epsilon: self.segment_epsilon,
            feed_epsilon: self.feed_epsilon,
        }
    }
}

fn default_steps() -> u64 {
    DEFAULT_STEPS
}

fn default_segment_avg_flow() -> f64 {
    LinkDefaults::default().segment_avg_flow
}

fn default_epsilon() -> f64 {
    0.1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Parse a config file; `None` yields the defaults.
pub fn load_config(path: Option<&Path>) -> Result<GeogridConfig> {
    let Some(path) = path else {
        return Ok(GeogridConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config '{}'", path.display()))?;
    let config: GeogridConfig =
        toml::from_str(&contents).with_context(|| format!("parsing config '{}'", path.display()))?;
    Ok(config)
}
