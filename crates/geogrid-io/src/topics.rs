//! Keyed records per topic.
//!
//! The grid context (regions, stations, plants, static links) is published
//! once; flow samples are published per step on the namespaced flow topic,
//! keyed by link id. [`JsonlTopicSink`] appends one `{"key", "value"}` line per
//! record to `<dir>/<topic>.jsonl`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use geogrid_core::{Graph, Sample, SamplePublisher};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const REGIONS_TOPIC: &str = "grid-regions";
pub const STATIONS_TOPIC: &str = "grid-stations";
pub const PLANTS_TOPIC: &str = "grid-plants";
pub const STATIC_LINKS_TOPIC: &str = "grid-static-links";
/// Prefixed with the configured namespace.
pub const FLOW_TOPIC: &str = "grid-link-flow-data";

#[derive(Error, Debug)]
pub enum TopicError {
    #[error("topic '{topic}': {source}")]
    Io {
        topic: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encoding record for topic '{topic}': {source}")]
    Encode {
        topic: String,
        #[source]
        source: serde_json::Error,
    },
}

pub trait TopicSink {
    fn send(&mut self, topic: &str, key: &str, value: &Value) -> Result<(), TopicError>;

    fn flush(&mut self) -> Result<(), TopicError> {
        Ok(())
    }
}

impl<S: TopicSink + ?Sized> TopicSink for &mut S {
    fn send(&mut self, topic: &str, key: &str, value: &Value) -> Result<(), TopicError> {
        (**self).send(topic, key, value)
    }

    fn flush(&mut self) -> Result<(), TopicError> {
        (**self).flush()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicRecord {
    pub topic: String,
    pub key: String,
    pub value: Value,
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct MemoryTopicSink {
    pub records: Vec<TopicRecord>,
}

impl MemoryTopicSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records_for<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a TopicRecord> {
        self.records
            .iter()
            .filter(move |record| record.topic == topic)
    }
}

impl TopicSink for MemoryTopicSink {
    fn send(&mut self, topic: &str, key: &str, value: &Value) -> Result<(), TopicError> {
        self.records.push(TopicRecord {
            topic: topic.to_string(),
            key: key.to_string(),
            value: value.clone(),
        });
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonlLine<'a> {
    key: &'a str,
    value: &'a Value,
}

/// Appends JSON lines to one file per topic.
#[derive(Debug)]
pub struct JsonlTopicSink {
    dir: PathBuf,
    client_id: String,
    writers: HashMap<String, BufWriter<File>>,
}

impl JsonlTopicSink {
    pub fn create(dir: impl Into<PathBuf>, client_id: impl Into<String>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            client_id: client_id.into(),
            writers: HashMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn topic_path(&self, topic: &str) -> PathBuf {
        self.dir.join(format!("{topic}.jsonl"))
    }

    fn writer(&mut self, topic: &str) -> Result<&mut BufWriter<File>, TopicError> {
        match self.writers.entry(topic.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let path = self.dir.join(format!("{topic}.jsonl"));
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|source| TopicError::Io {
                        topic: topic.to_string(),
                        source,
                    })?;
                debug!(client = %self.client_id, path = %path.display(), "opened topic file");
                Ok(entry.insert(BufWriter::new(file)))
            }
        }
    }
}

impl TopicSink for JsonlTopicSink {
    fn send(&mut self, topic: &str, key: &str, value: &Value) -> Result<(), TopicError> {
        let line = serde_json::to_string(&JsonlLine { key, value })
            .map_err(|source| TopicError::Encode {
                topic: topic.to_string(),
                source,
            })?;
        let writer = self.writer(topic)?;
        writeln!(writer, "{line}").map_err(|source| TopicError::Io {
            topic: topic.to_string(),
            source,
        })
    }

    fn flush(&mut self) -> Result<(), TopicError> {
        for (topic, writer) in &mut self.writers {
            writer.flush().map_err(|source| TopicError::Io {
                topic: topic.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Identity and topic namespace of a publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub app_id: String,
    pub namespace: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            app_id: "demo3".to_string(),
            namespace: String::new(),
        }
    }
}

impl TopicConfig {
    pub fn flow_topic(&self) -> String {
        format!("{}{FLOW_TOPIC}", self.namespace)
    }
}

/// Records sent per context topic; failed records are logged and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextSummary {
    pub regions: usize,
    pub stations: usize,
    pub plants: usize,
    pub links: usize,
    pub failures: usize,
}

/// Publishes grid context and flow samples through a [`TopicSink`].
#[derive(Debug)]
pub struct GridPublisher<S> {
    sink: S,
    config: TopicConfig,
    flow_topic: String,
}

impl<S: TopicSink> GridPublisher<S> {
    pub fn new(sink: S, config: TopicConfig) -> Self {
        let flow_topic = config.flow_topic();
        Self {
            sink,
            config,
            flow_topic,
        }
    }

    pub fn config(&self) -> &TopicConfig {
        &self.config
    }

    pub fn flow_topic(&self) -> &str {
        &self.flow_topic
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Publish every region, station, plant and link once.
    pub fn publish_context(&mut self, graph: &Graph) -> ContextSummary {
        let mut summary = ContextSummary::default();
        for region in graph.regions() {
            if self.send_serialized(REGIONS_TOPIC, &region.site.id, region) {
                summary.regions += 1;
            } else {
                summary.failures += 1;
            }
        }
        for station in graph.stations() {
            if self.send_serialized(STATIONS_TOPIC, &station.site.id, station) {
                summary.stations += 1;
            } else {
                summary.failures += 1;
            }
        }
        for plant in graph.power_plants() {
            if self.send_serialized(PLANTS_TOPIC, &plant.site.id, plant) {
                summary.plants += 1;
            } else {
                summary.failures += 1;
            }
        }
        for link in graph.links() {
            if self.send_serialized(STATIC_LINKS_TOPIC, &link.id, link) {
                summary.links += 1;
            } else {
                summary.failures += 1;
            }
        }
        if let Err(err) = self.sink.flush() {
            warn!("failed to flush grid context: {err}");
        }
        info!(
            app_id = %self.config.app_id,
            regions = summary.regions,
            stations = summary.stations,
            plants = summary.plants,
            links = summary.links,
            failures = summary.failures,
            "published grid context"
        );
        summary
    }

    fn send_serialized<T: Serialize>(&mut self, topic: &str, key: &str, record: &T) -> bool {
        let result = serde_json::to_value(record)
            .map_err(|source| TopicError::Encode {
                topic: topic.to_string(),
                source,
            })
            .and_then(|value| self.sink.send(topic, key, &value));
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(key, "failed to publish record: {err}");
                false
            }
        }
    }
}

impl<S: TopicSink> SamplePublisher for GridPublisher<S> {
    fn publish(&mut self, sample: &Sample) -> anyhow::Result<()> {
        let value = serde_json::to_value(sample).map_err(|source| TopicError::Encode {
            topic: self.flow_topic.clone(),
            source,
        })?;
        self.sink.send(&self.flow_topic, &sample.link_id, &value)?;
        Ok(())
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geogrid_core::{
        GraphBuilder, Megawatts, Node, PowerPlant, Region, SampleClock, Simulation, Site, Station,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    fn station(id: &str, name: &str, country: &str, lat: f64, lon: f64) -> Node {
        Node::Station(Station::new(Site::new(id, name, country, lat, lon)))
    }

    fn graph() -> Graph {
        let mut builder = GraphBuilder::new();
        builder
            .add_node(station("A", "Alpha", "DE", 52.0, 13.0))
            .unwrap();
        builder
            .add_node(station("B", "Beta", "DE", 50.0, 8.0))
            .unwrap();
        builder
            .add_node(Node::PowerPlant(PowerPlant::new(
                Site::new("P", "Plant", "DE", 51.0, 12.0),
                Megawatts(300.0),
                "A",
            )))
            .unwrap();
        builder
            .add_node(Node::Region(Region::new(
                Site::new("1", "Germany", "DE", 51.0, 10.0),
                Megawatts(10.0),
                Megawatts(6.0),
                Megawatts(1.0),
                Megawatts(2.0),
            )))
            .unwrap();
        builder.declare_segment("A", "B");
        builder.finalize().unwrap()
    }

    #[test]
    fn test_flow_topic_uses_namespace() {
        let config = TopicConfig {
            app_id: "demo3".into(),
            namespace: "test-".into(),
        };
        assert_eq!(config.flow_topic(), "test-grid-link-flow-data");
        assert_eq!(TopicConfig::default().flow_topic(), "grid-link-flow-data");
    }

    #[test]
    fn test_publish_context_records() {
        let mut publisher = GridPublisher::new(MemoryTopicSink::new(), TopicConfig::default());
        let summary = publisher.publish_context(&graph());
        assert_eq!(
            summary,
            ContextSummary {
                regions: 1,
                stations: 2,
                plants: 1,
                links: 2,
                failures: 0,
            }
        );

        let sink = publisher.into_sink();
        let plant = sink.records_for(PLANTS_TOPIC).next().unwrap();
        assert_eq!(plant.key, "P");
        assert_eq!(plant.value["linked_to_station"], "A");
        assert_eq!(plant.value["production"], 300.0);

        let keys: Vec<&str> = sink
            .records_for(STATIC_LINKS_TOPIC)
            .map(|r| r.key.as_str())
            .collect();
        assert_eq!(keys, vec!["A-B", "P-A"]);
    }

    #[test]
    fn test_simulation_samples_keyed_by_link() {
        let graph = graph();
        let config = TopicConfig {
            app_id: "demo3".into(),
            namespace: "ns.".into(),
        };
        let mut publisher = GridPublisher::new(MemoryTopicSink::new(), config);
        let mut rng = StdRng::seed_from_u64(3);
        let report = Simulation::new(&graph, SampleClock::new(0))
            .with_steps(4)
            .run(&mut rng, &mut publisher);
        assert_eq!(report.samples_generated(), 8);

        let sink = publisher.into_sink();
        let flows: Vec<&TopicRecord> = sink.records_for("ns.grid-link-flow-data").collect();
        assert_eq!(flows.len(), 8);
        assert_eq!(flows[0].key, "A-B");
        assert_eq!(flows[1].key, "P-A");
        assert_eq!(flows[7].value["step"], 3);
        assert_eq!(flows[7].value["ts"], 3000);
    }

    #[test]
    fn test_jsonl_sink_writes_one_file_per_topic() {
        let dir = tempdir().unwrap();
        let topics_dir = dir.path().join("topics");
        let mut sink = JsonlTopicSink::create(&topics_dir, "demo3").unwrap();
        sink.send("grid-stations", "A", &serde_json::json!({"id": "A"}))
            .unwrap();
        sink.send("grid-stations", "B", &serde_json::json!({"id": "B"}))
            .unwrap();
        sink.send("grid-regions", "1", &serde_json::json!({"id": "1"}))
            .unwrap();
        sink.flush().unwrap();

        let stations = fs::read_to_string(topics_dir.join("grid-stations.jsonl")).unwrap();
        let lines: Vec<Value> = stations
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["key"], "B");
        assert_eq!(lines[1]["value"]["id"], "B");
        assert!(topics_dir.join("grid-regions.jsonl").exists());
    }

    struct RejectingSink;

    impl TopicSink for RejectingSink {
        fn send(&mut self, topic: &str, _key: &str, _value: &Value) -> Result<(), TopicError> {
            Err(TopicError::Io {
                topic: topic.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "broker down"),
            })
        }
    }

    #[test]
    fn test_failures_are_counted_not_fatal() {
        let mut publisher = GridPublisher::new(RejectingSink, TopicConfig::default());
        let summary = publisher.publish_context(&graph());
        assert_eq!(summary.failures, 6);
        assert_eq!(summary.stations, 0);

        let mut rng = StdRng::seed_from_u64(1);
        let graph = graph();
        let report = Simulation::new(&graph, SampleClock::new(0))
            .with_steps(2)
            .run(&mut rng, &mut publisher);
        assert_eq!(report.publish_failures(), 4);
    }
}
