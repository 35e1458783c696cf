use std::path::Path;

use anyhow::{Context, Result};
use geogrid_cli::config::{GeogridConfig, TopicsConfig};
use geogrid_io::{GridPublisher, JsonlTopicSink};

use super::load_grid;

pub fn handle(topics_dir: Option<&Path>, config: &GeogridConfig) -> Result<()> {
    let graph = load_grid(config)?;
    let mut publisher = open_publisher(&config.topics, topics_dir)?;
    let summary = publisher.publish_context(&graph);
    println!(
        "Published {} region(s), {} station(s), {} plant(s), {} link(s) to {}",
        summary.regions,
        summary.stations,
        summary.plants,
        summary.links,
        publisher.sink().dir().display()
    );
    if summary.failures > 0 {
        println!("{} record(s) failed to publish", summary.failures);
    }
    Ok(())
}

pub fn open_publisher(
    topics: &TopicsConfig,
    topics_dir: Option<&Path>,
) -> Result<GridPublisher<JsonlTopicSink>> {
    let dir = topics_dir.unwrap_or(topics.topics_dir.as_path());
    let sink = JsonlTopicSink::create(dir, topics.app_id.clone())
        .with_context(|| format!("creating topics directory '{}'", dir.display()))?;
    Ok(GridPublisher::new(sink, topics.topic_config()))
}
