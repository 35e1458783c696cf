use assert_cmd::Command;
use geogrid_cli::config::GeogridConfig;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn repo_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join(relative)
}

fn geogrid() -> Command {
    Command::cargo_bin("geogrid").unwrap()
}

fn grid_dir() -> String {
    repo_path("test_data/grid").to_str().unwrap().to_string()
}

fn geogrid_on(data_dir: &str) -> Command {
    let mut cmd = geogrid();
    cmd.args(["--data-dir", data_dir]);
    cmd
}

fn copy_fixtures(dir: &Path, names: &[&str]) {
    for name in names {
        fs::copy(repo_path("test_data/grid").join(name), dir.join(name)).unwrap();
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn feature_count(collection: &Value) -> usize {
    collection["features"].as_array().unwrap().len()
}

fn read_jsonl(path: &Path) -> Vec<Value> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

fn topic_records(dir: &Path, topic: &str) -> Vec<Value> {
    read_jsonl(&dir.join(format!("{topic}.jsonl")))
}

#[test]
fn geogrid_graph_stats_runs() {
    geogrid_on(&grid_dir())
        .args(["graph", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nodes         : 15"))
        .stdout(predicate::str::contains("Links         : 12"))
        .stdout(predicate::str::contains("Components    : 4"))
        .stdout(predicate::str::contains("PLANT_FEED"));
}

#[test]
fn geogrid_graph_stats_lists_only_graph_link_kinds() {
    geogrid_on(&grid_dir())
        .args(["graph", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GRID_SEGMENT"))
        .stdout(predicate::str::contains("REGION_TRANSFER").not());
}

#[test]
fn geogrid_graph_export_dot() {
    let segment = "\"6ST12345\" -> \"5ST12345\" [label=\"GRID_SEGMENT\"]";
    let feed = "\"PP2\" -> \"5ST12345\" [label=\"PLANT_FEED\"]";
    geogrid_on(&grid_dir())
        .args(["graph", "export", "--format", "dot"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph geogrid {"))
        .stdout(predicate::str::contains(segment))
        .stdout(predicate::str::contains(feed));
}

#[test]
fn geogrid_export_geojson_writes_three_files() {
    let out = tempdir().unwrap();
    geogrid_on(&grid_dir())
        .args(["export", "geojson", "--out-dir"])
        .arg(out.path())
        .assert()
        .success();

    // 9 segments + 9 stations + 3 plants + 3 feeds
    let grid = read_json(&out.path().join("grid.json"));
    assert_eq!(feature_count(&grid), 24);

    let transfers = read_json(&out.path().join("links-result.json"));
    assert_eq!(feature_count(&transfers), 6);

    let nodes = read_json(&out.path().join("nodes.geojson"));
    assert_eq!(feature_count(&nodes), 15);
    let plant = &nodes["features"][9];
    assert_eq!(plant["properties"]["image"], "ppt.png");
}

#[test]
fn geogrid_publish_writes_context_topics() {
    let topics = tempdir().unwrap();
    let dir = topics.path();
    let published = "Published 3 region(s), 9 station(s)";
    geogrid_on(&grid_dir())
        .args(["publish", "--topics-dir"])
        .arg(dir)
        .assert()
        .success()
        .stdout(predicate::str::contains(published));

    let stations = topic_records(dir, "grid-stations");
    assert_eq!(stations.len(), 9);
    assert_eq!(stations[0]["key"], "1ST12345");
    assert_eq!(topic_records(dir, "grid-static-links").len(), 12);
    assert_eq!(topic_records(dir, "grid-plants").len(), 3);
    assert_eq!(topic_records(dir, "grid-regions").len(), 3);
}

#[test]
fn geogrid_simulate_publishes_samples_per_link() {
    let topics = tempdir().unwrap();
    let dir = topics.path();
    let summary = "Simulated 3 step(s): 36 sample(s), 0 publish failure(s)";
    geogrid_on(&grid_dir())
        .args(["simulate", "--steps", "3", "--seed", "42", "--topics-dir"])
        .arg(dir)
        .assert()
        .success()
        .stdout(predicate::str::contains(summary))
        .stdout(predicate::str::contains("Export-Import : 120 :: 70 => 50"))
        .stdout(predicate::str::contains("Excess        : 0"));

    let samples = topic_records(dir, "grid-link-flow-data");
    assert_eq!(samples.len(), 36);
    let first = &samples[0];
    assert_eq!(first["key"], first["value"]["id"]);
    assert_eq!(first["value"]["step"], 0);
    assert_eq!(samples[35]["value"]["step"], 2);
}

#[test]
fn geogrid_simulate_json_report_with_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("geogrid.toml");
    let topics_dir = dir.path().join("topics");

    let mut config = GeogridConfig::default();
    config.data.data_dir = repo_path("test_data/grid");
    config.topics.namespace = "lab.".into();
    config.topics.topics_dir = topics_dir.clone();
    config.simulation.steps = 2;
    config.simulation.seed = Some(7);
    fs::write(&config_path, toml::to_string(&config).unwrap()).unwrap();

    let output = geogrid()
        .arg("--config")
        .arg(&config_path)
        .args(["simulate", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["steps"].as_array().unwrap().len(), 2);
    assert_eq!(report["steps"][1]["samples"], 12);
    assert!(topics_dir.join("lab.grid-link-flow-data.jsonl").exists());
}

#[test]
fn geogrid_run_full_scenario() {
    let dir = tempdir().unwrap();
    let out_dir = dir.path().join("out");
    let topics_dir = dir.path().join("topics");
    let summary = "Simulated 10 step(s): 120 sample(s)";
    geogrid_on(&grid_dir())
        .args(["run", "--seed", "1", "--out-dir"])
        .arg(&out_dir)
        .arg("--topics-dir")
        .arg(&topics_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains(summary));
    assert!(out_dir.join("grid.json").exists());
    assert!(topics_dir.join("grid-regions.jsonl").exists());
    assert_eq!(topic_records(&topics_dir, "grid-link-flow-data").len(), 120);
}

#[test]
fn geogrid_demo_segments_when_no_segments_file() {
    let data = tempdir().unwrap();
    let dir = data.path();
    copy_fixtures(dir, &["stations.csv", "plants.csv", "regions.csv"]);
    geogrid_on(dir.to_str().unwrap())
        .args(["graph", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Links         : 21"));
}

#[test]
fn geogrid_rejects_malformed_rows() {
    let data = tempdir().unwrap();
    let dir = data.path();
    copy_fixtures(dir, &["stations.csv", "plants.csv", "segments.csv"]);
    let header = "id,country,name,lat,lon,production,consumption,imports,exports";
    let regions = format!("{header}\n1,DE,Germany,51.1,10.4,600.0\n");
    fs::write(dir.join("regions.csv"), regions).unwrap();
    geogrid_on(dir.to_str().unwrap())
        .args(["graph", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed region record"));
}

#[test]
fn geogrid_rejects_plant_with_unknown_station() {
    let data = tempdir().unwrap();
    let dir = data.path();
    copy_fixtures(dir, &["stations.csv", "regions.csv", "segments.csv"]);
    let header = "id,country,name,lat,lon,production,station";
    let plants = format!("{header}\nPPX,DE,Ghost,51.0,12.0,10.0,NOPE\n");
    fs::write(dir.join("plants.csv"), plants).unwrap();
    geogrid_on(dir.to_str().unwrap())
        .args(["graph", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown link endpoint 'NOPE'"));
}
