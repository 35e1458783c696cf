use std::path::Path;

use anyhow::{Context, Result};
use geogrid_cli::cli::SimulateArgs;
use geogrid_cli::config::GeogridConfig;
use geogrid_core::{Graph, SampleClock, Simulation, SimulationReport};
use geogrid_io::{GridPublisher, JsonlTopicSink};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use super::export::write_all;
use super::load_grid;
use super::publish::open_publisher;

pub fn handle(args: &SimulateArgs, config: &GeogridConfig) -> Result<()> {
    let graph = load_grid(config)?;
    let mut publisher = open_publisher(&config.topics, args.topics_dir.as_deref())?;
    let report = simulate(&graph, args, config, &mut publisher);
    print_report(&report, args.json)
}

/// Export the map files, publish the context once, then run the step loop.
pub fn run_scenario(
    args: &SimulateArgs,
    out_dir: Option<&Path>,
    config: &GeogridConfig,
) -> Result<()> {
    let graph = load_grid(config)?;

    for path in write_all(&graph, &config.output, out_dir)? {
        info!(path = %path.display(), "exported");
    }

    let mut publisher = open_publisher(&config.topics, args.topics_dir.as_deref())?;
    let context = publisher.publish_context(&graph);
    if !args.json {
        println!(
            "Published context: {} region(s), {} station(s), {} plant(s), {} link(s)",
            context.regions, context.stations, context.plants, context.links
        );
    }

    let report = simulate(&graph, args, config, &mut publisher);
    print_report(&report, args.json)
}

fn simulate(
    graph: &Graph,
    args: &SimulateArgs,
    config: &GeogridConfig,
    publisher: &mut GridPublisher<JsonlTopicSink>,
) -> SimulationReport {
    let steps = args.steps.unwrap_or(config.simulation.steps);
    let seed = args.seed.or(config.simulation.seed);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    info!(
        steps,
        ?seed,
        topic = publisher.flow_topic(),
        "starting simulation"
    );
    Simulation::new(graph, SampleClock::now())
        .with_steps(steps)
        .run(&mut rng, publisher)
}

fn print_report(report: &SimulationReport, json: bool) -> Result<()> {
    if json {
        let payload =
            serde_json::to_string_pretty(report).context("serializing simulation report")?;
        println!("{payload}");
        return Ok(());
    }
    println!(
        "Simulated {} step(s): {} sample(s), {} publish failure(s)",
        report.steps.len(),
        report.samples_generated(),
        report.publish_failures()
    );
    if let Some(last) = report.steps.last() {
        println!("{}", last.balance);
    }
    Ok(())
}
