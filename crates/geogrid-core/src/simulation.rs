//! Bounded simulation loop over a finished graph.
//!
//! For each step in `[0, steps)` one [`Sample`] is generated per link and
//! handed to a [`SamplePublisher`]; afterwards the regional balance is
//! recomputed over the (static) region set. Publish failures never stop the
//! loop: they are logged and counted in the step's [`StepSummary`].

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::balance::{balance, RegionalBalance};
use crate::graph::Graph;
use crate::sample::{Sample, SampleClock, SampleGenerator};

/// Steps run by the reference scenario.
pub const DEFAULT_STEPS: u64 = 10;

/// Destination for generated samples (a message bus, a file, a buffer).
pub trait SamplePublisher {
    fn publish(&mut self, sample: &Sample) -> anyhow::Result<()>;

    /// Called once after all samples of a step were published.
    fn flush(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Collects samples in memory.
impl SamplePublisher for Vec<Sample> {
    fn publish(&mut self, sample: &Sample) -> anyhow::Result<()> {
        self.push(sample.clone());
        Ok(())
    }
}

impl<P: SamplePublisher + ?Sized> SamplePublisher for &mut P {
    fn publish(&mut self, sample: &Sample) -> anyhow::Result<()> {
        (**self).publish(sample)
    }

    fn flush(&mut self) -> anyhow::Result<()> {
        (**self).flush()
    }
}

/// Outcome of one simulation step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub step: u64,
    pub samples: usize,
    pub publish_failures: usize,
    pub balance: RegionalBalance,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SimulationReport {
    pub steps: Vec<StepSummary>,
}

impl SimulationReport {
    pub fn samples_generated(&self) -> usize {
        self.steps.iter().map(|s| s.samples).sum()
    }

    pub fn publish_failures(&self) -> usize {
        self.steps.iter().map(|s| s.publish_failures).sum()
    }
}

/// Step loop bound to one graph.
#[derive(Debug, Clone, Copy)]
pub struct Simulation<'g> {
    graph: &'g Graph,
    generator: SampleGenerator,
    steps: u64,
}

impl<'g> Simulation<'g> {
    pub fn new(graph: &'g Graph, clock: SampleClock) -> Self {
        Self {
            graph,
            generator: SampleGenerator::new(clock),
            steps: DEFAULT_STEPS,
        }
    }

    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn run<R, P>(&self, rng: &mut R, publisher: &mut P) -> SimulationReport
    where
        R: Rng + ?Sized,
        P: SamplePublisher + ?Sized,
    {
        let mut report = SimulationReport::default();
        for step in 0..self.steps {
            report.steps.push(self.run_step(step, rng, publisher));
        }
        report
    }

    fn run_step<R, P>(&self, step: u64, rng: &mut R, publisher: &mut P) -> StepSummary
    where
        R: Rng + ?Sized,
        P: SamplePublisher + ?Sized,
    {
        info!("[ITERATION] -> {step}");
        let mut samples = 0;
        let mut publish_failures = 0;
        for link in self.graph.links() {
            let sample = self.generator.generate(link, step, rng);
            debug!(
                link = %sample.link_id,
                ts = sample.timestamp_millis,
                flow = sample.flow,
                "sample"
            );
            samples += 1;
            if let Err(err) = publisher.publish(&sample) {
                publish_failures += 1;
                warn!(link = %sample.link_id, step, "failed to publish sample: {err:#}");
            }
        }
        if let Err(err) = publisher.flush() {
            warn!(step, "failed to flush publisher: {err:#}");
        }

        let balance = balance(self.graph.regions());
        for line in balance.to_string().lines() {
            info!("{line}");
        }
        StepSummary {
            step,
            samples,
            publish_failures,
            balance,
        }
    }
}
