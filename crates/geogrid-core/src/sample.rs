//! Synthetic flow samples per link.
//!
//! Each sample is memoryless white noise around the link's average flow:
//! `avg_flow ± U(0,1) * avg_flow * epsilon`, with the sign drawn from an
//! independent coin flip. Consecutive steps of one link are independent.
//!
//! The random source is injected so callers can seed it:
//!
//! ```
//! use geogrid_core::{Link, LinkKind, SampleClock, SampleGenerator};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let link = Link {
//!     id: "A-B".into(),
//!     source: "A".into(),
//!     target: "B".into(),
//!     kind: LinkKind::GridSegment,
//!     avg_flow: 100.0,
//!     epsilon: 0.1,
//!     region_context_tag: "DE->DE".into(),
//!     visual_offset: 0.0,
//! };
//! let generator = SampleGenerator::new(SampleClock::new(0));
//! let mut rng = StdRng::seed_from_u64(7);
//! let sample = generator.generate(&link, 3, &mut rng);
//! assert_eq!(sample.timestamp_millis, 3000);
//! assert!((90.0..=110.0).contains(&sample.flow));
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::Link;

/// Milliseconds between two consecutive simulation steps.
pub const STEP_MILLIS: i64 = 1000;

/// One flow observation of one link at one simulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "id")]
    pub link_id: String,
    pub step: u64,
    #[serde(rename = "ts")]
    pub timestamp_millis: i64,
    pub flow: f64,
}

/// Maps step indices to timestamps relative to a fixed epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleClock {
    epoch_millis: i64,
}

impl SampleClock {
    pub fn new(epoch_millis: i64) -> Self {
        Self { epoch_millis }
    }

    /// Clock anchored at the current wall-clock time.
    pub fn now() -> Self {
        Self::new(chrono::Utc::now().timestamp_millis())
    }

    pub fn epoch_millis(&self) -> i64 {
        self.epoch_millis
    }

    pub fn timestamp_for(&self, step: u64) -> i64 {
        self.epoch_millis + step as i64 * STEP_MILLIS
    }
}

/// Produces [`Sample`]s for links.
#[derive(Debug, Clone, Copy)]
pub struct SampleGenerator {
    clock: SampleClock,
}

impl SampleGenerator {
    pub fn new(clock: SampleClock) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> SampleClock {
        self.clock
    }

    pub fn generate<R: Rng + ?Sized>(&self, link: &Link, step: u64, rng: &mut R) -> Sample {
        Sample {
            link_id: link.id.clone(),
            step,
            timestamp_millis: self.clock.timestamp_for(step),
            flow: noisy_flow(link.avg_flow, link.epsilon, rng),
        }
    }
}

/// Draw one white-noise value in `[avg - avg*epsilon, avg + avg*epsilon]`.
pub fn noisy_flow<R: Rng + ?Sized>(avg_flow: f64, epsilon: f64, rng: &mut R) -> f64 {
    let band = avg_flow * epsilon;
    let delta = rng.gen::<f64>() * band;
    if rng.gen::<f64>() > 0.5 {
        avg_flow + delta
    } else {
        avg_flow - delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LinkKind;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn link(avg_flow: f64, epsilon: f64) -> Link {
        Link {
            id: "A-B".into(),
            source: "A".into(),
            target: "B".into(),
            kind: LinkKind::GridSegment,
            avg_flow,
            epsilon,
            region_context_tag: "DE->DE".into(),
            visual_offset: 0.0,
        }
    }

    #[test]
    fn test_flow_stays_within_envelope() {
        let generator = SampleGenerator::new(SampleClock::new(0));
        for (avg, eps) in [(100.0, 0.1), (1800.0, 0.25), (0.5, 1.0), (250.0, 0.0)] {
            let link = link(avg, eps);
            let (lo, hi) = link.flow_envelope();
            let mut rng = StdRng::seed_from_u64(42);
            for step in 0..1000 {
                let sample = generator.generate(&link, step, &mut rng);
                assert!(
                    sample.flow >= lo && sample.flow <= hi,
                    "flow {} outside [{lo}, {hi}]",
                    sample.flow
                );
            }
        }
    }

    #[test]
    fn test_zero_epsilon_is_exact() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(noisy_flow(75.0, 0.0, &mut rng), 75.0);
        }
    }

    #[test]
    fn test_both_signs_occur() {
        let mut rng = StdRng::seed_from_u64(9);
        let values: Vec<f64> = (0..200).map(|_| noisy_flow(100.0, 0.1, &mut rng)).collect();
        assert!(values.iter().any(|v| *v > 100.0));
        assert!(values.iter().any(|v| *v < 100.0));
    }

    #[test]
    fn test_constant_source_extremes() {
        // All-zero bits give a zero magnitude, so the flow is exactly the average.
        let mut rng = StepRng::new(0, 0);
        assert_eq!(noisy_flow(100.0, 0.1, &mut rng), 100.0);

        // All-ones draws the largest magnitude and takes the positive branch.
        let mut rng = StepRng::new(u64::MAX, 0);
        let flow = noisy_flow(100.0, 0.1, &mut rng);
        assert!(flow > 109.9 && flow <= 110.0);
    }

    #[test]
    fn test_timestamps_follow_step_index() {
        let clock = SampleClock::new(1_600_000_000_000);
        let generator = SampleGenerator::new(clock);
        let mut rng = StdRng::seed_from_u64(3);
        let first = generator.generate(&link(10.0, 0.1), 0, &mut rng);
        let later = generator.generate(&link(10.0, 0.1), 7, &mut rng);
        assert_eq!(first.timestamp_millis, 1_600_000_000_000);
        assert_eq!(
            later.timestamp_millis - first.timestamp_millis,
            7 * STEP_MILLIS
        );
        assert_eq!(later.link_id, "A-B");
        assert_eq!(later.step, 7);
    }

    #[test]
    fn test_sample_json_shape() {
        let sample = Sample {
            link_id: "A-B".into(),
            step: 2,
            timestamp_millis: 2000,
            flow: 99.5,
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["id"], "A-B");
        assert_eq!(json["ts"], 2000);
        assert_eq!(json["flow"], 99.5);
    }
}
