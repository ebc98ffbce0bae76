//! Cost calibration for password-based key derivation.
//!
//! The iteration count is drawn at random from a range whose width is the
//! wall-clock time of a fixed CPU-bound workload, so faster hosts tend to
//! get smaller counts and slower hosts larger ones.
//!
//! # Security
//! The generator used here is seeded from the clock and the workload
//! timing. It is not a cryptographic source and is only ever used to pick
//! the cost factor. Salts and IVs come from a
//! [`RandomSource`](crate::random::RandomSource).

use std::hint::black_box;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::kdf::MIN_ITERATIONS;

/// Parameters for iteration-count calibration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationParams {
    /// Number of rounds in the timed workload.
    pub workload_rounds: u32,
    /// Lower bound applied to every drawn count.
    pub min_iterations: u32,
    /// Optional upper bound on the drawn count.
    pub max_iterations: Option<u32>,
}

impl CalibrationParams {
    /// Uncapped calibration with the standard workload.
    pub fn standard() -> Self {
        Self {
            workload_rounds: 130_000,
            min_iterations: MIN_ITERATIONS,
            max_iterations: None,
        }
    }

    /// Standard calibration with the result capped at `max_iterations`.
    ///
    /// A cap below the floor is raised to the floor.
    pub fn bounded(max_iterations: u32) -> Self {
        Self {
            max_iterations: Some(max_iterations.max(MIN_ITERATIONS)),
            ..Self::standard()
        }
    }
}

impl Default for CalibrationParams {
    fn default() -> Self {
        Self::standard()
    }
}

/// Supplies the iteration count used when sealing.
pub trait IterationSource: Send + Sync {
    /// Produce an iteration count for one `seal` call.
    fn iterations(&self) -> u32;
}

/// Benchmark-driven iteration source.
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    params: CalibrationParams,
}

impl Calibrator {
    /// Create a calibrator with the given parameters.
    pub fn new(params: CalibrationParams) -> Self {
        Self { params }
    }

    /// Get the calibration parameters.
    pub fn params(&self) -> &CalibrationParams {
        &self.params
    }

    /// Run the workload and draw an iteration count.
    ///
    /// # Postconditions
    /// - Result is at least `min_iterations`
    /// - Result is at most `max_iterations` when a cap is set
    pub fn calibrate(&self) -> u32 {
        let elapsed = workload(self.params.workload_rounds);
        let seed = unix_nanos().wrapping_add(elapsed);
        let iterations = pick_iterations(elapsed, seed, &self.params);

        debug!(elapsed_ns = elapsed, iterations, "Calibrated key derivation cost");
        iterations
    }
}

impl IterationSource for Calibrator {
    fn iterations(&self) -> u32 {
        self.calibrate()
    }
}

/// Iteration source that always returns the same count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedIterations(u32);

impl FixedIterations {
    /// Create a fixed source. Counts below the floor are raised to it.
    pub fn new(iterations: u32) -> Self {
        Self(iterations.max(MIN_ITERATIONS))
    }
}

impl IterationSource for FixedIterations {
    fn iterations(&self) -> u32 {
        self.0
    }
}

/// Time `rounds` doublings and return the elapsed nanoseconds.
pub fn workload(rounds: u32) -> u64 {
    let start = Instant::now();
    let mut sum: i64 = 1;
    for _ in 0..rounds {
        sum = black_box(sum).wrapping_mul(2);
    }
    black_box(sum);
    u64::try_from(start.elapsed().as_nanos()).unwrap_or(u64::MAX)
}

/// Draw a count uniformly from `[0, elapsed]` and apply the bounds.
pub fn pick_iterations(elapsed: u64, seed: u64, params: &CalibrationParams) -> u32 {
    let mut rng = StdRng::seed_from_u64(seed);
    let drawn = rng.gen_range(0..=elapsed);

    let floor = u64::from(params.min_iterations.max(MIN_ITERATIONS));
    let mut iterations = drawn.max(floor);
    if let Some(max) = params.max_iterations {
        iterations = iterations.min(u64::from(max).max(floor));
    }
    u32::try_from(iterations).unwrap_or(u32::MAX)
}

fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
