//! Lloyd's k-means over RGB samples.
//!
//! Seeding is k-means++ driven by a seeded PCG generator, so the same
//! samples and seed always produce the same labels. Several attempts are
//! run from different seedings and the one with the lowest inertia wins.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::types::MosaicError;

/// One RGB sample or center.
pub type Sample = [f32; 3];

/// Default number of independent seedings.
pub const DEFAULT_ATTEMPTS: u32 = 10;

/// Default iteration cap per attempt.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100;

/// Default convergence threshold on center movement.
pub const DEFAULT_EPSILON: f32 = 0.2;

/// Parameters for one clustering run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansParams {
    /// Number of clusters.
    pub k: usize,
    /// Independent seedings; the lowest-inertia result is kept.
    pub attempts: u32,
    /// Iteration cap per attempt.
    pub max_iterations: u32,
    /// An attempt converges once no center moves farther than this.
    pub epsilon: f32,
    /// RNG seed.
    pub seed: u64,
}

impl KMeansParams {
    /// Default attempts, iterations, and epsilon for `k` clusters.
    #[must_use]
    pub const fn new(k: usize, seed: u64) -> Self {
        Self {
            k,
            attempts: DEFAULT_ATTEMPTS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
            seed,
        }
    }
}

/// Result of a clustering run.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster label in `[0, k)` for every input sample, in input order.
    pub labels: Vec<usize>,
    /// Final cluster centers.
    pub centers: Vec<Sample>,
    /// Sum of squared distances from each sample to its center.
    pub inertia: f64,
}

/// Cluster `samples` into `params.k` groups.
///
/// # Errors
///
/// Returns [`MosaicError::InvalidInput`] if `k` is zero or exceeds the
/// number of samples.
pub fn kmeans(samples: &[Sample], params: &KMeansParams) -> Result<Clustering, MosaicError> {
    if params.k == 0 {
        return Err(MosaicError::InvalidInput(
            "cluster count must be at least 1".to_string(),
        ));
    }
    if samples.len() < params.k {
        return Err(MosaicError::InvalidInput(format!(
            "cannot form {} clusters from {} samples",
            params.k,
            samples.len(),
        )));
    }

    let mut rng = Pcg64Mcg::seed_from_u64(params.seed);
    let mut best: Option<Clustering> = None;
    for _ in 0..params.attempts.max(1) {
        let centers = seed_centers(samples, params.k, &mut rng);
        let candidate = lloyd(samples, centers, params);
        if best.as_ref().is_none_or(|b| candidate.inertia < b.inertia) {
            best = Some(candidate);
        }
    }

    // `attempts.max(1)` guarantees at least one candidate.
    best.ok_or_else(|| MosaicError::InvalidInput("no clustering attempts ran".to_string()))
}

fn distance2(a: &Sample, b: &Sample) -> f32 {
    let dr = a[0] - b[0];
    let dg = a[1] - b[1];
    let db = a[2] - b[2];
    dr.mul_add(dr, dg.mul_add(dg, db * db))
}

/// k-means++ seeding. When every sample already coincides with a chosen
/// center the remaining centers duplicate the first one.
fn seed_centers(samples: &[Sample], k: usize, rng: &mut Pcg64Mcg) -> Vec<Sample> {
    let mut centers = Vec::with_capacity(k);
    centers.push(samples[rng.gen_range(0..samples.len())]);

    let mut nearest: Vec<f64> = samples
        .iter()
        .map(|s| f64::from(distance2(s, &centers[0])))
        .collect();

    while centers.len() < k {
        let total: f64 = nearest.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen_range(0.0..total);
            let mut chosen = samples.len() - 1;
            for (i, &d) in nearest.iter().enumerate() {
                if target < d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            samples[chosen]
        } else {
            centers[0]
        };
        centers.push(next);
        for (d, s) in nearest.iter_mut().zip(samples) {
            *d = d.min(f64::from(distance2(s, &next)));
        }
    }
    centers
}

/// Index of the nearest center. Ties go to the lowest index.
fn nearest_center(sample: &Sample, centers: &[Sample]) -> (usize, f32) {
    let mut best = 0;
    let mut best_d = f32::INFINITY;
    for (i, c) in centers.iter().enumerate() {
        let d = distance2(sample, c);
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    (best, best_d)
}

/// Label every sample with its nearest center and return the inertia.
fn assign(samples: &[Sample], centers: &[Sample], labels: &mut [usize]) -> f64 {
    let mut inertia = 0.0;
    for (label, s) in labels.iter_mut().zip(samples) {
        let (nearest, d) = nearest_center(s, centers);
        *label = nearest;
        inertia += f64::from(d);
    }
    inertia
}

/// Mean of each cluster's samples. Empty clusters keep their old center.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn update_centers(samples: &[Sample], labels: &[usize], centers: &[Sample]) -> Vec<Sample> {
    let mut sums = vec![[0.0_f64; 3]; centers.len()];
    let mut counts = vec![0_u64; centers.len()];
    for (s, &label) in samples.iter().zip(labels) {
        for c in 0..3 {
            sums[label][c] += f64::from(s[c]);
        }
        counts[label] += 1;
    }
    centers
        .iter()
        .zip(sums.iter().zip(&counts))
        .map(|(old, (sum, &count))| {
            if count == 0 {
                *old
            } else {
                let n = count as f64;
                [
                    (sum[0] / n) as f32,
                    (sum[1] / n) as f32,
                    (sum[2] / n) as f32,
                ]
            }
        })
        .collect()
}

fn lloyd(samples: &[Sample], mut centers: Vec<Sample>, params: &KMeansParams) -> Clustering {
    let mut labels = vec![0; samples.len()];
    let eps2 = params.epsilon * params.epsilon;

    for _ in 0..params.max_iterations {
        assign(samples, &centers, &mut labels);
        let updated = update_centers(samples, &labels, &centers);
        let shift = centers
            .iter()
            .zip(&updated)
            .map(|(a, b)| distance2(a, b))
            .fold(0.0_f32, f32::max);
        centers = updated;
        if shift <= eps2 {
            break;
        }
    }

    let inertia = assign(samples, &centers, &mut labels);
    Clustering {
        labels,
        centers,
        inertia,
    }
}
