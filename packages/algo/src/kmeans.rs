//! K-Means clustering over small numeric feature sets.
//!
//! # Algorithm
//!
//! 1. Sample k distinct inputs uniformly as initial centroids
//! 2. Assign each item to the nearest centroid (Euclidean distance, first
//!    centroid wins ties)
//! 3. Recompute centroids as member means; an empty cluster is re-seeded with
//!    a random input
//! 4. Stop when no centroid coordinate moves more than the tolerance, or
//!    after `max_iterations` rounds
//! 5. Repeat from step 1 `restarts` times and keep the run with the lowest
//!    inertia (sum of squared distances to the assigned centroid)
//!
//! With fewer inputs than clusters every item lands in cluster 0.
//!
//! Randomness is injected so callers can seed it for reproducibility.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sanitize::sanitize_feature_vector;

/// Anything that can be viewed as a fixed-length numeric vector.
pub trait NumericFeatures {
    fn features(&self) -> Vec<f64>;
}

impl NumericFeatures for Vec<f64> {
    fn features(&self) -> Vec<f64> {
        self.clone()
    }
}

impl<const N: usize> NumericFeatures for [f64; N] {
    fn features(&self) -> Vec<f64> {
        self.to_vec()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum KMeansError {
    #[error("k must be > 0")]
    ZeroClusters,
    #[error("max_iterations must be > 0")]
    ZeroIterations,
    #[error("restarts must be > 0")]
    ZeroRestarts,
    #[error("tolerance must be a finite non-negative number, got {0}")]
    InvalidTolerance(f64),
    #[error("item {index} has {actual} features, expected {expected}")]
    DimensionMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    pub k: usize,
    /// Lloyd rounds per restart
    pub max_iterations: usize,
    /// Maximum per-coordinate centroid movement considered converged
    pub tolerance: f64,
    /// Independent random initializations; the lowest-inertia run wins
    pub restarts: usize,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_iterations: 100,
            tolerance: 0.001,
            restarts: 32,
        }
    }
}

impl KMeansConfig {
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), KMeansError> {
        if self.k == 0 {
            return Err(KMeansError::ZeroClusters);
        }
        if self.max_iterations == 0 {
            return Err(KMeansError::ZeroIterations);
        }
        if self.restarts == 0 {
            return Err(KMeansError::ZeroRestarts);
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(KMeansError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }
}

/// One input item and the cluster it was assigned to, in `[0, k)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment<T> {
    pub cluster: usize,
    pub data: T,
}

#[derive(Clone, Debug)]
pub struct KMeansResult<T> {
    /// Same order as the input
    pub assignments: Vec<ClusterAssignment<T>>,
    pub centroids: Vec<Vec<f64>>,
    /// Lloyd rounds of the winning restart
    pub iterations: usize,
    pub converged: bool,
    /// Sum of squared distances from each item to its centroid
    pub inertia: f64,
}

impl<T> KMeansResult<T> {
    pub fn cluster_sizes(&self, k: usize) -> Vec<usize> {
        let mut sizes = vec![0; k];
        for a in &self.assignments {
            if let Some(slot) = sizes.get_mut(a.cluster) {
                *slot += 1;
            }
        }
        sizes
    }
}

/// Cluster `items` into `k` groups with default iteration settings.
pub fn cluster<T, R>(
    items: &[T],
    k: usize,
    rng: &mut R,
) -> Result<Vec<ClusterAssignment<T>>, KMeansError>
where
    T: NumericFeatures + Clone,
    R: Rng + ?Sized,
{
    kmeans(items, &KMeansConfig::with_k(k), rng).map(|r| r.assignments)
}

pub fn kmeans<T, R>(
    items: &[T],
    config: &KMeansConfig,
    rng: &mut R,
) -> Result<KMeansResult<T>, KMeansError>
where
    T: NumericFeatures + Clone,
    R: Rng + ?Sized,
{
    config.validate()?;
    let points = feature_matrix(items)?;

    if items.len() < config.k {
        let labels = vec![0; points.len()];
        let centroids: Vec<Vec<f64>> = match points.first() {
            Some(first) => compute_means(&points, &labels, 1, first.len())
                .into_iter()
                .flatten()
                .collect(),
            None => Vec::new(),
        };
        let inertia = match centroids.first() {
            Some(mean) => points.iter().map(|p| euclidean_distance(p, mean).powi(2)).sum(),
            None => 0.0,
        };
        return Ok(KMeansResult {
            assignments: assign_all(items, &labels),
            centroids,
            iterations: 0,
            converged: true,
            inertia,
        });
    }

    let mut best: Option<LloydRun> = None;
    for _ in 0..config.restarts {
        let run = lloyd(&points, config, rng);
        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }

    // restarts >= 1 was validated above
    let run = best.unwrap_or_default();
    Ok(KMeansResult {
        assignments: assign_all(items, &run.labels),
        centroids: run.centroids,
        iterations: run.iterations,
        converged: run.converged,
        inertia: run.inertia,
    })
}

#[derive(Default)]
struct LloydRun {
    labels: Vec<usize>,
    centroids: Vec<Vec<f64>>,
    iterations: usize,
    converged: bool,
    inertia: f64,
}

/// One seeded Lloyd run. Requires `points.len() >= config.k`.
fn lloyd<R: Rng + ?Sized>(points: &[Vec<f64>], config: &KMeansConfig, rng: &mut R) -> LloydRun {
    let n = points.len();
    let dim = points[0].len();
    let mut centroids: Vec<Vec<f64>> = rand::seq::index::sample(rng, n, config.k)
        .into_iter()
        .map(|idx| points[idx].clone())
        .collect();
    let mut labels = vec![0usize; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        iterations += 1;

        for (label, point) in labels.iter_mut().zip(points) {
            *label = nearest_centroid(point, &centroids);
        }

        let updated: Vec<Vec<f64>> = compute_means(points, &labels, config.k, dim)
            .into_iter()
            .map(|mean| mean.unwrap_or_else(|| points[rng.gen_range(0..n)].clone()))
            .collect();

        let shift = max_shift(&centroids, &updated);
        centroids = updated;
        if shift <= config.tolerance {
            converged = true;
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(point, &label)| euclidean_distance(point, &centroids[label]).powi(2))
        .sum();

    LloydRun {
        labels,
        centroids,
        iterations,
        converged,
        inertia,
    }
}

/// Euclidean distance over the shared prefix of two vectors.
#[inline]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

fn feature_matrix<T: NumericFeatures>(items: &[T]) -> Result<Vec<Vec<f64>>, KMeansError> {
    let mut points = Vec::with_capacity(items.len());
    let mut expected = None;
    for (index, item) in items.iter().enumerate() {
        let mut features = item.features();
        sanitize_feature_vector(&mut features);
        let expected = *expected.get_or_insert(features.len());
        if features.len() != expected {
            return Err(KMeansError::DimensionMismatch {
                index,
                expected,
                actual: features.len(),
            });
        }
        points.push(features);
    }
    Ok(points)
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, centroid) in centroids.iter().enumerate() {
        let dist = euclidean_distance(point, centroid);
        if dist < best_dist {
            best = idx;
            best_dist = dist;
        }
    }
    best
}

/// Per-cluster means; `None` for clusters without members.
fn compute_means(
    points: &[Vec<f64>],
    labels: &[usize],
    k: usize,
    dim: usize,
) -> Vec<Option<Vec<f64>>> {
    let mut sums = vec![vec![0.0; dim]; k];
    let mut counts = vec![0usize; k];
    for (point, &label) in points.iter().zip(labels) {
        counts[label] += 1;
        for (acc, v) in sums[label].iter_mut().zip(point) {
            *acc += v;
        }
    }
    sums.into_iter()
        .zip(counts)
        .map(|(sum, count)| {
            (count > 0).then(|| sum.into_iter().map(|s| s / count as f64).collect())
        })
        .collect()
}

fn max_shift(old: &[Vec<f64>], new: &[Vec<f64>]) -> f64 {
    old.iter()
        .zip(new)
        .flat_map(|(a, b)| a.iter().zip(b).map(|(x, y)| (x - y).abs()))
        .fold(0.0, f64::max)
}

fn assign_all<T: Clone>(items: &[T], labels: &[usize]) -> Vec<ClusterAssignment<T>> {
    items
        .iter()
        .zip(labels)
        .map(|(data, &cluster)| ClusterAssignment {
            cluster,
            data: data.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    const GROUP_CENTERS: [[f64; 2]; 3] = [[0.0, 0.0], [100.0, 100.0], [-100.0, 50.0]];
    const GROUP_SIZE: usize = 5;

    /// Five points jittered by up to ±0.5 around each center, grouped in order.
    fn three_groups() -> Vec<Vec<f64>> {
        let mut jitter = rng(99);
        GROUP_CENTERS
            .iter()
            .flat_map(|center| {
                (0..GROUP_SIZE)
                    .map(|_| {
                        center
                            .iter()
                            .map(|c| c + jitter.gen_range(-0.5..=0.5))
                            .collect()
                    })
                    .collect::<Vec<Vec<f64>>>()
            })
            .collect()
    }

    #[test]
    fn fewer_items_than_k_all_in_cluster_zero() {
        let items = vec![vec![1.0, 2.0], vec![50.0, 60.0]];
        let out = cluster(&items, 3, &mut rng(1)).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|a| a.cluster == 0));
        assert_eq!(out[1].data, vec![50.0, 60.0]);
    }

    #[test]
    fn empty_input_is_empty_output() {
        let items: Vec<Vec<f64>> = Vec::new();
        assert!(cluster(&items, 3, &mut rng(1)).unwrap().is_empty());
    }

    #[test]
    fn zero_k_is_rejected() {
        let items = vec![vec![1.0]];
        assert_eq!(
            cluster(&items, 0, &mut rng(1)).unwrap_err(),
            KMeansError::ZeroClusters
        );
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let items = vec![vec![1.0, 2.0], vec![1.0], vec![3.0, 4.0]];
        assert_eq!(
            cluster(&items, 2, &mut rng(1)).unwrap_err(),
            KMeansError::DimensionMismatch {
                index: 1,
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn tight_groups_stay_together_across_seeds() {
        let items = three_groups();
        for seed in 0..200 {
            let out = cluster(&items, 3, &mut rng(seed)).unwrap();
            let labels: Vec<usize> = out
                .chunks(GROUP_SIZE)
                .map(|group| {
                    let first = group[0].cluster;
                    assert!(group.iter().all(|a| a.cluster == first), "seed {seed} split a group");
                    first
                })
                .collect();
            assert!(
                labels[0] != labels[1] && labels[1] != labels[2] && labels[0] != labels[2],
                "seed {seed} merged two groups: {labels:?}"
            );
        }
    }

    #[test]
    fn best_restart_has_lowest_inertia() {
        let items = three_groups();
        let single = KMeansConfig {
            restarts: 1,
            ..KMeansConfig::with_k(3)
        };
        let many = KMeansConfig::with_k(3);
        for seed in 0..20 {
            let one = kmeans(&items, &single, &mut rng(seed)).unwrap();
            let best = kmeans(&items, &many, &mut rng(seed)).unwrap();
            // the multi-restart run sees the single run's seeding first
            assert!(best.inertia <= one.inertia + 1e-9, "seed {seed}");
        }
    }

    #[test]
    fn zero_restarts_is_rejected() {
        let config = KMeansConfig {
            restarts: 0,
            ..Default::default()
        };
        assert_eq!(config.validate().unwrap_err(), KMeansError::ZeroRestarts);
    }

    #[test]
    fn indices_stay_in_range_and_iterations_bounded() {
        let items: Vec<[f64; 3]> = (0..30)
            .map(|i| [i as f64, (i * 7 % 11) as f64, (i % 3) as f64 * 10.0])
            .collect();
        let config = KMeansConfig::with_k(4);
        let result = kmeans(&items, &config, &mut rng(42)).unwrap();
        assert_eq!(result.assignments.len(), 30);
        assert!(result.assignments.iter().all(|a| a.cluster < 4));
        assert!(result.iterations >= 1 && result.iterations <= config.max_iterations);
        assert_eq!(result.centroids.len(), 4);
        assert_eq!(result.cluster_sizes(4).iter().sum::<usize>(), 30);
    }

    #[test]
    fn same_seed_same_result() {
        let items = three_groups();
        let a = cluster(&items, 3, &mut rng(7)).unwrap();
        let b = cluster(&items, 3, &mut rng(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn single_cluster_converges_to_mean() {
        let items = vec![vec![0.0, 0.0], vec![2.0, 4.0], vec![4.0, 8.0]];
        let result = kmeans(&items, &KMeansConfig::with_k(1), &mut rng(3)).unwrap();
        assert!(result.converged);
        assert!(euclidean_distance(&result.centroids[0], &[2.0, 4.0]) < 1e-9);
    }

    #[test]
    fn non_finite_features_are_zeroed() {
        let items = vec![vec![f64::NAN], vec![0.0], vec![f64::INFINITY]];
        let result = kmeans(&items, &KMeansConfig::with_k(1), &mut rng(3)).unwrap();
        assert_eq!(result.centroids[0], vec![0.0]);
    }

    #[test]
    fn euclidean_distance_basics() {
        assert_eq!(euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]), 5.0);
        assert_eq!(euclidean_distance(&[1.0], &[1.0]), 0.0);
    }
}
