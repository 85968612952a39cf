//! Seeded k-means clustering
//!
//! Partitions points into `k` clusters minimizing the within-cluster sum of
//! squared Euclidean distances (inertia).
//!
//! # Algorithm
//!
//! 1. **Seeding**: k-means++ (first centroid uniformly at random, each
//!    further centroid drawn with probability proportional to the squared
//!    distance to the nearest chosen centroid)
//! 2. **Relocation**: assign every point to its nearest centroid, move each
//!    centroid to the mean of its points, repeat until no assignment changes
//!    or the centroid shift falls below the tolerance
//! 3. **Empty clusters**: an empty cluster takes over the point farthest from
//!    its current centroid
//! 4. **Restarts**: the whole procedure runs `restarts` times from one seeded
//!    generator and the lowest-inertia result is kept (earliest wins ties)
//!
//! All randomness comes from a [`Pcg64`] seeded with [`KMeans::seed`], so a
//! fixed seed and identical input always produce identical assignments.
//!
//! # Examples
//!
//! ```
//! use combirank_stats::kmeans::KMeans;
//!
//! let points = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.0],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.0],
//! ];
//! let fit = KMeans::new(2).fit(&points).unwrap();
//! assert_eq!(fit.labels[0], fit.labels[1]);
//! assert_eq!(fit.labels[2], fit.labels[3]);
//! assert_ne!(fit.labels[0], fit.labels[2]);
//! ```

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg64;

/// k-means parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    /// Number of clusters
    pub k: usize,
    /// Seed for the random number generator
    pub seed: u64,
    /// Maximum relocation iterations per restart
    pub max_iterations: usize,
    /// Number of independent seedings; the best result is kept
    pub restarts: usize,
    /// Convergence threshold on the total squared centroid shift
    pub tolerance: f64,
}

/// Result of a k-means fit.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit {
    /// Cluster index (`0..k`) for each input point, in input order
    pub labels: Vec<usize>,
    /// Final centroid of each cluster
    pub centroids: Vec<Vec<f64>>,
    /// Within-cluster sum of squared distances
    pub inertia: f64,
    /// Relocation iterations used by the kept restart
    pub iterations: usize,
}

impl KMeans {
    /// Default seed, matching common reproducible-analysis practice.
    pub const DEFAULT_SEED: u64 = 42;

    /// Creates a configuration with default seed, iteration budget and restarts.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            seed: Self::DEFAULT_SEED,
            max_iterations: 300,
            restarts: 10,
            tolerance: 1e-4,
        }
    }

    /// Runs k-means on `points`.
    ///
    /// Returns `None` if `k` is zero, `k` exceeds the number of points,
    /// points have differing dimensions, or any coordinate is non-finite.
    #[must_use]
    pub fn fit(&self, points: &[Vec<f64>]) -> Option<KMeansFit> {
        if self.k == 0 || self.k > points.len() {
            return None;
        }
        let dim = points[0].len();
        if points
            .iter()
            .any(|p| p.len() != dim || p.iter().any(|v| !v.is_finite()))
        {
            return None;
        }

        let mut rng = Pcg64::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit> = None;
        for _ in 0..self.restarts.max(1) {
            let centroids = init_plus_plus(points, self.k, &mut rng);
            let fit = self.relocate(points, centroids);
            if best.as_ref().is_none_or(|b| fit.inertia < b.inertia) {
                best = Some(fit);
            }
        }
        best
    }

    fn relocate(&self, points: &[Vec<f64>], mut centroids: Vec<Vec<f64>>) -> KMeansFit {
        let mut labels = assign(points, &centroids);
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;
            let updated = update_centroids(points, &labels, &centroids);
            let shift = centroids
                .iter()
                .zip(&updated)
                .map(|(a, b)| squared_distance(a, b))
                .sum::<f64>();
            centroids = updated;
            let new_labels = assign(points, &centroids);
            let unchanged = new_labels == labels;
            labels = new_labels;
            if unchanged || shift <= self.tolerance {
                break;
            }
        }

        let inertia = points
            .iter()
            .zip(&labels)
            .map(|(p, &l)| squared_distance(p, &centroids[l]))
            .sum();
        KMeansFit {
            labels,
            centroids,
            inertia,
            iterations,
        }
    }
}

fn init_plus_plus(points: &[Vec<f64>], k: usize, rng: &mut Pcg64) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())].clone());

    let mut nearest = points
        .iter()
        .map(|p| squared_distance(p, &centroids[0]))
        .collect::<Vec<_>>();
    while centroids.len() < k {
        let total = nearest.iter().sum::<f64>();
        let next = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            let mut chosen = nearest.iter().rposition(|d| *d > 0.0).unwrap_or(0);
            for (i, d) in nearest.iter().enumerate() {
                if target < *d {
                    chosen = i;
                    break;
                }
                target -= d;
            }
            chosen
        } else {
            // Every point coincides with a centroid already
            rng.random_range(0..points.len())
        };
        let centroid = points[next].clone();
        for (d, p) in nearest.iter_mut().zip(points) {
            *d = d.min(squared_distance(p, &centroid));
        }
        centroids.push(centroid);
    }
    centroids
}

fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|p| nearest_centroid(p, centroids).0)
        .collect()
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    centroids
        .iter()
        .enumerate()
        .map(|(i, c)| (i, squared_distance(point, c)))
        .fold((0, f64::INFINITY), |best, cur| {
            if cur.1 < best.1 { cur } else { best }
        })
}

#[expect(clippy::cast_precision_loss)]
fn update_centroids(points: &[Vec<f64>], labels: &[usize], previous: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let k = previous.len();
    let dim = points[0].len();
    let mut sums = vec![vec![0.0; dim]; k];
    let mut counts = vec![0_usize; k];
    for (p, &l) in points.iter().zip(labels) {
        counts[l] += 1;
        for (s, v) in sums[l].iter_mut().zip(p) {
            *s += v;
        }
    }

    let mut centroids = sums
        .into_iter()
        .zip(&counts)
        .zip(previous)
        .map(|((sum, &count), prev)| {
            if count == 0 {
                prev.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect::<Vec<_>>();

    let mut taken = vec![false; points.len()];
    for cluster in (0..k).filter(|&c| counts[c] == 0) {
        let far = points
            .iter()
            .zip(labels)
            .enumerate()
            .filter(|(i, _)| !taken[*i])
            .map(|(i, (p, &l))| (i, squared_distance(p, &centroids[l])))
            .fold(None, |best: Option<(usize, f64)>, cur| match best {
                Some(b) if b.1 >= cur.1 => Some(b),
                _ => Some(cur),
            });
        if let Some((i, _)) = far {
            taken[i] = true;
            centroids[cluster] = points[i].clone();
        }
    }
    centroids
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rand::SeedableRng as _;
    use rand_distr::{Distribution as _, Normal};

    use super::*;

    fn blobs(seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut rng = Pcg64::seed_from_u64(seed);
        let noise = Normal::new(0.0, 0.3).unwrap();
        let centers = [[0.0, 0.0], [8.0, 0.0], [0.0, 8.0]];
        let mut points = vec![];
        let mut truth = vec![];
        for (c, center) in centers.iter().enumerate() {
            for _ in 0..20 {
                points.push(vec![
                    center[0] + noise.sample(&mut rng),
                    center[1] + noise.sample(&mut rng),
                ]);
                truth.push(c);
            }
        }
        (points, truth)
    }

    #[test]
    fn test_invalid_inputs() {
        let points = vec![vec![0.0], vec![1.0]];
        assert!(KMeans::new(0).fit(&points).is_none());
        assert!(KMeans::new(3).fit(&points).is_none());
        assert!(KMeans::new(1).fit(&[vec![0.0], vec![1.0, 2.0]]).is_none());
        assert!(KMeans::new(1).fit(&[vec![f64::NAN]]).is_none());
    }

    #[test]
    fn test_recovers_separated_blobs() {
        let (points, truth) = blobs(7);
        let fit = KMeans::new(3).fit(&points).unwrap();
        for i in 0..points.len() {
            for j in 0..points.len() {
                assert_eq!(
                    truth[i] == truth[j],
                    fit.labels[i] == fit.labels[j],
                    "points {i} and {j} grouped inconsistently"
                );
            }
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let (points, _) = blobs(11);
        let a = KMeans::new(3).fit(&points).unwrap();
        let b = KMeans::new(3).fit(&points).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_k_equals_point_count() {
        let points = vec![vec![0.0], vec![5.0], vec![9.0]];
        let fit = KMeans::new(3).fit(&points).unwrap();
        let mut labels = fit.labels.clone();
        labels.sort_unstable();
        assert_eq!(labels, vec![0, 1, 2]);
        assert_eq!(fit.inertia, 0.0);
    }

    #[test]
    fn test_duplicate_points_fill_every_cluster() {
        let points = vec![vec![1.0, 1.0]; 4];
        let fit = KMeans::new(2).fit(&points).unwrap();
        assert_eq!(fit.labels.len(), 4);
        assert_eq!(fit.inertia, 0.0);
    }

    proptest! {
        #[test]
        fn prop_fit_is_deterministic(
            points in prop::collection::vec(prop::collection::vec(-100.0_f64..100.0, 2), 1..24),
            k in 1_usize..4,
            seed in any::<u64>(),
        ) {
            let kmeans = KMeans {
                seed,
                ..KMeans::new(k.min(points.len()))
            };
            let first = kmeans.fit(&points);
            let second = kmeans.fit(&points);
            prop_assert!(first.is_some());
            prop_assert_eq!(&first, &second);
            if let Some(fit) = first {
                prop_assert_eq!(fit.labels.len(), points.len());
                prop_assert!(fit.labels.iter().all(|&label| label < kmeans.k));
            }
        }
    }
}
