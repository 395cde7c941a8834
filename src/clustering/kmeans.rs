use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::{PipelineError, TARGET_CLUSTERING};

/// Default number of topic groups.
pub const DEFAULT_CLUSTER_COUNT: usize = 6;
/// Default seed for centroid initialization.
pub const DEFAULT_SEED: u64 = 42;
/// Default number of independent initializations.
pub const DEFAULT_N_INIT: usize = 10;
pub const DEFAULT_MAX_ITER: usize = 300;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;

/// Parameters of a k-means run. Equal parameters on equal input give equal labels.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansConfig {
    pub k: usize,
    pub seed: u64,
    pub n_init: usize,
    pub max_iter: usize,
    /// Stop once the summed squared centroid shift of an iteration is at most this.
    pub tolerance: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_CLUSTER_COUNT,
            seed: DEFAULT_SEED,
            n_init: DEFAULT_N_INIT,
            max_iter: DEFAULT_MAX_ITER,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Outcome of the best initialization attempt.
#[derive(Debug, Clone)]
pub struct KMeansFit {
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
    pub iterations: usize,
}

/// Assign each vector a cluster id in `[0, k)`.
pub fn cluster(vectors: &[Vec<f32>], config: &KMeansConfig) -> Result<Vec<usize>, PipelineError> {
    fit(vectors, config).map(|fit| fit.labels)
}

/// Seeded k-means++ / Lloyd with `n_init` attempts, keeping the lowest inertia.
///
/// With fewer vectors than `k`, only as many groups as there are vectors are
/// seeded and the remaining ids stay unused.
pub fn fit(vectors: &[Vec<f32>], config: &KMeansConfig) -> Result<KMeansFit, PipelineError> {
    if config.k == 0 {
        return Err(PipelineError::Config("cluster count must be at least 1".into()));
    }
    if config.n_init == 0 {
        return Err(PipelineError::Config(
            "initialization attempts must be at least 1".into(),
        ));
    }
    let data = to_points(vectors)?;

    let k = config.k.min(data.len());
    if k < config.k {
        info!(
            target: TARGET_CLUSTERING,
            "Only {} vectors for {} clusters; {} clusters will stay empty",
            data.len(),
            config.k,
            config.k - k
        );
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<KMeansFit> = None;

    for attempt in 0..config.n_init {
        let centroids = kmeans_plus_plus(&data, k, &mut rng);
        let candidate = lloyd(&data, centroids, config.max_iter, config.tolerance);
        debug!(
            target: TARGET_CLUSTERING,
            "Attempt {}: inertia {:.6} after {} iterations",
            attempt,
            candidate.inertia,
            candidate.iterations
        );

        // Strictly lower, so the earliest attempt wins ties
        if best
            .as_ref()
            .map_or(true, |current| candidate.inertia < current.inertia)
        {
            best = Some(candidate);
        }
    }

    let best = best.ok_or_else(|| PipelineError::MalformedVectors("no clustering attempt ran".into()))?;
    info!(
        target: TARGET_CLUSTERING,
        "Clustered {} vectors into {} groups, inertia {:.6}",
        data.len(),
        config.k,
        best.inertia
    );
    Ok(best)
}

fn to_points(vectors: &[Vec<f32>]) -> Result<Vec<Vec<f64>>, PipelineError> {
    let first = vectors.first().ok_or(PipelineError::EmptyCorpus)?;
    let dimensions = first.len();
    if dimensions == 0 {
        return Err(PipelineError::MalformedVectors("vectors have zero dimensions".into()));
    }

    vectors
        .iter()
        .enumerate()
        .map(|(index, vector)| {
            if vector.len() != dimensions {
                return Err(PipelineError::MalformedVectors(format!(
                    "vector {} has {} dimensions, expected {}",
                    index,
                    vector.len(),
                    dimensions
                )));
            }
            if vector.iter().any(|x| !x.is_finite()) {
                return Err(PipelineError::MalformedVectors(format!(
                    "vector {} contains non-finite values",
                    index
                )));
            }
            Ok(vector.iter().map(|&x| x as f64).collect())
        })
        .collect()
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index and squared distance of the closest centroid; ties go to the lowest index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (index, centroid) in centroids.iter().enumerate() {
        let distance = squared_distance(point, centroid);
        if distance < best.1 {
            best = (index, distance);
        }
    }
    best
}

fn kmeans_plus_plus(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.random_range(0..data.len())].clone());

    let mut distances: Vec<f64> = data
        .iter()
        .map(|point| squared_distance(point, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = distances.iter().sum();
        let chosen = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut cumulative = 0.0;
            let mut chosen = None;
            for (index, distance) in distances.iter().enumerate() {
                if *distance <= 0.0 {
                    continue;
                }
                cumulative += distance;
                chosen = Some(index);
                if cumulative > target {
                    break;
                }
            }
            chosen.unwrap_or(0)
        } else {
            // Every point already coincides with a centroid
            rng.random_range(0..data.len())
        };

        let centroid = data[chosen].clone();
        for (distance, point) in distances.iter_mut().zip(data) {
            *distance = distance.min(squared_distance(point, &centroid));
        }
        centroids.push(centroid);
    }

    centroids
}

fn lloyd(data: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, max_iter: usize, tolerance: f64) -> KMeansFit {
    let dimensions = data[0].len();
    let mut iterations = 0;

    while iterations < max_iter {
        iterations += 1;

        let mut sums = vec![vec![0.0; dimensions]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for point in data {
            let (label, _) = nearest(point, &centroids);
            counts[label] += 1;
            for (sum, value) in sums[label].iter_mut().zip(point) {
                *sum += value;
            }
        }

        let mut shift = 0.0;
        for (index, (sum, count)) in sums.into_iter().zip(counts).enumerate() {
            // An emptied cluster keeps its previous centroid
            if count == 0 {
                continue;
            }
            let updated: Vec<f64> = sum.into_iter().map(|s| s / count as f64).collect();
            shift += squared_distance(&centroids[index], &updated);
            centroids[index] = updated;
        }

        if shift <= tolerance {
            break;
        }
    }

    let mut labels = Vec::with_capacity(data.len());
    let mut inertia = 0.0;
    for point in data {
        let (label, distance) = nearest(point, &centroids);
        labels.push(label);
        inertia += distance;
    }

    KMeansFit {
        labels,
        centroids,
        inertia,
        iterations,
    }
}
