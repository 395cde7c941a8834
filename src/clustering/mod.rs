//! Topic clustering of article embeddings.

pub mod kmeans;

pub use kmeans::{
    cluster, fit, KMeansConfig, KMeansFit, DEFAULT_CLUSTER_COUNT, DEFAULT_MAX_ITER,
    DEFAULT_N_INIT, DEFAULT_SEED, DEFAULT_TOLERANCE,
};
