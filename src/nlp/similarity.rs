//! Cosine-distance ranking of candidate sentences against a target.

use clap::ValueEnum;
use ndarray::ArrayView1;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RankError {
    #[error("vector dimension mismatch: target has {target}, candidate {index} has {candidate}")]
    DimensionMismatch {
        index: usize,
        target: usize,
        candidate: usize,
    },
}

/// Which end of the distance ordering is labelled positive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RankPolicy {
    /// The `k` candidates closest to the target win.
    #[default]
    Nearest,
    /// The `k` candidates farthest from the target win. Reproduces the labels
    /// of the first oracle release; kept for comparing old label files.
    Farthest,
}

/// `1 - cosine_similarity(a, b)`.
///
/// A zero vector has similarity 0 with everything, so its distance is 1.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32, RankError> {
    if a.len() != b.len() {
        return Err(RankError::DimensionMismatch {
            index: 0,
            target: a.len(),
            candidate: b.len(),
        });
    }
    let a = ArrayView1::from(a);
    let b = ArrayView1::from(b);
    let norm_a = a.dot(&a).sqrt();
    let norm_b = b.dot(&b).sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(1.0);
    }
    Ok(1.0 - a.dot(&b) / (norm_a * norm_b))
}

/// Cosine distance of every candidate to the target, in candidate order.
pub fn distances(target: &[f32], candidates: &[Vec<f32>]) -> Result<Vec<f32>, RankError> {
    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            cosine_distance(target, candidate).map_err(|err| match err {
                RankError::DimensionMismatch {
                    target, candidate, ..
                } => RankError::DimensionMismatch {
                    index,
                    target,
                    candidate,
                },
            })
        })
        .collect()
}

/// Indices of the `k` winning distances under `policy`.
///
/// The sort is stable, so equal distances keep their original order and the
/// lower index wins a tie.
pub fn top_k(distances: &[f32], k: usize, policy: RankPolicy) -> Vec<usize> {
    let mut order: Vec<usize> = (0..distances.len()).collect();
    match policy {
        RankPolicy::Nearest => order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b])),
        RankPolicy::Farthest => order.sort_by(|&a, &b| distances[b].total_cmp(&distances[a])),
    }
    order.truncate(k);
    order
}

/// Binary label vector over `candidates`: 1 for the `k` selected sentences.
pub fn rank(
    target: &[f32],
    candidates: &[Vec<f32>],
    k: usize,
    policy: RankPolicy,
) -> Result<Vec<u8>, RankError> {
    let scores = distances(target, candidates)?;
    Ok(labels_from_distances(&scores, k, policy))
}

/// Binarise an already computed score vector.
pub fn labels_from_distances(distances: &[f32], k: usize, policy: RankPolicy) -> Vec<u8> {
    let mut labels = vec![0u8; distances.len()];
    for index in top_k(distances, k, policy) {
        labels[index] = 1;
    }
    labels
}
