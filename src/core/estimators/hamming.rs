// hamming.rs - Proportion of differing sites

use super::{Estimate, PairStats};
use crate::core::diversity::DiversityMatrix;

/// Hamming distance as the proportion of jointly-valid sites that differ.
///
/// Distance and proportion are identical; no variance is computed.
pub fn hamming(matrix: &DiversityMatrix) -> Estimate {
    let total = matrix.total();
    if total == 0.0 {
        return None;
    }

    let p = matrix.differences() / total;
    PairStats {
        length: total as usize,
        proportion: p,
        distance: p,
        variance: None,
    }
    .checked()
}
