// diversity.rs - Per-pair substitution count matrices

use ndarray::{Array1, Array2, Axis};

/// K×K counts of co-occurring states between two index-encoded sequences.
///
/// Entry `(a, b)` counts the aligned columns where the first sequence has
/// state `a` and the second has state `b`. Columns where either sequence
/// holds a negative (invalid) index are skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct DiversityMatrix {
    counts: Array2<f64>,
}

impl DiversityMatrix {
    /// Empty matrix for an alphabet of `dim` states
    pub fn new(dim: usize) -> Self {
        Self {
            counts: Array2::zeros((dim, dim)),
        }
    }

    /// Build the matrix for a pair of equal-length encoded sequences
    pub fn from_sequences(seq1: &[i8], seq2: &[i8], dim: usize) -> Result<Self, String> {
        if seq1.len() != seq2.len() {
            return Err(format!(
                "Sequences must have equal length ({} vs {})",
                seq1.len(),
                seq2.len()
            ));
        }
        let mut matrix = Self::new(dim);
        matrix.fill(seq1, seq2);
        Ok(matrix)
    }

    /// Wrap an existing count matrix
    pub fn from_counts(counts: Array2<f64>) -> Result<Self, String> {
        if !counts.is_square() {
            return Err(format!("Diversity matrix must be square, got {:?}", counts.dim()));
        }
        if counts.iter().any(|&v| v < 0.0 || !v.is_finite()) {
            return Err("Diversity matrix counts must be finite and non-negative".to_string());
        }
        Ok(Self { counts })
    }

    /// Reset and refill from a new sequence pair, reusing the allocation
    pub fn fill(&mut self, seq1: &[i8], seq2: &[i8]) {
        debug_assert_eq!(seq1.len(), seq2.len());
        self.counts.fill(0.0);
        for (&a, &b) in seq1.iter().zip(seq2) {
            if a < 0 || b < 0 {
                continue;
            }
            self.counts[[a as usize, b as usize]] += 1.0;
        }
    }

    pub fn dim(&self) -> usize {
        self.counts.nrows()
    }

    pub fn counts(&self) -> &Array2<f64> {
        &self.counts
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.counts[[row, col]]
    }

    /// Number of jointly-valid aligned columns
    pub fn total(&self) -> f64 {
        self.counts.sum()
    }

    /// Number of jointly-valid columns where the states agree
    pub fn trace(&self) -> f64 {
        self.counts.diag().sum()
    }

    /// Number of jointly-valid columns where the states differ
    pub fn differences(&self) -> f64 {
        self.total() - self.trace()
    }

    /// True when some off-diagonal cell is non-zero
    pub fn has_differences(&self) -> bool {
        self.counts
            .indexed_iter()
            .any(|((i, j), &v)| i != j && v > 0.0)
    }

    /// Sum of counts over `coords`
    pub fn sum_at(&self, coords: &[(usize, usize)]) -> f64 {
        coords.iter().map(|&(i, j)| self.counts[[i, j]]).sum()
    }

    /// Per-state totals over rows (first sequence)
    pub fn row_sums(&self) -> Array1<f64> {
        self.counts.sum_axis(Axis(1))
    }

    /// Per-state totals over columns (second sequence)
    pub fn col_sums(&self) -> Array1<f64> {
        self.counts.sum_axis(Axis(0))
    }
}

/// Whether two encoded sequences differ at any jointly-valid position.
///
/// Equivalent to building the diversity matrix and checking its off-diagonal
/// mass, but stops at the first difference.
pub fn differ_at_valid_site(seq1: &[i8], seq2: &[i8]) -> bool {
    seq1.iter()
        .zip(seq2)
        .any(|(&a, &b)| a >= 0 && b >= 0 && a != b)
}
