// nucleotide.rs - JC69 and TN93 nucleotide distances

use super::{Estimate, PairStats};
use crate::core::diversity::DiversityMatrix;
use crate::data::MolType;

/// ## Jukes-Cantor (JC69) distance and its variance.
///
/// With `p` the proportion of differing sites:
///
/// `d = -3/4 ln(1 - 4p/3)`, `var = p(1 - p) / ((1 - 4p/3)^2 n)`
///
/// Invalid when `p >= 0.75`.
pub fn jc69(matrix: &DiversityMatrix) -> Estimate {
    let total = matrix.total();
    if total == 0.0 {
        return None;
    }

    let p = matrix.differences() / total;
    if p >= 0.75 {
        return None;
    }

    let factor = 1.0 - (4.0 / 3.0) * p;
    PairStats {
        length: total as usize,
        proportion: p,
        distance: -3.0 * factor.ln() / 4.0,
        variance: Some(p * (1.0 - p) / (factor * factor * total)),
    }
    .checked()
}

/// Purine/pyrimidine layout of a nucleic alphabet, precomputed for TN93
#[derive(Debug, Clone, PartialEq)]
pub struct Tn93Partition {
    purines: Vec<usize>,
    pyrimidines: Vec<usize>,
    purine_coords: Vec<(usize, usize)>,
    pyrimidine_coords: Vec<(usize, usize)>,
    transversion_coords: Vec<(usize, usize)>,
}

/// Off-diagonal coordinates among `indices`
fn diff_coords(indices: &[usize]) -> Vec<(usize, usize)> {
    indices
        .iter()
        .flat_map(|&i| indices.iter().filter(move |&&j| j != i).map(move |&j| (i, j)))
        .collect()
}

impl Tn93Partition {
    pub fn new(dim: usize, purines: Vec<usize>, pyrimidines: Vec<usize>) -> Result<Self, String> {
        if purines.is_empty() || pyrimidines.is_empty() {
            return Err("Purine and pyrimidine sets must both be non-empty".to_string());
        }
        if purines.iter().chain(&pyrimidines).any(|&i| i >= dim) {
            return Err(format!("Purine/pyrimidine index out of range for {} states", dim));
        }
        if purines.iter().any(|i| pyrimidines.contains(i)) {
            return Err("Purine and pyrimidine sets overlap".to_string());
        }

        let purine_coords = diff_coords(&purines);
        let pyrimidine_coords = diff_coords(&pyrimidines);
        let all: Vec<usize> = (0..dim).collect();
        let transversion_coords = diff_coords(&all)
            .into_iter()
            .filter(|c| !purine_coords.contains(c) && !pyrimidine_coords.contains(c))
            .collect();

        Ok(Self {
            purines,
            pyrimidines,
            purine_coords,
            pyrimidine_coords,
            transversion_coords,
        })
    }

    pub fn for_moltype(moltype: MolType) -> Result<Self, String> {
        Self::new(moltype.dim(), moltype.purine_indices()?, moltype.pyrimidine_indices()?)
    }

    pub fn transversion_coords(&self) -> &[(usize, usize)] {
        &self.transversion_coords
    }
}

/// ## Tamura-Nei (TN93) distance and its delta-method variance.
///
/// Base frequencies come from the row and column sums of the diversity
/// matrix. `P1`, `P2` and `Q` are the proportions of purine transitions,
/// pyrimidine transitions and transversions.
///
/// Invalid when any of the three log arguments is not positive.
pub fn tn93(matrix: &DiversityMatrix, partition: &Tn93Partition) -> Estimate {
    let total = matrix.total();
    if total == 0.0 {
        return None;
    }

    let freqs = (matrix.row_sums() + matrix.col_sums()) / (2.0 * total);
    let p = matrix.differences() / total;

    let freq_purs: f64 = partition.purines.iter().map(|&i| freqs[i]).sum();
    let prod_purs: f64 = partition.purines.iter().map(|&i| freqs[i]).product();
    let freq_pyrs: f64 = partition.pyrimidines.iter().map(|&i| freqs[i]).sum();
    let prod_pyrs: f64 = partition.pyrimidines.iter().map(|&i| freqs[i]).product();

    let pur_ts_diffs = matrix.sum_at(&partition.purine_coords) / total;
    let pyr_ts_diffs = matrix.sum_at(&partition.pyrimidine_coords) / total;
    let tv_diffs = matrix.sum_at(&partition.transversion_coords) / total;

    let coeff1 = 2.0 * prod_purs / freq_purs;
    let coeff2 = 2.0 * prod_pyrs / freq_pyrs;
    let coeff3 = 2.0
        * (freq_purs * freq_pyrs
            - (prod_purs * freq_pyrs / freq_purs)
            - (prod_pyrs * freq_purs / freq_pyrs));

    let term1 = 1.0 - pur_ts_diffs / coeff1 - tv_diffs / (2.0 * freq_purs);
    let term2 = 1.0 - pyr_ts_diffs / coeff2 - tv_diffs / (2.0 * freq_pyrs);
    let term3 = 1.0 - tv_diffs / (2.0 * freq_purs * freq_pyrs);

    // log is undefined; NaN terms are rejected by `checked`
    if term1 <= 0.0 || term2 <= 0.0 || term3 <= 0.0 {
        return None;
    }

    let distance = -coeff1 * term1.ln() - coeff2 * term2.ln() - coeff3 * term3.ln();

    let v1 = 1.0 / term1;
    let v2 = 1.0 / term2;
    let v3 = 1.0 / term3;
    let v4 = (coeff1 * v1 / (2.0 * freq_purs))
        + (coeff2 * v2 / (2.0 * freq_pyrs))
        + (coeff3 * v3 / (2.0 * freq_purs * freq_pyrs));
    let mean = v1 * pur_ts_diffs + v2 * pyr_ts_diffs + v4 * tv_diffs;
    let variance = (v1 * v1 * pur_ts_diffs + v2 * v2 * pyr_ts_diffs + v4 * v4 * tv_diffs - mean * mean) / total;

    PairStats {
        length: total as usize,
        proportion: p,
        distance,
        variance: Some(variance),
    }
    .checked()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::indexer::{AlphabetIndex, DEFAULT_INVALID};

    fn dna_matrix(a: &[u8], b: &[u8]) -> DiversityMatrix {
        let index = AlphabetIndex::new(MolType::Dna, DEFAULT_INVALID).unwrap();
        DiversityMatrix::from_sequences(&index.encode(a), &index.encode(b), 4).unwrap()
    }

    const SEQ_A: &[u8] = b"ACGGTGCAGTCACCAGCGTAGGACATTGCAAGTCGATCCGGTAACGTTAGCATGCATCGA";
    const SEQ_B: &[u8] = b"ACGATGCAGTTACCGGCGTAGAACATCGCAAGTCGGTCCAGTAACGCTAGCGTGCATTGA";

    #[test]
    fn test_jc69_two_differences() {
        let stats = jc69(&dna_matrix(b"ACGTACGTAC", b"ACGTACGTTT")).unwrap();
        assert_eq!(stats.length, 10);
        assert!((stats.proportion - 0.2).abs() < 1e-12);
        assert!((stats.distance - 0.2326161962278796).abs() < 1e-10);
        assert!((stats.variance.unwrap() - 0.02975206611570248).abs() < 1e-10);
    }

    #[test]
    fn test_jc69_saturation_boundary() {
        // exactly p = 0.75
        assert!(jc69(&dna_matrix(b"AAAA", b"ACGT")).is_none());
        assert!(jc69(&dna_matrix(b"TCAGTCAGTCAG", b"CAGTCAGTCAGT")).is_none());

        // p = 0.7
        let stats = jc69(&dna_matrix(b"AAAAAAAAAA", b"AAACCCCGGG")).unwrap();
        assert!(stats.distance.is_finite() && stats.distance > 0.0);
    }

    #[test]
    fn test_jc69_gapped_reference() {
        let stats = jc69(&dna_matrix(SEQ_A, SEQ_B)).unwrap();
        assert_eq!(stats.length, 60);
        assert!((stats.distance - 0.18848582121067953).abs() < 1e-10);
        assert!((stats.variance.unwrap() - 0.003826530612244898).abs() < 1e-10);
    }

    #[test]
    fn test_partition_coords() {
        let partition = Tn93Partition::for_moltype(MolType::Dna).unwrap();
        assert_eq!(partition.purine_coords, vec![(2, 3), (3, 2)]);
        assert_eq!(partition.pyrimidine_coords, vec![(1, 0), (0, 1)]);
        assert_eq!(partition.transversion_coords().len(), 8);
        assert!(Tn93Partition::for_moltype(MolType::Protein).is_err());
        assert!(Tn93Partition::new(4, vec![0, 1], vec![1, 2]).is_err());
    }

    #[test]
    fn test_tn93_reference_values() {
        let partition = Tn93Partition::for_moltype(MolType::Dna).unwrap();

        let stats = tn93(&dna_matrix(SEQ_A, SEQ_B), &partition).unwrap();
        assert_eq!(stats.length, 60);
        assert!((stats.proportion - 1.0 / 6.0).abs() < 1e-12);
        assert!((stats.distance - 0.20358720807640054).abs() < 1e-10);
        assert!((stats.variance.unwrap() - 0.005325249298118422).abs() < 1e-10);

        // unequal base composition with transversions
        let stats = tn93(
            &dna_matrix(b"TTTTTTTTTTCCCCCAAAAAGGGG", b"TTTTTTTTCCCCCAAAAAAGGGGG"),
            &partition,
        )
        .unwrap();
        assert_eq!(stats.length, 24);
        assert!((stats.distance - 0.2511063489971341).abs() < 1e-10);
        assert!((stats.variance.unwrap() - 0.015122634896040058).abs() < 1e-10);
    }

    #[test]
    fn test_tn93_invalid() {
        let partition = Tn93Partition::for_moltype(MolType::Dna).unwrap();
        assert!(tn93(&dna_matrix(b"TTTTCCCCAAAAGGGG", b"AAAAGGGGTTTTCCCC"), &partition).is_none());
        assert!(tn93(&dna_matrix(b"----", b"ACGT"), &partition).is_none());
    }
}
