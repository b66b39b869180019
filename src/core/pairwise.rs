// pairwise.rs - All-pairs distance runner with duplicate collapsing

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use crate::core::diversity::{differ_at_valid_site, DiversityMatrix};
use crate::core::estimators::{Estimate, Estimator, PairwiseEstimator};
use crate::core::indexer::AlphabetIndex;
use crate::core::matrix::PairwiseResults;
use crate::data::{Alignment, MolType};

/// Progress bar with the standard distance-matrix style
pub fn styled_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {per_sec} ETA: {eta}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Number of comparisons for `n` sequences
pub fn comparison_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Mutable state of one run: duplicate aliases and the sparse pair store
struct RunState {
    is_duplicate: Vec<bool>,
    duplicates: BTreeMap<usize, Vec<usize>>,
    stats: HashMap<(usize, usize), Estimate>,
}

impl RunState {
    fn new(n: usize) -> Self {
        Self {
            is_duplicate: vec![false; n],
            duplicates: BTreeMap::new(),
            stats: HashMap::new(),
        }
    }

    /// Representatives in input order
    fn unique(&self) -> Vec<usize> {
        (0..self.is_duplicate.len())
            .filter(|&i| !self.is_duplicate[i])
            .collect()
    }

    fn store(&mut self, i: usize, j: usize, estimate: Estimate) {
        self.stats.insert((i, j), estimate);
        self.stats.insert((j, i), estimate);
    }
}

/// Pairwise distance calculator bound to an estimator and molecule type.
///
/// Sequences are index-encoded once when an alignment is loaded; each
/// `run` then estimates every unique pair.
#[derive(Debug, Clone)]
pub struct PairwiseDistance {
    estimator: PairwiseEstimator,
    index: AlphabetIndex,
    names: Vec<String>,
    encoded: Vec<Vec<i8>>,
}

impl PairwiseDistance {
    pub fn new(estimator: Estimator, moltype: MolType, invalid: i8) -> Result<Self, String> {
        let index = AlphabetIndex::for_estimator(&estimator, moltype, invalid)?;
        let estimator = PairwiseEstimator::new(estimator, moltype)?;
        Ok(Self {
            estimator,
            index,
            names: Vec::new(),
            encoded: Vec::new(),
        })
    }

    pub fn with_alignment(mut self, alignment: &Alignment) -> Result<Self, String> {
        self.load_alignment(alignment)?;
        Ok(self)
    }

    /// Index-encode `alignment`, replacing any previously loaded sequences
    pub fn load_alignment(&mut self, alignment: &Alignment) -> Result<(), String> {
        if alignment.moltype() != self.index.moltype() {
            return Err(format!(
                "Alignment moltype '{}' does not match calculator moltype '{}'",
                alignment.moltype(),
                self.index.moltype()
            ));
        }

        self.names = alignment.names().to_vec();
        self.encoded = alignment
            .sequences()
            .par_iter()
            .map(|seq| self.index.encode(seq))
            .collect();
        Ok(())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn estimator(&self) -> Estimator {
        self.estimator.estimator()
    }

    pub fn moltype(&self) -> MolType {
        self.index.moltype()
    }

    pub fn invalid(&self) -> i8 {
        self.index.invalid()
    }

    pub fn is_loaded(&self) -> bool {
        !self.names.is_empty()
    }

    /// Toggle the Tamura-Kumar adjustment (LogDet only)
    pub fn set_tk_adjustment(&mut self, use_tk_adjustment: bool) -> Result<(), String> {
        self.estimator.set_tk_adjustment(use_tk_adjustment)
    }

    /// Compute all pairwise statistics without progress output
    pub fn run(&self) -> Result<PairwiseResults, String> {
        self.execute(&ProgressBar::hidden())
    }

    /// Compute all pairwise statistics, reporting status lines and progress on `pb`.
    ///
    /// `pb` should be sized with [`comparison_count`] for the loaded names.
    pub fn run_with_progress(&self, pb: &ProgressBar) -> Result<PairwiseResults, String> {
        let n = self.names.len();
        let total = comparison_count(n);
        println!(
            "🔄 Computing {} distances ({} × {} = {} comparisons)...",
            self.estimator(),
            n,
            n,
            total
        );

        let start = Instant::now();
        let results = self.execute(pb)?;

        if results.has_duplicates() {
            println!(
                "🧬 Collapsed {} duplicate sequence(s) onto {} representative(s)",
                results.duplicate_names().len(),
                results.duplicated().len()
            );
        }
        println!(
            "✅ Pairwise distances computed in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(results)
    }

    fn execute(&self, pb: &ProgressBar) -> Result<PairwiseResults, String> {
        if !self.is_loaded() {
            return Err("No alignment loaded; load an alignment before running".to_string());
        }

        let total = comparison_count(self.names.len());
        let mut state = RunState::new(self.names.len());

        self.detect_duplicates(&mut state);

        let unique = state.unique();
        let unique_pairs = comparison_count(unique.len());
        // comparisons skipped because of duplicates count as done
        pb.inc((total - unique_pairs) as u64);

        for (i, j, estimate) in self.estimate_pairs(&unique, pb) {
            state.store(i, j, estimate);
        }
        pb.finish_with_message("✅ Distance matrix computation completed!");

        Ok(PairwiseResults::new(
            self.estimator(),
            self.moltype(),
            self.names.clone(),
            state.stats,
            state.duplicates,
        ))
    }

    /// Row-major duplicate pass.
    ///
    /// For each surviving `i`, every later surviving `j` identical to it at all
    /// jointly-valid sites becomes its duplicate. Marks made for `i` only affect
    /// later rows, so the `j` checks for one `i` run in parallel.
    fn detect_duplicates(&self, state: &mut RunState) {
        let n = self.names.len();
        for i in 0..n {
            if state.is_duplicate[i] {
                continue;
            }
            let s1 = &self.encoded[i];
            let is_duplicate = &state.is_duplicate;
            let found: Vec<usize> = (i + 1..n)
                .into_par_iter()
                .filter(|&j| !is_duplicate[j] && !differ_at_valid_site(s1, &self.encoded[j]))
                .collect();

            if found.is_empty() {
                continue;
            }
            for &j in &found {
                state.is_duplicate[j] = true;
            }
            state.duplicates.insert(i, found);
        }
    }

    /// Estimate every pair of `unique` indices in parallel
    fn estimate_pairs(&self, unique: &[usize], pb: &ProgressBar) -> Vec<(usize, usize, Estimate)> {
        let pairs: Vec<(usize, usize)> = unique
            .iter()
            .enumerate()
            .flat_map(|(a, &i)| unique[a + 1..].iter().map(move |&j| (i, j)))
            .collect();

        let update_interval = std::cmp::max(1, pairs.len() / 100); // Update every 1%
        let progress_counter = AtomicUsize::new(0);
        let dim = self.index.dim();

        let results = pairs
            .into_par_iter()
            .map_init(
                || DiversityMatrix::new(dim),
                |matrix, (i, j)| {
                    matrix.fill(&self.encoded[i], &self.encoded[j]);
                    let estimate = self.estimator.estimate(matrix);

                    let count = progress_counter.fetch_add(1, Ordering::Relaxed) + 1;
                    if count % update_interval == 0 {
                        pb.inc(update_interval as u64);
                    }
                    (i, j, estimate)
                },
            )
            .collect::<Vec<_>>();

        let done = progress_counter.load(Ordering::Relaxed);
        pb.inc((done % update_interval) as u64);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::indexer::DEFAULT_INVALID;

    fn alignment(moltype: MolType, pairs: &[(&str, &str)]) -> Alignment {
        let records = pairs
            .iter()
            .map(|(n, s)| (n.to_string(), s.as_bytes().to_vec()))
            .collect();
        Alignment::new(moltype, records).unwrap()
    }

    fn calculator(estimator: Estimator, aln: &Alignment) -> PairwiseDistance {
        PairwiseDistance::new(estimator, aln.moltype(), DEFAULT_INVALID)
            .unwrap()
            .with_alignment(aln)
            .unwrap()
    }

    #[test]
    fn test_identical_pair_is_duplicate() {
        let aln = alignment(MolType::Dna, &[("s1", "ATGC"), ("s2", "ATGC")]);
        let results = calculator(Estimator::Hamming, &aln).run().unwrap();

        assert_eq!(results.duplicated(), vec![("s1".to_string(), vec!["s2".to_string()])]);
        assert_eq!(results.num_stored(), 0);
        assert_eq!(results.dists().get("s1", "s2").unwrap(), Some(0.0));
        assert_eq!(results.distances(false).len(), 1);
    }

    #[test]
    fn test_hamming_pair() {
        let aln = alignment(MolType::Dna, &[("s1", "ATGC"), ("s2", "ATGA")]);
        let results = calculator(Estimator::Hamming, &aln).run().unwrap();
        let stats = results.pair_stats("s1", "s2").unwrap().unwrap();
        assert_eq!(stats.length, 4);
        assert_eq!(stats.distance, 0.25);
        assert_eq!(results.pair_stats("s2", "s1").unwrap().unwrap(), stats);
        assert!(!results.has_duplicates());
    }

    #[test]
    fn test_duplicates_follow_representative() {
        // s3 matches s1 once gaps are ignored; s5 matches s2
        let aln = alignment(
            MolType::Dna,
            &[
                ("s1", "ACGTACGTAC"),
                ("s2", "ACGTACGTTT"),
                ("s3", "ACG-ACGTAC"),
                ("s4", "TCGTACCTAC"),
                ("s5", "ACGTACGTTT"),
            ],
        );
        let results = calculator(Estimator::Jc69, &aln).run().unwrap();

        assert_eq!(
            results.duplicated(),
            vec![
                ("s1".to_string(), vec!["s3".to_string()]),
                ("s2".to_string(), vec!["s5".to_string()])
            ]
        );
        // 3 unique sequences, both orderings
        assert_eq!(results.num_stored(), 6);

        let dists = results.dists();
        assert_eq!(dists.len(), 5);
        assert!(dists.is_symmetric());
        for (dupe, rep) in [("s3", "s1"), ("s5", "s2")] {
            assert_eq!(dists.get(dupe, rep).unwrap(), Some(0.0));
            for other in ["s1", "s2", "s4"] {
                if other != rep {
                    assert_eq!(dists.get(dupe, other).unwrap(), dists.get(rep, other).unwrap());
                }
            }
        }
        let d = dists.get("s1", "s2").unwrap().unwrap();
        assert!((d - 0.2326161962278796).abs() < 1e-10);
        assert_eq!(results.distances(false).names(), &["s1", "s2", "s4"]);
    }

    #[test]
    fn test_duplicate_of_duplicate_is_not_promoted() {
        // s2 == s1 at jointly valid sites, s3 == s2 but differs from s1
        let aln = alignment(
            MolType::Dna,
            &[("s1", "AC-T"), ("s2", "ACGN"), ("s3", "ACGA")],
        );
        let results = calculator(Estimator::Hamming, &aln).run().unwrap();
        assert_eq!(results.duplicate_names(), vec!["s2".to_string()]);
        assert!(results.pair_stats("s1", "s3").unwrap().is_some());
    }

    #[test]
    fn test_saturated_pair_dropped_before_tree() {
        // only b-e is saturated (7/8 sites differ); every other pair is below 0.75
        let aln = alignment(
            MolType::Dna,
            &[
                ("a", "AAAAAAAA"),
                ("b", "AAAACCGG"),
                ("c", "AAAAAAAC"),
                ("d", "AAAAAACC"),
                ("e", "TTTAAAAA"),
            ],
        );
        let results = calculator(Estimator::Jc69, &aln).run().unwrap();
        assert_eq!(results.pair_stats("b", "e"), Some(None));
        assert!(results.pair_stats("a", "b").unwrap().is_some());
        assert!(results.pair_stats("d", "e").unwrap().is_some());

        let dists = results.dists();
        assert_eq!(dists.get("e", "b").unwrap(), None);
        assert!(dists.has_invalid());
        let tree = dists.tree_input().unwrap();
        assert!(!tree.has_invalid());
        assert_eq!(tree.names(), &["a", "c", "d"]);
    }

    #[test]
    fn test_single_bad_sequence_leaves_too_few_for_tree() {
        // b is saturated against everyone, so every name holds an invalid cell
        let aln = alignment(
            MolType::Dna,
            &[
                ("a", "TCAGTCAGTCAG"),
                ("b", "CAGTCAGTCAGT"),
                ("c", "TCAGTCAGTCAA"),
                ("d", "TCAGTCAGTCGA"),
            ],
        );
        let dists = calculator(Estimator::Jc69, &aln).run().unwrap().dists();
        assert_eq!(dists.get("a", "b").unwrap(), None);
        assert!(dists.get("a", "c").unwrap().is_some());
        assert!(dists.drop_invalid().is_none());
        assert_eq!(dists.tree_input().unwrap_err(), "Too few distances to build a tree");
    }

    #[test]
    fn test_all_pairs_estimated() {
        let seqs = [
            ("a", "ACGTACGTACGTAAGG"),
            ("b", "ACGTACCTACGTAAGG"),
            ("c", "ACGTTCGTACGAAAGG"),
            ("d", "ACCTACGTACGTAACG"),
            ("e", "TCGTACGTACGTAAGA"),
        ];
        let aln = alignment(MolType::Dna, &seqs);
        let results = calculator(Estimator::Tn93, &aln).run().unwrap();
        assert_eq!(results.num_stored(), 2 * comparison_count(seqs.len()));
        assert_eq!(results.unique_pairs().len(), comparison_count(seqs.len()));
        assert!(results.dists().is_symmetric());
        assert!(results.stderr().is_symmetric());
    }

    #[test]
    fn test_progress_reaches_total() {
        let aln = alignment(
            MolType::Dna,
            &[("a", "ACGT"), ("b", "ACGT"), ("c", "ACGA"), ("d", "TCGA")],
        );
        let calc = calculator(Estimator::Hamming, &aln);
        let pb = ProgressBar::hidden();
        pb.set_length(comparison_count(4) as u64);
        calc.execute(&pb).unwrap();
        assert_eq!(pb.position(), 6);
    }

    #[test]
    fn test_configuration_errors() {
        assert!(PairwiseDistance::new(Estimator::Tn93, MolType::Protein, DEFAULT_INVALID).is_err());
        assert!(PairwiseDistance::new(Estimator::Jc69, MolType::Dna, 0).is_err());

        let protein = alignment(MolType::Protein, &[("p1", "MKV"), ("p2", "MKL")]);
        let mut calc = PairwiseDistance::new(Estimator::Paralinear, MolType::Dna, DEFAULT_INVALID).unwrap();
        assert!(calc.load_alignment(&protein).is_err());
        assert!(calc.run().is_err());

        let mut logdet =
            PairwiseDistance::new(Estimator::LogDet { use_tk_adjustment: true }, MolType::Dna, DEFAULT_INVALID).unwrap();
        logdet.set_tk_adjustment(false).unwrap();
        assert_eq!(logdet.estimator(), Estimator::LogDet { use_tk_adjustment: false });
    }

    #[test]
    fn test_rna_and_custom_sentinel() {
        let aln = alignment(MolType::Rna, &[("r1", "ACGUACGUAC"), ("r2", "ACGUACGUUU")]);
        let calc = PairwiseDistance::new(Estimator::Jc69, MolType::Rna, -1)
            .unwrap()
            .with_alignment(&aln)
            .unwrap();
        assert_eq!(calc.invalid(), -1);
        let d = calc.run().unwrap().dists().get("r1", "r2").unwrap().unwrap();
        assert!((d - 0.2326161962278796).abs() < 1e-10);
    }
}
