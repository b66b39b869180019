// matrix.rs - Run results and dense named distance matrices

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use ndarray::Array2;
use crate::core::estimators::{Estimate, Estimator, PairStats};
use crate::data::MolType;

/// Per-pair statistic that can be laid out as a matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Distance,
    StdErr,
    Variance,
    Proportion,
    Length,
}

impl Statistic {
    pub fn title(&self) -> &'static str {
        match self {
            Statistic::Distance => "Pairwise Distances",
            Statistic::StdErr => "Standard Error of Pairwise Distances",
            Statistic::Variance => "Variances of Pairwise Distances",
            Statistic::Proportion => "Proportion variable sites",
            Statistic::Length => "Pairwise Aligned Lengths",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Statistic::Distance => "dist",
            Statistic::StdErr => "stderr",
            Statistic::Variance => "var",
            Statistic::Proportion => "proportion",
            Statistic::Length => "length",
        }
    }

    /// Pull this statistic out of a pair estimate; `None` when invalid or undefined
    pub fn extract(&self, estimate: &Estimate) -> Option<f64> {
        let stats: &PairStats = estimate.as_ref()?;
        match self {
            Statistic::Distance => Some(stats.distance),
            Statistic::StdErr => stats
                .variance
                .filter(|v| v.is_finite() && *v >= 0.0)
                .map(f64::sqrt),
            Statistic::Variance => stats.variance,
            Statistic::Proportion => Some(stats.proportion),
            Statistic::Length => Some(stats.length as f64),
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Statistic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dist" | "distance" => Ok(Statistic::Distance),
            "stderr" => Ok(Statistic::StdErr),
            "var" | "variance" => Ok(Statistic::Variance),
            "proportion" => Ok(Statistic::Proportion),
            "length" => Ok(Statistic::Length),
            _ => Err(format!(
                "Invalid statistic '{}'. Valid options: dist, stderr, var, proportion, length",
                s
            )),
        }
    }
}

/// Square matrix of one statistic keyed by sequence name.
///
/// The diagonal is 0. Off-diagonal `None` cells are invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    statistic: Statistic,
    names: Vec<String>,
    index: HashMap<String, usize>,
    values: Array2<Option<f64>>,
}

impl DistanceMatrix {
    pub fn new(statistic: Statistic, names: Vec<String>, values: Array2<Option<f64>>) -> Result<Self, String> {
        if values.dim() != (names.len(), names.len()) {
            return Err(format!(
                "Matrix shape {:?} does not match {} names",
                values.dim(),
                names.len()
            ));
        }
        let index: HashMap<String, usize> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        if index.len() != names.len() {
            return Err("Distance matrix names must be unique".to_string());
        }
        Ok(Self { statistic, names, index, values })
    }

    pub fn statistic(&self) -> Statistic {
        self.statistic
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn values(&self) -> &Array2<Option<f64>> {
        &self.values
    }

    /// Value by position
    #[inline]
    pub fn value(&self, i: usize, j: usize) -> Option<f64> {
        self.values[[i, j]]
    }

    /// Value for a name pair; errors on unknown names
    pub fn get(&self, a: &str, b: &str) -> Result<Option<f64>, String> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        Ok(self.values[[i, j]])
    }

    fn position(&self, name: &str) -> Result<usize, String> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| format!("Unknown sequence name '{}'", name))
    }

    pub fn is_symmetric(&self) -> bool {
        let n = self.len();
        (0..n).all(|i| (i + 1..n).all(|j| self.values[[i, j]] == self.values[[j, i]]))
    }

    pub fn has_invalid(&self) -> bool {
        self.values
            .indexed_iter()
            .any(|((i, j), v)| i != j && v.is_none())
    }

    /// Every off-diagonal `(name1, name2, value)`, both orderings
    pub fn to_pairs(&self) -> Vec<(&str, &str, Option<f64>)> {
        self.values
            .indexed_iter()
            .filter(|((i, j), _)| i != j)
            .map(|((i, j), v)| (self.names[i].as_str(), self.names[j].as_str(), *v))
            .collect()
    }

    /// Drop every row/column that holds an invalid cell.
    ///
    /// Returns `None` when no off-diagonal entries remain.
    pub fn drop_invalid(&self) -> Option<Self> {
        let n = self.len();
        let mut exclude = vec![false; n];
        for ((i, j), v) in self.values.indexed_iter() {
            if i != j && v.is_none() {
                exclude[i] = true;
                exclude[j] = true;
            }
        }

        let keep: Vec<usize> = (0..n).filter(|&i| !exclude[i]).collect();
        if keep.len() < 2 {
            return None;
        }

        let names = keep.iter().map(|&i| self.names[i].clone()).collect();
        let values = Array2::from_shape_fn((keep.len(), keep.len()), |(a, b)| {
            self.values[[keep[a], keep[b]]]
        });
        Self::new(self.statistic, names, values).ok()
    }

    /// Fully-valid matrix for tree building
    pub fn tree_input(&self) -> Result<Self, String> {
        self.drop_invalid()
            .ok_or_else(|| "Too few distances to build a tree".to_string())
    }
}

/// Result of one pairwise run.
///
/// Holds estimates for non-duplicate pairs only, under both orderings, plus
/// the duplicate aliases needed to expand any statistic back to every name.
#[derive(Debug, Clone)]
pub struct PairwiseResults {
    estimator: Estimator,
    moltype: MolType,
    names: Vec<String>,
    name_index: HashMap<String, usize>,
    stats: HashMap<(usize, usize), Estimate>,
    duplicates: BTreeMap<usize, Vec<usize>>,
    representative: Vec<usize>,
}

impl PairwiseResults {
    pub(crate) fn new(
        estimator: Estimator,
        moltype: MolType,
        names: Vec<String>,
        stats: HashMap<(usize, usize), Estimate>,
        duplicates: BTreeMap<usize, Vec<usize>>,
    ) -> Self {
        let name_index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();

        let mut representative: Vec<usize> = (0..names.len()).collect();
        for (&rep, dupes) in &duplicates {
            for &d in dupes {
                representative[d] = rep;
            }
        }

        Self {
            estimator,
            moltype,
            names,
            name_index,
            stats,
            duplicates,
            representative,
        }
    }

    pub fn estimator(&self) -> Estimator {
        self.estimator
    }

    pub fn moltype(&self) -> MolType {
        self.moltype
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names that are not duplicates of an earlier sequence, in input order
    pub fn unique_names(&self) -> Vec<&str> {
        self.unique_indices()
            .into_iter()
            .map(|i| self.names[i].as_str())
            .collect()
    }

    fn unique_indices(&self) -> Vec<usize> {
        (0..self.names.len())
            .filter(|&i| self.representative[i] == i)
            .collect()
    }

    /// Stored estimate for a name pair.
    ///
    /// `None` when either name is unknown or a duplicate, `Some(None)` when
    /// the estimate is invalid.
    pub fn pair_stats(&self, a: &str, b: &str) -> Option<Estimate> {
        let i = *self.name_index.get(a)?;
        let j = *self.name_index.get(b)?;
        self.stats.get(&(i, j)).copied()
    }

    /// Number of stored entries (both orderings)
    pub fn num_stored(&self) -> usize {
        self.stats.len()
    }

    /// Stored unique pairs with `first < second` in input order
    pub fn unique_pairs(&self) -> Vec<(&str, &str, Estimate)> {
        let unique = self.unique_indices();
        let mut pairs = Vec::with_capacity(unique.len() * unique.len().saturating_sub(1) / 2);
        for (a, &i) in unique.iter().enumerate() {
            for &j in &unique[a + 1..] {
                let estimate = self.stats.get(&(i, j)).copied().flatten();
                pairs.push((self.names[i].as_str(), self.names[j].as_str(), estimate));
            }
        }
        pairs
    }

    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    /// Representative name with its duplicates, both in input order
    pub fn duplicated(&self) -> Vec<(String, Vec<String>)> {
        self.duplicates
            .iter()
            .map(|(&rep, dupes)| {
                (
                    self.names[rep].clone(),
                    dupes.iter().map(|&d| self.names[d].clone()).collect(),
                )
            })
            .collect()
    }

    /// Every name recorded as a duplicate, in input order
    pub fn duplicate_names(&self) -> Vec<String> {
        (0..self.names.len())
            .filter(|&i| self.representative[i] != i)
            .map(|i| self.names[i].clone())
            .collect()
    }

    /// Value of `statistic` between two sequence indices, resolving duplicates
    fn resolved(&self, statistic: Statistic, i: usize, j: usize) -> Option<f64> {
        if i == j {
            return Some(0.0);
        }
        let (ri, rj) = (self.representative[i], self.representative[j]);
        if ri == rj {
            return Some(0.0);
        }
        self.stats
            .get(&(ri, rj))
            .and_then(|estimate| statistic.extract(estimate))
    }

    /// Dense matrix of one statistic.
    ///
    /// With `include_duplicates` every input name is present and duplicates
    /// take their representative's values; otherwise only unique names are.
    pub fn statistic_matrix(&self, statistic: Statistic, include_duplicates: bool) -> DistanceMatrix {
        let rows: Vec<usize> = if include_duplicates {
            (0..self.names.len()).collect()
        } else {
            self.unique_indices()
        };

        let names: Vec<String> = rows.iter().map(|&i| self.names[i].clone()).collect();
        let values = Array2::from_shape_fn((rows.len(), rows.len()), |(a, b)| {
            self.resolved(statistic, rows[a], rows[b])
        });

        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        DistanceMatrix {
            statistic,
            names,
            index,
            values,
        }
    }

    pub fn distances(&self, include_duplicates: bool) -> DistanceMatrix {
        self.statistic_matrix(Statistic::Distance, include_duplicates)
    }

    pub fn dists(&self) -> DistanceMatrix {
        self.statistic_matrix(Statistic::Distance, true)
    }

    pub fn stderr(&self) -> DistanceMatrix {
        self.statistic_matrix(Statistic::StdErr, true)
    }

    pub fn variances(&self) -> DistanceMatrix {
        self.statistic_matrix(Statistic::Variance, true)
    }

    pub fn proportions(&self) -> DistanceMatrix {
        self.statistic_matrix(Statistic::Proportion, true)
    }

    pub fn lengths(&self) -> DistanceMatrix {
        self.statistic_matrix(Statistic::Length, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(distance: f64, variance: Option<f64>) -> Estimate {
        Some(PairStats {
            length: 10,
            proportion: 0.2,
            distance,
            variance,
        })
    }

    fn store(entries: &[((usize, usize), Estimate)]) -> HashMap<(usize, usize), Estimate> {
        let mut map = HashMap::new();
        for &((i, j), e) in entries {
            map.insert((i, j), e);
            map.insert((j, i), e);
        }
        map
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// a, b(dup of a), c, d(dup of c), e
    fn results_with_duplicates() -> PairwiseResults {
        let stored = store(&[
            ((0, 2), stats(0.1, Some(0.01))),
            ((0, 4), stats(0.2, None)),
            ((2, 4), None),
        ]);
        let mut duplicates = BTreeMap::new();
        duplicates.insert(0, vec![1]);
        duplicates.insert(2, vec![3]);
        PairwiseResults::new(
            Estimator::Jc69,
            MolType::Dna,
            names(&["a", "b", "c", "d", "e"]),
            stored,
            duplicates,
        )
    }

    #[test]
    fn test_parse_statistic() {
        assert_eq!("dist".parse::<Statistic>().unwrap(), Statistic::Distance);
        assert_eq!("VAR".parse::<Statistic>().unwrap(), Statistic::Variance);
        assert!("median".parse::<Statistic>().is_err());
    }

    #[test]
    fn test_duplicate_expansion() {
        let results = results_with_duplicates();
        let dists = results.dists();

        assert_eq!(dists.len(), 5);
        assert!(dists.is_symmetric());
        assert_eq!(dists.get("a", "b").unwrap(), Some(0.0));
        assert_eq!(dists.get("c", "d").unwrap(), Some(0.0));
        // duplicate takes its representative's value
        for other in ["c", "d", "e"] {
            assert_eq!(dists.get("b", other).unwrap(), dists.get("a", other).unwrap());
        }
        assert_eq!(dists.get("b", "d").unwrap(), Some(0.1));
        assert_eq!(dists.get("d", "e").unwrap(), None);
        assert!(dists.get("a", "zz").is_err());
    }

    #[test]
    fn test_exclude_duplicates() {
        let results = results_with_duplicates();
        let unique = results.distances(false);
        assert_eq!(unique.names(), &names(&["a", "c", "e"])[..]);
        assert_eq!(results.unique_names(), vec!["a", "c", "e"]);
        assert_eq!(results.duplicate_names(), names(&["b", "d"]));
        assert_eq!(
            results.duplicated(),
            vec![
                ("a".to_string(), vec!["b".to_string()]),
                ("c".to_string(), vec!["d".to_string()])
            ]
        );
        assert_eq!(results.unique_pairs().len(), 3);
    }

    #[test]
    fn test_pair_lookup() {
        let results = results_with_duplicates();
        assert_eq!(results.pair_stats("a", "c").unwrap().unwrap().distance, 0.1);
        assert_eq!(results.pair_stats("c", "e"), Some(None));
        assert_eq!(results.pair_stats("b", "c"), None);
        assert_eq!(results.pair_stats("a", "missing"), None);
    }

    #[test]
    fn test_statistic_views() {
        let results = results_with_duplicates();
        let stderr = results.stderr();
        assert!((stderr.get("a", "c").unwrap().unwrap() - 0.1).abs() < 1e-12);
        // no variance defined
        assert_eq!(stderr.get("a", "e").unwrap(), None);
        assert_eq!(results.variances().get("b", "c").unwrap(), Some(0.01));
        assert_eq!(results.lengths().get("a", "e").unwrap(), Some(10.0));
        assert_eq!(results.proportions().get("e", "a").unwrap(), Some(0.2));
        assert_eq!(results.lengths().get("e", "c").unwrap(), None);
    }

    #[test]
    fn test_negative_variance_has_no_stderr() {
        let estimate = stats(0.1, Some(-1e-6));
        assert_eq!(Statistic::StdErr.extract(&estimate), None);
        assert_eq!(Statistic::Variance.extract(&estimate), Some(-1e-6));
    }

    #[test]
    fn test_drop_invalid() {
        let results = results_with_duplicates();
        let dists = results.dists();
        assert!(dists.has_invalid());

        // c-e is invalid, so c, d and e go
        let valid = dists.drop_invalid().unwrap();
        assert_eq!(valid.names(), &names(&["a", "b"])[..]);
        assert!(!valid.has_invalid());
        assert_eq!(valid.to_pairs().len(), 2);

        let tree = dists.tree_input().unwrap();
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_too_few_for_tree() {
        let values = Array2::from_shape_vec((2, 2), vec![Some(0.0), None, None, Some(0.0)]).unwrap();
        let matrix = DistanceMatrix::new(Statistic::Distance, names(&["x", "y"]), values).unwrap();
        assert!(matrix.drop_invalid().is_none());
        assert_eq!(matrix.tree_input().unwrap_err(), "Too few distances to build a tree");
    }

    #[test]
    fn test_matrix_construction_checks() {
        let values = Array2::from_elem((2, 2), Some(0.0));
        assert!(DistanceMatrix::new(Statistic::Distance, names(&["x"]), values.clone()).is_err());
        assert!(DistanceMatrix::new(Statistic::Distance, names(&["x", "x"]), values).is_err());
    }
}
