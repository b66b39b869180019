// mod.rs - Closed-form pairwise distance estimators

pub mod hamming;
pub mod logdet;
pub mod nucleotide;

use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::core::diversity::DiversityMatrix;
use crate::data::MolType;

pub use hamming::hamming;
pub use logdet::{logdet, paralinear};
pub use nucleotide::{jc69, tn93, Tn93Partition};

/// Statistics estimated for one sequence pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairStats {
    /// Jointly-valid aligned sites
    pub length: usize,
    /// Proportion of jointly-valid sites that differ
    pub proportion: f64,
    pub distance: f64,
    /// `None` when the estimator does not define a variance
    pub variance: Option<f64>,
}

/// Outcome of an estimator: `None` marks an undefined (invalid) estimate
pub type Estimate = Option<PairStats>;

impl PairStats {
    /// Reject non-finite values produced by degenerate frequencies
    pub(crate) fn checked(self) -> Estimate {
        let variance_ok = self.variance.map_or(true, f64::is_finite);
        if self.proportion.is_finite() && self.distance.is_finite() && variance_ok {
            Some(self)
        } else {
            None
        }
    }
}

/// Available distance estimators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Estimator {
    Hamming,
    Jc69,
    Tn93,
    /// `use_tk_adjustment` applies the Tamura-Kumar (2002) correction
    LogDet { use_tk_adjustment: bool },
    Paralinear,
}

impl Estimator {
    /// Every estimator with its default parameters
    pub fn all() -> [Estimator; 5] {
        [
            Estimator::Paralinear,
            Estimator::LogDet { use_tk_adjustment: true },
            Estimator::Jc69,
            Estimator::Tn93,
            Estimator::Hamming,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Estimator::Hamming => "hamming",
            Estimator::Jc69 => "jc69",
            Estimator::Tn93 => "tn93",
            Estimator::LogDet { .. } => "logdet",
            Estimator::Paralinear => "paralinear",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Estimator::Hamming => "Proportion of differing sites",
            Estimator::Jc69 => "Jukes-Cantor 1969 single-rate nucleotide model",
            Estimator::Tn93 => "Tamura-Nei 1993 purine/pyrimidine transition model",
            Estimator::LogDet { use_tk_adjustment: true } => "LogDet with Tamura-Kumar 2002 adjustment",
            Estimator::LogDet { use_tk_adjustment: false } => "LogDet (unadjusted)",
            Estimator::Paralinear => "Paralinear distance (Lake 1994)",
        }
    }

    pub fn valid_moltypes(&self) -> &'static [MolType] {
        match self {
            Estimator::Hamming => &[MolType::Dna, MolType::Rna, MolType::Protein, MolType::Text],
            Estimator::Jc69 | Estimator::Tn93 => &[MolType::Dna, MolType::Rna],
            Estimator::LogDet { .. } | Estimator::Paralinear => &[MolType::Dna, MolType::Rna, MolType::Protein],
        }
    }

    pub fn supports(&self, moltype: MolType) -> bool {
        self.valid_moltypes().contains(&moltype)
    }

    /// Comma separated labels of the supported molecule types
    pub fn moltype_labels(&self) -> String {
        self.valid_moltypes()
            .iter()
            .map(|m| m.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Molecule type used when none is given
    pub fn default_moltype(&self) -> MolType {
        match self {
            Estimator::Hamming => MolType::Text,
            _ => MolType::Dna,
        }
    }
}

impl fmt::Display for Estimator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Estimator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hamming" => Ok(Estimator::Hamming),
            "jc69" => Ok(Estimator::Jc69),
            "tn93" => Ok(Estimator::Tn93),
            "logdet" => Ok(Estimator::LogDet { use_tk_adjustment: true }),
            "paralinear" => Ok(Estimator::Paralinear),
            _ => Err(format!("Unknown pairwise distance calculator \"{}\"", s)),
        }
    }
}

/// `(abbreviation, suitable moltypes)` for every available calculator
pub fn available_distances() -> Vec<(&'static str, String)> {
    Estimator::all()
        .iter()
        .map(|e| (e.name(), e.moltype_labels()))
        .collect()
}

/// An estimator bound to a molecule type, with any per-model tables precomputed
#[derive(Debug, Clone)]
pub struct PairwiseEstimator {
    estimator: Estimator,
    tn93: Option<Tn93Partition>,
}

impl PairwiseEstimator {
    pub fn new(estimator: Estimator, moltype: MolType) -> Result<Self, String> {
        if !estimator.supports(moltype) {
            return Err(format!(
                "Invalid moltype for {}: '{}' not in ({})",
                estimator.name(),
                moltype,
                estimator.moltype_labels()
            ));
        }
        let tn93 = match estimator {
            Estimator::Tn93 => Some(Tn93Partition::for_moltype(moltype)?),
            _ => None,
        };
        Ok(Self { estimator, tn93 })
    }

    pub fn estimator(&self) -> Estimator {
        self.estimator
    }

    pub fn set_tk_adjustment(&mut self, use_tk_adjustment: bool) -> Result<(), String> {
        match &mut self.estimator {
            Estimator::LogDet { use_tk_adjustment: flag } => {
                *flag = use_tk_adjustment;
                Ok(())
            }
            other => Err(format!(
                "Tamura-Kumar adjustment only applies to logdet, not {}",
                other.name()
            )),
        }
    }

    pub fn estimate(&self, matrix: &DiversityMatrix) -> Estimate {
        match (self.estimator, &self.tn93) {
            (Estimator::Hamming, _) => hamming(matrix),
            (Estimator::Jc69, _) => jc69(matrix),
            (Estimator::Tn93, Some(partition)) => tn93(matrix, partition),
            (Estimator::Tn93, None) => None,
            (Estimator::LogDet { use_tk_adjustment }, _) => logdet(matrix, use_tk_adjustment),
            (Estimator::Paralinear, _) => paralinear(matrix),
        }
    }
}
