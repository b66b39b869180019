// mod.rs - Core logic module

pub mod diversity;
pub mod estimators;
pub mod indexer;
pub mod linalg;
pub mod matrix;
pub mod pairwise;

// Re-export main types for convenience
pub use diversity::DiversityMatrix;
pub use estimators::{available_distances, Estimate, Estimator, PairStats, PairwiseEstimator};
pub use indexer::{AlphabetIndex, DEFAULT_INVALID};
pub use matrix::{DistanceMatrix, PairwiseResults, Statistic};
pub use pairwise::{comparison_count, styled_progress_bar, PairwiseDistance};
