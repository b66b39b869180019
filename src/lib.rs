// lib.rs - pairdist library root

//! # pairdist - Pairwise evolutionary distances for aligned sequences
//!
//! Computes all-pairs distance matrices from a multiple sequence alignment
//! with closed-form estimators, collapsing identical sequences so each unique
//! pair is estimated only once.
//!
//! ## Features
//!
//! - **Estimators**: Hamming, JC69, TN93, LogDet (with or without the
//!   Tamura-Kumar adjustment) and Paralinear
//! - **Molecule types**: DNA, RNA, protein and free text
//! - **Duplicate collapsing**: identical sequences are aliased to a representative
//! - **Parallel**: unique pairs are estimated with rayon
//! - **Multiple formats**: TSV, CSV, PHYLIP, NEXUS and a JSON run report
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use pairdist::prelude::*;
//!
//! let alignment = Alignment::from_fasta(std::path::Path::new("aln.fasta"), MolType::Dna)?;
//! let calculator = PairwiseDistance::new(Estimator::Tn93, MolType::Dna, -9)?
//!     .with_alignment(&alignment)?;
//!
//! let results = calculator.run()?;
//! let tree_ready = results.dists().tree_input()?;
//! println!("{} sequences with valid distances", tree_ready.len());
//! # Ok::<(), String>(())
//! ```

// Re-export all main modules
pub mod cli;
pub mod core;
pub mod data;
pub mod output;

// Convenience prelude for common imports
pub mod prelude {
    pub use crate::cli::{validate_args, Args, ValidationResult};
    pub use crate::core::{available_distances, Estimator, PairStats, PairwiseDistance};
    pub use crate::core::{DistanceMatrix, PairwiseResults, Statistic};
    pub use crate::data::{Alignment, MolType};
    pub use crate::output::{write_matrix, OutputFormat};
}

// Re-export main types at the root level for convenience
pub use cli::{Args, ValidationResult};
pub use core::{DistanceMatrix, Estimator, PairwiseDistance, PairwiseResults, Statistic};
pub use data::{Alignment, MolType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library information
pub fn get_info() -> String {
    format!(
        "pairdist v{} - Pairwise evolutionary distances for aligned sequences",
        VERSION
    )
}
