// config.rs - Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    // Input/Output
    pub alignment: Option<String>,
    pub output: Option<String>,
    pub duplicates_report: Option<String>,
    pub json_report: Option<String>,

    // Calculator
    pub calculator: Option<String>,
    pub moltype: Option<String>,
    pub no_tk_adjustment: Option<bool>,
    pub invalid: Option<i8>,

    // Matrix output
    pub statistic: Option<String>,
    pub format: Option<String>,
    pub digits: Option<usize>,
    pub exclude_duplicates: Option<bool>,
    pub drop_invalid: Option<bool>,

    // Sequence filtering
    pub include_seqs: Option<String>,
    pub exclude_seqs: Option<String>,

    // Performance
    pub threads: Option<usize>,

    // Flags
    pub quiet: Option<bool>,
    pub dry_run: Option<bool>,
}

impl Config {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))?;

        println!("📄 Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content)
            .map_err(|e| format!("Failed to write config file '{}': {}", path.display(), e))?;

        println!("📄 Saved configuration to: {}", path.display());
        Ok(())
    }

    /// Generate a sample configuration file with comments
    pub fn generate_sample() -> String {
        r#"# pairdist.toml - Configuration file for pairdist
# Command line arguments will override these settings

# =============================================================================
# INPUT/OUTPUT
# =============================================================================

# Aligned sequences in FASTA format
alignment = "/path/to/alignment.fasta"

# Output matrix file
output = "distances.tsv"

# Duplicate groups (representative -> identical sequences)
# duplicates_report = "duplicates.tsv"

# Per-pair statistics as JSON
# json_report = "report.json"

# =============================================================================
# CALCULATOR
# =============================================================================

# Distance calculator: hamming, jc69, tn93, logdet, paralinear
calculator = "tn93"

# Molecule type: dna, rna, protein, text
# jc69/tn93 need dna or rna; logdet/paralinear also accept protein
moltype = "dna"

# Disable the Tamura-Kumar adjustment (logdet only)
no_tk_adjustment = false

# State index for gaps and ambiguous characters (must be negative)
invalid = -9

# =============================================================================
# MATRIX OUTPUT
# =============================================================================

# Statistic to write: dist, stderr, var, proportion, length
statistic = "dist"

# Output format: tsv, csv, phylip, nexus
format = "tsv"

# Decimal places
digits = 4

# Write only unique sequences instead of expanding duplicates
exclude_duplicates = false

# Drop sequences with invalid distances (needed before tree building)
drop_invalid = false

# =============================================================================
# SEQUENCE FILTERING
# =============================================================================

# Include only sequences matching regex pattern
# include_seqs = "^sample_.*"

# Exclude sequences matching regex pattern
# exclude_seqs = "outgroup.*"

# =============================================================================
# PERFORMANCE
# =============================================================================

# Number of threads (omit for auto-detection)
threads = 8

# =============================================================================
# FLAGS
# =============================================================================

# Hide the progress bar
quiet = false

# Validate inputs without computation (dry run)
dry_run = false
"#
        .to_string()
    }
}
