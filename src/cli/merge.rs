// merge.rs - Merge configuration file with CLI arguments

use crate::cli::{Args, Config};
use crate::core::DEFAULT_INVALID;

impl Args {
    /// Merge with configuration from file
    /// CLI arguments take precedence over config file values
    pub fn merge_with_config(mut self, config: Config) -> Self {
        // Input/Output
        if self.alignment.is_none() {
            self.alignment = config.alignment;
        }
        if self.output.is_none() {
            self.output = config.output;
        }
        if self.duplicates_report.is_none() {
            self.duplicates_report = config.duplicates_report;
        }
        if self.json_report.is_none() {
            self.json_report = config.json_report;
        }

        // Calculator (only override defaults, not explicit CLI values)
        if self.calculator == "tn93" {
            if let Some(calculator) = config.calculator {
                self.calculator = calculator;
            }
        }
        if self.moltype.is_none() {
            self.moltype = config.moltype;
        }
        if self.invalid == DEFAULT_INVALID {
            if let Some(invalid) = config.invalid {
                self.invalid = invalid;
            }
        }

        // Matrix output
        if self.statistic == "dist" {
            if let Some(statistic) = config.statistic {
                self.statistic = statistic;
            }
        }
        if self.format == "tsv" {
            if let Some(format) = config.format {
                self.format = format;
            }
        }
        if self.digits == 4 {
            if let Some(digits) = config.digits {
                self.digits = digits;
            }
        }

        // Sequence filtering
        if self.include_seqs.is_none() {
            self.include_seqs = config.include_seqs;
        }
        if self.exclude_seqs.is_none() {
            self.exclude_seqs = config.exclude_seqs;
        }

        // Performance
        if self.threads.is_none() {
            self.threads = config.threads;
        }

        // Flags (CLI flags take precedence, config only sets if not explicitly set)
        if !self.no_tk_adjustment && config.no_tk_adjustment.unwrap_or(false) {
            self.no_tk_adjustment = true;
        }
        if !self.exclude_duplicates && config.exclude_duplicates.unwrap_or(false) {
            self.exclude_duplicates = true;
        }
        if !self.drop_invalid && config.drop_invalid.unwrap_or(false) {
            self.drop_invalid = true;
        }
        if !self.quiet && config.quiet.unwrap_or(false) {
            self.quiet = true;
        }
        if !self.dry_run && config.dry_run.unwrap_or(false) {
            self.dry_run = true;
        }

        self
    }

    /// Load configuration and merge with CLI args
    pub fn with_config_file(self, config_path: &str) -> Result<Self, String> {
        let config = Config::from_file(config_path)?;
        Ok(self.merge_with_config(config))
    }
}
