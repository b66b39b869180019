// validation.rs - Input validation utilities

use std::str::FromStr;
use regex::Regex;
use crate::cli::args::Args;
use crate::core::{Estimator, Statistic};
use crate::data::MolType;
use crate::output::OutputFormat;

#[derive(Debug)]
pub struct ValidationResult {
    pub estimator: Estimator,
    pub moltype: MolType,
    pub statistic: Statistic,
    pub format: OutputFormat,
    pub include_regex: Option<Regex>,
    pub exclude_regex: Option<Regex>,
}

impl ValidationResult {
    /// Whether the chosen estimator defines a variance
    pub fn has_variance(&self) -> bool {
        !matches!(
            self.estimator,
            Estimator::Hamming | Estimator::LogDet { use_tk_adjustment: true }
        )
    }
}

fn compile_regex(pattern: &Option<String>, label: &str) -> Result<Option<Regex>, String> {
    match pattern {
        Some(p) => Regex::new(p)
            .map(Some)
            .map_err(|e| format!("Invalid {} regex: {}", label, e)),
        None => Ok(None),
    }
}

/// Validate all command line arguments
pub fn validate_args(args: &Args) -> Result<ValidationResult, String> {
    let mut estimator = Estimator::from_str(&args.calculator)?;

    let moltype = match &args.moltype {
        Some(m) => MolType::from_str(m)?,
        None => estimator.default_moltype(),
    };
    if !estimator.supports(moltype) {
        return Err(format!(
            "Invalid moltype for {}: '{}' not in ({})",
            estimator.name(),
            moltype,
            estimator.moltype_labels()
        ));
    }

    if args.no_tk_adjustment {
        match &mut estimator {
            Estimator::LogDet { use_tk_adjustment } => *use_tk_adjustment = false,
            other => {
                return Err(format!(
                    "--no-tk-adjustment only applies to logdet, not {}",
                    other.name()
                ))
            }
        }
    }

    if args.invalid >= 0 {
        return Err(format!(
            "--invalid must be negative so it cannot collide with a state index, got {}",
            args.invalid
        ));
    }

    let statistic = Statistic::from_str(&args.statistic)?;
    let format = OutputFormat::from_str(&args.format)?;

    if args.threads == Some(0) {
        return Err("--threads must be at least 1".to_string());
    }

    let include_regex = compile_regex(&args.include_seqs, "include_seqs")?;
    let exclude_regex = compile_regex(&args.exclude_seqs, "exclude_seqs")?;

    Ok(ValidationResult {
        estimator,
        moltype,
        statistic,
        format,
        include_regex,
        exclude_regex,
    })
}
