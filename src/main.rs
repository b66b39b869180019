// main.rs - CLI entry point

use std::path::Path;
use std::time::Instant;
use pairdist::cli::Config;
use pairdist::core::{comparison_count, styled_progress_bar};
use pairdist::output::{write_duplicates, write_json_report};
use pairdist::prelude::*;

fn main() {
    if let Err(e) = run_main() {
        eprintln!("❌ ERROR: {}", e);
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), String> {
    let mut args: Args = argh::from_env();
    let command_line = std::env::args().collect::<Vec<String>>().join(" ");

    // Handle generate config first
    if args.generate_config {
        let sample_config = Config::generate_sample();
        println!("{}", sample_config);
        println!("\n💡 Save this content to a .toml file and use --config /path/to/config.toml");
        return Ok(());
    }

    if args.list_calculators {
        print_calculators();
        return Ok(());
    }

    // Load configuration file if specified
    if let Some(config_path) = args.config.clone() {
        args = args.with_config_file(&config_path)?;
    }

    let validation = validate_args(&args)?;

    let alignment_path = args.alignment.as_ref().ok_or("--alignment is required")?;
    let output = if args.dry_run {
        None
    } else {
        Some(args.output.as_ref().ok_or("--output is required")?)
    };

    println!("🚀 pairdist v{}", env!("CARGO_PKG_VERSION"));

    // Configure thread pool
    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
            .map_err(|e| format!("Failed to configure thread pool: {}", e))?;
        println!("🧵 Threads: {}", n);
    } else {
        let num_threads = rayon::current_num_threads();
        println!("🧵 Threads: {} (auto-detected)", num_threads);
    }

    println!(
        "🧮 Calculator: {} ({})",
        validation.estimator,
        validation.estimator.description()
    );
    println!("🧬 Moltype: {}", validation.moltype);

    let total_start = Instant::now();

    // Load and filter the alignment
    let mut alignment = Alignment::from_fasta(Path::new(alignment_path), validation.moltype)?;
    println!(
        "📊 Loaded {} sequences × {} columns from {}",
        alignment.num_seqs(),
        alignment.alignment_length(),
        alignment_path
    );

    if validation.include_regex.is_some() || validation.exclude_regex.is_some() {
        alignment = alignment.filter_names(
            validation.include_regex.as_ref(),
            validation.exclude_regex.as_ref(),
        )?;
        println!("🔍 {} sequences left after name filtering", alignment.num_seqs());
    }

    let calculator = PairwiseDistance::new(validation.estimator, validation.moltype, args.invalid)?
        .with_alignment(&alignment)?;

    if args.dry_run {
        println!("✅ Dry run completed successfully");
        println!(
            "📊 {} sequences, {} pairwise comparisons",
            calculator.names().len(),
            comparison_count(calculator.names().len())
        );
        return Ok(());
    }

    if matches!(validation.statistic, Statistic::Variance | Statistic::StdErr) && !validation.has_variance() {
        println!(
            "⚠️  {} does not estimate variances; every {} cell will be NA",
            validation.estimator, validation.statistic
        );
    }

    let results = if args.quiet {
        calculator.run()?
    } else {
        let pb = styled_progress_bar(comparison_count(calculator.names().len()) as u64);
        calculator.run_with_progress(&pb)?
    };

    let matrix = results.statistic_matrix(validation.statistic, !args.exclude_duplicates);
    let matrix = if args.drop_invalid {
        let before = matrix.len();
        let valid = matrix.tree_input()?;
        if valid.len() < before {
            println!(
                "🧹 Dropped {} sequence(s) with invalid {} values",
                before - valid.len(),
                validation.statistic
            );
        }
        valid
    } else {
        if matrix.has_invalid() {
            println!("⚠️  Matrix contains invalid cells (written as NA); use --drop-invalid before tree building");
        }
        matrix
    };

    // Write output
    if let Some(output_path) = output {
        write_matrix(output_path, validation.format, &matrix, args.digits, &command_line)?;
    }

    if let Some(ref path) = args.duplicates_report {
        if results.has_duplicates() {
            write_duplicates(path, &results, &command_line)?;
        } else {
            println!("📌 No duplicate sequences found - skipping duplicate report");
        }
    }

    if let Some(ref path) = args.json_report {
        write_json_report(path, &results, &command_line)?;
    }

    let total_elapsed = total_start.elapsed();
    println!(
        "\n⏱️  Total execution time: {:.2}s",
        total_elapsed.as_secs_f64()
    );
    Ok(())
}

fn print_calculators() {
    println!("📋 Available pairwise distance calculators (case insensitive):");
    for estimator in Estimator::all() {
        println!(
            "  - {:<12} {:<26} {}",
            estimator.name(),
            estimator.moltype_labels(),
            estimator.description()
        );
    }
}
