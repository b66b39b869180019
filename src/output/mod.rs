// mod.rs - Output formatters module

use std::collections::BTreeMap;
use std::fmt;
use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;
use serde::Serialize;
use crate::core::{DistanceMatrix, PairStats, PairwiseResults, Statistic};

/// Supported matrix file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Csv,
    Phylip,
    Nexus,
}

impl OutputFormat {
    pub fn name(&self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Csv => "csv",
            OutputFormat::Phylip => "phylip",
            OutputFormat::Nexus => "nexus",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            "phylip" => Ok(OutputFormat::Phylip),
            "nexus" => Ok(OutputFormat::Nexus),
            _ => Err(format!("Unsupported output format: {}. Use: tsv, csv, phylip, nexus", s)),
        }
    }
}

fn write_err(e: std::io::Error) -> String {
    format!("Write error: {}", e)
}

fn generated_at() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Ensure parent directory exists before creating file
fn ensure_parent_dir(file_path: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(file_path).parent() {
        create_dir_all(parent)
            .map_err(|e| format!("Failed to create parent directory '{}': {}", parent.display(), e))?;
    }
    Ok(())
}

fn create_writer(file_path: &str) -> Result<BufWriter<File>, String> {
    ensure_parent_dir(file_path)?;
    let file = File::create(file_path)
        .map_err(|e| format!("Failed to create output file '{}': {}", file_path, e))?;
    Ok(BufWriter::new(file))
}

/// Render one cell; lengths are integers and variances use scientific notation
pub fn format_value(value: Option<f64>, statistic: Statistic, digits: usize, missing: &str) -> String {
    match value {
        None => missing.to_string(),
        Some(v) => match statistic {
            Statistic::Length => format!("{:.0}", v),
            Statistic::Variance => format!("{:.*e}", digits, v),
            _ => format!("{:.*}", digits, v),
        },
    }
}

/// Write a square matrix with a delimiter (TSV/CSV)
pub fn write_delimited<W: Write>(
    writer: &mut W,
    matrix: &DistanceMatrix,
    delimiter: char,
    digits: usize,
    command_line: &str,
) -> Result<(), String> {
    writeln!(writer, "# Command: {}", command_line).map_err(write_err)?;
    writeln!(writer, "# Generated: {}", generated_at()).map_err(write_err)?;
    writeln!(writer, "# pairdist v{}", env!("CARGO_PKG_VERSION")).map_err(write_err)?;
    writeln!(writer, "# {}", matrix.statistic().title()).map_err(write_err)?;

    // Write header
    write!(writer, "Sequence").map_err(write_err)?;
    for name in matrix.names() {
        write!(writer, "{}{}", delimiter, name).map_err(write_err)?;
    }
    writeln!(writer).map_err(write_err)?;

    for (i, name) in matrix.names().iter().enumerate() {
        write!(writer, "{}", name).map_err(write_err)?;
        for j in 0..matrix.len() {
            let cell = format_value(matrix.value(i, j), matrix.statistic(), digits, "NA");
            write!(writer, "{}{}", delimiter, cell).map_err(write_err)?;
        }
        writeln!(writer).map_err(write_err)?;
    }
    Ok(())
}

/// Write a lower-triangle PHYLIP distance matrix
pub fn write_phylip_to<W: Write>(
    writer: &mut W,
    matrix: &DistanceMatrix,
    digits: usize,
    command_line: &str,
) -> Result<(), String> {
    writeln!(writer, "    {}", matrix.len()).map_err(write_err)?;

    for (i, name) in matrix.names().iter().enumerate() {
        write!(writer, "{:<10}", name).map_err(write_err)?;
        for j in 0..=i {
            let cell = format_value(matrix.value(i, j), matrix.statistic(), digits, "NA");
            write!(writer, "  {}", cell).map_err(write_err)?;
        }
        writeln!(writer).map_err(write_err)?;
    }

    // PHYLIP has no comment syntax; most parsers ignore trailing lines
    writeln!(writer).map_err(write_err)?;
    writeln!(writer, "# Command: {}", command_line).map_err(write_err)?;
    writeln!(writer, "# Generated: {}", generated_at()).map_err(write_err)?;
    writeln!(writer, "# pairdist v{}", env!("CARGO_PKG_VERSION")).map_err(write_err)?;
    Ok(())
}

/// Write a NEXUS DISTANCES block; invalid cells become `?`
pub fn write_nexus_to<W: Write>(
    writer: &mut W,
    matrix: &DistanceMatrix,
    digits: usize,
    command_line: &str,
) -> Result<(), String> {
    writeln!(writer, "#NEXUS").map_err(write_err)?;
    writeln!(writer, "[Command: {}]", command_line).map_err(write_err)?;
    writeln!(writer, "[Generated: {}]", generated_at()).map_err(write_err)?;
    writeln!(writer, "[pairdist v{}]", env!("CARGO_PKG_VERSION")).map_err(write_err)?;
    writeln!(writer, "[{}]", matrix.statistic().title()).map_err(write_err)?;
    writeln!(writer, "BEGIN DISTANCES;").map_err(write_err)?;
    writeln!(writer, "    DIMENSIONS NTAX={};", matrix.len()).map_err(write_err)?;
    writeln!(writer, "    FORMAT LABELS LOWER DIAGONAL;").map_err(write_err)?;
    writeln!(writer, "    MATRIX").map_err(write_err)?;

    for (i, name) in matrix.names().iter().enumerate() {
        write!(writer, "        {}", name).map_err(write_err)?;
        for j in 0..i {
            let cell = format_value(matrix.value(i, j), matrix.statistic(), digits, "?");
            write!(writer, " {}", cell).map_err(write_err)?;
        }
        writeln!(writer).map_err(write_err)?;
    }

    writeln!(writer, "    ;").map_err(write_err)?;
    writeln!(writer, "END;").map_err(write_err)?;
    Ok(())
}

/// Write a matrix in `format` to any writer
pub fn write_matrix_to<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    matrix: &DistanceMatrix,
    digits: usize,
    command_line: &str,
) -> Result<(), String> {
    match format {
        OutputFormat::Tsv => write_delimited(writer, matrix, '\t', digits, command_line),
        OutputFormat::Csv => write_delimited(writer, matrix, ',', digits, command_line),
        OutputFormat::Phylip => write_phylip_to(writer, matrix, digits, command_line),
        OutputFormat::Nexus => write_nexus_to(writer, matrix, digits, command_line),
    }
}

/// Write a matrix file in the specified format
pub fn write_matrix(
    file_path: &str,
    format: OutputFormat,
    matrix: &DistanceMatrix,
    digits: usize,
    command_line: &str,
) -> Result<(), String> {
    let mut writer = create_writer(file_path)?;
    write_matrix_to(&mut writer, format, matrix, digits, command_line)?;
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ {} written to: {} ({} format)", matrix.statistic().title(), file_path, format);
    Ok(())
}

/// Write representative/duplicates rows as TSV
pub fn write_duplicates_to<W: Write>(
    writer: &mut W,
    results: &PairwiseResults,
    command_line: &str,
) -> Result<(), String> {
    writeln!(writer, "# Command: {}", command_line).map_err(write_err)?;
    writeln!(writer, "# Generated: {}", generated_at()).map_err(write_err)?;
    writeln!(writer, "representative\tduplicates").map_err(write_err)?;
    for (representative, duplicates) in results.duplicated() {
        writeln!(writer, "{}\t{}", representative, duplicates.join(",")).map_err(write_err)?;
    }
    Ok(())
}

pub fn write_duplicates(file_path: &str, results: &PairwiseResults, command_line: &str) -> Result<(), String> {
    let mut writer = create_writer(file_path)?;
    write_duplicates_to(&mut writer, results, command_line)?;
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ Duplicate report written to: {}", file_path);
    Ok(())
}

/// One unique pair in the JSON report; `stats` is null when invalid
#[derive(Debug, Serialize)]
pub struct PairRecord<'a> {
    pub seq1: &'a str,
    pub seq2: &'a str,
    pub stats: Option<PairStats>,
}

/// Machine-readable summary of a run
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub version: &'static str,
    pub generated: String,
    pub command: &'a str,
    pub calculator: String,
    pub description: &'static str,
    pub moltype: String,
    pub names: &'a [String],
    pub pairs: Vec<PairRecord<'a>>,
    pub duplicates: BTreeMap<String, Vec<String>>,
}

impl<'a> RunReport<'a> {
    pub fn new(results: &'a PairwiseResults, command_line: &'a str) -> Self {
        let pairs = results
            .unique_pairs()
            .into_iter()
            .map(|(seq1, seq2, stats)| PairRecord { seq1, seq2, stats })
            .collect();

        Self {
            version: env!("CARGO_PKG_VERSION"),
            generated: generated_at(),
            command: command_line,
            calculator: results.estimator().to_string(),
            description: results.estimator().description(),
            moltype: results.moltype().to_string(),
            names: results.names(),
            pairs,
            duplicates: results.duplicated().into_iter().collect(),
        }
    }
}

pub fn write_json_report(file_path: &str, results: &PairwiseResults, command_line: &str) -> Result<(), String> {
    let mut writer = create_writer(file_path)?;
    let report = RunReport::new(results, command_line);
    serde_json::to_writer_pretty(&mut writer, &report)
        .map_err(|e| format!("Failed to serialize JSON report: {}", e))?;
    writeln!(writer).map_err(write_err)?;
    writer.flush().map_err(|e| format!("Flush error: {}", e))?;
    println!("✅ JSON report written to: {}", file_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Estimator, PairwiseDistance, DEFAULT_INVALID};
    use crate::data::{Alignment, MolType};

    fn results() -> PairwiseResults {
        let records = [
            ("a", "TCAGTCAGTCAG"),
            ("b", "TCAGTCAGTCAA"),
            ("c", "TCAGTCAGTCAG"),
            ("d", "CAGTCAGTCAGT"),
        ]
        .iter()
        .map(|(n, s)| (n.to_string(), s.as_bytes().to_vec()))
        .collect();
        let aln = Alignment::new(MolType::Dna, records).unwrap();
        PairwiseDistance::new(Estimator::Jc69, MolType::Dna, DEFAULT_INVALID)
            .unwrap()
            .with_alignment(&aln)
            .unwrap()
            .run()
            .unwrap()
    }

    fn render(format: OutputFormat, matrix: &DistanceMatrix) -> String {
        let mut buffer = Vec::new();
        write_matrix_to(&mut buffer, format, matrix, 4, "pairdist test").unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(Some(0.123456), Statistic::Distance, 4, "NA"), "0.1235");
        assert_eq!(format_value(Some(12.0), Statistic::Length, 4, "NA"), "12");
        assert_eq!(format_value(Some(0.00123), Statistic::Variance, 2, "NA"), "1.23e-3");
        assert_eq!(format_value(None, Statistic::StdErr, 4, "?"), "?");
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("PHYLIP".parse::<OutputFormat>().unwrap(), OutputFormat::Phylip);
        assert!("xlsx".parse::<OutputFormat>().unwrap_err().contains("Unsupported output format"));
    }

    #[test]
    fn test_tsv_output() {
        let text = render(OutputFormat::Tsv, &results().dists());
        let lines: Vec<&str> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(lines[0], "Sequence\ta\tb\tc\td");
        assert_eq!(lines.len(), 5);
        // c duplicates a; a-d is saturated
        assert!(lines[3].starts_with("c\t0.0000\t"));
        assert!(lines[1].ends_with("\tNA"));
    }

    #[test]
    fn test_csv_and_nexus_output() {
        let dists = results().dists();
        let csv = render(OutputFormat::Csv, &dists);
        assert!(csv.contains("Sequence,a,b,c,d"));

        let nexus = render(OutputFormat::Nexus, &dists);
        assert!(nexus.starts_with("#NEXUS"));
        assert!(nexus.contains("DIMENSIONS NTAX=4;"));
        assert!(nexus.contains(" ?"));
        assert!(nexus.trim_end().ends_with("END;"));
    }

    #[test]
    fn test_phylip_lower_triangle() {
        let matrix = results().distances(false);
        let text = render(OutputFormat::Phylip, &matrix);
        let mut lines = text.lines();
        assert_eq!(lines.next().unwrap().trim(), "3");
        let second = lines.nth(1).unwrap();
        assert_eq!(second.split_whitespace().count(), 3);
    }

    #[test]
    fn test_duplicates_report() {
        let mut buffer = Vec::new();
        write_duplicates_to(&mut buffer, &results(), "pairdist test").unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.lines().any(|l| l == "a\tc"));
    }

    #[test]
    fn test_json_report() {
        let results = results();
        let report = RunReport::new(&results, "pairdist test");
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["calculator"], "jc69");
        assert_eq!(value["moltype"], "dna");
        assert_eq!(value["duplicates"]["a"][0], "c");
        // a, b, d are unique
        let pairs = value["pairs"].as_array().unwrap();
        assert_eq!(pairs.len(), 3);
        let saturated = pairs.iter().find(|p| p["seq1"] == "a" && p["seq2"] == "d").unwrap();
        assert!(saturated["stats"].is_null());
    }
}
