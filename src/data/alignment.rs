// alignment.rs - Aligned sequence collection and FASTA loading

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use bio::io::fasta;
use regex::Regex;
use crate::data::MolType;

/// Named, equal-length (gapped) sequences sharing one molecule type
#[derive(Debug, Clone)]
pub struct Alignment {
    moltype: MolType,
    names: Vec<String>,
    sequences: Vec<Vec<u8>>,
}

impl Alignment {
    /// Build an alignment from `(name, sequence)` records.
    ///
    /// Names must be unique and every sequence must have the same length.
    /// Non-text sequences are upper-cased.
    pub fn new(moltype: MolType, records: Vec<(String, Vec<u8>)>) -> Result<Self, String> {
        if records.is_empty() {
            return Err("Alignment contains no sequences".to_string());
        }

        let expected_len = records[0].1.len();
        let mut seen = HashSet::with_capacity(records.len());
        let mut names = Vec::with_capacity(records.len());
        let mut sequences = Vec::with_capacity(records.len());

        for (name, mut sequence) in records {
            if !seen.insert(name.clone()) {
                return Err(format!("Duplicate sequence name in alignment: '{}'", name));
            }
            if sequence.len() != expected_len {
                return Err(format!(
                    "Sequence '{}' has length {} but alignment length is {}",
                    name,
                    sequence.len(),
                    expected_len
                ));
            }
            if !moltype.is_case_sensitive() {
                sequence.make_ascii_uppercase();
            }
            names.push(name);
            sequences.push(sequence);
        }

        Ok(Self { moltype, names, sequences })
    }

    /// Load an alignment from a FASTA file
    pub fn from_fasta(path: &Path, moltype: MolType) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open FASTA file {}: {}", path.display(), e))?;
        Self::from_reader(BufReader::new(file), moltype)
            .map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Load an alignment from any FASTA-formatted reader
    pub fn from_reader<R: Read>(reader: R, moltype: MolType) -> Result<Self, String> {
        let reader = fasta::Reader::new(reader);
        let mut records = Vec::new();

        for record_result in reader.records() {
            let record = record_result.map_err(|e| format!("Invalid FASTA record: {}", e))?;
            records.push((record.id().to_string(), record.seq().to_vec()));
        }

        Self::new(moltype, records)
    }

    /// Keep sequences whose names match `include` (if given) and not `exclude` (if given)
    pub fn filter_names(&self, include: Option<&Regex>, exclude: Option<&Regex>) -> Result<Self, String> {
        let records: Vec<(String, Vec<u8>)> = self
            .names
            .iter()
            .zip(&self.sequences)
            .filter(|(name, _)| include.map_or(true, |re| re.is_match(name)))
            .filter(|(name, _)| exclude.map_or(true, |re| !re.is_match(name)))
            .map(|(name, seq)| (name.clone(), seq.clone()))
            .collect();

        if records.is_empty() {
            return Err("No sequences left after name filtering".to_string());
        }
        Self::new(self.moltype, records)
    }

    pub fn moltype(&self) -> MolType {
        self.moltype
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn sequences(&self) -> &[Vec<u8>] {
        &self.sequences
    }

    /// Gapped sequence for a name
    pub fn get_gapped_seq(&self, name: &str) -> Option<&[u8]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.sequences[i].as_slice())
    }

    /// Number of sequences
    pub fn num_seqs(&self) -> usize {
        self.names.len()
    }

    /// Number of alignment columns
    pub fn alignment_length(&self) -> usize {
        self.sequences.first().map_or(0, |s| s.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(pairs: &[(&str, &str)]) -> Vec<(String, Vec<u8>)> {
        pairs.iter().map(|(n, s)| (n.to_string(), s.as_bytes().to_vec())).collect()
    }

    #[test]
    fn test_alignment_from_fasta_reader() {
        let fasta = b">seq1 first\nACGT\nAC\n>seq2\nacgtaa\n";
        let aln = Alignment::from_reader(&fasta[..], MolType::Dna).unwrap();

        assert_eq!(aln.names(), &["seq1".to_string(), "seq2".to_string()]);
        assert_eq!(aln.alignment_length(), 6);
        assert_eq!(aln.get_gapped_seq("seq2").unwrap(), b"ACGTAA");
        assert!(aln.get_gapped_seq("seq3").is_none());
    }

    #[test]
    fn test_alignment_rejects_bad_input() {
        assert!(Alignment::new(MolType::Dna, Vec::new()).is_err());

        let unequal = Alignment::new(MolType::Dna, records(&[("a", "ACGT"), ("b", "ACG")]));
        assert!(unequal.unwrap_err().contains("length"));

        let dupes = Alignment::new(MolType::Dna, records(&[("a", "ACGT"), ("a", "ACGA")]));
        assert!(dupes.unwrap_err().contains("Duplicate"));
    }

    #[test]
    fn test_text_is_not_uppercased() {
        let aln = Alignment::new(MolType::Text, records(&[("a", "abC")])).unwrap();
        assert_eq!(aln.sequences()[0], b"abC");
    }

    #[test]
    fn test_filter_names() {
        let aln = Alignment::new(
            MolType::Dna,
            records(&[("human", "ACGT"), ("mouse", "ACGA"), ("rat", "ACGG")]),
        )
        .unwrap();

        let include = Regex::new("^(human|rat)$").unwrap();
        let exclude = Regex::new("^rat$").unwrap();
        let filtered = aln.filter_names(Some(&include), Some(&exclude)).unwrap();
        assert_eq!(filtered.names(), &["human".to_string()]);

        let none = Regex::new("^zebrafish$").unwrap();
        assert!(aln.filter_names(Some(&none), None).is_err());
    }
}
