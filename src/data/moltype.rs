// moltype.rs - Molecule types and their canonical alphabets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DNA_CANONICAL: &[u8] = b"TCAG";
const RNA_CANONICAL: &[u8] = b"UCAG";
const PROTEIN_CANONICAL: &[u8] = b"ACDEFGHIKLMNPQRSTUVWY";
const TEXT_CANONICAL: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

// Canonical states plus ambiguity codes, missing and gap characters
const DNA_ALL: &[u8] = b"TCAGNRYWSKMBDHV?-";
const RNA_ALL: &[u8] = b"UCAGNRYWSKMBDHV?-";
const PROTEIN_ALL: &[u8] = b"ACDEFGHIKLMNPQRSTUVWYBXZJ*?-";
const TEXT_ALL: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ?-";

/// Molecule type of an alignment, defining the ordered set of canonical states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MolType {
    Dna,
    Rna,
    Protein,
    Text,
}

impl MolType {
    pub fn label(&self) -> &'static str {
        match self {
            MolType::Dna => "dna",
            MolType::Rna => "rna",
            MolType::Protein => "protein",
            MolType::Text => "text",
        }
    }

    /// Ordered canonical states; a state's position is its index
    pub fn alphabet(&self) -> &'static [u8] {
        match self {
            MolType::Dna => DNA_CANONICAL,
            MolType::Rna => RNA_CANONICAL,
            MolType::Protein => PROTEIN_CANONICAL,
            MolType::Text => TEXT_CANONICAL,
        }
    }

    /// Every character allowed in a sequence of this type, canonical or not
    pub fn all_chars(&self) -> &'static [u8] {
        match self {
            MolType::Dna => DNA_ALL,
            MolType::Rna => RNA_ALL,
            MolType::Protein => PROTEIN_ALL,
            MolType::Text => TEXT_ALL,
        }
    }

    /// Number of canonical states (K)
    pub fn dim(&self) -> usize {
        self.alphabet().len()
    }

    pub fn is_nucleic(&self) -> bool {
        matches!(self, MolType::Dna | MolType::Rna)
    }

    /// Whether sequence case is significant (such sequences are not upper-cased)
    pub fn is_case_sensitive(&self) -> bool {
        matches!(self, MolType::Text)
    }

    pub fn purine_indices(&self) -> Result<Vec<usize>, String> {
        self.state_indices(b"AG")
    }

    pub fn pyrimidine_indices(&self) -> Result<Vec<usize>, String> {
        match self {
            MolType::Dna => self.state_indices(b"CT"),
            MolType::Rna => self.state_indices(b"CU"),
            _ => Err(format!("Non-nucleic acid MolType: '{}'", self.label())),
        }
    }

    fn state_indices(&self, states: &[u8]) -> Result<Vec<usize>, String> {
        if !self.is_nucleic() {
            return Err(format!("Non-nucleic acid MolType: '{}'", self.label()));
        }
        let alphabet = self.alphabet();
        states
            .iter()
            .map(|state| {
                alphabet
                    .iter()
                    .position(|c| c == state)
                    .ok_or_else(|| format!("State '{}' missing from {} alphabet", *state as char, self.label()))
            })
            .collect()
    }
}

impl fmt::Display for MolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for MolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dna" => Ok(MolType::Dna),
            "rna" => Ok(MolType::Rna),
            "protein" | "aa" => Ok(MolType::Protein),
            "text" => Ok(MolType::Text),
            _ => Err(format!("Invalid moltype: {}. Use: dna, rna, protein, text", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nucleic_partitions() {
        assert_eq!(MolType::Dna.purine_indices().unwrap(), vec![2, 3]);
        assert_eq!(MolType::Dna.pyrimidine_indices().unwrap(), vec![1, 0]);
        assert_eq!(MolType::Rna.pyrimidine_indices().unwrap(), vec![1, 0]);
        assert!(MolType::Protein.purine_indices().is_err());
        assert!(MolType::Text.pyrimidine_indices().is_err());
    }

    #[test]
    fn test_dimensions() {
        assert_eq!(MolType::Dna.dim(), 4);
        assert_eq!(MolType::Protein.dim(), 21);
        assert_eq!(MolType::Text.dim(), 52);
        for moltype in [MolType::Dna, MolType::Rna, MolType::Protein, MolType::Text] {
            assert!(moltype.alphabet().iter().all(|c| moltype.all_chars().contains(c)));
        }
    }

    #[test]
    fn test_only_text_is_case_sensitive() {
        assert!(MolType::Text.is_case_sensitive());
        for moltype in [MolType::Dna, MolType::Rna, MolType::Protein] {
            assert!(!moltype.is_case_sensitive());
        }
    }

    #[test]
    fn test_parse_moltype() {
        assert_eq!("DNA".parse::<MolType>().unwrap(), MolType::Dna);
        assert_eq!("aa".parse::<MolType>().unwrap(), MolType::Protein);
        assert!("codon".parse::<MolType>().is_err());
    }
}
