// indexer.rs - Character to state-index lookup for a molecule type

use crate::core::estimators::Estimator;
use crate::data::MolType;

/// Default marker for gaps, ambiguity codes and any non-canonical character
pub const DEFAULT_INVALID: i8 = -9;

/// Dense lookup table from character code to canonical state index.
///
/// Built once per molecule type and reused for every sequence. The table is
/// sized to the largest valid character of the molecule type; characters past
/// its end, and every non-canonical character inside it, map to the invalid
/// marker.
#[derive(Debug, Clone)]
pub struct AlphabetIndex {
    moltype: MolType,
    table: Vec<i8>,
    invalid: i8,
}

impl AlphabetIndex {
    pub fn new(moltype: MolType, invalid: i8) -> Result<Self, String> {
        if invalid >= 0 {
            return Err(format!(
                "Invalid-state marker must be negative to avoid valid state indices, got {}",
                invalid
            ));
        }

        let max_ord = moltype.all_chars().iter().copied().max().unwrap_or(0) as usize;
        let mut table = vec![invalid; max_ord + 1];
        for (state, &c) in moltype.alphabet().iter().enumerate() {
            table[c as usize] = state as i8;
        }

        Ok(Self { moltype, table, invalid })
    }

    /// Build the index for an estimator, failing if it does not support the molecule type
    pub fn for_estimator(estimator: &Estimator, moltype: MolType, invalid: i8) -> Result<Self, String> {
        if !estimator.supports(moltype) {
            return Err(format!(
                "Invalid moltype for {}: '{}' not in ({})",
                estimator.name(),
                moltype,
                estimator.moltype_labels()
            ));
        }
        Self::new(moltype, invalid)
    }

    #[inline]
    pub fn index_of(&self, c: u8) -> i8 {
        self.table.get(c as usize).copied().unwrap_or(self.invalid)
    }

    /// Replace every character of `seq` with its state index
    pub fn encode(&self, seq: &[u8]) -> Vec<i8> {
        seq.iter().map(|&c| self.index_of(c)).collect()
    }

    pub fn moltype(&self) -> MolType {
        self.moltype
    }

    pub fn invalid(&self) -> i8 {
        self.invalid
    }

    pub fn dim(&self) -> usize {
        self.moltype.dim()
    }

    pub fn table_len(&self) -> usize {
        self.table.len()
    }
}
