//! Collection of classified `Peptide` objects representing a single analysis
use super::*;
#[cfg(feature = "serialization")]
use serde::Serialize;
use std::collections::HashSet;

#[cfg_attr(feature = "serialization", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
/// Peptides imported from one measurement file
pub struct Dataset {
    /// Every row that was successfully located and classified
    pub peptides: Vec<Peptide>,
    /// Rows dropped during import
    #[cfg_attr(feature = "serialization", serde(skip))]
    pub skipped: Vec<Skipped>,
    /// Enzymes the peptides were classified against
    pub selection: Selection,
}

impl Dataset {
    /// Return a set of all protein accessions present in the `Dataset`
    pub fn accessions(&self) -> HashSet<&'_ str> {
        self.peptides.iter().map(|p| p.accession.as_str()).collect()
    }

    /// Return a set of all sample identifiers present in the `Dataset`
    pub fn samples(&self) -> HashSet<&'_ str> {
        self.peptides.iter().map(|p| p.sample_id.as_str()).collect()
    }

    /// Summed intensity per enzyme and orphan residue for each group
    pub fn aggregate(&self, group_by: GroupBy) -> Summary {
        aggregate(&self.peptides, &self.selection, group_by)
    }
}
