//! Group classified peptides and sum their intensities per enzyme and per
//! orphan residue, and pivot the result into an exportable table
use super::*;
use indexmap::IndexMap;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::str::FromStr;

/// Peptide attribute used to group intensities
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    #[cfg_attr(
        feature = "serialization",
        serde(rename = "sampleId", alias = "sample", alias = "sample_id")
    )]
    Sample,
    #[cfg_attr(
        feature = "serialization",
        serde(rename = "accession", alias = "protein", alias = "protein_id")
    )]
    Accession,
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sampleid" | "sample_id" | "sample" => Ok(GroupBy::Sample),
            "accession" | "protein_id" | "protein" => Ok(GroupBy::Accession),
            _ => Err(format!("unknown grouping `{}`, expected sample or accession", s)),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GroupBy::Sample => f.write_str("sampleId"),
            GroupBy::Accession => f.write_str("accession"),
        }
    }
}

/// Accumulated intensities for one group
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    /// Intensity explained by each enabled enzyme
    pub enzyme_response: BTreeMap<Enzyme, f64>,
    /// Intensity of uncleaved N-terminal bonds, by flanking residue
    pub n_side_orphans: BTreeMap<Residue, f64>,
    /// Intensity of uncleaved C-terminal bonds, by flanking residue
    pub c_side_orphans: BTreeMap<Residue, f64>,
}

impl Bucket {
    fn new(selection: &Selection) -> Bucket {
        let residues = || -> BTreeMap<Residue, f64> {
            Residue::ALL.iter().map(|&r| (r, 0.0)).collect()
        };
        Bucket {
            enzyme_response: selection.enzymes().iter().map(|&e| (e, 0.0)).collect(),
            n_side_orphans: residues(),
            c_side_orphans: residues(),
        }
    }

    fn add(&mut self, peptide: &Peptide) {
        for enzyme in peptide.n_matches.iter().chain(peptide.c_matches.iter()) {
            if let Some(total) = self.enzyme_response.get_mut(enzyme) {
                *total += peptide.intensity;
            }
        }
        if peptide.n_matches.is_empty() {
            orphan(
                &mut self.n_side_orphans,
                peptide.context.n_terminal(),
                peptide.intensity,
            );
        }
        if peptide.c_matches.is_empty() {
            orphan(
                &mut self.c_side_orphans,
                peptide.context.c_terminal(),
                peptide.intensity,
            );
        }
    }
}

/// Split `intensity` between the two residues either side of an uncut bond
fn orphan(tally: &mut BTreeMap<Residue, f64>, window: &Window, intensity: f64) {
    for &b in &[window.p1(), window.p1_prime()] {
        if let Some(total) = Residue::from_byte(b).and_then(|r| tally.get_mut(&r)) {
            *total += 0.5 * intensity;
        }
    }
}

/// Per-group buckets, in order of first appearance
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub group_by: GroupBy,
    pub selection: Selection,
    pub buckets: IndexMap<String, Bucket>,
}

impl Summary {
    pub fn get(&self, group: &str) -> Option<&Bucket> {
        self.buckets.get(group)
    }

    pub fn pivot(&self) -> PivotTable {
        pivot(self)
    }
}

/// Sum peptide intensities per group.
///
/// Each enzyme matched on the N-terminal side and each enzyme matched on
/// the C-terminal side receives the full intensity, so a peptide matched by
/// the same enzyme at both ends counts twice. A side without any match
/// contributes half the intensity to each of its two bond residues instead.
pub fn aggregate(peptides: &[Peptide], selection: &Selection, group_by: GroupBy) -> Summary {
    let mut buckets: IndexMap<String, Bucket> = IndexMap::new();
    for peptide in peptides {
        buckets
            .entry(peptide.group_key(group_by).to_string())
            .or_insert_with(|| Bucket::new(selection))
            .add(peptide);
    }
    Summary {
        group_by,
        selection: selection.clone(),
        buckets,
    }
}

/// Flat, column-per-group view of a `Summary`
#[derive(Debug, Clone, PartialEq)]
pub struct PivotTable {
    /// Group keys, in column order
    pub groups: Vec<String>,
    /// Metric label and one value per group
    pub rows: Vec<(String, Vec<f64>)>,
}

/// Transpose a summary into a table with a header row of group keys, then
/// one row per enabled enzyme, then one row per residue for the C-terminal
/// side followed by one per residue for the N-terminal side.
pub fn pivot(summary: &Summary) -> PivotTable {
    let buckets = summary.buckets.values().collect::<Vec<_>>();
    let mut rows =
        Vec::with_capacity(summary.selection.enzymes().len() + 2 * Residue::ALL.len());

    for enzyme in summary.selection.enzymes() {
        rows.push((
            enzyme.name().to_string(),
            buckets
                .iter()
                .map(|b| b.enzyme_response.get(enzyme).copied().unwrap_or(0.0))
                .collect(),
        ));
    }
    let sides = [
        ("c", buckets.iter().map(|b| &b.c_side_orphans).collect::<Vec<_>>()),
        ("n", buckets.iter().map(|b| &b.n_side_orphans).collect::<Vec<_>>()),
    ];
    for (side, tallies) in &sides {
        for residue in Residue::ALL.iter() {
            rows.push((
                format!("{}-{}-side", residue, side),
                tallies
                    .iter()
                    .map(|t| t.get(residue).copied().unwrap_or(0.0))
                    .collect(),
            ));
        }
    }

    PivotTable {
        groups: summary.buckets.keys().cloned().collect(),
        rows,
    }
}

impl PivotTable {
    /// Every row as text, starting with the header row `["", groups...]`
    pub fn records(&self) -> Vec<Vec<String>> {
        let mut records = Vec::with_capacity(self.rows.len() + 1);
        records.push(
            std::iter::once(String::new())
                .chain(self.groups.iter().cloned())
                .collect(),
        );
        for (label, values) in &self.rows {
            records.push(
                std::iter::once(label.clone())
                    .chain(values.iter().map(|v| v.to_string()))
                    .collect(),
            );
        }
        records
    }

    /// Write the table as comma-delimited text
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), Error> {
        let mut writer = csv::Writer::from_writer(writer);
        for record in self.records() {
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
