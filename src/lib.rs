//! Estimate which proteases produced a set of observed peptides.
//!
//! Peptides measured in a peptidomics experiment are located in their
//! parent proteins, the bonds at both of their termini are tested against
//! a catalog of protease cleavage rules, and intensities are summed per
//! enzyme and per uncleaved ("orphan") residue for each sample or protein.
mod aggregate;
mod config;
mod dataset;
mod enzyme;
mod fasta;
mod parser;
mod protein;
mod uniprot;

pub use aggregate::{aggregate, pivot, Bucket, GroupBy, PivotTable, Summary};
pub use config::AnalysisConfig;
pub use dataset::Dataset;
pub use enzyme::{Catalog, Class, CleavageRule, Cleavages, Enzyme, Motif, Selection};
pub use fasta::LINE_WIDTH;
pub use parser::{Error, Parser, RowError, Skipped};
pub use protein::{Context, Location, Peptide, Protein, ProteinLibrary, Residue, Window, SENTINEL};
pub use uniprot::{Error as UniprotError, UniprotRecord};

/// Import a comma-delimited measurement file against a FASTA protein
/// library, classifying each peptide with the named enzymes (an empty list
/// enables every enzyme in the catalog)
pub fn import_dataset<S: AsRef<str>>(
    csv: &str,
    fasta: &str,
    enzymes: &[S],
) -> Result<Dataset, Error> {
    let selection = Selection::from_names(enzymes)?;
    let library = fasta::parse(fasta);
    Parser::new(csv, &library, &selection).parse()
}
