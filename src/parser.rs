//! Import peptide measurements from delimited text
//!
use super::*;

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Reason a single measurement row was skipped during import
#[derive(Error, Clone, PartialEq, Debug)]
pub enum RowError {
    /// The row's protein id is not in the library
    #[error("accession `{0}` was not included in the library")]
    UnknownAccession(String),
    /// The peptide is not a literal substring of its protein
    #[error("sequence `{sequence}` not found in protein `{accession}`")]
    SequenceNotFound { sequence: String, accession: String },
    /// Required column missing from the header, or empty in this row
    #[error("missing value for column `{column}`")]
    MissingValue { column: &'static str },
    /// A numeric column could not be converted
    #[error("invalid value `{value}` for column `{column}`")]
    Conversion { column: &'static str, value: String },
}

/// A row that was dropped, and why
#[derive(Clone, PartialEq, Debug)]
pub struct Skipped {
    /// One-based line number in the input
    pub line: usize,
    pub reason: RowError,
}

/// Error that aborts an import or export
#[derive(Error, Debug)]
pub enum Error {
    #[error("no recognised column in header at line {line}: expected at least one of sequence, intensity, protein_id, sample_id")]
    MalformedHeader { line: usize },
    #[error("no peptides found in {rows} data rows, check file format{}", describe(.first))]
    EmptyResult { rows: usize, first: Option<Skipped> },
    #[error("unknown enzyme `{0}`")]
    InvalidEnzymeSelection(String),
    #[error("error reading delimited input: {0}")]
    Csv(#[from] csv::Error),
    #[error("error writing output: {0}")]
    Io(#[from] std::io::Error),
}

fn describe(first: &Option<Skipped>) -> String {
    match first {
        Some(s) => format!(" (first skipped row at line {}: {})", s.line, s.reason),
        None => String::new(),
    }
}

/// Column positions recognised in the header row
#[derive(Debug, Default, Clone, PartialEq)]
struct Header {
    sequence: Option<usize>,
    intensity: Option<usize>,
    protein_id: Option<usize>,
    sample_id: Option<usize>,
    rt: Option<usize>,
}

impl Header {
    fn from_record(record: &StringRecord) -> Header {
        let mut header = Header::default();
        for (idx, name) in record.iter().enumerate() {
            let slot = match name.trim().to_ascii_lowercase().as_str() {
                "sequence" => &mut header.sequence,
                "intensity" => &mut header.intensity,
                "protein_id" => &mut header.protein_id,
                "sample_id" => &mut header.sample_id,
                "rt" => &mut header.rt,
                _ => continue,
            };
            if slot.is_some() {
                warn!("column `{}` appears more than once in header, using the last", name);
            }
            *slot = Some(idx);
        }
        header
    }

    fn recognised(&self) -> bool {
        self.sequence.is_some()
            || self.intensity.is_some()
            || self.protein_id.is_some()
            || self.sample_id.is_some()
    }
}

fn field<'r>(
    record: &'r StringRecord,
    column: Option<usize>,
    name: &'static str,
) -> Result<&'r str, RowError> {
    column
        .and_then(|idx| record.get(idx))
        .filter(|value| !value.is_empty())
        .ok_or(RowError::MissingValue { column: name })
}

fn number(value: &str, name: &'static str) -> Result<f64, RowError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RowError::Conversion {
            column: name,
            value: value.into(),
        })
}

fn is_comment(record: &StringRecord) -> bool {
    record.get(0).map_or(false, |first| first.starts_with('#'))
}

pub struct Parser<'s> {
    input: &'s str,
    library: &'s ProteinLibrary,
    selection: &'s Selection,
}

impl<'s> Parser<'s> {
    /// Create a new parser operating on comma-delimited input data
    pub fn new(
        input: &'s str,
        library: &'s ProteinLibrary,
        selection: &'s Selection,
    ) -> Parser<'s> {
        Parser {
            input,
            library,
            selection,
        }
    }

    fn parse_peptide(&self, header: &Header, record: &StringRecord) -> Result<Peptide, RowError> {
        let sequence = field(record, header.sequence, "sequence")?;
        let intensity = field(record, header.intensity, "intensity")?;
        let intensity = number(intensity, "intensity").and_then(|v| {
            if v < 0.0 {
                Err(RowError::Conversion {
                    column: "intensity",
                    value: intensity.into(),
                })
            } else {
                Ok(v)
            }
        })?;
        let sample_id = field(record, header.sample_id, "sample_id")?;
        let protein_id = field(record, header.protein_id, "protein_id")?;
        // an empty retention time cell is treated as absent
        let rt = match header.rt.and_then(|idx| record.get(idx)) {
            Some(value) if !value.is_empty() => Some(number(value, "rt")?),
            _ => None,
        };

        Peptide::new(
            sequence,
            protein_id,
            intensity,
            rt,
            sample_id,
            self.library,
            self.selection,
        )
    }

    pub fn parse(self) -> Result<Dataset, Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(self.input.as_bytes());

        let mut header = None;
        let mut peptides = Vec::new();
        let mut skipped = Vec::new();
        let mut rows = 0;

        for record in reader.records() {
            let record = record?;
            let line = record.position().map(|p| p.line() as usize).unwrap_or(0);

            let header = match &header {
                Some(header) => header,
                // comments are only recognised above the header
                None if is_comment(&record) => continue,
                None => {
                    let parsed = Header::from_record(&record);
                    if !parsed.recognised() {
                        return Err(Error::MalformedHeader { line });
                    }
                    debug!("header at line {}: {:?}", line, parsed);
                    header = Some(parsed);
                    continue;
                }
            };

            rows += 1;
            match self.parse_peptide(header, &record) {
                Ok(peptide) => peptides.push(peptide),
                Err(reason) => {
                    debug!("skipping line {}: {}", line, reason);
                    skipped.push(Skipped { line, reason });
                }
            }
        }

        if header.is_none() {
            return Err(Error::MalformedHeader { line: 0 });
        }

        info!(
            "imported {} peptides from {} rows ({} skipped)",
            peptides.len(),
            rows,
            skipped.len()
        );

        if peptides.is_empty() {
            return Err(Error::EmptyResult {
                rows,
                first: skipped.into_iter().next(),
            });
        }

        Ok(Dataset {
            peptides,
            skipped,
            selection: self.selection.clone(),
        })
    }
}
