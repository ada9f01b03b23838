//! Parse UniProtKB flat file (`.txt`) entries into proteins
//!
//! Only the parts needed to build a protein library are read: the primary
//! accession, the entry name, the `SQ` sequence block and any `FT SIGNAL`
//! feature. Fetching the entry is left to the caller.
use super::*;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error as ThisError;

lazy_static! {
    static ref ENTRY_NAME: Regex = Regex::new(r"(?m)^ID\s+(\S+)").unwrap();
    static ref ACCESSION: Regex = Regex::new(r"(?m)^AC\s+([^;\s]+)").unwrap();
    static ref SEQUENCE_HEADER: Regex =
        Regex::new(r"(?m)^SQ\s+SEQUENCE\s+(\d+)\s+AA;").unwrap();
    /// Matches both `1..18` and the older `1     18` column layout
    static ref SIGNAL: Regex =
        Regex::new(r"(?m)^FT\s+SIGNAL\s+[<?]?(\d+)(?:\.\.|\s+)[>?]?(\d+)").unwrap();
}

#[derive(ThisError, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("entry has neither an AC nor an ID line")]
    MissingAccession,
    #[error("sequence length not found in SQ section")]
    MissingSequence,
    #[error("invalid sequence length `{0}` in SQ section")]
    InvalidLength(String),
    #[error("sequence length {found} does not match SQ annotation {declared}")]
    LengthMismatch { declared: usize, found: usize },
    #[error("signal peptide ends at {end}, beyond the sequence length {length}")]
    SignalOutOfRange { end: usize, length: usize },
}

/// A single UniProtKB entry
#[derive(Debug, Clone, PartialEq)]
pub struct UniprotRecord {
    /// Primary accession
    pub accession: String,
    /// Entry name, e.g. `FETUA_BOVIN`
    pub name: String,
    /// Mature sequence if the signal peptide was cut, otherwise the full
    /// sequence
    pub sequence: String,
    /// One-based, inclusive span of the annotated signal peptide
    pub signal: Option<(usize, usize)>,
}

impl UniprotRecord {
    /// Parse one entry. With `cut_signal`, residues up to the end of the
    /// last annotated signal peptide are removed.
    pub fn parse(input: &str, cut_signal: bool) -> Result<UniprotRecord, Error> {
        let name = ENTRY_NAME
            .captures(input)
            .map(|c| c[1].to_string())
            .unwrap_or_default();
        let accession = ACCESSION
            .captures(input)
            .map(|c| c[1].to_string())
            .or_else(|| Some(name.clone()).filter(|n| !n.is_empty()))
            .ok_or(Error::MissingAccession)?;

        let header = SEQUENCE_HEADER
            .captures(input)
            .ok_or(Error::MissingSequence)?;
        let declared = header[1]
            .parse::<usize>()
            .map_err(|_| Error::InvalidLength(header[1].to_string()))?;

        let body = &input[header.get(0).map(|m| m.end()).unwrap_or(0)..];
        let mut sequence = String::with_capacity(declared);
        for line in body.lines().skip(1) {
            if line.starts_with("//") {
                break;
            }
            sequence.extend(line.chars().filter(char::is_ascii_alphabetic));
        }
        if sequence.len() != declared {
            return Err(Error::LengthMismatch {
                declared,
                found: sequence.len(),
            });
        }

        let signal = SIGNAL
            .captures_iter(input)
            .filter_map(|c| {
                let start = c[1].parse::<usize>().ok()?;
                let end = c[2].parse::<usize>().ok()?;
                Some((start, end))
            })
            .last();

        if cut_signal {
            if let Some((_, end)) = signal {
                if end > sequence.len() {
                    return Err(Error::SignalOutOfRange {
                        end,
                        length: sequence.len(),
                    });
                }
                sequence.replace_range(..end, "");
            }
        }

        Ok(UniprotRecord {
            accession,
            name,
            sequence,
            signal,
        })
    }

    /// Parse every `//`-terminated entry in `input`
    pub fn parse_all(input: &str, cut_signal: bool) -> Result<Vec<UniprotRecord>, Error> {
        input
            .split("\n//")
            .filter(|entry| !entry.trim().is_empty())
            .map(|entry| UniprotRecord::parse(entry, cut_signal))
            .collect()
    }

    pub fn to_protein(&self) -> Protein {
        Protein::new(self.accession.as_str(), self.name.as_str(), &self.sequence)
    }
}
