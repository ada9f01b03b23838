use super::*;
use indexmap::IndexMap;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder for window positions outside of the protein
pub const SENTINEL: u8 = b'_';

/// The 20 standard amino acids, declared in export order
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Residue {
    A,
    G,
    P,
    V,
    L,
    I,
    M,
    C,
    F,
    Y,
    W,
    H,
    K,
    R,
    Q,
    N,
    E,
    D,
    S,
    T,
}

impl Residue {
    pub const ALL: [Residue; 20] = [
        Residue::A,
        Residue::G,
        Residue::P,
        Residue::V,
        Residue::L,
        Residue::I,
        Residue::M,
        Residue::C,
        Residue::F,
        Residue::Y,
        Residue::W,
        Residue::H,
        Residue::K,
        Residue::R,
        Residue::Q,
        Residue::N,
        Residue::E,
        Residue::D,
        Residue::S,
        Residue::T,
    ];

    /// Returns `None` for the sentinel and for non-standard letters
    pub fn from_byte(b: u8) -> Option<Residue> {
        Residue::ALL
            .iter()
            .find(|r| r.as_char() as u8 == b.to_ascii_uppercase())
            .copied()
    }

    pub fn as_char(self) -> char {
        match self {
            Residue::A => 'A',
            Residue::G => 'G',
            Residue::P => 'P',
            Residue::V => 'V',
            Residue::L => 'L',
            Residue::I => 'I',
            Residue::M => 'M',
            Residue::C => 'C',
            Residue::F => 'F',
            Residue::Y => 'Y',
            Residue::W => 'W',
            Residue::H => 'H',
            Residue::K => 'K',
            Residue::R => 'R',
            Residue::Q => 'Q',
            Residue::N => 'N',
            Residue::E => 'E',
            Residue::D => 'D',
            Residue::S => 'S',
            Residue::T => 'T',
        }
    }
}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Four characters `[P2, P1, P1', P2']` straddling a bond between P1 and P1'
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Window([u8; 4]);

impl Window {
    /// Window around the bond preceding `bytes[bond]`, padded with the
    /// sentinel where it runs off either end
    pub fn around(bytes: &[u8], bond: usize) -> Window {
        let at = |offset: isize| -> u8 {
            if offset < 0 {
                return SENTINEL;
            }
            bytes.get(offset as usize).copied().unwrap_or(SENTINEL)
        };
        let b = bond as isize;
        Window([at(b - 2), at(b - 1), at(b), at(b + 1)])
    }

    /// Build a window from literal text, e.g. `"_MAK"`
    pub fn parse(s: &str) -> Option<Window> {
        match s.as_bytes() {
            &[a, b, c, d] if s.is_ascii() => Some(Window([a, b, c, d])),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    /// The residue immediately before the bond
    pub fn p1(&self) -> u8 {
        self.0[1]
    }

    /// The residue immediately after the bond
    pub fn p1_prime(&self) -> u8 {
        self.0[2]
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for &b in &self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// The flanking sequence of a located peptide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    flanked: String,
    n_terminal: Window,
    c_terminal: Window,
}

impl Context {
    fn new(protein: &[u8], start: usize, end: usize) -> Context {
        let n_terminal = Window::around(protein, start);
        let c_terminal = Window::around(protein, end);
        let mut flanked = String::with_capacity(end - start + 4);
        flanked.extend(n_terminal.as_bytes()[..2].iter().map(|&b| b as char));
        flanked.extend(protein[start..end].iter().map(|&b| b as char));
        flanked.extend(c_terminal.as_bytes()[2..].iter().map(|&b| b as char));
        Context {
            flanked,
            n_terminal,
            c_terminal,
        }
    }

    /// Window around the peptide's N-terminal bond
    pub fn n_terminal(&self) -> &Window {
        &self.n_terminal
    }

    /// Window around the peptide's C-terminal bond
    pub fn c_terminal(&self) -> &Window {
        &self.c_terminal
    }

    /// Two flanking residues, the peptide, and two flanking residues
    pub fn as_str(&self) -> &str {
        &self.flanked
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.flanked)
    }
}

/// Position of a peptide within its parent protein
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Zero-based, inclusive
    pub start: usize,
    /// Zero-based, exclusive
    pub end: usize,
    pub context: Context,
}

#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
/// A single protein sequence record
pub struct Protein {
    /// Uniprot accession identifier
    pub accession: String,
    /// Long-form description
    pub description: String,
    /// Upper-case residue sequence
    pub sequence: String,
}

impl Protein {
    /// Create a new protein. Letters in `sequence` are upper-cased, anything
    /// else (whitespace, digits, terminal `*`) is dropped.
    pub fn new<A: Into<String>, D: Into<String>>(
        accession: A,
        description: D,
        sequence: &str,
    ) -> Protein {
        Protein {
            accession: accession.into(),
            description: description.into(),
            sequence: sequence
                .chars()
                .filter(char::is_ascii_alphabetic)
                .map(|c| c.to_ascii_uppercase())
                .collect(),
        }
    }
}

/// Collection of protein sequences keyed by accession, in insertion order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProteinLibrary {
    proteins: IndexMap<String, Protein>,
}

impl ProteinLibrary {
    pub fn new() -> ProteinLibrary {
        ProteinLibrary::default()
    }

    /// Add a protein, returning any previous record with the same accession
    pub fn insert(&mut self, protein: Protein) -> Option<Protein> {
        self.proteins.insert(protein.accession.clone(), protein)
    }

    pub fn get(&self, accession: &str) -> Option<&Protein> {
        self.proteins.get(accession)
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Protein> {
        self.proteins.values()
    }

    /// Find the first literal occurrence of `sequence` in the protein
    /// identified by `accession`
    pub fn locate(&self, sequence: &str, accession: &str) -> Result<Location, RowError> {
        let protein = self
            .get(accession)
            .ok_or_else(|| RowError::UnknownAccession(accession.into()))?;
        let not_found = || RowError::SequenceNotFound {
            sequence: sequence.into(),
            accession: accession.into(),
        };
        if sequence.is_empty() {
            return Err(not_found());
        }
        let start = protein.sequence.find(sequence).ok_or_else(not_found)?;
        let end = start + sequence.len();
        Ok(Location {
            start,
            end,
            context: Context::new(protein.sequence.as_bytes(), start, end),
        })
    }
}

impl FromIterator<Protein> for ProteinLibrary {
    fn from_iter<I: IntoIterator<Item = Protein>>(iter: I) -> Self {
        let mut library = ProteinLibrary::new();
        for protein in iter {
            library.insert(protein);
        }
        library
    }
}

#[cfg_attr(feature = "serialization", derive(Serialize))]
#[derive(Debug, Clone, PartialEq)]
/// An observed peptide that has been located in its protein and classified
pub struct Peptide {
    /// Peptide sequence
    pub sequence: String,
    /// Accession of the parent protein
    pub accession: String,
    /// Measured intensity
    pub intensity: f64,
    pub retention_time: Option<f64>,
    pub sample_id: String,
    pub start: usize,
    pub end: usize,
    #[cfg_attr(feature = "serialization", serde(serialize_with = "context_str"))]
    pub context: Context,
    /// Enzymes that can produce the N-terminal cleavage
    pub n_matches: Vec<Enzyme>,
    /// Enzymes that can produce the C-terminal cleavage
    pub c_matches: Vec<Enzyme>,
}

#[cfg(feature = "serialization")]
fn context_str<S: serde::Serializer>(context: &Context, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(context.as_str())
}

impl Peptide {
    /// Locate `sequence` within `library` and classify both of its termini
    /// against the enzymes in `selection`
    pub fn new(
        sequence: &str,
        accession: &str,
        intensity: f64,
        retention_time: Option<f64>,
        sample_id: &str,
        library: &ProteinLibrary,
        selection: &Selection,
    ) -> Result<Peptide, RowError> {
        let Location {
            start,
            end,
            context,
        } = library.locate(sequence, accession)?;
        let Cleavages {
            n_matches,
            c_matches,
        } = selection.classify(&context);
        Ok(Peptide {
            sequence: sequence.into(),
            accession: accession.into(),
            intensity,
            retention_time,
            sample_id: sample_id.into(),
            start,
            end,
            context,
            n_matches,
            c_matches,
        })
    }

    /// Value of the attribute used to group this peptide
    pub fn group_key(&self, group_by: GroupBy) -> &str {
        match group_by {
            GroupBy::Sample => &self.sample_id,
            GroupBy::Accession => &self.accession,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn library() -> ProteinLibrary {
        vec![
            Protein::new("P1", "test protein", "MAKRGFLWPQ"),
            Protein::new("P2", "", "mkw\nlls*"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn normalize_sequence() {
        let lib = library();
        assert_eq!(lib.get("P2").unwrap().sequence, "MKWLLS");
        assert_eq!(lib.len(), 2);
    }

    #[test]
    fn locate_example() {
        let loc = library().locate("AKRG", "P1").unwrap();
        assert_eq!((loc.start, loc.end), (1, 5));
        assert_eq!(loc.context.as_str(), "_MAKRGFL");
        assert_eq!(loc.context.n_terminal().to_string(), "_MAK");
        assert_eq!(loc.context.c_terminal().to_string(), "RGFL");
    }

    #[test]
    fn locate_edges() {
        let lib = library();
        let loc = lib.locate("MAKRGFLWPQ", "P1").unwrap();
        assert_eq!(loc.context.as_str(), "__MAKRGFLWPQ__");
        assert_eq!(loc.context.n_terminal().to_string(), "__MA");
        assert_eq!(loc.context.c_terminal().to_string(), "PQ__");

        let loc = lib.locate("Q", "P1").unwrap();
        assert_eq!(loc.context.n_terminal().to_string(), "WPQ_");
        assert_eq!(loc.context.c_terminal().to_string(), "PQ__");
    }

    #[test]
    fn locate_failures() {
        let lib = library();
        assert_eq!(
            lib.locate("AKRG", "P9"),
            Err(RowError::UnknownAccession("P9".into()))
        );
        assert!(matches!(
            lib.locate("GGG", "P1"),
            Err(RowError::SequenceNotFound { .. })
        ));
        assert!(lib.locate("", "P1").is_err());
    }

    #[test]
    fn every_substring_located() {
        let seq = "MAKRGFLWPQAKRG";
        let lib: ProteinLibrary = vec![Protein::new("X", "", seq)].into_iter().collect();
        for start in 0..seq.len() {
            for end in start + 1..=seq.len() {
                let sub = &seq[start..end];
                let loc = lib.locate(sub, "X").unwrap();
                assert_eq!(&seq[loc.start..loc.end], sub);
                assert!(loc.start <= start);
                assert_eq!(loc.context.as_str().len(), sub.len() + 4);

                for (window, bond) in [
                    (loc.context.n_terminal(), loc.start),
                    (loc.context.c_terminal(), loc.end),
                ]
                .iter()
                {
                    assert_eq!(window.as_bytes().len(), 4);
                    for (i, &b) in window.as_bytes().iter().enumerate() {
                        let offset = *bond as isize - 2 + i as isize;
                        let outside = offset < 0 || offset >= seq.len() as isize;
                        assert_eq!(b == SENTINEL, outside);
                    }
                }
            }
        }
    }

    #[test]
    fn residues() {
        assert_eq!(Residue::from_byte(b'k'), Some(Residue::K));
        assert_eq!(Residue::from_byte(SENTINEL), None);
        assert_eq!(Residue::from_byte(b'X'), None);
        for (i, r) in Residue::ALL.iter().enumerate() {
            assert_eq!(*r as usize, i);
        }
    }

    #[test]
    fn window_parse() {
        assert!(Window::parse("_MAK").is_some());
        assert!(Window::parse("MAK").is_none());
        assert!(Window::parse("MAKRG").is_none());
    }
}
