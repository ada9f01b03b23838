//! Protease cleavage rules and the process-wide catalog
//!
//! Every rule is a set of motifs over a four residue window
//! `[P2, P1, P1', P2']`, with the scissile bond between P1 and P1'. A rule
//! matches a window if any of its motifs does.
use super::*;
use lazy_static::lazy_static;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Proteases known to the catalog, declared in catalog order
pub enum Enzyme {
    #[cfg_attr(feature = "serialization", serde(rename = "Arg-C proteinase"))]
    ArgC,
    #[cfg_attr(feature = "serialization", serde(rename = "Asp-N endopeptidase"))]
    AspN,
    #[cfg_attr(feature = "serialization", serde(rename = "BNPS-Skatole"))]
    BnpsSkatole,
    #[cfg_attr(
        feature = "serialization",
        serde(rename = "Chymotrypsin low-specificity")
    )]
    ChymotrypsinLow,
    #[cfg_attr(
        feature = "serialization",
        serde(rename = "Chymotrypsin high-specificity")
    )]
    ChymotrypsinHigh,
    #[cfg_attr(feature = "serialization", serde(rename = "Pepsin"))]
    Pepsin,
    #[cfg_attr(feature = "serialization", serde(rename = "Plasmin"))]
    Plasmin,
    #[cfg_attr(feature = "serialization", serde(rename = "Cathepsin D"))]
    CathepsinD,
    #[cfg_attr(feature = "serialization", serde(rename = "Thrombin"))]
    Thrombin,
    #[cfg_attr(feature = "serialization", serde(rename = "Elastase"))]
    Elastase,
    #[cfg_attr(feature = "serialization", serde(rename = "Trypsin"))]
    Trypsin,
}

impl Enzyme {
    pub const ALL: [Enzyme; 11] = [
        Enzyme::ArgC,
        Enzyme::AspN,
        Enzyme::BnpsSkatole,
        Enzyme::ChymotrypsinLow,
        Enzyme::ChymotrypsinHigh,
        Enzyme::Pepsin,
        Enzyme::Plasmin,
        Enzyme::CathepsinD,
        Enzyme::Thrombin,
        Enzyme::Elastase,
        Enzyme::Trypsin,
    ];

    /// Display name, as used in input selections and exported tables
    pub fn name(self) -> &'static str {
        match self {
            Enzyme::ArgC => "Arg-C proteinase",
            Enzyme::AspN => "Asp-N endopeptidase",
            Enzyme::BnpsSkatole => "BNPS-Skatole",
            Enzyme::ChymotrypsinLow => "Chymotrypsin low-specificity",
            Enzyme::ChymotrypsinHigh => "Chymotrypsin high-specificity",
            Enzyme::Pepsin => "Pepsin",
            Enzyme::Plasmin => "Plasmin",
            Enzyme::CathepsinD => "Cathepsin D",
            Enzyme::Thrombin => "Thrombin",
            Enzyme::Elastase => "Elastase",
            Enzyme::Trypsin => "Trypsin",
        }
    }

    /// The rule for this enzyme in the global catalog
    pub fn rule(self) -> &'static CleavageRule {
        Catalog::global().rule(self)
    }
}

impl fmt::Display for Enzyme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Enzyme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if let Some(enzyme) = Enzyme::ALL
            .iter()
            .find(|e| e.name().eq_ignore_ascii_case(name))
        {
            return Ok(*enzyme);
        }
        match name.to_ascii_lowercase().as_str() {
            "chymotrypsin (low)" => Ok(Enzyme::ChymotrypsinLow),
            "chymotrypsin (high)" => Ok(Enzyme::ChymotrypsinHigh),
            _ => Err(Error::InvalidEnzymeSelection(name.into())),
        }
    }
}

/// Set of characters accepted at a single window position
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Class {
    /// Anything, including the out-of-bounds sentinel
    Any,
    /// Any residue letter
    Residue,
    /// One of the listed residues
    OneOf(&'static [u8]),
    /// A residue letter that is none of the listed residues
    NoneOf(&'static [u8]),
}

impl Class {
    #[inline]
    pub fn accepts(self, b: u8) -> bool {
        match self {
            Class::Any => true,
            Class::Residue => is_residue(b),
            Class::OneOf(set) => set.contains(&b),
            Class::NoneOf(set) => is_residue(b) && !set.contains(&b),
        }
    }
}

#[inline]
fn is_residue(b: u8) -> bool {
    b.is_ascii_uppercase()
}

/// One alternative of a cleavage rule: a class for each of
/// `[P2, P1, P1', P2']`
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Motif([Class; 4]);

impl Motif {
    /// Motif constraining only the residues either side of the bond
    const fn bond(p1: Class, p1_prime: Class) -> Motif {
        Motif([Class::Any, p1, p1_prime, Class::Any])
    }

    pub fn matches(&self, window: &Window) -> bool {
        self.0
            .iter()
            .zip(window.as_bytes())
            .all(|(class, &b)| class.accepts(b))
    }
}

/// Cleavage specificity of a single protease
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleavageRule {
    pub enzyme: Enzyme,
    motifs: Vec<Motif>,
}

impl CleavageRule {
    fn new(enzyme: Enzyme) -> CleavageRule {
        use Class::*;
        let motifs = match enzyme {
            Enzyme::ArgC => vec![Motif::bond(OneOf(b"R"), Residue)],
            Enzyme::AspN => vec![Motif::bond(Residue, OneOf(b"D"))],
            Enzyme::BnpsSkatole => vec![Motif::bond(OneOf(b"W"), Residue)],
            Enzyme::ChymotrypsinLow => vec![
                Motif::bond(OneOf(b"LYF"), NoneOf(b"P")),
                Motif::bond(OneOf(b"W"), NoneOf(b"MP")),
                Motif::bond(OneOf(b"M"), NoneOf(b"PW")),
                Motif::bond(OneOf(b"H"), NoneOf(b"DMPW")),
            ],
            Enzyme::ChymotrypsinHigh => vec![
                Motif::bond(OneOf(b"YF"), NoneOf(b"P")),
                Motif::bond(OneOf(b"W"), NoneOf(b"MP")),
            ],
            Enzyme::Pepsin => vec![
                Motif::bond(OneOf(b"FWYL"), Residue),
                Motif::bond(Residue, OneOf(b"FWYL")),
            ],
            Enzyme::Plasmin => vec![Motif::bond(OneOf(b"KR"), Residue)],
            Enzyme::CathepsinD => vec![Motif::bond(OneOf(b"AVLIPMFW"), OneOf(b"AVLIPMF"))],
            Enzyme::Thrombin => vec![
                Motif([OneOf(b"R"), OneOf(b"G"), Residue, Any]),
                Motif::bond(OneOf(b"G"), OneOf(b"R")),
            ],
            Enzyme::Elastase => vec![Motif::bond(OneOf(b"AVLIGR"), OneOf(b"GPALF"))],
            Enzyme::Trypsin => vec![Motif::bond(OneOf(b"KR"), NoneOf(b"P"))],
        };
        CleavageRule { enzyme, motifs }
    }

    /// Does the enzyme cut between P1 and P1' of `window`?
    pub fn matches(&self, window: &Window) -> bool {
        self.motifs.iter().any(|m| m.matches(window))
    }

    /// Anchored at the peptide's N-terminal bond
    pub fn matches_n_terminal(&self, context: &Context) -> bool {
        self.matches(context.n_terminal())
    }

    /// Anchored at the peptide's C-terminal bond
    pub fn matches_c_terminal(&self, context: &Context) -> bool {
        self.matches(context.c_terminal())
    }

    /// Return every bond index `i` in `sequence` (the bond between residues
    /// `i - 1` and `i`) that this enzyme can cleave
    pub fn sites(&self, sequence: &str) -> Vec<usize> {
        let bytes = sequence.as_bytes();
        (1..bytes.len())
            .filter(|&i| self.matches(&Window::around(bytes, i)))
            .collect()
    }
}

/// Immutable table of every known cleavage rule
#[derive(Debug)]
pub struct Catalog {
    rules: Vec<CleavageRule>,
}

lazy_static! {
    static ref CATALOG: Catalog = Catalog::build();
}

impl Catalog {
    fn build() -> Catalog {
        Catalog {
            rules: Enzyme::ALL.iter().map(|&e| CleavageRule::new(e)).collect(),
        }
    }

    /// The shared catalog, constructed on first use
    pub fn global() -> &'static Catalog {
        &CATALOG
    }

    pub fn rule(&self, enzyme: Enzyme) -> &CleavageRule {
        // rules are stored in declaration order
        &self.rules[enzyme as usize]
    }

    pub fn rules(&self) -> impl Iterator<Item = &CleavageRule> {
        self.rules.iter()
    }
}

/// Result of classifying a peptide's two termini
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cleavages {
    pub n_matches: Vec<Enzyme>,
    pub c_matches: Vec<Enzyme>,
}

/// The subset of the catalog enabled for an analysis, kept in catalog order
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    enzymes: Vec<Enzyme>,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::all()
    }
}

impl Selection {
    pub fn all() -> Selection {
        Selection {
            enzymes: Enzyme::ALL.to_vec(),
        }
    }

    /// Build a selection from a set of enzymes. An empty set enables the
    /// whole catalog.
    pub fn new<I: IntoIterator<Item = Enzyme>>(enzymes: I) -> Selection {
        let mut enzymes = enzymes.into_iter().collect::<Vec<_>>();
        if enzymes.is_empty() {
            return Selection::all();
        }
        enzymes.sort();
        enzymes.dedup();
        Selection { enzymes }
    }

    /// Resolve display names, failing on the first name not in the catalog
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Selection, Error> {
        let enzymes = names
            .iter()
            .map(|n| n.as_ref().parse::<Enzyme>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Selection::new(enzymes))
    }

    pub fn enzymes(&self) -> &[Enzyme] {
        &self.enzymes
    }

    pub fn contains(&self, enzyme: Enzyme) -> bool {
        self.enzymes.contains(&enzyme)
    }

    /// Test every enabled rule against both termini of a located peptide
    pub fn classify(&self, context: &Context) -> Cleavages {
        let catalog = Catalog::global();
        let mut cleavages = Cleavages::default();
        for &enzyme in &self.enzymes {
            let rule = catalog.rule(enzyme);
            if rule.matches_n_terminal(context) {
                cleavages.n_matches.push(enzyme);
            }
            if rule.matches_c_terminal(context) {
                cleavages.c_matches.push(enzyme);
            }
        }
        cleavages
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn cuts(enzyme: Enzyme, window: &str) -> bool {
        enzyme.rule().matches(&Window::parse(window).unwrap())
    }

    #[test]
    fn catalog_order() {
        let catalog = Catalog::global();
        for (rule, enzyme) in catalog.rules().zip(Enzyme::ALL.iter()) {
            assert_eq!(rule.enzyme, *enzyme);
            assert_eq!(catalog.rule(*enzyme).enzyme, *enzyme);
        }
        assert_eq!(catalog.rules().count(), 11);
    }

    #[test]
    fn names() {
        for enzyme in Enzyme::ALL.iter() {
            assert_eq!(enzyme.name().parse::<Enzyme>().unwrap(), *enzyme);
        }
        assert_eq!("trypsin".parse::<Enzyme>().unwrap(), Enzyme::Trypsin);
        assert_eq!(
            "Chymotrypsin (low)".parse::<Enzyme>().unwrap(),
            Enzyme::ChymotrypsinLow
        );
        assert!(matches!(
            "Papain".parse::<Enzyme>(),
            Err(Error::InvalidEnzymeSelection(n)) if n == "Papain"
        ));
    }

    #[test]
    fn trypsin() {
        assert!(cuts(Enzyme::Trypsin, "AKAA"));
        assert!(cuts(Enzyme::Trypsin, "_RG_"));
        assert!(!cuts(Enzyme::Trypsin, "AKPA"));
        assert!(!cuts(Enzyme::Trypsin, "AK__"));
        assert!(!cuts(Enzyme::Trypsin, "AAKA"));
    }

    #[test]
    fn simple_residue_rules() {
        assert!(cuts(Enzyme::ArgC, "_RP_"));
        assert!(!cuts(Enzyme::ArgC, "_KP_"));
        assert!(cuts(Enzyme::AspN, "AADA"));
        assert!(!cuts(Enzyme::AspN, "ADAA"));
        assert!(!cuts(Enzyme::AspN, "__D_"));
        assert!(cuts(Enzyme::BnpsSkatole, "_WA_"));
        assert!(cuts(Enzyme::Plasmin, "AKPA"));
        assert!(cuts(Enzyme::Plasmin, "ARPA"));
    }

    #[test]
    fn chymotrypsin() {
        let low = Enzyme::ChymotrypsinLow;
        let high = Enzyme::ChymotrypsinHigh;
        assert!(cuts(low, "ALAA") && !cuts(low, "ALPA"));
        assert!(cuts(low, "AWAA") && !cuts(low, "AWMA") && !cuts(low, "AWPA"));
        assert!(cuts(low, "AMAA") && !cuts(low, "AMWA"));
        assert!(cuts(low, "AHAA"));
        for p1_prime in ["D", "M", "P", "W"].iter() {
            assert!(!cuts(low, &format!("AH{}A", p1_prime)));
        }
        assert!(cuts(high, "AYAA") && cuts(high, "AFAA"));
        assert!(!cuts(high, "ALAA"));
        assert!(!cuts(high, "AMAA"));
        assert!(!cuts(high, "AFPA"));
        assert!(cuts(high, "AWAA") && !cuts(high, "AWMA"));
    }

    #[test]
    fn pepsin_either_side() {
        assert!(cuts(Enzyme::Pepsin, "AFAA"));
        assert!(cuts(Enzyme::Pepsin, "AAFA"));
        assert!(!cuts(Enzyme::Pepsin, "FAAF"));
        assert!(!cuts(Enzyme::Pepsin, "_F__"));
    }

    #[test]
    fn cathepsin_elastase() {
        assert!(cuts(Enzyme::CathepsinD, "AWFA"));
        assert!(!cuts(Enzyme::CathepsinD, "AFWA"));
        assert!(cuts(Enzyme::Elastase, "GRPG"));
        assert!(!cuts(Enzyme::Elastase, "GKPG"));
    }

    #[test]
    fn thrombin() {
        assert!(cuts(Enzyme::Thrombin, "RGAA"));
        assert!(cuts(Enzyme::Thrombin, "AGRA"));
        assert!(!cuts(Enzyme::Thrombin, "AGA_"));
        assert!(!cuts(Enzyme::Thrombin, "RG__"));
    }

    #[test]
    fn sentinel_never_a_residue() {
        for rule in Catalog::global().rules() {
            assert!(!rule.matches(&Window::parse("____").unwrap()));
            assert!(!rule.matches(&Window::parse("AA__").unwrap()));
            assert!(!rule.matches(&Window::parse("__AA").unwrap()));
        }
    }

    #[test]
    fn sites_anywhere() {
        let rule = Enzyme::Trypsin.rule();
        assert_eq!(rule.sites("MAKRPGKLR"), vec![3, 7]);
        assert_eq!(rule.sites("K"), Vec::<usize>::new());
        assert_eq!(Enzyme::AspN.rule().sites("DAD"), vec![2]);
    }

    #[test]
    fn selection() {
        let sel = Selection::from_names(&["Trypsin", "Arg-C proteinase", "trypsin"]).unwrap();
        assert_eq!(sel.enzymes(), &[Enzyme::ArgC, Enzyme::Trypsin]);
        assert_eq!(Selection::from_names::<&str>(&[]).unwrap(), Selection::all());
        assert!(Selection::from_names(&["Trypsin", "nope"]).is_err());
    }

    #[test]
    fn subset_classification_is_subset() {
        let library = ProteinLibrary::from_iter(vec![Protein::new(
            "P1",
            "",
            "MKRGDPWLYFHAKPGRAVLIDSTEQN",
        )]);
        let protein = library.get("P1").unwrap().sequence.clone();
        let subset = Selection::new(vec![Enzyme::Trypsin, Enzyme::Pepsin, Enzyme::Thrombin]);
        for start in 0..protein.len() {
            for end in start + 1..=protein.len() {
                let loc = library.locate(&protein[start..end], "P1").unwrap();
                let full = Selection::all().classify(&loc.context);
                let part = subset.classify(&loc.context);
                for e in &part.n_matches {
                    assert!(full.n_matches.contains(e));
                }
                for e in &part.c_matches {
                    assert!(full.c_matches.contains(e));
                }
                let expected_n = full
                    .n_matches
                    .iter()
                    .filter(|e| subset.contains(**e))
                    .cloned()
                    .collect::<Vec<_>>();
                assert_eq!(part.n_matches, expected_n);
            }
        }
    }
}
