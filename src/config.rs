//! Analysis settings that can be stored alongside the input files
use super::*;
#[cfg(feature = "serialization")]
use serde::{Deserialize, Serialize};

/// Which enzymes to test and how to group the results
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serialization", serde(default))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisConfig {
    /// Enzyme display names, empty to enable the whole catalog
    pub enzymes: Vec<String>,
    pub group_by: GroupBy,
}

impl AnalysisConfig {
    #[cfg(feature = "serialization")]
    pub fn from_json(input: &str) -> Result<AnalysisConfig, serde_json::Error> {
        serde_json::from_str(input)
    }

    pub fn selection(&self) -> Result<Selection, Error> {
        Selection::from_names(self.enzymes.as_slice())
    }

    /// Import a measurement file against a FASTA library and aggregate it
    pub fn run(&self, csv: &str, fasta: &str) -> Result<Summary, Error> {
        let dataset = import_dataset(csv, fasta, self.enzymes.as_slice())?;
        Ok(dataset.aggregate(self.group_by))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_is_everything_by_sample() {
        let config = AnalysisConfig::default();
        assert_eq!(config.selection().unwrap(), Selection::all());
        assert_eq!(config.group_by, GroupBy::Sample);
    }

    #[test]
    fn invalid_enzyme() {
        let config = AnalysisConfig {
            enzymes: vec!["Trypsin".into(), "Subtilisin".into()],
            group_by: GroupBy::Accession,
        };
        assert!(matches!(
            config.selection(),
            Err(Error::InvalidEnzymeSelection(ref name)) if name == "Subtilisin"
        ));
        assert!(config.run("sequence\n", ">P1\nMK\n").is_err());
    }

    #[test]
    fn run() {
        let config = AnalysisConfig {
            enzymes: vec!["Trypsin".into()],
            group_by: GroupBy::Accession,
        };
        let summary = config
            .run(
                "sequence,intensity,protein_id,sample_id\nAKRG,10,P1,S1\n",
                ">P1\nMAKRGFLWPQ\n",
            )
            .unwrap();
        assert_eq!(summary.buckets.len(), 1);
        assert!(summary.get("P1").is_some());
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn from_json() {
        let input = r#"{"enzymes": ["Trypsin", "Elastase"], "group_by": "accession"}"#;
        let config = AnalysisConfig::from_json(input).unwrap();
        assert_eq!(config.group_by, GroupBy::Accession);
        assert_eq!(
            config.selection().unwrap().enzymes(),
            &[Enzyme::Elastase, Enzyme::Trypsin]
        );
        let config = AnalysisConfig::from_json("{}").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }
}
