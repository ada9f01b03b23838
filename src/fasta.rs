//! Read and write FASTA formatted protein libraries
use super::*;
use tracing::debug;

/// Residues per line when rendering a record
pub const LINE_WIDTH: usize = 80;

/// Parse FASTA text into a `ProteinLibrary`.
///
/// The accession is the first whitespace-delimited token of each header
/// line and the remainder is kept as the description. Lines before the
/// first header, blank lines and `;` comments are ignored. When an
/// accession occurs twice the later record wins.
pub fn parse(input: &str) -> ProteinLibrary {
    let mut library = ProteinLibrary::new();
    let mut header: Option<&str> = None;
    let mut sequence = String::new();

    for line in input.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if let Some(next) = line.strip_prefix('>') {
            if let Some(header) = header.replace(next) {
                insert(&mut library, header, &std::mem::take(&mut sequence));
            }
        } else if header.is_some() {
            sequence.push_str(line);
        }
    }
    if let Some(header) = header {
        insert(&mut library, header, &sequence);
    }

    debug!("parsed {} proteins from FASTA input", library.len());
    library
}

fn insert(library: &mut ProteinLibrary, header: &str, sequence: &str) {
    let header = header.trim();
    let (accession, description) = match header.find(char::is_whitespace) {
        Some(idx) => (&header[..idx], header[idx..].trim()),
        None => (header, ""),
    };
    if accession.is_empty() {
        debug!("skipping FASTA record without an accession");
        return;
    }
    if library
        .insert(Protein::new(accession, description, sequence))
        .is_some()
    {
        debug!("duplicate FASTA accession {}, keeping the last record", accession);
    }
}

impl Protein {
    /// Render this protein as a single FASTA record
    pub fn to_fasta(&self) -> String {
        let lines = self.sequence.len() / LINE_WIDTH + 1;
        let mut out = String::with_capacity(self.sequence.len() + lines + 64);
        out.push('>');
        out.push_str(&self.accession);
        if !self.description.is_empty() {
            out.push(' ');
            out.push_str(&self.description);
        }
        out.push('\n');
        // sequences are ASCII, so chunking bytes never splits a character
        for chunk in self.sequence.as_bytes().chunks(LINE_WIDTH) {
            out.extend(chunk.iter().map(|&b| b as char));
            out.push('\n');
        }
        out
    }
}

impl ProteinLibrary {
    /// Parse FASTA text, see [`parse`]
    pub fn from_fasta(input: &str) -> ProteinLibrary {
        parse(input)
    }

    /// Render every protein, in insertion order
    pub fn to_fasta(&self) -> String {
        self.iter().map(Protein::to_fasta).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_records() {
        let input = "; exported library
>sp|P02768|ALBU_HUMAN Serum albumin OS=Homo sapiens
MKWVTFISLL
flLFSSAYS

>P1
MAKRGFLWPQ
>
AAAA
";
        let lib = parse(input);
        assert_eq!(lib.len(), 2);
        let albumin = lib.get("sp|P02768|ALBU_HUMAN").unwrap();
        assert_eq!(albumin.sequence, "MKWVTFISLLFLLFSSAYS");
        assert_eq!(albumin.description, "Serum albumin OS=Homo sapiens");
        assert_eq!(lib.get("P1").unwrap().sequence, "MAKRGFLWPQ");
    }

    #[test]
    fn duplicate_keeps_last() {
        let lib = parse(">A first\nKKKK\n>A second\nRRRR\n");
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.get("A").unwrap().sequence, "RRRR");
        assert_eq!(lib.get("A").unwrap().description, "second");
    }

    #[test]
    fn render_wraps_lines() {
        let seq = "ACDEFGHIKLMNPQRSTVWY".repeat(9);
        let protein = Protein::new("Q1", "long one", &seq);
        let fasta = protein.to_fasta();
        let lines = fasta.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], ">Q1 long one");
        assert_eq!(lines[1].len(), LINE_WIDTH);
        assert_eq!(lines[2].len(), LINE_WIDTH);
        assert_eq!(lines[3].len(), 20);
        assert_eq!(lines.len(), 4);

        let library: ProteinLibrary = vec![protein, Protein::new("Q2", "", "MK")]
            .into_iter()
            .collect();
        assert_eq!(parse(&library.to_fasta()), library);
    }
}
