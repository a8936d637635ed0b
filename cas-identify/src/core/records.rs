//! Gene Record Builder: turns the FASTA header stream into an ordered gene table.

use hashbrown::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use config::{SequenceType, MISSING_BITSCORE, UNKNOWN_ANNOTATION};

use crate::core::PipelineError;

#[derive(Debug, Clone)]
pub struct GeneRecord {
    pub id: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub strand: Option<i8>,
    pub bitscore: f64,
    pub annotation: String,
}

impl GeneRecord {
    fn new(id: String, coords: Option<(i64, i64, i8)>) -> Self {
        Self {
            id,
            start: coords.map(|c| c.0),
            end: coords.map(|c| c.1),
            strand: coords.map(|c| c.2),
            bitscore: MISSING_BITSCORE,
            annotation: UNKNOWN_ANNOTATION.to_owned(),
        }
    }

    pub fn is_annotated(&self) -> bool {
        self.annotation != UNKNOWN_ANNOTATION
    }
}

/// ordered gene table; record order is first appearance in the input stream
/// and encodes genomic/protein adjacency, so it is preserved everywhere
#[derive(Debug, Clone, Default)]
pub struct GeneTable {
    records: Vec<GeneRecord>,
    index: HashMap<String, usize>,
}

impl GeneTable {
    /// insert unless the id was already seen; first occurrence wins
    fn push(&mut self, record: GeneRecord) {
        if !self.index.contains_key(&record.id) {
            self.index.insert(record.id.clone(), self.records.len());
            self.records.push(record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&GeneRecord> {
        self.records.get(idx)
    }

    pub fn get_by_id_mut(&mut self, id: &str) -> Option<&mut GeneRecord> {
        let idx = *self.index.get(id)?;
        self.records.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GeneRecord> {
        self.records.iter_mut()
    }
}

/// scan header lines of `fasta` and build the ordered gene table
pub fn build_gene_table(
    fasta: &Path,
    sequence_type: SequenceType,
) -> Result<GeneTable, PipelineError> {
    let reader = BufReader::new(File::open(fasta)?);
    let mut table = GeneTable::default();

    for line in reader.lines() {
        let line = line?;
        if !line.starts_with('>') {
            continue;
        }

        let record = match sequence_type {
            SequenceType::Protein => parse_protein_header(fasta, &line)?,
            SequenceType::Dna => parse_dna_header(fasta, &line)?,
        };

        table.push(record);
    }

    Ok(table)
}

fn malformed(fasta: &Path, line: &str) -> PipelineError {
    PipelineError::MalformedHeader {
        file: fasta.display().to_string(),
        line: line.to_owned(),
    }
}

fn parse_protein_header(fasta: &Path, line: &str) -> Result<GeneRecord, PipelineError> {
    let id = line
        .trim_start_matches('>')
        .split_whitespace()
        .next()
        .ok_or_else(|| malformed(fasta, line))?;

    Ok(GeneRecord::new(id.to_owned(), None))
}

/// gene-caller header: `<contig> # <start> # <end> # <strand> # <extra>`;
/// the effective id is `<contig>_<first ';'-field of extra>`
fn parse_dna_header(fasta: &Path, line: &str) -> Result<GeneRecord, PipelineError> {
    let fields: Vec<&str> = line.split('#').collect();
    if fields.len() != 5 {
        return Err(malformed(fasta, line));
    }

    let contig = fields[0].trim_start_matches('>').trim();
    let start: i64 = fields[1]
        .trim()
        .parse()
        .map_err(|_| malformed(fasta, line))?;
    let end: i64 = fields[2]
        .trim()
        .parse()
        .map_err(|_| malformed(fasta, line))?;
    let strand: i8 = fields[3]
        .trim()
        .parse()
        .map_err(|_| malformed(fasta, line))?;
    let ordinal = fields[4]
        .trim()
        .split(';')
        .next()
        .ok_or_else(|| malformed(fasta, line))?;

    let id = format!("{}_{}", contig, ordinal);

    Ok(GeneRecord::new(id, Some((start, end, strand))))
}
