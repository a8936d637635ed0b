//! Annotation Resolver: merges per-profile hit tables into the best
//! annotation per gene for one profile-set run.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use config::{cas_synonyms, SequenceType, HIT_TABLE_EXT, MISSING_BITSCORE, UNKNOWN_ANNOTATION};

use crate::core::records::GeneTable;
use crate::core::PipelineError;

// hit-table layout: field 0 = target id, field 5 = full-sequence bitscore
const BITSCORE_FIELD: usize = 5;

/// annotate every gene in `table` from the `*.tab` hit files under `hit_dir`.
///
/// Best scoring profile wins; ties keep the earlier-processed file. Files
/// are visited in sorted name order so tie-breaking is deterministic.
pub fn annotate(
    table: &mut GeneTable,
    hit_dir: &Path,
    sequence_type: SequenceType,
) -> Result<(), PipelineError> {
    for record in table.iter_mut() {
        record.bitscore = MISSING_BITSCORE;
        record.annotation = UNKNOWN_ANNOTATION.to_owned();
    }

    let synonyms = cas_synonyms();

    for path in hit_files(hit_dir)? {
        let family = family_from_file_name(&path)?;
        let family: &str = synonyms
            .get(family.as_str())
            .copied()
            .unwrap_or(family.as_str());

        let reader = BufReader::new(File::open(&path)?);

        for line in reader.lines() {
            let line = line?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let (id, bitscore) = parse_hit(&path, &line, sequence_type)?;

            let record =
                table
                    .get_by_id_mut(&id)
                    .ok_or_else(|| PipelineError::UnknownGene {
                        id: id.clone(),
                        file: path.display().to_string(),
                    })?;

            if bitscore > record.bitscore {
                record.bitscore = bitscore;
                record.annotation = family.to_owned();
            }
        }
    }

    Ok(())
}

/// `*.tab` files under `dir`, sorted by file name
fn hit_files(dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file() && path.extension().map(|e| e == HIT_TABLE_EXT).unwrap_or(false)
        })
        .collect();

    files.sort();

    Ok(files)
}

/// profile family = file-name segment before the first underscore
fn family_from_file_name(path: &Path) -> Result<String, PipelineError> {
    let stem = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PipelineError::MalformedHit {
            file: path.display().to_string(),
            line: String::new(),
        })?;

    Ok(stem.split('_').next().unwrap_or(stem).to_owned())
}

fn parse_hit(
    path: &Path,
    line: &str,
    sequence_type: SequenceType,
) -> Result<(String, f64), PipelineError> {
    let malformed = || PipelineError::MalformedHit {
        file: path.display().to_string(),
        line: line.to_owned(),
    };

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() <= BITSCORE_FIELD {
        return Err(malformed());
    }

    let mut id = fields[0].to_owned();
    let bitscore: f64 = fields[BITSCORE_FIELD].parse().map_err(|_| malformed())?;

    if sequence_type == SequenceType::Dna {
        // genomic ids carry the gene ordinal in the last field, mirroring
        // the header format of the gene caller
        let ordinal = fields
            .last()
            .and_then(|f| f.split(';').next())
            .ok_or_else(malformed)?;
        id = format!("{}_{}", id, ordinal);
    }

    Ok((id, bitscore))
}
