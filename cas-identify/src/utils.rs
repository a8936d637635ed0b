//! Persisted table formats: annotated genes, cascades, feature matrices and
//! the final prediction table.

use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use config::SequenceType;

use crate::core::cascade::CascadeRecord;
use crate::core::classify::Prediction;
use crate::core::records::{GeneRecord, GeneTable};

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn gene_row(record: &GeneRecord, sequence_type: SequenceType) -> String {
    match sequence_type {
        SequenceType::Dna => format!(
            "{},{},{},{},{},{}",
            record.id,
            opt_to_string(record.start),
            opt_to_string(record.end),
            opt_to_string(record.strand),
            record.bitscore,
            record.annotation
        ),
        SequenceType::Protein => {
            format!("{},{},{}", record.id, record.bitscore, record.annotation)
        }
    }
}

fn gene_header(sequence_type: SequenceType) -> &'static str {
    match sequence_type {
        SequenceType::Dna => "id,start,end,strand,bitscore,annotation",
        SequenceType::Protein => "id,bitscore,annotation",
    }
}

/// one row per gene, in input order
pub fn write_annotated_table(
    path: &Path,
    table: &GeneTable,
    sequence_type: SequenceType,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "{}", gene_header(sequence_type))?;
    for record in table.iter() {
        writeln!(writer, "{}", gene_row(record, sequence_type))?;
    }

    Ok(())
}

/// one row per retained gene, tagged with its cascade id
pub fn write_cascade_table(
    path: &Path,
    table: &GeneTable,
    cascades: &[CascadeRecord],
    sequence_type: SequenceType,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "{},cascade_id", gene_header(sequence_type))?;
    for member in cascades {
        let record = table
            .get(member.record)
            .ok_or_else(|| anyhow!("cascade member {} out of range", member.record))?;
        writeln!(
            writer,
            "{},{}",
            gene_row(record, sequence_type),
            member.cascade_id
        )?;
    }

    Ok(())
}

/// whitespace-delimited matrix, header line names each feature column
pub fn write_feature_matrix(path: &Path, features: &[String], vectors: &[Vec<f64>]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "# {}", features.join(" "))?;
    for vector in vectors {
        let row = vector
            .iter()
            .map(|v| format!("{:.18e}", v))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", row)?;
    }

    Ok(())
}

/// re-parse a persisted feature matrix (header order + values)
pub fn read_feature_matrix(path: &Path) -> Result<(Vec<String>, Vec<Vec<f64>>)> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let header = lines
        .next()
        .ok_or_else(|| anyhow!("empty feature matrix: {}", path.display()))??;
    let features: Vec<String> = header
        .trim_start_matches('#')
        .split_whitespace()
        .map(str::to_owned)
        .collect();

    let mut vectors = Vec::new();
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let row: Vec<f64> = line
            .split_whitespace()
            .map(|v| {
                v.parse::<f64>()
                    .with_context(|| format!("bad matrix value '{}' in {}", v, path.display()))
            })
            .collect::<Result<_>>()?;
        vectors.push(row);
    }

    Ok((features, vectors))
}

fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_owned()
    }
}

/// final prediction table: hmm,cascade_id,classifier,regressor,predicted_label
pub fn write_predictions(path: &Path, predictions: &[Prediction]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "hmm,cascade_id,classifier,regressor,predicted_label")?;
    for prediction in predictions {
        writeln!(
            writer,
            "{},{},{},{},{}",
            prediction.hmm,
            prediction.cascade_id,
            prediction.classifier,
            prediction.regressor.as_deref().unwrap_or(""),
            csv_field(&prediction.label.to_string())
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::classify::Label;

    #[test]
    fn test_feature_matrix_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("HMM1_cascade_arrays.txt");

        let features = vec!["cas1".to_owned(), "cas2".to_owned(), "cas9".to_owned()];
        let vectors = vec![vec![0.0, 1.5, -2.25], vec![3.125, 0.0, 99.5]];

        write_feature_matrix(&path, &features, &vectors).unwrap();
        let (read_features, read_vectors) = read_feature_matrix(&path).unwrap();

        assert_eq!(read_features, features);
        assert_eq!(read_vectors.len(), vectors.len());
        for (row, expected) in read_vectors.iter().zip(&vectors) {
            for (a, b) in row.iter().zip(expected) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_prediction_table_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let predictions = vec![
            Prediction {
                hmm: "HMM1".into(),
                cascade_id: 1,
                classifier: "ERT".into(),
                regressor: None,
                label: Label::Single("CAS-TypeIE".into()),
            },
            Prediction {
                hmm: "HMM1".into(),
                cascade_id: 1,
                classifier: "SVM".into(),
                regressor: Some("CART".into()),
                label: Label::Ranked(vec![
                    ("CAS-TypeIE".into(), 0.8),
                    ("CAS-TypeIA".into(), 0.2),
                ]),
            },
        ];

        write_predictions(&path, &predictions).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines[0], "hmm,cascade_id,classifier,regressor,predicted_label");
        assert_eq!(lines[1], "HMM1,1,ERT,,CAS-TypeIE");
        assert_eq!(
            lines[2],
            "HMM1,1,SVM,CART,\"CAS-TypeIE (0.800), CAS-TypeIA (0.200)\""
        );
    }
}
