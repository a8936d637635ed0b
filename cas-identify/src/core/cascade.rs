//! Cascade Detector: partitions the annotated gene table into gap-tolerant
//! runs of Cas-annotated genes.
//!
//! The scan is an explicit two-state machine (Empty / Accumulating) over the
//! ordered records. An in-progress cascade at end of input is discarded;
//! only a record that forces a re-decision can close a cascade. That
//! boundary behavior is intentional and covered by a test.

use config::{SequenceType, MAX_GAP, MAX_NT_DIFF, MIN_PROTEINS};

use crate::core::records::GeneTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeRecord {
    /// index into the run's gene table
    pub record: usize,
    /// 1-based, unique within the run
    pub cascade_id: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct CascadeParams {
    pub max_gap: usize,
    pub min_proteins: usize,
    pub max_nt_diff: i64,
}

impl Default for CascadeParams {
    fn default() -> Self {
        Self {
            max_gap: MAX_GAP,
            min_proteins: MIN_PROTEINS,
            max_nt_diff: MAX_NT_DIFF,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ScanState {
    Empty,
    Accumulating,
}

/// in-progress cascade: member indices, cumulative gap count, annotated count
#[derive(Debug, Default)]
struct CascadeScan {
    indices: Vec<usize>,
    gap: usize,
    annotated: usize,
}

impl CascadeScan {
    fn state(&self) -> ScanState {
        if self.indices.is_empty() {
            ScanState::Empty
        } else {
            ScanState::Accumulating
        }
    }

    fn extend(&mut self, idx: usize) {
        self.indices.push(idx);
        self.gap = 0;
        self.annotated += 1;
    }

    /// gap fillers count cumulatively toward max_gap; the counter is not
    /// reset until the next annotated gene
    fn fill_gap(&mut self, idx: usize) {
        self.indices.push(idx);
        self.gap += 1;
    }

    fn reset(&mut self) {
        self.indices.clear();
        self.gap = 0;
        self.annotated = 0;
    }

    /// close the cascade: trim trailing unannotated records and hand back
    /// the member indices
    fn close(&mut self, table: &GeneTable) -> Vec<usize> {
        while let Some(&last) = self.indices.last() {
            let annotated = table.get(last).map(|r| r.is_annotated()).unwrap_or(false);
            if annotated {
                break;
            }
            self.indices.pop();
        }

        let members = std::mem::take(&mut self.indices);
        self.reset();

        members
    }
}

/// detect cascades over an annotated, order-preserved gene table
pub fn detect_cascades(
    table: &GeneTable,
    sequence_type: SequenceType,
    params: CascadeParams,
) -> Vec<CascadeRecord> {
    // protein-only input carries no positional signal beyond order: the
    // whole table is one cascade
    if sequence_type == SequenceType::Protein {
        return (0..table.len())
            .map(|record| CascadeRecord {
                record,
                cascade_id: 1,
            })
            .collect();
    }

    let mut scan = CascadeScan::default();
    let mut cascades: Vec<Vec<usize>> = Vec::new();

    for i in 0..table.len() {
        let record = match table.get(i) {
            Some(r) => r,
            None => break,
        };
        let annotated = record.is_annotated();

        let nt_diff = if i > 0 {
            let start = record.start.unwrap_or(0);
            let prev_end = table.get(i - 1).and_then(|r| r.end).unwrap_or(0);
            start - prev_end
        } else {
            0
        };

        let adjacent = nt_diff <= params.max_nt_diff;

        if annotated
            && (scan.state() == ScanState::Empty || adjacent)
            && scan.gap <= params.max_gap
        {
            scan.extend(i);
        } else if i > 0
            && scan.state() == ScanState::Accumulating
            && !annotated
            && adjacent
            && scan.gap < params.max_gap
        {
            scan.fill_gap(i);
        } else if scan.state() == ScanState::Accumulating && scan.annotated >= params.min_proteins {
            cascades.push(scan.close(table));
        } else {
            scan.reset();
        }
    }

    // no end-of-input flush: a cascade still accumulating here is dropped

    cascades
        .into_iter()
        .enumerate()
        .flat_map(|(c, members)| {
            members.into_iter().map(move |record| CascadeRecord {
                record,
                cascade_id: c + 1,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::records::build_gene_table;
    use std::io::Write;

    /// fabricate a genomic table with the given annotations; all nt_diff = 0
    fn genomic_table(annotations: &[&str]) -> GeneTable {
        let mut fasta = tempfile::NamedTempFile::new().unwrap();
        for (i, _) in annotations.iter().enumerate() {
            let pos = 100 * (i as i64 + 1);
            writeln!(fasta, ">contig # {} # {} # 1 # {};partial=00", pos, pos, i + 1).unwrap();
        }

        let mut table = build_gene_table(fasta.path(), SequenceType::Dna).unwrap();
        for (record, annotation) in table.iter_mut().zip(annotations) {
            if *annotation != "unknown" {
                record.annotation = (*annotation).to_owned();
                record.bitscore = 10.0;
            }
        }

        table
    }

    fn params(max_gap: usize, min_proteins: usize, max_nt_diff: i64) -> CascadeParams {
        CascadeParams {
            max_gap,
            min_proteins,
            max_nt_diff,
        }
    }

    #[test]
    fn test_protein_input_is_one_cascade() {
        let mut fasta = tempfile::NamedTempFile::new().unwrap();
        writeln!(fasta, ">a\n>b\n>c").unwrap();
        let table = build_gene_table(fasta.path(), SequenceType::Protein).unwrap();

        let cascades = detect_cascades(&table, SequenceType::Protein, CascadeParams::default());

        assert_eq!(cascades.len(), 3);
        assert!(cascades.iter().all(|c| c.cascade_id == 1));
    }

    #[test]
    fn test_gap_break_trims_and_drops_tail() {
        // two consecutive unannotated records exceed max_gap=1, so the
        // cascade closes with the first three records; the lone annotated
        // record at index 5 fails min_proteins and is never emitted
        let table = genomic_table(&["casA", "unknown", "casA", "unknown", "unknown", "casA"]);

        let cascades = detect_cascades(&table, SequenceType::Dna, params(1, 2, 500));

        let members: Vec<usize> = cascades.iter().map(|c| c.record).collect();
        assert_eq!(members, vec![0, 1, 2]);
        assert!(cascades.iter().all(|c| c.cascade_id == 1));
    }

    #[test]
    fn test_no_flush_at_end_of_input() {
        // a cascade still accumulating at the last record is discarded
        let table = genomic_table(&["casA", "casB", "casC"]);

        let cascades = detect_cascades(&table, SequenceType::Dna, params(2, 2, 500));

        assert!(cascades.is_empty());
    }

    #[test]
    fn test_distance_break_discards_small_run() {
        let mut fasta = tempfile::NamedTempFile::new().unwrap();
        // second gene starts 10kb after the first ends
        writeln!(fasta, ">c # 100 # 200 # 1 # 1;x").unwrap();
        writeln!(fasta, ">c # 10200 # 10300 # 1 # 2;x").unwrap();
        writeln!(fasta, ">c # 10400 # 10500 # 1 # 3;x").unwrap();
        writeln!(fasta, ">c # 10600 # 10700 # 1 # 4;x").unwrap();

        let mut table = build_gene_table(fasta.path(), SequenceType::Dna).unwrap();
        for record in table.iter_mut() {
            record.annotation = "cas1".to_owned();
            record.bitscore = 5.0;
        }

        let cascades = detect_cascades(&table, SequenceType::Dna, params(2, 2, 500));

        // the distant record forces a close of the single-member run, which
        // fails min_proteins; the remaining three accumulate but are never
        // flushed at end of input
        assert!(cascades.is_empty());
    }

    #[test]
    fn test_two_cascades_get_distinct_ids() {
        let table = genomic_table(&[
            "casA", "casB", "unknown", "unknown", "unknown", "casC", "casD", "unknown", "unknown",
            "unknown", "casE",
        ]);

        let cascades = detect_cascades(&table, SequenceType::Dna, params(1, 2, 500));

        let first: Vec<usize> = cascades
            .iter()
            .filter(|c| c.cascade_id == 1)
            .map(|c| c.record)
            .collect();
        let second: Vec<usize> = cascades
            .iter()
            .filter(|c| c.cascade_id == 2)
            .map(|c| c.record)
            .collect();

        assert_eq!(first, vec![0, 1]);
        assert_eq!(second, vec![5, 6]);
    }
}
