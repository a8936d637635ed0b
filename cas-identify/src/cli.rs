use clap::Parser;
use config::{ArgCheck, RunMode, SequenceType};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(
        short = 'f',
        long = "fasta",
        required = true,
        value_name = "PATH",
        help = "Path to the FASTA file to analyze [protein set or gene-caller output]"
    )]
    pub fasta: PathBuf,

    #[arg(
        long = "sequence-type",
        value_name = "TYPE",
        default_value = "protein",
        help = "Input sequence type [protein, dna]"
    )]
    pub sequence_type: SequenceType,

    #[arg(
        short = 's',
        long = "hmm-sets",
        value_name = "SETS",
        value_delimiter = ',',
        num_args = 1..,
        default_values_t = config::DEFAULT_HMM_SETS.iter().map(|s| s.to_string()),
        help = "Profile sets to run (HMM1..HMM5) delimited by comma"
    )]
    pub hmm_sets: Vec<String>,

    #[arg(
        short = 'c',
        long = "classifiers",
        value_name = "CLFS",
        value_delimiter = ',',
        num_args = 1..,
        default_values_t = ["ERT".to_owned()],
        help = "Classifiers to apply [CART, ERT, SVM]"
    )]
    pub classifiers: Vec<String>,

    #[arg(
        short = 'r',
        long = "regressors",
        value_name = "REGS",
        value_delimiter = ',',
        num_args = 1..,
        default_values_t = ["ERT".to_owned()],
        help = "Regressors used for imputation [CART, ERT, SVM]"
    )]
    pub regressors: Vec<String>,

    #[arg(
        short = 'm',
        long = "mode",
        value_name = "MODE",
        default_value = "classification",
        help = "Run mode [classification, regression, mixed]"
    )]
    pub mode: RunMode,

    #[arg(
        short = 'p',
        long = "probability",
        help = "Report ranked class probabilities instead of a single label"
    )]
    pub probability: bool,

    #[arg(
        long = "hmm-dir",
        value_name = "DIR",
        default_value = "hmmsearch_output",
        help = "Directory with profile-search hit tables, one subdirectory per set"
    )]
    pub hmm_dir: PathBuf,

    #[arg(
        long = "models-dir",
        value_name = "DIR",
        default_value = "models",
        help = "Directory with trained model artifacts"
    )]
    pub models_dir: PathBuf,

    #[arg(
        long = "cascade-dir",
        value_name = "DIR",
        default_value = "cascade",
        help = "Output directory for per-run intermediate tables"
    )]
    pub cascade_dir: PathBuf,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = config::OUTPUT,
        help = "Path of the final prediction table"
    )]
    pub output: PathBuf,

    #[arg(
        long = "max-gap",
        value_name = "N",
        default_value_t = config::MAX_GAP,
        help = "Maximum cumulative unannotated genes tolerated inside a cascade"
    )]
    pub max_gap: usize,

    #[arg(
        long = "min-proteins",
        value_name = "N",
        default_value_t = config::MIN_PROTEINS,
        help = "Minimum annotated genes required to keep a cascade"
    )]
    pub min_proteins: usize,

    #[arg(
        long = "max-nt-diff",
        value_name = "N",
        default_value_t = config::MAX_NT_DIFF,
        help = "Maximum nucleotide distance between neighboring cascade genes"
    )]
    pub max_nt_diff: i64,

    #[arg(
        short = 't',
        long = "threads",
        value_name = "THREADS",
        default_value_t = num_cpus::get(),
        help = "Number of threads"
    )]
    pub threads: usize,
}

impl From<Vec<String>> for Args {
    fn from(args: Vec<String>) -> Self {
        Args::parse_from(std::iter::once("cas-identify".to_owned()).chain(args))
    }
}

impl ArgCheck for Args {
    fn get_fasta(&self) -> &PathBuf {
        &self.fasta
    }

    fn get_hmm_dir(&self) -> &PathBuf {
        &self.hmm_dir
    }

    fn get_models_dir(&self) -> &PathBuf {
        &self.models_dir
    }

    fn get_hmm_sets(&self) -> &Vec<String> {
        &self.hmm_sets
    }

    fn get_classifiers(&self) -> &Vec<String> {
        &self.classifiers
    }

    fn get_regressors(&self) -> &Vec<String> {
        &self.regressors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::from(vec!["--fasta".to_owned(), "seqs.fa".to_owned()]);

        assert_eq!(args.sequence_type, SequenceType::Protein);
        assert_eq!(args.mode, RunMode::Classification);
        assert_eq!(args.hmm_sets, vec!["HMM1", "HMM3", "HMM5"]);
        assert_eq!(args.classifiers, vec!["ERT"]);
        assert_eq!(args.max_gap, config::MAX_GAP);
        assert!(!args.probability);
    }

    #[test]
    fn test_comma_delimited_lists() {
        let args = Args::from(vec![
            "--fasta".to_owned(),
            "seqs.fa".to_owned(),
            "--hmm-sets".to_owned(),
            "HMM1,HMM2".to_owned(),
            "--classifiers".to_owned(),
            "CART,SVM".to_owned(),
        ]);

        assert_eq!(args.hmm_sets, vec!["HMM1", "HMM2"]);
        assert_eq!(args.classifiers, vec!["CART", "SVM"]);
    }
}
