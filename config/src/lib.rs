use hashbrown::HashMap;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// cascade detection defaults
pub const MAX_GAP: usize = 2;
pub const MIN_PROTEINS: usize = 2;
pub const MAX_NT_DIFF: i64 = 500;

// annotation sentinels
pub const UNKNOWN_ANNOTATION: &str = "unknown";
pub const MISSING_BITSCORE: f64 = -1.0;

// imputation
pub const MISSING_WARN_THRESHOLD: usize = 2;

// profile sets
pub const N_HMM_SETS: usize = 5;
pub const DEFAULT_HMM_SETS: [&str; 3] = ["HMM1", "HMM3", "HMM5"];

// file names
pub const OUTPUT: &str = "cas_identify_output.csv";
pub const ANNOTATED_SUFFIX: &str = "_annotated_proteins.csv";
pub const CASCADE_SUFFIX: &str = "_cascades.csv";
pub const ARRAY_SUFFIX: &str = "_cascade_arrays.txt";
pub const HIT_TABLE_EXT: &str = "tab";

// os
#[cfg(not(windows))]
const TICK_SETTINGS: (&str, u64) = ("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ", 80);
#[cfg(windows)]
const TICK_SETTINGS: (&str, u64) = (r"+-x| ", 200);

/// valid profile-set names: HMM1..HMM5
pub fn hmm_sets() -> Vec<String> {
    (1..=N_HMM_SETS).map(|i| format!("HMM{}", i)).collect()
}

/// short regressor name -> trained artifact model name
pub fn regressor_name(short: &str) -> Option<&'static str> {
    match short {
        "CART" => Some("DecisionTreeRegressor"),
        "ERT" => Some("ExtraTreesRegressor"),
        "SVM" => Some("SVR"),
        _ => None,
    }
}

/// short classifier name -> trained artifact model name
pub fn classifier_name(short: &str) -> Option<&'static str> {
    match short {
        "CART" => Some("DecisionTreeClassifier"),
        "ERT" => Some("ExtraTreesClassifier"),
        "SVM" => Some("SVC"),
        _ => None,
    }
}

/// synonymous profile names -> canonical Cas gene family names
pub fn cas_synonyms() -> HashMap<&'static str, &'static str> {
    HashMap::from_iter([
        ("csn1", "cas9"),
        ("csx12", "cas9"),
        ("casA", "cas8e"),
        ("cse1", "cas8e"),
        ("casB", "cse2"),
        ("casC", "cas7"),
        ("cse4", "cas7"),
        ("casD", "cas5"),
        ("casE", "cas6e"),
        ("cse3", "cas6e"),
        ("csy1", "cas8f"),
        ("csy2", "cas5f"),
        ("csy3", "cas7f"),
        ("csy4", "cas6f"),
        ("csd1", "cas8c"),
        ("csd2", "cas7"),
        ("csh1", "cas8b"),
        ("csh2", "cas7"),
        ("cst1", "cas8a"),
        ("cst2", "cas7"),
        ("csm1", "cas10"),
        ("cmr2", "cas10"),
        ("csx11", "cas10"),
        ("csf1", "cas8u"),
    ])
}

/// input sequence kind, decides header parsing and cascade windowing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceType {
    Protein,
    Dna,
}

impl FromStr for SequenceType {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "protein" => Ok(Self::Protein),
            "dna" => Ok(Self::Dna),
            _ => Err(CliError::InvalidInput(format!(
                "'{}' is not a valid sequence type [protein, dna]",
                s
            ))),
        }
    }
}

impl std::fmt::Display for SequenceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Protein => write!(f, "protein"),
            Self::Dna => write!(f, "dna"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Classification,
    Regression,
    Mixed,
}

impl FromStr for RunMode {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classification" => Ok(Self::Classification),
            "regression" => Ok(Self::Regression),
            "mixed" => Ok(Self::Mixed),
            _ => Err(CliError::InvalidInput(format!(
                "'{}' is not a valid run mode [classification, regression, mixed]",
                s
            ))),
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Classification => write!(f, "classification"),
            Self::Regression => write!(f, "regression"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

/// return a pre-configured progress bar
pub fn get_progress_bar(length: u64, msg: &str) -> ProgressBar {
    let progressbar_style = ProgressStyle::default_spinner()
        .tick_chars(TICK_SETTINGS.0)
        .template(" {spinner} {msg:<30} {wide_bar} ETA {eta_precise} ")
        .expect("no template error");

    let progress_bar = ProgressBar::new(length);

    progress_bar.set_style(progressbar_style);
    progress_bar.enable_steady_tick(Duration::from_millis(TICK_SETTINGS.1));
    progress_bar.set_message(msg.to_owned());

    progress_bar
}

/// argument checker for the pipeline
pub trait ArgCheck {
    fn check(&self) -> Result<(), CliError> {
        self.validate_args()
    }

    fn validate_args(&self) -> Result<(), CliError> {
        validate_file(self.get_fasta())?;
        validate_dir(self.get_hmm_dir())?;
        validate_dir(self.get_models_dir())?;

        match self.get_fasta().extension() {
            Some(ext) if ["fa", "fasta", "faa", "fna"].iter().any(|e| ext == *e) => (),
            _ => log::warn!(
                "{:?} does not look like a FASTA file. Proceeding anyway...",
                self.get_fasta()
            ),
        }

        for set in self.get_hmm_sets() {
            if !hmm_sets().contains(set) {
                return Err(CliError::InvalidInput(format!(
                    "'{}' is not a valid profile set, must be one of {:?}",
                    set,
                    hmm_sets()
                )));
            }
        }

        for clf in self.get_classifiers() {
            if classifier_name(clf).is_none() {
                return Err(CliError::InvalidInput(format!(
                    "'{}' is not a valid classifier [CART, ERT, SVM]",
                    clf
                )));
            }
        }

        for reg in self.get_regressors() {
            if regressor_name(reg).is_none() {
                return Err(CliError::InvalidInput(format!(
                    "'{}' is not a valid regressor [CART, ERT, SVM]",
                    reg
                )));
            }
        }

        Ok(())
    }

    fn get_fasta(&self) -> &PathBuf;
    fn get_hmm_dir(&self) -> &PathBuf;
    fn get_models_dir(&self) -> &PathBuf;
    fn get_hmm_sets(&self) -> &Vec<String>;
    fn get_classifiers(&self) -> &Vec<String>;
    fn get_regressors(&self) -> &Vec<String>;
}

/// error handling for CLI
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// file argument validation
pub fn validate_file(arg: &PathBuf) -> Result<(), CliError> {
    if !arg.exists() {
        return Err(CliError::InvalidInput(format!("{:?} does not exist", arg)));
    }

    if !arg.is_file() {
        return Err(CliError::InvalidInput(format!("{:?} is not a file", arg)));
    }

    match std::fs::metadata(arg) {
        Ok(metadata) if metadata.len() == 0 => {
            Err(CliError::InvalidInput(format!("file {:?} is empty", arg)))
        }
        Ok(_) => Ok(()),
        Err(e) => Err(CliError::IoError(e)),
    }
}

/// directory argument validation
pub fn validate_dir(arg: &PathBuf) -> Result<(), CliError> {
    if !arg.exists() {
        return Err(CliError::InvalidInput(format!("{:?} does not exist", arg)));
    }

    if !arg.is_dir() {
        return Err(CliError::InvalidInput(format!(
            "{:?} is not a directory",
            arg
        )));
    }

    Ok(())
}
