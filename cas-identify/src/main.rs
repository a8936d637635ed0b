//! CRISPR-Cas cassette identification from profile-search hits
//!
//! This tool consumes the output of an external gene caller and profile
//! search: an ordered FASTA header stream and per-profile hit tables, one
//! directory per profile set. Hits are merged into a best annotation per
//! gene, the annotated gene order is scanned for gap-tolerant runs of Cas
//! genes ("cascades"), each cascade becomes a fixed-shape bitscore vector,
//! and pre-trained classifiers turn the vectors into CRISPR-Cas system-type
//! labels. Optionally, per-feature regression models impute the slots of
//! genes the profile search could not annotate before classification. The
//! final output is a tabular list of predictions per cascade, classifier
//! and profile set.

use clap::{self, Parser};
use config::ArgCheck;
use log::{error, info, Level};
use simple_logger::init_with_level;

use cas_identify::cli::Args;
use cas_identify::core::identify;

fn main() {
    let start = std::time::Instant::now();
    init_with_level(Level::Info).unwrap();

    let args: Args = Args::parse();

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()
        .unwrap();

    args.check().unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    identify(args).unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    let elapsed = start.elapsed();
    info!("Elapsed time: {:.3?}", elapsed);
}
