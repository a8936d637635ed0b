use anyhow::Result;
use std::path::PathBuf;

pub mod cli;
pub mod core;
pub mod models;
pub mod utils;

pub fn lib_cas_identify(args: Vec<String>) -> Result<PathBuf> {
    let args = cli::Args::from(args);
    let output = core::identify(args);

    return output;
}
