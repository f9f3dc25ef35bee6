//! Shared configuration for the taxotools pipeline
//!
//! Universal constants, CLI argument validation and small I/O helpers
//! used by every taxo-tool. Numeric defaults mirror the values the
//! classification orchestrator documents for its parameters.

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// numeric values
pub const MIN_THREADS: usize = 1;
pub const DEFAULT_CHUNK_SIZE: usize = 262144;
pub const DEFAULT_CONFIDENCE: f64 = 0.7;
pub const CONFIDENCE_DISABLED: f64 = -1.0;
pub const CONFIDENCE_SENTINEL: f64 = -1.0;
pub const ORIENTATION_SAMPLE_SIZE: usize = 100;

// taxonomy
pub const UNASSIGNED: &str = "Unassigned";
pub const RANK_SEPARATOR: char = ';';

// file names
pub const CLASSIFICATION: &str = "classification.tsv";
pub const CLASSIFIER: &str = "classifier.json";

// recognized input extensions
pub const FASTA_EXTENSIONS: &[&str] = &["fa", "fasta", "fna"];
pub const TABLE_EXTENSIONS: &[&str] = &["tsv", "txt"];
pub const SPEC_EXTENSIONS: &[&str] = &["json"];

// os
#[cfg(not(windows))]
const TICK_SETTINGS: (&str, u64) = ("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ", 80);
#[cfg(windows)]
const TICK_SETTINGS: (&str, u64) = (r"+-x| ", 200);

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

/// write any collection to a file
pub fn write_collection(data: &Vec<String>, fname: &PathBuf) {
    log::info!("Rows in {:?}: {:?}. Writing...", fname, data.len());
    let f = match File::create(fname) {
        Ok(f) => f,
        Err(e) => panic!("Error creating file: {}", e),
    };
    let mut writer = BufWriter::new(f);

    for line in data.iter() {
        writeln!(writer, "{}", line).unwrap_or_else(|e| {
            panic!("Error writing to file: {}", e);
        });
    }
}

/// argument checker for all subcommands
pub trait ArgCheck {
    fn check(&self) -> Result<(), CliError> {
        self.validate_args()
    }

    fn validate_args(&self) -> Result<(), CliError> {
        self.check_reads()?;

        for table in self.get_tables() {
            validate(table, TABLE_EXTENSIONS)?;
        }

        Ok(())
    }

    fn check_reads(&self) -> Result<(), CliError> {
        if self.get_reads().is_empty() {
            let err = "No read files provided".to_string();
            return Err(CliError::InvalidInput(err));
        }
        for reads in self.get_reads() {
            validate(reads, FASTA_EXTENSIONS)?;
        }

        Ok(())
    }

    fn get_reads(&self) -> Vec<&PathBuf>;
    fn get_tables(&self) -> Vec<&PathBuf>;
}

/// error handling for CLI
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// argument validation
pub fn validate(arg: &PathBuf, extensions: &[&str]) -> Result<(), CliError> {
    if !arg.exists() {
        return Err(CliError::InvalidInput(format!("{:?} does not exist", arg)));
    }

    if !arg.is_file() {
        return Err(CliError::InvalidInput(format!("{:?} is not a file", arg)));
    }

    match arg.extension() {
        Some(ext) if extensions.iter().any(|e| ext == *e) => (),
        _ => {
            return Err(CliError::InvalidInput(format!(
                "file {:?} does not have a recognized extension {:?}",
                arg, extensions
            )))
        }
    }

    match std::fs::metadata(arg) {
        Ok(metadata) if metadata.len() == 0 => {
            Err(CliError::InvalidInput(format!("file {:?} is empty", arg)))
        }
        Ok(_) => Ok(()),
        Err(e) => Err(CliError::IoError(e)),
    }
}
