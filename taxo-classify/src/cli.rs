use clap::Parser;
use config::{validate, ArgCheck, CliError, DEFAULT_CHUNK_SIZE, DEFAULT_CONFIDENCE, SPEC_EXTENSIONS};
use std::path::PathBuf;

use crate::utils::ReadOrientation;

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(
        short = 'r',
        long = "reads",
        required = true,
        value_name = "PATH",
        help = "Path to FASTA file with reads to classify"
    )]
    pub reads: PathBuf,

    #[arg(
        short = 'c',
        long = "classifier",
        required = true,
        value_name = "PATH",
        help = "Path to a fitted classifier artifact [.json]"
    )]
    pub classifier: PathBuf,

    #[arg(
        short = 'o',
        long = "output",
        value_name = "PATH",
        default_value = config::CLASSIFICATION,
        help = "Path to output classification table"
    )]
    pub output: PathBuf,

    #[arg(
        long = "chunk-size",
        value_name = "READS",
        default_value_t = DEFAULT_CHUNK_SIZE,
        help = "Number of reads classified per work unit"
    )]
    pub chunk_size: usize,

    #[arg(
        short = 'j',
        long = "jobs",
        value_name = "JOBS",
        default_value_t = 1,
        help = "Number of chunks classified in parallel"
    )]
    pub jobs: usize,

    #[arg(
        long = "pre-dispatch",
        value_name = "EXPR",
        default_value = "2*n_jobs",
        help = "Accepted for compatibility; chunks are dispatched eagerly"
    )]
    pub pre_dispatch: String,

    #[arg(
        long = "confidence",
        value_name = "FLOAT",
        allow_hyphen_values = true,
        default_value_t = DEFAULT_CONFIDENCE,
        help = "Assignment confidence threshold; 0 disables truncation, -1 disables calculation"
    )]
    pub confidence: f64,

    #[arg(
        long = "read-orientation",
        value_name = "ORIENTATION",
        value_enum,
        help = "Orientation of the reads relative to the reference [default: auto-detect]"
    )]
    pub read_orientation: Option<ReadOrientation>,
}

impl ArgCheck for Args {
    fn get_reads(&self) -> Vec<&PathBuf> {
        vec![&self.reads]
    }

    fn get_tables(&self) -> Vec<&PathBuf> {
        vec![]
    }

    fn validate_args(&self) -> Result<(), CliError> {
        self.check_reads()?;
        validate(&self.classifier, SPEC_EXTENSIONS)?;

        if self.chunk_size == 0 {
            return Err(CliError::InvalidInput(
                "chunk size must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

impl From<Vec<String>> for Args {
    fn from(args: Vec<String>) -> Self {
        Args::parse_from(std::iter::once("taxo-classify".to_string()).chain(args))
    }
}
