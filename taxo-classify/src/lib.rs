//! Core module for classifying reads with a fitted taxonomic classifier
//!
//! This module turns a fitted classifier artifact plus a stream of reads
//! into a per-read table of taxonomic calls. Reads are consumed once,
//! forward-only: the orientation detector samples a prefix of the stream,
//! decides whether the reads or their reverse complements better match
//! the reference model, and reuses the sampled prefix for the main pass.
//! The oriented stream is then partitioned into fixed-size chunks that
//! are classified independently (optionally in parallel); assignment
//! depth is limited by a confidence threshold, and calls that fail the
//! threshold at every rank are reported as 'Unassigned'.

use anyhow::Result;
use std::path::PathBuf;

pub mod cli;
pub mod core;
pub mod utils;

pub fn lib_taxo_classify(args: Vec<String>) -> Result<PathBuf> {
    let args = cli::Args::from(args);
    let classification = core::classify(args);

    return classification;
}
