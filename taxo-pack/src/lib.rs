//! Read and reference-table ingestion for taxotools
//!
//! This crate owns the two input contracts of the pipeline: a finite,
//! forward-only collection of sequence reads (FASTA) and a mapping from
//! read identifier to a rank-ordered taxonomic string (TSV). Everything
//! downstream consumes `SequenceRecord`s and the taxonomy map; no other
//! crate touches the input files directly.

use anyhow::{anyhow, Result};
use hashbrown::HashMap;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

pub mod record;

pub use record::SequenceRecord;

/// read a FASTA file into an ordered collection of records
pub fn read_fasta(path: &PathBuf) -> Result<Vec<SequenceRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let records = parse_fasta(reader)?;

    log::info!("Reads in {:?}: {}", path, records.len());

    Ok(records)
}

/// parse FASTA records from any buffered source
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<SequenceRecord>> {
    let mut records: Vec<SequenceRecord> = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim_end();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            let id = header
                .split_whitespace()
                .next()
                .ok_or_else(|| anyhow!("ERROR: FASTA header without an identifier"))?;
            records.push(SequenceRecord::new(id, b""));
        } else {
            let record = records
                .last_mut()
                .ok_or_else(|| anyhow!("ERROR: FASTA sequence before any header"))?;
            record.seq.extend_from_slice(line.as_bytes());
        }
    }

    Ok(records)
}

/// read a taxonomy TSV [id <TAB> taxon] into a map
pub fn read_taxonomy(path: &PathBuf) -> Result<HashMap<String, String>> {
    let reader = BufReader::new(File::open(path)?);
    let taxonomy = parse_taxonomy(reader)?;

    log::info!("Taxa in {:?}: {}", path, taxonomy.len());

    Ok(taxonomy)
}

/// parse taxonomy rows from any buffered source
pub fn parse_taxonomy<R: BufRead>(reader: R) -> Result<HashMap<String, String>> {
    let mut taxonomy = HashMap::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();

        if line.is_empty() || line.starts_with('#') || line.starts_with("Feature ID") {
            continue;
        }

        let (id, taxon) = line
            .split_once('\t')
            .ok_or_else(|| anyhow!("ERROR: malformed taxonomy row at line {}", idx + 1))?;

        taxonomy.insert(id.to_string(), taxon.trim().to_string());
    }

    Ok(taxonomy)
}
