//! Chunked, parallel classification of oriented reads

use anyhow::{anyhow, bail, Result};
use dashmap::DashMap;
use rayon::prelude::*;

use std::path::PathBuf;

use config::{
    get_progress_bar, write_collection, CONFIDENCE_SENTINEL, DEFAULT_CHUNK_SIZE,
    DEFAULT_CONFIDENCE, MIN_THREADS,
};
use taxo_learn::types::Dataset;
use taxo_learn::Pipeline;
use taxo_pack::{read_fasta, SequenceRecord};
use taxo_spec::FittedClassifier;

use crate::cli::Args;
use crate::utils::{assign, autodetect_orientation, rank_classes, ReadOrientation};

/// one classified read
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub id: String,
    pub taxon: String,
    pub confidence: f64,
}

/// tuning knobs for the classification pass
#[derive(Debug, Clone)]
pub struct ClassifyOptions {
    pub chunk_size: usize,
    pub n_jobs: usize,
    pub pre_dispatch: String,
    pub confidence: f64,
    pub read_orientation: Option<ReadOrientation>,
}

impl Default for ClassifyOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            n_jobs: 1,
            pre_dispatch: "2*n_jobs".to_string(),
            confidence: DEFAULT_CONFIDENCE,
            read_orientation: None,
        }
    }
}

/// accumulates per-chunk results keyed by chunk index, so parallel
/// completion order never leaks into the output
#[derive(Debug, Default)]
struct ParallelAccumulator {
    chunks: DashMap<usize, Result<Vec<Assignment>>>,
}

/// CLI entry: load the artifact, classify the reads, write the table
pub fn classify(args: Args) -> Result<PathBuf> {
    let classifier = FittedClassifier::load(&args.classifier)?;
    let reads = read_fasta(&args.reads)?;

    let options = ClassifyOptions {
        chunk_size: args.chunk_size,
        n_jobs: args.jobs,
        pre_dispatch: args.pre_dispatch.clone(),
        confidence: args.confidence,
        read_orientation: args.read_orientation,
    };

    let assignments = classify_reads(reads, &classifier.pipeline, &options)?;

    let mut rows = Vec::with_capacity(assignments.len() + 1);
    rows.push("Feature ID\tTaxon\tConfidence".to_string());
    for assignment in &assignments {
        rows.push(format!(
            "{}\t{}\t{}",
            assignment.id, assignment.taxon, assignment.confidence
        ));
    }

    write_collection(&rows, &args.output);

    Ok(args.output)
}

/// classify a read stream with a fitted pipeline
///
/// Reads are oriented once, split into chunks of `chunk_size`, and each
/// chunk is classified independently on a pool of `n_jobs` workers.
/// Results are reassembled in chunk order, so the output matches the
/// input order regardless of scheduling. `pre_dispatch` is accepted for
/// interface compatibility but has no effect; all chunks are materialized
/// before dispatch.
pub fn classify_reads<I>(
    reads: I,
    classifier: &Pipeline,
    options: &ClassifyOptions,
) -> Result<Vec<Assignment>>
where
    I: IntoIterator<Item = SequenceRecord>,
{
    if !(-1.0..=1.0).contains(&options.confidence) {
        bail!(
            "ERROR: confidence must be within [-1, 1], got {}",
            options.confidence
        );
    }
    if options.chunk_size == 0 {
        bail!("ERROR: chunk size must be positive");
    }
    if options.pre_dispatch != "2*n_jobs" {
        log::debug!(
            "pre_dispatch '{}' accepted but ignored; chunks dispatch eagerly",
            options.pre_dispatch
        );
    }

    let mut reads = reads.into_iter();
    let mut oriented =
        autodetect_orientation(&mut reads, classifier, options.read_orientation)?;

    let mut chunks: Vec<Vec<SequenceRecord>> = Vec::new();
    loop {
        let chunk = oriented
            .by_ref()
            .take(options.chunk_size)
            .collect::<Vec<SequenceRecord>>();
        if chunk.is_empty() {
            break;
        }
        chunks.push(chunk);
    }
    drop(oriented);

    let pb = get_progress_bar(chunks.len() as u64, "Classifying reads...");
    let accumulator = ParallelAccumulator::default();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.n_jobs.max(MIN_THREADS))
        .build()?;

    pool.install(|| {
        chunks.par_iter().enumerate().for_each(|(idx, chunk)| {
            let result = predict_chunk(classifier, chunk, options.confidence);
            accumulator.chunks.insert(idx, result);
            pb.inc(1);
        });
    });

    pb.finish_and_clear();

    let mut assignments = Vec::new();
    for idx in 0..chunks.len() {
        let (_, result) = accumulator
            .chunks
            .remove(&idx)
            .expect("every chunk produces a result");
        assignments.extend(result?);
    }

    log::info!("Classified {} reads", assignments.len());

    Ok(assignments)
}

/// classify one chunk of reads
///
/// A negative confidence skips the confidence calculation entirely and
/// reports the sentinel value -1 for every read.
pub(crate) fn predict_chunk(
    classifier: &Pipeline,
    chunk: &[SequenceRecord],
    confidence: f64,
) -> Result<Vec<Assignment>> {
    let data = Dataset::Reads(chunk.iter().map(|read| read.seq.clone()).collect());

    if confidence < 0.0 {
        let labels = classifier.predict(&data)?;

        return Ok(chunk
            .iter()
            .zip(labels)
            .map(|(read, taxon)| Assignment {
                id: read.id.clone(),
                taxon,
                confidence: CONFIDENCE_SENTINEL,
            })
            .collect());
    }

    let proba = classifier.predict_proba(&data)?;
    let classes = classifier
        .classes()
        .ok_or_else(|| anyhow!("ERROR: classifier has no fitted classes"))?;
    let ranked = rank_classes(classes);

    Ok(chunk
        .iter()
        .zip(proba.iter())
        .map(|(read, row)| {
            let (taxon, confidence) = assign(&ranked, classes, row, confidence);
            Assignment {
                id: read.id.clone(),
                taxon,
                confidence,
            }
        })
        .collect())
}
